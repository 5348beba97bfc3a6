// Ease the camera into upcoming cuts instead of jumping on the cut frame.
// The ease follows a normal CDF centred half way through the look-ahead.

use crate::types::BoundingBox;

/// Number of elements from `idx` to the next value different from
/// `items[idx]`, or `None` if the value holds to the end.
pub fn distance_to_next_change<T: PartialEq>(items: &[T], idx: usize) -> Option<usize> {
    let current = items.get(idx)?;
    items[idx..]
        .iter()
        .position(|item| item != current)
}

/// Cumulative normal distribution.
pub fn normal_cdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    0.5 * erfc(-(x - mean) / (std_dev * std::f64::consts::SQRT_2))
}

/// Complementary error function (Chebyshev fit, fractional error < 1.2e-7).
fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let ans = t
        * (-z * z - 1.265_512_23
            + t * (1.000_023_68
                + t * (0.374_091_96
                    + t * (0.096_784_18
                        + t * (-0.186_288_06
                            + t * (0.278_868_07
                                + t * (-1.135_203_98
                                    + t * (1.488_515_87
                                        + t * (-0.822_152_23 + t * 0.170_872_77)))))))))
            .exp();
    if x >= 0.0 {
        ans
    } else {
        2.0 - ans
    }
}

/// How far toward the next shot a frame `distance` frames before the cut
/// should sit: near 0 at the start of the look-ahead, near 1 at the cut.
/// With no look-ahead the cut is immediate.
pub fn ease_fraction(distance: usize, anticipation_time: usize) -> f64 {
    if anticipation_time == 0 {
        return 1.0;
    }
    let t = anticipation_time as f64;
    normal_cdf(t - distance as f64, t / 2.0, t / 6.0)
}

/// Move each coordinate of `start` toward `finish` by the ease fraction.
pub fn interpolate(
    start: &BoundingBox,
    finish: &BoundingBox,
    distance: usize,
    anticipation_time: usize,
) -> BoundingBox {
    let frac = ease_fraction(distance, anticipation_time);
    let from = start.coords();
    let to = finish.coords();
    let mut coords = [0u32; 4];
    for i in 0..4 {
        let s = from[i] as f64;
        let f = to[i] as f64;
        coords[i] = (s + (f - s) * frac).round_ties_even() as u32;
    }
    BoundingBox::from_coords(coords)
}

/// Ease boxes toward cuts that happen within `anticipation_time` frames.
///
/// Frame `i` anticipates when `boxes[i + anticipation_time]` exists and
/// differs from `boxes[i]`. Every other frame passes through unchanged, and
/// the output only depends on the input sequence.
pub fn anticipate_changes(boxes: &[BoundingBox], anticipation_time: usize) -> Vec<BoundingBox> {
    if anticipation_time == 0 {
        return boxes.to_vec();
    }

    boxes
        .iter()
        .enumerate()
        .map(|(i, current)| {
            let anticipating = i
                .checked_add(anticipation_time)
                .and_then(|ahead| boxes.get(ahead))
                .is_some_and(|ahead| ahead != current);
            if !anticipating {
                return *current;
            }
            match distance_to_next_change(boxes, i) {
                Some(distance) => {
                    interpolate(current, &boxes[i + distance], distance, anticipation_time)
                }
                None => *current,
            }
        })
        .collect()
}

/// Number of frames `anticipate_changes` would ease.
pub fn anticipating_frames(boxes: &[BoundingBox], anticipation_time: usize) -> usize {
    if anticipation_time == 0 {
        return 0;
    }
    (0..boxes.len())
        .filter(|&i| {
            i.checked_add(anticipation_time)
                .and_then(|ahead| boxes.get(ahead))
                .is_some_and(|ahead| *ahead != boxes[i])
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bbox(left: u32) -> BoundingBox {
        BoundingBox::new(left, 0, left + 100, 50)
    }

    #[test]
    fn distance_to_next_change_counts_run() {
        let subject = [0, 0, 0, 1];
        assert_eq!(distance_to_next_change(&subject, 0), Some(3));
        assert_eq!(distance_to_next_change(&subject, 1), Some(2));
        assert_eq!(distance_to_next_change(&subject, 3), None);
        assert_eq!(distance_to_next_change(&subject, 4), None);
    }

    #[test]
    fn normal_cdf_reference_points() {
        assert!((normal_cdf(0.0, 0.0, 1.0) - 0.5).abs() < 1e-6);
        assert!((normal_cdf(1.0, 0.0, 1.0) - 0.841_344_746).abs() < 1e-6);
        assert!((normal_cdf(-1.96, 0.0, 1.0) - 0.024_997_895).abs() < 1e-6);
        assert!((normal_cdf(25.0, 15.0, 5.0) - 0.977_249_868).abs() < 1e-6);
    }

    #[test]
    fn zero_look_ahead_jumps_to_finish() {
        assert_eq!(ease_fraction(0, 0), 1.0);
        assert_eq!(ease_fraction(7, 0), 1.0);
        assert_eq!(interpolate(&bbox(0), &bbox(300), 0, 0), bbox(300));
    }

    #[test]
    fn look_ahead_past_usize_range_passes_through() {
        let mut boxes = vec![bbox(0); 3];
        boxes.extend(vec![bbox(100); 3]);
        assert_eq!(anticipate_changes(&boxes, usize::MAX), boxes);
        assert_eq!(anticipating_frames(&boxes, usize::MAX), 0);
    }

    #[test]
    fn ease_fraction_endpoints() {
        assert!(ease_fraction(30, 30) < 0.002);
        assert!(ease_fraction(0, 30) > 0.998);
        assert!((ease_fraction(15, 30) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn eases_into_cut() {
        let mut boxes = vec![bbox(0); 35];
        boxes.extend(vec![bbox(100); 35]);
        let eased = anticipate_changes(&boxes, 30);

        assert_eq!(eased.len(), boxes.len());
        // Too far from the cut to anticipate.
        assert_eq!(eased[4], bbox(0));
        // Start of the look-ahead barely moves.
        assert_eq!(eased[5], bbox(0));
        // Half way.
        assert_eq!(eased[20], bbox(50));
        // One frame before the cut is nearly there.
        assert_eq!(eased[34], bbox(100));
        // After the cut nothing changes.
        assert_eq!(&eased[35..], &boxes[35..]);

        let lefts: Vec<u32> = eased[..35].iter().map(|b| b.left).collect();
        assert!(lefts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn constant_sequence_is_untouched() {
        let boxes = vec![bbox(300); 100];
        assert_eq!(anticipate_changes(&boxes, 30), boxes);
        assert_eq!(anticipating_frames(&boxes, 30), 0);
    }

    #[test]
    fn short_tail_passes_through() {
        let boxes = vec![bbox(0), bbox(0), bbox(10)];
        assert_eq!(anticipate_changes(&boxes, 30), boxes);
    }

    #[test]
    fn zero_anticipation_disables_easing() {
        let boxes = vec![bbox(0), bbox(10)];
        assert_eq!(anticipate_changes(&boxes, 0), boxes);
    }

    #[test]
    fn counts_anticipating_frames() {
        let mut boxes = vec![bbox(0); 35];
        boxes.extend(vec![bbox(100); 35]);
        assert_eq!(anticipating_frames(&boxes, 30), 30);
    }

    proptest! {
        #[test]
        fn ease_is_monotonic_in_distance(t in 1usize..120, d in 0usize..120) {
            let d = d % t;
            prop_assert!(ease_fraction(d, t) >= ease_fraction(d + 1, t));
        }

        #[test]
        fn eased_boxes_stay_between_shots(from in 0u32..800, to in 0u32..800, t in 1usize..60) {
            let mut boxes = vec![bbox(from); 2 * t];
            boxes.extend(vec![bbox(to); t]);
            let lo = from.min(to);
            let hi = from.max(to);
            for b in anticipate_changes(&boxes, t) {
                prop_assert!(b.left >= lo && b.left <= hi);
            }
        }
    }
}
