// Merge independent x and y window partitions into crop boxes.
// Shot changes happen wherever either axis starts a new window.

use std::collections::BTreeSet;

use crate::types::*;

/// Starting frame of each window: prefix sums of lengths, beginning at 0.
pub fn key_frames(windows: &[Window]) -> Vec<usize> {
    windows
        .iter()
        .scan(0usize, |start, w| {
            let key = *start;
            *start += w.length;
            Some(key)
        })
        .collect()
}

/// Sorted union of both axes' key frames: every global cut point.
pub fn merged_key_frames(x_windows: &[Window], y_windows: &[Window]) -> Vec<usize> {
    key_frames(x_windows)
        .into_iter()
        .chain(key_frames(y_windows))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// One axis: window offsets with their starting frames.
#[derive(Debug, Clone)]
struct AxisSpec {
    keys: Vec<usize>,
    offsets: Vec<f64>,
}

impl AxisSpec {
    fn new(windows: &[Window]) -> Self {
        AxisSpec {
            keys: key_frames(windows),
            offsets: windows.iter().map(|w| w.offset).collect(),
        }
    }

    /// Offset of the last window starting at or before `frame`.
    fn offset_at(&self, frame: usize) -> Option<f64> {
        let idx = self.keys.partition_point(|&k| k <= frame);
        idx.checked_sub(1).map(|i| self.offsets[i])
    }
}

/// Builds crop boxes from per-axis windows.
#[derive(Debug, Clone)]
pub struct FrameSpecAssembler {
    geometry: Geometry,
    x: AxisSpec,
    y: AxisSpec,
    merged_keys: Vec<usize>,
}

impl FrameSpecAssembler {
    pub fn new(geometry: Geometry, x_windows: &[Window], y_windows: &[Window]) -> Self {
        FrameSpecAssembler {
            geometry,
            x: AxisSpec::new(x_windows),
            y: AxisSpec::new(y_windows),
            merged_keys: merged_key_frames(x_windows, y_windows),
        }
    }

    pub fn merged_keys(&self) -> &[usize] {
        &self.merged_keys
    }

    /// Crop box for `frame`, or `None` when either axis has no windows.
    pub fn box_at(&self, frame: usize) -> Option<BoundingBox> {
        let x = self.x.offset_at(frame)?;
        let y = self.y.offset_at(frame)?;
        let g = &self.geometry;
        let half_pad = g.padding as f64 / 2.0;

        let (left, right) = place_axis(x, half_pad, g.box_width, g.video_width);
        let (top, bottom) = place_axis(y, half_pad, g.box_height, g.video_height);
        Some(BoundingBox::new(left, top, right, bottom))
    }

    /// One box per frame in `[min_frame, max_frame)`.
    pub fn boxes(&self, min_frame: usize, max_frame: usize) -> Vec<BoundingBox> {
        (min_frame..max_frame)
            .filter_map(|frame| self.box_at(frame))
            .collect()
    }

    /// One box per cut point in `[min_frame, max_frame)`, positioned as a
    /// fraction of `frame_count`. A range that starts mid-shot opens with a
    /// keyframe at `min_frame` for the shot already on screen.
    pub fn keyframes(
        &self,
        min_frame: usize,
        max_frame: usize,
        frame_count: usize,
    ) -> Vec<KeyedBoundingBox> {
        if frame_count == 0 || min_frame >= max_frame {
            return Vec::new();
        }
        let leading = self
            .merged_keys
            .binary_search(&min_frame)
            .is_err()
            .then_some(min_frame);
        leading
            .into_iter()
            .chain(
                self.merged_keys
                    .iter()
                    .copied()
                    .filter(|&k| k >= min_frame && k < max_frame),
            )
            .filter_map(|k| {
                self.box_at(k).map(|bbox| KeyedBoundingBox {
                    position: k as f64 / frame_count as f64,
                    bbox,
                })
            })
            .collect()
    }
}

/// Place the viewport along one axis: round the window offset, pull it back
/// by half the padding, then translate (never resize) into `[0, max_size]`.
fn place_axis(offset: f64, half_pad: f64, box_size: u32, max_size: u32) -> (u32, u32) {
    let pos = offset.round_ties_even();
    let start = (pos - half_pad).round_ties_even() as i64;
    let upper = max_size as i64 - box_size as i64;
    let start = start.min(upper).max(0);
    (start as u32, start as u32 + box_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn geometry() -> Geometry {
        Geometry {
            box_width: 432,
            box_height: 243,
            video_width: 1280,
            video_height: 720,
            padding: 80,
        }
    }

    #[test]
    fn key_frames_are_window_starts() {
        let windows = vec![Window::new(0.0, 3), Window::new(0.0, 2), Window::new(0.0, 5)];
        assert_eq!(key_frames(&windows), vec![0, 3, 5]);
        assert!(key_frames(&[]).is_empty());
    }

    #[test]
    fn merged_keys_are_sorted_union() {
        let x = vec![Window::new(0.0, 4), Window::new(0.0, 6)];
        let y = vec![Window::new(0.0, 2), Window::new(0.0, 2), Window::new(0.0, 6)];
        assert_eq!(merged_key_frames(&x, &y), vec![0, 2, 4]);
    }

    #[test]
    fn box_uses_latest_window_per_axis() {
        let x = vec![Window::new(300.0, 4), Window::new(500.0, 6)];
        let y = vec![Window::new(200.0, 2), Window::new(100.0, 8)];
        let assembler = FrameSpecAssembler::new(geometry(), &x, &y);

        assert_eq!(
            assembler.box_at(0),
            Some(BoundingBox::new(260, 160, 692, 403))
        );
        assert_eq!(
            assembler.box_at(3),
            Some(BoundingBox::new(260, 60, 692, 303))
        );
        assert_eq!(
            assembler.box_at(4),
            Some(BoundingBox::new(460, 60, 892, 303))
        );
        // Past the last key frame the final windows hold.
        assert_eq!(assembler.box_at(50), assembler.box_at(9));
    }

    #[test]
    fn boxes_are_clamped_by_translation() {
        let x = vec![Window::new(0.0, 1), Window::new(848.0, 1)];
        let y = vec![Window::new(10.0, 1), Window::new(477.0, 1)];
        let assembler = FrameSpecAssembler::new(geometry(), &x, &y);

        let first = assembler.box_at(0).unwrap();
        assert_eq!(first, BoundingBox::new(0, 0, 432, 243));

        let second = assembler.box_at(1).unwrap();
        assert_eq!(second, BoundingBox::new(808, 437, 1240, 680));
    }

    #[test]
    fn offsets_round_half_to_even() {
        let g = Geometry {
            padding: 0,
            ..geometry()
        };
        let x = vec![Window::new(100.5, 1), Window::new(101.5, 1)];
        let y = vec![Window::new(0.0, 2)];
        let assembler = FrameSpecAssembler::new(g, &x, &y);
        assert_eq!(assembler.box_at(0).unwrap().left, 100);
        assert_eq!(assembler.box_at(1).unwrap().left, 102);
    }

    #[test]
    fn dense_boxes_cover_range() {
        let x = vec![Window::new(300.0, 100)];
        let y = vec![Window::new(200.0, 100)];
        let assembler = FrameSpecAssembler::new(geometry(), &x, &y);
        let boxes = assembler.boxes(0, 100);
        assert_eq!(boxes.len(), 100);
        assert!(boxes.iter().all(|b| *b == boxes[0]));
        assert_eq!(assembler.boxes(20, 30).len(), 10);
    }

    #[test]
    fn keyframes_only_at_cut_points() {
        let x = vec![Window::new(300.0, 4), Window::new(500.0, 6)];
        let y = vec![Window::new(200.0, 7), Window::new(100.0, 3)];
        let assembler = FrameSpecAssembler::new(geometry(), &x, &y);

        let keyframes = assembler.keyframes(0, 10, 10);
        let positions: Vec<f64> = keyframes.iter().map(|k| k.position).collect();
        assert_eq!(positions, vec![0.0, 0.4, 0.7]);
        assert_eq!(keyframes[1].bbox, assembler.box_at(4).unwrap());

        let ranged = assembler.keyframes(1, 7, 10);
        let positions: Vec<f64> = ranged.iter().map(|k| k.position).collect();
        assert_eq!(positions, vec![0.1, 0.4]);
        assert_eq!(ranged[0].bbox, assembler.box_at(1).unwrap());
    }

    #[test]
    fn mid_shot_range_opens_with_active_shot() {
        let x = vec![Window::new(300.0, 4), Window::new(500.0, 6)];
        let y = vec![Window::new(200.0, 10)];
        let assembler = FrameSpecAssembler::new(geometry(), &x, &y);

        let keyframes = assembler.keyframes(6, 10, 10);
        assert_eq!(keyframes.len(), 1);
        assert_eq!(keyframes[0].position, 0.6);
        assert_eq!(keyframes[0].bbox, assembler.box_at(6).unwrap());

        // Starting on a cut adds nothing extra.
        assert_eq!(assembler.keyframes(4, 10, 10).len(), 1);
        assert!(assembler.keyframes(5, 5, 10).is_empty());
    }

    #[test]
    fn no_windows_no_boxes() {
        let assembler = FrameSpecAssembler::new(geometry(), &[], &[]);
        assert_eq!(assembler.box_at(0), None);
        assert!(assembler.boxes(0, 5).is_empty());
        assert!(assembler.keyframes(0, 5, 0).is_empty());
    }

    fn windows_strategy() -> impl Strategy<Value = Vec<Window>> {
        prop::collection::vec(
            (-200.0f64..1500.0, 1usize..20).prop_map(|(o, l)| Window::new(o, l)),
            1..12,
        )
    }

    proptest! {
        #[test]
        fn boxes_stay_inside_video(
            x in windows_strategy(),
            y in windows_strategy(),
            padding in 0u32..200,
        ) {
            let g = Geometry { padding, ..geometry() };
            let assembler = FrameSpecAssembler::new(g, &x, &y);
            for b in assembler.boxes(0, 120) {
                prop_assert!(b.right <= g.video_width);
                prop_assert!(b.bottom <= g.video_height);
                prop_assert_eq!(b.width(), g.box_width);
                prop_assert_eq!(b.height(), g.box_height);
            }
        }

        #[test]
        fn assembly_is_deterministic(x in windows_strategy(), y in windows_strategy()) {
            let first = FrameSpecAssembler::new(geometry(), &x, &y).boxes(0, 80);
            let second = FrameSpecAssembler::new(geometry(), &x, &y).boxes(0, 80);
            prop_assert_eq!(first, second);
        }
    }
}
