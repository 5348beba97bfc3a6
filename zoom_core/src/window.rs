// Minimal-shot selection along one axis.
// Greedy left-to-right: each window runs until the motion no longer fits in
// the viewport, then a new fixed offset starts. No backtracking.

use tracing::{debug, warn};

use crate::error::EngineError;
use crate::types::Window;

/// Find the longest run from the start of `seq` whose span stays below
/// `window_size`.
///
/// Returns `(offset, length)`, where `offset` is the minimum over the run and
/// `length` is the number of frames in it. The scan seeds `minval = +inf`,
/// `maxval = 0` and increments before testing, so a first sample that alone
/// spans `window_size` against the zero seed (a negative sample) yields a
/// zero-length run with an infinite offset.
pub fn choose_window(seq: &[f64], window_size: f64) -> (f64, usize) {
    let mut prev_min = 0.0;
    let mut minval = f64::INFINITY;
    let mut maxval = 0.0_f64;
    let mut index: isize = -1;

    while (maxval - minval) < window_size {
        index += 1;
        prev_min = minval;
        let i = index as usize;
        if i == seq.len() {
            break;
        }
        minval = minval.min(seq[i]);
        maxval = maxval.max(seq[i]);
    }

    (prev_min, index as usize)
}

/// Partition `track` into windows covering every frame exactly once.
///
/// Offsets are clamped to `[0, max_size - box_size]` so the viewport stays
/// inside the video along this axis.
pub fn select_windows(
    track: &[f64],
    window_size: f64,
    box_size: u32,
    max_size: u32,
) -> Result<Vec<Window>, EngineError> {
    if !(window_size.is_finite() && window_size > 0.0) {
        return Err(EngineError::InvalidConfig(format!(
            "window size must be positive, got {}",
            window_size
        )));
    }
    if box_size > max_size {
        return Err(EngineError::InvalidConfig(format!(
            "viewport size {} exceeds video size {}",
            box_size, max_size
        )));
    }

    let upper = (max_size - box_size) as f64;
    let mut windows = Vec::new();
    let mut rest = track;

    while !rest.is_empty() {
        let (mut offset, mut length) = choose_window(rest, window_size);
        if length == 0 {
            // The lone first sample is the whole run.
            warn!(sample = rest[0], "degenerate zero-length window");
            offset = rest[0];
            length = 1;
        }
        windows.push(Window::new(offset.clamp(0.0, upper), length));
        rest = &rest[length..];
    }

    debug!(
        frames = track.len(),
        windows = windows.len(),
        window_size,
        "selected windows"
    );
    Ok(windows)
}
