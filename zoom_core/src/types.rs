// Strong typing over raw tuples. Samples, tracks, windows and crop boxes.
// All sizing arrives through ZoomConfig; nothing here is hardcoded per video.

use serde::{Deserialize, Serialize};

/// Frame index. Newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct FrameIndex(u32);

impl FrameIndex {
    pub fn new(index: u32) -> Self {
        FrameIndex(index)
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

/// Motion centroid for one frame, in source pixels. Either coordinate may be
/// NaN when the frame had no change at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
}

impl Sample {
    pub fn new(x: f64, y: f64) -> Self {
        Sample { x, y }
    }

    pub fn is_valid(&self) -> bool {
        !self.x.is_nan() && !self.y.is_nan()
    }
}

/// One axis of the path after low-pass filtering, one value per frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilteredTrack(Vec<f64>);

impl FilteredTrack {
    pub fn new(values: Vec<f64>) -> Self {
        FilteredTrack(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A fixed camera offset held for `length` consecutive frames along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub offset: f64,
    pub length: usize,
}

impl Window {
    pub fn new(offset: f64, length: usize) -> Self {
        Window { offset, length }
    }
}

/// Integer crop rectangle in source pixels: `[left, right) x [top, bottom)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl BoundingBox {
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        BoundingBox {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    pub fn coords(&self) -> [u32; 4] {
        [self.left, self.top, self.right, self.bottom]
    }

    pub fn from_coords(coords: [u32; 4]) -> Self {
        BoundingBox::new(coords[0], coords[1], coords[2], coords[3])
    }
}

/// A box emitted only at a shot change. `position` is the key frame index
/// divided by the total frame count (0.0 to 1.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyedBoundingBox {
    pub position: f64,
    #[serde(flatten)]
    pub bbox: BoundingBox,
}

/// Final output of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BoxTrack {
    /// One box per frame, starting at `min_frame`.
    Frames {
        min_frame: usize,
        boxes: Vec<BoundingBox>,
    },
    /// One box per shot change within `[min_frame, max_frame)`. The first
    /// keyframe sits at `min_frame` even when no cut happens there.
    Keyframes {
        frame_count: usize,
        min_frame: usize,
        max_frame: usize,
        keyframes: Vec<KeyedBoundingBox>,
    },
}

impl BoxTrack {
    pub fn len(&self) -> usize {
        match self {
            BoxTrack::Frames { boxes, .. } => boxes.len(),
            BoxTrack::Keyframes { keyframes, .. } => keyframes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Box shown at `frame`. Dense lookup in per-frame mode; in keyframe mode
    /// the last keyframe at or before the frame holds until `max_frame`.
    pub fn box_at(&self, frame: FrameIndex) -> Option<BoundingBox> {
        match self {
            BoxTrack::Frames { min_frame, boxes } => frame
                .as_usize()
                .checked_sub(*min_frame)
                .and_then(|offset| boxes.get(offset).copied()),
            BoxTrack::Keyframes {
                frame_count,
                min_frame,
                max_frame,
                keyframes,
            } => {
                let index = frame.as_usize();
                if *frame_count == 0 || index < *min_frame || index >= *max_frame {
                    return None;
                }
                let position = index as f64 / *frame_count as f64;
                let idx = keyframes.partition_point(|kf| kf.position <= position);
                idx.checked_sub(1).map(|i| keyframes[i].bbox)
            }
        }
    }
}

/// Viewport and source-frame geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Size of the mobile player viewport in px.
    pub box_width: u32,
    pub box_height: u32,
    /// Size of the source video frames in px.
    pub video_width: u32,
    pub video_height: u32,
    /// Margin subtracted from the viewport before windowing, in px.
    #[serde(default = "default_padding")]
    pub padding: u32,
}

impl Geometry {
    /// Span of motion that still fits in the viewport along x.
    pub fn window_width(&self) -> f64 {
        self.box_width as f64 - self.padding as f64
    }

    /// Span of motion that still fits in the viewport along y.
    pub fn window_height(&self) -> f64 {
        self.box_height as f64 - self.padding as f64
    }
}

/// Low-pass filter settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    #[serde(default = "default_filter_order")]
    pub order: usize,
    /// Normalized cutoff frequency (fraction of Nyquist).
    #[serde(default = "default_freq_cutoff")]
    pub freq_cutoff: f64,
}

impl Default for FilterSettings {
    fn default() -> Self {
        FilterSettings {
            order: default_filter_order(),
            freq_cutoff: default_freq_cutoff(),
        }
    }
}

/// Engine configuration, usually deserialized from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoomConfig {
    #[serde(flatten)]
    pub geometry: Geometry,
    #[serde(default)]
    pub filter: FilterSettings,
    /// First frame to emit (inclusive). Defaults to 0.
    #[serde(default)]
    pub min_frame: Option<usize>,
    /// Last frame to emit (exclusive). Defaults to the signal length.
    #[serde(default)]
    pub max_frame: Option<usize>,
    /// Frames of look-ahead for easing into a cut. 0 disables easing.
    #[serde(default = "default_anticipation_time")]
    pub anticipation_time: usize,
    /// Emit only shot-change keyframes instead of one box per frame.
    #[serde(default)]
    pub keyframes_only: bool,
}

impl ZoomConfig {
    pub fn new(geometry: Geometry) -> Self {
        ZoomConfig {
            geometry,
            filter: FilterSettings::default(),
            min_frame: None,
            max_frame: None,
            anticipation_time: default_anticipation_time(),
            keyframes_only: false,
        }
    }
}

fn default_padding() -> u32 {
    80
}

fn default_filter_order() -> usize {
    6
}

fn default_freq_cutoff() -> f64 {
    0.05
}

fn default_anticipation_time() -> usize {
    30
}
