// Path signal -> filter -> per-axis windows -> boxes -> anticipation.
// Rule: a held shot that is slightly off beats a camera that never settles.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::anticipation::{anticipate_changes, anticipating_frames};
use crate::error::EngineError;
use crate::filter::{bandpass_filter, ButterworthLowpass};
use crate::frame_spec::FrameSpecAssembler;
use crate::signal::PathSignal;
use crate::types::*;
use crate::window::select_windows;

/// Summary of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PipelineStats {
    pub frame_count: usize,
    pub x_windows: usize,
    pub y_windows: usize,
    pub keyframes: usize,
    pub anticipated_frames: usize,
}

/// Validated configuration plus the pipeline stages that consume it.
#[derive(Debug, Clone)]
pub struct ZoomPipeline {
    config: ZoomConfig,
}

impl ZoomPipeline {
    pub fn new(config: ZoomConfig) -> Result<Self, EngineError> {
        validate(&config)?;
        Ok(ZoomPipeline { config })
    }

    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    /// Run every stage over `signal`.
    pub fn run(&self, signal: &PathSignal) -> Result<BoxTrack, EngineError> {
        self.run_with_stats(signal).map(|(track, _)| track)
    }

    pub fn run_with_stats(
        &self,
        signal: &PathSignal,
    ) -> Result<(BoxTrack, PipelineStats), EngineError> {
        let frame_count = signal.len();
        let (min_frame, max_frame) = self.frame_range(frame_count)?;
        let geometry = self.config.geometry;

        let (x_track, y_track) = bandpass_filter(signal, &self.config.filter)?;
        let x_windows = select_windows(
            x_track.values(),
            geometry.window_width(),
            geometry.box_width,
            geometry.video_width,
        )?;
        let y_windows = select_windows(
            y_track.values(),
            geometry.window_height(),
            geometry.box_height,
            geometry.video_height,
        )?;

        let assembler = FrameSpecAssembler::new(geometry, &x_windows, &y_windows);
        let mut stats = PipelineStats {
            frame_count,
            x_windows: x_windows.len(),
            y_windows: y_windows.len(),
            keyframes: assembler.merged_keys().len(),
            anticipated_frames: 0,
        };

        let track = if self.config.keyframes_only {
            let keyframes = assembler.keyframes(min_frame, max_frame, frame_count);
            debug!(keyframes = keyframes.len(), "emitting keyframes only");
            BoxTrack::Keyframes {
                frame_count,
                min_frame,
                max_frame,
                keyframes,
            }
        } else {
            let boxes = assembler.boxes(min_frame, max_frame);
            let anticipation_time = self.config.anticipation_time;
            stats.anticipated_frames = anticipating_frames(&boxes, anticipation_time);
            BoxTrack::Frames {
                min_frame,
                boxes: anticipate_changes(&boxes, anticipation_time),
            }
        };

        info!(
            frames = frame_count,
            min_frame,
            max_frame,
            x_windows = stats.x_windows,
            y_windows = stats.y_windows,
            keyframes = stats.keyframes,
            anticipated = stats.anticipated_frames,
            "zoom pipeline complete"
        );
        Ok((track, stats))
    }

    /// Resolve `[min_frame, max_frame)` against the signal length.
    fn frame_range(&self, frame_count: usize) -> Result<(usize, usize), EngineError> {
        let min_frame = self.config.min_frame.unwrap_or(0);
        let max_frame = self.config.max_frame.unwrap_or(frame_count);
        if min_frame > max_frame || max_frame > frame_count {
            return Err(EngineError::FrameRange {
                min_frame,
                max_frame,
                frame_count,
            });
        }
        Ok((min_frame, max_frame))
    }
}

fn validate(config: &ZoomConfig) -> Result<(), EngineError> {
    let g = &config.geometry;
    if g.box_width == 0 || g.box_height == 0 {
        return Err(EngineError::InvalidConfig(
            "viewport size must be non-zero".to_string(),
        ));
    }
    if g.box_width > g.video_width || g.box_height > g.video_height {
        return Err(EngineError::InvalidConfig(format!(
            "viewport {}x{} does not fit in video {}x{}",
            g.box_width, g.box_height, g.video_width, g.video_height
        )));
    }
    if g.window_width() <= 0.0 || g.window_height() <= 0.0 {
        return Err(EngineError::InvalidConfig(format!(
            "padding {} leaves no room in a {}x{} viewport",
            g.padding, g.box_width, g.box_height
        )));
    }
    if let (Some(min), Some(max)) = (config.min_frame, config.max_frame) {
        if min > max {
            return Err(EngineError::InvalidConfig(format!(
                "min_frame {} is after max_frame {}",
                min, max
            )));
        }
    }
    ButterworthLowpass::design(config.filter.order, config.filter.freq_cutoff)?;
    Ok(())
}
