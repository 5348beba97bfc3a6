// zoom_core: virtual camera for fixed-position video on small screens.
// Motion path in, minimal sequence of held shots with eased cuts out.
// The wasm facade only converts JSON and errors; all logic lives in Rust.

mod anticipation;
mod error;
mod export;
mod filter;
mod frame_spec;
mod pipeline;
mod signal;
mod types;
mod window;

use wasm_bindgen::prelude::*;

pub use anticipation::{
    anticipate_changes, distance_to_next_change, ease_fraction, interpolate, normal_cdf,
};
pub use error::EngineError;
pub use export::{from_json, to_csv, to_json};
pub use filter::{bandpass_filter, ButterworthLowpass};
pub use frame_spec::{key_frames, merged_key_frames, FrameSpecAssembler};
pub use pipeline::{PipelineStats, ZoomPipeline};
pub use signal::PathSignal;
pub use types::*;
pub use window::{choose_window, select_windows};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Engine interface exposed to JavaScript. Keeps the last track so the
/// player can query boxes frame by frame without re-running the pipeline.
#[wasm_bindgen]
pub struct Engine {
    pipeline: ZoomPipeline,
    track: Option<BoxTrack>,
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<Engine, JsValue> {
        let config: ZoomConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;
        let pipeline = ZoomPipeline::new(config).map_err(to_js)?;

        Ok(Engine {
            pipeline,
            track: None,
        })
    }

    /// Run the pipeline over header-less `x,y` CSV path data.
    /// Returns the box track as JSON.
    pub fn process_csv(&mut self, csv: &str) -> Result<String, JsValue> {
        let signal = PathSignal::from_csv(csv).map_err(to_js)?;
        self.process(&signal).map_err(to_js)
    }

    /// Run the pipeline over a JSON array of `{x, y}` samples (`null` for gaps).
    /// Returns the box track as JSON.
    pub fn process_samples(&mut self, samples_json: &str) -> Result<String, JsValue> {
        let raw: Vec<RawSample> = serde_json::from_str(samples_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid samples: {}", e)))?;
        let signal = PathSignal::forward_fill(raw.into_iter().map(Sample::from).collect())
            .map_err(to_js)?;
        self.process(&signal).map_err(to_js)
    }

    /// Box for a frame of the last processed track as JSON, or `null`.
    pub fn box_at(&self, frame_index: u32) -> Result<String, JsValue> {
        let bbox = self
            .track
            .as_ref()
            .and_then(|track| track.box_at(FrameIndex::new(frame_index)));
        serde_json::to_string(&bbox)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Last processed track as header-less CSV rows.
    pub fn to_csv(&self) -> String {
        self.track.as_ref().map(export::to_csv).unwrap_or_default()
    }
}

impl Engine {
    fn process(&mut self, signal: &PathSignal) -> Result<String, EngineError> {
        let track = self.pipeline.run(signal)?;
        let json = export::to_json(&track)?;
        self.track = Some(track);
        Ok(json)
    }
}

/// JSON sample with optional coordinates; missing values are gaps.
#[derive(serde::Deserialize)]
struct RawSample {
    x: Option<f64>,
    y: Option<f64>,
}

impl From<RawSample> for Sample {
    fn from(raw: RawSample) -> Self {
        Sample::new(raw.x.unwrap_or(f64::NAN), raw.y.unwrap_or(f64::NAN))
    }
}

fn to_js(err: EngineError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
