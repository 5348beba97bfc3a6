// Serialize box tracks for the cropping/encoding side.

use crate::error::EngineError;
use crate::types::BoxTrack;

/// Header-less CSV. Per-frame rows are `left,top,right,bottom`; keyframe rows
/// are `position,left,top,right,bottom`.
pub fn to_csv(track: &BoxTrack) -> String {
    let mut out = String::new();
    match track {
        BoxTrack::Frames { boxes, .. } => {
            for b in boxes {
                out.push_str(&format!(
                    "{},{},{},{}\n",
                    b.left, b.top, b.right, b.bottom
                ));
            }
        }
        BoxTrack::Keyframes { keyframes, .. } => {
            for kf in keyframes {
                let b = &kf.bbox;
                out.push_str(&format!(
                    "{},{},{},{},{}\n",
                    kf.position, b.left, b.top, b.right, b.bottom
                ));
            }
        }
    }
    out
}

pub fn to_json(track: &BoxTrack) -> Result<String, EngineError> {
    Ok(serde_json::to_string(track)?)
}

pub fn from_json(json: &str) -> Result<BoxTrack, EngineError> {
    Ok(serde_json::from_str(json)?)
}
