// Per-frame motion centroid signal.
// Gaps (frames with no detected change) are forward-filled per axis before use.

use tracing::debug;

use crate::error::EngineError;
use crate::types::Sample;

/// Gap-free path signal, one sample per video frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathSignal {
    samples: Vec<Sample>,
}

impl PathSignal {
    /// Build a signal from raw samples, carrying the last valid value of each
    /// axis forward over NaN gaps. A gap on the very first frame has nothing
    /// to fill from and is rejected.
    pub fn forward_fill(raw: Vec<Sample>) -> Result<Self, EngineError> {
        let mut samples = raw;
        let mut last_x: Option<f64> = None;
        let mut last_y: Option<f64> = None;
        let mut filled = 0usize;

        for sample in samples.iter_mut() {
            if sample.x.is_nan() || sample.y.is_nan() {
                filled += 1;
            }
            sample.x = fill_axis(sample.x, &mut last_x, 'x')?;
            sample.y = fill_axis(sample.y, &mut last_y, 'y')?;
        }

        if filled > 0 {
            debug!(filled, total = samples.len(), "forward-filled path gaps");
        }

        Ok(PathSignal { samples })
    }

    /// Parse header-less `x,y` rows. Empty cells and `nan` mark gaps; blank
    /// lines are skipped.
    pub fn from_csv(data: &str) -> Result<Self, EngineError> {
        let mut raw = Vec::new();
        for (i, line) in data.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let line_no = i + 1;
            let mut cells = line.split(',');
            let x = parse_cell(cells.next(), line_no)?;
            let y = parse_cell(cells.next(), line_no)?;
            if cells.next().is_some() {
                return Err(EngineError::Parse {
                    line: line_no,
                    message: "expected exactly two columns".to_string(),
                });
            }
            raw.push(Sample::new(x, y));
        }
        Self::forward_fill(raw)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn xs(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.y).collect()
    }
}

fn fill_axis(value: f64, last: &mut Option<f64>, axis: char) -> Result<f64, EngineError> {
    if value.is_nan() {
        return last.ok_or(EngineError::LeadingGap { axis });
    }
    *last = Some(value);
    Ok(value)
}

fn parse_cell(cell: Option<&str>, line: usize) -> Result<f64, EngineError> {
    let cell = cell.ok_or_else(|| EngineError::Parse {
        line,
        message: "expected exactly two columns".to_string(),
    })?;
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(f64::NAN);
    }
    let value: f64 = cell.parse().map_err(|_| EngineError::Parse {
        line,
        message: format!("not a number: {:?}", cell),
    })?;
    if value.is_infinite() {
        return Err(EngineError::Parse {
            line,
            message: format!("non-finite value: {:?}", cell),
        });
    }
    Ok(value)
}
