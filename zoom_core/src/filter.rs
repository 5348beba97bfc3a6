// Low-pass Butterworth filtering of the motion path.
// Causal, zero initial state: the filtered path lags the raw one, which is
// what keeps the camera from chasing single-frame jitter.

use std::f64::consts::PI;
use std::ops::{Add, Div, Mul, Neg, Sub};

use tracing::debug;

use crate::error::EngineError;
use crate::signal::PathSignal;
use crate::types::{FilterSettings, FilteredTrack};

/// Digital low-pass Butterworth filter in transfer-function form.
#[derive(Debug, Clone, PartialEq)]
pub struct ButterworthLowpass {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl ButterworthLowpass {
    /// Design an `order`-pole filter with normalized cutoff `cutoff`
    /// (fraction of Nyquist, `0 < cutoff < 0.5`).
    pub fn design(order: usize, cutoff: f64) -> Result<Self, EngineError> {
        if order == 0 {
            return Err(EngineError::InvalidConfig(
                "filter order must be at least 1".to_string(),
            ));
        }
        if !(cutoff > 0.0 && cutoff < 0.5) {
            return Err(EngineError::InvalidConfig(format!(
                "filter cutoff must be in (0, 0.5), got {}",
                cutoff
            )));
        }

        // Analog prototype poles on the left half of the unit circle.
        let n = order as f64;
        let prototype: Vec<Complex> = (0..order)
            .map(|k| {
                let m = 2.0 * k as f64 - n + 1.0;
                -Complex::from_polar(1.0, PI * m / (2.0 * n))
            })
            .collect();

        // Pre-warp for the bilinear transform with fs = 2.
        let fs2 = 4.0;
        let warped = fs2 * (PI * cutoff / 2.0).tan();

        let mut gain = warped.powi(order as i32);
        let mut denominator = Complex::new(1.0, 0.0);
        let digital_poles: Vec<Complex> = prototype
            .iter()
            .map(|&p| {
                let p = p * warped;
                let fs2 = Complex::new(fs2, 0.0);
                denominator = denominator * (fs2 - p);
                (fs2 + p) / (fs2 - p)
            })
            .collect();
        gain /= denominator.re;

        // All zeros land on z = -1.
        let zeros = vec![Complex::new(-1.0, 0.0); order];
        let b = poly(&zeros).into_iter().map(|c| c.re * gain).collect();
        let a = poly(&digital_poles).into_iter().map(|c| c.re).collect();

        Ok(ButterworthLowpass { b, a })
    }

    pub fn numerator(&self) -> &[f64] {
        &self.b
    }

    pub fn denominator(&self) -> &[f64] {
        &self.a
    }

    /// Run the filter over `input` (direct form II transposed, zero state).
    pub fn apply(&self, input: &[f64]) -> Vec<f64> {
        let a0 = self.a[0];
        let b: Vec<f64> = self.b.iter().map(|v| v / a0).collect();
        let a: Vec<f64> = self.a.iter().map(|v| v / a0).collect();
        let taps = a.len().max(b.len());

        let mut state = vec![0.0; taps];
        let mut output = Vec::with_capacity(input.len());

        for &x in input {
            let y = coeff(&b, 0) * x + state[0];
            for i in 1..taps {
                let next = if i + 1 < taps { state[i] } else { 0.0 };
                state[i - 1] = coeff(&b, i) * x - coeff(&a, i) * y + next;
            }
            output.push(y);
        }

        output
    }
}

fn coeff(c: &[f64], i: usize) -> f64 {
    c.get(i).copied().unwrap_or(0.0)
}

/// Low-pass filter both axes of `signal` independently.
pub fn bandpass_filter(
    signal: &PathSignal,
    settings: &FilterSettings,
) -> Result<(FilteredTrack, FilteredTrack), EngineError> {
    let filter = ButterworthLowpass::design(settings.order, settings.freq_cutoff)?;
    debug!(
        order = settings.order,
        freq_cutoff = settings.freq_cutoff,
        frames = signal.len(),
        "filtering path signal"
    );
    let x = FilteredTrack::new(filter.apply(&signal.xs()));
    let y = FilteredTrack::new(filter.apply(&signal.ys()));
    Ok((x, y))
}

/// Polynomial coefficients (highest power first) with the given roots.
fn poly(roots: &[Complex]) -> Vec<Complex> {
    let mut coeffs = vec![Complex::new(1.0, 0.0)];
    for &root in roots {
        let mut next = vec![Complex::new(0.0, 0.0); coeffs.len() + 1];
        for (i, &c) in coeffs.iter().enumerate() {
            next[i] = next[i] + c;
            next[i + 1] = next[i + 1] - root * c;
        }
        coeffs = next;
    }
    coeffs
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Complex {
    re: f64,
    im: f64,
}

impl Complex {
    fn new(re: f64, im: f64) -> Self {
        Complex { re, im }
    }

    fn from_polar(r: f64, theta: f64) -> Self {
        Complex::new(r * theta.cos(), r * theta.sin())
    }
}

impl Add for Complex {
    type Output = Complex;
    fn add(self, rhs: Complex) -> Complex {
        Complex::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Complex;
    fn sub(self, rhs: Complex) -> Complex {
        Complex::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Complex {
    type Output = Complex;
    fn mul(self, rhs: Complex) -> Complex {
        Complex::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Mul<f64> for Complex {
    type Output = Complex;
    fn mul(self, rhs: f64) -> Complex {
        Complex::new(self.re * rhs, self.im * rhs)
    }
}

impl Div for Complex {
    type Output = Complex;
    fn div(self, rhs: Complex) -> Complex {
        let denom = rhs.re * rhs.re + rhs.im * rhs.im;
        Complex::new(
            (self.re * rhs.re + self.im * rhs.im) / denom,
            (self.im * rhs.re - self.re * rhs.im) / denom,
        )
    }
}

impl Neg for Complex {
    type Output = Complex;
    fn neg(self) -> Complex {
        Complex::new(-self.re, -self.im)
    }
}
