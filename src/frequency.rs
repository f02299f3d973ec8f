//! Frequency axis construction
//!
//! Octave and third-octave axes are anchored at 1 kHz: band `n` has centre
//! `1000 * ratio^n`. Linear axes split the range into equal-width bands.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeaError};

/// Reference frequency for octave-family axes
pub const REFERENCE_FREQUENCY: f64 = 1000.0;

/// Relative slack when deciding whether a centre sits on a range bound
const BOUND_EPSILON: f64 = 1e-9;

/// How bands are laid out between the bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BandSpacing {
    /// `bands` equal-width bands covering the range
    Linear { bands: usize },
    /// Full octaves (ratio 2)
    Octave,
    /// Third octaves (ratio 2^(1/3))
    ThirdOctave,
}

impl BandSpacing {
    /// Ratio between adjacent centres, if the spacing is geometric
    pub fn ratio(&self) -> Option<f64> {
        match self {
            BandSpacing::Linear { .. } => None,
            BandSpacing::Octave => Some(2.0),
            BandSpacing::ThirdOctave => Some(2.0_f64.powf(1.0 / 3.0)),
        }
    }
}

/// Parameters an axis is generated from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub low: f64,
    pub high: f64,
    pub spacing: BandSpacing,
}

impl AxisSpec {
    pub fn new(low: f64, high: f64, spacing: BandSpacing) -> Self {
        Self { low, high, spacing }
    }

    pub fn third_octave(low: f64, high: f64) -> Self {
        Self::new(low, high, BandSpacing::ThirdOctave)
    }

    pub fn octave(low: f64, high: f64) -> Self {
        Self::new(low, high, BandSpacing::Octave)
    }

    pub fn linear(low: f64, high: f64, bands: usize) -> Self {
        Self::new(low, high, BandSpacing::Linear { bands })
    }

    /// Generate the axis
    pub fn build(&self) -> Result<FrequencyAxis> {
        FrequencyAxis::build(*self)
    }
}

impl Default for AxisSpec {
    fn default() -> Self {
        Self::third_octave(100.0, 5000.0)
    }
}

/// Ordered band centres and edges in Hz
///
/// Serialized as the [`AxisSpec`] it was built from, so a deserialized axis
/// is regenerated rather than trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AxisSpec", into = "AxisSpec")]
pub struct FrequencyAxis {
    spec: AxisSpec,
    centers: Vec<f64>,
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl FrequencyAxis {
    /// Build an axis from its generating parameters
    pub fn build(spec: AxisSpec) -> Result<Self> {
        let AxisSpec { low, high, spacing } = spec;
        if !(low.is_finite() && high.is_finite()) || low <= 0.0 || high <= 0.0 {
            return Err(SeaError::InvalidRange {
                reason: format!("bounds must be positive, got [{}, {}]", low, high),
            });
        }
        if low >= high {
            return Err(SeaError::InvalidRange {
                reason: format!("low bound {} must be below high bound {}", low, high),
            });
        }

        let (centers, lower, upper) = match spacing {
            BandSpacing::Linear { bands } => linear_bands(low, high, bands)?,
            BandSpacing::Octave | BandSpacing::ThirdOctave => {
                // ratio() is Some for every geometric spacing
                let ratio = spacing.ratio().unwrap_or(2.0);
                geometric_bands(low, high, ratio)
            }
        };

        if centers.is_empty() {
            return Err(SeaError::InvalidRange {
                reason: format!("no band centre falls inside [{}, {}] Hz", low, high),
            });
        }

        Ok(Self {
            spec,
            centers,
            lower,
            upper,
        })
    }

    pub fn spec(&self) -> &AxisSpec {
        &self.spec
    }

    /// Band centre frequencies in Hz
    pub fn centers(&self) -> &[f64] {
        &self.centers
    }

    /// Lower band edges in Hz
    pub fn lower_edges(&self) -> &[f64] {
        &self.lower
    }

    /// Upper band edges in Hz
    pub fn upper_edges(&self) -> &[f64] {
        &self.upper
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Width of band `index` in Hz
    pub fn bandwidth(&self, index: usize) -> Option<f64> {
        Some(self.upper.get(index)? - self.lower.get(index)?)
    }

    /// Band centres as angular frequencies (rad/s)
    pub fn angular(&self) -> Vec<f64> {
        self.centers.iter().map(|f| 2.0 * PI * f).collect()
    }
}

impl Default for FrequencyAxis {
    fn default() -> Self {
        let spec = AxisSpec::default();
        let (centers, lower, upper) =
            geometric_bands(spec.low, spec.high, 2.0_f64.powf(1.0 / 3.0));
        Self {
            spec,
            centers,
            lower,
            upper,
        }
    }
}

impl TryFrom<AxisSpec> for FrequencyAxis {
    type Error = SeaError;

    fn try_from(spec: AxisSpec) -> Result<Self> {
        Self::build(spec)
    }
}

impl From<FrequencyAxis> for AxisSpec {
    fn from(axis: FrequencyAxis) -> Self {
        axis.spec
    }
}

type Bands = (Vec<f64>, Vec<f64>, Vec<f64>);

fn linear_bands(low: f64, high: f64, bands: usize) -> Result<Bands> {
    if bands < 1 {
        return Err(SeaError::InvalidRange {
            reason: "linear spacing needs at least one band".to_string(),
        });
    }
    let width = (high - low) / bands as f64;
    let lower: Vec<f64> = (0..bands).map(|i| low + i as f64 * width).collect();
    let upper: Vec<f64> = (0..bands)
        .map(|i| if i + 1 == bands { high } else { low + (i + 1) as f64 * width })
        .collect();
    let centers = lower.iter().zip(&upper).map(|(l, u)| 0.5 * (l + u)).collect();
    Ok((centers, lower, upper))
}

fn geometric_bands(low: f64, high: f64, ratio: f64) -> Bands {
    let log_ratio = ratio.ln();
    let first = ((low / REFERENCE_FREQUENCY).ln() / log_ratio).floor() as i32 - 1;
    let last = ((high / REFERENCE_FREQUENCY).ln() / log_ratio).ceil() as i32 + 1;
    let half = ratio.sqrt();

    let mut centers = Vec::new();
    let mut lower = Vec::new();
    let mut upper = Vec::new();
    for n in first..=last {
        let center = REFERENCE_FREQUENCY * ratio.powi(n);
        if center < low * (1.0 - BOUND_EPSILON) || center > high * (1.0 + BOUND_EPSILON) {
            continue;
        }
        centers.push(center);
        lower.push(center / half);
        upper.push(center * half);
    }
    (centers, lower, upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_third_octave_centres_follow_reference() {
        let axis = AxisSpec::third_octave(100.0, 5000.0).build().unwrap();
        assert!(!axis.is_empty());
        for pair in axis.centers().windows(2) {
            assert!(pair[1] > pair[0]);
            assert_relative_eq!(pair[1] / pair[0], 2.0_f64.powf(1.0 / 3.0), max_relative = 1e-12);
        }
        for &fc in axis.centers() {
            let n = (3.0 * (fc / 1000.0).log2()).round();
            let nominal = 1000.0 * 2.0_f64.powf(n / 3.0);
            assert!(((fc - nominal) / nominal).abs() < 1e-3);
            assert!((100.0..=5000.0).contains(&fc));
        }
    }

    #[test]
    fn test_reference_band_included_on_bound() {
        let axis = AxisSpec::octave(1000.0, 4000.0).build().unwrap();
        assert_eq!(axis.centers().len(), 3);
        assert_relative_eq!(axis.centers()[0], 1000.0);
        assert_relative_eq!(axis.centers()[2], 4000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_octave_edges() {
        let axis = AxisSpec::octave(200.0, 2000.0).build().unwrap();
        for i in 0..axis.len() {
            let fc = axis.centers()[i];
            assert_relative_eq!(axis.lower_edges()[i] * axis.upper_edges()[i], fc * fc, max_relative = 1e-12);
            assert_relative_eq!(axis.bandwidth(i).unwrap(), fc / 2.0_f64.sqrt(), max_relative = 1e-12);
        }
    }

    #[test]
    fn test_linear_bands() {
        let axis = AxisSpec::linear(100.0, 500.0, 4).build().unwrap();
        assert_eq!(axis.centers(), &[150.0, 250.0, 350.0, 450.0]);
        assert_eq!(axis.lower_edges()[0], 100.0);
        assert_eq!(axis.upper_edges()[3], 500.0);
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(matches!(
            AxisSpec::third_octave(500.0, 100.0).build(),
            Err(SeaError::InvalidRange { .. })
        ));
        assert!(matches!(
            AxisSpec::octave(0.0, 100.0).build(),
            Err(SeaError::InvalidRange { .. })
        ));
        assert!(matches!(
            AxisSpec::octave(-10.0, 100.0).build(),
            Err(SeaError::InvalidRange { .. })
        ));
        assert!(matches!(
            AxisSpec::linear(10.0, 100.0, 0).build(),
            Err(SeaError::InvalidRange { .. })
        ));
        assert!(matches!(
            AxisSpec::octave(1100.0, 1200.0).build(),
            Err(SeaError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_default_matches_built_axis() {
        let built = AxisSpec::default().build().unwrap();
        assert_eq!(FrequencyAxis::default(), built);
    }
}
