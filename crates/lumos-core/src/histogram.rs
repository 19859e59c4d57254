//! Binned value distribution of a data set

use crate::error::{CoreError, Result};
use crate::topic::Topic;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Histogram over `[min, max]` with equally sized bins
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Histogram {
    #[serde(serialize_with = "serialize_float", deserialize_with = "deserialize_float")]
    pub min: f32,
    #[serde(serialize_with = "serialize_float", deserialize_with = "deserialize_float")]
    pub max: f32,
    pub bins: Vec<u64>,
}

/// JSON has no representation for infinity, so non-finite bounds travel as text
fn serialize_float<S: Serializer>(value: &f32, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    if value.is_nan() {
        serializer.serialize_str("nan")
    } else if *value == f32::INFINITY {
        serializer.serialize_str("inf")
    } else if *value == f32::NEG_INFINITY {
        serializer.serialize_str("-inf")
    } else {
        serializer.serialize_f32(*value)
    }
}

fn deserialize_float<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FloatRepr {
        Number(f32),
        Text(String),
    }

    match FloatRepr::deserialize(deserializer)? {
        FloatRepr::Number(value) => Ok(value),
        FloatRepr::Text(text) => match text.as_str() {
            "inf" => Ok(f32::INFINITY),
            "-inf" => Ok(f32::NEG_INFINITY),
            "nan" => Ok(f32::NAN),
            other => Err(serde::de::Error::custom(format!(
                "expected a number, \"inf\", \"-inf\" or \"nan\", got \"{}\"",
                other
            ))),
        },
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            min: f32::INFINITY,
            max: f32::NEG_INFINITY,
            bins: Vec::new(),
        }
    }
}

impl Histogram {
    /// Create a histogram with `bin_count` zeroed bins and an empty range
    pub fn with_bins(bin_count: usize) -> Self {
        Self {
            bins: vec![0; bin_count],
            ..Default::default()
        }
    }

    /// Accumulate `other` into this histogram.
    ///
    /// An empty-binned operand is absorbed without error; otherwise both sides
    /// must have the same number of bins.
    pub fn add(&mut self, other: &Histogram) -> Result<()> {
        if other.bins.is_empty() {
            return Ok(());
        }
        if self.bins.is_empty() {
            *self = other.clone();
            return Ok(());
        }
        if self.bins.len() != other.bins.len() {
            return Err(CoreError::IncompatibleHistograms {
                left: self.bins.len(),
                right: other.bins.len(),
            });
        }

        for (bin, count) in self.bins.iter_mut().zip(&other.bins) {
            *bin = bin.saturating_add(*count);
        }
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        Ok(())
    }

    /// Index of the first smallest bin
    pub fn min_index(&self) -> Option<usize> {
        let smallest = self.bins.iter().min()?;
        self.bins.iter().position(|bin| bin == smallest)
    }

    /// Index of the first largest bin
    pub fn max_index(&self) -> Option<usize> {
        let largest = self.bins.iter().max()?;
        self.bins.iter().position(|bin| bin == largest)
    }

    /// True when no bin holds a count
    pub fn is_empty(&self) -> bool {
        self.bins.iter().all(|&bin| bin == 0)
    }

    /// Total count over all bins
    pub fn sum(&self) -> u64 {
        self.bins.iter().fold(0, |total: u64, &bin| total.saturating_add(bin))
    }

    pub fn range(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    /// Fraction of the total count in bin `index`
    pub fn ratio(&self, index: usize) -> f64 {
        let sum = self.sum();
        match self.bins.get(index) {
            Some(&bin) if sum > 0 => bin as f64 / sum as f64,
            _ => 0.0,
        }
    }

    /// Change the number of bins, keeping existing counts and zeroing new bins
    pub fn resize(&mut self, bin_count: usize) {
        self.bins.resize(bin_count, 0);
    }

    /// Polyline of the bins in `range` (fractions of the bin array) for drawing.
    ///
    /// X runs over `[0, 1)`, y is inverted so the peak bin touches 0. With
    /// `log_scale` counts are compared by their natural logarithm.
    pub fn sample_curve(&self, log_scale: bool, range: (f32, f32)) -> Vec<[f32; 2]> {
        if self.is_empty() {
            return Vec::new();
        }

        let peak = self.bins.iter().copied().max().unwrap_or(0) as f32;
        let scale = if log_scale {
            1.0 / peak.ln()
        } else {
            1.0 / peak
        };

        let len = self.bins.len() as f32;
        let count = (len * (range.1 - range.0)).ceil().max(0.0) as usize;
        let offset = (len * range.0).floor().max(0.0) as usize;

        self.bins
            .iter()
            .skip(offset)
            .take(count)
            .enumerate()
            .map(|(i, &bin)| {
                let value = if log_scale {
                    (bin.max(1) as f32).ln()
                } else {
                    bin as f32
                };
                [i as f32 / count as f32, 1.0 - scale * value]
            })
            .collect()
    }
}

impl PartialEq for Histogram {
    fn eq(&self, other: &Self) -> bool {
        self.min == other.min && self.max == other.max && self.bins == other.bins
    }
}

impl Topic for Histogram {
    const TYPE_NAME: &'static str = "lumos::data::Histogram";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_histogram() -> Histogram {
        Histogram {
            min: -1.0,
            max: 3.0,
            bins: vec![10, 5, 0, 5],
        }
    }

    fn assert_curve(actual: &[[f32; 2]], expected: &[[f32; 2]]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a[0] - e[0]).abs() < 1e-5, "{:?} != {:?}", a, e);
            assert!((a[1] - e[1]).abs() < 1e-5, "{:?} != {:?}", a, e);
        }
    }

    #[test]
    fn test_default() {
        let histogram = Histogram::default();
        assert_eq!(histogram.range(), (f32::INFINITY, f32::NEG_INFINITY));
        assert!(histogram.is_empty());
        assert_eq!(histogram.min_index(), None);
        assert_eq!(histogram.max_index(), None);
    }

    #[test]
    fn test_add() {
        let mut histogram = create_histogram();
        let other = Histogram {
            min: -2.0,
            max: 1.0,
            bins: vec![1, 1, 1, 1],
        };

        histogram.add(&other).unwrap();
        assert_eq!(histogram.bins, vec![11, 6, 1, 6]);
        assert_eq!(histogram.range(), (-2.0, 3.0));
        assert_eq!(histogram.sum(), 24);
    }

    #[test]
    fn test_add_empty_operands() {
        let mut histogram = Histogram::default();
        histogram.add(&create_histogram()).unwrap();
        assert_eq!(histogram, create_histogram());

        histogram.add(&Histogram::default()).unwrap();
        assert_eq!(histogram, create_histogram());
    }

    #[test]
    fn test_add_incompatible() {
        let mut histogram = create_histogram();
        let result = histogram.add(&Histogram::with_bins(3));
        assert!(matches!(
            result,
            Err(CoreError::IncompatibleHistograms { left: 4, right: 3 })
        ));
    }

    #[test]
    fn test_min_max_index() {
        let histogram = Histogram {
            bins: vec![3, 1, 7, 1, 7],
            ..Default::default()
        };
        assert_eq!(histogram.min_index(), Some(1));
        assert_eq!(histogram.max_index(), Some(2));
    }

    #[test]
    fn test_ratio_and_resize() {
        let mut histogram = create_histogram();
        assert_eq!(histogram.ratio(0), 0.5);
        assert_eq!(histogram.ratio(2), 0.0);
        assert_eq!(histogram.ratio(17), 0.0);

        histogram.resize(6);
        assert_eq!(histogram.bins, vec![10, 5, 0, 5, 0, 0]);
        assert_eq!(histogram.ratio(0), 0.5);

        histogram.resize(2);
        assert_eq!(histogram.bins, vec![10, 5]);

        histogram.resize(0);
        assert!(histogram.bins.is_empty());
        assert_eq!(histogram.ratio(0), 0.0);
    }

    #[test]
    fn test_add_saturates() {
        let mut histogram = Histogram {
            bins: vec![u64::MAX - 1, 2],
            ..Default::default()
        };
        let other = Histogram {
            bins: vec![5, 3],
            ..Default::default()
        };
        histogram.add(&other).unwrap();
        assert_eq!(histogram.bins, vec![u64::MAX, 5]);
        assert_eq!(histogram.sum(), u64::MAX);
    }

    #[test]
    fn test_sample_curve_linear() {
        let curve = create_histogram().sample_curve(false, (0.0, 1.0));
        assert_curve(
            &curve,
            &[[0.0, 0.0], [0.25, 0.5], [0.5, 1.0], [0.75, 0.5]],
        );
    }

    #[test]
    fn test_sample_curve_log() {
        let curve = create_histogram().sample_curve(true, (0.0, 1.0));
        assert_curve(
            &curve,
            &[[0.0, 0.0], [0.25, 0.30103], [0.5, 1.0], [0.75, 0.30103]],
        );
    }

    #[test]
    fn test_sample_curve_partial_range() {
        let curve = create_histogram().sample_curve(false, (0.3, 0.7));
        assert_curve(&curve, &[[0.0, 0.5], [0.5, 1.0]]);
    }

    #[test]
    fn test_sample_curve_empty() {
        assert!(Histogram::with_bins(4).sample_curve(false, (0.0, 1.0)).is_empty());
    }

    #[test]
    fn test_json_default_bounds() {
        let json = Histogram::default().to_json().unwrap();
        assert_eq!(json, r#"{"min":"inf","max":"-inf","bins":[]}"#);

        let decoded = Histogram::from_json(&json).unwrap();
        assert_eq!(decoded, Histogram::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let histogram = create_histogram();
        let decoded = Histogram::from_json(&histogram.to_json().unwrap()).unwrap();
        assert_eq!(decoded, histogram);

        assert!(Histogram::from_json(r#"{"min":"huge","max":1.0,"bins":[]}"#).is_err());
    }
}
