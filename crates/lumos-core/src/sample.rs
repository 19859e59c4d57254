//! Output element types for color map sampling
//!
//! Sampling produces either floating point values, written as they are, or
//! fixed-width unsigned integers, scaled from the normalized value by the
//! type's maximum. See [`SampleValue::from_normalized`].

use num_traits::{Bounded, Zero};
use std::fmt::Debug;

/// Trait for types a [`ColorMap`](crate::ColorMap) can be sampled into.
pub trait SampleValue:
    Copy + Debug + PartialEq + PartialOrd + Bounded + Zero + Send + Sync + 'static
{
    /// Whether this type is a floating point type
    fn is_float() -> bool;

    /// Largest representable value, as f32
    fn max_as_f32() -> f32;

    /// Plain `as` cast from f32 (truncates toward zero, saturates)
    fn cast_from(value: f32) -> Self;

    /// Convert an interpolated control-point value into this type.
    ///
    /// Floats are written unconverted. Integers are `value * MAX` truncated
    /// toward zero; values outside `[0, 1]` are not clamped first.
    fn from_normalized(value: f32) -> Self {
        if Self::is_float() {
            Self::cast_from(value)
        } else {
            Self::cast_from(value * Self::max_as_f32())
        }
    }
}

macro_rules! impl_sample_value_int {
    ($t:ty) => {
        impl SampleValue for $t {
            fn is_float() -> bool {
                false
            }

            fn max_as_f32() -> f32 {
                <$t>::MAX as f32
            }

            fn cast_from(value: f32) -> Self {
                value as $t
            }
        }
    };
}

macro_rules! impl_sample_value_float {
    ($t:ty) => {
        impl SampleValue for $t {
            fn is_float() -> bool {
                true
            }

            fn max_as_f32() -> f32 {
                f32::MAX
            }

            fn cast_from(value: f32) -> Self {
                value as $t
            }
        }
    };
}

impl_sample_value_int!(u8);
impl_sample_value_int!(u16);
impl_sample_value_int!(u32);
impl_sample_value_float!(f32);
impl_sample_value_float!(f64);
