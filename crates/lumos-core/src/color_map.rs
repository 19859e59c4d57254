//! Four-channel, one-dimensional color maps defined by control points
//!
//! Each of the red, green, blue and alpha channels is an independent
//! piecewise-linear function over its own [`ControlPointSet`]. A color map is
//! queried by resampling every channel into `count` evenly spaced samples over
//! a position range:
//!
//! ```text
//!   value
//!     1 |            o
//!       |          /   \
//!       |   o----o       \
//!     0 +--------------------o----> position
//!         |<------ count samples ------>|
//!      range_min                   range_max
//! ```
//!
//! Positions outside the points of a channel produce the caller's empty value.

use crate::control_point::{Channel, ControlPoint, ControlPointSet};
use crate::error::{CoreError, Result};
use crate::sample::SampleValue;
use crate::topic::Topic;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// A four-channel color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color<T> {
    pub r: T,
    pub g: T,
    pub b: T,
    pub a: T,
}

impl<T: Copy> Color<T> {
    /// Create a new color
    pub const fn new(r: T, g: T, b: T, a: T) -> Self {
        Self { r, g, b, a }
    }

    /// Build from an RGBA slice of at least four elements
    pub fn from_slice(rgba: &[T]) -> Option<Self> {
        match rgba {
            [r, g, b, a, ..] => Some(Self::new(*r, *g, *b, *a)),
            _ => None,
        }
    }

    /// Convert to an RGBA array
    pub fn to_array(&self) -> [T; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Component for a channel
    pub fn get(&self, channel: Channel) -> T {
        match channel {
            Channel::Red => self.r,
            Channel::Green => self.g,
            Channel::Blue => self.b,
            Channel::Alpha => self.a,
        }
    }
}

/// How [`ColorMap::load`] reacts to a missing or unparseable file
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadPolicy {
    /// Report the failure to the caller
    Strict,
    /// Log a warning and use [`ColorMap::default_color_map`] over `min..=max`
    DefaultOnError { min: f32, max: f32 },
}

impl Default for LoadPolicy {
    fn default() -> Self {
        LoadPolicy::Strict
    }
}

/// Default ramp as (t, red, green, blue, alpha), t normalized to [0, 1]
const DEFAULT_RAMP: [(f32, f32, f32, f32, f32); 3] = [
    (0.0, 0.0, 0.0, 0.0, 0.0),
    (0.5, 1.0, 0.25, 0.0, 0.5),
    (1.0, 1.0, 1.0, 1.0, 1.0),
];

/// 4 channel, 1 dimensional color map defined with control points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorMap {
    red: ControlPointSet,
    green: ControlPointSet,
    blue: ControlPointSet,
    alpha: ControlPointSet,
}

impl ColorMap {
    /// Create a color map without control points
    pub fn new() -> Self {
        Self::default()
    }

    /// The canonical three point ramp per channel, scaled into `[min, max]`.
    ///
    /// | channel | t = 0 | t = 0.5 | t = 1 |
    /// |---------|-------|---------|-------|
    /// | red     | 0     | 1       | 1     |
    /// | green   | 0     | 0.25    | 1     |
    /// | blue    | 0     | 0       | 1     |
    /// | alpha   | 0     | 0.5     | 1     |
    pub fn default_color_map(min: f32, max: f32) -> Self {
        let mut color_map = Self::new();
        let range = max - min;
        for (t, r, g, b, a) in DEFAULT_RAMP {
            let position = min + t * range;
            color_map.add_control_point(ControlPoint::new(position, r), Channel::Red);
            color_map.add_control_point(ControlPoint::new(position, g), Channel::Green);
            color_map.add_control_point(ControlPoint::new(position, b), Channel::Blue);
            color_map.add_control_point(ControlPoint::new(position, a), Channel::Alpha);
        }
        color_map
    }

    /// Load a color map from a JSON file
    pub fn load(path: impl AsRef<Path>, policy: LoadPolicy) -> Result<Self> {
        let path = path.as_ref();

        match (Self::read_file(path), policy) {
            (Ok(color_map), _) => {
                debug!("Loaded color map from {}", path.display());
                Ok(color_map)
            }
            (Err(e), LoadPolicy::Strict) => Err(e),
            (Err(e), LoadPolicy::DefaultOnError { min, max }) => {
                warn!(
                    "Cannot load color map from {} ({}), using default",
                    path.display(),
                    e
                );
                Ok(Self::default_color_map(min, max))
            }
        }
    }

    fn read_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Write the color map as indented JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Control points of a channel
    pub fn channel(&self, channel: Channel) -> &ControlPointSet {
        match channel {
            Channel::Red => &self.red,
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
            Channel::Alpha => &self.alpha,
        }
    }

    /// Mutable control points of a channel
    pub fn channel_mut(&mut self, channel: Channel) -> &mut ControlPointSet {
        match channel {
            Channel::Red => &mut self.red,
            Channel::Green => &mut self.green,
            Channel::Blue => &mut self.blue,
            Channel::Alpha => &mut self.alpha,
        }
    }

    /// Add a control point to a channel, replacing the value of an existing
    /// point at the same position
    pub fn add_control_point(&mut self, point: impl Into<ControlPoint>, channel: Channel) {
        self.channel_mut(channel).insert(point.into());
    }

    /// Remove the control point at `position` from a channel
    pub fn remove_control_point(&mut self, position: f32, channel: Channel) -> bool {
        self.channel_mut(channel).remove(position)
    }

    /// True if there are no control points in any channel
    pub fn is_empty(&self) -> bool {
        Channel::ALL.iter().all(|&c| self.channel(c).is_empty())
    }

    /// Sort every channel that changed since its last sort
    pub fn ensure_sorted(&mut self) {
        for channel in Channel::ALL {
            self.channel_mut(channel).ensure_sorted();
        }
    }

    /// Sample every channel over its own full extent, filling channels without
    /// control points with zero
    pub fn sample_full<T: SampleValue>(&mut self, count: usize) -> Vec<Color<T>> {
        self.sample(count, f32::NEG_INFINITY, f32::INFINITY, T::zero())
    }

    /// Sample `count` colors evenly spaced over `[range_min, range_max]`.
    ///
    /// Passing `-inf` (or `f32::MIN`) / `+inf` (or `f32::MAX`) selects the
    /// first / last control point position of each channel. Samples outside
    /// a channel's control points are `empty`.
    pub fn sample<T: SampleValue>(
        &mut self,
        count: usize,
        range_min: f32,
        range_max: f32,
        empty: T,
    ) -> Vec<Color<T>> {
        let mut data = vec![empty; count * 4];
        self.fill_channels(&mut data, count, range_min, range_max, empty);
        data.chunks_exact(4)
            .filter_map(Color::from_slice)
            .collect()
    }

    /// Same as [`ColorMap::sample`], writing `r0,g0,b0,a0,r1,...` into `data`
    pub fn sample_into<T: SampleValue>(
        &mut self,
        data: &mut [T],
        count: usize,
        range_min: f32,
        range_max: f32,
        empty: T,
    ) -> Result<()> {
        let needed = count * 4;
        if data.len() < needed {
            return Err(CoreError::BufferTooSmall {
                needed,
                actual: data.len(),
            });
        }
        self.fill_channels(&mut data[..needed], count, range_min, range_max, empty);
        Ok(())
    }

    /// Same as [`ColorMap::sample_full`], writing into `data`
    pub fn sample_full_into<T: SampleValue>(&mut self, data: &mut [T], count: usize) -> Result<()> {
        self.sample_into(data, count, f32::NEG_INFINITY, f32::INFINITY, T::zero())
    }

    fn fill_channels<T: SampleValue>(
        &mut self,
        data: &mut [T],
        count: usize,
        range_min: f32,
        range_max: f32,
        empty: T,
    ) {
        self.ensure_sorted();
        for channel in Channel::ALL {
            sample_channel(
                self.channel(channel).points(),
                data,
                channel.index(),
                count,
                range_min,
                range_max,
                empty,
            );
        }
    }
}

impl Topic for ColorMap {
    const TYPE_NAME: &'static str = "lumos::render::ColorMap";
}

/// Texture coordinates of the first and last texel centers of a 1D texture
/// with `count` texels
pub fn texture_sample_range(count: usize) -> (f32, f32) {
    let diff = 1.0 / (count as f32 - 1.0);
    (diff, 1.0 - diff)
}

/// Resample one channel into slot `slot` of the interleaved `data`.
///
/// `points` must be sorted by position.
fn sample_channel<T: SampleValue>(
    points: &[ControlPoint],
    data: &mut [T],
    slot: usize,
    count: usize,
    range_min: f32,
    range_max: f32,
    empty: T,
) {
    let texels = data.chunks_exact_mut(4).take(count);

    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => {
            texels.for_each(|texel| texel[slot] = empty);
            return;
        }
    };

    // A single point is a constant, wherever it lies
    if points.len() == 1 {
        let value = T::from_normalized(first.value);
        texels.for_each(|texel| texel[slot] = value);
        return;
    }

    let lo = if range_min <= f32::MIN {
        first.position
    } else {
        range_min
    };
    let hi = if range_max >= f32::MAX {
        last.position
    } else {
        range_max
    };

    if lo.is_nan() || hi.is_nan() || hi < lo || hi < first.position || lo > last.position {
        texels.for_each(|texel| texel[slot] = empty);
        return;
    }

    let step = if count > 1 {
        (hi - lo) / (count - 1) as f32
    } else {
        0.0
    };

    let mut cursor = 0;
    for (i, texel) in texels.enumerate() {
        let x = if count > 1 && i == count - 1 {
            hi
        } else {
            lo + i as f32 * step
        };

        if x < first.position || x > last.position {
            texel[slot] = empty;
            continue;
        }

        // Land on the last point at or before x; skips equal positions
        while cursor + 1 < points.len() && points[cursor + 1].position <= x {
            cursor += 1;
        }

        let current = points[cursor];
        let value = match points.get(cursor + 1) {
            Some(next) => {
                let weight = (x - current.position) / (next.position - current.position);
                current.value * (1.0 - weight) + next.value * weight
            }
            None => current.value,
        };

        texel[slot] = T::from_normalized(value);
    }
}
