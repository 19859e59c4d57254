//! Control points and per-channel control point sets
//!
//! A [`ControlPointSet`] keeps its points in insertion order and sorts them
//! lazily: mutations mark the set dirty, [`ControlPointSet::ensure_sorted`]
//! restores the order before anything that depends on it.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A knot of a piecewise-linear channel function
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    /// Position along the mapped domain
    #[serde(rename = "x")]
    pub position: f32,
    /// Channel value at this position
    #[serde(rename = "y")]
    pub value: f32,
}

impl ControlPoint {
    /// Create a new control point
    pub const fn new(position: f32, value: f32) -> Self {
        Self { position, value }
    }

    fn same_position(&self, position: f32) -> bool {
        self.position.to_bits() == canonical_position(position).to_bits()
    }
}

/// `-0.0` and `0.0` name the same position
fn canonical_position(position: f32) -> f32 {
    if position == 0.0 { 0.0 } else { position }
}

impl From<(f32, f32)> for ControlPoint {
    fn from((position, value): (f32, f32)) -> Self {
        Self::new(position, value)
    }
}

/// Color channel selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Red = 0,
    Green = 1,
    Blue = 2,
    Alpha = 3,
}

impl Channel {
    /// All channels in RGBA order
    pub const ALL: [Channel; 4] = [Channel::Red, Channel::Green, Channel::Blue, Channel::Alpha];

    /// Slot of this channel in an interleaved RGBA buffer
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lowercase channel name
    pub fn name(self) -> &'static str {
        match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
            Channel::Alpha => "alpha",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for Channel {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Channel::Red),
            1 => Ok(Channel::Green),
            2 => Ok(Channel::Blue),
            3 => Ok(Channel::Alpha),
            other => Err(CoreError::UnsupportedChannel(other.to_string())),
        }
    }
}

impl FromStr for Channel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "red" | "r" => Ok(Channel::Red),
            "green" | "g" => Ok(Channel::Green),
            "blue" | "b" => Ok(Channel::Blue),
            "alpha" | "a" => Ok(Channel::Alpha),
            _ => Err(CoreError::UnsupportedChannel(s.to_string())),
        }
    }
}

/// Control points of a single channel.
///
/// At most one point is retained per position. Serialized as a plain array of
/// `{"x", "y"}` objects.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(from = "Vec<ControlPoint>", into = "Vec<ControlPoint>")]
pub struct ControlPointSet {
    points: Vec<ControlPoint>,
    dirty: bool,
}

impl ControlPointSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a point, or overwrite the value of the point at the same position.
    ///
    /// Overwriting keeps the order intact and does not mark the set dirty.
    /// Points at a NaN position are ignored.
    pub fn insert(&mut self, point: ControlPoint) {
        if point.position.is_nan() {
            return;
        }
        let point = ControlPoint::new(canonical_position(point.position), point.value);

        if let Some(existing) = self
            .points
            .iter_mut()
            .find(|p| p.same_position(point.position))
        {
            existing.value = point.value;
            return;
        }

        self.points.push(point);
        self.dirty = true;
    }

    /// Remove the first point at `position`. Returns whether a point was removed.
    pub fn remove(&mut self, position: f32) -> bool {
        match self.points.iter().position(|p| p.same_position(position)) {
            Some(index) => {
                self.points.remove(index);
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Find the point at exactly `position`
    pub fn get(&self, position: f32) -> Option<&ControlPoint> {
        self.points.iter().find(|p| p.same_position(position))
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the set has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the points need sorting before the next ordered read
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Remove all points
    pub fn clear(&mut self) {
        self.points.clear();
        self.dirty = false;
    }

    /// Sort by position if the set changed since the last sort
    pub fn ensure_sorted(&mut self) {
        if !self.dirty {
            return;
        }
        // Stable, so equal positions keep their write order
        self.points
            .sort_by(|a, b| a.position.total_cmp(&b.position));
        self.dirty = false;
    }

    /// Points ordered by position
    pub fn sorted(&mut self) -> &[ControlPoint] {
        self.ensure_sorted();
        &self.points
    }

    /// Points in their current internal order
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    /// Smallest and largest position, `None` when empty
    pub fn range(&mut self) -> Option<(f32, f32)> {
        let points = self.sorted();
        match (points.first(), points.last()) {
            (Some(first), Some(last)) => Some((first.position, last.position)),
            _ => None,
        }
    }
}

impl Clone for ControlPointSet {
    fn clone(&self) -> Self {
        Self {
            points: self.points.clone(),
            dirty: true,
        }
    }
}

impl PartialEq for ControlPointSet {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl From<Vec<ControlPoint>> for ControlPointSet {
    fn from(points: Vec<ControlPoint>) -> Self {
        let mut set = ControlPointSet::new();
        for point in points {
            set.insert(point);
        }
        set.dirty = true;
        set
    }
}

impl From<ControlPointSet> for Vec<ControlPoint> {
    fn from(set: ControlPointSet) -> Self {
        set.points
    }
}

impl FromIterator<ControlPoint> for ControlPointSet {
    fn from_iter<I: IntoIterator<Item = ControlPoint>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}
