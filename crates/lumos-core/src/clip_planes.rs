//! Clipping planes for volume rendering

use crate::topic::Topic;
use serde::{Deserialize, Serialize};

/// Plane `normal · p + d = 0`. Points with a negative distance are clipped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub normal: [f32; 3],
    pub d: f32,
}

impl Plane {
    pub const fn new(normal: [f32; 3], d: f32) -> Self {
        Self { normal, d }
    }

    /// Signed distance of `point` (for a unit normal)
    pub fn distance(&self, point: [f32; 3]) -> f32 {
        dot(self.normal, point) + self.d
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Aabb {
    pub const fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> [f32; 3] {
        [0, 1, 2].map(|k| (self.min[k] + self.max[k]) * 0.5)
    }

    pub fn half_extent(&self) -> [f32; 3] {
        [0, 1, 2].map(|k| (self.max[k] - self.min[k]) * 0.5)
    }
}

fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Set of clipping planes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipPlanes {
    pub planes: Vec<Plane>,
}

impl Default for ClipPlanes {
    /// The six faces of the unit cube centered at the origin
    fn default() -> Self {
        let planes = [
            [-1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, -1.0],
            [0.0, 0.0, 1.0],
        ]
        .into_iter()
        .map(|normal| Plane::new(normal, 0.5))
        .collect();

        Self { planes }
    }
}

impl ClipPlanes {
    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    /// Remove all planes
    pub fn clear(&mut self) {
        self.planes.clear();
    }

    /// Restore the unit cube planes
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// True if the box lies entirely on the clipped side of any plane
    pub fn is_outside(&self, aabb: &Aabb) -> bool {
        let center = aabb.center();
        let half = aabb.half_extent();

        self.planes.iter().any(|plane| {
            let c = plane.distance(center);
            let r: f32 = (0..3).map(|k| plane.normal[k].abs() * half[k]).sum();
            c - r < 0.0 && c + r <= 0.0
        })
    }
}

impl Topic for ClipPlanes {
    const TYPE_NAME: &'static str = "lumos::render::ClipPlanes";
}
