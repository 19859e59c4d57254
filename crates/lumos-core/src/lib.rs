//! Lumos Core - Value types exchanged between visualization applications
//!
//! Lumos carries small, self-describing values between processes: transfer
//! functions for volume rendering, histograms of the rendered data, clipping
//! planes, progress reports, encoded frames and cell selections.
//!
//! # Color Maps
//!
//! The centerpiece is [`ColorMap`], a four-channel transfer function. Each
//! channel is a piecewise-linear curve through its own control points, and a
//! renderer resamples it into a lookup table:
//!
//! ```text
//! control points ──► ColorMap::sample(count, min, max, empty) ──► [r g b a] × count
//!                                                   │
//!                                       u8 / u16 / u32 / f32 / f64
//! ```
//!
//! # Topics
//!
//! Every value type implements [`Topic`], giving it a stable type name and a
//! JSON form. `lumos-bus` uses both to route values between publishers and
//! subscribers.

pub mod clip_planes;
pub mod color_map;
pub mod control_point;
pub mod error;
pub mod events;
pub mod histogram;
pub mod image;
pub mod progress;
pub mod sample;
pub mod topic;

// Re-export commonly used types
pub use clip_planes::{Aabb, ClipPlanes, Plane};
pub use color_map::{Color, ColorMap, LoadPolicy, texture_sample_range};
pub use control_point::{Channel, ControlPoint, ControlPointSet};
pub use error::{CoreError, Result};
pub use events::{CellSetBinaryOp, CellSetBinaryOpType, SelectedIds, ToggleIdRequest};
pub use histogram::Histogram;
pub use image::ImageJpeg;
pub use progress::Progress;
pub use sample::SampleValue;
pub use topic::Topic;
