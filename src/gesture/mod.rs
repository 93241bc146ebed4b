//! Pinch-zoom and pan for image surfaces.
//!
//! - `Transform` / `ViewportGeometry` - fit-to-view math and immutable transforms
//! - `GestureEngine` - touch sample state machine producing transforms and taps

pub mod engine;
pub mod transform;

pub use engine::*;
pub use transform::*;
