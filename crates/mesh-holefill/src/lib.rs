//! Advancing-front hole filling for triangle meshes.
//!
//! Given a closed boundary loop of an open hole, this crate triangulates a
//! patch that stitches to the loop without introducing new boundary edges:
//!
//! - **Classification**: every boundary corner is bucketed by its interior
//!   angle into one of three construction rules (or set aside as reflex)
//! - **Advancing front**: the most urgent rule is applied repeatedly,
//!   shrinking the boundary until 3 or 4 vertices remain and the hole is
//!   closed directly
//! - **Quality control**: candidate triangles are rejected when they would
//!   pierce the patch built so far (optionally the surrounding mesh too),
//!   and created vertices closer than a threshold are merged
//!
//! # Example
//!
//! ```
//! use nalgebra::Point3;
//! use mesh_holefill::{fill_hole, FillParams};
//!
//! let hole = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//!
//! let outcome = fill_hole(&hole, None, &FillParams::default()).unwrap();
//! assert!(outcome.report.completed);
//! assert_eq!(outcome.filling.face_count(), 2);
//! ```

mod error;
mod types;

pub mod angle;
pub mod fill;
pub mod front;
pub mod geometry;
pub mod queue;

// Re-export core types at crate root
pub use error::{FillError, FillResult};
pub use types::{Filling, Mesh, Triangle, Vertex};

// Re-export the fill entry points
pub use fill::{fill_hole, CollisionTest, FillOutcome, FillParams, FillReport};
