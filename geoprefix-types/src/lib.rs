//! # geoprefix-types
//!
//! Value types shared between the `geoprefix` spatial prefix tree and the
//! components that index or query with it:
//!
//! - **Context**: `SpatialContext`, the world bounds and distance units a tree
//!   is built against
//! - **Shapes**: `Shape` (point, rectangle, polygon) and `SpatialRelation`
//!
//! All types are serializable with Serde and built on top of the `geo` crate's
//! geometric primitives.
//!
//! ## Examples
//!
//! ```rust
//! use geoprefix_types::context::SpatialContext;
//! use geoprefix_types::shape::{Shape, SpatialRelation};
//! use geo::{Point, Rect, coord};
//!
//! let ctx = SpatialContext::geo();
//! assert_eq!(ctx.world_bounds().min().x, -180.0);
//!
//! let cell = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 10.0 });
//! let brest = Shape::Point(Point::new(5.0, 5.0));
//! assert_eq!(SpatialRelation::of_rect(&cell, &brest), SpatialRelation::Contains);
//! ```

pub mod context;
pub mod shape;

pub use geo;
