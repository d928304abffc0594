//! Geohash spatial prefix tree: the Earth decomposed into nested cells
//! addressed by variable-length tokens.
//!
//! A cell's token is a prefix of every token beneath it, so indexing a point
//! or shape at several precisions lets range and proximity queries run as
//! token-prefix matches.
//!
//! ```rust
//! use geoprefix::prelude::*;
//!
//! let tree = GeohashPrefixTree::new(SpatialContext::geo(), 12)?;
//!
//! let level = tree.level_for_distance(0.01);
//! let cell = tree.cell_at(&Point::new(-74.0060, 40.7128), level)?;
//! assert_eq!(cell.level(), level);
//!
//! // Tokens round-trip through raw bytes without touching the codec
//! let same = tree.cell_from_bytes(cell.token_bytes());
//! assert_eq!(same, cell);
//! # Ok::<(), geoprefix::PrefixTreeError>(())
//! ```

pub mod cell;
pub mod codec;
pub mod config;
pub mod error;
pub mod factory;
pub mod geohash_tree;
pub mod tree;

#[cfg(feature = "geojson")]
pub mod geojson;

pub use cell::{Cell, CellToken, LEAF_BYTE};
pub use codec::GeohashCodec;
pub use config::PrefixTreeConfig;
pub use error::{PrefixTreeError, Result};
pub use factory::{GeohashPrefixTreeFactory, SpatialPrefixTreeFactory, make_tree};
pub use geohash_tree::{GeohashCell, GeohashPrefixTree};
pub use tree::SpatialPrefixTree;

pub use geo::{Point, Polygon, Rect};
pub use geoprefix_types::context::SpatialContext;
pub use geoprefix_types::shape::{Shape, SpatialRelation};

#[cfg(feature = "geojson")]
pub use crate::geojson::cells_to_geojson;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Cell, GeohashPrefixTree, Result, SpatialPrefixTree};

    pub use crate::{GeohashPrefixTreeFactory, PrefixTreeConfig, SpatialPrefixTreeFactory};

    pub use crate::{Shape, SpatialContext, SpatialRelation};

    pub use geo::{Point, Polygon, Rect};
}
