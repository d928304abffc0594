//! Cells: the nodes of a spatial prefix tree.
//!
//! A cell is identified by its token, the byte string spelling the path from
//! the root. A token may end in [`LEAF_BYTE`], marking the cell as an exact
//! match rather than an approximation that needs refining. The marker never
//! changes the cell's level or shape.

use crate::error::Result;
use geo::{Point, Rect};
use geoprefix_types::shape::{Shape, SpatialRelation};
use smallvec::SmallVec;
use std::fmt;

/// Trailing byte marking a leaf token.
pub const LEAF_BYTE: u8 = b'+';

/// Inline capacity of a token. Covers the longest geohash plus the leaf marker.
const INLINE_TOKEN_LEN: usize = 16;

/// The byte identity of a cell.
///
/// Stored inline, so setting the leaf marker or resetting to another token
/// of ordinary length never allocates.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellToken {
    bytes: SmallVec<[u8; INLINE_TOKEN_LEN]>,
}

impl CellToken {
    /// Copies a raw token, leaf marker included if present.
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: SmallVec::from_slice(bytes),
        }
    }

    /// Copies a token while keeping one spare byte for a later leaf marker.
    pub fn with_leaf_slot(bytes: &[u8]) -> Self {
        let mut token = SmallVec::with_capacity(bytes.len() + 1);
        token.extend_from_slice(bytes);
        Self { bytes: token }
    }

    /// Tree depth: the token length without the leaf marker.
    pub fn level(&self) -> usize {
        self.bytes_no_leaf().len()
    }

    pub fn is_leaf(&self) -> bool {
        self.bytes.last() == Some(&LEAF_BYTE)
    }

    /// Appends the leaf marker unless already present.
    pub fn set_leaf(&mut self) {
        if !self.is_leaf() {
            self.bytes.push(LEAF_BYTE);
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bytes_no_leaf(&self) -> &[u8] {
        match self.bytes.split_last() {
            Some((&LEAF_BYTE, rest)) => rest,
            _ => self.bytes.as_slice(),
        }
    }

    /// Repoints this token at new bytes, reusing the existing storage.
    pub fn reset(&mut self, bytes: &[u8]) {
        self.bytes.clear();
        self.bytes.extend_from_slice(bytes);
    }

    /// Whether this token names `other` or one of its ancestors.
    pub fn is_prefix_of(&self, other: &CellToken) -> bool {
        other.bytes_no_leaf().starts_with(self.bytes_no_leaf())
    }
}

impl fmt::Debug for CellToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CellToken({:?})", String::from_utf8_lossy(&self.bytes))
    }
}

impl fmt::Display for CellToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

/// One node of a spatial prefix tree.
///
/// Cells are short-lived values with a single owner. Implementations may
/// cache derived state (decoded token, shape) lazily; [`Cell::reset`] must
/// drop those caches. A cell is not meant to be shared across threads while
/// it is being reset.
pub trait Cell: Clone + Sized {
    fn token(&self) -> &CellToken;

    /// Token length excluding the leaf marker.
    fn level(&self) -> usize {
        self.token().level()
    }

    fn is_leaf(&self) -> bool {
        self.token().is_leaf()
    }

    fn token_bytes(&self) -> &[u8] {
        self.token().as_bytes()
    }

    fn token_bytes_no_leaf(&self) -> &[u8] {
        self.token().bytes_no_leaf()
    }

    /// Whether this cell is `other` or one of its ancestors.
    fn is_prefix_of<C: Cell>(&self, other: &C) -> bool {
        self.token().is_prefix_of(other.token())
    }

    /// Marks this cell as an exact match.
    fn set_leaf(&mut self);

    /// How this cell relates to the shape it was filtered against, if any.
    fn shape_rel(&self) -> Option<SpatialRelation>;

    fn set_shape_rel(&mut self, rel: SpatialRelation);

    /// All children, in the tree's fixed sort order. Empty for a leaf.
    fn sub_cells(&self) -> Result<Vec<Self>>;

    /// Number of children of a non-leaf cell.
    fn sub_cells_size(&self) -> usize;

    /// The child containing `point`.
    ///
    /// Re-encodes the whole point rather than descending one level, so avoid
    /// it in hot loops.
    fn sub_cell(&self, point: &Point<f64>) -> Result<Self>;

    /// Rectangle covering every point reachable by extending this token.
    fn shape(&self) -> Result<Rect<f64>>;

    fn center(&self) -> Result<Point<f64>>;

    /// Repoints this cell at another token and clears all cached state.
    fn reset(&mut self, bytes: &[u8]);

    /// Children that intersect `filter`, each tagged with its relation.
    ///
    /// A point filter yields only the child containing it. Children lying
    /// entirely within the filter come back as leaves.
    fn sub_cells_within(&self, filter: &Shape) -> Result<Vec<Self>> {
        if self.is_leaf() {
            return Ok(Vec::new());
        }

        if let Shape::Point(point) = filter {
            let mut cell = self.sub_cell(point)?;
            cell.set_shape_rel(SpatialRelation::Contains);
            return Ok(vec![cell]);
        }

        let mut cells = Vec::with_capacity(self.sub_cells_size());
        for mut cell in self.sub_cells()? {
            let rel = SpatialRelation::of_rect(&cell.shape()?, filter);
            if rel == SpatialRelation::Disjoint {
                continue;
            }
            cell.set_shape_rel(rel);
            if rel == SpatialRelation::Within {
                cell.set_leaf();
            }
            cells.push(cell);
        }
        Ok(cells)
    }
}
