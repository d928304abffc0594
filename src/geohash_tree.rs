//! Geohash realization of the spatial prefix tree.
//!
//! Each cell token is a geohash; each level appends one base-32 character,
//! so every cell has 32 children (alternating 8×4 and 4×8 splits, hidden
//! inside the codec). All geohash work goes through [`GeohashCodec`].

use crate::cell::{Cell, CellToken};
use crate::codec::GeohashCodec;
use crate::error::{PrefixTreeError, Result};
use crate::tree::SpatialPrefixTree;
use geo::{Point, Rect};
use geoprefix_types::context::SpatialContext;
use geoprefix_types::shape::SpatialRelation;
use once_cell::unsync::OnceCell;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A spatial prefix tree whose cells are geohashes.
///
/// # Examples
///
/// ```rust
/// use geoprefix::{Cell, GeohashPrefixTree, SpatialContext, SpatialPrefixTree};
/// use geo::Point;
///
/// let tree = GeohashPrefixTree::new(SpatialContext::geo(), 12)?;
///
/// // Point is (lon, lat)
/// let cell = tree.cell_at(&Point::new(-4.329, 48.669), 5)?;
/// assert_eq!(cell.token_bytes(), b"gbsuv");
///
/// let children = cell.sub_cells()?;
/// assert_eq!(children.len(), 32);
/// assert!(children.iter().all(|c| c.token_bytes().starts_with(b"gbsuv")));
/// # Ok::<(), geoprefix::PrefixTreeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct GeohashPrefixTree {
    ctx: SpatialContext,
    max_levels: usize,
}

impl GeohashPrefixTree {
    /// Creates a tree over `ctx` with cells down to `max_levels`.
    ///
    /// Fails with [`PrefixTreeError::InvalidWorldBounds`] unless the world
    /// bounds start at longitude -180, and with
    /// [`PrefixTreeError::InvalidLevelCount`] unless `max_levels` lies in
    /// `[1, GeohashPrefixTree::max_levels_possible()]`.
    pub fn new(ctx: SpatialContext, max_levels: usize) -> Result<Self> {
        let bounds = ctx.world_bounds();
        if bounds.min().x != -180.0 {
            return Err(PrefixTreeError::InvalidWorldBounds(*bounds));
        }

        let max_possible = Self::max_levels_possible();
        if !(1..=max_possible).contains(&max_levels) {
            return Err(PrefixTreeError::InvalidLevelCount {
                max: max_possible,
                got: max_levels,
            });
        }

        log::debug!("Created geohash prefix tree with {} levels", max_levels);
        Ok(Self { ctx, max_levels })
    }

    /// Deepest level any geohash tree supports: the longest hash the
    /// `geohash` crate can encode and decode.
    pub fn max_levels_possible() -> usize {
        GeohashCodec::MAX_PRECISION
    }

    /// A cell from a geohash string, optionally ending in the leaf marker.
    ///
    /// Validated lazily, like [`SpatialPrefixTree::cell_from_bytes`].
    pub fn cell_from_geohash(&self, geohash: &str) -> GeohashCell {
        self.cell_from_bytes(geohash.as_bytes())
    }

    fn cell(&self, geohash: String) -> GeohashCell {
        GeohashCell::from_geohash(geohash, self.max_levels)
    }
}

impl SpatialPrefixTree for GeohashPrefixTree {
    type Cell = GeohashCell;

    fn context(&self) -> &SpatialContext {
        &self.ctx
    }

    fn max_levels(&self) -> usize {
        self.max_levels
    }

    fn level_for_distance(&self, dist: f64) -> usize {
        if dist == 0.0 {
            return self.max_levels;
        }
        let level = GeohashCodec::level_for_width_height(dist, dist);
        level.clamp(1, self.max_levels)
    }

    fn world_cell(&self) -> GeohashCell {
        self.cell(String::new())
    }

    fn cell_at(&self, point: &Point<f64>, level: usize) -> Result<GeohashCell> {
        encode_cell(point, level, self.max_levels)
    }

    fn cell_from_bytes(&self, bytes: &[u8]) -> GeohashCell {
        GeohashCell::from_bytes(bytes, self.max_levels)
    }
}

fn encode_cell(point: &Point<f64>, level: usize, max_levels: usize) -> Result<GeohashCell> {
    if level > max_levels {
        return Err(PrefixTreeError::InvalidLevel {
            level,
            max: max_levels,
        });
    }
    if level == 0 {
        return Ok(GeohashCell::from_geohash(String::new(), max_levels));
    }
    // Geohash takes (lat, lon); points are (x = lon, y = lat)
    let geohash = GeohashCodec::encode(point.y(), point.x(), level)?;
    Ok(GeohashCell::from_geohash(geohash, max_levels))
}

/// A geohash cell.
///
/// The decoded geohash string and the cell rectangle are computed on first
/// use and kept until [`Cell::reset`]. The caches make a cell `Send` but not
/// `Sync`: give each thread its own cells.
#[derive(Debug, Clone)]
pub struct GeohashCell {
    token: CellToken,
    max_levels: usize,
    // Never holds the leaf marker
    geohash: OnceCell<String>,
    shape: OnceCell<Rect<f64>>,
    shape_rel: Option<SpatialRelation>,
}

impl GeohashCell {
    /// `geohash` must come from the codec: valid and without a leaf marker.
    fn from_geohash(geohash: String, max_levels: usize) -> Self {
        Self {
            token: CellToken::with_leaf_slot(geohash.as_bytes()),
            max_levels,
            geohash: OnceCell::with_value(geohash),
            shape: OnceCell::new(),
            shape_rel: None,
        }
    }

    fn from_bytes(bytes: &[u8], max_levels: usize) -> Self {
        Self {
            token: CellToken::new(bytes),
            max_levels,
            geohash: OnceCell::new(),
            shape: OnceCell::new(),
            shape_rel: None,
        }
    }

    /// The geohash this cell stands for, without any leaf marker.
    pub fn geohash(&self) -> Result<&str> {
        self.geohash
            .get_or_try_init(|| {
                let bytes = self.token.bytes_no_leaf();
                if bytes.len() > GeohashCodec::MAX_PRECISION {
                    return Err(PrefixTreeError::invalid_token(
                        bytes,
                        format!("longer than {} characters", GeohashCodec::MAX_PRECISION),
                    ));
                }
                if let Some(&bad) = bytes.iter().find(|&&b| !GeohashCodec::is_valid_byte(b)) {
                    return Err(PrefixTreeError::invalid_token(
                        bytes,
                        format!("byte {:#04x} is not a geohash character", bad),
                    ));
                }
                // Geohash characters are ASCII
                Ok(String::from_utf8_lossy(bytes).into_owned())
            })
            .map(String::as_str)
    }
}

impl Cell for GeohashCell {
    fn token(&self) -> &CellToken {
        &self.token
    }

    fn set_leaf(&mut self) {
        self.token.set_leaf();
    }

    fn shape_rel(&self) -> Option<SpatialRelation> {
        self.shape_rel
    }

    fn set_shape_rel(&mut self, rel: SpatialRelation) {
        self.shape_rel = Some(rel);
    }

    fn sub_cells(&self) -> Result<Vec<Self>> {
        if self.is_leaf() {
            return Ok(Vec::new());
        }
        if self.level() >= GeohashCodec::MAX_PRECISION {
            return Err(PrefixTreeError::InvalidLevel {
                level: self.level() + 1,
                max: GeohashCodec::MAX_PRECISION,
            });
        }
        let children = GeohashCodec::children(self.geohash()?);
        Ok(children
            .into_iter()
            .map(|hash| Self::from_geohash(hash, self.max_levels))
            .collect())
    }

    fn sub_cells_size(&self) -> usize {
        GeohashCodec::FAN_OUT
    }

    fn sub_cell(&self, point: &Point<f64>) -> Result<Self> {
        encode_cell(point, self.level() + 1, self.max_levels)
    }

    fn shape(&self) -> Result<Rect<f64>> {
        self.shape
            .get_or_try_init(|| GeohashCodec::decode_boundary(self.geohash()?))
            .copied()
    }

    fn center(&self) -> Result<Point<f64>> {
        GeohashCodec::decode(self.geohash()?)
    }

    fn reset(&mut self, bytes: &[u8]) {
        self.token.reset(bytes);
        self.geohash.take();
        self.shape.take();
        self.shape_rel = None;
    }
}

impl PartialEq for GeohashCell {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl Eq for GeohashCell {}

impl PartialOrd for GeohashCell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GeohashCell {
    fn cmp(&self, other: &Self) -> Ordering {
        self.token.cmp(&other.token)
    }
}

impl Hash for GeohashCell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.token.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    fn tree(max_levels: usize) -> GeohashPrefixTree {
        GeohashPrefixTree::new(SpatialContext::geo(), max_levels).unwrap()
    }

    fn brest() -> Point<f64> {
        Point::new(-4.329, 48.669)
    }

    #[test]
    fn test_rejects_world_bounds_not_starting_at_dateline() {
        let ctx = SpatialContext::cartesian(Rect::new(
            coord! { x: 0.0, y: -90.0 },
            coord! { x: 360.0, y: 90.0 },
        ));
        let err = GeohashPrefixTree::new(ctx, 12).unwrap_err();
        assert!(matches!(err, PrefixTreeError::InvalidWorldBounds(_)));
    }

    #[test]
    fn test_rejects_level_counts_out_of_range() {
        let max = GeohashPrefixTree::max_levels_possible();
        for bad in [0, max + 1] {
            let err = GeohashPrefixTree::new(SpatialContext::geo(), bad).unwrap_err();
            assert!(matches!(
                err,
                PrefixTreeError::InvalidLevelCount { got, .. } if got == bad
            ));
        }
        assert!(GeohashPrefixTree::new(SpatialContext::geo(), 1).is_ok());
        assert!(GeohashPrefixTree::new(SpatialContext::geo(), max).is_ok());
    }

    #[test]
    fn test_cell_level_matches_request() {
        let tree = tree(12);
        for level in 1..=12 {
            let cell = tree.cell_at(&brest(), level).unwrap();
            assert_eq!(cell.level(), level);
            assert_eq!(cell.token_bytes().len(), level);
            assert!(!cell.is_leaf());
        }
    }

    #[test]
    fn test_cell_level_above_max_is_rejected() {
        let tree = tree(6);
        assert!(matches!(
            tree.cell_at(&brest(), 7),
            Err(PrefixTreeError::InvalidLevel { level: 7, max: 6 })
        ));
    }

    #[test]
    fn test_cell_at_level_zero_is_world() {
        let tree = tree(6);
        let cell = tree.cell_at(&brest(), 0).unwrap();
        assert_eq!(cell, tree.world_cell());
        assert_eq!(cell.shape().unwrap(), *SpatialContext::geo().world_bounds());
    }

    #[test]
    fn test_cell_reserves_leaf_slot() {
        let tree = tree(12);
        let mut cell = tree.cell_at(&brest(), 12).unwrap();
        cell.set_leaf();
        assert_eq!(cell.level(), 12);
        assert!(cell.is_leaf());
        assert_eq!(cell.geohash().unwrap().len(), 12);
    }

    #[test]
    fn test_brest_scenario() {
        let tree = tree(12);
        let cell = tree.cell_at(&brest(), 5).unwrap();
        assert_eq!(cell.geohash().unwrap(), "gbsuv");

        let children = cell.sub_cells().unwrap();
        assert_eq!(children.len(), 32);
        for child in &children {
            assert_eq!(child.level(), 6);
            assert!(child.token_bytes().starts_with(b"gbsuv"));
            assert!(cell.is_prefix_of(child));
        }
        assert!(
            children
                .windows(2)
                .all(|w| w[0].token_bytes() < w[1].token_bytes())
        );
    }

    #[test]
    fn test_level_for_distance_zero_short_circuits() {
        assert_eq!(tree(7).level_for_distance(0.0), 7);
        assert_eq!(tree(12).level_for_distance(0.0), 12);
    }

    #[test]
    fn test_level_for_distance_clamps() {
        let tree = tree(5);
        assert_eq!(tree.level_for_distance(1000.0), 1);
        assert_eq!(tree.level_for_distance(1e-9), 5);
        assert_eq!(tree.level_for_distance(12.0), 2);
    }

    #[test]
    fn test_level_for_distance_monotonic() {
        let tree = tree(12);
        let distances = [1e-7, 1e-5, 1e-3, 0.01, 0.1, 1.0, 10.0, 100.0, 360.0];
        let levels: Vec<usize> = distances
            .iter()
            .map(|&d| tree.level_for_distance(d))
            .collect();
        assert!(levels.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_leaf_bytes_from_buffer() {
        let tree = tree(12);
        let buffer = b"xxgbsuv+yy";
        let cell = tree.cell_from_bytes(&buffer[2..8]);
        assert!(cell.is_leaf());
        assert_eq!(cell.level(), 5);
        assert_eq!(cell.geohash().unwrap(), "gbsuv");
        assert!(cell.sub_cells().unwrap().is_empty());
    }

    #[test]
    fn test_leaf_geohash_string_excludes_marker() {
        let tree = tree(12);
        let cell = tree.cell_from_geohash("gbsuv+");
        assert!(cell.is_leaf());
        assert_eq!(cell.level(), 5);
        assert_eq!(cell.geohash().unwrap(), "gbsuv");
        assert_eq!(cell.shape().unwrap(), tree.cell_from_geohash("gbsuv").shape().unwrap());
        assert!(tree.cell_from_geohash("gbsu!").shape().is_err());
    }

    #[test]
    fn test_finest_cell_has_no_children() {
        let tree = tree(12);
        let finest = tree.cell_at(&brest(), 12).unwrap();
        assert!(matches!(
            finest.sub_cells(),
            Err(PrefixTreeError::InvalidLevel { level: 13, max: 12 })
        ));
        assert!(matches!(
            finest.sub_cell(&brest()),
            Err(PrefixTreeError::InvalidLevel { level: 13, max: 12 })
        ));

        let mut leaf = finest.clone();
        leaf.set_leaf();
        assert!(leaf.sub_cells().unwrap().is_empty());
    }

    #[test]
    fn test_overlong_token_is_invalid() {
        let tree = tree(12);
        let cell = tree.cell_from_bytes(b"u09tvw0f64r70");
        assert_eq!(cell.level(), 13);
        assert!(matches!(
            cell.center(),
            Err(PrefixTreeError::InvalidToken { .. })
        ));
    }

    #[test]
    fn test_leaf_marker_keeps_shape() {
        let tree = tree(12);
        let plain = tree.cell_from_bytes(b"gbsuv");
        let leaf = tree.cell_from_bytes(b"gbsuv+");
        assert_eq!(plain.shape().unwrap(), leaf.shape().unwrap());
        assert_ne!(plain, leaf);
    }

    #[test]
    fn test_reset_invalidates_caches() {
        let tree = tree(12);
        let mut cell = tree.cell_at(&brest(), 5).unwrap();
        let before = cell.shape().unwrap();

        cell.reset(b"dr5r");
        let after = cell.shape().unwrap();
        assert_ne!(before, after);
        assert_eq!(after, GeohashCodec::decode_boundary("dr5r").unwrap());
        assert_eq!(cell.geohash().unwrap(), "dr5r");
        assert_eq!(cell.level(), 4);
        assert!(cell.shape_rel().is_none());
    }

    #[test]
    fn test_malformed_bytes_fail_lazily() {
        let tree = tree(12);
        let cell = tree.cell_from_bytes(b"gb!a");
        assert_eq!(cell.level(), 4);
        assert!(matches!(
            cell.shape(),
            Err(PrefixTreeError::InvalidToken { .. })
        ));
        assert!(cell.center().is_err());
        assert!(cell.sub_cells().is_err());
    }

    #[test]
    fn test_center_inside_shape() {
        let tree = tree(12);
        let cell = tree.cell_at(&brest(), 7).unwrap();
        let rect = cell.shape().unwrap();
        let center = cell.center().unwrap();
        assert!(rect.min().x <= center.x() && center.x() <= rect.max().x);
        assert!(rect.min().y <= center.y() && center.y() <= rect.max().y);
    }

    #[test]
    fn test_round_trip_within_cell_size() {
        let tree = tree(12);
        let point = Point::new(151.2093, -33.8688);
        for level in 1..=12 {
            let center = tree.cell_at(&point, level).unwrap().center().unwrap();
            let (width, height) = GeohashCodec::cell_size(level);
            assert!((center.x() - point.x()).abs() <= width);
            assert!((center.y() - point.y()).abs() <= height);
        }
    }

    #[test]
    fn test_sub_cell_matches_next_level() {
        let tree = tree(12);
        let cell = tree.cell_at(&brest(), 5).unwrap();
        let sub = cell.sub_cell(&brest()).unwrap();
        assert_eq!(sub, tree.cell_at(&brest(), 6).unwrap());
        assert!(cell.is_prefix_of(&sub));
    }

    #[test]
    fn test_sub_cell_respects_max_levels() {
        let tree = tree(5);
        let cell = tree.cell_at(&brest(), 5).unwrap();
        assert!(matches!(
            cell.sub_cell(&brest()),
            Err(PrefixTreeError::InvalidLevel { level: 6, max: 5 })
        ));
    }

    #[test]
    fn test_world_cell_children() {
        let tree = tree(3);
        let world = tree.world_cell();
        assert_eq!(world.level(), 0);
        let children = world.sub_cells().unwrap();
        let tokens: Vec<u8> = children.iter().map(|c| c.token_bytes()[0]).collect();
        assert_eq!(tokens.as_slice(), GeohashCodec::BASE32.as_slice());
    }

    #[test]
    fn test_distance_for_level() {
        let tree = tree(6);
        let d1 = tree.distance_for_level(1).unwrap();
        assert!((d1 - 45f64.hypot(45.0)).abs() < 1e-9);
        let d6 = tree.distance_for_level(6).unwrap();
        assert!(d6 < d1);
        assert!(tree.distance_for_level(0).is_err());
        assert!(tree.distance_for_level(7).is_err());
    }
}
