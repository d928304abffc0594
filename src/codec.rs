//! Geohash codec binding.
//!
//! Thin, stateless layer over the `geohash` crate. The crate covers encoding
//! and decoding; child enumeration and the level-for-size lookup live here
//! because the crate has no notion of a grid hierarchy.

use crate::error::{PrefixTreeError, Result};
use geo::{Point, Rect, coord};

/// Pure geohash functions used by the geohash prefix tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeohashCodec;

impl GeohashCodec {
    /// Longest geohash the `geohash` crate encodes or decodes.
    pub const MAX_PRECISION: usize = 12;

    /// The geohash base-32 alphabet, in ascending byte order.
    pub const BASE32: &'static [u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

    /// Number of children of every cell.
    pub const FAN_OUT: usize = 32;

    const CELL_SIZES: [(f64, f64); GeohashCodec::MAX_PRECISION + 1] = cell_sizes();

    /// Encodes a latitude/longitude pair into a geohash of `level` characters.
    pub fn encode(lat: f64, lon: f64, level: usize) -> Result<String> {
        if !(1..=Self::MAX_PRECISION).contains(&level) {
            return Err(PrefixTreeError::InvalidLevel {
                level,
                max: Self::MAX_PRECISION,
            });
        }
        if !lat.is_finite() || !lon.is_finite() {
            return Err(PrefixTreeError::InvalidCoordinate(Point::new(lon, lat)));
        }

        geohash::encode(coord! { x: lon, y: lat }, level)
            .map_err(|_| PrefixTreeError::InvalidCoordinate(Point::new(lon, lat)))
    }

    /// Decodes a geohash into the center of its cell.
    pub fn decode(hash: &str) -> Result<Point<f64>> {
        if hash.is_empty() {
            return Ok(world_rect().center().into());
        }
        let (center, _, _) =
            geohash::decode(hash).map_err(|e| PrefixTreeError::invalid_token(hash.as_bytes(), e))?;
        Ok(center.into())
    }

    /// Decodes a geohash into the rectangle covering every point that
    /// encodes with it as a prefix.
    pub fn decode_boundary(hash: &str) -> Result<Rect<f64>> {
        if hash.is_empty() {
            return Ok(world_rect());
        }
        geohash::decode_bbox(hash).map_err(|e| PrefixTreeError::invalid_token(hash.as_bytes(), e))
    }

    /// The 32 geohashes one level below `hash`, in ascending order.
    pub fn children(hash: &str) -> Vec<String> {
        Self::BASE32
            .iter()
            .map(|&c| {
                let mut child = String::with_capacity(hash.len() + 1);
                child.push_str(hash);
                child.push(c as char);
                child
            })
            .collect()
    }

    /// Whether `byte` is a geohash character.
    pub fn is_valid_byte(byte: u8) -> bool {
        Self::BASE32.binary_search(&byte).is_ok()
    }

    /// Width and height in degrees of a cell at `level`.
    ///
    /// Levels past `MAX_PRECISION` report the `MAX_PRECISION` size.
    pub fn cell_size(level: usize) -> (f64, f64) {
        Self::CELL_SIZES[level.min(Self::MAX_PRECISION)]
    }

    /// Coarsest level whose cells are strictly narrower than `width` and
    /// strictly shorter than `height`, or `MAX_PRECISION` when none is.
    pub fn level_for_width_height(width: f64, height: f64) -> usize {
        (1..Self::MAX_PRECISION)
            .find(|&level| {
                let (cell_width, cell_height) = Self::CELL_SIZES[level];
                cell_width < width && cell_height < height
            })
            .unwrap_or(Self::MAX_PRECISION)
    }
}

// Odd levels split longitude 8 ways and latitude 4 ways; even levels the reverse.
const fn cell_sizes() -> [(f64, f64); GeohashCodec::MAX_PRECISION + 1] {
    let mut sizes = [(360.0, 180.0); GeohashCodec::MAX_PRECISION + 1];
    let mut level = 1;
    while level <= GeohashCodec::MAX_PRECISION {
        let (width, height) = sizes[level - 1];
        sizes[level] = if level % 2 == 1 {
            (width / 8.0, height / 4.0)
        } else {
            (width / 4.0, height / 8.0)
        };
        level += 1;
    }
    sizes
}

fn world_rect() -> Rect<f64> {
    Rect::new(coord! { x: -180.0, y: -90.0 }, coord! { x: 180.0, y: 90.0 })
}
