use geo::{Point, Rect, coord};
use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers, used for degree/distance conversion.
pub const EARTH_MEAN_RADIUS_KM: f64 = 6371.0087714;

/// The coordinate system a prefix tree decomposes.
///
/// Carries the world bounds (x = longitude, y = latitude for geographic
/// contexts) and whether distances are measured on the sphere. Trees read
/// the bounds once at construction and never mutate the context.
///
/// # Examples
///
/// ```
/// use geoprefix_types::context::SpatialContext;
///
/// let ctx = SpatialContext::geo();
/// assert!(ctx.is_geo());
/// assert_eq!(ctx.world_bounds().max().y, 90.0);
///
/// // 1 km on the mean Earth radius is roughly 0.009 degrees
/// let degrees = SpatialContext::dist_to_degrees(1.0);
/// assert!((degrees - 0.008993).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialContext {
    /// Bounding rectangle of the whole coordinate space
    pub world_bounds: Rect<f64>,
    /// Whether coordinates are degrees on a sphere
    pub geo: bool,
}

impl SpatialContext {
    /// The standard geographic context: longitude [-180, 180], latitude [-90, 90].
    pub fn geo() -> Self {
        Self {
            world_bounds: Rect::new(coord! { x: -180.0, y: -90.0 }, coord! { x: 180.0, y: 90.0 }),
            geo: true,
        }
    }

    /// A planar context over arbitrary bounds.
    pub fn cartesian(world_bounds: Rect<f64>) -> Self {
        Self {
            world_bounds,
            geo: false,
        }
    }

    pub fn world_bounds(&self) -> &Rect<f64> {
        &self.world_bounds
    }

    pub fn is_geo(&self) -> bool {
        self.geo
    }

    /// Center of the world bounds.
    pub fn center(&self) -> Point<f64> {
        self.world_bounds.center().into()
    }

    /// Converts a distance in kilometers to degrees of arc on the mean Earth radius.
    pub fn dist_to_degrees(dist_km: f64) -> f64 {
        (dist_km / EARTH_MEAN_RADIUS_KM).to_degrees()
    }

    /// Converts degrees of arc to kilometers on the mean Earth radius.
    pub fn degrees_to_dist(degrees: f64) -> f64 {
        degrees.to_radians() * EARTH_MEAN_RADIUS_KM
    }
}

impl Default for SpatialContext {
    fn default() -> Self {
        Self::geo()
    }
}
