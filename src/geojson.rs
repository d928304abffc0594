//! GeoJSON export of cells, for inspecting a decomposition on a map.

use crate::cell::Cell;
use crate::error::Result;
use geo::Rect;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};

/// Converts a cell rectangle to a GeoJSON polygon geometry.
pub fn rect_to_geometry(rect: &Rect<f64>) -> Geometry {
    let ring: Vec<Vec<f64>> = rect
        .to_polygon()
        .exterior()
        .coords()
        .map(|coord| vec![coord.x, coord.y])
        .collect();
    Geometry::new(Value::Polygon(vec![ring]))
}

/// Serializes cells as a `FeatureCollection` of their boundary polygons.
///
/// Each feature carries `token`, `level` and `leaf` properties.
pub fn cells_to_geojson<C: Cell>(cells: &[C]) -> Result<String> {
    let features = cells
        .iter()
        .map(|cell| {
            let mut properties = JsonObject::new();
            properties.insert("token".to_string(), cell.token().to_string().into());
            properties.insert("level".to_string(), cell.level().into());
            properties.insert("leaf".to_string(), cell.is_leaf().into());

            Ok(Feature {
                bbox: None,
                geometry: Some(rect_to_geometry(&cell.shape()?)),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    Ok(serde_json::to_string(&collection)?)
}
