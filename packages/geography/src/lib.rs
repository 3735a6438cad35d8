#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood boundary geometry parsing and export.
//!
//! The boundary dataset encodes geometry as WKT text. Parsing happens once
//! at load time and fails loudly: malformed WKT and non-polygon geometry are
//! both hard errors, so downstream consumers can assume every boundary holds
//! a valid [`MultiPolygon`]. Export goes the other way, producing the GeoJSON
//! `FeatureCollection` that mapping libraries expect.

use geo::MultiPolygon;
use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};
use thiserror::Error;
use wkt::Wkt;

pub use delito_map_geography_models::NeighborhoodBoundary;

/// Errors that can occur while parsing boundary geometry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeographyError {
    /// WKT text could not be parsed into geometry.
    #[error("malformed WKT geometry for neighborhood {name:?}: {message}")]
    Parse {
        /// Neighborhood the geometry belongs to.
        name: String,
        /// Parser error description.
        message: String,
    },

    /// WKT parsed, but to a geometry type the choropleth cannot use.
    #[error(
        "unsupported geometry type {found} for neighborhood {name:?}: expected POLYGON or MULTIPOLYGON"
    )]
    UnsupportedGeometry {
        /// Neighborhood the geometry belongs to.
        name: String,
        /// The geometry type that was found.
        found: String,
    },
}

/// Parses one boundary row into a typed [`NeighborhoodBoundary`].
///
/// # Errors
///
/// Returns [`GeographyError::Parse`] if the WKT text is malformed, or
/// [`GeographyError::UnsupportedGeometry`] if it parses to something other
/// than a polygon or multi-polygon.
pub fn parse_boundary(
    name: &str,
    wkt_text: &str,
    ratio: f64,
) -> Result<NeighborhoodBoundary, GeographyError> {
    let geometry = parse_wkt_multipolygon(name, wkt_text)?;
    Ok(NeighborhoodBoundary {
        name: name.to_owned(),
        geometry,
        ratio,
    })
}

/// Parses WKT text into a [`MultiPolygon`].
///
/// A bare `POLYGON` is wrapped into a single-element [`MultiPolygon`] so
/// consumers only deal with one geometry type.
///
/// # Errors
///
/// Returns [`GeographyError::Parse`] for malformed WKT and
/// [`GeographyError::UnsupportedGeometry`] for points, lines, and other
/// non-polygon geometry.
pub fn parse_wkt_multipolygon(
    name: &str,
    wkt_text: &str,
) -> Result<MultiPolygon<f64>, GeographyError> {
    let parsed: Wkt<f64> = wkt_text.parse().map_err(|e| GeographyError::Parse {
        name: name.to_owned(),
        message: format!("{e}"),
    })?;

    let geometry =
        geo::Geometry::<f64>::try_from(parsed).map_err(|e| GeographyError::Parse {
            name: name.to_owned(),
            message: format!("{e}"),
        })?;

    match geometry {
        geo::Geometry::MultiPolygon(mp) => Ok(mp),
        geo::Geometry::Polygon(p) => Ok(MultiPolygon(vec![p])),
        other => Err(GeographyError::UnsupportedGeometry {
            name: name.to_owned(),
            found: geometry_kind(&other).to_owned(),
        }),
    }
}

/// Builds the GeoJSON `FeatureCollection` handed to the choropleth renderer.
///
/// One feature per boundary, with `name` and `ratio` properties and the
/// polygon geometry preserved. Feature order follows the input slice.
#[must_use]
pub fn feature_collection(boundaries: &[NeighborhoodBoundary]) -> FeatureCollection {
    let features = boundaries
        .iter()
        .map(|boundary| {
            let mut properties = JsonObject::new();
            properties.insert("name".to_owned(), JsonValue::from(boundary.name.clone()));
            properties.insert("ratio".to_owned(), JsonValue::from(boundary.ratio));

            Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(
                    &boundary.geometry,
                ))),
                id: Some(geojson::feature::Id::String(boundary.name.clone())),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Human-readable WKT-style name for a geometry variant.
fn geometry_kind(geometry: &geo::Geometry<f64>) -> &'static str {
    match geometry {
        geo::Geometry::Point(_) => "POINT",
        geo::Geometry::Line(_) | geo::Geometry::LineString(_) => "LINESTRING",
        geo::Geometry::MultiPoint(_) => "MULTIPOINT",
        geo::Geometry::MultiLineString(_) => "MULTILINESTRING",
        geo::Geometry::Polygon(_) => "POLYGON",
        geo::Geometry::MultiPolygon(_) => "MULTIPOLYGON",
        geo::Geometry::GeometryCollection(_) => "GEOMETRYCOLLECTION",
        geo::Geometry::Rect(_) => "RECT",
        geo::Geometry::Triangle(_) => "TRIANGLE",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "POLYGON ((0 0, 1 0, 1 1, 0 1, 0 0))";

    #[test]
    fn parses_polygon_into_multipolygon() {
        let mp = parse_wkt_multipolygon("Centro", SQUARE).unwrap();
        assert_eq!(mp.0.len(), 1);
    }

    #[test]
    fn parses_multipolygon() {
        let wkt = "MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)), ((2 2, 3 2, 3 3, 2 2)))";
        let mp = parse_wkt_multipolygon("Pocitos", wkt).unwrap();
        assert_eq!(mp.0.len(), 2);
    }

    #[test]
    fn rejects_malformed_wkt() {
        let err = parse_wkt_multipolygon("Centro", "POLYGON ((not numbers))").unwrap_err();
        assert!(matches!(err, GeographyError::Parse { ref name, .. } if name == "Centro"));
    }

    #[test]
    fn rejects_non_polygon_geometry() {
        let err = parse_wkt_multipolygon("Centro", "POINT (1 2)").unwrap_err();
        assert_eq!(
            err,
            GeographyError::UnsupportedGeometry {
                name: "Centro".to_owned(),
                found: "POINT".to_owned(),
            }
        );
    }

    #[test]
    fn feature_collection_preserves_names_and_ratios() {
        let boundaries = vec![
            parse_boundary("Centro", SQUARE, 12.5).unwrap(),
            parse_boundary("Pocitos", SQUARE, 30.0).unwrap(),
        ];

        let collection = feature_collection(&boundaries);
        assert_eq!(collection.features.len(), 2);

        let first = &collection.features[0];
        let properties = first.properties.as_ref().unwrap();
        assert_eq!(properties["name"], JsonValue::from("Centro"));
        assert_eq!(properties["ratio"], JsonValue::from(12.5));
        assert!(first.geometry.is_some());
    }
}
