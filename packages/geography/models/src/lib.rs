#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Neighborhood boundary types.
//!
//! A boundary pairs a neighborhood's polygon geometry with its precomputed
//! incident ratio. Both come from the boundary dataset and are immutable for
//! the lifetime of the process.

use geo::MultiPolygon;

/// A neighborhood boundary with its precomputed incident ratio.
///
/// `ratio` is an upstream-computed incidence-rate metric (normalization per
/// the data producer); it is carried through to the choropleth and ranking
/// views untouched, never recomputed or rescaled here.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborhoodBoundary {
    /// Neighborhood name, the join key against crime records.
    pub name: String,
    /// Polygon or multi-polygon boundary in WGS 84 lon/lat.
    pub geometry: MultiPolygon<f64>,
    /// Precomputed incidents-per-population-unit metric.
    pub ratio: f64,
}

impl NeighborhoodBoundary {
    /// Returns the neighborhood name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
