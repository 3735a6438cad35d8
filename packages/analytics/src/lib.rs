#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation preprocessor: (datasets, selection) → derived views.
//!
//! Pure transformations over the loaded datasets. Each selection change
//! triggers one full recomputation; nothing here caches, mutates shared
//! state, or touches I/O, so identical inputs always produce identical
//! output and concurrent callers need no coordination.

use std::collections::BTreeSet;

use delito_map_analytics_models::{
    DashboardViews, DayHourMatrix, HeatmapView, RankedNeighborhood, Selection,
};
use delito_map_crime_models::CrimeRecord;
use delito_map_geography_models::NeighborhoodBoundary;
use geojson::FeatureCollection;
use thiserror::Error;

/// Errors that can occur while deriving views.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    /// Crime records reference neighborhoods with no boundary geometry.
    ///
    /// A mismatch would silently drop those neighborhoods from the
    /// choropleth, so it is surfaced as a hard error listing every
    /// unmatched key.
    #[error("no boundary geometry for neighborhood(s): {}", .names.join(", "))]
    UnmatchedNeighborhoods {
        /// The unmatched neighborhood names, sorted.
        names: Vec<String>,
    },
}

/// Filters records by the selection's year and crime-type choices.
pub fn filter_records<'a>(
    records: &'a [CrimeRecord],
    selection: &'a Selection,
) -> impl Iterator<Item = &'a CrimeRecord> {
    records.iter().filter(|record| selection.matches(record))
}

/// Aggregates records into the dense weekday-by-hour count matrix.
///
/// Rows are the 7 weekdays Monday→Sunday, columns the 24 hours 0→23, each
/// cell the sum of the records' `count` for that combination. All 168 cells
/// are present regardless of how sparse the input is; combinations with no
/// records stay at zero.
pub fn day_hour_matrix<'a, I>(records: I) -> DayHourMatrix
where
    I: IntoIterator<Item = &'a CrimeRecord>,
{
    let mut matrix = DayHourMatrix::new();
    for record in records {
        matrix.add(record.weekday, record.hour, record.count);
    }
    matrix
}

/// Builds the choropleth view: boundary geometry joined with its ratio,
/// as a GeoJSON `FeatureCollection`.
///
/// Every neighborhood referenced by `records` must have a boundary; the
/// boundary set itself passes through unchanged (its `ratio` is precomputed
/// upstream and already reflects the active crime-type filter).
///
/// # Errors
///
/// Returns [`AnalyticsError::UnmatchedNeighborhoods`] if any record
/// references a neighborhood missing from `boundaries`.
pub fn choropleth_view<'a, I>(
    records: I,
    boundaries: &[NeighborhoodBoundary],
) -> Result<FeatureCollection, AnalyticsError>
where
    I: IntoIterator<Item = &'a CrimeRecord>,
{
    let known: BTreeSet<&str> = boundaries.iter().map(NeighborhoodBoundary::name).collect();

    let unmatched: BTreeSet<&str> = records
        .into_iter()
        .map(|record| record.neighborhood.as_str())
        .filter(|name| !known.contains(name))
        .collect();

    if !unmatched.is_empty() {
        return Err(AnalyticsError::UnmatchedNeighborhoods {
            names: unmatched.into_iter().map(str::to_owned).collect(),
        });
    }

    Ok(delito_map_geography::feature_collection(boundaries))
}

/// Ranks neighborhoods most dangerous first.
///
/// Ordered by ratio descending; ties break by name ascending so the result
/// is deterministic. The order is a property of the returned data, not of
/// whatever the rendering library does by default.
#[must_use]
pub fn rank_neighborhoods(boundaries: &[NeighborhoodBoundary]) -> Vec<RankedNeighborhood> {
    let mut ranking: Vec<RankedNeighborhood> = boundaries
        .iter()
        .map(|boundary| RankedNeighborhood {
            name: boundary.name.clone(),
            ratio: boundary.ratio,
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.ratio
            .total_cmp(&a.ratio)
            .then_with(|| a.name.cmp(&b.name))
    });

    ranking
}

/// The immutable datasets, loaded once at process start.
///
/// Holds the full record set and the boundary set read-only; every derived
/// view is recomputed from them per selection. `Send + Sync`, so a
/// long-lived process can share one instance across sessions.
#[derive(Debug, Clone)]
pub struct Datasets {
    records: Vec<CrimeRecord>,
    boundaries: Vec<NeighborhoodBoundary>,
}

impl Datasets {
    /// Wraps loaded datasets.
    #[must_use]
    pub const fn new(records: Vec<CrimeRecord>, boundaries: Vec<NeighborhoodBoundary>) -> Self {
        Self {
            records,
            boundaries,
        }
    }

    /// Returns the loaded crime records.
    #[must_use]
    pub fn records(&self) -> &[CrimeRecord] {
        &self.records
    }

    /// Returns the loaded neighborhood boundaries.
    #[must_use]
    pub fn boundaries(&self) -> &[NeighborhoodBoundary] {
        &self.boundaries
    }

    /// Distinct years present in the records, newest first (the sidebar's
    /// year list).
    #[must_use]
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .records
            .iter()
            .map(|record| record.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        years.reverse();
        years
    }

    /// Distinct crime-type labels present in the records, sorted.
    #[must_use]
    pub fn crime_types(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|record| record.crime_type.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Recomputes all three derived views for one selection.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::UnmatchedNeighborhoods`] if the filtered
    /// records reference a neighborhood with no boundary geometry.
    pub fn dashboard(&self, selection: &Selection) -> Result<DashboardViews, AnalyticsError> {
        let filtered: Vec<&CrimeRecord> = filter_records(&self.records, selection).collect();

        log::debug!(
            "Recomputing views: {} of {} records match {selection:?}",
            filtered.len(),
            self.records.len()
        );

        let matrix = day_hour_matrix(filtered.iter().copied());
        let choropleth = choropleth_view(filtered.iter().copied(), &self.boundaries)?;
        let ranking = rank_neighborhoods(&self.boundaries);

        Ok(DashboardViews {
            heatmap: HeatmapView::new(&matrix, selection.theme),
            choropleth,
            ranking,
        })
    }
}

#[cfg(test)]
mod tests {
    use delito_map_crime_models::{Hour, Weekday};

    use super::*;

    fn record(neighborhood: &str, weekday: Weekday, hour: u8, count: u64) -> CrimeRecord {
        CrimeRecord {
            neighborhood: neighborhood.to_owned(),
            crime_type: "HURTO".to_owned(),
            year: 2023,
            weekday,
            hour: Hour::from_value(hour).unwrap(),
            count,
        }
    }

    fn boundary(name: &str, ratio: f64) -> NeighborhoodBoundary {
        delito_map_geography::parse_boundary(name, "POLYGON ((0 0, 1 0, 1 1, 0 1, 0 0))", ratio)
            .unwrap()
    }

    #[test]
    fn matrix_sums_duplicate_cells_and_zero_fills_the_rest() {
        let records = vec![
            record("Centro", Weekday::Lunes, 20, 3),
            record("Centro", Weekday::Lunes, 20, 2),
            record("Centro", Weekday::Martes, 9, 1),
        ];

        let matrix = day_hour_matrix(&records);

        assert_eq!(matrix.get(Weekday::Lunes, Hour::from_value(20).unwrap()), 5);
        assert_eq!(matrix.get(Weekday::Martes, Hour::from_value(9).unwrap()), 1);
        assert_eq!(matrix.total(), 6);

        let zero_cells = matrix
            .cells()
            .iter()
            .flatten()
            .filter(|&&cell| cell == 0)
            .count();
        assert_eq!(zero_cells, 166);
    }

    #[test]
    fn matrix_total_equals_input_count_sum() {
        let records = vec![
            record("Centro", Weekday::Viernes, 23, 7),
            record("Pocitos", Weekday::Domingo, 0, 11),
        ];
        let matrix = day_hour_matrix(&records);
        assert_eq!(matrix.total(), 18);
    }

    #[test]
    fn ranking_orders_by_ratio_then_name() {
        let boundaries = vec![
            boundary("Centro", 12.5),
            boundary("Cordón", 12.5),
            boundary("Pocitos", 30.0),
        ];

        let ranking = rank_neighborhoods(&boundaries);
        let names: Vec<&str> = ranking.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, ["Pocitos", "Centro", "Cordón"]);
    }

    #[test]
    fn choropleth_rejects_unmatched_neighborhoods() {
        let records = vec![
            record("Centro", Weekday::Lunes, 20, 1),
            record("Atlántida", Weekday::Lunes, 21, 1),
            record("Carrasco", Weekday::Martes, 9, 1),
        ];
        let boundaries = vec![boundary("Centro", 12.5)];

        let err = choropleth_view(&records, &boundaries).unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::UnmatchedNeighborhoods {
                names: vec!["Atlántida".to_owned(), "Carrasco".to_owned()],
            }
        );
    }

    #[test]
    fn choropleth_passes_boundaries_through() {
        let records = vec![record("Centro", Weekday::Lunes, 20, 1)];
        let boundaries = vec![boundary("Centro", 12.5), boundary("Pocitos", 30.0)];

        let collection = choropleth_view(&records, &boundaries).unwrap();
        assert_eq!(collection.features.len(), 2);
    }

    #[test]
    fn dashboard_recomputation_is_deterministic() {
        let datasets = Datasets::new(
            vec![
                record("Centro", Weekday::Lunes, 20, 3),
                record("Pocitos", Weekday::Martes, 9, 1),
            ],
            vec![boundary("Centro", 12.5), boundary("Pocitos", 30.0)],
        );
        let selection = Selection::default();

        let first = datasets.dashboard(&selection).unwrap();
        let second = datasets.dashboard(&selection).unwrap();

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn dashboard_applies_selection_filter() {
        let mut other = record("Centro", Weekday::Domingo, 3, 9);
        other.crime_type = "RAPIÑA".to_owned();
        other.year = 2019;

        let datasets = Datasets::new(
            vec![record("Centro", Weekday::Lunes, 20, 3), other],
            vec![boundary("Centro", 12.5)],
        );

        let selection = Selection {
            year: Some(2023),
            crime_type: Some("HURTO".to_owned()),
            ..Selection::default()
        };

        let views = datasets.dashboard(&selection).unwrap();
        assert_eq!(views.heatmap.cells[0][20], 3);
        assert_eq!(
            views.heatmap.cells.iter().flatten().sum::<u64>(),
            3,
            "filtered-out records must not contribute cells"
        );
    }

    #[test]
    fn sidebar_lists_are_distinct_and_ordered() {
        let mut a = record("Centro", Weekday::Lunes, 1, 1);
        a.year = 2021;
        let mut b = record("Centro", Weekday::Lunes, 2, 1);
        b.year = 2023;
        b.crime_type = "RAPIÑA".to_owned();
        let mut c = record("Centro", Weekday::Lunes, 3, 1);
        c.year = 2021;

        let datasets = Datasets::new(vec![a, b, c], vec![boundary("Centro", 1.0)]);

        assert_eq!(datasets.years(), vec![2023, 2021]);
        assert_eq!(datasets.crime_types(), vec!["HURTO", "RAPIÑA"]);
    }
}
