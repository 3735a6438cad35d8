#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Selection state and the derived view types handed to the rendering layer.
//!
//! A [`Selection`] is the user's current sidebar state. Each selection change
//! recomputes the three views from the immutable datasets; the types here are
//! the serializable shapes of those views.

use delito_map_crime_models::{CrimeRecord, Hour, Weekday};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Color theme for the heatmap, from the sidebar's fixed theme list.
///
/// Passed through to the rendering layer untouched; aggregation itself is
/// theme-independent.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ColorTheme {
    /// Default theme.
    #[default]
    Blues,
    Cividis,
    Greens,
    Inferno,
    Magma,
    Plasma,
    Reds,
    Rainbow,
    Turbo,
    Viridis,
}

/// The user's current sidebar choices.
///
/// Ephemeral: owned by the interactive session and applied as a filter on
/// every recomputation. `None` means "no filter" for that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Restrict to incidents from this year.
    pub year: Option<i32>,
    /// Restrict to incidents with this crime-type label.
    pub crime_type: Option<String>,
    /// Heatmap color theme.
    #[serde(default)]
    pub theme: ColorTheme,
}

impl Selection {
    /// Returns whether a record passes this selection's filters.
    #[must_use]
    pub fn matches(&self, record: &CrimeRecord) -> bool {
        if self.year.is_some_and(|year| record.year != year) {
            return false;
        }
        if self
            .crime_type
            .as_deref()
            .is_some_and(|crime_type| record.crime_type != crime_type)
        {
            return false;
        }
        true
    }
}

/// Dense weekday-by-hour count matrix.
///
/// Always holds all `7 × 24 = 168` cells, with absent (weekday, hour)
/// combinations at zero. The heatmap renderer assumes a complete grid, so
/// density is guaranteed by construction rather than by the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayHourMatrix {
    cells: [[u64; Hour::COUNT]; Weekday::COUNT],
}

impl DayHourMatrix {
    /// Creates an all-zero matrix.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cells: [[0; Hour::COUNT]; Weekday::COUNT],
        }
    }

    /// Adds `count` to the (weekday, hour) cell.
    pub const fn add(&mut self, weekday: Weekday, hour: Hour, count: u64) {
        self.cells[weekday.index()][hour.index()] += count;
    }

    /// Returns the count in the (weekday, hour) cell.
    #[must_use]
    pub const fn get(&self, weekday: Weekday, hour: Hour) -> u64 {
        self.cells[weekday.index()][hour.index()]
    }

    /// Returns the sum over all cells.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.cells.iter().flatten().sum()
    }

    /// Returns the raw cell grid, rows in weekday order, columns in hour
    /// order.
    #[must_use]
    pub const fn cells(&self) -> &[[u64; Hour::COUNT]; Weekday::COUNT] {
        &self.cells
    }

    /// Iterates rows in weekday order, Monday first.
    pub fn rows(&self) -> impl Iterator<Item = (Weekday, &[u64; Hour::COUNT])> {
        Weekday::all().iter().map(|day| (*day, &self.cells[day.index()]))
    }
}

/// Serializable heatmap view: the dense matrix plus its axis labels and the
/// selected color theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapView {
    /// Row labels, Monday through Sunday.
    pub weekdays: Vec<String>,
    /// Column labels, `"0"` through `"23"`.
    pub hours: Vec<String>,
    /// Cell counts, `cells[row][column]` in label order.
    pub cells: Vec<Vec<u64>>,
    /// Color theme to render with.
    pub theme: ColorTheme,
}

impl HeatmapView {
    /// Builds the view from a dense matrix and the selected theme.
    #[must_use]
    pub fn new(matrix: &DayHourMatrix, theme: ColorTheme) -> Self {
        Self {
            weekdays: Weekday::all().iter().map(ToString::to_string).collect(),
            hours: Hour::all().map(|hour| hour.to_string()).collect(),
            cells: matrix.cells().iter().map(|row| row.to_vec()).collect(),
            theme,
        }
    }
}

/// One entry of the "most dangerous neighborhoods" ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedNeighborhood {
    /// Neighborhood name.
    pub name: String,
    /// Precomputed incident ratio the ranking is ordered by.
    pub ratio: f64,
}

/// The three derived views produced for one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardViews {
    /// Weekday-by-hour heatmap input.
    pub heatmap: HeatmapView,
    /// Geometry + ratio feature collection for the choropleth.
    pub choropleth: geojson::FeatureCollection,
    /// Neighborhoods ordered most dangerous first.
    pub ranking: Vec<RankedNeighborhood>,
}
