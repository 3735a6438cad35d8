#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV loading for the two source datasets.
//!
//! Both datasets are flat files read once at process start. Rows are
//! deserialized into raw column structs, then validated into the typed
//! domain records; any malformed row aborts the load with an error carrying
//! its CSV line number. A dataset either loads completely or not at all, so
//! no derived view is ever computed from partially-corrupt input.

use std::io::Read;
use std::path::Path;

use delito_map_crime_models::{CrimeRecord, Hour, ValidationError, Weekday};
use delito_map_geography::GeographyError;
use delito_map_geography_models::NeighborhoodBoundary;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while loading a dataset.
#[derive(Debug, Error)]
pub enum IngestError {
    /// File could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV is structurally malformed (bad headers, wrong field count,
    /// unparseable numeric column).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A crime row carried an out-of-domain weekday or hour label.
    #[error("invalid crime record at line {line}: {source}")]
    InvalidRecord {
        /// 1-based line number in the CSV file (header is line 1).
        line: u64,
        /// The underlying validation failure.
        #[source]
        source: ValidationError,
    },

    /// A boundary row carried malformed or non-polygon WKT geometry.
    #[error("invalid neighborhood boundary at line {line}: {source}")]
    InvalidBoundary {
        /// 1-based line number in the CSV file (header is line 1).
        line: u64,
        /// The underlying geometry failure.
        #[source]
        source: GeographyError,
    },

    /// Two boundary rows share a neighborhood name, which would corrupt the
    /// choropleth join.
    #[error("duplicate neighborhood {name:?} at line {line}")]
    DuplicateBoundary {
        /// The repeated neighborhood name.
        name: String,
        /// 1-based line number of the second occurrence.
        line: u64,
    },
}

/// Raw crime record row as it appears in the CSV.
#[derive(Debug, Deserialize)]
struct CrimeRow {
    barrio: String,
    delito: String,
    anio: i32,
    dia_semana: String,
    hora: String,
    cantidad: u64,
}

/// Raw neighborhood row as it appears in the boundary CSV. Column names
/// match the upstream `geo_filtrado.csv` export.
#[derive(Debug, Deserialize)]
struct BoundaryRow {
    #[serde(rename = "BARRIO_MONTEVIDEO")]
    barrio: String,
    /// WKT POLYGON / MULTIPOLYGON text.
    geo: String,
    ratio: f64,
}

/// Loads and validates the crime records dataset.
///
/// # Errors
///
/// Returns [`IngestError`] if the file cannot be read, the CSV is
/// malformed, or any row fails weekday/hour validation.
pub fn load_crime_records(path: &Path) -> Result<Vec<CrimeRecord>, IngestError> {
    let file = std::fs::File::open(path)?;
    let records = read_crime_records(file)?;
    log::info!(
        "Loaded {} crime records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Reads crime records from any CSV byte stream.
///
/// # Errors
///
/// Returns [`IngestError`] on CSV or validation failures.
pub fn read_crime_records<R: Read>(reader: R) -> Result<Vec<CrimeRecord>, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut records = Vec::new();
    for (index, row) in csv_reader.deserialize::<CrimeRow>().enumerate() {
        let row = row?;
        let line = data_line(index);

        let weekday = Weekday::from_label(&row.dia_semana)
            .map_err(|source| IngestError::InvalidRecord { line, source })?;
        let hour = Hour::from_label(&row.hora)
            .map_err(|source| IngestError::InvalidRecord { line, source })?;

        records.push(CrimeRecord {
            neighborhood: row.barrio,
            crime_type: row.delito,
            year: row.anio,
            weekday,
            hour,
            count: row.cantidad,
        });
    }

    Ok(records)
}

/// Loads and parses the neighborhood boundary dataset.
///
/// # Errors
///
/// Returns [`IngestError`] if the file cannot be read, the CSV is
/// malformed, any WKT geometry fails to parse, or a neighborhood name
/// repeats.
pub fn load_neighborhoods(path: &Path) -> Result<Vec<NeighborhoodBoundary>, IngestError> {
    let file = std::fs::File::open(path)?;
    let boundaries = read_neighborhoods(file)?;
    log::info!(
        "Loaded {} neighborhood boundaries from {}",
        boundaries.len(),
        path.display()
    );
    Ok(boundaries)
}

/// Reads neighborhood boundaries from any CSV byte stream.
///
/// # Errors
///
/// Returns [`IngestError`] on CSV, geometry, or duplicate-name failures.
pub fn read_neighborhoods<R: Read>(reader: R) -> Result<Vec<NeighborhoodBoundary>, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new().from_reader(reader);

    let mut boundaries: Vec<NeighborhoodBoundary> = Vec::new();
    for (index, row) in csv_reader.deserialize::<BoundaryRow>().enumerate() {
        let row = row?;
        let line = data_line(index);

        if boundaries.iter().any(|b| b.name == row.barrio) {
            return Err(IngestError::DuplicateBoundary {
                name: row.barrio,
                line,
            });
        }

        let boundary = delito_map_geography::parse_boundary(&row.barrio, &row.geo, row.ratio)
            .map_err(|source| IngestError::InvalidBoundary { line, source })?;

        boundaries.push(boundary);
    }

    Ok(boundaries)
}

/// Maps a 0-based data-row index to its 1-based CSV line number (the header
/// occupies line 1).
const fn data_line(index: usize) -> u64 {
    index as u64 + 2
}

#[cfg(test)]
mod tests {
    use super::*;

    const CRIMES_CSV: &str = "\
barrio,delito,anio,dia_semana,hora,cantidad
Centro,HURTO,2023,LUNES,20,3
Centro,HURTO,2023,LUNES,20,2
Pocitos,RAPIÑA,2023,MARTES,9,1
";

    const BOUNDARIES_CSV: &str = "\
BARRIO_MONTEVIDEO,geo,ratio
Centro,\"POLYGON ((0 0, 1 0, 1 1, 0 1, 0 0))\",12.5
Pocitos,\"POLYGON ((1 1, 2 1, 2 2, 1 2, 1 1))\",30.0
";

    #[test]
    fn reads_valid_crime_records() {
        let records = read_crime_records(CRIMES_CSV.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].neighborhood, "Centro");
        assert_eq!(records[0].weekday, Weekday::Lunes);
        assert_eq!(records[0].hour.value(), 20);
        assert_eq!(records[2].crime_type, "RAPIÑA");
    }

    #[test]
    fn rejects_out_of_domain_weekday_with_line_number() {
        let csv = "\
barrio,delito,anio,dia_semana,hora,cantidad
Centro,HURTO,2023,LUNES,20,3
Centro,HURTO,2023,FUNDAY,20,1
";
        let err = read_crime_records(csv.as_bytes()).unwrap_err();
        match err {
            IngestError::InvalidRecord { line, source } => {
                assert_eq!(line, 3);
                assert!(matches!(source, ValidationError::Weekday { .. }));
            }
            other => panic!("expected InvalidRecord, got {other:?}"),
        }
    }

    #[test]
    fn rejects_out_of_domain_hour() {
        let csv = "\
barrio,delito,anio,dia_semana,hora,cantidad
Centro,HURTO,2023,LUNES,24,3
";
        let err = read_crime_records(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            IngestError::InvalidRecord {
                line: 2,
                source: ValidationError::Hour { .. }
            }
        ));
    }

    #[test]
    fn rejects_malformed_count_column() {
        let csv = "\
barrio,delito,anio,dia_semana,hora,cantidad
Centro,HURTO,2023,LUNES,20,muchos
";
        let err = read_crime_records(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, IngestError::Csv(_)));
    }

    #[test]
    fn reads_valid_boundaries() {
        let boundaries = read_neighborhoods(BOUNDARIES_CSV.as_bytes()).unwrap();
        assert_eq!(boundaries.len(), 2);
        assert_eq!(boundaries[0].name, "Centro");
        assert!((boundaries[1].ratio - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_malformed_wkt_with_line_number() {
        let csv = "\
BARRIO_MONTEVIDEO,geo,ratio
Centro,\"POLYGON ((0 0, 1 0, 1 1, 0 1, 0 0))\",12.5
Cordón,not wkt at all,7.0
";
        let err = read_neighborhoods(csv.as_bytes()).unwrap_err();
        match err {
            IngestError::InvalidBoundary { line, source } => {
                assert_eq!(line, 3);
                assert!(matches!(source, GeographyError::Parse { .. }));
            }
            other => panic!("expected InvalidBoundary, got {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_neighborhood_names() {
        let csv = "\
BARRIO_MONTEVIDEO,geo,ratio
Centro,\"POLYGON ((0 0, 1 0, 1 1, 0 1, 0 0))\",12.5
Centro,\"POLYGON ((0 0, 1 0, 1 1, 0 1, 0 0))\",13.0
";
        let err = read_neighborhoods(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            IngestError::DuplicateBoundary { line: 3, .. }
        ));
    }
}
