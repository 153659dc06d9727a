//! CSV ingest and cleaning.
//!
//! This module turns a monitoring-spreadsheet export into a clean set of
//! `BlastRecord`s that are safe to log-transform and fit.
//!
//! Design goals:
//! - **Configurable schema**: the column mapping is input, not a literal
//!   (the defaults match the original Portuguese spreadsheet labels)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no transform or fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{BlastRecord, ColumnMap, FitConfig};
use crate::error::AppError;

/// Resolution status of one mapped column.
#[derive(Debug, Clone)]
pub struct ColumnStatus {
    /// Canonical field name (`ppv`, `distance`, `charge`, `date`).
    pub field: &'static str,
    /// Header the mapping looked for.
    pub header: String,
    /// Index in the CSV header row, when found.
    pub index: Option<usize>,
    pub required: bool,
}

/// Summary stats about the records actually used for fitting.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_records: usize,
    pub ppv_min: f64,
    pub ppv_max: f64,
    pub distance_min: f64,
    pub distance_max: f64,
    pub charge_min: f64,
    pub charge_max: f64,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: cleaned records + column report + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub records: Vec<BlastRecord>,
    pub column_report: Vec<ColumnStatus>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load and clean the monitoring CSV named by the config.
pub fn load_blast_records(config: &FitConfig) -> Result<IngestedData, AppError> {
    let file = File::open(&config.csv_path).map_err(|e| {
        AppError::missing_file(format!(
            "Failed to open '{}': {e}\n\
             Check that the path is correct. If the data lives in a spreadsheet, \
             export the relevant sheet to CSV first.",
            config.csv_path.display()
        ))
    })?;

    ingest_from_reader(file, &config.columns)
}

/// Ingest from any reader (the file-less entry point used by tests).
pub fn ingest_from_reader<R: Read>(reader: R, columns: &ColumnMap) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::processing(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let column_report = resolve_columns(columns, &header_map);
    ensure_required_columns(&column_report)?;

    let idx_of = |field: &str| -> Option<usize> {
        column_report
            .iter()
            .find(|c| c.field == field)
            .and_then(|c| c.index)
    };
    // Required columns were just validated; these indices exist.
    let ppv_idx = idx_of("ppv").unwrap_or_default();
    let distance_idx = idx_of("distance").unwrap_or_default();
    let charge_idx = idx_of("charge").unwrap_or_default();
    let date_idx = idx_of("date");

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because records() starts after the header row and CSV line
        // numbers are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, line, ppv_idx, distance_idx, charge_idx, date_idx) {
            Ok(rec) => records.push(rec),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    let rows_used = records.len();
    if rows_used == 0 {
        return Err(AppError::no_valid_data(
            "No valid rows remain after cleaning/filtering; nothing to fit.",
        ));
    }

    let stats = compute_stats(&records).ok_or_else(|| {
        AppError::no_valid_data("No valid records remain after cleaning/filtering.")
    })?;

    Ok(IngestedData {
        records,
        column_report,
        stats,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on
    // the first header. If we don't strip it, the mapping would incorrectly
    // report the first column as missing.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_lowercase()
}

fn resolve_columns(columns: &ColumnMap, header_map: &HashMap<String, usize>) -> Vec<ColumnStatus> {
    let lookup = |header: &str| header_map.get(&normalize_header_name(header)).copied();

    let mut report = vec![
        ColumnStatus {
            field: "ppv",
            header: columns.ppv.clone(),
            index: lookup(&columns.ppv),
            required: true,
        },
        ColumnStatus {
            field: "distance",
            header: columns.distance.clone(),
            index: lookup(&columns.distance),
            required: true,
        },
        ColumnStatus {
            field: "charge",
            header: columns.charge.clone(),
            index: lookup(&columns.charge),
            required: true,
        },
    ];

    if let Some(date_header) = &columns.date {
        report.push(ColumnStatus {
            field: "date",
            header: date_header.clone(),
            index: lookup(date_header),
            required: false,
        });
    }

    report
}

fn ensure_required_columns(report: &[ColumnStatus]) -> Result<(), AppError> {
    let missing: Vec<String> = report
        .iter()
        .filter(|c| c.required && c.index.is_none())
        .map(|c| format!("`{}` (field: {})", c.header, c.field))
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    Err(AppError::missing_column(format!(
        "Missing required column(s): {}.\n\
         Check the header row of the CSV, or override the mapping with \
         --ppv-col / --distance-col / --charge-col.",
        missing.join(", ")
    )))
}

fn parse_row(
    record: &StringRecord,
    line: usize,
    ppv_idx: usize,
    distance_idx: usize,
    charge_idx: usize,
    date_idx: Option<usize>,
) -> Result<BlastRecord, String> {
    let ppv = parse_value(record, ppv_idx, "ppv")?;
    let distance = parse_value(record, distance_idx, "distance")?;
    let charge = parse_value(record, charge_idx, "charge")?;

    // Guard against undefined logarithms before the transform ever sees
    // these values.
    if ppv <= 0.0 {
        return Err(format!("Non-positive ppv ({ppv}); row excluded."));
    }
    if distance <= 0.0 {
        return Err(format!("Non-positive distance ({distance}); row excluded."));
    }
    if charge <= 0.0 {
        return Err(format!("Non-positive charge ({charge}); row excluded."));
    }

    let date = date_idx
        .and_then(|idx| record.get(idx))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| parse_date(s).ok());

    Ok(BlastRecord {
        line,
        ppv,
        distance,
        charge,
        date,
    })
}

fn parse_value(record: &StringRecord, idx: usize, field: &str) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing `{field}` value; row excluded."))?;

    let v = parse_f64(raw)
        .ok_or_else(|| format!("Non-numeric `{field}` value '{raw}'; row excluded."))?;
    Ok(v)
}

fn parse_f64(s: &str) -> Option<f64> {
    if let Ok(v) = s.parse::<f64>() {
        return v.is_finite().then_some(v);
    }

    // pt-BR spreadsheet exports commonly use a comma decimal separator
    // ("12,5"). Accept it as a fallback, but only when it leaves a single
    // well-formed number (no thousands-grouping ambiguity).
    if s.matches(',').count() == 1 && !s.contains('.') {
        let v = s.replace(',', ".").parse::<f64>().ok()?;
        return v.is_finite().then_some(v);
    }

    None
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // Monitoring sheets in the wild use either ISO or day-first formats.
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}

fn compute_stats(records: &[BlastRecord]) -> Option<DatasetStats> {
    let mut ppv_min = f64::INFINITY;
    let mut ppv_max = f64::NEG_INFINITY;
    let mut distance_min = f64::INFINITY;
    let mut distance_max = f64::NEG_INFINITY;
    let mut charge_min = f64::INFINITY;
    let mut charge_max = f64::NEG_INFINITY;

    for r in records {
        ppv_min = ppv_min.min(r.ppv);
        ppv_max = ppv_max.max(r.ppv);
        distance_min = distance_min.min(r.distance);
        distance_max = distance_max.max(r.distance);
        charge_min = charge_min.min(r.charge);
        charge_max = charge_max.max(r.charge);
    }

    if !(ppv_min.is_finite()
        && ppv_max.is_finite()
        && distance_min.is_finite()
        && distance_max.is_finite()
        && charge_min.is_finite()
        && charge_max.is_finite())
    {
        return None;
    }

    Some(DatasetStats {
        n_records: records.len(),
        ppv_min,
        ppv_max,
        distance_min,
        distance_max,
        charge_min,
        charge_max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Cursor;

    fn default_columns() -> ColumnMap {
        ColumnMap::default()
    }

    fn csv_with_default_headers(rows: &str) -> String {
        format!("PPV (mm/s),Distancia (m),Carga Maxima por Espera (kg)\n{rows}")
    }

    #[test]
    fn ingest_clean_rows() {
        let csv = csv_with_default_headers("10,50,25\n5,100,25\n");
        let data = ingest_from_reader(Cursor::new(csv), &default_columns()).unwrap();

        assert_eq!(data.rows_read, 2);
        assert_eq!(data.rows_used, 2);
        assert!(data.row_errors.is_empty());
        assert_eq!(data.records[0].ppv, 10.0);
        assert_eq!(data.records[0].line, 2);
        assert_eq!(data.stats.distance_max, 100.0);
    }

    #[test]
    fn non_positive_and_non_numeric_rows_are_excluded() {
        let csv = csv_with_default_headers("10,50,25\n0,60,25\n7,-3,25\n4,70,0\nabc,80,25\n6,,25\n3,90,16\n");
        let data = ingest_from_reader(Cursor::new(csv), &default_columns()).unwrap();

        assert_eq!(data.rows_read, 7);
        assert_eq!(data.rows_used, 2);
        assert_eq!(data.row_errors.len(), 5);
        assert!(data.records.iter().all(|r| r.ppv > 0.0 && r.distance > 0.0 && r.charge > 0.0));
    }

    #[test]
    fn all_rows_invalid_is_no_valid_data() {
        let csv = csv_with_default_headers("0,50,25\n-1,60,25\n");
        let err = ingest_from_reader(Cursor::new(csv), &default_columns()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoValidData);
    }

    #[test]
    fn missing_required_column_is_reported() {
        let csv = "PPV (mm/s),Distancia (m)\n10,50\n";
        let err = ingest_from_reader(Cursor::new(csv), &default_columns()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingColumn);
        assert!(err.to_string().contains("Carga Maxima por Espera (kg)"));
    }

    #[test]
    fn header_match_is_case_insensitive_and_bom_tolerant() {
        let csv = "\u{feff}ppv (MM/S),DISTANCIA (m),carga maxima por espera (KG)\n10,50,25\n";
        let data = ingest_from_reader(Cursor::new(csv), &default_columns()).unwrap();
        assert_eq!(data.rows_used, 1);
        assert!(data.column_report.iter().all(|c| c.index.is_some()));
    }

    #[test]
    fn custom_column_mapping() {
        let columns = ColumnMap {
            ppv: "vibration".to_string(),
            distance: "dist_m".to_string(),
            charge: "mic_kg".to_string(),
            date: Some("blast_date".to_string()),
        };
        let csv = "blast_date,vibration,dist_m,mic_kg\n05/03/2024,12.5,80,36\n";
        let data = ingest_from_reader(Cursor::new(csv), &columns).unwrap();

        assert_eq!(data.rows_used, 1);
        assert_eq!(data.records[0].charge, 36.0);
        assert_eq!(
            data.records[0].date,
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
    }

    #[test]
    fn comma_decimal_separator_is_accepted() {
        let csv = csv_with_default_headers("\"12,5\",\"80,25\",36\n");
        let data = ingest_from_reader(Cursor::new(csv), &default_columns()).unwrap();
        assert_eq!(data.records[0].ppv, 12.5);
        assert_eq!(data.records[0].distance, 80.25);
    }
}
