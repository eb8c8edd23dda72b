//! CSV ingest.
//!
//! Two tables are read:
//!
//! - the params table: `source,alpha,tau_decrease,tau_increase,tpod0`
//! - the observed series: `week,tpod,co,sc`
//!
//! Design goals:
//! - **Strict schema** (missing columns are errors with exit code 2)
//! - **Strict rows**: a row that does not parse aborts the load with its line number
//! - **Case-insensitive headers**, tolerant of a UTF-8 BOM and surrounding whitespace
//! - **No range validation** of parameter values; they are taken as given,
//!   but a cell must hold a finite number (`NaN`/`inf` are parse errors)

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{ObservedRecord, ParamSource, Params};
use crate::error::AppError;

const PARAMS_COLUMNS: [&str; 5] = ["source", "alpha", "tau_decrease", "tau_increase", "tpod0"];
const OBSERVED_COLUMNS: [&str; 4] = ["week", "tpod", "co", "sc"];

/// Load the params table, preserving row order.
pub fn load_params_table(path: &Path) -> Result<Vec<ParamSource>, AppError> {
    let (header_map, records) = read_table(path, &PARAMS_COLUMNS)?;

    let mut sources = Vec::with_capacity(records.len());
    let mut seen = HashSet::new();
    for (line, record) in &records {
        let source = parse_source(record, &header_map).map_err(|msg| row_error(path, *line, &msg))?;
        if !seen.insert(source.label.clone()) {
            warn!(label = %source.label, line, "duplicate source label in params table");
        }
        sources.push(source);
    }

    if sources.is_empty() {
        return Err(AppError::new(3, format!("Params table '{}' has no rows.", path.display())));
    }
    debug!(path = %path.display(), sources = sources.len(), "loaded params table");
    Ok(sources)
}

/// Load the observed series, sorted by week.
pub fn load_observed(path: &Path) -> Result<Vec<ObservedRecord>, AppError> {
    let (header_map, records) = read_table(path, &OBSERVED_COLUMNS)?;

    let mut observed = Vec::with_capacity(records.len());
    for (line, record) in &records {
        let row = parse_observed(record, &header_map).map_err(|msg| row_error(path, *line, &msg))?;
        observed.push(row);
    }

    if observed.is_empty() {
        return Err(AppError::new(3, format!("Observed CSV '{}' has no rows.", path.display())));
    }

    observed.sort_by_key(|r| r.week);
    if let Some(w) = observed.windows(2).find(|w| w[0].week == w[1].week) {
        return Err(AppError::new(
            2,
            format!("Observed CSV '{}' has duplicate week {}.", path.display(), w[0].week),
        ));
    }
    debug!(path = %path.display(), weeks = observed.len(), "loaded observed series");
    Ok(observed)
}

type Table = (HashMap<String, usize>, Vec<(usize, StringRecord)>);

fn read_table(path: &Path, required: &[&str]) -> Result<Table, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers of '{}': {e}", path.display())))?
        .clone();
    let header_map = build_header_map(&headers);

    for name in required {
        if !header_map.contains_key(*name) {
            return Err(AppError::new(
                2,
                format!("Missing required column `{name}` in '{}'.", path.display()),
            ));
        }
    }

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // Line numbers are 1-based and the header occupies line 1.
        let line = idx + 2;
        let record = result.map_err(|e| row_error(path, line, &format!("CSV parse error: {e}")))?;
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        records.push((line, record));
    }
    Ok((header_map, records))
}

fn row_error(path: &Path, line: usize, message: &str) -> AppError {
    AppError::new(2, format!("{}:{line}: {message}", path.display()))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_source(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<ParamSource, String> {
    let label = get_required(record, header_map, "source")?.to_string();
    let params = Params::new(
        parse_f64(record, header_map, "alpha")?,
        parse_f64(record, header_map, "tau_decrease")?,
        parse_f64(record, header_map, "tau_increase")?,
        parse_f64(record, header_map, "tpod0")?,
    );
    Ok(ParamSource { label, params })
}

fn parse_observed(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<ObservedRecord, String> {
    let week_raw = get_required(record, header_map, "week")?;
    let week = parse_week(week_raw).ok_or_else(|| format!("Invalid `week` value: '{week_raw}'"))?;
    Ok(ObservedRecord {
        week,
        tpod: parse_f64(record, header_map, "tpod")?,
        co: parse_f64(record, header_map, "co")?,
        sc: parse_f64(record, header_map, "sc")?,
    })
}

/// Accepts `53` as well as `53.0` (spreadsheets like to add the decimal).
fn parse_week(s: &str) -> Option<i64> {
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let v = s.parse::<f64>().ok()?;
    (v.is_finite() && v.fract() == 0.0).then_some(v as i64)
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn parse_f64(record: &StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Result<f64, String> {
    let raw = get_required(record, header_map, name)?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Invalid `{name}` value: '{raw}'")),
    }
}
