use chrono::{DateTime, NaiveDateTime, Utc};
use premier_core::{Bar, DataError};
use rust_decimal::Decimal;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// A bar paired with the value an external tool computed for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRow {
    pub bar: Bar,
    /// `None` where the reference cell is blank (typically during warm-up).
    pub expected: Option<Decimal>,
}

/// Load OHLCV bars from a CSV file.
///
/// Expected columns (case-insensitive, flexible ordering):
/// `timestamp` (or `date`, `datetime`), `open`, `high`, `low`, `close`, `volume`
///
/// Supports common date formats.
pub fn load_bars_from_csv(path: &Path) -> Result<Vec<Bar>, DataError> {
    let file = open(path)?;
    let bars = load_bars_from_reader(file, &instrument_name(path))?;
    tracing::debug!(path = %path.display(), bars = bars.len(), "Loaded bars");
    Ok(bars)
}

/// Same as [`load_bars_from_csv`], reading from any source.
pub fn load_bars_from_reader<R: Read>(source: R, instrument: &str) -> Result<Vec<Bar>, DataError> {
    let rows = read_rows(source, instrument, None)?;
    Ok(rows.into_iter().map(|row| row.bar).collect())
}

/// Load bars together with a reference indicator column (e.g. `PSO`).
///
/// The column name is matched case-insensitively. Blank or `NaN` cells yield
/// `expected: None`.
pub fn load_reference_series(path: &Path, column: &str) -> Result<Vec<ReferenceRow>, DataError> {
    let file = open(path)?;
    let rows = load_reference_from_reader(file, &instrument_name(path), column)?;
    tracing::debug!(
        path = %path.display(),
        column = column,
        rows = rows.len(),
        "Loaded reference series"
    );
    Ok(rows)
}

pub fn load_reference_from_reader<R: Read>(
    source: R,
    instrument: &str,
    column: &str,
) -> Result<Vec<ReferenceRow>, DataError> {
    read_rows(source, instrument, Some(column))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, DataError> {
    if !path.exists() {
        return Err(DataError::NotFound(format!(
            "CSV file not found: {}",
            path.display()
        )));
    }
    Ok(std::fs::File::open(path)?)
}

fn instrument_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn read_rows<R: Read>(
    source: R,
    instrument: &str,
    reference: Option<&str>,
) -> Result<Vec<ReferenceRow>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| DataError::ParseError(format!("Failed to read headers: {}", e)))?
        .clone();

    let col_map = resolve_bar_columns(&headers)?;
    let ref_col = match reference {
        Some(name) => Some(
            find_column(&headers, &[&name.to_lowercase()])
                .ok_or_else(|| DataError::MissingColumn(name.to_string()))?,
        ),
        None => None,
    };

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| DataError::ParseError(format!("CSV record error: {}", e)))?;

        let timestamp = parse_timestamp(field(&record, col_map.timestamp, "timestamp")?)?;
        let high = parse_decimal(field(&record, col_map.high, "high")?, "high")?;
        let low = parse_decimal(field(&record, col_map.low, "low")?, "low")?;
        let close = parse_decimal(field(&record, col_map.close, "close")?, "close")?;
        let open = match col_map.open {
            Some(idx) => parse_decimal(field(&record, idx, "open")?, "open")?,
            None => close,
        };
        let volume = match col_map.volume {
            Some(idx) => parse_decimal(field(&record, idx, "volume")?, "volume")?,
            None => Decimal::ZERO,
        };
        let expected = match ref_col {
            Some(idx) => parse_optional_decimal(record.get(idx).unwrap_or(""), "reference")?,
            None => None,
        };

        rows.push(ReferenceRow {
            bar: Bar {
                instrument: instrument.to_string(),
                timestamp,
                open,
                high,
                low,
                close,
                volume,
            },
            expected,
        });
    }

    // Sort by timestamp
    rows.sort_by_key(|r| r.bar.timestamp);
    Ok(rows)
}

struct BarColumnMap {
    timestamp: usize,
    open: Option<usize>,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

fn resolve_bar_columns(headers: &csv::StringRecord) -> Result<BarColumnMap, DataError> {
    let ts = find_column(headers, &["timestamp", "date", "datetime", "time"])
        .ok_or_else(|| DataError::MissingColumn("timestamp".into()))?;
    let open = find_column(headers, &["open", "o"]);
    let high = find_column(headers, &["high", "h"])
        .ok_or_else(|| DataError::MissingColumn("high".into()))?;
    let low = find_column(headers, &["low", "l"])
        .ok_or_else(|| DataError::MissingColumn("low".into()))?;
    let close = find_column(headers, &["close", "c"])
        .ok_or_else(|| DataError::MissingColumn("close".into()))?;
    let volume = find_column(headers, &["volume", "vol", "v"]);

    Ok(BarColumnMap {
        timestamp: ts,
        open,
        high,
        low,
        close,
        volume,
    })
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    for (i, header) in headers.iter().enumerate() {
        let h = header.trim().to_lowercase();
        for name in names {
            if h == *name {
                return Some(i);
            }
        }
    }
    None
}

fn field<'r>(record: &'r csv::StringRecord, idx: usize, name: &str) -> Result<&'r str, DataError> {
    record.get(idx).ok_or_else(|| {
        DataError::ParseError(format!(
            "Row {} has no {} field",
            record.position().map(|p| p.line()).unwrap_or(0),
            name
        ))
    })
}

fn parse_decimal(s: &str, field: &str) -> Result<Decimal, DataError> {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|e| DataError::ParseError(format!("Failed to parse {} '{}': {}", field, s, e)))
}

fn parse_optional_decimal(s: &str, field: &str) -> Result<Option<Decimal>, DataError> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    parse_decimal(s, field).map(Some)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DataError> {
    let s = s.trim();

    // Try RFC 3339 / ISO 8601 with timezone
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Common formats (without timezone, assume UTC)
    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
        "%Y%m%d %H:%M:%S",
        "%Y%m%d %H:%M",
        "%d/%m/%Y %H:%M:%S",
    ];

    for fmt in &formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
        }
    }

    // Try date-only formats
    for fmt in ["%Y-%m-%d", "%Y%m%d", "%m/%d/%Y"] {
        if let Ok(naive_date) = chrono::NaiveDate::parse_from_str(s, fmt) {
            let naive_dt = naive_date.and_time(chrono::NaiveTime::MIN);
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive_dt, Utc));
        }
    }

    // Try Unix timestamp (seconds)
    if let Ok(ts) = s.parse::<i64>() {
        if let Some(dt) = DateTime::from_timestamp(ts, 0) {
            return Ok(dt);
        }
    }

    Err(DataError::ParseError(format!(
        "Unable to parse timestamp: '{}'",
        s
    )))
}
