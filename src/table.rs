//! Load boundary for the cleaned IMDb/TMDB tables and the fused output table.
//!
//! Headers are trimmed and de-duplicated, required columns are checked up
//! front, and every field is coerced leniently: a value that cannot be read
//! becomes missing instead of failing the row.

use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{IntegrationError, Result};
use crate::models::{FusedMovie, ImdbMovie, TmdbMovie, FUSED_COLUMNS};
use crate::normalize::make_unique_columns;

// ============================================================================
// Schemas
// ============================================================================

pub const IMDB_COLUMNS: [&str; 8] = [
    "title",
    "director",
    "release_year",
    "genre",
    "rating",
    "metascore",
    "runtime_in_minutes",
    "gross_in_millions",
];

pub const TMDB_COLUMNS: [&str; 9] = [
    "title",
    "release_year",
    "genre",
    "budget_in_millions",
    "popularity",
    "revenue_in_millions",
    "runtime_in_minutes",
    "vote_average",
    "vote_count",
];

/// Values read as missing without counting as a coercion failure (compared lower-cased)
const NULL_MARKERS: [&str; 7] = ["", "na", "n/a", "<na>", "nan", "null", "none"];

/// First four-digit group: "2010", "2010.0", "(I) (2010)", "2010-07-16"
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4})\b").unwrap());

/// Currency and unit noise around numbers: "$292.58M", "1,024", "148 min"
static NUMERIC_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[$,]|\s*(?:min|m)\s*$").unwrap());

/// Rows of one source table plus load diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable<T> {
    pub rows: Vec<T>,
    /// Header after trimming and de-duplication
    pub columns: Vec<String>,
    /// Fields whose text could not be coerced and were read as missing
    pub coerced_fields: usize,
}

// ============================================================================
// Field Coercion
// ============================================================================

/// Outcome of reading one raw field.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell<T> {
    Missing,
    Value(T),
    Invalid,
}

fn is_null(raw: &str) -> bool {
    let lower = raw.trim().to_lowercase();
    NULL_MARKERS.contains(&lower.as_str())
}

pub fn coerce_text(raw: &str) -> Cell<String> {
    if is_null(raw) {
        Cell::Missing
    } else {
        Cell::Value(raw.trim().to_string())
    }
}

pub fn coerce_year(raw: &str) -> Cell<i32> {
    if is_null(raw) {
        return Cell::Missing;
    }
    YEAR.captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .map_or(Cell::Invalid, Cell::Value)
}

pub fn coerce_float(raw: &str) -> Cell<f64> {
    if is_null(raw) {
        return Cell::Missing;
    }
    let cleaned = NUMERIC_NOISE.replace_all(raw.trim(), "");
    match cleaned.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Cell::Value(v),
        _ => Cell::Invalid,
    }
}

/// Integral numbers only; "148.0" is accepted, "148.5" is not.
pub fn coerce_int(raw: &str) -> Cell<i64> {
    match coerce_float(raw) {
        Cell::Value(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Cell::Value(v as i64),
        Cell::Value(_) | Cell::Invalid => Cell::Invalid,
        Cell::Missing => Cell::Missing,
    }
}

// ============================================================================
// Reading
// ============================================================================

/// Column positions of a de-duplicated header.
struct Header {
    columns: Vec<String>,
    index: FxHashMap<String, usize>,
}

impl Header {
    fn new(raw: &csv::StringRecord) -> Self {
        let trimmed: Vec<&str> = raw.iter().map(str::trim).collect();
        let columns = make_unique_columns(trimmed.as_slice());
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self { columns, index }
    }

    fn require(&self, table: &'static str, required: &[&str]) -> Result<()> {
        let missing: Vec<String> = required
            .iter()
            .filter(|c| !self.index.contains_key(**c))
            .map(|c| c.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(IntegrationError::MissingColumns {
                table,
                columns: missing,
            })
        }
    }
}

/// Typed access to one record, counting failed coercions.
struct FieldReader<'a> {
    header: &'a Header,
    record: &'a csv::StringRecord,
    coerced: &'a mut usize,
}

impl FieldReader<'_> {
    fn get<T>(&mut self, column: &str, coerce: fn(&str) -> Cell<T>) -> Option<T> {
        let raw = self
            .header
            .index
            .get(column)
            .and_then(|&i| self.record.get(i))
            .unwrap_or("");
        match coerce(raw) {
            Cell::Value(v) => Some(v),
            Cell::Missing => None,
            Cell::Invalid => {
                *self.coerced += 1;
                None
            }
        }
    }
}

fn read_table<R, T, F>(
    reader: R,
    table: &'static str,
    required: &[&str],
    mut build: F,
) -> Result<LoadedTable<T>>
where
    R: Read,
    F: FnMut(&mut FieldReader<'_>) -> T,
{
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let header = Header::new(rdr.headers()?);
    header.require(table, required)?;

    let mut rows = Vec::new();
    let mut coerced = 0;
    for result in rdr.records() {
        let record = result?;
        let mut fields = FieldReader {
            header: &header,
            record: &record,
            coerced: &mut coerced,
        };
        rows.push(build(&mut fields));
    }

    if coerced > 0 {
        warn!("{}: {} unreadable fields read as missing", table, coerced);
    }
    info!("{}: loaded {} rows ({} columns)", table, rows.len(), header.columns.len());

    Ok(LoadedTable {
        rows,
        columns: header.columns,
        coerced_fields: coerced,
    })
}

pub fn read_imdb<R: Read>(reader: R) -> Result<LoadedTable<ImdbMovie>> {
    read_table(reader, "IMDb", &IMDB_COLUMNS, |f| ImdbMovie {
        title: f.get("title", coerce_text),
        director: f.get("director", coerce_text),
        release_year: f.get("release_year", coerce_year),
        genre: f.get("genre", coerce_text),
        rating: f.get("rating", coerce_float),
        metascore: f.get("metascore", coerce_float),
        runtime_in_minutes: f.get("runtime_in_minutes", coerce_int),
        gross_in_millions: f.get("gross_in_millions", coerce_float),
    })
}

pub fn read_tmdb<R: Read>(reader: R) -> Result<LoadedTable<TmdbMovie>> {
    read_table(reader, "TMDB", &TMDB_COLUMNS, |f| TmdbMovie {
        title: f.get("title", coerce_text),
        release_year: f.get("release_year", coerce_year),
        genre: f.get("genre", coerce_text),
        budget_in_millions: f.get("budget_in_millions", coerce_float),
        popularity: f.get("popularity", coerce_float),
        revenue_in_millions: f.get("revenue_in_millions", coerce_float),
        runtime_in_minutes: f.get("runtime_in_minutes", coerce_int),
        vote_average: f.get("vote_average", coerce_float),
        vote_count: f.get("vote_count", coerce_int),
    })
}

pub fn load_imdb(path: &Path) -> Result<LoadedTable<ImdbMovie>> {
    read_imdb(File::open(path)?)
}

pub fn load_tmdb(path: &Path) -> Result<LoadedTable<TmdbMovie>> {
    read_tmdb(File::open(path)?)
}

// ============================================================================
// Writing
// ============================================================================

/// Write the fused table: header row, one line per row, missing values empty.
pub fn write_fused<W: Write>(writer: W, rows: &[FusedMovie]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(FUSED_COLUMNS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
