//! Data loading: semicolon-separated article CSV into an `ArticleTable` using Polars

use crate::config::ColumnLayout;
use crate::error::AbcError;
use crate::model::{ArticleRecord, ArticleTable};
use anyhow::Context;
use polars::prelude::*;
use std::borrow::Cow;
use std::io::{Cursor, ErrorKind};
use std::path::Path;
use tracing::{debug, info, warn};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Dialect of the input file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsvDialect {
    pub separator: u8,
    pub quote_char: u8,
}

impl Default for CsvDialect {
    fn default() -> Self {
        Self {
            separator: b';',
            quote_char: b'"',
        }
    }
}

/// Load an article CSV and check its columns against `layout`
///
/// # Arguments
/// * `file_path` - Path to the CSV file
/// * `layout` - Identifier, number, name and period column names
/// * `dialect` - Separator and quote character
///
/// # Returns
/// * `ArticleTable` with one record per data row
pub fn load_articles(
    file_path: impl AsRef<Path>,
    layout: &ColumnLayout,
    dialect: CsvDialect,
) -> crate::Result<ArticleTable> {
    let path = file_path.as_ref();
    let bytes = std::fs::read(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => anyhow::Error::new(AbcError::InputNotFound(path.to_path_buf())),
        _ => anyhow::Error::new(err).context(format!("failed to read {}", path.display())),
    })?;

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(AbcError::EmptyFile(path.to_path_buf()).into());
    }

    let text = decode_text(&bytes);
    if matches!(text, Cow::Owned(_)) {
        warn!(
            "{} is not valid UTF-8; decoded as Windows-1252",
            path.display()
        );
    }

    let (cleaned, skipped) = drop_malformed_lines(&text, dialect);
    if skipped > 0 {
        warn!(
            "Skipped {} malformed lines in {} (more fields than the header)",
            skipped,
            path.display()
        );
    }

    let df = read_frame(cleaned.into_bytes(), dialect)
        .with_context(|| format!("error parsing {}", path.display()))?;
    debug!("Read {} rows x {} columns", df.height(), df.width());

    let table = frame_to_table(&df, layout)?;
    info!(
        "Loaded {} articles with {} periods from {}",
        table.len(),
        table.period_count(),
        path.display()
    );
    Ok(table)
}

/// Strip a UTF-8 BOM; fall back to Windows-1252 for non-UTF-8 input
fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| windows_1252_char(b)).collect()),
    }
}

/// Windows-1252 is ISO-8859-1 except for the 0x80..=0x9F block
fn windows_1252_char(byte: u8) -> char {
    const HIGH_BLOCK: [char; 32] = [
        '\u{20AC}', '\u{81}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
        '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{8D}', '\u{017D}', '\u{8F}',
        '\u{90}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
        '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{9D}', '\u{017E}', '\u{0178}',
    ];
    match byte {
        0x80..=0x9F => HIGH_BLOCK[(byte - 0x80) as usize],
        _ => byte as char,
    }
}

/// Split text into CSV records, keeping newlines inside quoted fields, and
/// return each record with its field count.
fn split_records(text: &str, dialect: CsvDialect) -> Vec<(&str, usize)> {
    let separator = dialect.separator as char;
    let quote = dialect.quote_char as char;

    let mut records = Vec::new();
    let mut start = 0;
    let mut fields = 1;
    let mut in_quotes = false;
    for (index, c) in text.char_indices() {
        if c == quote {
            in_quotes = !in_quotes;
        } else if c == separator && !in_quotes {
            fields += 1;
        } else if c == '\n' && !in_quotes {
            records.push((text[start..index].trim_end_matches('\r'), fields));
            start = index + 1;
            fields = 1;
        }
    }
    if start < text.len() {
        records.push((text[start..].trim_end_matches('\r'), fields));
    }
    records
}

/// Drop records with more fields than the header and pad short records with
/// empty fields. Returns the cleaned text and the number of dropped records.
fn drop_malformed_lines(text: &str, dialect: CsvDialect) -> (String, usize) {
    let records = split_records(text, dialect);
    let Some(&(_, expected)) = records.first() else {
        return (String::new(), 0);
    };

    let separator = dialect.separator as char;
    let mut cleaned = String::with_capacity(text.len());
    let mut skipped = 0;
    for (line, fields) in records {
        if line.trim().is_empty() {
            continue;
        }
        if fields > expected {
            debug!("Skipping malformed line: {}", line);
            skipped += 1;
            continue;
        }
        cleaned.push_str(line);
        cleaned.extend(std::iter::repeat(separator).take(expected - fields));
        cleaned.push('\n');
    }
    (cleaned, skipped)
}

/// Parse CSV bytes with every column read as text
fn read_frame(bytes: Vec<u8>, dialect: CsvDialect) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_ignore_errors(true)
        .map_parse_options(|options| {
            options
                .with_separator(dialect.separator)
                .with_quote_char(Some(dialect.quote_char))
        })
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
}

fn frame_to_table(df: &DataFrame, layout: &ColumnLayout) -> crate::Result<ArticleTable> {
    let found: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let missing_in = |names: Vec<&str>| -> Vec<String> {
        names
            .into_iter()
            .filter(|name| !found.iter().any(|column| column == name))
            .map(str::to_string)
            .collect()
    };

    let missing = missing_in(layout.required().to_vec());
    if !missing.is_empty() {
        return Err(AbcError::MissingColumns {
            missing,
            found: found.clone(),
        }
        .into());
    }

    let missing = missing_in(layout.periods.iter().map(String::as_str).collect());
    if !missing.is_empty() {
        return Err(AbcError::MissingPeriodColumns {
            missing,
            found: found.clone(),
        }
        .into());
    }

    let ids = text_column(df, &layout.id)?;
    let numbers = text_column(df, &layout.number)?;
    let names = text_column(df, &layout.name)?;
    let periods = layout
        .periods
        .iter()
        .map(|period| Ok(text_column(df, period)?.iter().map(parse_count).collect()))
        .collect::<crate::Result<Vec<Vec<Option<f64>>>>>()?;

    let records = (0..df.height())
        .map(|row| ArticleRecord {
            id: ids[row].clone().unwrap_or_default(),
            number: numbers[row].clone().unwrap_or_default(),
            name: names[row].clone().unwrap_or_default(),
            periods: periods.iter().map(|column| column[row]).collect(),
        })
        .collect();

    Ok(ArticleTable::new(layout.periods.clone(), records)?)
}

fn text_column(df: &DataFrame, name: &str) -> crate::Result<Vec<Option<String>>> {
    let column = df.column(name)?.as_materialized_series().str()?;
    Ok(column
        .into_iter()
        .map(|cell| cell.map(|value| value.trim().to_string()))
        .collect())
}

/// Parse one period cell; empty, unparseable and non-finite cells are absent
fn parse_count(cell: &Option<String>) -> Option<f64> {
    cell.as_deref()
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite())
}
