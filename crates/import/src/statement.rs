use billshare_core::TransactionRecord;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::fields::{split_fields, FieldError};

/// Length of the leading `MM/DD/YYYY,` token.
const DATE_TOKEN_LEN: usize = 11;
const DATE_FORMAT: &str = "%m/%d/%Y";
/// Largest magnitude accepted for an amount or balance, in whole dollars.
const MAX_ABS_AMOUNT: i64 = 1_000_000_000_000_000;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParseErrorKind {
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("unterminated quote in field {field}")]
    UnterminatedQuote { field: usize },
    #[error("unexpected '{found}' after closing quote in field {field}")]
    UnexpectedCharacter { field: usize, found: char },
    #[error("missing {0} field")]
    MissingField(&'static str),
    #[error("invalid {field}: {value:?}")]
    InvalidAmount { field: &'static str, value: String },
    #[error("{field} out of range: {value:?}")]
    AmountOutOfRange { field: &'static str, value: String },
}

impl From<FieldError> for ParseErrorKind {
    fn from(e: FieldError) -> Self {
        match e {
            FieldError::UnterminatedQuote { field } => ParseErrorKind::UnterminatedQuote { field },
            FieldError::UnexpectedCharacter { field, found } => {
                ParseErrorKind::UnexpectedCharacter { field, found }
            }
        }
    }
}

/// A dated statement line that could not be turned into a record.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("line {line_number}: {kind}: {line}")]
pub struct ParseError {
    pub line_number: usize,
    pub line: String,
    pub kind: ParseErrorKind,
}

#[derive(Error, Debug)]
pub enum StatementError {
    #[error("failed to read statement {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedStatement {
    pub records: Vec<TransactionRecord>,
    pub errors: Vec<ParseError>,
    /// Preamble, header, footer and blank lines.
    pub skipped_lines: usize,
}

/// Parse one line from the transaction section of a statement export.
///
/// Returns `Ok(None)` for lines that do not begin with a `MM/DD/YYYY,` token;
/// those are statement metadata, not errors.
pub fn parse_line(line: &str) -> Result<Option<TransactionRecord>, ParseErrorKind> {
    let Some((date_token, rest)) = split_date_token(line) else {
        return Ok(None);
    };

    let date = NaiveDate::parse_from_str(date_token, DATE_FORMAT)
        .map_err(|_| ParseErrorKind::InvalidDate(date_token.to_string()))?;

    let mut fields = split_fields(rest)?.into_iter();
    let description = fields.next().ok_or(ParseErrorKind::MissingField("description"))?;
    let amount = fields.next().ok_or(ParseErrorKind::MissingField("amount"))?;
    let balance = fields.next().ok_or(ParseErrorKind::MissingField("balance"))?;

    Ok(Some(TransactionRecord {
        date,
        description,
        amount: parse_amount("amount", &amount)?,
        running_balance: parse_amount("balance", &balance)?,
    }))
}

/// Parse the full text of a statement export.
///
/// A bad line is reported in `errors` and never stops the rest of the batch.
pub fn parse_statement(raw_text: &str) -> ParsedStatement {
    let text = raw_text.strip_prefix('\u{feff}').unwrap_or(raw_text);
    let mut parsed = ParsedStatement::default();

    for (idx, line) in text.lines().enumerate() {
        match parse_line(line) {
            Ok(Some(record)) => parsed.records.push(record),
            Ok(None) => parsed.skipped_lines += 1,
            Err(kind) => {
                let error = ParseError {
                    line_number: idx + 1,
                    line: line.to_string(),
                    kind,
                };
                tracing::warn!("Skipping statement line: {error}");
                parsed.errors.push(error);
            }
        }
    }

    tracing::debug!(
        records = parsed.records.len(),
        errors = parsed.errors.len(),
        skipped = parsed.skipped_lines,
        "Parsed statement"
    );
    parsed
}

pub fn parse_statement_reader<R: Read>(mut reader: R) -> std::io::Result<ParsedStatement> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(parse_statement(&text))
}

pub fn parse_statement_file(path: impl AsRef<Path>) -> Result<ParsedStatement, StatementError> {
    let path = path.as_ref();
    let io_err = |source| StatementError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::open(path).map_err(io_err)?;
    parse_statement_reader(file).map_err(io_err)
}

fn split_date_token(line: &str) -> Option<(&str, &str)> {
    let bytes = line.as_bytes();
    if bytes.len() < DATE_TOKEN_LEN {
        return None;
    }
    let shaped = bytes[..DATE_TOKEN_LEN].iter().enumerate().all(|(i, b)| match i {
        2 | 5 => *b == b'/',
        10 => *b == b',',
        _ => b.is_ascii_digit(),
    });
    // All eleven bytes are ASCII here, so both slices fall on char boundaries.
    shaped.then(|| (&line[..DATE_TOKEN_LEN - 1], &line[DATE_TOKEN_LEN..]))
}

fn parse_amount(field: &'static str, raw: &str) -> Result<Decimal, ParseErrorKind> {
    let cleaned = raw.replace(['"', ','], "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(ParseErrorKind::InvalidAmount {
            field,
            value: raw.to_string(),
        });
    }
    let amount = Decimal::from_str(cleaned).map_err(|_| ParseErrorKind::InvalidAmount {
        field,
        value: raw.to_string(),
    })?;
    if amount.abs() > Decimal::from(MAX_ABS_AMOUNT) {
        return Err(ParseErrorKind::AmountOutOfRange {
            field,
            value: raw.to_string(),
        });
    }
    Ok(amount)
}
