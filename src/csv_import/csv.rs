//! Parses the CSV format used for bulk importing wallet transactions.
//!
//! The header row must name the columns `type,amount,reference,description,date`
//! and optionally `status`. Column order does not matter.

use serde::Deserialize;
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

use crate::{
    Error,
    transaction::{Transaction, TransactionBuilder, TransactionStatus, TransactionType},
};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "type")]
    transaction_type: String,
    amount: String,
    #[serde(default)]
    reference: String,
    #[serde(default)]
    description: String,
    date: String,
    #[serde(default)]
    status: Option<String>,
}

/// Parses the rows of a transaction CSV file.
///
/// Dates may be RFC 3339 date-times or plain `YYYY-MM-DD` dates, the latter
/// are taken as midnight in `local_offset`. Rows without a status are
/// completed. Dates after `today` are rejected.
///
/// # Errors
/// Returns [Error::InvalidCSV] naming the first bad line if the header is
/// missing a column or any row cannot be parsed.
pub fn parse_csv(
    text: &str,
    local_offset: UtcOffset,
    today: Date,
) -> Result<Vec<TransactionBuilder>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|error| Error::InvalidCSV(format!("could not read the header row: {error}")))?
        .clone();

    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Err(Error::InvalidCSV("the file is empty".to_owned()));
    }

    let mut transactions = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|error| Error::InvalidCSV(error.to_string()))?;
        let line = record.position().map(|position| position.line()).unwrap_or(0);

        let row: CsvRow = record
            .deserialize(Some(&headers))
            .map_err(|error| Error::InvalidCSV(format!("line {line}: {error}")))?;

        let transaction = parse_row(row, local_offset, today)
            .map_err(|error| Error::InvalidCSV(format!("line {line}: {error}")))?;

        transactions.push(transaction);
    }

    Ok(transactions)
}

/// Converts a row into a transaction, the error describes the first bad field.
fn parse_row(row: CsvRow, local_offset: UtcOffset, today: Date) -> Result<TransactionBuilder, String> {
    let transaction_type: TransactionType =
        row.transaction_type.parse().map_err(|error: Error| error.to_string())?;

    let amount: f64 = row
        .amount
        .parse()
        .map_err(|_| format!("\"{}\" is not a number", row.amount))?;

    let date = parse_date(&row.date, local_offset).map_err(|error| error.to_string())?;

    if date.to_offset(local_offset).date() > today {
        return Err(Error::FutureDate(date.date()).to_string());
    }

    let status = match row.status.as_deref() {
        None | Some("") => TransactionStatus::default(),
        Some(status) => status.parse().map_err(|error: Error| error.to_string())?,
    };

    let transaction = Transaction::build(transaction_type, amount, date)
        .reference(&row.reference)
        .description(&row.description)
        .status(status);

    transaction.validate().map_err(|error| error.to_string())?;

    Ok(transaction)
}

fn parse_date(text: &str, local_offset: UtcOffset) -> Result<OffsetDateTime, Error> {
    if let Ok(date_time) = OffsetDateTime::parse(text, &Rfc3339) {
        return Ok(date_time);
    }

    Date::parse(text, DATE_FORMAT)
        .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_offset(local_offset))
        .map_err(|_| {
            Error::InvalidDate(format!(
                "\"{text}\" is not a YYYY-MM-DD date or an RFC 3339 date-time"
            ))
        })
}
