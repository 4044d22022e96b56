//! Imported bank transactions.
//!
//! The server's machine-readable date is kept verbatim in [`TransactionDate`]
//! and sent back unchanged on updates; the `YYYY-MM-DD` presentation form is
//! derived on demand and never parsed back into a wire value.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::ResourceId;
use super::lenient;

const DISPLAY_DATE_FORMAT: &str = "%Y-%m-%d";
const GROUP_SEPARATOR: &str = "\u{a0}";
const MINUS_SIGN: char = '\u{2212}';

/// Date of a transaction exactly as the backend sent it.
///
/// # Examples
/// ```
/// use household_client::domain::TransactionDate;
///
/// let date = TransactionDate::new("2023-10-25T00:00:00");
/// assert_eq!(date.display(), "2023-10-25");
/// assert_eq!(date.as_str(), "2023-10-25T00:00:00");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionDate(String);

impl TransactionDate {
    /// Wrap a raw date value.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw value as received from the backend.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Render the date as `YYYY-MM-DD`.
    ///
    /// Timestamps carrying an offset are shown in the local time zone; naive
    /// timestamps and plain dates are shown as written. Unparseable values are
    /// displayed verbatim.
    #[must_use]
    pub fn display(&self) -> String {
        let raw = self.0.trim();
        if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
            return instant
                .with_timezone(&Local)
                .format(DISPLAY_DATE_FORMAT)
                .to_string();
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return naive.format(DISPLAY_DATE_FORMAT).to_string();
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, DISPLAY_DATE_FORMAT) {
            return date.format(DISPLAY_DATE_FORMAT).to_string();
        }
        raw.to_owned()
    }
}

impl fmt::Display for TransactionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// One bank transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Identifier; server-assigned or generated client-side for imports.
    pub id: ResourceId,
    /// Booking date.
    pub date: TransactionDate,
    /// Statement text, e.g. "ICA SUPERMARKET".
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
    /// Free-form category; not validated against the taxonomy.
    #[serde(default, deserialize_with = "lenient::text")]
    pub category: String,
    /// Signed amount in SEK; negative for spending.
    pub amount: f64,
}

impl Transaction {
    /// Presentation date (`YYYY-MM-DD`).
    #[must_use]
    pub fn display_date(&self) -> String {
        self.date.display()
    }

    /// Amount formatted as Swedish kronor, e.g. `−1 234,50 kr`.
    #[must_use]
    pub fn display_amount(&self) -> String {
        format_kronor(self.amount)
    }
}

/// Format an amount the way the Swedish locale renders SEK currency.
///
/// # Examples
/// ```
/// use household_client::domain::format_kronor;
///
/// assert_eq!(format_kronor(-450.0), "\u{2212}450,00\u{a0}kr");
/// assert_eq!(format_kronor(12345.5), "12\u{a0}345,50\u{a0}kr");
/// ```
#[must_use]
pub fn format_kronor(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let digits: Vec<char> = whole.chars().collect();
    let grouped = digits
        .rchunks(3)
        .rev()
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(GROUP_SEPARATOR);
    let is_negative = amount.is_sign_negative()
        && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if is_negative {
        MINUS_SIGN.to_string()
    } else {
        String::new()
    };
    format!("{sign}{grouped},{fraction}{GROUP_SEPARATOR}kr")
}
