//! `month` / `year` filters of the entry listing.
//!
//! Supported forms:
//! - YYYY-MM  (month 01..12)
//! - YYYY
//!
//! Each period maps to a half-open UTC range `[start, end)`, so an entry
//! stamped at the first instant of the next period never leaks in.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}$").expect("valid month pattern"));
static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}$").expect("valid year pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, dt: &DateTime<Utc>) -> bool {
        *dt >= self.start && *dt < self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Month { year: i32, month: u32 },
    Year(i32),
}

fn utc_midnight(year: i32, month: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        // year ∈ 0..=10000 and month ∈ 1..=12 here
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl Period {
    pub fn range(&self) -> DateRange {
        match *self {
            Period::Month { year, month } => {
                let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
                DateRange {
                    start: utc_midnight(year, month),
                    end: utc_midnight(ny, nm),
                }
            }
            Period::Year(year) => DateRange {
                start: utc_midnight(year, 1),
                end: utc_midnight(year + 1, 1),
            },
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
            Period::Year(year) => write!(f, "{:04}", year),
        }
    }
}

pub fn parse_month(raw: &str) -> AppResult<Period> {
    if !MONTH_RE.is_match(raw) {
        return Err(AppError::bad_request("Invalid month format. Use YYYY-MM."));
    }

    let year: i32 = raw[0..4]
        .parse()
        .map_err(|_| AppError::bad_request("Invalid month value."))?;
    let month: u32 = raw[5..7]
        .parse()
        .map_err(|_| AppError::bad_request("Invalid month value."))?;

    if !(1..=12).contains(&month) {
        return Err(AppError::bad_request("Invalid month value."));
    }

    Ok(Period::Month { year, month })
}

pub fn parse_year(raw: &str) -> AppResult<Period> {
    if !YEAR_RE.is_match(raw) {
        return Err(AppError::bad_request("Invalid year format. Use YYYY."));
    }

    let year: i32 = raw
        .parse()
        .map_err(|_| AppError::bad_request("Invalid year value."))?;

    Ok(Period::Year(year))
}

/// Resolve the listing filter. A non-empty `month` wins over `year`;
/// empty parameters count as absent.
pub fn resolve_filter(month: Option<&str>, year: Option<&str>) -> AppResult<Option<Period>> {
    match (month.filter(|m| !m.is_empty()), year.filter(|y| !y.is_empty())) {
        (Some(m), _) => parse_month(m).map(Some),
        (None, Some(y)) => parse_year(y).map(Some),
        (None, None) => Ok(None),
    }
}
