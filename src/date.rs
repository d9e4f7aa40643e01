//! Parsing of client-supplied date strings into the canonical form.
//!
//! Clients may submit dates in a number of common formats. Every date is
//! stored as a `DD-MM-YYYY` string, and the month/year filters re-parse that
//! same canonical form.

use chrono::{Datelike, NaiveDate};

use crate::Error;

/// The format of the canonical date string, e.g. "15-03-2024".
pub const CANONICAL_FORMAT: &str = "%d-%m-%Y";

/// The date formats accepted from clients, tried in order.
///
/// The order matters for ambiguous inputs: "03/04/2024" is parsed as the
/// US-style month/day form because it appears first in the list.
const ACCEPTED_FORMATS: [&str; 11] = [
    "%Y-%m-%d",  // 2024-03-15
    "%m/%d/%Y",  // 03/15/2024
    "%d %B %Y",  // 15 March 2024
    "%Y/%m/%d",  // 2024/03/15
    "%B %d, %Y", // March 15, 2024
    "%d %b, %Y", // 15 Mar, 2024
    "%Y, %b %d", // 2024, Mar 15
    "%d/%m/%y",  // 15/03/24
    "%d/%m/%Y",  // 15/03/2024
    "%d.%m.%Y",  // 15.03.2024
    CANONICAL_FORMAT,
];

/// Parse `input` against the accepted formats and re-render the first match
/// in the canonical `DD-MM-YYYY` form.
///
/// # Errors
/// Returns [Error::InvalidDate] if `input` does not strictly match any of the
/// accepted formats.
pub fn canonicalize(input: &str) -> Result<String, Error> {
    ACCEPTED_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input.trim(), format).ok())
        .map(|date| date.format(CANONICAL_FORMAT).to_string())
        .ok_or(Error::InvalidDate)
}

/// Extract the month and year from a canonical `DD-MM-YYYY` date string.
///
/// # Errors
/// Returns [Error::InvalidDate] if `canonical` is not in the canonical form.
pub fn month_and_year(canonical: &str) -> Result<(u32, i32), Error> {
    NaiveDate::parse_from_str(canonical, CANONICAL_FORMAT)
        .map(|date| (date.month(), date.year()))
        .map_err(|_| Error::InvalidDate)
}


#[cfg(test)]
mod month_and_year_tests {
    use crate::Error;

    use super::month_and_year;

    #[test]
    fn canonical_dates_round_trip() {
        assert_eq!(month_and_year("15-03-2024"), Ok((3, 2024)));
        assert_eq!(month_and_year("01-12-1999"), Ok((12, 1999)));
    }

    #[test]
    fn non_canonical_dates_are_rejected() {
        assert_eq!(month_and_year("2024-03-15"), Err(Error::InvalidDate));
        assert_eq!(month_and_year("not a date"), Err(Error::InvalidDate));
    }
}
