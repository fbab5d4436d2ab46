//! Locale contract for the engine.
//!
//! A `Locale` decides how text is read as a number or a date when a function
//! coerces `Text` arguments. The invariant locale uses `.` as the decimal
//! separator, `,` for digit grouping and month/day/year ordering.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use xlcalc_common::{
    MAX_SERIAL_DATE, PHANTOM_LEAP_DAY, date_to_serial, datetime_to_serial, time_to_fraction,
};

/// Order of the numeric components in a date written like `1/4/2021`.
/// A leading four-digit year (`2021-01-04`) is always read as year-month-day.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DateOrder {
    Mdy,
    Dmy,
    Ymd,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Locale {
    pub decimal_separator: char,
    pub group_separator: char,
    pub currency_symbol: char,
    pub date_order: DateOrder,
}

impl Default for Locale {
    fn default() -> Self {
        Self::invariant()
    }
}

impl Locale {
    pub const fn invariant() -> Self {
        Locale {
            decimal_separator: '.',
            group_separator: ',',
            currency_symbol: '$',
            date_order: DateOrder::Mdy,
        }
    }

    /// Comma decimal separator, dot grouping, day-first dates (`4.1.2021`).
    pub const fn continental() -> Self {
        Locale {
            decimal_separator: ',',
            group_separator: '.',
            currency_symbol: '€',
            date_order: DateOrder::Dmy,
        }
    }

    pub const fn with_date_order(mut self, order: DateOrder) -> Self {
        self.date_order = order;
        self
    }

    /// Parse a number as typed into a cell: optional sign or accounting
    /// parentheses, currency symbol, group separators in the integer part,
    /// exponent and a trailing percent sign.
    pub fn parse_number(&self, s: &str) -> Option<f64> {
        let mut t = s.trim();
        if t.is_empty() {
            return None;
        }
        let mut negative = false;
        if let Some(inner) = t.strip_prefix('(').and_then(|x| x.strip_suffix(')')) {
            negative = true;
            t = inner.trim();
        }
        let mut percent = false;
        if let Some(x) = t.strip_suffix('%') {
            percent = true;
            t = x.trim_end();
        }
        if let Some(x) = t.strip_prefix('-') {
            negative = !negative;
            t = x.trim_start();
        } else if let Some(x) = t.strip_prefix('+') {
            t = x.trim_start();
        }
        if let Some(x) = t.strip_prefix(self.currency_symbol) {
            t = x.trim_start();
        }

        let mut out = String::with_capacity(t.len());
        let mut seen_decimal = false;
        let mut seen_exp = false;
        let mut int_digits = 0usize;
        for ch in t.chars() {
            if ch.is_ascii_digit() {
                out.push(ch);
                if !seen_decimal && !seen_exp {
                    int_digits += 1;
                }
            } else if ch == self.decimal_separator && !seen_decimal && !seen_exp {
                seen_decimal = true;
                out.push('.');
            } else if ch == self.group_separator && !seen_decimal && !seen_exp && int_digits > 0 {
                continue;
            } else if (ch == 'e' || ch == 'E') && !seen_exp && int_digits > 0 {
                seen_exp = true;
                out.push('e');
            } else if (ch == '+' || ch == '-') && out.ends_with('e') {
                out.push(ch);
            } else {
                return None;
            }
        }
        if !out.bytes().any(|b| b.is_ascii_digit()) {
            return None;
        }
        let mut n: f64 = out.parse().ok()?;
        if percent {
            n /= 100.0;
        }
        if negative {
            n = -n;
        }
        n.is_finite().then_some(n)
    }

    /// Parse date and/or time text into a serial number. Pure time text
    /// yields a day fraction; date text yields a whole serial plus the
    /// optional time of day.
    pub fn parse_date_time(&self, s: &str) -> Option<f64> {
        let s = s.trim();
        if let Some(dt) = ISO_DATE_TIME_FORMATS
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        {
            let serial = datetime_to_serial(&dt);
            return (1.0..(MAX_SERIAL_DATE + 1) as f64)
                .contains(&serial)
                .then_some(serial);
        }

        let tokens: Vec<&str> = s.split_whitespace().collect();
        let (date_part, time_part) = match tokens.iter().position(|t| t.contains(':')) {
            Some(i) => (tokens[..i].join(" "), tokens[i..].join(" ")),
            None => (tokens.join(" "), String::new()),
        };
        match (date_part.is_empty(), time_part.is_empty()) {
            (true, true) => None,
            (true, false) => parse_time(&time_part),
            (false, true) => self.parse_date(&date_part).map(|d| d as f64),
            (false, false) => Some(self.parse_date(&date_part)? as f64 + parse_time(&time_part)?),
        }
    }

    /// Numeric layouts in this locale's order first, then the month-name and
    /// ISO layouts every locale accepts.
    fn date_formats(&self) -> impl Iterator<Item = &'static str> {
        let ordered: &'static [&'static str] = match self.date_order {
            DateOrder::Mdy => MDY_FORMATS,
            DateOrder::Dmy => DMY_FORMATS,
            DateOrder::Ymd => YMD_FORMATS,
        };
        ordered.iter().chain(SHARED_DATE_FORMATS).copied()
    }

    fn parse_date(&self, s: &str) -> Option<i64> {
        match self
            .date_formats()
            .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        {
            Some(date) => {
                let serial = date_to_serial(&date);
                (1..=MAX_SERIAL_DATE).contains(&serial).then_some(serial)
            }
            None => self.is_phantom_leap_day(s).then_some(PHANTOM_LEAP_DAY),
        }
    }

    // chrono has no 1900-02-29; read the text as 1904 and look for Feb 29.
    fn is_phantom_leap_day(&self, s: &str) -> bool {
        if !s.contains("1900") {
            return false;
        }
        let leap_year = s.replacen("1900", "1904", 1);
        self.date_formats()
            .filter_map(|f| NaiveDate::parse_from_str(&leap_year, f).ok())
            .any(|d| (d.month(), d.day()) == (2, 29))
    }
}

const MDY_FORMATS: &[&str] = &["%m/%d/%Y", "%m-%d-%Y"];
const DMY_FORMATS: &[&str] = &["%d/%m/%Y", "%d.%m.%Y", "%d-%m-%Y"];
const YMD_FORMATS: &[&str] = &["%Y.%m.%d"];

// %b and %B both accept short and long month names when parsing.
const SHARED_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",  // 2021-01-04
    "%Y/%m/%d",  // 2021/01/04
    "%d-%b-%Y",  // 4-Jan-2021
    "%d %b %Y",  // 4 January 2021
    "%b %d, %Y", // January 4, 2021
    "%b %d %Y",  // Jan 4 2021
];

const ISO_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

const TIME_FORMATS: &[&str] = &[
    "%H:%M:%S%.f",    // 14:30:00.5
    "%H:%M",          // 14:30
    "%I:%M:%S%.f %p", // 02:30:00 PM
    "%I:%M %p",       // 02:30 PM
    "%I:%M:%S%.f%p",  // 02:30:00PM
    "%I:%M%p",        // 02:30PM
];

fn parse_time(s: &str) -> Option<f64> {
    TIME_FORMATS
        .iter()
        .find_map(|f| NaiveTime::parse_from_str(s, f).ok())
        .map(|t| time_to_fraction(&t))
}
