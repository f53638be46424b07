// File: src/model/parser.rs
//! Parsing of the free-text delivery-time labels written by the item-creation flow,
//! e.g. "Nov 21, 2025, 4:06 PM - 7:06 PM" or "Jul 19, 2025".
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

// NBSP, narrow NBSP and thin space. Locale formatters put these around AM/PM.
const ODD_SPACES: [char; 3] = ['\u{00A0}', '\u{202F}', '\u{2009}'];

// Hyphen, en-dash, em-dash.
const RANGE_SEPARATORS: [char; 3] = ['-', '\u{2013}', '\u{2014}'];

/// Replaces odd spaces, trims, and collapses whitespace runs to one space.
pub fn normalize_label(s: &str) -> String {
    let replaced: String = s
        .chars()
        .map(|c| if ODD_SPACES.contains(&c) { ' ' } else { c })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keeps only the "from" part of a time range.
fn strip_range(s: &str) -> &str {
    match s.find(RANGE_SEPARATORS) {
        Some(idx) => s[..idx].trim_end(),
        None => s,
    }
}

fn month_from_token(token: &str) -> Option<u32> {
    let prefix = token.get(..3)?.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == prefix)
        .map(|idx| idx as u32 + 1)
}

/// Minimal forward-only scanner over ASCII tokens.
#[derive(Clone, Copy)]
struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }

    /// Takes up to `max` leading chars matching `pred`.
    fn take_while(&mut self, max: usize, pred: impl Fn(char) -> bool) -> &'a str {
        let len = self
            .rest
            .char_indices()
            .take(max)
            .take_while(|(_, c)| pred(*c))
            .map(|(i, c)| i + c.len_utf8())
            .last()
            .unwrap_or(0);
        let (head, tail) = self.rest.split_at(len);
        self.rest = tail;
        head
    }

    fn digits(&mut self, min: usize, max: usize) -> Option<u32> {
        let d = self.take_while(max, |c| c.is_ascii_digit());
        if d.len() < min {
            return None;
        }
        d.parse().ok()
    }

    fn eat(&mut self, c: char) -> bool {
        match self.rest.strip_prefix(c) {
            Some(tail) => {
                self.rest = tail;
                true
            }
            None => false,
        }
    }

    fn skip_spaces(&mut self) -> usize {
        self.take_while(usize::MAX, |c| c == ' ').len()
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
enum Meridiem {
    Am,
    Pm,
}

/// `<Month> <Day>, <Year>` and its optional `, <H>:<MM>[ AM|PM]` tail.
#[derive(Debug, PartialEq)]
struct LabelParts {
    month: u32,
    day: u32,
    year: i32,
    time: Option<(u32, u32, Option<Meridiem>)>,
}

fn scan_time(cur: &mut Cursor<'_>) -> Option<(u32, u32, Option<Meridiem>)> {
    if !cur.eat(',') {
        return None;
    }
    cur.skip_spaces();
    let hour = cur.digits(1, 2)?;
    if !cur.eat(':') {
        return None;
    }
    let minute = cur.digits(2, 2)?;

    let mut ahead = *cur;
    ahead.skip_spaces();
    let marker = ahead.take_while(2, |c| c.is_ascii_alphabetic());
    let meridiem = match marker.to_ascii_lowercase().as_str() {
        "am" => Some(Meridiem::Am),
        "pm" => Some(Meridiem::Pm),
        _ => None,
    };
    if meridiem.is_some() {
        *cur = ahead;
    }
    Some((hour, minute, meridiem))
}

fn scan_label(s: &str) -> Option<LabelParts> {
    let mut cur = Cursor::new(s);

    let month_token = cur.take_while(usize::MAX, |c| c.is_ascii_alphabetic());
    if month_token.len() < 3 || cur.skip_spaces() == 0 {
        return None;
    }
    let day = cur.digits(1, 2)?;
    if !cur.eat(',') {
        return None;
    }
    cur.skip_spaces();
    let year = cur.digits(4, 4)? as i32;

    // The time tail is optional: a malformed one leaves a date-only label.
    let mut tail = cur;
    let time = scan_time(&mut tail);

    Some(LabelParts {
        month: month_from_token(month_token)?,
        day,
        year,
        time,
    })
}

fn to_24h(hour: u32, meridiem: Option<Meridiem>) -> u32 {
    match meridiem {
        Some(Meridiem::Pm) if hour < 12 => hour + 12,
        Some(Meridiem::Am) if hour == 12 => 0,
        _ => hour,
    }
}

/// Day and time are applied as offsets from the first of the month, so
/// "Feb 30" lands on March 2 instead of failing.
fn build_moment(parts: &LabelParts) -> Option<NaiveDateTime> {
    let first = NaiveDate::from_ymd_opt(parts.year, parts.month, 1)?;
    let (hour, minute) = match parts.time {
        Some((h, m, meridiem)) => (to_24h(h, meridiem), m),
        None => (0, 0),
    };
    first
        .and_time(NaiveTime::MIN)
        .checked_add_signed(Duration::days(i64::from(parts.day) - 1))?
        .checked_add_signed(Duration::hours(i64::from(hour)))?
        .checked_add_signed(Duration::minutes(i64::from(minute)))
}

/// ISO-8601 only. Offsets are converted into the local calendar.
fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    const FORMATS: [&str; 5] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Parses a delivery-time label into a local wall-clock moment.
///
/// Only the start of a range is kept. A label without a time resolves to
/// midnight. Returns `None` for empty or unrecognised input; the caller
/// decides how to treat that (the tab classifier files it under Future).
pub fn parse_delivery_time(text: &str) -> Option<NaiveDateTime> {
    let normalized = normalize_label(text);
    if normalized.is_empty() {
        return None;
    }

    if let Some(moment) = scan_label(strip_range(&normalized)).and_then(|p| build_moment(&p)) {
        return Some(moment);
    }

    // Range stripping would cut ISO dates at their first hyphen.
    parse_iso(&normalized)
}

/// Formats a label the way the item-creation form does:
/// `"Nov 21, 2025, 4:06 PM"` or `"Nov 21, 2025, 4:06 PM - 7:06 PM"`.
pub fn format_delivery_time(date: NaiveDate, from: NaiveTime, to: Option<NaiveTime>) -> String {
    let day = date.format("%b %-d, %Y");
    let from = from.format("%-I:%M %p");
    match to {
        Some(to) => format!("{}, {} - {}", day, from, to.format("%-I:%M %p")),
        None => format!("{}, {}", day, from),
    }
}
