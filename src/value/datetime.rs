use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use std::str::FromStr;
use thiserror::Error;

/// An RFC 3339 date, time or date-time value.
///
/// The decoded fields are kept exactly as written: the offset of an
/// offset date-time is recorded, not applied. Use [`Datetime::to_utc`]
/// for the normalized instant. The source text is retained in
/// [`Datetime::raw`].
#[derive(Debug, Clone)]
pub struct Datetime {
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    offset: Option<FixedOffset>,
    raw: String,
}

/// The four TOML date/time flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatetimeKind {
    OffsetDateTime,
    LocalDateTime,
    LocalDate,
    LocalTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatetimeError {
    #[error("invalid {field} `{value}` in date-time")]
    OutOfRange { field: &'static str, value: String },
    #[error("malformed date-time")]
    Malformed,
}

impl Datetime {
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn time(&self) -> Option<NaiveTime> {
        self.time
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    /// The text the value was decoded from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> DatetimeKind {
        match (self.date, self.time, self.offset) {
            (Some(_), Some(_), Some(_)) => DatetimeKind::OffsetDateTime,
            (Some(_), Some(_), None) => DatetimeKind::LocalDateTime,
            (Some(_), None, _) => DatetimeKind::LocalDate,
            (None, _, _) => DatetimeKind::LocalTime,
        }
    }

    /// The UTC instant of an offset date-time; `None` for local values.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        let naive = self.date?.and_time(self.time?);
        let local = self.offset?.from_local_datetime(&naive).single()?;
        Some(local.with_timezone(&Utc))
    }
}

impl PartialEq for Datetime {
    fn eq(&self, other: &Self) -> bool {
        self.date == other.date && self.time == other.time && self.offset == other.offset
    }
}

impl Eq for Datetime {}

impl core::fmt::Display for Datetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Datetime {
    type Err = DatetimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cursor = Cursor {
            bytes: s.as_bytes(),
            pos: 0,
        };
        let date = if s.len() > 4 && s.as_bytes()[4] == b'-' {
            Some(cursor.date()?)
        } else {
            None
        };
        let time = match date {
            Some(_) if cursor.is_done() => None,
            Some(_) => match cursor.peek() {
                Some(b'T' | b't' | b' ') => {
                    cursor.pos += 1;
                    Some(cursor.time()?)
                }
                _ => return Err(DatetimeError::Malformed),
            },
            None => Some(cursor.time()?),
        };
        let offset = if date.is_some() && time.is_some() && !cursor.is_done() {
            Some(cursor.offset()?)
        } else {
            None
        };
        if !cursor.is_done() {
            return Err(DatetimeError::Malformed);
        }
        Ok(Datetime {
            date,
            time,
            offset,
            raw: s.to_string(),
        })
    }
}

impl From<NaiveDate> for Datetime {
    fn from(date: NaiveDate) -> Self {
        Datetime {
            date: Some(date),
            time: None,
            offset: None,
            raw: date.format("%Y-%m-%d").to_string(),
        }
    }
}

impl From<NaiveTime> for Datetime {
    fn from(time: NaiveTime) -> Self {
        Datetime {
            date: None,
            time: Some(time),
            offset: None,
            raw: time.format("%H:%M:%S%.f").to_string(),
        }
    }
}

impl From<NaiveDateTime> for Datetime {
    fn from(datetime: NaiveDateTime) -> Self {
        Datetime {
            date: Some(datetime.date()),
            time: Some(datetime.time()),
            offset: None,
            raw: datetime.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        }
    }
}

impl From<DateTime<FixedOffset>> for Datetime {
    fn from(datetime: DateTime<FixedOffset>) -> Self {
        let naive = datetime.naive_local();
        Datetime {
            date: Some(naive.date()),
            time: Some(naive.time()),
            offset: Some(*datetime.offset()),
            raw: datetime.format("%Y-%m-%dT%H:%M:%S%.f%:z").to_string(),
        }
    }
}

/// Whether `s` starts like a date (`YYYY-M`) or a time (`HH:`), and must
/// therefore be a valid date-time.
pub(crate) fn looks_like_datetime(s: &str) -> bool {
    let b = s.as_bytes();
    let digits = |range: std::ops::Range<usize>| b[range].iter().all(u8::is_ascii_digit);
    (b.len() > 5 && digits(0..4) && b[4] == b'-' && b[5].is_ascii_digit())
        || (b.len() > 2 && digits(0..2) && b[2] == b':')
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn is_done(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn expect(&mut self, b: u8) -> Result<(), DatetimeError> {
        if self.peek() == Some(b) {
            self.pos += 1;
            Ok(())
        } else {
            Err(DatetimeError::Malformed)
        }
    }

    fn digits(&mut self, count: usize) -> Result<u32, DatetimeError> {
        let end = self.pos + count;
        let digits = self
            .bytes
            .get(self.pos..end)
            .filter(|d| d.iter().all(u8::is_ascii_digit))
            .ok_or(DatetimeError::Malformed)?;
        self.pos = end;
        Ok(digits
            .iter()
            .fold(0, |acc, d| acc * 10 + u32::from(d - b'0')))
    }

    fn field(&mut self, field: &'static str, max: u32) -> Result<u32, DatetimeError> {
        let start = self.pos;
        let value = self.digits(2)?;
        if value > max {
            return Err(out_of_range(field, &self.bytes[start..self.pos]));
        }
        Ok(value)
    }

    fn date(&mut self) -> Result<NaiveDate, DatetimeError> {
        let start = self.pos;
        let year = self.digits(4)?;
        self.expect(b'-')?;
        let month_start = self.pos;
        let month = self.field("month", 12)?;
        if month == 0 {
            return Err(out_of_range("month", &self.bytes[month_start..self.pos]));
        }
        self.expect(b'-')?;
        let day_start = self.pos;
        let day = self.field("day", 31)?;
        if day == 0 {
            return Err(out_of_range("day", &self.bytes[day_start..self.pos]));
        }
        NaiveDate::from_ymd_opt(year as i32, month, day)
            .ok_or_else(|| out_of_range("date", &self.bytes[start..self.pos]))
    }

    fn time(&mut self) -> Result<NaiveTime, DatetimeError> {
        let start = self.pos;
        let hour = self.field("hour", 23)?;
        self.expect(b':')?;
        let minute = self.field("minute", 59)?;
        self.expect(b':')?;
        let second = self.field("second", 60)?;
        let mut nanos = 0;
        if self.peek() == Some(b'.') {
            self.pos += 1;
            let fraction_start = self.pos;
            while self.peek().map_or(false, |b| b.is_ascii_digit()) {
                self.pos += 1;
            }
            let fraction = &self.bytes[fraction_start..self.pos];
            if fraction.is_empty() {
                return Err(DatetimeError::Malformed);
            }
            // digits past nanosecond precision are truncated
            nanos = (0..9).fold(0, |acc, i| {
                acc * 10 + fraction.get(i).map_or(0, |d| u32::from(d - b'0'))
            });
        }
        let time = if second == 60 {
            NaiveTime::from_hms_nano_opt(hour, minute, 59, 1_000_000_000 + nanos)
        } else {
            NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
        };
        time.ok_or_else(|| out_of_range("time", &self.bytes[start..self.pos]))
    }

    fn offset(&mut self) -> Result<FixedOffset, DatetimeError> {
        let start = self.pos;
        let sign = match self.peek() {
            Some(b'Z' | b'z') => {
                self.pos += 1;
                return FixedOffset::east_opt(0).ok_or(DatetimeError::Malformed);
            }
            Some(b'+') => 1,
            Some(b'-') => -1,
            _ => return Err(DatetimeError::Malformed),
        };
        self.pos += 1;
        let hours = self.field("offset hour", 23)?;
        self.expect(b':')?;
        let minutes = self.field("offset minute", 59)?;
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60) as i32)
            .ok_or_else(|| out_of_range("offset", &self.bytes[start..self.pos]))
    }
}

fn out_of_range(field: &'static str, value: &[u8]) -> DatetimeError {
    DatetimeError::OutOfRange {
        field,
        value: String::from_utf8_lossy(value).into_owned(),
    }
}
