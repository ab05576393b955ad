//! Reads the recording date out of an RKG ghost record.
//!
//! The date lives in three bytes starting at offset 9, packed as a
//! 7-bit year offset (from 2000), a 4-bit month and a 5-bit day:
//!
//! ```text
//! byte 9      byte 10     byte 11
//! ....yyyy    yyymmmmd    dddd....
//! ```

use std::fmt;

/// The file extension RKG records are uploaded with.
pub const EXTENSION: &str = ".rkg";

/// Bytes needed to reach the end of the date field.
const MINIMUM_LENGTH: usize = 12;

const DATE_OFFSET: usize = 9;

/// A calendar date taken from a record. Only ever constructed with an
/// in-range day and month.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordDate {
    day: u8,
    month: u8,
    year: u16,
}

impl RecordDate {
    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn year(&self) -> u16 {
        self.year
    }
}

/// Formats as `dd.mm.yyyy`, which is what the sheet and the JSON
/// response carry.
impl fmt::Display for RecordDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}.{:02}.{:04}", self.day, self.month, self.year)
    }
}

/// Returns whether `filename` looks like an RKG record, ignoring case.
///
/// ```
/// use uploader::rkg::is_record_name;
/// assert!(is_record_name("01m23s4567890 Luigi Circuit.RKG"));
/// assert!(!is_record_name("notes.txt"));
/// ```
pub fn is_record_name(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(EXTENSION)
}

/// Extracts the embedded date, or `None` if the buffer is too short or
/// the month or day is out of range.
pub fn decode(buffer: &[u8]) -> Option<RecordDate> {
    if buffer.len() < MINIMUM_LENGTH {
        return None;
    }

    let (b9, b10, b11) = (
        buffer[DATE_OFFSET],
        buffer[DATE_OFFSET + 1],
        buffer[DATE_OFFSET + 2],
    );

    let year_offset = ((b9 & 0x0F) << 3) | (b10 >> 5);
    let month = (b10 >> 1) & 0x0F;
    let day = ((b10 & 0x01) << 4) | (b11 >> 4);

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }

    Some(RecordDate {
        day,
        month,
        year: 2000 + u16::from(year_offset),
    })
}
