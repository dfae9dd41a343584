//! Parsing of `LIST` output into [`FileEntry`] records.
//!
//! Only the classic nine column Unix layout is understood:
//!
//! ```text
//! drwxr-xr-x 2 ftp ftp 4096 Mar 14 09:26 reports
//! ```
//!
//! Rows with any other number of columns are dropped. This rules out names
//! containing spaces, symlink rows (`name -> target`) and DOS style listings.

use std::fmt;

use chrono::NaiveDate;
use chrono::NaiveDateTime;
use log::debug;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    // `ls -l` prints "HH:MM" for entries modified within the last six months.
    static ref TIME_RE: Regex = Regex::new(r"^(\d{1,2}):(\d{2})$").unwrap();

    // ... and the year for anything older.
    static ref YEAR_RE: Regex = Regex::new(r"^(\d{4})$").unwrap();
}

const FIELD_COUNT: usize = 9;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Why a listing row could not be turned into a [`FileEntry`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListingError {
    #[error("expected exactly 9 non-empty fields, found {0}")]
    FieldCount(usize),
    #[error("the {0} field cannot be empty")]
    MissingField(&'static str),
}

/// One row of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub mode: String,
    /// Link count on most servers.
    pub unknown: String,
    pub user: String,
    pub group: String,
    pub size: String,
    pub month: String,
    pub day: String,
    /// Either `HH:MM` or a four digit year.
    pub time: String,
    pub name: String,
}

impl FileEntry {
    /// Returns true if the mode column marks a directory.
    pub fn is_directory(&self) -> Result<bool, ListingError> {
        self.mode
            .chars()
            .next()
            .map(|kind| kind == 'd')
            .ok_or(ListingError::MissingField("mode"))
    }

    /// The size column as a number, if the server printed one.
    pub fn size_bytes(&self) -> Option<u64> {
        self.size.parse().ok()
    }

    /// Modification time built from the month, day and time columns.
    ///
    /// When the time column holds `HH:MM` the year is not part of the row, so
    /// `current_year` is used.
    pub fn modified(&self, current_year: i32) -> Option<NaiveDateTime> {
        let lower = self.month.to_ascii_lowercase();
        let month = MONTHS.iter().position(|m| *m == lower)? as u32 + 1;
        let day: u32 = self.day.parse().ok()?;

        if let Some(caps) = TIME_RE.captures(&self.time) {
            let hour: u32 = caps[1].parse().ok()?;
            let minute: u32 = caps[2].parse().ok()?;
            NaiveDate::from_ymd_opt(current_year, month, day)?.and_hms_opt(hour, minute, 0)
        } else if let Some(caps) = YEAR_RE.captures(&self.time) {
            let year: i32 = caps[1].parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)
        } else {
            None
        }
    }
}

impl fmt::Display for FileEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {:>3} {:<8} {:<8} {:>10} {} {:>2} {:>5} {}",
            self.mode,
            self.unknown,
            self.user,
            self.group,
            self.size,
            self.month,
            self.day,
            self.time,
            self.name
        )
    }
}

/// Parses a single listing row.
pub fn parse_line(line: &str) -> Result<FileEntry, ListingError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != FIELD_COUNT {
        return Err(ListingError::FieldCount(fields.len()));
    }
    Ok(FileEntry {
        mode: fields[0].to_owned(),
        unknown: fields[1].to_owned(),
        user: fields[2].to_owned(),
        group: fields[3].to_owned(),
        size: fields[4].to_owned(),
        month: fields[5].to_owned(),
        day: fields[6].to_owned(),
        time: fields[7].to_owned(),
        name: fields[8].to_owned(),
    })
}

/// Parses a raw listing, skipping every row that is not a valid entry.
pub fn parse(raw: &str) -> Vec<FileEntry> {
    let mut skipped = 0;
    let entries: Vec<FileEntry> = raw
        .split('\n')
        .filter_map(|line| match parse_line(line) {
            Ok(entry) => Some(entry),
            Err(err) => {
                skipped += 1;
                debug!("skipping listing row {:?}: {}", line, err);
                None
            }
        })
        .collect();
    debug!("parsed {} entries, skipped {} rows", entries.len(), skipped);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "total 12\r\n\
        drwxr-xr-x 2 ftp ftp 4096 Mar 14 09:26 reports\r\n\
        -rw-r--r-- 1 ftp ftp  512 Dec  1  2021 notes.txt\r\n\
        lrwxrwxrwx 1 ftp ftp    9 Jan  2 10:00 latest -> reports\r\n\
        -rw-r--r-- 1 ftp ftp   12 Jan  2 10:00 two words.txt\r\n";

    fn entry_with_mode(mode: &str) -> FileEntry {
        FileEntry {
            mode: mode.to_owned(),
            unknown: "1".to_owned(),
            user: "ftp".to_owned(),
            group: "ftp".to_owned(),
            size: "0".to_owned(),
            month: "Jan".to_owned(),
            day: "1".to_owned(),
            time: "00:00".to_owned(),
            name: "x".to_owned(),
        }
    }

    #[test]
    fn fields_are_positional() {
        let entry = parse_line("drwxr-xr-x 2 ftp users 4096 Mar 14 09:26 reports").unwrap();
        assert_eq!(entry.mode, "drwxr-xr-x");
        assert_eq!(entry.unknown, "2");
        assert_eq!(entry.user, "ftp");
        assert_eq!(entry.group, "users");
        assert_eq!(entry.size, "4096");
        assert_eq!(entry.month, "Mar");
        assert_eq!(entry.day, "14");
        assert_eq!(entry.time, "09:26");
        assert_eq!(entry.name, "reports");
    }

    #[test]
    fn wrong_field_count_is_rejected() {
        assert_eq!(
            parse_line("-rw-r--r-- 1 ftp ftp 12 Jan 2 10:00"),
            Err(ListingError::FieldCount(8))
        );
        assert_eq!(
            parse_line("-rw-r--r-- 1 ftp ftp 12 Jan 2 10:00 two words"),
            Err(ListingError::FieldCount(10))
        );
        assert_eq!(parse_line(""), Err(ListingError::FieldCount(0)));
    }

    #[test]
    fn malformed_rows_do_not_stop_parsing() {
        let entries = parse(LISTING);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["reports", "notes.txt"]);
    }

    #[test]
    fn empty_listing() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn directory_flag() {
        assert_eq!(entry_with_mode("drwxr-xr-x").is_directory(), Ok(true));
        assert_eq!(entry_with_mode("-rw-r--r--").is_directory(), Ok(false));
        assert_eq!(
            entry_with_mode("").is_directory(),
            Err(ListingError::MissingField("mode"))
        );
    }

    #[test]
    fn modification_time() {
        let entries = parse(LISTING);
        assert_eq!(
            entries[0].modified(2024),
            NaiveDate::from_ymd_opt(2024, 3, 14).unwrap().and_hms_opt(9, 26, 0)
        );
        assert_eq!(
            entries[1].modified(2024),
            NaiveDate::from_ymd_opt(2021, 12, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        let mut odd = entry_with_mode("-rw-r--r--");
        odd.month = "Foo".to_owned();
        assert_eq!(odd.modified(2024), None);
    }

    #[test]
    fn size_column() {
        let entries = parse(LISTING);
        assert_eq!(entries[1].size_bytes(), Some(512));
        let mut odd = entry_with_mode("-rw-r--r--");
        odd.size = "big".to_owned();
        assert_eq!(odd.size_bytes(), None);
    }

    #[test]
    fn display_keeps_every_column() {
        let line = parse_line("drwxr-xr-x 2 ftp ftp 4096 Mar 14 09:26 reports")
            .unwrap()
            .to_string();
        assert_eq!(parse_line(&line), parse_line("drwxr-xr-x 2 ftp ftp 4096 Mar 14 09:26 reports"));
    }
}
