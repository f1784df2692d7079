//! Declared filename patterns for the rainfall products.
//!
//! Every product names its files `<prefix><date key><suffix>`, optionally
//! followed by a compression extension. Parsing validates the whole name and
//! the embedded date instead of slicing at fixed character offsets.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};

use crate::error::{CommonError, CommonResult};
use crate::time::parse_compact_date;

/// Which date component a filename embeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateKey {
    /// `YYYYMMDD`
    Day,
    /// `YYYY`
    Year,
}

/// The date component extracted from a filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileKey {
    Day(NaiveDate),
    Year(i32),
}

impl FileKey {
    /// Calendar year of the key.
    pub fn year(&self) -> i32 {
        match self {
            FileKey::Day(date) => date.year(),
            FileKey::Year(year) => *year,
        }
    }

    /// The day, for per-day keys.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            FileKey::Day(date) => Some(*date),
            FileKey::Year(_) => None,
        }
    }
}

/// A filename pattern with a single date capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilenamePattern {
    prefix: &'static str,
    key: DateKey,
    suffix: &'static str,
    compressed_suffix: Option<&'static str>,
}

impl FilenamePattern {
    pub const fn new(prefix: &'static str, key: DateKey, suffix: &'static str) -> Self {
        Self {
            prefix,
            key,
            suffix,
            compressed_suffix: None,
        }
    }

    /// Also accept names ending in `suffix` (e.g. `.gz`).
    pub const fn with_compressed_suffix(self, suffix: &'static str) -> Self {
        Self {
            compressed_suffix: Some(suffix),
            ..self
        }
    }

    pub fn key(&self) -> DateKey {
        self.key
    }

    /// Extract the date key from a bare filename.
    pub fn parse(&self, name: &str) -> CommonResult<FileKey> {
        let mismatch = || CommonError::FilenameMismatch {
            name: name.to_string(),
            pattern: self.to_string(),
        };

        let rest = name.strip_prefix(self.prefix).ok_or_else(mismatch)?;
        let rest = self
            .compressed_suffix
            .and_then(|gz| rest.strip_suffix(gz))
            .unwrap_or(rest);
        let text = rest.strip_suffix(self.suffix).ok_or_else(mismatch)?;

        match self.key {
            DateKey::Day => parse_compact_date(text).map(FileKey::Day),
            DateKey::Year => {
                if text.len() != 4 || !text.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(CommonError::InvalidDate {
                        value: text.to_string(),
                        expected: "YYYY",
                    });
                }
                text.parse().map(FileKey::Year).map_err(|_| mismatch())
            }
        }
    }

    /// Extract the date key from the filename component of `path`.
    pub fn parse_path(&self, path: &Path) -> CommonResult<FileKey> {
        let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        self.parse(name)
    }

    pub fn matches(&self, name: &str) -> bool {
        self.parse(name).is_ok()
    }

    /// True when `name` carries the compressed suffix.
    pub fn is_compressed(&self, name: &str) -> bool {
        self.compressed_suffix
            .is_some_and(|gz| name.ends_with(gz) && self.matches(name))
    }

    /// Filename for a per-day key.
    pub fn format_day(&self, date: NaiveDate) -> String {
        format!("{}{}{}", self.prefix, date.format("%Y%m%d"), self.suffix)
    }

    /// Filename for a per-year key.
    pub fn format_year(&self, year: i32) -> String {
        format!("{}{:04}{}", self.prefix, year, self.suffix)
    }

    /// Filename for a per-day key with the compressed suffix appended.
    pub fn format_day_compressed(&self, date: NaiveDate) -> String {
        let mut name = self.format_day(date);
        if let Some(gz) = self.compressed_suffix {
            name.push_str(gz);
        }
        name
    }
}

impl fmt::Display for FilenamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self.key {
            DateKey::Day => "{YYYYMMDD}",
            DateKey::Year => "{YYYY}",
        };
        write!(f, "{}{}{}", self.prefix, key, self.suffix)?;
        if let Some(gz) = self.compressed_suffix {
            write!(f, "[{}]", gz)?;
        }
        Ok(())
    }
}

/// A discovered source file tagged with its filename date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedFile {
    pub path: PathBuf,
    pub key: FileKey,
}

impl DatedFile {
    pub fn new(path: PathBuf, key: FileKey) -> Self {
        Self { path, key }
    }

    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }
}
