//! Migration descriptors and filename parsing.
//!
//! A migration file is named `YYYY-MM-DD_HH-MM-SS_<name>.<up|down>.sql`. The
//! filename is the whole identity of the migration: parsing it yields a
//! [`MigrationDescriptor`], and [`MigrationDescriptor::filename`] renders the
//! same string back.

use crate::error::{CoreError, CoreResult};
use chrono::NaiveDateTime;
use std::fmt;
use std::path::{Path, PathBuf};

/// `chrono` format of the datetime prefix.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Byte length of the `YYYY-MM-DD_HH-MM-SS` prefix.
const TIMESTAMP_LEN: usize = 19;

/// Which side of a migration a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Applies the change
    Up,
    /// Reverts the change
    Down,
}

impl Direction {
    /// The other side of the pair.
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Suffix used in filenames (`up` / `down`).
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a single migration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationDescriptor {
    /// Human-readable label taken from the filename
    pub name: String,

    /// Second-precision timestamp from the filename prefix
    pub timestamp: NaiveDateTime,

    /// Up or Down
    pub direction: Direction,

    /// Location of the backing file; content is read lazily
    pub path: PathBuf,

    /// Optional tag partitioning a shared ledger table
    pub scope: Option<String>,
}

impl MigrationDescriptor {
    /// Parse a bare filename (no directory component).
    ///
    /// The returned descriptor's `path` is `dir.join(filename)`.
    pub fn parse(dir: &Path, filename: &str, scope: Option<&str>) -> CoreResult<Self> {
        let (stem, direction) = if let Some(stem) = filename.strip_suffix(".up.sql") {
            (stem, Direction::Up)
        } else if let Some(stem) = filename.strip_suffix(".down.sql") {
            (stem, Direction::Down)
        } else {
            return Err(CoreError::malformed(
                filename,
                "expected a '.up.sql' or '.down.sql' suffix",
            ));
        };

        let bytes = stem.as_bytes();
        if bytes.len() <= TIMESTAMP_LEN || !is_timestamp_shape(&bytes[..TIMESTAMP_LEN]) {
            return Err(CoreError::malformed(
                filename,
                "expected a 'YYYY-MM-DD_HH-MM-SS_' prefix",
            ));
        }
        if bytes[TIMESTAMP_LEN] != b'_' {
            return Err(CoreError::malformed(
                filename,
                "expected '_' between the timestamp and the name",
            ));
        }

        // The prefix is pure ASCII, so these slices fall on char boundaries.
        let raw_timestamp = &stem[..TIMESTAMP_LEN];
        let name = &stem[TIMESTAMP_LEN + 1..];

        if name.contains('.') {
            return Err(CoreError::malformed(filename, "name must not contain '.'"));
        }

        // chrono reads second 60 as a leap second; filenames never carry one.
        if &raw_timestamp[17..] == "60" {
            return Err(CoreError::malformed(filename, "second out of range"));
        }
        let timestamp = NaiveDateTime::parse_from_str(raw_timestamp, TIMESTAMP_FORMAT)
            .map_err(|e| CoreError::malformed(filename, format!("invalid timestamp: {e}")))?;

        Ok(Self {
            name: name.to_string(),
            timestamp,
            direction,
            path: dir.join(filename),
            scope: scope.map(str::to_string),
        })
    }

    /// Render the canonical filename for this descriptor.
    pub fn filename(&self) -> String {
        format_filename(self.timestamp, &self.name, self.direction)
    }

    /// Scope as stored in the ledger (`""` when unscoped).
    pub fn scope_str(&self) -> &str {
        self.scope.as_deref().unwrap_or("")
    }
}

impl fmt::Display for MigrationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.filename())
    }
}

/// Build `YYYY-MM-DD_HH-MM-SS_<name>.<direction>.sql`.
pub fn format_filename(timestamp: NaiveDateTime, name: &str, direction: Direction) -> String {
    format!(
        "{}_{}.{}.sql",
        timestamp.format(TIMESTAMP_FORMAT),
        name,
        direction
    )
}

/// Check `YYYY-MM-DD_HH-MM-SS` character classes before handing off to chrono,
/// which would otherwise accept signs and variable-width fields.
fn is_timestamp_shape(prefix: &[u8]) -> bool {
    prefix.iter().enumerate().all(|(i, b)| match i {
        4 | 7 | 13 | 16 => *b == b'-',
        10 => *b == b'_',
        _ => b.is_ascii_digit(),
    })
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
