//! Creation of new, empty migration pairs.

use crate::error::{CoreError, CoreResult};
use crate::migration::{Direction, MigrationDescriptor};
use chrono::{NaiveDateTime, Timelike};
use std::fs::{self, OpenOptions};
use std::path::Path;

/// Create empty Up and Down files for `name` stamped with `now`.
///
/// The directory is created if missing. Existing files are never
/// overwritten. Returns the `(up, down)` descriptors of the new files.
pub fn create_migration(
    dir: &Path,
    name: &str,
    now: NaiveDateTime,
) -> CoreResult<(MigrationDescriptor, MigrationDescriptor)> {
    validate_name(name)?;
    fs::create_dir_all(dir).map_err(|e| CoreError::io(dir, e))?;

    let timestamp = now.with_nanosecond(0).unwrap_or(now);
    let make = |direction| MigrationDescriptor {
        name: name.to_string(),
        timestamp,
        direction,
        path: dir.join(crate::migration::format_filename(timestamp, name, direction)),
        scope: None,
    };
    let up = make(Direction::Up);
    let down = make(Direction::Down);

    for migration in [&up, &down] {
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&migration.path)
            .map_err(|e| CoreError::io(&migration.path, e))?;
        log::info!("Created {} migration file {}", migration.direction, migration.path.display());
    }

    Ok((up, down))
}

fn validate_name(name: &str) -> CoreResult<()> {
    let reason = if name.is_empty() {
        "name must not be empty"
    } else if name.contains('.') {
        "name must not contain '.'"
    } else if name.contains('/') || name.contains('\\') {
        "name must not contain a path separator"
    } else {
        return Ok(());
    };
    Err(CoreError::InvalidMigrationName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_milli_opt(h, m, s, 250)
            .unwrap()
    }

    #[test]
    fn creates_empty_pair() {
        let dir = tempfile::tempdir().unwrap();
        let (up, down) = create_migration(dir.path(), "add_users", at(14, 5, 7)).unwrap();

        assert_eq!(up.filename(), "2024-03-09_14-05-07_add_users.up.sql");
        assert_eq!(down.filename(), "2024-03-09_14-05-07_add_users.down.sql");
        assert_eq!(fs::read_to_string(&up.path).unwrap(), "");
        assert_eq!(fs::read_to_string(&down.path).unwrap(), "");

        let reparsed = MigrationDescriptor::parse(dir.path(), &up.filename(), None).unwrap();
        assert_eq!(reparsed, up);
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("db").join("migrations");
        create_migration(&nested, "init", at(0, 0, 0)).unwrap();
        assert_eq!(fs::read_dir(&nested).unwrap().count(), 2);
    }

    #[test]
    fn refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let (up, _) = create_migration(dir.path(), "init", at(1, 2, 3)).unwrap();
        fs::write(&up.path, "SELECT 1;").unwrap();

        let err = create_migration(dir.path(), "init", at(1, 2, 3)).unwrap_err();
        match err {
            CoreError::IoWithPath { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::AlreadyExists)
            }
            other => panic!("expected IoWithPath, got {other:?}"),
        }
        assert_eq!(fs::read_to_string(&up.path).unwrap(), "SELECT 1;");
    }

    #[test]
    fn rejects_bad_names() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["", "v1.2", "a/b", "a\\b"] {
            assert!(
                matches!(
                    create_migration(dir.path(), name, at(0, 0, 0)),
                    Err(CoreError::InvalidMigrationName { .. })
                ),
                "{name:?} should be rejected"
            );
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
