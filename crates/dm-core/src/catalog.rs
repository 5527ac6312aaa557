//! Migration catalog: every migration file found in one directory.

use crate::error::{CoreError, CoreResult};
use crate::migration::{Direction, MigrationDescriptor};
use std::path::Path;

/// All descriptors parsed from a migrations directory, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    migrations: Vec<MigrationDescriptor>,
}

impl Catalog {
    /// Scan `dir` (non-recursively) and parse every file in it.
    ///
    /// Subdirectories are skipped. The first file that does not parse fails
    /// the whole load; a partial catalog is never returned.
    pub fn load(dir: &Path, scope: Option<&str>) -> CoreResult<Self> {
        let mut migrations = Vec::new();

        for entry in std::fs::read_dir(dir).map_err(|e| CoreError::io(dir, e))? {
            let entry = entry.map_err(|e| CoreError::io(dir, e))?;
            let file_type = entry.file_type().map_err(|e| CoreError::io(&entry.path(), e))?;
            if file_type.is_dir() {
                continue;
            }

            let os_name = entry.file_name();
            let Some(file_name) = os_name.to_str() else {
                return Err(CoreError::malformed(
                    &os_name.to_string_lossy(),
                    "filename is not valid UTF-8",
                ));
            };

            migrations.push(MigrationDescriptor::parse(dir, file_name, scope)?);
        }

        log::debug!(
            "Loaded {} migration files from {}",
            migrations.len(),
            dir.display()
        );
        Ok(Self { migrations })
    }

    /// Build a catalog from descriptors that are already parsed.
    pub fn from_descriptors(migrations: Vec<MigrationDescriptor>) -> Self {
        Self { migrations }
    }

    /// All descriptors, in discovery order.
    pub fn migrations(&self) -> &[MigrationDescriptor] {
        &self.migrations
    }

    /// Number of descriptors (both directions).
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// True when the directory held no migration files.
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Up migrations in apply order.
    ///
    /// Sorted ascending by timestamp; the sort is stable, so equal timestamps
    /// keep their discovery order.
    pub fn pending_order(&self) -> Vec<&MigrationDescriptor> {
        let mut ups: Vec<&MigrationDescriptor> = self
            .migrations
            .iter()
            .filter(|m| m.direction == Direction::Up)
            .collect();
        ups.sort_by_key(|m| m.timestamp);
        ups
    }

    /// Find the descriptor with `name` and `direction`.
    ///
    /// When several timestamps share a name, the most recent one wins.
    pub fn find(&self, name: &str, direction: Direction) -> Option<&MigrationDescriptor> {
        self.migrations
            .iter()
            .filter(|m| m.name == name && m.direction == direction)
            .max_by_key(|m| m.timestamp)
    }

    /// The other half of a migration pair: same name and timestamp, opposite
    /// direction. Falls back to a name-only match when no file shares the
    /// timestamp.
    pub fn counterpart(&self, migration: &MigrationDescriptor) -> Option<&MigrationDescriptor> {
        let wanted = migration.direction.opposite();
        self.migrations
            .iter()
            .find(|m| {
                m.name == migration.name
                    && m.direction == wanted
                    && m.timestamp == migration.timestamp
            })
            .or_else(|| self.find(&migration.name, wanted))
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
