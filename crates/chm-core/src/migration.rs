//! Migration file discovery
//!
//! A migrations directory holds files named `<version>_<description>.sql`.
//! Discovery lists the directory once, validates the version prefix of every
//! `.sql` entry and returns the migrations in ascending version order.

use crate::error::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// File extension recognized as a migration
pub const MIGRATION_EXTENSION: &str = ".sql";

/// A migration file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// Version parsed from the file name prefix
    pub version: u32,

    /// Full file name, e.g. `10_add_index.sql`
    pub name: String,

    /// Path to the file
    pub path: PathBuf,
}

impl MigrationFile {
    /// Build a migration from its file name inside `dir`.
    ///
    /// Returns `Ok(None)` for names that are not migrations at all (wrong
    /// extension) and an error for `.sql` names without a version prefix.
    pub fn from_file_name(dir: &Path, file_name: &str) -> CoreResult<Option<Self>> {
        if !file_name.ends_with(MIGRATION_EXTENSION) {
            return Ok(None);
        }

        let version = parse_version(file_name).ok_or_else(|| CoreError::InvalidMigrationName {
            file: file_name.to_string(),
        })?;

        Ok(Some(Self {
            version,
            name: file_name.to_string(),
            path: dir.join(file_name),
        }))
    }

    /// Read the migration text.
    ///
    /// Invalid UTF-8 sequences are replaced with U+FFFD, and the checksum is
    /// taken over that decoded text.
    pub fn read_content(&self) -> CoreResult<String> {
        let bytes = std::fs::read(&self.path).map_err(|e| CoreError::IoWithPath {
            path: self.path.display().to_string(),
            source: e,
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Parse the positive integer before the first `_` of a file name.
fn parse_version(file_name: &str) -> Option<u32> {
    let prefix = file_name.split('_').next()?;
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    prefix.parse::<u32>().ok().filter(|v| *v > 0)
}

/// Discover all migrations in `dir`, ordered by ascending version.
pub fn discover_migrations(dir: &Path) -> CoreResult<Vec<MigrationFile>> {
    let entries = std::fs::read_dir(dir).map_err(|e| CoreError::MigrationsDirNotFound {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut migrations = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            log::warn!("Skipping non UTF-8 file name in {}", dir.display());
            continue;
        };
        if !path.is_file() {
            continue;
        }
        if let Some(migration) = MigrationFile::from_file_name(dir, file_name)? {
            migrations.push(migration);
        }
    }

    migrations.sort_by(|a, b| a.version.cmp(&b.version).then_with(|| a.name.cmp(&b.name)));

    if let Some(pair) = migrations.windows(2).find(|w| w[0].version == w[1].version) {
        return Err(CoreError::DuplicateVersion {
            version: pair[0].version,
            first: pair[0].name.clone(),
            second: pair[1].name.clone(),
        });
    }

    log::debug!(
        "Discovered {} migration(s) in {}",
        migrations.len(),
        dir.display()
    );
    Ok(migrations)
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
