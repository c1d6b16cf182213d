//! Personnel use-case service.
//!
//! # Responsibility
//! - Own the current personnel set, backed by `PersonalCache`.
//! - Import/export that set through the file codecs.
//! - Assign ids and maintain timestamps on save/update.
//!
//! # Invariants
//! - Imports never write to the source file.
//! - Generated ids are positive and above every id seen so far.
//! - `update` keeps the stored variant and `created_at`; `updated_at` ends up
//!   strictly after `created_at`.

use crate::cache::PersonalCache;
use crate::config::{AppConfig, ConfigError};
use crate::error::{PersonalError, PersonalResult};
use crate::model::personal::{now, Personal, PersonalId, UNASSIGNED_ID};
use crate::storage::{storage_for, FileFormat};
use chrono::Duration as ChronoDuration;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

/// Cache-aside service over personnel records.
pub struct PersonalService {
    cache: PersonalCache,
    /// Highest id handed out or observed.
    last_id: AtomicI64,
}

impl PersonalService {
    pub fn new(cache: PersonalCache) -> Self {
        Self {
            cache,
            last_id: AtomicI64::new(0),
        }
    }

    /// Builds a service with the cache described by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.cache()?))
    }

    pub fn cache(&self) -> &PersonalCache {
        &self.cache
    }

    /// Loads every record of `path` into the cache.
    ///
    /// Existing entries with the same id are overwritten. Records stored with
    /// the unassigned id receive a fresh one. Returns the number of records
    /// loaded.
    pub fn import_from_file(&self, path: &Path, format: FileFormat) -> PersonalResult<usize> {
        let mut records = storage_for(format).read_from_file(path)?;

        for record in &records {
            self.observe_id(record.id);
        }
        for record in records.iter_mut().filter(|record| record.id == UNASSIGNED_ID) {
            record.id = self.next_id()?;
        }
        let count = records.len();
        for record in records {
            self.cache.put(record.id, record);
        }

        info!(
            "event=personal_import module=service status=ok format={} records={} path={}",
            format.extension(),
            count,
            path.display()
        );
        Ok(count)
    }

    /// Reads `data_dir/personal.<ext>` for `format`.
    pub fn import_default(&self, data_dir: &Path, format: FileFormat) -> PersonalResult<usize> {
        self.import_from_file(&data_dir.join(format.default_file_name()), format)
    }

    /// Writes all live records to `directory/personal.<ext>`.
    ///
    /// Returns the path written.
    pub fn export_to_file(&self, directory: &Path, format: FileFormat) -> PersonalResult<PathBuf> {
        let path = directory.join(format.default_file_name());
        let records = self.cache.values();
        storage_for(format).write_to_file(&path, &records)?;

        info!(
            "event=personal_export module=service status=ok format={} records={} path={}",
            format.extension(),
            records.len(),
            path.display()
        );
        Ok(path)
    }

    /// Exports once per format in `formats`, stopping at the first failure.
    pub fn export_enabled(
        &self,
        directory: &Path,
        formats: &[FileFormat],
    ) -> PersonalResult<Vec<PathBuf>> {
        formats
            .iter()
            .map(|format| self.export_to_file(directory, *format))
            .collect()
    }

    /// Stores `entity`, assigning an id when it is unassigned.
    ///
    /// # Errors
    /// - `Validation` when `entity` breaks model invariants.
    /// - `IdSpaceExhausted` when no id above the highest seen one is left.
    pub fn save(&self, mut entity: Personal) -> PersonalResult<Personal> {
        entity.validate()?;
        if entity.id == UNASSIGNED_ID {
            entity.id = self.next_id()?;
        } else {
            self.observe_id(entity.id);
        }

        self.cache.put(entity.id, entity.clone());
        info!(
            "event=personal_save module=service status=ok id={} type={}",
            entity.id,
            entity.tag()
        );
        Ok(entity)
    }

    /// Replaces the record stored under `id`.
    ///
    /// # Errors
    /// - `NotFound` when no live record has `id`.
    /// - `VariantMismatch` when `entity` is of another variant.
    /// - `Validation` when `entity` breaks model invariants.
    ///
    /// The lookup, the checks and the write happen under one cache lock, so a
    /// concurrent `delete` either wins (and this returns `NotFound`) or
    /// removes the updated record.
    pub fn update(&self, id: PersonalId, mut entity: Personal) -> PersonalResult<Personal> {
        let outcome = self
            .cache
            .replace_live(id, |stored: &Personal| -> PersonalResult<Personal> {
                if stored.tag() != entity.tag() {
                    return Err(PersonalError::VariantMismatch {
                        id,
                        stored: stored.tag(),
                        requested: entity.tag(),
                    });
                }

                entity.id = id;
                entity.created_at = stored.created_at;
                let current = now();
                entity.updated_at = if current > stored.created_at {
                    current
                } else {
                    stored.created_at + ChronoDuration::milliseconds(1)
                };
                entity.validate()?;
                Ok(entity)
            });

        let Some(result) = outcome else {
            warn!("event=personal_update module=service status=error error_code=not_found id={id}");
            return Err(PersonalError::NotFound(id));
        };
        let entity = result?;
        info!(
            "event=personal_update module=service status=ok id={} type={}",
            id,
            entity.tag()
        );
        Ok(entity)
    }

    /// Removes and returns the record for `id`; unknown ids yield `None`.
    pub fn delete(&self, id: PersonalId) -> Option<Personal> {
        let removed = self.cache.invalidate(id);
        info!(
            "event=personal_delete module=service status=ok id={} found={}",
            id,
            removed.is_some()
        );
        removed
    }

    pub fn get_by_id(&self, id: PersonalId) -> Option<Personal> {
        self.cache.get(id)
    }

    /// Live records ordered by id.
    pub fn get_all(&self) -> Vec<Personal> {
        self.cache.values()
    }

    fn next_id(&self) -> PersonalResult<PersonalId> {
        self.last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| last.checked_add(1))
            .map(|previous| previous + 1)
            .map_err(|_| {
                warn!("event=personal_id module=service status=error error_code=id_space_exhausted");
                PersonalError::IdSpaceExhausted
            })
    }

    fn observe_id(&self, id: PersonalId) {
        self.last_id.fetch_max(id, Ordering::SeqCst);
    }
}
