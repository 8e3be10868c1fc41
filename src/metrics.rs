//! Prometheus metric surface for backup and archive status.
//!
//! Exactly one [`MetricSet`] lives per process. Every collection cycle
//! clears all previously published series before writing new values, so a
//! stanza that disappears between cycles does not retain stale series. The
//! reset-then-populate sequence is one unit with respect to scrapers; the
//! server serializes cycles around it.

use std::collections::BTreeMap;

use prometheus::{GaugeVec, Opts, Registry};

use crate::collector::{StanzaInfo, StanzaSelection};

const BACKUP_SIZE_LABELS: &[&str] = &["stanza", "backup_name", "backup_type", "database_id", "repo_key"];

/// Holds the last published value for every exported metric.
pub struct MetricSet {
    stanza_status: GaugeVec,
    stanza_backup_lock_status: GaugeVec,
    repo_status: GaugeVec,
    wal_archive_info: GaugeVec,
    backup_info: GaugeVec,
    backup_duration: GaugeVec,
    backup_size: GaugeVec,
    backup_delta: GaugeVec,
    backup_repo_size: GaugeVec,
    backup_repo_delta: GaugeVec,
    backup_last_timestamp: GaugeVec,
    exporter_info: GaugeVec,
}

impl MetricSet {
    /// Create all gauges and register them with `registry`.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let stanza_status = GaugeVec::new(
            Opts::new("pgbackrest_stanza_status", "Current stanza status code."),
            &["stanza"],
        )?;
        let stanza_backup_lock_status = GaugeVec::new(
            Opts::new(
                "pgbackrest_stanza_backup_lock_status",
                "Whether the stanza backup lock is held.",
            ),
            &["stanza"],
        )?;
        let repo_status = GaugeVec::new(
            Opts::new("pgbackrest_repo_status", "Current repository status code."),
            &["stanza", "repo_key", "cipher"],
        )?;
        let wal_archive_info = GaugeVec::new(
            Opts::new(
                "pgbackrest_wal_archive_info",
                "WAL archive range per database timeline.",
            ),
            &["stanza", "database_id", "repo_key", "pg_version", "wal_min", "wal_max"],
        )?;
        let backup_info = GaugeVec::new(
            Opts::new("pgbackrest_backup_info", "Backup metadata."),
            &[
                "stanza",
                "backup_name",
                "backup_type",
                "database_id",
                "repo_key",
                "backrest_ver",
                "pg_version",
                "prior",
                "wal_start",
                "wal_stop",
            ],
        )?;
        let backup_duration = GaugeVec::new(
            Opts::new(
                "pgbackrest_backup_duration_seconds",
                "Backup duration in seconds.",
            ),
            &["stanza", "backup_name", "backup_type", "database_id", "repo_key", "start_time", "stop_time"],
        )?;
        let backup_size = GaugeVec::new(
            Opts::new("pgbackrest_backup_size_bytes", "Full uncompressed size of the database."),
            BACKUP_SIZE_LABELS,
        )?;
        let backup_delta = GaugeVec::new(
            Opts::new(
                "pgbackrest_backup_delta_bytes",
                "Amount of data in the database to actually back up.",
            ),
            BACKUP_SIZE_LABELS,
        )?;
        let backup_repo_size = GaugeVec::new(
            Opts::new(
                "pgbackrest_backup_repo_size_bytes",
                "Full compressed size of the backup in the repository.",
            ),
            BACKUP_SIZE_LABELS,
        )?;
        let backup_repo_delta = GaugeVec::new(
            Opts::new(
                "pgbackrest_backup_repo_delta_bytes",
                "Compressed size of this backup's delta in the repository.",
            ),
            BACKUP_SIZE_LABELS,
        )?;
        let backup_last_timestamp = GaugeVec::new(
            Opts::new(
                "pgbackrest_backup_last_timestamp_seconds",
                "Stop time of the newest backup per stanza and repository.",
            ),
            &["stanza", "repo_key"],
        )?;
        let exporter_info = GaugeVec::new(
            Opts::new("pgbackrest_exporter_info", "Exporter build information."),
            &["version"],
        )?;

        let set = Self {
            stanza_status,
            stanza_backup_lock_status,
            repo_status,
            wal_archive_info,
            backup_info,
            backup_duration,
            backup_size,
            backup_delta,
            backup_repo_size,
            backup_repo_delta,
            backup_last_timestamp,
            exporter_info,
        };

        registry.register(Box::new(set.stanza_status.clone()))?;
        registry.register(Box::new(set.stanza_backup_lock_status.clone()))?;
        registry.register(Box::new(set.repo_status.clone()))?;
        registry.register(Box::new(set.wal_archive_info.clone()))?;
        registry.register(Box::new(set.backup_info.clone()))?;
        registry.register(Box::new(set.backup_duration.clone()))?;
        registry.register(Box::new(set.backup_size.clone()))?;
        registry.register(Box::new(set.backup_delta.clone()))?;
        registry.register(Box::new(set.backup_repo_size.clone()))?;
        registry.register(Box::new(set.backup_repo_delta.clone()))?;
        registry.register(Box::new(set.backup_last_timestamp.clone()))?;
        registry.register(Box::new(set.exporter_info.clone()))?;

        Ok(set)
    }

    /// Publish the exporter version. Set once at startup; not touched by
    /// [`reset`](Self::reset).
    pub fn set_exporter_info(&self, version: &str) {
        self.exporter_info.with_label_values(&[version]).set(1.0);
    }

    /// Drop every published backup/archive series. Idempotent.
    pub fn reset(&self) {
        self.stanza_status.reset();
        self.stanza_backup_lock_status.reset();
        self.repo_status.reset();
        self.wal_archive_info.reset();
        self.backup_info.reset();
        self.backup_duration.reset();
        self.backup_size.reset();
        self.backup_delta.reset();
        self.backup_repo_size.reset();
        self.backup_repo_delta.reset();
        self.backup_last_timestamp.reset();
    }

    /// Reset, then publish every payload stanza inside the selection.
    ///
    /// Stanzas outside the selection are skipped entirely: no series is
    /// written for them, not even a zero. Returns the number of stanzas
    /// published.
    pub fn update(
        &self,
        stanzas: &[StanzaInfo],
        selection: &StanzaSelection,
        verbose_wal: bool,
    ) -> usize {
        self.reset();

        let mut published = 0;
        for stanza in stanzas {
            if !selection.includes(&stanza.name) {
                continue;
            }
            self.publish_stanza(stanza, verbose_wal);
            published += 1;
        }
        published
    }

    fn publish_stanza(&self, stanza: &StanzaInfo, verbose_wal: bool) {
        self.stanza_status
            .with_label_values(&[&stanza.name])
            .set(stanza.status.code as f64);
        self.stanza_backup_lock_status
            .with_label_values(&[&stanza.name])
            .set(if stanza.status.lock.backup.held { 1.0 } else { 0.0 });

        for repo in &stanza.repo {
            self.repo_status
                .with_label_values(&[&stanza.name, &repo.key.to_string(), &repo.cipher])
                .set(repo.status.code as f64);
        }

        for archive in &stanza.archive {
            let pg_version = stanza
                .database(archive.database)
                .map(|db| db.version.as_str())
                .unwrap_or_default();
            // Without the verbose flag the WAL bound labels stay empty to
            // bound series churn across archived segments.
            let (wal_min, wal_max) = if verbose_wal {
                (
                    archive.min.as_deref().unwrap_or_default(),
                    archive.max.as_deref().unwrap_or_default(),
                )
            } else {
                ("", "")
            };
            self.wal_archive_info
                .with_label_values(&[
                    &stanza.name,
                    &archive.database.id.to_string(),
                    &archive.database.repo_key.to_string(),
                    pg_version,
                    wal_min,
                    wal_max,
                ])
                .set(1.0);
        }

        let mut last_stop: BTreeMap<u64, i64> = BTreeMap::new();
        for backup in &stanza.backup {
            let database_id = backup.database.id.to_string();
            let repo_key = backup.database.repo_key.to_string();
            let pg_version = stanza
                .database(backup.database)
                .map(|db| db.version.as_str())
                .unwrap_or_default();

            self.backup_info
                .with_label_values(&[
                    &stanza.name,
                    &backup.label,
                    &backup.backup_type,
                    &database_id,
                    &repo_key,
                    &backup.backrest.version,
                    pg_version,
                    backup.prior.as_deref().unwrap_or_default(),
                    backup.archive.start.as_deref().unwrap_or_default(),
                    backup.archive.stop.as_deref().unwrap_or_default(),
                ])
                .set(1.0);
            self.backup_duration
                .with_label_values(&[
                    &stanza.name,
                    &backup.label,
                    &backup.backup_type,
                    &database_id,
                    &repo_key,
                    &backup.timestamp.start.to_string(),
                    &backup.timestamp.stop.to_string(),
                ])
                .set((backup.timestamp.stop - backup.timestamp.start) as f64);

            let size_labels = [
                stanza.name.as_str(),
                backup.label.as_str(),
                backup.backup_type.as_str(),
                database_id.as_str(),
                repo_key.as_str(),
            ];
            self.backup_size
                .with_label_values(&size_labels)
                .set(backup.info.size as f64);
            self.backup_delta
                .with_label_values(&size_labels)
                .set(backup.info.delta as f64);
            self.backup_repo_size
                .with_label_values(&size_labels)
                .set(backup.info.repository.size as f64);
            self.backup_repo_delta
                .with_label_values(&size_labels)
                .set(backup.info.repository.delta as f64);

            let newest = last_stop.entry(backup.database.repo_key).or_insert(i64::MIN);
            if backup.timestamp.stop > *newest {
                *newest = backup.timestamp.stop;
            }
        }

        for (repo_key, stop) in last_stop {
            self.backup_last_timestamp
                .with_label_values(&[&stanza.name, &repo_key.to_string()])
                .set(stop as f64);
        }
    }
}
