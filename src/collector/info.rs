//! Data model for `pgbackrest info --output=json` payloads.
//!
//! The payload is an ordered array of stanza objects. Fields that older tool
//! versions omit or report as `null` are `Option`-typed so a missing value
//! is structurally distinct from an empty one and never fails the decode.

use serde::Deserialize;

// pgBackRest versions before 2.32 report no repository key.
fn default_repo_key() -> u64 {
    1
}

/// One stanza record from the payload.
#[derive(Debug, Clone, Deserialize)]
pub struct StanzaInfo {
    pub name: String,
    #[serde(default)]
    pub archive: Vec<ArchiveInfo>,
    #[serde(default)]
    pub backup: Vec<BackupInfo>,
    #[serde(default)]
    pub cipher: String,
    #[serde(default)]
    pub db: Vec<DbInfo>,
    #[serde(default)]
    pub repo: Vec<RepoInfo>,
    pub status: StanzaStatus,
}

impl StanzaInfo {
    /// Database entry a payload reference points at, if present.
    pub fn database(&self, db_ref: DbRef) -> Option<&DbInfo> {
        self.db
            .iter()
            .find(|db| db.id == db_ref.id && db.repo_key == db_ref.repo_key)
    }
}

/// WAL archive entry for one database timeline.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveInfo {
    pub database: DbRef,
    pub id: String,
    pub max: Option<String>,
    pub min: Option<String>,
}

/// Reference to a database entry by id and repository key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DbRef {
    pub id: u64,
    #[serde(rename = "repo-key", default = "default_repo_key")]
    pub repo_key: u64,
}

/// One backup record.
#[derive(Debug, Clone, Deserialize)]
pub struct BackupInfo {
    #[serde(default)]
    pub archive: WalBounds,
    pub backrest: BackrestVersion,
    pub database: DbRef,
    pub info: BackupSize,
    pub label: String,
    pub prior: Option<String>,
    pub reference: Option<Vec<String>>,
    pub timestamp: TimeBounds,
    #[serde(rename = "type")]
    pub backup_type: String,
}

/// WAL segment range covered by a backup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalBounds {
    pub start: Option<String>,
    pub stop: Option<String>,
}

/// Tool format and version that wrote a backup.
#[derive(Debug, Clone, Deserialize)]
pub struct BackrestVersion {
    pub format: u64,
    pub version: String,
}

/// Database and repository sizes of a backup.
#[derive(Debug, Clone, Deserialize)]
pub struct BackupSize {
    pub delta: u64,
    pub repository: RepoSize,
    pub size: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoSize {
    pub delta: u64,
    pub size: u64,
}

/// Backup start/stop times, unix epoch seconds.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TimeBounds {
    pub start: i64,
    pub stop: i64,
}

/// Database served by a stanza.
#[derive(Debug, Clone, Deserialize)]
pub struct DbInfo {
    pub id: u64,
    #[serde(rename = "repo-key", default = "default_repo_key")]
    pub repo_key: u64,
    #[serde(rename = "system-id")]
    pub system_id: u64,
    pub version: String,
}

/// Repository entry with cipher and status.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoInfo {
    pub cipher: String,
    pub key: u64,
    pub status: RepoStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoStatus {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Overall stanza status with the backup lock state.
#[derive(Debug, Clone, Deserialize)]
pub struct StanzaStatus {
    pub code: i64,
    #[serde(default)]
    pub lock: LockStatus,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LockStatus {
    #[serde(default)]
    pub backup: BackupLock,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct BackupLock {
    #[serde(default)]
    pub held: bool,
}

/// Decoded payload with the empty result set made explicit.
#[derive(Debug, Clone)]
pub enum ParsedPayload {
    /// The tool returned `[]`: it knows no stanzas. Not an error.
    Empty,
    /// At least one stanza record.
    Stanzas(Vec<StanzaInfo>),
}

/// Decode stdout bytes into the status tree.
pub fn parse_payload(stdout: &[u8]) -> Result<ParsedPayload, serde_json::Error> {
    let stanzas: Vec<StanzaInfo> = serde_json::from_slice(stdout)?;
    if stanzas.is_empty() {
        Ok(ParsedPayload::Empty)
    } else {
        Ok(ParsedPayload::Stanzas(stanzas))
    }
}
