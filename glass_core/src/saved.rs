//! # Saved Calculations
//!
//! Quotes the user wants to keep for later comparison. A store is a `.gqs`
//! file holding JSON:
//!
//! ```text
//! SavedCalculations
//! ├── meta: StoreMetadata (schema version, timestamps)
//! └── calculations: [SavedCalculation] (snapshot of configuration + price)
//! ```
//!
//! Writes are atomic (write `.gqs.tmp`, fsync, rename). A [`StoreLock`]
//! (OS lock via fs2 plus a `.gqs.lock` file naming the holder) keeps two
//! processes from writing the same store.
//!
//! ## Example
//!
//! ```rust,no_run
//! use glass_core::saved::{load_store, save_store, SavedCalculations, StoreLock};
//! use std::path::Path;
//!
//! let path = Path::new("quotes.gqs");
//! let lock = StoreLock::acquire(path, "sales@shop.example")?;
//! let mut store = load_store(path).unwrap_or_else(|_| SavedCalculations::new());
//! store.touch();
//! save_store(&store, path)?;
//! drop(lock);
//! # Ok::<(), glass_core::errors::CalcError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::configuration::Configuration;
use crate::errors::{CalcError, CalcResult};
use crate::model::{Package, PackageId};
use crate::pricing::CalculationResult;

/// Current schema version for .gqs files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// File extension for saved calculation stores
pub const STORE_EXTENSION: &str = "gqs";

/// Locks older than this are considered abandoned
const STALE_LOCK_HOURS: i64 = 24;

/// One saved quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedCalculation {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub package_id: PackageId,
    /// Package name at save time, for listing without the catalog
    pub package_name: String,
    pub configuration: Configuration,
    pub result: CalculationResult,
}

impl SavedCalculation {
    pub fn new(
        name: impl Into<String>,
        package: &Package,
        configuration: Configuration,
        result: CalculationResult,
    ) -> Self {
        SavedCalculation {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
            package_id: package.package_id,
            package_name: package.package_name.clone(),
            configuration,
            result,
        }
    }
}

/// Store metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreMetadata {
    /// Schema version (semver)
    pub version: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Root container written to a `.gqs` file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedCalculations {
    pub meta: StoreMetadata,
    #[serde(default)]
    pub calculations: Vec<SavedCalculation>,
}

impl Default for SavedCalculations {
    fn default() -> Self {
        Self::new()
    }
}

impl SavedCalculations {
    pub fn new() -> Self {
        let now = Utc::now();
        SavedCalculations {
            meta: StoreMetadata {
                version: SCHEMA_VERSION.to_string(),
                created: now,
                modified: now,
            },
            calculations: Vec::new(),
        }
    }

    /// Add a calculation, returning its id
    pub fn add(&mut self, calculation: SavedCalculation) -> Uuid {
        let id = calculation.id;
        self.calculations.push(calculation);
        self.touch();
        id
    }

    pub fn get(&self, id: Uuid) -> Option<&SavedCalculation> {
        self.calculations.iter().find(|c| c.id == id)
    }

    pub fn remove(&mut self, id: Uuid) -> Option<SavedCalculation> {
        let index = self.calculations.iter().position(|c| c.id == id)?;
        self.touch();
        Some(self.calculations.remove(index))
    }

    /// Calculations sorted by total price, cheapest first
    pub fn by_total_price(&self) -> Vec<&SavedCalculation> {
        let mut sorted: Vec<&SavedCalculation> = self.calculations.iter().collect();
        sorted.sort_by(|a, b| a.result.total_price.total_cmp(&b.result.total_price));
        sorted
    }

    pub fn len(&self) -> usize {
        self.calculations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calculations.is_empty()
    }

    /// Update the modified timestamp
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }
}

// ============================================================================
// Locking
// ============================================================================

/// Who holds a store lock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    pub user_id: String,
    /// Host the holder runs on
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

/// Exclusive lock on a store, released on drop.
pub struct StoreLock {
    store_path: PathBuf,
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl StoreLock {
    /// Acquire an exclusive lock on `path`.
    ///
    /// Fails with `FileLocked` when another live holder has it.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        };

        if let Some(existing) = read_lock_info(&lock_path).filter(|i| !is_lock_stale(i)) {
            return Err(CalcError::file_locked(
                path.display().to_string(),
                format!("{} ({}, pid {})", existing.user_id, existing.machine, existing.pid),
                existing.locked_at.to_rfc3339(),
            ));
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| CalcError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            CalcError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info)?;
        lock_file
            .write_all(lock_json.as_bytes())
            .and_then(|_| lock_file.sync_all())
            .map_err(|e| CalcError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        tracing::debug!(path = %path.display(), "Acquired store lock");
        Ok(StoreLock {
            store_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Current holder of the lock on `path`, if any
    pub fn check(path: &Path) -> Option<LockInfo> {
        read_lock_info(&lock_path_for(path)).filter(|i| !is_lock_stale(i))
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

fn lock_path_for(store_path: &Path) -> PathBuf {
    let mut lock_path = store_path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

fn read_lock_info(lock_path: &Path) -> Option<LockInfo> {
    let contents = fs::read_to_string(lock_path).ok()?;
    serde_json::from_str(&contents).ok()
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
            .or_else(|| fs::read_to_string("/etc/hostname").ok())
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
    }
}

fn is_lock_stale(info: &LockInfo) -> bool {
    is_lock_stale_on(info, hostname().as_deref())
}

/// A dead pid only proves staleness on the holder's own machine; locks
/// from other hosts expire by age alone.
fn is_lock_stale_on(info: &LockInfo, our_machine: Option<&str>) -> bool {
    if our_machine == Some(info.machine.as_str()) && !process_alive(info.pid) {
        return true;
    }
    (Utc::now() - info.locked_at).num_hours() > STALE_LOCK_HOURS
}

fn process_alive(pid: u32) -> bool {
    #[cfg(unix)]
    {
        if Path::new("/proc/self").exists() {
            return fs::metadata(format!("/proc/{}", pid)).is_ok();
        }
    }
    let _ = pid;
    true
}

// ============================================================================
// Save / Load
// ============================================================================

/// Write `store` to `path` atomically (tmp file, fsync, rename).
pub fn save_store(store: &SavedCalculations, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(store)?;
    let tmp_path = path.with_extension(format!("{}.tmp", STORE_EXTENSION));

    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .write_all(json.as_bytes())
        .and_then(|_| tmp_file.sync_all())
        .map_err(|e| CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    tracing::info!(path = %path.display(), count = store.len(), "Saved calculations");
    Ok(())
}

/// Read a store and check its schema version.
pub fn load_store(path: &Path) -> CalcResult<SavedCalculations> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;

    let store: SavedCalculations = serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })?;

    validate_version(&store.meta.version)?;
    Ok(store)
}

/// Major must match; in 0.x a newer minor is rejected.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);

    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    match (file_parts.as_slice(), current_parts.as_slice()) {
        ([file_major, ..], [major, ..]) if file_major != major => Err(mismatch()),
        ([0, file_minor, ..], [0, minor, ..]) if file_minor > minor => Err(mismatch()),
        ([_, ..], [_, ..]) => Ok(()),
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SelectionState, StructureConfig};
    use crate::pricing::PricingEngine;

    fn sample(name: &str, width_mm: f64) -> SavedCalculation {
        let package = Package::new(1, "Straight partition", 20.0).with_flat_pricing(4200.0, 5000.0, 3000.0);
        let structure = StructureConfig::single(width_mm, 1900.0);
        let result = PricingEngine::default()
            .calculate(&package, &structure, None, &SelectionState::default())
            .unwrap();
        let configuration = Configuration::for_package(&package, Default::default()).with_structure(structure);
        SavedCalculation::new(name, &package, configuration, result)
    }

    #[test]
    fn test_store_roundtrip_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotes.gqs");

        let mut store = SavedCalculations::new();
        let id = store.add(sample("Hallway", 1000.0));
        save_store(&store, &path).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("gqs.tmp").exists());

        let loaded = load_store(&path).unwrap();
        assert_eq!(loaded, store);
        assert_eq!(loaded.get(id).unwrap().name, "Hallway");
    }

    #[test]
    fn test_sort_and_remove() {
        let mut store = SavedCalculations::new();
        store.add(sample("Wide", 2000.0));
        let narrow = store.add(sample("Narrow", 800.0));

        let names: Vec<_> = store.by_total_price().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Narrow", "Wide"]);

        assert!(store.remove(narrow).is_some());
        assert_eq!(store.len(), 1);
        assert!(store.remove(narrow).is_none());
    }

    #[test]
    fn test_lock_acquire_and_release() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotes.gqs");
        let lock_path = lock_path_for(&path);
        assert_eq!(lock_path, dir.path().join("quotes.gqs.lock"));

        let lock = StoreLock::acquire(&path, "sales@shop.example").unwrap();
        assert!(lock_path.exists());
        assert_eq!(lock.info.machine, hostname().unwrap_or_else(|| "unknown".to_string()));
        assert_eq!(StoreLock::check(&path).unwrap().user_id, "sales@shop.example");

        let second = StoreLock::acquire(&path, "other@shop.example");
        assert!(matches!(second, Err(CalcError::FileLocked { .. })));

        drop(lock);
        assert!(!lock_path.exists());
        assert!(StoreLock::check(&path).is_none());
    }

    #[test]
    fn test_dead_pid_only_stale_on_same_machine() {
        // u32::MAX is never a live pid
        let info = LockInfo {
            user_id: "sales@shop.example".to_string(),
            machine: "front-desk".to_string(),
            pid: u32::MAX,
            locked_at: Utc::now(),
        };
        assert!(!is_lock_stale_on(&info, Some("workshop")));
        assert!(!is_lock_stale_on(&info, None));
        if Path::new("/proc/self").exists() {
            assert!(is_lock_stale_on(&info, Some("front-desk")));
        }

        let old = LockInfo {
            locked_at: Utc::now() - chrono::Duration::hours(STALE_LOCK_HOURS + 1),
            ..info
        };
        assert!(is_lock_stale_on(&old, Some("workshop")));
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_load_rejects_newer_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.gqs");
        let mut store = SavedCalculations::new();
        store.meta.version = "0.9.0".to_string();
        save_store(&store, &path).unwrap();

        let err = load_store(&path).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_store(Path::new("/nonexistent/quotes.gqs")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }
}
