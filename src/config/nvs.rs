//! NVS persistence for the panel configuration with schema versioning.
//!
//! # Version History
//!
//! - **v1** (current): poll_interval_ms, click_hold_ms, mouse_speed
//!
//! # Future Migration Example
//!
//! When adding fields in v2:
//! 1. Increment CURRENT_SCHEMA_VERSION to 2
//! 2. Implement `migrate_v1_to_v2()`
//! 3. Add the new keys to `load_v1()` / `save_v1()` (renamed for v2)
//! 4. Route the pair in `migrate()`

use thiserror::Error;

use super::PanelConfig;

#[cfg(target_os = "espidf")]
use core::cmp::Ordering;
#[cfg(target_os = "espidf")]
use core::sync::atomic::Ordering as AtomicOrdering;
#[cfg(target_os = "espidf")]
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::EspError;

/// Current NVS schema version
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// NVS namespace for the panel configuration
pub const NVS_NAMESPACE: &str = "hid_panel";

/// NVS keys (max 15 chars each)
pub mod nvs_keys {
    pub const VERSION: &str = "schema_ver";
    pub const POLL_INTERVAL: &str = "poll_ms";
    pub const CLICK_HOLD: &str = "click_ms";
    pub const MOUSE_SPEED: &str = "mouse_spd";
}

/// Outcome of loading the stored configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationResult {
    /// Nothing stored yet, defaults kept
    FreshInstall,
    /// Schema up-to-date, loaded successfully
    UpToDate,
    /// Migrated from older version
    Migrated { from_version: u32, to_version: u32 },
}

/// NVS operation errors
#[derive(Debug, Error)]
pub enum NvsError {
    #[cfg(target_os = "espidf")]
    #[error("NVS init failed: {0}")]
    InitFailed(EspError),

    #[error("stored schema v{stored_version} is newer than this firmware")]
    TooNew { stored_version: u32 },

    #[cfg(target_os = "espidf")]
    #[error("NVS I/O error: {0}")]
    IoError(EspError),

    #[error("no migration from v{from} to v{to}")]
    UnsupportedMigration { from: u32, to: u32 },

    #[error("stored value for {key} is out of range")]
    InvalidValue { key: &'static str },

    #[error("NVS not available")]
    NotAvailable,
}

#[cfg(target_os = "espidf")]
impl From<EspError> for NvsError {
    fn from(e: EspError) -> Self {
        NvsError::IoError(e)
    }
}

/// Something that can persist a [`PanelConfig`].
///
/// The console's `save` command goes through this trait so host builds and
/// tests can run without flash.
pub trait ConfigPersistence {
    fn save(&mut self, config: &PanelConfig) -> Result<(), NvsError>;
}

/// Persistence backend for builds without NVS.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPersistence;

impl ConfigPersistence for NoPersistence {
    fn save(&mut self, _config: &PanelConfig) -> Result<(), NvsError> {
        Err(NvsError::NotAvailable)
    }
}

/// Configuration store in the default NVS partition.
///
/// # Example
///
/// ```ignore
/// let partition = EspDefaultNvsPartition::take()?;
/// let mut store = ConfigStore::open(partition)?;
///
/// match store.load(&CONFIG) {
///     Ok(MigrationResult::FreshInstall) => log::info!("using defaults"),
///     Ok(_) => log::info!("configuration loaded"),
///     Err(e) => log::warn!("NVS load failed: {}, using defaults", e),
/// }
/// ```
#[cfg(target_os = "espidf")]
pub struct ConfigStore {
    storage: EspNvs<NvsDefault>,
}

#[cfg(target_os = "espidf")]
impl ConfigStore {
    /// Open (or create) the panel namespace.
    pub fn open(partition: EspDefaultNvsPartition) -> Result<Self, NvsError> {
        let storage = EspNvs::new(partition, NVS_NAMESPACE, true).map_err(NvsError::InitFailed)?;
        Ok(Self { storage })
    }

    /// Load stored values into `config`, migrating older schemas.
    pub fn load(&mut self, config: &PanelConfig) -> Result<MigrationResult, NvsError> {
        let stored_version = self.storage.get_u32(nvs_keys::VERSION)?.unwrap_or(0);

        match stored_version.cmp(&CURRENT_SCHEMA_VERSION) {
            Ordering::Equal => {
                self.load_v1(config)?;
                Ok(MigrationResult::UpToDate)
            }
            Ordering::Less if stored_version == 0 => Ok(MigrationResult::FreshInstall),
            Ordering::Less => {
                self.migrate(stored_version, CURRENT_SCHEMA_VERSION)?;
                self.load_v1(config)?;
                Ok(MigrationResult::Migrated {
                    from_version: stored_version,
                    to_version: CURRENT_SCHEMA_VERSION,
                })
            }
            Ordering::Greater => Err(NvsError::TooNew { stored_version }),
        }
    }

    fn load_v1(&self, config: &PanelConfig) -> Result<(), NvsError> {
        use super::ParamValue;

        if let Some(v) = self.storage.get_u32(nvs_keys::POLL_INTERVAL)? {
            Self::apply(config, "poll_interval_ms", ParamValue::U32(v), nvs_keys::POLL_INTERVAL)?;
        }
        if let Some(v) = self.storage.get_u32(nvs_keys::CLICK_HOLD)? {
            Self::apply(config, "click_hold_ms", ParamValue::U32(v), nvs_keys::CLICK_HOLD)?;
        }
        if let Some(v) = self.storage.get_u8(nvs_keys::MOUSE_SPEED)? {
            Self::apply(config, "mouse_speed", ParamValue::U8(v), nvs_keys::MOUSE_SPEED)?;
        }

        Ok(())
    }

    fn apply(
        config: &PanelConfig,
        name: &str,
        value: super::ParamValue,
        key: &'static str,
    ) -> Result<(), NvsError> {
        let param = super::find_param(name).ok_or(NvsError::InvalidValue { key })?;
        (param.set_fn)(config, value).map_err(|_| NvsError::InvalidValue { key })
    }

    fn save_v1(&mut self, config: &PanelConfig) -> Result<(), NvsError> {
        self.storage.set_u32(
            nvs_keys::POLL_INTERVAL,
            config.poll_interval_ms.load(AtomicOrdering::Relaxed),
        )?;
        self.storage.set_u32(
            nvs_keys::CLICK_HOLD,
            config.click_hold_ms.load(AtomicOrdering::Relaxed),
        )?;
        self.storage.set_u8(
            nvs_keys::MOUSE_SPEED,
            config.mouse_speed.load(AtomicOrdering::Relaxed),
        )?;
        Ok(())
    }

    /// Route a schema upgrade. v1 is the first schema, so no path exists yet;
    /// a v2 firmware adds `(1, 2) => self.migrate_v1_to_v2()` here and then
    /// stamps `to_version`.
    fn migrate(&mut self, from_version: u32, to_version: u32) -> Result<(), NvsError> {
        Err(NvsError::UnsupportedMigration {
            from: from_version,
            to: to_version,
        })
    }
}

#[cfg(target_os = "espidf")]
impl ConfigPersistence for ConfigStore {
    /// Write every parameter, version stamp first.
    fn save(&mut self, config: &PanelConfig) -> Result<(), NvsError> {
        self.storage.set_u32(nvs_keys::VERSION, CURRENT_SCHEMA_VERSION)?;
        self.save_v1(config)
    }
}
