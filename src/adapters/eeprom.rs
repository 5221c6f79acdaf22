//! EEPROM-style byte store and config storage on NVS.
//!
//! Implements both [`ByteStore`] and [`ConfigPort`].
//!
//! - **`ByteStore`**: a [`STORE_SIZE`]-byte RAM mirror.  On ESP32 every
//!   write commits the whole mirror as one NVS blob (`station::eeprom`),
//!   so a power loss never leaves a half-written threshold behind.
//! - **`ConfigPort`**: [`StationConfig`] as a postcard blob
//!   (`station::cfg`), validated before it is persisted.
//!
//! On host targets both live in memory (dev/test only).

#[cfg(not(target_os = "espidf"))]
use core::cell::RefCell;

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::{ByteStore, ConfigError, ConfigPort};
use crate::config::{MAX_MODBUS_TIMEOUT_MS, MAX_SELF_TEST_STEP_MS, StationConfig};
use crate::error::StorageError;
use crate::station::layout::{BLANK, STORE_SIZE};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
const NAMESPACE: &[u8] = b"station\0";
#[cfg(target_os = "espidf")]
const EEPROM_KEY: &[u8] = b"eeprom\0";
#[cfg(target_os = "espidf")]
const CONFIG_KEY: &[u8] = b"cfg\0";

#[cfg(target_os = "espidf")]
const MAX_CONFIG_BLOB: usize = 256;

pub struct EepromAdapter {
    mirror: [u8; STORE_SIZE],
    #[cfg(not(target_os = "espidf"))]
    config_blob: RefCell<Option<Vec<u8>>>,
    #[cfg(not(target_os = "espidf"))]
    fail_writes: bool,
    #[cfg(not(target_os = "espidf"))]
    commits: u32,
}

impl EepromAdapter {
    /// Initialise NVS flash and load the byte-store mirror.
    ///
    /// On first boot or after a version mismatch the NVS partition is
    /// erased and re-initialised automatically.  A missing mirror blob
    /// reads as a blank store.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from the main task before any other NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK || unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(StorageError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(StorageError::IoError);
            }

            let mut mirror = [BLANK; STORE_SIZE];
            match Self::with_nvs_handle(false, |handle| {
                let mut size = STORE_SIZE;
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        EEPROM_KEY.as_ptr() as *const _,
                        mirror.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret == ESP_OK { Ok(size) } else { Err(ret) }
            }) {
                Ok(size) => info!("EepromAdapter: loaded {} byte mirror from NVS", size),
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => {
                    info!("EepromAdapter: no mirror in NVS, store is blank")
                }
                Err(e) => warn!("EepromAdapter: NVS read error {}, store is blank", e),
            }
            Ok(Self { mirror })
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("EepromAdapter: simulation backend");
            Ok(Self::blank())
        }
    }

    /// A blank in-memory store.
    #[cfg(not(target_os = "espidf"))]
    pub fn blank() -> Self {
        Self {
            mirror: [BLANK; STORE_SIZE],
            config_blob: RefCell::new(None),
            fail_writes: false,
            commits: 0,
        }
    }

    /// Make every subsequent write fail with `IoError` (host only).
    #[cfg(not(target_os = "espidf"))]
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of commit attempts so far (host only).
    #[cfg(not(target_os = "espidf"))]
    pub fn commits(&self) -> u32 {
        self.commits
    }

    /// Raw view of the mirror.
    pub fn bytes(&self) -> &[u8; STORE_SIZE] {
        &self.mirror
    }

    fn range(offset: usize, len: usize) -> Result<core::ops::Range<usize>, StorageError> {
        offset
            .checked_add(len)
            .filter(|end| *end <= STORE_SIZE)
            .map(|end| offset..end)
            .ok_or(StorageError::OutOfRange)
    }

    /// Open the station namespace, run `f` with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };
        let ret = unsafe { nvs_open(NAMESPACE.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }
        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    /// Persist a full image of the byte store.
    fn commit_mirror(&mut self, image: &[u8; STORE_SIZE]) -> Result<(), StorageError> {
        #[cfg(target_os = "espidf")]
        {
            if let Err(e) = Self::commit_blob(EEPROM_KEY, image) {
                warn!("EepromAdapter: NVS commit error {}", e);
                return Err(StorageError::IoError);
            }
            Ok(())
        }

        #[cfg(not(target_os = "espidf"))]
        {
            let _ = image;
            self.commits += 1;
            if self.fail_writes {
                return Err(StorageError::IoError);
            }
            Ok(())
        }
    }

    #[cfg(target_os = "espidf")]
    fn commit_blob(key: &[u8], data: &[u8]) -> Result<(), i32> {
        Self::with_nvs_handle(true, |handle| {
            let ret = unsafe {
                nvs_set_blob(
                    handle,
                    key.as_ptr() as *const _,
                    data.as_ptr() as *const _,
                    data.len(),
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(())
        })
    }
}

// ── ByteStore ─────────────────────────────────────────────────

impl ByteStore for EepromAdapter {
    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        let range = Self::range(offset, buf.len())?;
        buf.copy_from_slice(&self.mirror[range]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError> {
        let range = Self::range(offset, data.len())?;
        if self.mirror[range.clone()] == *data {
            // Unchanged; spare the flash.
            return Ok(());
        }

        // The mirror only takes the bytes once they are committed.
        let mut staged = self.mirror;
        staged[range].copy_from_slice(data);
        self.commit_mirror(&staged)?;
        self.mirror = staged;
        Ok(())
    }
}

// ── ConfigPort ────────────────────────────────────────────────

pub(crate) fn validate_config(cfg: &StationConfig) -> Result<(), ConfigError> {
    if cfg.udp_port == 0 {
        return Err(ConfigError::ValidationFailed("udp_port must be non-zero"));
    }
    if !(1..=247).contains(&cfg.modbus_unit_id) {
        return Err(ConfigError::ValidationFailed(
            "modbus_unit_id must be 1–247",
        ));
    }
    if !(1200..=115_200).contains(&cfg.modbus_baudrate) {
        return Err(ConfigError::ValidationFailed(
            "modbus_baudrate must be 1200–115200",
        ));
    }
    if !(10..=MAX_MODBUS_TIMEOUT_MS).contains(&cfg.modbus_timeout_ms) {
        return Err(ConfigError::ValidationFailed(
            "modbus_timeout_ms must be 10–2000",
        ));
    }
    let intervals = [
        cfg.receive_interval_ms,
        cfg.measurement_interval_ms,
        cfg.status_interval_ms,
        cfg.evaluate_interval_ms,
        cfg.apply_interval_ms,
    ];
    if intervals.iter().any(|ms| !(10..=60_000).contains(ms)) {
        return Err(ConfigError::ValidationFailed(
            "job intervals must be 10–60000 ms",
        ));
    }
    if !cfg.default_voltage_on.is_finite() || !cfg.default_voltage_off.is_finite() {
        return Err(ConfigError::ValidationFailed(
            "default thresholds must be finite",
        ));
    }
    if cfg.default_voltage_off > cfg.default_voltage_on {
        return Err(ConfigError::ValidationFailed(
            "default_voltage_off must be <= default_voltage_on",
        ));
    }
    if cfg.self_test_step_ms > MAX_SELF_TEST_STEP_MS {
        return Err(ConfigError::ValidationFailed(
            "self_test_step_ms must be 0–500",
        ));
    }
    Ok(())
}

impl ConfigPort for EepromAdapter {
    fn load(&self) -> Result<StationConfig, ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        {
            match self.config_blob.borrow().as_deref() {
                Some(bytes) => {
                    let cfg: StationConfig =
                        postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
                    info!("EepromAdapter: loaded config from store");
                    Ok(cfg)
                }
                None => {
                    info!("EepromAdapter: no stored config, using defaults");
                    Ok(StationConfig::default())
                }
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let mut buf = [0u8; MAX_CONFIG_BLOB];
            let result = Self::with_nvs_handle(false, |handle| {
                let mut size = buf.len();
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        CONFIG_KEY.as_ptr() as *const _,
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret == ESP_OK { Ok(size) } else { Err(ret) }
            });
            match result {
                Ok(size) => {
                    let cfg: StationConfig =
                        postcard::from_bytes(&buf[..size]).map_err(|_| ConfigError::Corrupted)?;
                    info!("EepromAdapter: loaded config from NVS ({} bytes)", size);
                    Ok(cfg)
                }
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => {
                    info!("EepromAdapter: no stored config, using defaults");
                    Ok(StationConfig::default())
                }
                Err(e) => {
                    warn!("EepromAdapter: NVS read error {}, using defaults", e);
                    Ok(StationConfig::default())
                }
            }
        }
    }

    fn save(&self, config: &StationConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;

        #[cfg(not(target_os = "espidf"))]
        {
            *self.config_blob.borrow_mut() = Some(bytes);
            info!("EepromAdapter: config saved (simulation)");
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            match Self::commit_blob(CONFIG_KEY, &bytes) {
                Ok(()) => {
                    info!("EepromAdapter: config saved to NVS ({} bytes)", bytes.len());
                    Ok(())
                }
                Err(e) => {
                    warn!("EepromAdapter: NVS write error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }
}
