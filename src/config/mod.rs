//! Module: config
//!
//! Purpose: Runtime configuration of the panel firmware.
//!
//! Architecture:
//! - `PanelConfig`: every tunable as an atomic, lock-free from any context
//! - `CONFIG`: the single global instance read by the engine and producers
//! - `PARAMS`: name/type/range table driving console `show` and `set`
//! - `nvs`: persistence of the table in ESP-IDF NVS
//!
//! Safety: All access via atomics, no locks.

use core::sync::atomic::{AtomicU16, AtomicU32, AtomicU8, Ordering};

use thiserror::Error;

pub mod nvs;

pub use nvs::{ConfigPersistence, MigrationResult, NvsError, NVS_NAMESPACE};

/// Default emission cadence.
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 10;

/// Default press duration of an immediate click.
pub const DEFAULT_CLICK_HOLD_MS: u32 = 20;

/// Default per-tick mouse velocity for directional buttons.
pub const DEFAULT_MOUSE_SPEED: u8 = 5;

/// Panel configuration.
pub struct PanelConfig {
    /// Minimum time between two engine ticks (ms).
    pub poll_interval_ms: AtomicU32,

    /// How long an immediate click holds the buttons (ms).
    pub click_hold_ms: AtomicU32,

    /// Velocity magnitude used by directional actions.
    pub mouse_speed: AtomicU8,

    /// Bumped on every change, lets readers detect updates cheaply.
    pub generation: AtomicU16,
}

impl PanelConfig {
    /// Configuration with factory defaults.
    pub const fn new() -> Self {
        Self {
            poll_interval_ms: AtomicU32::new(DEFAULT_POLL_INTERVAL_MS),
            click_hold_ms: AtomicU32::new(DEFAULT_CLICK_HOLD_MS),
            mouse_speed: AtomicU8::new(DEFAULT_MOUSE_SPEED),
            generation: AtomicU16::new(0),
        }
    }

    #[inline]
    pub fn poll_interval_ms(&self) -> u32 {
        self.poll_interval_ms.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn click_hold_ms(&self) -> u32 {
        self.click_hold_ms.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn mouse_speed(&self) -> u8 {
        self.mouse_speed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn generation(&self) -> u16 {
        self.generation.load(Ordering::Acquire)
    }

    /// Mark the configuration as changed.
    #[inline]
    pub fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::Release);
    }

    /// Restore factory defaults (one generation bump).
    pub fn reset_defaults(&self) {
        self.poll_interval_ms.store(DEFAULT_POLL_INTERVAL_MS, Ordering::Relaxed);
        self.click_hold_ms.store(DEFAULT_CLICK_HOLD_MS, Ordering::Relaxed);
        self.mouse_speed.store(DEFAULT_MOUSE_SPEED, Ordering::Relaxed);
        self.bump_generation();
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Global configuration instance.
pub static CONFIG: PanelConfig = PanelConfig::new();

/// Typed parameter value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamValue {
    U8(u8),
    U32(u32),
}

impl core::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParamValue::U8(v) => write!(f, "{}", v),
            ParamValue::U32(v) => write!(f, "{}", v),
        }
    }
}

/// Parameter type with its inclusive range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamType {
    U8 { min: u8, max: u8 },
    U32 { min: u32, max: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParamSetError {
    #[error("value type does not match parameter")]
    TypeMismatch,
    #[error("value {value} outside {min}..={max}")]
    OutOfRange { value: u32, min: u32, max: u32 },
}

/// One console-visible parameter.
pub struct ParamDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub unit: &'static str,
    pub param_type: ParamType,
    pub get_fn: fn(&PanelConfig) -> ParamValue,
    pub set_fn: fn(&PanelConfig, ParamValue) -> Result<(), ParamSetError>,
}

impl ParamDescriptor {
    /// Parse `text` according to this parameter's type and range.
    pub fn parse(&self, text: &str) -> Result<ParamValue, ParamParseError> {
        match self.param_type {
            ParamType::U8 { min, max } => {
                let v: u8 = text.parse().map_err(|_| ParamParseError::Invalid)?;
                if v < min || v > max {
                    return Err(ParamParseError::OutOfRange);
                }
                Ok(ParamValue::U8(v))
            }
            ParamType::U32 { min, max } => {
                let v: u32 = text.parse().map_err(|_| ParamParseError::Invalid)?;
                if v < min || v > max {
                    return Err(ParamParseError::OutOfRange);
                }
                Ok(ParamValue::U32(v))
            }
        }
    }
}

/// Why a textual value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamParseError {
    Invalid,
    OutOfRange,
}

fn check_u32(value: ParamValue, min: u32, max: u32) -> Result<u32, ParamSetError> {
    let ParamValue::U32(v) = value else {
        return Err(ParamSetError::TypeMismatch);
    };
    if v < min || v > max {
        return Err(ParamSetError::OutOfRange { value: v, min, max });
    }
    Ok(v)
}

fn check_u8(value: ParamValue, min: u8, max: u8) -> Result<u8, ParamSetError> {
    let ParamValue::U8(v) = value else {
        return Err(ParamSetError::TypeMismatch);
    };
    if v < min || v > max {
        return Err(ParamSetError::OutOfRange {
            value: v.into(),
            min: min.into(),
            max: max.into(),
        });
    }
    Ok(v)
}

const POLL_RANGE: (u32, u32) = (10, 1000);
const CLICK_RANGE: (u32, u32) = (5, 500);
const SPEED_RANGE: (u8, u8) = (1, 127);

/// All console-visible parameters.
pub static PARAMS: &[ParamDescriptor] = &[
    ParamDescriptor {
        name: "poll_interval_ms",
        description: "Emission engine cadence",
        unit: "ms",
        param_type: ParamType::U32 { min: POLL_RANGE.0, max: POLL_RANGE.1 },
        get_fn: |c| ParamValue::U32(c.poll_interval_ms()),
        set_fn: |c, v| {
            let v = check_u32(v, POLL_RANGE.0, POLL_RANGE.1)?;
            c.poll_interval_ms.store(v, Ordering::Relaxed);
            c.bump_generation();
            Ok(())
        },
    },
    ParamDescriptor {
        name: "click_hold_ms",
        description: "Immediate click press duration",
        unit: "ms",
        param_type: ParamType::U32 { min: CLICK_RANGE.0, max: CLICK_RANGE.1 },
        get_fn: |c| ParamValue::U32(c.click_hold_ms()),
        set_fn: |c, v| {
            let v = check_u32(v, CLICK_RANGE.0, CLICK_RANGE.1)?;
            c.click_hold_ms.store(v, Ordering::Relaxed);
            c.bump_generation();
            Ok(())
        },
    },
    ParamDescriptor {
        name: "mouse_speed",
        description: "Directional button velocity",
        unit: "px/tick",
        param_type: ParamType::U8 { min: SPEED_RANGE.0, max: SPEED_RANGE.1 },
        get_fn: |c| ParamValue::U8(c.mouse_speed()),
        set_fn: |c, v| {
            let v = check_u8(v, SPEED_RANGE.0, SPEED_RANGE.1)?;
            c.mouse_speed.store(v, Ordering::Relaxed);
            c.bump_generation();
            Ok(())
        },
    },
];

/// Look up a parameter by exact name.
pub fn find_param(name: &str) -> Option<&'static ParamDescriptor> {
    PARAMS.iter().find(|p| p.name == name)
}

/// Parameters matching `pattern`; a trailing `*` matches by prefix.
pub fn find_params_matching(pattern: &str) -> impl Iterator<Item = &'static ParamDescriptor> + '_ {
    let (prefix, wildcard) = match pattern.strip_suffix('*') {
        Some(prefix) => (prefix, true),
        None => (pattern, false),
    };
    PARAMS.iter().filter(move |p| {
        if wildcard {
            p.name.starts_with(prefix)
        } else {
            p.name == prefix
        }
    })
}
