//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, SfmError};

/// Full SFM configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
#[derive(Default)]
pub struct Config {
    pub fleet: FleetConfig,
    pub bus: BusConfig,
    pub timing: TimingConfig,
    pub ui: UiConfig,
}

/// Fleet sizing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FleetConfig {
    /// Number of simulated instances; 0 picks a random count in [10, 30)
    /// at startup.
    pub instances: usize,
}

/// Event-bus sizing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BusConfig {
    /// Bounded channel capacity shared by all simulators.
    pub capacity: usize,
}

/// Timer periods and simulator pacing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimingConfig {
    /// Reducer tick period in milliseconds.
    pub tick_ms: u64,
    /// Simulator sleep lower bound in milliseconds (inclusive).
    pub sim_delay_min_ms: u64,
    /// Simulator sleep upper bound in milliseconds (exclusive).
    pub sim_delay_max_ms: u64,
}

/// Rendering and input limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UiConfig {
    /// Per-instance log history capacity (oldest-evicted).
    pub log_ring_capacity: usize,
    /// Maximum log lines shown in the detail view.
    pub detail_tail_lines: usize,
    /// Maximum length of the instance-selector input buffer.
    pub input_limit: usize,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self { instances: 0 }
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_ms: 1_000,
            sim_delay_min_ms: 400,
            sim_delay_max_ms: 800,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            log_ring_capacity: 100,
            detail_tail_lines: 20,
            input_limit: 4,
        }
    }
}

impl Config {
    /// Default configuration path: `$HOME/.config/sfm/config.toml`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        let home_dir = env::var_os("HOME").map_or_else(
            || {
                eprintln!("[SFM-CONFIG] WARNING: HOME not set, falling back to /tmp");
                PathBuf::from("/tmp")
            },
            PathBuf::from,
        );
        home_dir.join(".config").join("sfm").join("config.toml")
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path;
    /// defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf)
                .map_err(|source| SfmError::io(&path_buf, source))?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(SfmError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for diagnostics.
    ///
    /// Uses FNV-1a for cross-process-stable hashing (no `DefaultHasher`
    /// whose seed may vary across Rust releases).
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self).map_err(|error| SfmError::ConfigParse {
            context: "serde_json",
            details: error.to_string(),
        })?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_env_overrides_from(env_var)
    }

    /// Env-override application with an injectable variable source, so
    /// tests can exercise overrides without mutating process environment.
    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        set_usize(&mut lookup, "SFM_FLEET_INSTANCES", &mut self.fleet.instances)?;

        set_usize(&mut lookup, "SFM_BUS_CAPACITY", &mut self.bus.capacity)?;

        set_u64(&mut lookup, "SFM_TIMING_TICK_MS", &mut self.timing.tick_ms)?;
        set_u64(
            &mut lookup,
            "SFM_TIMING_SIM_DELAY_MIN_MS",
            &mut self.timing.sim_delay_min_ms,
        )?;
        set_u64(
            &mut lookup,
            "SFM_TIMING_SIM_DELAY_MAX_MS",
            &mut self.timing.sim_delay_max_ms,
        )?;

        set_usize(
            &mut lookup,
            "SFM_UI_LOG_RING_CAPACITY",
            &mut self.ui.log_ring_capacity,
        )?;
        set_usize(
            &mut lookup,
            "SFM_UI_DETAIL_TAIL_LINES",
            &mut self.ui.detail_tail_lines,
        )?;
        set_usize(&mut lookup, "SFM_UI_INPUT_LIMIT", &mut self.ui.input_limit)?;

        Ok(())
    }

    /// Check cross-field constraints.
    ///
    /// `load` runs this automatically; callers that mutate a loaded config
    /// (CLI flag overrides) must re-run it themselves.
    pub fn validate(&self) -> Result<()> {
        // A selector of ui.input_limit characters caps the highest
        // addressable instance id; the default limit of 4 means 9999.
        let max_selectable = 10usize
            .checked_pow(u32::try_from(self.ui.input_limit).unwrap_or(u32::MAX))
            .map_or(usize::MAX, |n| n - 1);
        if self.fleet.instances > max_selectable {
            return Err(SfmError::InvalidConfig {
                details: format!(
                    "fleet.instances ({}) exceeds the highest id selectable with \
                     ui.input_limit={} ({max_selectable})",
                    self.fleet.instances, self.ui.input_limit
                ),
            });
        }

        if self.bus.capacity == 0 {
            return Err(SfmError::InvalidConfig {
                details: "bus.capacity must be >= 1".to_string(),
            });
        }

        if self.timing.tick_ms < 100 {
            return Err(SfmError::InvalidConfig {
                details: format!(
                    "timing.tick_ms must be >= 100, got {}",
                    self.timing.tick_ms
                ),
            });
        }

        if self.timing.sim_delay_min_ms >= self.timing.sim_delay_max_ms {
            return Err(SfmError::InvalidConfig {
                details: format!(
                    "timing.sim_delay_min_ms ({}) must be < sim_delay_max_ms ({})",
                    self.timing.sim_delay_min_ms, self.timing.sim_delay_max_ms
                ),
            });
        }

        if self.ui.log_ring_capacity == 0 {
            return Err(SfmError::InvalidConfig {
                details: "ui.log_ring_capacity must be >= 1".to_string(),
            });
        }

        if self.ui.detail_tail_lines == 0 {
            return Err(SfmError::InvalidConfig {
                details: "ui.detail_tail_lines must be >= 1".to_string(),
            });
        }

        if self.ui.input_limit == 0 || self.ui.input_limit > 10 {
            return Err(SfmError::InvalidConfig {
                details: format!(
                    "ui.input_limit must be in [1, 10], got {}",
                    self.ui.input_limit
                ),
            });
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn set_u64<F>(lookup: &mut F, name: &str, slot: &mut u64) -> Result<()>
where
    F: FnMut(&str) -> Option<String>,
{
    if let Some(raw) = lookup(name) {
        *slot = raw.parse::<u64>().map_err(|error| SfmError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })?;
    }
    Ok(())
}

fn set_usize<F>(lookup: &mut F, name: &str, slot: &mut usize) -> Result<()>
where
    F: FnMut(&str) -> Option<String>,
{
    if let Some(raw) = lookup(name) {
        *slot = raw
            .parse::<usize>()
            .map_err(|error| SfmError::ConfigParse {
                context: "env",
                details: format!("{name}={raw:?}: {error}"),
            })?;
    }
    Ok(())
}
