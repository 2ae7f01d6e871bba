//! Tunables for [`crate::directory::AttendanceDirectory`].

use std::time::Duration;

use serde::Deserialize;

use crate::{Error, Result};

/// Directory settings. Every field has a default, so an empty table
/// deserialises to [`DirectoryConfig::default`].
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
  /// Shared secret required to self-register as an admin.
  #[serde(default = "default_admin_secret")]
  pub admin_secret:           String,
  /// Check-ins whose local hour is greater than this are `LATE`.
  #[serde(default = "default_late_after_hour")]
  pub late_after_hour:        u32,
  /// Allow more than one check-in per user per day.
  #[serde(default = "default_true")]
  pub allow_repeat_check_ins: bool,
  /// Days of synthetic history generated when the ledger is empty.
  #[serde(default = "default_seed_days")]
  pub seed_days:              u32,
  /// Artificial delay before each operation, to imitate a remote backend.
  #[serde(default)]
  pub simulated_latency:      Option<LatencyRange>,
  /// Seed for the directory's RNG; entropy when unset.
  #[serde(default)]
  pub rng_seed:               Option<u64>,
}

fn default_admin_secret() -> String { "Vsvg@admin".to_owned() }
fn default_late_after_hour() -> u32 { 9 }
fn default_true() -> bool { true }
fn default_seed_days() -> u32 { 5 }

impl Default for DirectoryConfig {
  fn default() -> Self {
    Self {
      admin_secret:           default_admin_secret(),
      late_after_hour:        default_late_after_hour(),
      allow_repeat_check_ins: true,
      seed_days:              default_seed_days(),
      simulated_latency:      None,
      rng_seed:               None,
    }
  }
}

impl DirectoryConfig {
  pub fn validate(&self) -> Result<()> {
    if self.admin_secret.is_empty() {
      return Err(Error::InvalidInput("admin_secret must not be empty".into()));
    }
    if self.late_after_hour > 23 {
      return Err(Error::InvalidInput(format!(
        "late_after_hour must be between 0 and 23, got {}",
        self.late_after_hour
      )));
    }
    if self.seed_days > 366 {
      return Err(Error::InvalidInput(format!(
        "seed_days must be at most 366, got {}",
        self.seed_days
      )));
    }
    if let Some(latency) = &self.simulated_latency
      && latency.min_ms > latency.max_ms
    {
      return Err(Error::InvalidInput(format!(
        "simulated_latency.min_ms ({}) exceeds max_ms ({})",
        latency.min_ms, latency.max_ms
      )));
    }
    Ok(())
  }
}

/// Inclusive range of artificial delays, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LatencyRange {
  pub min_ms: u64,
  pub max_ms: u64,
}

impl LatencyRange {
  pub fn bounds(&self) -> (Duration, Duration) {
    (Duration::from_millis(self.min_ms), Duration::from_millis(self.max_ms))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_table_uses_defaults() {
    let cfg: DirectoryConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg.admin_secret, "Vsvg@admin");
    assert_eq!(cfg.late_after_hour, 9);
    assert!(cfg.allow_repeat_check_ins);
    assert_eq!(cfg.seed_days, 5);
    assert!(cfg.simulated_latency.is_none());
    cfg.validate().unwrap();
  }

  #[test]
  fn rejects_inverted_latency_and_bad_hour() {
    let cfg = DirectoryConfig {
      simulated_latency: Some(LatencyRange { min_ms: 2000, max_ms: 500 }),
      ..DirectoryConfig::default()
    };
    assert!(matches!(cfg.validate(), Err(Error::InvalidInput(_))));

    let cfg = DirectoryConfig { late_after_hour: 24, ..DirectoryConfig::default() };
    assert!(matches!(cfg.validate(), Err(Error::InvalidInput(_))));
  }
}
