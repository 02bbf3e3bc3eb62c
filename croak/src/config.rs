use embedded_time::duration::Milliseconds;

use crate::retry::{Attempts, Strategy};
use crate::time::Millis;

/// The UDP port CoAP servers listen on by default, and the port whose
/// absence from a URL means "no Uri-Port option needed".
pub const DEFAULT_PORT: u16 = 5683;

/// Runtime config
///
/// The defaults are the RFC7252 transmission parameters:
///
/// ```
/// use croak::config::Config;
/// use croak::retry::Attempts;
/// use embedded_time::duration::Milliseconds;
///
/// let config = Config::default();
/// assert_eq!(config.retransmit_initial_min, Milliseconds(2000u64));
/// assert_eq!(config.retransmit_initial_max, Milliseconds(3000u64));
/// assert_eq!(config.retransmit_max_attempts, Attempts(4));
/// assert_eq!(config.block_szx, 2);
/// assert_eq!(config.default_port, 5683);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
  /// Minimum (inclusive) initial timeout for an unacked CON request.
  ///
  /// The actual initial timeout is drawn uniformly from
  /// `[retransmit_initial_min, retransmit_initial_max]` and doubles
  /// after every retransmission.
  pub retransmit_initial_min: Millis,

  /// Maximum (inclusive) initial timeout for an unacked CON request.
  pub retransmit_initial_max: Millis,

  /// Number of times we are allowed to resend a CON request before
  /// failing it, not counting the initial send.
  pub retransmit_max_attempts: Attempts,

  /// Block size exponent used for all block-wise transfers.
  ///
  /// Block byte size is `2^(block_szx + 4)`; the default of 2 yields
  /// 64-byte blocks.
  pub block_szx: u8,

  /// Port used when a request URL does not name one.
  pub default_port: u16,
}

impl Default for Config {
  fn default() -> Self {
    Config { retransmit_initial_min: Milliseconds(2000),
             retransmit_initial_max: Milliseconds(3000),
             retransmit_max_attempts: Attempts(4),
             block_szx: 2,
             default_port: DEFAULT_PORT }
  }
}

/// An error encounterable from [`Config::set`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
  /// The key is not one the core recognizes
  UnknownKey(String),
  /// The value is out of range for the key
  InvalidValue {
    /// The key being set
    key: &'static str,
    /// The rejected value
    value: u64,
  },
}

impl Config {
  /// Update one configuration value by key.
  ///
  /// Exactly these keys are recognized; any other key is rejected:
  ///
  /// | key | default |
  /// |---|---|
  /// | `retransmit_initial_min_ms` | 2000 |
  /// | `retransmit_initial_max_ms` | 3000 |
  /// | `retransmit_max_attempts` | 4 |
  /// | `block_szx` | 2 |
  /// | `default_port` | 5683 |
  ///
  /// ```
  /// use croak::config::Config;
  ///
  /// let mut config = Config::default();
  /// config.set("block_szx", 4).unwrap();
  /// assert_eq!(config.block_szx, 4);
  /// assert!(config.set("burrow_depth", 4).is_err());
  /// ```
  pub fn set(&mut self, key: &str, value: u64) -> Result<(), ConfigError> {
    match key {
      | "retransmit_initial_min_ms" => {
        self.retransmit_initial_min = Milliseconds(value);
        Ok(())
      },
      | "retransmit_initial_max_ms" => {
        self.retransmit_initial_max = Milliseconds(value);
        Ok(())
      },
      | "retransmit_max_attempts" => u16::try_from(value).map(|v| {
                                                           self.retransmit_max_attempts = Attempts(v);
                                                         })
                                                         .map_err(|_| ConfigError::InvalidValue {
                                                           key: "retransmit_max_attempts",
                                                           value,
                                                         }),
      | "block_szx" if value > 6 => Err(ConfigError::InvalidValue { key: "block_szx",
                                                                    value }),
      | "block_szx" => {
        self.block_szx = value as u8;
        Ok(())
      },
      | "default_port" => u16::try_from(value).map(|v| {
                                                self.default_port = v;
                                              })
                                              .map_err(|_| ConfigError::InvalidValue {
                                                key: "default_port",
                                                value,
                                              }),
      | _ => Err(ConfigError::UnknownKey(key.to_string())),
    }
  }

  /// The retry schedule configured by the retransmit window.
  pub(crate) fn strategy(&self) -> Strategy {
    Strategy { init_min: self.retransmit_initial_min,
               init_max: self.retransmit_initial_max }
  }

  /// Total sends allowed per message (the initial send plus every
  /// retransmission).
  pub(crate) fn max_sends(&self) -> Attempts {
    Attempts(self.retransmit_max_attempts.0.saturating_add(1))
  }

  /// Block byte size configured by `block_szx`.
  pub(crate) fn block_size(&self) -> usize {
    1 << (self.block_szx as usize + 4)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn set_known_keys() {
    let mut config = Config::default();
    config.set("retransmit_initial_min_ms", 100).unwrap();
    config.set("retransmit_initial_max_ms", 200).unwrap();
    config.set("retransmit_max_attempts", 2).unwrap();
    config.set("block_szx", 6).unwrap();
    config.set("default_port", 1234).unwrap();

    assert_eq!(config,
               Config { retransmit_initial_min: Milliseconds(100),
                        retransmit_initial_max: Milliseconds(200),
                        retransmit_max_attempts: Attempts(2),
                        block_szx: 6,
                        default_port: 1234 });
  }

  #[test]
  fn unknown_keys_rejected() {
    let mut config = Config::default();
    assert_eq!(config.set("retransmit_jitter_ms", 10),
               Err(ConfigError::UnknownKey("retransmit_jitter_ms".to_string())));
    assert_eq!(config, Config::default());
  }

  #[test]
  fn out_of_range_values_rejected() {
    let mut config = Config::default();
    assert_eq!(config.set("block_szx", 7),
               Err(ConfigError::InvalidValue { key: "block_szx",
                                               value: 7 }));
    assert_eq!(config.set("default_port", 70_000),
               Err(ConfigError::InvalidValue { key: "default_port",
                                               value: 70_000 }));
  }

  #[test]
  fn derived_values() {
    let config = Config::default();
    assert_eq!(config.block_size(), 64);
    assert_eq!(config.max_sends(), Attempts(5));
  }
}
