//! # Configuration & Constants
//!
//! Fixed ledger constants (native contract locations, transaction header
//! values, defaults) and the [`BuilderConfig`] that the transfer builder
//! reads them through.
//!
//! The asset table is data, not code: each asset carries its own precision
//! factor so a deployment can override it without touching the builder.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::identity::Address;

// ---------------------------------------------------------------------------
// Native Assets
// ---------------------------------------------------------------------------

/// Short name of the governance asset.
pub const ONT_ASSET: &str = "ont";

/// Short name of the gas asset.
pub const ONG_ASSET: &str = "ong";

/// Contract location of the ONT native contract.
pub const ONT_CONTRACT_HEX: &str = "ff00000000000000000000000000000000000001";

/// Contract location of the ONG native contract.
pub const ONG_CONTRACT_HEX: &str = "ff00000000000000000000000000000000000002";

/// Precision factor applied to both native assets unless overridden.
pub const DEFAULT_PRECISION: i64 = 1;

// ---------------------------------------------------------------------------
// Transaction Header
// ---------------------------------------------------------------------------

/// Transaction format version written into every header.
pub const TX_VERSION: u8 = 0;

/// Transaction type byte for contract invocations.
pub const TX_TYPE_INVOKE: u8 = 0xd1;

/// Default gas price when the config does not set one.
pub const DEFAULT_GAS_PRICE: u64 = 0;

/// Default gas budget used by the CLI when none is given.
pub const DEFAULT_GAS_LIMIT: u64 = 20_000;

/// Method name of a direct transfer.
pub const METHOD_TRANSFER: &str = "transfer";

/// Method name of a delegated (allowance) transfer.
pub const METHOD_TRANSFER_FROM: &str = "transferFrom";

// ---------------------------------------------------------------------------
// BuilderConfig
// ---------------------------------------------------------------------------

/// Errors raised while loading or validating a [`BuilderConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid contract location for asset {asset}: {reason}")]
    InvalidContract { asset: String, reason: String },

    #[error("precision for asset {asset} must be >= 1, got {precision}")]
    InvalidPrecision { asset: String, precision: i64 },

    #[error("asset {0} is declared more than once")]
    DuplicateAsset(String),
}

/// One entry of the asset table as it appears in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    /// Short asset name, matched exactly (`"ont"`, `"ong"`).
    pub name: String,
    /// Contract location, 40 hex characters.
    pub contract: String,
    /// Multiplier from display amount to base units.
    #[serde(default = "default_precision")]
    pub precision: i64,
}

fn default_precision() -> i64 {
    DEFAULT_PRECISION
}

/// Settings read by the transfer builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Registered native assets.
    pub assets: Vec<AssetEntry>,
    /// Gas price written into every built transaction.
    pub gas_price: u64,
    /// Reject non-positive amounts on every builder path, not only on
    /// delegated transfers.
    pub strict_amounts: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            assets: vec![
                AssetEntry {
                    name: ONT_ASSET.to_string(),
                    contract: ONT_CONTRACT_HEX.to_string(),
                    precision: DEFAULT_PRECISION,
                },
                AssetEntry {
                    name: ONG_ASSET.to_string(),
                    contract: ONG_CONTRACT_HEX.to_string(),
                    precision: DEFAULT_PRECISION,
                },
            ],
            gas_price: DEFAULT_GAS_PRICE,
            strict_amounts: false,
        }
    }
}

impl BuilderConfig {
    /// Loads a JSON config file and validates it.
    ///
    /// Missing fields fall back to [`BuilderConfig::default`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks contract locations, precision factors, and name uniqueness.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for entry in &self.assets {
            if !seen.insert(entry.name.as_str()) {
                return Err(ConfigError::DuplicateAsset(entry.name.clone()));
            }
            Address::from_hex(&entry.contract).map_err(|e| ConfigError::InvalidContract {
                asset: entry.name.clone(),
                reason: e.to_string(),
            })?;
            if entry.precision < 1 {
                return Err(ConfigError::InvalidPrecision {
                    asset: entry.name.clone(),
                    precision: entry.precision,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn native_contracts_are_distinct() {
        assert_ne!(ONT_CONTRACT_HEX, ONG_CONTRACT_HEX);
        assert_eq!(ONT_CONTRACT_HEX.len(), 40);
        assert_eq!(ONG_CONTRACT_HEX.len(), 40);
    }

    #[test]
    fn default_config_is_valid() {
        let config = BuilderConfig::default();
        config.validate().unwrap();
        assert_eq!(config.assets.len(), 2);
        assert!(config.assets.iter().all(|a| a.precision == 1));
        assert!(!config.strict_amounts);
    }

    #[test]
    fn load_partial_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "gas_price": 500, "strict_amounts": true }}"#).unwrap();

        let config = BuilderConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.gas_price, 500);
        assert!(config.strict_amounts);
        assert_eq!(config.assets, BuilderConfig::default().assets);
    }

    #[test]
    fn precision_override_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "assets": [{{ "name": "ong", "contract": "{}", "precision": 1000000000 }}] }}"#,
            ONG_CONTRACT_HEX
        )
        .unwrap();

        let config = BuilderConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.assets.len(), 1);
        assert_eq!(config.assets[0].precision, 1_000_000_000);
    }

    #[test]
    fn zero_precision_rejected() {
        let mut config = BuilderConfig::default();
        config.assets[0].precision = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPrecision { precision: 0, .. })
        ));
    }

    #[test]
    fn duplicate_asset_rejected() {
        let mut config = BuilderConfig::default();
        config.assets[1].name = ONT_ASSET.to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateAsset(name)) if name == "ont"
        ));
    }

    #[test]
    fn bad_contract_rejected() {
        let mut config = BuilderConfig::default();
        config.assets[0].contract = "ff01".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidContract { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = BuilderConfig::from_json_file("/nonexistent/asset-tx.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
