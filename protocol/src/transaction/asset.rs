//! Native asset table: short name -> contract location and precision.
//!
//! Resolution is exact-match on the short name. It is the first thing every
//! builder does so that a typo fails before any account is unlocked.

use serde::{Deserialize, Serialize};

use super::error::TransferError;
use crate::config::{BuilderConfig, ConfigError};
use crate::identity::Address;

/// A registered native asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    pub name: String,
    pub contract: Address,
    pub precision: i64,
}

impl AssetDescriptor {
    /// Converts a display amount into base units: `raw * precision`.
    ///
    /// # Errors
    ///
    /// [`TransferError::AmountOverflow`] if the product does not fit in
    /// an `i64`.
    pub fn scale(&self, raw_amount: i64) -> Result<i64, TransferError> {
        raw_amount
            .checked_mul(self.precision)
            .ok_or(TransferError::AmountOverflow {
                amount: raw_amount,
                precision: self.precision,
            })
    }

    /// Scales every amount into a new vector. The input is left untouched.
    pub fn scale_all(&self, raw_amounts: &[i64]) -> Result<Vec<i64>, TransferError> {
        raw_amounts.iter().map(|&a| self.scale(a)).collect()
    }
}

/// Read-only lookup table built once from a [`BuilderConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRegistry {
    assets: Vec<AssetDescriptor>,
}

impl AssetRegistry {
    /// Validates the config and parses every contract location.
    pub fn from_config(config: &BuilderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let assets = config
            .assets
            .iter()
            .map(|entry| {
                let contract =
                    Address::from_hex(&entry.contract).map_err(|e| ConfigError::InvalidContract {
                        asset: entry.name.clone(),
                        reason: e.to_string(),
                    })?;
                Ok(AssetDescriptor {
                    name: entry.name.clone(),
                    contract,
                    precision: entry.precision,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self { assets })
    }

    /// Looks up a registered asset by its exact short name.
    pub fn resolve(&self, name: &str) -> Result<&AssetDescriptor, TransferError> {
        self.assets
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| TransferError::UnknownAsset(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.assets.iter().map(|a| a.name.as_str())
    }
}
