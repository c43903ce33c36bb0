//! # Key-Type Registry
//!
//! The closed set of signature algorithms the ledger understands, each bound
//! to the one-byte label that prefixes serialized public keys on the wire.
//!
//! | Label  | Kind    |
//! |--------|---------|
//! | `0x12` | ECDSA   |
//! | `0x13` | SM2     |
//! | `0x14` | EDDSA   |
//!
//! Lookup by label is strict: an undeclared byte is an error, never a
//! fallback to some default algorithm.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Wire label for ECDSA keys.
pub const LABEL_ECDSA: u8 = 0x12;

/// Wire label for SM2 keys.
pub const LABEL_SM2: u8 = 0x13;

/// Wire label for EdDSA keys.
pub const LABEL_EDDSA: u8 = 0x14;

/// Errors from key-type classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyTypeError {
    /// The byte does not match any declared key-type label.
    #[error("unrecognized key type label: 0x{0:02x}")]
    UnrecognizedLabel(u8),

    /// The name does not match any declared key type.
    #[error("unrecognized key type name: {0}")]
    UnrecognizedName(String),
}

/// Signature algorithm family of a public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyKind {
    /// ECDSA over a NIST curve.
    Ecdsa,
    /// SM2 (Chinese national standard).
    Sm2,
    /// EdDSA (Ed25519).
    Eddsa,
}

impl KeyKind {
    /// Every declared kind, in label order.
    pub const ALL: [KeyKind; 3] = [KeyKind::Ecdsa, KeyKind::Sm2, KeyKind::Eddsa];

    /// Resolves a wire label to its key kind.
    ///
    /// # Errors
    ///
    /// [`KeyTypeError::UnrecognizedLabel`] for any byte outside the declared
    /// set.
    pub fn from_label(label: u8) -> Result<Self, KeyTypeError> {
        match label {
            LABEL_ECDSA => Ok(Self::Ecdsa),
            LABEL_SM2 => Ok(Self::Sm2),
            LABEL_EDDSA => Ok(Self::Eddsa),
            other => Err(KeyTypeError::UnrecognizedLabel(other)),
        }
    }

    /// The one-byte wire label.
    pub fn label(self) -> u8 {
        match self {
            Self::Ecdsa => LABEL_ECDSA,
            Self::Sm2 => LABEL_SM2,
            Self::Eddsa => LABEL_EDDSA,
        }
    }

    /// Algorithm name as printed in wallets and logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Ecdsa => "ECDSA",
            Self::Sm2 => "SM2",
            Self::Eddsa => "EDDSA",
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyKind {
    type Err = KeyTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| KeyTypeError::UnrecognizedName(s.to_string()))
    }
}

impl TryFrom<u8> for KeyKind {
    type Error = KeyTypeError;

    fn try_from(label: u8) -> Result<Self, Self::Error> {
        Self::from_label(label)
    }
}

impl From<KeyKind> for u8 {
    fn from(kind: KeyKind) -> u8 {
        kind.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_labels() {
        assert_eq!(KeyKind::Ecdsa.label(), 0x12);
        assert_eq!(KeyKind::Sm2.label(), 0x13);
        assert_eq!(KeyKind::Eddsa.label(), 0x14);
    }

    #[test]
    fn from_label_inverts_label() {
        for kind in KeyKind::ALL {
            assert_eq!(KeyKind::from_label(kind.label()).unwrap(), kind);
        }
    }

    #[test]
    fn every_undeclared_byte_is_rejected() {
        let declared: Vec<u8> = KeyKind::ALL.iter().map(|k| k.label()).collect();
        for byte in 0..=u8::MAX {
            let result = KeyKind::from_label(byte);
            if declared.contains(&byte) {
                assert!(result.is_ok());
            } else {
                assert_eq!(result, Err(KeyTypeError::UnrecognizedLabel(byte)));
            }
        }
    }

    #[test]
    fn boundary_bytes_rejected() {
        assert!(KeyKind::from_label(0x00).is_err());
        assert!(KeyKind::from_label(0xFF).is_err());
        assert!(KeyKind::from_label(0x11).is_err());
        assert!(KeyKind::from_label(0x15).is_err());
    }

    #[test]
    fn labels_are_distinct() {
        assert_ne!(LABEL_ECDSA, LABEL_SM2);
        assert_ne!(LABEL_SM2, LABEL_EDDSA);
        assert_ne!(LABEL_ECDSA, LABEL_EDDSA);
    }

    #[test]
    fn parse_names_case_insensitively() {
        assert_eq!("eddsa".parse::<KeyKind>().unwrap(), KeyKind::Eddsa);
        assert_eq!("SM2".parse::<KeyKind>().unwrap(), KeyKind::Sm2);
        assert!("rsa".parse::<KeyKind>().is_err());
    }

    #[test]
    fn error_message_shows_hex_label() {
        let err = KeyKind::from_label(0x00).unwrap_err();
        assert_eq!(err.to_string(), "unrecognized key type label: 0x00");
    }
}
