//! Core value types carried inside a transfer invocation.
//!
//! A [`TransferState`] is one funds movement; [`Transfers`] is the ordered
//! batch a `"transfer"` call carries; [`TransferFrom`] is the argument of a
//! delegated `"transferFrom"` call. All amounts are base units, already
//! scaled by the asset's precision factor.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::encoding::{write_varint, DecodeError, WireReader};
use crate::identity::Address;

// ---------------------------------------------------------------------------
// VmKind
// ---------------------------------------------------------------------------

/// Virtual machine that executes an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VmKind {
    /// Built-in native contracts (the asset contracts live here).
    Native,
    /// NeoVM bytecode contracts.
    NeoVm,
    /// WebAssembly contracts.
    WasmVm,
}

impl VmKind {
    /// Wire byte.
    pub fn byte(self) -> u8 {
        match self {
            Self::Native => 0xff,
            Self::NeoVm => 0x80,
            Self::WasmVm => 0x90,
        }
    }

    /// Parses a wire byte.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0xff => Some(Self::Native),
            0x80 => Some(Self::NeoVm),
            0x90 => Some(Self::WasmVm),
            _ => None,
        }
    }
}

impl fmt::Display for VmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "Native"),
            Self::NeoVm => write!(f, "NeoVM"),
            Self::WasmVm => write!(f, "WasmVM"),
        }
    }
}

// ---------------------------------------------------------------------------
// TransferState
// ---------------------------------------------------------------------------

/// One funds movement: `from` pays `amount` base units to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferState {
    pub from: Address,
    pub to: Address,
    pub amount: i64,
}

impl TransferState {
    pub fn new(from: Address, to: Address, amount: i64) -> Self {
        Self { from, to, amount }
    }

    fn write(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.from.as_bytes());
        buf.extend_from_slice(self.to.as_bytes());
        buf.extend_from_slice(&self.amount.to_le_bytes());
    }

    fn read(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        let from = Address::new(reader.read_array()?);
        let to = Address::new(reader.read_array()?);
        let amount = i64::from_le_bytes(reader.read_array()?);
        Ok(Self { from, to, amount })
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.from, self.to, self.amount)
    }
}

// ---------------------------------------------------------------------------
// Transfers
// ---------------------------------------------------------------------------

/// Ordered batch of transfer records. The ledger applies them in sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfers {
    pub states: Vec<TransferState>,
}

impl Transfers {
    pub fn new(states: Vec<TransferState>) -> Self {
        Self { states }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Sum of all record amounts, or `None` on overflow.
    pub fn total_amount(&self) -> Option<i64> {
        self.states
            .iter()
            .try_fold(0i64, |acc, s| acc.checked_add(s.amount))
    }

    /// Argument bytes of a `"transfer"` call: varint count, then each
    /// record as `from(20) || to(20) || amount(i64 LE)`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(9 + self.states.len() * 48);
        write_varint(&mut buf, self.states.len() as u64);
        for state in &self.states {
            state.write(&mut buf);
        }
        buf
    }

    /// Parses the argument bytes of a `"transfer"` call.
    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = WireReader::new(data);
        let count = reader.read_varint()?;
        let mut states = Vec::new();
        for _ in 0..count {
            states.push(TransferState::read(&mut reader)?);
        }
        reader.finish()?;
        Ok(Self { states })
    }
}

// ---------------------------------------------------------------------------
// TransferFrom
// ---------------------------------------------------------------------------

/// Argument of a delegated `"transferFrom"` call: `sender` spends from the
/// allowance that `from` granted it, paying `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFrom {
    pub sender: Address,
    pub from: Address,
    pub to: Address,
    pub amount: i64,
}

impl TransferFrom {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(68);
        buf.extend_from_slice(self.sender.as_bytes());
        buf.extend_from_slice(self.from.as_bytes());
        buf.extend_from_slice(self.to.as_bytes());
        buf.extend_from_slice(&self.amount.to_le_bytes());
        buf
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = WireReader::new(data);
        let sender = Address::new(reader.read_array()?);
        let from = Address::new(reader.read_array()?);
        let to = Address::new(reader.read_array()?);
        let amount = i64::from_le_bytes(reader.read_array()?);
        reader.finish()?;
        Ok(Self {
            sender,
            from,
            to,
            amount,
        })
    }
}
