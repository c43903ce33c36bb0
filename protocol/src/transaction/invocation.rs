//! The invocation transaction: a contract call plus the header fields the
//! ledger needs to charge and order it, and the signature slots attached
//! afterwards.
//!
//! # Canonical byte format
//!
//! ```text
//! signable:  version(u8) | tx_type(u8) | nonce(u32) | gas_price(u64)
//!            | gas_limit(u64) | payer(20) | var_bytes(payload) | attrs(varint 0)
//! payload:   contract(20) | var_bytes(method) | var_bytes(args) | vm(u8)
//! wire:      signable | varint(#slots) | slot*
//! slot:      varint(#keys) | var_bytes(key)* | varint(m) | varint(#sigs) | var_bytes(sig)*
//! ```
//!
//! The content hash is `double_sha256(signable)`, so it is stable across
//! signing.

use serde::{Deserialize, Serialize};

use super::encoding::{write_var_bytes, write_varint, DecodeError, WireReader};
use super::error::TransferError;
use super::types::VmKind;
use crate::config::{TX_TYPE_INVOKE, TX_VERSION};
use crate::crypto::hash::double_sha256;
use crate::crypto::keys::{KeyError, PublicKey};
use crate::identity::Address;

// ---------------------------------------------------------------------------
// InvokePayload
// ---------------------------------------------------------------------------

/// The contract call carried by the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokePayload {
    /// Contract location being invoked.
    pub contract: Address,
    /// Method name, e.g. `"transfer"`.
    pub method: String,
    /// Serialized method arguments.
    pub args: Vec<u8>,
    pub vm: VmKind,
}

impl InvokePayload {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(32 + self.method.len() + self.args.len());
        buf.extend_from_slice(self.contract.as_bytes());
        write_var_bytes(&mut buf, self.method.as_bytes());
        write_var_bytes(&mut buf, &self.args);
        buf.push(self.vm.byte());
        buf
    }

    fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = WireReader::new(data);
        let contract = Address::new(reader.read_array()?);
        let method = String::from_utf8(reader.read_var_bytes()?.to_vec()).map_err(|e| {
            DecodeError::InvalidField {
                field: "method",
                reason: e.to_string(),
            }
        })?;
        let args = reader.read_var_bytes()?.to_vec();
        let vm_byte = reader.read_u8()?;
        let vm = VmKind::from_byte(vm_byte).ok_or_else(|| DecodeError::InvalidField {
            field: "vm",
            reason: format!("unknown vm kind 0x{vm_byte:02x}"),
        })?;
        reader.finish()?;
        Ok(Self {
            contract,
            method,
            args,
            vm,
        })
    }
}

// ---------------------------------------------------------------------------
// SignatureSlot
// ---------------------------------------------------------------------------

/// Signatures from one signer group.
///
/// Slots are positional: the ledger checks slot `i` against the `i`-th
/// signer the transaction requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureSlot {
    pub public_keys: Vec<PublicKey>,
    /// Number of signatures required from `public_keys`.
    pub m: u16,
    pub signatures: Vec<Vec<u8>>,
}

impl SignatureSlot {
    fn write(&self, buf: &mut Vec<u8>) {
        write_varint(buf, self.public_keys.len() as u64);
        for key in &self.public_keys {
            write_var_bytes(buf, &key.to_wire_bytes());
        }
        write_varint(buf, self.m as u64);
        write_varint(buf, self.signatures.len() as u64);
        for sig in &self.signatures {
            write_var_bytes(buf, sig);
        }
    }

    fn read(reader: &mut WireReader<'_>) -> Result<Self, TransferError> {
        let key_count = reader.read_varint()?;
        let mut public_keys = Vec::new();
        for _ in 0..key_count {
            let key = PublicKey::from_wire_bytes(reader.read_var_bytes()?).map_err(|e| match e {
                KeyError::KeyType(inner) => TransferError::UnrecognizedKeyType(inner),
                other => TransferError::MalformedTransaction(DecodeError::InvalidField {
                    field: "public_key",
                    reason: other.to_string(),
                }),
            })?;
            public_keys.push(key);
        }
        let m = reader.read_varint()?;
        let m = u16::try_from(m).map_err(|_| DecodeError::InvalidField {
            field: "m",
            reason: format!("{m} exceeds u16"),
        })?;
        let sig_count = reader.read_varint()?;
        let mut signatures = Vec::new();
        for _ in 0..sig_count {
            signatures.push(reader.read_var_bytes()?.to_vec());
        }
        Ok(Self {
            public_keys,
            m,
            signatures,
        })
    }

    /// `true` if every signature verifies against some key of the slot and
    /// at least `m` of them do.
    pub fn verify(&self, message: &[u8]) -> bool {
        let valid = self
            .signatures
            .iter()
            .filter(|sig| self.public_keys.iter().any(|pk| pk.verify(message, sig)))
            .count();
        valid == self.signatures.len() && valid >= self.m as usize
    }
}

// ---------------------------------------------------------------------------
// InvokeTransaction
// ---------------------------------------------------------------------------

/// An invocation transaction, unsigned until signature slots are attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeTransaction {
    pub version: u8,
    pub tx_type: u8,
    /// Random value that makes otherwise identical transactions distinct.
    pub nonce: u32,
    pub gas_price: u64,
    /// Gas budget for the whole call.
    pub gas_limit: u64,
    /// Account that pays for gas; the invoking account.
    pub payer: Address,
    pub payload: InvokePayload,
    /// Signature slots in signer order. Empty until signed.
    pub sigs: Vec<SignatureSlot>,
}

impl InvokeTransaction {
    /// Wraps a native-contract call into an unsigned transaction with a
    /// random nonce.
    pub fn new_native(
        contract: Address,
        method: &str,
        args: Vec<u8>,
        payer: Address,
        gas_price: u64,
        gas_limit: u64,
    ) -> Self {
        Self {
            version: TX_VERSION,
            tx_type: TX_TYPE_INVOKE,
            nonce: rand::random(),
            gas_price,
            gas_limit,
            payer,
            payload: InvokePayload {
                contract,
                method: method.to_string(),
                args,
                vm: VmKind::Native,
            },
            sigs: Vec::new(),
        }
    }

    /// Canonical bytes covered by signatures and the content hash.
    /// Signature slots are excluded.
    pub fn signable_bytes(&self) -> Vec<u8> {
        let payload = self.payload.to_bytes();
        let mut buf = Vec::with_capacity(64 + payload.len());
        buf.push(self.version);
        buf.push(self.tx_type);
        buf.extend_from_slice(&self.nonce.to_le_bytes());
        buf.extend_from_slice(&self.gas_price.to_le_bytes());
        buf.extend_from_slice(&self.gas_limit.to_le_bytes());
        buf.extend_from_slice(self.payer.as_bytes());
        write_var_bytes(&mut buf, &payload);
        // No attributes.
        write_varint(&mut buf, 0);
        buf
    }

    /// Content hash: `hex(double_sha256(signable_bytes))`.
    pub fn hash(&self) -> String {
        hex::encode(double_sha256(&self.signable_bytes()))
    }

    /// Full wire form including signature slots.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = self.signable_bytes();
        write_varint(&mut buf, self.sigs.len() as u64);
        for slot in &self.sigs {
            slot.write(&mut buf);
        }
        buf
    }

    /// Hex of [`to_bytes`](Self::to_bytes), the form handed to the network.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parses a wire-form transaction.
    ///
    /// # Errors
    ///
    /// [`TransferError::UnrecognizedKeyType`] if a signature slot carries a
    /// key with an undeclared label, [`TransferError::MalformedTransaction`]
    /// for anything else that does not parse.
    pub fn from_bytes(data: &[u8]) -> Result<Self, TransferError> {
        let mut reader = WireReader::new(data);
        let version = reader.read_u8()?;
        let tx_type = reader.read_u8()?;
        let nonce = reader.read_u32()?;
        let gas_price = reader.read_u64()?;
        let gas_limit = reader.read_u64()?;
        let payer = Address::new(reader.read_array()?);
        let payload = InvokePayload::from_bytes(reader.read_var_bytes()?)?;
        let attributes = reader.read_varint()?;
        if attributes != 0 {
            return Err(DecodeError::InvalidField {
                field: "attributes",
                reason: format!("expected none, found {attributes}"),
            }
            .into());
        }
        let slot_count = reader.read_varint()?;
        let mut sigs = Vec::new();
        for _ in 0..slot_count {
            sigs.push(SignatureSlot::read(&mut reader)?);
        }
        reader.finish()?;
        Ok(Self {
            version,
            tx_type,
            nonce,
            gas_price,
            gas_limit,
            payer,
            payload,
            sigs,
        })
    }

    /// Parses the hex wire form.
    pub fn from_hex(s: &str) -> Result<Self, TransferError> {
        let bytes = hex::decode(s.trim()).map_err(|e| DecodeError::InvalidField {
            field: "hex",
            reason: e.to_string(),
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn is_signed(&self) -> bool {
        !self.sigs.is_empty()
    }

    /// Checks every attached slot against the signable bytes.
    pub fn verify_signatures(&self) -> bool {
        let message = self.signable_bytes();
        self.is_signed() && self.sigs.iter().all(|slot| slot.verify(&message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::{Ed25519Keypair, Signer};
    use crate::crypto::KeyKind;
    use crate::transaction::types::{TransferState, Transfers};

    fn sample_tx() -> InvokeTransaction {
        let args = Transfers::new(vec![TransferState::new(
            Address::new([1; 20]),
            Address::new([2; 20]),
            100,
        )])
        .to_bytes();
        let mut tx = InvokeTransaction::new_native(
            Address::new([0xff; 20]),
            "transfer",
            args,
            Address::new([1; 20]),
            0,
            500,
        );
        tx.nonce = 42;
        tx
    }

    #[test]
    fn header_defaults() {
        let tx = sample_tx();
        assert_eq!(tx.version, TX_VERSION);
        assert_eq!(tx.tx_type, 0xd1);
        assert_eq!(tx.payload.vm, VmKind::Native);
        assert!(!tx.is_signed());
    }

    #[test]
    fn hash_is_deterministic_hex() {
        let a = sample_tx();
        let b = sample_tx();
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.hash().len(), 64);
    }

    #[test]
    fn hash_depends_on_nonce_and_gas() {
        let base = sample_tx();
        let mut other = sample_tx();
        other.nonce = 43;
        assert_ne!(base.hash(), other.hash());

        let mut other = sample_tx();
        other.gas_limit = 501;
        assert_ne!(base.hash(), other.hash());
    }

    #[test]
    fn signatures_do_not_change_hash() {
        let mut tx = sample_tx();
        let before = tx.hash();
        tx.sigs.push(SignatureSlot {
            public_keys: vec![Ed25519Keypair::generate().public_key()],
            m: 1,
            signatures: vec![vec![0u8; 64]],
        });
        assert_eq!(tx.hash(), before);
        assert_ne!(tx.to_bytes(), tx.signable_bytes());
    }

    #[test]
    fn wire_form_parses_back_with_signatures() {
        let kp = Ed25519Keypair::from_seed(&[9u8; 32]);
        let mut tx = sample_tx();
        let sig = kp.sign(&tx.signable_bytes());
        tx.sigs.push(SignatureSlot {
            public_keys: vec![kp.public_key()],
            m: 1,
            signatures: vec![sig],
        });

        let parsed = InvokeTransaction::from_hex(&tx.to_hex()).unwrap();
        assert_eq!(parsed, tx);
        assert!(parsed.verify_signatures());
    }

    #[test]
    fn undeclared_key_label_rejected_on_decode() {
        let mut tx = sample_tx();
        tx.sigs.push(SignatureSlot {
            public_keys: vec![PublicKey::new(KeyKind::Eddsa, vec![7u8; 32])],
            m: 1,
            signatures: vec![vec![0u8; 64]],
        });
        let mut bytes = tx.to_bytes();
        // Locate the EDDSA label of the single key and corrupt it.
        let wire_key = tx.sigs[0].public_keys[0].to_wire_bytes();
        let pos = bytes
            .windows(wire_key.len())
            .position(|w| w == wire_key.as_slice())
            .unwrap();
        bytes[pos] = 0x00;

        let err = InvokeTransaction::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, TransferError::UnrecognizedKeyType(_)));
    }

    #[test]
    fn truncated_wire_form_rejected() {
        let bytes = sample_tx().to_bytes();
        let err = InvokeTransaction::from_bytes(&bytes[..bytes.len() - 2]).unwrap_err();
        assert!(matches!(err, TransferError::MalformedTransaction(_)));
    }

    #[test]
    fn forged_signature_does_not_verify() {
        let kp = Ed25519Keypair::generate();
        let mut tx = sample_tx();
        tx.sigs.push(SignatureSlot {
            public_keys: vec![kp.public_key()],
            m: 1,
            signatures: vec![kp.sign(b"something else")],
        });
        assert!(!tx.verify_signatures());
    }
}
