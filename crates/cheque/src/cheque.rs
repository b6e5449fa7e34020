//! Cheque types and signing.
//!
//! A cheque is a signed commitment to pay a cumulative amount from a
//! settlement contract to a beneficiary. Cheques are exchanged off-chain and
//! can be cashed on-chain at any time; only the highest-serial cheque
//! matters for settlement.
//!
//! # Canonical Encoding
//!
//! The signing input is the fixed-width concatenation
//!
//! ```text
//! contract[20] || beneficiary[20] || serial[32] || amount[32] || timeout[32]
//! ```
//!
//! with each `u64` written big-endian into the low 8 bytes of its 32-byte
//! slot, matching the EVM's `uint256` encoding.

use alloy_primitives::{Address, B256, Signature, eip191_hash_message, keccak256};
use alloy_signer::SignerSync;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::ChequeError;

/// Length of the canonical signing encoding:
/// contract (20) + beneficiary (20) + serial (32) + amount (32) + timeout (32).
pub const ENCODED_CHEQUE_SIZE: usize = 20 + 20 + 32 + 32 + 32;

/// Length of a wire signature: r (32) + s (32) + recovery id (1).
pub const SIGNATURE_SIZE: usize = 65;

/// An unsigned cheque: a cumulative payment commitment under one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cheque {
    /// Settlement contract governing the channel. Fixed per channel.
    pub contract: Address,
    /// Party entitled to cash the cheque. Fixed per channel.
    pub beneficiary: Address,
    /// Strictly increasing sequence number, unique per channel.
    pub serial: u64,
    /// Cumulative total owed to date, not an increment.
    pub amount: u64,
    /// Reserved. Must be zero in the current protocol version.
    pub timeout: u64,
    /// Channel accounting unit carried for bookkeeping parity. Not part of
    /// the signing encoding.
    pub honey: u64,
}

impl Cheque {
    /// Create a new cheque with `timeout` zeroed per the current protocol
    /// version.
    pub fn new(contract: Address, beneficiary: Address, serial: u64, amount: u64, honey: u64) -> Self {
        Self {
            contract,
            beneficiary,
            serial,
            amount,
            timeout: 0,
            honey,
        }
    }

    /// Encode the cheque in the format used in the signing procedure.
    ///
    /// Pure and infallible; `honey` and the signature are excluded. The
    /// settlement contract rebuilds this byte string when cashing, so the
    /// layout must not change.
    pub fn encode_for_signature(&self) -> [u8; ENCODED_CHEQUE_SIZE] {
        let mut encoded = [0u8; ENCODED_CHEQUE_SIZE];
        encoded[..20].copy_from_slice(self.contract.as_slice());
        encoded[20..40].copy_from_slice(self.beneficiary.as_slice());
        // u64s occupy the low 8 bytes of their 32-byte big-endian slots
        encoded[64..72].copy_from_slice(&self.serial.to_be_bytes());
        encoded[96..104].copy_from_slice(&self.amount.to_be_bytes());
        encoded[128..136].copy_from_slice(&self.timeout.to_be_bytes());
        encoded
    }

    /// Hash the cheque with the prefix that `eth_sign` would add.
    ///
    /// Keccak-256 of the canonical encoding, wrapped in the EIP-191
    /// personal-message prefix and hashed again. The double hashing binds
    /// the signature to the signed-message convention so it can never be
    /// replayed as a transaction hash.
    pub fn sig_hash(&self) -> B256 {
        let digest = keccak256(self.encode_for_signature());
        eip191_hash_message(digest)
    }

    /// Sign the cheque with the supplied signer.
    ///
    /// The wire signature is 65 bytes with the recovery id offset by 27, as
    /// the settlement contract's ECDSA verifier only accepts 27 or 28.
    pub fn sign<S: SignerSync>(&self, signer: &S) -> Result<SignedCheque, ChequeError> {
        let sig = signer
            .sign_hash_sync(&self.sig_hash())
            .map_err(|e| ChequeError::Signing(e.to_string()))?;

        // `Signature::as_bytes` already writes the recovery byte as 27/28
        Ok(SignedCheque {
            cheque: self.clone(),
            signature: Bytes::copy_from_slice(&sig.as_bytes()),
        })
    }
}

/// A signed cheque ready for transmission or cashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedCheque {
    /// The unsigned cheque data.
    #[serde(flatten)]
    pub cheque: Cheque,
    /// ECDSA signature (65 bytes: r[32] + s[32] + v[1], v in {27, 28}).
    pub signature: Bytes,
}

impl SignedCheque {
    /// Create a signed cheque from raw parts, without verifying anything.
    pub fn new(cheque: Cheque, signature: Bytes) -> Self {
        Self { cheque, signature }
    }

    /// Parse the wire signature, reducing the recovery byte from the 27/28
    /// wire convention to the raw 0/1 parity.
    fn parse_signature(&self) -> Result<Signature, ChequeError> {
        if self.signature.is_empty() {
            return Err(ChequeError::MissingSignature);
        }

        if self.signature.len() != SIGNATURE_SIZE {
            return Err(ChequeError::MalformedSignature {
                expected: SIGNATURE_SIZE,
                actual: self.signature.len(),
            });
        }

        match self.signature.last() {
            Some(&v) if v == 27 || v == 28 => {}
            Some(&v) => return Err(ChequeError::InvalidRecoveryId { actual: v }),
            None => return Err(ChequeError::MissingSignature),
        }

        Signature::try_from(self.signature.as_ref())
            .map_err(|e| ChequeError::Recovery(e.to_string()))
    }

    /// Recover the signer address from the signature.
    pub fn recover_signer(&self) -> Result<Address, ChequeError> {
        let sig = self.parse_signature()?;
        let hash = self.cheque.sig_hash();

        sig.recover_address_from_prehash(&hash)
            .map_err(|e| ChequeError::Recovery(e.to_string()))
    }

    /// Verify that this cheque was signed by `expected_signer`.
    ///
    /// The caller-owned signature bytes are never modified.
    pub fn verify_signature(&self, expected_signer: Address) -> Result<(), ChequeError> {
        let recovered = self.recover_signer()?;
        if recovered != expected_signer {
            return Err(ChequeError::InvalidSignature {
                expected: expected_signer,
                recovered,
            });
        }
        Ok(())
    }

    /// Serialize to JSON bytes for protocol transmission.
    pub fn to_json(&self) -> Result<Bytes, ChequeError> {
        serde_json::to_vec(self)
            .map(Bytes::from)
            .map_err(|e| ChequeError::Serialization(e.to_string()))
    }

    /// Deserialize from JSON bytes.
    pub fn from_json(data: &[u8]) -> Result<Self, ChequeError> {
        serde_json::from_slice(data).map_err(|e| ChequeError::Serialization(e.to_string()))
    }
}
