//! Cheque primitives for SWAP settlement.
//!
//! This crate provides the core types for cheque-based settlement:
//!
//! - [`Cheque`] - An unsigned cumulative payment commitment
//! - [`SignedCheque`] - A signed cheque ready for transmission or cashing
//!
//! # Signing
//!
//! A cheque is bound to its issuer by an ECDSA signature over a two-stage
//! hash of its canonical encoding:
//!
//! 1. Keccak-256 of the fixed-width field encoding (see
//!    [`Cheque::encode_for_signature`])
//! 2. Keccak-256 of that digest wrapped with the `eth_sign` personal-message
//!    prefix (`"\x19Ethereum Signed Message:\n32"`)
//!
//! The settlement contract reproduces the same construction on-chain, so the
//! encoding and hashing here are a binding wire format.
//!
//! # Signing a Cheque
//!
//! ```ignore
//! let cheque = Cheque::new(contract, beneficiary, serial, amount, honey);
//! let signed = cheque.sign(&signer)?;
//! signed.verify_signature(signer.address())?;
//! ```
//!
//! # Wire Format
//!
//! Signed cheques are serialized as JSON for transmission over the SWAP
//! protocol.

pub mod cheque;

pub use cheque::{Cheque, ENCODED_CHEQUE_SIZE, SIGNATURE_SIZE, SignedCheque};

// Re-export commonly used types
pub use alloy_primitives::Address;
pub use bytes::Bytes;

/// Errors that can occur during cheque operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChequeError {
    /// Tried to verify a cheque that carries no signature.
    #[error("cheque has no signature")]
    MissingSignature,

    /// Signature is not the expected 65 bytes.
    #[error("signature has invalid length: expected {expected}, got {actual}")]
    MalformedSignature { expected: usize, actual: usize },

    /// Recovery byte is not in the on-wire 27/28 convention.
    #[error("invalid signature recovery id: expected 27 or 28, got {actual}")]
    InvalidRecoveryId { actual: u8 },

    /// Failed to recover a signer from the signature.
    #[error("failed to recover signer: {0}")]
    Recovery(String),

    /// Cheque was signed by an unexpected address.
    #[error("invalid cheque signature: expected signer {expected}, recovered {recovered}")]
    InvalidSignature { expected: Address, recovered: Address },

    /// The signing primitive failed.
    #[error("cheque signing failed: {0}")]
    Signing(String),

    /// Cheque serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}
