//! Per-channel cheque handling for SWAP settlement.
//!
//! A channel is the pairing of two peers plus a settlement contract. The
//! debtor side issues signed, cumulative cheques; the creditor side verifies
//! each one against the channel's trust anchors and against the last cheque
//! it accepted, and only then credits the increment.
//!
//! # Receiving
//!
//! - [`verify_cheque_properties`] checks everything knowable from a single
//!   cheque: contract, signer, beneficiary, timeout.
//! - [`verify_cheque_against_last`] enforces strict serial/amount
//!   progression and computes the increment actually conveyed.
//! - [`ChannelState`] is the per-channel accepted-cheque cell. It runs both
//!   checks under its lock so two concurrently received cheques can never
//!   both be accepted against the same stale predecessor.
//!
//! # Issuing
//!
//! [`Chequebook`] is the mirror image for the paying side: it tracks the
//! last issued cheque and signs successors with the next serial and the new
//! cumulative total.
//!
//! How much a cheque should be for, and when to issue one, is accounting
//! policy and lives outside this crate; callers pass the expected increment
//! in and receive the actual increment back.

pub mod chequebook;
pub mod context;
pub mod state;
pub mod validate;

pub use chequebook::Chequebook;
pub use context::ChannelContext;
pub use state::ChannelState;
pub use validate::{verify_cheque_against_last, verify_cheque_properties};

// Re-export the cheque types this crate validates
pub use apiary_cheque::{Cheque, ChequeError, SignedCheque};

use alloy_primitives::Address;

/// Errors that can occur while validating or issuing cheques for a channel.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChannelError {
    /// Cheque names a different settlement contract than this channel uses.
    #[error("wrong cheque contract: expected {expected}, got {actual}")]
    WrongContract { expected: Address, actual: Address },

    /// Cheque is payable to someone other than this channel's beneficiary.
    #[error("wrong cheque beneficiary: expected {expected}, got {actual}")]
    WrongBeneficiary { expected: Address, actual: Address },

    /// Timeout must be zero in the current protocol version.
    #[error("wrong cheque timeout: expected 0, got {actual}")]
    NonZeroTimeout { actual: u64 },

    /// Serial does not exceed the last accepted cheque's serial.
    #[error("cheque serial not increasing: expected larger than {last}, got {actual}")]
    SerialNotIncreasing { last: u64, actual: u64 },

    /// Cumulative amount does not exceed the last accepted cheque's amount.
    #[error("cheque amount not increasing: expected larger than {last}, got {actual}")]
    AmountNotIncreasing { last: u64, actual: u64 },

    /// Increment conveyed by the cheque differs from what accounting expects.
    #[error("unexpected cheque amount: expected {expected}, got {actual}")]
    UnexpectedAmount { expected: u64, actual: u64 },

    /// Issuing the next cheque would overflow the cumulative amount.
    #[error("cumulative cheque amount overflow")]
    AmountOverflow,

    /// Signature verification or signing failed.
    #[error(transparent)]
    Cheque(#[from] ChequeError),
}
