//! Issuing side of a channel.

use alloy_primitives::Address;
use alloy_signer::SignerSync;
use apiary_cheque::{Cheque, SignedCheque};

use crate::ChannelError;

/// Issues the outgoing cheques for one channel.
///
/// Tracks the last cheque issued so each successor carries the next serial
/// and the new cumulative total. When to issue and for how much is the
/// accounting policy's decision; the chequebook only turns an increment into
/// a correctly numbered, signed cheque.
#[derive(Debug)]
pub struct Chequebook<S> {
    /// Settlement contract of the channel.
    contract: Address,
    /// The counterparty's receiving identity.
    beneficiary: Address,
    signer: S,
    last: Option<SignedCheque>,
}

impl<S: SignerSync> Chequebook<S> {
    /// Create a chequebook for a fresh channel.
    pub fn new(
        contract: Address,
        beneficiary: Address,
        signer: S,
    ) -> Self {
        Self {
            contract,
            beneficiary,
            signer,
            last: None,
        }
    }

    /// Resume issuing from a persisted last-issued cheque.
    pub fn restore(
        contract: Address,
        beneficiary: Address,
        signer: S,
        last: Option<SignedCheque>,
    ) -> Self {
        Self {
            contract,
            beneficiary,
            signer,
            last,
        }
    }

    /// The last cheque issued, if any.
    pub fn last_cheque(&self) -> Option<&SignedCheque> {
        self.last.as_ref()
    }

    /// Issue and sign the next cheque, conveying `increment` on top of the
    /// cumulative total issued so far.
    ///
    /// `honey` is the accounting-unit equivalent of the increment, carried
    /// on the cheque for bookkeeping only.
    pub fn issue(&mut self, increment: u64, honey: u64) -> Result<SignedCheque, ChannelError> {
        let (serial, amount) = match &self.last {
            Some(last) => (
                last.cheque.serial + 1,
                last.cheque
                    .amount
                    .checked_add(increment)
                    .ok_or(ChannelError::AmountOverflow)?,
            ),
            None => (1, increment),
        };

        let cheque = Cheque::new(self.contract, self.beneficiary, serial, amount, honey);
        let signed = cheque.sign(&self.signer)?;

        tracing::debug!(serial, cumulative = amount, increment, "issued cheque");
        self.last = Some(signed.clone());

        Ok(signed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChannelContext, ChannelState};
    use alloy_signer_local::PrivateKeySigner;

    fn contract() -> Address {
        Address::repeat_byte(0xc0)
    }

    fn beneficiary() -> Address {
        Address::repeat_byte(0xbe)
    }

    #[test]
    fn serials_and_amounts_accumulate() {
        let signer = PrivateKeySigner::random();
        let mut book = Chequebook::new(contract(), beneficiary(), signer);

        let first = book.issue(100, 10).unwrap();
        assert_eq!(first.cheque.serial, 1);
        assert_eq!(first.cheque.amount, 100);
        assert_eq!(first.cheque.timeout, 0);

        let second = book.issue(50, 5).unwrap();
        assert_eq!(second.cheque.serial, 2);
        assert_eq!(second.cheque.amount, 150);
        assert_eq!(second.cheque.honey, 5);
    }

    #[test]
    fn issued_cheques_verify_against_issuer() {
        let signer = PrivateKeySigner::random();
        let issuer = signer.address();
        let mut book = Chequebook::new(contract(), beneficiary(), signer);

        let signed = book.issue(100, 10).unwrap();
        signed.verify_signature(issuer).unwrap();
    }

    #[test]
    fn issued_cheques_are_accepted_by_receiving_state() {
        let signer = PrivateKeySigner::random();
        let issuer = signer.address();
        let mut book = Chequebook::new(contract(), beneficiary(), signer);
        let state = ChannelState::new(ChannelContext::new(contract(), issuer, beneficiary()));

        assert_eq!(state.receive(book.issue(100, 10).unwrap(), 100).unwrap(), 100);
        assert_eq!(state.receive(book.issue(50, 5).unwrap(), 50).unwrap(), 50);
    }

    #[test]
    fn cumulative_overflow_is_rejected() {
        let signer = PrivateKeySigner::random();
        let mut book = Chequebook::new(contract(), beneficiary(), signer);

        book.issue(u64::MAX, 0).unwrap();
        assert!(matches!(
            book.issue(1, 0),
            Err(ChannelError::AmountOverflow)
        ));
        // the failed issue must not consume a serial
        assert_eq!(book.last_cheque().unwrap().cheque.serial, 1);
    }

    #[test]
    fn restore_continues_serials() {
        let signer = PrivateKeySigner::random();
        let mut book = Chequebook::new(contract(), beneficiary(), signer.clone());
        let persisted = book.issue(100, 0).unwrap();

        let mut resumed = Chequebook::restore(contract(), beneficiary(), signer, Some(persisted));
        let next = resumed.issue(25, 0).unwrap();
        assert_eq!(next.cheque.serial, 2);
        assert_eq!(next.cheque.amount, 125);
    }
}
