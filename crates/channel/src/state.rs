//! Per-channel accepted-cheque state.

use apiary_cheque::SignedCheque;
use parking_lot::Mutex;

use crate::{ChannelContext, ChannelError, validate};

/// The per-channel cell holding the last accepted cheque.
///
/// All verification for a channel runs under this cell's lock, so a cheque
/// can only ever be accepted against the predecessor that is actually
/// current. A failed verification leaves the cell untouched and the
/// previously accepted cheque stays authoritative.
///
/// Durably persisting the accepted cheque (before crediting the returned
/// increment) is the caller's responsibility; [`ChannelState::restore`]
/// resumes from such a persisted cheque after a restart.
#[derive(Debug)]
pub struct ChannelState {
    context: ChannelContext,
    last: Mutex<Option<SignedCheque>>,
}

impl ChannelState {
    /// Create the state for a fresh channel with no accepted cheque yet.
    pub fn new(context: ChannelContext) -> Self {
        Self {
            context,
            last: Mutex::new(None),
        }
    }

    /// Resume a channel from a persisted last-accepted cheque.
    pub fn restore(context: ChannelContext, last: Option<SignedCheque>) -> Self {
        Self {
            context,
            last: Mutex::new(last),
        }
    }

    /// The trust anchors this channel validates against.
    pub fn context(&self) -> &ChannelContext {
        &self.context
    }

    /// The last accepted cheque, if any.
    pub fn last_cheque(&self) -> Option<SignedCheque> {
        self.last.lock().clone()
    }

    /// Verify an incoming cheque and, if it passes every check, adopt it as
    /// the channel's last accepted cheque.
    ///
    /// Returns the increment actually conveyed, for the caller to credit.
    /// On any error the previously accepted cheque remains in place.
    pub fn receive(
        &self,
        cheque: SignedCheque,
        expected_amount: u64,
    ) -> Result<u64, ChannelError> {
        let mut last = self.last.lock();

        validate::verify_cheque_properties(&cheque, &self.context).inspect_err(|err| {
            tracing::debug!(
                serial = cheque.cheque.serial,
                %err,
                "rejected cheque",
            );
        })?;

        let amount = validate::verify_cheque_against_last(&cheque, last.as_ref(), expected_amount)
            .inspect_err(|err| {
                tracing::debug!(
                    serial = cheque.cheque.serial,
                    %err,
                    "rejected cheque",
                );
            })?;

        tracing::debug!(
            serial = cheque.cheque.serial,
            cumulative = cheque.cheque.amount,
            received = amount,
            "accepted cheque",
        );
        *last = Some(cheque);

        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;
    use alloy_signer_local::PrivateKeySigner;
    use apiary_cheque::Cheque;

    fn contract() -> Address {
        Address::repeat_byte(0xc0)
    }

    fn beneficiary() -> Address {
        Address::repeat_byte(0xbe)
    }

    fn signed(signer: &PrivateKeySigner, serial: u64, amount: u64) -> SignedCheque {
        Cheque::new(contract(), beneficiary(), serial, amount, 0)
            .sign(signer)
            .unwrap()
    }

    fn state(signer: &PrivateKeySigner) -> ChannelState {
        ChannelState::new(ChannelContext::new(
            contract(),
            signer.address(),
            beneficiary(),
        ))
    }

    #[test]
    fn accepts_first_and_successor() {
        let signer = PrivateKeySigner::random();
        let state = state(&signer);

        assert_eq!(state.receive(signed(&signer, 1, 100), 100).unwrap(), 100);
        assert_eq!(state.receive(signed(&signer, 2, 150), 50).unwrap(), 50);

        let last = state.last_cheque().unwrap();
        assert_eq!(last.cheque.serial, 2);
        assert_eq!(last.cheque.amount, 150);
    }

    #[test]
    fn replay_is_rejected_and_state_kept() {
        let signer = PrivateKeySigner::random();
        let state = state(&signer);

        let cheque = signed(&signer, 1, 100);
        state.receive(cheque.clone(), 100).unwrap();

        assert!(matches!(
            state.receive(cheque, 100),
            Err(ChannelError::SerialNotIncreasing { .. })
        ));
        assert_eq!(state.last_cheque().unwrap().cheque.serial, 1);
    }

    #[test]
    fn failed_properties_leave_state_unchanged() {
        let signer = PrivateKeySigner::random();
        let state = state(&signer);
        state.receive(signed(&signer, 1, 100), 100).unwrap();

        let stranger = PrivateKeySigner::random();
        let forged = signed(&stranger, 2, 150);

        assert!(state.receive(forged, 50).is_err());
        assert_eq!(state.last_cheque().unwrap().cheque.serial, 1);
    }

    #[test]
    fn restore_resumes_progression_checks() {
        let signer = PrivateKeySigner::random();
        let persisted = signed(&signer, 5, 500);
        let state = ChannelState::restore(
            ChannelContext::new(contract(), signer.address(), beneficiary()),
            Some(persisted),
        );

        // an older cheque replayed after restart must not be re-accepted
        assert!(matches!(
            state.receive(signed(&signer, 4, 400), 400),
            Err(ChannelError::SerialNotIncreasing { last: 5, actual: 4 })
        ));

        assert_eq!(state.receive(signed(&signer, 6, 600), 100).unwrap(), 100);
    }
}
