//! Cheque validation against channel expectations.

use apiary_cheque::SignedCheque;

use crate::{ChannelContext, ChannelError};

/// Verify the signature and the fields of a cheque against the channel's
/// trust anchors.
///
/// Checks only properties knowable from the cheque in isolation; progression
/// against the previously accepted cheque is
/// [`verify_cheque_against_last`]'s job.
pub fn verify_cheque_properties(
    cheque: &SignedCheque,
    channel: &ChannelContext,
) -> Result<(), ChannelError> {
    if cheque.cheque.contract != channel.contract {
        return Err(ChannelError::WrongContract {
            expected: channel.contract,
            actual: cheque.cheque.contract,
        });
    }

    // the signer is always the debtor's settlement identity
    cheque.verify_signature(channel.issuer)?;

    if cheque.cheque.beneficiary != channel.beneficiary {
        return Err(ChannelError::WrongBeneficiary {
            expected: channel.beneficiary,
            actual: cheque.cheque.beneficiary,
        });
    }

    if cheque.cheque.timeout != 0 {
        return Err(ChannelError::NonZeroTimeout {
            actual: cheque.cheque.timeout,
        });
    }

    Ok(())
}

/// Verify that `cheque` is a legitimate successor to `last` and conveys the
/// increment accounting expects.
///
/// Serial and cumulative amount must both strictly increase. Returns the
/// amount actually conveyed: the cumulative total for a first cheque, the
/// difference from `last` otherwise.
pub fn verify_cheque_against_last(
    cheque: &SignedCheque,
    last: Option<&SignedCheque>,
    expected_amount: u64,
) -> Result<u64, ChannelError> {
    let mut actual_amount = cheque.cheque.amount;

    if let Some(last) = last {
        if cheque.cheque.serial <= last.cheque.serial {
            return Err(ChannelError::SerialNotIncreasing {
                last: last.cheque.serial,
                actual: cheque.cheque.serial,
            });
        }

        if cheque.cheque.amount <= last.cheque.amount {
            return Err(ChannelError::AmountNotIncreasing {
                last: last.cheque.amount,
                actual: cheque.cheque.amount,
            });
        }

        actual_amount -= last.cheque.amount;
    }

    if actual_amount != expected_amount {
        return Err(ChannelError::UnexpectedAmount {
            expected: expected_amount,
            actual: actual_amount,
        });
    }

    Ok(actual_amount)
}
