//! Channel trust anchors.

use alloy_primitives::Address;

/// The fixed expectations against which every cheque for one channel is
/// checked.
///
/// Supplied by the peer registry when the channel is established and
/// read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelContext {
    /// Settlement contract governing this channel.
    pub contract: Address,
    /// The counterparty's signing identity. Cheques are always signed by
    /// the debtor, so this is who every incoming signature must recover to.
    pub issuer: Address,
    /// Our receiving identity; every incoming cheque must be payable here.
    pub beneficiary: Address,
}

impl ChannelContext {
    /// Create the context for one channel.
    pub fn new(contract: Address, issuer: Address, beneficiary: Address) -> Self {
        Self {
            contract,
            issuer,
            beneficiary,
        }
    }
}
