use crate::amount::Amount;
use crate::id::AccountId;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Which compliance flag a `ComplianceFlagSet` event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceFlag {
    Whitelist,
    TransferRestrictions,
    KycRequired,
    TransferLimits,
}

/// Observable record of a state change on the ledger.
///
/// Every mutating operation appends exactly the events describing what it
/// did; read-only queries never emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// Tokens created for an account
    Minted { to: AccountId, amount: Amount },

    /// Tokens destroyed from an account
    Burned { from: AccountId, amount: Amount },

    /// Tokens moved between accounts
    Transferred {
        from: AccountId,
        to: AccountId,
        amount: Amount,
    },

    /// A spender allowance was set
    Approved {
        owner: AccountId,
        spender: AccountId,
        amount: Amount,
    },

    /// The stored valuation changed
    ValuationUpdated { previous: Amount, current: Amount },

    /// The asset description changed
    DescriptionUpdated,

    /// The asset was switched active/inactive
    AssetActiveSet { active: bool },

    /// The custodian was rotated
    CustodianChanged {
        previous: AccountId,
        current: AccountId,
    },

    /// The documentation hash was registered or replaced
    DocumentHashSet { hash: [u8; 32] },

    /// The ledger pause state changed
    PausedSet { paused: bool },

    /// A compliance flag was toggled
    ComplianceFlagSet { flag: ComplianceFlag, enabled: bool },

    /// An account entered or left the whitelist
    WhitelistUpdated { account: AccountId, added: bool },

    /// An account entered or left the blacklist
    BlacklistUpdated { account: AccountId, added: bool },

    /// A per-account transfer limit was configured (0 clears it)
    TransferLimitSet { account: AccountId, limit: Amount },

    /// Redemption was enabled or disabled
    RedemptionEnabledSet { enabled: bool },

    /// The redemption fee changed
    RedemptionFeeSet { bps: u16 },

    /// A holder committed tokens for redemption. The expected payout is
    /// informational only: it is recomputed at execution time and can go
    /// stale in between.
    RedemptionRequested {
        account: AccountId,
        amount: Amount,
        expected_payout: Amount,
    },

    /// A pending redemption was executed (possibly partially)
    RedemptionExecuted {
        account: AccountId,
        amount: Amount,
        payout: Amount,
        fee: Amount,
        net: Amount,
    },
}

/// A ledger event together with when it was recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Milliseconds since the Unix epoch, UTC
    pub timestamp_ms: i64,

    /// What happened
    pub event: LedgerEvent,
}

impl EventRecord {
    /// Stamp an event with the current time
    pub fn now(event: LedgerEvent) -> Self {
        Self {
            timestamp_ms: Utc::now().timestamp_millis(),
            event,
        }
    }
}
