use crate::amount::Amount;
use crate::id::AccountId;
use serde::{Deserialize, Serialize};

/// A named permission a caller may hold.
///
/// Every privileged ledger operation names the capability it requires and
/// consults the `CapabilityChecker` before proceeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Create new tokens
    Mint,
    /// Destroy tokens held by another account (spending an allowance)
    Burn,
    /// Update asset metadata, valuation, collaborators, and redemption settings
    Configure,
    /// Toggle compliance flags and edit whitelist/blacklist/limit entries
    Compliance,
    /// Rotate the custodian attestation
    Custody,
    /// Execute pending redemption requests
    Redeem,
    /// Pause and unpause the ledger
    Pause,
}

/// Answers "does this caller hold capability X" for privileged operations
///
/// Role assignment and bootstrapping live outside the ledger; the engine
/// only ever asks this question.
pub trait CapabilityChecker {
    /// Check whether `caller` holds `capability`
    ///
    /// # Parameters
    /// * `caller` - The account invoking a privileged operation
    /// * `capability` - The capability that operation requires
    ///
    /// # Returns
    /// True if the caller may proceed
    fn has_capability(&self, caller: &AccountId, capability: Capability) -> bool;
}

/// Identity-verification provider consulted when KYC is required
pub trait KycProvider {
    /// Check whether `account` has passed identity verification
    ///
    /// # Parameters
    /// * `account` - The account to check
    ///
    /// # Returns
    /// True if the account is verified
    fn is_verified(&self, account: &AccountId) -> bool;
}

/// External price source for the tokenized asset.
///
/// The resolver tolerates any failure here; only the explicit
/// oracle-update operation requires success.
pub trait PriceOracle {
    /// Fetch the latest asset price as a fixed-point amount
    ///
    /// # Returns
    /// The current price, or an error if the source is unavailable
    fn latest_price(&self) -> anyhow::Result<Amount>;
}

/// External asset used to pay out redemption proceeds
pub trait PayoutAsset {
    /// Transfer `amount` of the payout asset to `to`
    ///
    /// # Parameters
    /// * `to` - The account receiving the proceeds
    /// * `amount` - The fixed-point amount to transfer
    ///
    /// # Returns
    /// Ok(()) if the transfer settled, Err otherwise
    fn transfer(&self, to: &AccountId, amount: Amount) -> anyhow::Result<()>;
}
