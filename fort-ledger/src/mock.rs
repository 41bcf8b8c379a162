use anyhow::anyhow;
use fort_core::amount::Amount;
use fort_core::collaborators::{
    Capability, CapabilityChecker, KycProvider, PayoutAsset, PriceOracle,
};
use fort_core::id::AccountId;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Mock implementation of the CapabilityChecker trait for testing purposes
pub struct MockCapabilityChecker {
    allow_all: bool,
    grants: Mutex<HashSet<(AccountId, Capability)>>,
}

impl MockCapabilityChecker {
    /// A checker that denies everything until grants are added
    pub fn new() -> Self {
        Self {
            allow_all: false,
            grants: Mutex::new(HashSet::new()),
        }
    }

    /// A checker that lets any caller do anything
    pub fn allow_all() -> Self {
        Self {
            allow_all: true,
            grants: Mutex::new(HashSet::new()),
        }
    }

    /// Grant a capability to an account
    pub fn grant(&self, account: AccountId, capability: Capability) {
        self.grants
            .lock()
            .expect("capability lock poisoned")
            .insert((account, capability));
    }

    /// Revoke a previously granted capability
    pub fn revoke(&self, account: &AccountId, capability: Capability) {
        self.grants
            .lock()
            .expect("capability lock poisoned")
            .remove(&(*account, capability));
    }
}

impl Default for MockCapabilityChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityChecker for MockCapabilityChecker {
    fn has_capability(&self, caller: &AccountId, capability: Capability) -> bool {
        self.allow_all
            || self
                .grants
                .lock()
                .expect("capability lock poisoned")
                .contains(&(*caller, capability))
    }
}

/// Mock KYC provider backed by a set of verified accounts
pub struct MockKycProvider {
    verified: Mutex<HashSet<AccountId>>,
}

impl MockKycProvider {
    pub fn new() -> Self {
        Self {
            verified: Mutex::new(HashSet::new()),
        }
    }

    /// Mark an account as verified
    pub fn verify(&self, account: AccountId) {
        self.verified
            .lock()
            .expect("kyc lock poisoned")
            .insert(account);
    }

    /// Remove an account's verification
    pub fn revoke(&self, account: &AccountId) {
        self.verified
            .lock()
            .expect("kyc lock poisoned")
            .remove(account);
    }
}

impl Default for MockKycProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl KycProvider for MockKycProvider {
    fn is_verified(&self, account: &AccountId) -> bool {
        self.verified
            .lock()
            .expect("kyc lock poisoned")
            .contains(account)
    }
}

/// Mock price oracle with a settable price and failure mode
pub struct MockOracle {
    state: Mutex<Result<Amount, String>>,
}

impl MockOracle {
    /// An oracle that reports `price` until told otherwise
    pub fn new(price: Amount) -> Self {
        Self {
            state: Mutex::new(Ok(price)),
        }
    }

    /// Change the reported price
    pub fn set_price(&self, price: Amount) {
        *self.state.lock().expect("oracle lock poisoned") = Ok(price);
    }

    /// Make every read fail with `message`
    pub fn fail_with(&self, message: &str) {
        *self.state.lock().expect("oracle lock poisoned") = Err(message.to_string());
    }
}

impl PriceOracle for MockOracle {
    fn latest_price(&self) -> anyhow::Result<Amount> {
        self.state
            .lock()
            .expect("oracle lock poisoned")
            .clone()
            .map_err(|message| anyhow!(message))
    }
}

/// Mock payout asset that records transfers and can be made to fail
pub struct MockPayoutAsset {
    balances: Mutex<HashMap<AccountId, Amount>>,
    failing: Mutex<bool>,
}

impl MockPayoutAsset {
    pub fn new() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
            failing: Mutex::new(false),
        }
    }

    /// Total payout value transferred to `account` so far
    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances
            .lock()
            .expect("payout lock poisoned")
            .get(account)
            .copied()
            .unwrap_or(0)
    }

    /// Switch the failure mode on or off
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().expect("payout lock poisoned") = failing;
    }
}

impl Default for MockPayoutAsset {
    fn default() -> Self {
        Self::new()
    }
}

impl PayoutAsset for MockPayoutAsset {
    fn transfer(&self, to: &AccountId, amount: Amount) -> anyhow::Result<()> {
        if *self.failing.lock().expect("payout lock poisoned") {
            return Err(anyhow!("payout transfer refused"));
        }
        *self
            .balances
            .lock()
            .expect("payout lock poisoned")
            .entry(*to)
            .or_insert(0) += amount;
        Ok(())
    }
}
