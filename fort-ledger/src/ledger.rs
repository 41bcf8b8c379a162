use fort_core::amount::{valuation_in_range, Amount};
use fort_core::asset::AssetRecord;
use fort_core::collaborators::{
    Capability, CapabilityChecker, KycProvider, PayoutAsset, PriceOracle,
};
use fort_core::compliance::{check_mint, check_transfer, ComplianceConfig, GateContext};
use fort_core::error::LedgerError;
use fort_core::event::{ComplianceFlag, EventRecord, LedgerEvent};
use fort_core::id::AccountId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::redemption::RedemptionState;

/// A single fractional-ownership ledger instance.
///
/// The ledger owns all state for one tokenized asset: balances, the asset
/// record, compliance configuration, and redemption bookkeeping. Every
/// balance-changing operation runs the compliance gate before mutating, and
/// every mutation appends to the event journal. Mutating operations take
/// `&mut self`, which gives each public operation the atomic, isolated
/// execution the design assumes.
pub struct Ledger {
    pub(crate) asset: AssetRecord,
    pub(crate) paused: bool,
    pub(crate) balances: HashMap<AccountId, Amount>,
    pub(crate) total_supply: Amount,
    pub(crate) allowances: HashMap<(AccountId, AccountId), Amount>,
    pub(crate) compliance: ComplianceConfig,
    pub(crate) redemption: RedemptionState,

    pub(crate) capabilities: Arc<dyn CapabilityChecker>,
    pub(crate) kyc: Option<Arc<dyn KycProvider>>,
    pub(crate) oracle: Option<Arc<dyn PriceOracle>>,
    pub(crate) payout: Option<Arc<dyn PayoutAsset>>,

    pub(crate) events: Vec<EventRecord>,
}

impl Ledger {
    /// Create a new ledger for `asset` with no supply and permissive
    /// compliance defaults (all enforcement flags off).
    ///
    /// Fails if the initial valuation is outside the valid range or the
    /// custodian is the zero sentinel.
    pub fn new(
        asset: AssetRecord,
        capabilities: Arc<dyn CapabilityChecker>,
    ) -> Result<Self, LedgerError> {
        if !valuation_in_range(asset.valuation) {
            return Err(LedgerError::InvalidValuation {
                value: asset.valuation,
            });
        }
        if asset.custodian.is_zero() {
            return Err(LedgerError::ZeroAccount("custodian"));
        }

        Ok(Self {
            asset,
            paused: false,
            balances: HashMap::new(),
            total_supply: 0,
            allowances: HashMap::new(),
            compliance: ComplianceConfig::default(),
            redemption: RedemptionState::default(),
            capabilities,
            kyc: None,
            oracle: None,
            payout: None,
            events: Vec::new(),
        })
    }

    /// Attach an identity-verification provider at construction time
    pub fn with_kyc_provider(mut self, kyc: Arc<dyn KycProvider>) -> Self {
        self.kyc = Some(kyc);
        self
    }

    /// Attach a price oracle at construction time
    pub fn with_price_oracle(mut self, oracle: Arc<dyn PriceOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Attach a redemption payout asset at construction time
    pub fn with_payout_asset(mut self, payout: Arc<dyn PayoutAsset>) -> Self {
        self.payout = Some(payout);
        self
    }

    // ---- Internal helpers ----

    /// Fail with Unauthorized unless `caller` holds `capability`
    pub(crate) fn require(
        &self,
        caller: &AccountId,
        capability: Capability,
    ) -> Result<(), LedgerError> {
        if self.capabilities.has_capability(caller, capability) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized(capability))
        }
    }

    /// Gate context reflecting the ledger's current operational state
    pub(crate) fn gate_context(&self) -> GateContext<'_> {
        GateContext {
            asset_active: self.asset.is_active,
            paused: self.paused,
            kyc: self.kyc.as_deref(),
        }
    }

    /// Append a timestamped event to the journal
    pub(crate) fn record(&mut self, event: LedgerEvent) {
        self.events.push(EventRecord::now(event));
    }

    /// Add to an account's balance
    pub(crate) fn credit(&mut self, account: &AccountId, amount: Amount) {
        *self.balances.entry(*account).or_insert(0) += amount;
    }

    /// Subtract from an account's balance, pruning emptied entries.
    ///
    /// The caller must have checked the balance already.
    pub(crate) fn debit(&mut self, account: &AccountId, amount: Amount) {
        if let Some(balance) = self.balances.get_mut(account) {
            *balance -= amount;
            if *balance == 0 {
                self.balances.remove(account);
            }
        }
    }

    /// Fail unless `account` holds at least `amount`
    pub(crate) fn check_balance(
        &self,
        account: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let balance = self.balance_of(account);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance {
                account: *account,
                balance,
                amount,
            });
        }
        Ok(())
    }

    /// Fail unless the asset is active and the ledger is unpaused.
    ///
    /// Used by paths that bypass the per-account compliance rules but are
    /// still mutating operations (burn, redemption execution).
    pub(crate) fn check_operational(&self) -> Result<(), LedgerError> {
        // Reuse the gate's first two rules so the failure kinds match the
        // enforcing path exactly
        check_transfer(
            &AccountId::ZERO,
            &AccountId::ZERO,
            0,
            &ComplianceConfig::default(),
            &self.gate_context(),
        )
        .map_err(LedgerError::from)
    }

    // ---- Supply mutation ----

    /// Create `amount` new tokens for `to`.
    ///
    /// Privileged (`Capability::Mint`). Gated by the asset-active, paused,
    /// and recipient-KYC rules; whitelist and blacklist membership do not
    /// apply to minting.
    pub fn mint(
        &mut self,
        caller: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.require(caller, Capability::Mint)?;
        if to.is_zero() {
            return Err(LedgerError::ZeroAccount("mint recipient"));
        }
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        check_mint(to, &self.compliance, &self.gate_context())?;

        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.credit(to, amount);

        log::debug!("minted {} to {}", amount, to);
        self.record(LedgerEvent::Minted {
            to: *to,
            amount,
        });
        Ok(())
    }

    /// Destroy `amount` of the caller's own tokens.
    ///
    /// Burning bypasses the compliance gate by design; only the asset-active
    /// and paused checks apply.
    pub fn burn(&mut self, caller: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        if caller.is_zero() {
            return Err(LedgerError::ZeroAccount("holder"));
        }
        self.check_burn(caller, amount)?;
        self.apply_burn(caller, amount);
        Ok(())
    }

    /// Destroy `amount` of `holder`'s tokens, spending the caller's allowance.
    ///
    /// Privileged (`Capability::Burn`).
    pub fn burn_from(
        &mut self,
        caller: &AccountId,
        holder: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.require(caller, Capability::Burn)?;
        if holder.is_zero() {
            return Err(LedgerError::ZeroAccount("holder"));
        }
        // Validate the burn fully before spending the allowance so a
        // refused burn leaves the allowance untouched
        self.check_burn(holder, amount)?;
        self.spend_allowance(holder, caller, amount)?;
        self.apply_burn(holder, amount);
        Ok(())
    }

    fn check_burn(&self, holder: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        self.check_operational()?;
        self.check_balance(holder, amount)
    }

    fn apply_burn(&mut self, holder: &AccountId, amount: Amount) {
        self.debit(holder, amount);
        self.total_supply -= amount;

        log::debug!("burned {} from {}", amount, holder);
        self.record(LedgerEvent::Burned {
            from: *holder,
            amount,
        });
    }

    // ---- Transfers ----

    /// Move `amount` from the caller to `to`, subject to the full
    /// compliance gate.
    pub fn transfer(
        &mut self,
        caller: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if caller.is_zero() {
            return Err(LedgerError::ZeroAccount("sender"));
        }
        self.transfer_internal(caller, to, amount)
    }

    /// Move `amount` from `from` to `to` on the strength of an allowance
    /// previously granted to the caller.
    pub fn transfer_from(
        &mut self,
        caller: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if from.is_zero() {
            return Err(LedgerError::ZeroAccount("sender"));
        }
        // Validate the transfer fully before spending the allowance so a
        // refused transfer leaves the allowance untouched
        self.check_transfer_preconditions(from, to, amount)?;
        self.spend_allowance(from, caller, amount)?;
        self.apply_transfer(from, to, amount);
        Ok(())
    }

    fn transfer_internal(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.check_transfer_preconditions(from, to, amount)?;
        self.apply_transfer(from, to, amount);
        Ok(())
    }

    fn check_transfer_preconditions(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if to.is_zero() {
            return Err(LedgerError::ZeroAccount("recipient"));
        }
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        check_transfer(from, to, amount, &self.compliance, &self.gate_context())?;
        self.check_balance(from, amount)
    }

    fn apply_transfer(&mut self, from: &AccountId, to: &AccountId, amount: Amount) {
        self.debit(from, amount);
        self.credit(to, amount);

        log::debug!("transferred {} from {} to {}", amount, from, to);
        self.record(LedgerEvent::Transferred {
            from: *from,
            to: *to,
            amount,
        });
    }

    // ---- Allowances ----

    /// Grant `spender` the right to move up to `amount` of the caller's
    /// tokens. Setting 0 clears the allowance.
    pub fn approve(
        &mut self,
        caller: &AccountId,
        spender: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if caller.is_zero() {
            return Err(LedgerError::ZeroAccount("owner"));
        }
        if spender.is_zero() {
            return Err(LedgerError::ZeroAccount("spender"));
        }

        if amount == 0 {
            self.allowances.remove(&(*caller, *spender));
        } else {
            self.allowances.insert((*caller, *spender), amount);
        }
        self.record(LedgerEvent::Approved {
            owner: *caller,
            spender: *spender,
            amount,
        });
        Ok(())
    }

    /// Remaining allowance granted by `owner` to `spender`
    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    fn spend_allowance(
        &mut self,
        owner: &AccountId,
        spender: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let key = (*owner, *spender);
        let remaining = self.allowances.get(&key).copied().unwrap_or(0);
        if remaining < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: *owner,
                spender: *spender,
            });
        }
        if remaining == amount {
            self.allowances.remove(&key);
        } else {
            self.allowances.insert(key, remaining - amount);
        }
        Ok(())
    }

    // ---- Asset administration ----

    /// Replace the stored valuation. Privileged (`Capability::Configure`).
    pub fn update_valuation(
        &mut self,
        caller: &AccountId,
        valuation: Amount,
    ) -> Result<(), LedgerError> {
        self.require(caller, Capability::Configure)?;
        if !valuation_in_range(valuation) {
            return Err(LedgerError::InvalidValuation { value: valuation });
        }

        let previous = self.asset.valuation;
        self.asset.valuation = valuation;
        self.record(LedgerEvent::ValuationUpdated {
            previous,
            current: valuation,
        });
        Ok(())
    }

    /// Replace the asset description. Privileged (`Capability::Configure`).
    pub fn update_description(
        &mut self,
        caller: &AccountId,
        description: impl Into<String>,
    ) -> Result<(), LedgerError> {
        self.require(caller, Capability::Configure)?;
        self.asset.description = description.into();
        self.record(LedgerEvent::DescriptionUpdated);
        Ok(())
    }

    /// Activate or deactivate the asset. Privileged (`Capability::Configure`).
    ///
    /// Setting the current value again is a no-op.
    pub fn set_asset_active(
        &mut self,
        caller: &AccountId,
        active: bool,
    ) -> Result<(), LedgerError> {
        self.require(caller, Capability::Configure)?;
        if self.asset.is_active != active {
            self.asset.is_active = active;
            self.record(LedgerEvent::AssetActiveSet { active });
        }
        Ok(())
    }

    /// Rotate the custodian. Privileged (`Capability::Custody`).
    pub fn set_custodian(
        &mut self,
        caller: &AccountId,
        custodian: AccountId,
    ) -> Result<(), LedgerError> {
        self.require(caller, Capability::Custody)?;
        if custodian.is_zero() {
            return Err(LedgerError::ZeroAccount("custodian"));
        }

        let previous = self.asset.custodian;
        self.asset.custodian = custodian;
        self.record(LedgerEvent::CustodianChanged {
            previous,
            current: custodian,
        });
        Ok(())
    }

    /// Register or replace the documentation hash.
    /// Privileged (`Capability::Configure`).
    pub fn set_document_hash(
        &mut self,
        caller: &AccountId,
        hash: [u8; 32],
    ) -> Result<(), LedgerError> {
        self.require(caller, Capability::Configure)?;
        self.asset.document_hash = Some(hash);
        self.record(LedgerEvent::DocumentHashSet { hash });
        Ok(())
    }

    /// Pause or unpause the ledger. Privileged (`Capability::Pause`).
    ///
    /// Setting the current value again is a no-op.
    pub fn set_paused(&mut self, caller: &AccountId, paused: bool) -> Result<(), LedgerError> {
        self.require(caller, Capability::Pause)?;
        if self.paused != paused {
            self.paused = paused;
            self.record(LedgerEvent::PausedSet { paused });
        }
        Ok(())
    }

    // ---- Compliance administration ----

    /// Toggle whitelist enforcement. Privileged (`Capability::Compliance`).
    pub fn set_whitelist_enabled(
        &mut self,
        caller: &AccountId,
        enabled: bool,
    ) -> Result<(), LedgerError> {
        self.require(caller, Capability::Compliance)?;
        if self.compliance.whitelist_enabled != enabled {
            self.compliance.whitelist_enabled = enabled;
            self.record(LedgerEvent::ComplianceFlagSet {
                flag: ComplianceFlag::Whitelist,
                enabled,
            });
        }
        Ok(())
    }

    /// Toggle whitelist/blacklist enforcement.
    /// Privileged (`Capability::Compliance`).
    ///
    /// Membership entries persist across toggles; they are inert while the
    /// flag is off.
    pub fn set_transfer_restrictions_enabled(
        &mut self,
        caller: &AccountId,
        enabled: bool,
    ) -> Result<(), LedgerError> {
        self.require(caller, Capability::Compliance)?;
        if self.compliance.transfer_restrictions_enabled != enabled {
            self.compliance.transfer_restrictions_enabled = enabled;
            self.record(LedgerEvent::ComplianceFlagSet {
                flag: ComplianceFlag::TransferRestrictions,
                enabled,
            });
        }
        Ok(())
    }

    /// Toggle the KYC requirement. Privileged (`Capability::Compliance`).
    pub fn set_kyc_required(
        &mut self,
        caller: &AccountId,
        required: bool,
    ) -> Result<(), LedgerError> {
        self.require(caller, Capability::Compliance)?;
        if self.compliance.kyc_required != required {
            self.compliance.kyc_required = required;
            self.record(LedgerEvent::ComplianceFlagSet {
                flag: ComplianceFlag::KycRequired,
                enabled: required,
            });
        }
        Ok(())
    }

    /// Toggle per-account transfer limits.
    /// Privileged (`Capability::Compliance`).
    pub fn set_transfer_limits_enabled(
        &mut self,
        caller: &AccountId,
        enabled: bool,
    ) -> Result<(), LedgerError> {
        self.require(caller, Capability::Compliance)?;
        if self.compliance.transfer_limits_enabled != enabled {
            self.compliance.transfer_limits_enabled = enabled;
            self.record(LedgerEvent::ComplianceFlagSet {
                flag: ComplianceFlag::TransferLimits,
                enabled,
            });
        }
        Ok(())
    }

    /// Add an account to the whitelist. Privileged (`Capability::Compliance`).
    pub fn add_to_whitelist(
        &mut self,
        caller: &AccountId,
        account: AccountId,
    ) -> Result<(), LedgerError> {
        self.require(caller, Capability::Compliance)?;
        if account.is_zero() {
            return Err(LedgerError::ZeroAccount("whitelist entry"));
        }
        if self.compliance.whitelist.insert(account) {
            self.record(LedgerEvent::WhitelistUpdated {
                account,
                added: true,
            });
        }
        Ok(())
    }

    /// Remove an account from the whitelist.
    /// Privileged (`Capability::Compliance`).
    pub fn remove_from_whitelist(
        &mut self,
        caller: &AccountId,
        account: &AccountId,
    ) -> Result<(), LedgerError> {
        self.require(caller, Capability::Compliance)?;
        if self.compliance.whitelist.remove(account) {
            self.record(LedgerEvent::WhitelistUpdated {
                account: *account,
                added: false,
            });
        }
        Ok(())
    }

    /// Add an account to the blacklist. Privileged (`Capability::Compliance`).
    pub fn add_to_blacklist(
        &mut self,
        caller: &AccountId,
        account: AccountId,
    ) -> Result<(), LedgerError> {
        self.require(caller, Capability::Compliance)?;
        if account.is_zero() {
            return Err(LedgerError::ZeroAccount("blacklist entry"));
        }
        if self.compliance.blacklist.insert(account) {
            self.record(LedgerEvent::BlacklistUpdated {
                account,
                added: true,
            });
        }
        Ok(())
    }

    /// Remove an account from the blacklist.
    /// Privileged (`Capability::Compliance`).
    pub fn remove_from_blacklist(
        &mut self,
        caller: &AccountId,
        account: &AccountId,
    ) -> Result<(), LedgerError> {
        self.require(caller, Capability::Compliance)?;
        if self.compliance.blacklist.remove(account) {
            self.record(LedgerEvent::BlacklistUpdated {
                account: *account,
                added: false,
            });
        }
        Ok(())
    }

    /// Configure an account's transfer limit; 0 clears it.
    /// Privileged (`Capability::Compliance`).
    pub fn set_transfer_limit(
        &mut self,
        caller: &AccountId,
        account: AccountId,
        limit: Amount,
    ) -> Result<(), LedgerError> {
        self.require(caller, Capability::Compliance)?;
        if account.is_zero() {
            return Err(LedgerError::ZeroAccount("limited account"));
        }

        if limit == 0 {
            self.compliance.transfer_limits.remove(&account);
        } else {
            self.compliance.transfer_limits.insert(account, limit);
        }
        self.record(LedgerEvent::TransferLimitSet { account, limit });
        Ok(())
    }

    // ---- Collaborator rotation ----

    /// Replace the identity-verification provider; `None` disables the
    /// feature. Privileged (`Capability::Configure`).
    pub fn set_kyc_provider(
        &mut self,
        caller: &AccountId,
        kyc: Option<Arc<dyn KycProvider>>,
    ) -> Result<(), LedgerError> {
        self.require(caller, Capability::Configure)?;
        self.kyc = kyc;
        Ok(())
    }

    /// Replace the price oracle; `None` disables live pricing.
    /// Privileged (`Capability::Configure`).
    pub fn set_price_oracle(
        &mut self,
        caller: &AccountId,
        oracle: Option<Arc<dyn PriceOracle>>,
    ) -> Result<(), LedgerError> {
        self.require(caller, Capability::Configure)?;
        self.oracle = oracle;
        Ok(())
    }

    /// Replace the redemption payout asset; `None` disables execution.
    /// Privileged (`Capability::Configure`).
    pub fn set_payout_asset(
        &mut self,
        caller: &AccountId,
        payout: Option<Arc<dyn PayoutAsset>>,
    ) -> Result<(), LedgerError> {
        self.require(caller, Capability::Configure)?;
        self.payout = payout;
        Ok(())
    }

    // ---- Read model ----

    /// The asset record backing this ledger
    pub fn asset_info(&self) -> &AssetRecord {
        &self.asset
    }

    /// Whether the ledger is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Total number of tokens in circulation
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Balance held by `account` (0 for unknown accounts)
    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Iterate over all accounts with a non-zero balance
    pub fn holders(&self) -> impl Iterator<Item = (&AccountId, Amount)> {
        self.balances.iter().map(|(account, amount)| (account, *amount))
    }

    /// Whether a transfer of `amount` from `from` to `to` would pass the
    /// compliance gate right now.
    ///
    /// This is the read-only predicate form of the gate: it evaluates the
    /// identical rule chain the enforcing path runs and never fails.
    pub fn can_transfer(&self, from: &AccountId, to: &AccountId, amount: Amount) -> bool {
        check_transfer(from, to, amount, &self.compliance, &self.gate_context()).is_ok()
    }

    /// Amount-independent form of `can_transfer`: evaluates every rule
    /// except the transfer-limit magnitude.
    pub fn can_send(&self, from: &AccountId, to: &AccountId) -> bool {
        self.can_transfer(from, to, 0)
    }

    /// Whether `account` is on the whitelist
    pub fn is_whitelisted(&self, account: &AccountId) -> bool {
        self.compliance.whitelist.contains(account)
    }

    /// Whether `account` is on the blacklist
    pub fn is_blacklisted(&self, account: &AccountId) -> bool {
        self.compliance.blacklist.contains(account)
    }

    /// The account's configured transfer limit (0 when none)
    pub fn transfer_limit(&self, account: &AccountId) -> Amount {
        self.compliance.transfer_limit(account)
    }

    /// The current compliance configuration snapshot
    pub fn compliance_config(&self) -> &ComplianceConfig {
        &self.compliance
    }

    /// Events recorded since the last drain
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Drain and return all recorded events
    pub fn take_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.events)
    }
}
