use fort_core::amount::{bps_fee, mul_div, Amount, MAX_FEE_BPS};
use fort_core::collaborators::{Capability, PayoutAsset};
use fort_core::error::LedgerError;
use fort_core::event::LedgerEvent;
use fort_core::id::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::ledger::Ledger;

/// Redemption bookkeeping for a ledger instance.
///
/// Pending amounts accumulate across requests and are consumed only by
/// execution; there is no cancellation path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionState {
    /// Whether holders may request redemption
    pub enabled: bool,

    /// Fee charged on redemption payouts, in basis points
    pub fee_bps: u16,

    /// Tokens each account has committed to redeem but not yet had
    /// burned and paid out
    pub pending: HashMap<AccountId, Amount>,

    /// Sum of all pending amounts
    pub total_pending: Amount,
}

impl RedemptionState {
    /// Pending amount for an account (0 when none)
    pub fn pending_for(&self, account: &AccountId) -> Amount {
        self.pending.get(account).copied().unwrap_or(0)
    }
}

impl Ledger {
    /// Enable or disable redemption requests.
    /// Privileged (`Capability::Configure`).
    pub fn set_redemption_enabled(
        &mut self,
        caller: &AccountId,
        enabled: bool,
    ) -> Result<(), LedgerError> {
        self.require(caller, Capability::Configure)?;
        if self.redemption.enabled != enabled {
            self.redemption.enabled = enabled;
            self.record(LedgerEvent::RedemptionEnabledSet { enabled });
        }
        Ok(())
    }

    /// Set the redemption fee, capped at `MAX_FEE_BPS`.
    /// Privileged (`Capability::Configure`).
    pub fn set_redemption_fee_bps(
        &mut self,
        caller: &AccountId,
        bps: u16,
    ) -> Result<(), LedgerError> {
        self.require(caller, Capability::Configure)?;
        if bps > MAX_FEE_BPS {
            return Err(LedgerError::InvalidFee { bps });
        }
        if self.redemption.fee_bps != bps {
            self.redemption.fee_bps = bps;
            self.record(LedgerEvent::RedemptionFeeSet { bps });
        }
        Ok(())
    }

    /// Whether redemption requests are currently accepted
    pub fn redemption_enabled(&self) -> bool {
        self.redemption.enabled
    }

    /// The configured redemption fee in basis points
    pub fn redemption_fee_bps(&self) -> u16 {
        self.redemption.fee_bps
    }

    /// Tokens `account` has committed for redemption
    pub fn pending_redemption(&self, account: &AccountId) -> Amount {
        self.redemption.pending_for(account)
    }

    /// Sum of all pending redemption amounts
    pub fn total_pending_redemptions(&self) -> Amount {
        self.redemption.total_pending
    }

    /// Commit `amount` of the caller's tokens for redemption.
    ///
    /// Records intent only: tokens are neither moved nor reserved, and the
    /// committed amount can only ever be reduced by execution. The emitted
    /// event carries the payout expected at request time, which is
    /// recomputed at execution and may differ by then.
    pub fn request_redemption(
        &mut self,
        caller: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if caller.is_zero() {
            return Err(LedgerError::ZeroAccount("holder"));
        }
        if !self.redemption.enabled {
            return Err(LedgerError::RedemptionDisabled);
        }
        self.check_operational()?;
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        self.check_balance(caller, amount)?;

        let expected_payout = self.redemption_value(amount)?;

        *self.redemption.pending.entry(*caller).or_insert(0) += amount;
        self.redemption.total_pending += amount;

        log::debug!("redemption of {} requested by {}", amount, caller);
        self.record(LedgerEvent::RedemptionRequested {
            account: *caller,
            amount,
            expected_payout,
        });
        Ok(())
    }

    /// Execute up to the pending redemption of `account`, burning `amount`
    /// tokens and paying out their asset value net of the fee.
    ///
    /// Privileged (`Capability::Redeem`). Partial execution is allowed and
    /// leaves the remainder pending. Internal bookkeeping is fully applied
    /// before the external payout call; if that call fails, the prior
    /// state is restored and the operation reports `ExternalCall`.
    pub fn execute_redemption(
        &mut self,
        caller: &AccountId,
        account: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.require(caller, Capability::Redeem)?;
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        self.check_operational()?;
        let payout_asset = self
            .payout
            .clone()
            .ok_or(LedgerError::NotConfigured("payout asset"))?;

        let pending = self.redemption.pending_for(account);
        if pending < amount {
            return Err(LedgerError::InsufficientPending {
                account: *account,
                pending,
                amount,
            });
        }
        self.check_balance(account, amount)?;

        // Effects before the external call: a reentrant observer must see
        // the already-updated bookkeeping
        let supply_before = self.total_supply;
        if pending == amount {
            self.redemption.pending.remove(account);
        } else {
            self.redemption.pending.insert(*account, pending - amount);
        }
        self.redemption.total_pending -= amount;
        self.debit(account, amount);
        self.total_supply -= amount;

        match self.settle_redemption(account, amount, supply_before, &payout_asset) {
            Ok((payout, fee, net)) => {
                log::debug!(
                    "redeemed {} for {} (payout {}, fee {})",
                    amount,
                    account,
                    payout,
                    fee
                );
                self.record(LedgerEvent::RedemptionExecuted {
                    account: *account,
                    amount,
                    payout,
                    fee,
                    net,
                });
                Ok(())
            }
            Err(err) => {
                // The payout never settled: restore the prior bookkeeping
                // so the failed operation leaves no net mutation
                self.credit(account, amount);
                self.total_supply = supply_before;
                *self.redemption.pending.entry(*account).or_insert(0) += amount;
                self.redemption.total_pending += amount;
                Err(err)
            }
        }
    }

    /// Payout arithmetic and the external transfer, separated so the
    /// caller can compensate on failure
    fn settle_redemption(
        &self,
        account: &AccountId,
        amount: Amount,
        supply_before: Amount,
        payout_asset: &Arc<dyn PayoutAsset>,
    ) -> Result<(Amount, Amount, Amount), LedgerError> {
        let payout = mul_div(amount, self.current_valuation(), supply_before)?;
        let fee = bps_fee(payout, self.redemption.fee_bps)?;
        let net = payout - fee;

        payout_asset
            .transfer(account, net)
            .map_err(|err| LedgerError::ExternalCall(err.to_string()))?;
        Ok((payout, fee, net))
    }

    /// Asset value of `amount` tokens at the resolver's current valuation
    fn redemption_value(&self, amount: Amount) -> Result<Amount, LedgerError> {
        if self.total_supply == 0 {
            return Ok(0);
        }
        mul_div(amount, self.current_valuation(), self.total_supply)
    }
}
