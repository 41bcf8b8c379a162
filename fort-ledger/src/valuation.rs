use fort_core::amount::{mul_div, valuation_in_range, Amount, SCALE};
use fort_core::collaborators::Capability;
use fort_core::error::LedgerError;
use fort_core::event::LedgerEvent;
use fort_core::id::AccountId;

use crate::ledger::Ledger;

/// Valuation resolver: converts between token amounts and asset value.
///
/// All reads here are infallible. Division is floor division throughout,
/// and a zero total supply is a defined edge case that yields zero.
impl Ledger {
    /// The authoritative valuation for this query.
    ///
    /// Prefers a live oracle price when an oracle is configured and returns
    /// a usable value; any oracle failure or out-of-range value falls back
    /// silently to the stored valuation. The stored value is never
    /// overwritten by a read.
    pub fn current_valuation(&self) -> Amount {
        if let Some(oracle) = &self.oracle {
            match oracle.latest_price() {
                Ok(price) if valuation_in_range(price) => return price,
                Ok(price) => {
                    log::warn!(
                        "oracle price {} out of range, using stored valuation",
                        price
                    );
                }
                Err(err) => {
                    log::warn!("oracle read failed ({}), using stored valuation", err);
                }
            }
        }
        self.asset.valuation
    }

    /// Price of a single whole token, scaled by 10^18.
    ///
    /// Zero while nothing is in circulation.
    pub fn token_price(&self) -> Amount {
        if self.total_supply == 0 {
            return 0;
        }
        // Cannot overflow: valuations are range-checked on every write, so
        // valuation * SCALE fits in an Amount
        mul_div(self.current_valuation(), SCALE, self.total_supply).unwrap_or(0)
    }

    /// Fraction of the asset owned by `account`, scaled by 10^18
    /// (a full owner reads exactly `SCALE`).
    pub fn ownership_percentage(&self, account: &AccountId) -> Amount {
        if self.total_supply == 0 {
            return 0;
        }
        // Cannot overflow: balance <= total supply bounds the quotient by SCALE
        mul_div(self.balance_of(account), SCALE, self.total_supply).unwrap_or(0)
    }

    /// Asset value attributable to `account`'s holding, using the stored
    /// valuation.
    ///
    /// Unlike `token_price`, this deliberately ignores the oracle: it is a
    /// statement about the booked valuation, not the live market.
    pub fn asset_value(&self, account: &AccountId) -> Amount {
        if self.total_supply == 0 {
            return 0;
        }
        // Cannot overflow: balance <= total supply bounds the quotient by
        // the stored valuation
        mul_div(self.balance_of(account), self.asset.valuation, self.total_supply).unwrap_or(0)
    }

    /// Persist the oracle price as the stored valuation.
    ///
    /// Privileged (`Capability::Configure`). Unlike the read path, this
    /// requires the oracle to exist and respond with an in-range value.
    pub fn update_valuation_from_oracle(
        &mut self,
        caller: &AccountId,
    ) -> Result<Amount, LedgerError> {
        self.require(caller, Capability::Configure)?;

        let oracle = self
            .oracle
            .as_ref()
            .ok_or(LedgerError::NotConfigured("price oracle"))?;
        let price = oracle
            .latest_price()
            .map_err(|err| LedgerError::ExternalCall(err.to_string()))?;
        if !valuation_in_range(price) {
            return Err(LedgerError::InvalidValuation { value: price });
        }

        let previous = self.asset.valuation;
        self.asset.valuation = price;
        self.record(LedgerEvent::ValuationUpdated {
            previous,
            current: price,
        });
        Ok(price)
    }
}
