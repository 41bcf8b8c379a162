use crate::amount::Amount;
use crate::collaborators::KycProvider;
use crate::id::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Snapshot of the compliance configuration the gate evaluates against.
///
/// The flags toggle enforcement independently; set membership persists
/// across toggles, so disabling `transfer_restrictions_enabled` leaves
/// blacklist entries inert rather than clearing them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceConfig {
    /// Restrict transfers to whitelisted endpoints (only effective while
    /// `transfer_restrictions_enabled` is also set)
    pub whitelist_enabled: bool,

    /// Master switch for whitelist/blacklist enforcement
    pub transfer_restrictions_enabled: bool,

    /// Require identity verification on both endpoints of a transfer
    pub kyc_required: bool,

    /// Enforce per-account transfer limits
    pub transfer_limits_enabled: bool,

    /// Accounts allowed to transact while the whitelist is enforced
    pub whitelist: HashSet<AccountId>,

    /// Accounts barred from transacting while restrictions are enforced
    pub blacklist: HashSet<AccountId>,

    /// Per-account maximum transfer amount. A limit of 0 means
    /// "no limit configured", not "limit of zero".
    pub transfer_limits: HashMap<AccountId, Amount>,
}

impl ComplianceConfig {
    /// Effective transfer limit for an account (0 when none is configured)
    pub fn transfer_limit(&self, account: &AccountId) -> Amount {
        self.transfer_limits.get(account).copied().unwrap_or(0)
    }
}

/// Ledger-level inputs the gate needs beyond the compliance configuration
pub struct GateContext<'a> {
    /// Whether the underlying asset is active
    pub asset_active: bool,

    /// Whether the ledger is paused
    pub paused: bool,

    /// Identity-verification provider, when one is configured
    pub kyc: Option<&'a dyn KycProvider>,
}

/// A compliance rule violation, carrying which rule and which side failed
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ComplianceBreach {
    /// The underlying asset has been deactivated
    #[error("asset is not active")]
    AssetInactive,

    /// The ledger is paused
    #[error("ledger is paused")]
    Paused,

    /// An endpoint failed identity verification
    #[error("account {account} has not passed KYC verification")]
    KycUnverified { account: AccountId },

    /// The sender exceeded its configured transfer limit
    #[error("transfer of {amount} exceeds the limit of {limit} for {account}")]
    LimitExceeded {
        account: AccountId,
        limit: Amount,
        amount: Amount,
    },

    /// An endpoint is blacklisted
    #[error("account {account} is blacklisted")]
    Blacklisted { account: AccountId },

    /// An endpoint is missing from the enforced whitelist
    #[error("account {account} is not whitelisted")]
    NotWhitelisted { account: AccountId },
}

/// Evaluate the ordered compliance rule chain for a transfer.
///
/// The first failing rule determines the outcome. Mint passes
/// `AccountId::ZERO` as `from` and burn passes it as `to`; the zero
/// sentinel is exempt from every per-account rule. The predicate form of
/// this gate is `check_transfer(..).is_ok()`, so the read-only and
/// enforcing paths can never disagree.
///
/// This function is pure: it never mutates and its outcome depends only on
/// its arguments.
pub fn check_transfer(
    from: &AccountId,
    to: &AccountId,
    amount: Amount,
    config: &ComplianceConfig,
    ctx: &GateContext<'_>,
) -> Result<(), ComplianceBreach> {
    if !ctx.asset_active {
        return Err(ComplianceBreach::AssetInactive);
    }
    if ctx.paused {
        return Err(ComplianceBreach::Paused);
    }

    if config.kyc_required {
        if let Some(kyc) = ctx.kyc {
            // Sender side first, so the reported failure is deterministic
            for account in [from, to] {
                if !account.is_zero() && !kyc.is_verified(account) {
                    return Err(ComplianceBreach::KycUnverified { account: *account });
                }
            }
        }
    }

    if config.transfer_limits_enabled && !from.is_zero() {
        let limit = config.transfer_limit(from);
        if limit > 0 && amount > limit {
            return Err(ComplianceBreach::LimitExceeded {
                account: *from,
                limit,
                amount,
            });
        }
    }

    if config.transfer_restrictions_enabled {
        for account in [from, to] {
            if !account.is_zero() && config.blacklist.contains(account) {
                return Err(ComplianceBreach::Blacklisted { account: *account });
            }
        }

        if config.whitelist_enabled {
            for account in [from, to] {
                if !account.is_zero() && !config.whitelist.contains(account) {
                    return Err(ComplianceBreach::NotWhitelisted { account: *account });
                }
            }
        }
    }

    Ok(())
}

/// Evaluate the reduced rule chain that gates mint operations.
///
/// Minting has no sending counter-party, so only the asset-active, paused,
/// and recipient-KYC rules apply; whitelist and blacklist membership do
/// not gate token creation.
pub fn check_mint(
    to: &AccountId,
    config: &ComplianceConfig,
    ctx: &GateContext<'_>,
) -> Result<(), ComplianceBreach> {
    if !ctx.asset_active {
        return Err(ComplianceBreach::AssetInactive);
    }
    if ctx.paused {
        return Err(ComplianceBreach::Paused);
    }

    if config.kyc_required {
        if let Some(kyc) = ctx.kyc {
            if !kyc.is_verified(to) {
                return Err(ComplianceBreach::KycUnverified { account: *to });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedKyc(HashSet<AccountId>);

    impl KycProvider for FixedKyc {
        fn is_verified(&self, account: &AccountId) -> bool {
            self.0.contains(account)
        }
    }

    fn acct(tag: u8) -> AccountId {
        AccountId::new([tag; 32])
    }

    fn open_ctx<'a>() -> GateContext<'a> {
        GateContext {
            asset_active: true,
            paused: false,
            kyc: None,
        }
    }

    #[test]
    fn test_permissive_config_allows_everything() {
        let config = ComplianceConfig::default();
        let (a, b) = (acct(1), acct(2));
        assert!(check_transfer(&a, &b, 100, &config, &open_ctx()).is_ok());
    }

    #[test]
    fn test_inactive_asset_fails_first() {
        // Blacklisted sender on an inactive ledger still reports the
        // asset state: rule one wins
        let mut config = ComplianceConfig::default();
        config.transfer_restrictions_enabled = true;
        config.blacklist.insert(acct(1));

        let ctx = GateContext {
            asset_active: false,
            paused: true,
            kyc: None,
        };
        assert_eq!(
            check_transfer(&acct(1), &acct(2), 1, &config, &ctx),
            Err(ComplianceBreach::AssetInactive)
        );
    }

    #[test]
    fn test_paused_fails_before_compliance_rules() {
        let mut config = ComplianceConfig::default();
        config.transfer_restrictions_enabled = true;
        config.blacklist.insert(acct(1));

        let ctx = GateContext {
            asset_active: true,
            paused: true,
            kyc: None,
        };
        assert_eq!(
            check_transfer(&acct(1), &acct(2), 1, &config, &ctx),
            Err(ComplianceBreach::Paused)
        );
    }

    #[test]
    fn test_kyc_checks_both_sides_sender_first() {
        let mut config = ComplianceConfig::default();
        config.kyc_required = true;

        let verified = FixedKyc(HashSet::from([acct(2)]));
        let ctx = GateContext {
            asset_active: true,
            paused: false,
            kyc: Some(&verified),
        };

        // Sender unverified
        assert_eq!(
            check_transfer(&acct(1), &acct(2), 1, &config, &ctx),
            Err(ComplianceBreach::KycUnverified { account: acct(1) })
        );
        // Recipient unverified
        assert_eq!(
            check_transfer(&acct(2), &acct(3), 1, &config, &ctx),
            Err(ComplianceBreach::KycUnverified { account: acct(3) })
        );
        // Neither verified: the sender is reported
        assert_eq!(
            check_transfer(&acct(4), &acct(5), 1, &config, &ctx),
            Err(ComplianceBreach::KycUnverified { account: acct(4) })
        );
    }

    #[test]
    fn test_kyc_without_provider_is_inert() {
        let mut config = ComplianceConfig::default();
        config.kyc_required = true;
        // No provider configured means the feature is disabled
        assert!(check_transfer(&acct(1), &acct(2), 1, &config, &open_ctx()).is_ok());
    }

    #[test]
    fn test_limit_zero_means_unlimited() {
        let mut config = ComplianceConfig::default();
        config.transfer_limits_enabled = true;
        config.transfer_limits.insert(acct(1), 0);

        assert!(check_transfer(&acct(1), &acct(2), Amount::MAX, &config, &open_ctx()).is_ok());
    }

    #[test]
    fn test_limit_enforced_at_boundary() {
        let mut config = ComplianceConfig::default();
        config.transfer_limits_enabled = true;
        config.transfer_limits.insert(acct(1), 500);

        assert!(check_transfer(&acct(1), &acct(2), 500, &config, &open_ctx()).is_ok());
        assert_eq!(
            check_transfer(&acct(1), &acct(2), 501, &config, &open_ctx()),
            Err(ComplianceBreach::LimitExceeded {
                account: acct(1),
                limit: 500,
                amount: 501,
            })
        );

        // Limits only bite while the flag is on
        config.transfer_limits_enabled = false;
        assert!(check_transfer(&acct(1), &acct(2), 501, &config, &open_ctx()).is_ok());
    }

    #[test]
    fn test_blacklist_reports_failing_side() {
        let mut config = ComplianceConfig::default();
        config.transfer_restrictions_enabled = true;
        config.blacklist.insert(acct(2));

        assert_eq!(
            check_transfer(&acct(1), &acct(2), 1, &config, &open_ctx()),
            Err(ComplianceBreach::Blacklisted { account: acct(2) })
        );
        assert_eq!(
            check_transfer(&acct(2), &acct(1), 1, &config, &open_ctx()),
            Err(ComplianceBreach::Blacklisted { account: acct(2) })
        );
        // Uninvolved parties are unaffected
        assert!(check_transfer(&acct(1), &acct(3), 1, &config, &open_ctx()).is_ok());
    }

    #[test]
    fn test_blacklist_inert_while_restrictions_disabled() {
        let mut config = ComplianceConfig::default();
        config.blacklist.insert(acct(2));

        assert!(check_transfer(&acct(1), &acct(2), 1, &config, &open_ctx()).is_ok());

        // Toggling restrictions on re-arms the existing entries
        config.transfer_restrictions_enabled = true;
        assert!(check_transfer(&acct(1), &acct(2), 1, &config, &open_ctx()).is_err());
    }

    #[test]
    fn test_whitelist_requires_restrictions_flag() {
        let mut config = ComplianceConfig::default();
        config.whitelist_enabled = true;
        config.whitelist.insert(acct(1));

        // whitelist_enabled alone does not enforce
        assert!(check_transfer(&acct(1), &acct(2), 1, &config, &open_ctx()).is_ok());

        config.transfer_restrictions_enabled = true;
        assert_eq!(
            check_transfer(&acct(1), &acct(2), 1, &config, &open_ctx()),
            Err(ComplianceBreach::NotWhitelisted { account: acct(2) })
        );

        config.whitelist.insert(acct(2));
        assert!(check_transfer(&acct(1), &acct(2), 1, &config, &open_ctx()).is_ok());
    }

    #[test]
    fn test_blacklist_beats_whitelist() {
        // A blacklisted account that is also whitelisted is still barred
        let mut config = ComplianceConfig::default();
        config.transfer_restrictions_enabled = true;
        config.whitelist_enabled = true;
        config.whitelist.insert(acct(1));
        config.whitelist.insert(acct(2));
        config.blacklist.insert(acct(2));

        assert_eq!(
            check_transfer(&acct(1), &acct(2), 1, &config, &open_ctx()),
            Err(ComplianceBreach::Blacklisted { account: acct(2) })
        );
    }

    #[test]
    fn test_sentinel_exempt_from_membership_rules() {
        let mut config = ComplianceConfig::default();
        config.transfer_restrictions_enabled = true;
        config.whitelist_enabled = true;
        config.whitelist.insert(acct(1));

        // Burn: the zero destination needs no whitelist entry
        assert!(check_transfer(&acct(1), &AccountId::ZERO, 1, &config, &open_ctx()).is_ok());

        // The non-sentinel side is still checked
        assert!(check_transfer(&acct(9), &AccountId::ZERO, 1, &config, &open_ctx()).is_err());
    }

    #[test]
    fn test_check_mint_skips_membership_rules() {
        let mut config = ComplianceConfig::default();
        config.transfer_restrictions_enabled = true;
        config.whitelist_enabled = true;
        config.blacklist.insert(acct(7));

        // Mint is not gated by whitelist or blacklist
        assert!(check_mint(&acct(7), &config, &open_ctx()).is_ok());

        // But it still honors KYC on the recipient
        config.kyc_required = true;
        let verified = FixedKyc(HashSet::new());
        let ctx = GateContext {
            asset_active: true,
            paused: false,
            kyc: Some(&verified),
        };
        assert_eq!(
            check_mint(&acct(7), &config, &ctx),
            Err(ComplianceBreach::KycUnverified { account: acct(7) })
        );
    }
}
