use crate::amount::Amount;
use crate::collaborators::Capability;
use crate::compliance::ComplianceBreach;
use crate::id::AccountId;
use thiserror::Error;

/// Represents all possible errors that can occur when operating a FORT ledger
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The caller does not hold the capability the operation requires
    #[error("caller lacks the {0:?} capability")]
    Unauthorized(Capability),

    /// The zero sentinel was passed where a real account is required
    #[error("the zero account is not a valid {0}")]
    ZeroAccount(&'static str),

    /// A zero amount was passed to an operation that requires a positive one
    #[error("amount must be greater than zero")]
    ZeroAmount,

    /// A valuation outside the valid range `0 < v <= MAX_VALUATION`
    #[error("valuation {value} is outside the valid range")]
    InvalidValuation { value: Amount },

    /// A redemption fee above the cap
    #[error("redemption fee of {bps} bps exceeds the 1000 bps cap")]
    InvalidFee { bps: u16 },

    /// A compliance gate rule failed; carries which rule and which side
    #[error(transparent)]
    Compliance(#[from] ComplianceBreach),

    /// The amount exceeds the account's available balance
    #[error("balance of {balance} for {account} cannot cover {amount}")]
    InsufficientBalance {
        account: AccountId,
        balance: Amount,
        amount: Amount,
    },

    /// The amount exceeds the allowance granted to the spender
    #[error("allowance granted by {owner} to {spender} cannot cover the amount")]
    InsufficientAllowance {
        owner: AccountId,
        spender: AccountId,
    },

    /// The amount exceeds the account's pending redemption amount
    #[error("pending redemption of {pending} for {account} cannot cover {amount}")]
    InsufficientPending {
        account: AccountId,
        pending: Amount,
        amount: Amount,
    },

    /// A redemption request was made while redemption is switched off
    #[error("redemption is not enabled")]
    RedemptionDisabled,

    /// The operation requires an external collaborator that is not set
    #[error("no {0} is configured")]
    NotConfigured(&'static str),

    /// A required external call failed
    #[error("external call failed: {0}")]
    ExternalCall(String),

    /// Checked fixed-point arithmetic overflowed
    #[error("fixed-point arithmetic overflow")]
    Overflow,

    /// Snapshot encoding or decoding failed
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// IO errors from the snapshot store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Anyhow error wrapper for error context
    #[error(transparent)]
    Context(#[from] anyhow::Error),
}

impl From<bincode::Error> for LedgerError {
    fn from(err: bincode::Error) -> Self {
        LedgerError::Snapshot(err.to_string())
    }
}

impl LedgerError {
    /// Whether this error is the compliance gate refusing the operation
    /// (as opposed to bad arguments, missing configuration, or IO)
    pub fn is_compliance(&self) -> bool {
        matches!(self, LedgerError::Compliance(_))
    }
}
