use crate::amount::Amount;
use crate::id::AccountId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of real-world asset backing a ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetType {
    /// Real estate holdings
    RealEstate,
    /// Physical commodities (metals, energy, agriculture)
    Commodity,
    /// Fine art and collectibles
    Art,
    /// Infrastructure and equipment
    Infrastructure,
    /// Anything else, labelled free-form
    Other(String),
}

/// The single real-world asset record backing a ledger instance.
///
/// Exactly one exists per ledger. Admin operations mutate it in place;
/// it is never deleted, only deactivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Category of the underlying asset
    pub asset_type: AssetType,

    /// Issuer-assigned identifier for the underlying asset
    pub asset_id: String,

    /// Human-readable description
    pub description: String,

    /// Current stored valuation of the whole asset (fixed-point, 18 decimals)
    pub valuation: Amount,

    /// When the asset was tokenized
    pub tokenized_at: DateTime<Utc>,

    /// Whether the asset is active; every mutating operation requires this
    pub is_active: bool,

    /// The custodian currently attesting to the asset's status
    pub custodian: AccountId,

    /// Hash of the latest legal documentation, when registered
    pub document_hash: Option<[u8; 32]>,
}

impl AssetRecord {
    /// Create a new active asset record, tokenized now
    pub fn new(
        asset_type: AssetType,
        asset_id: impl Into<String>,
        description: impl Into<String>,
        valuation: Amount,
        custodian: AccountId,
    ) -> Self {
        Self {
            asset_type,
            asset_id: asset_id.into(),
            description: description.into(),
            valuation,
            tokenized_at: Utc::now(),
            is_active: true,
            custodian,
            document_hash: None,
        }
    }
}
