pub mod amount;
pub mod asset;
pub mod collaborators;
pub mod compliance;
pub mod error;
pub mod event;
pub mod id;

// Re-export the main types for convenience
pub use amount::{bps_fee, mul_div, valuation_in_range, Amount, BPS_DENOMINATOR, MAX_FEE_BPS, MAX_VALUATION, SCALE};
pub use asset::{AssetRecord, AssetType};
pub use collaborators::{Capability, CapabilityChecker, KycProvider, PayoutAsset, PriceOracle};
pub use compliance::{check_mint, check_transfer, ComplianceBreach, ComplianceConfig, GateContext};
pub use error::LedgerError;
pub use event::{ComplianceFlag, EventRecord, LedgerEvent};
pub use id::AccountId;
