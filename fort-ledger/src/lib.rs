pub mod ledger;
pub mod mock;
pub mod redemption;
pub mod snapshot;
pub mod valuation;

// Re-export the main types for convenience
pub use ledger::Ledger;
pub use mock::{MockCapabilityChecker, MockKycProvider, MockOracle, MockPayoutAsset};
pub use redemption::RedemptionState;
pub use snapshot::{FileSnapshotStore, LedgerSnapshot};
