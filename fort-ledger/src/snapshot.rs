use fort_core::amount::Amount;
use fort_core::asset::AssetRecord;
use fort_core::collaborators::CapabilityChecker;
use fort_core::compliance::ComplianceConfig;
use fort_core::error::LedgerError;
use fort_core::id::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ledger::Ledger;
use crate::redemption::RedemptionState;

/// A serializable image of everything a ledger persists.
///
/// Collaborator handles and the event journal are deliberately absent:
/// handles are reattached on restore, and events are an in-flight
/// observation channel, not state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub asset: AssetRecord,
    pub paused: bool,
    pub balances: HashMap<AccountId, Amount>,
    pub total_supply: Amount,
    pub allowances: HashMap<(AccountId, AccountId), Amount>,
    pub compliance: ComplianceConfig,
    pub redemption: RedemptionState,
}

impl Ledger {
    /// Capture the ledger's persistent state
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            asset: self.asset.clone(),
            paused: self.paused,
            balances: self.balances.clone(),
            total_supply: self.total_supply,
            allowances: self.allowances.clone(),
            compliance: self.compliance.clone(),
            redemption: self.redemption.clone(),
        }
    }

    /// Reconstruct a ledger from a snapshot.
    ///
    /// Collaborators are reattached separately (via the `with_*` builders
    /// or the privileged setters); the restored ledger starts with none
    /// and an empty event journal.
    pub fn restore(snapshot: LedgerSnapshot, capabilities: Arc<dyn CapabilityChecker>) -> Self {
        Self {
            asset: snapshot.asset,
            paused: snapshot.paused,
            balances: snapshot.balances,
            total_supply: snapshot.total_supply,
            allowances: snapshot.allowances,
            compliance: snapshot.compliance,
            redemption: snapshot.redemption,
            capabilities,
            kyc: None,
            oracle: None,
            payout: None,
            events: Vec::new(),
        }
    }
}

/// A basic file-backed snapshot store.
///
/// Writes a single length-prefixed bincode record per save, replacing any
/// previous snapshot at the path.
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store persisting to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this store persists to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `snapshot`, replacing any existing one
    pub fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), LedgerError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);

        let serialized = bincode::serialize(snapshot)?;
        let len = serialized.len() as u64;
        writer.write_all(&len.to_le_bytes())?;
        writer.write_all(&serialized)?;
        writer.flush()?;
        Ok(())
    }

    /// Read back the stored snapshot
    pub fn load(&self) -> Result<LedgerSnapshot, LedgerError> {
        let file = File::open(&self.path)?;
        let mut reader = BufReader::new(file);

        let mut len_bytes = [0u8; 8];
        reader.read_exact(&mut len_bytes)?;
        let len = u64::from_le_bytes(len_bytes) as usize;

        let mut buffer = vec![0u8; len];
        reader.read_exact(&mut buffer)?;

        let snapshot = bincode::deserialize(&buffer)?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::tests::{acct, admin, test_ledger};
    use crate::mock::MockCapabilityChecker;
    use tempfile::tempdir;

    #[test]
    fn test_snapshot_round_trip_in_memory() {
        let mut ledger = test_ledger();
        let (h1, h2) = (acct(1), acct(2));
        ledger.mint(&admin(), &h1, 1_000).unwrap();
        ledger.transfer(&h1, &h2, 250).unwrap();
        ledger.approve(&h1, &h2, 40).unwrap();
        ledger.add_to_blacklist(&admin(), acct(3)).unwrap();
        ledger.set_redemption_enabled(&admin(), true).unwrap();
        ledger.request_redemption(&h1, 100).unwrap();

        let snapshot = ledger.snapshot();
        let restored = Ledger::restore(
            snapshot.clone(),
            Arc::new(MockCapabilityChecker::allow_all()),
        );

        assert_eq!(restored.balance_of(&h1), 750);
        assert_eq!(restored.balance_of(&h2), 250);
        assert_eq!(restored.total_supply(), 1_000);
        assert_eq!(restored.allowance(&h1, &h2), 40);
        assert!(restored.is_blacklisted(&acct(3)));
        assert_eq!(restored.pending_redemption(&h1), 100);
        assert_eq!(restored.snapshot(), snapshot);
        assert!(restored.events().is_empty());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("ledger.snapshot"));

        let mut ledger = test_ledger();
        ledger.mint(&admin(), &acct(1), 12_345).unwrap();

        let snapshot = ledger.snapshot();
        store.save(&snapshot).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, snapshot);

        // Saving again replaces the previous record
        let mut ledger2 = Ledger::restore(loaded, Arc::new(MockCapabilityChecker::allow_all()));
        ledger2.burn(&acct(1), 45).unwrap();
        store.save(&ledger2.snapshot()).unwrap();
        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.total_supply, 12_300);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("absent.snapshot"));
        assert!(matches!(store.load(), Err(LedgerError::Io(_))));
    }
}
