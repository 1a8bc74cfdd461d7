//! Marketplace persistence for one data directory

use crate::error::{Result, StorageError};
use crate::journal::Journal;
use crate::snapshot::SnapshotStore;
use acdm_node::{Call, Marketplace, MarketplaceConfig, Receipt};
use std::path::{Path, PathBuf};

const STATE: &str = "marketplace";
const JOURNAL: &str = "journal.json";

pub struct MarketplaceStore {
    snapshots: SnapshotStore,
    journal_path: PathBuf,
}

impl MarketplaceStore {
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let snapshots = SnapshotStore::open(&data_dir)?;
        let journal_path = snapshots.data_dir().join(JOURNAL);
        Ok(Self {
            snapshots,
            journal_path,
        })
    }

    pub fn is_initialised(&self) -> bool {
        self.snapshots.has(STATE)
    }

    /// Create a fresh marketplace; refuses to overwrite an existing one.
    pub fn init(&self, config: MarketplaceConfig) -> Result<Marketplace> {
        if self.is_initialised() {
            return Err(StorageError::AlreadyInitialised(
                self.snapshots.data_dir().display().to_string(),
            ));
        }
        let marketplace = Marketplace::new(config)?;
        self.snapshots.save(STATE, &marketplace)?;
        Journal::new().save(&self.journal_path)?;
        log::info!("marketplace initialised in {}", self.snapshots.data_dir().display());
        Ok(marketplace)
    }

    pub fn load(&self) -> Result<Marketplace> {
        self.snapshots.load(STATE)
    }

    /// Persist the state after `call` committed with `receipt`.
    pub fn commit(&self, marketplace: &Marketplace, call: Call, receipt: Receipt) -> Result<()> {
        let mut journal = Journal::load_or_new(&self.journal_path)?;
        journal.append(call, receipt);
        self.snapshots.save(STATE, marketplace)?;
        journal.save(&self.journal_path)
    }

    pub fn journal(&self) -> Result<Journal> {
        Journal::load_or_new(&self.journal_path)
    }

    pub fn data_dir(&self) -> &Path {
        self.snapshots.data_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acdm_core::Address;
    use acdm_node::{Asset, Operation};
    use tempfile::tempdir;

    #[test]
    fn test_state_survives_reopen() {
        let dir = tempdir().unwrap();
        let store = MarketplaceStore::open(dir.path()).unwrap();
        assert!(!store.is_initialised());

        let mut marketplace = store.init(MarketplaceConfig::default()).unwrap();
        assert!(store.init(MarketplaceConfig::default()).is_err());

        let call = Call::new(
            "faucet",
            1_000,
            Operation::Mint {
                asset: Asset::Payment,
                to: Address::from("alice"),
                amount: 10_000_000_000_000_000_000,
            },
        );
        let receipt = marketplace.apply(call.clone()).unwrap();
        store.commit(&marketplace, call, receipt).unwrap();

        let reopened = MarketplaceStore::open(dir.path()).unwrap();
        let loaded = reopened.load().unwrap();
        assert_eq!(
            loaded.balance_of(Asset::Payment, &Address::from("alice")),
            10_000_000_000_000_000_000
        );
        assert_eq!(loaded.last_timestamp(), Some(1_000));
        assert_eq!(reopened.journal().unwrap().len(), 1);
    }

    #[test]
    fn test_commit_refuses_corrupt_journal() {
        let dir = tempdir().unwrap();
        let store = MarketplaceStore::open(dir.path()).unwrap();
        let mut marketplace = store.init(MarketplaceConfig::default()).unwrap();

        for at in 1_000..1_003 {
            let call = Call::new(
                "faucet",
                at,
                Operation::Mint {
                    asset: Asset::Payment,
                    to: Address::from("alice"),
                    amount: 1,
                },
            );
            let receipt = marketplace.apply(call.clone()).unwrap();
            store.commit(&marketplace, call, receipt).unwrap();
        }
        assert_eq!(store.journal().unwrap().len(), 3);

        let journal_path = store.data_dir().join(JOURNAL);
        std::fs::write(&journal_path, "{ truncated").unwrap();

        let call = Call::new("owner", 1_003, Operation::StartSaleRound);
        let receipt = marketplace.apply(call.clone()).unwrap();
        assert!(matches!(
            store.commit(&marketplace, call, receipt),
            Err(StorageError::SerializationError(_))
        ));
        assert!(store.journal().is_err());
        assert_eq!(std::fs::read_to_string(&journal_path).unwrap(), "{ truncated");
    }

    #[test]
    fn test_missing_journal_starts_empty() {
        let dir = tempdir().unwrap();
        let store = MarketplaceStore::open(dir.path()).unwrap();
        assert!(store.journal().unwrap().is_empty());
    }
}
