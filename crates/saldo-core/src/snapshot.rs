//! Snapshot files
//!
//! A snapshot is a JSON dump of the account store, the transaction store and the
//! user's declared recurring payments. It is the CLI's stand-in for the live stores.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{Account, RecurringPayment, Transaction};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub recurring_payments: Vec<RecurringPayment>,
}

impl Snapshot {
    /// Read and parse a snapshot file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(format!("Snapshot {}", path.display())));
        }

        let content = fs::read_to_string(path)?;
        let snapshot = Self::from_json(&content)?;

        info!(
            "Loaded snapshot {}: {} accounts, {} transactions, {} recurring payments",
            path.display(),
            snapshot.accounts.len(),
            snapshot.transactions.len(),
            snapshot.recurring_payments.len()
        );

        Ok(snapshot)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Write the snapshot as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }
}
