use anyhow::{Context, Result};
use billshare_core::{BillKey, BillMatch};
use billshare_import::BillHistory;
use std::fs;
use std::path::{Path, PathBuf};

/// Bills issued by earlier runs, kept as a JSON array on disk.
pub struct HistoryFile {
    path: PathBuf,
    bills: Vec<BillMatch>,
}

impl HistoryFile {
    /// A missing file is an empty history.
    pub fn load(path: &Path) -> Result<Self> {
        let bills: Vec<BillMatch> = if path.exists() {
            let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
            serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?
        } else {
            Vec::new()
        };
        tracing::debug!("Loaded {} prior bills from {}", bills.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            bills,
        })
    }

    pub fn bills(&self) -> &[BillMatch] {
        &self.bills
    }

    pub fn record(&mut self, new_bills: &[BillMatch]) {
        self.bills.extend_from_slice(new_bills);
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let s = serde_json::to_string_pretty(&self.bills).context("serialize bill history")?;
        fs::write(&self.path, s).with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }
}

impl BillHistory for HistoryFile {
    fn already_processed(&self, key: &BillKey) -> bool {
        self.bills.as_slice().already_processed(key)
    }
}
