//! Record store configuration
//!
//! Options are fixed at construction. Use the builder methods:
//!
//! ```
//! use memrec_core::{CappedConfig, RecordStoreOptions};
//!
//! let opts = RecordStoreOptions::new()
//!     .capped(CappedConfig::new(4096).with_max_docs(100))
//!     .log_typed(true);
//! assert!(opts.validate().is_ok());
//! ```
//!
//! or load them from a TOML fragment:
//!
//! ```
//! use memrec_core::RecordStoreOptions;
//!
//! let opts = RecordStoreOptions::from_toml_str(
//!     r#"
//!     log_typed = true
//!
//!     [capped]
//!     max_bytes = 1048576
//!     "#,
//! )
//! .unwrap();
//! assert!(opts.is_capped());
//! ```

use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};

/// Ceilings for a capped table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CappedConfig {
    /// Byte ceiling; must be positive
    pub max_bytes: u64,
    /// Document ceiling; `None` means unbounded
    #[serde(default)]
    pub max_docs: Option<u64>,
}

impl CappedConfig {
    /// Capped by bytes only
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            max_docs: None,
        }
    }

    /// Also cap the number of documents
    pub fn with_max_docs(mut self, max_docs: u64) -> Self {
        self.max_docs = Some(max_docs);
        self
    }

    /// True if a table of `data_size` bytes and `num_records` records is
    /// over either ceiling
    pub fn is_exceeded(&self, data_size: u64, num_records: u64) -> bool {
        if data_size > self.max_bytes {
            return true;
        }
        matches!(self.max_docs, Some(max_docs) if num_records > max_docs)
    }

    /// Check the ceiling invariants
    pub fn validate(&self) -> StoreResult<()> {
        if self.max_bytes == 0 {
            return Err(StoreError::invalid_config(
                "capped max_bytes must be greater than zero",
            ));
        }
        match self.max_docs {
            Some(0) => Err(StoreError::invalid_config(
                "capped max_docs must be unbounded or greater than zero",
            )),
            Some(n) if n > i64::MAX as u64 => Err(StoreError::invalid_config(format!(
                "capped max_docs {} exceeds {}",
                n,
                i64::MAX
            ))),
            _ => Ok(()),
        }
    }
}

/// Options for constructing a record store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStoreOptions {
    /// Capped ceilings; `None` for an uncapped table
    #[serde(default)]
    pub capped: Option<CappedConfig>,
    /// Whether identifiers come from the payload's log timestamp
    #[serde(default)]
    pub log_typed: bool,
}

impl RecordStoreOptions {
    /// Uncapped, allocator-assigned identifiers
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the table capped
    pub fn capped(mut self, config: CappedConfig) -> Self {
        self.capped = Some(config);
        self
    }

    /// Select log-typed identifiers
    pub fn log_typed(mut self, log_typed: bool) -> Self {
        self.log_typed = log_typed;
        self
    }

    /// Whether the table is capped
    pub fn is_capped(&self) -> bool {
        self.capped.is_some()
    }

    /// Check all option invariants
    pub fn validate(&self) -> StoreResult<()> {
        match &self.capped {
            Some(capped) => capped.validate(),
            None => Ok(()),
        }
    }

    /// Parse and validate options from TOML
    pub fn from_toml_str(input: &str) -> StoreResult<Self> {
        let opts: RecordStoreOptions =
            toml::from_str(input).map_err(|e| StoreError::invalid_config(e.to_string()))?;
        opts.validate()?;
        Ok(opts)
    }
}
