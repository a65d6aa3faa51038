//! Centralized configuration and builder for the bookstore store.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - StoreConfig::from_env() reads BOOKSTORE_* variables on top of defaults.
//! - StoreBuilder returns a StoreConfig, which Store::open_with_config consumes.
//!
//! Defaults: random author ids within
//! the current digit width, no author re-validation on book updates, seed data
//! on first creation.

use std::fmt;

use crate::consts::WAL_CHECKPOINT_BYTES;
use crate::util::parse_flag;

/// How new author ids are produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdStrategy {
    /// Uniform random draw within the current digit width.
    Random,
    /// max(id) + 1.
    Sequential,
}

impl IdStrategy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" | "rand" => Some(IdStrategy::Random),
            "sequential" | "seq" => Some(IdStrategy::Sequential),
            _ => None,
        }
    }
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdStrategy::Random => f.write_str("random"),
            IdStrategy::Sequential => f.write_str("sequential"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// fsync the WAL on every commit.
    /// Env: BOOKSTORE_WAL_FSYNC (default true)
    pub wal_fsync: bool,

    /// Checkpoint (rewrite tables.img, truncate WAL) once the WAL grows past this size.
    /// Env: BOOKSTORE_WAL_CHECKPOINT_BYTES (default 1 MiB)
    pub wal_checkpoint_bytes: u64,

    /// Env: BOOKSTORE_AUTHOR_IDS = random|sequential (default random)
    pub author_ids: IdStrategy,

    /// Fixed RNG seed for reproducible random author ids.
    /// Env: BOOKSTORE_AUTHOR_ID_SEED (default none)
    pub author_id_seed: Option<u64>,

    /// Reject book updates that point author_id at a missing author.
    /// Env: BOOKSTORE_VALIDATE_AUTHOR_ON_UPDATE (default false)
    pub validate_author_on_update: bool,

    /// Populate fixture books/authors when a storage root is created.
    /// Env: BOOKSTORE_SEED_DATA (default true)
    pub seed_data: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            wal_fsync: true,
            wal_checkpoint_bytes: WAL_CHECKPOINT_BYTES,
            author_ids: IdStrategy::Random,
            author_id_seed: None,
            validate_author_on_update: false,
            seed_data: true,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("BOOKSTORE_WAL_FSYNC") {
            cfg.wal_fsync = parse_flag(&v);
        }

        if let Ok(v) = std::env::var("BOOKSTORE_WAL_CHECKPOINT_BYTES") {
            if let Ok(n) = v.trim().parse::<u64>() {
                cfg.wal_checkpoint_bytes = n;
            }
        }

        if let Ok(v) = std::env::var("BOOKSTORE_AUTHOR_IDS") {
            if let Some(s) = IdStrategy::parse(&v) {
                cfg.author_ids = s;
            }
        }

        if let Ok(v) = std::env::var("BOOKSTORE_AUTHOR_ID_SEED") {
            if let Ok(n) = v.trim().parse::<u64>() {
                cfg.author_id_seed = Some(n);
            }
        }

        if let Ok(v) = std::env::var("BOOKSTORE_VALIDATE_AUTHOR_ON_UPDATE") {
            cfg.validate_author_on_update = parse_flag(&v);
        }

        if let Ok(v) = std::env::var("BOOKSTORE_SEED_DATA") {
            cfg.seed_data = parse_flag(&v);
        }

        cfg
    }

    pub fn with_wal_fsync(mut self, on: bool) -> Self {
        self.wal_fsync = on;
        self
    }

    pub fn with_wal_checkpoint_bytes(mut self, bytes: u64) -> Self {
        self.wal_checkpoint_bytes = bytes;
        self
    }

    pub fn with_author_ids(mut self, strategy: IdStrategy) -> Self {
        self.author_ids = strategy;
        self
    }

    pub fn with_author_id_seed(mut self, seed: Option<u64>) -> Self {
        self.author_id_seed = seed;
        self
    }

    pub fn with_validate_author_on_update(mut self, on: bool) -> Self {
        self.validate_author_on_update = on;
        self
    }

    pub fn with_seed_data(mut self, on: bool) -> Self {
        self.seed_data = on;
        self
    }
}

impl fmt::Display for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StoreConfig {{ \
             wal_fsync: {}, \
             wal_checkpoint_bytes: {}, \
             author_ids: {}, \
             author_id_seed: {}, \
             validate_author_on_update: {}, \
             seed_data: {} \
             }}",
            self.wal_fsync,
            self.wal_checkpoint_bytes,
            self.author_ids,
            self.author_id_seed
                .map(|v| v.to_string())
                .unwrap_or_else(|| "entropy".to_string()),
            self.validate_author_on_update,
            self.seed_data,
        )
    }
}

/// Lightweight builder that produces a StoreConfig.
#[derive(Clone, Debug)]
pub struct StoreBuilder {
    cfg: StoreConfig,
}

impl Default for StoreBuilder {
    fn default() -> Self {
        // Start from env, then allow overrides.
        Self {
            cfg: StoreConfig::from_env(),
        }
    }
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a clean default (without reading env).
    pub fn from_default() -> Self {
        Self {
            cfg: StoreConfig::default(),
        }
    }

    pub fn wal_fsync(mut self, on: bool) -> Self {
        self.cfg.wal_fsync = on;
        self
    }

    pub fn wal_checkpoint_bytes(mut self, bytes: u64) -> Self {
        self.cfg.wal_checkpoint_bytes = bytes;
        self
    }

    pub fn author_ids(mut self, strategy: IdStrategy) -> Self {
        self.cfg.author_ids = strategy;
        self
    }

    pub fn author_id_seed(mut self, seed: u64) -> Self {
        self.cfg.author_id_seed = Some(seed);
        self
    }

    pub fn validate_author_on_update(mut self, on: bool) -> Self {
        self.cfg.validate_author_on_update = on;
        self
    }

    pub fn seed_data(mut self, on: bool) -> Self {
        self.cfg.seed_data = on;
        self
    }

    pub fn build(self) -> StoreConfig {
        self.cfg
    }
}
