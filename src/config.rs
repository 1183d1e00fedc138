use clap::Parser;
use std::path::PathBuf;

use crate::storage::{DurabilityMode, StoreOptions};

#[derive(Debug, Clone, Parser)]
#[command(name = "recordstore", version, about = "JSON-file backed record collection over HTTP")]
pub struct AppConfig {
    #[arg(long, env = "APP_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "APP_PORT", default_value_t = 3000)]
    pub port: u16,

    /// JSON array holding the collection.
    #[arg(long, env = "RECORDSTORE_DATA_FILE", default_value = "database/data.json")]
    pub data_file: PathBuf,

    /// `sync` fsyncs every snapshot before it replaces the file.
    #[arg(long, env = "RECORDSTORE_DURABILITY", default_value = "sync")]
    pub durability: DurabilityMode,

    /// Accept inserts that reuse an existing id.
    #[arg(long, env = "RECORDSTORE_ALLOW_DUPLICATE_IDS")]
    pub allow_duplicate_ids: bool,

    /// Start with an empty collection when the data file is absent.
    #[arg(long, env = "RECORDSTORE_CREATE_IF_MISSING")]
    pub create_if_missing: bool,
}

impl AppConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions::new(&self.data_file)
            .durability(self.durability)
            .allow_duplicate_ids(self.allow_duplicate_ids)
            .create_if_missing(self.create_if_missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_legacy_server() {
        let config = AppConfig::try_parse_from(["recordstore"]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.durability, DurabilityMode::Sync);
        assert!(!config.allow_duplicate_ids);
        assert_eq!(config.address(), "0.0.0.0:3000");
    }

    #[test]
    fn flags_flow_into_store_options() {
        let config = AppConfig::try_parse_from([
            "recordstore",
            "--data-file",
            "/tmp/objects.json",
            "--durability",
            "async",
            "--allow-duplicate-ids",
            "--create-if-missing",
        ])
        .unwrap();
        let options = config.store_options();
        assert_eq!(options.path, PathBuf::from("/tmp/objects.json"));
        assert_eq!(options.durability, DurabilityMode::Async);
        assert!(options.allow_duplicate_ids);
        assert!(options.create_if_missing);
    }

    #[test]
    fn unknown_durability_is_rejected() {
        assert!(AppConfig::try_parse_from(["recordstore", "--durability", "never"]).is_err());
    }
}
