use serde_derive::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use types::ChainSpec;

pub const DEFAULT_PRESET: &str = "mainnet";

/// Bundles the named preset a node was launched with alongside the (possibly overridden)
/// [`ChainSpec`] derived from it, so RPC responses and logs can report which network a node
/// believes it's on without re-deriving it from individual constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Eth2Config {
    pub preset_name: String,
    pub spec: ChainSpec,
}

impl Default for Eth2Config {
    fn default() -> Self {
        Eth2Config::mainnet()
    }
}

impl Eth2Config {
    pub fn mainnet() -> Self {
        Eth2Config {
            preset_name: "mainnet".to_string(),
            spec: ChainSpec::mainnet(),
        }
    }

    pub fn minimal() -> Self {
        Eth2Config {
            preset_name: "minimal".to_string(),
            spec: ChainSpec::minimal(),
        }
    }

    pub fn from_preset_name(name: &str) -> Result<Self, String> {
        match name {
            "mainnet" => Ok(Eth2Config::mainnet()),
            "minimal" => Ok(Eth2Config::minimal()),
            other => Err(format!("Unknown eth2 preset: {}", other)),
        }
    }

    /// Loads a complete `ChainSpec` from a TOML file, e.g. a `config.toml` shipped alongside a
    /// testnet directory. Every field of `ChainSpec` must be present; use
    /// [`Eth2Config::apply_override_file`] to patch only a handful of constants instead.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let mut contents = String::new();
        File::open(path)
            .map_err(|e| format!("Unable to open eth2 config file: {:?}", e))?
            .read_to_string(&mut contents)
            .map_err(|e| format!("Unable to read eth2 config file: {:?}", e))?;

        toml::from_str(&contents).map_err(|e| format!("Unable to parse eth2 config TOML: {:?}", e))
    }

    /// Applies a partial TOML document on top of the current spec: only the keys present in
    /// `overrides` are replaced, everything else in `self.spec` is left untouched. This is the
    /// mechanism by which a testnet directory's `config.toml` can tweak a handful of constants
    /// (e.g. `SECONDS_PER_SLOT`) without restating the entire preset.
    pub fn apply_override(&mut self, overrides: &str) -> Result<(), String> {
        let base = toml::Value::try_from(&self.spec)
            .map_err(|e| format!("Unable to serialize base spec: {:?}", e))?;
        let patch: toml::Value =
            toml::from_str(overrides).map_err(|e| format!("Unable to parse override TOML: {:?}", e))?;

        let merged = merge_toml(base, patch);
        self.spec = merged
            .try_into()
            .map_err(|e| format!("Override produced an invalid ChainSpec: {:?}", e))?;
        Ok(())
    }

    pub fn apply_override_file(&mut self, path: &Path) -> Result<(), String> {
        let mut contents = String::new();
        File::open(path)
            .map_err(|e| format!("Unable to open override file: {:?}", e))?
            .read_to_string(&mut contents)
            .map_err(|e| format!("Unable to read override file: {:?}", e))?;
        self.apply_override(&contents)
    }
}

fn merge_toml(base: toml::Value, patch: toml::Value) -> toml::Value {
    match (base, patch) {
        (toml::Value::Table(mut base_table), toml::Value::Table(patch_table)) => {
            for (key, value) in patch_table {
                let merged = match base_table.remove(&key) {
                    Some(base_value) => merge_toml(base_value, value),
                    None => value,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, patch) => patch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_round_trips_through_toml() {
        let config = Eth2Config::mainnet();
        let serialized = toml::to_string(&config).expect("serializes");
        let deserialized: Eth2Config = toml::from_str(&serialized).expect("deserializes");
        assert_eq!(config, deserialized);
    }

    #[test]
    fn override_replaces_only_named_constants() {
        let mut config = Eth2Config::mainnet();
        let original_target_committee_size = config.spec.target_committee_size;

        config
            .apply_override("slot_duration_seconds = 6")
            .expect("valid override");

        assert_eq!(config.spec.slot_duration_seconds, 6);
        assert_eq!(
            config.spec.target_committee_size,
            original_target_committee_size
        );
    }

    #[test]
    fn unknown_preset_name_is_rejected() {
        assert!(Eth2Config::from_preset_name("nonexistent").is_err());
    }
}
