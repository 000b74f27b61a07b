use std::path::Path;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use weft_consensus::{Validators, Weight};
use weft_core::{KeyPair, NetForkId, PublicKey, SecretKey, ValidatorId};

/// Tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Network fork id written into emitted events
    pub net_fork_id: NetForkId,

    /// Default log filter, overridden by `--log-level` and `RUST_LOG`
    pub log_level: String,

    /// Current validator set
    pub validators: Vec<ValidatorEntry>,

    /// Id of the local validator, used by `emit`
    pub validator_id: Option<ValidatorId>,

    /// Local validator secret key (hex)
    pub validator_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorEntry {
    pub id: ValidatorId,
    pub weight: Weight,
    pub pubkey: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        ToolConfig {
            net_fork_id: 0,
            log_level: "info".to_string(),
            validators: Vec::new(),
            validator_id: None,
            validator_key: None,
        }
    }
}

impl ToolConfig {
    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ToolConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Build the weighted set used for proposer selection
    pub fn to_validators(&self) -> Result<Validators> {
        let validators = Validators::new(self.validators.iter().map(|v| (v.id, v.weight)))?;
        Ok(validators)
    }

    /// Public key of a configured validator
    pub fn pubkey_of(&self, id: ValidatorId) -> Result<Option<PublicKey>> {
        self.validators
            .iter()
            .find(|v| v.id == id)
            .map(|v| PublicKey::from_hex(&v.pubkey).map_err(|e| anyhow!(e)))
            .transpose()
    }

    /// Local validator id and key, required to emit events
    pub fn local_validator(&self) -> Result<(ValidatorId, SecretKey)> {
        let id = self
            .validator_id
            .ok_or_else(|| anyhow!("validator_id is not set"))?;
        let key = self
            .validator_key
            .as_deref()
            .ok_or_else(|| anyhow!("validator_key is not set"))?;
        let secret = SecretKey::from_hex(key)?;

        if let Some(expected) = self.pubkey_of(id)? {
            if expected != secret.public_key() {
                return Err(anyhow!(
                    "validator_key does not match the public key of validator {}",
                    id
                ));
            }
        }
        Ok((id, secret))
    }
}

/// Generate a sample configuration with `count` equally weighted validators.
///
/// The first validator is the local one; the other secret keys are discarded.
pub fn generate_sample_config(count: u32) -> ToolConfig {
    let keys: Vec<KeyPair> = (0..count).map(|_| KeyPair::generate()).collect();

    ToolConfig {
        validators: keys
            .iter()
            .zip(1..)
            .map(|(k, id)| ValidatorEntry {
                id,
                weight: 1_000,
                pubkey: k.public.to_hex(),
            })
            .collect(),
        validator_id: keys.first().map(|_| 1),
        validator_key: keys.first().map(|k| k.secret.to_hex()),
        ..ToolConfig::default()
    }
}
