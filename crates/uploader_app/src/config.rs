//! RON configuration for the uploader binary.
//!
//! Every field is optional in the file; command-line flags win over file values.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use uploader_engine::{UploadSettings, ValidationSettings};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub collection_id: String,
    pub bearer_token: String,
    pub api_token: String,
    pub connect_timeout_secs: u64,
    pub max_file_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let upload = UploadSettings::default();
        let validation = ValidationSettings::default();
        Self {
            base_url: upload.base_url,
            collection_id: upload.collection_id,
            bearer_token: upload.bearer_token,
            api_token: upload.api_token,
            connect_timeout_secs: upload.connect_timeout.as_secs(),
            max_file_bytes: validation.max_file_bytes,
        }
    }
}

/// Values given on the command line; `None` keeps whatever the file said.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub collection_id: Option<String>,
    pub bearer_token: Option<String>,
    pub api_token: Option<String>,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file: {}", path.display()))?;
        ron::from_str(&text).with_context(|| format!("parsing config file: {}", path.display()))
    }

    /// Load `path` when given, otherwise start from defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(base_url) = overrides.base_url {
            self.base_url = base_url;
        }
        if let Some(collection_id) = overrides.collection_id {
            self.collection_id = collection_id;
        }
        if let Some(bearer_token) = overrides.bearer_token {
            self.bearer_token = bearer_token;
        }
        if let Some(api_token) = overrides.api_token {
            self.api_token = api_token;
        }
    }

    pub fn upload_settings(&self) -> Result<UploadSettings> {
        let missing: Vec<&str> = [
            ("collection_id", &self.collection_id),
            ("bearer_token", &self.bearer_token),
            ("api_token", &self.api_token),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();
        if !missing.is_empty() {
            bail!("missing configuration: {}", missing.join(", "));
        }

        Ok(UploadSettings {
            base_url: self.base_url.clone(),
            collection_id: self.collection_id.trim().to_string(),
            bearer_token: self.bearer_token.clone(),
            api_token: self.api_token.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs.max(1)),
        })
    }

    pub fn validation_settings(&self) -> ValidationSettings {
        ValidationSettings {
            max_file_bytes: self.max_file_bytes,
        }
    }
}
