//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The intent is to avoid reading process-wide environment variables
//! during request handling, which can lead to inconsistent behaviour in multi-threaded runtimes
//! and test harnesses.
//!
//! [`CoreConfig::from_lookup`] takes a lookup function rather than reading `std::env` itself, so
//! binaries pass `|key| std::env::var(key).ok()` and tests pass a map.

use crate::constants::{DEFAULT_INFERENCE_API_URL, DEFAULT_INFERENCE_MODEL};
use crate::{PortalError, PortalResult};
use medichain_types::HospitalAddress;

/// Settings for the hosted text-generation endpoint used by the health advisor.
#[derive(Clone, Debug)]
pub struct InferenceConfig {
    api_url: String,
    model: String,
    api_key: Option<String>,
}

impl InferenceConfig {
    /// Create a new `InferenceConfig`.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::InvalidInput` if the URL is not http(s) or the model is blank.
    pub fn new(api_url: String, model: String, api_key: Option<String>) -> PortalResult<Self> {
        let api_url = api_url.trim().trim_end_matches('/').to_string();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(PortalError::InvalidInput(format!(
                "inference API URL must be http(s): {api_url}"
            )));
        }

        let model = model.trim().to_string();
        if model.is_empty() {
            return Err(PortalError::InvalidInput(
                "inference model cannot be empty".into(),
            ));
        }

        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        Ok(Self {
            api_url,
            model,
            api_key,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_INFERENCE_API_URL.to_string(),
            model: DEFAULT_INFERENCE_MODEL.to_string(),
            api_key: None,
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug, Default)]
pub struct CoreConfig {
    api_key: Option<String>,
    inference: InferenceConfig,
    seed_hospitals: Vec<HospitalAddress>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(
        api_key: Option<String>,
        inference: InferenceConfig,
        seed_hospitals: Vec<HospitalAddress>,
    ) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            inference,
            seed_hospitals,
        }
    }

    /// Resolve configuration from a key lookup.
    ///
    /// Reads `API_KEY`, `HUGGINGFACE_API_URL`, `HUGGINGFACE_MODEL`, `HUGGINGFACE_API_KEY` and
    /// `MEDICHAIN_HOSPITALS`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PortalResult<Self> {
        let inference = InferenceConfig::new(
            lookup("HUGGINGFACE_API_URL").unwrap_or_else(|| DEFAULT_INFERENCE_API_URL.into()),
            lookup("HUGGINGFACE_MODEL").unwrap_or_else(|| DEFAULT_INFERENCE_MODEL.into()),
            lookup("HUGGINGFACE_API_KEY"),
        )?;
        let seed_hospitals = hospital_list_from_env_value(lookup("MEDICHAIN_HOSPITALS"))?;

        Ok(Self::new(lookup("API_KEY"), inference, seed_hospitals))
    }

    /// The key gRPC callers must send in `x-api-key`.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn inference(&self) -> &InferenceConfig {
        &self.inference
    }

    /// Hospitals registered on the ledger when the portal starts.
    pub fn seed_hospitals(&self) -> &[HospitalAddress] {
        &self.seed_hospitals
    }
}

/// Parse a comma-separated list of hospital addresses.
///
/// `None`, empty and whitespace-only values yield an empty list. Blank entries between commas
/// are skipped; any other invalid entry is an error.
pub fn hospital_list_from_env_value(value: Option<String>) -> PortalResult<Vec<HospitalAddress>> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };

    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| HospitalAddress::parse(entry).map_err(PortalError::from))
        .collect()
}
