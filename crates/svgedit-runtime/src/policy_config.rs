#![forbid(unsafe_code)]

//! Policy-as-data configuration for the editing runtime.
//!
//! Captures the tunable blur geometry and history limits as a single
//! [`EditorPolicyConfig`] that can be loaded from TOML or JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # svgedit-policy.toml
//! [blur]
//! expand_threshold = 4.0
//! region_size_pct = 250.0
//!
//! [history]
//! max_depth = 50
//! ```
//!
//! ```rust,ignore
//! let policy = EditorPolicyConfig::from_toml_file("svgedit-policy.toml")?;
//! let editor = BlurEditor::with_policy(caps, policy.to_blur_policy());
//! ```
//!
//! # Defaults
//!
//! Every field defaults to the matching constant in [`crate::blur::offsets`]
//! and [`crate::undo::history`], so `EditorPolicyConfig::default()` behaves
//! exactly like the unconfigured runtime.

#[cfg(feature = "policy-config")]
use std::path::Path;

#[cfg(feature = "policy-config")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blur::BlurPolicy;
use crate::blur::offsets::{
    DEFAULT_EXPAND_THRESHOLD, DEFAULT_REGION_OFFSET_PCT, DEFAULT_REGION_SIZE_PCT,
};
use crate::undo::HistoryConfig;
use crate::undo::history::{DEFAULT_MAX_BYTES, DEFAULT_MAX_DEPTH};

// ---------------------------------------------------------------------------
// Top-level EditorPolicyConfig
// ---------------------------------------------------------------------------

/// Top-level runtime policy.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct EditorPolicyConfig {
    /// Blur region geometry.
    pub blur: BlurPolicyConfig,

    /// Undo history limits.
    pub history: HistoryPolicyConfig,
}

impl EditorPolicyConfig {
    /// Load from a TOML string.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, PolicyConfigError> {
        toml::from_str(s).map_err(PolicyConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, PolicyConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "policy-config")]
    pub fn from_json_str(s: &str) -> Result<Self, PolicyConfigError> {
        serde_json::from_str(s).map_err(PolicyConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PolicyConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let blur = &self.blur;
        if !blur.expand_threshold.is_finite() || blur.expand_threshold < 0.0 {
            errors.push(format!(
                "blur.expand_threshold must be finite and >= 0, got {}",
                blur.expand_threshold
            ));
        }
        if !blur.region_offset_pct.is_finite() {
            errors.push(format!(
                "blur.region_offset_pct must be finite, got {}",
                blur.region_offset_pct
            ));
        }
        if !blur.region_size_pct.is_finite() || blur.region_size_pct <= 0.0 {
            errors.push(format!(
                "blur.region_size_pct must be finite and > 0, got {}",
                blur.region_size_pct
            ));
        }

        if self.history.max_depth == 0 {
            errors.push("history.max_depth must be > 0".into());
        }

        errors
    }

    /// Validate, returning the config unchanged on success.
    pub fn validated(self) -> Result<Self, PolicyConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(PolicyConfigError::Validation(errors))
        }
    }

    /// Blur geometry for [`crate::blur::BlurEditor::with_policy`].
    #[must_use]
    pub fn to_blur_policy(&self) -> BlurPolicy {
        BlurPolicy {
            expand_threshold: self.blur.expand_threshold,
            region_offset_pct: self.blur.region_offset_pct,
            region_size_pct: self.blur.region_size_pct,
        }
    }

    /// History limits for [`crate::canvas::SvgCanvas::with_history`].
    #[must_use]
    pub fn to_history_config(&self) -> HistoryConfig {
        HistoryConfig::new(self.history.max_depth, self.history.max_bytes)
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// `[blur]` section.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct BlurPolicyConfig {
    /// Deviations strictly above this expand the filter region.
    pub expand_threshold: f64,
    /// `x`/`y` of the expanded region, percent.
    pub region_offset_pct: f64,
    /// `width`/`height` of the expanded region, percent.
    pub region_size_pct: f64,
}

impl Default for BlurPolicyConfig {
    fn default() -> Self {
        Self {
            expand_threshold: DEFAULT_EXPAND_THRESHOLD,
            region_offset_pct: DEFAULT_REGION_OFFSET_PCT,
            region_size_pct: DEFAULT_REGION_SIZE_PCT,
        }
    }
}

/// `[history]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct HistoryPolicyConfig {
    /// Maximum number of undo entries.
    pub max_depth: usize,
    /// Maximum total size of undo entries in bytes (0 = unlimited).
    pub max_bytes: usize,
}

impl Default for HistoryPolicyConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure loading or validating a policy.
#[derive(Debug, Error)]
pub enum PolicyConfigError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "policy-config")]
    #[error("TOML parse error: {0}")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "policy-config")]
    #[error("JSON parse error: {0}")]
    Json(serde_json::Error),
    /// Validation errors.
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
