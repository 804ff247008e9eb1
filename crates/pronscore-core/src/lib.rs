//! Pronscore Core - Domain models, errors, and shared types
//!
//! This crate defines the core abstractions used throughout pronscore:
//! - Token records read from CoNLL-style annotation streams
//! - Pronoun evaluation settings (masculine, feminine, gender-indefinite, all)
//! - Cluster reconstruction modes
//! - Common error types
//! - Configuration management

pub mod config;

pub use config::{AppConfig, ConfigError, EvalConfig, LoggingConfig};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for pronscore operations
#[derive(Error, Debug)]
pub enum PronscoreError {
    #[error("Malformed token line {line}: expected at least {expected} columns, found {found}")]
    MalformedLine {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid results file {path}: {message}")]
    ResultsFile { path: String, message: String },

    #[error("Invalid mention span: {0}")]
    InvalidSpan(String),

    #[error("Unknown pronoun setting: {0}")]
    UnknownSetting(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PronscoreError>;

// ============================================================================
// Token Records
// ============================================================================

/// One annotated token of an evaluation stream.
///
/// `position` is the index of the token within the whole stream; it is
/// not reset at document boundaries, so spans from different documents
/// never share positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Source document identifier (column 0)
    pub document_id: String,

    /// Global index within the evaluation stream
    pub position: usize,

    /// Token text (column 3)
    pub surface_form: String,

    /// Coarse part of speech (column 4)
    pub pos_tag: String,

    /// Fine-grained morphological tag (column 5)
    pub morph_tag: String,

    /// Raw coreference annotation (column 11)
    pub coref_field: String,
}

impl TokenRecord {
    /// Create a new record
    pub fn new(
        document_id: impl Into<String>,
        position: usize,
        surface_form: impl Into<String>,
        pos_tag: impl Into<String>,
        morph_tag: impl Into<String>,
        coref_field: impl Into<String>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            position,
            surface_form: surface_form.into(),
            pos_tag: pos_tag.into(),
            morph_tag: morph_tag.into(),
            coref_field: coref_field.into(),
        }
    }

    /// Whether the token carries any coreference markers
    pub fn has_coref(&self) -> bool {
        self.coref_field != "-"
    }
}

// ============================================================================
// Evaluation Settings
// ============================================================================

/// Named subset of pronoun forms under evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Setting {
    #[default]
    All,
    Fem,
    Masc,
    /// Gender-indefinite forms
    Gi,
}

impl Setting {
    /// Every setting, in reporting order
    pub const ALL: [Setting; 4] = [Self::All, Self::Fem, Self::Masc, Self::Gi];

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Fem => "fem",
            Self::Masc => "masc",
            Self::Gi => "gi",
        }
    }
}

impl std::fmt::Display for Setting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Setting {
    type Err = PronscoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "fem" => Ok(Self::Fem),
            "masc" => Ok(Self::Masc),
            "gi" => Ok(Self::Gi),
            _ => Err(PronscoreError::UnknownSetting(s.to_string())),
        }
    }
}

/// How re-opened cluster ids are tracked during reconstruction
///
/// - `Overwrite`: one open position per id; opening an id that is still
///   open replaces the earlier position. Matches the numbers produced by
///   existing gold-standard evaluations.
/// - `Nested`: a stack of open positions per id; closes pair with the most
///   recent open of the same id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackMode {
    #[default]
    Overwrite,
    Nested,
}

impl std::fmt::Display for StackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overwrite => write!(f, "overwrite"),
            Self::Nested => write!(f, "nested"),
        }
    }
}

impl std::str::FromStr for StackMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "nested" => Ok(Self::Nested),
            _ => Err(ConfigError::InvalidValue {
                key: "stack_mode".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
