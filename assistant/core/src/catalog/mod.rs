//! Catalog Store
//!
//! The immutable table of scripted interactions the assistant can reproduce.
//! Each [`CatalogEntry`] maps one or more canonical question keys (plus an
//! optional list of looser "variation" phrasings) to exactly one
//! [`Response`]. The catalog also carries the fallback response and the
//! ordered list of suggested prompts surfaces offer as quick actions.
//!
//! # Loading
//!
//! - [`Catalog::builtin`]: the compiled-in OrgBot catalog
//! - [`Catalog::from_toml_str`] / [`Catalog::load`]: a versioned TOML table
//!
//! ```toml
//! version = 1
//! prompts = ["Check for public S3 buckets"]
//!
//! [default]
//! text = "I'm sorry, I don't have information about that topic yet."
//! code = ""
//!
//! [[entry]]
//! keys = ["Check for public S3 buckets"]
//! text = "To check for public S3 buckets ... Would you like to see a sample script?"
//! code = "aws s3api list-buckets"
//! ```
//!
//! The catalog is loaded once at start-up and shared read-only (behind an
//! `Arc`) with the resolver for the rest of the session.

mod builtin;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalize::strict_key;
use crate::transcript::Sender;

/// Catalog file format version understood by this build
pub const CATALOG_VERSION: u32 = 1;

/// Errors that can occur while building or loading a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Failed to read the catalog file
    #[error("Failed to read catalog file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse catalog TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The file declares a version this build does not understand
    #[error("Unsupported catalog version {found} (expected {})", CATALOG_VERSION)]
    UnsupportedVersion {
        /// Version declared by the file
        found: u32,
    },

    /// An entry was declared without any question keys
    #[error("Catalog entry #{index} has no keys")]
    NoKeys {
        /// Position of the entry in declaration order
        index: usize,
    },

    /// A key normalizes to the empty string and could never match
    #[error("Catalog entry '{title}' has a key that normalizes to nothing")]
    EmptyKey {
        /// Title of the offending entry
        title: String,
    },

    /// Two entries claim the same normalized key
    #[error("Catalog key '{key}' is registered by more than one entry")]
    DuplicateKey {
        /// The normalized key
        key: String,
    },
}

/// One scripted reply
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Display text
    pub text: String,
    /// Code sample (empty when the reply has none)
    #[serde(default)]
    pub code: String,
    /// Always [`Sender::Bot`] for catalog responses
    pub sender: Sender,
}

impl Response {
    /// Create a bot response
    pub fn bot(text: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: code.into(),
            sender: Sender::Bot,
        }
    }

    /// Whether the response carries a non-blank code sample
    #[must_use]
    pub fn has_code(&self) -> bool {
        !self.code.trim().is_empty()
    }
}

/// A scripted interaction: question keys, variations and their response
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Display title (used for code-panel tabs)
    pub title: String,
    /// Strict-normalized question keys
    pub keys: Vec<String>,
    /// Strict-normalized phrasings matched by substring containment
    pub variations: Vec<String>,
    /// The reply
    pub response: Response,
}

/// Declaration of an entry before normalization and validation
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EntrySpec {
    /// Display title; defaults to the first key as written
    #[serde(default)]
    pub title: Option<String>,
    /// Question keys as written
    pub keys: Vec<String>,
    /// Looser phrasings matched by containment
    #[serde(default)]
    pub variations: Vec<String>,
    /// Reply text
    pub text: String,
    /// Reply code sample
    #[serde(default)]
    pub code: String,
}

impl EntrySpec {
    /// Create an entry declaration with a single key
    pub fn new(key: impl Into<String>, text: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            title: None,
            keys: vec![key.into()],
            variations: Vec::new(),
            text: text.into(),
            code: code.into(),
        }
    }

    /// Add another question key
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.keys.push(key.into());
        self
    }

    /// Add variation phrasings
    #[must_use]
    pub fn with_variations<I, S>(mut self, variations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variations.extend(variations.into_iter().map(Into::into));
        self
    }

    /// Override the display title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Builder for [`Catalog`]
#[derive(Clone, Debug)]
pub struct CatalogBuilder {
    version: u32,
    entries: Vec<EntrySpec>,
    default: Response,
    prompts: Vec<String>,
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self {
            version: CATALOG_VERSION,
            entries: Vec::new(),
            default: Response::bot(builtin::DEFAULT_TEXT, builtin::DEFAULT_CODE),
            prompts: Vec::new(),
        }
    }
}

impl CatalogBuilder {
    /// Add an entry
    #[must_use]
    pub fn entry(mut self, spec: EntrySpec) -> Self {
        self.entries.push(spec);
        self
    }

    /// Set the fallback response
    #[must_use]
    pub fn default_response(mut self, response: Response) -> Self {
        self.default = response;
        self
    }

    /// Add a suggested prompt
    #[must_use]
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompts.push(prompt.into());
        self
    }

    /// Validate and build the catalog
    ///
    /// # Errors
    ///
    /// Returns an error for an unsupported version, an entry without keys,
    /// a key that normalizes to nothing, or a key claimed by two entries.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        if self.version != CATALOG_VERSION {
            return Err(CatalogError::UnsupportedVersion {
                found: self.version,
            });
        }

        let mut entries = Vec::with_capacity(self.entries.len());
        let mut index = HashMap::new();

        for (position, spec) in self.entries.into_iter().enumerate() {
            let entry = normalize_entry(position, spec)?;
            for key in &entry.keys {
                if index.insert(key.clone(), position).is_some() {
                    return Err(CatalogError::DuplicateKey { key: key.clone() });
                }
            }
            entries.push(entry);
        }

        Ok(Catalog {
            version: self.version,
            entries,
            index,
            default: self.default,
            prompts: self.prompts,
        })
    }
}

fn normalize_entry(position: usize, spec: EntrySpec) -> Result<CatalogEntry, CatalogError> {
    let Some(first_key) = spec.keys.first() else {
        return Err(CatalogError::NoKeys { index: position });
    };
    let title = spec.title.clone().unwrap_or_else(|| first_key.clone());

    let mut keys = Vec::with_capacity(spec.keys.len());
    for raw in &spec.keys {
        let key = strict_key(raw);
        if key.is_empty() {
            return Err(CatalogError::EmptyKey { title });
        }
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    let variations = spec
        .variations
        .iter()
        .map(|v| strict_key(v))
        .filter(|v| !v.is_empty())
        .collect();

    Ok(CatalogEntry {
        title,
        keys,
        variations,
        response: Response::bot(spec.text, spec.code),
    })
}

/// On-disk catalog layout
#[derive(Debug, Deserialize)]
struct CatalogFile {
    version: u32,
    #[serde(default)]
    prompts: Vec<String>,
    default: DefaultFile,
    #[serde(default, rename = "entry")]
    entries: Vec<EntrySpec>,
}

#[derive(Debug, Deserialize)]
struct DefaultFile {
    text: String,
    #[serde(default)]
    code: String,
}

/// The read-only scripted-interaction table
#[derive(Clone, Debug)]
pub struct Catalog {
    version: u32,
    entries: Vec<CatalogEntry>,
    /// Strict key -> position in `entries`
    index: HashMap<String, usize>,
    default: Response,
    prompts: Vec<String>,
}

impl Catalog {
    /// Start building a catalog
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// The compiled-in OrgBot catalog
    #[must_use]
    pub fn builtin() -> Self {
        builtin::catalog()
    }

    /// Parse a catalog from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;

        let mut builder = CatalogBuilder {
            version: file.version,
            ..CatalogBuilder::default()
        }
        .default_response(Response::bot(file.default.text, file.default.code));

        for prompt in file.prompts {
            builder = builder.prompt(prompt);
        }
        for spec in file.entries {
            builder = builder.entry(spec);
        }

        builder.build()
    }

    /// Load a catalog from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let catalog = Self::from_toml_str(&content)?;

        tracing::info!(
            path = %path.display(),
            entries = catalog.len(),
            "Loaded catalog from file"
        );
        Ok(catalog)
    }

    /// Look up an entry by strict-normalized key
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&CatalogEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    /// First entry with a variation contained in `key`
    #[must_use]
    pub fn find_variation(&self, key: &str) -> Option<&CatalogEntry> {
        if key.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|entry| entry.variations.iter().any(|v| key.contains(v.as_str())))
    }

    /// All entries in declaration order
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    /// The fallback response
    #[must_use]
    pub fn default_response(&self) -> &Response {
        &self.default
    }

    /// Suggested prompts in display order
    #[must_use]
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Catalog format version
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
