//! Core domain types shared by the loader, resolver, and summary stages.

use serde::{Deserialize, Serialize};

/// File name of the JSON-LD manifest at the root of every crate.
pub const MANIFEST_FILE_NAME: &str = "ro-crate-metadata.json";

/// Identifier of a crate's root dataset entity.
pub const ROOT_DATASET_ID: &str = "./";

/// Byte cap for work-example content inlined into notebook cells.
pub const MAX_INLINE_BYTES: usize = 20_000;

/// Default cap for markdown link lists.
pub const DEFAULT_LINK_LIMIT: usize = 5;

/// Crate directory used when none is supplied.
pub const DEFAULT_CRATE_DIR: &str = "interface.crate";

/// Interface entity used when none is supplied.
pub const DEFAULT_INTERFACE_ID: &str = "E2.2-wms";

// ---------------------------------------------------------------------------
// EntitySummary
// ---------------------------------------------------------------------------

/// Read-only digest of a referenced entity: a parameter detail or a linked file.
///
/// Blank properties are never stored, so an entity that resolves to nothing
/// real degrades to an empty summary (plus whatever `id` the caller asked for).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Type labels (`@type`), always as a list.
    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "encodingFormat", default, skip_serializing_if = "Option::is_none")]
    pub encoding_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(rename = "contentSize", default, skip_serializing_if = "Option::is_none")]
    pub content_size: Option<String>,
    /// Remote or crate-relative location (`contentUrl`, else `url`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Absolute local path, present only when the file exists on disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl EntitySummary {
    /// Whether no property survived cleaning.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Force the identifier, as parameter details always carry the requested id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Name, falling back to the identifier.
    pub fn label(&self) -> Option<&str> {
        self.name.as_deref().or(self.id.as_deref())
    }

    /// Where the entity can be found: its URL, else its local path.
    pub fn location(&self) -> Option<&str> {
        self.url.as_deref().or(self.path.as_deref())
    }

    /// A URL suitable for readers outside this machine: the `url`, or an
    /// identifier that is itself an `http(s)` URL.
    pub fn web_url(&self) -> Option<&str> {
        self.url.as_deref().or_else(|| {
            self.id
                .as_deref()
                .filter(|id| id.starts_with("http://") || id.starts_with("https://"))
        })
    }
}
