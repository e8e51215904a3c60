//! JSON-LD entities and the identifier-keyed graph that holds them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crateprov_shared::values::{as_text, non_empty};
use crateprov_shared::{ProvenanceError, Result};

use crate::resolve::normalize_ids;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// One record of a crate's `@graph`, kept exactly as loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(Map<String, Value>);

impl Entity {
    pub fn new(properties: Map<String, Value>) -> Self {
        Self(properties)
    }

    /// The `@id`, when it is a string.
    pub fn id(&self) -> Option<&str> {
        self.0.get("@id").and_then(Value::as_str)
    }

    /// Raw property access.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// A non-empty string property.
    pub fn str_prop(&self, key: &str) -> Option<&str> {
        non_empty(self.0.get(key).and_then(Value::as_str))
    }

    /// A string or numeric property rendered as text.
    pub fn text_prop(&self, key: &str) -> Option<String> {
        self.0.get(key).and_then(as_text)
    }

    /// Type labels; a single `@type` string becomes a one-element list.
    pub fn types(&self) -> Vec<String> {
        match self.0.get("@type") {
            Some(Value::String(label)) => vec![label.clone()],
            Some(Value::Array(labels)) => labels
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Identifiers referenced by a property (single object or list of objects).
    pub fn refs(&self, key: &str) -> Vec<String> {
        self.0.get(key).map(normalize_ids).unwrap_or_default()
    }

    /// All properties, including `@id` and `@type`.
    pub fn properties(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Entity {
    fn from(properties: Map<String, Value>) -> Self {
        Self(properties)
    }
}

// ---------------------------------------------------------------------------
// EntityGraph
// ---------------------------------------------------------------------------

/// Identifier → entity arena for one loaded document, in document order.
#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    entities: IndexMap<String, Entity>,
}

impl EntityGraph {
    /// Build a graph from the items of an `@graph` array.
    ///
    /// Entities without a string `@id` are keyed by their index in the array,
    /// which leaves them unreachable by identifier lookup. They are kept so
    /// that whole-graph scans still see them. Non-object items are skipped but
    /// still consume an index. A repeated `@id` keeps its first position and
    /// its last record.
    pub fn from_items(items: &[Value]) -> Self {
        let mut entities = IndexMap::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let Some(properties) = item.as_object() else {
                continue;
            };
            let entity = Entity::new(properties.clone());
            let key = match entity.id() {
                Some(id) => id.to_string(),
                None => {
                    debug!(index, "entity without @id keyed by position");
                    index.to_string()
                }
            };
            entities.insert(key, entity);
        }
        Self { entities }
    }

    /// Build a graph from a whole JSON-LD document.
    ///
    /// A missing `@graph` yields an empty graph; a non-array `@graph` or a
    /// non-object document is a parse error.
    pub fn from_document(document: &Value) -> Result<Self> {
        let root = document
            .as_object()
            .ok_or_else(|| ProvenanceError::parse("JSON-LD document is not an object"))?;
        match root.get("@graph") {
            None => Ok(Self::default()),
            Some(Value::Array(items)) => Ok(Self::from_items(items)),
            Some(_) => Err(ProvenanceError::parse("'@graph' is not an array")),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    /// `(key, entity)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entity)> {
        self.entities.iter().map(|(key, entity)| (key.as_str(), entity))
    }

    /// Entities in document order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
