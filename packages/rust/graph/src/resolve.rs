//! Reference resolution: identifier normalisation, entity lookup, on-disk
//! path resolution, and the reverse "is example of" index.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crateprov_shared::values::reference_id;
use crateprov_shared::{EntitySummary, ProvenanceError, Result, resolve_path};

use crate::entity::{Entity, EntityGraph};

/// Parameter identifier → summaries of the files that exemplify it.
pub type ExampleIndex = IndexMap<String, Vec<EntitySummary>>;

/// Normalise a JSON-LD reference field into identifiers.
///
/// A single `{"@id": ...}` object yields one identifier, a list yields the
/// identifiers of its reference objects (other items are skipped), and any
/// other value yields nothing.
pub fn normalize_ids(value: &Value) -> Vec<String> {
    match value {
        Value::Object(_) => reference_id(value).map(String::from).into_iter().collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(reference_id)
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// Fetch an entity that must exist.
pub fn require_entity<'a>(graph: &'a EntityGraph, id: &str) -> Result<&'a Entity> {
    graph
        .get(id)
        .ok_or_else(|| ProvenanceError::not_found("entity", format!("'{id}' in crate")))
}

/// Whether a string starts with a URL scheme (`https:`, `arcp:`, ...).
///
/// Single-letter schemes are treated as Windows drive letters, not URLs.
pub fn has_url_scheme(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| url.scheme().len() > 1)
}

fn is_web_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Find an entity's file on disk.
///
/// Candidates, in order: the `source` property, a local `contentUrl`/`url`
/// joined to the crate root, and the identifier itself as a root-relative
/// path. The first existing candidate wins; `None` is an expected outcome.
pub fn resolve_entity_path(entity: &Entity, root: &Path) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();

    if let Some(source) = entity.str_prop("source") {
        candidates.push(PathBuf::from(source));
    }

    if let Some(content_url) = entity.str_prop("contentUrl").or_else(|| entity.str_prop("url")) {
        if !is_web_url(content_url) {
            candidates.push(root.join(content_url));
        }
    }

    if let Some(id) = entity.id() {
        if !id.starts_with('#') && !has_url_scheme(id) {
            candidates.push(root.join(id));
        }
    }

    candidates
        .into_iter()
        .find(|candidate| candidate.exists())
        .map(|candidate| resolve_path(&candidate))
}

/// Summarise an entity for parameter details and linked-file listings.
///
/// A missing or empty entity degrades to an empty summary.
pub fn entity_summary(entity: Option<&Entity>, root: &Path) -> EntitySummary {
    let Some(entity) = entity.filter(|e| !e.properties().is_empty()) else {
        return EntitySummary::default();
    };

    let path = resolve_entity_path(entity, root);
    if path.is_none() {
        debug!(id = entity.id().unwrap_or("-"), "no local file for entity");
    }

    EntitySummary {
        id: entity.id().filter(|id| !id.is_empty()).map(String::from),
        name: entity.str_prop("name").map(String::from),
        types: entity.types(),
        description: entity.str_prop("description").map(String::from),
        encoding_format: entity
            .str_prop("encodingFormat")
            .or_else(|| entity.get("encodingFormat").and_then(reference_id))
            .map(String::from),
        sha256: entity.str_prop("sha256").map(String::from),
        content_size: entity
            .text_prop("size")
            .or_else(|| entity.text_prop("contentSize")),
        url: entity
            .str_prop("contentUrl")
            .or_else(|| entity.str_prop("url"))
            .map(String::from),
        path: path.map(|p| p.to_string_lossy().into_owned()),
    }
}

/// Build the reverse index from parameter identifiers to the entities whose
/// `exampleOfWork` points at them, scanning every entity once.
#[instrument(skip_all, fields(entities = graph.len()))]
pub fn build_example_index(graph: &EntityGraph, root: &Path) -> ExampleIndex {
    let mut index = ExampleIndex::new();

    for entity in graph.entities() {
        let Some(example) = entity.get("exampleOfWork") else {
            continue;
        };
        let targets = normalize_ids(example);
        if targets.is_empty() {
            continue;
        }
        let summary = entity_summary(Some(entity), root);
        for target in targets {
            index.entry(target).or_default().push(summary.clone());
        }
    }

    debug!(parameters = index.len(), "example index built");
    index
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "crateprov-resolve-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn entity(value: Value) -> Entity {
        Entity::new(value.as_object().cloned().unwrap())
    }

    #[test]
    fn normalize_single_list_and_other() {
        assert_eq!(normalize_ids(&json!({"@id": "#a"})), vec!["#a"]);
        assert_eq!(
            normalize_ids(&json!([{"@id": "#a"}, "#b", 3, {"name": "x"}, {"@id": "#c"}])),
            vec!["#a", "#c"]
        );
        assert!(normalize_ids(&json!("#a")).is_empty());
        assert!(normalize_ids(&json!(null)).is_empty());
        assert!(normalize_ids(&json!({"name": "no id"})).is_empty());
    }

    #[test]
    fn require_entity_missing() {
        let graph = EntityGraph::from_items(&[json!({"@id": "a"})]);
        assert!(require_entity(&graph, "a").is_ok());
        let err = require_entity(&graph, "b").unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("'b'"));
    }

    #[test]
    fn url_schemes() {
        assert!(has_url_scheme("https://example.org/a"));
        assert!(has_url_scheme("arcp://uuid,abc/"));
        assert!(!has_url_scheme("data/a.csv"));
        assert!(!has_url_scheme("#param"));
        assert!(!has_url_scheme("E2.2-wms"));
    }

    #[test]
    fn entity_path_candidates() {
        let tmp = temp_dir();
        std::fs::create_dir_all(tmp.join("data")).unwrap();
        std::fs::write(tmp.join("data/a.csv"), "x").unwrap();
        std::fs::write(tmp.join("b.csv"), "y").unwrap();

        let by_id = entity(json!({"@id": "data/a.csv"}));
        assert_eq!(
            resolve_entity_path(&by_id, &tmp),
            Some(tmp.join("data/a.csv").canonicalize().unwrap())
        );

        let by_content_url = entity(json!({"@id": "#file", "contentUrl": "b.csv"}));
        assert_eq!(
            resolve_entity_path(&by_content_url, &tmp),
            Some(tmp.join("b.csv").canonicalize().unwrap())
        );

        let web_only = entity(json!({"@id": "https://example.org/a.csv", "url": "https://example.org/a.csv"}));
        assert_eq!(resolve_entity_path(&web_only, &tmp), None);

        let fragment = entity(json!({"@id": "#param"}));
        assert_eq!(resolve_entity_path(&fragment, &tmp), None);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn summary_of_missing_entity_is_empty() {
        let tmp = temp_dir();
        assert!(entity_summary(None, &tmp).is_empty());
        assert!(entity_summary(Some(&Entity::default()), &tmp).is_empty());
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn summary_drops_blank_fields() {
        let tmp = temp_dir();
        let e = entity(json!({
            "@id": "#param",
            "@type": ["FormalParameter"],
            "name": "shorelines",
            "description": "",
            "contentSize": 1024,
            "url": "https://example.org/shorelines.geojson",
        }));
        let summary = entity_summary(Some(&e), &tmp);
        assert_eq!(summary.name.as_deref(), Some("shorelines"));
        assert_eq!(summary.description, None);
        assert_eq!(summary.content_size.as_deref(), Some("1024"));
        assert_eq!(summary.path, None);
        assert_eq!(summary.types, vec!["FormalParameter"]);
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn example_index_groups_by_parameter_in_document_order() {
        let tmp = temp_dir();
        let graph = EntityGraph::from_items(&[
            json!({"@id": "#p1", "name": "param one"}),
            json!({"@id": "f1.csv", "name": "f1", "exampleOfWork": {"@id": "#p1"}}),
            json!({"@id": "f2.csv", "name": "f2", "exampleOfWork": [{"@id": "#p1"}, {"@id": "#p2"}]}),
            json!({"@id": "f3.csv", "exampleOfWork": "#p1"}),
        ]);
        let index = build_example_index(&graph, &tmp);
        let names: Vec<_> = index["#p1"].iter().map(|s| s.name.clone().unwrap()).collect();
        assert_eq!(names, vec!["f1", "f2"]);
        assert_eq!(index["#p2"].len(), 1);
        assert_eq!(index.len(), 2);
        let _ = std::fs::remove_dir_all(&tmp);
    }
}
