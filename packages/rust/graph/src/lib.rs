//! Crate loading and reference resolution.
//!
//! A crate is a directory whose `ro-crate-metadata.json` holds a JSON-LD
//! `@graph`. Entities reference each other only by `@id`; this crate keeps
//! them in an identifier-keyed arena ([`EntityGraph`]) and resolves
//! references with explicit lookups instead of building an object graph.

pub mod entity;
pub mod loader;
pub mod resolve;

pub use entity::{Entity, EntityGraph};
pub use loader::{CrateInput, RoCrate, load_entities, read_graph, resolve_crate};
pub use resolve::{
    ExampleIndex, build_example_index, entity_summary, has_url_scheme, normalize_ids,
    require_entity, resolve_entity_path,
};
