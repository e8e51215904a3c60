//! Entity graph loading from crate directories and manifests.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crateprov_shared::{MANIFEST_FILE_NAME, ProvenanceError, Result, resolve_path};

use crate::entity::{Entity, EntityGraph};

// ---------------------------------------------------------------------------
// RoCrate
// ---------------------------------------------------------------------------

/// A loaded crate: its root graph plus the location it was read from.
#[derive(Debug, Clone)]
pub struct RoCrate {
    source: Option<PathBuf>,
    graph: EntityGraph,
}

impl RoCrate {
    /// Load the manifest at the root of `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        let graph = load_entities(dir)?;
        Ok(Self {
            source: Some(dir.to_path_buf()),
            graph,
        })
    }

    /// Wrap an already-built graph. `source` may name the crate directory or
    /// its manifest file.
    pub fn from_graph(graph: EntityGraph, source: Option<PathBuf>) -> Self {
        Self { source, graph }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn graph(&self) -> &EntityGraph {
        &self.graph
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.graph.get(id)
    }
}

/// What [`resolve_crate`] accepts: a directory to load, or a loaded crate.
#[derive(Debug, Clone)]
pub enum CrateInput {
    Path(PathBuf),
    Loaded(RoCrate),
}

impl From<PathBuf> for CrateInput {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for CrateInput {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<&str> for CrateInput {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<String> for CrateInput {
    fn from(path: String) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<RoCrate> for CrateInput {
    fn from(rocrate: RoCrate) -> Self {
        Self::Loaded(rocrate)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Resolve a crate input into a loaded crate and its absolute root directory.
///
/// A path must name an existing directory. A loaded crate must expose its
/// source location; a manifest-file source is normalised to its directory.
#[instrument(skip_all)]
pub fn resolve_crate(input: impl Into<CrateInput>) -> Result<(RoCrate, PathBuf)> {
    let (rocrate, root) = match input.into() {
        CrateInput::Path(path) => {
            let root = resolve_path(&path);
            if !root.is_dir() {
                return Err(ProvenanceError::not_found(
                    "crate directory",
                    root.display(),
                ));
            }
            (RoCrate::open(&root)?, root)
        }
        CrateInput::Loaded(rocrate) => {
            let source = rocrate.source().ok_or_else(|| {
                ProvenanceError::validation("provided crate does not expose a source path")
            })?;
            let mut root = resolve_path(source);
            if root.is_file() {
                if let Some(parent) = root.parent() {
                    root = parent.to_path_buf();
                }
            }
            (rocrate, root)
        }
    };

    if !root.exists() {
        return Err(ProvenanceError::not_found("crate path", root.display()));
    }

    debug!(root = %root.display(), entities = rocrate.graph().len(), "crate resolved");
    Ok((rocrate, root))
}

/// Load the root manifest of a crate directory into an entity graph.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn load_entities(root: &Path) -> Result<EntityGraph> {
    let manifest = root.join(MANIFEST_FILE_NAME);
    if !manifest.exists() {
        return Err(ProvenanceError::not_found(
            "root metadata",
            manifest.display(),
        ));
    }
    read_graph(&manifest)
}

/// Read and parse any JSON-LD manifest file into an entity graph.
pub fn read_graph(manifest: &Path) -> Result<EntityGraph> {
    let content =
        std::fs::read_to_string(manifest).map_err(|e| ProvenanceError::io(manifest, e))?;
    let document: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
        ProvenanceError::parse(format!("invalid JSON in {}: {e}", manifest.display()))
    })?;
    let graph = EntityGraph::from_document(&document)?;
    debug!(path = %manifest.display(), entities = graph.len(), "manifest loaded");
    Ok(graph)
}
