//! Throw-away crates on disk for tests.

use std::path::{Path, PathBuf};

use serde_json::{Value, json};

use crateprov_shared::MANIFEST_FILE_NAME;

/// A crate directory under the system temp dir, removed on drop.
pub(crate) struct TempCrate {
    root: PathBuf,
}

impl TempCrate {
    pub(crate) fn new() -> Self {
        let root = std::env::temp_dir()
            .join(format!("crateprov-core-test-{}", uuid::Uuid::now_v7()))
            .join("interface.crate");
        std::fs::create_dir_all(&root).unwrap();
        Self {
            root: root.canonicalize().unwrap(),
        }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    /// Write the root manifest with the given `@graph` items.
    pub(crate) fn manifest(&self, graph: Vec<Value>) -> &Self {
        self.write_manifest(MANIFEST_FILE_NAME, graph);
        self
    }

    /// Write a manifest at a crate-relative path.
    pub(crate) fn write_manifest(&self, relative: &str, graph: Vec<Value>) -> PathBuf {
        let document = json!({"@context": "https://w3id.org/ro/crate/1.1/context", "@graph": graph});
        self.write(relative, serde_json::to_vec_pretty(&document).unwrap())
    }

    /// Write a file at a crate-relative path, creating parent directories.
    pub(crate) fn write(&self, relative: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }
}

impl Drop for TempCrate {
    fn drop(&mut self) {
        if let Some(parent) = self.root.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }
    }
}

/// Interface → workflow → steps graph; each step gets one input parameter
/// and a notebook file written to disk.
pub(crate) fn simple_workflow(krate: &TempCrate, positions: &[Value]) -> Vec<Value> {
    let step_ids: Vec<String> = (0..positions.len())
        .map(|i| format!("notebooks/step{i}.ipynb"))
        .collect();

    let mut graph = vec![
        json!({"@id": "./", "@type": "Dataset", "hasPart": [{"@id": "E2.2-wms"}]}),
        json!({"@id": "E2.2-wms", "@type": "Dataset", "hasPart": {"@id": "#workflow"}}),
        json!({
            "@id": "#workflow",
            "@type": "ComputationalWorkflow",
            "step": step_ids.iter().map(|id| json!({"@id": id})).collect::<Vec<_>>(),
        }),
    ];

    for (i, (id, position)) in step_ids.iter().zip(positions).enumerate() {
        krate.write(id, "{\"cells\": []}");
        graph.push(json!({
            "@id": id,
            "@type": ["File", "SoftwareSourceCode", "HowToStep"],
            "name": format!("Step {i}"),
            "position": position,
            "input": [{"@id": format!("#param-in-{i}")}],
        }));
        graph.push(json!({
            "@id": format!("#param-in-{i}"),
            "@type": "FormalParameter",
            "name": format!("input {i}"),
        }));
    }

    graph
}

/// A bare step record with no parameters, for summary-level tests.
pub(crate) fn step_record(id: &str, position: i64) -> crate::model::StepRecord {
    crate::model::StepRecord {
        id: id.to_string(),
        types: vec!["HowToStep".to_string()],
        name: None,
        position,
        notebook: format!("/tmp/{id}.ipynb"),
        input: Vec::new(),
        output: Vec::new(),
        programming_language: None,
        code_repository: None,
        encoding_format: None,
        sha256: None,
        notebook_crate: None,
        inputs_detail: Vec::new(),
        outputs_detail: Vec::new(),
        linked_files: crate::model::LinkedFiles::default(),
        properties: crateprov_graph::Entity::default(),
    }
}
