//! Step records and notebook crate structures produced by the step builder.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crateprov_graph::Entity;
use crateprov_shared::EntitySummary;

/// Step identifier → step record, in workflow position order.
pub type StepMap = IndexMap<String, StepRecord>;

/// Which side of a step's data flow is being described.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoKind {
    Inputs,
    Outputs,
}

impl IoKind {
    /// Title-cased plural, as used in summaries ("Inputs").
    pub fn title(self) -> &'static str {
        match self {
            Self::Inputs => "Inputs",
            Self::Outputs => "Outputs",
        }
    }

    /// Singular lower-case label, as used in prompt payloads ("input").
    pub fn singular(self) -> &'static str {
        match self {
            Self::Inputs => "input",
            Self::Outputs => "output",
        }
    }
}

// ---------------------------------------------------------------------------
// Linked files
// ---------------------------------------------------------------------------

/// A parameter together with the concrete files that exemplify it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedParameter {
    pub parameter: String,
    pub files: Vec<EntitySummary>,
}

/// Linked files of a step; only parameters with at least one file appear.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkedFiles {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<LinkedParameter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<LinkedParameter>,
}

impl LinkedFiles {
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty()
    }

    pub fn entries(&self, kind: IoKind) -> &[LinkedParameter] {
        match kind {
            IoKind::Inputs => &self.inputs,
            IoKind::Outputs => &self.outputs,
        }
    }
}

// ---------------------------------------------------------------------------
// Notebook crate
// ---------------------------------------------------------------------------

/// `@id` + `name` pair of a notebook crate entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeRef {
    #[serde(rename = "@id")]
    pub id: Option<String>,
    pub name: Option<String>,
}

/// The notebook crate's main entity and its own references.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MainEntityRef {
    #[serde(rename = "@id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub input: Vec<String>,
    pub output: Vec<String>,
    pub step_ids: Vec<String>,
}

/// A work-example file inlined into a notebook cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkExample {
    #[serde(rename = "@id")]
    pub id: String,
    pub path: String,
    /// File text; absent when the file could not be read or decoded.
    pub content: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub content_truncated: bool,
}

/// One cell (sub-step) of a notebook crate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotebookCell {
    #[serde(rename = "@id")]
    pub id: String,
    pub name: Option<String>,
    pub position: Option<i64>,
    #[serde(rename = "workExample")]
    pub work_example: Option<WorkExample>,
}

/// Summary of the notebook crate a step declares as its example.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotebookCrate {
    /// Absolute path of the notebook crate's manifest.
    pub path: String,
    pub dataset: NodeRef,
    pub main_entity: MainEntityRef,
    /// Cells ordered by position; cells without a position come last.
    pub steps: Vec<NotebookCell>,
}

// ---------------------------------------------------------------------------
// Step record
// ---------------------------------------------------------------------------

/// Everything known about one workflow step after building.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub types: Vec<String>,
    pub name: Option<String>,
    pub position: i64,
    /// Absolute path of the step's notebook file.
    pub notebook: String,
    pub input: Vec<String>,
    pub output: Vec<String>,
    #[serde(rename = "programmingLanguage", skip_serializing_if = "Option::is_none")]
    pub programming_language: Option<Value>,
    #[serde(rename = "codeRepository", skip_serializing_if = "Option::is_none")]
    pub code_repository: Option<String>,
    #[serde(rename = "encodingFormat", skip_serializing_if = "Option::is_none")]
    pub encoding_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notebook_crate: Option<NotebookCrate>,
    pub inputs_detail: Vec<EntitySummary>,
    pub outputs_detail: Vec<EntitySummary>,
    pub linked_files: LinkedFiles,
    /// The step entity exactly as loaded.
    pub properties: Entity,
}

impl StepRecord {
    pub fn details(&self, kind: IoKind) -> &[EntitySummary] {
        match kind {
            IoKind::Inputs => &self.inputs_detail,
            IoKind::Outputs => &self.outputs_detail,
        }
    }
}
