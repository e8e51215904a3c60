//! Notebook crate summarisation with inlined cell content.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crateprov_graph::{Entity, read_graph};
use crateprov_markdown::{decode_dropping_invalid, shorten, to_uri};
use crateprov_shared::values::{non_empty, parse_position, reference_id};
use crateprov_shared::{MANIFEST_FILE_NAME, ProvenanceError, ROOT_DATASET_ID, Result, resolve_path};

use crate::model::{MainEntityRef, NodeRef, NotebookCell, NotebookCrate, WorkExample};

/// Text of a work-example file, capped at a byte limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineContent {
    pub text: Option<String>,
    pub truncated: bool,
}

/// Read a file as UTF-8 for inlining.
///
/// Content longer than `cap` bytes is cut to the longest prefix that ends on
/// a character boundary and flagged as truncated. Unreadable or non-UTF-8
/// files yield no text rather than an error.
pub fn read_inline_content(path: &Path, cap: usize) -> InlineContent {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "work example unreadable, inlining nothing");
            return InlineContent::default();
        }
    };

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "work example is not UTF-8, inlining nothing");
            return InlineContent::default();
        }
    };

    if text.len() <= cap {
        return InlineContent {
            text: Some(text),
            truncated: false,
        };
    }

    let mut end = cap;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    debug!(path = %path.display(), bytes = text.len(), cap, "work example truncated");
    InlineContent {
        text: Some(text[..end].to_string()),
        truncated: true,
    }
}

/// Load the notebook crate a step points at through `exampleOfWork`.
///
/// The reference names the notebook crate's manifest relative to the root
/// crate (a directory reference gets the manifest file name appended). Cells
/// are the main entity's `step` references; each cell's `workExample` file is
/// resolved next to the manifest and must exist.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn summarise_notebook(root: &Path, example_ref: &Value, inline_cap: usize) -> Result<NotebookCrate> {
    let crate_id = non_empty(reference_id(example_ref))
        .ok_or_else(|| ProvenanceError::validation("exampleOfWork is missing an '@id'"))?;

    let mut manifest = resolve_path(&root.join(crate_id));
    if manifest.is_dir() {
        manifest = manifest.join(MANIFEST_FILE_NAME);
    }
    if !manifest.exists() {
        return Err(ProvenanceError::not_found("notebook crate", manifest.display()));
    }

    let graph = read_graph(&manifest)?;
    let base = manifest.parent().unwrap_or(root);

    let dataset = graph.get(ROOT_DATASET_ID);
    let main_entity = dataset
        .and_then(|d| d.get("mainEntity"))
        .and_then(reference_id)
        .and_then(|id| graph.get(id));

    let step_ids = main_entity.map(|e| e.refs("step")).unwrap_or_default();
    let mut cells = Vec::with_capacity(step_ids.len());
    for step_id in &step_ids {
        let cell = graph.get(step_id);
        let work_example = match cell.and_then(work_example_id) {
            Some(work_id) => Some(inline_work_example(base, work_id, crate_id, inline_cap)?),
            None => None,
        };
        cells.push(NotebookCell {
            id: cell.and_then(Entity::id).unwrap_or(step_id.as_str()).to_string(),
            name: cell.and_then(|c| c.str_prop("name")).map(String::from),
            position: cell.and_then(|c| c.get("position")).and_then(parse_position),
            work_example,
        });
    }

    cells.sort_by_key(|cell| (cell.position.is_none(), cell.position));

    debug!(
        manifest = %manifest.display(),
        cells = cells.len(),
        "notebook crate summarised"
    );

    Ok(NotebookCrate {
        path: manifest.to_string_lossy().into_owned(),
        dataset: NodeRef {
            id: dataset.and_then(Entity::id).map(String::from),
            name: dataset.and_then(|d| d.str_prop("name")).map(String::from),
        },
        main_entity: MainEntityRef {
            id: main_entity.and_then(Entity::id).map(String::from),
            name: main_entity.and_then(|e| e.str_prop("name")).map(String::from),
            input: main_entity.map(|e| e.refs("input")).unwrap_or_default(),
            output: main_entity.map(|e| e.refs("output")).unwrap_or_default(),
            step_ids,
        },
        steps: cells,
    })
}

/// `workExample` as a reference object or a bare identifier string.
fn work_example_id(cell: &Entity) -> Option<&str> {
    let id = match cell.get("workExample")? {
        Value::String(id) => Some(id.as_str()),
        value @ Value::Object(_) => reference_id(value),
        _ => None,
    };
    non_empty(id)
}

fn inline_work_example(base: &Path, work_id: &str, crate_id: &str, cap: usize) -> Result<WorkExample> {
    let path = resolve_path(&base.join(work_id));
    if !path.exists() {
        return Err(ProvenanceError::not_found(
            "work example",
            format!("'{work_id}' for notebook crate {crate_id}"),
        ));
    }
    let content = read_inline_content(&path, cap);
    Ok(WorkExample {
        id: work_id.to_string(),
        path: path.to_string_lossy().into_owned(),
        content: content.text,
        content_truncated: content.truncated,
    })
}

/// Cells shown in a step's notebook summary.
pub const SUMMARY_CELLS: usize = 6;
const PREVIEW_WIDTH: usize = 200;

/// One notebook cell as presented in step views.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NotebookCellSummary {
    pub position: Option<i64>,
    pub name: Option<String>,
    pub content: Option<String>,
    pub content_truncated: bool,
    pub path: Option<String>,
    pub uri: Option<String>,
    pub preview: String,
}

impl NotebookCellSummary {
    /// The cell name, or `Cell N` from its position.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("Cell {}", position_label(self.position)),
        }
    }
}

/// Cell position for display; unknown positions render as `?`.
pub fn position_label(position: Option<i64>) -> String {
    position.map_or_else(|| "?".to_string(), |p| p.to_string())
}

/// Summaries of the first [`SUMMARY_CELLS`] cells of a notebook crate.
///
/// Cells without inlined content fall back to a lossy read of their file.
pub fn build_notebook_summary(notebook: Option<&NotebookCrate>) -> Vec<NotebookCellSummary> {
    let Some(notebook) = notebook else {
        return Vec::new();
    };

    notebook
        .steps
        .iter()
        .take(SUMMARY_CELLS)
        .map(|cell| {
            let work = cell.work_example.as_ref();
            let path = work.map(|w| w.path.clone());
            let content = work
                .and_then(|w| w.content.clone())
                .or_else(|| path.as_deref().and_then(read_lossy));

            let preview = content
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(|text| shorten(text, PREVIEW_WIDTH, "…"))
                .unwrap_or_default();

            NotebookCellSummary {
                position: cell.position,
                name: cell.name.clone(),
                content_truncated: work.is_some_and(|w| w.content_truncated),
                uri: path.as_deref().and_then(to_uri),
                path,
                content,
                preview,
            }
        })
        .collect()
}

fn read_lossy(path: &str) -> Option<String> {
    match std::fs::read(path) {
        Ok(bytes) => Some(decode_dropping_invalid(&bytes)),
        Err(e) => {
            debug!(path, error = %e, "cell file unreadable, no preview");
            None
        }
    }
}
