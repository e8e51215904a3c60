//! Per-parameter overviews combining details, linked files and notebook cells.

use std::collections::HashMap;

use serde::Serialize;

use crateprov_markdown::{make_markdown_link, make_prompt_link, more_marker};
use crateprov_shared::EntitySummary;

use crate::lineage::{LineageFile, MAX_SAMPLE_FILES, format_lineage_file};
use crate::model::LinkedParameter;
use crate::notebook::NotebookCellSummary;

/// Placeholder shown for missing identifiers, formats and descriptions.
pub const PLACEHOLDER: &str = "–";

pub const TRANSIENT_NOTE: &str = "No linked files are referenced for this parameter; \
                                  the crate may not capture intermediate artefacts.";
pub const TRANSIENT_ANNOTATION: &str = "No linked files recorded (likely transient artefact).";

/// Everything known about one input or output parameter of a step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IoOverview {
    pub parameter: String,
    pub name: String,
    pub format: String,
    pub description: String,
    pub primary_link: String,
    pub prompt_link: String,
    pub files_annotation: String,
    pub total_files: usize,
    pub sample_files: Vec<LineageFile>,
    pub prompt_example_links: Vec<String>,
    pub remaining_files: usize,
    /// Set when no file in the crate instantiates the parameter.
    pub transient_note: Option<String>,
    /// Labels of notebook cells whose code mentions the parameter.
    pub cell_refs: Vec<String>,
}

pub fn build_io_overview(
    details: &[EntitySummary],
    linked_entries: &[LinkedParameter],
    notebook_cells: &[NotebookCellSummary],
) -> Vec<IoOverview> {
    let linked: HashMap<&str, &LinkedParameter> = linked_entries
        .iter()
        .map(|entry| (entry.parameter.as_str(), entry))
        .collect();

    details
        .iter()
        .map(|detail| {
            let parameter = detail.id.clone().unwrap_or_else(|| PLACEHOLDER.to_string());
            let name = detail.name.clone().unwrap_or_else(|| parameter.clone());

            let web_url = detail.web_url();
            let source_url = web_url.or(detail.path.as_deref());

            let files: &[EntitySummary] = linked
                .get(parameter.as_str())
                .map(|entry| entry.files.as_slice())
                .unwrap_or_default();
            let sample_files: Vec<LineageFile> = files
                .iter()
                .take(MAX_SAMPLE_FILES)
                .map(|file| format_lineage_file(file, &parameter))
                .collect();
            let remaining_files = files.len() - sample_files.len();

            let prompt_example_links = sample_files
                .iter()
                .filter(|file| file.prompt_link != file.name)
                .map(|file| file.prompt_link.clone())
                .collect();

            let (files_annotation, transient_note) = if sample_files.is_empty() {
                (
                    TRANSIENT_ANNOTATION.to_string(),
                    Some(TRANSIENT_NOTE.to_string()),
                )
            } else {
                let mut links: Vec<String> =
                    sample_files.iter().map(|file| file.link.clone()).collect();
                if remaining_files > 0 {
                    links.push(more_marker(remaining_files));
                }
                (format!("Examples: {}", links.join("; ")), None)
            };

            IoOverview {
                primary_link: make_markdown_link(Some(&name), source_url),
                prompt_link: make_prompt_link(Some(&name), web_url),
                cell_refs: cell_refs(notebook_cells, &[&parameter, &name]),
                format: detail
                    .encoding_format
                    .clone()
                    .unwrap_or_else(|| PLACEHOLDER.to_string()),
                description: detail
                    .description
                    .clone()
                    .unwrap_or_else(|| PLACEHOLDER.to_string()),
                total_files: files.len(),
                parameter,
                name,
                files_annotation,
                sample_files,
                prompt_example_links,
                remaining_files,
                transient_note,
            }
        })
        .collect()
}

/// Cells whose content mentions any of the terms as a substring.
fn cell_refs(cells: &[NotebookCellSummary], terms: &[&str]) -> Vec<String> {
    let mut refs: Vec<String> = Vec::new();
    for cell in cells {
        let Some(content) = cell.content.as_deref().filter(|c| !c.is_empty()) else {
            continue;
        };
        if !terms.iter().any(|term| !term.is_empty() && content.contains(term)) {
            continue;
        }
        let label = match (&cell.name, cell.position) {
            (Some(name), _) => name.clone(),
            (None, Some(position)) => format!("Code cell {position}"),
            (None, None) => continue,
        };
        if !refs.contains(&label) {
            refs.push(label);
        }
    }
    refs
}
