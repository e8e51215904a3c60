//! Step views: the document-facing projection of one step record.

use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crateprov_graph::Entity;
use crateprov_markdown::{Datatable, make_markdown_link};
use crateprov_shared::EntitySummary;

use crate::lineage::{LineageTarget, build_lineage_targets};
use crate::model::{LinkedFiles, NotebookCrate, StepRecord};
use crate::notebook::{NotebookCellSummary, build_notebook_summary, position_label};
use crate::overview::{IoOverview, build_io_overview};
use crate::summaries::{StepStats, normalise_language};
use crate::tables::{build_io_table, build_notebook_table, build_step_metadata_table};

/// Shown when a step declares no code repository.
pub const NO_REPOSITORY: &str = "Not specified";

/// Cells quoted in the one-line notebook summary.
const SUMMARY_TEXT_CELLS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepTables {
    pub metadata: Datatable,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Datatable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Datatable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notebook_cells: Option<Datatable>,
}

/// Non-empty link lists keyed by data-flow side.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkLists {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub linked_inputs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub linked_outputs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepView {
    pub id: String,
    pub types: Vec<String>,
    pub name: Option<String>,
    pub position: i64,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub notebook: String,
    #[serde(rename = "codeRepository")]
    pub code_repository_ref: Option<String>,
    #[serde(rename = "programmingLanguage")]
    pub programming_language: Option<Value>,
    #[serde(rename = "encodingFormat")]
    pub encoding_format: Option<String>,
    pub sha256: Option<String>,
    pub notebook_crate: Option<NotebookCrate>,
    pub inputs_detail: Vec<EntitySummary>,
    pub outputs_detail: Vec<EntitySummary>,
    pub inputs_overview: Vec<IoOverview>,
    pub outputs_overview: Vec<IoOverview>,
    pub linked_files: LinkedFiles,
    pub raw: Entity,
    pub language: String,
    pub code_repository: Option<String>,
    pub code_repository_display: String,
    pub stats: StepStats,
    /// Newline-separated facts about the step for text generation.
    pub prompt_context: String,
    pub tables: StepTables,
    pub lineage_targets: Vec<LineageTarget>,
    pub notebook_summary: Vec<NotebookCellSummary>,
    pub notebook_summary_text: String,
    pub notebook_cells: Vec<NotebookCellSummary>,
    pub link_lists: LinkLists,
}

/// Derive every summary, table and link list for one step.
#[instrument(skip_all, fields(step = %step.id))]
pub fn build_step_view(step: &StepRecord, link_limit: usize) -> StepView {
    let language = normalise_language(step.programming_language.as_ref());
    let code_repository = step.code_repository.clone();
    let code_repository_display = code_repository
        .clone()
        .unwrap_or_else(|| NO_REPOSITORY.to_string());

    let stats = StepStats::from_step(step, link_limit);

    let notebook_summary = build_notebook_summary(step.notebook_crate.as_ref());
    let notebook_table = build_notebook_table(&notebook_summary);
    let notebook_summary_text = notebook_summary_text(&notebook_summary);

    let prompt_context = prompt_context(
        step,
        &language,
        &code_repository_display,
        &stats,
        &notebook_summary_text,
        link_limit,
    );

    let inputs_overview = build_io_overview(
        &step.inputs_detail,
        &step.linked_files.inputs,
        &notebook_summary,
    );
    let outputs_overview = build_io_overview(
        &step.outputs_detail,
        &step.linked_files.outputs,
        &notebook_summary,
    );

    let lineage_targets = build_lineage_targets(
        step,
        &step.outputs_detail,
        &language,
        code_repository.as_deref(),
    );

    let tables = StepTables {
        metadata: build_step_metadata_table(
            &step.id,
            step.position,
            &language,
            &code_repository_display,
            &stats,
        ),
        inputs: build_io_table(&inputs_overview),
        outputs: build_io_table(&outputs_overview),
        notebook_cells: notebook_table,
    };

    let notebook_cells = if tables.notebook_cells.is_some() {
        notebook_summary.clone()
    } else {
        Vec::new()
    };

    let link_lists = LinkLists {
        inputs: stats.input_links.clone(),
        outputs: stats.output_links.clone(),
        linked_inputs: stats.linked_input_links.clone(),
        linked_outputs: stats.linked_output_links.clone(),
    };

    StepView {
        id: step.id.clone(),
        types: step.types.clone(),
        name: step.name.clone(),
        position: step.position,
        inputs: step.input.clone(),
        outputs: step.output.clone(),
        notebook: step.notebook.clone(),
        code_repository_ref: step.code_repository.clone(),
        programming_language: step.programming_language.clone(),
        encoding_format: step.encoding_format.clone(),
        sha256: step.sha256.clone(),
        notebook_crate: step.notebook_crate.clone(),
        inputs_detail: step.inputs_detail.clone(),
        outputs_detail: step.outputs_detail.clone(),
        inputs_overview,
        outputs_overview,
        linked_files: step.linked_files.clone(),
        raw: step.properties.clone(),
        language,
        code_repository,
        code_repository_display,
        stats,
        prompt_context,
        tables,
        lineage_targets,
        notebook_summary,
        notebook_summary_text,
        notebook_cells,
        link_lists,
    }
}

/// One-line preview of the first cells, joined with `" | "`.
fn notebook_summary_text(cells: &[NotebookCellSummary]) -> String {
    cells
        .iter()
        .take(SUMMARY_TEXT_CELLS)
        .map(|cell| {
            let label = cell.label();
            let link = make_markdown_link(
                Some(&label),
                cell.uri.as_deref().or(cell.path.as_deref()),
            );
            format!("{}: {link} — {}", position_label(cell.position), cell.preview)
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

fn prompt_context(
    step: &StepRecord,
    language: &str,
    code_repository_display: &str,
    stats: &StepStats,
    notebook_summary_text: &str,
    link_limit: usize,
) -> String {
    let mut lines = vec![
        format!("Step name: {}", step.name.as_deref().unwrap_or("(unnamed)")),
        format!("Step identifier: {}", step.id),
        format!("Workflow position: {}", step.position),
        format!("Programming language: {language}"),
        format!("Code repository: {code_repository_display}"),
        stats.input_summary.clone(),
        stats.output_summary.clone(),
    ];

    let link_lines = [
        ("Input links", &stats.input_links, None),
        ("Output links", &stats.output_links, None),
        (
            "Linked input artefacts",
            &stats.linked_input_links,
            Some((stats.linked_input_parameter_count, &stats.linked_input_summary)),
        ),
        (
            "Linked output artefacts",
            &stats.linked_output_links,
            Some((stats.linked_output_parameter_count, &stats.linked_output_summary)),
        ),
    ];
    for (label, links, linked_summary) in link_lines {
        if let Some((_, summary)) = linked_summary.filter(|(count, _)| *count > 0) {
            lines.push(summary.clone());
        }
        if !links.is_empty() {
            lines.push(format!("{label}: {}", first_links(links, link_limit)));
        }
    }

    if !notebook_summary_text.is_empty() {
        lines.push(format!("Notebook cells: {notebook_summary_text}"));
    }

    lines.join("\n")
}

fn first_links(links: &[String], limit: usize) -> String {
    links
        .iter()
        .take(limit)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
