//! Prompt payloads: text-generation-ready sections built from a step view.

use serde::Serialize;

use crate::model::IoKind;
use crate::notebook::NotebookCellSummary;
use crate::overview::{IoOverview, PLACEHOLDER};
use crate::view::StepView;

/// Cells with content quoted in a step's notebook context.
pub const MAX_PROMPT_CELLS: usize = 10;

/// Name, position, language and repository of a step, numbered in sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepIdentity {
    pub name: Option<String>,
    pub position: i64,
    pub language: String,
    pub code_repository: Option<String>,
    pub step_number: usize,
    pub code_repository_markdown: Option<String>,
}

/// `[name](repo)` when both are known.
pub fn repository_markdown(name: Option<&str>, repository: Option<&str>) -> Option<String> {
    match (name, repository) {
        (Some(name), Some(repo)) if !name.is_empty() && !repo.is_empty() => {
            Some(format!("[{name}]({repo})"))
        }
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowSummary {
    pub count: usize,
    pub summary: String,
    pub examples: Vec<String>,
    pub links: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataFlows {
    pub inputs: FlowSummary,
    pub outputs: FlowSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedFlow {
    pub summary: String,
    pub examples: Vec<String>,
    pub links: Vec<String>,
    pub parameters: usize,
    pub file_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedArtefacts {
    pub inputs: LinkedFlow,
    pub outputs: LinkedFlow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptCell {
    pub name: String,
    pub position: Option<i64>,
    pub path: Option<String>,
    pub uri: Option<String>,
    pub content: Option<String>,
    pub content_truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotebookContext {
    pub summary: String,
    pub total_cells: usize,
    pub cells_included: usize,
    /// Cells with content beyond [`MAX_PROMPT_CELLS`].
    pub additional_cells: usize,
    pub cells: Vec<PromptCell>,
    pub available_cell_names: Vec<String>,
}

/// One input or output parameter, phrased for text generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamPayload {
    pub step: StepIdentity,
    pub parameter: String,
    pub name: String,
    pub format: Option<String>,
    pub description: Option<String>,
    pub source_link: String,
    pub linked_examples: Vec<String>,
    pub total_linked_files: usize,
    pub linked_files_note: String,
    pub transient_note: Option<String>,
    pub context_lines: Vec<String>,
    pub cell_refs: Vec<String>,
    pub cell_refs_text: String,
    pub cell_refs_note: String,
    pub kind: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotebookSummaryRef {
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepObjectiveInput {
    pub identity: StepIdentity,
    pub data_flows: DataFlows,
    pub linked_artefacts: LinkedArtefacts,
    pub notebook: NotebookSummaryRef,
    pub context_lines: Vec<String>,
    pub inputs: Vec<IoOverview>,
    pub outputs: Vec<IoOverview>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOperationsInput {
    pub identity: StepIdentity,
    pub data_flows: DataFlows,
    pub linked_artefacts: LinkedArtefacts,
    pub notebook: NotebookContext,
    pub context_lines: Vec<String>,
    pub inputs: Vec<IoOverview>,
    pub outputs: Vec<IoOverview>,
}

/// All prompt sections of one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepPromptPayload {
    #[serde(rename = "_sequence")]
    pub sequence: usize,
    pub identity: StepIdentity,
    /// Whether any notebook cell carries content.
    pub jupyter: bool,
    pub data_flows: DataFlows,
    pub linked_artefacts: LinkedArtefacts,
    pub notebook_context: NotebookContext,
    pub context_lines: Vec<String>,
    pub inputs_prompt_payload: Vec<ParamPayload>,
    pub outputs_prompt_payload: Vec<ParamPayload>,
    pub step_title_input: StepIdentity,
    pub step_objective_input: StepObjectiveInput,
    pub step_operations_input: StepOperationsInput,
}

/// Build the prompt payload of a step numbered `sequence` (1-based).
///
/// `site` narrows example links to those containing it, unless that would
/// leave none.
pub fn prepare_step_prompt_payloads(view: &StepView, sequence: usize, site: Option<&str>) -> StepPromptPayload {
    let identity = StepIdentity {
        name: view.name.clone(),
        position: view.position,
        language: view.language.clone(),
        code_repository: view.code_repository.clone(),
        step_number: sequence,
        code_repository_markdown: repository_markdown(
            view.name.as_deref(),
            view.code_repository.as_deref(),
        ),
    };

    let stats = &view.stats;
    let non_empty = |links: &Vec<String>| (!links.is_empty()).then(|| links.clone());
    let data_flows = DataFlows {
        inputs: FlowSummary {
            count: stats.input_parameter_count,
            summary: stats.input_summary.clone(),
            examples: stats.input_examples.clone(),
            links: non_empty(&view.link_lists.inputs),
        },
        outputs: FlowSummary {
            count: stats.output_parameter_count,
            summary: stats.output_summary.clone(),
            examples: stats.output_examples.clone(),
            links: non_empty(&view.link_lists.outputs),
        },
    };

    let linked_artefacts = LinkedArtefacts {
        inputs: LinkedFlow {
            summary: stats.linked_input_summary.clone(),
            examples: stats.linked_input_examples.clone(),
            links: stats.linked_input_links.clone(),
            parameters: stats.linked_input_parameter_count,
            file_count: stats.linked_input_file_count,
        },
        outputs: LinkedFlow {
            summary: stats.linked_output_summary.clone(),
            examples: stats.linked_output_examples.clone(),
            links: stats.linked_output_links.clone(),
            parameters: stats.linked_output_parameter_count,
            file_count: stats.linked_output_file_count,
        },
    };

    let notebook_context = notebook_context(&view.notebook_cells, &view.notebook_summary_text);
    let jupyter = view.notebook_cells.iter().any(has_content);

    let context_lines: Vec<String> = view
        .prompt_context
        .lines()
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    let param_payloads = |entries: &[IoOverview], kind: IoKind| -> Vec<ParamPayload> {
        entries
            .iter()
            .map(|entry| param_payload(entry, kind, &identity, &context_lines, site))
            .collect()
    };
    let inputs_prompt_payload = param_payloads(&view.inputs_overview, IoKind::Inputs);
    let outputs_prompt_payload = param_payloads(&view.outputs_overview, IoKind::Outputs);

    StepPromptPayload {
        sequence,
        jupyter,
        step_title_input: identity.clone(),
        step_objective_input: StepObjectiveInput {
            identity: identity.clone(),
            data_flows: data_flows.clone(),
            linked_artefacts: linked_artefacts.clone(),
            notebook: NotebookSummaryRef {
                summary: notebook_context.summary.clone(),
            },
            context_lines: context_lines.clone(),
            inputs: view.inputs_overview.clone(),
            outputs: view.outputs_overview.clone(),
        },
        step_operations_input: StepOperationsInput {
            identity: identity.clone(),
            data_flows: data_flows.clone(),
            linked_artefacts: linked_artefacts.clone(),
            notebook: notebook_context.clone(),
            context_lines: context_lines.clone(),
            inputs: view.inputs_overview.clone(),
            outputs: view.outputs_overview.clone(),
        },
        identity,
        data_flows,
        linked_artefacts,
        notebook_context,
        context_lines,
        inputs_prompt_payload,
        outputs_prompt_payload,
    }
}

fn has_content(cell: &NotebookCellSummary) -> bool {
    cell.content.as_deref().is_some_and(|c| !c.is_empty())
}

fn notebook_context(cells: &[NotebookCellSummary], summary: &str) -> NotebookContext {
    let with_content: Vec<&NotebookCellSummary> = cells.iter().filter(|c| has_content(c)).collect();
    let included: Vec<PromptCell> = with_content
        .iter()
        .take(MAX_PROMPT_CELLS)
        .map(|cell| PromptCell {
            name: cell.label(),
            position: cell.position,
            path: cell.path.clone(),
            uri: cell.uri.clone(),
            content: cell.content.clone(),
            content_truncated: cell.content_truncated,
        })
        .collect();

    NotebookContext {
        summary: summary.to_string(),
        total_cells: cells.len(),
        cells_included: included.len(),
        additional_cells: with_content.len() - included.len(),
        cells: included,
        available_cell_names: cells.iter().map(NotebookCellSummary::label).collect(),
    }
}

fn param_payload(
    entry: &IoOverview,
    kind: IoKind,
    identity: &StepIdentity,
    context_lines: &[String],
    site: Option<&str>,
) -> ParamPayload {
    let sample_links: Vec<String> = entry
        .prompt_example_links
        .iter()
        .filter(|link| !link.is_empty() && **link != entry.name)
        .cloned()
        .collect();
    let linked_examples: Vec<String> = filter_by_site(sample_links, site)
        .into_iter()
        .take(1)
        .collect();

    let total_files = entry.total_files;
    let linked_files_note = if total_files == 0 {
        "No linked files recorded.".to_string()
    } else {
        let plural = if total_files == 1 { "" } else { "s" };
        let mut note = format!("{total_files} linked file{plural} referenced in the crate");
        match linked_examples.first() {
            Some(example) => note.push_str(&format!("; representative example: {example}")),
            None => note.push_str(" (no public URLs)."),
        }
        note
    };

    let cell_refs: Vec<String> = entry
        .cell_refs
        .iter()
        .filter(|r| !r.is_empty())
        .cloned()
        .collect();
    let cell_refs_text = cell_refs.join(", ");
    let cell_refs_note = if cell_refs_text.is_empty() {
        "Notebook cells: not documented.".to_string()
    } else {
        format!("Notebook cells: {cell_refs_text}")
    };

    ParamPayload {
        step: identity.clone(),
        parameter: entry.parameter.clone(),
        name: entry.name.clone(),
        format: clean_prompt_value(&entry.format),
        description: clean_prompt_value(&entry.description),
        source_link: entry.prompt_link.clone(),
        linked_examples,
        total_linked_files: total_files,
        linked_files_note,
        transient_note: entry.transient_note.clone(),
        context_lines: context_lines.to_vec(),
        cell_refs,
        cell_refs_text,
        cell_refs_note,
        kind: kind.singular(),
    }
}

/// Drop empty and placeholder values.
pub fn clean_prompt_value(value: &str) -> Option<String> {
    match value {
        "" | PLACEHOLDER => None,
        other => Some(other.to_string()),
    }
}

/// Keep links containing `site`; when none match, keep them all.
pub fn filter_by_site(links: Vec<String>, site: Option<&str>) -> Vec<String> {
    let Some(site) = site.filter(|s| !s.is_empty()) else {
        return links;
    };
    let filtered: Vec<String> = links.iter().filter(|link| link.contains(site)).cloned().collect();
    if filtered.is_empty() { links } else { filtered }
}

/// Short description of a parameter for workflow-level views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamBrief {
    pub parameter: String,
    pub name: String,
    pub format: String,
    pub description: String,
    pub source_link: String,
    /// At most one example link, preferring links that match the site.
    pub sample_example: Vec<String>,
    pub total_files: usize,
    pub transient_note: Option<String>,
}

pub fn param_brief(entry: &IoOverview, site: Option<&str>) -> ParamBrief {
    let sample_example = filter_by_site(entry.prompt_example_links.clone(), site)
        .into_iter()
        .take(1)
        .collect();
    ParamBrief {
        parameter: entry.parameter.clone(),
        name: entry.name.clone(),
        format: entry.format.clone(),
        description: entry.description.clone(),
        source_link: entry.prompt_link.clone(),
        sample_example,
        total_files: entry.total_files,
        transient_note: entry.transient_note.clone(),
    }
}
