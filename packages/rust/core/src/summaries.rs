//! Count/example summaries and link lists for a step's data flows.

use serde::Serialize;
use serde_json::Value;

use crateprov_markdown::{LinkCollector, make_markdown_link};
use crateprov_shared::EntitySummary;
use crateprov_shared::values::non_empty;

use crate::model::{IoKind, LinkedFiles, LinkedParameter, StepRecord};

/// Examples quoted in one-line summaries.
const SAMPLE_LIMIT: usize = 3;

/// `name (format)` labels for the first few named entries.
pub fn format_samples(entries: &[EntitySummary], limit: usize) -> Vec<String> {
    entries
        .iter()
        .filter_map(|entry| {
            let name = entry.label()?;
            Some(match entry.encoding_format.as_deref() {
                Some(format) => format!("{name} ({format})"),
                None => name.to_string(),
            })
        })
        .take(limit)
        .collect()
}

/// One-line count summary of parameter details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IoSummary {
    pub summary: String,
    pub samples: Vec<String>,
}

/// `"{label} count: N; examples: a, b, c"`.
pub fn summarise_io(entries: &[EntitySummary], label: &str) -> IoSummary {
    let samples = format_samples(entries, SAMPLE_LIMIT);
    let mut summary = format!("{label} count: {}", entries.len());
    if !samples.is_empty() {
        summary.push_str(&format!("; examples: {}", samples.join(", ")));
    }
    IoSummary { summary, samples }
}

/// Parameter and file counts over one side of a step's linked files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkedSummary {
    /// Empty when no parameter has linked files.
    pub summary: String,
    pub parameters: usize,
    pub files: usize,
    pub examples: Vec<String>,
}

pub fn summarise_linked(linked: &LinkedFiles, kind: IoKind) -> LinkedSummary {
    let entries = linked.entries(kind);
    if entries.is_empty() {
        return LinkedSummary::default();
    }

    let files: usize = entries.iter().map(|entry| entry.files.len()).sum();
    let examples: Vec<String> = entries
        .iter()
        .take(SAMPLE_LIMIT)
        .map(|entry| format!("{} ({} files)", entry.parameter, entry.files.len()))
        .collect();

    let summary = format!(
        "{} linked parameters: {}; files referenced: {files}; examples: {}",
        kind.title(),
        entries.len(),
        examples.join(", ")
    );

    LinkedSummary {
        summary,
        parameters: entries.len(),
        files,
        examples,
    }
}

/// Markdown links to parameter details, deduplicated and capped.
pub fn links_from_details(entries: &[EntitySummary], limit: usize) -> Vec<String> {
    let mut links = LinkCollector::new();
    for entry in entries {
        links.push(make_markdown_link(entry.label(), entry.location()));
    }
    links.finish(limit)
}

/// Markdown links to every linked file, deduplicated and capped. Files with
/// neither name nor id are labelled by their parameter.
pub fn links_from_linked_entries(entries: &[LinkedParameter], limit: usize) -> Vec<String> {
    let mut links = LinkCollector::new();
    for entry in entries {
        for file in &entry.files {
            let label = file.label().or(Some(entry.parameter.as_str()));
            links.push(make_markdown_link(label, file.location()));
        }
    }
    links.finish(limit)
}

/// Display name of a `programmingLanguage` value.
pub fn normalise_language(language: Option<&Value>) -> String {
    const UNKNOWN: &str = "Unknown";
    match language {
        Some(Value::String(name)) => name.clone(),
        Some(Value::Object(map)) => ["name", "@id", "value"]
            .iter()
            .find_map(|key| non_empty(map.get(*key).and_then(Value::as_str)))
            .unwrap_or(UNKNOWN)
            .to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Counts, summaries, examples and links derived from one step record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepStats {
    pub input_summary: String,
    pub input_examples_text: String,
    pub input_examples: Vec<String>,
    pub output_summary: String,
    pub output_examples_text: String,
    pub output_examples: Vec<String>,
    pub linked_input_summary: String,
    pub linked_input_examples_text: String,
    pub linked_input_examples: Vec<String>,
    pub linked_output_summary: String,
    pub linked_output_examples_text: String,
    pub linked_output_examples: Vec<String>,
    pub input_parameter_count: usize,
    pub output_parameter_count: usize,
    pub linked_input_parameter_count: usize,
    pub linked_input_file_count: usize,
    pub linked_output_parameter_count: usize,
    pub linked_output_file_count: usize,
    pub input_links_text: String,
    pub output_links_text: String,
    pub linked_input_links_text: String,
    pub linked_output_links_text: String,
    pub input_links: Vec<String>,
    pub output_links: Vec<String>,
    pub linked_input_links: Vec<String>,
    pub linked_output_links: Vec<String>,
}

impl StepStats {
    pub fn from_step(step: &StepRecord, link_limit: usize) -> Self {
        let inputs = summarise_io(&step.inputs_detail, "Input parameters");
        let outputs = summarise_io(&step.outputs_detail, "Output parameters");
        let linked_inputs = summarise_linked(&step.linked_files, IoKind::Inputs);
        let linked_outputs = summarise_linked(&step.linked_files, IoKind::Outputs);

        let input_links = links_from_details(&step.inputs_detail, link_limit);
        let output_links = links_from_details(&step.outputs_detail, link_limit);
        let linked_input_links = links_from_linked_entries(&step.linked_files.inputs, link_limit);
        let linked_output_links = links_from_linked_entries(&step.linked_files.outputs, link_limit);

        Self {
            input_examples_text: inputs.samples.join(", "),
            input_summary: inputs.summary,
            input_examples: inputs.samples,
            output_examples_text: outputs.samples.join(", "),
            output_summary: outputs.summary,
            output_examples: outputs.samples,
            linked_input_summary: or_fallback(linked_inputs.summary, "No linked input artefacts referenced."),
            linked_input_examples_text: linked_inputs.examples.join(", "),
            linked_input_examples: linked_inputs.examples,
            linked_output_summary: or_fallback(linked_outputs.summary, "No linked output artefacts referenced."),
            linked_output_examples_text: linked_outputs.examples.join(", "),
            linked_output_examples: linked_outputs.examples,
            input_parameter_count: step.input.len(),
            output_parameter_count: step.output.len(),
            linked_input_parameter_count: linked_inputs.parameters,
            linked_input_file_count: linked_inputs.files,
            linked_output_parameter_count: linked_outputs.parameters,
            linked_output_file_count: linked_outputs.files,
            input_links_text: input_links.join(", "),
            output_links_text: output_links.join(", "),
            linked_input_links_text: linked_input_links.join(", "),
            linked_output_links_text: linked_output_links.join(", "),
            input_links,
            output_links,
            linked_input_links,
            linked_output_links,
        }
    }
}

fn or_fallback(summary: String, fallback: &str) -> String {
    if summary.is_empty() {
        fallback.to_string()
    } else {
        summary
    }
}
