//! Column-oriented table projections of a step for direct rendering.

use serde_json::Value;

use crateprov_markdown::{Datatable, DatatableColumn};

use crate::notebook::NotebookCellSummary;
use crate::overview::{IoOverview, PLACEHOLDER};
use crate::summaries::StepStats;

/// `Field`/`Value` table of a step's identity and data-flow summaries.
///
/// Link and example rows appear only when there is something to show.
pub fn build_step_metadata_table(
    id: &str,
    position: i64,
    language: &str,
    code_repository: &str,
    stats: &StepStats,
) -> Datatable {
    let mut rows: Vec<(String, String)> = [
        ("Identifier", id.to_string()),
        ("Position", position.to_string()),
        ("Programming language", language.to_string()),
        ("Code repository", code_repository.to_string()),
        ("Inputs", stats.input_summary.clone()),
        ("Outputs", stats.output_summary.clone()),
        ("Linked inputs", stats.linked_input_summary.clone()),
        ("Linked outputs", stats.linked_output_summary.clone()),
    ]
    .into_iter()
    .map(|(field, value)| (field.to_string(), or_placeholder(value)))
    .collect();

    let optional = [
        ("Input links", &stats.input_links_text),
        ("Output links", &stats.output_links_text),
        ("Linked input links", &stats.linked_input_links_text),
        ("Linked output links", &stats.linked_output_links_text),
        ("Input examples", &stats.input_examples_text),
        ("Output examples", &stats.output_examples_text),
        ("Linked input examples", &stats.linked_input_examples_text),
        ("Linked output examples", &stats.linked_output_examples_text),
    ];
    rows.extend(
        optional
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(field, value)| (field.to_string(), value.clone())),
    );

    Datatable::field_value(rows)
}

fn or_placeholder(value: String) -> String {
    if value.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        value
    }
}

/// Position/Name/Preview/Path table of summarised notebook cells.
pub fn build_notebook_table(cells: &[NotebookCellSummary]) -> Option<Datatable> {
    if cells.is_empty() {
        return None;
    }
    Some(Datatable::new(vec![
        DatatableColumn::new("Position", cells.iter().map(|c| c.position)),
        DatatableColumn::new("Name", cells.iter().map(|c| c.name.clone())),
        DatatableColumn::new("Preview", cells.iter().map(|c| c.preview.clone())),
        DatatableColumn::new(
            "Path",
            cells.iter().map(|c| c.uri.clone().or_else(|| c.path.clone())),
        ),
    ]))
}

/// Parameter/Name/Format/Source/Linked files table of parameter overviews.
pub fn build_io_table(entries: &[IoOverview]) -> Option<Datatable> {
    if entries.is_empty() {
        return None;
    }
    let column = |name: &str, value: fn(&IoOverview) -> &String| {
        DatatableColumn::new(
            name,
            entries.iter().map(|e| Value::String(value(e).clone())),
        )
    };
    Some(Datatable::new(vec![
        column("Parameter", |e| &e.parameter),
        column("Name", |e| &e.name),
        column("Format", |e| &e.format),
        column("Source", |e| &e.primary_link),
        column("Linked files", |e| &e.files_annotation),
    ]))
}
