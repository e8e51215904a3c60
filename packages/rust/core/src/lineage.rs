//! Lineage targets: produced artefacts traced back to the step that made them.

use serde::Serialize;

use crateprov_markdown::{make_markdown_link, make_prompt_link};
use crateprov_shared::EntitySummary;

use crate::model::StepRecord;

/// Lineage targets reported per step.
pub const MAX_LINEAGE_TARGETS: usize = 2;
/// Sample files listed per lineage target or overview entry.
pub const MAX_SAMPLE_FILES: usize = 5;

/// A linked file rendered for documents and prompts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineageFile {
    pub name: String,
    /// Markdown link to the public URL or local file.
    pub link: String,
    /// Markdown link only when a public URL exists, otherwise the name.
    pub prompt_link: String,
    pub path: Option<String>,
    pub url: Option<String>,
    pub encoding_format: Option<String>,
    pub content_size: Option<String>,
    pub sha256: Option<String>,
    pub description: Option<String>,
}

pub fn format_lineage_file(entry: &EntitySummary, default_label: &str) -> LineageFile {
    let name = entry.label().unwrap_or(default_label).to_string();
    let web_url = entry.web_url();
    let display_url = web_url.or(entry.path.as_deref());

    LineageFile {
        link: make_markdown_link(Some(&name), display_url),
        prompt_link: make_prompt_link(Some(&name), web_url),
        name,
        path: entry.path.clone(),
        url: web_url.map(String::from),
        encoding_format: entry.encoding_format.clone(),
        content_size: entry.content_size.clone(),
        sha256: entry.sha256.clone(),
        description: entry.description.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artefact {
    pub parameter: String,
    pub summary: String,
    pub total_files: usize,
}

/// The step that produced an artefact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Producer {
    pub name: Option<String>,
    pub id: String,
    pub position: i64,
    pub code_repository: Option<String>,
    pub language: String,
    pub code_repository_markdown: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProducedBy {
    pub step: Producer,
}

/// Descriptive metadata of the output parameter; empty fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineageCounts {
    pub total_files: usize,
    pub files_listed: usize,
    pub files_remaining: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineageTarget {
    pub artefact: Artefact,
    pub produced_by: ProducedBy,
    pub metadata: LineageMetadata,
    pub files: Vec<LineageFile>,
    pub counts: LineageCounts,
    pub context_lines: Vec<String>,
}

/// Trace the step's linked output parameters.
///
/// Only outputs with linked files are considered, and at most
/// [`MAX_LINEAGE_TARGETS`] are returned.
pub fn build_lineage_targets(
    step: &StepRecord,
    outputs_detail: &[EntitySummary],
    language: &str,
    code_repo: Option<&str>,
) -> Vec<LineageTarget> {
    let producer = Producer {
        name: step.name.clone(),
        id: step.id.clone(),
        position: step.position,
        code_repository: code_repo.map(String::from),
        language: language.to_string(),
        code_repository_markdown: code_repo
            .map(|repo| make_markdown_link(step.name.as_deref(), Some(repo))),
    };
    let step_label = step.name.as_deref().unwrap_or("(unnamed)");

    step.linked_files
        .outputs
        .iter()
        .filter_map(|entry| {
            let detail = outputs_detail
                .iter()
                .find(|d| d.id.as_deref() == Some(entry.parameter.as_str()));
            if entry.files.is_empty() && detail.is_none() {
                return None;
            }

            let total_files = entry.files.len();
            let files: Vec<LineageFile> = entry
                .files
                .iter()
                .take(MAX_SAMPLE_FILES)
                .map(|file| format_lineage_file(file, &entry.parameter))
                .collect();

            let mut context_lines = vec![
                format!("Artefact parameter: {}", entry.parameter),
                format!("Produced by workflow step {step_label} ({})", step.id),
                format!("Total files in crate: {total_files}"),
            ];
            if !files.is_empty() {
                let samples: Vec<&str> = files.iter().map(|f| f.link.as_str()).collect();
                context_lines.push(format!("Example files: {}", samples.join("; ")));
            }

            Some(LineageTarget {
                artefact: Artefact {
                    parameter: entry.parameter.clone(),
                    summary: format!("{} ({total_files} files)", entry.parameter),
                    total_files,
                },
                produced_by: ProducedBy {
                    step: producer.clone(),
                },
                metadata: detail.map(lineage_metadata).unwrap_or_default(),
                counts: LineageCounts {
                    total_files,
                    files_listed: files.len(),
                    files_remaining: total_files.saturating_sub(files.len()),
                },
                files,
                context_lines,
            })
        })
        .take(MAX_LINEAGE_TARGETS)
        .collect()
}

fn lineage_metadata(detail: &EntitySummary) -> LineageMetadata {
    LineageMetadata {
        name: detail.name.clone(),
        types: detail.types.clone(),
        encoding_format: detail.encoding_format.clone(),
        description: detail.description.clone(),
        content_size: detail.content_size.clone(),
        sha256: detail.sha256.clone(),
        link: Some(make_markdown_link(
            detail.name.as_deref(),
            detail.path.as_deref().or(detail.url.as_deref()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LinkedFiles, LinkedParameter};
    use crate::testing::step_record;

    fn file(i: usize) -> EntitySummary {
        EntitySummary {
            id: Some(format!("https://example.org/shorelines/{i}.geojson")),
            name: Some(format!("shoreline {i}")),
            ..EntitySummary::default()
        }
    }

    fn output_detail(id: &str) -> EntitySummary {
        EntitySummary {
            id: Some(id.to_string()),
            name: Some("shorelines".to_string()),
            encoding_format: Some("application/geo+json".to_string()),
            ..EntitySummary::default()
        }
    }

    #[test]
    fn web_url_falls_back_to_http_id() {
        let formatted = format_lineage_file(&file(0), "#out");
        assert_eq!(formatted.url.as_deref(), Some("https://example.org/shorelines/0.geojson"));
        assert_eq!(
            formatted.prompt_link,
            "[shoreline 0](https://example.org/shorelines/0.geojson)"
        );
    }

    #[test]
    fn local_files_link_locally_but_not_in_prompts() {
        let local = EntitySummary {
            id: Some("data/a.csv".to_string()),
            path: Some("/tmp/crate/data/a.csv".to_string()),
            ..EntitySummary::default()
        };
        let formatted = format_lineage_file(&local, "#out");
        assert_eq!(formatted.name, "data/a.csv");
        assert_eq!(formatted.link, "[data/a.csv](file:///tmp/crate/data/a.csv)");
        assert_eq!(formatted.prompt_link, "data/a.csv");
        assert!(formatted.url.is_none());
    }

    #[test]
    fn targets_are_capped_with_sample_files() {
        let mut step = step_record("#step", 3);
        step.name = Some("Extract shorelines".to_string());
        step.linked_files = LinkedFiles {
            inputs: Vec::new(),
            outputs: ["#a", "#b", "#c"]
                .iter()
                .map(|p| LinkedParameter {
                    parameter: p.to_string(),
                    files: (0..7).map(file).collect(),
                })
                .collect(),
        };
        let details = vec![output_detail("#a")];

        let targets = build_lineage_targets(&step, &details, "Python", Some("https://github.com/x/y"));
        assert_eq!(targets.len(), MAX_LINEAGE_TARGETS);

        let first = &targets[0];
        assert_eq!(first.artefact.summary, "#a (7 files)");
        assert_eq!(
            first.counts,
            LineageCounts {
                total_files: 7,
                files_listed: 5,
                files_remaining: 2
            }
        );
        assert_eq!(first.metadata.encoding_format.as_deref(), Some("application/geo+json"));
        assert_eq!(first.context_lines[1], "Produced by workflow step Extract shorelines (#step)");
        assert!(first.context_lines[3].starts_with("Example files: [shoreline 0]"));
        assert_eq!(
            first.produced_by.step.code_repository_markdown.as_deref(),
            Some("[Extract shorelines](https://github.com/x/y)")
        );

        assert_eq!(targets[1].metadata, LineageMetadata::default());
    }
}
