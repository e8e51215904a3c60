//! Workflow-level context aggregated over every step view.

use serde::Serialize;

use crate::prompts::{ParamBrief, param_brief, repository_markdown};
use crate::view::StepView;

/// Parameters quoted per step in the overview.
const BRIEFS_PER_STEP: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowStepSummary {
    pub name: Option<String>,
    pub position: i64,
    pub code_repository_markdown: Option<String>,
    pub language: String,
    pub inputs_summary: String,
    pub outputs_summary: String,
    pub inputs: Vec<ParamBrief>,
    pub outputs: Vec<ParamBrief>,
}

/// One output parameter of some step, with its best sample link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub step_name: Option<String>,
    pub parameter: String,
    pub name: String,
    pub format: String,
    pub description: String,
    pub sample_link: Option<String>,
    pub total_files: usize,
    pub transient_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowOverview {
    pub site: Option<String>,
    pub total_steps: usize,
    pub steps: Vec<WorkflowStepSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowDiagram {
    pub steps: Vec<WorkflowStepSummary>,
    /// Step names in position order.
    pub step_order: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowOutcomes {
    pub site: Option<String>,
    pub outcomes: Vec<Outcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowContext {
    pub overview: WorkflowOverview,
    pub diagram: WorkflowDiagram,
    pub outcomes: WorkflowOutcomes,
}

/// Aggregate step views into overview, diagram and outcome sections.
pub fn build_workflow_context<'a>(
    steps: impl IntoIterator<Item = &'a StepView>,
    site: Option<&str>,
) -> WorkflowContext {
    let mut summaries = Vec::new();
    let mut outcomes = Vec::new();

    for step in steps {
        let outputs: Vec<ParamBrief> = step
            .outputs_overview
            .iter()
            .map(|output| param_brief(output, site))
            .collect();

        outcomes.extend(step.outputs_overview.iter().zip(&outputs).map(|(output, brief)| {
            Outcome {
                step_name: step.name.clone(),
                parameter: output.parameter.clone(),
                name: output.name.clone(),
                format: output.format.clone(),
                description: output.description.clone(),
                sample_link: brief.sample_example.first().cloned(),
                total_files: output.total_files,
                transient_note: output.transient_note.clone(),
            }
        }));

        summaries.push(WorkflowStepSummary {
            name: step.name.clone(),
            position: step.position,
            code_repository_markdown: repository_markdown(
                step.name.as_deref(),
                step.code_repository.as_deref(),
            ),
            language: step.language.clone(),
            inputs_summary: step.stats.input_summary.clone(),
            outputs_summary: step.stats.output_summary.clone(),
            inputs: step
                .inputs_overview
                .iter()
                .take(BRIEFS_PER_STEP)
                .map(|input| param_brief(input, site))
                .collect(),
            outputs: outputs.into_iter().take(BRIEFS_PER_STEP).collect(),
        });
    }

    let mut ordered: Vec<&WorkflowStepSummary> = summaries.iter().collect();
    ordered.sort_by_key(|summary| summary.position);
    let step_order = ordered.iter().map(|summary| summary.name.clone()).collect();

    let site = site.map(String::from);
    WorkflowContext {
        overview: WorkflowOverview {
            site: site.clone(),
            total_steps: summaries.len(),
            steps: summaries.clone(),
        },
        diagram: WorkflowDiagram {
            steps: summaries,
            step_order,
        },
        outcomes: WorkflowOutcomes { site, outcomes },
    }
}
