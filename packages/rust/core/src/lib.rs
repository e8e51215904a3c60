//! Step extraction and summarisation for workflow crates.
//!
//! The pipeline runs strictly forward: the root crate is loaded and each
//! workflow step becomes a [`StepRecord`] (with its notebook crate inlined),
//! each record becomes a [`StepView`] of summaries and tables, and each view
//! yields a [`StepPromptPayload`]. [`build_workflow_context`] aggregates the
//! views of a whole workflow.

pub mod lineage;
pub mod model;
pub mod notebook;
pub mod output;
pub mod overview;
pub mod pipeline;
pub mod prompts;
pub mod steps;
pub mod summaries;
pub mod tables;
pub mod view;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use lineage::{LineageFile, LineageTarget, build_lineage_targets, format_lineage_file};
pub use model::{IoKind, LinkedFiles, LinkedParameter, NotebookCell, NotebookCrate, StepMap, StepRecord};
pub use notebook::{
    InlineContent, NotebookCellSummary, build_notebook_summary, read_inline_content,
    summarise_notebook,
};
pub use output::{to_json, write_json};
pub use overview::{IoOverview, build_io_overview};
pub use pipeline::{
    ProgressReporter, SilentProgress, StepDocument, extract_step_dicts, extract_step_dicts_with,
    extract_steps, extract_steps_with,
};
pub use prompts::{
    ParamBrief, StepIdentity, StepPromptPayload, clean_prompt_value, filter_by_site, param_brief,
    prepare_step_prompt_payloads,
};
pub use steps::{build_step, step_notebook_path};
pub use summaries::{
    IoSummary, LinkedSummary, StepStats, format_samples, links_from_details,
    links_from_linked_entries, normalise_language, summarise_io, summarise_linked,
};
pub use tables::{build_io_table, build_notebook_table, build_step_metadata_table};
pub use view::{StepView, build_step_view};
pub use workflow::{WorkflowContext, build_workflow_context};
