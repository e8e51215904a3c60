//! Extraction entry points: crate → ordered step records → step documents.

use std::time::Instant;

use serde::Serialize;
use tracing::{info, instrument};

use crateprov_graph::{CrateInput, build_example_index, load_entities, require_entity, resolve_crate};
use crateprov_shared::{ExtractConfig, ProvenanceError, Result};

use crate::model::{StepMap, StepRecord};
use crate::prompts::{StepPromptPayload, prepare_step_prompt_payloads};
use crate::steps::build_step;
use crate::view::{StepView, build_step_view};

/// Progress callback for reporting extraction status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each step record is built.
    fn step_built(&self, step_id: &str, current: usize, total: usize);
    /// Called when extraction completes.
    fn done(&self, steps: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn step_built(&self, _step_id: &str, _current: usize, _total: usize) {}
    fn done(&self, _steps: usize) {}
}

/// Extract the steps of an interface's workflow with default limits.
pub fn extract_steps(input: impl Into<CrateInput>, interface_id: &str) -> Result<StepMap> {
    extract_steps_with(input, &ExtractConfig::new(interface_id), &SilentProgress)
}

/// Extract every step of the workflow that `config.interface_id` is part of.
///
/// The interface must reference exactly one workflow through `hasPart`, and
/// the workflow must list at least one step. Steps come back ordered by
/// position; equal positions keep their workflow order.
#[instrument(skip_all, fields(interface = %config.interface_id))]
pub fn extract_steps_with(
    input: impl Into<CrateInput>,
    config: &ExtractConfig,
    progress: &dyn ProgressReporter,
) -> Result<StepMap> {
    let start = Instant::now();

    progress.phase("Loading crate");
    let (krate, root) = resolve_crate(input)?;
    let interface = require_entity(krate.graph(), &config.interface_id)?;

    let entities = load_entities(&root)?;
    let example_index = build_example_index(&entities, &root);

    let workflow_ids = interface.refs("hasPart");
    let [workflow_id] = workflow_ids.as_slice() else {
        return Err(ProvenanceError::validation(format!(
            "expected a single workflow for '{}', got {workflow_ids:?}",
            config.interface_id
        )));
    };

    let workflow = require_entity(krate.graph(), workflow_id)?;
    let step_ids = workflow.refs("step");
    if step_ids.is_empty() {
        return Err(ProvenanceError::validation(format!(
            "workflow '{workflow_id}' defines no steps"
        )));
    }

    progress.phase("Building steps");
    let total = step_ids.len();
    let mut steps: Vec<StepRecord> = Vec::with_capacity(total);
    for (i, step_id) in step_ids.iter().enumerate() {
        steps.push(build_step(
            &krate,
            &root,
            step_id,
            &entities,
            &example_index,
            config,
        )?);
        progress.step_built(step_id, i + 1, total);
    }
    steps.sort_by_key(|step| step.position);

    info!(
        root = %root.display(),
        workflow = %workflow_id,
        steps = steps.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "steps extracted"
    );
    progress.done(steps.len());

    Ok(steps.into_iter().map(|step| (step.id.clone(), step)).collect())
}

/// A step view together with its prompt payload, serialised as one object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepDocument {
    #[serde(flatten)]
    pub view: StepView,
    #[serde(flatten)]
    pub prompts: StepPromptPayload,
}

/// Views and prompt payloads of every step, in position order.
pub fn extract_step_dicts(
    input: impl Into<CrateInput>,
    interface_id: &str,
    site: Option<&str>,
) -> Result<Vec<StepDocument>> {
    let config = ExtractConfig::new(interface_id).with_site(site.map(String::from));
    extract_step_dicts_with(input, &config, &SilentProgress)
}

#[instrument(skip_all, fields(interface = %config.interface_id, site = ?config.site))]
pub fn extract_step_dicts_with(
    input: impl Into<CrateInput>,
    config: &ExtractConfig,
    progress: &dyn ProgressReporter,
) -> Result<Vec<StepDocument>> {
    let steps = extract_steps_with(input, config, progress)?;

    let documents = steps
        .values()
        .enumerate()
        .map(|(i, step)| {
            let view = build_step_view(step, config.link_limit);
            let prompts = prepare_step_prompt_payloads(&view, i + 1, config.site.as_deref());
            StepDocument { view, prompts }
        })
        .collect();
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::testing::{TempCrate, simple_workflow};

    #[test]
    fn steps_are_ordered_by_position() {
        let krate = TempCrate::new();
        krate.manifest(simple_workflow(&krate, &[json!(3), json!(1), json!("2")]));

        let steps = extract_steps(krate.root(), "E2.2-wms").unwrap();
        let positions: Vec<i64> = steps.values().map(|s| s.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
        assert_eq!(
            steps.keys().collect::<Vec<_>>(),
            vec!["notebooks/step1.ipynb", "notebooks/step2.ipynb", "notebooks/step0.ipynb"]
        );
    }

    #[test]
    fn non_numeric_position_is_a_validation_error() {
        let krate = TempCrate::new();
        krate.manifest(simple_workflow(&krate, &[json!(1), json!("later")]));

        let err = extract_steps(krate.root(), "E2.2-wms").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("notebooks/step1.ipynb"));
    }

    fn set_has_part(graph: &mut [Value], has_part: Value) {
        let interface = graph.iter_mut().find(|e| e["@id"] == "E2.2-wms").unwrap();
        interface["hasPart"] = has_part;
    }

    #[test]
    fn interface_needs_exactly_one_workflow() {
        let krate = TempCrate::new();
        let mut graph = simple_workflow(&krate, &[json!(1)]);

        set_has_part(&mut graph, json!([]));
        krate.manifest(graph.clone());
        assert!(extract_steps(krate.root(), "E2.2-wms").unwrap_err().is_validation());

        set_has_part(&mut graph, json!([{"@id": "#workflow"}, {"@id": "#other"}]));
        krate.manifest(graph.clone());
        assert!(extract_steps(krate.root(), "E2.2-wms").unwrap_err().is_validation());

        set_has_part(&mut graph, json!([{"@id": "#workflow"}]));
        krate.manifest(graph);
        assert_eq!(extract_steps(krate.root(), "E2.2-wms").unwrap().len(), 1);
    }

    #[test]
    fn workflow_without_steps_is_rejected() {
        let krate = TempCrate::new();
        let mut graph = simple_workflow(&krate, &[json!(1)]);
        let workflow = graph.iter_mut().find(|e| e["@id"] == "#workflow").unwrap();
        workflow["step"] = json!([]);
        krate.manifest(graph);

        let err = extract_steps(krate.root(), "E2.2-wms").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("#workflow"));
    }

    #[test]
    fn missing_interface_or_crate_is_not_found() {
        let krate = TempCrate::new();
        krate.manifest(simple_workflow(&krate, &[json!(1)]));
        assert!(extract_steps(krate.root(), "E9.9").unwrap_err().is_not_found());
        assert!(
            extract_steps(krate.root().join("nope"), "E2.2-wms")
                .unwrap_err()
                .is_not_found()
        );
    }

    #[test]
    fn two_step_workflow_end_to_end() {
        let krate = TempCrate::new();
        krate.manifest(simple_workflow(&krate, &[json!(2), json!(1)]));

        let steps = extract_steps(krate.root(), "E2.2-wms").unwrap();
        assert_eq!(steps.len(), 2);
        let ordered: Vec<i64> = steps.values().map(|s| s.position).collect();
        assert_eq!(ordered, vec![1, 2]);

        let documents = extract_step_dicts(krate.root(), "E2.2-wms", None).unwrap();
        assert_eq!(documents.len(), 2);
        for (i, document) in documents.iter().enumerate() {
            assert!(document.view.prompt_context.contains("Step name:"));
            assert!(document.view.prompt_context.contains("Input parameters count: 1"));
            assert_eq!(document.prompts.sequence, i + 1);
            let input = &document.view.inputs_overview[0];
            assert_eq!(input.total_files, 0);
            assert!(input.transient_note.is_some());
        }

        let value = serde_json::to_value(&documents[0]).unwrap();
        assert_eq!(value["position"], 1);
        assert_eq!(value["_sequence"], 1);
        assert_eq!(value["tables"]["metadata"]["type"], "Datatable");
        assert!(value["prompt_context"].as_str().unwrap().contains("Step name: Step 1"));
    }

    struct CountingProgress(std::sync::atomic::AtomicUsize);

    impl ProgressReporter for CountingProgress {
        fn phase(&self, _name: &str) {}
        fn step_built(&self, _step_id: &str, _current: usize, _total: usize) {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
        fn done(&self, _steps: usize) {}
    }

    #[test]
    fn progress_sees_every_step() {
        let krate = TempCrate::new();
        krate.manifest(simple_workflow(&krate, &[json!(1), json!(2), json!(3)]));
        let progress = CountingProgress(Default::default());
        extract_steps_with(krate.root(), &ExtractConfig::new("E2.2-wms"), &progress).unwrap();
        assert_eq!(progress.0.load(std::sync::atomic::Ordering::SeqCst), 3);
    }

    fn fixture_crate() -> std::path::PathBuf {
        std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/crates/interface.crate")
    }

    #[test]
    fn fixture_steps_inline_notebook_cells() {
        let steps = extract_steps(fixture_crate(), "E2.2-wms").unwrap();
        assert_eq!(
            steps.keys().collect::<Vec<_>>(),
            vec!["notebooks/1_download.ipynb", "notebooks/2_extract.ipynb"]
        );

        let download = &steps["notebooks/1_download.ipynb"];
        let notebook = download.notebook_crate.as_ref().unwrap();
        assert_eq!(notebook.dataset.name.as_deref(), Some("Download imagery notebook"));
        assert_eq!(notebook.main_entity.output, vec!["#param-imagery"]);
        let cells: Vec<&str> = notebook.steps.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(cells, vec!["#cell-1", "#cell-2"]);
        let first = notebook.steps[0].work_example.as_ref().unwrap();
        assert!(first.content.as_deref().unwrap().contains("gpd.read_file"));
        assert!(!first.content_truncated);

        assert_eq!(download.linked_files.inputs.len(), 1);
        assert!(
            download.linked_files.inputs[0].files[0]
                .path
                .as_deref()
                .unwrap()
                .ends_with("data/polygons.geojson")
        );
        assert_eq!(
            download.linked_files.inputs[0].files[0].content_size.as_deref(),
            Some("118")
        );

        let extract = &steps["notebooks/2_extract.ipynb"];
        assert!(extract.notebook_crate.is_none());
        assert_eq!(extract.code_repository.as_deref(), Some("https://github.com/kvos/CoastSat"));
        assert_eq!(extract.linked_files.outputs[0].files.len(), 3);
    }

    #[test]
    fn fixture_views_and_context() {
        let config = ExtractConfig::new("E2.2-wms").with_site(Some("sar0002".to_string()));
        let documents = extract_step_dicts_with(fixture_crate(), &config, &SilentProgress).unwrap();
        assert_eq!(documents.len(), 2);

        let download = &documents[0];
        assert_eq!(download.view.language, "#python");
        assert_eq!(download.view.inputs_overview[0].cell_refs, vec!["Load polygons"]);
        assert!(download.view.outputs_overview[0].transient_note.is_some());
        assert!(download.prompts.jupyter);
        assert_eq!(download.prompts.notebook_context.cells_included, 2);
        assert_eq!(
            download.prompts.notebook_context.available_cell_names,
            vec!["Load polygons", "Cell 2"]
        );
        assert!(download.view.prompt_context.contains("Notebook cells: 1: [Load polygons]("));

        let extract = &documents[1];
        assert_eq!(extract.view.language, "Python");
        assert_eq!(extract.view.lineage_targets.len(), 1);
        assert_eq!(extract.view.lineage_targets[0].counts.files_listed, 3);
        let shorelines = &extract.prompts.outputs_prompt_payload[0];
        assert_eq!(
            shorelines.linked_examples,
            vec!["[sar0002 tidally corrected](https://example.org/coastsat/sar0002_time_series_tidally_corrected.csv)"]
        );

        let context = crate::build_workflow_context(
            documents.iter().map(|document| &document.view),
            config.site.as_deref(),
        );
        assert_eq!(
            context.diagram.step_order,
            vec![Some("Download imagery".to_string()), Some("Extract shorelines".to_string())]
        );
        let outcome = context
            .outcomes
            .outcomes
            .iter()
            .find(|o| o.parameter == "#param-shorelines")
            .unwrap();
        assert!(outcome.sample_link.as_deref().unwrap().contains("sar0002"));
        assert_eq!(outcome.total_files, 3);
    }
}
