//! Step Builder: one workflow step entity → a complete [`StepRecord`].

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, instrument};

use crateprov_graph::{Entity, EntityGraph, ExampleIndex, RoCrate, entity_summary, require_entity};
use crateprov_shared::values::{non_empty, parse_position, reference_id};
use crateprov_shared::{EntitySummary, ExtractConfig, ProvenanceError, Result, resolve_path};

use crate::model::{LinkedFiles, LinkedParameter, StepRecord};
use crate::notebook::summarise_notebook;

/// Locate the notebook file a step describes.
///
/// A `source` property is resolved against the parent of the crate root
/// (absolute sources are used as-is); otherwise, or when the source does not
/// exist, the step identifier is taken as a path inside the crate root.
pub fn step_notebook_path(step: &Entity, root: &Path, step_id: &str) -> Result<PathBuf> {
    let mut candidates = Vec::with_capacity(2);
    if let Some(source) = step.str_prop("source") {
        let base = root.parent().unwrap_or(root);
        candidates.push(resolve_path(&base.join(source)));
    }
    candidates.push(resolve_path(&root.join(step_id)));

    candidates
        .iter()
        .find(|path| path.exists())
        .cloned()
        .ok_or_else(|| {
            let tried: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
            ProvenanceError::not_found(
                "notebook",
                format!("for step '{step_id}' (tried {})", tried.join(", ")),
            )
        })
}

/// Assemble the record for one step.
///
/// `krate` is the crate the step identifier is looked up in; `entities` is
/// the freshly loaded root graph used for parameter details.
#[instrument(skip_all, fields(step = step_id))]
pub fn build_step(
    krate: &RoCrate,
    root: &Path,
    step_id: &str,
    entities: &EntityGraph,
    example_index: &ExampleIndex,
    config: &ExtractConfig,
) -> Result<StepRecord> {
    let step = require_entity(krate.graph(), step_id)?;

    let position = step
        .get("position")
        .and_then(parse_position)
        .ok_or_else(|| {
            ProvenanceError::validation(format!("step '{step_id}' is missing a valid position"))
        })?;

    let notebook = step_notebook_path(step, root, step_id)?;

    let notebook_crate = match step.get("exampleOfWork") {
        Some(example @ Value::Object(_)) => {
            Some(summarise_notebook(root, example, config.inline_bytes)?)
        }
        _ => None,
    };

    let input = step.refs("input");
    let output = step.refs("output");

    let inputs_detail = parameter_details(&input, entities, root);
    let outputs_detail = parameter_details(&output, entities, root);

    let linked_files = LinkedFiles {
        inputs: linked_parameters(&input, example_index),
        outputs: linked_parameters(&output, example_index),
    };

    debug!(
        position,
        inputs = input.len(),
        outputs = output.len(),
        linked = linked_files.inputs.len() + linked_files.outputs.len(),
        notebook_cells = notebook_crate.as_ref().map_or(0, |nb| nb.steps.len()),
        "step built"
    );

    Ok(StepRecord {
        id: step.id().unwrap_or(step_id).to_string(),
        types: step.types(),
        name: step.str_prop("name").map(String::from),
        position,
        notebook: notebook.to_string_lossy().into_owned(),
        input,
        output,
        programming_language: step.get("programmingLanguage").cloned(),
        code_repository: code_repository(step),
        encoding_format: step.str_prop("encodingFormat").map(String::from),
        sha256: step.str_prop("sha256").map(String::from),
        notebook_crate,
        inputs_detail,
        outputs_detail,
        linked_files,
        properties: step.clone(),
    })
}

/// `codeRepository` as a URL string or the `@id` of a reference object.
fn code_repository(step: &Entity) -> Option<String> {
    let value = step.get("codeRepository")?;
    non_empty(value.as_str().or_else(|| reference_id(value))).map(String::from)
}

/// Summaries of the referenced parameters, each carrying the requested id.
fn parameter_details(ids: &[String], entities: &EntityGraph, root: &Path) -> Vec<EntitySummary> {
    ids.iter()
        .map(|id| entity_summary(entities.get(id), root).with_id(id.clone()))
        .collect()
}

fn linked_parameters(ids: &[String], example_index: &ExampleIndex) -> Vec<LinkedParameter> {
    ids.iter()
        .filter_map(|id| {
            let files = example_index.get(id).filter(|files| !files.is_empty())?;
            Some(LinkedParameter {
                parameter: id.clone(),
                files: files.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::TempCrate;
    use crateprov_graph::{build_example_index, load_entities};

    fn build(krate: &TempCrate, step_id: &str) -> Result<StepRecord> {
        let loaded = RoCrate::open(krate.root()).unwrap();
        let entities = load_entities(krate.root()).unwrap();
        let index = build_example_index(&entities, krate.root());
        build_step(
            &loaded,
            krate.root(),
            step_id,
            &entities,
            &index,
            &ExtractConfig::default(),
        )
    }

    #[test]
    fn source_is_resolved_against_crate_parent() {
        let krate = TempCrate::new();
        let outside = krate.root().parent().unwrap().join("code/run.ipynb");
        std::fs::create_dir_all(outside.parent().unwrap()).unwrap();
        std::fs::write(&outside, "{}").unwrap();

        let step = Entity::new(
            json!({"@id": "#s", "source": "code/run.ipynb"}).as_object().cloned().unwrap(),
        );
        let path = step_notebook_path(&step, krate.root(), "#s").unwrap();
        assert_eq!(path, outside.canonicalize().unwrap());
    }

    #[test]
    fn id_path_is_used_when_source_missing() {
        let krate = TempCrate::new();
        let written = krate.write("nb/run.ipynb", "{}");
        let step = Entity::new(json!({"@id": "nb/run.ipynb"}).as_object().cloned().unwrap());
        assert_eq!(
            step_notebook_path(&step, krate.root(), "nb/run.ipynb").unwrap(),
            written
        );

        let err = step_notebook_path(&step, krate.root(), "nb/gone.ipynb").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn builds_details_and_linked_files() {
        let krate = TempCrate::new();
        krate.write("run.ipynb", "{}");
        krate.write("data/shoreline.geojson", "{}");
        krate.manifest(vec![
            json!({
                "@id": "run.ipynb",
                "@type": ["File", "SoftwareSourceCode", "HowToStep"],
                "name": "Run",
                "position": "4",
                "programmingLanguage": {"@id": "https://w3id.org/workflowhub/workflow-ro-crate#python"},
                "codeRepository": {"@id": "https://github.com/example/coastsat"},
                "input": {"@id": "#in"},
                "output": [{"@id": "#out"}, {"@id": "#missing"}],
            }),
            json!({"@id": "#in", "@type": "FormalParameter", "name": "polygons"}),
            json!({"@id": "#out", "@type": "FormalParameter", "name": "shorelines", "encodingFormat": "application/geo+json"}),
            json!({"@id": "data/shoreline.geojson", "@type": "File", "name": "shoreline", "exampleOfWork": {"@id": "#out"}}),
        ]);

        let step = build(&krate, "run.ipynb").unwrap();
        assert_eq!(step.position, 4);
        assert_eq!(step.input, vec!["#in"]);
        assert_eq!(step.output, vec!["#out", "#missing"]);
        assert_eq!(step.code_repository.as_deref(), Some("https://github.com/example/coastsat"));
        assert!(step.notebook_crate.is_none());

        assert_eq!(step.outputs_detail[1].id.as_deref(), Some("#missing"));
        assert!(step.outputs_detail[1].name.is_none());
        assert_eq!(
            step.outputs_detail[0].encoding_format.as_deref(),
            Some("application/geo+json")
        );

        assert!(step.linked_files.inputs.is_empty());
        assert_eq!(step.linked_files.outputs.len(), 1);
        assert_eq!(step.linked_files.outputs[0].parameter, "#out");
        assert!(
            step.linked_files.outputs[0].files[0]
                .path
                .as_deref()
                .unwrap()
                .ends_with("data/shoreline.geojson")
        );
    }

    #[test]
    fn invalid_position_names_the_step() {
        let krate = TempCrate::new();
        krate.write("run.ipynb", "{}");
        krate.manifest(vec![json!({"@id": "run.ipynb", "position": "first"})]);

        let err = build(&krate, "run.ipynb").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("run.ipynb"));
    }

    #[test]
    fn missing_step_entity_is_not_found() {
        let krate = TempCrate::new();
        krate.manifest(vec![json!({"@id": "./"})]);
        assert!(build(&krate, "gone.ipynb").unwrap_err().is_not_found());
    }

    #[test]
    fn example_notebook_is_summarised() {
        let krate = TempCrate::new();
        krate.write("run.ipynb", "{}");
        krate.write("run.crate/cells/a.py", "x = 1\n");
        krate.write_manifest(
            "run.crate/ro-crate-metadata.json",
            vec![
                json!({"@id": "./", "mainEntity": {"@id": "run.ipynb"}}),
                json!({"@id": "run.ipynb", "step": [{"@id": "#c1"}]}),
                json!({"@id": "#c1", "position": 1, "workExample": {"@id": "cells/a.py"}}),
            ],
        );
        krate.manifest(vec![json!({
            "@id": "run.ipynb",
            "position": 1,
            "exampleOfWork": {"@id": "run.crate/ro-crate-metadata.json"},
        })]);

        let step = build(&krate, "run.ipynb").unwrap();
        let notebook = step.notebook_crate.unwrap();
        assert_eq!(notebook.steps.len(), 1);
        assert_eq!(
            notebook.steps[0].work_example.as_ref().unwrap().content.as_deref(),
            Some("x = 1\n")
        );
    }
}
