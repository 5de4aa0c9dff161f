//! Unit tests for the OCI image prototype.

use std::collections::BTreeMap;

use rstest::{fixture, rstest};
use serde_json::{Map, Value, json};

use crate::{BuiltImage, OciImage, prototype};
use prototype_sdk::Prototype;

#[fixture]
fn oci() -> Prototype {
    prototype().expect("oci prototype registers")
}

fn payload(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("payload must be a JSON object, got {other}"),
    }
}

fn image(inputs: &[(&str, &str)], cache: bool) -> OciImage {
    OciImage {
        context: String::from("repo"),
        context_inputs: inputs
            .iter()
            .map(|(name, path)| ((*name).to_owned(), (*path).to_owned()))
            .collect::<BTreeMap<_, _>>(),
        dockerfile_path: String::new(),
        cache,
        output: String::from("image"),
    }
}

#[rstest]
fn config_mounts_context_inputs_inside_context() {
    let config = image(&[("deps", "vendor/deps"), ("assets", "./static")], false)
        .config()
        .expect("config computes");

    let inputs: Vec<_> = config
        .inputs()
        .iter()
        .map(|input| (input.name(), input.path().map(|path| path.as_str())))
        .collect();
    assert_eq!(
        inputs,
        [
            ("repo", None),
            ("assets", Some("repo/static")),
            ("deps", Some("repo/vendor/deps")),
        ]
    );
    let outputs: Vec<_> = config.outputs().iter().map(|output| output.name()).collect();
    assert_eq!(outputs, ["image"]);
    assert!(config.caches().is_empty());
}

#[rstest]
fn config_adds_cache_when_enabled() {
    let config = image(&[], true).config().expect("config computes");

    let caches: Vec<_> = config
        .caches()
        .iter()
        .filter_map(|cache| cache.path())
        .map(|path| path.as_str())
        .collect();
    assert_eq!(caches, ["cache"]);
}

#[rstest]
#[case("/etc/passwd")]
#[case("../sibling")]
#[case("nested/../../escape")]
fn config_rejects_paths_outside_context(#[case] path: &str) {
    let error = image(&[("bad", path)], false)
        .config()
        .expect_err("path rejected");

    assert!(error.to_string().contains("context input 'bad'"));
}

#[rstest]
fn introspection_lists_build_with_config(oci: Prototype) {
    let outcome = oci
        .info(&payload(json!({"context": "repo", "output": "image", "cache": true})))
        .expect("info succeeds");

    let encoded = serde_json::to_value(outcome.response()).expect("info encodes");
    assert_eq!(
        encoded,
        json!({
            "interface_version": "1.0",
            "icon": "mdi:docker",
            "messages": [{
                "name": "build",
                "config": {
                    "inputs": [{"name": "repo"}],
                    "outputs": [{"name": "image"}],
                    "caches": [{"path": "cache"}],
                },
            }],
        })
    );
}

#[rstest]
fn introspection_with_stage_lists_run_stage(oci: Prototype) {
    let outcome = oci
        .info(&payload(json!({"context": "repo", "output": "image", "stage": "test"})))
        .expect("info succeeds");

    assert_eq!(outcome.response().message_names(), ["run-stage"]);
}

#[rstest]
fn escaping_context_input_is_reported_not_listed(oci: Prototype) {
    let outcome = oci
        .info(&payload(json!({
            "context": "repo",
            "output": "image",
            "context_inputs": {"bad": "../../etc"},
        })))
        .expect("info succeeds");

    assert!(outcome.response().messages().is_empty());
    let diagnostic = outcome.diagnostics().first().expect("diagnostic recorded");
    assert_eq!(diagnostic.message(), "build");
}

#[rstest]
fn build_returns_image_artifact(oci: Prototype) {
    let responses = oci
        .run("build", &payload(json!({"context": "repo", "output": "image"})))
        .expect("build runs");

    let response = responses.first().expect("one response");
    assert_eq!(
        response.object(),
        &json!({"image": {"artifact": "image/image.tar"}})
    );
    let built: BuiltImage =
        serde_json::from_value(response.object().clone()).expect("artifact decodes");
    assert_eq!(built.image.path().as_str(), "image/image.tar");
}

#[rstest]
#[case(json!({"context": "repo"}))]
#[case(json!({"output": "image"}))]
#[case(json!({"context": "repo", "output": "image", "cache": "yes"}))]
fn incomplete_image_matches_nothing(oci: Prototype, #[case] value: Value) {
    let error = oci.run("build", &payload(value)).expect_err("no match");

    assert!(error.to_string().contains("no object satisfied payload"));
}
