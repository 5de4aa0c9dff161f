//! Unit tests for git prototype resolution.

use rstest::{fixture, rstest};
use serde_json::{Map, Value, json};

use crate::{Branch, Commit, Repository, prototype};
use prototype_sdk::{Prototype, PrototypeError};

#[fixture]
fn git() -> Prototype {
    prototype().expect("git prototype registers")
}

fn payload(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("payload must be a JSON object, got {other}"),
    }
}

fn listed(prototype: &Prototype, value: Value) -> Vec<(String, String)> {
    prototype
        .resolve(&payload(value), None)
        .expect("resolution runs")
        .candidates()
        .iter()
        .map(|candidate| (candidate.shape().to_owned(), candidate.message().to_owned()))
        .collect()
}

fn pair(shape: &str, message: &str) -> (String, String) {
    (shape.to_owned(), message.to_owned())
}

#[rstest]
fn repository_payload_lists_branches(git: Prototype) {
    assert_eq!(
        listed(&git, json!({"uri": "https://example.com/repo.git"})),
        [pair("Repository", "list")]
    );
}

#[rstest]
fn branch_payload_is_claimed_by_branch_only(git: Prototype) {
    assert_eq!(
        listed(&git, json!({"uri": "u", "branch": "main"})),
        [pair("Branch", "list")]
    );
}

#[rstest]
fn push_request_selects_put(git: Prototype) {
    assert_eq!(
        listed(&git, json!({"uri": "u", "branch": "main", "repository": "out"})),
        [pair("Branch", "put")]
    );
}

#[rstest]
fn commit_payload_supports_no_messages(git: Prototype) {
    let raw = payload(json!({"uri": "u", "branch": "main", "ref": "abcdef"}));

    let resolution = git.resolve(&raw, None).expect("resolution runs");

    assert!(resolution.candidates().is_empty());
    assert_eq!(
        resolution.matched_shapes(),
        ["Repository", "Branch", "Commit"]
    );
}

#[rstest]
fn listing_branches_returns_branch_objects(git: Prototype) {
    let responses = git
        .run("list", &payload(json!({"uri": "u", "branch_filter": "feature/*"})))
        .expect("list runs");

    let branches: Vec<Branch> = responses
        .iter()
        .map(|response| serde_json::from_value(response.object().clone()).expect("branch object"))
        .collect();
    let names: Vec<_> = branches.iter().map(|branch| branch.branch.as_str()).collect();
    assert_eq!(names, ["master", "dev"]);
    assert!(branches.iter().all(|branch| branch.repository.uri == "u"));
}

#[rstest]
fn listing_commits_returns_commits_with_metadata(git: Prototype) {
    let responses = git
        .run("list", &payload(json!({"uri": "u", "branch": "dev", "paths": ["src"]})))
        .expect("list runs");

    let commits: Vec<Commit> = responses
        .iter()
        .map(|response| serde_json::from_value(response.object().clone()).expect("commit object"))
        .collect();
    let refs: Vec<_> = commits.iter().map(|commit| commit.reference.as_str()).collect();
    assert_eq!(refs, ["abcdef", "ghijkl"]);
    assert!(
        responses
            .iter()
            .all(|response| response.metadata().iter().any(|field| field.value() == "dev"))
    );
}

#[rstest]
fn commit_round_trips_through_flattened_json() {
    let commit = Commit {
        branch: Branch {
            repository: Repository {
                uri: String::from("u"),
                private_key: String::new(),
            },
            branch: String::from("main"),
        },
        reference: String::from("abcdef"),
    };

    let encoded = serde_json::to_value(&commit).expect("commit encodes");

    assert_eq!(
        encoded,
        json!({"uri": "u", "private_key": "", "branch": "main", "ref": "abcdef"})
    );
}

#[rstest]
fn list_on_commit_is_no_match(git: Prototype) {
    let error = git
        .run("list", &payload(json!({"uri": "u", "branch": "main", "ref": "abcdef"})))
        .expect_err("no candidate");

    assert!(matches!(error, PrototypeError::NoMatch { .. }));
}
