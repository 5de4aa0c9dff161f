//! Git prototype: repositories, branches and commits.
//!
//! The three object shapes nest: a [`Branch`] embeds its [`Repository`] and a
//! [`Commit`] embeds its [`Branch`]. A branch payload therefore also decodes
//! as a repository, and it is the leftover `branch` key that keeps the
//! repository's messages from claiming it.
//!
//! Handlers here are placeholders that log what they would do and return
//! representative result objects.

#[cfg(test)]
mod tests;

use prototype_sdk::{
    HandlerResult, Message, MessageResponse, ObjectDef, Prototype, RegistrationError, Schema,
    Shape,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Tracing target for git handlers.
const GIT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::handlers");

/// A remote git repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Repository {
    /// Clone URI.
    pub uri: String,
    /// SSH key used to authenticate, if any.
    pub private_key: String,
}

impl Shape for Repository {
    fn schema() -> Schema {
        Schema::builder("Repository")
            .required("uri")
            .optional("private_key")
            .build()
    }
}

/// A branch of a [`Repository`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branch {
    /// Repository holding the branch.
    #[serde(flatten)]
    pub repository: Repository,
    /// Branch name.
    pub branch: String,
}

impl Shape for Branch {
    fn schema() -> Schema {
        Schema::builder("Branch")
            .embed(Repository::schema())
            .required("branch")
            .build()
    }
}

/// A commit on a [`Branch`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Commit {
    /// Branch holding the commit.
    #[serde(flatten)]
    pub branch: Branch,
    /// Commit reference.
    #[serde(rename = "ref")]
    pub reference: String,
}

impl Shape for Commit {
    fn schema() -> Schema {
        Schema::builder("Commit")
            .embed(Branch::schema())
            .required("ref")
            .build()
    }
}

/// Request for [`Repository`]'s `list` message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListBranchesRequest {
    /// Glob restricting the listed branches.
    pub branch_filter: String,
}

impl Shape for ListBranchesRequest {
    fn schema() -> Schema {
        Schema::builder("ListBranchesRequest")
            .optional("branch_filter")
            .build()
    }
}

/// Request for [`Branch`]'s `list` message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListCommitsRequest {
    /// Paths restricting the listed commits.
    pub paths: Vec<String>,
}

impl Shape for ListCommitsRequest {
    fn schema() -> Schema {
        Schema::builder("ListCommitsRequest").optional("paths").build()
    }
}

/// Request for [`Branch`]'s `put` message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushRequest {
    /// Directory holding the repository to push.
    pub repository: String,
}

impl Shape for PushRequest {
    fn schema() -> Schema {
        Schema::builder("PushRequest").required("repository").build()
    }
}

fn list_branches(repository: &Repository, request: &ListBranchesRequest) -> HandlerResult {
    info!(
        target: GIT_TARGET,
        uri = %repository.uri,
        filter = %request.branch_filter,
        "listing branches"
    );
    ["master", "dev"]
        .into_iter()
        .map(|name| {
            MessageResponse::new(&Branch {
                repository: repository.clone(),
                branch: name.to_owned(),
            })
        })
        .collect()
}

fn list_commits(branch: &Branch, request: &ListCommitsRequest) -> HandlerResult {
    info!(
        target: GIT_TARGET,
        branch = %branch.branch,
        paths = ?request.paths,
        "listing commits"
    );
    ["abcdef", "ghijkl"]
        .into_iter()
        .map(|reference| {
            MessageResponse::new(&Commit {
                branch: branch.clone(),
                reference: reference.to_owned(),
            })
            .map(|response| response.with_metadata("branch", branch.branch.as_str()))
        })
        .collect()
}

fn push(branch: &Branch, request: &PushRequest) -> HandlerResult {
    info!(
        target: GIT_TARGET,
        branch = %branch.branch,
        source = %request.repository,
        "pushing a new commit"
    );
    Ok(Vec::new())
}

/// Declares the git prototype.
///
/// # Errors
///
/// Returns [`RegistrationError`] if the declarations are inconsistent.
pub fn prototype() -> Result<Prototype, RegistrationError> {
    Prototype::builder()
        .icon("mdi:git")
        .object(ObjectDef::<Repository>::new().message(Message::with_request("list", list_branches)))
        .object(
            ObjectDef::<Branch>::new()
                .message(Message::with_request("list", list_commits))
                .message(Message::with_request("put", push)),
        )
        .object(ObjectDef::<Commit>::new())
        .build()
}
