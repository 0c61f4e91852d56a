//! Update proposals: the pull requests that carry upstream changes into a fork.

use serde::{Deserialize, Serialize};

use super::ids::{PrNumber, RepoId, Sha};
use super::repo::RepositoryRef;

/// Everything needed to detect a duplicate proposal or to create a new one.
///
/// Derived fresh on every run from the fork's current metadata and the
/// upstream's current head; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalIntent {
    pub owner_of_fork: String,
    pub fork_name: String,
    pub base_branch: String,
    pub head_owner: String,
    pub head_branch: String,
    pub upstream_sha: Sha,
    /// Full name of the upstream, used in the title and body.
    pub upstream_full_name: String,
}

impl ProposalIntent {
    /// Builds the intent for merging `parent`'s default branch into `fork`'s.
    pub fn new(fork: &RepositoryRef, parent: &RepositoryRef, upstream_sha: Sha) -> Self {
        ProposalIntent {
            owner_of_fork: fork.owner.clone(),
            fork_name: fork.name.clone(),
            base_branch: fork.default_branch.clone(),
            head_owner: parent.owner.clone(),
            head_branch: parent.default_branch.clone(),
            upstream_sha,
            upstream_full_name: parent.full_name.clone(),
        }
    }

    pub fn fork(&self) -> RepoId {
        RepoId::new(&self.owner_of_fork, &self.fork_name)
    }

    /// The cross-repository head reference, `owner:branch`.
    pub fn head_ref(&self) -> String {
        format!("{}:{}", self.head_owner, self.head_branch)
    }

    pub fn title(&self) -> String {
        format!("Update from upstream repo {}", self.upstream_full_name)
    }

    pub fn body(&self) -> String {
        update_body(&self.upstream_full_name)
    }

    /// The create request for this intent.
    pub fn to_new_pull_request(&self) -> NewPullRequest {
        NewPullRequest {
            repo: self.fork(),
            title: self.title(),
            head: self.head_ref(),
            base: self.base_branch.clone(),
            body: self.body(),
        }
    }
}

/// Parameters of a pull request creation call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NewPullRequest {
    /// The repository the pull request is opened on.
    pub repo: RepoId,
    pub title: String,
    /// `owner:branch` of the changes to merge.
    pub head: String,
    /// Branch the changes merge into.
    pub base: String,
    pub body: String,
}

/// An open pull request as reported by the remote host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProposalRef {
    pub number: PrNumber,
    pub head_sha: Sha,
    pub html_url: Option<String>,
}

/// The body of an update proposal.
pub fn update_body(upstream_full_name: &str) -> String {
    format!(
        "Hello!\n\
         The remote `{upstream_full_name}` has some new changes that aren't in this fork.\n\
         \n\
         So, here they are, ready to be merged! :tada:\n\
         \n\
         If this pull request can be merged without conflict, you can publish your software\n\
         with these new changes. Otherwise, if you have merge conflicts, this\n\
         is the place to fix them.\n\
         \n\
         Have fun!\n\
         --------\n\
         Created by [Backstroke](http://backstroke.us). Oh yea, I'm a bot.\n"
    )
}
