//! Manual smoke test for the GitHub API interpreter.
//!
//! Exercises every read effect against a real repository, then runs the
//! divergence check if the repository is a fork. Nothing is written.
//!
//! # Usage
//!
//! 1. Optionally set `GITHUB_TOKEN` (anonymous access is heavily rate limited).
//!
//! 2. Set `TEST_REPO` to the repository to test against (e.g., `owner/repo`).
//!    A fork exercises more of the code.
//!
//! 3. Run: `cargo run --example github_smoke`

use std::env;
use std::time::Duration;

use backstroke::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use backstroke::github::OctocrabClient;
use backstroke::sync::{Remote, detect, opt_out_query};
use backstroke::types::{RepoId, RepositoryRef};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,backstroke=debug".into()),
        )
        .init();

    let test_repo = env::var("TEST_REPO").map_err(|_| {
        anyhow::anyhow!("TEST_REPO environment variable not set (e.g., owner/repo)")
    })?;
    let test_repo = test_repo
        .strip_prefix("https://github.com/")
        .unwrap_or(&test_repo);
    let repo_id = RepoId::parse(test_repo)
        .ok_or_else(|| anyhow::anyhow!("TEST_REPO must be in owner/repo format"))?;

    let client = match env::var("GITHUB_TOKEN") {
        Ok(token) => OctocrabClient::from_token(token)?,
        Err(_) => {
            println!("(no GITHUB_TOKEN; using anonymous access)");
            OctocrabClient::anonymous()?
        }
    };

    println!("\n=== GitHub Smoke Test ===\n");
    println!("Repository: {}\n", repo_id);

    let mut passed = 0;
    let mut failed = 0;

    let repo = match client
        .interpret(GitHubEffect::GetRepository {
            repo: repo_id.clone(),
        })
        .await
    {
        Ok(GitHubResponse::Repository(repo)) => {
            println!(
                "  [PASS] GetRepository: default branch {}, fork: {}",
                repo.default_branch, repo.is_fork
            );
            passed += 1;
            repo
        }
        Ok(other) => anyhow::bail!("GetRepository: unexpected response {:?}", other),
        Err(e) => anyhow::bail!("GetRepository: {}", e),
    };

    for (name, effect) in read_effects(&repo) {
        match client.interpret(effect).await {
            Ok(response) => {
                println!("  [PASS] {}: {}", name, describe(&response));
                passed += 1;
            }
            Err(e) => {
                println!("  [FAIL] {}: {}", name, e);
                failed += 1;
            }
        }
    }

    if repo.parent.is_some() {
        let remote = Remote::new(client, Duration::from_secs(30));
        match detect(&remote, &repo_id, None).await {
            Ok(result) => {
                println!(
                    "  [PASS] detect: diverged={} ({} vs {})",
                    result.diverged,
                    result.base_sha.short(),
                    result.upstream_sha.short()
                );
                passed += 1;
            }
            Err(e) => {
                println!("  [FAIL] detect: {}", e);
                failed += 1;
            }
        }
    }

    println!("\n=== Summary: {} passed, {} failed ===\n", passed, failed);
    if failed > 0 {
        anyhow::bail!("{} checks failed", failed);
    }
    Ok(())
}

fn read_effects(repo: &RepositoryRef) -> Vec<(&'static str, GitHubEffect)> {
    let id = repo.id();
    let mut effects = vec![
        (
            "GetBranch",
            GitHubEffect::GetBranch {
                repo: id.clone(),
                branch: repo.default_branch.clone(),
            },
        ),
        ("ListForks", GitHubEffect::ListForks { repo: id.clone() }),
        (
            "SearchIssues",
            GitHubEffect::SearchIssues {
                query: opt_out_query(&id),
            },
        ),
    ];
    if let Some(parent) = &repo.parent {
        effects.push((
            "ListOpenPullRequests",
            GitHubEffect::ListOpenPullRequests {
                repo: id,
                head: format!("{}:{}", parent.owner, parent.default_branch),
            },
        ));
    }
    effects
}

fn describe(response: &GitHubResponse) -> String {
    match response {
        GitHubResponse::Repository(repo) => repo.full_name.clone(),
        GitHubResponse::Branch(head) => format!("head {}", head.sha.short()),
        GitHubResponse::Forks(forks) => format!("{} forks", forks.len()),
        GitHubResponse::PullRequestCreated(pr) => format!("created {}", pr.number),
        GitHubResponse::PullRequests(pulls) => format!("{} open", pulls.len()),
        GitHubResponse::IssueSearch { total_count } => format!("{} matches", total_count),
    }
}
