// UI layer: interactive flows built on `dialoguer`. The main menu is
// re-rendered on every loop iteration, which doubles as the idempotent
// "ensure entry point present" step: a finished or failed review never
// leaves the session without a way back in.

use std::time::Duration;

use anyhow::Result;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::api::{ApiError, ChangedFile, GithubClient, PullRequest, RepoRef};
use crate::delete::{self, DeleteOutcome};
use crate::error::ReviewError;
use crate::review::ReviewGrid;
use crate::{scan, token};

/// Where to review, as far as the command line determined it. Missing
/// pieces are prompted for when the review opens.
#[derive(Debug, Default)]
pub struct ReviewTarget {
    pub repo: Option<RepoRef>,
    pub number: Option<u64>,
}

/// Main interactive menu. Runs until the user chooses "Exit". Failures
/// inside a review are printed and drop back to this menu; nothing here
/// is fatal to the session.
pub fn main_menu(target: ReviewTarget) -> Result<()> {
    loop {
        let items = vec!["Open image review", "Replace access token", "Exit"];
        let selection = Select::new().items(&items).default(0).interact()?;
        match selection {
            0 => {
                if let Err(e) = open_review(&target) {
                    println!("{e}");
                }
            }
            1 => match token::replace() {
                Ok(_) => println!("Token replaced."),
                Err(e) => println!("{e}"),
            },
            2 => break,
            _ => {}
        }
    }
    Ok(())
}

/// One review session: acquire the token, load the pull request, scan
/// for images, and run the review grid. Aborts before any panel is
/// shown when the token, the branch name, or the images are missing.
fn open_review(target: &ReviewTarget) -> Result<()> {
    let token = token::load_or_prompt()?;
    let client = GithubClient::from_env(token)?;
    let (repo, number) = resolve_target(target)?;

    let pb = spinner(format!("Loading pull request {repo}#{number}..."));
    let loaded = load_pull(&client, &repo, number);
    pb.finish_and_clear();
    let (pull, files) = loaded?;

    let branch = pull.head.branch;
    if branch.is_empty() {
        return Err(ReviewError::BranchUnresolved.into());
    }
    info!(branch = %branch, "resolved source branch");

    let records = scan::scan_changed_files(&files);
    if records.is_empty() {
        return Err(ReviewError::NoImagesFound.into());
    }
    println!("Found {} image(s) changed in {repo}#{number}.", records.len());

    let mut grid = ReviewGrid::new(records, &files, client.raw_host(), &repo, &branch);
    review_loop(&client, &repo, &branch, &mut grid)
}

fn load_pull(
    client: &GithubClient,
    repo: &RepoRef,
    number: u64,
) -> Result<(PullRequest, Vec<ChangedFile>), ApiError> {
    let pull = client.pull_request(repo, number)?;
    let files = client.pull_files(repo, number)?;
    Ok((pull, files))
}

fn resolve_target(target: &ReviewTarget) -> Result<(RepoRef, u64)> {
    let repo = match &target.repo {
        Some(repo) => repo.clone(),
        None => {
            let spec: String = Input::new()
                .with_prompt("Repository (owner/repo)")
                .interact_text()?;
            RepoRef::parse(spec.trim())?
        }
    };
    let number = match target.number {
        Some(n) => n,
        None => Input::new().with_prompt("Pull request number").interact_text()?,
    };
    Ok((repo, number))
}

/// The review grid loop: render, let the user pick a panel, run the
/// delete action, fold its outcome back into the grid. Each action is
/// independent; a failure leaves every other panel untouched.
fn review_loop(
    client: &GithubClient,
    repo: &RepoRef,
    branch: &str,
    grid: &mut ReviewGrid,
) -> Result<()> {
    loop {
        grid.render();
        let active = grid.active_panels();
        if active.is_empty() {
            println!("Nothing left to review.");
            break;
        }

        let mut items: Vec<String> = active
            .iter()
            .filter_map(|&i| grid.panel(i))
            .map(|p| format!("Delete {}", p.record.path))
            .collect();
        items.push("Back".to_string());
        let selection = Select::new()
            .with_prompt("Choose an image")
            .items(&items)
            .default(items.len() - 1)
            .interact()?;
        if selection == items.len() - 1 {
            break;
        }

        let panel_index = active[selection];
        let path = match grid.panel(panel_index) {
            Some(panel) => panel.record.path.clone(),
            None => continue,
        };
        let mut busy: Option<ProgressBar> = None;
        let outcome = delete::run_delete(
            client,
            repo,
            branch,
            &path,
            |p| {
                Confirm::new()
                    .with_prompt(format!(
                        "Are you sure you want to permanently delete \"{p}\" from branch \"{branch}\"?"
                    ))
                    .default(false)
                    .interact()
                    .unwrap_or(false)
            },
            |p| {
                grid.mark_busy(panel_index);
                busy = Some(spinner(format!("Deleting {p}...")));
            },
        );
        if let Some(pb) = busy.take() {
            pb.finish_and_clear();
        }

        match &outcome {
            DeleteOutcome::Cancelled => {}
            DeleteOutcome::AlreadyGone => {
                println!("File not found. It may have been deleted already.");
            }
            DeleteOutcome::Deleted => println!("Deleted {path}."),
            DeleteOutcome::FetchFailed(ApiError::Rejected { message, .. }) => {
                println!("Could not get file details. API error: {message}");
            }
            DeleteOutcome::FetchFailed(ApiError::Network(_)) => {
                println!("A network error occurred while getting file details.");
            }
            DeleteOutcome::DeleteFailed(ApiError::Rejected { message, .. }) => {
                println!("Failed to delete file. API error: {message}");
            }
            DeleteOutcome::DeleteFailed(ApiError::Network(_)) => {
                println!("A network error occurred during deletion.");
            }
        }
        grid.apply_outcome(panel_index, &outcome);
    }
    Ok(())
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
