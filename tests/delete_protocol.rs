// End-to-end tests of the delete protocol against an in-memory fake of
// the contents API, including the grid transitions each outcome drives.

use std::cell::RefCell;
use std::collections::HashMap;

use reqwest::StatusCode;

use image_review_cli::api::{ApiError, ChangedFile, RepoRef};
use image_review_cli::delete::{run_delete, ContentsApi, DeleteOutcome, DeleteRequest};
use image_review_cli::review::{PanelState, ReviewGrid};
use image_review_cli::scan;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    FetchSha {
        path: String,
        branch: String,
    },
    Delete {
        path: String,
        branch: String,
        sha: String,
        message: String,
    },
}

#[derive(Clone)]
struct Fault {
    status: u16,
    message: &'static str,
}

impl Fault {
    fn to_error(&self) -> ApiError {
        ApiError::Rejected {
            status: StatusCode::from_u16(self.status).unwrap(),
            message: self.message.to_string(),
        }
    }
}

/// Scriptable contents API that records every call it receives.
#[derive(Default)]
struct FakeContents {
    shas: RefCell<HashMap<String, Result<Option<String>, Fault>>>,
    deletes: RefCell<HashMap<String, Result<(), Fault>>>,
    calls: RefCell<Vec<Call>>,
}

impl FakeContents {
    fn set_sha(&self, path: &str, sha: &str) {
        self.shas.borrow_mut().insert(path.into(), Ok(Some(sha.into())));
    }

    fn set_absent(&self, path: &str) {
        self.shas.borrow_mut().insert(path.into(), Ok(None));
    }

    fn fail_sha(&self, path: &str, status: u16, message: &'static str) {
        self.shas.borrow_mut().insert(path.into(), Err(Fault { status, message }));
    }

    fn fail_delete(&self, path: &str, status: u16, message: &'static str) {
        self.deletes.borrow_mut().insert(path.into(), Err(Fault { status, message }));
    }

    fn allow_delete(&self, path: &str) {
        self.deletes.borrow_mut().insert(path.into(), Ok(()));
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl ContentsApi for FakeContents {
    fn file_sha(&self, _repo: &RepoRef, branch: &str, path: &str) -> Result<Option<String>, ApiError> {
        self.calls.borrow_mut().push(Call::FetchSha {
            path: path.to_string(),
            branch: branch.to_string(),
        });
        match self.shas.borrow().get(path) {
            Some(Ok(sha)) => Ok(sha.clone()),
            Some(Err(fault)) => Err(fault.to_error()),
            None => Ok(None),
        }
    }

    fn delete_file(&self, request: &DeleteRequest) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(Call::Delete {
            path: request.path.clone(),
            branch: request.branch.clone(),
            sha: request.sha.clone(),
            message: request.commit_message(),
        });
        match self.deletes.borrow().get(&request.path) {
            Some(Ok(())) => Ok(()),
            Some(Err(fault)) => Err(fault.to_error()),
            None => Ok(()),
        }
    }
}

fn repo() -> RepoRef {
    RepoRef {
        owner: "octocat".into(),
        repo: "hello-world".into(),
    }
}

fn changed_files() -> Vec<ChangedFile> {
    ["img1.png", "diagram.svg", "README.md"]
        .iter()
        .map(|p| ChangedFile {
            filename: p.to_string(),
            status: "added".into(),
        })
        .collect()
}

fn grid(files: &[ChangedFile]) -> ReviewGrid {
    let records = scan::scan_changed_files(files);
    ReviewGrid::new(records, files, "https://raw.example.com", &repo(), "feature")
}

#[test]
fn declined_confirmation_issues_no_remote_calls() {
    let api = FakeContents::default();
    api.set_sha("img1.png", "abc");

    let outcome = run_delete(&api, &repo(), "feature", "img1.png", |_| false, |_| {});

    assert!(matches!(outcome, DeleteOutcome::Cancelled));
    assert!(api.calls().is_empty());
}

#[test]
fn delete_call_carries_the_sha_of_the_immediately_preceding_fetch() {
    let api = FakeContents::default();
    api.set_sha("img1.png", "sha-one");
    api.allow_delete("img1.png");

    run_delete(&api, &repo(), "feature", "img1.png", |_| true, |_| {});

    // The branch moved between actions: a second delete must pick up
    // the new SHA, never the one from the earlier fetch.
    api.set_sha("img1.png", "sha-two");
    run_delete(&api, &repo(), "feature", "img1.png", |_| true, |_| {});

    let calls = api.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(
        calls[1],
        Call::Delete {
            path: "img1.png".into(),
            branch: "feature".into(),
            sha: "sha-one".into(),
            message: "chore: delete image (img1.png)".into(),
        }
    );
    assert_eq!(
        calls[3],
        Call::Delete {
            path: "img1.png".into(),
            branch: "feature".into(),
            sha: "sha-two".into(),
            message: "chore: delete image (img1.png)".into(),
        }
    );
}

#[test]
fn successful_delete_removes_only_its_panel_and_diff_entry() {
    let api = FakeContents::default();
    api.set_sha("img1.png", "abc");
    api.allow_delete("img1.png");
    let files = changed_files();
    let mut grid = grid(&files);

    let outcome = run_delete(&api, &repo(), "feature", "img1.png", |_| true, |_| {
        grid.mark_busy(0)
    });
    grid.apply_outcome(0, &outcome);

    assert!(matches!(outcome, DeleteOutcome::Deleted));
    assert_eq!(grid.panel(0).unwrap().state(), PanelState::Removed);
    assert!(grid.is_suppressed(0));
    // The sibling stays fully intact and interactive.
    assert_eq!(grid.panel(1).unwrap().state(), PanelState::Active);
    assert!(!grid.is_suppressed(1));
    assert_eq!(grid.active_panels(), vec![1]);
}

#[test]
fn read_404_skips_the_delete_and_removes_the_panel() {
    let api = FakeContents::default();
    api.set_absent("img1.png");
    let files = changed_files();
    let mut grid = grid(&files);

    let outcome = run_delete(&api, &repo(), "feature", "img1.png", |_| true, |_| {
        grid.mark_busy(0)
    });
    grid.apply_outcome(0, &outcome);

    assert!(matches!(outcome, DeleteOutcome::AlreadyGone));
    assert_eq!(api.calls(), vec![Call::FetchSha {
        path: "img1.png".into(),
        branch: "feature".into(),
    }]);
    assert_eq!(grid.panel(0).unwrap().state(), PanelState::Removed);
    // The diff entry is untouched when no delete was issued.
    assert!(!grid.is_suppressed(0));
}

#[test]
fn rejected_delete_restores_the_panel_and_surfaces_the_message() {
    let api = FakeContents::default();
    api.set_sha("img1.png", "abc");
    api.fail_delete("img1.png", 409, "SHA mismatch");
    let files = changed_files();
    let mut grid = grid(&files);

    let outcome = run_delete(&api, &repo(), "feature", "img1.png", |_| true, |_| {
        grid.mark_busy(0)
    });
    grid.apply_outcome(0, &outcome);

    match &outcome {
        DeleteOutcome::DeleteFailed(err) => assert_eq!(err.to_string(), "SHA mismatch"),
        other => panic!("expected DeleteFailed, got {other:?}"),
    }
    assert_eq!(grid.panel(0).unwrap().state(), PanelState::Active);
    assert!(!grid.is_suppressed(0));

    // The record is still selectable; a retry after the remote settles
    // goes through.
    api.allow_delete("img1.png");
    let retry = run_delete(&api, &repo(), "feature", "img1.png", |_| true, |_| {
        grid.mark_busy(0)
    });
    grid.apply_outcome(0, &retry);
    assert!(matches!(retry, DeleteOutcome::Deleted));
    assert_eq!(grid.panel(0).unwrap().state(), PanelState::Removed);
}

#[test]
fn failed_metadata_read_issues_no_delete_and_restores_the_panel() {
    let api = FakeContents::default();
    api.fail_sha("img1.png", 500, "server error");
    let files = changed_files();
    let mut grid = grid(&files);

    let outcome = run_delete(&api, &repo(), "feature", "img1.png", |_| true, |_| {
        grid.mark_busy(0)
    });
    grid.apply_outcome(0, &outcome);

    match &outcome {
        DeleteOutcome::FetchFailed(err) => assert_eq!(err.to_string(), "server error"),
        other => panic!("expected FetchFailed, got {other:?}"),
    }
    assert_eq!(api.calls().len(), 1);
    assert_eq!(grid.panel(0).unwrap().state(), PanelState::Active);
}
