// The two-step delete protocol. The contents API rejects any write
// that does not carry the current blob SHA of the object being
// written, so every delete action re-reads that SHA immediately before
// the delete call. The SHA flows from the read into the delete within
// one `run_delete` invocation; there is no way to issue the delete
// with a cached or earlier value.
//
// Known race: the SHA fetched here may belong to a newer branch state
// than the one the user reviewed. The SHA precondition still prevents
// blind overwrites, which is all this tool relies on.

use tracing::{info, warn};

use crate::api::{ApiError, RepoRef};

/// The remote contents surface the protocol runs against. Implemented
/// by the live client and by in-memory fakes in tests.
pub trait ContentsApi {
    /// Current blob SHA of `path` at `branch`, or `None` when the
    /// object is absent (already deleted).
    fn file_sha(&self, repo: &RepoRef, branch: &str, path: &str) -> Result<Option<String>, ApiError>;

    /// Delete the object described by `request`, conditioned on its SHA.
    fn delete_file(&self, request: &DeleteRequest) -> Result<(), ApiError>;
}

/// Everything one conditional delete call needs. Built per action from
/// the SHA the immediately preceding read returned, and dropped when
/// the action completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub path: String,
    pub sha: String,
}

impl DeleteRequest {
    /// Fixed commit-message template for review deletions.
    pub fn commit_message(&self) -> String {
        format!("chore: delete image ({})", self.path)
    }
}

/// Terminal state of one delete action.
#[derive(Debug)]
pub enum DeleteOutcome {
    /// The user declined the confirmation; nothing was sent.
    Cancelled,
    /// The read returned 404: the file is already gone. No delete call
    /// was issued.
    AlreadyGone,
    /// Read and delete both succeeded.
    Deleted,
    /// The metadata read failed; the record is untouched remotely.
    FetchFailed(ApiError),
    /// The delete call failed; the file still exists on the branch.
    DeleteFailed(ApiError),
}

/// Run one delete action to completion: confirm, fetch the current
/// SHA, delete conditioned on it. `confirm` gates the whole action;
/// `mark_busy` runs once, after confirmation and before the first
/// remote call, so the caller can take the record out of its
/// interactive state. No step retries and no step is skipped.
pub fn run_delete<A>(
    api: &A,
    repo: &RepoRef,
    branch: &str,
    path: &str,
    confirm: impl FnOnce(&str) -> bool,
    mark_busy: impl FnOnce(&str),
) -> DeleteOutcome
where
    A: ContentsApi + ?Sized,
{
    if !confirm(path) {
        return DeleteOutcome::Cancelled;
    }
    mark_busy(path);

    info!(path, branch, "step 1: fetching current content SHA");
    let sha = match api.file_sha(repo, branch, path) {
        Ok(Some(sha)) => sha,
        Ok(None) => {
            info!(path, "file absent on branch, treating as already deleted");
            return DeleteOutcome::AlreadyGone;
        }
        Err(err) => {
            warn!(path, error = %err, "could not fetch content SHA");
            return DeleteOutcome::FetchFailed(err);
        }
    };

    let request = DeleteRequest {
        owner: repo.owner.clone(),
        repo: repo.repo.clone(),
        branch: branch.to_string(),
        path: path.to_string(),
        sha,
    };
    info!(path, sha = %request.sha, "step 2: deleting with fresh SHA");
    match api.delete_file(&request) {
        Ok(()) => DeleteOutcome::Deleted,
        Err(err) => {
            warn!(path, error = %err, "delete call failed");
            DeleteOutcome::DeleteFailed(err)
        }
    }
}
