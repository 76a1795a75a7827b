// Workflow-level failure conditions. Each one aborts the review flow
// that raised it with a user-visible notice; none is fatal to the
// session and none affects another record's delete action.

/// Errors that abort the review workflow before or during setup.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// The user declined or emptied the access-token prompt.
    #[error("an access token is required to review images")]
    MissingCredential,

    /// The pull-request metadata did not expose a source-branch name.
    #[error("could not determine the source branch name")]
    BranchUnresolved,

    /// The changed-file listing contained no qualifying image paths.
    #[error("no images found in this pull request")]
    NoImagesFound,

    /// The token file could not be written.
    #[error("could not persist the access token: {0}")]
    TokenStore(#[from] std::io::Error),
}
