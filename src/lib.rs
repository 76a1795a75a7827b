// Library root
// ------------
// This crate exposes a small library surface for the CLI. The binary
// (`main.rs`) uses these modules to implement the interactive review.
//
// Module responsibilities:
// - `api`: Blocking HTTP client for the GitHub REST API (pull-request
//   metadata, changed-file listing, contents read/delete).
// - `scan`: Filters the changed-file listing to image records.
// - `delete`: The two-step fetch-SHA-then-delete protocol, over a
//   trait so it can be exercised without a network.
// - `review`: Review-grid state and rendering; one panel per record.
// - `token`: Persisted access token with a first-use prompt.
// - `error`: Workflow failure conditions.
// - `ui`: The interactive menu and review loop tying it all together.
pub mod api;
pub mod delete;
pub mod error;
pub mod review;
pub mod scan;
pub mod token;
pub mod ui;
