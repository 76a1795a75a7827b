// Scanner: filters a pull request's changed-file listing down to the
// image files worth reviewing.

use tracing::debug;

use crate::api::ChangedFile;

/// Recognized image extensions, matched case-insensitively on the path
/// suffix only.
pub const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg"];

/// One image file found in the diff. `diff_index` points at the owning
/// entry of the changed-file listing, so a successful delete can
/// suppress that entry without touching its siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub path: String,
    pub diff_index: usize,
}

/// Whether a repo-relative path names an image file.
pub fn is_image_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Collect the qualifying image records from a changed-file listing.
/// An empty result means "nothing to review", not an error.
pub fn scan_changed_files(files: &[ChangedFile]) -> Vec<ImageRecord> {
    let records: Vec<ImageRecord> = files
        .iter()
        .enumerate()
        .filter(|(_, file)| is_image_path(&file.filename))
        .map(|(diff_index, file)| ImageRecord {
            path: file.filename.clone(),
            diff_index,
        })
        .collect();
    debug!(count = records.len(), "scanned changed files for images");
    records
}
