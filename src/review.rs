// Presenter: the review grid. One panel per image record, each panel
// independently addressable, rendered next to the changed-file listing
// the records came from. A successful delete removes the panel and
// suppresses the matching listing entry; the listing entry itself is
// never removed.

use crossterm::style::Stylize;

use crate::api::{ChangedFile, RepoRef};
use crate::delete::DeleteOutcome;
use crate::scan::ImageRecord;

/// Lifecycle of one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    /// Interactive: shown in the grid and selectable for deletion.
    Active,
    /// A delete action is in flight; not selectable.
    Busy,
    /// Deleted (or found already deleted); no longer shown.
    Removed,
}

/// One visual unit of the grid.
#[derive(Debug)]
pub struct Panel {
    pub record: ImageRecord,
    pub preview_url: String,
    state: PanelState,
}

impl Panel {
    pub fn state(&self) -> PanelState {
        self.state
    }
}

#[derive(Debug)]
struct DiffEntry {
    path: String,
    status: String,
    suppressed: bool,
}

/// Address of an image on the raw-content host. Used only as a preview
/// link; the bytes are never transferred here.
pub fn preview_url(raw_host: &str, repo: &RepoRef, branch: &str, path: &str) -> String {
    format!("{}/{}/{}/{}/{}", raw_host, repo.owner, repo.repo, branch, path)
}

/// Grid state for one review session.
pub struct ReviewGrid {
    branch: String,
    entries: Vec<DiffEntry>,
    panels: Vec<Panel>,
}

impl ReviewGrid {
    pub fn new(
        records: Vec<ImageRecord>,
        files: &[ChangedFile],
        raw_host: &str,
        repo: &RepoRef,
        branch: &str,
    ) -> Self {
        let entries = files
            .iter()
            .map(|f| DiffEntry {
                path: f.filename.clone(),
                status: f.status.clone(),
                suppressed: false,
            })
            .collect();
        let panels = records
            .into_iter()
            .map(|record| Panel {
                preview_url: preview_url(raw_host, repo, branch, &record.path),
                record,
                state: PanelState::Active,
            })
            .collect();
        ReviewGrid {
            branch: branch.to_string(),
            entries,
            panels,
        }
    }

    pub fn panel(&self, index: usize) -> Option<&Panel> {
        self.panels.get(index)
    }

    /// Indices of the panels still open for a delete action.
    pub fn active_panels(&self) -> Vec<usize> {
        self.panels
            .iter()
            .enumerate()
            .filter(|(_, p)| p.state == PanelState::Active)
            .map(|(i, _)| i)
            .collect()
    }

    /// Take the panel at `index` out of its interactive state. An
    /// out-of-range index is ignored.
    pub fn mark_busy(&mut self, index: usize) {
        if let Some(panel) = self.panels.get_mut(index) {
            panel.state = PanelState::Busy;
        }
    }

    /// Whether the listing entry at `diff_index` is visually
    /// suppressed. Unknown indices are not suppressed.
    pub fn is_suppressed(&self, diff_index: usize) -> bool {
        self.entries.get(diff_index).map_or(false, |e| e.suppressed)
    }

    /// Move a finished action's panel into its terminal presentation.
    /// Failures restore the panel fully, including its action control,
    /// so the record stays selectable for a manual retry. An
    /// out-of-range index is ignored.
    pub fn apply_outcome(&mut self, index: usize, outcome: &DeleteOutcome) {
        let Some(panel) = self.panels.get_mut(index) else {
            return;
        };
        match outcome {
            DeleteOutcome::Cancelled => {}
            DeleteOutcome::AlreadyGone => {
                panel.state = PanelState::Removed;
            }
            DeleteOutcome::Deleted => {
                panel.state = PanelState::Removed;
                let diff_index = panel.record.diff_index;
                if let Some(entry) = self.entries.get_mut(diff_index) {
                    entry.suppressed = true;
                }
            }
            DeleteOutcome::FetchFailed(_) | DeleteOutcome::DeleteFailed(_) => {
                panel.state = PanelState::Active;
            }
        }
    }

    /// Print the changed-file listing and the open panels.
    pub fn render(&self) {
        println!();
        println!("{}", format!("Changed files ({})", self.branch).bold());
        for entry in &self.entries {
            if entry.suppressed {
                println!("  {}", entry.path.as_str().crossed_out().dim());
            } else {
                println!("  {} ({})", entry.path, entry.status);
            }
        }
        println!();
        let open: Vec<&Panel> = self
            .panels
            .iter()
            .filter(|p| p.state != PanelState::Removed)
            .collect();
        if open.is_empty() {
            println!("{}", "No images left to review.".dim());
            return;
        }
        println!("{}", "Images".bold());
        for panel in open {
            let name = panel.record.path.rsplit('/').next().unwrap_or(&panel.record.path);
            match panel.state {
                PanelState::Busy => {
                    println!("  {}", name.dim());
                    println!("    {}", panel.record.path.as_str().dim());
                    println!("    {}", panel.preview_url.as_str().dim());
                }
                _ => {
                    println!("  {}", name.bold());
                    println!("    {}", panel.record.path);
                    println!("    {}", panel.preview_url.as_str().underlined());
                }
            }
        }
        println!();
    }
}
