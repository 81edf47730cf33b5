use crate::{AcceptedFile, DisplayCategory};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub uploading: bool,
    pub alert: Option<String>,
    pub log: Vec<LogEntryView>,
    pub validation: ValidationView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntryView {
    pub category: DisplayCategory,
    pub text: String,
    pub details: Vec<String>,
    pub progress: Option<ProgressView>,
}

/// Document creation progress as reported by the server.
///
/// The raw counts are kept as reported, so `created` may exceed `total`; the
/// fill ratio is clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressView {
    pub created: u64,
    pub total: u64,
}

impl ProgressView {
    /// Fill ratio in `[0, 1]`, or `None` when the total is zero.
    pub fn ratio(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some((self.created as f64 / self.total as f64).min(1.0))
    }

    /// Fill percentage in `[0, 100]`, or `None` when the total is zero.
    pub fn percent(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some((self.created as f64 * 100.0 / self.total as f64).min(100.0))
    }

    pub fn label(&self) -> String {
        format!("{}/{}", self.created, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValidationView {
    #[default]
    Idle,
    Validating { name: String },
    Accepted(AcceptedFile),
    Rejected { error: String },
}
