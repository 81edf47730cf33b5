use uploader_core::{AppViewModel, DisplayCategory, LogEntryView, ProgressView, ValidationView};

const BAR_WIDTH: usize = 20;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Turns view models into terminal lines, printing each log entry once.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    entries_shown: usize,
    alert_shown: Option<String>,
    validation_shown: Option<ValidationView>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines that are new since the previous call.
    pub fn render(&mut self, view: &AppViewModel) -> Vec<String> {
        let mut lines = Vec::new();

        if view.alert != self.alert_shown {
            if let Some(alert) = &view.alert {
                lines.push(format!("! {alert}"));
            }
            self.alert_shown = view.alert.clone();
        }

        // A fresh upload clears the log.
        if view.log.len() < self.entries_shown {
            self.entries_shown = 0;
        }
        for entry in &view.log[self.entries_shown..] {
            lines.extend(format_entry(entry));
        }
        self.entries_shown = view.log.len();

        if self.validation_shown.as_ref() != Some(&view.validation) {
            lines.extend(format_validation(&view.validation));
            self.validation_shown = Some(view.validation.clone());
        }

        lines
    }
}

fn category_tag(category: DisplayCategory) -> &'static str {
    match category {
        DisplayCategory::Error => "[error]",
        DisplayCategory::Success => "[done] ",
        DisplayCategory::Creation => "[doc]  ",
        DisplayCategory::Validation => "[check]",
        DisplayCategory::Neutral => "[info] ",
    }
}

pub fn format_entry(entry: &LogEntryView) -> Vec<String> {
    let mut lines = vec![format!("{} {}", category_tag(entry.category), entry.text)];
    if let Some(progress) = entry.progress {
        if let Some(bar) = progress_bar(progress) {
            lines.push(format!("        {bar}"));
        }
    }
    lines.extend(entry.details.iter().map(|detail| format!("        {detail}")));
    lines
}

/// `[############--------] 3/5 (60%)`; nothing when the total is zero.
pub fn progress_bar(progress: ProgressView) -> Option<String> {
    let ratio = progress.ratio()?;
    let percent = progress.percent()?;
    let filled = ((ratio * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    Some(format!(
        "[{}{}] {} ({:.0}%)",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        progress.label(),
        percent
    ))
}

pub fn format_validation(view: &ValidationView) -> Vec<String> {
    match view {
        ValidationView::Idle => Vec::new(),
        ValidationView::Validating { name } => vec![format!("Validating {name}...")],
        ValidationView::Accepted(file) => vec![
            "File validated successfully.".to_string(),
            format!("  Name: {}", file.name),
            format!("  Size: {:.2} MB", file.size_bytes as f64 / BYTES_PER_MB),
            format!("  Type: {}", file.content_type),
        ],
        ValidationView::Rejected { error } => vec![format!("Validation failed: {error}")],
    }
}
