/// Styling bucket for one progress log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayCategory {
    Error,
    Success,
    Creation,
    Validation,
    #[default]
    Neutral,
}

/// Map a server stage name to its display category.
///
/// Total over all inputs: stages this client does not know about render as
/// [`DisplayCategory::Neutral`].
pub fn classify_stage(stage: &str) -> DisplayCategory {
    match stage {
        "error" => DisplayCategory::Error,
        "upload_complete" => DisplayCategory::Success,
        "document_creation" => DisplayCategory::Creation,
        "file_validation" => DisplayCategory::Validation,
        _ => DisplayCategory::Neutral,
    }
}
