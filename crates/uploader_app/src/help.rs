//! Reference for the stage events the upload endpoint streams back.

use anyhow::{anyhow, Result};
use serde_json::{json, Value};

pub struct StageGuide {
    pub stage: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub example: Value,
}

pub fn stage_guides() -> Vec<StageGuide> {
    vec![
        StageGuide {
            stage: "file_validation",
            title: "File Validation",
            description: "Initial validation of the request and files",
            example: json!({
                "stage": "file_validation",
                "message": "Validating files",
                "invalid_files": ["example.exe"],
            }),
        },
        StageGuide {
            stage: "document_creation",
            title: "Document Creation",
            description: "Creating documents for each valid file",
            example: json!({
                "stage": "document_creation",
                "message": "Successfully created document: example.pdf",
                "created_count": 1,
                "valid_files_count": 5,
            }),
        },
        StageGuide {
            stage: "folder_structure",
            title: "Folder Structure",
            description: "Creating and organizing folder hierarchy",
            example: json!({
                "stage": "folder_structure",
                "message": "Creating folder structure",
                "renamed_folders": [{
                    "original_path": "/path/to/folder",
                    "new_name": "folder (1)",
                    "parent_folder": "parent",
                }],
            }),
        },
        StageGuide {
            stage: "file_folder_relation",
            title: "File-Folder Relation",
            description: "Updating relationships between files and folders",
            example: json!({
                "stage": "file_folder_relation",
                "message": "Updating document relationships",
            }),
        },
        StageGuide {
            stage: "error",
            title: "Error",
            description: "Error occurred during the upload process",
            example: json!({
                "stage": "error",
                "message": "Error message here",
                "error": "Detailed error description",
            }),
        },
        StageGuide {
            stage: "upload_complete",
            title: "Upload Complete",
            description: "Upload process successfully completed",
            example: json!({
                "stage": "upload_complete",
                "message": "Upload complete",
                "total_files": 5,
                "total_folders": 2,
            }),
        },
    ]
}

/// Guide text for one stage, or for all of them when `stage` is `None`.
pub fn render_guide(stage: Option<&str>) -> Result<String> {
    let guides = stage_guides();
    let selected: Vec<&StageGuide> = match stage {
        None => guides.iter().collect(),
        Some(name) => {
            let guide = guides.iter().find(|guide| guide.stage == name).ok_or_else(|| {
                let known: Vec<&str> = guides.iter().map(|guide| guide.stage).collect();
                anyhow!("unknown stage: {name} (known: {})", known.join(", "))
            })?;
            vec![guide]
        }
    };

    let mut sections = Vec::with_capacity(selected.len());
    for guide in selected {
        let example = serde_json::to_string_pretty(&guide.example)?;
        let indented: Vec<String> = example.lines().map(|line| format!("    {line}")).collect();
        sections.push(format!(
            "{} ({})\n  {}\n  Example response:\n{}",
            guide.title,
            guide.stage,
            guide.description,
            indented.join("\n")
        ));
    }
    Ok(sections.join("\n\n"))
}
