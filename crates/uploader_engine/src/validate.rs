use tokio::io::AsyncReadExt;
use uploader_logging::{uploader_debug, uploader_info};

use crate::SelectedFile;

const MIB: u64 = 1024 * 1024;

/// Expected declared type and leading bytes for one allowed extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTypeRule {
    pub extension: &'static str,
    pub mime_type: &'static str,
    pub signature: &'static [u8],
}

pub static FILE_TYPE_RULES: [FileTypeRule; 9] = [
    // Images
    FileTypeRule {
        extension: ".png",
        mime_type: "image/png",
        signature: &[0x89, 0x50, 0x4e, 0x47],
    },
    FileTypeRule {
        extension: ".jpg",
        mime_type: "image/jpeg",
        signature: &[0xff, 0xd8, 0xff],
    },
    FileTypeRule {
        extension: ".jpeg",
        mime_type: "image/jpeg",
        signature: &[0xff, 0xd8, 0xff],
    },
    FileTypeRule {
        extension: ".webp",
        mime_type: "image/webp",
        signature: &[0x52, 0x49, 0x46, 0x46],
    },
    // Documents
    FileTypeRule {
        extension: ".pdf",
        mime_type: "application/pdf",
        signature: &[0x25, 0x50, 0x44, 0x46],
    },
    FileTypeRule {
        extension: ".doc",
        mime_type: "application/msword",
        signature: &[0xd0, 0xcf, 0x11, 0xe0],
    },
    FileTypeRule {
        extension: ".docx",
        mime_type: "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        signature: &[0x50, 0x4b, 0x03, 0x04],
    },
    FileTypeRule {
        extension: ".xls",
        mime_type: "application/vnd.ms-excel",
        signature: &[0xd0, 0xcf, 0x11, 0xe0],
    },
    FileTypeRule {
        extension: ".xlsx",
        mime_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        signature: &[0x50, 0x4b, 0x03, 0x04],
    },
];

pub fn rule_for_extension(extension: &str) -> Option<&'static FileTypeRule> {
    FILE_TYPE_RULES
        .iter()
        .find(|rule| rule.extension == extension)
}

pub fn allowed_extensions() -> Vec<&'static str> {
    FILE_TYPE_RULES.iter().map(|rule| rule.extension).collect()
}

/// Text after the last `.` of `name`, lowercased and prefixed with `.`.
///
/// A name without any dot yields `.` followed by the whole lowercased name.
pub fn extension_of(name: &str) -> String {
    let tail = name.rsplit('.').next().unwrap_or(name);
    format!(".{}", tail.to_lowercase())
}

/// Byte-for-byte prefix check; a header shorter than the signature fails.
pub fn signature_matches(header: &[u8], signature: &[u8]) -> bool {
    header.len() >= signature.len() && header[..signature.len()] == *signature
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationSettings {
    pub max_file_bytes: u64,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            max_file_bytes: 50 * MIB,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFile {
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub rule: FileTypeRule,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    #[error("File size exceeds {} limit", describe_limit(.max_bytes))]
    TooLarge { size: u64, max_bytes: u64 },
    #[error("Invalid file type. Allowed types are: {}", allowed_extensions().join(", "))]
    UnsupportedExtension { extension: String },
    #[error("Invalid file format. File appears to be modified or corrupted.")]
    MimeMismatch {
        expected: &'static str,
        declared: Option<String>,
    },
    #[error("File content doesn't match its extension. File may be renamed or corrupted.")]
    SignatureMismatch { extension: &'static str },
    #[error("Could not read file: {message}")]
    Read { message: String },
    #[error("Validation was interrupted.")]
    Interrupted,
}

fn describe_limit(max_bytes: &u64) -> String {
    if *max_bytes >= MIB && max_bytes % MIB == 0 {
        format!("{} MiB", max_bytes / MIB)
    } else {
        format!("{max_bytes} bytes")
    }
}

/// Check one file: size, then extension, then declared type, then leading bytes.
///
/// Stops at the first failing check; only the signature check touches the disk.
pub async fn validate_file(
    file: &SelectedFile,
    settings: &ValidationSettings,
) -> Result<ValidatedFile, ValidationFailure> {
    if file.size > settings.max_file_bytes {
        return Err(ValidationFailure::TooLarge {
            size: file.size,
            max_bytes: settings.max_file_bytes,
        });
    }

    let extension = extension_of(&file.name);
    let rule = rule_for_extension(&extension)
        .ok_or(ValidationFailure::UnsupportedExtension { extension })?;

    if file.content_type.as_deref() != Some(rule.mime_type) {
        return Err(ValidationFailure::MimeMismatch {
            expected: rule.mime_type,
            declared: file.content_type.clone(),
        });
    }

    let header = read_leading_bytes(file, rule.signature.len()).await?;
    if !signature_matches(&header, rule.signature) {
        uploader_debug!(
            "Signature mismatch for {}: expected {:02x?}, found {:02x?}",
            file.name,
            rule.signature,
            header
        );
        return Err(ValidationFailure::SignatureMismatch {
            extension: rule.extension,
        });
    }

    uploader_info!("Accepted {} as {}", file.name, rule.mime_type);
    Ok(ValidatedFile {
        name: file.name.clone(),
        size: file.size,
        content_type: rule.mime_type.to_string(),
        rule: *rule,
    })
}

async fn read_leading_bytes(file: &SelectedFile, len: usize) -> Result<Vec<u8>, ValidationFailure> {
    let read_error = |err: std::io::Error| ValidationFailure::Read {
        message: format!("{}: {}", file.path.display(), err),
    };
    let handle = tokio::fs::File::open(&file.path).await.map_err(read_error)?;
    let mut header = Vec::with_capacity(len);
    handle
        .take(len as u64)
        .read_to_end(&mut header)
        .await
        .map_err(read_error)?;
    Ok(header)
}
