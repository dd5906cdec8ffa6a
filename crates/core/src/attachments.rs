//! Attachment intake rules for the materials step.
//!
//! Only descriptor metadata crosses into the core. Files with a type
//! outside [`ALLOWED_MIME_TYPES`] or larger than [`MAX_FILE_SIZE`] are
//! rejected individually; the rest of the batch is still accepted.

use serde::Serialize;

use crate::form::FileDescriptor;

/// Maximum size of a single attachment (10 MiB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Accepted MIME types: PDF, Word, plain text, JPEG, PNG.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
    "image/jpeg",
    "image/png",
];

/// Why a file was turned away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    UnsupportedType,
    TooLarge,
}

/// A file that did not pass intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedFile {
    pub name: String,
    pub reason: RejectionReason,
}

/// Outcome of [`accept_files`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttachmentBatch {
    pub accepted: Vec<FileDescriptor>,
    pub rejected: Vec<RejectedFile>,
}

/// Check one descriptor against the allow-list and size limit.
pub fn check_file(file: &FileDescriptor) -> Result<(), RejectionReason> {
    if !ALLOWED_MIME_TYPES.contains(&file.mime_type.as_str()) {
        return Err(RejectionReason::UnsupportedType);
    }
    if file.size > MAX_FILE_SIZE {
        return Err(RejectionReason::TooLarge);
    }
    Ok(())
}

/// Split a user selection into accepted and rejected files.
pub fn accept_files(files: impl IntoIterator<Item = FileDescriptor>) -> AttachmentBatch {
    let mut batch = AttachmentBatch::default();
    for file in files {
        match check_file(&file) {
            Ok(()) => batch.accepted.push(file),
            Err(reason) => {
                tracing::warn!(name = %file.name, mime_type = %file.mime_type, size = file.size, ?reason, "Attachment rejected");
                batch.rejected.push(RejectedFile {
                    name: file.name,
                    reason,
                });
            }
        }
    }
    batch
}

/// Human-readable size: `512 B`, `1.5 KB`, `2.0 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
