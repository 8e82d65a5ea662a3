//! Input encoding
//!
//! Converts user-supplied file blobs into inline generation parts. Content
//! passes through byte-exact: no resizing, recompression, or format
//! coercion. Files are handled independently and output order matches
//! input order.

use crate::ai::{mime, GenerationPart};
use crate::models::FileInput;
use crate::{Error, Result};

pub fn to_parts(files: &[FileInput]) -> Result<Vec<GenerationPart>> {
    files.iter().map(to_part).collect()
}

pub fn to_part(file: &FileInput) -> Result<GenerationPart> {
    if file.bytes.is_empty() {
        return Err(Error::Encoding("file is empty".to_string()));
    }

    let media_type = match &file.media_type {
        Some(declared) if !declared.trim().is_empty() => declared.trim().to_string(),
        _ => mime::detect_media_type(&file.bytes).to_string(),
    };

    Ok(GenerationPart::Inline {
        media_type,
        bytes: file.bytes.clone(),
    })
}
