use axum::body::Bytes;
use chrono::Utc;

use shared_models::appointment::ResourceKind;
use shared_models::error::AppError;

pub const MAX_FILES_PER_REQUEST: usize = 5;
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

const IMAGE_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];
const PDF_MIME_TYPES: [&str; 1] = ["application/pdf"];

/// One file from the multipart batch, read fully into memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

pub fn is_allowed_mime(content_type: &str) -> bool {
    IMAGE_MIME_TYPES.contains(&content_type) || PDF_MIME_TYPES.contains(&content_type)
}

/// Provider category for a file: PDFs go in as raw objects, images as images.
pub fn resource_kind_for(content_type: &str) -> ResourceKind {
    if PDF_MIME_TYPES.contains(&content_type) {
        ResourceKind::Raw
    } else {
        ResourceKind::Image
    }
}

/// Lowercases, collapses whitespace to underscores, and strips anything
/// outside `[a-zA-Z0-9._-]`.
pub fn sanitize_filename(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for c in name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                sanitized.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;

        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            sanitized.push(c);
        }
    }

    sanitized
}

/// Deterministic, collision-resistant provider key for an upload.
pub fn storage_key(filename: &str) -> String {
    format!("{}-{}", Utc::now().timestamp_millis(), sanitize_filename(filename))
}

/// All-or-nothing batch validation, run before any provider I/O. A
/// disallowed MIME type is a distinct error kind from size/count violations.
pub fn validate_batch(files: &[UploadedFile]) -> Result<(), AppError> {
    if files.is_empty() {
        return Err(AppError::ValidationError("No files uploaded".to_string()));
    }

    if files.len() > MAX_FILES_PER_REQUEST {
        return Err(AppError::ValidationError(format!(
            "At most {} files can be uploaded per request",
            MAX_FILES_PER_REQUEST
        )));
    }

    for file in files {
        if !is_allowed_mime(&file.content_type) {
            return Err(AppError::UnsupportedFileType(
                "Only JPG, JPEG, PNG, WEBP images and PDF files are allowed".to_string(),
            ));
        }

        if file.bytes.len() > MAX_FILE_BYTES {
            return Err(AppError::ValidationError(format!(
                "File {} exceeds the 10MB size limit",
                file.filename
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn file(filename: &str, content_type: &str, len: usize) -> UploadedFile {
        UploadedFile {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            bytes: Bytes::from(vec![0u8; len]),
        }
    }

    #[test]
    fn sanitizes_filenames() {
        assert_eq!(sanitize_filename("Lab Report.PDF"), "lab_report.pdf");
        assert_eq!(sanitize_filename("x-ray  (left arm).png"), "x-ray_left_arm.png");
        assert_eq!(sanitize_filename("résumé.pdf"), "rsum.pdf");
        assert_eq!(sanitize_filename("a_b-c.1.jpg"), "a_b-c.1.jpg");
    }

    #[test]
    fn pdf_is_raw_images_are_images() {
        assert_eq!(resource_kind_for("application/pdf"), ResourceKind::Raw);
        assert_eq!(resource_kind_for("image/png"), ResourceKind::Image);
        assert_eq!(resource_kind_for("image/webp"), ResourceKind::Image);
    }

    #[test]
    fn rejects_empty_batch() {
        assert_matches!(validate_batch(&[]), Err(AppError::ValidationError(_)));
    }

    #[test]
    fn rejects_too_many_files() {
        let files: Vec<_> = (0..6).map(|i| file(&format!("f{}.png", i), "image/png", 10)).collect();
        assert_matches!(validate_batch(&files), Err(AppError::ValidationError(_)));
    }

    #[test]
    fn rejects_disallowed_mime_with_distinct_kind() {
        let files = vec![
            file("a.png", "image/png", 10),
            file("b.gif", "image/gif", 10),
        ];
        assert_matches!(
            validate_batch(&files),
            Err(AppError::UnsupportedFileType(_))
        );
    }

    #[test]
    fn rejects_oversized_file() {
        let files = vec![
            file("a.jpg", "image/jpeg", 10),
            file("b.pdf", "application/pdf", MAX_FILE_BYTES + 1),
        ];
        assert_matches!(validate_batch(&files), Err(AppError::ValidationError(_)));
    }

    #[test]
    fn accepts_full_valid_batch() {
        let files: Vec<_> = (0..5).map(|i| file(&format!("f{}.jpg", i), "image/jpeg", 1024)).collect();
        assert!(validate_batch(&files).is_ok());
    }

    #[test]
    fn storage_key_embeds_sanitized_name() {
        let key = storage_key("Lab Report.pdf");
        assert!(key.ends_with("-lab_report.pdf"));
        let millis: i64 = key.split('-').next().unwrap().parse().unwrap();
        assert!(millis > 0);
    }
}
