//! Input validation for recognition requests.
//!
//! Everything here runs before the upstream call and performs no I/O.

use std::path::Path;

use url::Url;

use crate::config::Config;
use crate::error::ValidationError;
use crate::traits::ImageUpload;

/// Accepted file extensions, lowercase with leading dot.
pub const ALLOWED_EXTENSIONS: &[&str] = &[".jpeg", ".jpg", ".png", ".webp"];

/// Accepted declared content types.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Resolved per-request options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecognizeOptions {
    pub top_k: usize,
    pub include_raw: bool,
}

/// Limits applied to uploads and query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputValidator {
    pub max_file_size_bytes: usize,
    pub default_top_k: usize,
    pub max_top_k: usize,
}

impl InputValidator {
    pub fn new(config: &Config) -> Self {
        Self {
            max_file_size_bytes: config.max_file_size_bytes,
            default_top_k: config.default_top_k,
            max_top_k: config.max_top_k,
        }
    }

    /// Validate an uploaded image.
    ///
    /// Checks run in order: empty, extension, content type, size. The first
    /// failure is returned.
    pub fn validate_upload(&self, upload: &ImageUpload) -> Result<(), ValidationError> {
        let size = upload.bytes.len();
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        let extension = file_extension(&upload.filename);
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ValidationError::UnsupportedExtension {
                extension,
                allowed: to_owned_list(ALLOWED_EXTENSIONS),
            });
        }

        if let Some(declared) = upload.content_type.as_deref() {
            let essence = content_type_essence(declared);
            if !ALLOWED_CONTENT_TYPES.contains(&essence.as_str()) {
                return Err(ValidationError::UnsupportedContentType {
                    content_type: declared.to_string(),
                    allowed: to_owned_list(ALLOWED_CONTENT_TYPES),
                });
            }
        }

        if size > self.max_file_size_bytes {
            return Err(ValidationError::FileTooLarge {
                size,
                limit: self.max_file_size_bytes,
            });
        }

        Ok(())
    }

    /// Validate a caller-supplied image URL. No fetch is attempted.
    pub fn validate_url(&self, raw: &str) -> Result<Url, ValidationError> {
        let raw = raw.trim();
        let url = Url::parse(raw).map_err(|e| ValidationError::InvalidUrl(format!("'{}': {}", raw, e)))?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ValidationError::InvalidUrl(format!(
                    "scheme '{}' is not supported, use http or https",
                    other
                )))
            }
        }

        if url.host_str().map_or(true, str::is_empty) {
            return Err(ValidationError::InvalidUrl(format!("'{}' has no host", raw)));
        }

        Ok(url)
    }

    /// Resolve `top_k` / `include_raw` against configured defaults and bounds.
    pub fn resolve_options(
        &self,
        top_k: Option<usize>,
        include_raw: Option<bool>,
    ) -> Result<RecognizeOptions, ValidationError> {
        let top_k = top_k.unwrap_or(self.default_top_k);
        if top_k == 0 || top_k > self.max_top_k {
            return Err(ValidationError::TopKOutOfRange {
                value: top_k,
                max: self.max_top_k,
            });
        }

        Ok(RecognizeOptions {
            top_k,
            include_raw: include_raw.unwrap_or(false),
        })
    }
}

/// Lowercase extension with leading dot, or an empty string.
fn file_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// `image/JPEG; charset=binary` -> `image/jpeg`
fn content_type_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn validator() -> InputValidator {
        InputValidator::new(&Config::default())
    }

    fn upload(filename: &str, content_type: Option<&str>, size: usize) -> ImageUpload {
        ImageUpload {
            bytes: Bytes::from(vec![0u8; size]),
            filename: filename.to_string(),
            content_type: content_type.map(str::to_string),
        }
    }

    #[test]
    fn test_accepts_allowed_images() {
        let v = validator();
        for name in ["label.jpg", "label.JPEG", "label.png", "bottle.webp"] {
            assert_eq!(v.validate_upload(&upload(name, None, 64)), Ok(()), "{}", name);
        }
        assert_eq!(
            v.validate_upload(&upload("label.png", Some("image/png"), 64)),
            Ok(())
        );
        assert_eq!(
            v.validate_upload(&upload("label.jpg", Some("Image/JPEG; charset=binary"), 64)),
            Ok(())
        );
    }

    #[test]
    fn test_rejects_unknown_extension_with_allow_list() {
        let err = validator()
            .validate_upload(&upload("label.gif", Some("image/gif"), 64))
            .unwrap_err();
        match &err {
            ValidationError::UnsupportedExtension { extension, allowed } => {
                assert_eq!(extension, ".gif");
                assert_eq!(allowed, &vec![".jpeg", ".jpg", ".png", ".webp"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains(".gif"));
        assert!(err.to_string().contains(".jpeg, .jpg, .png, .webp"));
    }

    #[test]
    fn test_rejects_missing_extension() {
        let err = validator()
            .validate_upload(&upload("label", None, 64))
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedExtension { .. }));
    }

    #[test]
    fn test_rejects_mismatched_content_type() {
        let err = validator()
            .validate_upload(&upload("label.jpg", Some("text/plain"), 64))
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedContentType { .. }));
    }

    #[test]
    fn test_empty_and_too_large_are_distinct() {
        let v = validator();
        assert_eq!(
            v.validate_upload(&upload("label.jpg", Some("image/jpeg"), 0)),
            Err(ValidationError::EmptyFile)
        );

        let too_big = v.max_file_size_bytes + 1;
        let err = v
            .validate_upload(&upload("label.jpg", Some("image/jpeg"), too_big))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::FileTooLarge {
                size: too_big,
                limit: v.max_file_size_bytes
            }
        );
        assert!(err.to_string().contains("too large"));
        assert!(!err.to_string().contains("empty"));
    }

    #[test]
    fn test_file_exactly_at_limit_is_accepted() {
        let v = InputValidator {
            max_file_size_bytes: 128,
            ..validator()
        };
        assert_eq!(v.validate_upload(&upload("label.jpg", None, 128)), Ok(()));
    }

    #[test]
    fn test_url_validation() {
        let v = validator();
        assert!(v.validate_url("https://example.com/wine-label.jpg").is_ok());
        assert!(v.validate_url("  http://example.com/a.png ").is_ok());
        assert!(matches!(
            v.validate_url("ftp://example.com/a.png"),
            Err(ValidationError::InvalidUrl(_))
        ));
        assert!(matches!(
            v.validate_url("not a url"),
            Err(ValidationError::InvalidUrl(_))
        ));
        assert!(matches!(
            v.validate_url("file:///etc/passwd"),
            Err(ValidationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_resolve_options() {
        let v = validator();
        assert_eq!(
            v.resolve_options(None, None),
            Ok(RecognizeOptions {
                top_k: 5,
                include_raw: false
            })
        );
        assert_eq!(
            v.resolve_options(Some(10), Some(true)),
            Ok(RecognizeOptions {
                top_k: 10,
                include_raw: true
            })
        );
        assert_eq!(
            v.resolve_options(Some(0), None),
            Err(ValidationError::TopKOutOfRange { value: 0, max: 10 })
        );
        assert_eq!(
            v.resolve_options(Some(11), None),
            Err(ValidationError::TopKOutOfRange { value: 11, max: 10 })
        );
    }
}
