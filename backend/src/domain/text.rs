//! Shared text and URL validation for user-supplied fields.

use url::Url;

/// Length rule violated by a text field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextRuleError {
    /// The trimmed value is shorter than allowed.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    /// The trimmed value is longer than allowed.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    /// The value is not an absolute http(s) URL.
    #[error("{field} must be an absolute http or https URL")]
    InvalidUrl { field: &'static str },
}

impl TextRuleError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::TooShort { field, .. } | Self::TooLong { field, .. } | Self::InvalidUrl { field } => {
                field
            }
        }
    }
}

/// Trim `raw` and check its length in characters.
pub(crate) fn bounded_text(
    field: &'static str,
    raw: &str,
    min: usize,
    max: usize,
) -> Result<String, TextRuleError> {
    let trimmed = raw.trim();
    let length = trimmed.chars().count();
    if length < min {
        return Err(TextRuleError::TooShort { field, min });
    }
    if length > max {
        return Err(TextRuleError::TooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

/// Accept an image URL produced by the external blob store.
pub(crate) fn image_url(field: &'static str, raw: &str) -> Result<String, TextRuleError> {
    let parsed = Url::parse(raw.trim()).map_err(|_| TextRuleError::InvalidUrl { field })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed.to_string()),
        _ => Err(TextRuleError::InvalidUrl { field }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn trims_before_measuring() {
        let value = bounded_text("title", "  hello  ", 5, 10).expect("valid");
        assert_eq!(value, "hello");
    }

    #[rstest]
    #[case("hey", TextRuleError::TooShort { field: "title", min: 5 })]
    #[case("abcdefghijk", TextRuleError::TooLong { field: "title", max: 10 })]
    fn enforces_bounds(#[case] raw: &str, #[case] expected: TextRuleError) {
        assert_eq!(bounded_text("title", raw, 5, 10), Err(expected));
    }

    #[rstest]
    #[case("https://cdn.example.org/a.png", true)]
    #[case("ftp://cdn.example.org/a.png", false)]
    #[case("not a url", false)]
    fn image_urls_must_be_http(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(image_url("imageUrl", raw).is_ok(), ok);
    }
}
