use std::sync::LazyLock;

use regex::Regex;
use url::Url;

// RFC 5987 `filename*=UTF-8''name` wins over the plain parameter
static EXTENDED_FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)filename\*\s*=\s*(?:[\w-]+'[^']*')?"?([^";]+)"?"#)
        .expect("extended filename regex")
});
static FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)filename\s*=\s*"?([^";]+)"?"#).expect("filename regex")
});

/// Placeholder substituted by [`render_template`].
pub const FILENAME_PLACEHOLDER: &str = "{filename}";

/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Substitute `{filename}` in a user supplied message template
pub fn render_template(template: &str, filename: &str) -> String {
    template.replace(FILENAME_PLACEHOLDER, filename)
}

/// Extract the filename parameter from a Content-Disposition header value
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    let raw = EXTENDED_FILENAME_RE
        .captures(header)
        .or_else(|| FILENAME_RE.captures(header))
        .map(|caps| caps[1].trim().to_string())?;

    let name = sanitize_filename(&raw);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Last non-empty path segment of a URL
pub fn filename_from_url(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(sanitize_filename)
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("test/file.mp3"), "test_file.mp3");
        assert_eq!(sanitize_filename("normal-name.mp3"), "normal-name.mp3");
    }

    #[test]
    fn test_render_template() {
        assert_eq!(
            render_template("The download of {filename} was interrupted", "a.zip"),
            "The download of a.zip was interrupted"
        );
        assert_eq!(render_template("no placeholder", "a.zip"), "no placeholder");
    }

    #[test]
    fn test_filename_patterns_compile_once() {
        let extended = LazyLock::force(&EXTENDED_FILENAME_RE);
        let plain = LazyLock::force(&FILENAME_RE);
        assert!(extended.is_match("attachment; filename*=UTF-8''a.txt"));
        assert!(plain.is_match("inline; filename=a.txt"));

        for _ in 0..3 {
            assert_eq!(
                filename_from_content_disposition("inline; filename=a.txt").as_deref(),
                Some("a.txt")
            );
        }
        assert!(std::ptr::eq(plain, LazyLock::force(&FILENAME_RE)));
    }

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            filename_from_content_disposition(r#"attachment; filename="report.pdf""#),
            Some("report.pdf".to_string())
        );
        assert_eq!(
            filename_from_content_disposition("attachment; filename=plain.txt"),
            Some("plain.txt".to_string())
        );
        assert_eq!(
            filename_from_content_disposition(
                r#"attachment; filename="fallback.bin"; filename*=UTF-8''real.bin"#
            ),
            Some("real.bin".to_string())
        );
        assert_eq!(filename_from_content_disposition("inline"), None);
    }

    #[test]
    fn test_filename_from_url() {
        let url = Url::parse("https://example.com/files/archive.tar.gz?x=1").unwrap();
        assert_eq!(filename_from_url(&url), Some("archive.tar.gz".to_string()));

        let trailing = Url::parse("https://example.com/files/").unwrap();
        assert_eq!(filename_from_url(&trailing), Some("files".to_string()));

        let root = Url::parse("https://example.com/").unwrap();
        assert_eq!(filename_from_url(&root), None);
    }
}
