use std::path::{Path, PathBuf};

/// How the final filename was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Naming {
    /// Caller supplied the name, used verbatim.
    Explicit,
    /// Suggested name already had an extension.
    Suggested,
    /// Extension appended from the MIME type.
    Inferred(String),
    /// MIME type maps to no known extension, name kept as is.
    NoCandidate,
    /// MIME type maps to several extensions, name kept as is.
    Ambiguous(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub path: PathBuf,
    pub naming: Naming,
    pub collision_avoided: bool,
}

pub fn resolve(
    directory: &Path,
    explicit: Option<&str>,
    suggested: &str,
    mime_type: &str,
) -> ResolvedPath {
    resolve_with(directory, explicit, suggested, mime_type, |path| path.exists())
}

/// Like [`resolve`] with a custom existence check for collision avoidance.
pub fn resolve_with(
    directory: &Path,
    explicit: Option<&str>,
    suggested: &str,
    mime_type: &str,
    exists: impl Fn(&Path) -> bool,
) -> ResolvedPath {
    if let Some(name) = explicit {
        return ResolvedPath {
            path: directory.join(name),
            naming: Naming::Explicit,
            collision_avoided: false,
        };
    }

    let (name, naming) = if Path::new(suggested).extension().is_some() {
        (suggested.to_string(), Naming::Suggested)
    } else {
        match infer_extension(mime_type) {
            Naming::Inferred(ext) => (format!("{}.{}", suggested, ext), Naming::Inferred(ext)),
            other => (suggested.to_string(), other),
        }
    };

    let candidate = directory.join(name);
    let path = unused_path(&candidate, &exists);
    let collision_avoided = path != candidate;

    ResolvedPath {
        path,
        naming,
        collision_avoided,
    }
}

/// Exactly one candidate extension is required for inference.
pub fn infer_extension(mime_type: &str) -> Naming {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let candidates = mime_guess::get_mime_extensions_str(&essence).unwrap_or(&[]);
    match candidates {
        [] => Naming::NoCandidate,
        [ext] => Naming::Inferred(ext.to_string()),
        many => Naming::Ambiguous(many.len()),
    }
}

/// `name.ext`, then `name (1).ext`, `name (2).ext`, ... until one is free.
fn unused_path(candidate: &Path, exists: &impl Fn(&Path) -> bool) -> PathBuf {
    if !exists(candidate) {
        return candidate.to_path_buf();
    }

    let stem = candidate
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = candidate
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned());

    (1u64..)
        .map(|n| {
            let name = match &extension {
                Some(ext) => format!("{} ({}).{}", stem, n, ext),
                None => format!("{} ({})", stem, n),
            };
            candidate.with_file_name(name)
        })
        .find(|path| !exists(path))
        .unwrap_or_else(|| candidate.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn nothing_exists(_: &Path) -> bool {
        false
    }

    #[test]
    fn test_infers_extension_from_mime() {
        let resolved = resolve_with(
            Path::new("/downloads"),
            None,
            "report",
            "application/pdf",
            nothing_exists,
        );
        assert_eq!(resolved.path, PathBuf::from("/downloads/report.pdf"));
        assert_eq!(resolved.naming, Naming::Inferred("pdf".to_string()));
        assert!(!resolved.collision_avoided);
    }

    #[test]
    fn test_mime_parameters_are_ignored() {
        assert_eq!(
            infer_extension("Application/PDF; charset=binary"),
            Naming::Inferred("pdf".to_string())
        );
    }

    #[test]
    fn test_existing_extension_is_kept() {
        let resolved = resolve_with(
            Path::new("/downloads"),
            None,
            "archive.zip",
            "application/pdf",
            nothing_exists,
        );
        assert_eq!(resolved.path, Path::new("/downloads").join("archive.zip"));
        assert_eq!(resolved.naming, Naming::Suggested);
    }

    #[test]
    fn test_unknown_or_ambiguous_mime_keeps_name() {
        let unknown = resolve_with(
            Path::new("/d"),
            None,
            "blob",
            "application/x-does-not-exist",
            nothing_exists,
        );
        assert_eq!(unknown.path, PathBuf::from("/d/blob"));
        assert_eq!(unknown.naming, Naming::NoCandidate);

        let empty = resolve_with(Path::new("/d"), None, "blob", "", nothing_exists);
        assert_eq!(empty.naming, Naming::NoCandidate);

        let ambiguous = resolve_with(Path::new("/d"), None, "notes", "text/plain", nothing_exists);
        assert_eq!(ambiguous.path, PathBuf::from("/d/notes"));
        assert!(matches!(ambiguous.naming, Naming::Ambiguous(n) if n > 1));
    }

    #[test]
    fn test_explicit_filename_skips_collision_check() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("out.bin"), b"taken").unwrap();

        let resolved = resolve(dir.path(), Some("out.bin"), "other.zip", "application/zip");
        assert_eq!(resolved.path, dir.path().join("out.bin"));
        assert_eq!(resolved.naming, Naming::Explicit);
        assert!(!resolved.collision_avoided);
    }

    #[test]
    fn test_collision_appends_counter() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("report.pdf"), b"1").unwrap();
        fs::write(dir.path().join("report (1).pdf"), b"2").unwrap();

        let resolved = resolve(dir.path(), None, "report", "application/pdf");
        assert_eq!(resolved.path, dir.path().join("report (2).pdf"));
        assert!(resolved.collision_avoided);

        let bare = resolve_with(
            Path::new("/d"),
            None,
            "blob",
            "",
            |path| path == Path::new("/d/blob"),
        );
        assert_eq!(bare.path, PathBuf::from("/d/blob (1)"));
    }
}
