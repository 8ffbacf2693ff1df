use std::path::Path;

/// Extensions the upload endpoint accepts (compared case-insensitively).
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

pub fn has_allowed_extension(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// Local name for a processed image: `{stem}_watermark.{ext}`.
pub fn watermarked_name(source_name: &str) -> String {
    let path = Path::new(source_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "image".to_string());
    match path.extension() {
        Some(ext) => format!("{stem}_watermark.{}", ext.to_string_lossy()),
        None => format!("{stem}_watermark"),
    }
}

/// First of `name`, `{stem}_2.{ext}`, `{stem}_3.{ext}`, ... that `taken`
/// does not claim.
pub(crate) fn unique_name(name: String, taken: impl Fn(&str) -> bool) -> String {
    if !taken(&name) {
        return name;
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name.as_str(), None),
    };
    for n in 2u32.. {
        let candidate = match ext {
            Some(ext) => format!("{stem}_{n}.{ext}"),
            None => format!("{stem}_{n}"),
        };
        if !taken(&candidate) {
            return candidate;
        }
    }
    name
}
