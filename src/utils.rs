use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use strum::{Display, EnumString};

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

// ASCII letters and digits, Hangul syllables, underscore, hyphen, period.
static UNSAFE_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9가-힣_.\-]").unwrap());

pub fn watch_url(video_id: &str) -> String {
    format!("{}{}", WATCH_URL_PREFIX, video_id)
}

/// Collapse whitespace runs to `_` and drop every character outside the allowed set.
pub fn normalize_filename(name: &str) -> String {
    let joined = name.split_whitespace().collect::<Vec<_>>().join("_");
    UNSAFE_CHARS_RE.replace_all(&joined, "").into_owned()
}

/// What the rename step does with the name the downloader picked
#[derive(Display, EnumString, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FilenamePolicy {
    /// Keep the downloader's name untouched
    #[default]
    PassThrough,
    /// Rename to `normalize_filename(name)`
    Normalize,
}

impl FilenamePolicy {
    pub fn apply(&self, name: &str) -> String {
        match self {
            FilenamePolicy::PassThrough => name.to_string(),
            FilenamePolicy::Normalize => {
                let normalized = normalize_filename(name);
                if normalized.is_empty() {
                    name.to_string()
                } else {
                    normalized
                }
            }
        }
    }
}

pub fn replace_file_name_inplace(original_path: &Path, new_filename: &str) -> PathBuf {
    match original_path.parent() {
        Some(parent) => parent.join(new_filename),
        None => PathBuf::from(new_filename),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn builds_watch_url() {
        assert_eq!(
            watch_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_filename("  my   cool\tvideo.mp4 "), "my_cool_video.mp4");
    }

    #[test]
    fn normalize_keeps_hangul_and_strips_symbols() {
        assert_eq!(
            normalize_filename("파이썬 튜토리얼 [1편] (HD)!.webm"),
            "파이썬_튜토리얼_1편_HD.webm"
        );
        assert_eq!(normalize_filename("a-b_c.d"), "a-b_c.d");
        assert_eq!(normalize_filename("../etc/passwd"), "..etcpasswd");
    }

    #[test]
    fn pass_through_policy_keeps_name() {
        let name = "Some Title | Official (4K).mp4";
        assert_eq!(FilenamePolicy::PassThrough.apply(name), name);
    }

    #[test]
    fn normalize_policy_falls_back_when_nothing_is_left() {
        assert_eq!(FilenamePolicy::Normalize.apply("★★★"), "★★★");
        assert_eq!(FilenamePolicy::Normalize.apply("a b.mp4"), "a_b.mp4");
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!(
            FilenamePolicy::from_str("passthrough").unwrap(),
            FilenamePolicy::PassThrough
        );
        assert_eq!(
            FilenamePolicy::from_str("Normalize").unwrap(),
            FilenamePolicy::Normalize
        );
        assert!(FilenamePolicy::from_str("slugify").is_err());
    }

    #[test]
    fn replaces_only_the_file_name() {
        let path = Path::new("/downloads/a b.mp4");
        assert_eq!(
            replace_file_name_inplace(path, "a_b.mp4"),
            PathBuf::from("/downloads/a_b.mp4")
        );
    }
}
