//! Course title normalization.
//!
//! Two different forms are derived from a scraped course title:
//!
//! - a **comparison key** ([`TitleNormalizer::normalize`]) used to match the
//!   user's resume fragment against course titles, and
//! - a **file stem** ([`sanitize_file_stem`]) used to build output paths.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Prefix token stripped from course titles by default.
pub const DEFAULT_TITLE_PREFIX: &str = "[ru]";

/// Stem used when a course title is blank.
pub const UNKNOWN_COURSE_STEM: &str = "course_unknown";

/// Builds comparison keys from course titles.
///
/// The key is lowercase, contains no whitespace or underscores, and never
/// starts with one of the configured prefix tokens. Applying the
/// normalizer to its own output returns the same key.
#[derive(Debug, Clone)]
pub struct TitleNormalizer {
    prefixes: Vec<String>,
}

impl TitleNormalizer {
    /// Create a normalizer that strips [`DEFAULT_TITLE_PREFIX`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer that strips no prefix at all.
    pub fn without_prefixes() -> Self {
        Self {
            prefixes: Vec::new(),
        }
    }

    /// Add a prefix token to strip.
    pub fn with_prefix(mut self, prefix: impl AsRef<str>) -> Self {
        let prefix = fold(prefix.as_ref());
        if !prefix.is_empty() && !self.prefixes.contains(&prefix) {
            self.prefixes.push(prefix);
        }
        self
    }

    /// Replace the prefix tokens to strip.
    pub fn with_prefixes<I, S>(self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        prefixes
            .into_iter()
            .fold(Self::without_prefixes(), |n, p| n.with_prefix(p))
    }

    /// Prefix tokens in their folded form.
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Compute the comparison key of a title.
    pub fn normalize(&self, title: &str) -> String {
        let mut key = fold(title);

        // Stripping one token may expose another.
        loop {
            let stripped = self
                .prefixes
                .iter()
                .find(|p| key.starts_with(p.as_str()))
                .map(|p| p.len());
            match stripped {
                Some(len) => {
                    key.drain(..len);
                }
                None => break,
            }
        }

        key
    }

    /// Whether `title` contains `fragment` once both are normalized.
    pub fn matches(&self, title: &str, fragment: &str) -> bool {
        self.normalize(title).contains(&self.normalize(fragment))
    }
}

impl Default for TitleNormalizer {
    fn default() -> Self {
        Self::without_prefixes().with_prefix(DEFAULT_TITLE_PREFIX)
    }
}

/// Normalize a title with the default prefix set.
pub fn normalize(title: &str) -> String {
    TitleNormalizer::default().normalize(title)
}

/// Lowercase, drop whitespace and underscores, recompose.
fn fold(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| !c.is_whitespace() && *c != '_')
        .nfc()
        .collect()
}

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\d_-]").expect("static pattern"))
}

/// Turn a course title into a file-system safe stem.
///
/// Every character that is not a word character, digit, `_` or `-` is
/// replaced by `_`. Letters of any script are kept, so `Информатика`
/// stays `Информатика`.
pub fn sanitize_file_stem(title: &str) -> String {
    let title: String = title.trim().nfc().collect();
    if title.is_empty() {
        return UNKNOWN_COURSE_STEM.to_string();
    }
    unsafe_chars().replace_all(&title, "_").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_case_and_spacing() {
        assert_eq!(normalize("Информационная  Безопасность"), "информационнаябезопасность");
        assert_eq!(normalize("Data_Science 101"), "datascience101");
        assert_eq!(normalize("\tМатематика\n"), "математика");
    }

    #[test]
    fn test_normalize_strips_prefix() {
        assert_eq!(normalize("[RU] Информатика"), "информатика");
        assert_eq!(normalize("[ru][ru] Физика"), "физика");
        // Only at the start
        assert_eq!(normalize("Физика [ru]"), "физика[ru]");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("  __  "), "");
        assert_eq!(normalize("[ru]"), "");
    }

    #[test]
    fn test_normalize_idempotent() {
        let samples = [
            "Информатика",
            "[RU]  Основы _ программирования",
            "[r u] math",
            "ru ru",
            "Ёлка Й",
            "ÉCOLE normale",
            "",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_custom_prefixes() {
        let n = TitleNormalizer::without_prefixes().with_prefix("ОНЛАЙН ");
        assert_eq!(n.prefixes(), &["онлайн".to_string()]);
        assert_eq!(n.normalize("Онлайн Химия"), "химия");
        assert_eq!(n.normalize("[ru] Химия"), "[ru]химия");

        let n = TitleNormalizer::new().with_prefixes(["a:", "b:"]);
        assert_eq!(n.normalize("B: A: topic"), "topic");
    }

    #[test]
    fn test_matches_fragment() {
        let n = TitleNormalizer::new();
        assert!(n.matches("Информатика", "информ"));
        assert!(n.matches("Информатика", "  ИНФОРМ "));
        assert!(!n.matches("Математика", "информ"));
        assert!(n.matches("Математика", ""));
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("Информатика"), "Информатика");
        assert_eq!(sanitize_file_stem("Web: HTML/CSS (2024)"), "Web__HTML_CSS__2024_");
        assert_eq!(sanitize_file_stem("  a-b_c  "), "a-b_c");
        assert_eq!(sanitize_file_stem("   "), UNKNOWN_COURSE_STEM);
    }
}
