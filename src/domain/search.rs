use std::fmt;

use crate::domain::entities::PhotoRecord;

/// Longest query kept after normalization, in characters.
pub const MAX_QUERY_LEN: usize = 15;

const ALLOWED_PUNCTUATION: &str = "!@#$%^&*():.,<>/\\[]?";

/// Normalized search text.
///
/// Both live filtering and an explicit search submission go through
/// [`SearchQuery::normalize`], so they always agree on what is matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SearchQuery {
    text: String,
    folded: String,
}

impl SearchQuery {
    /// Drops disallowed characters and truncates to [`MAX_QUERY_LEN`].
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        let text: String = raw
            .chars()
            .filter(|&c| is_allowed(c))
            .take(MAX_QUERY_LEN)
            .collect();
        let folded = text.to_lowercase();
        Self { text, folded }
    }

    /// The normalized text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns true if nothing survived normalization.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Author contains the query ignoring case, or id equals it exactly.
    /// An empty query matches everything.
    #[must_use]
    pub fn matches(&self, photo: &PhotoRecord) -> bool {
        self.is_empty()
            || photo.id() == self.text
            || photo.author().to_lowercase().contains(&self.folded)
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || ALLOWED_PUNCTUATION.contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU32;
    use test_case::test_case;

    fn photo(id: &str, author: &str) -> PhotoRecord {
        let side = NonZeroU32::new(10).unwrap();
        PhotoRecord::new(id, author, side, side, format!("https://x/{id}.jpg"))
    }

    #[test_case("Alejandro", "Alejandro" ; "plain")]
    #[test_case("John Doe", "JohnDoe" ; "spaces_stripped")]
    #[test_case("a-b_c+d=e", "abcde" ; "unlisted_punctuation_stripped")]
    #[test_case("!@#$%^&*():.,<>/\\[]?", "!@#$%^&*():.,<>" ; "allowed_punctuation_kept_then_truncated")]
    #[test_case("Ngô Đức", "Ngc" ; "non_ascii_letters_stripped")]
    #[test_case("abcdefghijklmnopqrstuvwxyz", "abcdefghijklmno" ; "truncated_to_fifteen")]
    #[test_case("  ", "" ; "whitespace_only")]
    #[test_case("", "" ; "empty")]
    fn test_normalize(raw: &str, expected: &str) {
        assert_eq!(SearchQuery::normalize(raw).as_str(), expected);
    }

    #[test]
    fn test_truncation_counts_kept_characters() {
        // Stripped characters do not count toward the limit.
        let query = SearchQuery::normalize("a b c d e f g h i j k l m n o p");
        assert_eq!(query.as_str(), "abcdefghijklmno");
    }

    #[test]
    fn test_author_match_ignores_case() {
        let query = SearchQuery::normalize("TEST");
        assert!(query.matches(&photo("1", "Test Author")));
        assert!(query.matches(&photo("2", "a contest")));
        assert!(!query.matches(&photo("3", "Tes T")));
    }

    #[test]
    fn test_id_match_is_exact() {
        let query = SearchQuery::normalize("10");
        assert!(query.matches(&photo("10", "Paul Jarvis")));
        assert!(!query.matches(&photo("100", "Paul Jarvis")));
        assert!(!query.matches(&photo("1", "Paul Jarvis")));
    }

    #[test]
    fn test_id_match_is_case_sensitive() {
        let query = SearchQuery::normalize("abc");
        assert!(query.matches(&photo("abc", "Nobody")));
        assert!(!query.matches(&photo("ABC", "Nobody")));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let query = SearchQuery::normalize("   ");
        assert!(query.is_empty());
        assert!(query.matches(&photo("1", "Anyone")));
    }
}
