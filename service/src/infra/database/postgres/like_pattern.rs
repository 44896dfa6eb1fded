//! [`LikePattern`] definition.

use derive_more::Display;
use postgres_types::{FromSql, ToSql};

/// SQL `LIKE` pattern matching any string containing the provided substring.
#[derive(Clone, Debug, Display, Eq, FromSql, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct LikePattern(String);

impl LikePattern {
    /// Creates a new [`LikePattern`] out of the given `substring`, escaping
    /// the `LIKE` wildcards in it.
    #[must_use]
    pub fn containing(substring: &str) -> Self {
        Self(format!(
            "%{}%",
            substring
                .replace('\\', r"\\")
                .replace('%', r"\%")
                .replace('_', r"\_"),
        ))
    }
}

#[cfg(test)]
mod spec {
    use super::LikePattern;

    #[test]
    fn escapes_wildcards() {
        for (input, expected) in [
            ("toy", "%toy%"),
            ("50%", r"%50\%%"),
            ("a_b", r"%a\_b%"),
            (r"c:\x", r"%c:\\x%"),
            ("", "%%"),
        ] {
            assert_eq!(LikePattern::containing(input).to_string(), expected);
        }
    }
}
