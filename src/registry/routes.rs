//! # Route Matching
//!
//! Patterns a page model declares for the routes it owns. A pattern is
//! either a text pattern (exact match, with `*` as a wildcard) or a full
//! regular expression. Matching is first-match-wins in pattern order; the
//! candidate route has its query string and fragment stripped before any
//! pattern sees it.

use regex::Regex;

/// One route pattern declared by a page model.
#[derive(Debug, Clone)]
pub enum RoutePattern {
    /// Literal text, `*` matching any run of characters. Compared for
    /// exact equality against the percent-decoded candidate first, then
    /// as an anchored wildcard expansion.
    Text(String),
    /// A regular expression, tested directly against the stripped route.
    Pattern(Regex),
}

impl RoutePattern {
    pub fn text(pattern: impl Into<String>) -> Self {
        Self::Text(pattern.into())
    }

    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::Pattern(Regex::new(pattern)?))
    }

    fn matches(&self, route: &str) -> bool {
        match self {
            Self::Pattern(re) => re.is_match(route),
            Self::Text(text) => {
                let decoded = percent_decode(route);
                let candidate = strip_fragment(&decoded);
                if candidate == text.as_str() {
                    return true;
                }
                match wildcard_regex(text) {
                    Some(re) => re.is_match(candidate),
                    None => false,
                }
            }
        }
    }
}

impl PartialEq for RoutePattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Pattern(a), Self::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

/// Find the first pattern matching `route`, after stripping its query
/// string and fragment. Pattern order is significant.
pub fn match_route(route: &str, patterns: &[RoutePattern]) -> Option<usize> {
    let stripped = strip_query_and_fragment(route);
    patterns.iter().position(|pattern| pattern.matches(stripped))
}

/// Strip the query string and fragment from a route.
pub fn strip_query_and_fragment(route: &str) -> &str {
    let end = route
        .find(['?', '#'])
        .unwrap_or(route.len());
    &route[..end]
}

/// Strip only the fragment from a route.
pub fn strip_fragment(route: &str) -> &str {
    match route.split_once('#') {
        Some((before, _)) => before,
        None => route,
    }
}

/// Decode percent-encoded sequences, passing malformed ones through as
/// literals. Non-UTF-8 results fall back to the raw input.
pub fn percent_decode(raw: &str) -> String {
    fn hex_val(b: u8) -> Option<u8> {
        match b {
            b'0'..=b'9' => Some(b - b'0'),
            b'a'..=b'f' => Some(b - b'a' + 10),
            b'A'..=b'F' => Some(b - b'A' + 10),
            _ => None,
        }
    }

    let bytes = raw.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let decoded = if bytes[i] == b'%' && i + 2 < bytes.len() {
            hex_val(bytes[i + 1]).zip(hex_val(bytes[i + 2]))
        } else {
            None
        };
        match decoded {
            Some((hi, lo)) => {
                out.push((hi << 4) | lo);
                i += 3;
            }
            None => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }

    String::from_utf8(out).unwrap_or_else(|_| raw.to_string())
}

/// Compile a text pattern into an anchored regex with `*` expanded to a
/// permissive any-characters sub-pattern. Literal parts are escaped, so
/// regex metacharacters in text patterns have no special meaning.
fn wildcard_regex(text: &str) -> Option<Regex> {
    let expanded = text
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{expanded}$")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_route_should_strip_query_string() {
        let patterns = vec![RoutePattern::text("/a/*")];
        assert_eq!(match_route("/a/b?x=1", &patterns), Some(0));
    }

    #[test]
    fn match_route_should_strip_fragment() {
        let patterns = vec![RoutePattern::text("/a/b")];
        assert_eq!(match_route("/a/b#frag", &patterns), Some(0));
    }

    #[test]
    fn match_route_should_return_none_without_match() {
        let patterns = vec![RoutePattern::text("/a"), RoutePattern::text("/b")];
        assert_eq!(match_route("/c", &patterns), None);
    }

    #[test]
    fn match_route_should_honor_pattern_order() {
        let patterns = vec![RoutePattern::text("/a/*"), RoutePattern::text("/a/b")];
        assert_eq!(match_route("/a/b", &patterns), Some(0));
    }

    #[test]
    fn text_pattern_should_compare_decoded_candidate() {
        let patterns = vec![RoutePattern::text("/a b")];
        assert_eq!(match_route("/a%20b", &patterns), Some(0));
    }

    #[test]
    fn text_pattern_should_escape_regex_metacharacters() {
        let patterns = vec![RoutePattern::text("/a+b")];
        assert_eq!(match_route("/a+b", &patterns), Some(0));
        assert_eq!(match_route("/aab", &patterns), None);
    }

    #[test]
    fn regex_pattern_should_test_directly() {
        let patterns = vec![RoutePattern::regex(r"^/item/\d+$").unwrap()];
        assert_eq!(match_route("/item/42", &patterns), Some(0));
        assert_eq!(match_route("/item/none", &patterns), None);
    }

    #[test]
    fn percent_decode_should_pass_malformed_sequences_through() {
        assert_eq!(percent_decode("/a%2"), "/a%2");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("/a%20b"), "/a b");
    }
}
