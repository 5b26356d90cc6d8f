//! Compiled term matchers.
//!
//! The matcher is compiled once per search and applied to the text
//! rendering of every candidate cell.

use std::borrow::Cow;

use regex::RegexBuilder;

use gridline_model::{SearchMode, SearchOptions};

use crate::error::Result;

pub(crate) enum TermMatcher {
    Exact {
        term: String,
        case_sensitive: bool,
    },
    Contains {
        term: String,
        case_sensitive: bool,
        whole_word: bool,
    },
    Prefix {
        term: String,
        case_sensitive: bool,
    },
    Regex(regex::Regex),
}

impl TermMatcher {
    pub fn compile(term: &str, options: &SearchOptions) -> Result<Self> {
        let fold = |t: &str| {
            if options.case_sensitive {
                t.to_string()
            } else {
                t.to_lowercase()
            }
        };
        Ok(match options.mode {
            SearchMode::Exact => TermMatcher::Exact {
                term: fold(term),
                case_sensitive: options.case_sensitive,
            },
            SearchMode::Contains => TermMatcher::Contains {
                term: fold(term),
                case_sensitive: options.case_sensitive,
                whole_word: options.whole_word,
            },
            SearchMode::Prefix => TermMatcher::Prefix {
                term: fold(term),
                case_sensitive: options.case_sensitive,
            },
            SearchMode::Regex => TermMatcher::Regex(
                RegexBuilder::new(term)
                    .case_insensitive(!options.case_sensitive)
                    .build()?,
            ),
        })
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            TermMatcher::Exact {
                term,
                case_sensitive,
            } => folded(text, *case_sensitive).as_ref() == term,
            TermMatcher::Contains {
                term,
                case_sensitive,
                whole_word,
            } => {
                let haystack = folded(text, *case_sensitive);
                if *whole_word {
                    contains_whole_word(&haystack, term)
                } else {
                    haystack.contains(term.as_str())
                }
            }
            TermMatcher::Prefix {
                term,
                case_sensitive,
            } => folded(text, *case_sensitive).starts_with(term.as_str()),
            TermMatcher::Regex(pattern) => pattern.is_match(text),
        }
    }
}

fn folded(text: &str, case_sensitive: bool) -> Cow<'_, str> {
    if case_sensitive {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.to_lowercase())
    }
}

/// Occurrence of `needle` bounded by non-alphanumeric characters (or the
/// ends of the text) on both sides.
fn contains_whole_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(at, _)| {
        let before_ok = haystack[..at]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = haystack[at + needle.len()..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(mode: SearchMode) -> SearchOptions {
        SearchOptions {
            mode,
            ..SearchOptions::default()
        }
    }

    #[test]
    fn contains_is_case_insensitive_by_default() {
        let matcher = TermMatcher::compile("foo", &options(SearchMode::Contains)).expect("compile");
        assert!(matcher.matches("FOOBAR"));
        assert!(matcher.matches("a foo b"));
        assert!(!matcher.matches("fo"));
    }

    #[test]
    fn whole_word_requires_boundaries() {
        let opts = SearchOptions {
            whole_word: true,
            ..options(SearchMode::Contains)
        };
        let matcher = TermMatcher::compile("foo", &opts).expect("compile");
        assert!(matcher.matches("a foo b"));
        assert!(matcher.matches("foo"));
        assert!(matcher.matches("(foo)"));
        assert!(!matcher.matches("foobar"));
        assert!(!matcher.matches("xfoo"));
    }

    #[test]
    fn exact_respects_case_flag() {
        let sensitive = SearchOptions {
            case_sensitive: true,
            ..options(SearchMode::Exact)
        };
        let matcher = TermMatcher::compile("Foo", &sensitive).expect("compile");
        assert!(matcher.matches("Foo"));
        assert!(!matcher.matches("foo"));
    }

    #[test]
    fn regex_compiles_and_matches() {
        let matcher =
            TermMatcher::compile(r"^ab+c$", &options(SearchMode::Regex)).expect("compile");
        assert!(matcher.matches("abbbc"));
        assert!(!matcher.matches("ac"));

        assert!(TermMatcher::compile("(unclosed", &options(SearchMode::Regex)).is_err());
    }
}
