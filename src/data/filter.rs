use regex::bytes::{Regex, RegexBuilder};

use super::model::FilterMode;

// ---------------------------------------------------------------------------
// FilterEntry – one literal name or regular expression
// ---------------------------------------------------------------------------

/// A single entry of a column filter list.
#[derive(Debug, Clone)]
pub enum FilterEntry {
    /// Unquoted text; matches a header by exact, case-sensitive equality.
    Literal(String),
    /// Quoted text; the header as a whole must match the pattern.
    Regex { pattern: String, matcher: Regex },
    /// Quoted text that does not compile. Never matches anything.
    Invalid { pattern: String },
}

impl FilterEntry {
    /// Build an entry from the inside of a double-quoted span.
    pub fn regex(pattern: &str) -> Self {
        match compile_full_match(pattern) {
            Ok(matcher) => FilterEntry::Regex {
                pattern: pattern.to_string(),
                matcher,
            },
            Err(e) => {
                log::debug!("ignoring invalid column pattern {pattern:?}: {e}");
                FilterEntry::Invalid {
                    pattern: pattern.to_string(),
                }
            }
        }
    }

    /// Whether `header` is selected by this entry.
    pub fn matches(&self, header: &str) -> bool {
        match self {
            FilterEntry::Literal(text) => text == header,
            FilterEntry::Regex { matcher, .. } => matcher.is_match(header.as_bytes()),
            FilterEntry::Invalid { .. } => false,
        }
    }

    /// The entry's text as written in the spec (without quotes).
    pub fn text(&self) -> &str {
        match self {
            FilterEntry::Literal(text) => text,
            FilterEntry::Regex { pattern, .. } | FilterEntry::Invalid { pattern } => pattern,
        }
    }
}

/// Compile `pattern` so that it only matches the whole input.
///
/// Classes and `(?i)` are ASCII-only (`\d` is `[0-9]`). Patterns that need
/// Unicode mode to compile, such as non-ASCII class members, get it.
fn compile_full_match(pattern: &str) -> Result<Regex, regex::Error> {
    build_full_match(pattern, false).or_else(|_| build_full_match(pattern, true))
}

/// The raw pattern is compiled first: wrapping a malformed pattern in a
/// group can make it valid (`a)|(b`), and that must still count as invalid.
fn build_full_match(pattern: &str, unicode: bool) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).unicode(unicode).build()?;
    RegexBuilder::new(&format!(r"\A(?:{pattern})\z"))
        .unicode(unicode)
        .build()
}

// ---------------------------------------------------------------------------
// FilterList – parsed filter spec
// ---------------------------------------------------------------------------

/// Ordered list of filter entries parsed from a raw filter spec.
#[derive(Debug, Clone, Default)]
pub struct FilterList {
    entries: Vec<FilterEntry>,
}

impl FilterList {
    /// Parse a raw spec such as `errors,".*avg",autoplay count`.
    ///
    /// Commas split entries unless they sit inside a double-quoted span. A
    /// segment that is wrapped in quotes (after trimming) becomes a regex
    /// entry with the quotes stripped; any other non-empty segment becomes a
    /// trimmed literal. Empty segments are dropped.
    pub fn parse(raw: &str) -> Self {
        let mut entries = Vec::new();
        let mut segment = String::new();
        let mut in_quotes = false;

        for ch in raw.chars() {
            match ch {
                '"' => {
                    in_quotes = !in_quotes;
                    segment.push(ch);
                }
                ',' if !in_quotes => {
                    entries.extend(parse_segment(&segment));
                    segment.clear();
                }
                _ => segment.push(ch),
            }
        }
        entries.extend(parse_segment(&segment));

        FilterList { entries }
    }

    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when any entry selects `header`.
    pub fn matches_any(&self, header: &str) -> bool {
        self.entries.iter().any(|entry| entry.matches(header))
    }

    /// Decide whether a column with this header survives under `mode`.
    pub fn survives(&self, mode: FilterMode, header: &str) -> bool {
        match mode {
            FilterMode::Off => true,
            FilterMode::IncludeByString => self.matches_any(header),
            FilterMode::ExcludeByString => !self.matches_any(header),
        }
    }

    /// Positions of the surviving columns, in header order.
    pub fn survivors<S: AsRef<str>>(&self, mode: FilterMode, headers: &[S]) -> Vec<usize> {
        headers
            .iter()
            .enumerate()
            .filter(|(_, h)| self.survives(mode, h.as_ref()))
            .map(|(i, _)| i)
            .collect()
    }
}

fn parse_segment(segment: &str) -> Option<FilterEntry> {
    let trimmed = segment.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        return Some(FilterEntry::regex(&trimmed[1..trimmed.len() - 1]));
    }
    Some(FilterEntry::Literal(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(list: &FilterList) -> Vec<&str> {
        list.entries().iter().map(|e| e.text()).collect()
    }

    #[test]
    fn empty_spec_has_no_entries() {
        assert!(FilterList::parse("").is_empty());
        assert!(FilterList::parse("  ,  ,").is_empty());
    }

    #[test]
    fn unquoted_entries_are_trimmed_literals() {
        let list = FilterList::parse("Avg, Median ,(min");
        assert_eq!(texts(&list), vec!["Avg", "Median", "(min"]);
        assert!(list
            .entries()
            .iter()
            .all(|e| matches!(e, FilterEntry::Literal(_))));
    }

    #[test]
    fn commas_inside_quotes_do_not_split() {
        let list = FilterList::parse(r#""HTTP_[4,5]\d{2}","Hits",Throughput"#);
        assert_eq!(texts(&list), vec![r"HTTP_[4,5]\d{2}", "Hits", "Throughput"]);
        assert!(matches!(list.entries()[0], FilterEntry::Regex { .. }));
        assert!(matches!(list.entries()[1], FilterEntry::Regex { .. }));
        assert!(matches!(list.entries()[2], FilterEntry::Literal(_)));
    }

    #[test]
    fn mixed_quoted_and_unquoted_entries_keep_order() {
        let list = FilterList::parse(r#"errors,".*avg",autoplay count"#);
        assert_eq!(texts(&list), vec!["errors", ".*avg", "autoplay count"]);
    }

    #[test]
    fn regex_is_a_full_match() {
        let entry = FilterEntry::regex(".*avg");
        assert!(entry.matches("recs avg"));
        assert!(!entry.matches("recs avg count"));

        let entry = FilterEntry::regex("avg");
        assert!(entry.matches("avg"));
        assert!(!entry.matches("recs avg"));
    }

    #[test]
    fn alternation_is_anchored_as_a_whole() {
        let entry = FilterEntry::regex("min|max");
        assert!(entry.matches("min"));
        assert!(entry.matches("max"));
        assert!(!entry.matches("station min"));
        assert!(!entry.matches("maximum"));
    }

    #[test]
    fn inline_case_insensitive_flag() {
        let entry = FilterEntry::regex("(?i)(RunID)");
        assert!(entry.matches("RunId"));
        assert!(entry.matches("runid"));
        assert!(!entry.matches("RunIds"));
    }

    #[test]
    fn classes_and_case_folding_are_ascii() {
        let entry = FilterEntry::regex(r"HTTP_\d{3}");
        assert!(entry.matches("HTTP_200"));
        assert!(!entry.matches("HTTP_\u{0662}\u{0660}\u{0660}"));

        let entry = FilterEntry::regex(r"(?i)k");
        assert!(entry.matches("K"));
        assert!(!entry.matches("\u{212A}"));

        let entry = FilterEntry::regex(r"\w+ avg");
        assert!(entry.matches("recs avg"));
        assert!(!entry.matches("r\u{e9}cs avg"));
    }

    #[test]
    fn wildcards_span_non_ascii_headers() {
        assert!(FilterEntry::regex(".*avg").matches("d\u{e9}bit avg"));
        assert!(FilterEntry::regex("d\u{e9}bit.*").matches("d\u{e9}bit avg"));
    }

    #[test]
    fn literal_is_case_sensitive_and_exact() {
        let entry = FilterEntry::Literal("errors".into());
        assert!(entry.matches("errors"));
        assert!(!entry.matches("Errors"));
        assert!(!entry.matches("errors "));
        assert!(!FilterEntry::Literal(".*".into()).matches("anything"));
    }

    #[test]
    fn invalid_regex_never_matches() {
        for pattern in ["(HTTP", "a)|(b", "[unclosed"] {
            let entry = FilterEntry::regex(pattern);
            assert!(matches!(entry, FilterEntry::Invalid { .. }), "{pattern}");
            assert!(!entry.matches(pattern));
            assert!(!entry.matches("HTTP_200"));
        }
    }

    #[test]
    fn include_and_exclude_are_complements() {
        let headers = ["RunId", "HTTP_200", "HTTP_500", "Hits", "(min", "errors"];
        let specs = [
            "",
            "Hits,errors",
            r#""HTTP_\d+",RunId"#,
            r#""(HTTP""#,
            r#""(?i)runid","Hits",Hits"#,
        ];
        for spec in specs {
            let list = FilterList::parse(spec);
            let include = list.survivors(FilterMode::IncludeByString, &headers);
            let exclude = list.survivors(FilterMode::ExcludeByString, &headers);
            let mut all: Vec<usize> = include.iter().chain(exclude.iter()).copied().collect();
            all.sort_unstable();
            assert_eq!(all, (0..headers.len()).collect::<Vec<_>>(), "spec {spec}");
            assert!(include.iter().all(|i| !exclude.contains(i)), "spec {spec}");
        }
    }

    #[test]
    fn off_keeps_everything_even_with_entries() {
        let list = FilterList::parse("a,b");
        assert_eq!(list.survivors(FilterMode::Off, &["a", "b", "c"]), vec![0, 1, 2]);
    }

    #[test]
    fn empty_list_under_include_drops_all_and_exclude_drops_none() {
        let list = FilterList::parse("");
        let headers = ["a", "b"];
        assert!(list.survivors(FilterMode::IncludeByString, &headers).is_empty());
        assert_eq!(list.survivors(FilterMode::ExcludeByString, &headers), vec![0, 1]);
    }
}
