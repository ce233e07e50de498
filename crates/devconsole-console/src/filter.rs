//! Render-time filters
//!
//! Pure functions over the current panel contents. Filters only narrow what
//! is displayed; they never touch the store. Text search is a
//! case-insensitive substring match against a per-panel haystack.

use devconsole_core::{LogEntry, RequestEntry, RouteEntry, SqlEntry};
use serde_json::{Map, Value};

fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn eq_ci(value: &str, wanted: Option<&str>) -> bool {
    match wanted {
        None | Some("") => true,
        Some(w) => value.eq_ignore_ascii_case(w),
    }
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    /// HTTP method, case-insensitive
    pub method: Option<String>,
    /// Exact status (`"404"`) or class (`"4xx"`)
    pub status: Option<String>,
    /// Searched in the request path
    pub search: String,
}

impl RequestFilter {
    pub fn matches(&self, entry: &RequestEntry) -> bool {
        eq_ci(&entry.method, self.method.as_deref())
            && status_matches(entry.status, self.status.as_deref())
            && contains_ci(&entry.path, &self.search)
    }

    pub fn apply<'a>(
        &self,
        entries: impl IntoIterator<Item = &'a RequestEntry>,
    ) -> Vec<&'a RequestEntry> {
        entries.into_iter().filter(|e| self.matches(e)).collect()
    }
}

fn status_matches(status: u16, wanted: Option<&str>) -> bool {
    let wanted = match wanted.map(str::trim) {
        None | Some("") => return true,
        Some(w) => w,
    };

    let lower = wanted.to_ascii_lowercase();
    if let Some(class) = lower.strip_suffix("xx") {
        return class
            .parse::<u16>()
            .map(|c| c < 10 && status / 100 == c)
            .unwrap_or(false);
    }
    wanted.parse::<u16>().map(|s| s == status).unwrap_or(false)
}

// ============================================================================
// SQL
// ============================================================================

/// Whether a statement is slow: `duration_ns / 1_000_000 >= threshold_ms`.
///
/// The boundary is inclusive.
pub fn is_slow_query(entry: &SqlEntry, threshold_ms: u64) -> bool {
    entry.duration_ms() >= threshold_ms
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFilter {
    /// Searched in the query text
    pub search: String,
    pub slow_only: bool,
    pub errors_only: bool,
    pub slow_threshold_ms: u64,
}

impl Default for SqlFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            slow_only: false,
            errors_only: false,
            slow_threshold_ms: devconsole_config::constants::DEFAULT_SLOW_QUERY_MS,
        }
    }
}

impl SqlFilter {
    pub fn with_threshold(slow_threshold_ms: u64) -> Self {
        Self {
            slow_threshold_ms,
            ..Self::default()
        }
    }

    pub fn matches(&self, entry: &SqlEntry) -> bool {
        (!self.slow_only || is_slow_query(entry, self.slow_threshold_ms))
            && (!self.errors_only || entry.has_error())
            && contains_ci(&entry.query, &self.search)
    }

    pub fn apply<'a>(&self, entries: impl IntoIterator<Item = &'a SqlEntry>) -> Vec<&'a SqlEntry> {
        entries.into_iter().filter(|e| self.matches(e)).collect()
    }
}

// ============================================================================
// Logs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    /// Exact level, case-insensitive
    pub level: Option<String>,
    /// Searched in message, source and the serialized fields
    pub search: String,
    /// Renderer hint: keep the newest line in view. Does not affect matching.
    pub auto_scroll: bool,
}

impl Default for LogFilter {
    fn default() -> Self {
        Self {
            level: None,
            search: String::new(),
            auto_scroll: true,
        }
    }
}

impl LogFilter {
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if !eq_ci(&entry.level, self.level.as_deref()) {
            return false;
        }
        if self.search.is_empty() {
            return true;
        }
        let fields = serde_json::to_string(&entry.fields).unwrap_or_default();
        let haystack = format!("{} {} {}", entry.message, entry.source, fields);
        contains_ci(&haystack, &self.search)
    }

    pub fn apply<'a>(&self, entries: impl IntoIterator<Item = &'a LogEntry>) -> Vec<&'a LogEntry> {
        entries.into_iter().filter(|e| self.matches(e)).collect()
    }
}

// ============================================================================
// Routes
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteFilter {
    pub method: Option<String>,
    /// Searched in path and handler
    pub search: String,
}

impl RouteFilter {
    pub fn matches(&self, entry: &RouteEntry) -> bool {
        eq_ci(&entry.method, self.method.as_deref())
            && (contains_ci(&entry.path, &self.search) || contains_ci(&entry.handler, &self.search))
    }

    pub fn apply<'a>(
        &self,
        entries: impl IntoIterator<Item = &'a RouteEntry>,
    ) -> Vec<&'a RouteEntry> {
        entries.into_iter().filter(|e| self.matches(e)).collect()
    }
}

// ============================================================================
// JSON panels
// ============================================================================

/// Key search over an arbitrary JSON panel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonFilter {
    pub search: String,
}

impl JsonFilter {
    /// Prune `value` to the keys whose name contains the search text.
    ///
    /// A matching key keeps its whole subtree; ancestors of a match are kept
    /// with only the matching branches. Returns `None` when nothing matches.
    /// An empty search returns the value unchanged.
    pub fn apply(&self, value: &Value) -> Option<Value> {
        if self.search.is_empty() {
            return Some(value.clone());
        }
        prune(value, &self.search.to_lowercase())
    }
}

fn prune(value: &Value, needle: &str) -> Option<Value> {
    match value {
        Value::Object(map) => {
            let mut kept = Map::new();
            for (key, child) in map {
                if key.to_lowercase().contains(needle) {
                    kept.insert(key.clone(), child.clone());
                } else if let Some(pruned) = prune(child, needle) {
                    kept.insert(key.clone(), pruned);
                }
            }
            (!kept.is_empty()).then_some(Value::Object(kept))
        }
        Value::Array(items) => {
            let kept: Vec<Value> = items.iter().filter_map(|i| prune(i, needle)).collect();
            (!kept.is_empty()).then_some(Value::Array(kept))
        }
        _ => None,
    }
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use devconsole_testing::proptest_config;
    use proptest::prelude::*;

    fn request_strategy() -> impl Strategy<Value = RequestEntry> {
        (
            prop::sample::select(vec!["GET", "POST", "PUT", "DELETE"]),
            "/[a-z]{1,8}",
            100u16..600,
        )
            .prop_map(|(method, path, status)| RequestEntry::new(method, path, status))
    }

    proptest! {
        #![proptest_config(proptest_config::auto_config())]

        #[test]
        fn filtered_requests_are_an_ordered_subsequence(
            entries in prop::collection::vec(request_strategy(), 0..50),
            method in prop::option::of(prop::sample::select(vec!["GET", "post"])),
            status in prop::option::of(prop::sample::select(vec!["200", "5xx", "404"])),
        ) {
            let filter = RequestFilter {
                method: method.map(String::from),
                status: status.map(String::from),
                search: String::new(),
            };
            let filtered = filter.apply(&entries);

            prop_assert!(filtered.len() <= entries.len());
            let mut cursor = entries.iter();
            for kept in &filtered {
                prop_assert!(filter.matches(kept));
                prop_assert!(cursor.any(|e| std::ptr::eq(e, *kept)));
            }
            let rejected = entries.iter().filter(|e| !filter.matches(e)).count();
            prop_assert_eq!(filtered.len() + rejected, entries.len());
        }

        #[test]
        fn slow_query_matches_integer_division(duration_ns in 0u64..10_000_000_000, threshold in 0u64..5_000) {
            let entry = SqlEntry::new("SELECT 1", duration_ns);
            prop_assert_eq!(is_slow_query(&entry, threshold), duration_ns / 1_000_000 >= threshold);
        }
    }
}
