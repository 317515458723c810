use tracing::trace;
use wildmatch::WildMatchPattern;

/// Wildcard filters for repository and tag names.
///
/// Filters prefixed with `!` are negative: anything they match is excluded.
/// The remaining filters are positive: when at least one exists, a name
/// must match one of them to be included.
#[derive(Debug, Clone)]
pub struct Matchers {
    pub positive: Vec<WildMatchPattern<'*', '?'>>,
    pub negative: Vec<WildMatchPattern<'*', '?'>>,
}

impl Matchers {
    pub fn from(filters: &[String]) -> Self {
        trace!(
            filters=?filters,
            "Creating matchers from filters"
        );
        Self {
            positive: filters
                .iter()
                .filter_map(|pattern| {
                    if pattern.starts_with('!') {
                        None
                    } else {
                        Some(WildMatchPattern::<'*', '?'>::new(pattern))
                    }
                })
                .collect(),
            negative: filters
                .iter()
                .filter_map(|pattern| {
                    pattern
                        .strip_prefix('!')
                        .map(WildMatchPattern::<'*', '?'>::new)
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }

    pub fn negative_match(&self, value: &str) -> bool {
        self.negative.iter().any(|matcher| matcher.matches(value))
    }

    pub fn positive_match(&self, value: &str) -> bool {
        self.positive.iter().any(|matcher| matcher.matches(value))
    }

    /// Whether a name passes the filters.
    ///
    /// No filters means everything is included.
    pub fn includes(&self, value: &str) -> bool {
        if self.negative_match(value) {
            trace!(value = value, "Excluded by a negative filter");
            return false;
        }
        self.positive.is_empty() || self.positive_match(value)
    }
}
