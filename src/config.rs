//! Configuration for operator extraction and pair alignment.

use std::time::Duration;

/// Operators compared by default when aligning two documents.
pub const DEFAULT_ALIGN_OPERATORS: &[&str] = &["Tj", "TJ"];

/// Default drift tolerance, in invocations.
pub const DEFAULT_BACKOFF: usize = 2;

/// Default keyword that marks the dispatch page of a filing.
pub const DEFAULT_DISPATCH_KEYWORD: &str = "DESPACHO";

/// How a positive minimum text length treats non-text-showing operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthFilterPolicy {
    /// A positive minimum drops every non-text-showing operator.
    ///
    /// This is the historical behavior of the extractor and stays the default
    /// so operator indices remain comparable with earlier reports.
    #[default]
    TextOnly,
    /// The minimum applies to text-showing operators only; all others pass.
    KeepNonText,
}

/// Equivalence signal used when walking two invocation sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Operator name and raw operand tokens must be equal. Decoded text is
    /// never compared.
    #[default]
    Operands,
    /// Operator name only.
    Shape,
}

/// Which content stream of a document to align.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSelection {
    /// Explicit page, 0-indexed.
    Index(usize),
    /// Auto-detect the dispatch page.
    #[default]
    Dispatch,
}

/// Operator extraction filters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractorConfig {
    /// Operator allow-list (`None` = every recognized operator)
    pub operators: Option<Vec<String>>,

    /// Minimum decoded text length in characters (0 = disabled)
    pub min_text_len: usize,

    /// Treatment of non-text operators when `min_text_len > 0`
    pub length_filter: LengthFilterPolicy,
}

impl ExtractorConfig {
    /// Create a configuration that keeps every recognized operator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict output to the given operator names.
    pub fn with_operators<I, S>(mut self, operators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.operators = Some(operators.into_iter().map(Into::into).collect());
        self
    }

    /// Set the minimum decoded text length.
    pub fn with_min_text_len(mut self, min: usize) -> Self {
        self.min_text_len = min;
        self
    }

    /// Set the length filter policy.
    pub fn with_length_filter(mut self, policy: LengthFilterPolicy) -> Self {
        self.length_filter = policy;
        self
    }

    /// True if the allow-list admits `operator`.
    pub fn allows(&self, operator: &str) -> bool {
        self.operators
            .as_ref()
            .map_or(true, |ops| ops.iter().any(|op| op == operator))
    }
}

/// Pair alignment configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignConfig {
    /// Operators compared between the two documents
    pub operators: Vec<String>,

    /// Drift tolerance in invocations
    pub backoff: usize,

    /// Minimum decoded text length (0 = disabled)
    pub min_text_len: usize,

    /// Treatment of non-text operators when `min_text_len > 0`
    pub length_filter: LengthFilterPolicy,

    /// Equivalence signal
    pub match_mode: MatchMode,

    /// Page to align in both documents
    pub page: PageSelection,

    /// Keywords that identify the dispatch page (case- and accent-insensitive)
    pub dispatch_keywords: Vec<String>,

    /// Time budget for one alignment scan
    pub scan_deadline: Option<Duration>,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AlignConfig {
    /// Create a configuration with the default operator set and backoff.
    pub fn new() -> Self {
        Self {
            operators: DEFAULT_ALIGN_OPERATORS.iter().map(|s| s.to_string()).collect(),
            backoff: DEFAULT_BACKOFF,
            min_text_len: 0,
            length_filter: LengthFilterPolicy::default(),
            match_mode: MatchMode::default(),
            page: PageSelection::default(),
            dispatch_keywords: vec![DEFAULT_DISPATCH_KEYWORD.to_string()],
            scan_deadline: None,
        }
    }

    /// Replace the operator allow-list.
    pub fn with_operators<I, S>(mut self, operators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.operators = operators.into_iter().map(Into::into).collect();
        self
    }

    /// Set the drift tolerance.
    pub fn with_backoff(mut self, backoff: usize) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set the minimum decoded text length.
    pub fn with_min_text_len(mut self, min: usize) -> Self {
        self.min_text_len = min;
        self
    }

    /// Set the length filter policy.
    pub fn with_length_filter(mut self, policy: LengthFilterPolicy) -> Self {
        self.length_filter = policy;
        self
    }

    /// Set the equivalence signal.
    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    /// Align an explicit page (0-indexed).
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = PageSelection::Index(page);
        self
    }

    /// Auto-detect the dispatch page.
    pub fn with_dispatch_page(mut self) -> Self {
        self.page = PageSelection::Dispatch;
        self
    }

    /// Replace the dispatch keywords.
    pub fn with_dispatch_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dispatch_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Bound the time spent in one alignment scan.
    pub fn with_scan_deadline(mut self, deadline: Duration) -> Self {
        self.scan_deadline = Some(deadline);
        self
    }

    /// Extraction filters derived from this configuration.
    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            operators: Some(self.operators.clone()),
            min_text_len: self.min_text_len,
            length_filter: self.length_filter,
        }
    }
}
