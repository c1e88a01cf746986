//! Recoverable conversion problems.
//!
//! Nothing in the layout core is fatal to a document: bad declarations,
//! ragged tables, unsupported elements and failed rasterizations all degrade
//! locally. Each of those events is recorded here so the caller receives an
//! aggregated list next to the best-effort layout tree.
//!
//! A [`Diagnostics`] value belongs to exactly one conversion run. There is no
//! process-wide state, so independent documents can be converted in parallel.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use strum_macros::{Display, EnumIter};

/// The class of problem a [`Diagnostic`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
pub enum DiagnosticKind {
    /// A declaration whose value could not be parsed. The property keeps its
    /// inherited or initial value.
    #[strum(serialize = "style-parse")]
    StyleParse,
    /// Geometry that had to be clamped or padded: ragged table rows,
    /// zero-width columns, table parts outside a table.
    #[strum(serialize = "layout-inconsistency")]
    LayoutInconsistency,
    /// An element kind the document model cannot express. The node and its
    /// subtree are skipped.
    #[strum(serialize = "unsupported-node")]
    UnsupportedNodeKind,
    /// The rasterization collaborator failed or was not configured.
    #[strum(serialize = "external-service")]
    ExternalServiceFailure,
}

/// One recorded problem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Diagnostic {
    /// What went wrong.
    pub kind: DiagnosticKind,
    /// The pipeline stage that noticed it (`"style"`, `"table"`, ...).
    pub component: String,
    /// Human readable description.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}] {}", self.component, self.kind, self.message)
    }
}

/// Per-run diagnostic collector.
///
/// Identical reports are recorded once, so a stylesheet that repeats the same
/// bad value on every paragraph yields a single entry.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    seen: HashSet<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem and mirror it to the `log` facade at `warn` level.
    ///
    /// # Example
    /// ```
    /// use docflow_common::{DiagnosticKind, Diagnostics};
    ///
    /// let mut diagnostics = Diagnostics::new();
    /// diagnostics.report(DiagnosticKind::StyleParse, "style", "bad value 'zz' for width");
    /// diagnostics.report(DiagnosticKind::StyleParse, "style", "bad value 'zz' for width");
    /// assert_eq!(diagnostics.len(), 1);
    /// ```
    pub fn report(&mut self, kind: DiagnosticKind, component: &str, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            kind,
            component: component.to_string(),
            message: message.into(),
        };
        if self.seen.contains(&diagnostic) {
            return;
        }
        log::warn!(target: "docflow", "{diagnostic}");
        let _ = self.seen.insert(diagnostic.clone());
        self.entries.push(diagnostic);
    }

    /// Number of distinct problems recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the run has been clean so far.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of recorded problems of one kind.
    #[must_use]
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    /// Iterate over recorded problems in the order they were reported.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    /// Consume the collector, returning the aggregated list.
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
