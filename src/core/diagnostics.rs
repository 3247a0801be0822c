//! Source diagnostics reported during analysis.
//!
//! Diagnostics are never fatal on their own. The pipeline collects them in a
//! [`DiagnosticLog`] and the caller decides how to surface them.

use std::fmt;

/// A position in a program document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Location {
    pub document: String,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(document: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            document: document.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:({}:{})", self.document, self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub location: Location,
    pub message: String,
}

impl Diagnostic {
    pub fn error(location: Location, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            location,
            message: message.into(),
        }
    }

    pub fn warning(location: Location, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            location,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.severity.as_str(), self.location, self.message)
    }
}

/// Ordered collection of diagnostics for one analysis run.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticLog {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => log::debug!("diagnostic: {diagnostic}"),
            _ => log::trace!("diagnostic: {diagnostic}"),
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_counts() {
        let mut log = DiagnosticLog::new();
        assert!(log.is_empty());

        log.log(Diagnostic::warning(Location::new("a.bal", 1, 1), "unused"));
        assert!(!log.has_errors());

        log.log(Diagnostic::error(Location::new("main.bal", 3, 5), "bad signature"));
        assert!(log.has_errors());
        assert_eq!(log.error_count(), 1);

        let rendered: Vec<String> = log.iter().map(|d| d.to_string()).collect();
        assert_eq!(rendered[1], "ERROR [main.bal:(3:5)] bad signature");
    }
}
