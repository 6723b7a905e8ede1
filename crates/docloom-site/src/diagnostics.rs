//! Problems reported during a generation run.
//!
//! Fatal problems abort the run as errors. Everything else is collected
//! here so a run can finish and report all issues at once.

use std::fmt;

use serde::Serialize;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Content was dropped or could not be produced as configured.
    Warning,
    /// Output is complete but the configuration could be improved.
    Advisory,
}

/// A non-fatal problem tied to a page and, usually, one of its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub page: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
    pub severity: Severity,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "[{}] {field}: {}", self.page, self.message),
            None => write!(f, "[{}] {}", self.page, self.message),
        }
    }
}

/// State scoped to one generation run.
#[derive(Debug, Default)]
pub struct RunContext {
    diagnostics: Vec<Diagnostic>,
}

impl RunContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning for `page`.
    ///
    /// Only logged at debug level; callers report the collected list.
    pub fn warn(&mut self, page: &str, field: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(page, field, "{message}");
        self.push(page, field, message, Severity::Warning);
    }

    /// Record an advisory for `page`.
    pub fn advise(&mut self, page: &str, field: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(page, field, "{message}");
        self.push(page, field, message, Severity::Advisory);
    }

    fn push(&mut self, page: &str, field: Option<&str>, message: String, severity: Severity) {
        self.diagnostics.push(Diagnostic {
            page: page.to_owned(),
            field: field.map(str::to_owned),
            message,
            severity,
        });
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;
    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_diagnostics_not_logged_at_warn_level() {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(captured.clone())
            .finish();

        let mut ctx = RunContext::new();
        tracing::subscriber::with_default(subscriber, || {
            ctx.warn("guide", Some("markdown_includes"), "cannot read 'missing.md'");
            ctx.advise("guide", None, "slug fallback used");
        });

        assert_eq!(ctx.diagnostics().len(), 2);
        assert!(captured.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_display_with_and_without_field() {
        let mut ctx = RunContext::new();
        ctx.warn("guide", Some("markdown_includes"), "cannot read 'missing.md'");
        ctx.advise("intro", None, "slug fallback used");

        let lines: Vec<String> = ctx.diagnostics().iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "[guide] markdown_includes: cannot read 'missing.md'",
                "[intro] slug fallback used",
            ]
        );
    }

    #[test]
    fn test_warning_count_ignores_advisories() {
        let mut ctx = RunContext::new();
        ctx.advise("a", None, "x");
        ctx.warn("a", None, "y");
        ctx.warn("b", Some("f"), "z");

        assert_eq!(ctx.warning_count(), 2);
        assert_eq!(ctx.into_diagnostics().len(), 3);
    }
}
