//! # Diagnostics
//!
//! Findings produced while compiling a module config: hard errors that stop one
//! entity, and warnings for references the compiler could not resolve.
//!
//! `modmaker check` prints them grouped by severity; `make` prints them after
//! the file summary.

use serde::Serialize;

use crate::compiler::CompileError;

/// Severity level for a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The entity was not generated
    Error,
    /// Generated, but with a placeholder to review
    Warning,
    /// Informational
    Info,
}

/// A finding attached to one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Where the finding occurred (e.g. `Blog/Post`, `Blog/Post.author`)
    pub location: String,
    pub severity: Severity,
    /// Machine-readable kind (e.g. `unknown_type`, `unresolved_target_entity`)
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(
        location: impl Into<String>,
        severity: Severity,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            location: location.into(),
            severity,
            kind: kind.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// The diagnostic for an entity that failed to compile.
    pub fn from_error(module: &str, error: &CompileError) -> Self {
        Diagnostic::new(
            format!("{module}/{}", error.entity()),
            Severity::Error,
            error.kind(),
            error.to_string(),
        )
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Whether any diagnostic is an error
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

/// Print diagnostics grouped by severity
pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        println!("✅ No issues found!");
        return;
    }

    let count = |s: Severity| diagnostics.iter().filter(|d| d.severity == s).count();
    println!("\n📋 Compile Results:");
    println!(
        "   {} error(s), {} warning(s), {} info(s)\n",
        count(Severity::Error),
        count(Severity::Warning),
        count(Severity::Info)
    );

    for (severity, header) in [
        (Severity::Error, "❌ Errors (entity skipped):"),
        (Severity::Warning, "⚠️  Warnings (review generated code):"),
        (Severity::Info, "ℹ️  Info:"),
    ] {
        let group: Vec<_> = diagnostics.iter().filter(|d| d.severity == severity).collect();
        if group.is_empty() {
            continue;
        }
        println!("{header}");
        for d in group {
            println!("   [{}] {}", d.kind, d.location);
            println!("      {}", d.message);
            if let Some(suggestion) = &d.suggestion {
                println!("      💡 Suggestion: {}", suggestion);
            }
        }
        println!();
    }
}
