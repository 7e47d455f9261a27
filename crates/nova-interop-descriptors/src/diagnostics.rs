use nova_interop_model::DeclarationSite;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A problem found while resolving a foreign declaration. Resolution goes on
/// with the declaration omitted or degraded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub site: Option<DeclarationSite>,
}

impl Diagnostic {
    pub fn error(
        code: &'static str,
        message: impl Into<String>,
        site: Option<DeclarationSite>,
    ) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            site,
        }
    }

    pub fn warning(
        code: &'static str,
        message: impl Into<String>,
        site: Option<DeclarationSite>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            site,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}
