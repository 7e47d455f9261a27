use nova_interop_descriptors::Diagnostic;
use nova_interop_model::DeclarationSite;

pub(crate) const ABI_VERSION_MISMATCH: &str = "abi-version-mismatch";

/// Rejects declarations compiled for another metadata format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AbiGate {
    expected: i32,
}

impl AbiGate {
    pub fn new(expected: i32) -> Self {
        Self { expected }
    }

    /// `Err` carries the diagnostic to report; the declaration is then excluded.
    pub fn check(&self, found: i32, site: &DeclarationSite) -> Result<(), Diagnostic> {
        if found == self.expected {
            return Ok(());
        }
        tracing::warn!(
            target: "nova.interop.resolve",
            %site,
            found,
            expected = self.expected,
            "skipping declaration compiled for another ABI version"
        );
        Err(Diagnostic::error(
            ABI_VERSION_MISMATCH,
            format!(
                "{site} was compiled with ABI version {found}, expected {}",
                self.expected
            ),
            Some(site.clone()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_interop_model::FqName;

    #[test]
    fn mismatching_versions_produce_a_site_diagnostic() {
        let gate = AbiGate::new(7);
        let site = DeclarationSite::Class(FqName::new("a.Old"));
        assert!(gate.check(7, &site).is_ok());

        let diagnostic = gate.check(5, &site).unwrap_err();
        assert_eq!(diagnostic.code, ABI_VERSION_MISMATCH);
        assert_eq!(diagnostic.site, Some(site));
        assert_eq!(
            diagnostic.message,
            "class a.Old was compiled with ABI version 5, expected 7"
        );
    }
}
