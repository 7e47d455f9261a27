use std::fmt;

/// Dot separated qualified name. The empty name is the root package.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FqName(String);

impl FqName {
    pub fn root() -> Self {
        FqName(String::new())
    }

    pub fn new(name: impl Into<String>) -> Self {
        FqName(name.into())
    }

    /// `java/util/Map$Entry` -> `java.util.Map.Entry`. A `$` that does not
    /// separate two non-empty names stays (`Host$ClassObject$`, `Foo$$TImpl`).
    pub fn from_internal(internal: &str) -> Self {
        let mut name = String::with_capacity(internal.len());
        let mut prev = None;
        let mut chars = internal.chars().peekable();
        while let Some(c) = chars.next() {
            let separates = c == '$'
                && prev.is_some_and(|prev| prev != '/' && prev != '$')
                && chars.peek().is_some_and(|next| *next != '$');
            name.push(match c {
                '/' => '.',
                '$' if separates => '.',
                c => c,
            });
            prev = Some(c);
        }
        FqName(name)
    }

    /// Packages dotted, every `$` kept: the name of a top-level class whose
    /// simple name contains `$`.
    pub fn from_internal_verbatim(internal: &str) -> Self {
        FqName(internal.replace('/', "."))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn parent(&self) -> Option<FqName> {
        if self.is_root() {
            return None;
        }
        Some(match self.0.rfind('.') {
            Some(idx) => FqName(self.0[..idx].to_string()),
            None => FqName::root(),
        })
    }

    pub fn short_name(&self) -> &str {
        match self.0.rfind('.') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    pub fn child(&self, name: &str) -> FqName {
        if self.is_root() {
            FqName(name.to_string())
        } else {
            FqName(format!("{}.{name}", self.0))
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|segment| !segment.is_empty())
    }
}

impl fmt::Debug for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FqName({})", self.0)
    }
}

impl fmt::Display for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<&str> for FqName {
    fn from(value: &str) -> Self {
        FqName::new(value)
    }
}

impl From<String> for FqName {
    fn from(value: String) -> Self {
        FqName::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_and_short_name() {
        let name = FqName::new("java.util.Map.Entry");
        assert_eq!(name.short_name(), "Entry");
        assert_eq!(name.parent(), Some(FqName::new("java.util.Map")));
        assert_eq!(FqName::new("java").parent(), Some(FqName::root()));
        assert_eq!(FqName::root().parent(), None);
        assert_eq!(FqName::root().child("java").child("lang").as_str(), "java.lang");
    }

    #[test]
    fn internal_names_convert_inner_separators() {
        assert_eq!(
            FqName::from_internal("java/util/Map$Entry"),
            FqName::new("java.util.Map.Entry")
        );
        assert_eq!(
            FqName::new("a.b.c").segments().collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
        assert_eq!(FqName::root().segments().count(), 0);
    }

    #[test]
    fn dollars_outside_separators_are_kept() {
        assert_eq!(
            FqName::from_internal("a/Host$ClassObject$"),
            FqName::new("a.Host.ClassObject$")
        );
        assert_eq!(FqName::from_internal("a/Foo$$TImpl"), FqName::new("a.Foo$$TImpl"));
        assert_eq!(FqName::from_internal("a/$Proxy"), FqName::new("a.$Proxy"));
        assert_eq!(FqName::from_internal("a/Odd$Name"), FqName::new("a.Odd.Name"));
        assert_eq!(
            FqName::from_internal_verbatim("a/Odd$Name"),
            FqName::new("a.Odd$Name")
        );
    }
}
