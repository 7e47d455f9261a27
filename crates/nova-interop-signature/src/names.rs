use std::sync::OnceLock;

use regex::Regex;

/// Largest arity of a built-in function or tuple class; larger numbers are
/// ordinary class names.
pub const MAX_BUILTIN_ARITY: usize = 22;

/// A class reference as it appears in a signature.
///
/// Function and tuple classes of the native standard library are recognised by
/// name so callers can map them by arity instead of looking them up.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassName {
    Function(usize),
    ExtensionFunction(usize),
    Tuple(usize),
    /// Internal name, inner classes joined with `$` (`java/util/Map$Entry`).
    Named(String),
}

impl ClassName {
    pub fn classify(internal_name: String) -> ClassName {
        static BUILTIN_ARITY_RE: OnceLock<Regex> = OnceLock::new();
        let re = BUILTIN_ARITY_RE.get_or_init(|| {
            Regex::new(r"^jet/(Function|ExtensionFunction|Tuple)(\d+)$")
                .expect("built-in class name regex should compile")
        });

        let classified = re.captures(&internal_name).and_then(|caps| {
            let arity = caps[2]
                .parse::<usize>()
                .ok()
                .filter(|arity| *arity <= MAX_BUILTIN_ARITY)?;
            match &caps[1] {
                "Function" => Some(ClassName::Function(arity)),
                "ExtensionFunction" => Some(ClassName::ExtensionFunction(arity)),
                "Tuple" => Some(ClassName::Tuple(arity)),
                _ => None,
            }
        });

        classified.unwrap_or(ClassName::Named(internal_name))
    }

    /// The internal (slash separated) name this reference was decoded from.
    pub fn internal_name(&self) -> String {
        match self {
            ClassName::Function(arity) => format!("jet/Function{arity}"),
            ClassName::ExtensionFunction(arity) => format!("jet/ExtensionFunction{arity}"),
            ClassName::Tuple(arity) => format!("jet/Tuple{arity}"),
            ClassName::Named(name) => name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_function_and_tuple_arities() {
        assert_eq!(
            ClassName::classify("jet/Function2".to_string()),
            ClassName::Function(2)
        );
        assert_eq!(
            ClassName::classify("jet/ExtensionFunction0".to_string()),
            ClassName::ExtensionFunction(0)
        );
        assert_eq!(ClassName::classify("jet/Tuple3".to_string()), ClassName::Tuple(3));
    }

    #[test]
    fn other_names_stay_named() {
        assert_eq!(
            ClassName::classify("jet/FunctionX".to_string()),
            ClassName::Named("jet/FunctionX".to_string())
        );
        assert_eq!(
            ClassName::classify("foo/jet/Function1".to_string()),
            ClassName::Named("foo/jet/Function1".to_string())
        );
        assert_eq!(ClassName::Tuple(2).internal_name(), "jet/Tuple2");
    }

    #[test]
    fn arities_above_the_limit_stay_named() {
        assert_eq!(
            ClassName::classify("jet/Function22".to_string()),
            ClassName::Function(22)
        );
        for name in ["jet/Function23", "jet/Tuple2000000", "jet/Function99999999999999999999"] {
            assert_eq!(
                ClassName::classify(name.to_string()),
                ClassName::Named(name.to_string())
            );
        }
    }
}
