//! Correspondence between foreign platform classes and native built-ins.

use std::collections::HashMap;
use std::sync::OnceLock;

use nova_interop_model::{FqName, PrimitiveKind};

use crate::builtins::PrimitiveType;

/// Where a mapped type appears. Collections map to their mutable native
/// counterparts in covariant positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingPosition {
    Ordinary,
    Covariant,
}

const CLASSES: &[(&str, &str)] = &[
    ("java.lang.Object", "jet.Any"),
    ("java.lang.String", "jet.String"),
    ("java.lang.CharSequence", "jet.CharSequence"),
    ("java.lang.Throwable", "jet.Throwable"),
    ("java.lang.Number", "jet.Number"),
    ("java.lang.Comparable", "jet.Comparable"),
    ("java.lang.Enum", "jet.Enum"),
    ("java.lang.annotation.Annotation", "jet.Annotation"),
    ("java.lang.Iterable", "jet.Iterable"),
    ("java.util.Iterator", "jet.Iterator"),
    ("java.util.Collection", "jet.Collection"),
    ("java.util.List", "jet.List"),
    ("java.util.Set", "jet.Set"),
    ("java.util.ListIterator", "jet.ListIterator"),
    ("java.util.Map", "jet.Map"),
    ("java.util.Map.Entry", "jet.Map.Entry"),
];

const COVARIANT_CLASSES: &[(&str, &str)] = &[
    ("java.lang.Iterable", "jet.MutableIterable"),
    ("java.util.Iterator", "jet.MutableIterator"),
    ("java.util.Collection", "jet.MutableCollection"),
    ("java.util.List", "jet.MutableList"),
    ("java.util.Set", "jet.MutableSet"),
    ("java.util.ListIterator", "jet.MutableListIterator"),
    ("java.util.Map", "jet.MutableMap"),
    ("java.util.Map.Entry", "jet.MutableMap.MutableEntry"),
];

const PRIMITIVES: &[(PrimitiveKind, PrimitiveType, &str)] = &[
    (PrimitiveKind::Boolean, PrimitiveType::Boolean, "java.lang.Boolean"),
    (PrimitiveKind::Char, PrimitiveType::Char, "java.lang.Character"),
    (PrimitiveKind::Byte, PrimitiveType::Byte, "java.lang.Byte"),
    (PrimitiveKind::Short, PrimitiveType::Short, "java.lang.Short"),
    (PrimitiveKind::Int, PrimitiveType::Int, "java.lang.Integer"),
    (PrimitiveKind::Long, PrimitiveType::Long, "java.lang.Long"),
    (PrimitiveKind::Float, PrimitiveType::Float, "java.lang.Float"),
    (PrimitiveKind::Double, PrimitiveType::Double, "java.lang.Double"),
];

#[derive(Debug)]
pub struct BuiltinClassMap {
    classes: HashMap<FqName, FqName>,
    covariant: HashMap<FqName, FqName>,
    boxed: HashMap<FqName, PrimitiveType>,
    reverse: HashMap<FqName, Vec<FqName>>,
    mutable_to_read_only: HashMap<FqName, FqName>,
}

impl BuiltinClassMap {
    fn build() -> Self {
        let mut map = BuiltinClassMap {
            classes: HashMap::new(),
            covariant: HashMap::new(),
            boxed: HashMap::new(),
            reverse: HashMap::new(),
            mutable_to_read_only: HashMap::new(),
        };
        for (foreign, native) in CLASSES {
            map.classes.insert(FqName::new(*foreign), FqName::new(*native));
            map.add_reverse(native, foreign);
        }
        for (foreign, native) in COVARIANT_CLASSES {
            map.covariant
                .insert(FqName::new(*foreign), FqName::new(*native));
            map.add_reverse(native, foreign);
            if let Some(read_only) = map.classes.get(&FqName::new(*foreign)).cloned() {
                map.mutable_to_read_only
                    .insert(FqName::new(*native), read_only);
            }
        }
        for (_, primitive, boxed) in PRIMITIVES {
            map.boxed.insert(FqName::new(*boxed), *primitive);
            map.add_reverse(primitive.fq_name().as_str(), boxed);
        }
        map
    }

    fn add_reverse(&mut self, native: &str, foreign: &str) {
        self.reverse
            .entry(FqName::new(native))
            .or_default()
            .push(FqName::new(foreign));
    }

    /// Native class standing for `foreign`, if it is a platform class.
    pub fn map_class(&self, foreign: &FqName, position: MappingPosition) -> Option<&FqName> {
        if position == MappingPosition::Covariant {
            if let Some(native) = self.covariant.get(foreign) {
                return Some(native);
            }
        }
        self.classes.get(foreign)
    }

    pub fn map_primitive(&self, kind: PrimitiveKind) -> Option<PrimitiveType> {
        PRIMITIVES
            .iter()
            .find(|(k, _, _)| *k == kind)
            .map(|(_, primitive, _)| *primitive)
    }

    /// `java.lang.Integer` -> `Int`; boxed types map to nullable primitives.
    pub fn map_boxed(&self, foreign: &FqName) -> Option<PrimitiveType> {
        self.boxed.get(foreign).copied()
    }

    pub fn is_mapped(&self, foreign: &FqName) -> bool {
        self.classes.contains_key(foreign) || self.boxed.contains_key(foreign)
    }

    /// Foreign classes that map onto the given native class.
    pub fn foreign_names_for(&self, native: &FqName) -> &[FqName] {
        self.reverse.get(native).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn read_only_counterpart(&self, mutable: &FqName) -> Option<&FqName> {
        self.mutable_to_read_only.get(mutable)
    }
}

pub fn builtin_class_map() -> &'static BuiltinClassMap {
    static MAP: OnceLock<BuiltinClassMap> = OnceLock::new();
    MAP.get_or_init(BuiltinClassMap::build)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collections_map_by_position() {
        let map = builtin_class_map();
        let list = FqName::new("java.util.List");
        assert_eq!(
            map.map_class(&list, MappingPosition::Ordinary),
            Some(&FqName::new("jet.List"))
        );
        assert_eq!(
            map.map_class(&list, MappingPosition::Covariant),
            Some(&FqName::new("jet.MutableList"))
        );
        let string = FqName::new("java.lang.String");
        assert_eq!(
            map.map_class(&string, MappingPosition::Covariant),
            Some(&FqName::new("jet.String"))
        );
        assert_eq!(
            map.read_only_counterpart(&FqName::new("jet.MutableMap.MutableEntry")),
            Some(&FqName::new("jet.Map.Entry"))
        );
    }

    #[test]
    fn boxed_and_reverse_lookup() {
        let map = builtin_class_map();
        assert_eq!(
            map.map_boxed(&FqName::new("java.lang.Integer")),
            Some(PrimitiveType::Int)
        );
        assert_eq!(map.map_primitive(PrimitiveKind::Void), None);
        assert_eq!(
            map.foreign_names_for(&FqName::new("jet.Int")),
            &[FqName::new("java.lang.Integer")]
        );
        assert_eq!(
            map.foreign_names_for(&FqName::new("jet.MutableList")),
            &[FqName::new("java.util.List")]
        );
    }
}
