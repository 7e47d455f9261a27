use nova_interop_model::FqName;

use crate::ids::{ClassId, TypeParamId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variance {
    Invariant,
    In,
    Out,
}

impl Variance {
    /// Keyword as written before a type argument; empty for invariant.
    pub fn label(self) -> &'static str {
        match self {
            Variance::Invariant => "",
            Variance::In => "in",
            Variance::Out => "out",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeConstructor {
    Class(ClassId),
    TypeParameter(TypeParamId),
    /// Reference to a class that could not be resolved; an error type.
    Unresolved(FqName),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeProjection {
    Star,
    Projected(Variance, NativeType),
}

impl TypeProjection {
    pub fn invariant(ty: NativeType) -> Self {
        TypeProjection::Projected(Variance::Invariant, ty)
    }

    pub fn ty(&self) -> Option<&NativeType> {
        match self {
            TypeProjection::Star => None,
            TypeProjection::Projected(_, ty) => Some(ty),
        }
    }
}

/// Immutable native type value, compared structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NativeType {
    pub constructor: TypeConstructor,
    pub arguments: Vec<TypeProjection>,
    pub nullable: bool,
}

impl NativeType {
    pub fn class(class: ClassId, arguments: Vec<TypeProjection>) -> Self {
        Self {
            constructor: TypeConstructor::Class(class),
            arguments,
            nullable: false,
        }
    }

    pub fn simple(class: ClassId) -> Self {
        Self::class(class, Vec::new())
    }

    pub fn type_parameter(param: TypeParamId) -> Self {
        Self {
            constructor: TypeConstructor::TypeParameter(param),
            arguments: Vec::new(),
            nullable: false,
        }
    }

    pub fn unresolved(name: FqName) -> Self {
        Self {
            constructor: TypeConstructor::Unresolved(name),
            arguments: Vec::new(),
            nullable: false,
        }
    }

    pub fn with_nullability(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn make_nullable(self) -> Self {
        self.with_nullability(true)
    }

    pub fn make_not_null(self) -> Self {
        self.with_nullability(false)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.constructor, TypeConstructor::Unresolved(_))
    }

    pub fn class_id(&self) -> Option<ClassId> {
        match self.constructor {
            TypeConstructor::Class(id) => Some(id),
            _ => None,
        }
    }

    pub fn type_parameter_id(&self) -> Option<TypeParamId> {
        match self.constructor {
            TypeConstructor::TypeParameter(id) => Some(id),
            _ => None,
        }
    }

    /// Whether `pred` holds for the class of this type or of any argument.
    pub fn mentions_class(&self, pred: &dyn Fn(ClassId) -> bool) -> bool {
        self.class_id().is_some_and(pred)
            || self
                .arguments
                .iter()
                .filter_map(TypeProjection::ty)
                .any(|arg| arg.mentions_class(pred))
    }
}
