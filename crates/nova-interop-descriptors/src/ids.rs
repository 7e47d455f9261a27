use std::fmt;

macro_rules! arena_id {
    ($name:ident) => {
        #[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub(crate) fn from_raw(raw: usize) -> Self {
                $name(raw as u32)
            }

            #[must_use]
            pub fn idx(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

arena_id!(ClassId);
arena_id!(PackageId);
arena_id!(TypeParamId);
arena_id!(FunctionId);
arena_id!(PropertyId);
arena_id!(ConstructorId);

/// Functions and properties share override resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CallableId {
    Function(FunctionId),
    Property(PropertyId),
}

impl From<FunctionId> for CallableId {
    fn from(id: FunctionId) -> Self {
        CallableId::Function(id)
    }
}

impl From<PropertyId> for CallableId {
    fn from(id: PropertyId) -> Self {
        CallableId::Property(id)
    }
}
