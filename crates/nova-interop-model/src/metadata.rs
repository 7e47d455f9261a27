//! Names of the annotations the native compiler writes into class files.

pub const JET_CLASS: &str = "jet.runtime.typeinfo.JetClass";
pub const JET_METHOD: &str = "jet.runtime.typeinfo.JetMethod";
pub const JET_VALUE_PARAMETER: &str = "jet.runtime.typeinfo.JetValueParameter";
pub const JET_CONSTRUCTOR: &str = "jet.runtime.typeinfo.JetConstructor";
pub const KOTLIN_SIGNATURE: &str = "jet.runtime.typeinfo.KotlinSignature";

/// Marker interface every native class implements.
pub const JET_OBJECT: &str = "jet.JetObject";
/// Type of the hidden runtime type-info parameter of reified functions.
pub const TYPE_INFO: &str = "jet.typeinfo.TypeInfo";

pub const DEFAULT_NOT_NULL: &str = "org.jetbrains.annotations.NotNull";

/// Nested class holding the class object members of a native class.
pub const CLASS_OBJECT_CLASS_NAME: &str = "ClassObject$";
/// Facade class holding a package's top-level members.
pub const PACKAGE_CLASS_NAME: &str = "namespace";
pub const TRAIT_IMPL_SUFFIX: &str = "$$TImpl";

pub mod element {
    pub const ABI_VERSION: &str = "abiVersion";
    pub const SIGNATURE: &str = "signature";
    pub const FLAGS: &str = "flags";
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const RECEIVER: &str = "receiver";
    pub const NULLABLE: &str = "nullable";
    pub const HAS_DEFAULT_VALUE: &str = "hasDefaultValue";
    pub const HIDDEN: &str = "hidden";
    pub const VALUE: &str = "value";
}

/// Bits of `JetMethod.flags`.
pub mod flags {
    pub const PROPERTY: i32 = 1 << 0;
    pub const FORCE_OPEN: i32 = 1 << 1;
    pub const FORCE_FINAL: i32 = 1 << 2;
    pub const PRIVATE: i32 = 1 << 3;
    pub const INTERNAL: i32 = 1 << 4;
    pub const NULLABLE_RETURN: i32 = 1 << 5;
}
