//! Short textual forms of types and declarations, as used in diagnostics and
//! tests: `MutableList<T>?`, `fun <T> first(p0: List<T>): T`.

use crate::descriptors::Container;
use crate::ids::{CallableId, ClassId, TypeParamId};
use crate::store::DescriptorStore;
use crate::types::{NativeType, TypeConstructor, TypeProjection, Variance};

impl DescriptorStore {
    /// Class name relative to its package, e.g. `Map.Entry`.
    pub fn render_class_name(&self, class: ClassId) -> String {
        let descriptor = self.class(class);
        match descriptor.container {
            Container::Class(outer) => {
                format!("{}.{}", self.render_class_name(outer), descriptor.name())
            }
            Container::Package(_) => descriptor.name().to_string(),
        }
    }

    pub fn render_type(&self, ty: &NativeType) -> String {
        let mut out = match &ty.constructor {
            TypeConstructor::Class(class) => self.render_class_name(*class),
            TypeConstructor::TypeParameter(param) => self.type_param(*param).name.clone(),
            TypeConstructor::Unresolved(name) => format!("[ERROR : {name}]"),
        };
        if !ty.arguments.is_empty() {
            let arguments: Vec<String> = ty
                .arguments
                .iter()
                .map(|argument| self.render_projection(argument))
                .collect();
            out.push('<');
            out.push_str(&arguments.join(", "));
            out.push('>');
        }
        if ty.nullable {
            out.push('?');
        }
        out
    }

    fn render_projection(&self, projection: &TypeProjection) -> String {
        match projection {
            TypeProjection::Star => "*".to_string(),
            TypeProjection::Projected(Variance::Invariant, ty) => self.render_type(ty),
            TypeProjection::Projected(variance, ty) => {
                format!("{} {}", variance.label(), self.render_type(ty))
            }
        }
    }

    fn render_type_params(&self, params: &[TypeParamId]) -> String {
        if params.is_empty() {
            return String::new();
        }
        let nullable_any = self.builtins().nullable_any_type();
        let rendered: Vec<String> = params
            .iter()
            .map(|param| {
                let param = self.type_param(*param);
                let mut out = String::new();
                if param.reified {
                    out.push_str("reified ");
                }
                if param.variance != Variance::Invariant {
                    out.push_str(param.variance.label());
                    out.push(' ');
                }
                out.push_str(&param.name);
                let bounds = param.upper_bounds();
                if !(bounds.len() == 1 && bounds[0] == nullable_any) && !bounds.is_empty() {
                    let bounds: Vec<String> =
                        bounds.iter().map(|bound| self.render_type(bound)).collect();
                    out.push_str(" : ");
                    out.push_str(&bounds.join(" & "));
                }
                out
            })
            .collect();
        format!("<{}> ", rendered.join(", "))
    }

    /// `fun <T> Recv.name(p0: Int, vararg p1: String): Unit` or
    /// `var name: String?`.
    pub fn render_callable(&self, id: CallableId) -> String {
        let header = self.header(id);
        let receiver = header
            .receiver
            .as_ref()
            .map(|ty| format!("{}.", self.render_type(ty)))
            .unwrap_or_default();
        let type_params = self.render_type_params(&header.type_params);
        match id {
            CallableId::Function(function) => {
                let function = self.function(function);
                let params: Vec<String> = function
                    .value_params
                    .iter()
                    .map(|param| match &param.vararg_element {
                        Some(element) => {
                            format!("vararg {}: {}", param.name, self.render_type(element))
                        }
                        None => format!("{}: {}", param.name, self.render_type(&param.ty)),
                    })
                    .collect();
                format!(
                    "fun {type_params}{receiver}{}({}): {}",
                    header.name,
                    params.join(", "),
                    self.render_type(&function.return_type)
                )
            }
            CallableId::Property(property) => {
                let property = self.property(property);
                let keyword = if property.is_var { "var" } else { "val" };
                format!(
                    "{keyword} {type_params}{receiver}{}: {}",
                    header.name,
                    self.render_type(&property.ty)
                )
            }
        }
    }

    /// `class Box<T>`, `interface List<out E>`.
    pub fn render_class(&self, class: ClassId) -> String {
        use crate::descriptors::ClassKind;

        let descriptor = self.class(class);
        let keyword = match descriptor.kind {
            ClassKind::Class => "class",
            ClassKind::Interface => "trait",
            ClassKind::EnumClass => "enum class",
            ClassKind::AnnotationClass => "annotation class",
            ClassKind::Object => "object",
            ClassKind::ClassObject => "class object",
        };
        let type_params = self.render_type_params(&descriptor.type_params);
        format!(
            "{keyword} {}{}",
            self.render_class_name(class),
            type_params.trim_end()
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::builtins::PrimitiveType;
    use crate::store::DescriptorStore;
    use crate::types::{NativeType, TypeProjection, Variance};
    use nova_interop_model::FqName;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_projections_and_nullability() {
        let store = DescriptorStore::new();
        let map = store.builtins().class_by_name(&FqName::new("jet.Map")).unwrap();
        let int = store.builtins().primitive_type(PrimitiveType::Int);
        let ty = NativeType::class(
            map,
            vec![
                TypeProjection::Projected(Variance::Out, int.clone()),
                TypeProjection::Star,
            ],
        )
        .make_nullable();
        assert_eq!(store.render_type(&ty), "Map<out Int, *>?");

        let entry = store
            .builtins()
            .class_by_name(&FqName::new("jet.Map.Entry"))
            .unwrap();
        assert_eq!(store.render_class(entry), "trait Map.Entry<out K, out V>");
        assert_eq!(
            store.render_type(&NativeType::unresolved(FqName::new("a.Missing"))),
            "[ERROR : a.Missing]"
        );
    }

    #[test]
    fn renders_builtin_members() {
        let store = DescriptorStore::new();
        let any = store.class(store.builtins().any);
        let rendered: Vec<String> = any
            .builtin_members
            .iter()
            .map(|member| store.render_callable(*member))
            .collect();
        assert_eq!(
            rendered,
            vec![
                "fun equals(other: Any?): Boolean",
                "fun hashCode(): Int",
                "fun toString(): String",
            ]
        );
        let enum_class = store.builtins().enum_class;
        assert_eq!(store.render_class(enum_class), "class Enum<E : Enum<E>>");
    }
}
