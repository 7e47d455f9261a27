//! Functions of foreign classes, and the member scopes of classes.

use std::collections::{BTreeMap, BTreeSet};

use nova_interop_descriptors::{
    CallableHeader, CallableId, ClassId, Container, DescriptorRef, Diagnostic, FunctionDescriptor,
    FunctionId, InitState, MappingPosition, MemberKind, MemberScope, Modality, NativeType,
    Substitution, TypeParamOwner, ValueParameter, Visibility,
};
use nova_interop_model::metadata::{self, flags, CLASS_OBJECT_CLASS_NAME};
use nova_interop_model::{
    DeclarationSite, ForeignClass, ForeignField, ForeignMethod, ForeignParameter, ForeignType,
};
use nova_interop_signature::{parse_method_signature, MethodSignature};

use crate::alt_signature::{
    reconcile_function, AltSignatureError, AutoFunction, ALT_SIGNATURE_MISMATCH,
};
use crate::error::{ResolveError, Result};
use crate::metadata::{alternative_signature, ClassMetadata, MethodMetadata, ParameterMetadata};
use crate::overrides::{resolve_overrides, resolve_unknown_visibility, OverrideSink};
use crate::resolver::{visibility_from, JavaDescriptorResolver, ScopeSource, TypeParamSource};
use crate::signature_sink::NativeTypeSink;
use crate::transform::TypeUsage;
use crate::type_variables::{InitializationScope, NoTypeVariables, TypeVariableResolver};

pub(crate) static EMPTY_SCOPE: MemberScope = MemberScope::new();

const OVERRIDE_CONFLICT: &str = "override-conflict";
const UNKNOWN_VISIBILITY: &str = "cannot-infer-visibility";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AccessorRole {
    Getter,
    Setter,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct AccessorCandidate<'m> {
    pub index: usize,
    pub method: &'m ForeignMethod,
    pub role: AccessorRole,
}

/// Everything one foreign class declares under one name.
#[derive(Debug, Default)]
pub(crate) struct NamedMembers<'m> {
    pub functions: Vec<(usize, &'m ForeignMethod)>,
    pub accessors: Vec<AccessorCandidate<'m>>,
    pub fields: Vec<&'m ForeignField>,
}

/// Resolved callables bucketed by name.
#[derive(Debug, Default)]
pub(crate) struct DeclaredMembers {
    pub functions: BTreeMap<String, Vec<CallableId>>,
    pub properties: BTreeMap<String, Vec<CallableId>>,
}

impl DeclaredMembers {
    pub fn push(&mut self, name: &str, id: CallableId) {
        let bucket = match id {
            CallableId::Function(_) => &mut self.functions,
            CallableId::Property(_) => &mut self.properties,
        };
        bucket.entry(name.to_string()).or_default().push(id);
    }

    pub fn add_to(&self, scope: &mut MemberScope) {
        for (name, members) in self.functions.iter().chain(&self.properties) {
            for member in members {
                match member {
                    CallableId::Function(id) => scope.add_function(name, *id),
                    CallableId::Property(id) => scope.add_property(name, *id),
                }
            }
        }
    }
}

#[derive(Default)]
struct CollectingSink {
    conflicts: Vec<(CallableId, CallableId)>,
    unknown_visibility: Vec<CallableId>,
}

impl OverrideSink for CollectingSink {
    fn conflict(&mut self, from_super: CallableId, from_current: CallableId) {
        self.conflicts.push((from_super, from_current));
    }

    fn cannot_infer_visibility(&mut self, member: CallableId) {
        self.unknown_visibility.push(member);
    }
}

pub(crate) fn is_type_info(ty: &ForeignType) -> bool {
    ty.class_name()
        .is_some_and(|name| name.as_str() == metadata::TYPE_INFO)
}

/// `getFoo`/`isFoo` getters and `setFoo` setters, with the property name.
pub(crate) fn accessor_role(method: &ForeignMethod) -> Option<(AccessorRole, String)> {
    let value_params = method
        .parameters
        .iter()
        .filter(|param| !is_type_info(&param.ty) && !ParameterMetadata::read(param).receiver)
        .count();
    let name = method.name.as_str();
    let returns_void = method.return_type.is_void();
    let (role, suffix, valid) = if let Some(suffix) = name.strip_prefix("get") {
        (AccessorRole::Getter, suffix, value_params == 0 && !returns_void)
    } else if let Some(suffix) = name.strip_prefix("is") {
        let valid = value_params == 0 && method.return_type.is_boolean();
        (AccessorRole::Getter, suffix, valid)
    } else if let Some(suffix) = name.strip_prefix("set") {
        (AccessorRole::Setter, suffix, value_params == 1 && returns_void)
    } else {
        return None;
    };
    if !valid {
        return None;
    }
    let mut chars = suffix.chars();
    let first = chars.next().filter(|first| first.is_uppercase())?;
    let property = first.to_lowercase().chain(chars).collect();
    Some((role, property))
}

/// Statics are final; metadata flags force the rest.
pub(crate) fn method_modality(method: &ForeignMethod, member_flags: i32) -> Modality {
    if method.is_static() {
        Modality::Final
    } else if member_flags & flags::FORCE_OPEN != 0 {
        Modality::Open
    } else if member_flags & flags::FORCE_FINAL != 0 {
        Modality::Final
    } else {
        Modality::from_flags(method.modifiers.is_abstract(), !method.modifiers.is_final())
    }
}

fn is_enum_builtin_static(method: &ForeignMethod) -> bool {
    match (method.name.as_str(), method.parameters.as_slice()) {
        ("values", []) => true,
        ("valueOf", [param]) => param
            .ty
            .class_name()
            .is_some_and(|name| name.as_str() == "java.lang.String"),
        _ => false,
    }
}

impl<'m> JavaDescriptorResolver<'m> {
    /// Members of `class`, computed once: declared members, fake overrides of
    /// inherited members and nested classes.
    pub fn member_scope(&mut self, class: ClassId) -> Result<&MemberScope> {
        let descriptor = self.store.class(class);
        if descriptor.member_scope().is_none() {
            let fq_name = descriptor.fq_name.clone();
            if descriptor.state == InitState::Failed {
                return Err(ResolveError::PreviouslyFailed(fq_name));
            }
            if !self.scopes_in_progress.insert(class) {
                return Err(ResolveError::CyclicInheritance(fq_name));
            }
            let computed = self.compute_class_scope(class);
            self.scopes_in_progress.remove(&class);
            self.store.set_class_member_scope(class, computed?)?;
        }
        Ok(self
            .store
            .class(class)
            .member_scope()
            .unwrap_or(&EMPTY_SCOPE))
    }

    fn compute_class_scope(&mut self, class: ClassId) -> Result<MemberScope> {
        let fq_name = self.store.class(class).fq_name.clone();
        let owner = Container::Class(class);
        let mut scope = MemberScope::new();
        let declared = match self.class_sources.get(&class).copied() {
            Some(ScopeSource::Instance(foreign)) => {
                let vars = self.class_scope(class);
                let declared = self.declared_members(foreign, false, owner, &vars, false);
                self.add_nested_classes(foreign, &mut scope);
                declared
            }
            Some(ScopeSource::EnumStatics(foreign)) => {
                let vars = NoTypeVariables::new(format!("class {fq_name}"));
                let mut declared = self.declared_members(foreign, true, owner, &vars, true);
                self.add_enum_functions(class, &mut declared);
                declared
            }
            None => self.builtin_members(class, &mut scope),
        };
        let inherited = self.inherited_members(class);

        let mut sink = CollectingSink::default();
        let mut members = DeclaredMembers::default();
        for (declared, inherited) in [
            (&declared.functions, &inherited.functions),
            (&declared.properties, &inherited.properties),
        ] {
            self.bind_member_overrides(class, declared, inherited, &mut sink, &mut members);
        }
        members.add_to(&mut scope);

        let site = DeclarationSite::Class(fq_name);
        for (from_super, from_current) in sink.conflicts {
            let message = format!(
                "`{}` conflicts with inherited `{}`",
                self.store.render_callable(from_current),
                self.store.render_callable(from_super)
            );
            self.report(Diagnostic::error(OVERRIDE_CONFLICT, message, Some(site.clone())));
        }
        for member in sink.unknown_visibility {
            let message = format!(
                "cannot infer visibility of `{}`, assuming public",
                self.store.render_callable(member)
            );
            self.report(Diagnostic::warning(UNKNOWN_VISIBILITY, message, Some(site.clone())));
        }
        Ok(scope)
    }

    fn bind_member_overrides(
        &mut self,
        class: ClassId,
        declared: &BTreeMap<String, Vec<CallableId>>,
        inherited: &BTreeMap<String, Vec<CallableId>>,
        sink: &mut CollectingSink,
        out: &mut DeclaredMembers,
    ) {
        let names: BTreeSet<&String> = declared.keys().chain(inherited.keys()).collect();
        for name in names {
            let current = declared.get(name).map(Vec::as_slice).unwrap_or(&[]);
            let from_super = inherited.get(name).map(Vec::as_slice).unwrap_or(&[]);
            let resolved =
                resolve_overrides(&mut self.store, name, from_super, current, class, sink);
            for member in resolved {
                resolve_unknown_visibility(&mut self.store, member, sink);
                out.push(name, member);
            }
        }
    }

    /// Members of every supertype, substituted with the supertype's arguments.
    fn inherited_members(&mut self, class: ClassId) -> DeclaredMembers {
        let descriptor = self.store.class(class);
        let supertypes = descriptor.supertypes.clone();
        let site = DeclarationSite::Class(descriptor.fq_name.clone());
        let mut inherited = DeclaredMembers::default();
        for supertype in &supertypes {
            let Some(super_class) = supertype.class_id() else {
                continue;
            };
            let members = self
                .member_scope(super_class)
                .map(|scope| scope.all_callables().collect::<Vec<_>>());
            let members = match members {
                Ok(members) => members,
                Err(err) => {
                    self.report_error(&err, site.clone());
                    continue;
                }
            };
            let substitution = Substitution::for_type(&self.store, supertype);
            for member in members {
                let member = if substitution.is_empty() {
                    member
                } else {
                    let header = self.store.header(member);
                    let (owner, kind) = (header.owner, header.kind);
                    self.store.copy_callable(member, owner, kind, &substitution)
                };
                let name = self.store.header(member).name.clone();
                inherited.push(&name, member);
            }
        }
        inherited
    }

    fn add_nested_classes(&mut self, foreign: &ForeignClass, scope: &mut MemberScope) {
        for inner in &foreign.inner_classes {
            if inner.short_name() == CLASS_OBJECT_CLASS_NAME {
                continue;
            }
            match self.resolve_class(inner) {
                Ok(Some(nested)) => {
                    if self.store.class(nested).visibility != Visibility::Private {
                        scope.add_class(nested);
                    }
                }
                Ok(None) => {}
                Err(err) => self.report_error(&err, DeclarationSite::Class(inner.clone())),
            }
        }
    }

    fn builtin_members(&mut self, class: ClassId, scope: &mut MemberScope) -> DeclaredMembers {
        let mut declared = DeclaredMembers::default();
        for member in &self.store.class(class).builtin_members {
            declared.push(&self.store.header(*member).name, *member);
        }
        let mut nested: Vec<ClassId> = self
            .store
            .builtins()
            .classes()
            .filter(|nested| self.store.class(*nested).container == Container::Class(class))
            .collect();
        nested.sort();
        for nested in nested {
            scope.add_class(nested);
        }
        declared
    }

    /// `values()` and `valueOf(String)` on the class object of an enum.
    fn add_enum_functions(&mut self, class_object: ClassId, declared: &mut DeclaredMembers) {
        let Container::Class(enum_class) = self.store.class(class_object).container else {
            return;
        };
        let enum_type = self.store.default_type(enum_class);
        let owner = Container::Class(class_object);
        let synthesized = |name: &str| {
            let mut header = CallableHeader::new(name, owner);
            header.kind = MemberKind::Synthesized;
            header
        };

        let values = FunctionDescriptor {
            header: synthesized("values"),
            value_params: Vec::new(),
            return_type: self.store.builtins().array_type(enum_type.clone()),
            annotations: Vec::new(),
        };
        let value_of = FunctionDescriptor {
            header: synthesized("valueOf"),
            value_params: vec![ValueParameter::new(
                0,
                "value",
                self.store.builtins().string_type(),
            )],
            return_type: enum_type,
            annotations: Vec::new(),
        };
        for function in [values, value_of] {
            let name = function.header.name.clone();
            let id = self.store.add_function(function);
            declared.push(&name, id.into());
        }
    }

    /// Buckets the members of `class` with the given staticness by name.
    /// Declarations compiled for another ABI version are reported and dropped.
    pub(crate) fn collect_named_members(
        &mut self,
        class: &'m ForeignClass,
        statics: bool,
    ) -> BTreeMap<String, NamedMembers<'m>> {
        let mut named: BTreeMap<String, NamedMembers<'m>> = BTreeMap::new();
        for (index, method) in class.methods.iter().enumerate() {
            if method.is_static() != statics || method.name.starts_with('<') {
                continue;
            }
            let method_metadata = MethodMetadata::read(method);
            if let Some(method_metadata) = method_metadata {
                let site = DeclarationSite::Method {
                    owner: class.fq_name.clone(),
                    name: method.name.clone(),
                    index,
                };
                if let Err(diagnostic) = self.abi.check(method_metadata.abi_version, &site) {
                    self.report(diagnostic);
                    continue;
                }
            }

            let accessor = accessor_role(method);
            let metadata_accessor = method_metadata.is_some_and(|meta| meta.is_property_accessor());
            if let Some((role, property)) = accessor {
                named.entry(property).or_default().accessors.push(AccessorCandidate {
                    index,
                    method,
                    role,
                });
            }
            if !metadata_accessor {
                named
                    .entry(method.name.clone())
                    .or_default()
                    .functions
                    .push((index, method));
            }
        }

        // Private fields of native classes back their properties.
        let native = ClassMetadata::read(class).is_some();
        for field in &class.fields {
            if field.modifiers.is_static() != statics || (native && field.modifiers.is_private()) {
                continue;
            }
            named.entry(field.name.clone()).or_default().fields.push(field);
        }
        named
    }

    /// Functions and properties `class` declares with the given staticness.
    /// Failures drop the affected declaration and are reported.
    pub(crate) fn declared_members(
        &mut self,
        class: &'m ForeignClass,
        statics: bool,
        owner: Container,
        vars: &dyn TypeVariableResolver,
        enum_entries: bool,
    ) -> DeclaredMembers {
        let named = self.collect_named_members(class, statics);
        let mut declared = DeclaredMembers::default();
        for (name, members) in &named {
            for (index, method) in &members.functions {
                if enum_entries && is_enum_builtin_static(method) {
                    continue;
                }
                let site = DeclarationSite::Method {
                    owner: class.fq_name.clone(),
                    name: name.clone(),
                    index: *index,
                };
                match self.resolve_method(class, method, owner, vars, &site) {
                    Ok(Some(function)) => {
                        self.bindings.record(site, DescriptorRef::Function(function));
                        declared.push(name, function.into());
                    }
                    Ok(None) => {}
                    Err(err) => self.report_error(&err, site),
                }
            }

            if members.accessors.is_empty() && members.fields.is_empty() {
                continue;
            }
            match self.synthesize_properties(class, owner, name, members, vars, enum_entries) {
                Ok(properties) => {
                    for property in properties {
                        declared.push(name, property.into());
                    }
                }
                Err(err) => {
                    let site = match (members.fields.first(), members.accessors.first()) {
                        (None, Some(accessor)) => DeclarationSite::Method {
                            owner: class.fq_name.clone(),
                            name: accessor.method.name.clone(),
                            index: accessor.index,
                        },
                        _ => DeclarationSite::Field {
                            owner: class.fq_name.clone(),
                            name: name.clone(),
                        },
                    };
                    self.report_error(&err, site);
                }
            }
        }
        declared
    }

    /// `Ok(None)` when an alternative signature rejected the method.
    fn resolve_method(
        &mut self,
        class: &ForeignClass,
        method: &ForeignMethod,
        owner: Container,
        vars: &dyn TypeVariableResolver,
        site: &DeclarationSite,
    ) -> Result<Option<FunctionId>> {
        let method_metadata = MethodMetadata::read(method);
        let member_flags = method_metadata.map_or(0, |meta| meta.flags);
        let signature = method
            .generic_signature
            .as_deref()
            .map(parse_method_signature)
            .transpose()?;

        let source = match &signature {
            Some(signature) => TypeParamSource::Signature(&signature.type_parameters),
            None => TypeParamSource::Foreign(&method.type_parameters),
        };
        let type_params = self.create_type_params(TypeParamOwner::Pending, &source);
        let scope = InitializationScope::new(
            source.names(),
            &type_params,
            format!("method {} in class {}", method.name, class.fq_name),
        )
        .with_parent(vars);
        let mut bounds = self.type_param_bounds(&source, &scope)?;
        let (receiver, mut value_params) = self.value_parameters(
            &method.parameters,
            method.modifiers.is_varargs(),
            signature.as_ref().map(MethodSignature::parameters),
            &scope,
        )?;
        let mut return_type =
            self.return_type(method, method_metadata, signature.as_ref(), &scope)?;

        if self.config.alternative_signatures {
            let auto = AutoFunction {
                type_params: &type_params,
                type_param_bounds: &bounds,
                value_params: &value_params,
                return_type: &return_type,
            };
            match reconcile_function(&self.store, &method.name, alternative_signature(method), auto)
            {
                Ok(Some(overlay)) => {
                    bounds = overlay.type_param_bounds;
                    value_params = overlay.value_params;
                    return_type = overlay.return_type;
                }
                Ok(None) => {}
                Err(err) => {
                    self.report_alt_signature_error(site, &err);
                    return Ok(None);
                }
            }
        }
        self.initialize_type_params(&type_params, bounds)?;

        let mut header = CallableHeader::new(&method.name, owner);
        header.type_params = type_params.clone();
        header.receiver = receiver;
        header.modality = method_modality(method, member_flags);
        header.visibility = visibility_from(member_flags, method.modifiers);

        let annotations = self.resolve_annotations(&method.annotations);
        let id = self.store.add_function(FunctionDescriptor {
            header,
            value_params,
            return_type,
            annotations,
        });
        for param in &type_params {
            self.store.type_param_mut(*param).owner = TypeParamOwner::Callable(id.into());
        }
        Ok(Some(id))
    }

    pub(crate) fn report_alt_signature_error(
        &mut self,
        site: &DeclarationSite,
        err: &AltSignatureError,
    ) {
        tracing::warn!(
            target: "nova.interop.resolve",
            %site,
            error = %err,
            "alternative signature rejected"
        );
        self.report(Diagnostic::error(
            ALT_SIGNATURE_MISMATCH,
            format!("alternative signature of {site} does not fit: {err}"),
            Some(site.clone()),
        ));
    }

    fn return_type(
        &mut self,
        method: &ForeignMethod,
        method_metadata: Option<MethodMetadata<'_>>,
        signature: Option<&MethodSignature<'_>>,
        vars: &dyn TypeVariableResolver,
    ) -> Result<NativeType> {
        let ty = match (signature, method_metadata.and_then(|meta| meta.type_signature)) {
            (Some(signature), _) => {
                let decoded = {
                    let mut sink = NativeTypeSink::new(self, vars, MappingPosition::Ordinary);
                    signature.decode_return_type(&mut sink)?
                };
                decoded.unwrap_or_else(|| self.store.builtins().unit_type())
            }
            (None, Some(type_signature)) => self.transform_signature(type_signature, vars)?,
            (None, None) => {
                self.transform(&method.return_type, TypeUsage::MemberSignatureCovariant, vars)?
            }
        };
        Ok(if method_metadata.is_some_and(|meta| meta.has_nullable_return()) {
            ty.make_nullable()
        } else if self.has_not_null_annotation(method) {
            ty.make_not_null()
        } else {
            ty
        })
    }

    /// Receiver and value parameters. Type-info parameters are skipped and
    /// unnamed parameters are called `p0`, `p1`, ...
    pub(crate) fn value_parameters(
        &mut self,
        params: &[ForeignParameter],
        is_varargs: bool,
        signature_params: Option<&[&str]>,
        vars: &dyn TypeVariableResolver,
    ) -> Result<(Option<NativeType>, Vec<ValueParameter>)> {
        let mut receiver = None;
        let mut value_params: Vec<ValueParameter> = Vec::with_capacity(params.len());
        let last = params.len().saturating_sub(1);
        for (position, param) in params.iter().enumerate() {
            if is_type_info(&param.ty) {
                continue;
            }
            let param_metadata = ParameterMetadata::read(param);
            let is_vararg = is_varargs && position == last;
            let type_signature = param_metadata
                .type_signature
                .or_else(|| signature_params.and_then(|types| types.get(position).copied()));

            let mut vararg_element = None;
            let ty = match (type_signature, &param.ty) {
                (Some(type_signature), _) => {
                    let ty = self.transform_signature(type_signature, vars)?;
                    if is_vararg {
                        vararg_element = self.array_element(&ty);
                    }
                    ty
                }
                (None, ForeignType::Array(component)) if is_vararg => {
                    let (array, element) = self.transform_vararg(component, vars)?;
                    vararg_element = Some(element);
                    array
                }
                (None, foreign) => {
                    self.transform(foreign, TypeUsage::MemberSignatureContravariant, vars)?
                }
            };
            let ty = if param_metadata.nullable {
                ty.make_nullable()
            } else if self.has_not_null_annotation(param) {
                ty.make_not_null()
            } else {
                ty
            };

            if param_metadata.receiver {
                receiver = Some(ty);
                continue;
            }
            let index = value_params.len();
            let name = match (param_metadata.name, &param.name) {
                (Some(name), _) => name.to_string(),
                (None, Some(name)) => name.clone(),
                (None, None) => format!("p{index}"),
            };
            let mut value_param = ValueParameter::new(index, &name, ty);
            value_param.vararg_element = vararg_element;
            value_param.has_default = param_metadata.has_default;
            value_params.push(value_param);
        }
        Ok((receiver, value_params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_interop_model::PrimitiveKind;

    fn method(name: &str, ret: ForeignType) -> ForeignMethod {
        ForeignMethod::new(name, ret)
    }

    #[test]
    fn accessor_names_follow_the_bean_convention() {
        let string = ForeignType::class("java.lang.String");
        let void = ForeignType::Primitive(PrimitiveKind::Void);
        let boolean = ForeignType::Primitive(PrimitiveKind::Boolean);

        assert_eq!(
            accessor_role(&method("getName", string.clone())),
            Some((AccessorRole::Getter, "name".to_string()))
        );
        assert_eq!(
            accessor_role(&method("isEmpty", boolean)),
            Some((AccessorRole::Getter, "empty".to_string()))
        );
        assert_eq!(
            accessor_role(&method("setName", void.clone()).param("value", string.clone())),
            Some((AccessorRole::Setter, "name".to_string()))
        );
        assert_eq!(accessor_role(&method("getter", string.clone())), None);
        assert_eq!(accessor_role(&method("get", string.clone())), None);
        assert_eq!(accessor_role(&method("getName", void)), None);
        assert_eq!(accessor_role(&method("isReady", string)), None);
    }
}
