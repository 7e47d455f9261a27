//! Properties built from the fields and accessor methods sharing a name.
//!
//! Members are grouped by property type and receiver. Every group becomes
//! one property; its getter, field or setter (in that order) decides the
//! type, visibility and annotations.

use nova_interop_descriptors::{
    CallableHeader, CallableId, Container, DescriptorRef, Modality, PropertyAccessor,
    PropertyDescriptor, PropertyId, TypeParamId, TypeParamOwner,
};
use nova_interop_model::{
    Annotated, Annotation, DeclarationSite, ForeignClass, ForeignField, ForeignMethod,
    ForeignParameter,
};
use nova_interop_signature::parse_method_signature;

use crate::alt_signature::reconcile_property_type;
use crate::error::{ResolveError, Result};
use crate::members::{is_type_info, method_modality, AccessorCandidate, AccessorRole, NamedMembers};
use crate::metadata::{alternative_signature, ClassMetadata, MethodMetadata, ParameterMetadata};
use crate::resolver::{visibility_from, JavaDescriptorResolver, TypeParamSource};
use crate::transform::TypeUsage;
use crate::type_variables::{InitializationScope, TypeVariableResolver};

struct PropertyGroup<'m> {
    type_key: String,
    receiver_key: Option<String>,
    /// Native type signature written by the compiler on the accessors.
    type_signature: Option<&'m str>,
    getters: Vec<AccessorCandidate<'m>>,
    setters: Vec<AccessorCandidate<'m>>,
    fields: Vec<&'m ForeignField>,
}

fn receiver_param(method: &ForeignMethod) -> Option<&ForeignParameter> {
    method
        .parameters
        .iter()
        .find(|param| ParameterMetadata::read(param).receiver)
}

fn setter_value_param(method: &ForeignMethod) -> Option<&ForeignParameter> {
    method
        .parameters
        .iter()
        .find(|param| !is_type_info(&param.ty) && !ParameterMetadata::read(param).receiver)
}

fn param_key(param: &ForeignParameter) -> String {
    ParameterMetadata::read(param)
        .type_signature
        .map_or_else(|| param.ty.erased(), str::to_string)
}

fn accessor_flags(method: &ForeignMethod) -> i32 {
    MethodMetadata::read(method).map_or(0, |meta| meta.flags)
}

fn group_members<'m>(members: &NamedMembers<'m>) -> Vec<PropertyGroup<'m>> {
    fn group_for<'a, 'm>(
        groups: &'a mut Vec<PropertyGroup<'m>>,
        type_key: String,
        receiver_key: Option<String>,
    ) -> &'a mut PropertyGroup<'m> {
        let position = groups
            .iter()
            .position(|group| group.type_key == type_key && group.receiver_key == receiver_key);
        let position = position.unwrap_or_else(|| {
            groups.push(PropertyGroup {
                type_key,
                receiver_key,
                type_signature: None,
                getters: Vec::new(),
                setters: Vec::new(),
                fields: Vec::new(),
            });
            groups.len() - 1
        });
        &mut groups[position]
    }

    let mut groups = Vec::new();
    for accessor in &members.accessors {
        let method = accessor.method;
        let type_signature = MethodMetadata::read(method).and_then(|meta| meta.type_signature);
        let type_key = match (type_signature, accessor.role) {
            (Some(signature), _) => signature.to_string(),
            (None, AccessorRole::Getter) => method.return_type.erased(),
            (None, AccessorRole::Setter) => setter_value_param(method)
                .map(param_key)
                .unwrap_or_default(),
        };
        let receiver_key = receiver_param(method).map(param_key);
        let group = group_for(&mut groups, type_key, receiver_key);
        group.type_signature = group.type_signature.or(type_signature);
        match accessor.role {
            AccessorRole::Getter => group.getters.push(*accessor),
            AccessorRole::Setter => group.setters.push(*accessor),
        }
    }
    for field in &members.fields {
        group_for(&mut groups, field.ty.erased(), None).fields.push(*field);
    }
    groups
}

impl<'m> JavaDescriptorResolver<'m> {
    /// Properties named `name` built from `members`.
    ///
    /// Two members of the same role in one group, or accessors that disagree
    /// on the type of a non-extension property, make the name ambiguous.
    pub(crate) fn synthesize_properties(
        &mut self,
        class: &'m ForeignClass,
        owner: Container,
        name: &str,
        members: &NamedMembers<'m>,
        vars: &dyn TypeVariableResolver,
        enum_entries: bool,
    ) -> Result<Vec<PropertyId>> {
        let groups = group_members(members);
        let ambiguous = |reason: String| ResolveError::AmbiguousProperty {
            owner: class.fq_name.clone(),
            name: name.to_string(),
            reason,
        };
        for group in &groups {
            for (role, count) in [
                ("getters", group.getters.len()),
                ("setters", group.setters.len()),
                ("fields", group.fields.len()),
            ] {
                if count > 1 {
                    return Err(ambiguous(format!(
                        "{count} {role} of type {}",
                        group.type_key
                    )));
                }
            }
        }
        let plain: Vec<&str> = groups
            .iter()
            .filter(|group| group.receiver_key.is_none())
            .map(|group| group.type_key.as_str())
            .collect();
        if plain.len() > 1 {
            return Err(ambiguous(format!(
                "members disagree on the type: {}",
                plain.join(", ")
            )));
        }

        let native = ClassMetadata::read(class).is_some();
        let mut properties = Vec::with_capacity(groups.len());
        for group in &groups {
            if let Some(property) =
                self.build_property(class, owner, name, group, vars, native, enum_entries)?
            {
                properties.push(property);
            }
        }
        Ok(properties)
    }

    /// `Ok(None)` when an alternative signature rejected the property.
    #[allow(clippy::too_many_arguments)]
    fn build_property(
        &mut self,
        class: &ForeignClass,
        owner: Container,
        name: &str,
        group: &PropertyGroup<'m>,
        vars: &dyn TypeVariableResolver,
        native: bool,
        enum_entries: bool,
    ) -> Result<Option<PropertyId>> {
        let getter = group.getters.first().copied();
        let setter = group.setters.first().copied();
        let field = group.fields.first().copied();
        let accessor_method = getter.or(setter).map(|accessor| accessor.method);

        let signature = accessor_method
            .and_then(|method| method.generic_signature.as_deref())
            .map(parse_method_signature)
            .transpose()?;
        let source = match (&signature, accessor_method) {
            (Some(signature), _) => TypeParamSource::Signature(&signature.type_parameters),
            (None, Some(method)) => TypeParamSource::Foreign(&method.type_parameters),
            (None, None) => TypeParamSource::Foreign(&[]),
        };
        let type_params = self.create_type_params(TypeParamOwner::Pending, &source);
        let scope = InitializationScope::new(
            source.names(),
            &type_params,
            format!("property {name} in class {}", class.fq_name),
        )
        .with_parent(vars);
        let bounds = self.type_param_bounds(&source, &scope)?;
        self.initialize_type_params(&type_params, bounds)?;

        let receiver = match accessor_method.and_then(receiver_param) {
            Some(param) => Some(match ParameterMetadata::read(param).type_signature {
                Some(signature) => self.transform_signature(signature, &scope)?,
                None => {
                    self.transform(&param.ty, TypeUsage::MemberSignatureContravariant, &scope)?
                }
            }),
            None => None,
        };

        let annotations: &[Annotation] = match (getter, field, setter) {
            (Some(getter), _, _) => getter.method.annotations(),
            (None, Some(field), _) => field.annotations(),
            (None, None, Some(setter)) => setter.method.annotations(),
            (None, None, None) => &[],
        };
        let mut ty = match (group.type_signature, getter, field, setter) {
            (Some(signature), ..) => self.transform_signature(signature, &scope)?,
            (None, Some(getter), _, _) => self.transform(
                &getter.method.return_type,
                TypeUsage::MemberSignatureCovariant,
                &scope,
            )?,
            (None, None, Some(field), _) => {
                self.transform(&field.ty, TypeUsage::MemberSignatureInvariant, &scope)?
            }
            (None, None, None, Some(setter)) => {
                let Some(param) = setter_value_param(setter.method) else {
                    return Ok(None);
                };
                self.transform(&param.ty, TypeUsage::MemberSignatureContravariant, &scope)?
            }
            (None, None, None, None) => return Ok(None),
        };
        let field_only = getter.is_none() && setter.is_none();
        if group.type_signature.is_none() {
            let not_null = annotations
                .iter()
                .any(|annotation| self.config.is_not_null_annotation(annotation.fq_name.as_str()));
            let constant = field_only
                && field.is_some_and(|field| {
                    field.modifiers.is_static() && field.modifiers.is_final()
                });
            if not_null || constant {
                ty = ty.make_not_null();
            }
        }

        let is_var = setter.is_some()
            || (getter.is_none() && field.is_some_and(|field| !field.modifiers.is_final()));
        if let (true, Some(field)) = (field_only, field) {
            if self.config.alternative_signatures {
                let alt = alternative_signature(field);
                match reconcile_property_type(&self.store, name, is_var, alt, &ty) {
                    Ok(Some(overlay)) => ty = overlay,
                    Ok(None) => {}
                    Err(err) => {
                        let site = DeclarationSite::Field {
                            owner: class.fq_name.clone(),
                            name: field.name.clone(),
                        };
                        self.report_alt_signature_error(&site, &err);
                        return Ok(None);
                    }
                }
            }
        }

        let visibility = match (getter, field, setter) {
            (Some(getter), _, _) => {
                visibility_from(accessor_flags(getter.method), getter.method.modifiers)
            }
            (None, Some(field), _) => visibility_from(0, field.modifiers),
            (None, None, Some(setter)) => {
                visibility_from(accessor_flags(setter.method), setter.method.modifiers)
            }
            (None, None, None) => return Ok(None),
        };
        let modality = if enum_entries || !native {
            Modality::Final
        } else {
            let modalities: Vec<Modality> = getter
                .iter()
                .chain(setter.iter())
                .map(|accessor| method_modality(accessor.method, accessor_flags(accessor.method)))
                .collect();
            if modalities.is_empty() || modalities.contains(&Modality::Final) {
                Modality::Final
            } else if modalities.contains(&Modality::Abstract) {
                Modality::Abstract
            } else {
                Modality::Open
            }
        };

        let accessor_visibility = |accessor: AccessorCandidate<'_>| {
            visibility_from(accessor_flags(accessor.method), accessor.method.modifiers)
        };
        let getter_accessor = (!field_only).then(|| PropertyAccessor {
            visibility: getter.map_or(visibility, accessor_visibility),
            modality,
            parameter_name: None,
        });
        let setter_accessor = setter.map(|setter| PropertyAccessor {
            visibility: accessor_visibility(setter),
            modality,
            parameter_name: Some(
                setter_value_param(setter.method)
                    .and_then(|param| ParameterMetadata::read(param).name)
                    .unwrap_or("p0")
                    .to_string(),
            ),
        });

        let mut header = CallableHeader::new(name, owner);
        header.type_params = type_params.clone();
        header.receiver = receiver;
        header.modality = modality;
        header.visibility = visibility;
        let annotations = self.resolve_annotations(annotations);
        let id = self.store.add_property(PropertyDescriptor {
            header,
            ty,
            is_var,
            getter: getter_accessor,
            setter: setter_accessor,
            is_enum_entry: enum_entries,
            annotations,
        });
        self.bind_property(class, id, &type_params, group);
        Ok(Some(id))
    }

    fn bind_property(
        &mut self,
        class: &ForeignClass,
        id: PropertyId,
        type_params: &[TypeParamId],
        group: &PropertyGroup<'m>,
    ) {
        for param in type_params {
            self.store.type_param_mut(*param).owner =
                TypeParamOwner::Callable(CallableId::from(id));
        }
        for accessor in group.getters.iter().chain(&group.setters) {
            let site = DeclarationSite::Method {
                owner: class.fq_name.clone(),
                name: accessor.method.name.clone(),
                index: accessor.index,
            };
            self.bindings.record(site, DescriptorRef::Property(id));
        }
        for field in &group.fields {
            let site = DeclarationSite::Field {
                owner: class.fq_name.clone(),
                name: field.name.clone(),
            };
            self.bindings.record(site, DescriptorRef::Property(id));
        }
    }
}
