//! Class descriptors: the cached shell first, then type parameters,
//! supertypes, constructors and the class object.

use nova_interop_descriptors::{
    ClassDescriptor, ClassId, ClassKind, ConstructorDescriptor, ConstructorId, Container,
    DescriptorRef, InitState, MappingPosition, Modality, NativeType, TypeParamOwner,
    ValueParameter, Visibility,
};
use nova_interop_model::metadata::{self, CLASS_OBJECT_CLASS_NAME, TRAIT_IMPL_SUFFIX};
use nova_interop_model::{
    Annotated, DeclarationSite, FqName, ForeignClass, ForeignClassKind, ForeignConstructor,
    ForeignType,
};
use nova_interop_signature::{parse_class_signature, ClassSignature};

use crate::error::{ResolveError, Result};
use crate::metadata::{is_hidden_constructor, member_flags, ClassMetadata};
use crate::resolver::{
    visibility_from, ClassEntry, JavaDescriptorResolver, ScopeSource, TypeParamSource,
};
use crate::signature_sink::NativeTypeSink;
use crate::transform::TypeUsage;
use crate::type_variables::{InitializationScope, TypeVariableResolver};

const JAVA_LANG_OBJECT: &str = "java.lang.Object";

impl<'m> JavaDescriptorResolver<'m> {
    /// Class descriptor for a qualified name.
    ///
    /// `Ok(None)` when the model does not know the class or the class was
    /// compiled for another ABI version. A class whose initialization failed
    /// keeps failing with [`ResolveError::PreviouslyFailed`].
    pub fn resolve_class(&mut self, fq_name: &FqName) -> Result<Option<ClassId>> {
        if fq_name.as_str().ends_with(TRAIT_IMPL_SUFFIX) {
            return Ok(None);
        }
        if let Some(id) = self.store.builtin_class(fq_name) {
            return Ok(Some(id));
        }
        if let Some(cached) = self.cached_class(fq_name)? {
            return Ok(cached);
        }
        let model = self.model;
        match model.find_class(fq_name) {
            Some(class) => self.resolve_class_from(class),
            None => {
                self.classes.insert(fq_name.clone(), ClassEntry::Missing);
                Ok(None)
            }
        }
    }

    /// Same as [`resolve_class`](Self::resolve_class) for a class the caller
    /// already holds.
    pub fn resolve_class_from(&mut self, class: &'m ForeignClass) -> Result<Option<ClassId>> {
        let fq_name = &class.fq_name;
        if fq_name.as_str().ends_with(TRAIT_IMPL_SUFFIX) {
            return Ok(None);
        }
        if let Some(cached) = self.cached_class(fq_name)? {
            return Ok(cached);
        }

        let class_metadata = ClassMetadata::read(class);
        if let Some(class_metadata) = class_metadata {
            let site = DeclarationSite::Class(fq_name.clone());
            if let Err(diagnostic) = self.abi.check(class_metadata.abi_version, &site) {
                self.report(diagnostic);
                self.classes.insert(fq_name.clone(), ClassEntry::Missing);
                return Ok(None);
            }
        }

        let container = self.class_container(class)?;
        // Resolving the outer class may already have produced this one.
        if let Some(cached) = self.cached_class(fq_name)? {
            return Ok(cached);
        }

        let kind = match class.kind {
            ForeignClassKind::Interface => ClassKind::Interface,
            ForeignClassKind::Annotation => ClassKind::AnnotationClass,
            ForeignClassKind::Enum => ClassKind::EnumClass,
            ForeignClassKind::Class
                if class.outer.is_some() && class.short_name() == CLASS_OBJECT_CLASS_NAME =>
            {
                ClassKind::ClassObject
            }
            ForeignClassKind::Class => ClassKind::Class,
        };
        let modifiers = class.modifiers;
        let modality = if class.kind == ForeignClassKind::Annotation {
            Modality::Final
        } else {
            Modality::from_flags(
                modifiers.is_abstract() || class.is_interface(),
                !modifiers.is_final(),
            )
        };

        let mut shell = ClassDescriptor::shell(fq_name.clone(), container, kind);
        shell.modality = modality;
        shell.visibility =
            visibility_from(class_metadata.map_or(0, |meta| meta.flags), modifiers);
        shell.is_native = class_metadata.is_some();
        shell.is_inner = class.is_inner();
        let id = self.store.add_class(shell);
        self.classes.insert(fq_name.clone(), ClassEntry::Resolved(id));
        self.class_sources.insert(id, ScopeSource::Instance(class));
        self.bindings
            .record(DeclarationSite::Class(fq_name.clone()), DescriptorRef::Class(id));
        tracing::debug!(target: "nova.interop.resolve", class = %fq_name, "resolving class");

        let window = self.provisional.len();
        self.initializing.push(id);
        let result = self.initialize_class(id, class);
        self.initializing.pop();
        match result {
            Ok(()) => {
                self.store.class_mut(id).state = InitState::Initialized;
                self.finish_window(id);
                Ok(Some(id))
            }
            Err(err) => {
                tracing::debug!(
                    target: "nova.interop.resolve",
                    class = %fq_name,
                    error = %err,
                    "class failed to resolve"
                );
                self.fail_class(id);
                self.fail_dependents(id, window);
                Err(err)
            }
        }
    }

    /// A class finished inside another class' window stays provisional until
    /// the outermost window closes.
    fn finish_window(&mut self, id: ClassId) {
        if self.initializing.is_empty() {
            self.provisional.clear();
        } else {
            self.provisional.push(id);
        }
    }

    fn fail_class(&mut self, id: ClassId) {
        let descriptor = self.store.class_mut(id);
        descriptor.state = InitState::Failed;
        let fq_name = descriptor.fq_name.clone();
        self.classes.insert(fq_name, ClassEntry::Failed);
    }

    /// Fails every class that finished inside the window of `failed` and
    /// refers to it, directly or through another failed class.
    fn fail_dependents(&mut self, failed: ClassId, window: usize) {
        let candidates = self.provisional.split_off(window.min(self.provisional.len()));
        let mut failed_classes = vec![failed];
        let mut remaining = candidates;
        loop {
            let (dependent, rest): (Vec<ClassId>, Vec<ClassId>) = remaining
                .into_iter()
                .partition(|candidate| self.refers_to_any(*candidate, &failed_classes));
            remaining = rest;
            if dependent.is_empty() {
                break;
            }
            for class in dependent {
                tracing::debug!(
                    target: "nova.interop.resolve",
                    class = %self.store.class(class).fq_name,
                    "class depends on a failed class"
                );
                self.fail_class(class);
                failed_classes.push(class);
            }
        }
        if !self.initializing.is_empty() {
            self.provisional.extend(remaining);
        }
    }

    fn refers_to_any(&self, class: ClassId, failed: &[ClassId]) -> bool {
        let is_failed = |id: ClassId| failed.contains(&id);
        let descriptor = self.store.class(class);
        let container_failed = match descriptor.container {
            Container::Class(outer) => is_failed(outer),
            Container::Package(_) => false,
        };
        container_failed
            || descriptor.class_object.is_some_and(is_failed)
            || descriptor.supertypes.iter().any(|ty| ty.mentions_class(&is_failed))
            || descriptor.type_params.iter().any(|param| {
                self.store
                    .type_param(*param)
                    .upper_bounds()
                    .iter()
                    .any(|bound| bound.mentions_class(&is_failed))
            })
            || descriptor.constructors.iter().any(|constructor| {
                self.store
                    .constructor(*constructor)
                    .value_params
                    .iter()
                    .any(|param| param.ty.mentions_class(&is_failed))
            })
    }

    /// `Ok(None)` when nothing is cached, `Ok(Some(..))` for a cached answer.
    fn cached_class(&self, fq_name: &FqName) -> Result<Option<Option<ClassId>>> {
        match self.classes.get(fq_name) {
            Some(ClassEntry::Resolved(id)) => Ok(Some(Some(*id))),
            Some(ClassEntry::Missing) => Ok(Some(None)),
            Some(ClassEntry::Failed) => Err(ResolveError::PreviouslyFailed(fq_name.clone())),
            None => Ok(None),
        }
    }

    fn class_container(&mut self, class: &ForeignClass) -> Result<Container> {
        if let Some(outer) = &class.outer {
            if let Some(outer) = self.resolve_class(outer)? {
                return Ok(Container::Class(outer));
            }
        }
        let package = class.fq_name.parent().unwrap_or_default();
        let package = match self.resolve_namespace(&package)? {
            Some(package) => package,
            None => self.store.builtins().root_package,
        };
        Ok(Container::Package(package))
    }

    fn initialize_class(&mut self, id: ClassId, class: &'m ForeignClass) -> Result<()> {
        let signature = class
            .generic_signature
            .as_deref()
            .map(parse_class_signature)
            .transpose()?;

        let source = match &signature {
            Some(signature) => TypeParamSource::Signature(&signature.type_parameters),
            None => TypeParamSource::Foreign(&class.type_parameters),
        };
        let type_params = self.create_type_params(TypeParamOwner::Class(id), &source);
        self.store.class_mut(id).type_params = type_params.clone();
        {
            let mut scope = InitializationScope::new(
                source.names(),
                &type_params,
                format!("class {}", class.fq_name),
            );
            if let Container::Class(outer) = self.store.class(id).container {
                if class.is_inner() {
                    scope = scope.with_parent(self.class_scope(outer));
                }
            }
            let bounds = self.type_param_bounds(&source, &scope)?;
            self.initialize_type_params(&type_params, bounds)?;
        }

        let class_scope = self.class_scope(id);
        self.resolve_supertypes(id, class, signature.as_ref(), &class_scope)?;
        self.resolve_constructors(id, class, &class_scope)?;
        self.resolve_class_object(id, class)?;
        let annotations = self.resolve_annotations(class.annotations());
        self.store.class_mut(id).annotations = annotations;
        Ok(())
    }

    fn resolve_supertypes(
        &mut self,
        id: ClassId,
        class: &ForeignClass,
        signature: Option<&ClassSignature<'_>>,
        vars: &dyn TypeVariableResolver,
    ) -> Result<()> {
        let mut supertypes = Vec::new();
        let mut incomplete = false;
        match signature {
            Some(signature) => {
                let decoded = {
                    let mut sink = NativeTypeSink::new(self, vars, MappingPosition::Covariant);
                    signature.decode_supertypes(&mut sink)?
                };
                for ty in decoded {
                    if ty.is_error() {
                        incomplete = true;
                    } else if !self.store.builtins().is_any(&ty) {
                        supertypes.push(ty);
                    }
                }
            }
            None => {
                for foreign in class.superclass.iter().chain(&class.interfaces) {
                    if is_class_named(foreign, metadata::JET_OBJECT) {
                        continue;
                    }
                    let ty = self.transform(foreign, TypeUsage::Supertype, vars)?;
                    if ty.is_error() {
                        incomplete = true;
                    } else {
                        supertypes.push(ty.make_not_null());
                    }
                }
            }
        }

        if supertypes.is_empty() {
            supertypes.push(self.default_supertype(class)?);
        }
        let descriptor = self.store.class_mut(id);
        descriptor.supertypes = supertypes;
        descriptor.incomplete_hierarchy = incomplete;
        Ok(())
    }

    fn default_supertype(&mut self, class: &ForeignClass) -> Result<NativeType> {
        let any = self.store.builtins().any_type();
        let is_root = class.fq_name.as_str() == JAVA_LANG_OBJECT;
        let is_annotation = class.kind == ForeignClassKind::Annotation;
        if is_root || is_annotation || ClassMetadata::read(class).is_some() {
            return Ok(any);
        }
        let model = self.model;
        let object = match model.find_class(&FqName::new(JAVA_LANG_OBJECT)) {
            Some(object) => self.resolve_class_from(object)?,
            None => None,
        };
        Ok(object.map_or(any, |object| self.store.default_type(object)))
    }

    fn resolve_constructors(
        &mut self,
        id: ClassId,
        class: &'m ForeignClass,
        vars: &dyn TypeVariableResolver,
    ) -> Result<()> {
        let (kind, visibility) = {
            let descriptor = self.store.class(id);
            (descriptor.kind, descriptor.visibility)
        };
        let constructors = match kind {
            ClassKind::Object | ClassKind::ClassObject => {
                vec![self.default_constructor(id, Visibility::Private)]
            }
            ClassKind::Interface => Vec::new(),
            ClassKind::AnnotationClass => vec![self.annotation_constructor(id, class, vars)?],
            _ if class.constructors.is_empty() => vec![self.default_constructor(id, visibility)],
            _ => {
                let mut constructors = Vec::new();
                for (index, constructor) in class.constructors.iter().enumerate() {
                    if is_hidden_constructor(constructor) {
                        continue;
                    }
                    let site = DeclarationSite::Constructor {
                        owner: class.fq_name.clone(),
                        index,
                    };
                    match self.resolve_constructor(id, constructor, vars) {
                        Ok(descriptor) => {
                            let constructor = self.store.add_constructor(descriptor);
                            self.bindings
                                .record(site, DescriptorRef::Constructor(constructor));
                            constructors.push(constructor);
                        }
                        Err(err) => self.report_error(&err, site),
                    }
                }
                constructors
            }
        };
        self.store.class_mut(id).constructors = constructors;
        Ok(())
    }

    fn default_constructor(
        &mut self,
        owner: ClassId,
        visibility: Visibility,
    ) -> ConstructorId {
        self.store.add_constructor(ConstructorDescriptor {
            owner,
            value_params: Vec::new(),
            visibility,
            is_primary: true,
            annotations: Vec::new(),
        })
    }

    fn resolve_constructor(
        &mut self,
        owner: ClassId,
        constructor: &ForeignConstructor,
        vars: &dyn TypeVariableResolver,
    ) -> Result<ConstructorDescriptor> {
        let (_, value_params) = self.value_parameters(
            &constructor.parameters,
            constructor.modifiers.is_varargs(),
            None,
            vars,
        )?;
        let flags = member_flags(constructor.annotation(metadata::JET_CONSTRUCTOR));
        Ok(ConstructorDescriptor {
            owner,
            value_params,
            visibility: visibility_from(flags, constructor.modifiers),
            is_primary: false,
            annotations: self.resolve_annotations(&constructor.annotations),
        })
    }

    /// Annotation elements become constructor parameters; a trailing array
    /// element is a vararg.
    fn annotation_constructor(
        &mut self,
        owner: ClassId,
        class: &ForeignClass,
        vars: &dyn TypeVariableResolver,
    ) -> Result<ConstructorId> {
        let elements: Vec<_> = class
            .methods
            .iter()
            .filter(|method| !method.is_static())
            .collect();
        let mut value_params = Vec::with_capacity(elements.len());
        for (index, method) in elements.iter().enumerate() {
            let is_last = index + 1 == elements.len();
            let mut param = match &method.return_type {
                ForeignType::Array(component) if is_last => {
                    let (array, element) = self.transform_vararg(component, vars)?;
                    let mut param = ValueParameter::new(index, &method.name, array);
                    param.vararg_element = Some(element);
                    param
                }
                ty => {
                    let ty = self
                        .transform(ty, TypeUsage::MemberSignatureInvariant, vars)?
                        .make_not_null();
                    ValueParameter::new(index, &method.name, ty)
                }
            };
            param.has_default = method.default_value.is_some();
            value_params.push(param);
        }
        Ok(self.store.add_constructor(ConstructorDescriptor {
            owner,
            value_params,
            visibility: Visibility::Public,
            is_primary: true,
            annotations: Vec::new(),
        }))
    }

    /// Enums get a synthesized class object holding their static members;
    /// other classes use the `ClassObject$` nested class when present.
    fn resolve_class_object(&mut self, id: ClassId, class: &'m ForeignClass) -> Result<()> {
        let class_object = if class.kind == ForeignClassKind::Enum {
            let fq_name = class.fq_name.child(CLASS_OBJECT_CLASS_NAME);
            let container = Container::Class(id);
            let mut descriptor =
                ClassDescriptor::shell(fq_name.clone(), container, ClassKind::ClassObject);
            descriptor.visibility = self.store.class(id).visibility;
            descriptor.is_native = self.store.class(id).is_native;
            descriptor.supertypes = vec![self.store.builtins().any_type()];
            descriptor.state = InitState::Initialized;
            let object = self.store.add_class(descriptor);
            let constructor = self.default_constructor(object, Visibility::Private);
            self.store.class_mut(object).constructors = vec![constructor];
            self.classes.insert(fq_name, ClassEntry::Resolved(object));
            self.class_sources.insert(object, ScopeSource::EnumStatics(class));
            self.provisional.push(object);
            Some(object)
        } else {
            match class
                .inner_classes
                .iter()
                .find(|inner| inner.short_name() == CLASS_OBJECT_CLASS_NAME)
            {
                Some(inner) => self.resolve_class(inner)?,
                None => None,
            }
        };
        self.store.class_mut(id).class_object = class_object;
        Ok(())
    }
}

fn is_class_named(ty: &ForeignType, fq_name: &str) -> bool {
    ty.class_name().is_some_and(|name| name.as_str() == fq_name)
}
