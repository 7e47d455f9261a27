//! Namespaces: proper packages, and the static members of a class seen as a
//! package of their own.

use nova_interop_descriptors::{
    Container, DescriptorRef, MemberScope, PackageDescriptor, PackageId, PackageKind,
    BUILTINS_PACKAGE,
};
use nova_interop_model::metadata::PACKAGE_CLASS_NAME;
use nova_interop_model::{DeclarationSite, FqName, ForeignClassKind};

use crate::error::Result;
use crate::members::{DeclaredMembers, EMPTY_SCOPE};
use crate::resolver::{JavaDescriptorResolver, PackageSource};
use crate::type_variables::NoTypeVariables;

impl<'m> JavaDescriptorResolver<'m> {
    /// Package descriptor for a qualified name.
    ///
    /// A name the model knows as a package (or that has a package facade
    /// class) is a proper package. The name of a non-enum class yields the
    /// namespace of its static members. Anything else is `Ok(None)`.
    pub fn resolve_namespace(&mut self, fq_name: &FqName) -> Result<Option<PackageId>> {
        if fq_name.is_root() {
            return Ok(Some(self.store.builtins().root_package));
        }
        if fq_name.as_str() == BUILTINS_PACKAGE {
            return Ok(Some(self.store.builtins().package));
        }
        if let Some(cached) = self.packages.get(fq_name) {
            return Ok(*cached);
        }

        let parent_name = fq_name.parent().unwrap_or_default();
        let Some(parent) = self.resolve_namespace(&parent_name)? else {
            self.packages.insert(fq_name.clone(), None);
            return Ok(None);
        };

        let model = self.model;
        let facade = model.find_class(&fq_name.child(PACKAGE_CLASS_NAME));
        let source = if model.find_package(fq_name).is_some() || facade.is_some() {
            Some((PackageKind::Proper, PackageSource::Proper { facade }))
        } else {
            match model.find_class(fq_name) {
                Some(class) if class.kind != ForeignClassKind::Enum => {
                    Some((PackageKind::ClassStatics, PackageSource::ClassStatics(class)))
                }
                _ => None,
            }
        };
        let Some((kind, source)) = source else {
            self.packages.insert(fq_name.clone(), None);
            return Ok(None);
        };

        let id = self
            .store
            .add_package(PackageDescriptor::new(fq_name.clone(), Some(parent), kind));
        self.packages.insert(fq_name.clone(), Some(id));
        self.package_sources.insert(id, source);
        self.bindings
            .record(DeclarationSite::Package(fq_name.clone()), DescriptorRef::Package(id));
        tracing::debug!(
            target: "nova.interop.resolve",
            package = %fq_name,
            ?kind,
            "resolved namespace"
        );
        Ok(Some(id))
    }

    /// Classes and static members of a namespace, computed on first access.
    pub fn namespace_scope(&mut self, package: PackageId) -> Result<&MemberScope> {
        if self.store.package(package).member_scope().is_none() {
            let scope = self.compute_namespace_scope(package)?;
            self.store.set_package_member_scope(package, scope)?;
        }
        Ok(self
            .store
            .package(package)
            .member_scope()
            .unwrap_or(&EMPTY_SCOPE))
    }

    fn compute_namespace_scope(&mut self, package: PackageId) -> Result<MemberScope> {
        let mut scope = MemberScope::new();
        if package == self.store.builtins().package {
            let mut classes: Vec<_> = self
                .store
                .builtins()
                .classes()
                .filter(|class| self.store.class(*class).container == Container::Package(package))
                .collect();
            classes.sort();
            for class in classes {
                scope.add_class(class);
            }
            return Ok(scope);
        }

        let fq_name = self.store.package(package).fq_name.clone();
        let model = self.model;
        let source = match self.package_sources.get(&package) {
            Some(source) => *source,
            None => PackageSource::Proper {
                facade: model.find_class(&fq_name.child(PACKAGE_CLASS_NAME)),
            },
        };
        let context = NoTypeVariables::new(format!("package {fq_name}"));
        let owner = Container::Package(package);
        let statics = match source {
            PackageSource::Proper { facade } => {
                if let Some(listing) = model.find_package(&fq_name) {
                    for class_name in &listing.classes {
                        if class_name.short_name() == PACKAGE_CLASS_NAME {
                            continue;
                        }
                        match self.resolve_class(class_name) {
                            Ok(Some(class)) => scope.add_class(class),
                            Ok(None) => {}
                            Err(err) => {
                                self.report_error(&err, DeclarationSite::Class(class_name.clone()))
                            }
                        }
                    }
                }
                match facade {
                    Some(facade) => self.declared_members(facade, true, owner, &context, false),
                    None => DeclaredMembers::default(),
                }
            }
            PackageSource::ClassStatics(class) => {
                for inner in &class.inner_classes {
                    let Some(nested) = model.find_class(inner) else {
                        continue;
                    };
                    if !nested.modifiers.is_static() {
                        continue;
                    }
                    match self.resolve_class_from(nested) {
                        Ok(Some(nested)) => scope.add_class(nested),
                        Ok(None) => {}
                        Err(err) => self.report_error(&err, DeclarationSite::Class(inner.clone())),
                    }
                }
                self.declared_members(class, true, owner, &context, false)
            }
        };
        statics.add_to(&mut scope);
        Ok(scope)
    }
}
