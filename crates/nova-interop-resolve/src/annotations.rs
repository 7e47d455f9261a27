//! Foreign annotations as annotation descriptors with constant arguments.

use nova_interop_descriptors::{AnnotationDescriptor, ClassId, CompileTimeConstant, NativeType};
use nova_interop_model::{Annotation, ConstValue, ElementValue};

use crate::metadata::is_metadata_annotation;
use crate::resolver::JavaDescriptorResolver;

fn constant(value: &ConstValue) -> CompileTimeConstant {
    match value {
        ConstValue::Byte(value) => CompileTimeConstant::Byte(*value),
        ConstValue::Char(value) => CompileTimeConstant::Char(*value),
        ConstValue::Short(value) => CompileTimeConstant::Short(*value),
        ConstValue::Int(value) => CompileTimeConstant::Int(*value),
        ConstValue::Long(value) => CompileTimeConstant::Long(*value),
        ConstValue::Float(value) => CompileTimeConstant::Float(*value),
        ConstValue::Double(value) => CompileTimeConstant::Double(*value),
        ConstValue::Boolean(value) => CompileTimeConstant::Boolean(*value),
        ConstValue::String(value) => CompileTimeConstant::String(value.clone()),
        ConstValue::Null => CompileTimeConstant::Null,
    }
}

impl JavaDescriptorResolver<'_> {
    /// Metadata and not-null annotations are consumed by the resolver itself
    /// and never show up here.
    pub(crate) fn resolve_annotations(
        &mut self,
        annotations: &[Annotation],
    ) -> Vec<AnnotationDescriptor> {
        let mut resolved = Vec::new();
        for annotation in annotations {
            if is_metadata_annotation(annotation)
                || self.config.is_not_null_annotation(annotation.fq_name.as_str())
            {
                continue;
            }
            resolved.push(self.resolve_annotation(annotation));
        }
        resolved
    }

    fn resolve_annotation(&mut self, annotation: &Annotation) -> AnnotationDescriptor {
        let class = match self.resolve_class(&annotation.fq_name) {
            Ok(class) => class,
            Err(err) => {
                tracing::debug!(
                    target: "nova.interop.resolve",
                    annotation = %annotation.fq_name,
                    error = %err,
                    "annotation class did not resolve"
                );
                None
            }
        };
        let mut arguments = Vec::with_capacity(annotation.elements.len());
        for (name, value) in &annotation.elements {
            if let Some(value) = self.element_value(class, name, value) {
                arguments.push((name.clone(), value));
            }
        }
        AnnotationDescriptor {
            fq_name: annotation.fq_name.clone(),
            class,
            arguments,
        }
    }

    /// Class literals have no constant form and are dropped.
    fn element_value(
        &mut self,
        class: Option<ClassId>,
        name: &str,
        value: &ElementValue,
    ) -> Option<CompileTimeConstant> {
        match value {
            ElementValue::Const(value) => Some(constant(value)),
            ElementValue::Enum {
                type_name,
                const_name,
            } => Some(CompileTimeConstant::EnumEntry {
                class: type_name.clone(),
                entry: const_name.clone(),
            }),
            ElementValue::Class(_) => None,
            ElementValue::Annotation(nested) => Some(CompileTimeConstant::Annotation(Box::new(
                self.resolve_annotation(nested),
            ))),
            ElementValue::Array(values) => {
                let element_type = class.and_then(|class| self.parameter_element_type(class, name));
                let values = values
                    .iter()
                    .filter_map(|value| self.element_value(None, name, value))
                    .collect();
                Some(CompileTimeConstant::Array {
                    element_type,
                    values,
                })
            }
        }
    }

    /// Element type of the array parameter `name` of an annotation class.
    fn parameter_element_type(&self, class: ClassId, name: &str) -> Option<NativeType> {
        let descriptor = self.store.class(class);
        let param = descriptor
            .constructors
            .iter()
            .flat_map(|constructor| &self.store.constructor(*constructor).value_params)
            .find(|param| param.name == name)?;
        param
            .vararg_element
            .clone()
            .or_else(|| self.array_element(&param.ty))
    }
}
