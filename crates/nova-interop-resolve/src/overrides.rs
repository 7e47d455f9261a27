//! Binding of members to the inherited members they override, and fake
//! overrides for inherited members nobody overrides.

use std::collections::VecDeque;

use nova_interop_descriptors::{
    is_subtype, CallableId, ClassId, Container, DescriptorStore, MemberKind, Modality, NativeType,
    Substitution, TypeParamAxioms, Visibility,
};
use nova_interop_model::FqName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overridability {
    Overridable,
    Incompatible,
    /// Same shape but not a valid override, e.g. differing type parameter counts.
    Conflict,
}

/// Receives problems found during override resolution; none of them is fatal.
pub trait OverrideSink {
    fn conflict(&mut self, from_super: CallableId, from_current: CallableId);

    fn cannot_infer_visibility(&mut self, _member: CallableId) {}
}

/// Can `sub` override `sup`?
pub fn is_overridable_by(
    store: &DescriptorStore,
    sup: CallableId,
    sub: CallableId,
) -> Overridability {
    let same_kind = matches!(
        (sup, sub),
        (CallableId::Function(_), CallableId::Function(_))
            | (CallableId::Property(_), CallableId::Property(_))
    );
    let (sup_header, sub_header) = (store.header(sup), store.header(sub));
    if !same_kind || sup_header.name != sub_header.name {
        return Overridability::Incompatible;
    }
    if sup_header.receiver.is_some() != sub_header.receiver.is_some() {
        return Overridability::Incompatible;
    }

    let sup_params = compiled_parameters(store, sup);
    let sub_params = compiled_parameters(store, sub);
    if sup_params.len() != sub_params.len() {
        return Overridability::Incompatible;
    }

    if sup_header.type_params.len() != sub_header.type_params.len() {
        let axioms = TypeParamAxioms::new();
        let erased_equal = sup_params.iter().zip(&sub_params).all(|(a, b)| {
            axioms.equal(&bound_or_self(store, a), &bound_or_self(store, b))
        });
        return if erased_equal {
            Overridability::Conflict
        } else {
            Overridability::Incompatible
        };
    }

    let mut axioms = TypeParamAxioms::new();
    for (a, b) in sup_header.type_params.iter().zip(&sub_header.type_params) {
        axioms.assume(*a, *b);
    }
    for (a, b) in sup_header.type_params.iter().zip(&sub_header.type_params) {
        let (a_bounds, b_bounds) = (
            store.type_param(*a).upper_bounds(),
            store.type_param(*b).upper_bounds(),
        );
        if a_bounds.len() != b_bounds.len()
            || !a_bounds.iter().zip(b_bounds).all(|(x, y)| axioms.equal(x, y))
        {
            return Overridability::Incompatible;
        }
    }

    for (a, b) in sup_params.iter().zip(&sub_params) {
        if !(axioms.equal(a, b) || (a.is_error() && b.is_error())) {
            return Overridability::Incompatible;
        }
    }
    Overridability::Overridable
}

/// Receiver first, then value parameters.
fn compiled_parameters(store: &DescriptorStore, id: CallableId) -> Vec<&NativeType> {
    let mut params: Vec<&NativeType> = store.header(id).receiver.iter().collect();
    params.extend(store.value_parameter_types(id));
    params
}

fn bound_or_self(store: &DescriptorStore, ty: &NativeType) -> NativeType {
    ty.type_parameter_id()
        .and_then(|param| store.type_param(param).upper_bounds().first().cloned())
        .unwrap_or_else(|| ty.clone())
}

/// Binds every member of `current` to the members of `inherited` it overrides
/// and adds fake overrides for the rest. Returns the members of `owner` with
/// this name: `current` followed by the fake overrides.
pub fn resolve_overrides(
    store: &mut DescriptorStore,
    name: &str,
    inherited: &[CallableId],
    current: &[CallableId],
    owner: ClassId,
    sink: &mut dyn OverrideSink,
) -> Vec<CallableId> {
    let mut not_overridden: Vec<CallableId> = inherited.to_vec();
    for member in current {
        let bound = bind_overrides(store, *member, inherited, owner, sink);
        not_overridden.retain(|from_super| !bound.contains(from_super));
    }

    let mut members = current.to_vec();
    let mut queue: VecDeque<CallableId> = not_overridden.into();
    while let Some(from_super) = max_visibility_member(store, &queue) {
        let group = extract_overridable_both_ways(store, from_super, &mut queue, sink);
        members.push(create_fake_override(store, &group, owner));
    }
    tracing::trace!(
        target: "nova.interop.resolve",
        name,
        declared = current.len(),
        total = members.len(),
        "resolved overrides"
    );
    members
}

fn bind_overrides(
    store: &mut DescriptorStore,
    member: CallableId,
    inherited: &[CallableId],
    owner: ClassId,
    sink: &mut dyn OverrideSink,
) -> Vec<CallableId> {
    let mut bound = Vec::new();
    for from_super in inherited {
        match is_overridable_by(store, *from_super, member) {
            Overridability::Overridable => {
                if is_visible_from(store, *from_super, owner) {
                    let overridden = &mut store.header_mut(member).overridden;
                    if !overridden.contains(from_super) {
                        overridden.push(*from_super);
                    }
                }
                bound.push(*from_super);
            }
            Overridability::Conflict => {
                sink.conflict(*from_super, member);
                bound.push(*from_super);
            }
            Overridability::Incompatible => {}
        }
    }
    bound
}

fn max_visibility_member(
    store: &DescriptorStore,
    queue: &VecDeque<CallableId>,
) -> Option<CallableId> {
    let mut best: Option<CallableId> = None;
    for candidate in queue {
        match best {
            None => best = Some(*candidate),
            Some(current) => {
                let order = store
                    .header(current)
                    .visibility
                    .compare(store.header(*candidate).visibility);
                if order == Some(std::cmp::Ordering::Less) {
                    best = Some(*candidate);
                }
            }
        }
    }
    best
}

/// Removes `member` from `queue` together with every member that overrides it
/// and is overridden by it; conflicting members are dropped and reported.
fn extract_overridable_both_ways(
    store: &DescriptorStore,
    member: CallableId,
    queue: &mut VecDeque<CallableId>,
    sink: &mut dyn OverrideSink,
) -> Vec<CallableId> {
    let mut group = vec![member];
    queue.retain(|candidate| {
        if *candidate == member {
            return false;
        }
        let forward = is_overridable_by(store, *candidate, member);
        let backward = is_overridable_by(store, member, *candidate);
        if forward == Overridability::Overridable && backward == Overridability::Overridable {
            group.push(*candidate);
            return false;
        }
        if forward == Overridability::Conflict || backward == Overridability::Conflict {
            sink.conflict(member, *candidate);
            return false;
        }
        true
    });
    group
}

fn create_fake_override(
    store: &mut DescriptorStore,
    group: &[CallableId],
    owner: ClassId,
) -> CallableId {
    let visible: Vec<CallableId> = group
        .iter()
        .copied()
        .filter(|member| is_visible_from(store, *member, owner))
        .collect();
    let (effective, visibility) = if visible.is_empty() {
        (group.to_vec(), Visibility::InvisibleFake)
    } else {
        (visible, Visibility::Inherited)
    };
    let modality = effective
        .iter()
        .map(|member| store.header(*member).modality)
        .min()
        .unwrap_or(Modality::Open);
    let most_specific = most_specific(store, &effective);

    let fake = store.copy_callable(
        most_specific,
        Container::Class(owner),
        MemberKind::FakeOverride,
        &Substitution::empty(),
    );
    let header = store.header_mut(fake);
    header.modality = modality;
    header.visibility = visibility;
    header.overridden = effective;
    if let CallableId::Property(property) = fake {
        let property = store.property_mut(property);
        for accessor in property.getter.iter_mut().chain(property.setter.iter_mut()) {
            accessor.visibility = visibility;
            accessor.modality = modality;
        }
    }
    fake
}

/// Member whose signature is a subtype of all others'; the first one if none is.
fn most_specific(store: &DescriptorStore, members: &[CallableId]) -> CallableId {
    members
        .iter()
        .copied()
        .find(|candidate| {
            members
                .iter()
                .all(|other| is_more_specific(store, *candidate, *other))
        })
        .unwrap_or(members[0])
}

fn is_more_specific(store: &DescriptorStore, a: CallableId, b: CallableId) -> bool {
    let (a_type, b_type) = (store.result_type(a), store.result_type(b));
    match (a, b) {
        (CallableId::Property(pa), CallableId::Property(pb)) => {
            let (a_var, b_var) = (store.property(pa).is_var, store.property(pb).is_var);
            if a_var && b_var {
                TypeParamAxioms::new().equal(a_type, b_type)
            } else {
                (a_var || !b_var) && is_subtype(store, a_type, b_type)
            }
        }
        _ => is_subtype(store, a_type, b_type),
    }
}

/// Replaces `Inherited` visibility by the strongest visibility among the
/// members `member` overrides.
pub fn resolve_unknown_visibility(
    store: &mut DescriptorStore,
    member: CallableId,
    sink: &mut dyn OverrideSink,
) {
    if store.header(member).visibility != Visibility::Inherited {
        return;
    }
    let overridden = store.header(member).overridden.clone();
    for from_super in &overridden {
        resolve_unknown_visibility(store, *from_super, sink);
    }
    let visibility = match max_visibility(store, &overridden) {
        Some(visibility) => visibility,
        None => {
            sink.cannot_infer_visibility(member);
            Visibility::Public
        }
    };
    store.header_mut(member).visibility = visibility;
    if let CallableId::Property(property) = member {
        let property = store.property_mut(property);
        for accessor in property.getter.iter_mut().chain(property.setter.iter_mut()) {
            if accessor.visibility == Visibility::Inherited {
                accessor.visibility = visibility;
            }
        }
    }
}

/// `None` when the visibilities are not totally ordered.
fn max_visibility(store: &DescriptorStore, members: &[CallableId]) -> Option<Visibility> {
    if members.is_empty() {
        return Some(Visibility::Internal);
    }
    let visibilities: Vec<Visibility> = members
        .iter()
        .map(|member| store.header(*member).visibility)
        .collect();
    let mut max: Option<Visibility> = None;
    for visibility in &visibilities {
        max = match max {
            None => Some(*visibility),
            Some(current) => match visibility.compare(current) {
                None => None,
                Some(std::cmp::Ordering::Greater) => Some(*visibility),
                Some(_) => Some(current),
            },
        };
    }
    let max = max?;
    let dominates = visibilities.iter().all(|visibility| {
        matches!(
            max.compare(*visibility),
            Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
        )
    });
    dominates.then_some(max)
}

fn is_visible_from(store: &DescriptorStore, member: CallableId, owner: ClassId) -> bool {
    let header = store.header(member);
    match header.visibility {
        Visibility::Private | Visibility::InvisibleFake => false,
        Visibility::Package => {
            package_of(store, header.owner) == package_of(store, Container::Class(owner))
        }
        _ => true,
    }
}

fn package_of(store: &DescriptorStore, container: Container) -> FqName {
    match container {
        Container::Package(package) => store.package(package).fq_name.clone(),
        Container::Class(class) => package_of(store, store.class(class).container),
    }
}
