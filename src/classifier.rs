//! Content-model classification
//!
//! Reduces every complex type, element and attribute to exactly one
//! structural form:
//!
//! - complex types: [`ContentModel`] (`Empty`, `SimpleContent`, `Sequence`,
//!   `Choice`), together with the flattened list of effective attributes
//! - elements: [`ElementForm`] (`Ref`, `NamedType`, `EmptyInline`); inline
//!   complex types become `NamedType` against the anonymous type, which the
//!   normalizer later names
//! - attributes: [`AttributeForm`]
//!
//! Choice groups are checked for dispatch ambiguity: no two alternatives
//! may start with the same (name, namespace) pair.
//!
//! The free functions at the bottom answer structural questions about the
//! classified model and are shared with the exporter and the decoder.

use crate::collection::ComponentKind;
use crate::components::builtins::any_simple_type;
use crate::components::{
    AttributeForm, AttributeGroupId, AttributeId, AttributeMember, AttributeUse, ComplexTypeId, Compositor,
    ContentModel, DeclaredContent, ElementForm, ElementId, GroupId, ModelGroup, Occurs, Particle, RawRef, SchemaModel,
    TypeRef,
};
use crate::error::{Error, Result};
use crate::namespaces::QName;

/// Classify every component of a resolved model
pub fn classify(model: &mut SchemaModel) -> Result<()> {
    classify_elements(model)?;
    classify_attributes(model)?;
    check_group_cycles(model)?;

    let ids: Vec<ComplexTypeId> = model.complex_types().map(|(id, _)| id).collect();
    let mut classifier = TypeClassifier {
        marks: vec![Mark::Pending; ids.len()],
    };
    for id in ids {
        classifier.classify(model, id)?;
    }

    check_choices(model)
}

fn mutually_exclusive(component: &str, first: &str, second: &str) -> Error {
    Error::MutuallyExclusive {
        component: component.to_string(),
        first: first.to_string(),
        second: second.to_string(),
    }
}

fn unclassifiable(component: &str, reason: impl Into<String>) -> Error {
    Error::UnclassifiableContentModel {
        component: component.to_string(),
        reason: reason.into(),
    }
}

/// A reference slot that the resolver should have filled
fn unresolved_slot(component: &str, kind: impl ToString, raw: &RawRef) -> Error {
    Error::UnresolvedReference {
        component: component.to_string(),
        kind: kind.to_string(),
        name: raw.text.clone(),
    }
}

fn classify_elements(model: &mut SchemaModel) -> Result<()> {
    let ids: Vec<ElementId> = model.elements().map(|(id, _)| id).collect();
    for id in ids {
        let decl = model.element(id);
        let form = match (&decl.ref_name, &decl.type_name, decl.inline_type) {
            (Some(_), Some(_), _) => return Err(mutually_exclusive(&decl.path, "ref", "type")),
            (Some(_), None, Some(_)) => return Err(mutually_exclusive(&decl.path, "ref", "an inline type")),
            (None, Some(_), Some(_)) => return Err(mutually_exclusive(&decl.path, "type", "an inline type")),
            (Some(raw), None, None) => {
                let target = decl
                    .resolved_ref
                    .as_ref()
                    .ok_or_else(|| unresolved_slot(&decl.path, ComponentKind::Element, raw))?
                    .target;
                ElementForm::Ref { target }
            }
            (None, Some(raw), None) => {
                let type_ref = decl
                    .resolved_type
                    .as_ref()
                    .ok_or_else(|| unresolved_slot(&decl.path, ComponentKind::Type, raw))?
                    .target;
                ElementForm::NamedType {
                    type_ref,
                    anonymous: false,
                }
            }
            (None, None, Some(inline)) => ElementForm::NamedType {
                type_ref: inline.type_ref(),
                anonymous: true,
            },
            (None, None, None) => ElementForm::EmptyInline,
        };
        model.element_mut(id).form = Some(form);
    }
    Ok(())
}

fn classify_attributes(model: &mut SchemaModel) -> Result<()> {
    let ids: Vec<AttributeId> = model.attributes().map(|(id, _)| id).collect();
    for id in ids {
        let decl = model.attribute(id);
        let form = match (&decl.ref_name, &decl.type_name, decl.inline_type) {
            (Some(_), Some(_), _) => return Err(mutually_exclusive(&decl.path, "ref", "type")),
            (Some(_), None, Some(_)) => return Err(mutually_exclusive(&decl.path, "ref", "an inline type")),
            (None, Some(_), Some(_)) => return Err(mutually_exclusive(&decl.path, "type", "an inline type")),
            (Some(raw), None, None) => AttributeForm::Ref(
                decl.resolved_ref
                    .as_ref()
                    .ok_or_else(|| unresolved_slot(&decl.path, ComponentKind::Attribute, raw))?
                    .target,
            ),
            (None, Some(raw), None) => AttributeForm::NamedType(
                decl.resolved_type
                    .as_ref()
                    .ok_or_else(|| unresolved_slot(&decl.path, "simple type", raw))?
                    .target,
            ),
            (None, None, Some(inline)) => AttributeForm::InlineType(inline),
            (None, None, None) => AttributeForm::Untyped,
        };
        model.attribute_mut(id).form = Some(form);
    }
    Ok(())
}

/// Flatten attribute declarations and group references, dropping prohibited uses
fn flatten_attributes(
    model: &SchemaModel,
    members: &[AttributeMember],
    out: &mut Vec<AttributeId>,
    stack: &mut Vec<AttributeGroupId>,
) -> Result<()> {
    for member in members {
        match member {
            AttributeMember::Attribute(id) => {
                if model.attribute(*id).use_mode != AttributeUse::Prohibited {
                    out.push(*id);
                }
            }
            AttributeMember::GroupRef(group_ref) => {
                let target = group_ref
                    .resolved
                    .as_ref()
                    .ok_or_else(|| unresolved_slot(&group_ref.path, ComponentKind::AttributeGroup, &group_ref.name))?
                    .target;
                if stack.contains(&target) {
                    return Err(Error::CircularReference(format!(
                        "attribute group '{}' references itself",
                        model.attribute_group(target).qname()
                    )));
                }
                stack.push(target);
                flatten_attributes(model, &model.attribute_group(target).members, out, stack)?;
                stack.pop();
            }
        }
    }
    Ok(())
}

/// Reject model groups that contain themselves without an intervening element
fn check_group_cycles(model: &SchemaModel) -> Result<()> {
    let mut done = vec![false; model.groups().count()];
    let ids: Vec<GroupId> = model.groups().map(|(id, _)| id).collect();
    for id in ids {
        visit_group(model, id, &mut Vec::new(), &mut done)?;
    }
    Ok(())
}

fn visit_group(model: &SchemaModel, id: GroupId, stack: &mut Vec<GroupId>, done: &mut [bool]) -> Result<()> {
    if done[id.index()] {
        return Ok(());
    }
    if stack.contains(&id) {
        let group = model.group(id);
        let name = group
            .qname()
            .map(|q| format!("group '{}'", q))
            .unwrap_or_else(|| group.describe());
        return Err(Error::CircularReference(format!("{} contains itself", name)));
    }

    stack.push(id);
    for particle in &model.group(id).particles {
        let nested = match particle {
            Particle::Group(nested) => Some(*nested),
            Particle::GroupRef(group_ref) => group_ref.resolved.as_ref().map(|r| r.target),
            Particle::Element(_) | Particle::Unsupported { .. } => None,
        };
        if let Some(nested) = nested {
            visit_group(model, nested, stack, done)?;
        }
    }
    stack.pop();
    done[id.index()] = true;
    Ok(())
}

/// Reject particles that have no structural form
fn check_supported(model: &SchemaModel, group: GroupId, component: &str, visited: &mut Vec<GroupId>) -> Result<()> {
    if visited.contains(&group) {
        return Ok(());
    }
    visited.push(group);

    for particle in &model.group(group).particles {
        match particle {
            Particle::Unsupported { construct, path } => {
                return Err(unclassifiable(
                    component,
                    format!("xs:{} at {} has no structural form", construct, path),
                ))
            }
            Particle::Group(nested) => check_supported(model, *nested, component, visited)?,
            Particle::GroupRef(group_ref) => {
                if let Some(resolved) = &group_ref.resolved {
                    check_supported(model, resolved.target, component, visited)?;
                }
            }
            Particle::Element(_) => {}
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Pending,
    Active,
    Done,
}

/// Memoized complex type classification; extension bases are classified first
struct TypeClassifier {
    marks: Vec<Mark>,
}

impl TypeClassifier {
    fn classify(&mut self, model: &mut SchemaModel, id: ComplexTypeId) -> Result<()> {
        match self.marks[id.index()] {
            Mark::Done => return Ok(()),
            Mark::Active => {
                return Err(Error::CircularReference(format!(
                    "derivation of {} loops back on itself",
                    model.complex_type(id).describe()
                )))
            }
            Mark::Pending => {}
        }
        self.marks[id.index()] = Mark::Active;

        let (component, declared, mixed, own_attributes) = {
            let decl = model.complex_type(id);
            let mut own = Vec::new();
            flatten_attributes(model, &decl.attributes, &mut own, &mut Vec::new())?;
            (decl.describe(), decl.declared.clone(), decl.mixed, own)
        };

        if let Some(DeclaredContent::Unsupported { construct, path }) =
            declared.iter().find(|d| matches!(d, DeclaredContent::Unsupported { .. }))
        {
            return Err(unclassifiable(
                &component,
                format!("xs:{} at {} has no structural form", construct, path),
            ));
        }

        if declared.len() > 1 {
            return Err(Error::AmbiguousContentModel {
                component,
                reason: format!(
                    "declares both {} and {}",
                    declared[0].kind_name(),
                    declared[1].kind_name()
                ),
            });
        }

        let (content, mut attributes) = match declared.into_iter().next() {
            None => (ContentModel::Empty, Vec::new()),
            Some(DeclaredContent::Unsupported { construct, path }) => {
                return Err(unclassifiable(
                    &component,
                    format!("xs:{} at {} has no structural form", construct, path),
                ))
            }
            Some(DeclaredContent::Sequence(group)) => {
                check_supported(model, group, &component, &mut Vec::new())?;
                (ContentModel::Sequence(group), Vec::new())
            }
            Some(DeclaredContent::Choice(group)) => {
                check_supported(model, group, &component, &mut Vec::new())?;
                (ContentModel::Choice(group), Vec::new())
            }
            Some(DeclaredContent::SimpleExtension { base, resolved }) => {
                let target = resolved
                    .ok_or_else(|| unresolved_slot(&component, ComponentKind::Type, &base))?
                    .target;
                match target {
                    TypeRef::Complex(base_id) => {
                        self.classify(model, base_id)?;
                        let base_decl = model.complex_type(base_id);
                        match base_decl.content {
                            Some(ContentModel::SimpleContent { base }) => {
                                (ContentModel::SimpleContent { base }, base_decl.effective_attributes.clone())
                            }
                            _ => {
                                return Err(unclassifiable(
                                    &component,
                                    format!("simpleContent extends {} which has no simple content", base_decl.describe()),
                                ))
                            }
                        }
                    }
                    simple => (ContentModel::SimpleContent { base: simple }, Vec::new()),
                }
            }
            Some(DeclaredContent::ComplexExtension { base, resolved, content }) => {
                let base_id = resolved
                    .ok_or_else(|| unresolved_slot(&component, "complex type", &base))?
                    .target;
                self.classify(model, base_id)?;
                if let Some(group) = content {
                    check_supported(model, group, &component, &mut Vec::new())?;
                }
                let base_decl = model.complex_type(base_id);
                let inherited = base_decl.effective_attributes.clone();
                let base_content = base_decl.content.unwrap_or(ContentModel::Empty);
                (extend(model, id, &component, base_content, content)?, inherited)
            }
        };

        let content = match (mixed, content) {
            (true, ContentModel::Sequence(_) | ContentModel::Choice(_)) => {
                return Err(unclassifiable(&component, "mixed content with child elements"))
            }
            (true, ContentModel::Empty) => ContentModel::SimpleContent {
                base: TypeRef::Primitive(any_simple_type()),
            },
            (_, content) => content,
        };

        attributes.extend(own_attributes);
        tracing::trace!(component = %component, tag = %content, attributes = attributes.len(), "classified type");

        let decl = model.complex_type_mut(id);
        decl.content = Some(content);
        decl.effective_attributes = attributes;
        self.marks[id.index()] = Mark::Done;
        Ok(())
    }
}

/// Content of a complex-content extension: the base content followed by the extension's own
fn extend(
    model: &mut SchemaModel,
    id: ComplexTypeId,
    component: &str,
    base: ContentModel,
    own: Option<GroupId>,
) -> Result<ContentModel> {
    let Some(own) = own else {
        return Ok(base);
    };
    let own_group = model.group(own);

    match base {
        ContentModel::SimpleContent { .. } => Err(unclassifiable(component, "element content cannot extend simple content")),
        ContentModel::Empty => Ok(match own_group.compositor {
            Compositor::Sequence => ContentModel::Sequence(own),
            Compositor::Choice => ContentModel::Choice(own),
        }),
        ContentModel::Sequence(base_id) | ContentModel::Choice(base_id) => {
            let base_group = model.group(base_id);
            let decl = model.complex_type(id);
            let mut derived = ModelGroup::new(
                Compositor::Sequence,
                decl.document,
                format!("{}/complexContent/extension", decl.path),
            );

            let flat = |g: &ModelGroup| g.compositor == Compositor::Sequence && g.occurs == Occurs::once();
            derived.particles = if flat(base_group) && flat(own_group) {
                base_group.particles.iter().chain(own_group.particles.iter()).cloned().collect()
            } else {
                vec![Particle::Group(base_id), Particle::Group(own)]
            };
            Ok(ContentModel::Sequence(model.add_group(derived)))
        }
    }
}

fn check_choices(model: &SchemaModel) -> Result<()> {
    for (_, group) in model.groups() {
        if group.compositor != Compositor::Choice {
            continue;
        }

        let mut seen: Vec<(QName, usize)> = Vec::new();
        for (index, particle) in group.particles.iter().enumerate() {
            let mut names = Vec::new();
            particle_first_names(model, particle, &mut names, &mut Vec::new());
            for name in names {
                if let Some((_, other)) = seen.iter().find(|(n, i)| n == &name && *i != index) {
                    return Err(Error::AmbiguousContentModel {
                        component: group.describe(),
                        reason: format!(
                            "choice alternatives {} and {} both match element '{}'",
                            other + 1,
                            index + 1,
                            name
                        ),
                    });
                }
                seen.push((name, index));
            }
        }
    }
    Ok(())
}

/// Element name of a declaration, following `ref=` to the global element
pub fn element_name(model: &SchemaModel, id: ElementId) -> Option<QName> {
    let decl = model.element(id);
    match &decl.resolved_ref {
        Some(resolved) => model.element(resolved.target).qname(),
        None => decl.qname(),
    }
}

/// The declaration that carries the element's name and type
pub fn effective_element(model: &SchemaModel, id: ElementId) -> ElementId {
    match model.element(id).form {
        Some(ElementForm::Ref { target }) => target,
        _ => id,
    }
}

/// Type of an element; None for empty inline elements
pub fn element_type(model: &SchemaModel, id: ElementId) -> Option<TypeRef> {
    match model.element(effective_element(model, id)).form? {
        ElementForm::NamedType { type_ref, .. } => Some(type_ref),
        ElementForm::Ref { .. } | ElementForm::EmptyInline => None,
    }
}

/// Attribute name of a declaration, following `ref=`
pub fn attribute_name(model: &SchemaModel, id: AttributeId) -> Option<QName> {
    match model.attribute(id).form {
        Some(AttributeForm::Ref(target)) => model.attribute(target).qname(),
        _ => model.attribute(id).qname(),
    }
}

/// Value type of an attribute; untyped attributes are `anySimpleType`
pub fn attribute_type(model: &SchemaModel, id: AttributeId) -> TypeRef {
    match model.attribute(id).form {
        Some(AttributeForm::Ref(target)) => attribute_type(model, target),
        Some(AttributeForm::NamedType(type_ref)) => type_ref,
        Some(AttributeForm::InlineType(simple)) => TypeRef::Simple(simple),
        Some(AttributeForm::Untyped) | None => TypeRef::Primitive(any_simple_type()),
    }
}

/// Occurrence constraints of a particle
pub fn particle_occurs(model: &SchemaModel, particle: &Particle) -> Occurs {
    match particle {
        Particle::Element(id) => model.element(*id).occurs,
        Particle::Group(id) => model.group(*id).occurs,
        Particle::GroupRef(group_ref) => group_ref.occurs,
        Particle::Unsupported { .. } => Occurs::optional(),
    }
}

/// The model group a particle stands for, following group references
pub fn particle_group(particle: &Particle) -> Option<GroupId> {
    match particle {
        Particle::Group(id) => Some(*id),
        Particle::GroupRef(group_ref) => group_ref.resolved.as_ref().map(|r| r.target),
        _ => None,
    }
}

/// Whether a particle may match no elements at all
pub fn particle_emptiable(model: &SchemaModel, particle: &Particle) -> bool {
    group_particle_emptiable(model, particle, &mut Vec::new())
}

fn group_particle_emptiable(model: &SchemaModel, particle: &Particle, stack: &mut Vec<GroupId>) -> bool {
    if particle_occurs(model, particle).is_emptiable() {
        return true;
    }
    match particle_group(particle) {
        Some(group) => group_content_emptiable(model, group, stack),
        None => false,
    }
}

fn group_content_emptiable(model: &SchemaModel, group: GroupId, stack: &mut Vec<GroupId>) -> bool {
    if stack.contains(&group) {
        return false;
    }
    stack.push(group);
    let g = model.group(group);
    let emptiable = match g.compositor {
        Compositor::Sequence => g.particles.iter().all(|p| group_particle_emptiable(model, p, stack)),
        Compositor::Choice => {
            g.particles.is_empty() || g.particles.iter().any(|p| group_particle_emptiable(model, p, stack))
        }
    };
    stack.pop();
    emptiable
}

/// Element names a particle can start with
pub fn first_names(model: &SchemaModel, particle: &Particle) -> Vec<QName> {
    let mut names = Vec::new();
    particle_first_names(model, particle, &mut names, &mut Vec::new());
    names
}

fn particle_first_names(model: &SchemaModel, particle: &Particle, out: &mut Vec<QName>, stack: &mut Vec<GroupId>) {
    match particle {
        Particle::Element(id) => {
            if let Some(name) = element_name(model, *id) {
                if !out.contains(&name) {
                    out.push(name);
                }
            }
        }
        Particle::Unsupported { .. } => {}
        _ => {
            if let Some(group) = particle_group(particle) {
                group_first_names(model, group, out, stack);
            }
        }
    }
}

fn group_first_names(model: &SchemaModel, group: GroupId, out: &mut Vec<QName>, stack: &mut Vec<GroupId>) {
    if stack.contains(&group) {
        return;
    }
    stack.push(group);
    let g = model.group(group);
    for particle in &g.particles {
        particle_first_names(model, particle, out, stack);
        if g.compositor == Compositor::Sequence && !group_particle_emptiable(model, particle, &mut Vec::new()) {
            break;
        }
    }
    stack.pop();
}
