//! Reference resolution
//!
//! The second pass of the two-pass build: every `ref=`, `type=`, `base=`
//! and `itemType=` reference captured at parse time is expanded with its
//! in-scope namespace bindings and linked to its target. Built-in XSD types
//! short-circuit before the collection index is consulted.
//!
//! Resolution only reads the collection, which is complete before this pass
//! starts, so forward and mutually recursive references need no special
//! handling. Slots that are already filled are left alone, which makes the
//! pass idempotent.

use crate::collection::{ComponentKind, DocumentCollection, GlobalComponent};
use crate::components::builtins::lookup_qualified;
use crate::components::{
    AttributeGroupId, AttributeId, AttributeMember, DeclaredContent, ElementId, GroupId, Particle, RawRef, Resolved,
    SchemaModel, SimpleDerivation, SimpleTypeRef, TypeRef,
};
use crate::error::{Error, Result};
use crate::namespaces::QName;

/// Resolve every reference in the model; returns the number of links made
pub fn resolve(model: &mut SchemaModel, collection: &DocumentCollection) -> Result<usize> {
    let mut resolver = Resolver { collection, resolved: 0 };
    resolver.resolve_elements(model)?;
    resolver.resolve_attributes(model)?;
    resolver.resolve_attribute_groups(model)?;
    resolver.resolve_complex_types(model)?;
    resolver.resolve_simple_types(model)?;
    resolver.resolve_groups(model)?;
    Ok(resolver.resolved)
}

struct Resolver<'c> {
    collection: &'c DocumentCollection,
    resolved: usize,
}

impl<'c> Resolver<'c> {
    fn expand(&self, raw: &RawRef, component: &str) -> Result<QName> {
        raw.expand().map_err(|e| match e {
            Error::Namespace(message) => Error::Namespace(format!("{} in {}", message, component)),
            other => other,
        })
    }

    fn unresolved(component: &str, kind: impl ToString, name: &QName) -> Error {
        Error::UnresolvedReference {
            component: component.to_string(),
            kind: kind.to_string(),
            name: name.to_string(),
        }
    }

    fn lookup(&mut self, raw: &RawRef, kind: ComponentKind, component: &str) -> Result<(GlobalComponent, QName)> {
        let name = self.expand(raw, component)?;
        let target = self
            .collection
            .lookup(&name, kind)
            .ok_or_else(|| Self::unresolved(component, kind, &name))?;
        tracing::trace!(component, %name, ?target, "resolved reference");
        self.resolved += 1;
        Ok((target, name))
    }

    /// A `type=` or `base=` reference: built-in, simple or complex
    fn resolve_type(&mut self, raw: &RawRef, component: &str) -> Result<Resolved<TypeRef>> {
        let name = self.expand(raw, component)?;
        if let Some(primitive) = lookup_qualified(name.namespace.as_deref(), &name.local_name) {
            tracing::trace!(component, %name, "resolved built-in type");
            self.resolved += 1;
            return Ok(Resolved::new(TypeRef::Primitive(primitive), name));
        }

        let (target, name) = self.lookup(raw, ComponentKind::Type, component)?;
        let type_ref = match target {
            GlobalComponent::ComplexType(id) => TypeRef::Complex(id),
            GlobalComponent::SimpleType(id) => TypeRef::Simple(id),
            _ => return Err(Self::unresolved(component, ComponentKind::Type, &name)),
        };
        Ok(Resolved::new(type_ref, name))
    }

    /// A reference that must name a built-in or simple type
    fn resolve_simple_type(&mut self, raw: &RawRef, component: &str) -> Result<Resolved<TypeRef>> {
        let resolved = self.resolve_type(raw, component)?;
        if !resolved.target.is_simple() {
            return Err(Self::unresolved(component, "simple type", &resolved.name));
        }
        Ok(resolved)
    }

    fn resolve_element_ref(&mut self, raw: &RawRef, component: &str) -> Result<Resolved<ElementId>> {
        match self.lookup(raw, ComponentKind::Element, component)? {
            (GlobalComponent::Element(id), name) => Ok(Resolved::new(id, name)),
            (_, name) => Err(Self::unresolved(component, ComponentKind::Element, &name)),
        }
    }

    fn resolve_attribute_ref(&mut self, raw: &RawRef, component: &str) -> Result<Resolved<AttributeId>> {
        match self.lookup(raw, ComponentKind::Attribute, component)? {
            (GlobalComponent::Attribute(id), name) => Ok(Resolved::new(id, name)),
            (_, name) => Err(Self::unresolved(component, ComponentKind::Attribute, &name)),
        }
    }

    fn resolve_attribute_group_ref(&mut self, raw: &RawRef, component: &str) -> Result<Resolved<AttributeGroupId>> {
        match self.lookup(raw, ComponentKind::AttributeGroup, component)? {
            (GlobalComponent::AttributeGroup(id), name) => Ok(Resolved::new(id, name)),
            (_, name) => Err(Self::unresolved(component, ComponentKind::AttributeGroup, &name)),
        }
    }

    fn resolve_group_ref(&mut self, raw: &RawRef, component: &str) -> Result<Resolved<GroupId>> {
        match self.lookup(raw, ComponentKind::Group, component)? {
            (GlobalComponent::Group(id), name) => Ok(Resolved::new(id, name)),
            (_, name) => Err(Self::unresolved(component, ComponentKind::Group, &name)),
        }
    }

    fn resolve_members(&mut self, members: &mut [AttributeMember]) -> Result<()> {
        for member in members {
            if let AttributeMember::GroupRef(group_ref) = member {
                if group_ref.resolved.is_none() {
                    group_ref.resolved = Some(self.resolve_attribute_group_ref(&group_ref.name, &group_ref.path)?);
                }
            }
        }
        Ok(())
    }

    fn resolve_simple_ref(&mut self, reference: &mut SimpleTypeRef, component: &str) -> Result<()> {
        if let SimpleTypeRef::Named { name, resolved } = reference {
            if resolved.is_none() {
                *resolved = Some(self.resolve_simple_type(name, component)?);
            }
        }
        Ok(())
    }

    fn resolve_elements(&mut self, model: &mut SchemaModel) -> Result<()> {
        let ids: Vec<ElementId> = model.elements().map(|(id, _)| id).collect();
        for id in ids {
            let decl = model.element_mut(id);
            if let Some(raw) = decl.ref_name.as_ref().filter(|_| decl.resolved_ref.is_none()) {
                decl.resolved_ref = Some(self.resolve_element_ref(raw, &decl.path)?);
            }
            if let Some(raw) = decl.type_name.as_ref().filter(|_| decl.resolved_type.is_none()) {
                decl.resolved_type = Some(self.resolve_type(raw, &decl.path)?);
            }
        }
        Ok(())
    }

    fn resolve_attributes(&mut self, model: &mut SchemaModel) -> Result<()> {
        let ids: Vec<AttributeId> = model.attributes().map(|(id, _)| id).collect();
        for id in ids {
            let decl = model.attribute_mut(id);
            if let Some(raw) = decl.ref_name.as_ref().filter(|_| decl.resolved_ref.is_none()) {
                decl.resolved_ref = Some(self.resolve_attribute_ref(raw, &decl.path)?);
            }
            if let Some(raw) = decl.type_name.as_ref().filter(|_| decl.resolved_type.is_none()) {
                decl.resolved_type = Some(self.resolve_simple_type(raw, &decl.path)?);
            }
        }
        Ok(())
    }

    fn resolve_attribute_groups(&mut self, model: &mut SchemaModel) -> Result<()> {
        let ids: Vec<AttributeGroupId> = model.attribute_groups().map(|(id, _)| id).collect();
        for id in ids {
            self.resolve_members(&mut model.attribute_group_mut(id).members)?;
        }
        Ok(())
    }

    fn resolve_complex_types(&mut self, model: &mut SchemaModel) -> Result<()> {
        let ids: Vec<_> = model.complex_types().map(|(id, _)| id).collect();
        for id in ids {
            let decl = model.complex_type_mut(id);
            for content in &mut decl.declared {
                match content {
                    DeclaredContent::SimpleExtension { base, resolved } if resolved.is_none() => {
                        *resolved = Some(self.resolve_type(base, &decl.path)?);
                    }
                    DeclaredContent::ComplexExtension { base, resolved, .. } if resolved.is_none() => {
                        let (target, name) = self.lookup(base, ComponentKind::Type, &decl.path)?;
                        match target {
                            GlobalComponent::ComplexType(base_id) => *resolved = Some(Resolved::new(base_id, name)),
                            _ => return Err(Self::unresolved(&decl.path, "complex type", &name)),
                        }
                    }
                    _ => {}
                }
            }
            self.resolve_members(&mut decl.attributes)?;
        }
        Ok(())
    }

    fn resolve_simple_types(&mut self, model: &mut SchemaModel) -> Result<()> {
        let ids: Vec<_> = model.simple_types().map(|(id, _)| id).collect();
        for id in ids {
            let decl = model.simple_type_mut(id);
            match &mut decl.derivation {
                SimpleDerivation::Restriction { base, .. } => self.resolve_simple_ref(base, &decl.path)?,
                SimpleDerivation::List { item } => self.resolve_simple_ref(item, &decl.path)?,
            }
        }
        Ok(())
    }

    fn resolve_groups(&mut self, model: &mut SchemaModel) -> Result<()> {
        let ids: Vec<GroupId> = model.groups().map(|(id, _)| id).collect();
        for id in ids {
            for particle in &mut model.group_mut(id).particles {
                if let Particle::GroupRef(group_ref) = particle {
                    if group_ref.resolved.is_none() {
                        group_ref.resolved = Some(self.resolve_group_ref(&group_ref.name, &group_ref.path)?);
                    }
                }
            }
        }
        Ok(())
    }
}
