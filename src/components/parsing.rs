//! XSD Document Parsing
//!
//! Turns one `xs:schema` element tree into a [`SchemaDocument`] and appends
//! its components to the [`SchemaModel`] arena. References are captured as
//! text together with the namespace bindings in scope; nothing is resolved
//! here.

use std::sync::Arc;

use super::attributes::{AttributeDecl, AttributeGroupDecl, AttributeGroupRef, AttributeMember, AttributeUse};
use super::builtins::XSD_NAMESPACE;
use super::complex_types::{ComplexTypeDecl, DeclaredContent};
use super::elements::{ElementDecl, InlineType};
use super::groups::{Compositor, GroupRef, ModelGroup, Particle};
use super::particles::{parse_occurs, Occurs};
use super::schemas::{DirectiveKind, SchemaDirective, SchemaDocument, SchemaModel, TopLevel};
use super::simple_types::{SimpleDerivation, SimpleTypeDecl, SimpleTypeRef};
use super::{DocumentId, FormDefault, GroupId, RawRef, Scope, SimpleTypeId};

use crate::documents::Element;
use crate::error::{Error, ParseError, Result};
use crate::limits::Limits;
use crate::locations::Location;
use crate::names::validate_ncname;
use crate::namespaces::NamespaceContext;

/// XSD element local names
mod xsd_elements {
    pub const SCHEMA: &str = "schema";
    pub const ELEMENT: &str = "element";
    pub const COMPLEX_TYPE: &str = "complexType";
    pub const SIMPLE_TYPE: &str = "simpleType";
    pub const ATTRIBUTE: &str = "attribute";
    pub const ATTRIBUTE_GROUP: &str = "attributeGroup";
    pub const GROUP: &str = "group";
    pub const SEQUENCE: &str = "sequence";
    pub const CHOICE: &str = "choice";
    pub const ALL: &str = "all";
    pub const ANY: &str = "any";
    pub const ANY_ATTRIBUTE: &str = "anyAttribute";
    pub const ANNOTATION: &str = "annotation";
    pub const DOCUMENTATION: &str = "documentation";
    pub const IMPORT: &str = "import";
    pub const INCLUDE: &str = "include";
    pub const NOTATION: &str = "notation";
    pub const RESTRICTION: &str = "restriction";
    pub const EXTENSION: &str = "extension";
    pub const ENUMERATION: &str = "enumeration";
    pub const LIST: &str = "list";
    pub const COMPLEX_CONTENT: &str = "complexContent";
    pub const SIMPLE_CONTENT: &str = "simpleContent";
}

/// XSD attribute names
mod xsd_attrs {
    pub const NAME: &str = "name";
    pub const REF: &str = "ref";
    pub const TYPE: &str = "type";
    pub const BASE: &str = "base";
    pub const ITEM_TYPE: &str = "itemType";
    pub const VALUE: &str = "value";
    pub const USE: &str = "use";
    pub const FORM: &str = "form";
    pub const MIXED: &str = "mixed";
    pub const NILLABLE: &str = "nillable";
    pub const DEFAULT: &str = "default";
    pub const FIXED: &str = "fixed";
    pub const MIN_OCCURS: &str = "minOccurs";
    pub const MAX_OCCURS: &str = "maxOccurs";
    pub const NAMESPACE: &str = "namespace";
    pub const SCHEMA_LOCATION: &str = "schemaLocation";
    pub const TARGET_NAMESPACE: &str = "targetNamespace";
    pub const ELEMENT_FORM_DEFAULT: &str = "elementFormDefault";
    pub const ATTRIBUTE_FORM_DEFAULT: &str = "attributeFormDefault";
}

/// How a document entered the compilation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin<'a> {
    /// Given directly to the compiler
    Root,
    /// Reached through `xs:include` from a document with this namespace
    Include(Option<&'a str>),
    /// Reached through `xs:import` declaring this namespace
    Import(Option<&'a str>),
}

/// Parse a schema document tree into the model
pub fn parse_document(
    model: &mut SchemaModel,
    root: &Element,
    location: Location,
    origin: Origin<'_>,
    limits: &Limits,
) -> Result<DocumentId> {
    if root.local_name() != xsd_elements::SCHEMA || root.namespace() != Some(XSD_NAMESPACE) {
        return Err(ParseError::new(format!("Expected xs:schema root element, got {}", root.qname))
            .with_location(location.as_str())
            .into());
    }

    let declared = root.get_attribute(xsd_attrs::TARGET_NAMESPACE).map(str::to_string);
    let (target_namespace, chameleon) = match origin {
        Origin::Root => (declared, false),
        Origin::Include(parent) => match declared {
            None => (parent.map(str::to_string), parent.is_some()),
            Some(ns) if Some(ns.as_str()) == parent => (Some(ns), false),
            Some(ns) => {
                return Err(ParseError::new(format!(
                    "Included schema has different targetNamespace '{}', expected '{}'",
                    ns,
                    parent.unwrap_or("(none)")
                ))
                .with_location(location.as_str())
                .into())
            }
        },
        Origin::Import(expected) => {
            if declared.as_deref() != expected {
                return Err(ParseError::new(format!(
                    "Imported schema has targetNamespace '{}', expected '{}'",
                    declared.as_deref().unwrap_or("(none)"),
                    expected.unwrap_or("(none)")
                ))
                .with_location(location.as_str())
                .into());
            }
            (declared, false)
        }
    };

    let mut document = SchemaDocument::new(location, target_namespace.clone());
    document.namespaces = Arc::clone(&root.namespaces);
    if let Some(form) = root.get_attribute(xsd_attrs::ELEMENT_FORM_DEFAULT) {
        document.element_form = parse_form(form, "schema")?;
    }
    if let Some(form) = root.get_attribute(xsd_attrs::ATTRIBUTE_FORM_DEFAULT) {
        document.attribute_form = parse_form(form, "schema")?;
    }

    let element_form = document.element_form;
    let attribute_form = document.attribute_form;
    let id = model.add_document(document);

    let mut parser = DocumentParser {
        model,
        document: id,
        target_namespace,
        element_form,
        attribute_form,
        chameleon,
        limits,
    };
    parser.parse_schema_children(root)?;

    tracing::debug!(
        location = %parser.model.document(id).location,
        namespace = ?parser.target_namespace,
        chameleon,
        items = parser.model.document(id).items.len(),
        "parsed schema document"
    );

    Ok(id)
}

fn parse_form(value: &str, path: &str) -> Result<FormDefault> {
    FormDefault::from_str(value).ok_or_else(|| {
        ParseError::new(format!("Invalid form value '{}'", value))
            .with_location(path)
            .into()
    })
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim(), "true" | "1")
}

fn unsupported(construct: &str, path: &str) -> Error {
    ParseError::new(format!("Unsupported construct xs:{}", construct))
        .with_location(path)
        .into()
}

fn join(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}/{}", parent, segment)
    }
}

/// Collect `xs:annotation/xs:documentation` text
fn documentation(elem: &Element) -> Option<String> {
    let parts: Vec<&str> = elem
        .children
        .iter()
        .filter(|c| is_xsd(c, xsd_elements::ANNOTATION))
        .flat_map(|a| a.children.iter())
        .filter(|d| is_xsd(d, xsd_elements::DOCUMENTATION))
        .filter_map(|d| d.significant_text())
        .map(str::trim)
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

fn is_xsd(elem: &Element, local_name: &str) -> bool {
    elem.namespace() == Some(XSD_NAMESPACE) && elem.local_name() == local_name
}

/// Per-document parsing context
struct DocumentParser<'m> {
    model: &'m mut SchemaModel,
    document: DocumentId,
    target_namespace: Option<String>,
    element_form: FormDefault,
    attribute_form: FormDefault,
    /// Unqualified references resolve against the adopted namespace
    chameleon: bool,
    limits: &'m Limits,
}

impl<'m> DocumentParser<'m> {
    /// XSD local name of a child, or an error for foreign elements
    fn xsd_child<'e>(&self, child: &'e Element, path: &str) -> Result<&'e str> {
        if child.namespace() == Some(XSD_NAMESPACE) {
            Ok(child.local_name())
        } else {
            Err(ParseError::new(format!("Unexpected element {}", child.qname))
                .with_location(path)
                .into())
        }
    }

    fn unknown(&self, child: &Element, path: &str) -> Error {
        ParseError::new(format!("Unexpected element xs:{}", child.local_name()))
            .with_location(path)
            .into()
    }

    fn reference(&self, elem: &Element, text: &str) -> RawRef {
        if self.chameleon && elem.namespaces.get_default_namespace().is_none() {
            if let Some(ns) = &self.target_namespace {
                let mut ctx: NamespaceContext = elem.namespaces.as_ref().clone();
                ctx.set_default_namespace(ns.clone());
                return RawRef::new(text, Arc::new(ctx));
            }
        }
        RawRef::new(text, Arc::clone(&elem.namespaces))
    }

    fn required_name(&self, elem: &Element, what: &str, path: &str) -> Result<String> {
        let name = elem.get_attribute(xsd_attrs::NAME).ok_or_else(|| {
            Error::from(ParseError::new(format!("{} missing 'name' attribute", what)).with_location(path))
        })?;
        validate_ncname(name)?;
        Ok(name.to_string())
    }

    fn occurs(&self, elem: &Element, path: &str) -> Result<Occurs> {
        parse_occurs(elem.get_attribute(xsd_attrs::MIN_OCCURS), elem.get_attribute(xsd_attrs::MAX_OCCURS))
            .map_err(|e| match e {
                Error::Parse(err) => Error::Parse(err.with_location(path)),
                other => other,
            })
    }

    fn push_item(&mut self, item: TopLevel) -> Result<()> {
        self.model.document_mut(self.document).items.push(item);
        self.limits.check_schema_components(self.model.component_count())
    }

    fn parse_schema_children(&mut self, root: &Element) -> Result<()> {
        for child in &root.children {
            let local = self.xsd_child(child, "schema")?;
            match local {
                xsd_elements::ELEMENT => {
                    let id = self.parse_element(child, Scope::Global, "")?;
                    self.push_item(TopLevel::Element(id))?;
                }
                xsd_elements::ATTRIBUTE => {
                    let id = self.parse_attribute(child, Scope::Global, "")?;
                    self.push_item(TopLevel::Attribute(id))?;
                }
                xsd_elements::COMPLEX_TYPE => {
                    let name = self.required_name(child, "Global complexType", "schema")?;
                    let path = format!("complexType '{}'", name);
                    let id = self.parse_complex_type(child, Some(name), path)?;
                    self.push_item(TopLevel::ComplexType(id))?;
                }
                xsd_elements::SIMPLE_TYPE => {
                    let name = self.required_name(child, "Global simpleType", "schema")?;
                    let path = format!("simpleType '{}'", name);
                    let id = self.parse_simple_type(child, Some(name), path)?;
                    self.push_item(TopLevel::SimpleType(id))?;
                }
                xsd_elements::ATTRIBUTE_GROUP => {
                    let id = self.parse_attribute_group(child)?;
                    self.push_item(TopLevel::AttributeGroup(id))?;
                }
                xsd_elements::GROUP => {
                    let id = self.parse_named_group(child)?;
                    self.push_item(TopLevel::Group(id))?;
                }
                xsd_elements::INCLUDE => self.parse_include(child)?,
                xsd_elements::IMPORT => self.parse_import(child)?,
                xsd_elements::ANNOTATION | xsd_elements::NOTATION => {}
                _ => return Err(self.unknown(child, "schema")),
            }
        }
        Ok(())
    }

    fn parse_include(&mut self, elem: &Element) -> Result<()> {
        let location = elem.get_attribute(xsd_attrs::SCHEMA_LOCATION).ok_or_else(|| {
            Error::from(ParseError::new("xs:include missing schemaLocation attribute").with_location("schema/include"))
        })?;
        self.model.document_mut(self.document).directives.push(SchemaDirective {
            kind: DirectiveKind::Include,
            namespace: None,
            location: Some(location.to_string()),
        });
        Ok(())
    }

    fn parse_import(&mut self, elem: &Element) -> Result<()> {
        let namespace = elem.get_attribute(xsd_attrs::NAMESPACE).map(str::to_string);
        if namespace == self.target_namespace {
            return Err(ParseError::new(format!(
                "xs:import cannot import the schema's own targetNamespace: {:?}",
                namespace
            ))
            .with_location("schema/import")
            .into());
        }
        self.model.document_mut(self.document).directives.push(SchemaDirective {
            kind: DirectiveKind::Import,
            namespace,
            location: elem.get_attribute(xsd_attrs::SCHEMA_LOCATION).map(str::to_string),
        });
        Ok(())
    }

    /// Parse an element declaration, global or local
    fn parse_element(&mut self, elem: &Element, scope: Scope, parent: &str) -> Result<super::ElementId> {
        let name = elem.get_attribute(xsd_attrs::NAME);
        let reference = elem.get_attribute(xsd_attrs::REF);

        let path = match (name, reference) {
            (Some(_), Some(_)) => {
                return Err(ParseError::new("Element cannot have both 'name' and 'ref'")
                    .with_location(join(parent, "element"))
                    .into())
            }
            (Some(name), None) => join(parent, &format!("element '{}'", name)),
            (None, Some(reference)) if scope == Scope::Local => join(parent, &format!("element ref '{}'", reference)),
            _ => {
                return Err(ParseError::new("Element missing 'name' attribute")
                    .with_location(join(parent, "element"))
                    .into())
            }
        };
        if let Some(name) = name {
            validate_ncname(name)?;
        }

        let mut decl = ElementDecl::new(name.map(str::to_string), scope, self.document, path.clone());
        decl.namespace = match scope {
            Scope::Global => self.target_namespace.clone(),
            Scope::Local if name.is_some() => {
                let form = match elem.get_attribute(xsd_attrs::FORM) {
                    Some(form) => parse_form(form, &path)?,
                    None => self.element_form,
                };
                form.is_qualified().then(|| self.target_namespace.clone()).flatten()
            }
            Scope::Local => None,
        };
        decl.ref_name = reference.map(|r| self.reference(elem, r));
        decl.type_name = elem.get_attribute(xsd_attrs::TYPE).map(|t| self.reference(elem, t));
        if scope == Scope::Local {
            decl.occurs = self.occurs(elem, &path)?;
        }
        decl.nillable = elem.get_attribute(xsd_attrs::NILLABLE).map(parse_bool).unwrap_or(false);
        decl.default = elem.get_attribute(xsd_attrs::DEFAULT).map(str::to_string);
        decl.fixed = elem.get_attribute(xsd_attrs::FIXED).map(str::to_string);
        decl.documentation = documentation(elem);

        for child in &elem.children {
            let local = self.xsd_child(child, &path)?;
            let inline = match local {
                xsd_elements::COMPLEX_TYPE => {
                    InlineType::Complex(self.parse_complex_type(child, None, join(&path, "complexType"))?)
                }
                xsd_elements::SIMPLE_TYPE => {
                    InlineType::Simple(self.parse_simple_type(child, None, join(&path, "simpleType"))?)
                }
                xsd_elements::ANNOTATION => continue,
                // identity constraints do not affect structure
                "unique" | "key" | "keyref" => continue,
                _ => return Err(self.unknown(child, &path)),
            };
            if decl.inline_type.is_some() {
                return Err(ParseError::new("Element declares more than one inline type")
                    .with_location(path)
                    .into());
            }
            decl.inline_type = Some(inline);
        }

        Ok(self.model.add_element(decl))
    }

    /// Parse an attribute declaration, global or local
    fn parse_attribute(&mut self, elem: &Element, scope: Scope, parent: &str) -> Result<super::AttributeId> {
        let name = elem.get_attribute(xsd_attrs::NAME);
        let reference = elem.get_attribute(xsd_attrs::REF);

        let path = match (name, reference) {
            (Some(_), Some(_)) => {
                return Err(ParseError::new("Attribute cannot have both 'name' and 'ref'")
                    .with_location(join(parent, "attribute"))
                    .into())
            }
            (Some(name), None) => join(parent, &format!("attribute '{}'", name)),
            (None, Some(reference)) if scope == Scope::Local => {
                join(parent, &format!("attribute ref '{}'", reference))
            }
            _ => {
                return Err(ParseError::new("Attribute missing 'name' attribute")
                    .with_location(join(parent, "attribute"))
                    .into())
            }
        };
        if let Some(name) = name {
            validate_ncname(name)?;
        }

        let mut decl = AttributeDecl::new(name.map(str::to_string), scope, self.document, path.clone());
        decl.namespace = match scope {
            Scope::Global => self.target_namespace.clone(),
            Scope::Local if name.is_some() => {
                let form = match elem.get_attribute(xsd_attrs::FORM) {
                    Some(form) => parse_form(form, &path)?,
                    None => self.attribute_form,
                };
                form.is_qualified().then(|| self.target_namespace.clone()).flatten()
            }
            Scope::Local => None,
        };
        decl.ref_name = reference.map(|r| self.reference(elem, r));
        decl.type_name = elem.get_attribute(xsd_attrs::TYPE).map(|t| self.reference(elem, t));
        decl.default = elem.get_attribute(xsd_attrs::DEFAULT).map(str::to_string);
        decl.fixed = elem.get_attribute(xsd_attrs::FIXED).map(str::to_string);
        decl.documentation = documentation(elem);

        if let Some(use_mode) = elem.get_attribute(xsd_attrs::USE) {
            decl.use_mode = AttributeUse::from_str(use_mode).ok_or_else(|| {
                Error::from(ParseError::new(format!("Invalid use value '{}'", use_mode)).with_location(path.clone()))
            })?;
        }

        for child in &elem.children {
            match self.xsd_child(child, &path)? {
                xsd_elements::SIMPLE_TYPE => {
                    if decl.inline_type.is_some() {
                        return Err(ParseError::new("Attribute declares more than one inline type")
                            .with_location(path)
                            .into());
                    }
                    decl.inline_type = Some(self.parse_simple_type(child, None, join(&path, "simpleType"))?);
                }
                xsd_elements::ANNOTATION => {}
                _ => return Err(self.unknown(child, &path)),
            }
        }

        Ok(self.model.add_attribute(decl))
    }

    /// Parse attribute declarations and group references of a type or group
    fn parse_attribute_member(&mut self, child: &Element, parent: &str) -> Result<Option<AttributeMember>> {
        match child.local_name() {
            xsd_elements::ATTRIBUTE => {
                let id = self.parse_attribute(child, Scope::Local, parent)?;
                Ok(Some(AttributeMember::Attribute(id)))
            }
            xsd_elements::ATTRIBUTE_GROUP => {
                let reference = child.get_attribute(xsd_attrs::REF).ok_or_else(|| {
                    Error::from(
                        ParseError::new("attributeGroup reference missing 'ref' attribute")
                            .with_location(join(parent, "attributeGroup")),
                    )
                })?;
                Ok(Some(AttributeMember::GroupRef(AttributeGroupRef {
                    name: self.reference(child, reference),
                    path: join(parent, &format!("attributeGroup ref '{}'", reference)),
                    resolved: None,
                })))
            }
            xsd_elements::ANY_ATTRIBUTE => Err(unsupported(xsd_elements::ANY_ATTRIBUTE, parent)),
            _ => Ok(None),
        }
    }

    fn parse_attribute_group(&mut self, elem: &Element) -> Result<super::AttributeGroupId> {
        let name = self.required_name(elem, "Global attributeGroup", "schema")?;
        let path = format!("attributeGroup '{}'", name);

        let mut members = Vec::new();
        for child in &elem.children {
            self.xsd_child(child, &path)?;
            if child.local_name() == xsd_elements::ANNOTATION {
                continue;
            }
            match self.parse_attribute_member(child, &path)? {
                Some(member) => members.push(member),
                None => return Err(self.unknown(child, &path)),
            }
        }

        Ok(self.model.add_attribute_group(AttributeGroupDecl {
            name,
            namespace: self.target_namespace.clone(),
            members,
            path,
            document: self.document,
        }))
    }

    /// Parse a complex type, named or inline
    fn parse_complex_type(&mut self, elem: &Element, name: Option<String>, path: String) -> Result<super::ComplexTypeId> {
        let mut decl = ComplexTypeDecl::new(name, self.document, path.clone());
        decl.namespace = self.target_namespace.clone();
        decl.mixed = elem.get_attribute(xsd_attrs::MIXED).map(parse_bool).unwrap_or(false);
        decl.documentation = documentation(elem);

        for child in &elem.children {
            let local = self.xsd_child(child, &path)?;
            match local {
                xsd_elements::ANNOTATION => {}
                xsd_elements::SEQUENCE | xsd_elements::CHOICE | xsd_elements::GROUP | xsd_elements::ALL => {
                    let content = self.parse_content_particle(child, &path)?;
                    decl.declared.push(content);
                }
                xsd_elements::SIMPLE_CONTENT => self.parse_simple_content(child, &mut decl)?,
                xsd_elements::COMPLEX_CONTENT => self.parse_complex_content(child, &mut decl)?,
                _ => match self.parse_attribute_member(child, &path)? {
                    Some(member) => decl.attributes.push(member),
                    None => return Err(self.unknown(child, &path)),
                },
            }
        }

        Ok(self.model.add_complex_type(decl))
    }

    /// A sequence, choice, group reference or `all` directly under a type
    fn parse_content_particle(&mut self, child: &Element, parent: &str) -> Result<DeclaredContent> {
        match child.local_name() {
            xsd_elements::SEQUENCE => Ok(DeclaredContent::Sequence(self.parse_model_group(
                child,
                Compositor::Sequence,
                parent,
            )?)),
            xsd_elements::CHOICE => Ok(DeclaredContent::Choice(self.parse_model_group(
                child,
                Compositor::Choice,
                parent,
            )?)),
            xsd_elements::GROUP => {
                let path = join(parent, "sequence");
                let mut wrapper = ModelGroup::new(Compositor::Sequence, self.document, path.clone());
                wrapper.particles.push(self.parse_group_ref(child, &path)?);
                Ok(DeclaredContent::Sequence(self.model.add_group(wrapper)))
            }
            _ => Ok(DeclaredContent::Unsupported {
                construct: child.local_name().to_string(),
                path: join(parent, child.local_name()),
            }),
        }
    }

    fn parse_simple_content(&mut self, elem: &Element, decl: &mut ComplexTypeDecl) -> Result<()> {
        let path = join(&decl.path, xsd_elements::SIMPLE_CONTENT);
        for child in &elem.children {
            match self.xsd_child(child, &path)? {
                xsd_elements::ANNOTATION => {}
                xsd_elements::EXTENSION => {
                    let ext_path = join(&path, xsd_elements::EXTENSION);
                    let base = self.required_base(child, &ext_path)?;
                    decl.declared.push(DeclaredContent::SimpleExtension { base, resolved: None });
                    for member in &child.children {
                        self.xsd_child(member, &ext_path)?;
                        if member.local_name() == xsd_elements::ANNOTATION {
                            continue;
                        }
                        match self.parse_attribute_member(member, &decl.path)? {
                            Some(attribute) => decl.attributes.push(attribute),
                            None => return Err(self.unknown(member, &ext_path)),
                        }
                    }
                }
                xsd_elements::RESTRICTION => return Err(unsupported("simpleContent/restriction", &path)),
                _ => return Err(self.unknown(child, &path)),
            }
        }
        Ok(())
    }

    fn parse_complex_content(&mut self, elem: &Element, decl: &mut ComplexTypeDecl) -> Result<()> {
        let path = join(&decl.path, xsd_elements::COMPLEX_CONTENT);
        if let Some(mixed) = elem.get_attribute(xsd_attrs::MIXED) {
            decl.mixed = parse_bool(mixed);
        }

        for child in &elem.children {
            match self.xsd_child(child, &path)? {
                xsd_elements::ANNOTATION => {}
                xsd_elements::EXTENSION => {
                    let ext_path = join(&path, xsd_elements::EXTENSION);
                    let base = self.required_base(child, &ext_path)?;
                    let mut content = None;
                    let mut extra = Vec::new();

                    for member in &child.children {
                        let local = self.xsd_child(member, &ext_path)?;
                        match local {
                            xsd_elements::ANNOTATION => {}
                            xsd_elements::SEQUENCE | xsd_elements::CHOICE | xsd_elements::GROUP | xsd_elements::ALL => {
                                match self.parse_content_particle(member, &ext_path)? {
                                    DeclaredContent::Sequence(id) | DeclaredContent::Choice(id) if content.is_none() => {
                                        content = Some(id);
                                    }
                                    // A second group or `all` stays visible to the classifier
                                    other => extra.push(other),
                                }
                            }
                            _ => match self.parse_attribute_member(member, &decl.path)? {
                                Some(attribute) => decl.attributes.push(attribute),
                                None => return Err(self.unknown(member, &ext_path)),
                            },
                        }
                    }

                    decl.declared.push(DeclaredContent::ComplexExtension {
                        base,
                        resolved: None,
                        content,
                    });
                    decl.declared.extend(extra);
                }
                xsd_elements::RESTRICTION => return Err(unsupported("complexContent/restriction", &path)),
                _ => return Err(self.unknown(child, &path)),
            }
        }
        Ok(())
    }

    fn required_base(&self, elem: &Element, path: &str) -> Result<RawRef> {
        let base = elem.get_attribute(xsd_attrs::BASE).ok_or_else(|| {
            Error::from(ParseError::new("extension missing 'base' attribute").with_location(path))
        })?;
        Ok(self.reference(elem, base))
    }

    /// Parse a sequence or choice and its particles
    fn parse_model_group(&mut self, elem: &Element, compositor: Compositor, parent: &str) -> Result<GroupId> {
        let path = join(parent, &compositor.to_string());
        let mut group = ModelGroup::new(compositor, self.document, path.clone());
        group.occurs = self.occurs(elem, &path)?;

        for child in &elem.children {
            let local = self.xsd_child(child, &path)?;
            let particle = match local {
                xsd_elements::ELEMENT => Particle::Element(self.parse_element(child, Scope::Local, &path)?),
                xsd_elements::SEQUENCE => Particle::Group(self.parse_model_group(child, Compositor::Sequence, &path)?),
                xsd_elements::CHOICE => Particle::Group(self.parse_model_group(child, Compositor::Choice, &path)?),
                xsd_elements::GROUP => self.parse_group_ref(child, &path)?,
                xsd_elements::ANY | xsd_elements::ALL => Particle::Unsupported {
                    construct: local.to_string(),
                    path: join(&path, local),
                },
                xsd_elements::ANNOTATION => continue,
                _ => return Err(self.unknown(child, &path)),
            };
            group.particles.push(particle);
        }

        Ok(self.model.add_group(group))
    }

    fn parse_group_ref(&mut self, elem: &Element, parent: &str) -> Result<Particle> {
        let reference = elem.get_attribute(xsd_attrs::REF).ok_or_else(|| {
            Error::from(ParseError::new("group reference missing 'ref' attribute").with_location(join(parent, "group")))
        })?;
        let path = join(parent, &format!("group ref '{}'", reference));
        Ok(Particle::GroupRef(GroupRef {
            name: self.reference(elem, reference),
            occurs: self.occurs(elem, &path)?,
            path,
            resolved: None,
        }))
    }

    /// Parse a named `xs:group` definition
    fn parse_named_group(&mut self, elem: &Element) -> Result<GroupId> {
        let name = self.required_name(elem, "Global group", "schema")?;
        let path = format!("group '{}'", name);

        let mut found = None;
        for child in &elem.children {
            let local = self.xsd_child(child, &path)?;
            let compositor = match local {
                xsd_elements::ANNOTATION => continue,
                xsd_elements::ALL => return Err(unsupported(xsd_elements::ALL, &path)),
                other => Compositor::from_tag(other).ok_or_else(|| self.unknown(child, &path))?,
            };
            if found.is_some() {
                return Err(ParseError::new("Group declares more than one model group")
                    .with_location(path)
                    .into());
            }
            found = Some(self.parse_model_group(child, compositor, &path)?);
        }

        let id = found.ok_or_else(|| {
            Error::from(ParseError::new("Group requires a sequence or choice").with_location(path.clone()))
        })?;
        let group = self.model.group_mut(id);
        group.name = Some(name);
        group.namespace = self.target_namespace.clone();
        Ok(id)
    }

    /// Parse a simple type, named or inline
    fn parse_simple_type(&mut self, elem: &Element, name: Option<String>, path: String) -> Result<SimpleTypeId> {
        let mut derivation = None;

        for child in &elem.children {
            let local = self.xsd_child(child, &path)?;
            let parsed = match local {
                xsd_elements::ANNOTATION => continue,
                xsd_elements::RESTRICTION => {
                    let restriction_path = join(&path, xsd_elements::RESTRICTION);
                    let base = self.simple_type_ref(child, xsd_attrs::BASE, &restriction_path)?;
                    let enumerations = child
                        .children
                        .iter()
                        .filter(|facet| is_xsd(facet, xsd_elements::ENUMERATION))
                        .filter_map(|facet| facet.get_attribute(xsd_attrs::VALUE))
                        .map(str::to_string)
                        .collect();
                    SimpleDerivation::Restriction { base, enumerations }
                }
                xsd_elements::LIST => {
                    let item = self.simple_type_ref(child, xsd_attrs::ITEM_TYPE, &join(&path, xsd_elements::LIST))?;
                    SimpleDerivation::List { item }
                }
                "union" => return Err(unsupported("union", &path)),
                _ => return Err(self.unknown(child, &path)),
            };
            if derivation.is_some() {
                return Err(ParseError::new("simpleType declares more than one derivation")
                    .with_location(path)
                    .into());
            }
            derivation = Some(parsed);
        }

        let derivation = derivation.ok_or_else(|| {
            Error::from(ParseError::new("simpleType requires a restriction or list").with_location(path.clone()))
        })?;

        Ok(self.model.add_simple_type(SimpleTypeDecl {
            name,
            namespace: self.target_namespace.clone(),
            derivation,
            documentation: documentation(elem),
            path,
            document: self.document,
            synthetic_name: None,
        }))
    }

    /// `base=`/`itemType=`, or a nested anonymous simple type
    fn simple_type_ref(&mut self, elem: &Element, attr: &str, path: &str) -> Result<SimpleTypeRef> {
        if let Some(name) = elem.get_attribute(attr) {
            return Ok(SimpleTypeRef::named(self.reference(elem, name)));
        }
        let inline = elem
            .children
            .iter()
            .find(|c| is_xsd(c, xsd_elements::SIMPLE_TYPE))
            .ok_or_else(|| {
                Error::from(ParseError::new(format!("missing '{}' or inline simpleType", attr)).with_location(path))
            })?;
        let id = self.parse_simple_type(inline, None, join(path, xsd_elements::SIMPLE_TYPE))?;
        Ok(SimpleTypeRef::Inline(id))
    }
}
