//! Identifier normalization
//!
//! Gives every anonymous structural node a synthetic `_anon<N>` name and
//! every member a field identifier that is safe in generated code, keeping
//! the XML name next to it for serialization.
//!
//! Synthetic names come from an [`AnonymousNamer`] threaded through one
//! depth-first walk in document order. The same input therefore always
//! produces the same numbering, and two compilations never share a counter.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::classifier::{attribute_name, element_name};
use crate::collection::{ComponentKind, DocumentCollection};
use crate::components::schemas::TopLevel;
use crate::components::{
    AttributeId, AttributeMember, ComplexTypeId, ContentModel, DeclaredContent, ElementId, GroupId, InlineType,
    Particle, SchemaModel, SimpleDerivation, SimpleTypeId, SimpleTypeRef,
};
use crate::error::{Error, Result};
use crate::namespaces::QName;

/// Field holding the text payload of simple-content types
pub const VALUE_FIELD: &str = "_value";

/// Default suffix appended to reserved names
pub const DEFAULT_RESERVED_SUFFIX: &str = "_attribute";

/// Default prefix of synthetic names
pub const DEFAULT_ANONYMOUS_PREFIX: &str = "_anon";

/// Names that cannot be used as field identifiers in generated code
pub const DEFAULT_RESERVED_WORDS: &[&str] = &[
    "as", "async", "await", "break", "class", "const", "continue", "crate", "dyn", "else", "enum", "extern", "false",
    "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "self",
    "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use", "where", "while", "yield",
    VALUE_FIELD,
];

/// A member name: the wire-level XML name and the safe field identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Identifier {
    /// Name as it appears in documents
    pub xml_name: String,
    /// Name used in generated code
    pub field_name: String,
}

impl Identifier {
    /// Identifier whose field name equals the XML name
    pub fn verbatim(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            field_name: name.clone(),
            xml_name: name,
        }
    }
}

/// Replace characters that cannot appear in an identifier
pub fn sanitize(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Reserved words and naming affixes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingRules {
    reserved: BTreeSet<String>,
    suffix: String,
    anonymous_prefix: String,
}

impl Default for NamingRules {
    fn default() -> Self {
        Self::new(
            DEFAULT_RESERVED_WORDS.iter().map(|w| w.to_string()),
            DEFAULT_RESERVED_SUFFIX,
            DEFAULT_ANONYMOUS_PREFIX,
        )
    }
}

impl NamingRules {
    /// Create naming rules
    pub fn new(
        reserved: impl IntoIterator<Item = String>,
        suffix: impl Into<String>,
        anonymous_prefix: impl Into<String>,
    ) -> Self {
        Self {
            reserved: reserved.into_iter().collect(),
            suffix: suffix.into(),
            anonymous_prefix: anonymous_prefix.into(),
        }
    }

    /// Check if a name is reserved
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    /// Field identifier for an XML name
    pub fn identifier(&self, xml_name: &str) -> Identifier {
        let sanitized = sanitize(xml_name);
        let field_name = if self.is_reserved(&sanitized) {
            format!("{}{}", sanitized, self.suffix)
        } else {
            sanitized
        };
        Identifier {
            xml_name: xml_name.to_string(),
            field_name,
        }
    }

    /// Prefix of synthetic names
    pub fn anonymous_prefix(&self) -> &str {
        &self.anonymous_prefix
    }
}

/// Counter for synthetic names, owned by one normalization run
#[derive(Debug)]
pub struct AnonymousNamer {
    prefix: String,
    next: usize,
}

impl AnonymousNamer {
    /// Create a namer starting at `<prefix>1`
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }

    /// Number of names handed out so far
    pub fn assigned(&self) -> usize {
        self.next
    }

    /// Next synthetic name
    pub fn next_name(&mut self) -> String {
        self.next += 1;
        format!("{}{}", self.prefix, self.next)
    }

    fn visit_item(&mut self, model: &mut SchemaModel, item: TopLevel) {
        match item {
            TopLevel::Element(id) => self.visit_element(model, id),
            TopLevel::Attribute(id) => self.visit_attribute(model, id),
            TopLevel::ComplexType(id) => self.visit_complex_type(model, id),
            TopLevel::SimpleType(id) => self.visit_simple_type(model, id),
            TopLevel::AttributeGroup(id) => {
                let members = model.attribute_group(id).members.clone();
                self.visit_attribute_members(model, &members);
            }
            TopLevel::Group(id) => self.visit_particles(model, id),
        }
    }

    fn visit_element(&mut self, model: &mut SchemaModel, id: ElementId) {
        match model.element(id).inline_type {
            Some(InlineType::Complex(type_id)) => {
                if model.complex_type(type_id).display_name().is_none() {
                    model.complex_type_mut(type_id).synthetic_name = Some(self.next_name());
                }
                self.visit_complex_type(model, type_id);
            }
            Some(InlineType::Simple(type_id)) => self.name_simple_type(model, type_id),
            None => {}
        }
    }

    fn visit_attribute(&mut self, model: &mut SchemaModel, id: AttributeId) {
        if let Some(type_id) = model.attribute(id).inline_type {
            self.name_simple_type(model, type_id);
        }
    }

    fn visit_attribute_members(&mut self, model: &mut SchemaModel, members: &[AttributeMember]) {
        for member in members {
            if let AttributeMember::Attribute(id) = member {
                self.visit_attribute(model, *id);
            }
        }
    }

    fn visit_complex_type(&mut self, model: &mut SchemaModel, id: ComplexTypeId) {
        let decl = model.complex_type(id);
        let declared = decl.declared.clone();
        let members = decl.attributes.clone();

        for content in declared {
            match content {
                DeclaredContent::Sequence(group)
                | DeclaredContent::Choice(group)
                | DeclaredContent::ComplexExtension {
                    content: Some(group), ..
                } => self.visit_particles(model, group),
                _ => {}
            }
        }
        self.visit_attribute_members(model, &members);
    }

    fn name_simple_type(&mut self, model: &mut SchemaModel, id: SimpleTypeId) {
        if model.simple_type(id).display_name().is_none() {
            model.simple_type_mut(id).synthetic_name = Some(self.next_name());
        }
        self.visit_simple_type(model, id);
    }

    fn visit_simple_type(&mut self, model: &mut SchemaModel, id: SimpleTypeId) {
        let nested = match &model.simple_type(id).derivation {
            SimpleDerivation::Restriction { base, .. } => base,
            SimpleDerivation::List { item } => item,
        };
        if let SimpleTypeRef::Inline(nested) = *nested {
            self.name_simple_type(model, nested);
        }
    }

    /// Walk the particles of a group; nested groups are named before their content
    fn visit_particles(&mut self, model: &mut SchemaModel, group: GroupId) {
        let particles = model.group(group).particles.clone();
        for particle in particles {
            match particle {
                Particle::Element(id) => self.visit_element(model, id),
                Particle::Group(nested) => {
                    if model.group(nested).display_name().is_none() {
                        model.group_mut(nested).synthetic_name = Some(self.next_name());
                    }
                    self.visit_particles(model, nested);
                }
                Particle::GroupRef(_) | Particle::Unsupported { .. } => {}
            }
        }
    }

    /// Name groups that only became nested through extension merging
    fn visit_derived_groups(&mut self, model: &mut SchemaModel) {
        let nested: Vec<GroupId> = model
            .groups()
            .flat_map(|(_, g)| g.particles.iter())
            .filter_map(|p| match p {
                Particle::Group(id) => Some(*id),
                _ => None,
            })
            .collect();
        for id in nested {
            if model.group(id).display_name().is_none() {
                model.group_mut(id).synthetic_name = Some(self.next_name());
            }
        }
    }
}

/// Assign synthetic names and member identifiers; returns the number of synthetic names
pub fn normalize(model: &mut SchemaModel, collection: &DocumentCollection, rules: &NamingRules) -> Result<usize> {
    let mut namer = AnonymousNamer::new(rules.anonymous_prefix());
    model.set_anonymous_prefix(rules.anonymous_prefix());

    let documents: Vec<_> = model.documents().map(|(id, _)| id).collect();
    for document in documents {
        let items = model.document(document).items.clone();
        for item in items {
            namer.visit_item(model, item);
        }
    }
    namer.visit_derived_groups(model);

    check_synthetic_names(model, collection)?;
    assign_fields(model, rules);
    check_type_members(model)?;
    check_group_members(model)?;

    Ok(namer.assigned())
}

fn synthetic_collision(model: &SchemaModel, collection: &DocumentCollection, name: &QName, kind: ComponentKind, path: &str) -> Result<()> {
    if let Some(existing) = collection.lookup(name, kind) {
        let declared = existing
            .qname(model)
            .map(|q| q.to_string())
            .unwrap_or_else(|| name.to_string());
        return Err(Error::NameCollision {
            scope: format!("namespace '{}'", name.namespace.as_deref().unwrap_or("(none)")),
            first: declared,
            second: path.to_string(),
            field: name.local_name.clone(),
        });
    }
    Ok(())
}

/// Synthetic names must not shadow declared globals of the same symbol space
fn check_synthetic_names(model: &SchemaModel, collection: &DocumentCollection) -> Result<()> {
    for (_, decl) in model.complex_types() {
        if let (None, Some(synthetic)) = (&decl.name, &decl.synthetic_name) {
            let name = QName::new(decl.namespace.clone(), synthetic.clone());
            synthetic_collision(model, collection, &name, ComponentKind::Type, &decl.path)?;
        }
    }
    for (_, decl) in model.simple_types() {
        if let (None, Some(synthetic)) = (&decl.name, &decl.synthetic_name) {
            let name = QName::new(decl.namespace.clone(), synthetic.clone());
            synthetic_collision(model, collection, &name, ComponentKind::Type, &decl.path)?;
        }
    }
    for (_, group) in model.groups() {
        if let (None, Some(synthetic)) = (&group.name, &group.synthetic_name) {
            let namespace = model.document(group.document).target_namespace.clone();
            let name = QName::new(namespace, synthetic.clone());
            synthetic_collision(model, collection, &name, ComponentKind::Group, &group.path)?;
        }
    }
    Ok(())
}

fn assign_fields(model: &mut SchemaModel, rules: &NamingRules) {
    let elements: Vec<_> = model
        .elements()
        .map(|(id, _)| (id, element_name(model, id)))
        .collect();
    for (id, name) in elements {
        if let Some(name) = name {
            model.element_mut(id).field = Some(rules.identifier(&name.local_name));
        }
    }

    let attributes: Vec<_> = model
        .attributes()
        .map(|(id, _)| (id, attribute_name(model, id)))
        .collect();
    for (id, name) in attributes {
        if let Some(name) = name {
            model.attribute_mut(id).field = Some(rules.identifier(&name.local_name));
        }
    }

    let groups: Vec<_> = model
        .groups()
        .filter_map(|(id, g)| g.display_name().map(|n| (id, n.to_string())))
        .collect();
    for (id, name) in groups {
        model.group_mut(id).field = Some(rules.identifier(&name));
    }
}

fn check_unique<'a>(scope: impl Fn() -> String, members: impl IntoIterator<Item = &'a Identifier>) -> Result<()> {
    let mut seen: IndexMap<&str, &str> = IndexMap::new();
    for member in members {
        if let Some(first) = seen.insert(&member.field_name, &member.xml_name) {
            return Err(Error::NameCollision {
                scope: scope(),
                first: first.to_string(),
                second: member.xml_name.clone(),
                field: member.field_name.clone(),
            });
        }
    }
    Ok(())
}

/// Field of a particle inside a model group
pub fn particle_field<'m>(model: &'m SchemaModel, particle: &Particle) -> Option<&'m Identifier> {
    match particle {
        Particle::Element(id) => model.element(*id).field.as_ref(),
        Particle::Group(id) => model.group(*id).field.as_ref(),
        Particle::GroupRef(group_ref) => group_ref
            .resolved
            .as_ref()
            .and_then(|r| model.group(r.target).field.as_ref()),
        Particle::Unsupported { .. } => None,
    }
}

fn check_type_members(model: &SchemaModel) -> Result<()> {
    let value = Identifier::verbatim(VALUE_FIELD);
    for (_, decl) in model.complex_types() {
        let attributes = decl
            .effective_attributes
            .iter()
            .filter_map(|id| model.attribute(*id).field.as_ref());
        let payload = matches!(decl.content, Some(ContentModel::SimpleContent { .. })).then_some(&value);
        check_unique(|| decl.describe(), attributes.chain(payload))?;
    }
    Ok(())
}

fn check_group_members(model: &SchemaModel) -> Result<()> {
    for (_, group) in model.groups() {
        let fields = group.particles.iter().filter_map(|p| particle_field(model, p));
        check_unique(|| group.describe(), fields)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::components::parsing::{parse_document, Origin};
    use crate::documents::Document;
    use crate::limits::Limits;
    use crate::locations::Location;
    use crate::resolver::resolve;

    fn normalized(xsd: &str) -> Result<SchemaModel> {
        let doc = Document::from_string(xsd)?;
        let root = doc.root().ok_or_else(|| Error::Xml("empty".into()))?;
        let mut model = SchemaModel::new();
        let mut collection = DocumentCollection::new();
        let id = parse_document(&mut model, root, Location::String(xsd.into()), Origin::Root, &Limits::default())?;
        collection.add_document(&model, id)?;
        resolve(&mut model, &collection)?;
        classify(&mut model)?;
        normalize(&mut model, &collection, &NamingRules::default())?;
        Ok(model)
    }

    const XS: &str = r#"xmlns:xs="http://www.w3.org/2001/XMLSchema""#;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("first-name"), "first_name");
        assert_eq!(sanitize("a.b"), "a_b");
        assert_eq!(sanitize("3d"), "_3d");
        assert_eq!(sanitize("plain"), "plain");
    }

    #[test]
    fn test_reserved_words_get_suffix() {
        let rules = NamingRules::default();
        let id = rules.identifier("type");
        assert_eq!(id.field_name, "type_attribute");
        assert_eq!(id.xml_name, "type");
        assert_eq!(rules.identifier("class").field_name, "class_attribute");
        assert_eq!(rules.identifier("_value").field_name, "_value_attribute");
        assert_eq!(rules.identifier("name").field_name, "name");
    }

    #[test]
    fn test_custom_rules() {
        let rules = NamingRules::new(vec!["end".to_string()], "_", "Anon");
        assert_eq!(rules.identifier("end").field_name, "end_");
        assert_eq!(rules.identifier("type").field_name, "type");
        assert_eq!(rules.anonymous_prefix(), "Anon");
    }

    #[test]
    fn test_namer_counts_from_one() {
        let mut namer = AnonymousNamer::new("_anon");
        assert_eq!(namer.next_name(), "_anon1");
        assert_eq!(namer.next_name(), "_anon2");
        assert_eq!(namer.assigned(), 2);
    }

    #[test]
    fn test_anonymous_names_follow_document_order() {
        let model = normalized(&format!(
            r#"<xs:schema {XS}>
                <xs:element name="first">
                    <xs:complexType>
                        <xs:sequence>
                            <xs:element name="inner">
                                <xs:complexType>
                                    <xs:choice>
                                        <xs:element name="x"/>
                                        <xs:sequence><xs:element name="y"/></xs:sequence>
                                    </xs:choice>
                                </xs:complexType>
                            </xs:element>
                        </xs:sequence>
                        <xs:attribute name="code">
                            <xs:simpleType><xs:restriction base="xs:string"/></xs:simpleType>
                        </xs:attribute>
                    </xs:complexType>
                </xs:element>
                <xs:element name="second"><xs:complexType/></xs:element>
            </xs:schema>"#
        ))
        .unwrap();

        let synthetic = |path: &str| -> Option<String> {
            model
                .complex_types()
                .find(|(_, t)| t.path == path)
                .and_then(|(_, t)| t.synthetic_name.clone())
        };
        assert_eq!(synthetic("element 'first'/complexType").as_deref(), Some("_anon1"));
        assert_eq!(
            synthetic("element 'first'/complexType/sequence/element 'inner'/complexType").as_deref(),
            Some("_anon2")
        );
        let nested = model.groups().find(|(_, g)| g.synthetic_name.is_some()).unwrap().1;
        assert_eq!(nested.synthetic_name.as_deref(), Some("_anon3"));
        let (_, code_type) = model.simple_types().next().unwrap();
        assert_eq!(code_type.synthetic_name.as_deref(), Some("_anon4"));
        assert_eq!(synthetic("element 'second'/complexType").as_deref(), Some("_anon5"));
    }

    #[test]
    fn test_member_collision() {
        let err = normalized(&format!(
            r#"<xs:schema {XS}>
                <xs:complexType name="t">
                    <xs:sequence>
                        <xs:element name="first-name" type="xs:string"/>
                        <xs:element name="first_name" type="xs:string"/>
                    </xs:sequence>
                </xs:complexType>
            </xs:schema>"#
        ))
        .unwrap_err();
        match err {
            Error::NameCollision { scope, first, second, field } => {
                assert_eq!(scope, "complexType 't'/sequence");
                assert_eq!(first, "first-name");
                assert_eq!(second, "first_name");
                assert_eq!(field, "first_name");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_attribute_collision_after_rewrite() {
        let err = normalized(&format!(
            r#"<xs:schema {XS}>
                <xs:complexType name="t">
                    <xs:attribute name="type"/>
                    <xs:attribute name="type_attribute"/>
                </xs:complexType>
            </xs:schema>"#
        ))
        .unwrap_err();
        assert!(matches!(err, Error::NameCollision { ref field, .. } if field == "type_attribute"));
    }

    #[test]
    fn test_synthetic_name_shadowing_declared_type() {
        let err = normalized(&format!(
            r#"<xs:schema {XS}>
                <xs:complexType name="_anon1"/>
                <xs:element name="e"><xs:complexType/></xs:element>
            </xs:schema>"#
        ))
        .unwrap_err();
        assert!(matches!(err, Error::NameCollision { ref field, .. } if field == "_anon1"));
    }

    #[test]
    fn test_ref_members_use_target_name() {
        let model = normalized(&format!(
            r#"<xs:schema {XS}>
                <xs:element name="class" type="xs:string"/>
                <xs:complexType name="t">
                    <xs:sequence><xs:element ref="class"/></xs:sequence>
                </xs:complexType>
            </xs:schema>"#
        ))
        .unwrap();
        let (_, reference) = model.elements().find(|(_, e)| e.ref_name.is_some()).unwrap();
        assert_eq!(
            reference.field,
            Some(Identifier {
                xml_name: "class".into(),
                field_name: "class_attribute".into()
            })
        );
    }
}
