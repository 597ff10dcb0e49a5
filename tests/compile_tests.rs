//! End-to-end compilation tests
//!
//! Compile schemas through the public pipeline and check the exported model,
//! the fatal error taxonomy and the reference decoder.

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use xmlschema_codegen::exports::{MemberExport, TypeKind};
use xmlschema_codegen::{Cardinality, CompiledSchema, Compiler, CompilerOptions, Error, Field};

fn fixtures_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

fn compile(xsd: &str) -> xmlschema_codegen::Result<CompiledSchema> {
    CompiledSchema::from_source(xsd)
}

fn schema(body: &str) -> String {
    format!(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">{}</xs:schema>"#,
        body
    )
}

// ============================================================================
// Addressbook scenario
// ============================================================================

#[test]
fn test_addressbook_classification() {
    let schema = CompiledSchema::from_file(fixtures_dir().join("addressbook.xsd")).unwrap();
    let export = schema.export();
    let ns = export.namespace(None).unwrap();

    let person = ns.complex_type("personType").unwrap();
    assert_eq!(person.content, "sequence");
    let members: Vec<(&str, Cardinality)> = person
        .members
        .iter()
        .map(|m| (m.field().field_name.as_str(), m.cardinality()))
        .collect();
    assert_eq!(
        members,
        vec![("name", Cardinality::Mandatory), ("phone", Cardinality::Repeated)]
    );

    let phone = ns.complex_type("phoneType").unwrap();
    assert_eq!(phone.content, "simple_content");
    assert_eq!(phone.base.as_ref().unwrap().name, "string");
    assert_eq!(phone.base.as_ref().unwrap().kind, TypeKind::Primitive);

    let type_attr = phone.attribute("type").unwrap();
    assert_eq!(type_attr.field.field_name, "type_attribute");
    assert_eq!(type_attr.cardinality, Cardinality::Optional);

    assert_eq!(ns.elements.len(), 1);
    assert_eq!(ns.elements[0].type_name.as_ref().unwrap().name, "personType");
}

#[test]
fn test_addressbook_decode() {
    let schema = CompiledSchema::from_file(fixtures_dir().join("addressbook.xsd")).unwrap();
    let xml = std::fs::read_to_string(fixtures_dir().join("addressbook.xml")).unwrap();
    let person = schema.decode_str(&xml).unwrap();

    assert_eq!(person.name, "person");
    assert_eq!(person.type_name.as_deref(), Some("personType"));

    let name = person.field("name").unwrap();
    assert!(matches!(name, Field::Single(_)));
    assert_eq!(name.items()[0].as_element().unwrap().text(), Some("Tom"));

    let phones = person.field("phone").unwrap();
    assert!(matches!(phones, Field::Many(_)));
    assert_eq!(phones.len(), 1);
    let phone = phones.items()[0].as_element().unwrap();
    assert_eq!(phone.text(), Some("+61 7 1234 5678"));
    assert_eq!(phone.attribute("type_attribute"), Some("home"));
}

#[test]
fn test_addressbook_root_dispatch() {
    let schema = CompiledSchema::from_file(fixtures_dir().join("addressbook.xsd")).unwrap();
    assert!(schema.match_root("person", None).is_ok());
    match schema.match_root("person", Some("urn:other")).unwrap_err() {
        Error::NoMatchingElement { name, expected } => {
            assert_eq!(name, "{urn:other}person");
            assert_eq!(expected, "person");
        }
        other => panic!("unexpected error: {}", other),
    }
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn test_every_type_gets_one_tag() {
    let schema = compile(&schema(
        r#"<xs:complexType name="empty"/>
           <xs:complexType name="attrs"><xs:attribute name="a"/></xs:complexType>
           <xs:complexType name="text">
               <xs:simpleContent><xs:extension base="xs:decimal"/></xs:simpleContent>
           </xs:complexType>
           <xs:complexType name="seq"><xs:sequence><xs:element name="x"/></xs:sequence></xs:complexType>
           <xs:complexType name="alt"><xs:choice><xs:element name="y"/></xs:choice></xs:complexType>"#,
    ))
    .unwrap();
    let export = schema.export();
    let tags: Vec<(&str, &str)> = export.namespaces[0]
        .types
        .iter()
        .map(|t| (t.name.as_str(), t.content))
        .collect();
    assert_eq!(
        tags,
        vec![
            ("empty", "empty"),
            ("attrs", "empty"),
            ("text", "simple_content"),
            ("seq", "sequence"),
            ("alt", "choice"),
        ]
    );
}

#[test]
fn test_sequence_and_choice_is_ambiguous() {
    let err = compile(&schema(
        r#"<xs:complexType name="both">
               <xs:sequence><xs:element name="a"/></xs:sequence>
               <xs:choice><xs:element name="b"/></xs:choice>
           </xs:complexType>"#,
    ))
    .unwrap_err();
    match err {
        Error::AmbiguousContentModel { component, .. } => assert_eq!(component, "complexType 'both'"),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_ref_and_type_are_exclusive() {
    let err = compile(&schema(
        r#"<xs:element name="a" type="xs:string"/>
           <xs:complexType name="t">
               <xs:sequence><xs:element ref="a" type="xs:string"/></xs:sequence>
           </xs:complexType>"#,
    ))
    .unwrap_err();
    assert!(matches!(err, Error::MutuallyExclusive { .. }), "got {}", err);

    let err = compile(&schema(
        r#"<xs:attribute name="lang" type="xs:string"/>
           <xs:complexType name="t"><xs:attribute ref="lang" type="xs:string"/></xs:complexType>"#,
    ))
    .unwrap_err();
    assert!(matches!(err, Error::MutuallyExclusive { .. }), "got {}", err);
}

#[test]
fn test_duplicate_choice_alternatives() {
    let err = compile(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:x="http://x"
               targetNamespace="http://x" elementFormDefault="qualified">
               <xs:complexType name="pick">
                   <xs:choice>
                       <xs:element name="foo" type="xs:string"/>
                       <xs:element name="foo" type="xs:int"/>
                   </xs:choice>
               </xs:complexType>
           </xs:schema>"#,
    )
    .unwrap_err();
    match err {
        Error::AmbiguousContentModel { reason, .. } => assert!(reason.contains("{http://x}foo"), "{}", reason),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_duplicate_ref_alternative_in_nested_group() {
    let err = compile(&schema(
        r#"<xs:element name="item" type="xs:string"/>
           <xs:complexType name="pick">
               <xs:choice>
                   <xs:element ref="item"/>
                   <xs:sequence><xs:element ref="item"/><xs:element name="extra"/></xs:sequence>
               </xs:choice>
           </xs:complexType>"#,
    ))
    .unwrap_err();
    assert!(matches!(err, Error::AmbiguousContentModel { .. }), "got {}", err);
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn test_forward_reference() {
    let schema = compile(&schema(
        r#"<xs:complexType name="A">
               <xs:sequence><xs:element name="b" type="B"/></xs:sequence>
           </xs:complexType>
           <xs:complexType name="B"><xs:attribute name="id" type="xs:ID"/></xs:complexType>"#,
    ))
    .unwrap();
    let export = schema.export();
    let a = export.namespaces[0].complex_type("A").unwrap();
    match &a.members[0] {
        MemberExport::Element { type_name, .. } => {
            let type_name = type_name.as_ref().unwrap();
            assert_eq!(type_name.name, "B");
            assert_eq!(type_name.kind, TypeKind::Complex);
        }
        other => panic!("unexpected member: {:?}", other),
    }
}

#[test]
fn test_unresolved_reference_names_qname() {
    let err = compile(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:x="http://x" targetNamespace="http://x">
               <xs:element name="root" type="x:nowhere"/>
           </xs:schema>"#,
    )
    .unwrap_err();
    match err {
        Error::UnresolvedReference { component, kind, name } => {
            assert_eq!(component, "element 'root'");
            assert_eq!(kind, "type");
            assert_eq!(name, "{http://x}nowhere");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_recursive_types_are_boxed() {
    let schema = compile(&schema(
        r#"<xs:element name="folder" type="folderType"/>
           <xs:complexType name="folderType">
               <xs:sequence>
                   <xs:element name="name" type="xs:string"/>
                   <xs:element name="folder" type="folderType" minOccurs="0" maxOccurs="unbounded"/>
               </xs:sequence>
           </xs:complexType>"#,
    ))
    .unwrap();
    let export = schema.export();
    let folder = export.namespaces[0].complex_type("folderType").unwrap();
    assert!(folder.recursive);
    let boxed: Vec<bool> = folder
        .members
        .iter()
        .map(|m| matches!(m, MemberExport::Element { boxed: true, .. }))
        .collect();
    assert_eq!(boxed, vec![false, true]);

    let decoded = schema
        .decode_str("<folder><name>a</name><folder><name>b</name></folder></folder>")
        .unwrap();
    assert_eq!(decoded.field("folder").unwrap().len(), 1);
}

#[test]
fn test_self_containing_group_is_rejected() {
    let err = compile(&schema(
        r#"<xs:group name="g">
               <xs:sequence><xs:group ref="g"/></xs:sequence>
           </xs:group>
           <xs:element name="root">
               <xs:complexType><xs:group ref="g"/></xs:complexType>
           </xs:element>"#,
    ))
    .unwrap_err();
    assert!(matches!(err, Error::CircularReference(_)), "got {}", err);
}

#[test]
fn test_all_in_extension_is_unclassifiable() {
    let err = compile(&schema(
        r#"<xs:complexType name="base"><xs:sequence><xs:element name="a"/></xs:sequence></xs:complexType>
           <xs:complexType name="d">
               <xs:complexContent>
                   <xs:extension base="base"><xs:all><xs:element name="b"/></xs:all></xs:extension>
               </xs:complexContent>
           </xs:complexType>"#,
    ))
    .unwrap_err();
    assert!(matches!(err, Error::UnclassifiableContentModel { .. }), "got {}", err);
}

#[test]
fn test_compile_after_failed_document() {
    let mut compiler = Compiler::default();
    compiler.add_source(schema(r#"<xs:element name="a"/>"#)).unwrap();
    assert!(compiler
        .add_source(schema(r#"<xs:element name="a"><xs:complexType/></xs:element>"#))
        .is_err());
    assert!(matches!(compiler.compile(), Err(Error::Rejected(_))));
}

// ============================================================================
// Normalization
// ============================================================================

const ANONYMOUS: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
    <xs:element name="catalog">
        <xs:complexType>
            <xs:sequence>
                <xs:element name="entry" maxOccurs="unbounded">
                    <xs:complexType>
                        <xs:choice>
                            <xs:element name="book" type="xs:string"/>
                            <xs:sequence>
                                <xs:element name="disc" type="xs:string"/>
                                <xs:element name="tracks" type="xs:int"/>
                            </xs:sequence>
                        </xs:choice>
                        <xs:attribute name="class">
                            <xs:simpleType>
                                <xs:restriction base="xs:string">
                                    <xs:enumeration value="new"/>
                                    <xs:enumeration value="used"/>
                                </xs:restriction>
                            </xs:simpleType>
                        </xs:attribute>
                    </xs:complexType>
                </xs:element>
            </xs:sequence>
        </xs:complexType>
    </xs:element>
</xs:schema>"#;

#[test]
fn test_anonymous_names_are_deterministic() {
    let first = compile(ANONYMOUS).unwrap().export();
    let second = compile(ANONYMOUS).unwrap().export();
    assert_eq!(first, second);

    let names: Vec<&str> = first.namespaces[0].anonymous.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["_anon1", "_anon2", "_anon3", "_anon4"]);
}

#[test]
fn test_reserved_attribute_name_is_rewritten() {
    let schema = compile(ANONYMOUS).unwrap();
    let export = schema.export();
    let entry = export.namespaces[0].complex_type("_anon2").unwrap();
    let class = entry.attribute("class").unwrap();
    assert_eq!(class.field.field_name, "class_attribute");
    assert_eq!(class.type_name.name, "_anon4");

    let decoded = schema
        .decode_str(r#"<catalog><entry class="used"><disc>x</disc><tracks>9</tracks></entry></catalog>"#)
        .unwrap();
    let entry = decoded.field("entry").unwrap().items()[0].as_element().unwrap();
    assert_eq!(entry.attribute("class_attribute"), Some("used"));
}

#[test]
fn test_member_name_collision() {
    let err = compile(&schema(
        r#"<xs:complexType name="t">
               <xs:sequence>
                   <xs:element name="type" type="xs:string"/>
                   <xs:element name="type_attribute" type="xs:string"/>
               </xs:sequence>
           </xs:complexType>"#,
    ))
    .unwrap_err();
    assert!(matches!(err, Error::NameCollision { .. }), "got {}", err);
}

#[test]
fn test_custom_reserved_words() {
    let mut compiler = Compiler::new(CompilerOptions::new().with_reserved_word("name"));
    compiler
        .add_source(std::fs::read_to_string(fixtures_dir().join("addressbook.xsd")).unwrap())
        .unwrap();
    let export = compiler.compile().unwrap().export();
    let person = export.namespaces[0].complex_type("personType").unwrap();
    assert!(person.member("name_attribute").is_some());
}

// ============================================================================
// Cardinality
// ============================================================================

fn member_cardinality(occurs: &str) -> Cardinality {
    let schema = compile(&schema(&format!(
        r#"<xs:complexType name="t"><xs:sequence><xs:element name="m" type="xs:string" {}/></xs:sequence></xs:complexType>"#,
        occurs
    )))
    .unwrap();
    schema.export().namespaces[0].types[0].members[0].cardinality()
}

#[test]
fn test_cardinality_defaults() {
    assert_eq!(member_cardinality(""), Cardinality::Mandatory);
    assert_eq!(member_cardinality(r#"minOccurs="0""#), Cardinality::Optional);
    assert_eq!(member_cardinality(r#"maxOccurs="unbounded""#), Cardinality::Repeated);
    assert_eq!(member_cardinality(r#"minOccurs="0" maxOccurs="unbounded""#), Cardinality::Repeated);
    assert_eq!(member_cardinality(r#"minOccurs="2" maxOccurs="5""#), Cardinality::Repeated);
}

#[test]
fn test_invalid_occurs_is_parse_error() {
    let err = compile(&schema(
        r#"<xs:complexType name="t"><xs:sequence><xs:element name="m" maxOccurs="lots"/></xs:sequence></xs:complexType>"#,
    ))
    .unwrap_err();
    assert!(matches!(err, Error::Parse(_)), "got {}", err);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_unbounded_is_always_repeated(min in 0u32..10) {
        let cardinality = member_cardinality(&format!(r#"minOccurs="{}" maxOccurs="unbounded""#, min));
        prop_assert_eq!(cardinality, Cardinality::Repeated);
    }

    #[test]
    fn prop_bounded_cardinality(min in 0u32..4, extra in 0u32..4) {
        let max = min.max(1) + extra;
        let cardinality = member_cardinality(&format!(r#"minOccurs="{}" maxOccurs="{}""#, min, max));
        let expected = match (min, max) {
            (0, 1) => Cardinality::Optional,
            (1, 1) => Cardinality::Mandatory,
            _ => Cardinality::Repeated,
        };
        prop_assert_eq!(cardinality, expected);
    }
}
