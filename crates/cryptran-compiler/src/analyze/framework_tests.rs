use cryptran_core::Type;

use super::framework;

#[test]
fn inherited_fields_resolve_through_base_chain() {
    let kb = framework();

    assert_eq!(
        kb.field("BlockCipherAlgorithm", "name"),
        Some(&Type::string())
    );
    assert_eq!(
        kb.field("BlockCipherAlgorithm", "SupportedKeySizes").map(ToString::to_string),
        Some("KeySize[]".to_string())
    );
    assert_eq!(kb.field("BlockCipherAlgorithm", "missing"), None);
}

#[test]
fn methods_report_declaring_entry() {
    let kb = framework();

    let (owner, sig) = kb.method("BlockCipherAlgorithm", "CreateInstance").unwrap();
    assert_eq!(owner.name, "Algorithm");
    assert_eq!(sig.as_type().to_string(), "(bool) => IAlgorithmInstance?");

    let (owner, sig) = kb.method("IBlockCipherInstance", "Feed").unwrap();
    assert_eq!(owner.name, "IAlgorithmInstance");
    assert_eq!(sig.param_type(0), Some(&Type::bytes()));
}

#[test]
fn subtype_relation() {
    let kb = framework();

    assert!(kb.is_subtype("BlockCipherAlgorithm", "Algorithm"));
    assert!(kb.is_subtype("Algorithm", "Algorithm"));
    assert!(!kb.is_subtype("Algorithm", "BlockCipherAlgorithm"));
    assert!(!kb.is_subtype("KeySize", "Algorithm"));
}

#[test]
fn entry_kinds() {
    let kb = framework();

    assert!(kb.is_class("IBlockCipherInstance"));
    assert!(kb.is_record("KeySize"));
    assert!(kb.is_enum("CategoryType"));
    assert!(kb.enum_has("CategoryType", "BLOCK"));
    assert!(!kb.enum_has("CategoryType", "block"));
    assert!(!kb.enum_has("KeySize", "minSize"));
}

#[test]
fn record_matching_is_set_equality() {
    let kb = framework();

    let found = kb.record_matching(&["maxSize", "minSize", "stepSize"]).map(|e| e.name.as_str());
    assert_eq!(found, Some("KeySize"));

    assert!(kb.record_matching(&["minSize", "maxSize"]).is_none());
    assert!(
        kb.record_matching(&["minSize", "maxSize", "stepSize", "extra"])
            .is_none()
    );

    let found = kb.record_matching(&["text", "uri"]).map(|e| e.name.as_str());
    assert_eq!(found, Some("LinkItem"));
}

#[test]
fn record_fields_keep_constructor_order() {
    let entry = framework().get("TestCase").unwrap();
    let order: Vec<&str> = entry.fields.keys().map(String::as_str).collect();
    assert_eq!(order, ["input", "expected", "text", "uri"]);
}

#[test]
fn opcodes_globals() {
    let kb = framework();

    let rotl = kb.global("OpCodes.RotL32").unwrap();
    assert_eq!(rotl.as_type().to_string(), "(uint32, uint32) => uint32");

    let rotr8 = kb.global("OpCodes.RotR8").unwrap();
    assert_eq!(rotr8.ret, Type::u8());

    let pack = kb.global("OpCodes.Pack32BE").unwrap();
    assert_eq!(pack.params.len(), 4);

    assert_eq!(
        kb.global("RegisterAlgorithm").map(|s| s.ret.clone()),
        Some(Type::void())
    );
    assert!(kb.global("OpCodes.Nope").is_none());
}
