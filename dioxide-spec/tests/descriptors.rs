//! Type descriptor and signature parsing

use dioxide_spec::{parse_signature, FloatWidth, IntWidth, SpecError, TypeDescriptor};
use proptest::prelude::*;

#[test]
fn test_whitespace_is_ignored() {
    let ty = TypeDescriptor::parse(" map< uint32 , array<string> > ").unwrap();
    assert_eq!(ty.to_string(), "map<uint32,array<string>>");
}

#[test]
fn test_rejected_descriptors() {
    for text in ["", "uint", "uint7", "uint08", "int1024", "float128", "array<>", "map<uint8>", "struct<uint8", "array<uint8>>", "foo"] {
        let err = TypeDescriptor::parse(text).unwrap_err();
        assert!(err.is_unsupported_type(), "{}", text);
    }
}

#[test]
fn test_signature_names() {
    let sig = parse_signature("map<string,uint8>:m, uint32 ,address:to").unwrap();
    let names: Vec<_> = sig.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["m", "value#1", "to"]);
    assert_eq!(sig.params()[0].ty.to_string(), "map<string,uint8>");
    assert!(parse_signature("").unwrap().is_empty());
    assert!(matches!(parse_signature("uint8:a,,uint8:b"), Err(SpecError::MalformedSignature { .. })));
}

fn leaf() -> impl Strategy<Value = TypeDescriptor> {
    prop_oneof![
        Just(TypeDescriptor::Bool),
        prop::sample::select(IntWidth::ALL.to_vec()).prop_map(TypeDescriptor::Uint),
        prop::sample::select(IntWidth::ALL.to_vec()).prop_map(TypeDescriptor::Int),
        prop::sample::select(vec![256u32, 512, 1024])
            .prop_filter_map("width", |bits| FloatWidth::from_bits(bits).map(TypeDescriptor::Float)),
        Just(TypeDescriptor::Blob),
        Just(TypeDescriptor::Hash),
        Just(TypeDescriptor::Address),
        Just(TypeDescriptor::Enum),
        Just(TypeDescriptor::String),
        Just(TypeDescriptor::BigInt),
        Just(TypeDescriptor::Token),
    ]
}

fn descriptor() -> impl Strategy<Value = TypeDescriptor> {
    leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(|t| TypeDescriptor::Array(Box::new(t))),
            (inner.clone(), inner.clone()).prop_map(|(k, v)| TypeDescriptor::Map(Box::new(k), Box::new(v))),
            prop::collection::vec(inner, 0..4).prop_map(TypeDescriptor::Struct),
        ]
    })
}

proptest! {
    #[test]
    fn prop_display_parses_back(ty in descriptor()) {
        let text = ty.to_string();
        prop_assert_eq!(TypeDescriptor::parse(&text).unwrap(), ty);
    }

    #[test]
    fn prop_fixed_size_matches_kind(ty in descriptor()) {
        let composite = matches!(
            ty,
            TypeDescriptor::Array(_) | TypeDescriptor::Map(_, _) | TypeDescriptor::Struct(_)
        );
        if composite {
            prop_assert!(ty.is_variable_size());
        }
    }
}
