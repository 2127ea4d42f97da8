#[path = "../../class_file/tests/common/mod.rs"]
mod common;

use std::borrow::Cow;

use classtext_class_file::{mutf8, ClassFile, ClassFileError, CpInfo};
use classtext_strings::{
    resolve_candidates, rewrite_class, StringsError, Translations, VisibilityFilter,
};

use common::*;

fn filter() -> VisibilityFilter {
    VisibilityFilter::new(2, &[]).unwrap()
}

fn translations(pairs: &[(&str, &str)]) -> Translations {
    pairs
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

#[test]
fn test_translation_changes_only_the_utf8_entry() {
    let _ = pretty_env_logger::try_init();
    let bytes = greeter();
    let rewritten = rewrite_class(&bytes, &translations(&[("Hello", "你好")]), &filter()).unwrap();

    assert!(rewritten.report.is_modified());
    assert_eq!(rewritten.report.replacements[0].utf8_index, 12);

    let old_entry = [&[1u8, 0, 5][..], &b"Hello"[..]].concat();
    let new_entry = [&[1u8, 0, 6][..], &mutf8::encode("你好")[..]].concat();
    let offset = bytes
        .windows(old_entry.len())
        .position(|w| w == old_entry)
        .unwrap();
    let expected = [
        &bytes[..offset],
        &new_entry[..],
        &bytes[offset + old_entry.len()..],
    ]
    .concat();
    assert_eq!(rewritten.bytes.len(), bytes.len() + 1);
    assert_eq!(rewritten.bytes.as_ref(), &expected[..]);

    let class_file = ClassFile::parse(&rewritten.bytes).unwrap();
    assert_eq!(class_file.constant_pool.utf8(12), Some("你好"));
    assert_eq!(class_file.class_name().unwrap(), "Greeter");
    assert_eq!(class_file.method_name(&class_file.methods[0]).unwrap(), "greet");
}

#[test]
fn test_untouched_class_is_returned_as_is() {
    let bytes = greeter();
    for translations in [
        translations(&[]),
        translations(&[("Hello", "Hello")]),
        translations(&[("Goodbye", "Au revoir")]),
    ] {
        let rewritten = rewrite_class(&bytes, &translations, &filter()).unwrap();
        assert!(matches!(rewritten.bytes, Cow::Borrowed(_)));
        assert_eq!(rewritten.bytes.as_ref(), &bytes[..]);
    }
}

#[test]
fn test_wide_constants_keep_their_slots() {
    let mut b = ClassBuilder::new();
    b.set_this_class("Wide");
    b.set_super_class("java/lang/Object");
    let big = b.long(1 << 40);
    let pi = b.double(3.25);
    let message = b.string_literal("Press start");
    b.method_with_code(
        "run",
        "()V",
        &[
            LDC2_W,
            0,
            big as u8,
            POP2,
            LDC2_W,
            0,
            pi as u8,
            POP2,
            LDC,
            message as u8,
            POP,
            RETURN,
        ],
    );
    let bytes = b.build();

    let original = ClassFile::parse(&bytes).unwrap();
    let candidates = resolve_candidates(&original, &filter());
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].text, "Press start");
    assert_eq!(candidates[0].string_index, Some(message));

    let rewritten = rewrite_class(
        &bytes,
        &translations(&[("Press start", "Appuyez pour démarrer")]),
        &filter(),
    )
    .unwrap();
    let class_file = ClassFile::parse(&rewritten.bytes).unwrap();
    let pool = &class_file.constant_pool;

    assert_eq!(pool.count(), original.constant_pool.count());
    match pool.get(big) {
        Some(CpInfo::Long(wide)) => assert_eq!(wide.as_long(), 1 << 40),
        other => panic!("expected a long at #{big}, got {other:?}"),
    }
    match pool.get(pi) {
        Some(CpInfo::Double(wide)) => assert_eq!(wide.as_double(), 3.25),
        other => panic!("expected a double at #{pi}, got {other:?}"),
    }
    assert_eq!(pool[big + 1], CpInfo::Unusable);
    assert_eq!(pool[pi + 1], CpInfo::Unusable);
    match pool.get(message) {
        Some(CpInfo::String { string_index }) => {
            assert_eq!(pool.utf8(*string_index), Some("Appuyez pour démarrer"))
        }
        other => panic!("expected a string at #{message}, got {other:?}"),
    }

    let code = class_file
        .method_code(&class_file.methods[0])
        .unwrap()
        .unwrap();
    let original_code = original
        .method_code(&original.methods[0])
        .unwrap()
        .unwrap();
    assert_eq!(code.ldc_sites().unwrap(), original_code.ldc_sites().unwrap());
}

#[test]
fn test_broken_method_does_not_stop_the_rewrite() {
    let mut b = ClassBuilder::new();
    b.set_this_class("Broken");
    b.set_super_class("java/lang/Object");
    let hello = b.string_literal("Hello there");
    b.method_with_code("ok", "()V", &[LDC, hello as u8, POP, RETURN]);
    let name = b.utf8("broken");
    let descriptor = b.utf8("()V");
    let code_name = b.code_name();
    b.method(
        ACC_PUBLIC | ACC_STATIC,
        name,
        descriptor,
        vec![(code_name, truncated_code_attribute())],
    );
    let bytes = b.build();
    let original = ClassFile::parse(&bytes).unwrap();

    let rewritten = rewrite_class(&bytes, &translations(&[("Hello there", "Bonjour")]), &filter())
        .unwrap();
    assert_eq!(rewritten.report.replacements.len(), 1);

    let class_file = ClassFile::parse(&rewritten.bytes).unwrap();
    assert_eq!(class_file.methods[1].raw, original.methods[1].raw);
    assert!(matches!(
        class_file.method_code(&class_file.methods[1]),
        Err(ClassFileError::OutOfBounds { .. })
    ));
}

#[test]
fn test_shared_utf8_is_left_alone() {
    let mut b = ClassBuilder::new();
    b.set_this_class("Shared");
    b.set_super_class("java/lang/Object");
    let title = b.utf8("Main Menu");
    let literal = b.string(title);
    let descriptor = b.utf8("()V");
    let code_name = b.code_name();
    b.method(
        ACC_PUBLIC,
        title,
        descriptor,
        vec![(code_name, code_attribute(&[LDC, literal as u8, POP, RETURN]))],
    );
    let bytes = b.build();

    let rewritten = rewrite_class(
        &bytes,
        &translations(&[("Main Menu", "Menu principal")]),
        &filter(),
    )
    .unwrap();
    assert_eq!(rewritten.report.skipped_shared, vec![title]);
    assert_eq!(rewritten.bytes.as_ref(), &bytes[..]);
}

#[test]
fn test_attribute_operands_are_left_alone() {
    let mut b = ClassBuilder::new();
    b.set_this_class("Shared");
    b.set_super_class("java/lang/Object");
    let source = b.utf8("Main Menu");
    let source_literal = b.string(source);
    let signature = b.utf8("Ljava/util/List<TT;>;");
    let signature_literal = b.string(signature);
    let greeting = b.string_literal("Good morning");
    let source_file = b.utf8("SourceFile");
    let signature_name = b.utf8("Signature");
    b.class_attribute(source_file, source.to_be_bytes().to_vec());
    b.class_attribute(signature_name, signature.to_be_bytes().to_vec());
    b.method_with_code(
        "run",
        "()V",
        &[
            LDC,
            source_literal as u8,
            POP,
            LDC,
            signature_literal as u8,
            POP,
            LDC,
            greeting as u8,
            POP,
            RETURN,
        ],
    );
    let bytes = b.build();

    let candidates = resolve_candidates(&ClassFile::parse(&bytes).unwrap(), &filter());
    let shared = candidates
        .iter()
        .map(|c| (c.text.as_str(), c.shared))
        .collect::<Vec<_>>();
    assert_eq!(
        shared,
        vec![
            ("Main Menu", true),
            ("Ljava/util/List<TT;>;", true),
            ("Good morning", false),
        ]
    );

    let rewritten = rewrite_class(
        &bytes,
        &translations(&[
            ("Main Menu", "Menu principal"),
            ("Ljava/util/List<TT;>;", "Liste"),
            ("Good morning", "Bonjour"),
        ]),
        &filter(),
    )
    .unwrap();
    assert_eq!(rewritten.report.skipped_shared, vec![source, signature]);
    assert_eq!(rewritten.report.replacements.len(), 1);

    let class_file = ClassFile::parse(&rewritten.bytes).unwrap();
    assert_eq!(class_file.constant_pool.utf8(source), Some("Main Menu"));
    assert_eq!(
        class_file.constant_pool.utf8(signature),
        Some("Ljava/util/List<TT;>;")
    );
    assert_eq!(class_file.attributes.0, ClassFile::parse(&bytes).unwrap().attributes.0);
}

#[test]
fn test_trailing_bytes_are_an_error() {
    let mut bytes = greeter();
    bytes.push(0);
    assert!(matches!(
        rewrite_class(&bytes, &translations(&[("Hello", "Hi")]), &filter()),
        Err(StringsError::ClassFile(ClassFileError::TrailingBytes(1)))
    ));
}

#[test]
fn test_invalid_class_is_an_error() {
    let mut bytes = greeter();
    bytes.truncate(20);
    assert!(rewrite_class(&bytes, &translations(&[("Hello", "Hi")]), &filter()).is_err());
}
