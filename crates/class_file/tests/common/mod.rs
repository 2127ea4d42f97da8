#![allow(dead_code)]

use byteorder::{BigEndian, WriteBytesExt};
use classtext_class_file::mutf8;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_SUPER: u16 = 0x0020;

pub const LDC: u8 = 0x12;
pub const LDC_W: u8 = 0x13;
pub const LDC2_W: u8 = 0x14;
pub const POP: u8 = 0x57;
pub const POP2: u8 = 0x58;
pub const RETURN: u8 = 0xb1;

/// Assembles class files entry by entry, handing out constant pool indices
/// in allocation order.
#[derive(Default)]
pub struct ClassBuilder {
    pool: Vec<u8>,
    next_index: u16,
    code_name: Option<u16>,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    attributes: Vec<(u16, Vec<u8>)>,
}

impl ClassBuilder {
    pub fn new() -> Self {
        Self {
            next_index: 1,
            access_flags: ACC_PUBLIC | ACC_SUPER,
            ..Default::default()
        }
    }

    pub fn raw_entry(&mut self, tag: u8, body: &[u8], slots: u16) -> u16 {
        let index = self.next_index;
        self.pool.push(tag);
        self.pool.extend_from_slice(body);
        self.next_index += slots;
        index
    }

    pub fn utf8(&mut self, text: &str) -> u16 {
        self.raw_utf8(&mutf8::encode(text))
    }

    pub fn raw_utf8(&mut self, bytes: &[u8]) -> u16 {
        let mut body = vec![];
        body.write_u16::<BigEndian>(bytes.len() as u16).unwrap();
        body.extend_from_slice(bytes);
        self.raw_entry(1, &body, 1)
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        self.raw_entry(3, &value.to_be_bytes(), 1)
    }

    pub fn float(&mut self, value: f32) -> u16 {
        self.raw_entry(4, &value.to_bits().to_be_bytes(), 1)
    }

    pub fn long(&mut self, value: i64) -> u16 {
        self.raw_entry(5, &value.to_be_bytes(), 2)
    }

    pub fn double(&mut self, value: f64) -> u16 {
        self.raw_entry(6, &value.to_bits().to_be_bytes(), 2)
    }

    pub fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.raw_entry(7, &name_index.to_be_bytes(), 1)
    }

    pub fn string(&mut self, utf8_index: u16) -> u16 {
        self.raw_entry(8, &utf8_index.to_be_bytes(), 1)
    }

    pub fn string_literal(&mut self, text: &str) -> u16 {
        let utf8_index = self.utf8(text);
        self.string(utf8_index)
    }

    pub fn name_and_type(&mut self, name_index: u16, descriptor_index: u16) -> u16 {
        let body = [name_index.to_be_bytes(), descriptor_index.to_be_bytes()].concat();
        self.raw_entry(12, &body, 1)
    }

    pub fn method_ref(&mut self, class_index: u16, name_and_type_index: u16) -> u16 {
        let body = [class_index.to_be_bytes(), name_and_type_index.to_be_bytes()].concat();
        self.raw_entry(10, &body, 1)
    }

    pub fn method_handle(&mut self, reference_kind: u8, reference_index: u16) -> u16 {
        let mut body = vec![reference_kind];
        body.extend(reference_index.to_be_bytes());
        self.raw_entry(15, &body, 1)
    }

    pub fn method_type(&mut self, descriptor_index: u16) -> u16 {
        self.raw_entry(16, &descriptor_index.to_be_bytes(), 1)
    }

    pub fn invoke_dynamic(&mut self, bootstrap_index: u16, name_and_type_index: u16) -> u16 {
        let body = [bootstrap_index.to_be_bytes(), name_and_type_index.to_be_bytes()].concat();
        self.raw_entry(18, &body, 1)
    }

    pub fn code_name(&mut self) -> u16 {
        match self.code_name {
            Some(index) => index,
            None => {
                let index = self.utf8("Code");
                self.code_name = Some(index);
                index
            }
        }
    }

    pub fn set_this_class(&mut self, name: &str) -> &mut Self {
        self.this_class = self.class(name);
        self
    }

    pub fn set_super_class(&mut self, name: &str) -> &mut Self {
        self.super_class = self.class(name);
        self
    }

    pub fn add_interface(&mut self, name: &str) -> &mut Self {
        let index = self.class(name);
        self.interfaces.push(index);
        self
    }

    pub fn field(
        &mut self,
        access_flags: u16,
        name_index: u16,
        descriptor_index: u16,
        attributes: Vec<(u16, Vec<u8>)>,
    ) -> &mut Self {
        let member = member(access_flags, name_index, descriptor_index, &attributes);
        self.fields.push(member);
        self
    }

    pub fn method(
        &mut self,
        access_flags: u16,
        name_index: u16,
        descriptor_index: u16,
        attributes: Vec<(u16, Vec<u8>)>,
    ) -> &mut Self {
        let member = member(access_flags, name_index, descriptor_index, &attributes);
        self.methods.push(member);
        self
    }

    /// Adds a method whose only attribute is a `Code` attribute wrapping `code`.
    pub fn method_with_code(&mut self, name: &str, descriptor: &str, code: &[u8]) -> &mut Self {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let code_name = self.code_name();
        self.method(
            ACC_PUBLIC,
            name_index,
            descriptor_index,
            vec![(code_name, code_attribute(code))],
        )
    }

    pub fn class_attribute(&mut self, name_index: u16, info: Vec<u8>) -> &mut Self {
        self.attributes.push((name_index, info));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = vec![];
        out.write_u32::<BigEndian>(0xCAFEBABE).unwrap();
        out.write_u16::<BigEndian>(0).unwrap();
        out.write_u16::<BigEndian>(52).unwrap();
        out.write_u16::<BigEndian>(self.next_index).unwrap();
        out.extend_from_slice(&self.pool);
        out.write_u16::<BigEndian>(self.access_flags).unwrap();
        out.write_u16::<BigEndian>(self.this_class).unwrap();
        out.write_u16::<BigEndian>(self.super_class).unwrap();
        out.write_u16::<BigEndian>(self.interfaces.len() as u16).unwrap();
        for interface in &self.interfaces {
            out.write_u16::<BigEndian>(*interface).unwrap();
        }
        out.write_u16::<BigEndian>(self.fields.len() as u16).unwrap();
        for field in &self.fields {
            out.extend_from_slice(field);
        }
        out.write_u16::<BigEndian>(self.methods.len() as u16).unwrap();
        for method in &self.methods {
            out.extend_from_slice(method);
        }
        write_attributes(&mut out, &self.attributes);
        out
    }
}

fn member(
    access_flags: u16,
    name_index: u16,
    descriptor_index: u16,
    attributes: &[(u16, Vec<u8>)],
) -> Vec<u8> {
    let mut out = vec![];
    out.write_u16::<BigEndian>(access_flags).unwrap();
    out.write_u16::<BigEndian>(name_index).unwrap();
    out.write_u16::<BigEndian>(descriptor_index).unwrap();
    write_attributes(&mut out, attributes);
    out
}

fn write_attributes(out: &mut Vec<u8>, attributes: &[(u16, Vec<u8>)]) {
    out.write_u16::<BigEndian>(attributes.len() as u16).unwrap();
    for (name_index, info) in attributes {
        out.write_u16::<BigEndian>(*name_index).unwrap();
        out.write_u32::<BigEndian>(info.len() as u32).unwrap();
        out.extend_from_slice(info);
    }
}

/// Body of a `Code` attribute with no exception table and no nested attributes.
pub fn code_attribute(code: &[u8]) -> Vec<u8> {
    let mut out = vec![];
    out.write_u16::<BigEndian>(2).unwrap();
    out.write_u16::<BigEndian>(1).unwrap();
    out.write_u32::<BigEndian>(code.len() as u32).unwrap();
    out.extend_from_slice(code);
    out.write_u16::<BigEndian>(0).unwrap();
    out.write_u16::<BigEndian>(0).unwrap();
    out
}

/// A `Code` attribute whose declared code length runs past its end.
pub fn truncated_code_attribute() -> Vec<u8> {
    let mut out = vec![];
    out.write_u16::<BigEndian>(1).unwrap();
    out.write_u16::<BigEndian>(1).unwrap();
    out.write_u32::<BigEndian>(100).unwrap();
    out.extend_from_slice(&[LDC, 1, RETURN]);
    out
}

/// The greeter class:
///
/// ```text
///  #1 Utf8 "Greeter"          #2 Class #1
///  #3 Utf8 "java/lang/Object" #4 Class #3
///  #5 String #12              #6 Utf8 "greet"
///  #7 Utf8 "()V"              #8 Utf8 "Code"
///  #9 Long 7 (#10 unusable)   #11 Utf8 "count"
/// #12 Utf8 "Hello"            #13 Utf8 "I"
/// ```
///
/// with a private final int field `count` and a method `greet` doing
/// `ldc #5; pop; ldc2_w #9; pop2; return`.
pub fn greeter() -> Vec<u8> {
    let mut b = ClassBuilder::new();
    b.set_this_class("Greeter");
    b.set_super_class("java/lang/Object");
    let hello_string = b.string(12);
    let greet = b.utf8("greet");
    let void_descriptor = b.utf8("()V");
    let code_name = b.code_name();
    let seven = b.long(7);
    let count = b.utf8("count");
    let hello = b.utf8("Hello");
    let int_descriptor = b.utf8("I");
    assert_eq!(
        (hello_string, code_name, seven, count, hello),
        (5, 8, 9, 11, 12)
    );

    b.field(ACC_PRIVATE | ACC_FINAL, count, int_descriptor, vec![]);
    let code = [
        LDC,
        hello_string as u8,
        POP,
        LDC2_W,
        0,
        seven as u8,
        POP2,
        RETURN,
    ];
    b.method(
        ACC_PUBLIC,
        greet,
        void_descriptor,
        vec![(code_name, code_attribute(&code))],
    );
    b.build()
}
