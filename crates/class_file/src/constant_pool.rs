use std::ops::Index;

use crate::{mutf8, ClassFileError, Result};

pub const CONSTANT_UTF8: u8 = 1;
pub const CONSTANT_INTEGER: u8 = 3;
pub const CONSTANT_FLOAT: u8 = 4;
pub const CONSTANT_LONG: u8 = 5;
pub const CONSTANT_DOUBLE: u8 = 6;
pub const CONSTANT_CLASS: u8 = 7;
pub const CONSTANT_STRING: u8 = 8;
pub const CONSTANT_FIELD_REF: u8 = 9;
pub const CONSTANT_METHOD_REF: u8 = 10;
pub const CONSTANT_INTERFACE_METHOD_REF: u8 = 11;
pub const CONSTANT_NAME_AND_TYPE: u8 = 12;
pub const CONSTANT_METHOD_HANDLE: u8 = 15;
pub const CONSTANT_METHOD_TYPE: u8 = 16;
pub const CONSTANT_INVOKE_DYNAMIC: u8 = 18;

/// The constant pool without its unused zeroth slot.
///
/// Indices are the 1-based indices used throughout the class file. The slot
/// following a `Long` or `Double` holds [`CpInfo::Unusable`], which
/// [`ConstantPool::get`] never hands out.
#[derive(Debug, Default, Clone)]
pub struct ConstantPool {
    cp_infos: Vec<CpInfo>,
}
impl ConstantPool {
    pub fn new(cp_infos: Vec<CpInfo>) -> Self {
        Self { cp_infos }
    }

    /// The `constant_pool_count` item: one more than the highest index.
    pub fn count(&self) -> u16 {
        self.cp_infos.len() as u16 + 1
    }

    pub fn get(&self, index: u16) -> Option<&CpInfo> {
        let cp_info = self.cp_infos.get(index.checked_sub(1)? as usize)?;
        match cp_info {
            CpInfo::Unusable => None,
            cp_info => Some(cp_info),
        }
    }

    pub fn utf8(&self, index: u16) -> Option<&str> {
        match self.get(index)? {
            CpInfo::Utf8(utf8) => Some(utf8.text()),
            _ => None,
        }
    }

    /// Usable entries along with their indices.
    pub fn entries(&self) -> impl Iterator<Item = (u16, &CpInfo)> {
        self.cp_infos
            .iter()
            .enumerate()
            .filter(|(_, cp_info)| !matches!(cp_info, CpInfo::Unusable))
            .map(|(i, cp_info)| (i as u16 + 1, cp_info))
    }

    /// Replaces the text of the `Utf8` entry at `index`, re-encoding its bytes.
    pub fn set_utf8_text(&mut self, index: u16, text: &str) -> Result<()> {
        let cp_info = index
            .checked_sub(1)
            .and_then(|i| self.cp_infos.get_mut(i as usize))
            .ok_or(ClassFileError::InvalidConstantPoolIndex(index))?;

        match cp_info {
            CpInfo::Utf8(utf8) => utf8.set_text(text),
            CpInfo::Unusable => Err(ClassFileError::InvalidConstantPoolIndex(index)),
            c => Err(ClassFileError::UnexpectedConstantPoolEntry(
                "Utf8",
                c.clone(),
            )),
        }
    }
}
impl Index<u16> for ConstantPool {
    type Output = CpInfo;

    fn index(&self, index: u16) -> &Self::Output {
        &self.cp_infos[index as usize - 1]
    }
}
impl<'a> IntoIterator for &'a ConstantPool {
    type Item = &'a CpInfo;
    type IntoIter = std::slice::Iter<'a, CpInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.cp_infos.iter()
    }
}

#[macro_export]
macro_rules! matches_cp_info {
    ($cp:expr, $index:expr, $i:ident) => {{
        let index: u16 = $index;
        match $cp.get(index) {
            Some($crate::constant_pool::CpInfo::$i(ref n)) => Ok(n),
            Some(c) => Err($crate::ClassFileError::UnexpectedConstantPoolEntry(
                stringify!($i),
                c.clone(),
            )),
            None => Err($crate::ClassFileError::InvalidConstantPoolIndex(index)),
        }
    }};
}

#[derive(Debug, PartialEq, Clone)]
pub enum CpInfo {
    MethodRef(RefInfo),
    FieldRef(RefInfo),
    Float(f32),
    InterfaceMethodRef(RefInfo),
    Class(ClassInfo),
    NameAndType(NameAndTypeInfo),
    Utf8(Utf8Info),
    String { string_index: u16 },
    InvokeDynamic(InvokeDynamicInfo),
    Integer(i32),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    Long(WideInfo),
    Double(WideInfo),
    Unusable,
}
impl CpInfo {
    pub fn tag(&self) -> Option<u8> {
        let tag = match self {
            CpInfo::Utf8(_) => CONSTANT_UTF8,
            CpInfo::Integer(_) => CONSTANT_INTEGER,
            CpInfo::Float(_) => CONSTANT_FLOAT,
            CpInfo::Long(_) => CONSTANT_LONG,
            CpInfo::Double(_) => CONSTANT_DOUBLE,
            CpInfo::Class(_) => CONSTANT_CLASS,
            CpInfo::String { .. } => CONSTANT_STRING,
            CpInfo::FieldRef(_) => CONSTANT_FIELD_REF,
            CpInfo::MethodRef(_) => CONSTANT_METHOD_REF,
            CpInfo::InterfaceMethodRef(_) => CONSTANT_INTERFACE_METHOD_REF,
            CpInfo::NameAndType(_) => CONSTANT_NAME_AND_TYPE,
            CpInfo::MethodHandle(_) => CONSTANT_METHOD_HANDLE,
            CpInfo::MethodType(_) => CONSTANT_METHOD_TYPE,
            CpInfo::InvokeDynamic(_) => CONSTANT_INVOKE_DYNAMIC,
            CpInfo::Unusable => return None,
        };
        Some(tag)
    }

    /// Number of pool indices the entry occupies.
    pub fn slot_size(&self) -> usize {
        match self {
            CpInfo::Long(_) | CpInfo::Double(_) => 2,
            _ => 1,
        }
    }

    /// Constant pool indices this entry refers to.
    pub fn references(&self) -> Vec<u16> {
        match self {
            CpInfo::Class(ClassInfo { name_index }) => vec![*name_index],
            CpInfo::String { string_index } => vec![*string_index],
            CpInfo::FieldRef(r) | CpInfo::MethodRef(r) | CpInfo::InterfaceMethodRef(r) => {
                vec![r.class_index, r.name_and_type_index]
            }
            CpInfo::NameAndType(n) => vec![n.name_index, n.descriptor_index],
            CpInfo::MethodHandle(h) => vec![h.reference_index],
            CpInfo::MethodType(t) => vec![t.descriptor_index],
            // The bootstrap index points into the BootstrapMethods attribute.
            CpInfo::InvokeDynamic(i) => vec![i.name_and_type_index],
            CpInfo::Utf8(_)
            | CpInfo::Integer(_)
            | CpInfo::Float(_)
            | CpInfo::Long(_)
            | CpInfo::Double(_)
            | CpInfo::Unusable => vec![],
        }
    }
}

/// Text of a `CONSTANT_Utf8_info`, together with its encoded bytes.
///
/// The bytes are kept exactly as read so an untouched entry is written back
/// unchanged even when its decoding was lossy.
#[derive(Debug, PartialEq, Clone)]
pub struct Utf8Info {
    bytes: Vec<u8>,
    text: String,
}
impl Utf8Info {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let text = mutf8::decode(&bytes);
        Self { bytes, text }
    }

    pub fn new(text: &str) -> Result<Self> {
        let mut utf8 = Self {
            bytes: vec![],
            text: String::new(),
        };
        utf8.set_text(text)?;
        Ok(utf8)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn set_text(&mut self, text: &str) -> Result<()> {
        let bytes = mutf8::encode(text);
        if bytes.len() > u16::MAX as usize {
            return Err(ClassFileError::Utf8TooLong(bytes.len()));
        }
        self.bytes = bytes;
        self.text = text.to_owned();
        Ok(())
    }
}
impl PartialEq<str> for Utf8Info {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ClassInfo {
    // The value of the name_index item must be a valid index into the constant_pool table.
    // The constant_pool entry at that index must be a CONSTANT_Utf8_info structure (§4.4.7)
    // representing a valid binary class or interface name encoded in internal form (§4.2.1).
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct InvokeDynamicInfo {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodHandleInfo {
    pub reference_kind: u8,
    pub reference_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodTypeInfo {
    pub descriptor_index: u16,
}

/// The two halves of a `CONSTANT_Long_info` or `CONSTANT_Double_info`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct WideInfo {
    pub high_bytes: u32,
    pub low_bytes: u32,
}
impl WideInfo {
    fn bits(&self) -> u64 {
        (self.high_bytes as u64) << 32 | self.low_bytes as u64
    }

    pub fn as_long(&self) -> i64 {
        self.bits() as i64
    }

    pub fn as_double(&self) -> f64 {
        f64::from_bits(self.bits())
    }
}
