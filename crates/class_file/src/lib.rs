// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html

mod access_flags;
pub mod attributes;
mod class_file;
#[macro_use]
pub mod constant_pool;
pub mod cursor;
mod error;
pub mod instructions;
pub mod mutf8;
mod parser;
mod writer;

use std::fmt;

pub use self::class_file::{ClassFile, FieldInfo, MethodInfo};
pub use access_flags::AccessFlags;
pub use attributes::{Attributes, CodeAttribute};
pub use constant_pool::{ConstantPool, CpInfo};
pub use error::{ClassFileError, ScanError};
pub use instructions::{LdcKind, LdcSite};
pub use parser::Parser;
pub use writer::ClassWriter;

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;

#[derive(Clone, PartialEq, Eq)]
pub struct Attribute {
    pub attribute_name_index: u16,
    pub info: Vec<u8>,
}
impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("attribute_name_index", &self.attribute_name_index)
            .field("info", &format!("({} bytes)", self.info.len()))
            .finish()
    }
}
