use crate::{
    constant_pool::CpInfo,
    cursor::Reader,
    instructions::{self, LdcSite, Scan},
    Attribute, ClassFileError, Result, ScanError,
};

use super::{parser::Parser, ConstantPool};

#[derive(Debug, Clone, Default)]
pub struct Attributes(pub Vec<Attribute>);
impl Attributes {
    pub fn find_by_name(&self, name: &str, constant_pool: &ConstantPool) -> Option<&Attribute> {
        for a in &self.0 {
            let Some(CpInfo::Utf8(s)) = constant_pool.get(a.attribute_name_index) else {
                continue;
            };

            if s == name {
                return Some(a);
            }
        }

        None
    }

    /// Decodes the `Code` attribute, if there is one.
    pub fn code_attribute(&self, constant_pool: &ConstantPool) -> Result<Option<CodeAttribute>> {
        let Some(attribute) = self.find_by_name("Code", constant_pool) else {
            return Ok(None);
        };
        Parser::new(&attribute.info).parse_code_attribute().map(Some)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: u16,
}

#[derive(Debug, Clone)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Attributes,
}
impl CodeAttribute {
    pub fn scan(&self) -> std::result::Result<Scan, ScanError> {
        instructions::scan(&self.code)
    }

    pub fn ldc_sites(&self) -> std::result::Result<Vec<LdcSite>, ScanError> {
        Ok(self.scan()?.ldc_sites)
    }
}

impl Attribute {
    /// Utf8 entries this attribute refers to, its own name first.
    ///
    /// Names, descriptors, signatures and annotation values are decoded for
    /// the attributes that carry them, recursing into `Code` and `Record`.
    /// Any other attribute contributes only its name.
    pub fn utf8_references(&self, constant_pool: &ConstantPool) -> Result<Vec<u16>> {
        let mut refs = Utf8References {
            constant_pool,
            indices: vec![],
        };
        refs.attribute(self.attribute_name_index, &self.info)?;
        Ok(refs.indices)
    }
}

struct Utf8References<'p> {
    constant_pool: &'p ConstantPool,
    indices: Vec<u16>,
}
impl Utf8References<'_> {
    fn attribute(&mut self, name_index: u16, info: &[u8]) -> Result<()> {
        self.indices.push(name_index);
        let constant_pool = self.constant_pool;
        let name = constant_pool.utf8(name_index).unwrap_or("");
        let r = &mut Reader::new(info);

        match name {
            "SourceFile" | "Signature" => self.index(r)?,
            "InnerClasses" => {
                for _ in 0..r.read_u2()? {
                    // inner and outer class_info, then the simple name
                    r.read_bytes(4)?;
                    self.index(r)?;
                    r.read_u2()?;
                }
            }
            "LocalVariableTable" | "LocalVariableTypeTable" => {
                for _ in 0..r.read_u2()? {
                    r.read_bytes(4)?;
                    self.index(r)?;
                    self.index(r)?;
                    r.read_u2()?;
                }
            }
            "MethodParameters" => {
                for _ in 0..r.read_u1()? {
                    self.index(r)?;
                    r.read_u2()?;
                }
            }
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                for _ in 0..r.read_u2()? {
                    self.annotation(r)?;
                }
            }
            "RuntimeVisibleParameterAnnotations" | "RuntimeInvisibleParameterAnnotations" => {
                for _ in 0..r.read_u1()? {
                    for _ in 0..r.read_u2()? {
                        self.annotation(r)?;
                    }
                }
            }
            "RuntimeVisibleTypeAnnotations" | "RuntimeInvisibleTypeAnnotations" => {
                for _ in 0..r.read_u2()? {
                    self.type_annotation(r)?;
                }
            }
            "AnnotationDefault" => self.element_value(r)?,
            "Record" => {
                for _ in 0..r.read_u2()? {
                    self.index(r)?;
                    self.index(r)?;
                    self.nested_attributes(r)?;
                }
            }
            "Code" => {
                let code = Parser::new(info).parse_code_attribute()?;
                for a in &code.attributes {
                    self.attribute(a.attribute_name_index, &a.info)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn nested_attributes(&mut self, r: &mut Reader) -> Result<()> {
        for _ in 0..r.read_u2()? {
            let name_index = r.read_u2()?;
            let length = r.read_u4()?;
            let info = r.read_bytes(length as usize)?;
            self.attribute(name_index, info)?;
        }
        Ok(())
    }

    fn index(&mut self, r: &mut Reader) -> Result<()> {
        let index = r.read_u2()?;
        // zero marks an absent name, e.g. an anonymous inner class
        if index != 0 {
            self.indices.push(index);
        }
        Ok(())
    }

    fn annotation(&mut self, r: &mut Reader) -> Result<()> {
        self.index(r)?;
        for _ in 0..r.read_u2()? {
            self.index(r)?;
            self.element_value(r)?;
        }
        Ok(())
    }

    fn element_value(&mut self, r: &mut Reader) -> Result<()> {
        match r.read_u1()? as char {
            's' | 'c' => self.index(r)?,
            'B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z' => {
                r.read_u2()?;
            }
            'e' => {
                self.index(r)?;
                self.index(r)?;
            }
            '@' => self.annotation(r)?,
            '[' => {
                for _ in 0..r.read_u2()? {
                    self.element_value(r)?;
                }
            }
            tag => return Err(ClassFileError::InvalidElementValueTag(tag)),
        }
        Ok(())
    }

    fn type_annotation(&mut self, r: &mut Reader) -> Result<()> {
        let target_info = match r.read_u1()? {
            0x00 | 0x01 | 0x16 => 1,
            0x10 | 0x11 | 0x12 | 0x17 | 0x42..=0x46 => 2,
            0x13..=0x15 => 0,
            0x40 | 0x41 => r.read_u2()? as usize * 6,
            0x47..=0x4b => 3,
            target => return Err(ClassFileError::InvalidTypeAnnotationTarget(target)),
        };
        r.read_bytes(target_info)?;
        let path_length = r.read_u1()?;
        r.read_bytes(path_length as usize * 2)?;
        self.annotation(r)
    }
}
