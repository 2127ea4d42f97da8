use crate::{
    constant_pool::CpInfo, cursor::Writer, parser::MAGIC, Attribute, Attributes, ClassFile,
    ConstantPool, Result,
};

/// Serializes a [`ClassFile`] back into the class file format.
///
/// Fields and methods are copied from the spans they were parsed from, the
/// constant pool is written entry by entry.
pub struct ClassWriter<'a> {
    class_file: &'a ClassFile,
    w: Writer,
}
impl<'a> ClassWriter<'a> {
    pub fn new(class_file: &'a ClassFile) -> Self {
        Self {
            class_file,
            w: Writer::new(),
        }
    }

    pub fn write(mut self) -> Result<Vec<u8>> {
        let c = self.class_file;

        self.w.write_u4(MAGIC)?;
        self.w.write_u2(c.minor_version)?;
        self.w.write_u2(c.major_version)?;

        self.write_constant_pool(&c.constant_pool)?;

        self.w.write_u2(c.access_flags.bits())?;
        self.w.write_u2(c.this_class)?;
        self.w.write_u2(c.super_class)?;
        self.w.write_u2(c.interfaces.len() as u16)?;
        for interface in &c.interfaces {
            self.w.write_u2(*interface)?;
        }

        self.w.write_u2(c.fields.len() as u16)?;
        for field in &c.fields {
            self.w.write_bytes(&field.raw)?;
        }

        self.w.write_u2(c.methods.len() as u16)?;
        for method in &c.methods {
            self.w.write_bytes(&method.raw)?;
        }

        self.write_attributes(&c.attributes)?;

        Ok(self.w.into_inner())
    }

    fn write_constant_pool(&mut self, constant_pool: &ConstantPool) -> Result<()> {
        self.w.write_u2(constant_pool.count())?;
        for cp_info in constant_pool {
            self.write_cp_info(cp_info)?;
        }
        Ok(())
    }

    fn write_cp_info(&mut self, cp_info: &CpInfo) -> Result<()> {
        // The second slot of a Long or Double has no encoding of its own.
        let Some(tag) = cp_info.tag() else {
            return Ok(());
        };
        self.w.write_u1(tag)?;

        match cp_info {
            CpInfo::Utf8(utf8) => {
                self.w.write_u2(utf8.bytes().len() as u16)?;
                self.w.write_bytes(utf8.bytes())?;
            }
            CpInfo::Integer(int) => self.w.write_u4(*int as u32)?,
            CpInfo::Float(float) => self.w.write_float(*float)?,
            CpInfo::Long(wide) | CpInfo::Double(wide) => {
                self.w.write_u4(wide.high_bytes)?;
                self.w.write_u4(wide.low_bytes)?;
            }
            CpInfo::Class(class) => self.w.write_u2(class.name_index)?,
            CpInfo::String { string_index } => self.w.write_u2(*string_index)?,
            CpInfo::FieldRef(r) | CpInfo::MethodRef(r) | CpInfo::InterfaceMethodRef(r) => {
                self.w.write_u2(r.class_index)?;
                self.w.write_u2(r.name_and_type_index)?;
            }
            CpInfo::NameAndType(n) => {
                self.w.write_u2(n.name_index)?;
                self.w.write_u2(n.descriptor_index)?;
            }
            CpInfo::MethodHandle(h) => {
                self.w.write_u1(h.reference_kind)?;
                self.w.write_u2(h.reference_index)?;
            }
            CpInfo::MethodType(t) => self.w.write_u2(t.descriptor_index)?,
            CpInfo::InvokeDynamic(i) => {
                self.w.write_u2(i.bootstrap_method_attr_index)?;
                self.w.write_u2(i.name_and_type_index)?;
            }
            CpInfo::Unusable => {}
        }
        Ok(())
    }

    fn write_attributes(&mut self, attributes: &Attributes) -> Result<()> {
        self.w.write_u2(attributes.len() as u16)?;
        for attribute in attributes {
            self.write_attribute(attribute)?;
        }
        Ok(())
    }

    fn write_attribute(&mut self, attribute: &Attribute) -> Result<()> {
        self.w.write_u2(attribute.attribute_name_index)?;
        self.w.write_u4(attribute.info.len() as u32)?;
        self.w.write_bytes(&attribute.info)
    }
}
