use crate::{
    attributes::{Attributes, CodeAttribute, ExceptionTableEntry},
    class_file::{FieldInfo, MethodInfo},
    constant_pool::*,
    cursor::Reader,
};

use super::*;

pub const MAGIC: u32 = 0xCAFEBABE;

pub struct Parser<'a> {
    r: Reader<'a>,
}
impl<'a> Parser<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            r: Reader::new(buf),
        }
    }

    pub fn parse(&mut self) -> Result<ClassFile> {
        let _ = self.parse_magic_identifier()?;
        let (major_version, minor_version) = self.parse_version()?;

        let constant_pool = self.parse_constant_pool()?;
        let access_flags = AccessFlags::from_bits_retain(self.read_u16()?);
        let this_class = self.read_u16()?;
        let super_class = self.read_u16()?;
        let interfaces_count = self.read_u16()?;
        let interfaces = (0..interfaces_count)
            .map(|_| self.read_u16())
            .collect::<Result<Vec<_>>>()?;

        let fields_count = self.read_u16()?;
        let fields = (0..fields_count)
            .map(|_| self.parse_field_info())
            .collect::<Result<Vec<_>>>()?;

        let methods_count = self.read_u16()?;
        let methods = (0..methods_count)
            .map(|_| self.parse_method_info())
            .collect::<Result<Vec<_>>>()?;

        let attributes_count = self.read_u16()?;
        let attributes = self.parse_attributes(attributes_count)?;

        if !self.r.is_empty() {
            return Err(ClassFileError::TrailingBytes(self.r.remaining()));
        }

        Ok(ClassFile {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    fn parse_field_info(&mut self) -> Result<FieldInfo> {
        let start = self.r.position();
        let access_flags = AccessFlags::from_bits_retain(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes_count = self.read_u16()?;
        let attributes = self.parse_attributes(attributes_count)?;
        let raw = self.r.span(start, self.r.position()).to_vec();

        Ok(FieldInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
            raw,
        })
    }

    fn parse_method_info(&mut self) -> Result<MethodInfo> {
        let start = self.r.position();
        let access_flags = AccessFlags::from_bits_retain(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes_count = self.read_u16()?;
        let attributes = self.parse_attributes(attributes_count)?;
        let raw = self.r.span(start, self.r.position()).to_vec();

        Ok(MethodInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
            raw,
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<()> {
        match self.read_u32()? {
            MAGIC => Ok(()),
            magic_identifier => Err(ClassFileError::InvalidMagicIdentifier(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<(u16, u16)> {
        let minor = self.read_u16()?;
        let major = self.read_u16()?;
        Ok((major, minor))
    }

    fn parse_constant_pool(&mut self) -> Result<ConstantPool> {
        let constant_pool_count = self.read_u16()?;
        if constant_pool_count == 0 {
            return Err(ClassFileError::InvalidConstantPoolCount(0));
        }

        let mut res = Vec::with_capacity(constant_pool_count as usize - 1);
        let mut index = 1;
        while index < constant_pool_count {
            let cp_info = self.parse_cp_info(index)?;
            let slot_size = cp_info.slot_size() as u16;
            res.push(cp_info);
            if slot_size == 2 {
                // The index after an 8-byte constant must exist but is never used.
                if index + 1 >= constant_pool_count {
                    return Err(ClassFileError::DoubleSlotOverflow(index));
                }
                res.push(CpInfo::Unusable);
            }
            index += slot_size;
        }
        Ok(ConstantPool::new(res))
    }

    fn parse_cp_info(&mut self, index: u16) -> Result<CpInfo> {
        let tag = self.read_u8()?;
        let cp_info = match tag {
            CONSTANT_UTF8 => self.parse_utf8()?,
            CONSTANT_INTEGER => self.parse_integer()?,
            CONSTANT_FLOAT => self.parse_float()?,
            CONSTANT_LONG => CpInfo::Long(self.parse_wide()?),
            CONSTANT_DOUBLE => CpInfo::Double(self.parse_wide()?),
            CONSTANT_CLASS => self.parse_class_info()?,
            CONSTANT_STRING => self.parse_string()?,
            CONSTANT_FIELD_REF => CpInfo::FieldRef(self.parse_ref_info()?),
            CONSTANT_METHOD_REF => CpInfo::MethodRef(self.parse_ref_info()?),
            CONSTANT_INTERFACE_METHOD_REF => CpInfo::InterfaceMethodRef(self.parse_ref_info()?),
            CONSTANT_NAME_AND_TYPE => self.parse_name_and_type_info()?,
            CONSTANT_METHOD_HANDLE => self.parse_method_handle()?,
            CONSTANT_METHOD_TYPE => self.parse_method_type_info()?,
            CONSTANT_INVOKE_DYNAMIC => self.parse_invoke_dynamic_info()?,
            _ => return Err(ClassFileError::InvalidCpInfoTag { tag, index }),
        };

        Ok(cp_info)
    }

    fn parse_utf8(&mut self) -> Result<CpInfo> {
        let length = self.read_u16()?;
        let bytes = self.r.read_bytes(length as usize)?;

        Ok(CpInfo::Utf8(Utf8Info::from_bytes(bytes.to_vec())))
    }

    fn parse_integer(&mut self) -> Result<CpInfo> {
        let int = self.read_u32()? as i32;

        Ok(CpInfo::Integer(int))
    }

    fn parse_float(&mut self) -> Result<CpInfo> {
        Ok(CpInfo::Float(self.r.read_float()?))
    }

    fn parse_wide(&mut self) -> Result<WideInfo> {
        let high_bytes = self.read_u32()?;
        let low_bytes = self.read_u32()?;

        Ok(WideInfo {
            high_bytes,
            low_bytes,
        })
    }

    fn parse_class_info(&mut self) -> Result<CpInfo> {
        let name_index = self.read_u16()?;

        Ok(CpInfo::Class(ClassInfo { name_index }))
    }

    fn parse_string(&mut self) -> Result<CpInfo> {
        let string_index = self.read_u16()?;

        Ok(CpInfo::String { string_index })
    }

    fn parse_name_and_type_info(&mut self) -> Result<CpInfo> {
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;

        Ok(CpInfo::NameAndType(NameAndTypeInfo {
            name_index,
            descriptor_index,
        }))
    }

    fn parse_method_handle(&mut self) -> Result<CpInfo> {
        let reference_kind = self.read_u8()?;
        let reference_index = self.read_u16()?;

        Ok(CpInfo::MethodHandle(MethodHandleInfo {
            reference_kind,
            reference_index,
        }))
    }

    fn parse_method_type_info(&mut self) -> Result<CpInfo> {
        let descriptor_index = self.read_u16()?;

        Ok(CpInfo::MethodType(MethodTypeInfo { descriptor_index }))
    }

    fn parse_invoke_dynamic_info(&mut self) -> Result<CpInfo> {
        let bootstrap_method_attr_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(CpInfo::InvokeDynamic(InvokeDynamicInfo {
            bootstrap_method_attr_index,
            name_and_type_index,
        }))
    }

    fn parse_ref_info(&mut self) -> Result<RefInfo> {
        let class_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(RefInfo {
            class_index,
            name_and_type_index,
        })
    }

    fn parse_attribute(&mut self) -> Result<Attribute> {
        let attribute_name_index = self.read_u16()?;
        let attribute_length = self.read_u32()?;
        let info = self.r.read_bytes(attribute_length as usize)?.to_vec();

        Ok(Attribute {
            attribute_name_index,
            info,
        })
    }

    pub fn parse_code_attribute(&mut self) -> Result<CodeAttribute> {
        let max_stack = self.read_u16()?;
        let max_locals = self.read_u16()?;
        let code_length = self.read_u32()?;
        let code = self.r.read_bytes(code_length as usize)?.to_vec();
        let exception_table_length = self.read_u16()?;
        let exception_table = (0..exception_table_length)
            .map(|_| self.parse_exception_table_entry())
            .collect::<Result<Vec<_>>>()?;
        let attributes_count = self.read_u16()?;
        let attributes = self.parse_attributes(attributes_count)?;

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    fn parse_exception_table_entry(&mut self) -> Result<ExceptionTableEntry> {
        let start_pc = self.read_u16()?;
        let end_pc = self.read_u16()?;
        let handler_pc = self.read_u16()?;
        let catch_type = self.read_u16()?;

        Ok(ExceptionTableEntry {
            start_pc,
            end_pc,
            handler_pc,
            catch_type,
        })
    }

    fn parse_attributes(&mut self, attributes_count: u16) -> Result<Attributes> {
        (0..attributes_count)
            .map(|_| self.parse_attribute())
            .collect::<Result<Vec<_>>>()
            .map(Attributes)
    }

    fn read_u32(&mut self) -> Result<u32> {
        self.r.read_u4()
    }

    fn read_u16(&mut self) -> Result<u16> {
        self.r.read_u2()
    }

    fn read_u8(&mut self) -> Result<u8> {
        self.r.read_u1()
    }
}
