use thiserror::Error;

use crate::constant_pool;

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Expected {0}, found {1:?}")]
    UnexpectedConstantPoolEntry(&'static str, constant_pool::CpInfo),
    #[error("Invalid magic identifier: 0x{0:X}")]
    InvalidMagicIdentifier(u32),
    #[error("Invalid cp info tag {tag} at constant pool index {index}")]
    InvalidCpInfoTag { tag: u8, index: u16 },
    #[error("Invalid constant pool count: {0}")]
    InvalidConstantPoolCount(u16),
    #[error("8-byte constant at index {0} has no room for its second slot")]
    DoubleSlotOverflow(u16),
    #[error("Invalid constant pool index: {0}")]
    InvalidConstantPoolIndex(u16),
    #[error("Out of bounds read at offset {offset}: requested {requested} bytes, {remaining} remaining")]
    OutOfBounds {
        offset: usize,
        requested: usize,
        remaining: usize,
    },
    #[error("{0} unexpected bytes after the end of the class file")]
    TrailingBytes(usize),
    #[error("Invalid annotation element value tag {0:?}")]
    InvalidElementValueTag(char),
    #[error("Invalid type annotation target 0x{0:02X}")]
    InvalidTypeAnnotationTarget(u8),
    #[error("Modified UTF-8 encoding is {0} bytes long, the limit is 65535")]
    Utf8TooLong(usize),
}

/// Failure while walking the instructions of a `Code` attribute.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScanError {
    #[error("Opcode 0x{opcode:02X} at pc {pc} needs {needed} operand bytes, {available} left")]
    Truncated {
        pc: usize,
        opcode: u8,
        needed: usize,
        available: usize,
    },
    #[error("Invalid tableswitch range {low}..={high} at pc {pc}")]
    InvalidTableSwitch { pc: usize, low: i32, high: i32 },
    #[error("Invalid lookupswitch pair count {npairs} at pc {pc}")]
    InvalidLookupSwitch { pc: usize, npairs: i32 },
}
