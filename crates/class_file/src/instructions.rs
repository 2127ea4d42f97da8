// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-6.html

use byteorder::{BigEndian, ByteOrder};

use crate::ScanError;

pub const LDC: u8 = 0x12;
pub const LDC_W: u8 = 0x13;
pub const LDC2_W: u8 = 0x14;
pub const IINC: u8 = 0x84;
pub const TABLESWITCH: u8 = 0xaa;
pub const LOOKUPSWITCH: u8 = 0xab;
pub const WIDE: u8 = 0xc4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operands {
    Fixed(u8),
    TableSwitch,
    LookupSwitch,
    Wide,
    Undefined,
}

const fn operands_of(opcode: u8) -> Operands {
    match opcode {
        // constants, nop
        0x00..=0x0f => Operands::Fixed(0),
        // bipush
        0x10 => Operands::Fixed(1),
        // sipush
        0x11 => Operands::Fixed(2),
        LDC => Operands::Fixed(1),
        LDC_W | LDC2_W => Operands::Fixed(2),
        // iload, lload, fload, dload, aload
        0x15..=0x19 => Operands::Fixed(1),
        // xload_n, array loads
        0x1a..=0x35 => Operands::Fixed(0),
        // istore, lstore, fstore, dstore, astore
        0x36..=0x3a => Operands::Fixed(1),
        // xstore_n, array stores, stack, arithmetic
        0x3b..=0x83 => Operands::Fixed(0),
        IINC => Operands::Fixed(2),
        // conversions, comparisons
        0x85..=0x98 => Operands::Fixed(0),
        // if<cond>, if_icmp<cond>, if_acmp<cond>, goto, jsr
        0x99..=0xa8 => Operands::Fixed(2),
        // ret
        0xa9 => Operands::Fixed(1),
        TABLESWITCH => Operands::TableSwitch,
        LOOKUPSWITCH => Operands::LookupSwitch,
        // returns
        0xac..=0xb1 => Operands::Fixed(0),
        // field access, invokevirtual, invokespecial, invokestatic
        0xb2..=0xb8 => Operands::Fixed(2),
        // invokeinterface, invokedynamic
        0xb9 | 0xba => Operands::Fixed(4),
        // new
        0xbb => Operands::Fixed(2),
        // newarray
        0xbc => Operands::Fixed(1),
        // anewarray
        0xbd => Operands::Fixed(2),
        // arraylength, athrow
        0xbe | 0xbf => Operands::Fixed(0),
        // checkcast, instanceof
        0xc0 | 0xc1 => Operands::Fixed(2),
        // monitorenter, monitorexit
        0xc2 | 0xc3 => Operands::Fixed(0),
        WIDE => Operands::Wide,
        // multianewarray
        0xc5 => Operands::Fixed(3),
        // ifnull, ifnonnull
        0xc6 | 0xc7 => Operands::Fixed(2),
        // goto_w, jsr_w
        0xc8 | 0xc9 => Operands::Fixed(4),
        // breakpoint, impdep1, impdep2 (reserved)
        0xca | 0xfe | 0xff => Operands::Fixed(0),
        _ => Operands::Undefined,
    }
}

const fn operand_table() -> [Operands; 256] {
    let mut table = [Operands::Undefined; 256];
    let mut opcode = 0;
    while opcode < 256 {
        table[opcode] = operands_of(opcode as u8);
        opcode += 1;
    }
    table
}

static OPERANDS: [Operands; 256] = operand_table();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LdcKind {
    Ldc,
    LdcW,
    Ldc2W,
}
impl LdcKind {
    pub fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            LDC => Some(LdcKind::Ldc),
            LDC_W => Some(LdcKind::LdcW),
            LDC2_W => Some(LdcKind::Ldc2W),
            _ => None,
        }
    }

    /// `ldc2_w` only ever loads a `Long` or a `Double`.
    pub fn may_load_string(self) -> bool {
        !matches!(self, LdcKind::Ldc2W)
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            LdcKind::Ldc => "ldc",
            LdcKind::LdcW => "ldc_w",
            LdcKind::Ldc2W => "ldc2_w",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LdcSite {
    pub kind: LdcKind,
    pub index: u16,
    pub pc: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'a> {
    pub pc: usize,
    pub opcode: u8,
    pub operands: &'a [u8],
}
impl Instruction<'_> {
    pub fn len(&self) -> usize {
        1 + self.operands.len()
    }

    pub fn is_defined(&self) -> bool {
        OPERANDS[self.opcode as usize] != Operands::Undefined
    }

    pub fn ldc_site(&self) -> Option<LdcSite> {
        let kind = LdcKind::from_opcode(self.opcode)?;
        let index = match kind {
            LdcKind::Ldc => self.operands[0] as u16,
            LdcKind::LdcW | LdcKind::Ldc2W => BigEndian::read_u16(self.operands),
        };
        Some(LdcSite {
            kind,
            index,
            pc: self.pc,
        })
    }
}

/// Walks a code array one instruction at a time.
///
/// Opcodes outside the instruction set are yielded with no operands. The
/// iterator ends after the first error.
pub struct Instructions<'a> {
    code: &'a [u8],
    pc: usize,
    failed: bool,
}
impl<'a> Instructions<'a> {
    pub fn new(code: &'a [u8]) -> Self {
        Self {
            code,
            pc: 0,
            failed: false,
        }
    }

    fn operand_len(&self, pc: usize, opcode: u8) -> Result<usize, ScanError> {
        let available = self.code.len() - pc - 1;
        let truncated = |needed: usize| ScanError::Truncated {
            pc,
            opcode,
            needed,
            available,
        };

        let needed = match OPERANDS[opcode as usize] {
            Operands::Fixed(n) => n as usize,
            Operands::Undefined => 0,
            Operands::Wide => {
                let Some(&modified) = self.code.get(pc + 1) else {
                    return Err(truncated(1));
                };
                // wide iinc carries a 16-bit index and a 16-bit constant
                if modified == IINC {
                    5
                } else {
                    3
                }
            }
            Operands::TableSwitch => {
                let padding = switch_padding(pc);
                let header = padding + 12;
                if header > available {
                    return Err(truncated(header));
                }
                let low = self.read_i32(pc + 1 + padding + 4);
                let high = self.read_i32(pc + 1 + padding + 8);
                if high < low {
                    return Err(ScanError::InvalidTableSwitch { pc, low, high });
                }
                let offsets = (high as i64 - low as i64 + 1) as usize;
                header + offsets * 4
            }
            Operands::LookupSwitch => {
                let padding = switch_padding(pc);
                let header = padding + 8;
                if header > available {
                    return Err(truncated(header));
                }
                let npairs = self.read_i32(pc + 1 + padding + 4);
                if npairs < 0 {
                    return Err(ScanError::InvalidLookupSwitch { pc, npairs });
                }
                header + npairs as usize * 8
            }
        };

        if needed > available {
            return Err(truncated(needed));
        }
        Ok(needed)
    }

    fn read_i32(&self, at: usize) -> i32 {
        BigEndian::read_i32(&self.code[at..at + 4])
    }
}
impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction<'a>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pc >= self.code.len() {
            return None;
        }

        let pc = self.pc;
        let opcode = self.code[pc];
        match self.operand_len(pc, opcode) {
            Ok(len) => {
                self.pc = pc + 1 + len;
                Some(Ok(Instruction {
                    pc,
                    opcode,
                    operands: &self.code[pc + 1..pc + 1 + len],
                }))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Switch operands start on the next multiple of four from the code start.
fn switch_padding(pc: usize) -> usize {
    (4 - (pc + 1) % 4) % 4
}

/// What one pass over a code array found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    pub ldc_sites: Vec<LdcSite>,
    pub instruction_count: usize,
    pub undefined_opcodes: usize,
    /// Where the scan pointer stopped.
    pub end_pc: usize,
}

pub fn scan(code: &[u8]) -> Result<Scan, ScanError> {
    let mut scan = Scan::default();
    for instruction in Instructions::new(code) {
        let instruction = instruction?;
        if !instruction.is_defined() {
            log::debug!(
                "Undefined opcode 0x{:02X} at pc {}",
                instruction.opcode,
                instruction.pc
            );
            scan.undefined_opcodes += 1;
        }
        if let Some(site) = instruction.ldc_site() {
            scan.ldc_sites.push(site);
        }
        scan.instruction_count += 1;
        scan.end_pc = instruction.pc + instruction.len();
    }
    Ok(scan)
}
