//! Opcode decoding. Operands are typed `Reg8`/`Reg16`/`StackReg16`/`Condition`
//! values from `registers.rs` instead of raw bit offsets extracted inline.

use crate::registers::{Condition, Reg16, Reg8, StackReg16};

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    LdRR(Reg8, Reg8),
    LdRN(Reg8),
    LdANnPtr,
    LdNnPtrA,
    LdACPtr,
    LdCPtrA,

    LddAHlPtr,
    LddHlPtrA,
    LdiAHlPtr,
    LdiHlPtrA,

    LdhNPtrA,
    LdhANPtr,

    LdRrNn(Reg16),
    LdSpHl,
    LdhlSpN,
    LdNnPtrSp,

    Push(StackReg16),
    Pop(StackReg16),

    AddN(Reg8),
    AddNImm,
    AdcN(Reg8),
    AdcNImm,
    SubN(Reg8),
    SubNImm,
    SbcN(Reg8),
    SbcNImm,
    AndN(Reg8),
    AndNImm,
    OrN(Reg8),
    OrNImm,
    XorN(Reg8),
    XorNImm,
    CpN(Reg8),
    CpNImm,
    IncN(Reg8),
    DecN(Reg8),

    AddHlRr(Reg16),
    AddSpN,
    IncRr(Reg16),
    DecRr(Reg16),

    Daa,
    Cpl,
    Ccf,
    Scf,
    Nop,
    Halt,
    Stop,
    Di,
    Ei,

    Rlca,
    Rla,
    Rrca,
    Rra,
    PrefixCb,

    JpNn,
    JpCcNn(Condition),
    JpHlPtr,
    JrN,
    JrCcN(Condition),

    CallNn,
    CallCcNn(Condition),

    RstN(u8),
    Ret,
    RetCc(Condition),
    Reti,

    /// Opcode bytes with no defined behaviour: 0xD3, 0xDB, 0xDD, 0xE3, 0xE4,
    /// 0xEB..0xED, 0xF4, 0xFC, 0xFD.
    Undefined,
}

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CbOpcode {
    Rlc(Reg8),
    Rrc(Reg8),
    Rl(Reg8),
    Rr(Reg8),
    Sla(Reg8),
    Sra(Reg8),
    Swap(Reg8),
    Srl(Reg8),
    Bit(u8, Reg8),
    Res(u8, Reg8),
    Set(u8, Reg8),
}

pub fn decode(byte: u8) -> Opcode {
    match byte {
        0x40..=0x7F if byte != 0x76 => Opcode::LdRR(Reg8::from_bits(byte >> 3), Reg8::from_bits(byte)),
        0x76 => Opcode::Halt,
        0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => {
            Opcode::LdRN(Reg8::from_bits((byte - 0x06) / 8))
        }
        0x0A | 0x1A | 0xFA => Opcode::LdANnPtr,
        0x02 | 0x12 | 0xEA => Opcode::LdNnPtrA,
        0xF2 => Opcode::LdACPtr,
        0xE2 => Opcode::LdCPtrA,

        0x3A => Opcode::LddAHlPtr,
        0x32 => Opcode::LddHlPtrA,
        0x2A => Opcode::LdiAHlPtr,
        0x22 => Opcode::LdiHlPtrA,

        0xE0 => Opcode::LdhNPtrA,
        0xF0 => Opcode::LdhANPtr,

        0x01 | 0x11 | 0x21 | 0x31 => Opcode::LdRrNn(Reg16::from_bits(byte >> 4)),

        0xF9 => Opcode::LdSpHl,
        0xF8 => Opcode::LdhlSpN,
        0x08 => Opcode::LdNnPtrSp,

        0xF5 | 0xC5 | 0xD5 | 0xE5 => Opcode::Push(StackReg16::from_bits(byte >> 4)),
        0xF1 | 0xC1 | 0xD1 | 0xE1 => Opcode::Pop(StackReg16::from_bits(byte >> 4)),

        0x80..=0x87 => Opcode::AddN(Reg8::from_bits(byte)),
        0xC6 => Opcode::AddNImm,
        0x88..=0x8F => Opcode::AdcN(Reg8::from_bits(byte)),
        0xCE => Opcode::AdcNImm,
        0x90..=0x97 => Opcode::SubN(Reg8::from_bits(byte)),
        0xD6 => Opcode::SubNImm,
        0x98..=0x9F => Opcode::SbcN(Reg8::from_bits(byte)),
        0xDE => Opcode::SbcNImm,
        0xA0..=0xA7 => Opcode::AndN(Reg8::from_bits(byte)),
        0xE6 => Opcode::AndNImm,
        0xA8..=0xAF => Opcode::XorN(Reg8::from_bits(byte)),
        0xEE => Opcode::XorNImm,
        0xB0..=0xB7 => Opcode::OrN(Reg8::from_bits(byte)),
        0xF6 => Opcode::OrNImm,
        0xB8..=0xBF => Opcode::CpN(Reg8::from_bits(byte)),
        0xFE => Opcode::CpNImm,
        0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => {
            Opcode::IncN(Reg8::from_bits((byte - 0x04) / 8))
        }
        0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => {
            Opcode::DecN(Reg8::from_bits((byte - 0x04) / 8))
        }

        0x09 | 0x19 | 0x29 | 0x39 => Opcode::AddHlRr(Reg16::from_bits(byte >> 4)),
        0xE8 => Opcode::AddSpN,
        0x03 | 0x13 | 0x23 | 0x33 => Opcode::IncRr(Reg16::from_bits(byte >> 4)),
        0x0B | 0x1B | 0x2B | 0x3B => Opcode::DecRr(Reg16::from_bits(byte >> 4)),

        0x27 => Opcode::Daa,
        0x2F => Opcode::Cpl,
        0x3F => Opcode::Ccf,
        0x37 => Opcode::Scf,
        0x00 => Opcode::Nop,
        0x10 => Opcode::Stop,
        0xF3 => Opcode::Di,
        0xFB => Opcode::Ei,

        0x07 => Opcode::Rlca,
        0x17 => Opcode::Rla,
        0x0F => Opcode::Rrca,
        0x1F => Opcode::Rra,

        0xCB => Opcode::PrefixCb,

        0xC3 => Opcode::JpNn,
        0xC2 | 0xCA | 0xD2 | 0xDA => Opcode::JpCcNn(Condition::from_bits((byte - 0xC2) / 8)),
        0xE9 => Opcode::JpHlPtr,
        0x18 => Opcode::JrN,
        0x20 | 0x28 | 0x30 | 0x38 => Opcode::JrCcN(Condition::from_bits((byte - 0x20) / 8)),
        0xCD => Opcode::CallNn,
        0xC4 | 0xCC | 0xD4 | 0xDC => Opcode::CallCcNn(Condition::from_bits((byte - 0xC4) / 8)),
        0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => Opcode::RstN(byte - 0xC7),
        0xC9 => Opcode::Ret,
        0xC0 | 0xC8 | 0xD0 | 0xD8 => Opcode::RetCc(Condition::from_bits((byte - 0xC0) / 8)),
        0xD9 => Opcode::Reti,

        _ => Opcode::Undefined,
    }
}

pub fn decode_cb(byte: u8) -> CbOpcode {
    let reg = Reg8::from_bits(byte);
    match byte {
        0x00..=0x07 => CbOpcode::Rlc(reg),
        0x08..=0x0F => CbOpcode::Rrc(reg),
        0x10..=0x17 => CbOpcode::Rl(reg),
        0x18..=0x1F => CbOpcode::Rr(reg),
        0x20..=0x27 => CbOpcode::Sla(reg),
        0x28..=0x2F => CbOpcode::Sra(reg),
        0x30..=0x37 => CbOpcode::Swap(reg),
        0x38..=0x3F => CbOpcode::Srl(reg),
        0x40..=0x7F => CbOpcode::Bit((byte - 0x40) / 8, reg),
        0x80..=0xBF => CbOpcode::Res((byte - 0x80) / 8, reg),
        0xC0..=0xFF => CbOpcode::Set((byte - 0xC0) / 8, reg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nop_decodes() {
        assert_eq!(decode(0x00), Opcode::Nop);
    }

    #[test]
    fn ld_r_r_skips_the_halt_slot() {
        assert_eq!(decode(0x76), Opcode::Halt);
        assert_eq!(decode(0x7F), Opcode::LdRR(Reg8::A, Reg8::A));
        assert_eq!(decode(0x40), Opcode::LdRR(Reg8::B, Reg8::B));
    }

    #[test]
    fn undefined_opcodes_are_tagged() {
        for byte in [0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD] {
            assert_eq!(decode(byte), Opcode::Undefined, "{byte:#x}");
        }
    }

    #[test]
    fn cb_bit_decodes_register_and_bit_index() {
        assert_eq!(decode_cb(0x7C), CbOpcode::Bit(7, Reg8::H));
    }
}
