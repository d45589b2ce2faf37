//! ICU register map shared by the RX600 and RX200 series
#![allow(non_snake_case)]
use tock_registers::register_bitfields;

use super::Vector;
use crate::bus::{Reg32, Reg8};

/// Interrupt Request Registers (`IRn`), one per vector
pub const IR_BASE: usize = 0x0008_7000;
/// Interrupt Request Enable Registers (`IERm`), one bit per vector
pub const IER_BASE: usize = 0x0008_7200;
/// Interrupt Source Priority Registers (`IPRn`)
pub const IPR_BASE: usize = 0x0008_7300;
/// DMAC Activation Request Select Registers (`DMRSRm`), 4 bytes apart
pub const DMRSR_BASE: usize = 0x0008_7400;

#[inline]
pub const fn dmrsr_addr(channel: usize) -> usize {
    DMRSR_BASE + channel * 4
}

pub const GRPBE0: usize = 0x0008_7600;
pub const GRPBL0: usize = 0x0008_7630;
pub const GRPBL1: usize = 0x0008_7634;
pub const GENBE0: usize = 0x0008_7640;
pub const GENBL0: usize = 0x0008_7670;
pub const GENBL1: usize = 0x0008_7674;
pub const GCRBE0: usize = 0x0008_7680;
pub const GRPAL0: usize = 0x0008_7830;
pub const GRPAL1: usize = 0x0008_7834;
pub const GENAL0: usize = 0x0008_7870;
pub const GENAL1: usize = 0x0008_7874;

register_bitfields! {u8,
    pub IR [
        /// Interrupt Status Flag
        IR OFFSET(0) NUMBITS(1) []
    ],
    pub IPR [
        /// Interrupt Priority Level Select
        IPR OFFSET(0) NUMBITS(4) []
    ]
}

#[inline]
pub const fn ir(vector: Vector) -> Reg8<IR::Register> {
    Reg8::at(IR_BASE + vector.index())
}

/// Get the `IER` register holding `vector`'s enable bit and the bit's mask.
#[inline]
pub const fn ier(vector: Vector) -> (Reg8, u8) {
    (
        Reg8::at(IER_BASE + vector.index() / 8),
        1 << (vector.index() % 8),
    )
}

#[inline]
pub const fn ipr(index: u8) -> Reg8<IPR::Register> {
    Reg8::at(IPR_BASE + index as usize)
}

#[inline]
pub const fn group(addr: usize) -> Reg32 {
    Reg32::at(addr)
}
