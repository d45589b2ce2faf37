//! SCI register map (asynchronous mode)
#![allow(non_snake_case)]
use tock_registers::register_bitfields;

use crate::bus::Reg8;

register_bitfields! {u8,
    /// Serial Mode Register
    pub SMR [
        /// Clock Select
        CKS OFFSET(0) NUMBITS(2) [
            Pclk = 0,
            PclkDiv4 = 1,
            PclkDiv16 = 2,
            PclkDiv64 = 3
        ],
        /// Multi-Processor Mode
        MP OFFSET(2) NUMBITS(1) [],
        /// Stop Bit Length
        STOP OFFSET(3) NUMBITS(1) [
            One = 0,
            Two = 1
        ],
        /// Parity Mode
        PM OFFSET(4) NUMBITS(1) [
            Even = 0,
            Odd = 1
        ],
        /// Parity Enable
        PE OFFSET(5) NUMBITS(1) [],
        /// Character Length (`1` = 7 bits)
        CHR OFFSET(6) NUMBITS(1) [],
        /// Communication Mode (`1` = clock synchronous)
        CM OFFSET(7) NUMBITS(1) []
    ],

    /// Serial Control Register
    pub SCR [
        /// Clock Enable
        CKE OFFSET(0) NUMBITS(2) [],
        /// Transmit End Interrupt Enable
        TEIE OFFSET(2) NUMBITS(1) [],
        /// Multi-Processor Interrupt Enable
        MPIE OFFSET(3) NUMBITS(1) [],
        /// Receive Enable
        RE OFFSET(4) NUMBITS(1) [],
        /// Transmit Enable
        TE OFFSET(5) NUMBITS(1) [],
        /// Receive Interrupt Enable
        RIE OFFSET(6) NUMBITS(1) [],
        /// Transmit Interrupt Enable
        TIE OFFSET(7) NUMBITS(1) []
    ],

    /// Serial Status Register
    pub SSR [
        /// Multi-Processor Bit Transfer
        MPBT OFFSET(0) NUMBITS(1) [],
        /// Multi-Processor
        MPB OFFSET(1) NUMBITS(1) [],
        /// Transmit End Flag
        TEND OFFSET(2) NUMBITS(1) [],
        /// Parity Error Flag
        PER OFFSET(3) NUMBITS(1) [],
        /// Framing Error Flag
        FER OFFSET(4) NUMBITS(1) [],
        /// Overrun Error Flag
        ORER OFFSET(5) NUMBITS(1) [],
        /// Receive Data Full Flag
        RDRF OFFSET(6) NUMBITS(1) [],
        /// Transmit Data Empty Flag
        TDRE OFFSET(7) NUMBITS(1) []
    ],

    /// Serial Extended Mode Register
    pub SEMR [
        /// Asynchronous Mode Clock Source Select
        ACS0 OFFSET(0) NUMBITS(1) [],
        /// Bit Rate Modulation Enable
        BRME OFFSET(2) NUMBITS(1) [],
        /// Asynchronous Mode Base Clock Select (`1` = 8 cycles per bit)
        ABCS OFFSET(4) NUMBITS(1) [],
        /// Digital Noise Filter Function Enable
        NFEN OFFSET(5) NUMBITS(1) [],
        /// Baud Rate Generator Double-Speed Mode Select
        BGDM OFFSET(6) NUMBITS(1) [],
        /// Asynchronous Start Bit Edge Detection Select
        RXDESEL OFFSET(7) NUMBITS(1) []
    ]
}

pub const SMR_OFFSET: usize = 0x00;
pub const BRR_OFFSET: usize = 0x01;
pub const SCR_OFFSET: usize = 0x02;
pub const TDR_OFFSET: usize = 0x03;
pub const SSR_OFFSET: usize = 0x04;
pub const RDR_OFFSET: usize = 0x05;
pub const SEMR_OFFSET: usize = 0x07;
pub const MDDR_OFFSET: usize = 0x12;

/// The register block of one SCI channel.
#[derive(Debug, Clone, Copy)]
pub struct SciRegs {
    base: usize,
}

impl SciRegs {
    #[inline]
    pub const fn at(base: usize) -> Self {
        Self { base }
    }

    #[inline]
    pub const fn smr(self) -> Reg8<SMR::Register> {
        Reg8::at(self.base + SMR_OFFSET)
    }

    /// Bit Rate Register
    #[inline]
    pub const fn brr(self) -> Reg8 {
        Reg8::at(self.base + BRR_OFFSET)
    }

    #[inline]
    pub const fn scr(self) -> Reg8<SCR::Register> {
        Reg8::at(self.base + SCR_OFFSET)
    }

    /// Transmit Data Register
    #[inline]
    pub const fn tdr(self) -> Reg8 {
        Reg8::at(self.base + TDR_OFFSET)
    }

    #[inline]
    pub const fn ssr(self) -> Reg8<SSR::Register> {
        Reg8::at(self.base + SSR_OFFSET)
    }

    /// Receive Data Register
    #[inline]
    pub const fn rdr(self) -> Reg8 {
        Reg8::at(self.base + RDR_OFFSET)
    }

    #[inline]
    pub const fn semr(self) -> Reg8<SEMR::Register> {
        Reg8::at(self.base + SEMR_OFFSET)
    }

    /// Modulation Duty Register
    #[inline]
    pub const fn mddr(self) -> Reg8 {
        Reg8::at(self.base + MDDR_OFFSET)
    }
}
