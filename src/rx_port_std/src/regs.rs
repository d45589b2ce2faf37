//! The simulated register file
use rx_support::{
    icu::IcuDescriptor,
    sci::{
        sci_regs::{MDDR_OFFSET, RDR_OFFSET, SSR_OFFSET, TDR_OFFSET},
        SciDescriptor,
    },
};
use std::collections::HashMap;

/// The size of an SCI register block.
const SCI_BLOCK_LEN: usize = 0x20;

pub(crate) const SSR_TEND: u8 = 1 << 2;
pub(crate) const SSR_PER: u8 = 1 << 3;
pub(crate) const SSR_FER: u8 = 1 << 4;
pub(crate) const SSR_ORER: u8 = 1 << 5;
pub(crate) const SSR_RDRF: u8 = 1 << 6;
pub(crate) const SSR_TDRE: u8 = 1 << 7;
pub(crate) const SSR_ERRORS: u8 = SSR_PER | SSR_FER | SSR_ORER;

pub(crate) const SCR_TEIE: u8 = 1 << 2;
pub(crate) const SCR_RE: u8 = 1 << 4;
pub(crate) const SCR_TE: u8 = 1 << 5;
pub(crate) const SCR_RIE: u8 = 1 << 6;
pub(crate) const SCR_TIE: u8 = 1 << 7;

/// The transmit side of an attached SCI channel.
pub(crate) struct Line {
    pub desc: &'static SciDescriptor,
    /// The byte written to TDR and not shifted out yet
    pub shifting: Option<u8>,
    /// Everything shifted out so far
    pub wire: Vec<u8>,
}

/// Register contents plus the state of the peripheral models. Unwritten
/// registers read as zero.
pub(crate) struct RegisterFile {
    icu: &'static IcuDescriptor,
    cells: HashMap<usize, u8>,
    pub lines: Vec<Line>,
}

impl RegisterFile {
    pub fn new(icu: &'static IcuDescriptor) -> Self {
        Self {
            icu,
            cells: HashMap::new(),
            lines: Vec::new(),
        }
    }

    /// Add an SCI channel model in its reset state.
    pub fn attach(&mut self, desc: &'static SciDescriptor) {
        if self.lines.iter().any(|l| l.desc.base == desc.base) {
            return;
        }
        self.poke(desc.base + SSR_OFFSET, SSR_TDRE | SSR_TEND);
        self.poke(desc.base + MDDR_OFFSET, 0xff);
        self.lines.push(Line {
            desc,
            shifting: None,
            wire: Vec::new(),
        });
    }

    /// Read a byte without side effects.
    pub fn peek(&self, addr: usize) -> u8 {
        self.cells.get(&addr).copied().unwrap_or(0)
    }

    /// Write a byte without side effects.
    pub fn poke(&mut self, addr: usize, value: u8) {
        self.cells.insert(addr, value);
    }

    pub fn peek32(&self, addr: usize) -> u32 {
        u32::from_le_bytes([0, 1, 2, 3].map(|i| self.peek(addr + i)))
    }

    pub fn poke32(&mut self, addr: usize, value: u32) {
        for (i, byte) in value.to_le_bytes().into_iter().enumerate() {
            self.poke(addr + i, byte);
        }
    }

    /// Find the line whose register block contains `addr`.
    fn line_at(&self, addr: usize) -> Option<(usize, usize)> {
        self.lines.iter().enumerate().find_map(|(i, line)| {
            let offset = addr.checked_sub(line.desc.base)?;
            (offset < SCI_BLOCK_LEN).then_some((i, offset))
        })
    }

    pub fn read8(&mut self, addr: usize) -> u8 {
        let value = self.peek(addr);

        if let Some((i, RDR_OFFSET)) = self.line_at(addr) {
            let ssr = self.lines[i].desc.base + SSR_OFFSET;
            self.poke(ssr, self.peek(ssr) & !SSR_RDRF);
        }

        value
    }

    pub fn write8(&mut self, addr: usize, value: u8) {
        match self.line_at(addr) {
            Some((i, TDR_OFFSET)) => {
                let ssr = self.lines[i].desc.base + SSR_OFFSET;
                if self.lines[i].shifting.is_some() {
                    log::warn!("{addr:#x}: TDR overwritten before it was shifted out");
                }
                self.lines[i].shifting = Some(value);
                self.poke(ssr, self.peek(ssr) & !(SSR_TDRE | SSR_TEND));
                self.poke(addr, value);
            }
            Some((_, SSR_OFFSET)) => {
                // Error flags can only be cleared, the rest is read-only
                let old = self.peek(addr);
                self.poke(addr, (old & !SSR_ERRORS) | (old & value & SSR_ERRORS));
            }
            _ => self.poke(addr, value),
        }
    }

    pub fn write32(&mut self, addr: usize, value: u32) {
        // Writing ones to a group clear register clears the flags
        if let Some(group) = self.icu.groups.iter().find(|g| g.gcr == Some(addr)) {
            let grp = self.peek32(group.grp);
            self.poke32(group.grp, grp & !value);
            return;
        }

        self.poke32(addr, value);
    }
}
