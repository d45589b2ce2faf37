//! RX63T
//!
//! The SCI channels of this chip can only be driven by interrupts.
use super::peripheral;
use crate::{
    icu::{IcuDescriptor, Peripheral, Vector},
    sci::{IntSource, SciDescriptor, TxPolicy},
};

/// Vector numbers
pub mod vector {
    use crate::icu::Vector;

    pub const CMI0: Vector = Vector(28);
    pub const CMI1: Vector = Vector(29);
    pub const CMI2: Vector = Vector(30);
    pub const CMI3: Vector = Vector(31);
    pub const IRQ0: Vector = Vector(64);
    pub const IRQ1: Vector = Vector(65);
    pub const IRQ2: Vector = Vector(66);
    pub const IRQ3: Vector = Vector(67);
    pub const IRQ4: Vector = Vector(68);
    pub const IRQ5: Vector = Vector(69);
    pub const IRQ6: Vector = Vector(70);
    pub const IRQ7: Vector = Vector(71);
    pub const ERI0: Vector = Vector(214);
    pub const RXI0: Vector = Vector(215);
    pub const TXI0: Vector = Vector(216);
    pub const TEI0: Vector = Vector(217);
    pub const ERI1: Vector = Vector(218);
    pub const RXI1: Vector = Vector(219);
    pub const TXI1: Vector = Vector(220);
    pub const TEI1: Vector = Vector(221);
}

pub static ICU: IcuDescriptor = IcuDescriptor {
    name: "RX63T",
    vectors: &[],
    peripherals: &[
        peripheral!(CMT0, [CMI0], [28]),
        peripheral!(CMT1, [CMI1], [29]),
        peripheral!(CMT2, [CMI2], [30]),
        peripheral!(CMT3, [CMI3], [31]),
        peripheral!(SCI0, [RXI0, TEI0], [214]),
        peripheral!(SCI1, [RXI1, TEI1], [218]),
        peripheral!(IRQ0, [IRQ0], [64], true),
        peripheral!(IRQ1, [IRQ1], [65], true),
        peripheral!(IRQ2, [IRQ2], [66], true),
        peripheral!(IRQ3, [IRQ3], [67], true),
        peripheral!(IRQ4, [IRQ4], [68], true),
        peripheral!(IRQ5, [IRQ5], [69], true),
        peripheral!(IRQ6, [IRQ6], [70], true),
        peripheral!(IRQ7, [IRQ7], [71], true),
    ],
    groups: &[],
    dmac: &[],
};

const fn sci(
    peripheral: Peripheral,
    base: usize,
    rxi: Vector,
    txi: Vector,
    tei: Vector,
) -> SciDescriptor {
    SciDescriptor {
        peripheral,
        base,
        rxi,
        txi,
        tei: IntSource::Vector(tei),
        tx_policy: TxPolicy::TransmitEnd,
        polling_supported: false,
    }
}

pub const SCI0: SciDescriptor = sci(
    Peripheral::SCI0,
    0x0008_a000,
    vector::RXI0,
    vector::TXI0,
    vector::TEI0,
);
pub const SCI1: SciDescriptor = sci(
    Peripheral::SCI1,
    0x0008_a020,
    vector::RXI1,
    vector::TXI1,
    vector::TEI1,
);
