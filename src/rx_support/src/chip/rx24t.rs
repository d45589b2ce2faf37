//! RX24T
//!
//! This chip has no group interrupts and no DMAC. Some sources share one IPR
//! register, e.g., the four compare-match vectors of MTU0 (`MTU0_ABCD`).
use super::peripheral;
use crate::{
    icu::{IcuDescriptor, Peripheral, Vector, VectorDescriptor},
    sci::{IntSource, SciDescriptor, TxPolicy},
};

/// Vector numbers
pub mod vector {
    use crate::icu::Vector;

    pub const CMI0: Vector = Vector(28);
    pub const CMI1: Vector = Vector(29);
    pub const CMI2: Vector = Vector(30);
    pub const CMI3: Vector = Vector(31);
    pub const SPRI0: Vector = Vector(39);
    pub const SPTI0: Vector = Vector(40);
    pub const IRQ0: Vector = Vector(64);
    pub const IRQ1: Vector = Vector(65);
    pub const IRQ2: Vector = Vector(66);
    pub const IRQ3: Vector = Vector(67);
    pub const IRQ4: Vector = Vector(68);
    pub const IRQ5: Vector = Vector(69);
    pub const IRQ6: Vector = Vector(70);
    pub const IRQ7: Vector = Vector(71);
    pub const S12ADI: Vector = Vector(102);
    pub const GBADI: Vector = Vector(103);
    pub const GCADI: Vector = Vector(104);
    pub const S12ADI1: Vector = Vector(105);
    pub const GBADI1: Vector = Vector(106);
    pub const GCADI1: Vector = Vector(107);
    pub const S12ADI2: Vector = Vector(108);
    pub const GBADI2: Vector = Vector(109);
    pub const GCADI2: Vector = Vector(110);
    pub const TGIA0: Vector = Vector(114);
    pub const TGIB0: Vector = Vector(115);
    pub const TGIC0: Vector = Vector(116);
    pub const TGID0: Vector = Vector(117);
    pub const TCIV0: Vector = Vector(118);
    pub const TGIE0: Vector = Vector(119);
    pub const TGIF0: Vector = Vector(120);
    pub const TGIA1: Vector = Vector(121);
    pub const TGIB1: Vector = Vector(122);
    pub const TCIV1: Vector = Vector(123);
    pub const TCIU1: Vector = Vector(124);
    pub const TGIA2: Vector = Vector(125);
    pub const TGIB2: Vector = Vector(126);
    pub const TCIV2: Vector = Vector(127);
    pub const TCIU2: Vector = Vector(128);
    pub const ERI1: Vector = Vector(218);
    pub const RXI1: Vector = Vector(219);
    pub const TXI1: Vector = Vector(220);
    pub const TEI1: Vector = Vector(221);
    pub const ERI5: Vector = Vector(222);
    pub const RXI5: Vector = Vector(223);
    pub const TXI5: Vector = Vector(224);
    pub const TEI5: Vector = Vector(225);
    pub const ERI6: Vector = Vector(226);
    pub const RXI6: Vector = Vector(227);
    pub const TXI6: Vector = Vector(228);
    pub const TEI6: Vector = Vector(229);
    pub const RIIC_EEI0: Vector = Vector(246);
    pub const RIIC_RXI0: Vector = Vector(247);
    pub const RIIC_TXI0: Vector = Vector(248);
    pub const RIIC_TEI0: Vector = Vector(249);
}

/// IPR register indices shared by several vectors
pub mod ipr {
    pub const MTU0_ABCD: u8 = 114;
    pub const MTU0_VEF: u8 = 118;
    pub const MTU1_AB: u8 = 121;
    pub const MTU1_VU: u8 = 123;
    pub const MTU2_AB: u8 = 125;
    pub const MTU2_VU: u8 = 127;
    pub const SCI1: u8 = 218;
    pub const SCI5: u8 = 222;
    pub const SCI6: u8 = 226;
}

const fn shared(vector: Vector, ipr: u8) -> VectorDescriptor {
    VectorDescriptor { vector, ipr }
}

const fn own(vector: Vector) -> VectorDescriptor {
    VectorDescriptor {
        vector,
        ipr: vector.0,
    }
}

pub static ICU: IcuDescriptor = IcuDescriptor {
    name: "RX24T",
    vectors: &[
        own(vector::CMI0),
        own(vector::CMI1),
        own(vector::CMI2),
        own(vector::CMI3),
        shared(vector::TGIA0, ipr::MTU0_ABCD),
        shared(vector::TGIB0, ipr::MTU0_ABCD),
        shared(vector::TGIC0, ipr::MTU0_ABCD),
        shared(vector::TGID0, ipr::MTU0_ABCD),
        shared(vector::TCIV0, ipr::MTU0_VEF),
        shared(vector::TGIE0, ipr::MTU0_VEF),
        shared(vector::TGIF0, ipr::MTU0_VEF),
        shared(vector::TGIA1, ipr::MTU1_AB),
        shared(vector::TGIB1, ipr::MTU1_AB),
        shared(vector::TCIV1, ipr::MTU1_VU),
        shared(vector::TCIU1, ipr::MTU1_VU),
        shared(vector::TGIA2, ipr::MTU2_AB),
        shared(vector::TGIB2, ipr::MTU2_AB),
        shared(vector::TCIV2, ipr::MTU2_VU),
        shared(vector::TCIU2, ipr::MTU2_VU),
    ],
    peripherals: &[
        peripheral!(CMT0, [CMI0], [28]),
        peripheral!(CMT1, [CMI1], [29]),
        peripheral!(CMT2, [CMI2], [30]),
        peripheral!(CMT3, [CMI3], [31]),
        peripheral!(RSPI0, [SPRI0, SPTI0], [39, 40]),
        peripheral!(S12AD, [S12ADI, GBADI, GCADI], [102, 103, 104]),
        peripheral!(S12AD1, [S12ADI1, GBADI1, GCADI1], [105, 106, 107]),
        peripheral!(S12AD2, [S12ADI2, GBADI2, GCADI2], [108, 109, 110]),
        peripheral!(SCI1, [RXI1, TEI1], [ipr::SCI1]),
        peripheral!(SCI5, [RXI5, TEI5], [ipr::SCI5]),
        peripheral!(SCI6, [RXI6, TEI6], [ipr::SCI6]),
        peripheral!(
            RIIC0,
            [RIIC_EEI0, RIIC_RXI0, RIIC_TXI0, RIIC_TEI0],
            [246, 247, 248, 249]
        ),
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
        polling_supported: true,
    }
}

pub const SCI1: SciDescriptor = sci(
    Peripheral::SCI1,
    0x0008_a020,
    vector::RXI1,
    vector::TXI1,
    vector::TEI1,
);
pub const SCI5: SciDescriptor = sci(
    Peripheral::SCI5,
    0x0008_a0a0,
    vector::RXI5,
    vector::TXI5,
    vector::TEI5,
);
pub const SCI6: SciDescriptor = sci(
    Peripheral::SCI6,
    0x0008_a0c0,
    vector::RXI6,
    vector::TXI6,
    vector::TEI6,
);
