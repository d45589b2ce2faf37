//! RX64M (RX71M shares the same layout)
use super::peripheral;
use crate::{
    icu::{
        icu_regs::{self, dmrsr_addr},
        DmacDescriptor, GroupDescriptor, IcuDescriptor, Peripheral, Vector, VectorDescriptor,
    },
    sci::{IntSource, SciDescriptor, TxPolicy},
};

/// Vector numbers
pub mod vector {
    use crate::icu::Vector;

    pub const CMI0: Vector = Vector(28);
    pub const CMI1: Vector = Vector(29);
    pub const SPRI0: Vector = Vector(38);
    pub const SPTI0: Vector = Vector(39);
    pub const RIIC_RXI2: Vector = Vector(50);
    pub const RIIC_TXI2: Vector = Vector(51);
    pub const RIIC_RXI0: Vector = Vector(52);
    pub const RIIC_TXI0: Vector = Vector(53);
    pub const RXI0: Vector = Vector(58);
    pub const TXI0: Vector = Vector(59);
    pub const RXI1: Vector = Vector(60);
    pub const TXI1: Vector = Vector(61);
    pub const RXI2: Vector = Vector(62);
    pub const TXI2: Vector = Vector(63);
    pub const IRQ0: Vector = Vector(64);
    pub const IRQ1: Vector = Vector(65);
    pub const IRQ2: Vector = Vector(66);
    pub const IRQ3: Vector = Vector(67);
    pub const IRQ4: Vector = Vector(68);
    pub const IRQ5: Vector = Vector(69);
    pub const IRQ6: Vector = Vector(70);
    pub const IRQ7: Vector = Vector(71);
    pub const RXI3: Vector = Vector(80);
    pub const TXI3: Vector = Vector(81);
    pub const RXI4: Vector = Vector(82);
    pub const TXI4: Vector = Vector(83);
    pub const RXI5: Vector = Vector(84);
    pub const TXI5: Vector = Vector(85);
    pub const RXI6: Vector = Vector(86);
    pub const TXI6: Vector = Vector(87);
    pub const RXI7: Vector = Vector(98);
    pub const TXI7: Vector = Vector(99);
    pub const GROUPBE0: Vector = Vector(106);
    pub const GROUPBL0: Vector = Vector(110);
    pub const GROUPBL1: Vector = Vector(111);
    pub const GROUPAL0: Vector = Vector(112);
    pub const GROUPAL1: Vector = Vector(113);
    pub const RXI12: Vector = Vector(116);
    pub const TXI12: Vector = Vector(117);
    pub const DMAC0I: Vector = Vector(198);
    pub const DMAC1I: Vector = Vector(199);
    pub const DMAC2I: Vector = Vector(200);
    pub const DMAC3I: Vector = Vector(201);
    pub const DMAC74I: Vector = Vector(202);
}

/// Source bits of [`vector::GROUPBL0`]
pub mod group_bl0 {
    pub const TEI0: u8 = 0;
    pub const ERI0: u8 = 1;
    pub const TEI1: u8 = 2;
    pub const ERI1: u8 = 3;
    pub const TEI2: u8 = 4;
    pub const ERI2: u8 = 5;
    pub const TEI3: u8 = 6;
    pub const ERI3: u8 = 7;
    pub const TEI4: u8 = 8;
    pub const ERI4: u8 = 9;
    pub const TEI5: u8 = 10;
    pub const ERI5: u8 = 11;
    pub const TEI6: u8 = 12;
    pub const ERI6: u8 = 13;
    pub const TEI7: u8 = 14;
    pub const ERI7: u8 = 15;
    pub const TEI12: u8 = 16;
    pub const ERI12: u8 = 17;
}

/// A vector with an IPR register of the same number
const fn own(vector: Vector) -> VectorDescriptor {
    VectorDescriptor {
        vector,
        ipr: vector.0,
    }
}

pub static ICU: IcuDescriptor = IcuDescriptor {
    name: "RX64M",
    vectors: &[
        own(vector::GROUPBE0),
        own(vector::GROUPBL0),
        own(vector::GROUPBL1),
        own(vector::GROUPAL0),
        own(vector::GROUPAL1),
        own(vector::CMI0),
        own(vector::CMI1),
    ],
    peripherals: &[
        peripheral!(CMT0, [CMI0], [28]),
        peripheral!(CMT1, [CMI1], [29]),
        peripheral!(RSPI0, [SPRI0, SPTI0], [38, 39]),
        peripheral!(RIIC2, [RIIC_RXI2, RIIC_TXI2], [50, 51]),
        peripheral!(RIIC0, [RIIC_RXI0, RIIC_TXI0], [52, 53]),
        peripheral!(SCI0, [RXI0, TXI0], [58, 59]),
        peripheral!(SCI1, [RXI1, TXI1], [60, 61]),
        peripheral!(SCI2, [RXI2, TXI2], [62, 63]),
        peripheral!(SCI3, [RXI3, TXI3], [80, 81]),
        peripheral!(SCI4, [RXI4, TXI4], [82, 83]),
        peripheral!(SCI5, [RXI5, TXI5], [84, 85]),
        peripheral!(SCI6, [RXI6, TXI6], [86, 87]),
        peripheral!(SCI7, [RXI7, TXI7], [98, 99]),
        peripheral!(SCI12, [RXI12, TXI12], [116, 117]),
        peripheral!(IRQ0, [IRQ0], [64], true),
        peripheral!(IRQ1, [IRQ1], [65], true),
        peripheral!(IRQ2, [IRQ2], [66], true),
        peripheral!(IRQ3, [IRQ3], [67], true),
        peripheral!(IRQ4, [IRQ4], [68], true),
        peripheral!(IRQ5, [IRQ5], [69], true),
        peripheral!(IRQ6, [IRQ6], [70], true),
        peripheral!(IRQ7, [IRQ7], [71], true),
        peripheral!(DMAC0, [DMAC0I], [198]),
        peripheral!(DMAC1, [DMAC1I], [199]),
        peripheral!(DMAC2, [DMAC2I], [200]),
        peripheral!(DMAC3, [DMAC3I], [201]),
        peripheral!(DMAC4, [DMAC74I], [202]),
        peripheral!(DMAC5, [DMAC74I], [202]),
        peripheral!(DMAC6, [DMAC74I], [202]),
        peripheral!(DMAC7, [DMAC74I], [202]),
    ],
    groups: &[
        GroupDescriptor {
            vector: vector::GROUPBE0,
            len: 2,
            grp: icu_regs::GRPBE0,
            gen: icu_regs::GENBE0,
            gcr: Some(icu_regs::GCRBE0),
        },
        GroupDescriptor {
            vector: vector::GROUPBL0,
            len: 32,
            grp: icu_regs::GRPBL0,
            gen: icu_regs::GENBL0,
            gcr: None,
        },
        GroupDescriptor {
            vector: vector::GROUPBL1,
            len: 32,
            grp: icu_regs::GRPBL1,
            gen: icu_regs::GENBL1,
            gcr: None,
        },
        GroupDescriptor {
            vector: vector::GROUPAL0,
            len: 22,
            grp: icu_regs::GRPAL0,
            gen: icu_regs::GENAL0,
            gcr: None,
        },
        GroupDescriptor {
            vector: vector::GROUPAL1,
            len: 12,
            grp: icu_regs::GRPAL1,
            gen: icu_regs::GENAL1,
            gcr: None,
        },
    ],
    dmac: &[
        DmacDescriptor {
            channel: Peripheral::DMAC0,
            dmrsr: dmrsr_addr(0),
        },
        DmacDescriptor {
            channel: Peripheral::DMAC1,
            dmrsr: dmrsr_addr(1),
        },
        DmacDescriptor {
            channel: Peripheral::DMAC2,
            dmrsr: dmrsr_addr(2),
        },
        DmacDescriptor {
            channel: Peripheral::DMAC3,
            dmrsr: dmrsr_addr(3),
        },
        DmacDescriptor {
            channel: Peripheral::DMAC4,
            dmrsr: dmrsr_addr(4),
        },
        DmacDescriptor {
            channel: Peripheral::DMAC5,
            dmrsr: dmrsr_addr(5),
        },
        DmacDescriptor {
            channel: Peripheral::DMAC6,
            dmrsr: dmrsr_addr(6),
        },
        DmacDescriptor {
            channel: Peripheral::DMAC7,
            dmrsr: dmrsr_addr(7),
        },
    ],
};

const fn sci(
    peripheral: Peripheral,
    base: usize,
    rxi: Vector,
    txi: Vector,
    tei: u8,
) -> SciDescriptor {
    SciDescriptor {
        peripheral,
        base,
        rxi,
        txi,
        tei: IntSource::Group {
            group: vector::GROUPBL0,
            index: tei,
        },
        tx_policy: TxPolicy::Stall,
        polling_supported: true,
    }
}

pub const SCI0: SciDescriptor = sci(
    Peripheral::SCI0,
    0x0008_a000,
    vector::RXI0,
    vector::TXI0,
    group_bl0::TEI0,
);
pub const SCI1: SciDescriptor = sci(
    Peripheral::SCI1,
    0x0008_a020,
    vector::RXI1,
    vector::TXI1,
    group_bl0::TEI1,
);
pub const SCI2: SciDescriptor = sci(
    Peripheral::SCI2,
    0x0008_a040,
    vector::RXI2,
    vector::TXI2,
    group_bl0::TEI2,
);
pub const SCI3: SciDescriptor = sci(
    Peripheral::SCI3,
    0x0008_a060,
    vector::RXI3,
    vector::TXI3,
    group_bl0::TEI3,
);
pub const SCI4: SciDescriptor = sci(
    Peripheral::SCI4,
    0x0008_a080,
    vector::RXI4,
    vector::TXI4,
    group_bl0::TEI4,
);
pub const SCI5: SciDescriptor = sci(
    Peripheral::SCI5,
    0x0008_a0a0,
    vector::RXI5,
    vector::TXI5,
    group_bl0::TEI5,
);
pub const SCI6: SciDescriptor = sci(
    Peripheral::SCI6,
    0x0008_a0c0,
    vector::RXI6,
    vector::TXI6,
    group_bl0::TEI6,
);
pub const SCI7: SciDescriptor = sci(
    Peripheral::SCI7,
    0x0008_a0e0,
    vector::RXI7,
    vector::TXI7,
    group_bl0::TEI7,
);
pub const SCI12: SciDescriptor = sci(
    Peripheral::SCI12,
    0x0008_b300,
    vector::RXI12,
    vector::TXI12,
    group_bl0::TEI12,
);
