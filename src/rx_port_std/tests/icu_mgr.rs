//! Tests for the ICU manager on simulated chips
mod common;

use assert_matches::assert_matches;
use quickcheck_macros::quickcheck;
use rx_support::{
    chip::{rx24t, rx63t, rx64m},
    icu::{
        icu_regs, InstallGroupTaskError, Peripheral, SetDmacError, SetLevelError, Vector,
        MAX_LEVEL,
    },
    port::VectorTable,
};
use std::sync::atomic::Ordering;

use self::common::{boot, counting_task, new_log, recording_task};

fn ipr(sim: &rx_port_std::Sim, index: u8) -> u8 {
    sim.peek8(icu_regs::IPR_BASE + usize::from(index))
}

#[test]
fn set_level_vector() {
    let (sim, icu) = boot(&rx64m::ICU);
    let v = rx64m::vector::GROUPBL0;

    icu.set_level(v, 5).unwrap();
    assert_eq!(ipr(sim, 110), 5);
    assert!(sim.is_enabled(v));
    assert_eq!(icu.level(v), Some(5));

    icu.set_level(v, 0).unwrap();
    assert!(!sim.is_enabled(v));
    assert_eq!(ipr(sim, 110), 0);
    assert_eq!(icu.level(v), Some(0));
}

#[test]
fn set_level_peripheral() {
    let (sim, icu) = boot(&rx64m::ICU);

    icu.set_level(Peripheral::SCI1, 3).unwrap();
    assert!(sim.is_enabled(rx64m::vector::RXI1));
    assert!(sim.is_enabled(rx64m::vector::TXI1));
    assert_eq!(ipr(sim, 60), 3);
    assert_eq!(ipr(sim, 61), 3);

    // Neighbours sharing the IER byte are untouched
    assert!(!sim.is_enabled(rx64m::vector::RXI0));
    assert!(!sim.is_enabled(rx64m::vector::TXI2));

    icu.set_level(Peripheral::SCI1, 0).unwrap();
    assert!(!sim.is_enabled(rx64m::vector::RXI1));
    assert!(!sim.is_enabled(rx64m::vector::TXI1));
}

#[test]
fn set_level_rejects_bad_arguments() {
    let (sim, icu) = boot(&rx64m::ICU);

    assert_matches!(
        icu.set_level(Peripheral::S12AD, 1),
        Err(SetLevelError::BadParam)
    );
    assert_matches!(icu.set_level(Vector(3), 1), Err(SetLevelError::BadParam));
    assert_matches!(
        icu.set_level(rx64m::vector::GROUPBL0, MAX_LEVEL + 1),
        Err(SetLevelError::BadLevel)
    );
    assert_matches!(
        icu.set_level(Peripheral::SCI0, 200),
        Err(SetLevelError::BadLevel)
    );

    assert_eq!(ipr(sim, 110), 0);
    assert!(!sim.is_enabled(rx64m::vector::GROUPBL0));
    assert!(!sim.is_enabled(rx64m::vector::RXI0));
    assert_eq!(icu.level(Vector(3)), None);
}

#[test]
fn shared_ipr() {
    let (sim, icu) = boot(&rx24t::ICU);

    icu.set_level(rx24t::vector::TGIB0, 7).unwrap();
    assert_eq!(ipr(sim, rx24t::ipr::MTU0_ABCD), 7);
    assert!(sim.is_enabled(rx24t::vector::TGIB0));
    assert!(!sim.is_enabled(rx24t::vector::TGIA0));

    icu.set_level(Peripheral::SCI1, 4).unwrap();
    assert_eq!(ipr(sim, rx24t::ipr::SCI1), 4);
    assert!(sim.is_enabled(rx24t::vector::RXI1));
    assert!(sim.is_enabled(rx24t::vector::TEI1));
    assert!(!sim.is_enabled(rx24t::vector::TXI1));
    assert_eq!(icu.level(rx24t::vector::TEI1), Some(4));
}

#[test]
fn external_pin_clears_stale_request() {
    let (sim, icu) = boot(&rx63t::ICU);
    let v = rx63t::vector::IRQ2;
    let ir = icu_regs::ir(v).addr();

    // A request arriving while disabled stays pending
    assert!(!sim.fire(v));
    assert_eq!(sim.peek8(ir), 1);

    icu.set_level(Peripheral::IRQ2, 2).unwrap();
    assert_eq!(sim.peek8(ir), 0);
    assert!(sim.is_enabled(v));

    let (task, count) = counting_task();
    icu.vector_table().install(v, Some(task));
    assert!(sim.fire(v));
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn group_task_runs_once_per_request() {
    let (sim, icu) = boot(&rx64m::ICU);
    let bl0 = rx64m::vector::GROUPBL0;
    let (task, count) = counting_task();

    icu.install_group_task(bl0, 5, Some(task)).unwrap();
    icu.set_level(bl0, 4).unwrap();

    assert!(sim.task(bl0).is_some());
    assert_eq!(icu.group_mask(bl0), Some(1 << 5));
    assert_ne!(sim.peek32(icu_regs::GENBL0) & 1 << 5, 0);

    assert!(sim.raise_group(bl0, 5));
    assert_eq!(count.load(Ordering::SeqCst), 1);

    // Level-detected: the handler leaves the flag alone
    assert_ne!(sim.peek32(icu_regs::GRPBL0) & 1 << 5, 0);
}

#[test]
fn group_task_none_is_never_invoked() {
    let (sim, icu) = boot(&rx64m::ICU);
    let bl1 = rx64m::vector::GROUPBL1;
    let (task, count) = counting_task();

    icu.install_group_task(bl1, 3, None).unwrap();
    icu.set_level(bl1, 1).unwrap();
    assert_eq!(icu.group_mask(bl1), Some(0));
    assert_eq!(sim.peek32(icu_regs::GENBL1), 0);
    assert!(!sim.raise_group(bl1, 3));

    // Installing and then removing a task
    icu.install_group_task(bl1, 3, Some(task)).unwrap();
    icu.install_group_task(bl1, 3, None).unwrap();
    assert_eq!(sim.peek32(icu_regs::GENBL1), 0);

    // Even if the raw vector is taken, the vacant slot isn't run
    assert!(sim.fire(bl1));
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn group_dispatch_order_and_mask() {
    let (sim, icu) = boot(&rx64m::ICU);
    let al0 = rx64m::vector::GROUPAL0;
    let log = new_log();

    icu.install_group_task(al0, 7, Some(recording_task(log, 7))).unwrap();
    icu.install_group_task(al0, 2, Some(recording_task(log, 2))).unwrap();
    icu.set_level(al0, 6).unwrap();

    // Bit 9 is raised but has no task
    sim.poke32(icu_regs::GRPAL0, 1 << 2 | 1 << 7 | 1 << 9);
    assert!(sim.fire(al0));
    assert_eq!(*log.lock().unwrap(), [2, 7]);
}

#[test]
fn edge_group_is_acknowledged() {
    let (sim, icu) = boot(&rx64m::ICU);
    let be0 = rx64m::vector::GROUPBE0;
    let (task, count) = counting_task();

    icu.install_group_task(be0, 1, Some(task)).unwrap();
    icu.set_level(be0, 2).unwrap();

    assert!(sim.raise_group(be0, 1));
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(sim.peek32(icu_regs::GRPBE0) & 1 << 1, 0);

    // A source without a task isn't acknowledged
    sim.poke32(icu_regs::GRPBE0, 1 << 0);
    assert!(sim.fire(be0));
    assert_eq!(sim.peek32(icu_regs::GRPBE0), 1 << 0);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn install_group_task_rejects_bad_arguments() {
    let (sim, icu) = boot(&rx64m::ICU);
    let (task, _) = counting_task();

    assert_matches!(
        icu.install_group_task(rx64m::vector::TXI1, 0, Some(task)),
        Err(InstallGroupTaskError::NotGroup)
    );
    assert_matches!(
        icu.install_group_task(rx64m::vector::GROUPAL0, 22, Some(task)),
        Err(InstallGroupTaskError::BadIndex)
    );
    assert_matches!(
        icu.install_group_task(rx64m::vector::GROUPBE0, 2, Some(task)),
        Err(InstallGroupTaskError::BadIndex)
    );
    assert!(sim.task(rx64m::vector::GROUPAL0).is_none());
    assert!(sim.task(rx64m::vector::GROUPBE0).is_none());
    assert!(sim.task(rx64m::vector::TXI1).is_none());
    assert_eq!(sim.peek32(icu_regs::GENAL0), 0);

    let (_, icu) = boot(&rx24t::ICU);
    assert_matches!(
        icu.install_group_task(Vector(110), 0, Some(task)),
        Err(InstallGroupTaskError::NotGroup)
    );
}

#[test]
fn set_dmac() {
    let (sim, icu) = boot(&rx64m::ICU);

    icu.set_dmac(Peripheral::DMAC2, rx64m::vector::RXI1).unwrap();
    assert_eq!(sim.peek8(icu_regs::dmrsr_addr(2)), 60);

    icu.set_dmac(Peripheral::DMAC7, rx64m::vector::TXI12).unwrap();
    assert_eq!(sim.peek8(icu_regs::dmrsr_addr(7)), 117);

    assert_matches!(
        icu.set_dmac(Peripheral::SCI1, rx64m::vector::RXI1),
        Err(SetDmacError::BadParam)
    );

    let (_, icu) = boot(&rx24t::ICU);
    assert_matches!(
        icu.set_dmac(Peripheral::DMAC0, Vector(28)),
        Err(SetDmacError::BadParam)
    );
}

#[quickcheck]
fn peripheral_levels(ops: Vec<(u8, u8)>) {
    let (sim, icu) = boot(&rx64m::ICU);
    let peripherals = rx64m::ICU.peripherals;

    for (which, level) in ops {
        let desc = &peripherals[usize::from(which) % peripherals.len()];
        let level = level % (MAX_LEVEL + 1);
        icu.set_level(desc.peripheral, level).unwrap();

        for &v in desc.vectors {
            assert_eq!(sim.is_enabled(v), level > 0, "{v:?}");
            assert_eq!(icu.level(v), Some(level), "{v:?}");
        }
        for &i in desc.iprs {
            assert_eq!(ipr(sim, i), level);
        }
    }
}
