#![allow(dead_code)]
use rx_port_std::{Sim, SimIcu, SimSci};
use rx_support::{icu::IcuDescriptor, utils::Task};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

/// The peripheral clock of every simulated chip in the tests
pub const PCLKB: u32 = 60_000_000;

pub fn boot(icu: &'static IcuDescriptor) -> (&'static Sim, &'static SimIcu) {
    rx_port_std::init_logger();
    Sim::boot(icu, PCLKB)
}

/// Advance time until everything queued for `sci` has left the wire.
pub fn flush<const RECV: usize, const SEND: usize>(sim: &Sim, sci: &SimSci<RECV, SEND>) {
    use embedded_hal::serial::Write;

    let mut nb = sci.nb();
    for _ in 0..100_000 {
        if nb.flush().is_ok() {
            return;
        }
        sim.tick();
    }
    panic!("the transmitter doesn't drain");
}

/// Construct a task that increments the returned counter.
pub fn counting_task() -> (Task, &'static AtomicUsize) {
    let counter: &'static AtomicUsize = Box::leak(Box::new(AtomicUsize::new(0)));
    let task = Task::new(
        |param| {
            // Safety: `param` points to a leaked `AtomicUsize`
            let counter = unsafe { &*(param as *const AtomicUsize) };
            counter.fetch_add(1, Ordering::SeqCst);
        },
        counter as *const AtomicUsize as usize,
    );
    (task, counter)
}

/// Construct a task that appends `id` to `log`.
pub fn recording_task(log: &'static Mutex<Vec<u32>>, id: u32) -> Task {
    let probe: &'static (&'static Mutex<Vec<u32>>, u32) = Box::leak(Box::new((log, id)));
    Task::new(
        |param| {
            // Safety: `param` points to a leaked probe
            let (log, id) = unsafe { *(param as *const (&'static Mutex<Vec<u32>>, u32)) };
            log.lock().unwrap().push(id);
        },
        probe as *const _ as usize,
    )
}

pub fn new_log() -> &'static Mutex<Vec<u32>> {
    Box::leak(Box::new(Mutex::new(Vec::new())))
}
