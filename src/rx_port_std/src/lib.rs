//! Simulation environment for running [`rx_support`] on a hosted
//! environment.
//!
//! [`Sim`] stands in for the chip: it is the register [`Bus`], the
//! [`VectorTable`], and the [`Board`] at once. It models the ICU's enable,
//! request, and group registers, and the data path of every attached SCI
//! channel. Simulated time advances one character per [`Sim::tick`], which
//! the idle hook calls whenever a driver waits.
//!
//! Interrupt handlers run synchronously on the thread that raises the
//! request ([`Sim::fire`], [`Sim::inject`], [`Sim::tick`]). That thread is
//! considered to be in an interrupt context while the handler runs.
//!
//! [`Bus`]: rx_support::bus::Bus
//! [`VectorTable`]: rx_support::port::VectorTable
//! [`Board`]: rx_support::port::Board
#![warn(rust_2018_idioms)]
use rx_support::{icu::IcuMgr, sci::SciIo};
use std::cell::Cell;

mod regs;
mod sim;
pub use self::sim::*;

/// The ICU manager type for a leaked [`Sim`].
pub type SimIcu = IcuMgr<&'static Sim, &'static Sim>;

/// The SCI driver type for a leaked [`Sim`].
pub type SimSci<const RECV: usize, const SEND: usize> =
    SciIo<&'static Sim, &'static Sim, Sim, RECV, SEND>;

/// Initialize `env_logger`, ignoring the error if it's already initialized.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

thread_local! {
    /// The number of simulated interrupt handlers running on the current
    /// thread.
    static INTERRUPT_DEPTH: Cell<usize> = Cell::new(0);
}

/// Get a flag indicating whether the current thread is running a simulated
/// interrupt handler.
pub fn is_interrupt_context() -> bool {
    INTERRUPT_DEPTH.with(|depth| depth.get() > 0)
}

/// Marks the current thread as being in an interrupt context while alive.
struct InterruptScope(());

impl InterruptScope {
    fn enter() -> Self {
        INTERRUPT_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self(())
    }
}

impl Drop for InterruptScope {
    fn drop(&mut self) {
        INTERRUPT_DEPTH.with(|depth| depth.set(depth.get() - 1));
    }
}
