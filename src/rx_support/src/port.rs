//! Interfaces to the surrounding runtime and board
use crate::{
    icu::{Peripheral, Vector},
    utils::{Dispatch, Init, Task},
};

/// A cooperative-yield hook called on every iteration of a wait loop.
pub trait Idle {
    fn idle(&self);
}

impl<T: Idle + ?Sized> Idle for &T {
    #[inline]
    fn idle(&self) {
        (**self).idle()
    }
}

/// An [`Idle`] implementation that only issues a spin-loop hint.
#[derive(Debug, Default, Clone, Copy)]
pub struct Spin;

impl Idle for Spin {
    #[inline]
    fn idle(&self) {
        core::hint::spin_loop();
    }
}

/// Board-level facilities consumed by the drivers.
pub trait Board: Idle + Sync {
    /// Get the frequency of the peripheral clock B (PCLKB), measured in
    /// hertz.
    fn pclkb(&self) -> u32;

    /// Release `peripheral` from the module stop state.
    fn turn_on(&self, peripheral: Peripheral);

    /// Route (or unroute) the pins of `peripheral`. Returns `false` if the
    /// board has no pin assignment for it.
    fn map_pins(&self, peripheral: Peripheral, enable: bool) -> bool;
}

/// The runtime's "install interrupt callback for vector N" primitive.
pub trait VectorTable: Sync {
    /// Install or remove (`None`) the task called when `vector` is taken.
    fn install(&self, vector: Vector, task: Option<Task>);
}

impl<T: VectorTable + ?Sized> VectorTable for &T {
    #[inline]
    fn install(&self, vector: Vector, task: Option<Task>) {
        (**self).install(vector, task)
    }
}

/// A [`VectorTable`] held in RAM. The interrupt entry stub calls
/// [`Self::dispatch`] with the number of the vector being taken.
#[derive(Debug, Default)]
pub struct RamVectorTable {
    tasks: Dispatch<256>,
}

impl Init for RamVectorTable {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = Self::new();
}

impl RamVectorTable {
    pub const fn new() -> Self {
        Self {
            tasks: Dispatch::new(),
        }
    }

    /// Run the task installed for `vector`, if any.
    #[inline]
    pub fn dispatch(&self, vector: Vector) {
        self.tasks.run_task(vector.index());
    }

    /// Get the task installed for `vector`.
    pub fn task(&self, vector: Vector) -> Option<Task> {
        self.tasks.task(vector.index())
    }
}

impl VectorTable for RamVectorTable {
    fn install(&self, vector: Vector, task: Option<Task>) {
        self.tasks.set_task(vector.index(), task);
    }
}
