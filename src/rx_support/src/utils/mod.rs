//! Utility
mod dispatch;
mod fifo;
pub use self::{dispatch::*, fifo::*};

/// Trait for types having a constant default value. This is essentially a
/// constant version of `Default`.
pub trait Init {
    /// The default value.
    const INIT: Self;
}

impl<T> Init for Option<T> {
    const INIT: Self = None;
}
