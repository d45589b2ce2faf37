//! The serial communications interface (SCI)
mod baud;
pub mod cfg;
mod imp;
pub mod sci_regs;
pub use self::{baud::*, cfg::*, imp::*};
