//! The interrupt controller unit (ICU)
pub mod cfg;
pub mod icu_regs;
mod imp;
pub use self::{cfg::*, imp::*};
