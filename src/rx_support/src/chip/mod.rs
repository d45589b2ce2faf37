//! Descriptors of supported chips
//!
//! Each module provides the chip's ICU descriptor (`ICU`), its vector
//! numbers (`vector`), and one [`SciDescriptor`](crate::sci::SciDescriptor)
//! per SCI channel.
pub mod rx24t;
pub mod rx63t;
pub mod rx64m;

/// Build a [`PeripheralDescriptor`](crate::icu::PeripheralDescriptor).
macro_rules! peripheral {
    ($name:ident, [$($vec:ident),* $(,)?], [$($ipr:expr),* $(,)?] $(, $clear:literal)?) => {
        $crate::icu::PeripheralDescriptor {
            peripheral: $crate::icu::Peripheral::$name,
            vectors: &[$(vector::$vec),*],
            iprs: &[$($ipr),*],
            clear_pending: false $(|| $clear)?,
        }
    };
}
use peripheral;
