//! Interrupt management and interrupt-driven serial I/O for Renesas RX
//! microcontrollers.
//!
//! - [`icu::IcuMgr`] configures interrupt levels, demultiplexes group
//!   interrupts into per-source tasks, and routes DMAC activation requests.
//! - [`sci::SciIo`] is a buffered SCI driver. Bytes move between the
//!   hardware and two lock-free queues ([`utils::Fifo`]) from interrupt
//!   handlers, while the main line blocks on the queues.
//!
//! Registers are accessed through a [`bus::Bus`], which is [`bus::Mmio`] on
//! the target and a simulated register file in tests. Chip-specific vector
//! numbers and addresses are provided as descriptors in [`chip`].
//!
//! # Example
//!
//! ```rust,ignore
//! use rx_support::{bus::Mmio, chip::rx64m, icu::IcuMgr, port::RamVectorTable, sci};
//!
//! static VECTORS: RamVectorTable = RamVectorTable::new();
//! static ICU: IcuMgr<Mmio, &RamVectorTable> =
//!     IcuMgr::new(unsafe { Mmio::new() }, &VECTORS, &rx64m::ICU);
//! static SCI1: sci::SciIo<Mmio, &RamVectorTable, MyBoard, 256, 512> =
//!     sci::SciIo::new(&rx64m::SCI1, &ICU, &BOARD);
//!
//! SCI1.start(115_200, 2, sci::Protocol::B8N1).unwrap();
//! SCI1.puts("Hello, world!\n");
//! ```
#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(rust_2018_idioms)]

pub mod bus;
pub mod chip;
pub mod icu;
pub mod port;
pub mod sci;
pub mod utils;
