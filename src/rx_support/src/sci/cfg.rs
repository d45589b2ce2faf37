//! The public interface of the SCI driver.
use super::BaudRateError;
use crate::icu::{InstallGroupTaskError, Peripheral, SetLevelError, Vector};

/// Character format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    /// 8 data bits, no parity, 1 stop bit
    #[default]
    B8N1,
    /// 8 data bits, even parity, 1 stop bit
    B8E1,
    /// 8 data bits, odd parity, 1 stop bit
    B8O1,
    /// 8 data bits, no parity, 2 stop bits
    B8N2,
    /// 8 data bits, even parity, 2 stop bits
    B8E2,
    /// 8 data bits, odd parity, 2 stop bits
    B8O2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

impl Protocol {
    pub const fn parity(self) -> Parity {
        match self {
            Self::B8N1 | Self::B8N2 => Parity::None,
            Self::B8E1 | Self::B8E2 => Parity::Even,
            Self::B8O1 | Self::B8O2 => Parity::Odd,
        }
    }

    pub const fn stop_bits(self) -> u8 {
        match self {
            Self::B8N1 | Self::B8E1 | Self::B8O1 => 1,
            Self::B8N2 | Self::B8E2 | Self::B8O2 => 2,
        }
    }
}

/// How the transmitter is kept fed from the send queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxPolicy {
    /// Refill on the transmit-data-empty interrupt (TXI). When the queue
    /// runs dry, TXI is turned off and the transmitter *stalls*; the next
    /// `putch` restarts it by writing the first byte itself.
    Stall,
    /// Refill on the transmit-end interrupt (TEI), which is turned off when
    /// the queue runs dry and back on by `putch`.
    TransmitEnd,
}

/// Where an interrupt request of an SCI channel arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntSource {
    /// A dedicated vector
    Vector(Vector),
    /// Bit `index` of the group interrupt `group`
    Group { group: Vector, index: u8 },
}

/// Describes one SCI channel.
#[derive(Debug, Clone, Copy)]
pub struct SciDescriptor {
    pub peripheral: Peripheral,
    /// The base address of the register block
    pub base: usize,
    /// The receive-data-full vector (RXI)
    pub rxi: Vector,
    /// The transmit-data-empty vector (TXI)
    pub txi: Vector,
    /// The transmit-end source (TEI)
    pub tei: IntSource,
    pub tx_policy: TxPolicy,
    /// Whether the driver can run with interrupts disabled (level `0`)
    pub polling_supported: bool,
}

impl SciDescriptor {
    /// Get the source that drives the transmitter under [`Self::tx_policy`].
    #[inline]
    pub const fn tx_source(&self) -> IntSource {
        match self.tx_policy {
            TxPolicy::Stall => IntSource::Vector(self.txi),
            TxPolicy::TransmitEnd => self.tei,
        }
    }
}

/// Error type for [`SciIo::start`](super::SciIo::start).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartError {
    /// Level `0` was requested on a channel without polling support.
    PollingUnsupported,
    /// The bit rate can't be generated from the peripheral clock.
    BadBaudRate(BaudRateError),
    /// The interrupt controller rejected the level.
    Icu(SetLevelError),
    /// The transmit source couldn't be installed.
    Vector(InstallGroupTaskError),
}

impl From<BaudRateError> for StartError {
    fn from(x: BaudRateError) -> Self {
        Self::BadBaudRate(x)
    }
}

impl From<SetLevelError> for StartError {
    fn from(x: SetLevelError) -> Self {
        Self::Icu(x)
    }
}

impl From<InstallGroupTaskError> for StartError {
    fn from(x: InstallGroupTaskError) -> Self {
        Self::Vector(x)
    }
}
