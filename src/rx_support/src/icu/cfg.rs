//! The public interface of the ICU manager.

/// The highest interrupt priority level. Level `0` disables a source.
pub const MAX_LEVEL: u8 = 15;

/// The maximum number of group interrupts an [`IcuDescriptor`] may
/// describe.
pub const MAX_GROUPS: usize = 6;

/// The maximum number of sources in one group interrupt (one bit each in
/// the group's 32-bit flag register).
pub const MAX_GROUP_LEN: usize = 32;

/// A hardware interrupt vector number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Vector(pub u8);

impl Vector {
    /// Get the vector number as an index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A logical interrupt-producing peripheral, resolved to a set of vectors by
/// an [`IcuDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Peripheral {
    CMT0,
    CMT1,
    CMT2,
    CMT3,
    DMAC0,
    DMAC1,
    DMAC2,
    DMAC3,
    DMAC4,
    DMAC5,
    DMAC6,
    DMAC7,
    SCI0,
    SCI1,
    SCI2,
    SCI3,
    SCI4,
    SCI5,
    SCI6,
    SCI7,
    SCI12,
    RIIC0,
    RIIC2,
    RSPI0,
    S12AD,
    S12AD1,
    S12AD2,
    IRQ0,
    IRQ1,
    IRQ2,
    IRQ3,
    IRQ4,
    IRQ5,
    IRQ6,
    IRQ7,
}

/// The target of [`IcuMgr::set_level`](super::IcuMgr::set_level).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// A single hardware vector, e.g., a group vector or a timer channel.
    Vector(Vector),
    /// Every vector belonging to a peripheral.
    Peripheral(Peripheral),
}

impl From<Vector> for Source {
    #[inline]
    fn from(x: Vector) -> Self {
        Self::Vector(x)
    }
}

impl From<Peripheral> for Source {
    #[inline]
    fn from(x: Peripheral) -> Self {
        Self::Peripheral(x)
    }
}

/// Describes the interrupt controller of one chip.
#[derive(Debug)]
pub struct IcuDescriptor {
    pub name: &'static str,
    /// The vectors accepted by `set_level` as [`Source::Vector`].
    pub vectors: &'static [VectorDescriptor],
    /// The peripherals accepted by `set_level` as [`Source::Peripheral`].
    pub peripherals: &'static [PeripheralDescriptor],
    /// The group interrupts. Must not exceed [`MAX_GROUPS`] elements.
    pub groups: &'static [GroupDescriptor],
    /// The DMAC channels and their activation source registers.
    pub dmac: &'static [DmacDescriptor],
}

/// A vector and the index of the IPR register that holds its level.
#[derive(Debug, Clone, Copy)]
pub struct VectorDescriptor {
    pub vector: Vector,
    pub ipr: u8,
}

#[derive(Debug, Clone, Copy)]
pub struct PeripheralDescriptor {
    pub peripheral: Peripheral,
    /// The vectors enabled and disabled together.
    pub vectors: &'static [Vector],
    /// The IPR registers written. Several vectors may share one.
    pub iprs: &'static [u8],
    /// Clear the IR flags while the vectors are disabled. Set for
    /// edge-detected external pins, whose IR flag may hold a stale request.
    pub clear_pending: bool,
}

/// A group interrupt: one hardware vector multiplexing up to 32 sources.
#[derive(Debug, Clone, Copy)]
pub struct GroupDescriptor {
    pub vector: Vector,
    /// The number of usable source bits.
    pub len: u8,
    /// The address of the group flag register (GRPxx).
    pub grp: usize,
    /// The address of the group enable register (GENxx).
    pub gen: usize,
    /// The address of the group clear register (GCRxx). Present only for
    /// edge-detected groups, whose sources must be acknowledged one by one.
    pub gcr: Option<usize>,
}

impl GroupDescriptor {
    #[inline]
    pub const fn is_edge_triggered(&self) -> bool {
        self.gcr.is_some()
    }
}

/// A DMAC channel and the address of its activation source register
/// (DMRSRn).
#[derive(Debug, Clone, Copy)]
pub struct DmacDescriptor {
    pub channel: Peripheral,
    pub dmrsr: usize,
}

impl IcuDescriptor {
    pub fn vector(&self, vector: Vector) -> Option<&'static VectorDescriptor> {
        self.vectors.iter().find(|d| d.vector == vector)
    }

    pub fn peripheral(&self, peripheral: Peripheral) -> Option<&'static PeripheralDescriptor> {
        self.peripherals.iter().find(|d| d.peripheral == peripheral)
    }

    /// Get the position of `vector` in [`Self::groups`].
    pub fn group_index(&self, vector: Vector) -> Option<usize> {
        self.groups.iter().position(|d| d.vector == vector)
    }

    pub fn dmac(&self, channel: Peripheral) -> Option<&'static DmacDescriptor> {
        self.dmac.iter().find(|d| d.channel == channel)
    }
}

/// Error type for [`IcuMgr::set_level`](super::IcuMgr::set_level).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetLevelError {
    /// The source does not exist on this chip.
    BadParam,
    /// The level exceeds [`MAX_LEVEL`].
    BadLevel,
}

/// Error type for
/// [`IcuMgr::install_group_task`](super::IcuMgr::install_group_task).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallGroupTaskError {
    /// The vector is not a group interrupt on this chip.
    NotGroup,
    /// The index is outside the group.
    BadIndex,
}

/// Error type for [`IcuMgr::set_dmac`](super::IcuMgr::set_dmac).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetDmacError {
    /// The peripheral is not a DMAC channel on this chip.
    BadParam,
}
