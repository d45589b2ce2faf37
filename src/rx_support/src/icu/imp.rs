//! The implementation of the ICU manager.
use core::{fmt, slice};

use super::{
    cfg::{
        IcuDescriptor, InstallGroupTaskError, Peripheral, SetDmacError, SetLevelError, Source,
        Vector, MAX_GROUPS, MAX_GROUP_LEN, MAX_LEVEL,
    },
    icu_regs::{self, IPR, IR},
};
use crate::{
    bus::{Bus, Reg8},
    port::VectorTable,
    utils::{Dispatch, Task},
};

/// The ICU manager: interrupt levels, group interrupt demultiplexing, and
/// DMAC activation routing for one chip.
///
/// Group dispatch requires the manager to live for the rest of the program
/// (`&'static self`) because the group handlers installed into the vector
/// table refer back to it.
pub struct IcuMgr<B, V> {
    bus: B,
    vectors: V,
    desc: &'static IcuDescriptor,
    groups: [Dispatch<MAX_GROUP_LEN>; MAX_GROUPS],
}

impl<B, V> fmt::Debug for IcuMgr<B, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IcuMgr")
            .field("chip", &self.desc.name)
            .field("groups", &&self.groups[..self.desc.groups.len()])
            .finish()
    }
}

const fn group_len(desc: &IcuDescriptor, i: usize) -> usize {
    if i >= desc.groups.len() {
        return 0;
    }
    let len = desc.groups[i].len as usize;
    assert!(len <= MAX_GROUP_LEN, "group is too wide");
    len
}

impl<B: Bus, V: VectorTable> IcuMgr<B, V> {
    /// Construct an `IcuMgr`.
    ///
    /// # Panics
    ///
    /// Panics if `desc` describes more than [`MAX_GROUPS`] groups or a group
    /// wider than [`MAX_GROUP_LEN`] sources.
    pub const fn new(bus: B, vectors: V, desc: &'static IcuDescriptor) -> Self {
        assert!(desc.groups.len() <= MAX_GROUPS, "too many groups");

        Self {
            bus,
            vectors,
            desc,
            groups: [
                Dispatch::with_size(group_len(desc, 0)),
                Dispatch::with_size(group_len(desc, 1)),
                Dispatch::with_size(group_len(desc, 2)),
                Dispatch::with_size(group_len(desc, 3)),
                Dispatch::with_size(group_len(desc, 4)),
                Dispatch::with_size(group_len(desc, 5)),
            ],
        }
    }

    #[inline]
    pub fn bus(&self) -> &B {
        &self.bus
    }

    #[inline]
    pub fn vector_table(&self) -> &V {
        &self.vectors
    }

    #[inline]
    pub fn descriptor(&self) -> &'static IcuDescriptor {
        self.desc
    }

    /// Get the occupied-slot mask of the group interrupt `group`.
    pub fn group_mask(&self, group: Vector) -> Option<u32> {
        let i = self.desc.group_index(group)?;
        Some(self.groups[i].get_mask())
    }

    /// Get the level `vector` is currently enabled at, or `0` if it's
    /// disabled. Returns `None` if `vector` is unknown to this chip.
    pub fn level(&self, vector: Vector) -> Option<u8> {
        let ipr = self.ipr_of(vector)?;
        let (ier, bit) = icu_regs::ier(vector);
        Some(if ier.get(&self.bus) & bit != 0 {
            icu_regs::ipr(ipr).read(&self.bus, IPR::IPR)
        } else {
            0
        })
    }

    fn ipr_of(&self, vector: Vector) -> Option<u8> {
        if let Some(d) = self.desc.vector(vector) {
            return Some(d.ipr);
        }

        // Fall back to peripheral bundles, pairing vectors with IPRs by
        // position (the last IPR covers the remainder)
        self.desc.peripherals.iter().find_map(|d| {
            let i = d.vectors.iter().position(|&v| v == vector)?;
            d.iprs.get(i).or(d.iprs.last()).copied()
        })
    }

    fn set_enable(&self, vector: Vector, enable: bool) {
        let (ier, bit) = icu_regs::ier(vector);
        let value = ier.get(&self.bus);
        ier.set(&self.bus, if enable { value | bit } else { value & !bit });
    }

    /// Set the interrupt level of a vector or of every vector of a
    /// peripheral. Level `0` disables the source.
    ///
    /// The source is disabled while its IPR registers are rewritten, and is
    /// re-enabled afterwards if `level > 0`.
    pub fn set_level(&self, source: impl Into<Source>, level: u8) -> Result<(), SetLevelError> {
        let source = source.into();

        if level > MAX_LEVEL {
            log::warn!("set_level({source:?}): level {level} is out of range");
            return Err(SetLevelError::BadLevel);
        }

        let (vectors, iprs, clear_pending) = match source {
            Source::Vector(vector) => {
                let d = self.desc.vector(vector).ok_or_else(|| {
                    log::warn!("set_level: {vector:?} is unknown to {}", self.desc.name);
                    SetLevelError::BadParam
                })?;
                (slice::from_ref(&d.vector), slice::from_ref(&d.ipr), false)
            }
            Source::Peripheral(peripheral) => {
                let d = self.desc.peripheral(peripheral).ok_or_else(|| {
                    log::warn!("set_level: {peripheral:?} is unknown to {}", self.desc.name);
                    SetLevelError::BadParam
                })?;
                (d.vectors, d.iprs, d.clear_pending)
            }
        };

        log::debug!("set_level({source:?}, {level})");

        for &vector in vectors {
            self.set_enable(vector, false);
        }

        for &ipr in iprs {
            icu_regs::ipr(ipr).write(&self.bus, IPR::IPR.val(level));
        }

        if clear_pending {
            for &vector in vectors {
                icu_regs::ir(vector).write(&self.bus, IR::IR::CLEAR);
            }
        }

        if level > 0 {
            for &vector in vectors {
                self.set_enable(vector, true);
            }
        }

        Ok(())
    }

    /// Install or remove (`None`) the task for source `index` of the group
    /// interrupt `group`.
    ///
    /// The group's demultiplexing handler is (re)installed as `group`'s
    /// vector task, and the source's group enable bit is set or cleared to
    /// match `task`. The group vector's own level is configured separately
    /// with [`Self::set_level`].
    pub fn install_group_task(
        &'static self,
        group: Vector,
        index: usize,
        task: Option<Task>,
    ) -> Result<(), InstallGroupTaskError> {
        let Some(i) = self.desc.group_index(group) else {
            log::warn!("install_group_task: {group:?} is not a group vector");
            return Err(InstallGroupTaskError::NotGroup);
        };

        let table = &self.groups[i];
        if index >= table.size() {
            log::warn!(
                "install_group_task: index {index} is outside {group:?} (size {})",
                table.size()
            );
            return Err(InstallGroupTaskError::BadIndex);
        }

        log::debug!(
            "install_group_task({group:?}, {index}, {})",
            if task.is_some() { "Some(..)" } else { "None" }
        );

        let param = self as *const Self as usize;
        self.vectors
            .install(group, Some(Task::new(Self::group_handler(i), param)));

        table.set_task(index, task);

        let gen = icu_regs::group(self.desc.groups[i].gen);
        let bit = 1u32 << index;
        let value = gen.get(&self.bus);
        gen.set(
            &self.bus,
            if task.is_some() {
                value | bit
            } else {
                value & !bit
            },
        );

        Ok(())
    }

    fn group_handler(i: usize) -> fn(usize) {
        match i {
            0 => Self::handle_group::<0>,
            1 => Self::handle_group::<1>,
            2 => Self::handle_group::<2>,
            3 => Self::handle_group::<3>,
            4 => Self::handle_group::<4>,
            5 => Self::handle_group::<5>,
            // `new` rejects descriptors with more groups
            _ => unreachable!(),
        }
    }

    fn handle_group<const I: usize>(param: usize) {
        // Safety: `param` was created from `&'static Self` by
        // `install_group_task`
        let this = unsafe { &*(param as *const Self) };
        this.dispatch_group(I);
    }

    /// Service one raw interrupt of the group at position `i`: run the task
    /// of every raised and occupied source in ascending bit order.
    fn dispatch_group(&self, i: usize) {
        let desc = &self.desc.groups[i];
        let table = &self.groups[i];

        let mut bits = icu_regs::group(desc.grp).get(&self.bus) & table.get_mask();
        while bits != 0 {
            let index = bits.trailing_zeros();
            bits &= bits - 1;

            table.run_task(index as usize);

            if desc.is_edge_triggered() {
                if let Some(gcr) = desc.gcr {
                    icu_regs::group(gcr).set(&self.bus, 1 << index);
                }
            }
        }
    }

    /// Route the interrupt request of `target` to the DMAC channel
    /// `channel` as its activation source.
    pub fn set_dmac(&self, channel: Peripheral, target: Vector) -> Result<(), SetDmacError> {
        let d = self.desc.dmac(channel).ok_or_else(|| {
            log::warn!("set_dmac: {channel:?} is not a DMAC channel");
            SetDmacError::BadParam
        })?;

        log::debug!("set_dmac({channel:?}, {target:?})");

        Reg8::<()>::at(d.dmrsr).set(&self.bus, target.0);
        Ok(())
    }
}
