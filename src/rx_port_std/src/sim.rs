use rx_support::{
    bus::Bus,
    icu::{icu_regs, GroupDescriptor, IcuDescriptor, Peripheral, Vector},
    port::{Board, Idle, RamVectorTable, VectorTable},
    sci::{
        sci_regs::{RDR_OFFSET, SCR_OFFSET, SSR_OFFSET},
        IntSource, SciDescriptor,
    },
    utils::Task,
};
use spin::Mutex as SpinMutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::{
    regs::{
        RegisterFile, SCR_RE, SCR_RIE, SCR_TE, SCR_TEIE, SCR_TIE, SSR_FER, SSR_ORER, SSR_PER,
        SSR_RDRF, SSR_TDRE, SSR_TEND,
    },
    InterruptScope, SimIcu, SimSci,
};

bitflags::bitflags! {
    /// Receive errors attached to a byte by [`Sim::inject`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LineErrors: u8 {
        const PARITY = SSR_PER;
        const FRAMING = SSR_FER;
        const OVERRUN = SSR_ORER;
    }
}

/// A simulated RX chip. See the [crate-level documentation](crate).
pub struct Sim {
    icu: &'static IcuDescriptor,
    regs: SpinMutex<RegisterFile>,
    vectors: RamVectorTable,
    pclkb: u32,
    /// Advance time from the idle hook
    auto_tick: AtomicBool,
    ticks: AtomicU64,
    powered: SpinMutex<Vec<Peripheral>>,
}

impl Sim {
    /// Construct a `Sim` of the chip `icu` running its peripheral clock at
    /// `pclkb` hertz.
    pub fn new(icu: &'static IcuDescriptor, pclkb: u32) -> Self {
        Self {
            icu,
            regs: SpinMutex::new(RegisterFile::new(icu)),
            vectors: RamVectorTable::new(),
            pclkb,
            auto_tick: AtomicBool::new(true),
            ticks: AtomicU64::new(0),
            powered: SpinMutex::new(Vec::new()),
        }
    }

    /// Construct a `Sim` and an ICU manager for it, both living for the
    /// rest of the program.
    pub fn boot(icu: &'static IcuDescriptor, pclkb: u32) -> (&'static Self, &'static SimIcu) {
        let sim: &'static Self = Box::leak(Box::new(Self::new(icu, pclkb)));
        let mgr: &'static SimIcu = Box::leak(Box::new(SimIcu::new(sim, sim, icu)));
        log::debug!("booted a simulated {}", icu.name);
        (sim, mgr)
    }

    /// Attach the SCI channel `desc` and construct a driver for it.
    pub fn sci<const RECV: usize, const SEND: usize>(
        &'static self,
        icu: &'static SimIcu,
        desc: &'static SciDescriptor,
    ) -> &'static SimSci<RECV, SEND> {
        self.attach(desc);
        Box::leak(Box::new(SimSci::new(desc, icu, self)))
    }

    /// Add a model of the SCI channel `desc` in its reset state.
    pub fn attach(&self, desc: &'static SciDescriptor) {
        self.regs.lock().attach(desc);
    }

    /// Choose whether the idle hook advances simulated time. When disabled,
    /// the idle hook yields the thread and time only advances through
    /// explicit calls to [`Self::tick`].
    pub fn set_auto_tick(&self, enable: bool) {
        self.auto_tick.store(enable, Ordering::Relaxed);
    }

    /// Get the number of elapsed character times.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Read an 8-bit register without side effects.
    pub fn peek8(&self, addr: usize) -> u8 {
        self.regs.lock().peek(addr)
    }

    /// Read a 32-bit register without side effects.
    pub fn peek32(&self, addr: usize) -> u32 {
        self.regs.lock().peek32(addr)
    }

    /// Write an 8-bit register without side effects.
    pub fn poke8(&self, addr: usize, value: u8) {
        self.regs.lock().poke(addr, value)
    }

    /// Write a 32-bit register without side effects.
    pub fn poke32(&self, addr: usize, value: u32) {
        self.regs.lock().poke32(addr, value)
    }

    /// Get a flag indicating whether `vector` is enabled in its IER
    /// register.
    pub fn is_enabled(&self, vector: Vector) -> bool {
        let (ier, bit) = icu_regs::ier(vector);
        self.peek8(ier.addr()) & bit != 0
    }

    /// Get a flag indicating whether `peripheral` was released from the
    /// module stop state.
    pub fn is_powered(&self, peripheral: Peripheral) -> bool {
        self.powered.lock().contains(&peripheral)
    }

    /// Get the task installed for `vector`.
    pub fn task(&self, vector: Vector) -> Option<Task> {
        self.vectors.task(vector)
    }

    /// Request the interrupt `vector`. Its task runs on the current thread
    /// if the vector is enabled.
    ///
    /// Returns `true` if the interrupt was taken.
    pub fn fire(&self, vector: Vector) -> bool {
        let ir = icu_regs::ir(vector).addr();
        {
            let mut regs = self.regs.lock();
            regs.poke(ir, 1);
            let (ier, bit) = icu_regs::ier(vector);
            if regs.peek(ier.addr()) & bit == 0 {
                log::trace!("{vector:?} is pending but disabled");
                return false;
            }
        }

        log::trace!("taking {vector:?}");
        {
            let _scope = InterruptScope::enter();
            self.vectors.dispatch(vector);
        }

        self.regs.lock().poke(ir, 0);
        true
    }

    fn group(&self, group: Vector) -> &'static GroupDescriptor {
        self.icu
            .groups
            .iter()
            .find(|g| g.vector == group)
            .unwrap_or_else(|| panic!("{group:?} is not a group vector"))
    }

    fn set_group_flag(&self, group: &GroupDescriptor, index: u8, value: bool) -> bool {
        let mut regs = self.regs.lock();
        let bit = 1u32 << index;
        let grp = regs.peek32(group.grp);
        regs.poke32(group.grp, if value { grp | bit } else { grp & !bit });
        regs.peek32(group.gen) & bit != 0
    }

    /// Raise source `index` of the group interrupt `group`, and request the
    /// group vector if the source is enabled in the group.
    ///
    /// Returns `true` if the interrupt was taken.
    ///
    /// # Panics
    ///
    /// Panics if `group` is not a group vector of the chip.
    pub fn raise_group(&self, group: Vector, index: u8) -> bool {
        let group = self.group(group);
        log::trace!("raising bit {index} of {:?}", group.vector);
        self.set_group_flag(group, index, true) && self.fire(group.vector)
    }

    /// Deliver a byte to the receiver of `desc`, together with the error
    /// flags in `errors`.
    ///
    /// The byte is lost if the receiver is disabled. If the previous byte
    /// hasn't been read yet, the byte is lost and the overrun flag is set.
    ///
    /// Returns `true` if the receive interrupt was taken.
    pub fn inject(&self, desc: &SciDescriptor, data: u8, errors: LineErrors) -> bool {
        let take_rxi = {
            let mut regs = self.regs.lock();
            let scr = regs.peek(desc.base + SCR_OFFSET);
            if scr & SCR_RE == 0 {
                log::trace!("{:?}: receiver disabled, {data:#04x} lost", desc.peripheral);
                return false;
            }

            let ssr_addr = desc.base + SSR_OFFSET;
            let ssr = regs.peek(ssr_addr);
            if ssr & SSR_RDRF != 0 {
                log::trace!("{:?}: overrun, {data:#04x} lost", desc.peripheral);
                regs.poke(ssr_addr, ssr | SSR_ORER);
                false
            } else {
                regs.poke(desc.base + RDR_OFFSET, data);
                regs.poke(ssr_addr, ssr | SSR_RDRF | errors.bits());
                scr & SCR_RIE != 0
            }
        };

        take_rxi && self.fire(desc.rxi)
    }

    /// Take everything the transmitter of `desc` has shifted out so far.
    pub fn take_transmitted(&self, desc: &SciDescriptor) -> Vec<u8> {
        let mut regs = self.regs.lock();
        regs.lines
            .iter_mut()
            .find(|l| l.desc.base == desc.base)
            .map(|l| std::mem::take(&mut l.wire))
            .unwrap_or_default()
    }

    /// Advance simulated time by one character.
    ///
    /// Every transmitter shifts out the byte in its TDR, and the resulting
    /// transmit interrupts are taken.
    pub fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);

        let num_lines = self.regs.lock().lines.len();
        for i in 0..num_lines {
            self.tick_line(i);
        }
    }

    fn tick_line(&self, i: usize) {
        let (desc, take_txi, transmit_end) = {
            let mut regs = self.regs.lock();
            let desc = regs.lines[i].desc;
            let ssr_addr = desc.base + SSR_OFFSET;
            let scr = regs.peek(desc.base + SCR_OFFSET);

            let shifted = regs.lines[i].shifting.take();
            if let Some(data) = shifted {
                log::trace!("{:?}: shifted out {data:#04x}", desc.peripheral);
                regs.lines[i].wire.push(data);
                let ssr = regs.peek(ssr_addr);
                regs.poke(ssr_addr, ssr | SSR_TDRE | SSR_TEND);
            }

            let ssr = regs.peek(ssr_addr);
            let take_txi = shifted.is_some() && scr & (SCR_TE | SCR_TIE) == SCR_TE | SCR_TIE;
            let transmit_end = ssr & SSR_TEND != 0 && scr & SCR_TEIE != 0;
            (desc, take_txi, transmit_end)
        };

        if take_txi {
            self.fire(desc.txi);
        }

        match desc.tei {
            IntSource::Vector(tei) => {
                if transmit_end {
                    self.fire(tei);
                }
            }
            IntSource::Group { group, index } => {
                // A level-detected source: the flag follows the condition
                let group = self.group(group);
                if self.set_group_flag(group, index, transmit_end) && transmit_end {
                    self.fire(group.vector);
                }
            }
        }
    }
}

impl Bus for Sim {
    fn read8(&self, addr: usize) -> u8 {
        self.regs.lock().read8(addr)
    }

    fn write8(&self, addr: usize, value: u8) {
        log::trace!("[{addr:#x}] <- {value:#04x}");
        self.regs.lock().write8(addr, value)
    }

    fn read32(&self, addr: usize) -> u32 {
        self.regs.lock().peek32(addr)
    }

    fn write32(&self, addr: usize, value: u32) {
        log::trace!("[{addr:#x}] <- {value:#010x}");
        self.regs.lock().write32(addr, value)
    }
}

impl VectorTable for Sim {
    fn install(&self, vector: Vector, task: Option<Task>) {
        log::trace!(
            "{vector:?} <- {}",
            if task.is_some() { "Some(..)" } else { "None" }
        );
        self.vectors.install(vector, task)
    }
}

impl Idle for Sim {
    fn idle(&self) {
        assert!(
            !crate::is_interrupt_context(),
            "a blocking operation was called from an interrupt handler"
        );

        if self.auto_tick.load(Ordering::Relaxed) {
            self.tick();
        } else {
            std::thread::yield_now();
        }
    }
}

impl Board for Sim {
    fn pclkb(&self) -> u32 {
        self.pclkb
    }

    fn turn_on(&self, peripheral: Peripheral) {
        let mut powered = self.powered.lock();
        if !powered.contains(&peripheral) {
            log::trace!("{peripheral:?} released from module stop");
            powered.push(peripheral);
        }
    }

    fn map_pins(&self, peripheral: Peripheral, enable: bool) -> bool {
        log::trace!("{peripheral:?} pins {}", if enable { "on" } else { "off" });
        true
    }
}
