//! The implementation of the SCI driver.
use core::{
    fmt,
    sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering},
};

use super::{
    cfg::{IntSource, Parity, Protocol, SciDescriptor, StartError, TxPolicy},
    sci_regs::{SciRegs, SCR, SEMR, SMR, SSR},
    BaudConfig,
};
use crate::{
    bus::Bus,
    icu::{IcuMgr, InstallGroupTaskError, SetLevelError, MAX_LEVEL},
    port::{Board, VectorTable},
    utils::{Fifo, Task},
};

/// Interrupt-driven serial I/O over one SCI channel, buffered by a
/// `RECV`-byte receive queue and a `SEND`-byte send queue.
///
/// The blocking operations ([`Self::putch`], [`Self::getch`]) must only be
/// called from the main line, never from an interrupt handler. With level
/// `0` the driver polls the status register instead of using interrupts.
pub struct SciIo<B: 'static, V: 'static, Bd: 'static, const RECV: usize, const SEND: usize> {
    desc: &'static SciDescriptor,
    icu: &'static IcuMgr<B, V>,
    board: &'static Bd,
    recv: Fifo<RECV>,
    send: Fifo<SEND>,
    level: AtomicU8,
    auto_crlf: AtomicBool,
    /// TXI is off because the send queue ran dry ([`TxPolicy::Stall`] only)
    send_stall: AtomicBool,
    /// The packed [`BaudConfig`] of the last successful `start`
    baud_config: AtomicU32,
}

impl<B: 'static, V: 'static, Bd: 'static, const RECV: usize, const SEND: usize> fmt::Debug
    for SciIo<B, V, Bd, RECV, SEND>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SciIo")
            .field("peripheral", &self.desc.peripheral)
            .field("level", &self.level.load(Ordering::Relaxed))
            .field("recv", &self.recv)
            .field("send", &self.send)
            .finish()
    }
}

const CONFIG_VALID: u32 = 1 << 24;
const CONFIG_MDDR: u32 = 1 << 25;
const CONFIG_ABCS: u32 = 1 << 26;

fn pack_config(c: &BaudConfig) -> u32 {
    let mut bits = CONFIG_VALID | u32::from(c.cks) | u32::from(c.brr) << 8;
    if let Some(mddr) = c.mddr {
        bits |= CONFIG_MDDR | u32::from(mddr) << 16;
    }
    if c.abcs {
        bits |= CONFIG_ABCS;
    }
    bits
}

fn unpack_config(bits: u32) -> Option<BaudConfig> {
    (bits & CONFIG_VALID != 0).then(|| BaudConfig {
        cks: bits as u8,
        brr: (bits >> 8) as u8,
        mddr: (bits & CONFIG_MDDR != 0).then(|| (bits >> 16) as u8),
        abcs: bits & CONFIG_ABCS != 0,
    })
}

impl<B, V, Bd, const RECV: usize, const SEND: usize> SciIo<B, V, Bd, RECV, SEND>
where
    B: Bus + 'static,
    V: VectorTable + 'static,
    Bd: Board + 'static,
{
    /// Construct an `SciIo` for the channel `desc`. The channel stays
    /// untouched until [`Self::start`] is called.
    pub const fn new(
        desc: &'static SciDescriptor,
        icu: &'static IcuMgr<B, V>,
        board: &'static Bd,
    ) -> Self {
        Self {
            desc,
            icu,
            board,
            recv: Fifo::new(),
            send: Fifo::new(),
            level: AtomicU8::new(0),
            auto_crlf: AtomicBool::new(true),
            send_stall: AtomicBool::new(true),
            baud_config: AtomicU32::new(0),
        }
    }

    #[inline]
    fn regs(&self) -> SciRegs {
        SciRegs::at(self.desc.base)
    }

    #[inline]
    fn bus(&self) -> &B {
        self.icu.bus()
    }

    #[inline]
    pub fn descriptor(&self) -> &'static SciDescriptor {
        self.desc
    }

    /// Get the interrupt level given to the last successful `start`. `0`
    /// means polling mode.
    #[inline]
    pub fn level(&self) -> u8 {
        self.level.load(Ordering::Acquire)
    }

    /// Get the bit rate generator settings chosen by the last successful
    /// `start`.
    pub fn baud_config(&self) -> Option<BaudConfig> {
        unpack_config(self.baud_config.load(Ordering::Acquire))
    }

    /// Enable or disable the translation of `'\n'` into `"\r\n"` on output.
    pub fn auto_crlf(&self, enable: bool) {
        self.auto_crlf.store(enable, Ordering::Relaxed);
    }

    /// (Re)initialize the channel for `baud` bits per second. `level` selects
    /// the interrupt level, or polling mode if `0`.
    ///
    /// Nothing is touched if the arguments are rejected. Bytes still queued
    /// from a previous configuration are discarded.
    pub fn start(
        &'static self,
        baud: u32,
        level: u8,
        protocol: Protocol,
    ) -> Result<BaudConfig, StartError> {
        let desc = self.desc;

        if level == 0 && !desc.polling_supported {
            log::warn!("{:?}: polling mode is unsupported", desc.peripheral);
            return Err(StartError::PollingUnsupported);
        }
        if level > MAX_LEVEL {
            log::warn!("{:?}: level {level} is out of range", desc.peripheral);
            return Err(StartError::Icu(SetLevelError::BadLevel));
        }

        let config = BaudConfig::compute(self.board.pclkb(), baud).map_err(|e| {
            log::warn!("{:?}: can't generate {baud} bps: {e:?}", desc.peripheral);
            StartError::BadBaudRate(e)
        })?;

        self.check_sources()?;

        log::debug!(
            "{:?}: start({baud}, {level}, {protocol:?}) with {config:?}",
            desc.peripheral
        );

        let sci = self.regs();
        let bus = self.bus();

        self.board.turn_on(desc.peripheral);
        sci.scr().set(bus, 0);

        if !self.board.map_pins(desc.peripheral, true) {
            log::warn!("{:?}: the board has no pin assignment", desc.peripheral);
        }

        // Both queues are quiescent now that SCR is cleared
        self.recv.clear();
        self.send.clear();
        self.send_stall.store(true, Ordering::Release);
        self.level.store(level, Ordering::Release);
        self.baud_config.store(pack_config(&config), Ordering::Release);

        self.install_tasks(level)?;
        self.icu.set_level(desc.peripheral, level)?;

        let parity = match protocol.parity() {
            Parity::None => SMR::PE::CLEAR,
            Parity::Even => SMR::PE::SET + SMR::PM::Even,
            Parity::Odd => SMR::PE::SET + SMR::PM::Odd,
        };
        let stop = if protocol.stop_bits() == 2 {
            SMR::STOP::Two
        } else {
            SMR::STOP::One
        };
        sci.smr()
            .write(bus, SMR::CKS.val(config.cks) + parity + stop);
        sci.semr().write(
            bus,
            SEMR::ABCS.val(config.abcs.into()) + SEMR::BRME.val(config.mddr.is_some().into()),
        );
        sci.brr().set(bus, config.brr);
        sci.mddr().set(bus, config.mddr.unwrap_or(0xff));

        if level > 0 {
            sci.scr().write(bus, SCR::RIE::SET + SCR::TE::SET + SCR::RE::SET);
        } else {
            sci.scr().write(bus, SCR::TE::SET + SCR::RE::SET);
        }

        Ok(config)
    }

    /// Check that the ICU knows every source `start` is going to configure.
    fn check_sources(&self) -> Result<(), StartError> {
        let desc = self.desc;
        let icu = self.icu.descriptor();

        if icu.peripheral(desc.peripheral).is_none() {
            log::warn!("{:?} is unknown to {}", desc.peripheral, icu.name);
            return Err(StartError::Icu(SetLevelError::BadParam));
        }

        if let IntSource::Group { group, index } = desc.tx_source() {
            let Some(i) = icu.group_index(group) else {
                log::warn!("{:?}: {group:?} is not a group vector", desc.peripheral);
                return Err(StartError::Vector(InstallGroupTaskError::NotGroup));
            };
            if index >= icu.groups[i].len {
                log::warn!("{:?}: index {index} is outside {group:?}", desc.peripheral);
                return Err(StartError::Vector(InstallGroupTaskError::BadIndex));
            }
        }

        Ok(())
    }

    fn install_tasks(&'static self, level: u8) -> Result<(), StartError> {
        let param = self as *const Self as usize;
        let (rx_task, tx_task) = if level > 0 {
            (
                Some(Task::new(Self::handle_rx, param)),
                Some(Task::new(Self::handle_tx, param)),
            )
        } else {
            (None, None)
        };

        self.install(IntSource::Vector(self.desc.rxi), rx_task)?;

        let tx_source = self.desc.tx_source();
        self.install(tx_source, tx_task)?;

        // A group vector is shared with other sources; enable it if nobody
        // has yet, but never disable it here
        if let (IntSource::Group { group, .. }, true) = (tx_source, level > 0) {
            if self.icu.level(group) == Some(0) {
                self.icu.set_level(group, level)?;
            }
        }

        Ok(())
    }

    fn install(&self, source: IntSource, task: Option<Task>) -> Result<(), StartError> {
        match source {
            IntSource::Vector(vector) => {
                self.icu.vector_table().install(vector, task);
                Ok(())
            }
            IntSource::Group { group, index } => {
                Ok(self.icu.install_group_task(group, index.into(), task)?)
            }
        }
    }

    /// # Safety
    ///
    /// `param` must have been created from `&'static Self` by
    /// `install_tasks`.
    #[inline]
    unsafe fn from_param(param: usize) -> &'static Self {
        // Safety: Upheld by the caller
        unsafe { &*(param as *const Self) }
    }

    fn handle_rx(param: usize) {
        // Safety: Installed with a matching `param` by `install_tasks`
        unsafe { Self::from_param(param) }.on_receive();
    }

    fn handle_tx(param: usize) {
        // Safety: Installed with a matching `param` by `install_tasks`
        unsafe { Self::from_param(param) }.on_transmit();
    }

    fn on_receive(&self) {
        let sci = self.regs();
        let bus = self.bus();

        let mut error = false;
        if sci.ssr().is_set(bus, SSR::ORER) {
            sci.ssr().modify(bus, SSR::ORER::CLEAR);
            error = true;
        }

        let ssr = sci.ssr().extract(bus);
        if ssr.is_set(SSR::FER) || ssr.is_set(SSR::PER) {
            sci.ssr().modify(bus, SSR::FER::CLEAR + SSR::PER::CLEAR);
            error = true;
        }

        let data = sci.rdr().get(bus);
        if !error {
            self.recv.put(data);
        }
    }

    fn on_transmit(&self) {
        let sci = self.regs();
        let bus = self.bus();

        if let Some(data) = self.send.try_get() {
            sci.tdr().set(bus, data);
        }

        if self.send.is_empty() {
            match self.desc.tx_policy {
                TxPolicy::Stall => {
                    sci.scr().modify(bus, SCR::TIE::CLEAR);
                    self.send_stall.store(true, Ordering::Release);
                }
                TxPolicy::TransmitEnd => {
                    sci.scr().modify(bus, SCR::TEIE::CLEAR);
                }
            }
        }
    }

    fn wait_transmit_end(&self) {
        let sci = self.regs();
        while !sci.ssr().is_set(self.bus(), SSR::TEND) {
            self.board.idle();
        }
    }

    #[inline]
    fn send_threshold(&self) -> usize {
        self.send.size() * 7 / 8
    }

    /// Output one byte without newline translation.
    fn put_raw(&self, ch: u8) {
        let sci = self.regs();
        let bus = self.bus();

        if self.level() == 0 {
            self.wait_transmit_end();
            sci.tdr().set(bus, ch);
            return;
        }

        if sci.ssr().is_set(bus, SSR::ORER) {
            sci.ssr().modify(bus, SSR::ORER::CLEAR);
        }

        if self.send.length() >= self.send_threshold() {
            while !self.send.is_empty() {
                self.board.idle();
            }
        }

        self.send.put(ch);

        match self.desc.tx_policy {
            TxPolicy::Stall => {
                // The transmit task is masked from here on, which makes this
                // context the send queue's only consumer
                sci.scr().modify(bus, SCR::TIE::CLEAR);

                if self.send_stall.load(Ordering::Acquire) {
                    self.wait_transmit_end();
                    if let Some(data) = self.send.try_get() {
                        sci.tdr().set(bus, data);
                    }
                    if !self.send.is_empty() {
                        self.send_stall.store(false, Ordering::Release);
                    }
                }

                if !self.send_stall.load(Ordering::Acquire) {
                    sci.scr().modify(bus, SCR::TIE::SET);
                }
            }
            TxPolicy::TransmitEnd => {
                if !sci.scr().is_set(bus, SCR::TEIE) {
                    sci.scr().modify(bus, SCR::TEIE::SET);
                }
            }
        }
    }

    /// Output one byte, preceded by `'\r'` if it's `'\n'` and CR/LF
    /// translation is enabled.
    ///
    /// Blocks while the send queue is nearly full (7/8 of its capacity)
    /// until it has drained completely.
    pub fn putch(&self, ch: u8) {
        if ch == b'\n' && self.auto_crlf.load(Ordering::Relaxed) {
            self.put_raw(b'\r');
        }
        self.put_raw(ch);
    }

    /// Output every byte of `s` through [`Self::putch`].
    pub fn puts(&self, s: &str) {
        for ch in s.bytes() {
            self.putch(ch);
        }
    }

    /// Input one byte, blocking until one is available.
    pub fn getch(&self) -> u8 {
        if self.level() > 0 {
            self.recv.get(self.board)
        } else {
            while self.recv_length() == 0 {
                self.board.idle();
            }
            self.regs().rdr().get(self.bus())
        }
    }

    /// Get the number of received bytes waiting to be read. Polling mode
    /// reports at most `1`.
    pub fn recv_length(&self) -> usize {
        if self.level() > 0 {
            return self.recv.length();
        }

        let sci = self.regs();
        let bus = self.bus();
        if sci.ssr().is_set(bus, SSR::ORER) {
            sci.ssr().modify(bus, SSR::ORER::CLEAR);
        }
        usize::from(sci.ssr().is_set(bus, SSR::RDRF))
    }

    /// Get the number of bytes waiting to be transmitted. Always `0` in
    /// polling mode.
    pub fn send_length(&self) -> usize {
        if self.level() > 0 {
            self.send.length()
        } else {
            0
        }
    }

    /// Get an adapter implementing the `embedded-hal` serial traits.
    pub fn nb(&self) -> NbSerial<'_, B, V, Bd, RECV, SEND> {
        NbSerial(self)
    }
}

impl<B, V, Bd, const RECV: usize, const SEND: usize> fmt::Write
    for &SciIo<B, V, Bd, RECV, SEND>
where
    B: Bus + 'static,
    V: VectorTable + 'static,
    Bd: Board + 'static,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.puts(s);
        Ok(())
    }
}

/// The adapter for [`SciIo`] that uses [`::nb`] to notify the caller of a
/// blocking situation instead of waiting. No newline translation is done.
pub struct NbSerial<'a, B: 'static, V: 'static, Bd: 'static, const RECV: usize, const SEND: usize>(
    &'a SciIo<B, V, Bd, RECV, SEND>,
);

impl<B, V, Bd, const RECV: usize, const SEND: usize> embedded_hal::serial::Write<u8>
    for NbSerial<'_, B, V, Bd, RECV, SEND>
where
    B: Bus + 'static,
    V: VectorTable + 'static,
    Bd: Board + 'static,
{
    type Error = core::convert::Infallible;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        let io = self.0;
        let sci = io.regs();
        let transmit_end = sci.ssr().is_set(io.bus(), SSR::TEND);

        let would_block = if io.level() == 0 {
            !transmit_end
        } else {
            io.send.length() >= io.send_threshold()
                || (io.desc.tx_policy == TxPolicy::Stall
                    && io.send_stall.load(Ordering::Acquire)
                    && !transmit_end)
        };

        if would_block {
            Err(nb::Error::WouldBlock)
        } else {
            io.put_raw(word);
            Ok(())
        }
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        let io = self.0;
        if io.send.is_empty() && io.regs().ssr().is_set(io.bus(), SSR::TEND) {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

impl<B, V, Bd, const RECV: usize, const SEND: usize> embedded_hal::serial::Read<u8>
    for NbSerial<'_, B, V, Bd, RECV, SEND>
where
    B: Bus + 'static,
    V: VectorTable + 'static,
    Bd: Board + 'static,
{
    type Error = core::convert::Infallible;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        if self.0.recv_length() == 0 {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(self.0.getch())
        }
    }
}
