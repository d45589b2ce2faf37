//! The hardware register boundary
use core::{fmt, marker::PhantomData};
use tock_registers::{
    fields::{Field, FieldValue},
    LocalRegisterCopy, RegisterLongName, UIntLike,
};

/// Byte- and word-sized access to the peripheral address space.
///
/// All addresses handed to a `Bus` are physical register addresses.
pub trait Bus: Sync {
    fn read8(&self, addr: usize) -> u8;
    fn write8(&self, addr: usize, value: u8);
    fn read32(&self, addr: usize) -> u32;
    fn write32(&self, addr: usize, value: u32);
}

impl<T: Bus + ?Sized> Bus for &T {
    #[inline]
    fn read8(&self, addr: usize) -> u8 {
        (**self).read8(addr)
    }

    #[inline]
    fn write8(&self, addr: usize, value: u8) {
        (**self).write8(addr, value)
    }

    #[inline]
    fn read32(&self, addr: usize) -> u32 {
        (**self).read32(addr)
    }

    #[inline]
    fn write32(&self, addr: usize, value: u32) {
        (**self).write32(addr, value)
    }
}

/// A [`Bus`] performing volatile accesses to memory-mapped registers.
#[derive(Debug, Clone, Copy)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// Construct an `Mmio`.
    ///
    /// # Safety
    ///
    /// The code must be running on the target hardware, and every address
    /// passed to the resulting `Bus` must be a valid register address of
    /// the matching width.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl Bus for Mmio {
    #[inline]
    fn read8(&self, addr: usize) -> u8 {
        // Safety: Guaranteed by `Mmio::new`'s caller
        unsafe { (addr as *const u8).read_volatile() }
    }

    #[inline]
    fn write8(&self, addr: usize, value: u8) {
        // Safety: Guaranteed by `Mmio::new`'s caller
        unsafe { (addr as *mut u8).write_volatile(value) }
    }

    #[inline]
    fn read32(&self, addr: usize) -> u32 {
        // Safety: Guaranteed by `Mmio::new`'s caller
        unsafe { (addr as *const u32).read_volatile() }
    }

    #[inline]
    fn write32(&self, addr: usize, value: u32) {
        // Safety: Guaranteed by `Mmio::new`'s caller
        unsafe { (addr as *mut u32).write_volatile(value) }
    }
}

/// Register widths supported by [`Bus`].
pub trait Width: UIntLike {
    fn load(bus: &(impl Bus + ?Sized), addr: usize) -> Self;
    fn store(bus: &(impl Bus + ?Sized), addr: usize, value: Self);
}

impl Width for u8 {
    #[inline]
    fn load(bus: &(impl Bus + ?Sized), addr: usize) -> Self {
        bus.read8(addr)
    }

    #[inline]
    fn store(bus: &(impl Bus + ?Sized), addr: usize, value: Self) {
        bus.write8(addr, value)
    }
}

impl Width for u32 {
    #[inline]
    fn load(bus: &(impl Bus + ?Sized), addr: usize) -> Self {
        bus.read32(addr)
    }

    #[inline]
    fn store(bus: &(impl Bus + ?Sized), addr: usize, value: Self) {
        bus.write32(addr, value)
    }
}

/// A handle to the register at a fixed address, with bit fields described
/// by `R`. Every access goes through the [`Bus`] passed to it.
pub struct Reg<T: Width, R: RegisterLongName = ()> {
    addr: usize,
    _phantom: PhantomData<(T, R)>,
}

/// An 8-bit register handle.
pub type Reg8<R = ()> = Reg<u8, R>;

/// A 32-bit register handle.
pub type Reg32<R = ()> = Reg<u32, R>;

impl<T: Width, R: RegisterLongName> Clone for Reg<T, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Width, R: RegisterLongName> Copy for Reg<T, R> {}

impl<T: Width, R: RegisterLongName> fmt::Debug for Reg<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reg({:#x})", self.addr)
    }
}

impl<T: Width, R: RegisterLongName> Reg<T, R> {
    #[inline]
    pub const fn at(addr: usize) -> Self {
        Self {
            addr,
            _phantom: PhantomData,
        }
    }

    #[inline]
    pub const fn addr(&self) -> usize {
        self.addr
    }

    #[inline]
    pub fn get(&self, bus: &(impl Bus + ?Sized)) -> T {
        T::load(bus, self.addr)
    }

    #[inline]
    pub fn set(&self, bus: &(impl Bus + ?Sized), value: T) {
        T::store(bus, self.addr, value)
    }

    /// Read the register into a local copy for inspecting several fields
    /// from one access.
    #[inline]
    pub fn extract(&self, bus: &(impl Bus + ?Sized)) -> LocalRegisterCopy<T, R> {
        LocalRegisterCopy::new(self.get(bus))
    }

    #[inline]
    pub fn read(&self, bus: &(impl Bus + ?Sized), field: Field<T, R>) -> T {
        field.read(self.get(bus))
    }

    #[inline]
    pub fn is_set(&self, bus: &(impl Bus + ?Sized), field: Field<T, R>) -> bool {
        field.is_set(self.get(bus))
    }

    /// Overwrite the whole register with `value`. Fields not mentioned in
    /// `value` become zero.
    #[inline]
    pub fn write(&self, bus: &(impl Bus + ?Sized), value: FieldValue<T, R>) {
        self.set(bus, value.value)
    }

    /// Read-modify-write the fields mentioned in `value`.
    #[inline]
    pub fn modify(&self, bus: &(impl Bus + ?Sized), value: FieldValue<T, R>) {
        let mut reg = self.extract(bus);
        reg.modify(value);
        self.set(bus, reg.get());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, collections::HashMap};
    use tock_registers::register_bitfields;

    register_bitfields! {u8,
        CTL [
            MODE OFFSET(0) NUMBITS(2) [],
            ENABLE OFFSET(7) NUMBITS(1) []
        ]
    }

    #[derive(Default)]
    struct Memory(RefCell<HashMap<usize, u8>>);

    // Single-threaded tests only
    unsafe impl Sync for Memory {}

    impl Bus for Memory {
        fn read8(&self, addr: usize) -> u8 {
            self.0.borrow().get(&addr).copied().unwrap_or(0)
        }

        fn write8(&self, addr: usize, value: u8) {
            self.0.borrow_mut().insert(addr, value);
        }

        fn read32(&self, addr: usize) -> u32 {
            u32::from_le_bytes([0, 1, 2, 3].map(|i| self.read8(addr + i)))
        }

        fn write32(&self, addr: usize, value: u32) {
            for (i, byte) in value.to_le_bytes().into_iter().enumerate() {
                self.write8(addr + i, byte);
            }
        }
    }

    #[test]
    fn field_access() {
        let bus = Memory::default();
        let reg = Reg8::<CTL::Register>::at(0x100);

        reg.write(&bus, CTL::MODE.val(2));
        assert_eq!(bus.read8(0x100), 0b10);

        reg.modify(&bus, CTL::ENABLE::SET);
        assert_eq!(bus.read8(0x100), 0b1000_0010);
        assert!(reg.is_set(&bus, CTL::ENABLE));
        assert_eq!(reg.read(&bus, CTL::MODE), 2);

        reg.modify(&bus, CTL::MODE.val(1) + CTL::ENABLE::CLEAR);
        assert_eq!(reg.get(&bus), 0b01);
    }

    #[test]
    fn word_access_through_reference() {
        let bus = Memory::default();
        let reg = Reg32::<()>::at(0x200);
        reg.set(&&bus, 0x1234_5678);
        assert_eq!(bus.read8(0x200), 0x78);
        assert_eq!(reg.get(&bus), 0x1234_5678);
    }
}
