//! Provides `Fifo`, a fixed-capacity byte queue shared between an interrupt
//! handler and the main line.
use core::{
    fmt,
    sync::atomic::{AtomicU8, AtomicUsize, Ordering},
};

use super::Init;
use crate::port::Idle;

/// A fixed-capacity byte queue with one producer and one consumer.
///
/// The producer only ever advances the write cursor and the consumer only
/// ever advances the read cursor, so the two sides can run concurrently (an
/// interrupt handler against the main line, or two host threads) without a
/// lock. Two producers or two consumers racing each other lose bytes but
/// cannot cause undefined behavior.
///
/// Both cursors count modulo `2 * N` so that a full queue can be told apart
/// from an empty one without giving up a slot.
pub struct Fifo<const N: usize> {
    slots: [AtomicU8; N],
    put_pos: AtomicUsize,
    get_pos: AtomicUsize,
}

impl<const N: usize> Init for Fifo<N> {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = Self::new();
}

impl<const N: usize> Default for Fifo<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for Fifo<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fifo")
            .field("len", &self.length())
            .field("size", &N)
            .finish()
    }
}

impl<const N: usize> Fifo<N> {
    /// Construct an empty queue.
    pub const fn new() -> Self {
        assert!(N > 0, "queue capacity must be non-zero");
        assert!(N <= usize::MAX / 2, "queue capacity is too large");

        #[allow(clippy::declare_interior_mutable_const)]
        const EMPTY: AtomicU8 = AtomicU8::new(0);

        Self {
            slots: [EMPTY; N],
            put_pos: AtomicUsize::new(0),
            get_pos: AtomicUsize::new(0),
        }
    }

    #[inline]
    fn advance(pos: usize) -> usize {
        if pos + 1 == N * 2 {
            0
        } else {
            pos + 1
        }
    }

    #[inline]
    fn distance(put_pos: usize, get_pos: usize) -> usize {
        if put_pos >= get_pos {
            put_pos - get_pos
        } else {
            put_pos + N * 2 - get_pos
        }
    }

    #[inline]
    fn slot(&self, pos: usize) -> &AtomicU8 {
        &self.slots[if pos >= N { pos - N } else { pos }]
    }

    /// Get the capacity of the queue.
    #[inline]
    pub const fn size(&self) -> usize {
        N
    }

    /// Get the number of buffered bytes.
    ///
    /// The producer observes an upper bound and the consumer a lower bound
    /// of the true value while the other side is running.
    #[inline]
    pub fn length(&self) -> usize {
        let get_pos = self.get_pos.load(Ordering::Acquire);
        let put_pos = self.put_pos.load(Ordering::Acquire);
        Self::distance(put_pos, get_pos)
    }

    /// Get a flag indicating whether the queue is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    /// Append a byte. Never blocks.
    ///
    /// Returns `false` and discards `value` if the queue is full.
    pub fn put(&self, value: u8) -> bool {
        let put_pos = self.put_pos.load(Ordering::Relaxed);
        let get_pos = self.get_pos.load(Ordering::Acquire);
        if Self::distance(put_pos, get_pos) >= N {
            return false;
        }

        self.slot(put_pos).store(value, Ordering::Relaxed);
        self.put_pos.store(Self::advance(put_pos), Ordering::Release);
        true
    }

    /// Remove and return the oldest byte if there is one.
    pub fn try_get(&self) -> Option<u8> {
        let get_pos = self.get_pos.load(Ordering::Relaxed);
        let put_pos = self.put_pos.load(Ordering::Acquire);
        if put_pos == get_pos {
            return None;
        }

        let value = self.slot(get_pos).load(Ordering::Relaxed);
        self.get_pos.store(Self::advance(get_pos), Ordering::Release);
        Some(value)
    }

    /// Remove and return the oldest byte, calling `idle` until one becomes
    /// available.
    pub fn get(&self, idle: &impl Idle) -> u8 {
        loop {
            if let Some(value) = self.try_get() {
                return value;
            }
            idle.idle();
        }
    }

    /// Discard all buffered bytes. This is a consumer-side operation.
    pub fn clear(&self) {
        let put_pos = self.put_pos.load(Ordering::Acquire);
        self.get_pos.store(put_pos, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::Spin;
    use quickcheck_macros::quickcheck;
    use std::{collections::VecDeque, sync::Arc};

    /// An operation on `Fifo`.
    #[derive(Debug)]
    enum Cmd {
        Put(u8),
        Get,
        Clear,
    }

    /// Map random bytes to operations on `Fifo`.
    fn interpret(bytecode: &[u8]) -> impl Iterator<Item = Cmd> + '_ {
        bytecode.chunks_exact(2).map(|instr| match instr[0] % 8 {
            0..=3 => Cmd::Put(instr[1]),
            4..=6 => Cmd::Get,
            _ => Cmd::Clear,
        })
    }

    fn test_inner<const N: usize>(bytecode: Vec<u8>) {
        let subject = Fifo::<N>::INIT;
        let mut reference = VecDeque::new();

        log::info!("size = {N}");

        for cmd in interpret(&bytecode) {
            log::trace!("    {cmd:?}");
            match cmd {
                Cmd::Put(value) => {
                    let accepted = subject.put(value);
                    assert_eq!(accepted, reference.len() < N);
                    if accepted {
                        reference.push_back(value);
                    }
                }
                Cmd::Get => {
                    assert_eq!(subject.try_get(), reference.pop_front());
                }
                Cmd::Clear => {
                    subject.clear();
                    reference.clear();
                }
            }

            assert_eq!(subject.length(), reference.len());
            assert!(subject.length() <= subject.size());
        }
    }

    macro_rules! gen_test {
        ($(#[$m:meta])* mod $name:ident, $size:literal) => {
            $(#[$m])*
            mod $name {
                use super::*;

                #[quickcheck]
                fn test(bytecode: Vec<u8>) {
                    let _ = env_logger::try_init();
                    test_inner::<$size>(bytecode);
                }
            }
        };
    }

    gen_test!(mod size_1, 1);
    gen_test!(mod size_2, 2);
    gen_test!(mod size_3, 3);
    gen_test!(mod size_16, 16);
    gen_test!(mod size_31, 31);
    gen_test!(mod size_256, 256);

    #[quickcheck]
    fn length_after_puts_and_gets(values: Vec<u8>, gets: usize) -> bool {
        let fifo = Fifo::<1024>::new();
        let values = &values[..values.len().min(1024)];
        for &value in values {
            assert!(fifo.put(value));
        }

        let gets = gets % (values.len() + 1);
        let got: Vec<u8> = (0..gets).map(|_| fifo.get(&Spin)).collect();

        got == values[..gets] && fifo.length() == values.len() - gets
    }

    #[test]
    fn full_queue_drops_newest() {
        let fifo = Fifo::<4>::new();
        for i in 0..4 {
            assert!(fifo.put(i));
        }
        assert!(!fifo.put(4));
        assert_eq!(fifo.length(), 4);

        assert_eq!(fifo.try_get(), Some(0));
        assert!(fifo.put(5));
        let rest: Vec<u8> = std::iter::from_fn(|| fifo.try_get()).collect();
        assert_eq!(rest, [1, 2, 3, 5]);
        assert!(fifo.is_empty());
    }

    #[test]
    fn cursors_wrap_around() {
        let fifo = Fifo::<3>::new();
        for i in 0..=255u8 {
            assert!(fifo.put(i));
            assert!(fifo.put(i.wrapping_mul(7)));
            assert_eq!(fifo.length(), 2);
            assert_eq!(fifo.try_get(), Some(i));
            assert_eq!(fifo.try_get(), Some(i.wrapping_mul(7)));
            assert_eq!(fifo.try_get(), None);
        }
    }

    #[test]
    fn spsc_threads() {
        const COUNT: usize = 100_000;

        let fifo = Arc::new(Fifo::<64>::new());
        let producer = {
            let fifo = Arc::clone(&fifo);
            std::thread::spawn(move || {
                for i in 0..COUNT {
                    while !fifo.put(i as u8) {
                        std::thread::yield_now();
                    }
                }
            })
        };

        struct Yield;
        impl Idle for Yield {
            fn idle(&self) {
                std::thread::yield_now();
            }
        }

        for i in 0..COUNT {
            assert_eq!(fifo.get(&Yield), i as u8);
        }

        producer.join().unwrap();
        assert!(fifo.is_empty());
    }
}
