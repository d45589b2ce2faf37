//! Provides `Dispatch`, a fixed-size table of installable tasks indexed by
//! hardware source number.
use core::{
    fmt,
    sync::atomic::{fence, AtomicU32, AtomicUsize, Ordering},
};

use super::Init;

/// A callback bound to a context value: an entry point and the parameter
/// passed to it.
///
/// The absence of a task is represented by `Option::<Task>::None`.
#[derive(Debug, Clone, Copy)]
pub struct Task {
    func: fn(usize),
    param: usize,
}

impl Task {
    /// Construct a `Task`.
    #[inline]
    pub const fn new(func: fn(usize), param: usize) -> Self {
        Self { func, param }
    }

    /// Get the entry point.
    #[inline]
    pub fn entry_point(&self) -> fn(usize) {
        self.func
    }

    /// Get the parameter passed to the entry point.
    #[inline]
    pub fn param(&self) -> usize {
        self.param
    }

    /// Call the entry point.
    #[inline]
    pub fn run(&self) {
        (self.func)(self.param)
    }
}

struct Slot {
    /// Odd while the slot is being rewritten, bumped twice per rewrite
    seq: AtomicUsize,
    /// The entry point as an address, or `0` if the slot is vacant.
    func: AtomicUsize,
    param: AtomicUsize,
}

impl Slot {
    #[allow(clippy::declare_interior_mutable_const)]
    const VACANT: Self = Self {
        seq: AtomicUsize::new(0),
        func: AtomicUsize::new(0),
        param: AtomicUsize::new(0),
    };

    fn store(&self, task: Option<Task>) {
        let seq = self.seq.load(Ordering::Relaxed);
        self.seq.store(seq.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);

        let (func, param) = task.map_or((0, 0), |task| (task.func as usize, task.param));
        self.func.store(func, Ordering::Relaxed);
        self.param.store(param, Ordering::Relaxed);

        self.seq.store(seq.wrapping_add(2), Ordering::Release);
    }

    fn load(&self) -> Option<Task> {
        loop {
            let seq = self.seq.load(Ordering::Acquire);
            if seq % 2 != 0 {
                // Mid-rewrite, possibly by the context this handler
                // preempted. Vacant until the rewrite completes.
                return None;
            }

            let func = self.func.load(Ordering::Relaxed);
            let param = self.param.load(Ordering::Relaxed);
            fence(Ordering::Acquire);

            if self.seq.load(Ordering::Relaxed) != seq {
                continue;
            }

            if func == 0 {
                return None;
            }

            // Safety: Non-zero values of `func` are only ever produced from
            // `fn(usize)` in `Slot::store`
            let func = unsafe { core::mem::transmute::<usize, fn(usize)>(func) };
            return Some(Task { func, param });
        }
    }
}

/// A fixed-size table of optional [`Task`]s.
///
/// Used as the per-vector interrupt table and as the per-bit table behind
/// each group interrupt. Slots are written during setup and read from
/// interrupt handlers. A reader racing a rewrite sees the old task, the new
/// task, or no task, but never an entry point paired with another task's
/// parameter.
pub struct Dispatch<const N: usize> {
    slots: [Slot; N],
    len: usize,
    mask: AtomicU32,
}

impl<const N: usize> Init for Dispatch<N> {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = Self::new();
}

impl<const N: usize> Default for Dispatch<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for Dispatch<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("size", &self.len)
            .field("mask", &format_args!("{:#010x}", self.get_mask()))
            .finish()
    }
}

impl<const N: usize> Dispatch<N> {
    /// Construct a table with `N` vacant slots.
    pub const fn new() -> Self {
        Self::with_size(N)
    }

    /// Construct a table of which only the first `len` slots are usable.
    ///
    /// # Panics
    ///
    /// Panics if `len > N`.
    pub const fn with_size(len: usize) -> Self {
        assert!(len <= N, "`len` exceeds the table capacity");
        Self {
            slots: [Slot::VACANT; N],
            len,
            mask: AtomicU32::new(0),
        }
    }

    /// Get the number of usable slots.
    #[inline]
    pub const fn size(&self) -> usize {
        self.len
    }

    /// Install or remove (`None`) the task at `index`, replacing whatever was
    /// there.
    ///
    /// Returns `false` and changes nothing if `index >= self.size()`.
    ///
    /// Not reentrant: at most one context may be writing to the table at a
    /// time.
    pub fn set_task(&self, index: usize, task: Option<Task>) -> bool {
        let Some(slot) = self.slots[..self.len].get(index) else {
            return false;
        };

        slot.store(task);

        if index < 32 {
            let bit = 1u32 << index;
            let mask = self.mask.load(Ordering::Relaxed);
            let mask = if task.is_some() {
                mask | bit
            } else {
                mask & !bit
            };
            self.mask.store(mask, Ordering::Release);
        }

        true
    }

    /// Get the task installed at `index`.
    pub fn task(&self, index: usize) -> Option<Task> {
        self.slots[..self.len].get(index)?.load()
    }

    /// Run the task installed at `index`. Does nothing if the slot is vacant
    /// or `index` is out of range.
    #[inline]
    pub fn run_task(&self, index: usize) {
        if let Some(task) = self.task(index) {
            task.run();
        }
    }

    /// Get a bit mask of the occupied slots among the first 32.
    #[inline]
    pub fn get_mask(&self) -> u32 {
        self.mask.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use std::sync::{
        atomic::{AtomicBool, AtomicUsize},
        Arc,
    };

    fn record(param: usize) {
        let counter = unsafe { &*(param as *const AtomicUsize) };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn nop(_: usize) {}

    #[quickcheck]
    fn mask_tracks_occupied_slots(ops: Vec<(u8, bool)>) {
        let table = Dispatch::<40>::new();
        let mut occupied = [false; 40];

        for (index, install) in ops {
            let index = usize::from(index) % 48;
            let task = install.then(|| Task::new(nop, index));
            let accepted = table.set_task(index, task);
            assert_eq!(accepted, index < 40);
            if accepted {
                occupied[index] = install;
            }

            let expected_mask = occupied[..32]
                .iter()
                .enumerate()
                .filter(|&(_, &o)| o)
                .fold(0u32, |mask, (i, _)| mask | 1 << i);
            assert_eq!(table.get_mask(), expected_mask);

            for (i, &o) in occupied.iter().enumerate() {
                assert_eq!(table.task(i).is_some(), o, "slot {i}");
            }
        }
    }

    static ODD_RUNS: AtomicUsize = AtomicUsize::new(0);
    static EVEN_RUNS: AtomicUsize = AtomicUsize::new(0);

    fn odd(_: usize) {
        ODD_RUNS.fetch_add(1, Ordering::Relaxed);
    }

    fn even(_: usize) {
        EVEN_RUNS.fetch_add(1, Ordering::Relaxed);
    }

    /// The entry point a task with parameter `param` is installed with
    fn entry_point_for(param: usize) -> fn(usize) {
        if param % 2 == 1 {
            odd
        } else {
            even
        }
    }

    #[test]
    fn concurrent_reader_sees_whole_tasks() {
        const COUNT: usize = 200_000;

        let table = Arc::new(Dispatch::<1>::new());
        let done = Arc::new(AtomicBool::new(false));

        let writer = {
            let table = Arc::clone(&table);
            let done = Arc::clone(&done);
            std::thread::spawn(move || {
                // The entry points alternate, so a stale parameter always
                // comes with the wrong entry point
                for param in 1..=COUNT {
                    table.set_task(0, Some(Task::new(entry_point_for(param), param)));
                    if param % 1000 == 0 {
                        table.set_task(0, None);
                    }
                }
                done.store(true, Ordering::Release);
            })
        };

        let mut seen = 0;
        while !done.load(Ordering::Acquire) {
            if let Some(task) = table.task(0) {
                assert_eq!(
                    task.entry_point() as usize,
                    entry_point_for(task.param()) as usize,
                    "param = {}",
                    task.param()
                );
                task.run();
                seen += 1;
            }
        }
        writer.join().unwrap();

        log::info!("observed {seen} tasks");
        assert_eq!(
            ODD_RUNS.load(Ordering::Relaxed) + EVEN_RUNS.load(Ordering::Relaxed),
            seen
        );
        assert!(table.task(0).is_none());
    }

    #[test]
    fn slot_being_rewritten_reads_vacant() {
        let table = Dispatch::<2>::new();
        table.set_task(1, Some(Task::new(nop, 7)));

        let seq = table.slots[1].seq.load(Ordering::Relaxed);
        assert_eq!(seq % 2, 0);
        table.slots[1].seq.store(seq + 1, Ordering::Relaxed);
        assert!(table.task(1).is_none());

        table.slots[1].seq.store(seq + 2, Ordering::Relaxed);
        assert_eq!(table.task(1).unwrap().param(), 7);
    }

    #[test]
    fn run_installed_task() {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let table = Dispatch::<32>::INIT;
        let param = &COUNTER as *const _ as usize;

        table.run_task(3);
        assert_eq!(COUNTER.load(Ordering::Relaxed), 0);

        assert!(table.set_task(3, Some(Task::new(record, param))));
        table.run_task(3);
        table.run_task(4);
        assert_eq!(COUNTER.load(Ordering::Relaxed), 1);

        let task = table.task(3).unwrap();
        assert_eq!(task.param(), param);

        assert!(table.set_task(3, None));
        table.run_task(3);
        assert_eq!(COUNTER.load(Ordering::Relaxed), 1);
        assert_eq!(table.get_mask(), 0);
    }

    #[test]
    fn reduced_size() {
        let table = Dispatch::<32>::with_size(22);
        assert_eq!(table.size(), 22);
        assert!(table.set_task(21, Some(Task::new(nop, 0))));
        assert!(!table.set_task(22, Some(Task::new(nop, 0))));
        assert!(table.task(22).is_none());
        assert_eq!(table.get_mask(), 1 << 21);

        // Out-of-range indices are ignored
        table.run_task(100);
    }

    #[test]
    #[should_panic]
    fn oversized() {
        let _ = Dispatch::<4>::with_size(5);
    }
}
