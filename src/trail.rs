use crate::cell::Cell;
use crate::heap::Heap;

/// Undo log of variable bindings.
///
/// Holds heap addresses of variables that were unbound when pushed and
/// got bound afterwards. Unwinding resets each one to point at itself.
#[derive(Default)]
pub struct Trail {
    addrs: Vec<usize>,
}

impl Trail {
    pub fn new() -> Self {
        Trail { addrs: Vec::new() }
    }

    #[inline]
    pub fn push(&mut self, addr: usize) {
        self.addrs.push(addr);
    }

    /// Current length; used as a watermark by spines.
    #[inline]
    pub fn mark(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    /// Undo every binding recorded after `mark`.
    pub fn unwind(&mut self, mark: usize, heap: &mut Heap) {
        while self.addrs.len() > mark {
            if let Some(addr) = self.addrs.pop() {
                heap.set(addr, Cell::var(addr));
            }
        }
    }
}
