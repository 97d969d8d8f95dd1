use crate::cell::{Cell, Tag};
use crate::heap::Heap;
use crate::trail::Trail;

/// Non-recursive unifier. The work stack is kept between calls so its
/// allocation is reused.
#[derive(Default)]
pub struct Unifier {
    stack: Vec<Cell>,
}

impl Unifier {
    pub fn new() -> Self {
        Unifier { stack: Vec::new() }
    }

    /// Unify the terms rooted at `goal` and `head`.
    ///
    /// Variables at addresses `<= boundary` are trailed when bound; younger
    /// ones belong to the clause copy being tried and vanish with it.
    /// On failure the bindings made so far stay in place; the caller
    /// unwinds the trail.
    pub fn unify(
        &mut self,
        heap: &mut Heap,
        trail: &mut Trail,
        goal: Cell,
        head: Cell,
        boundary: usize,
    ) -> bool {
        self.stack.clear();
        self.stack.push(head);
        self.stack.push(goal);

        while let Some(a) = self.stack.pop() {
            let Some(b) = self.stack.pop() else {
                break;
            };
            let x1 = heap.deref(a);
            let x2 = heap.deref(b);
            if x1 == x2 {
                continue;
            }

            if x1.is_var() {
                // Between two unbound variables, the younger (higher address)
                // is bound to the older one so chains always point downwards.
                if x2.is_var() && x2.addr() > x1.addr() {
                    bind(heap, trail, x2.addr(), x1, boundary);
                } else {
                    bind(heap, trail, x1.addr(), x2, boundary);
                }
            } else if x2.is_var() {
                bind(heap, trail, x2.addr(), x1, boundary);
            } else if x1.tag() == Tag::StructRef && x2.tag() == Tag::StructRef {
                if !self.push_arguments(heap, x1.addr(), x2.addr()) {
                    return false;
                }
            } else {
                return false;
            }
        }
        true
    }

    /// Queue the element pairs of two structures; false on arity mismatch.
    fn push_arguments(&mut self, heap: &Heap, w1: usize, w2: usize) -> bool {
        let h1 = heap.get(w1);
        let h2 = heap.get(w2);
        if h1 != h2 {
            return false;
        }
        let n = h1.addr();
        // Pushed right to left so the leftmost pair is popped first.
        for i in (1..=n).rev() {
            let u1 = heap.get(w1 + i);
            let u2 = heap.get(w2 + i);
            if u1 == u2 {
                continue;
            }
            self.stack.push(u2);
            self.stack.push(u1);
        }
        true
    }
}

#[inline]
fn bind(heap: &mut Heap, trail: &mut Trail, addr: usize, value: Cell, boundary: usize) {
    heap.set(addr, value);
    if addr <= boundary {
        trail.push(addr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Push `[header(n), cells...]` and return a ref to it.
    fn put(heap: &mut Heap, cells: &[Cell]) -> Cell {
        let at = heap.push(Cell::header(cells.len()));
        for &c in cells {
            heap.push(c);
        }
        Cell::struct_ref(at)
    }

    fn snapshot(heap: &Heap) -> Vec<Cell> {
        heap.slice(0, heap.top()).to_vec()
    }

    #[test]
    fn test_binds_variable_to_constant() {
        let mut heap = Heap::new(16);
        let mut trail = Trail::new();
        let mut u = Unifier::new();
        let f = Cell::constant(0);
        let x = 2;
        let goal = put(&mut heap, &[f, Cell::var(x)]);
        let head = put(&mut heap, &[f, Cell::constant(1)]);
        let top = heap.top();
        assert!(u.unify(&mut heap, &mut trail, goal, head, top));
        assert_eq!(heap.deref(Cell::var(x)), Cell::constant(1));
        assert_eq!(trail.mark(), 1);
    }

    #[test]
    fn test_younger_variable_is_bound_to_older() {
        let mut heap = Heap::new(16);
        let mut trail = Trail::new();
        let mut u = Unifier::new();
        let f = Cell::constant(0);
        let goal = put(&mut heap, &[f, Cell::var(2)]);
        let head = put(&mut heap, &[f, Cell::var(5)]);
        assert!(u.unify(&mut heap, &mut trail, goal, head, 3));
        assert_eq!(heap.get(5), Cell::var(2));
        assert_eq!(heap.get(2), Cell::var(2));
        // address 5 is above the boundary: no trail entry
        assert_eq!(trail.mark(), 0);
    }

    #[test]
    fn test_equal_shapes_unify_and_arity_mismatch_fails() {
        let mut heap = Heap::new(32);
        let mut trail = Trail::new();
        let mut u = Unifier::new();
        let f = Cell::constant(0);
        let g = Cell::constant(1);
        let inner_a = put(&mut heap, &[g, Cell::number(1), Cell::number(2)]);
        let inner_b = put(&mut heap, &[g, Cell::number(1), Cell::number(2)]);
        let a = put(&mut heap, &[f, inner_a]);
        let b = put(&mut heap, &[f, inner_b]);
        let top = heap.top();
        assert!(u.unify(&mut heap, &mut trail, a, b, top));

        let short = put(&mut heap, &[g, Cell::number(1)]);
        let c = put(&mut heap, &[f, short]);
        let top = heap.top();
        assert!(!u.unify(&mut heap, &mut trail, a, c, top));
    }

    #[test]
    fn test_constant_clash_fails() {
        let mut heap = Heap::new(16);
        let mut trail = Trail::new();
        let mut u = Unifier::new();
        let a = put(&mut heap, &[Cell::constant(0), Cell::number(1)]);
        let b = put(&mut heap, &[Cell::constant(0), Cell::number(2)]);
        let top = heap.top();
        assert!(!u.unify(&mut heap, &mut trail, a, b, top));
        let c = put(&mut heap, &[Cell::constant(0), Cell::constant(1)]);
        let top = heap.top();
        assert!(!u.unify(&mut heap, &mut trail, a, c, top));
    }

    #[test]
    fn test_failed_attempt_unwinds_to_identical_heap() {
        let mut heap = Heap::new(32);
        let mut trail = Trail::new();
        let mut u = Unifier::new();
        let f = Cell::constant(0);
        // f(X, Y, 1) against f(a, b, 2): X and Y get bound before the clash.
        let goal = put(&mut heap, &[f, Cell::var(2), Cell::var(3), Cell::number(1)]);
        let head = put(&mut heap, &[f, Cell::constant(5), Cell::constant(6), Cell::number(2)]);
        let before = snapshot(&heap);
        let mark = trail.mark();
        let top = heap.top();
        assert!(!u.unify(&mut heap, &mut trail, goal, head, top));
        assert_ne!(snapshot(&heap), before);
        trail.unwind(mark, &mut heap);
        assert_eq!(snapshot(&heap), before);
    }
}
