use crate::cell::Cell;
use crate::goals::Goals;
use crate::index::IndexKeys;

/// Clauses a spine's top goal may be resolved against.
#[derive(Clone, Debug)]
pub enum Candidates {
    /// Every clause, in declaration order.
    All(usize),
    /// Index-filtered clause ids, ascending.
    Filtered(Vec<usize>),
}

impl Candidates {
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Candidates::All(n) => *n,
            Candidates::Filtered(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clause id at position `k`.
    #[inline]
    pub fn get(&self, k: usize) -> Option<usize> {
        match self {
            Candidates::All(n) => (k < *n).then_some(k),
            Candidates::Filtered(ids) => ids.get(k).copied(),
        }
    }
}

/// One choice point: the goals still to prove after a clause was used,
/// where that clause's copy starts on the heap, the trail length before
/// its head was unified, and how far the top goal has got through its
/// candidate clauses.
pub struct Spine {
    /// Head of the clause copy this spine was made from.
    pub head: Cell,
    /// Heap top to restore when the spine is popped.
    pub base: usize,
    pub goals: Goals,
    /// Trail length to restore when the spine is popped.
    pub trail_mark: usize,
    /// Next candidate position to try.
    pub cursor: usize,
    /// Index keys of the top goal; computed on first unfold.
    pub keys: Option<IndexKeys>,
    pub candidates: Candidates,
}

impl Spine {
    pub fn new(head: Cell, base: usize, goals: Goals, trail_mark: usize, clause_count: usize) -> Self {
        Spine {
            head,
            base,
            goals,
            trail_mark,
            cursor: 0,
            keys: None,
            candidates: Candidates::All(clause_count),
        }
    }

    /// True while the top goal has untried candidate clauses.
    #[inline]
    pub fn has_clauses(&self) -> bool {
        self.cursor < self.candidates.len()
    }

    #[inline]
    pub fn has_goals(&self) -> bool {
        !self.goals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_lookup() {
        let all = Candidates::All(3);
        assert_eq!(all.get(2), Some(2));
        assert_eq!(all.get(3), None);
        let some = Candidates::Filtered(vec![4, 7]);
        assert_eq!(some.get(1), Some(7));
        assert_eq!(some.len(), 2);
        assert!(Candidates::Filtered(Vec::new()).is_empty());
    }

    #[test]
    fn test_cursor_exhausts_clauses() {
        let mut spine = Spine::new(Cell::struct_ref(0), 0, Goals::empty(), 0, 2);
        assert!(spine.has_clauses());
        assert!(!spine.has_goals());
        spine.cursor = 2;
        assert!(!spine.has_clauses());
    }
}
