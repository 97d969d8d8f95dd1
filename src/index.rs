use rustc_hash::FxHashMap;
use tracing::debug;

use crate::cell::{Cell, Tag};
use crate::clause::Clause;
use crate::heap::Heap;

/// Most argument positions a clause head is indexed on. Position 0 is the
/// predicate symbol itself.
pub const MAX_INDEX_ARGS: usize = 3;

/// Summary of one head position: a constant, a number, a structure header,
/// or the wildcard for an unbound variable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct IndexKey(i64);

pub type IndexKeys = [IndexKey; MAX_INDEX_ARGS];

impl IndexKey {
    /// Matches every key.
    pub const ANY: IndexKey = IndexKey(0);

    /// Key of an already dereferenced cell.
    pub fn of(heap: &Heap, cell: Cell) -> IndexKey {
        match cell.tag() {
            // Structures are told apart by their header, i.e. their arity.
            Tag::StructRef => IndexKey(heap.target(cell).raw()),
            Tag::Constant | Tag::Number => IndexKey(cell.raw()),
            _ => IndexKey::ANY,
        }
    }

    #[inline]
    pub fn is_any(self) -> bool {
        self == IndexKey::ANY
    }
}

/// Keys of the first `positions` elements of the structure `sref` points at.
/// Positions past its arity stay wildcards.
pub fn index_keys(heap: &Heap, sref: Cell, positions: usize) -> IndexKeys {
    let mut keys = [IndexKey::ANY; MAX_INDEX_ARGS];
    let arity = heap.arity(sref).unwrap_or(0);
    let first = sref.addr() + 1;
    let n = arity.min(positions).min(MAX_INDEX_ARGS);
    for (i, key) in keys.iter_mut().enumerate().take(n) {
        *key = IndexKey::of(heap, heap.deref(heap.get(first + i)));
    }
    keys
}

/// Cheap pre-unification filter: every position is a wildcard on one side
/// or equal on both.
#[inline]
pub fn matches(goal: &IndexKeys, clause: &IndexKeys) -> bool {
    goal.iter()
        .zip(clause.iter())
        .all(|(&x, &y)| x.is_any() || y.is_any() || x == y)
}

/// Per-position maps from key to the clauses carrying it, plus the clauses
/// holding a variable there. Built once; read-only afterwards.
///
/// Clause ids are inserted in ascending order, so every bucket is sorted.
pub struct ClauseIndex {
    keyed: Vec<FxHashMap<IndexKey, Vec<usize>>>,
    vars: Vec<Vec<usize>>,
    clause_count: usize,
}

impl ClauseIndex {
    pub fn build(clauses: &[Clause], positions: usize) -> Self {
        let positions = positions.clamp(1, MAX_INDEX_ARGS);
        let mut keyed: Vec<FxHashMap<IndexKey, Vec<usize>>> =
            (0..positions).map(|_| FxHashMap::default()).collect();
        let mut vars: Vec<Vec<usize>> = vec![Vec::new(); positions];

        for (id, clause) in clauses.iter().enumerate() {
            for pos in 0..positions {
                let key = clause.keys[pos];
                if key.is_any() {
                    vars[pos].push(id);
                } else {
                    keyed[pos].entry(key).or_default().push(id);
                }
            }
        }

        for pos in 0..positions {
            debug!(
                position = pos,
                keys = keyed[pos].len(),
                variable_clauses = vars[pos].len(),
                "built clause index"
            );
        }

        ClauseIndex {
            keyed,
            vars,
            clause_count: clauses.len(),
        }
    }

    pub fn positions(&self) -> usize {
        self.keyed.len()
    }

    /// Clauses whose head may match `keys`, ascending.
    ///
    /// A clause survives when, at every non-wildcard goal position, it has
    /// either the same key or a variable.
    pub fn candidates_for(&self, keys: &IndexKeys) -> Vec<usize> {
        let mut filters: Vec<(&[usize], &[usize])> = Vec::with_capacity(self.positions());
        for (pos, key) in keys.iter().enumerate().take(self.positions()) {
            if key.is_any() {
                continue;
            }
            let bucket = self.keyed[pos].get(key).map_or(&[][..], Vec::as_slice);
            filters.push((bucket, self.vars[pos].as_slice()));
        }

        let Some(((bucket, vars), rest)) = filters.split_first() else {
            return (0..self.clause_count).collect();
        };

        merge_sorted(bucket, vars)
            .into_iter()
            .filter(|id| {
                rest.iter()
                    .all(|(b, v)| b.binary_search(id).is_ok() || v.binary_search(id).is_ok())
            })
            .collect()
    }
}

/// Union of two ascending, disjoint id lists.
fn merge_sorted(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] < b[j] {
            out.push(a[i]);
            i += 1;
        } else {
            out.push(b[j]);
            j += 1;
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}
