use crate::index::MAX_INDEX_ARGS;

/// Clause count from which argument indexing is switched on.
pub const DEFAULT_INDEX_THRESHOLD: usize = 20;

/// Initial heap reservation, in cells.
pub const DEFAULT_HEAP_CAPACITY: usize = 1 << 15;

/// Tuning knobs for a [`crate::engine::Machine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Build the argument index only when the program has at least this
    /// many clauses. `usize::MAX` disables indexing, `0` always indexes.
    pub index_threshold: usize,
    /// Leading head positions to index (predicate symbol included).
    pub index_args: usize,
    pub heap_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            index_threshold: DEFAULT_INDEX_THRESHOLD,
            index_args: MAX_INDEX_ARGS,
            heap_capacity: DEFAULT_HEAP_CAPACITY,
        }
    }
}

impl EngineConfig {
    pub fn without_index() -> Self {
        EngineConfig {
            index_threshold: usize::MAX,
            ..EngineConfig::default()
        }
    }

    pub fn always_index() -> Self {
        EngineConfig {
            index_threshold: 0,
            ..EngineConfig::default()
        }
    }

    /// `index_args` clamped to what the index supports.
    pub fn index_positions(&self) -> usize {
        self.index_args.clamp(1, MAX_INDEX_ARGS)
    }

    pub fn should_index(&self, clause_count: usize) -> bool {
        clause_count >= self.index_threshold
    }
}
