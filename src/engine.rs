use std::path::Path;

use tracing::{debug, trace};

use crate::cell::Cell;
use crate::clause::{self, Clause, ClauseSource, Skeleton};
use crate::config::EngineConfig;
use crate::error::{LogicError, LogicResult};
use crate::goals::Goals;
use crate::heap::Heap;
use crate::index::{self, ClauseIndex};
use crate::reader::{self, Sentence};
use crate::spine::{Candidates, Spine};
use crate::symbol::SymbolTable;
use crate::term::{externalize, Term};
use crate::trail::Trail;
use crate::unify::Unifier;

/// A solution found by [`Machine::step`]. Its bindings are live on the
/// heap until the caller unwinds to `trail_mark`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Answer {
    /// The query head, with the answer's bindings in place.
    pub head: Cell,
    pub trail_mark: usize,
    /// Heap top before the clause copy that completed the proof.
    pub base: usize,
}

enum Unfolded {
    Spine(Spine),
    Answer(Answer),
}

/// The resolution machine. All runtime state lives here; the clause
/// templates at the bottom of the heap and the index are read-only once
/// the program is loaded.
///
/// The last clause of the program is the query. Answers are instances of
/// its head.
pub struct Machine {
    heap: Heap,
    symbols: SymbolTable,
    trail: Trail,
    unifier: Unifier,
    clauses: Vec<Clause>,
    index: Option<ClauseIndex>,
    spines: Vec<Spine>,
    /// Head of the query clause; every answer is an instance of it.
    query_head: Cell,
    /// Heap top once every clause template is stored.
    static_top: usize,
    config: EngineConfig,
}

impl Machine {
    /// Load a program in sentence form with the default configuration.
    pub fn from_source(src: &str) -> LogicResult<Self> {
        Machine::with_config(src, EngineConfig::default())
    }

    pub fn with_config(src: &str, config: EngineConfig) -> LogicResult<Self> {
        let sentences = reader::read_program(src)?;
        Machine::from_sentences(&sentences, config)
    }

    /// Read a program file and load it.
    pub fn from_file(path: impl AsRef<Path>, config: EngineConfig) -> LogicResult<Self> {
        let src = std::fs::read_to_string(path)?;
        Machine::with_config(&src, config)
    }

    pub fn from_sentences(sentences: &[Sentence], config: EngineConfig) -> LogicResult<Self> {
        let mut symbols = SymbolTable::new();
        let mut sources = Vec::with_capacity(sentences.len());
        for sentence in sentences {
            sources.push(clause::link(sentence, &mut symbols)?);
        }
        Machine::from_clauses(symbols, sources, config)
    }

    /// Build a machine from already linked clauses. `symbols` must be the
    /// table their constant cells were interned in.
    pub fn from_clauses(
        symbols: SymbolTable,
        sources: Vec<ClauseSource>,
        config: EngineConfig,
    ) -> LogicResult<Self> {
        if sources.is_empty() {
            return Err(LogicError::EmptyProgram);
        }

        let mut machine = Machine {
            heap: Heap::new(config.heap_capacity),
            symbols,
            trail: Trail::new(),
            unifier: Unifier::new(),
            clauses: Vec::with_capacity(sources.len()),
            index: None,
            spines: Vec::new(),
            query_head: Cell::var(0),
            static_top: 0,
            config,
        };

        for source in &sources {
            source.validate()?;
            let clause = machine.put_clause(source);
            debug!(
                id = machine.clauses.len(),
                base = clause.base,
                len = clause.len,
                neck = clause.neck,
                "loaded clause"
            );
            machine.clauses.push(clause);
        }
        machine.static_top = machine.heap.top();

        if config.should_index(machine.clauses.len()) {
            machine.index = Some(ClauseIndex::build(&machine.clauses, config.index_positions()));
        }

        machine.restart();
        Ok(machine)
    }

    /// Store a clause template at the heap top.
    fn put_clause(&mut self, source: &ClauseSource) -> Clause {
        let base = self.heap.top();
        self.heap.extend_relocated(base, &source.cells);
        let skeleton: Skeleton = source.goals.iter().map(|g| g.relocate(base)).collect();
        let keys = index::index_keys(&self.heap, skeleton[0], self.config.index_positions());
        Clause {
            len: source.cells.len(),
            skeleton,
            base,
            neck: source.neck,
            head_len: source.head_len(),
            keys,
        }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// Number of choice points currently on the stack.
    pub fn depth(&self) -> usize {
        self.spines.len()
    }

    /// Drop all search state and start the query again from scratch.
    pub fn restart(&mut self) {
        self.spines.clear();
        self.trail.unwind(0, &mut self.heap);
        self.heap.truncate(self.static_top);

        let query = &self.clauses[self.clauses.len() - 1];
        let spine = Spine::new(
            query.head(),
            self.static_top,
            Goals::from_slice(query.body()),
            self.trail.mark(),
            self.clauses.len(),
        );
        self.query_head = spine.head;
        self.spines.push(spine);
    }

    /// Copy the first `head_len` cells of a clause to the heap top, shifted by `shift`.
    fn push_head(&mut self, shift: usize, id: usize) -> Cell {
        let clause = &self.clauses[id];
        self.heap.push_relocated(shift, clause.base, clause.head_len);
        clause.head().relocate(shift)
    }

    /// Copy the rest of a clause and return its relocated goals.
    fn push_body(&mut self, shift: usize, id: usize) -> Skeleton {
        let clause = &self.clauses[id];
        self.heap
            .push_relocated(shift, clause.base + clause.head_len, clause.len - clause.head_len);
        clause.body().iter().map(|g| g.relocate(shift)).collect()
    }

    /// Compute the top goal's index keys and candidate clauses once per spine.
    fn prepare(&self, spine: &mut Spine, goal: Cell) {
        if spine.keys.is_some() {
            return;
        }
        let keys = index::index_keys(&self.heap, goal, self.config.index_positions());
        if let Some(index) = &self.index {
            spine.candidates = Candidates::Filtered(index.candidates_for(&keys));
        }
        spine.keys = Some(keys);
    }

    /// Resolve the spine's first goal against its next matching clause.
    ///
    /// On success the spine's cursor has moved past the clause used, so a
    /// later call resumes with the following candidate.
    fn unfold(&mut self, spine: &mut Spine) -> Option<Unfolded> {
        let trail_mark = self.trail.mark();
        let base = self.heap.top();
        let goal = spine.goals.head()?;

        self.prepare(spine, goal);
        let keys = spine.keys?;

        while let Some(id) = spine.candidates.get(spine.cursor) {
            spine.cursor += 1;
            let clause = &self.clauses[id];
            if !index::matches(&keys, &clause.keys) {
                continue;
            }

            let shift = base - clause.base;
            let head = self.push_head(shift, id);
            if !self
                .unifier
                .unify(&mut self.heap, &mut self.trail, goal, head, base)
            {
                trace!(clause = id, "head unification failed");
                self.trail.unwind(trail_mark, &mut self.heap);
                self.heap.truncate(base);
                continue;
            }

            let body = self.push_body(shift, id);
            let rest = spine.goals.tail();
            trace!(clause = id, body = body.len(), "resolved goal");
            if body.is_empty() && rest.is_empty() {
                return Some(Unfolded::Answer(Answer {
                    head: self.query_head,
                    trail_mark,
                    base,
                }));
            }
            let goals = Goals::prepend(&body, rest);
            return Some(Unfolded::Spine(Spine::new(
                head,
                base,
                goals,
                trail_mark,
                self.clauses.len(),
            )));
        }
        None
    }

    /// Undo everything done since `spine` was created.
    fn restore(&mut self, spine: &Spine) {
        self.trail.unwind(spine.trail_mark, &mut self.heap);
        self.heap.truncate(spine.base);
    }

    /// Run until the next answer or until the search space is exhausted.
    ///
    /// After an answer the stack is left in place, so calling again resumes
    /// backtracking from exactly where this call stopped.
    pub fn step(&mut self) -> Option<Answer> {
        while let Some(mut top) = self.spines.pop() {
            if !top.has_goals() {
                // A query without body goals holds exactly once.
                self.restore(&top);
                return Some(Answer {
                    head: top.head,
                    trail_mark: top.trail_mark,
                    base: top.base,
                });
            }
            if !top.has_clauses() {
                trace!(depth = self.spines.len(), "spine exhausted");
                self.restore(&top);
                continue;
            }
            match self.unfold(&mut top) {
                None => {
                    trace!(depth = self.spines.len(), "no matching clause");
                    self.restore(&top);
                }
                Some(Unfolded::Spine(next)) => {
                    self.spines.push(top);
                    self.spines.push(next);
                }
                Some(Unfolded::Answer(answer)) => {
                    self.spines.push(top);
                    return Some(answer);
                }
            }
        }
        None
    }

    /// Next answer as an owned term, or `None` once the search is exhausted.
    ///
    /// The answer's bindings exist only while it is copied out; they are
    /// undone before returning so the next call can look for alternatives.
    pub fn ask_next(&mut self) -> Option<Term> {
        let answer = self.step()?;
        let term = self.externalize(answer.head);
        self.trail.unwind(answer.trail_mark, &mut self.heap);
        self.heap.truncate(answer.base);
        Some(term)
    }

    /// Copy a heap term out as a [`Term`].
    pub fn externalize(&self, cell: Cell) -> Term {
        externalize(&self.heap, &self.symbols, cell)
    }

    /// Lazy stream of the remaining answers.
    pub fn answers(&mut self) -> Answers<'_> {
        Answers { machine: self }
    }
}

/// Iterator over answers, driven by [`Machine::ask_next`].
pub struct Answers<'a> {
    machine: &'a mut Machine,
}

impl Iterator for Answers<'_> {
    type Item = Term;

    fn next(&mut self) -> Option<Term> {
        self.machine.ask_next()
    }
}
