use std::collections::HashMap;

use smallvec::SmallVec;

use crate::cell::{Cell, Tag};
use crate::error::{LogicError, LogicResult};
use crate::index::IndexKeys;
use crate::reader::{Sentence, Word};
use crate::symbol::SymbolTable;

/// Top-level references of a clause: head first, then body goals.
pub type Skeleton = SmallVec<[Cell; 8]>;

/// A linked clause with addresses relative to 0, not yet on the heap.
///
/// This is the boundary a front end hands to the engine: pre-tagged
/// `cells`, the `goals` skeleton pointing into them, and the `neck`
/// offset where the body region starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClauseSource {
    pub cells: Vec<Cell>,
    pub goals: Skeleton,
    pub neck: usize,
}

/// A clause template stored on the heap at `base`. Immutable once built.
#[derive(Clone, Debug)]
pub struct Clause {
    /// Number of cells the clause occupies.
    pub len: usize,
    /// Absolute references to the head and then each body goal.
    pub skeleton: Skeleton,
    pub base: usize,
    /// Offset of the first body cell; `[base, base + neck)` is the head region.
    pub neck: usize,
    /// Cells copied before head unification. Equal to `neck` unless the
    /// head refers to a structure in the body region.
    pub head_len: usize,
    /// Index keys of the head's leading positions.
    pub keys: IndexKeys,
}

impl Clause {
    #[inline]
    pub fn head(&self) -> Cell {
        self.skeleton[0]
    }

    #[inline]
    pub fn body(&self) -> &[Cell] {
        &self.skeleton[1..]
    }
}

impl ClauseSource {
    /// Number of leading cells a fresh copy of the head needs.
    ///
    /// A head may point at a `holds` structure that was written after the
    /// first body goal; then the whole clause goes with the head.
    pub fn head_len(&self) -> usize {
        let reaches_body = self
            .cells
            .iter()
            .take(self.neck)
            .any(|c| c.is_internal_ref() && c.addr() >= self.neck);
        if reaches_body {
            self.cells.len()
        } else {
            self.neck
        }
    }

    /// Check that a source satisfies what relocation and unification rely on.
    pub fn validate(&self) -> LogicResult<()> {
        let Some(&head) = self.goals.first() else {
            return Err(LogicError::MalformedTerm("clause has no head".into()));
        };
        if self.neck > self.cells.len() {
            return Err(LogicError::MalformedTerm(format!(
                "neck {} is past the end of a {}-cell clause",
                self.neck,
                self.cells.len()
            )));
        }
        for &goal in &self.goals {
            let at = goal.addr();
            let is_header = self
                .cells
                .get(at)
                .map_or(false, |c| c.tag() == Tag::ArrayHeader);
            if goal.tag() != Tag::StructRef || !is_header {
                return Err(LogicError::MalformedTerm(format!(
                    "skeleton entry {:?} does not reference an array header",
                    goal
                )));
            }
        }
        if head.addr() >= self.neck {
            return Err(LogicError::MalformedTerm("head lies outside the head region".into()));
        }
        for (i, &cell) in self.cells.iter().enumerate() {
            match cell.tag() {
                Tag::Malformed => {
                    return Err(LogicError::MalformedTerm(format!(
                        "unresolved cell at offset {}",
                        i
                    )));
                }
                Tag::UnboundVar | Tag::VarRef | Tag::StructRef => {
                    if cell.addr() >= self.cells.len() {
                        return Err(LogicError::MalformedTerm(format!(
                            "reference {:?} at offset {} points outside the clause",
                            cell, i
                        )));
                    }
                    if cell.tag() == Tag::StructRef
                        && self.cells[cell.addr()].tag() != Tag::ArrayHeader
                    {
                        return Err(LogicError::MalformedTerm(format!(
                            "struct ref at offset {} does not point at an array header",
                            i
                        )));
                    }
                }
                Tag::ArrayHeader => {
                    if i + cell.addr() >= self.cells.len() {
                        return Err(LogicError::MalformedTerm(format!(
                            "array at offset {} runs past the end of the clause",
                            i
                        )));
                    }
                }
                Tag::Constant | Tag::Number => {}
            }
        }
        Ok(())
    }
}

/// Rewrite `X lists a b c` elements into `holds list` chains ending in `nil`.
fn expand_lists(sentence: &Sentence) -> LogicResult<Sentence> {
    let mut out = Vec::with_capacity(sentence.len());
    for element in sentence {
        let Some(Word::Lists(var)) = element.first() else {
            out.push(element.clone());
            continue;
        };
        let items = &element[1..];
        if items.is_empty() {
            return Err(LogicError::MalformedTerm(format!(
                "'{} lists' needs at least one item",
                var
            )));
        }
        for (i, item) in items.iter().enumerate() {
            let this = if i == 0 {
                var.clone()
            } else {
                format!("{}__{}", var, i)
            };
            let rest = if i + 1 == items.len() {
                Word::Const("nil".into())
            } else {
                Word::Var(format!("{}__{}", var, i + 1))
            };
            out.push(vec![
                Word::Holds(this),
                Word::Const("list".into()),
                item.clone(),
                rest,
            ]);
        }
    }
    Ok(out)
}

/// Occurrence lists of each variable name, in first-seen order.
#[derive(Default)]
struct Occurrences {
    order: Vec<(String, Vec<usize>)>,
    by_name: HashMap<String, usize>,
}

impl Occurrences {
    fn add(&mut self, name: &str, at: usize) {
        match self.by_name.get(name) {
            Some(&slot) => self.order[slot].1.push(at),
            None => {
                self.by_name.insert(name.to_string(), self.order.len());
                self.order.push((name.to_string(), vec![at]));
            }
        }
    }
}

/// Turn one tokenized sentence into relocatable cells.
///
/// Each element becomes `[header(n), word...]` and a struct-ref to its
/// header goes into the skeleton. `holds` elements are not goals: their
/// header becomes the anchor every other occurrence of the variable refers
/// to. Plain variables link into a chain: the first occurrence is unbound,
/// the rest point back at it.
pub fn link(sentence: &Sentence, symbols: &mut SymbolTable) -> LogicResult<ClauseSource> {
    let elements = expand_lists(sentence)?;
    let mut cells: Vec<Cell> = Vec::new();
    let mut goals = Skeleton::new();
    let mut vars = Occurrences::default();

    for (e, element) in elements.iter().enumerate() {
        let header_at = cells.len();
        goals.push(Cell::struct_ref(header_at));
        cells.push(Cell::header(element.len()));

        for (w, word) in element.iter().enumerate() {
            match word {
                Word::Const(name) => cells.push(Cell::constant(symbols.intern(name).0)),
                Word::Number(n) => cells.push(Cell::number(*n)),
                Word::Var(name) => {
                    vars.add(name, cells.len());
                    cells.push(Cell::malformed(cells.len()));
                }
                Word::Holds(name) => {
                    if w != 0 {
                        return Err(LogicError::MalformedTerm(format!(
                            "'{} holds' must start its element",
                            name
                        )));
                    }
                    if e == 0 {
                        return Err(LogicError::MalformedTerm(format!(
                            "clause head cannot be the equation '{} holds ...'",
                            name
                        )));
                    }
                    vars.add(name, header_at);
                    cells[header_at] = Cell::header(element.len() - 1);
                    goals.pop();
                }
                Word::Lists(name) => {
                    return Err(LogicError::MalformedTerm(format!(
                        "'{} lists' must start its element",
                        name
                    )));
                }
            }
        }
    }

    for (name, occurrences) in &vars.order {
        let mut anchors = occurrences
            .iter()
            .copied()
            .filter(|&at| cells[at].tag() == Tag::ArrayHeader);
        match (anchors.next(), anchors.next()) {
            (None, _) => {
                let leader = occurrences[0];
                for &at in occurrences {
                    cells[at] = if at == leader {
                        Cell::var(at)
                    } else {
                        Cell::var_ref(leader)
                    };
                }
            }
            (Some(leader), None) => {
                for &at in occurrences {
                    if at != leader {
                        cells[at] = Cell::struct_ref(leader);
                    }
                }
            }
            (Some(_), Some(_)) => {
                return Err(LogicError::MalformedTerm(format!(
                    "variable {} is defined by more than one 'holds'",
                    name
                )));
            }
        }
    }

    let neck = match goals.get(1) {
        Some(first_goal) => first_goal.addr(),
        None => cells.len(),
    };
    let source = ClauseSource { cells, goals, neck };
    source.validate()?;
    Ok(source)
}
