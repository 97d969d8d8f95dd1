use std::fmt;

use rustc_hash::FxHashSet;

use crate::cell::{Cell, Tag};
use crate::heap::Heap;
use crate::printer::show_cell;
use crate::symbol::{SymbolId, SymbolTable};

/// Nesting beyond this is cut off with a `...` label.
pub const MAX_DEPTH: usize = 10_000;

/// A heap term copied out into an owned, display-neutral value.
///
/// Structures become arrays whose first element is the functor. Unbound
/// variables become `V<addr>` labels. Malformed heap content becomes a
/// diagnostic label instead of an error.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Label(String),
    Int(i64),
    Array(Vec<Term>),
}

impl Term {
    pub fn label(s: &str) -> Term {
        Term::Label(s.to_string())
    }

    pub fn as_label(&self) -> Option<&str> {
        match self {
            Term::Label(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Term::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Term]> {
        match self {
            Term::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Element `i` of an array term.
    pub fn arg(&self, i: usize) -> Option<&Term> {
        self.as_array()?.get(i)
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Term {
        Term::label(s)
    }
}

impl From<i64> for Term {
    fn from(n: i64) -> Term {
        Term::Int(n)
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Label(s) => write!(f, "{:?}", s),
            Term::Int(n) => write!(f, "{}", n),
            Term::Array(items) => f.debug_list().entries(items).finish(),
        }
    }
}

struct Frame {
    /// Address of the structure's header.
    at: usize,
    items: Vec<Term>,
    next: usize,
    end: usize,
}

enum Step {
    Done(Term),
    Open(Frame),
}

fn open(heap: &Heap, symbols: &SymbolTable, cell: Cell) -> Step {
    let cell = heap.deref(cell);
    match cell.tag() {
        Tag::Constant => Step::Done(Term::Label(symbol_name(symbols, cell.payload()))),
        Tag::Number => Step::Done(Term::Int(cell.payload())),
        Tag::UnboundVar => Step::Done(Term::Label(format!("V{}", cell.addr()))),
        Tag::StructRef => match heap.try_get(cell.addr()) {
            Some(header) if header.tag() == Tag::ArrayHeader => {
                let first = cell.addr() + 1;
                let end = first + header.addr();
                if end > heap.top() {
                    return Step::Done(Term::Label(format!(
                        "*** index out of range: {}..{}",
                        first, end
                    )));
                }
                Step::Open(Frame {
                    at: cell.addr(),
                    items: Vec::with_capacity(header.addr()),
                    next: first,
                    end,
                })
            }
            Some(other) => Step::Done(Term::Label(format!(
                "*** should be A, found={}",
                show_cell(other, symbols)
            ))),
            None => Step::Done(Term::Label(format!(
                "*** index out of range: {}",
                cell.addr()
            ))),
        },
        _ => Step::Done(Term::Label(format!("*BAD TERM*{}", show_cell(cell, symbols)))),
    }
}

fn symbol_name(symbols: &SymbolTable, payload: i64) -> String {
    u32::try_from(payload)
        .ok()
        .and_then(|id| symbols.resolve(SymbolId(id)))
        .map_or_else(|| format!("BADSYMREF={}", payload), str::to_string)
}

/// Copy the term rooted at `cell` out of the heap.
///
/// Walks with an explicit stack, so long lists do not grow the call stack.
/// Without an occurs check a binding can make a term cyclic; a structure
/// reached again from inside itself is cut off with a `...` label.
pub fn externalize(heap: &Heap, symbols: &SymbolTable, cell: Cell) -> Term {
    let mut current = match open(heap, symbols, cell) {
        Step::Done(term) => return term,
        Step::Open(frame) => frame,
    };
    let mut parents: Vec<Frame> = Vec::new();
    let mut open_structs: FxHashSet<usize> = FxHashSet::default();
    open_structs.insert(current.at);

    loop {
        if current.next < current.end {
            let child = heap.get(current.next);
            current.next += 1;
            match open(heap, symbols, child) {
                Step::Done(term) => current.items.push(term),
                Step::Open(frame)
                    if parents.len() >= MAX_DEPTH || open_structs.contains(&frame.at) =>
                {
                    current.items.push(Term::label("..."));
                }
                Step::Open(frame) => {
                    open_structs.insert(frame.at);
                    parents.push(std::mem::replace(&mut current, frame));
                }
            }
            continue;
        }

        open_structs.remove(&current.at);
        let finished = Term::Array(std::mem::take(&mut current.items));
        match parents.pop() {
            None => return finished,
            Some(mut parent) => {
                parent.items.push(finished);
                current = parent;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_structure() {
        let mut heap = Heap::new(16);
        let mut symbols = SymbolTable::new();
        let f = symbols.intern("f").0;
        let g = symbols.intern("g").0;
        // f(g(1), X)
        heap.push(Cell::header(2));
        heap.push(Cell::constant(g));
        heap.push(Cell::number(1));
        heap.push(Cell::header(3));
        heap.push(Cell::constant(f));
        heap.push(Cell::struct_ref(0));
        heap.push(Cell::var(6));
        let term = externalize(&heap, &symbols, Cell::struct_ref(3));
        assert_eq!(
            term,
            Term::Array(vec![
                "f".into(),
                Term::Array(vec!["g".into(), Term::Int(1)]),
                "V6".into(),
            ])
        );
    }

    #[test]
    fn test_follows_bindings() {
        let mut heap = Heap::new(4);
        let symbols = SymbolTable::new();
        heap.push(Cell::var(1));
        heap.push(Cell::number(-3));
        assert_eq!(externalize(&heap, &symbols, Cell::var(0)), Term::Int(-3));
    }

    #[test]
    fn test_bad_content_becomes_diagnostic() {
        let mut heap = Heap::new(4);
        let symbols = SymbolTable::new();
        heap.push(Cell::number(5));
        heap.push(Cell::header(9));
        let bad_sym = externalize(&heap, &symbols, Cell::constant(42));
        assert_eq!(bad_sym, Term::label("BADSYMREF=42"));
        let not_header = externalize(&heap, &symbols, Cell::struct_ref(0));
        assert!(not_header.as_label().unwrap().starts_with("*** should be A"));
        let short = externalize(&heap, &symbols, Cell::struct_ref(1));
        assert!(short.as_label().unwrap().contains("out of range"));
        let dangling = externalize(&heap, &symbols, Cell::struct_ref(99));
        assert!(dangling.as_label().unwrap().contains("out of range"));
        let bad = externalize(&heap, &symbols, Cell::malformed(1));
        assert!(bad.as_label().unwrap().starts_with("*BAD TERM*"));
    }

    #[test]
    fn test_cycles_are_cut_off() {
        let mut heap = Heap::new(8);
        let mut symbols = SymbolTable::new();
        let f = symbols.intern("f").0;
        // f(T, T) where T is the structure itself
        heap.push(Cell::header(3));
        heap.push(Cell::constant(f));
        heap.push(Cell::struct_ref(0));
        heap.push(Cell::var(4));
        heap.push(Cell::struct_ref(0));
        let term = externalize(&heap, &symbols, Cell::struct_ref(0));
        assert_eq!(
            term,
            Term::Array(vec!["f".into(), "...".into(), "...".into()])
        );
    }

    #[test]
    fn test_shared_subterm_is_not_a_cycle() {
        let mut heap = Heap::new(8);
        let mut symbols = SymbolTable::new();
        let f = symbols.intern("f").0;
        let g = symbols.intern("g").0;
        // f(g(1), g(1)) with both arguments pointing at one g(1)
        heap.push(Cell::header(2));
        heap.push(Cell::constant(g));
        heap.push(Cell::number(1));
        heap.push(Cell::header(3));
        heap.push(Cell::constant(f));
        heap.push(Cell::struct_ref(0));
        heap.push(Cell::struct_ref(0));
        let inner = Term::Array(vec!["g".into(), Term::Int(1)]);
        assert_eq!(
            externalize(&heap, &symbols, Cell::struct_ref(3)),
            Term::Array(vec!["f".into(), inner.clone(), inner])
        );
    }

    #[test]
    fn test_long_list_is_not_recursive() {
        let mut heap = Heap::new(1 << 16);
        let mut symbols = SymbolTable::new();
        let list = symbols.intern("list").0;
        let nil = symbols.intern("nil").0;
        let n = 5_000;
        // cons cells laid out back to back, each tail pointing at the next
        for i in 0..n {
            let at = heap.top();
            heap.push(Cell::header(3));
            heap.push(Cell::constant(list));
            heap.push(Cell::number(i));
            if i + 1 == n {
                heap.push(Cell::constant(nil));
            } else {
                heap.push(Cell::struct_ref(at + 4));
            }
        }
        let mut term = &externalize(&heap, &symbols, Cell::struct_ref(0));
        let mut count = 0;
        while let Some(items) = term.as_array() {
            assert_eq!(items[1], Term::Int(count));
            count += 1;
            term = &items[2];
        }
        assert_eq!(count, n);
        assert_eq!(term, &Term::label("nil"));
    }
}
