use crate::cell::{Cell, Tag};
use crate::clause::Clause;
use crate::heap::Heap;
use crate::symbol::{SymbolId, SymbolTable};
use crate::term::{externalize, Term};

/// Nesting beyond this prints as `...`.
const MAX_PRINT_DEPTH: usize = 1000;

/// Print an externalized term in Prolog notation.
pub fn show_term(term: &Term) -> String {
    let mut out = String::new();
    print_inner(term, &mut out, 0);
    out
}

fn print_inner(term: &Term, out: &mut String, depth: usize) {
    if depth > MAX_PRINT_DEPTH {
        out.push_str("...");
        return;
    }

    let items = match term {
        Term::Label(s) => {
            out.push_str(s);
            return;
        }
        Term::Int(n) => {
            out.push_str(&n.to_string());
            return;
        }
        Term::Array(items) => items,
    };

    let Some((functor, args)) = items.split_first() else {
        out.push_str("[]");
        return;
    };

    match (functor.as_label(), args) {
        (Some("$VAR"), [Term::Int(n)]) => {
            out.push('_');
            out.push_str(&n.to_string());
        }
        (Some(op @ ("/" | "-" | "+" | "=")), [a, b]) => {
            out.push('(');
            print_inner(a, out, depth + 1);
            out.push(' ');
            out.push_str(op);
            out.push(' ');
            print_inner(b, out, depth + 1);
            out.push(')');
        }
        (Some(cons @ ("." | "[|]" | "list")), [first, rest]) => {
            out.push('[');
            print_inner(first, out, depth + 1);

            // Walk the spine of the list instead of recursing on the tail.
            let mut current = rest;
            loop {
                match current {
                    Term::Label(end) if end == "[]" || end == "nil" => break,
                    Term::Array(cell) if is_cons(cell, cons) => {
                        out.push(',');
                        print_inner(&cell[1], out, depth + 1);
                        current = &cell[2];
                    }
                    tail => {
                        out.push('|');
                        print_inner(tail, out, depth + 1);
                        break;
                    }
                }
            }
            out.push(']');
        }
        _ => {
            print_inner(functor, out, depth + 1);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                print_inner(arg, out, depth + 1);
            }
            out.push(')');
        }
    }
}

fn is_cons(items: &[Term], cons: &str) -> bool {
    items.len() == 3 && items[0].as_label() == Some(cons)
}

/// Raw display of a single cell as `tag:value`.
pub fn show_cell(cell: Cell, symbols: &SymbolTable) -> String {
    match cell.tag() {
        Tag::UnboundVar => format!("v:{}", cell.payload()),
        Tag::VarRef => format!("u:{}", cell.payload()),
        Tag::StructRef => format!("r:{}", cell.payload()),
        Tag::Constant => {
            let name = u32::try_from(cell.payload())
                .ok()
                .and_then(|id| symbols.resolve(SymbolId(id)));
            match name {
                Some(name) => format!("c:{}", name),
                None => format!("c:BADSYMREF={}", cell.payload()),
            }
        }
        Tag::Number => format!("n:{}", cell.payload()),
        Tag::ArrayHeader => format!("a:{}", cell.payload()),
        Tag::Malformed => format!("*BAD*={}", cell.raw()),
    }
}

/// One `[addr] cell` line per heap cell in `[base, base + len)`.
pub fn show_cells(heap: &Heap, symbols: &SymbolTable, base: usize, len: usize) -> String {
    let mut out = String::new();
    for addr in base..base + len {
        match heap.try_get(addr) {
            Some(cell) => out.push_str(&format!("[{}] {}\n", addr, show_cell(cell, symbols))),
            None => {
                out.push_str(&format!("[{}] <out of range>\n", addr));
                break;
            }
        }
    }
    out
}

/// A clause as `head :- goal, goal.` in Prolog notation.
pub fn show_clause_term(clause: &Clause, heap: &Heap, symbols: &SymbolTable) -> String {
    let mut out = show_term(&externalize(heap, symbols, clause.head()));
    for (i, goal) in clause.body().iter().enumerate() {
        out.push_str(if i == 0 { " :- " } else { ", " });
        out.push_str(&show_term(&externalize(heap, symbols, *goal)));
    }
    out.push('.');
    out
}

/// Full dump of a compiled clause: placement, cells, skeleton and term.
pub fn show_clause(clause: &Clause, heap: &Heap, symbols: &SymbolTable) -> String {
    let mut out = format!(
        "---base:[{}] neck: {} len: {}-----\n",
        clause.base, clause.neck, clause.len
    );
    out.push_str(&show_cells(heap, symbols, clause.base, clause.len));
    let skeleton: Vec<String> = clause
        .skeleton
        .iter()
        .map(|g| show_cell(*g, symbols))
        .collect();
    out.push_str(&format!("skeleton: [{}]\n", skeleton.join(", ")));
    out.push_str(&show_clause_term(clause, heap, symbols));
    out.push('\n');
    out
}

/// The symbol table followed by every clause.
pub fn listing(clauses: &[Clause], heap: &Heap, symbols: &SymbolTable) -> String {
    let mut out = String::from("symbols:\n");
    for (id, name) in symbols.iter() {
        out.push_str(&format!("  {} {}\n", id.0, name));
    }
    for (i, clause) in clauses.iter().enumerate() {
        out.push_str(&format!("clause {}\n", i));
        out.push_str(&show_clause(clause, heap, symbols));
    }
    out
}
