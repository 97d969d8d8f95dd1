use crate::cell::{Cell, Tag};

/// The cell heap. Clause templates are stored at the bottom at load time;
/// runtime copies of clauses are pushed above them and popped on backtrack.
///
/// Addresses are indices into `cells`. A cell that has been referenced is
/// never moved, only abandoned and later truncated away.
pub struct Heap {
    cells: Vec<Cell>,
}

impl Heap {
    pub fn new(capacity: usize) -> Self {
        Heap {
            cells: Vec::with_capacity(capacity),
        }
    }

    /// Push a cell. Returns its address.
    #[inline]
    pub fn push(&mut self, cell: Cell) -> usize {
        let addr = self.cells.len();
        self.cells.push(cell);
        addr
    }

    #[inline]
    pub fn get(&self, addr: usize) -> Cell {
        self.cells[addr]
    }

    #[inline]
    pub fn set(&mut self, addr: usize, cell: Cell) {
        self.cells[addr] = cell;
    }

    /// Address the next `push` will use.
    #[inline]
    pub fn top(&self) -> usize {
        self.cells.len()
    }

    /// Drop every cell at or above `addr`.
    #[inline]
    pub fn truncate(&mut self, addr: usize) {
        self.cells.truncate(addr);
    }

    /// Get a cell if the address is in range.
    pub fn try_get(&self, addr: usize) -> Option<Cell> {
        self.cells.get(addr).copied()
    }

    /// The cell a variable or reference points at.
    #[inline]
    pub fn target(&self, cell: Cell) -> Cell {
        self.cells[cell.addr()]
    }

    /// Follow variable chains until an unbound variable or a non-variable.
    #[inline]
    pub fn deref(&self, mut cell: Cell) -> Cell {
        while cell.is_var() {
            let next = self.target(cell);
            if next == cell {
                break;
            }
            cell = next;
        }
        cell
    }

    /// Copy `len` cells starting at `from`, shifting internal references by `base`.
    pub fn push_relocated(&mut self, base: usize, from: usize, len: usize) {
        self.cells.reserve(len);
        for i in from..from + len {
            let cell = self.cells[i].relocate(base);
            self.cells.push(cell);
        }
    }

    /// Push a slice of template cells, shifting internal references by `base`.
    pub fn extend_relocated(&mut self, base: usize, cells: &[Cell]) {
        self.cells.extend(cells.iter().map(|c| c.relocate(base)));
    }

    /// Arity of the structure a struct-ref points at, if it really is one.
    pub fn arity(&self, sref: Cell) -> Option<usize> {
        let header = self.try_get(sref.addr())?;
        if header.tag() == Tag::ArrayHeader {
            Some(header.addr())
        } else {
            None
        }
    }

    /// Cells in `[from, to)`.
    pub fn slice(&self, from: usize, to: usize) -> &[Cell] {
        &self.cells[from..to]
    }
}

impl Default for Heap {
    fn default() -> Self {
        Heap::new(1 << 15)
    }
}
