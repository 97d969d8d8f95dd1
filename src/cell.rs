use std::fmt;

/// Role of a heap cell. The discriminants are the low three bits of an
/// encoded [`Cell`]; both variable tags sit below every non-variable tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum Tag {
    /// First occurrence of a variable. Unbound when it points at itself.
    UnboundVar = 0,
    /// Later occurrence of a variable, pointing back at its first one.
    VarRef = 1,
    /// Reference to an array header.
    StructRef = 2,
    /// Interned symbol id.
    Constant = 3,
    /// Integer literal.
    Number = 4,
    /// Array header; payload is the element count (functor included).
    ArrayHeader = 5,
    /// Placeholder the linker must resolve before a clause is accepted.
    Malformed = 7,
}

const TAG_BITS: u32 = 3;
const TAG_MASK: i64 = (1 << TAG_BITS) - 1;

/// Largest magnitude a number literal may have and still round-trip.
pub const MAX_NUMBER: i64 = 1 << 60;

/// One tagged heap word: `(payload << 3) | tag`.
///
/// Payloads are signed, so number literals may be negative. Addresses
/// (variables, references) are heap indices and always non-negative.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell(i64);

impl Cell {
    #[inline]
    pub const fn new(tag: Tag, payload: i64) -> Cell {
        Cell((payload << TAG_BITS) | tag as i64)
    }

    /// Rebuild a cell from its raw word.
    #[inline]
    pub const fn from_raw(raw: i64) -> Cell {
        Cell(raw)
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn tag(self) -> Tag {
        match self.0 & TAG_MASK {
            0 => Tag::UnboundVar,
            1 => Tag::VarRef,
            2 => Tag::StructRef,
            3 => Tag::Constant,
            4 => Tag::Number,
            5 => Tag::ArrayHeader,
            _ => Tag::Malformed,
        }
    }

    #[inline]
    pub const fn payload(self) -> i64 {
        self.0 >> TAG_BITS
    }

    /// Payload read as a heap address.
    #[inline]
    pub const fn addr(self) -> usize {
        (self.0 >> TAG_BITS) as usize
    }

    /// True for both variable tags. One mask and one compare.
    #[inline]
    pub const fn is_var(self) -> bool {
        (self.0 & TAG_MASK) < Tag::StructRef as i64
    }

    /// True for the tags whose payload is a heap address inside the clause
    /// (variables and struct refs); these move when a clause is relocated.
    #[inline]
    pub const fn is_internal_ref(self) -> bool {
        (self.0 & TAG_MASK) <= Tag::StructRef as i64
    }

    /// Shift internal references by `base`; everything else passes through.
    #[inline]
    pub const fn relocate(self, base: usize) -> Cell {
        if self.is_internal_ref() {
            Cell(self.0 + ((base as i64) << TAG_BITS))
        } else {
            self
        }
    }

    // Constructors for the common shapes.

    #[inline]
    pub const fn var(addr: usize) -> Cell {
        Cell::new(Tag::UnboundVar, addr as i64)
    }

    #[inline]
    pub const fn var_ref(addr: usize) -> Cell {
        Cell::new(Tag::VarRef, addr as i64)
    }

    #[inline]
    pub const fn struct_ref(addr: usize) -> Cell {
        Cell::new(Tag::StructRef, addr as i64)
    }

    #[inline]
    pub const fn constant(sym: u32) -> Cell {
        Cell::new(Tag::Constant, sym as i64)
    }

    #[inline]
    pub const fn number(n: i64) -> Cell {
        Cell::new(Tag::Number, n)
    }

    #[inline]
    pub const fn header(arity: usize) -> Cell {
        Cell::new(Tag::ArrayHeader, arity as i64)
    }

    #[inline]
    pub const fn malformed(hint: usize) -> Cell {
        Cell::new(Tag::Malformed, hint as i64)
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag() {
            Tag::UnboundVar => write!(f, "v:{}", self.payload()),
            Tag::VarRef => write!(f, "u:{}", self.payload()),
            Tag::StructRef => write!(f, "r:{}", self.payload()),
            Tag::Constant => write!(f, "c#{}", self.payload()),
            Tag::Number => write!(f, "n:{}", self.payload()),
            Tag::ArrayHeader => write!(f, "a:{}", self.payload()),
            Tag::Malformed => write!(f, "bad:{}", self.raw()),
        }
    }
}
