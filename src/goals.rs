use std::rc::Rc;

use crate::cell::Cell;

/// Persistent singly-linked list of pending goals.
///
/// Sibling spines share tails; new goals are only ever prepended, so a
/// shared suffix is never mutated.
#[derive(Clone, Default)]
pub struct Goals(Option<Rc<Node>>);

struct Node {
    head: Cell,
    tail: Goals,
}

impl Goals {
    pub fn empty() -> Self {
        Goals(None)
    }

    pub fn cons(head: Cell, tail: Goals) -> Self {
        Goals(Some(Rc::new(Node { head, tail })))
    }

    /// `cells` in front of `tail`, keeping their order.
    pub fn prepend(cells: &[Cell], tail: Goals) -> Self {
        cells
            .iter()
            .rev()
            .fold(tail, |acc, &cell| Goals::cons(cell, acc))
    }

    pub fn from_slice(cells: &[Cell]) -> Self {
        Goals::prepend(cells, Goals::empty())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    #[inline]
    pub fn head(&self) -> Option<Cell> {
        self.0.as_ref().map(|node| node.head)
    }

    /// The list without its first goal. Shares structure.
    pub fn tail(&self) -> Goals {
        match &self.0 {
            Some(node) => node.tail.clone(),
            None => Goals::empty(),
        }
    }

    pub fn iter(&self) -> GoalsIter<'_> {
        GoalsIter {
            next: self.0.as_deref(),
        }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// True if both lists are the same physical node.
    pub fn ptr_eq(&self, other: &Goals) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

// Unlink iteratively; a long chain would otherwise recurse once per node.
impl Drop for Goals {
    fn drop(&mut self) {
        let mut next = self.0.take();
        while let Some(node) = next {
            match Rc::try_unwrap(node) {
                Ok(mut node) => next = node.tail.0.take(),
                Err(_) => break,
            }
        }
    }
}

pub struct GoalsIter<'a> {
    next: Option<&'a Node>,
}

impl<'a> Iterator for GoalsIter<'a> {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        let node = self.next?;
        self.next = node.tail.0.as_deref();
        Some(node.head)
    }
}
