//! Persistent (immutable, structurally shared) stack.
//!
//! Pushing returns a new stack and leaves the receiver untouched, so a caller
//! can hand an extended stack to a recursive step and keep using its own.
use std::rc::Rc;

#[derive(Debug)]
struct Node<T> {
    head: T,
    tail: Option<Rc<Node<T>>>,
}

#[derive(Debug)]
pub struct PersistentStack<T> {
    top: Option<Rc<Node<T>>>,
    len: usize,
}

impl<T> Clone for PersistentStack<T> {
    fn clone(&self) -> Self {
        Self { top: self.top.clone(), len: self.len }
    }
}

impl<T> Default for PersistentStack<T> {
    fn default() -> Self {
        Self { top: None, len: 0 }
    }
}

impl<T> PersistentStack<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, head: T) -> Self {
        Self {
            top: Some(Rc::new(Node { head, tail: self.top.clone() })),
            len: self.len + 1,
        }
    }

    pub fn peek(&self) -> Option<&T> {
        self.top.as_deref().map(|n| &n.head)
    }

    /// Everything below the top.
    pub fn parent(&self) -> Option<Self> {
        self.top.as_ref().map(|n| Self { top: n.tail.clone(), len: self.len - 1 })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Top to bottom.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { next: self.top.as_deref() }
    }
}

impl<T: PartialEq> PersistentStack<T> {
    pub fn contains(&self, item: &T) -> bool {
        self.iter().any(|x| x == item)
    }
}

pub struct Iter<'a, T> {
    next: Option<&'a Node<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.next?;
        self.next = node.tail.as_deref();
        Some(&node.head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_leaves_the_original_untouched() {
        let base = PersistentStack::new().push("a");
        let left = base.push("b");
        let right = base.push("c");
        assert_eq!(base.iter().copied().collect::<Vec<_>>(), ["a"]);
        assert_eq!(left.iter().copied().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(right.iter().copied().collect::<Vec<_>>(), ["c", "a"]);
        assert!(left.contains(&"a") && !left.contains(&"c"));
        assert_eq!(left.len(), 2);
        assert_eq!(left.parent().unwrap().peek(), Some(&"a"));
        assert!(PersistentStack::<u8>::new().parent().is_none());
    }
}
