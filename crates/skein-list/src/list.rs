//! Arena-backed circular doubly-linked list.

use std::fmt;
use std::iter::FusedIterator;

use crate::error::ListError;

#[derive(Clone)]
struct Node<T> {
    value: T,
    prev: usize,
    next: usize,
}

#[derive(Clone)]
enum Slot<T> {
    Occupied(Node<T>),
    /// Free slot, linking to the next free slot.
    Vacant(Option<usize>),
}

/// Circular doubly-linked sequence of owned elements.
///
/// The element after the tail is the head and the element before the head
/// is the tail. Positions are counted from the head. Element 0 and element
/// `len - 1` are reached in O(1); every other position walks forward from
/// the head.
#[derive(Clone)]
pub struct CircularList<T> {
    slots: Vec<Slot<T>>,
    free: Option<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> CircularList<T> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: None,
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Number of elements in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the list holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// First element, if any.
    pub fn front(&self) -> Option<&T> {
        self.head.map(|idx| &self.node(idx).value)
    }

    /// Last element, if any.
    pub fn back(&self) -> Option<&T> {
        self.tail.map(|idx| &self.node(idx).value)
    }

    /// Element at `position`, wrapping around the ring (`position % len`).
    ///
    /// Returns `None` only when the list is empty.
    pub fn get(&self, position: usize) -> Option<&T> {
        self.slot_at(position).map(|idx| &self.node(idx).value)
    }

    /// Insert `value` so that it ends up at `position`.
    ///
    /// `0` makes it the new head, `len` makes it the new tail, anything in
    /// between is spliced after the element currently at `position - 1`.
    /// Positions past `len` are rejected and leave the list untouched.
    pub fn insert(&mut self, position: usize, value: T) -> Result<(), ListError> {
        if position > self.len {
            return Err(ListError::OutOfBounds {
                position,
                len: self.len,
            });
        }

        // Both ends splice after the tail; only the pointer that moves differs.
        let anchor = if self.len == 0 {
            None
        } else if position == 0 || position == self.len {
            self.tail
        } else {
            self.slot_at(position - 1)
        };

        let idx = self.alloc(value);
        match anchor {
            None => {
                self.head = Some(idx);
                self.tail = Some(idx);
            }
            Some(pred) => {
                self.link_after(pred, idx);
                if position == 0 {
                    self.head = Some(idx);
                }
                if position == self.len {
                    self.tail = Some(idx);
                }
            }
        }

        self.len += 1;
        Ok(())
    }

    /// Insert `value` as the new head.
    pub fn push_front(&mut self, value: T) {
        self.link_end(value, true);
    }

    /// Insert `value` as the new tail.
    pub fn push_back(&mut self, value: T) {
        self.link_end(value, false);
    }

    /// Unlink the element at `position` and hand it back to the caller.
    ///
    /// Returns `None` for an empty list or a position at or past `len`.
    pub fn remove(&mut self, position: usize) -> Option<T> {
        if position >= self.len {
            return None;
        }
        let idx = self.slot_at(position)?;
        Some(self.unlink(idx))
    }

    /// Remove and return the head.
    pub fn pop_front(&mut self) -> Option<T> {
        let idx = self.head?;
        Some(self.unlink(idx))
    }

    /// Remove and return the tail.
    pub fn pop_back(&mut self) -> Option<T> {
        let idx = self.tail?;
        Some(self.unlink(idx))
    }

    /// Position of the first element (from the head) matching `pred`.
    pub fn position<F>(&self, mut pred: F) -> Option<usize>
    where
        F: FnMut(&T) -> bool,
    {
        self.iter().position(|value| pred(value))
    }

    /// Mutable access to the first element matching `pred`.
    pub fn find_mut<F>(&mut self, mut pred: F) -> Option<&mut T>
    where
        F: FnMut(&T) -> bool,
    {
        let mut cursor = self.head;
        for _ in 0..self.len {
            let idx = cursor?;
            if pred(&self.node(idx).value) {
                return Some(&mut self.node_mut(idx).value);
            }
            cursor = Some(self.node(idx).next);
        }
        None
    }

    /// Remove every element matching `pred` and return them in list order.
    ///
    /// The remaining elements keep their relative order.
    pub fn extract_if<F>(&mut self, mut pred: F) -> Vec<T>
    where
        F: FnMut(&T) -> bool,
    {
        let mut extracted = Vec::new();
        let mut cursor = self.head;
        for _ in 0..self.len {
            let Some(idx) = cursor else { break };
            let next = self.node(idx).next;
            if pred(&self.node(idx).value) {
                extracted.push(self.unlink(idx));
            }
            cursor = Some(next);
        }
        extracted
    }

    /// Iterate from head to tail, once around the ring.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    // -----------------------------------------------------------------------
    // Arena plumbing
    // -----------------------------------------------------------------------

    /// Slot index of the element at `position % len`.
    fn slot_at(&self, position: usize) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        let position = position % self.len;
        if position == 0 {
            return self.head;
        }
        if position == self.len - 1 {
            return self.tail;
        }

        let mut idx = self.head?;
        for _ in 0..position {
            idx = self.node(idx).next;
        }
        Some(idx)
    }

    fn node(&self, idx: usize) -> &Node<T> {
        match &self.slots[idx] {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => unreachable!("linked slot {idx} is vacant"),
        }
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<T> {
        match &mut self.slots[idx] {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => unreachable!("linked slot {idx} is vacant"),
        }
    }

    /// Place `value` in a free slot, self-linked.
    fn alloc(&mut self, value: T) -> usize {
        match self.free {
            Some(idx) => {
                self.free = match self.slots[idx] {
                    Slot::Vacant(next_free) => next_free,
                    Slot::Occupied(_) => unreachable!("free slot {idx} is occupied"),
                };
                self.slots[idx] = Slot::Occupied(Node {
                    value,
                    prev: idx,
                    next: idx,
                });
                idx
            }
            None => {
                let idx = self.slots.len();
                self.slots.push(Slot::Occupied(Node {
                    value,
                    prev: idx,
                    next: idx,
                }));
                idx
            }
        }
    }

    /// Return a slot to the free list and move its value out.
    fn release(&mut self, idx: usize) -> T {
        let slot = std::mem::replace(&mut self.slots[idx], Slot::Vacant(self.free));
        self.free = Some(idx);
        match slot {
            Slot::Occupied(node) => node.value,
            Slot::Vacant(_) => unreachable!("released slot {idx} was already vacant"),
        }
    }

    fn link_after(&mut self, pred: usize, idx: usize) {
        let next = self.node(pred).next;
        {
            let node = self.node_mut(idx);
            node.prev = pred;
            node.next = next;
        }
        self.node_mut(next).prev = idx;
        self.node_mut(pred).next = idx;
    }

    fn link_end(&mut self, value: T, as_head: bool) {
        let idx = self.alloc(value);
        match self.tail {
            None => {
                self.head = Some(idx);
                self.tail = Some(idx);
            }
            Some(tail) => {
                self.link_after(tail, idx);
                if as_head {
                    self.head = Some(idx);
                } else {
                    self.tail = Some(idx);
                }
            }
        }
        self.len += 1;
    }

    fn unlink(&mut self, idx: usize) -> T {
        if self.len == 1 {
            self.head = None;
            self.tail = None;
        } else {
            let (prev, next) = {
                let node = self.node(idx);
                (node.prev, node.next)
            };
            self.node_mut(prev).next = next;
            self.node_mut(next).prev = prev;
            if self.head == Some(idx) {
                self.head = Some(next);
            }
            if self.tail == Some(idx) {
                self.tail = Some(prev);
            }
        }
        self.len -= 1;
        self.release(idx)
    }
}

impl<T> Default for CircularList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for CircularList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for CircularList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for CircularList<T> {}

impl<T> FromIterator<T> for CircularList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T> Extend<T> for CircularList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a CircularList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> IntoIterator for CircularList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { list: self }
    }
}

// ---------------------------------------------------------------------------
// Iterators
// ---------------------------------------------------------------------------

/// Borrowing iterator from head to tail.
pub struct Iter<'a, T> {
    list: &'a CircularList<T>,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.list.node(self.cursor?);
        self.cursor = Some(node.next);
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// Owning iterator from head to tail.
pub struct IntoIter<T> {
    list: CircularList<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.list.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len, Some(self.list.len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.list.pop_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
