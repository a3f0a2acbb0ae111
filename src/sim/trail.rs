//! Fixed-capacity ring buffer of recent positions
//!
//! Once full, each push overwrites the oldest slot. Iteration always runs
//! oldest to newest regardless of where the write cursor sits.

use glam::Vec2;

#[derive(Debug, Clone)]
pub struct Trail {
    data: Vec<Vec2>,
    head: usize,
    len: usize,
    capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: Vec::with_capacity(capacity),
            head: 0,
            len: 0,
            capacity,
        }
    }

    pub fn push(&mut self, point: Vec2) {
        if self.data.len() < self.capacity {
            self.data.push(point);
        } else {
            self.data[self.head] = point;
        }
        self.head = (self.head + 1) % self.capacity;
        self.len = (self.len + 1).min(self.capacity);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.head = 0;
        self.len = 0;
    }

    /// Points from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = Vec2> + '_ {
        let start = self.head + self.capacity - self.len;
        (0..self.len).map(move |i| self.data[(start + i) % self.capacity])
    }

    /// Most recently pushed point
    pub fn newest(&self) -> Option<Vec2> {
        if self.len == 0 {
            return None;
        }
        Some(self.data[(self.head + self.capacity - 1) % self.capacity])
    }
}
