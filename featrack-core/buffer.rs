use std::collections::VecDeque;

use crate::types::Frame;

/// Bounded FIFO-evicting buffer of the most recent frames.
///
/// Matching always pairs the two most recently retained frames, so the
/// reference configuration uses capacity 2; a larger capacity changes
/// nothing about the matching semantics.
#[derive(Debug)]
pub struct FrameBuffer {
    frames: VecDeque<Frame>,
    capacity: usize,
}

impl FrameBuffer {
    /// Capacity is fixed for the lifetime of the buffer and must be >= 1.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "frame buffer capacity must be at least 1");
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a frame, evicting the oldest one first when full. O(1).
    pub fn push(&mut self, frame: Frame) {
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    /// The most recently pushed frame.
    pub fn latest(&self) -> Option<&Frame> {
        self.frames.back()
    }

    /// The second-most-recently pushed frame, if two are retained.
    pub fn previous(&self) -> Option<&Frame> {
        if self.frames.len() < 2 {
            return None;
        }
        self.frames.get(self.frames.len() - 2)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
