/// Fixed-capacity history of the most recent scalar pushes.
///
/// `index(0)` is the latest value. Reads past what has been pushed return
/// `0.0`, which several recurrences rely on as their starting baseline.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    buffer: Vec<f64>,
    head: usize,
    len: usize,
}

impl RingBuffer {
    /// Create a buffer holding at most `capacity` values (minimum 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)],
            head: 0,
            len: 0,
        }
    }

    /// Append a value, returning the evicted one once the buffer is full
    pub fn push(&mut self, value: f64) -> Option<f64> {
        let capacity = self.buffer.len();
        let evicted = if self.len == capacity {
            Some(self.buffer[self.head])
        } else {
            self.len += 1;
            None
        };

        self.buffer[self.head] = value;
        self.head = (self.head + 1) % capacity;

        evicted
    }

    /// Value `i` steps back from the latest push, or 0 when not available
    pub fn index(&self, i: usize) -> f64 {
        if i >= self.len {
            return 0.0;
        }
        let capacity = self.buffer.len();
        self.buffer[(self.head + capacity - 1 - i) % capacity]
    }

    pub fn last(&self) -> f64 {
        self.index(0)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_full(&self) -> bool {
        self.len == self.buffer.len()
    }

    /// Values from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len).rev().map(move |i| self.index(i))
    }
}
