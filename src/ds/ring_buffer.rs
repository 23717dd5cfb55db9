/// A fixed-capacity ring buffer that overwrites its oldest element once full
#[derive(Debug, Default, Clone)]
pub struct RingBuffer<T> {
    buffer: Vec<T>,
    ix: usize,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// **Panics** if `capacity` is zero
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be positive");
        Self {
            buffer: Vec::with_capacity(capacity),
            ix: 0,
            capacity,
        }
    }

    /// Returns the number of stored elements
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert an element into the buffer, overwriting the oldest element, and return the write index
    pub fn push(&mut self, item: T) -> usize {
        let ix = self.ix;
        if ix >= self.len() {
            self.buffer.push(item);
        } else {
            self.buffer[ix] = item;
        }
        self.ix = (ix + 1) % self.capacity;
        ix
    }

    /// Get a slice view of the internal buffer in storage order
    pub fn view(&self) -> &[T] {
        &self.buffer
    }
}

impl RingBuffer<f32> {
    /// Arithmetic mean of the stored values, or `None` when empty
    pub fn mean(&self) -> Option<f32> {
        (!self.is_empty()).then(|| self.buffer.iter().sum::<f32>() / self.len() as f32)
    }
}
