//! Chunked, append-only slot storage
//!
//! Slots live in fixed-size chunks addressed as `(index >> shift, index & mask)`.
//! A chunk is allocated at full capacity and never reallocated, so growing the
//! table only ever grows the outer chunk array and issued indices stay valid.

/// Append-only table of optionally written slots
#[derive(Debug, Clone)]
pub struct ChunkedTable<T> {
    chunks: Vec<Vec<Option<T>>>,
    shift: u32,
    len: usize,
}

impl<T> ChunkedTable<T> {
    /// Create an empty table with `1 << shift` slots per chunk
    pub fn new(shift: u32) -> Self {
        Self {
            chunks: Vec::new(),
            shift,
            len: 0,
        }
    }

    fn chunk_size(&self) -> usize {
        1 << self.shift
    }

    fn mask(&self) -> usize {
        self.chunk_size() - 1
    }

    /// Reserve the next slot, leaving it unwritten
    pub fn reserve(&mut self) -> usize {
        let index = self.len;
        let chunk = index >> self.shift;
        if chunk == self.chunks.len() {
            if self.chunks.len() == self.chunks.capacity() {
                // grow the chunk array by doubling
                self.chunks.reserve(self.chunks.len().max(1));
            }
            self.chunks.push(Vec::with_capacity(self.chunk_size()));
        }
        self.chunks[chunk].push(None);
        self.len += 1;
        index
    }

    /// Reserve the next slot and write it
    pub fn push(&mut self, value: T) -> usize {
        let index = self.reserve();
        let mask = self.mask();
        self.chunks[index >> self.shift][index & mask] = Some(value);
        index
    }

    /// Whether `index` has been reserved
    pub fn is_reserved(&self, index: usize) -> bool {
        index < self.len
    }

    /// Whether `index` has been reserved and written
    pub fn is_written(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Read a written slot
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        let mask = self.mask();
        self.chunks[index >> self.shift][index & mask].as_ref()
    }

    /// Mutable access to a written slot
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len {
            return None;
        }
        let mask = self.mask();
        self.chunks[index >> self.shift][index & mask].as_mut()
    }

    /// Overwrite a reserved slot; returns false if `index` was never reserved
    pub fn set(&mut self, index: usize, value: T) -> bool {
        if index >= self.len {
            return false;
        }
        let mask = self.mask();
        self.chunks[index >> self.shift][index & mask] = Some(value);
        true
    }

    /// Number of reserved slots
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no slot has been reserved
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated chunks
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Iterate over written slots in handle order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.chunks
            .iter()
            .flatten()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|value| (index, value)))
    }
}
