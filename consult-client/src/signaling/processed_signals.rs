use consult_core::utils::PROCESSED_SIGNAL_CAPACITY;
use heapless::Deque;

/// Relay ids already applied. Bounded; the oldest id is evicted first.
#[derive(Debug)]
pub struct ProcessedSignals {
    ids: Deque<u64, PROCESSED_SIGNAL_CAPACITY>,
}

impl ProcessedSignals {
    pub fn new() -> Self {
        Self { ids: Deque::new() }
    }

    /// Records `id`. Returns false if it was already recorded.
    pub fn insert(&mut self, id: u64) -> bool {
        if self.contains(id) {
            return false;
        }
        if self.ids.is_full() {
            self.ids.pop_front();
        }
        let _ = self.ids.push_back(id);
        true
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.iter().any(|seen| *seen == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        PROCESSED_SIGNAL_CAPACITY
    }
}

impl Default for ProcessedSignals {
    fn default() -> Self {
        Self::new()
    }
}
