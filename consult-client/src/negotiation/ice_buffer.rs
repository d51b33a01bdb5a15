use consult_core::IceCandidateRecord;
use std::collections::VecDeque;

/// Candidates that arrived before any remote description, in arrival order.
#[derive(Debug, Default)]
pub struct IceCandidateBuffer {
    pending: VecDeque<IceCandidateRecord>,
}

impl IceCandidateBuffer {
    pub fn push(&mut self, candidate: IceCandidateRecord) {
        self.pending.push_back(candidate);
    }

    /// Takes every buffered candidate, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<IceCandidateRecord> {
        self.pending.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
