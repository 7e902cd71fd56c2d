use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::pool::Job;

/// Outcome of [`HostGate::offer`].
pub enum Admission {
    /// A permit was acquired; the caller must submit the returned job to the
    /// download pool now.
    Admit(Job),
    /// No permit free; the gate keeps the job until a running download for
    /// this host finishes.
    Queued,
}

/// Per-host admission control for concurrent downloads.
///
/// At most `capacity` downloads for one host run at a time. A job either
/// holds a permit (running) or sits in the pending queue, never both.
pub struct HostGate {
    state: Mutex<GateState>,
}

struct GateState {
    available: usize,
    pending: VecDeque<Job>,
}

impl HostGate {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(GateState {
                available: capacity.max(1),
                pending: VecDeque::new(),
            }),
        }
    }

    pub fn offer(&self, job: Job) -> Admission {
        let mut state = self.state.lock();
        if state.available > 0 {
            state.available -= 1;
            Admission::Admit(job)
        } else {
            state.pending.push_back(job);
            Admission::Queued
        }
    }

    /// Called exactly once after an admitted download attempt resolves.
    /// Hands the freed permit straight to the oldest pending job, or returns
    /// it to the gate when nothing is waiting.
    pub fn release(&self) -> Option<Job> {
        let mut state = self.state.lock();
        let next = state.pending.pop_front();
        if next.is_none() {
            state.available += 1;
        }
        next
    }
}
