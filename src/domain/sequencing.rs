//! Request sequencing: per-stream monotonic tickets that make async loads
//! strictly last-ticket-wins.
//!
//! Every load stamps a ticket before suspending on the network and compares
//! it on resume; an unequal ticket means a newer load superseded this one
//! and the response is discarded without touching any state, loading flags
//! included. This is the entire concurrency-control mechanism - execution
//! is single-threaded and only suspends at network awaits.

use std::cell::Cell;

/// Ticket stamped on one load attempt of one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Monotonic counter for one independently-loaded stream.
#[derive(Debug, Default)]
pub struct RequestSequence {
    counter: Cell<u64>,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a load attempt: increment exactly once and hand out the ticket.
    pub fn begin(&self) -> Ticket {
        let next = self.counter.get() + 1;
        self.counter.set(next);
        Ticket(next)
    }

    /// True while no newer load has begun on this stream.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.counter.get() == ticket.0
    }

    /// Supersede whatever is in flight without starting a load (used when a
    /// stream is reset, e.g. the benchmark overlay is turned off).
    pub fn invalidate(&self) {
        self.begin();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_latest_ticket_is_current() {
        let seq = RequestSequence::new();
        let first = seq.begin();
        let second = seq.begin();
        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
    }

    #[test]
    fn invalidate_supersedes_in_flight_tickets() {
        let seq = RequestSequence::new();
        let ticket = seq.begin();
        seq.invalidate();
        assert!(!seq.is_current(ticket));
    }
}
