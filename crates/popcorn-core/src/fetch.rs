use std::fmt;
use std::future::Future;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Per-slot request version. Only the most recently started generation may mutate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Search,
    Detail,
}

impl SlotKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SlotKind::Search => "search",
            SlotKind::Detail => "detail",
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct InFlight {
    generation: Generation,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Single-occupancy fetch scope.
///
/// Starting a fetch cancels whatever the slot was running. Cancellation is
/// best-effort, so results are also filtered by generation in [`FetchSlot::accept`]:
/// only the in-flight generation is accepted, and only once.
pub struct FetchSlot {
    kind: SlotKind,
    latest: Generation,
    in_flight: Option<InFlight>,
}

impl FetchSlot {
    pub fn new(kind: SlotKind) -> Self {
        Self {
            kind,
            latest: Generation::default(),
            in_flight: None,
        }
    }

    pub fn kind(&self) -> SlotKind {
        self.kind
    }

    pub fn latest(&self) -> Generation {
        self.latest
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Cancel the current occupant, then spawn `operation` as the new one.
    ///
    /// The output is wrapped with its generation and posted on `events`.
    /// Must be called from within a tokio runtime.
    pub fn start<Op, Fut, T, E, W>(&mut self, events: &UnboundedSender<E>, operation: Op, wrap: W) -> Generation
    where
        Op: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
        W: FnOnce(Generation, T) -> E + Send + 'static,
    {
        self.cancel();

        self.latest = self.latest.next();
        let generation = self.latest;
        let cancel = CancellationToken::new();
        let request = operation(cancel.clone());
        let events = events.clone();
        let kind = self.kind;

        let task = tokio::spawn(async move {
            let output = request.await;
            if events.send(wrap(generation, output)).is_err() {
                trace!(slot = %kind, %generation, "Session dropped before fetch completed");
            }
        });

        debug!(slot = %self.kind, %generation, "Fetch started");
        self.in_flight = Some(InFlight { generation, cancel, task });
        generation
    }

    /// Cancel the in-flight fetch, if any. Its result will be rejected by `accept`.
    pub fn cancel(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.cancel.cancel();
            debug!(slot = %self.kind, generation = %in_flight.generation, "Fetch cancelled");
        }
    }

    /// Freshness check for a completed fetch. True only for the in-flight generation,
    /// which is consumed so the same result cannot be applied twice.
    pub fn accept(&mut self, generation: Generation) -> bool {
        match &self.in_flight {
            Some(in_flight) if in_flight.generation == generation => {
                self.in_flight = None;
                true
            }
            _ => {
                debug!(slot = %self.kind, %generation, latest = %self.latest, "Discarding stale fetch result");
                false
            }
        }
    }

    /// Teardown: cancel and abort the in-flight task so nothing is posted afterwards.
    pub fn shutdown(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.cancel.cancel();
            in_flight.task.abort();
            debug!(slot = %self.kind, generation = %in_flight.generation, "Fetch aborted on shutdown");
        }
    }
}

impl Drop for FetchSlot {
    fn drop(&mut self) {
        self.shutdown();
    }
}
