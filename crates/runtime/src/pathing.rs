//! Pathfinding off the simulation task.
//!
//! [`AsyncPathService`] plugs into the arena as its [`PathService`]. Requests
//! made during a tick are dispatched on the next pump to tokio's blocking pool
//! with a snapshot of the grid; results flow back over a channel and are
//! collected whenever the arena polls. Results for tickets that were cancelled
//! or whose requester left the world are dropped on arrival.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use game_core::pathing::find_path;
use game_core::{EntityId, PathPoll, PathService, PathTicket, Tile, TileGrid};

struct Request {
    ticket: PathTicket,
    from: Tile,
    to: Tile,
}

struct Solved {
    ticket: PathTicket,
    path: Option<Vec<Tile>>,
}

pub struct AsyncPathService {
    runtime: Handle,
    next_ticket: u64,
    queued: Vec<Request>,
    /// Issued tickets not yet delivered, with their requester.
    outstanding: BTreeMap<PathTicket, EntityId>,
    finished: BTreeMap<PathTicket, Option<Vec<Tile>>>,
    results_tx: mpsc::UnboundedSender<Solved>,
    results_rx: mpsc::UnboundedReceiver<Solved>,
}

impl AsyncPathService {
    pub fn new(runtime: Handle) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            runtime,
            next_ticket: 0,
            queued: Vec::new(),
            outstanding: BTreeMap::new(),
            finished: BTreeMap::new(),
            results_tx,
            results_rx,
        }
    }

    fn collect(&mut self) {
        while let Ok(solved) = self.results_rx.try_recv() {
            if self.outstanding.contains_key(&solved.ticket) {
                self.finished.insert(solved.ticket, solved.path);
            } else {
                warn!(
                    target: "runtime::pathing",
                    ticket = solved.ticket.0,
                    "discarding stale path result"
                );
            }
        }
    }
}

impl PathService for AsyncPathService {
    fn request(&mut self, requester: EntityId, from: Tile, to: Tile) -> PathTicket {
        let ticket = PathTicket(self.next_ticket);
        self.next_ticket += 1;
        self.outstanding.insert(ticket, requester);
        self.queued.push(Request { ticket, from, to });
        ticket
    }

    fn poll(&mut self, ticket: PathTicket) -> PathPoll {
        self.collect();
        if let Some(path) = self.finished.remove(&ticket) {
            self.outstanding.remove(&ticket);
            return PathPoll::Ready(path);
        }
        if self.outstanding.contains_key(&ticket) {
            PathPoll::Pending
        } else {
            PathPoll::Unknown
        }
    }

    fn cancel(&mut self, ticket: PathTicket) {
        self.outstanding.remove(&ticket);
        self.finished.remove(&ticket);
        self.queued.retain(|request| request.ticket != ticket);
    }

    fn forget(&mut self, requester: EntityId) {
        self.outstanding.retain(|_, owner| *owner != requester);
        let outstanding = &self.outstanding;
        self.finished.retain(|ticket, _| outstanding.contains_key(ticket));
        self.queued
            .retain(|request| outstanding.contains_key(&request.ticket));
    }

    fn pump(&mut self, grid: &TileGrid) {
        self.collect();
        if self.queued.is_empty() {
            return;
        }

        let grid = Arc::new(grid.clone());
        debug!(
            target: "runtime::pathing",
            requests = self.queued.len(),
            "dispatching path searches"
        );
        for Request { ticket, from, to } in self.queued.drain(..) {
            let grid = Arc::clone(&grid);
            let results = self.results_tx.clone();
            self.runtime.spawn_blocking(move || {
                let path = find_path(&grid, from, to);
                if results.send(Solved { ticket, path }).is_err() {
                    trace!(target: "runtime::pathing", ticket = ticket.0, "path service dropped");
                }
            });
        }
    }

    fn in_flight(&self) -> usize {
        self.outstanding.len()
    }
}
