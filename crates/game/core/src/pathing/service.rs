use std::collections::{BTreeMap, VecDeque};

use crate::entity::EntityId;

use super::astar::find_path;
use super::grid::{Tile, TileGrid};

/// Identifies one path request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathTicket(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub enum PathPoll {
    /// Still being searched.
    Pending,
    /// Search finished; `None` means no route exists. Delivered once.
    Ready(Option<Vec<Tile>>),
    /// Never issued, cancelled, or already collected.
    Unknown,
}

/// Asynchronous grid pathfinder.
///
/// Results of a request are never available on the tick it was made.
pub trait PathService {
    fn request(&mut self, requester: EntityId, from: Tile, to: Tile) -> PathTicket;

    fn poll(&mut self, ticket: PathTicket) -> PathPoll;

    fn cancel(&mut self, ticket: PathTicket);

    /// Drops every request of a requester that left the world.
    fn forget(&mut self, requester: EntityId);

    /// Advances pending searches. Called once at the start of each tick.
    fn pump(&mut self, _grid: &TileGrid) {}

    /// Requests issued and not yet collected.
    fn in_flight(&self) -> usize;
}

#[derive(Clone, Debug)]
struct Request {
    ticket: PathTicket,
    requester: EntityId,
    from: Tile,
    to: Tile,
}

/// In-process pathfinder that resolves requests on the next pump.
#[derive(Clone, Debug, Default)]
pub struct DeferredPathfinder {
    next_ticket: u64,
    queued: VecDeque<Request>,
    finished: BTreeMap<PathTicket, (EntityId, Option<Vec<Tile>>)>,
}

impl DeferredPathfinder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PathService for DeferredPathfinder {
    fn request(&mut self, requester: EntityId, from: Tile, to: Tile) -> PathTicket {
        let ticket = PathTicket(self.next_ticket);
        self.next_ticket += 1;
        self.queued.push_back(Request {
            ticket,
            requester,
            from,
            to,
        });
        ticket
    }

    fn poll(&mut self, ticket: PathTicket) -> PathPoll {
        if let Some((_, path)) = self.finished.remove(&ticket) {
            return PathPoll::Ready(path);
        }
        if self.queued.iter().any(|request| request.ticket == ticket) {
            PathPoll::Pending
        } else {
            PathPoll::Unknown
        }
    }

    fn cancel(&mut self, ticket: PathTicket) {
        self.queued.retain(|request| request.ticket != ticket);
        self.finished.remove(&ticket);
    }

    fn forget(&mut self, requester: EntityId) {
        self.queued.retain(|request| request.requester != requester);
        self.finished.retain(|_, (owner, _)| *owner != requester);
    }

    fn pump(&mut self, grid: &TileGrid) {
        while let Some(request) = self.queued.pop_front() {
            let path = find_path(grid, request.from, request.to);
            self.finished.insert(request.ticket, (request.requester, path));
        }
    }

    fn in_flight(&self) -> usize {
        self.queued.len() + self.finished.len()
    }
}
