//! End-of-run report printed as JSON.

use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

use game_content::Roster;
use game_core::{GameEvent, Team};
use runtime::{ArenaSnapshot, Event};

/// Running totals over the combat and control topics.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Tally {
    pub damage: u64,
    pub hits: u64,
    pub kills: u64,
    pub healed: u64,
    pub potions: u64,
    pub switches: u64,
    pub missing_paths: u64,
}

impl Tally {
    pub fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Damaged { amount, .. } => {
                self.damage += u64::from(*amount);
                self.hits += 1;
            }
            GameEvent::Killed { .. } => self.kills += 1,
            GameEvent::Healed { amount, .. } => self.healed += u64::from(*amount),
            GameEvent::PotionConsumed { .. } => self.potions += 1,
            GameEvent::ControlSwitched { .. } => self.switches += 1,
            GameEvent::PathNotFound { .. } => self.missing_paths += 1,
            _ => {}
        }
    }

    /// Consumes events until every sender is gone.
    pub async fn collect(mut self, mut rx: broadcast::Receiver<Event>) -> Self {
        loop {
            match rx.recv().await {
                Ok(Event::Game { event, .. }) => self.record(&event),
                Ok(Event::Tick(_)) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(target: "arena_cli", skipped, "event consumer lagged");
                }
                Err(RecvError::Closed) => return self,
            }
        }
    }

    pub fn merge(mut self, other: Tally) -> Self {
        self.damage += other.damage;
        self.hits += other.hits;
        self.kills += other.kills;
        self.healed += other.healed;
        self.potions += other.potions;
        self.switches += other.switches;
        self.missing_paths += other.missing_paths;
        self
    }
}

#[derive(Debug, Serialize)]
pub struct Survivors {
    pub friendly: usize,
    pub hostile: usize,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub scenario: String,
    pub seed: u64,
    pub ticks: u64,
    pub elapsed_ms: u64,
    pub outcome: &'static str,
    pub survivors: Survivors,
    pub roster: Roster,
    pub tally: Tally,
    pub arena: ArenaSnapshot,
}

impl Summary {
    pub fn new(
        scenario: String,
        seed: u64,
        roster: Roster,
        tally: Tally,
        arena: ArenaSnapshot,
    ) -> Self {
        let survivors = Survivors {
            friendly: arena.survivors(Team::Friendly),
            hostile: arena.survivors(Team::Hostile),
        };
        let outcome = match (survivors.friendly, survivors.hostile) {
            (0, 0) => "draw",
            (_, 0) => "friendly_victory",
            (0, _) => "hostile_victory",
            _ => "undecided",
        };
        Self {
            scenario,
            seed,
            ticks: arena.tick,
            elapsed_ms: arena.now,
            outcome,
            survivors,
            roster,
            tally,
            arena,
        }
    }
}
