//! Scenario loader.
//!
//! A scenario describes one arena: the tile map, per-tile movement costs,
//! cover anchors and everything that starts in it. Combatants carry their
//! control kind and an optional weapon.

use std::path::Path;

use game_core::{
    CombatantSpec, ControlKind, ControlPolicy, EntityId, Team, Tile, TileGrid, Vec2, WeaponSpec,
    World,
};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Scenario file contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    #[serde(default = "default_tile_size")]
    pub tile_size: f64,
    /// One string per tile row: `.` floor, `#` wall, `1`-`9` weighted floor.
    pub map: Vec<String>,
    /// Cost overrides as `(col, row, cost)`.
    #[serde(default)]
    pub costs: Vec<(i32, i32, f64)>,
    #[serde(default)]
    pub cover_anchors: Vec<Vec2>,
    #[serde(default)]
    pub combatants: Vec<CombatantEntry>,
    #[serde(default)]
    pub potions: Vec<PotionEntry>,
    #[serde(default)]
    pub spikes: Vec<SpikeEntry>,
}

fn default_tile_size() -> f64 {
    16.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantEntry {
    pub name: String,
    #[serde(default)]
    pub control: ControlKind,
    #[serde(default)]
    pub spec: CombatantSpec,
    #[serde(default)]
    pub weapon: Option<WeaponSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotionEntry {
    pub team: Team,
    pub position: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeEntry {
    pub position: Vec2,
    #[serde(default = "default_spike_damage")]
    pub damage: i32,
}

fn default_spike_damage() -> i32 {
    1
}

/// Names of the spawned combatants, in scenario order.
pub type Roster = Vec<(String, EntityId)>;

impl ScenarioSpec {
    /// Builds the world described by the scenario.
    pub fn build_world(&self) -> LoadResult<(World, Roster)> {
        let mut grid = TileGrid::from_rows(&self.map, self.tile_size)
            .map_err(|e| anyhow::anyhow!("Invalid scenario map: {}", e))?;
        for &(col, row, cost) in &self.costs {
            let tile = Tile::new(col, row);
            if !grid.contains(tile) {
                anyhow::bail!("Cost override ({}, {}) lies outside the map", col, row);
            }
            grid.set_cost(tile, cost);
        }

        let mut world = World::new(grid);
        for anchor in &self.cover_anchors {
            world.add_cover_anchor(*anchor);
        }

        let mut roster = Roster::with_capacity(self.combatants.len());
        for entry in &self.combatants {
            let id = world.spawn_combatant(&entry.spec);
            if let Some(weapon) = &entry.weapon {
                world.equip(id, weapon).map_err(|e| {
                    anyhow::anyhow!("Failed to equip combatant '{}': {}", entry.name, e)
                })?;
            }
            world
                .set_control(id, ControlPolicy::from_kind(entry.control))
                .map_err(|e| anyhow::anyhow!("Failed to control '{}': {}", entry.name, e))?;
            roster.push((entry.name.clone(), id));
        }

        for potion in &self.potions {
            world.spawn_potion(potion.team, potion.position);
        }
        for spike in &self.spikes {
            world.spawn_spike(spike.position, spike.damage);
        }

        Ok((world, roster))
    }
}

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> LoadResult<ScenarioSpec> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<ScenarioSpec> {
        ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))
    }
}
