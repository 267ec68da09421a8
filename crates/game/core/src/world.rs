//! Entity storage and the read-only view handed to control policies.

use std::collections::BTreeMap;

use crate::clock::Scheduler;
use crate::combat::{Combatant, CombatantSpec};
use crate::config::ConfigError;
use crate::control::{ControlPolicy, StrongAi};
use crate::entity::{EntityId, EntityKind, Team};
use crate::error::{ErrorSeverity, GameError};
use crate::field::Field;
use crate::geometry::{Rect, Vec2};
use crate::hazard::Spike;
use crate::item::Potion;
use crate::pathing::TileGrid;
use crate::projectile::{Fired, Projectile, ProjectileGenerator, WeaponSpec};
use crate::threat::Threat;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum WorldError {
    #[error("entity {0} is not in the world")]
    UnknownEntity(EntityId),

    #[error("entity {0} is not a combatant")]
    NotACombatant(EntityId),

    #[error("combatant {0} cannot take human control")]
    NotControllable(EntityId),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GameError for WorldError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownEntity(_) | Self::NotACombatant(_) | Self::NotControllable(_) => {
                ErrorSeverity::Recoverable
            }
            Self::Config(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownEntity(_) => "WORLD_UNKNOWN_ENTITY",
            Self::NotACombatant(_) => "WORLD_NOT_A_COMBATANT",
            Self::NotControllable(_) => "WORLD_NOT_CONTROLLABLE",
            Self::Config(error) => error.error_code(),
        }
    }
}

/// What a control policy may look at while deciding.
pub trait WorldQuery {
    fn combatant(&self, id: EntityId) -> Option<&Combatant>;

    /// Every combatant, dead or alive, in id order.
    fn combatants(&self) -> Vec<&Combatant>;

    fn projectiles(&self) -> Vec<&Projectile>;

    fn potions(&self) -> Vec<&Potion>;

    fn cover_anchors(&self) -> &[Vec2];

    fn bounds(&self) -> Rect;

    fn grid(&self) -> &TileGrid;

    /// Living combatants opposing `team`.
    fn opponents_of(&self, team: Team) -> Vec<&Combatant> {
        self.combatants()
            .into_iter()
            .filter(|other| other.is_alive() && team.opposes(other.team()))
            .collect()
    }

    /// Projectiles fired by the other team.
    fn threats_to(&self, team: Team) -> Vec<Threat> {
        self.projectiles()
            .into_iter()
            .filter(|projectile| team.opposes(projectile.team))
            .map(Projectile::threat)
            .collect()
    }

    /// Potions the given team may drink.
    fn potions_for(&self, team: Team) -> Vec<&Potion> {
        self.potions()
            .into_iter()
            .filter(|potion| potion.usable_by(team))
            .collect()
    }
}

/// Owner of every entity in a running arena.
///
/// Ids are allocated from one counter, so a lower id always means an older
/// entity.
#[derive(Debug)]
pub struct World {
    grid: TileGrid,
    cover_anchors: Vec<Vec2>,
    next_id: u32,
    combatants: BTreeMap<EntityId, Combatant>,
    projectiles: BTreeMap<EntityId, Projectile>,
    fields: BTreeMap<EntityId, Field>,
    potions: BTreeMap<EntityId, Potion>,
    spikes: BTreeMap<EntityId, Spike>,
    controls: BTreeMap<EntityId, ControlPolicy>,
    human: Option<EntityId>,
}

impl World {
    pub fn new(grid: TileGrid) -> Self {
        Self {
            grid,
            cover_anchors: Vec::new(),
            next_id: 1,
            combatants: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            fields: BTreeMap::new(),
            potions: BTreeMap::new(),
            spikes: BTreeMap::new(),
            controls: BTreeMap::new(),
            human: None,
        }
    }

    pub fn add_cover_anchor(&mut self, anchor: Vec2) {
        self.cover_anchors.push(anchor);
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn spawn_combatant(&mut self, spec: &CombatantSpec) -> EntityId {
        let id = self.allocate_id();
        self.combatants.insert(id, Combatant::new(id, spec));
        self.controls.insert(id, ControlPolicy::None);
        id
    }

    pub fn spawn_potion(&mut self, team: Team, position: Vec2) -> EntityId {
        let id = self.allocate_id();
        self.potions.insert(id, Potion::new(id, team, position));
        id
    }

    pub fn spawn_spike(&mut self, position: Vec2, damage: i32) -> EntityId {
        let id = self.allocate_id();
        self.spikes.insert(id, Spike::new(id, position, damage));
        id
    }

    /// Adds a field, first removing the oldest fields of the same team and
    /// effects so that at most `capacity` remain. A field always fits, even
    /// with a capacity of zero.
    pub fn spawn_field(
        &mut self,
        build: impl FnOnce(EntityId) -> Field,
        capacity: Option<usize>,
    ) -> (EntityId, Vec<EntityId>) {
        let id = self.allocate_id();
        let field = build(id);

        let mut evicted = Vec::new();
        if let Some(capacity) = capacity {
            let same_kind: Vec<EntityId> = self
                .fields
                .values()
                .filter(|other| other.team == field.team && other.effects == field.effects)
                .map(|other| other.id)
                .collect();
            let excess = (same_kind.len() + 1).saturating_sub(capacity.max(1));
            for oldest in same_kind.into_iter().take(excess) {
                self.fields.remove(&oldest);
                evicted.push(oldest);
            }
        }

        self.fields.insert(id, field);
        (id, evicted)
    }

    /// Builds a generator from `weapon` and attaches it to combatant `id`.
    pub fn equip(&mut self, id: EntityId, weapon: &WeaponSpec) -> Result<(), WorldError> {
        let combatant = self.combatant_entry(id)?;
        let generator = ProjectileGenerator::new(id, combatant.team(), weapon);
        combatant.equip(generator)?;
        Ok(())
    }

    /// Attaches an already built generator; it must belong to `id`.
    pub fn attach_generator(
        &mut self,
        id: EntityId,
        generator: ProjectileGenerator,
    ) -> Result<(), WorldError> {
        self.combatant_entry(id)?.equip(generator)?;
        Ok(())
    }

    fn combatant_entry(&mut self, id: EntityId) -> Result<&mut Combatant, WorldError> {
        if self.kind_of(id).is_some_and(|kind| kind != EntityKind::Combatant) {
            return Err(WorldError::NotACombatant(id));
        }
        self.combatants
            .get_mut(&id)
            .ok_or(WorldError::UnknownEntity(id))
    }

    /// Installs a control policy.
    ///
    /// Only one combatant is human-controlled at a time: handing human
    /// control to `id` puts the previous human under strong AI.
    pub fn set_control(&mut self, id: EntityId, policy: ControlPolicy) -> Result<(), WorldError> {
        self.combatant_entry(id)?;
        let is_human = matches!(policy, ControlPolicy::Human(_));
        if is_human {
            if let Some(previous) = self.human.filter(|previous| *previous != id) {
                if self.combatants.contains_key(&previous) {
                    self.controls
                        .insert(previous, ControlPolicy::StrongAi(StrongAi::new()));
                }
            }
            self.human = Some(id);
        } else if self.human == Some(id) {
            self.human = None;
        }
        self.controls.insert(id, policy);
        Ok(())
    }

    pub fn human(&self) -> Option<EntityId> {
        self.human
    }

    pub fn control(&self, id: EntityId) -> Option<&ControlPolicy> {
        self.controls.get(&id)
    }

    pub fn control_mut(&mut self, id: EntityId) -> Option<&mut ControlPolicy> {
        self.controls.get_mut(&id)
    }

    /// Moves every control policy out so policies can decide against an
    /// unchanged world. Pair with [`World::restore_controls`].
    pub(crate) fn take_controls(&mut self) -> BTreeMap<EntityId, ControlPolicy> {
        std::mem::take(&mut self.controls)
    }

    /// Puts policies back, dropping those of entities removed meanwhile.
    pub(crate) fn restore_controls(&mut self, mut controls: BTreeMap<EntityId, ControlPolicy>) {
        controls.retain(|id, _| self.combatants.contains_key(id));
        // policies installed while the others were out win
        controls.append(&mut self.controls);
        self.controls = controls;
    }

    /// Fires the weapon of `owner` along `heading`.
    ///
    /// Instances evicted by the generator capacity are removed from the
    /// world and reported in the returned [`Fired`].
    pub fn fire(&mut self, owner: EntityId, heading: f64, timers: &mut Scheduler) -> Option<Fired> {
        let id = EntityId(self.next_id);
        let projectiles = &self.projectiles;
        let combatant = self.combatants.get_mut(&owner)?;
        if !combatant.is_alive() {
            return None;
        }
        let origin = combatant.position;
        let fired = combatant.generator_mut()?.fire(id, origin, heading, timers, |instance| {
            projectiles.contains_key(&instance)
        })?;

        self.next_id += 1;
        for evicted in &fired.evicted {
            self.projectiles.remove(evicted);
        }
        self.projectiles.insert(id, fired.projectile.clone());
        Some(fired)
    }

    /// Registers contact between a field and a combatant. Returns the field
    /// when the contact counts, see [`Field::try_contact`].
    pub(crate) fn field_contact(&mut self, field: EntityId, target: EntityId) -> Option<&Field> {
        let target = self.combatants.get(&target)?;
        let field = self.fields.get_mut(&field)?;
        if field.try_contact(target) {
            Some(field)
        } else {
            None
        }
    }

    pub fn kind_of(&self, id: EntityId) -> Option<EntityKind> {
        if self.combatants.contains_key(&id) {
            Some(EntityKind::Combatant)
        } else if self.projectiles.contains_key(&id) {
            Some(EntityKind::Projectile)
        } else if self.potions.contains_key(&id) {
            Some(EntityKind::Potion)
        } else if self.fields.contains_key(&id) {
            Some(EntityKind::Field)
        } else if self.spikes.contains_key(&id) {
            Some(EntityKind::Spike)
        } else {
            None
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.kind_of(id).is_some()
    }

    /// Removes any entity. Returns its kind, or `None` if it was already gone.
    pub fn remove(&mut self, id: EntityId) -> Option<EntityKind> {
        let kind = self.kind_of(id)?;
        match kind {
            EntityKind::Combatant => {
                self.combatants.remove(&id);
                self.controls.remove(&id);
                if self.human == Some(id) {
                    self.human = None;
                }
            }
            EntityKind::Projectile => {
                self.projectiles.remove(&id);
            }
            EntityKind::Potion => {
                self.potions.remove(&id);
            }
            EntityKind::Field => {
                self.fields.remove(&id);
            }
            EntityKind::Spike => {
                self.spikes.remove(&id);
            }
        }
        Some(kind)
    }

    pub fn combatant_mut(&mut self, id: EntityId) -> Option<&mut Combatant> {
        self.combatants.get_mut(&id)
    }

    pub fn projectile(&self, id: EntityId) -> Option<&Projectile> {
        self.projectiles.get(&id)
    }

    pub fn projectile_mut(&mut self, id: EntityId) -> Option<&mut Projectile> {
        self.projectiles.get_mut(&id)
    }

    pub fn field(&self, id: EntityId) -> Option<&Field> {
        self.fields.get(&id)
    }

    pub fn field_mut(&mut self, id: EntityId) -> Option<&mut Field> {
        self.fields.get_mut(&id)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    pub fn potion(&self, id: EntityId) -> Option<&Potion> {
        self.potions.get(&id)
    }

    pub fn spike(&self, id: EntityId) -> Option<&Spike> {
        self.spikes.get(&id)
    }

    pub fn spikes(&self) -> impl Iterator<Item = &Spike> {
        self.spikes.values()
    }

    pub fn combatant_ids(&self) -> Vec<EntityId> {
        self.combatants.keys().copied().collect()
    }

    pub fn projectile_ids(&self) -> Vec<EntityId> {
        self.projectiles.keys().copied().collect()
    }

    pub(crate) fn projectiles_mut(&mut self) -> impl Iterator<Item = &mut Projectile> {
        self.projectiles.values_mut()
    }

    /// The grid alongside mutable combatants, for integrating motion.
    pub(crate) fn grid_and_combatants_mut(
        &mut self,
    ) -> (&TileGrid, impl Iterator<Item = &mut Combatant>) {
        (&self.grid, self.combatants.values_mut())
    }
}

impl WorldQuery for World {
    fn combatant(&self, id: EntityId) -> Option<&Combatant> {
        self.combatants.get(&id)
    }

    fn combatants(&self) -> Vec<&Combatant> {
        self.combatants.values().collect()
    }

    fn projectiles(&self) -> Vec<&Projectile> {
        self.projectiles.values().collect()
    }

    fn potions(&self) -> Vec<&Potion> {
        self.potions.values().collect()
    }

    fn cover_anchors(&self) -> &[Vec2] {
        &self.cover_anchors
    }

    fn bounds(&self) -> Rect {
        self.grid.bounds()
    }

    fn grid(&self) -> &TileGrid {
        &self.grid
    }
}
