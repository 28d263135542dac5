use orrery_common::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entity::{BallConfig, SystemEntity};
use crate::message::{AddBall, BallError};

/// Errors from scene membership changes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("entity has no backing record and so no id")]
    NoIdentity,
    #[error("entity {0} is already in the scene")]
    Duplicate(EntityId),
}

/// Scene configuration: tick length plus ball encoding knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Simulated seconds per tick handed to physics controllers.
    pub tick_seconds: f64,
    pub ball: BallConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 1.0,
            ball: BallConfig::default(),
        }
    }
}

/// The authoritative set of entities in one solar system.
///
/// Owns every entity and drives them once per tick: physics first, then
/// bookkeeping. Uses BTreeMap so every pass visits entities in id order.
#[derive(Debug, Default)]
pub struct Scene {
    config: SceneConfig,
    entities: BTreeMap<EntityId, SystemEntity>,
    tick: u64,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Current simulation tick.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Number of entities in the scene.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Read-only access to all entities, in id order.
    pub fn entities(&self) -> &BTreeMap<EntityId, SystemEntity> {
        &self.entities
    }

    /// Mutable iteration, used by the partitioner to rebind bubbles.
    pub fn entities_mut(&mut self) -> impl Iterator<Item = (&EntityId, &mut SystemEntity)> {
        self.entities.iter_mut()
    }

    /// Add an entity, keyed by its item id.
    pub fn add(&mut self, entity: impl Into<SystemEntity>) -> Result<EntityId, SceneError> {
        let entity = entity.into();
        let id = entity.id();
        if id.is_none() {
            return Err(SceneError::NoIdentity);
        }
        if self.entities.contains_key(&id) {
            return Err(SceneError::Duplicate(id));
        }
        tracing::debug!(%id, name = entity.name(), "entity added");
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Remove an entity. Returns it if it existed.
    pub fn remove(&mut self, id: EntityId) -> Option<SystemEntity> {
        let entity = self.entities.remove(&id);
        if entity.is_some() {
            tracing::debug!(%id, "entity removed");
        }
        entity
    }

    pub fn get(&self, id: EntityId) -> Option<&SystemEntity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut SystemEntity> {
        self.entities.get_mut(&id)
    }

    /// Advance the simulation by one tick.
    ///
    /// All physics is stepped before any bookkeeping, so target processing
    /// sees this tick's positions.
    pub fn step(&mut self) {
        let _span = tracing::info_span!("scene_step", tick = self.tick + 1).entered();
        let dt = self.config.tick_seconds;
        for entity in self.entities.values_mut() {
            entity.process_physics(dt);
        }
        for entity in self.entities.values_mut() {
            entity.process();
        }
        self.tick += 1;
    }

    /// Add-ball for one entity with the scene's ball configuration.
    pub fn make_add_ball(
        &self,
        id: EntityId,
        sequence: u32,
    ) -> Option<Result<AddBall, BallError>> {
        self.entities
            .get(&id)
            .map(|e| e.make_add_ball(sequence, &self.config.ball))
    }

    /// Add-balls for every encodable entity, numbered from `first_sequence`.
    ///
    /// Entities that fail to encode are logged and skipped without
    /// consuming a sequence number. Numbering never wraps: once `u32::MAX`
    /// has been used the remaining entities are left out.
    pub fn make_add_balls(&self, first_sequence: u32) -> Vec<AddBall> {
        let mut next = Some(first_sequence);
        let mut out = Vec::with_capacity(self.entities.len());
        for (id, entity) in &self.entities {
            let Some(sequence) = next else {
                tracing::error!(%id, built = out.len(), "sequence numbers exhausted");
                break;
            };
            match entity.make_add_ball(sequence, &self.config.ball) {
                Ok(msg) => {
                    out.push(msg);
                    next = sequence.checked_add(1);
                }
                Err(e) => tracing::warn!(%id, error = %e, "skipping ball"),
            }
        }
        out
    }

    /// Closest other entity to `id` and the squared distance to it.
    pub fn nearest(&self, id: EntityId) -> Option<(EntityId, f64)> {
        let me = self.entities.get(&id)?;
        self.entities
            .iter()
            .filter(|(other, _)| **other != id)
            .map(|(other, e)| (*other, me.distance_squared(e)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Other entities within `range` metres of `id`, in id order.
    pub fn within(&self, id: EntityId, range: f64) -> Vec<EntityId> {
        let Some(me) = self.entities.get(&id) else {
            return Vec::new();
        };
        let range_sq = range * range;
        self.entities
            .iter()
            .filter(|(other, e)| **other != id && me.distance_squared(e) <= range_sq)
            .map(|(other, _)| *other)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{DynamicEntity, ItemEntity};
    use crate::item::{ItemRecord, ItemRef};
    use crate::physics::KinematicController;
    use glam::DVec3;
    use orrery_destiny::{BallMode, MovementMode, decode_update};

    fn item(id: u32, position: DVec3) -> ItemRef {
        ItemRecord {
            position,
            radius: 40.0,
            max_velocity: 100.0,
            ..ItemRecord::new(id, 587, format!("Ship {id}"))
        }
        .into_ref()
    }

    fn ship(id: u32, position: DVec3) -> SystemEntity {
        let physics = KinematicController::new(position, 100.0);
        SystemEntity::dynamic(item(id, position), Box::new(physics))
    }

    #[test]
    fn scene_starts_empty() {
        let s = Scene::default();
        assert_eq!(s.tick(), 0);
        assert_eq!(s.entity_count(), 0);
        assert_eq!(s.config().tick_seconds, 1.0);
    }

    #[test]
    fn add_and_remove() {
        let mut s = Scene::default();
        let id = s.add(ship(1, DVec3::ZERO)).unwrap();
        assert_eq!(id, EntityId(1));
        assert!(s.get(id).is_some());
        assert!(s.remove(id).is_some());
        assert_eq!(s.entity_count(), 0);
        assert!(s.remove(id).is_none());
    }

    #[test]
    fn rejects_unidentified_and_duplicate_entities() {
        let mut s = Scene::default();
        assert_eq!(s.add(ItemEntity::new(None)), Err(SceneError::NoIdentity));
        s.add(ship(2, DVec3::ZERO)).unwrap();
        assert_eq!(
            s.add(ship(2, DVec3::ZERO)),
            Err(SceneError::Duplicate(EntityId(2)))
        );
    }

    #[test]
    fn step_moves_ships_and_counts_ticks() {
        let mut s = Scene::default();
        let mut pc = KinematicController::new(DVec3::ZERO, 100.0);
        pc.goto(DVec3::new(1000.0, 0.0, 0.0));
        let id = s
            .add(DynamicEntity::new(Some(item(3, DVec3::ZERO)), Some(Box::new(pc))))
            .unwrap();
        s.step();
        s.step();
        assert_eq!(s.tick(), 2);
        assert_eq!(s.get(id).unwrap().position(), DVec3::new(200.0, 0.0, 0.0));
    }

    #[test]
    fn step_processes_targets_after_physics() {
        let mut s = Scene::default();
        let a = s.add(ship(4, DVec3::ZERO)).unwrap();
        let b = s.add(ship(5, DVec3::new(10.0, 0.0, 0.0))).unwrap();
        s.get_mut(a).unwrap().targets_mut().start_lock(b, 2);
        s.step();
        assert!(!s.get(a).unwrap().targets().is_locked(b));
        s.step();
        assert!(s.get(a).unwrap().targets().is_locked(b));
    }

    #[test]
    fn add_balls_skip_failures_without_burning_sequence() {
        let mut s = Scene::default();
        s.add(ship(6, DVec3::ZERO)).unwrap();
        s.add(SystemEntity::item(item(7, DVec3::ZERO))).unwrap();
        s.add(ship(8, DVec3::ZERO)).unwrap();

        let msgs = s.make_add_balls(100);
        assert_eq!(msgs.len(), 2);
        let seqs: Vec<u32> = msgs
            .iter()
            .map(|m| decode_update(&m.destiny_binary).unwrap().0.sequence)
            .collect();
        assert_eq!(seqs, vec![100, 101]);
    }

    #[test]
    fn moving_ships_still_get_add_balls() {
        let mut s = Scene::default();
        s.add(ship(20, DVec3::ZERO)).unwrap();
        let mut pc = KinematicController::new(DVec3::ZERO, 100.0);
        pc.goto(DVec3::new(1.0e6, 0.0, 0.0));
        let mover = s
            .add(SystemEntity::dynamic(item(21, DVec3::ZERO), Box::new(pc)))
            .unwrap();
        s.step();

        let msgs = s.make_add_balls(1);
        assert_eq!(msgs.len(), 2);
        let (env, ball) = decode_update(&msgs[1].destiny_binary).unwrap();
        assert_eq!(env.sequence, 2);
        assert_eq!(ball.id, mover.0);
        assert_eq!(ball.mode, BallMode::Stop);
        assert_eq!(ball.position, DVec3::new(100.0, 0.0, 0.0));
    }

    #[test]
    fn sequence_numbers_never_wrap() {
        let mut s = Scene::default();
        s.add(ship(22, DVec3::ZERO)).unwrap();
        s.add(ship(23, DVec3::ZERO)).unwrap();

        let msgs = s.make_add_balls(u32::MAX);
        assert_eq!(msgs.len(), 1);
        let (env, ball) = decode_update(&msgs[0].destiny_binary).unwrap();
        assert_eq!(env.sequence, u32::MAX);
        assert_eq!(ball.id, 22);
    }

    #[test]
    fn single_add_ball_uses_scene_config() {
        let config = SceneConfig {
            tick_seconds: 0.5,
            ball: BallConfig {
                live_velocity: true,
            },
        };
        let mut s = Scene::new(config);
        let id = s.add(ship(9, DVec3::ZERO)).unwrap();
        let msg = s.make_add_ball(id, 3).unwrap().unwrap();
        let (_, ball) = decode_update(&msg.destiny_binary).unwrap();
        assert_eq!(ball.id, 9);
        assert!(s.make_add_ball(EntityId(404), 3).is_none());
    }

    #[test]
    fn warping_ship_encodes_warp_body() {
        let mut s = Scene::default();
        let target = DVec3::new(1.0e12, 0.0, 0.0);
        let mut pc = KinematicController::new(DVec3::ZERO, 100.0);
        pc.warp_to(target);
        let id = s
            .add(SystemEntity::dynamic(item(10, DVec3::ZERO), Box::new(pc)))
            .unwrap();
        s.step();
        let msg = s.make_add_ball(id, 1).unwrap().unwrap();
        let (_, ball) = decode_update(&msg.destiny_binary).unwrap();
        assert_eq!(ball.warp.unwrap().target, target);
        if let Some(SystemEntity::Dynamic(e)) = s.get(id) {
            assert_eq!(e.movement_mode(), MovementMode::Warping { target });
        }
    }

    #[test]
    fn nearest_and_within_use_squared_distance() {
        let mut s = Scene::default();
        let a = s.add(ship(11, DVec3::ZERO)).unwrap();
        s.add(ship(12, DVec3::new(0.0, 0.0, 50.0))).unwrap();
        s.add(ship(13, DVec3::new(0.0, 30.0, 0.0))).unwrap();
        assert_eq!(s.nearest(a), Some((EntityId(13), 900.0)));
        assert_eq!(s.within(a, 40.0), vec![EntityId(13)]);
        assert_eq!(s.within(a, 50.0), vec![EntityId(12), EntityId(13)]);
        assert!(s.within(EntityId(404), 1.0).is_empty());
    }
}
