use orrery_common::{BubbleId, EntityId, Point};
use orrery_kernel::Scene;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Edge length of a bubble when none is configured, in metres.
pub const DEFAULT_BUBBLE_SIZE: f64 = 300_000.0;

/// Partition configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleConfig {
    /// Edge length of each cubic bubble, in metres.
    pub bubble_size: f64,
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            bubble_size: DEFAULT_BUBBLE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BubbleError {
    #[error("bubble size must be positive and finite, got {0}")]
    InvalidSize(f64),
}

/// Integer cube coordinate of a bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BubbleCoord {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl BubbleCoord {
    pub fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }
}

/// Fixed-size cubic partition of a scene.
///
/// Entities are placed by dividing their position by `bubble_size`. The
/// partition owns membership; entities only hold the [`BubbleId`] it hands
/// them, which is rebound on every rebuild.
#[derive(Debug)]
pub struct BubblePartition {
    bubble_size: f64,
    ids: HashMap<BubbleCoord, BubbleId>,
    coords: HashMap<BubbleId, BubbleCoord>,
    members: HashMap<BubbleId, HashSet<EntityId>>,
    next_id: u32,
}

impl BubblePartition {
    pub fn new(config: BubbleConfig) -> Result<Self, BubbleError> {
        let size = config.bubble_size;
        if !(size.is_finite() && size > 0.0) {
            return Err(BubbleError::InvalidSize(size));
        }
        Ok(Self {
            bubble_size: size,
            ids: HashMap::new(),
            coords: HashMap::new(),
            members: HashMap::new(),
            next_id: 1,
        })
    }

    pub fn bubble_size(&self) -> f64 {
        self.bubble_size
    }

    /// Reassign every entity in `scene` to the bubble containing it and
    /// rebind the entity's bubble handle.
    pub fn rebuild(&mut self, scene: &mut Scene) {
        let _span =
            tracing::info_span!("bubble_rebuild", entities = scene.entity_count()).entered();
        self.members.clear();
        for (id, entity) in scene.entities_mut() {
            let coord = self.position_to_bubble(entity.position());
            let bubble = self.bubble_for(coord);
            if entity.bubble() != Some(bubble) {
                tracing::debug!(%id, from = ?entity.bubble(), to = %bubble, "entity changed bubble");
                entity.set_bubble(Some(bubble));
            }
            self.members.entry(bubble).or_default().insert(*id);
        }
    }

    /// Convert a scene position to a bubble coordinate.
    pub fn position_to_bubble(&self, pos: Point) -> BubbleCoord {
        BubbleCoord {
            x: (pos.x / self.bubble_size).floor() as i64,
            y: (pos.y / self.bubble_size).floor() as i64,
            z: (pos.z / self.bubble_size).floor() as i64,
        }
    }

    /// Id of the bubble at `coord`, if one has ever been created there.
    pub fn bubble_at(&self, coord: BubbleCoord) -> Option<BubbleId> {
        self.ids.get(&coord).copied()
    }

    pub fn coord_of(&self, bubble: BubbleId) -> Option<BubbleCoord> {
        self.coords.get(&bubble).copied()
    }

    /// Entities placed in `bubble` by the last rebuild.
    pub fn entities_in_bubble(&self, bubble: BubbleId) -> HashSet<EntityId> {
        self.members.get(&bubble).cloned().unwrap_or_default()
    }

    /// Entities within `radius` bubbles of `center` along every axis.
    pub fn entities_near(&self, center: BubbleCoord, radius: i64) -> HashSet<EntityId> {
        let mut result = HashSet::new();
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                for dz in -radius..=radius {
                    let coord = BubbleCoord::new(center.x + dx, center.y + dy, center.z + dz);
                    if let Some(entities) = self
                        .bubble_at(coord)
                        .and_then(|bubble| self.members.get(&bubble))
                    {
                        result.extend(entities);
                    }
                }
            }
        }
        result
    }

    /// Number of bubbles holding at least one entity.
    pub fn bubble_count(&self) -> usize {
        self.members.len()
    }

    /// Total number of entity placements across all bubbles.
    pub fn total_placements(&self) -> usize {
        self.members.values().map(|s| s.len()).sum()
    }

    fn bubble_for(&mut self, coord: BubbleCoord) -> BubbleId {
        if let Some(id) = self.ids.get(&coord) {
            return *id;
        }
        let id = BubbleId(self.next_id);
        self.next_id += 1;
        tracing::debug!(bubble = %id, ?coord, "bubble created");
        self.ids.insert(coord, id);
        self.coords.insert(id, coord);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use orrery_kernel::{ItemRecord, KinematicController, SystemEntity};

    fn ship(id: u32, position: DVec3) -> SystemEntity {
        let item = ItemRecord {
            position,
            ..ItemRecord::new(id, 587, "Ship")
        }
        .into_ref();
        SystemEntity::dynamic(item, Box::new(KinematicController::new(position, 100.0)))
    }

    fn partition(size: f64) -> BubblePartition {
        BubblePartition::new(BubbleConfig { bubble_size: size }).unwrap()
    }

    #[test]
    fn default_size_matches_protocol_bubble() {
        assert_eq!(BubbleConfig::default().bubble_size, 300_000.0);
        let config: BubbleConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BubbleConfig::default());
    }

    #[test]
    fn rejects_unusable_sizes() {
        for size in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(BubblePartition::new(BubbleConfig { bubble_size: size }).is_err());
        }
    }

    #[test]
    fn position_to_bubble_floors_each_axis() {
        let p = partition(16.0);
        assert_eq!(
            p.position_to_bubble(DVec3::new(10.0, 0.0, 10.0)),
            BubbleCoord::new(0, 0, 0)
        );
        assert_eq!(
            p.position_to_bubble(DVec3::new(20.0, -5.0, 33.0)),
            BubbleCoord::new(1, -1, 2)
        );
    }

    #[test]
    fn rebuild_binds_every_entity() {
        let mut scene = Scene::default();
        let a = scene.add(ship(1, DVec3::ZERO)).unwrap();
        let b = scene.add(ship(2, DVec3::new(5.0, 5.0, 5.0))).unwrap();
        let c = scene.add(ship(3, DVec3::new(0.0, 40.0, 0.0))).unwrap();

        let mut p = partition(16.0);
        p.rebuild(&mut scene);

        assert_eq!(p.bubble_count(), 2);
        assert_eq!(p.total_placements(), 3);
        let home = scene.get(a).unwrap().bubble().unwrap();
        assert_eq!(scene.get(b).unwrap().bubble(), Some(home));
        assert_ne!(scene.get(c).unwrap().bubble(), Some(home));
        assert_eq!(p.entities_in_bubble(home), HashSet::from([a, b]));
        assert_eq!(p.coord_of(home), Some(BubbleCoord::new(0, 0, 0)));
    }

    #[test]
    fn bubble_ids_survive_rebuilds() {
        let mut scene = Scene::default();
        let a = scene.add(ship(1, DVec3::ZERO)).unwrap();
        let mut p = partition(16.0);
        p.rebuild(&mut scene);
        let first = scene.get(a).unwrap().bubble();

        scene.add(ship(2, DVec3::new(100.0, 0.0, 0.0))).unwrap();
        p.rebuild(&mut scene);
        assert_eq!(scene.get(a).unwrap().bubble(), first);
    }

    #[test]
    fn moving_entity_is_rebound() {
        let mut scene = Scene::default();
        let mut pc = KinematicController::new(DVec3::ZERO, 100.0);
        pc.goto(DVec3::new(1000.0, 0.0, 0.0));
        let item = ItemRecord::new(1, 587, "Runner").into_ref();
        let id = scene.add(SystemEntity::dynamic(item, Box::new(pc))).unwrap();

        let mut p = partition(50.0);
        p.rebuild(&mut scene);
        let before = scene.get(id).unwrap().bubble();
        scene.step();
        p.rebuild(&mut scene);
        let after = scene.get(id).unwrap().bubble();

        assert_ne!(before, after);
        assert_eq!(p.bubble_at(BubbleCoord::new(2, 0, 0)), after);
        assert_eq!(p.bubble_count(), 1);
    }

    #[test]
    fn entities_near_spans_neighbouring_bubbles() {
        let mut scene = Scene::default();
        let a = scene.add(ship(1, DVec3::ZERO)).unwrap();
        let b = scene.add(ship(2, DVec3::new(20.0, 20.0, -10.0))).unwrap();
        let mut p = partition(16.0);
        p.rebuild(&mut scene);

        let near = p.entities_near(BubbleCoord::new(0, 0, 0), 1);
        assert!(near.contains(&a) && near.contains(&b));
        assert!(p.entities_near(BubbleCoord::new(10, 10, 10), 0).is_empty());
    }

    #[test]
    fn unknown_bubble_is_empty() {
        let p = partition(16.0);
        assert!(p.entities_in_bubble(BubbleId(99)).is_empty());
        assert_eq!(p.bubble_at(BubbleCoord::new(0, 0, 0)), None);
    }
}
