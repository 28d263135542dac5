//! Scene entities.
//!
//! A closed set of variants sharing one capability surface:
//! - [`ItemEntity`]: identity, geometry and damage come from a shared
//!   inventory record.
//! - [`DynamicEntity`]: an item entity that also owns a physics controller
//!   and can encode itself as a Destiny ball.
//!
//! [`SystemEntity`] dispatches over both.
//!
//! # Invariants
//! - Every entity owns its own [`TargetList`].
//! - The bubble handle is a lookup key only; the partition rebinds it.
//! - Accessors never fail: a missing item yields inert fallbacks.

use glam::DVec3;
use orrery_common::{BubbleId, EntityId, Point, geom, time};
use orrery_destiny::{
    BallState, ENVELOPE_LEN, Envelope, MovementMode, decode_update, encode_ball, encoded_len,
    hex_dump, sentinel, sub_type, write_envelope,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::damage::DamageState;
use crate::item::{InventoryItem, ItemRef};
use crate::message::{AddBall, BallError, SlimItem};
use crate::physics::PhysicsController;
use crate::targets::TargetList;

/// Name reported by an entity without a backing record.
pub const PLACEHOLDER_NAME: &str = "NoName";

/// Radius reported by an entity without a backing record.
pub const FALLBACK_RADIUS: f64 = 1.0;

/// Knobs for building ball packets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    /// Write the controller's live velocity into stopped balls instead of
    /// the zero vector legacy clients were always sent.
    pub live_velocity: bool,
}

/// State every entity carries regardless of variant.
#[derive(Debug, Default)]
pub struct EntityCore {
    targets: TargetList,
    bubble: Option<BubbleId>,
}

impl EntityCore {
    pub fn targets(&self) -> &TargetList {
        &self.targets
    }

    pub fn targets_mut(&mut self) -> &mut TargetList {
        &mut self.targets
    }

    pub fn bubble(&self) -> Option<BubbleId> {
        self.bubble
    }

    pub fn set_bubble(&mut self, bubble: Option<BubbleId>) {
        self.bubble = bubble;
    }
}

/// Entity whose identity and attributes come from an inventory record.
#[derive(Debug, Default)]
pub struct ItemEntity {
    core: EntityCore,
    item: Option<ItemRef>,
}

impl ItemEntity {
    pub fn new(item: Option<ItemRef>) -> Self {
        let mut entity = Self::default();
        if item.is_some() {
            entity.set_item(item);
        }
        entity
    }

    /// Attach a backing record, releasing the previous one first.
    ///
    /// Passing `None` is a caller error: it is logged and ignored, so an
    /// entity never goes back to having no record. When the new record has
    /// shield capacity its charge is topped up, since charge is not
    /// persisted.
    pub fn set_item(&mut self, item: Option<ItemRef>) {
        let Some(item) = item else {
            tracing::error!(id = %self.id(), "tried to attach no inventory record");
            return;
        };
        drop(self.item.take());
        let capacity = item.shield_capacity();
        if capacity > 0.0 {
            item.set_shield_charge(capacity);
        }
        self.item = Some(item);
    }

    pub fn item(&self) -> Option<&ItemRef> {
        self.item.as_ref()
    }

    pub fn core(&self) -> &EntityCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    pub fn id(&self) -> EntityId {
        self.item
            .as_ref()
            .map_or(EntityId::NONE, |i| EntityId(i.item_id()))
    }

    pub fn name(&self) -> &str {
        self.item.as_ref().map_or(PLACEHOLDER_NAME, |i| i.name())
    }

    pub fn radius(&self) -> f64 {
        self.item.as_ref().map_or(FALLBACK_RADIUS, |i| i.radius())
    }

    pub fn position(&self) -> Point {
        self.item.as_ref().map_or(DVec3::ZERO, |i| i.position())
    }

    pub fn make_slim_item(&self) -> SlimItem {
        match &self.item {
            Some(i) => SlimItem {
                item_id: i.item_id(),
                type_id: i.type_id(),
                owner_id: i.owner_id(),
            },
            None => SlimItem {
                item_id: 0,
                type_id: 0,
                owner_id: 0,
            },
        }
    }

    /// Damage state as of `timestamp` (FILETIME units).
    pub fn damage_state_at(&self, timestamp: u64) -> DamageState {
        match &self.item {
            Some(i) => DamageState::of(i.as_ref(), timestamp),
            None => DamageState::empty(timestamp),
        }
    }

    pub fn make_damage_state(&self) -> DamageState {
        self.damage_state_at(time::win32_time_now())
    }

    pub fn process(&mut self) {
        self.core.targets.process();
    }

    fn attr(&self, f: impl Fn(&dyn InventoryItem) -> f64) -> f64 {
        self.item.as_ref().map_or(0.0, |i| f(i.as_ref()))
    }

    fn ownership(&self) -> (u32, u32) {
        self.item
            .as_ref()
            .map_or((0, 0), |i| (i.corporation_id(), i.alliance_id()))
    }
}

/// Item entity driven by a physics controller.
#[derive(Debug)]
pub struct DynamicEntity {
    // Declared before `base` so the controller is dropped while the item
    // reference is still held.
    physics: Option<Box<dyn PhysicsController>>,
    base: ItemEntity,
}

impl DynamicEntity {
    pub fn new(item: Option<ItemRef>, physics: Option<Box<dyn PhysicsController>>) -> Self {
        Self {
            physics,
            base: ItemEntity::new(item),
        }
    }

    pub fn base(&self) -> &ItemEntity {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut ItemEntity {
        &mut self.base
    }

    pub fn physics(&self) -> Option<&dyn PhysicsController> {
        self.physics.as_deref()
    }

    pub fn physics_mut(&mut self) -> Option<&mut (dyn PhysicsController + 'static)> {
        self.physics.as_deref_mut()
    }

    pub fn position(&self) -> Point {
        match &self.physics {
            Some(p) => p.position(),
            None => self.base.position(),
        }
    }

    pub fn mass(&self) -> f64 {
        self.base.attr(|i| i.mass())
    }

    pub fn max_velocity(&self) -> f64 {
        self.base.attr(|i| i.max_velocity())
    }

    pub fn agility(&self) -> f64 {
        self.base.attr(|i| i.agility())
    }

    pub fn movement_mode(&self) -> MovementMode {
        self.physics
            .as_ref()
            .map_or(MovementMode::Stopped, |p| p.movement_mode())
    }

    /// Step the physics controller by `dt` seconds. No-op without one.
    pub fn process_physics(&mut self, dt: f64) {
        if let Some(p) = self.physics.as_mut() {
            p.advance(dt);
        }
    }

    /// Snapshot of everything the encoder needs.
    pub fn ball_state(&self, config: &BallConfig) -> BallState<'_> {
        let (corporation_id, alliance_id) = self.base.ownership();
        let velocity = match (&self.physics, config.live_velocity) {
            (Some(p), true) => p.velocity(),
            _ => DVec3::ZERO,
        };
        BallState {
            id: self.base.id().0,
            radius: self.base.radius(),
            position: self.position(),
            sub_type: sub_type::PLAYER,
            mass: self.mass(),
            cloaked: false,
            corporation_id,
            alliance_id,
            max_velocity: self.max_velocity(),
            velocity,
            agility: self.agility(),
            speed_fraction: sentinel::FULL_SPEED_FRACTION,
            mode: self.movement_mode(),
            name: self.base.name(),
        }
    }

    /// Append this entity's ball body to an in-progress update.
    ///
    /// Goto, follow and orbit have no body of their own and are sent as
    /// stopped balls.
    pub fn encode_ball_body(&self, out: &mut Vec<u8>, config: &BallConfig) {
        encode_ball(&self.ball_state(config), out);
    }

    /// Build the add-ball update for sequence number `sequence`.
    pub fn make_add_ball(&self, sequence: u32, config: &BallConfig) -> AddBall {
        let id = self.base.id();
        let state = self.ball_state(config);

        let mut destiny_binary = Vec::with_capacity(ENVELOPE_LEN + encoded_len(&state));
        write_envelope(&mut destiny_binary, Envelope::add_ball(sequence));
        encode_ball(&state, &mut destiny_binary);

        let mut damages = BTreeMap::new();
        damages.insert(id, self.base.make_damage_state());

        let msg = AddBall {
            destiny_binary,
            damages,
            slim: self.base.make_slim_item(),
        };

        if tracing::enabled!(tracing::Level::TRACE) {
            tracing::trace!(%id, sequence, slim = ?msg.slim, damages = ?msg.damages, "add ball");
            tracing::trace!(
                bytes = msg.destiny_binary.len(),
                "ball binary:\n{}",
                hex_dump(&msg.destiny_binary)
            );
            match decode_update(&msg.destiny_binary) {
                Ok((_, ball)) => tracing::trace!(?ball, "ball decoded"),
                Err(e) => tracing::trace!(error = %e, "ball did not decode"),
            }
        }
        msg
    }
}

/// Any entity that can live in a scene.
#[derive(Debug)]
pub enum SystemEntity {
    Item(ItemEntity),
    Dynamic(DynamicEntity),
}

impl SystemEntity {
    /// Item-only entity backed by `item`.
    pub fn item(item: ItemRef) -> Self {
        SystemEntity::Item(ItemEntity::new(Some(item)))
    }

    /// Physics-backed entity backed by `item`.
    pub fn dynamic(item: ItemRef, physics: Box<dyn PhysicsController>) -> Self {
        SystemEntity::Dynamic(DynamicEntity::new(Some(item), Some(physics)))
    }

    fn base(&self) -> &ItemEntity {
        match self {
            SystemEntity::Item(e) => e,
            SystemEntity::Dynamic(e) => &e.base,
        }
    }

    fn base_mut(&mut self) -> &mut ItemEntity {
        match self {
            SystemEntity::Item(e) => e,
            SystemEntity::Dynamic(e) => &mut e.base,
        }
    }

    pub fn id(&self) -> EntityId {
        self.base().id()
    }

    pub fn name(&self) -> &str {
        self.base().name()
    }

    pub fn radius(&self) -> f64 {
        self.base().radius()
    }

    pub fn position(&self) -> Point {
        match self {
            SystemEntity::Item(e) => e.position(),
            SystemEntity::Dynamic(e) => e.position(),
        }
    }

    pub fn backing_item(&self) -> Option<&ItemRef> {
        self.base().item()
    }

    /// Attach a new backing record. See [`ItemEntity::set_item`].
    pub fn set_item(&mut self, item: Option<ItemRef>) {
        self.base_mut().set_item(item);
    }

    pub fn targets(&self) -> &TargetList {
        self.base().core().targets()
    }

    pub fn targets_mut(&mut self) -> &mut TargetList {
        self.base_mut().core_mut().targets_mut()
    }

    pub fn bubble(&self) -> Option<BubbleId> {
        self.base().core().bubble()
    }

    pub fn set_bubble(&mut self, bubble: Option<BubbleId>) {
        self.base_mut().core_mut().set_bubble(bubble);
    }

    /// Squared distance between this entity and `other`.
    pub fn distance_squared(&self, other: &SystemEntity) -> f64 {
        geom::distance_squared(self.position(), other.position())
    }

    /// Per-tick bookkeeping other than physics.
    pub fn process(&mut self) {
        self.base_mut().process();
    }

    /// Per-tick physics step. No-op for item-only entities.
    pub fn process_physics(&mut self, dt: f64) {
        if let SystemEntity::Dynamic(e) = self {
            e.process_physics(dt);
        }
    }

    pub fn make_slim_item(&self) -> SlimItem {
        self.base().make_slim_item()
    }

    pub fn make_damage_state(&self) -> DamageState {
        self.base().make_damage_state()
    }

    /// Build the add-ball update. Only dynamic entities carry ball data.
    pub fn make_add_ball(
        &self,
        sequence: u32,
        config: &BallConfig,
    ) -> Result<AddBall, BallError> {
        match self {
            SystemEntity::Dynamic(e) => Ok(e.make_add_ball(sequence, config)),
            SystemEntity::Item(e) => Err(BallError::NotEncodable { id: e.id() }),
        }
    }
}

impl From<ItemEntity> for SystemEntity {
    fn from(e: ItemEntity) -> Self {
        SystemEntity::Item(e)
    }
}

impl From<DynamicEntity> for SystemEntity {
    fn from(e: DynamicEntity) -> Self {
        SystemEntity::Dynamic(e)
    }
}

/// Two handles to the same record?
pub fn same_item(a: &ItemRef, b: &ItemRef) -> bool {
    Rc::ptr_eq(a, b)
}
