//! Inventory records backing scene entities.
//!
//! The attribute store lives outside this crate; entities only see it
//! through [`InventoryItem`]. Records are shared between the owning scene,
//! the inventory and any entity via [`ItemRef`], so cloning the handle is
//! the acquire and dropping it is the release.

use orrery_common::Point;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Attributes an entity reads from its backing inventory record.
pub trait InventoryItem: fmt::Debug {
    fn item_id(&self) -> u32;
    fn type_id(&self) -> u32;
    fn owner_id(&self) -> u32;
    fn name(&self) -> &str;
    fn radius(&self) -> f64;
    fn position(&self) -> Point;
    fn mass(&self) -> f64;
    fn max_velocity(&self) -> f64;
    fn agility(&self) -> f64;

    /// Owning corporation, 0 when none.
    fn corporation_id(&self) -> u32 {
        0
    }

    /// Owning alliance, 0 when none.
    fn alliance_id(&self) -> u32 {
        0
    }

    fn shield_capacity(&self) -> f64;
    fn shield_charge(&self) -> f64;
    /// Shield charge is the one attribute entities write back.
    fn set_shield_charge(&self, charge: f64);
    fn armor_damage(&self) -> f64;
    fn armor_hp(&self) -> f64;
    fn hull_damage(&self) -> f64;
    fn hull_hp(&self) -> f64;
}

/// Shared, reference-counted handle to an inventory record.
pub type ItemRef = Rc<dyn InventoryItem>;

/// In-memory inventory record.
///
/// Loadable from JSON for tools; shield charge defaults to 0 because it is
/// not persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemRecord {
    pub item_id: u32,
    pub type_id: u32,
    pub owner_id: u32,
    pub name: String,
    pub radius: f64,
    pub position: Point,
    pub mass: f64,
    pub max_velocity: f64,
    pub agility: f64,
    pub corporation_id: u32,
    pub alliance_id: u32,
    pub shield_capacity: f64,
    pub shield_charge: Cell<f64>,
    pub armor_damage: f64,
    pub armor_hp: f64,
    pub hull_damage: f64,
    pub hull_hp: f64,
}

impl ItemRecord {
    pub fn new(item_id: u32, type_id: u32, name: impl Into<String>) -> Self {
        Self {
            item_id,
            type_id,
            name: name.into(),
            ..Default::default()
        }
    }

    /// Wrap the record in a shared handle.
    pub fn into_ref(self) -> ItemRef {
        Rc::new(self)
    }
}

impl InventoryItem for ItemRecord {
    fn item_id(&self) -> u32 {
        self.item_id
    }

    fn type_id(&self) -> u32 {
        self.type_id
    }

    fn owner_id(&self) -> u32 {
        self.owner_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn radius(&self) -> f64 {
        self.radius
    }

    fn position(&self) -> Point {
        self.position
    }

    fn mass(&self) -> f64 {
        self.mass
    }

    fn max_velocity(&self) -> f64 {
        self.max_velocity
    }

    fn agility(&self) -> f64 {
        self.agility
    }

    fn corporation_id(&self) -> u32 {
        self.corporation_id
    }

    fn alliance_id(&self) -> u32 {
        self.alliance_id
    }

    fn shield_capacity(&self) -> f64 {
        self.shield_capacity
    }

    fn shield_charge(&self) -> f64 {
        self.shield_charge.get()
    }

    fn set_shield_charge(&self, charge: f64) {
        self.shield_charge.set(charge);
    }

    fn armor_damage(&self) -> f64 {
        self.armor_damage
    }

    fn armor_hp(&self) -> f64 {
        self.armor_hp
    }

    fn hull_damage(&self) -> f64 {
        self.hull_damage
    }

    fn hull_hp(&self) -> f64 {
        self.hull_hp
    }
}
