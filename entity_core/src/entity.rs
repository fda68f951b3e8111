//! Entity - a record of named fields extended at runtime by addons

use crate::accessor::Fields;
use crate::addon::ability::AbilityBook;
use crate::addon::inventory::Inventory;
use crate::addon::movement::Movement;
use crate::addon::stat::{Stat, StatHelper};
use crate::addon::Registry;
use crate::types::{Options, Slot};
use crate::AddonError;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Type marker carried by every entity record
pub const ENTITY_TYPE: &str = "entity";

/// Record key holding the type marker
pub const TYPE_KEY: &str = "_type";

/// Name given to entities created without one
pub const DEFAULT_NAME: &str = "???";

/// A composed game object
#[derive(Clone, Default)]
pub struct Entity {
    fields: Fields,
    installed: BTreeSet<String>,
    stats: BTreeMap<String, Stat>,
    helpers: BTreeMap<String, StatHelper>,
    pub(crate) abilities: Option<AbilityBook>,
    pub(crate) inventory: Option<Inventory>,
    pub(crate) movement: Option<Movement>,
}

impl Entity {
    /// Create an entity with just a name
    pub fn new(name: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(name.into()));
        Self::create(fields)
    }

    /// Create an entity, giving every initial field a read/write accessor
    ///
    /// A missing or empty `name` becomes `"???"`.
    pub fn create(mut fields: Map<String, Value>) -> Self {
        let named = fields
            .get("name")
            .and_then(Value::as_str)
            .is_some_and(|name| !name.is_empty());
        if !named {
            fields.insert("name".to_string(), Value::from(DEFAULT_NAME));
        }

        let mut entity = Entity::default();
        for (key, value) in fields {
            entity.fields.insert(key, value);
        }
        entity
    }

    /// Create from loose input: a string is a name, an object is a field map
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(name) => Self::new(name),
            Value::Object(fields) => Self::create(fields),
            _ => Self::create(Map::new()),
        }
    }

    /// Restore an entity from a record produced by [`Entity::to_record`]
    pub fn from_record(record: &Value) -> Result<Self, AddonError> {
        let fields = record
            .as_object()
            .filter(|fields| fields.get(TYPE_KEY).and_then(Value::as_str) == Some(ENTITY_TYPE))
            .ok_or_else(|| AddonError::InvalidEntity {
                reference: record.clone(),
            })?;

        let mut fields = fields.clone();
        fields.remove(TYPE_KEY);
        Ok(Self::create(fields))
    }

    /// Plain field values tagged with the type marker
    pub fn to_record(&self) -> Value {
        let mut record = self.fields.values().clone();
        record.insert(TYPE_KEY.to_string(), Value::from(ENTITY_TYPE));
        Value::Object(record)
    }

    /// Apply a registered addon, returning the entity for chaining
    pub fn implement(
        &mut self,
        registry: &Registry,
        addon: &str,
        options: Options,
    ) -> Result<&mut Self, AddonError> {
        registry.apply(addon, &options, self)
    }

    pub fn name(&self) -> &str {
        self.fields
            .values()
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_NAME)
    }

    // ========================================================================
    // Fields
    // ========================================================================

    /// Read a field through its accessor
    pub fn get(&self, field: &str) -> Option<Value> {
        self.fields.get(field)
    }

    /// Write a field through its accessor; `Ok(false)` for a falsy value
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<bool, AddonError> {
        self.fields.set(field, value)
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Field table, for building custom accessors
    pub fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }

    // ========================================================================
    // Capabilities
    // ========================================================================

    /// Whether the entity carries a field, stat, helper or addon capability
    pub fn has(&self, key: &str) -> bool {
        if self.fields.contains(key)
            || self.stats.contains_key(key)
            || self.helpers.contains_key(key)
        {
            return true;
        }

        match key {
            "abilities" => self.abilities.is_some(),
            "inventory" => self.inventory.is_some(),
            "position" => self.movement.is_some(),
            _ => false,
        }
    }

    /// Whether a stat is attached
    pub fn has_stat(&self, name: &str) -> bool {
        self.stats.contains_key(name)
    }

    /// Whether the named addon has been applied
    pub fn has_addon(&self, name: &str) -> bool {
        self.installed.contains(name)
    }

    /// Names of applied addons
    pub fn addons(&self) -> impl Iterator<Item = &str> {
        self.installed.iter().map(|s| s.as_str())
    }

    pub(crate) fn mark_installed(&mut self, addon: &str) {
        self.installed.insert(addon.to_string());
    }

    // ========================================================================
    // Stats
    // ========================================================================

    pub fn stat(&self, name: &str) -> Option<&Stat> {
        self.stats.get(name)
    }

    pub fn stat_mut(&mut self, name: &str) -> Option<&mut Stat> {
        self.stats.get_mut(name)
    }

    /// Current value of a stat
    pub fn stat_value(&self, name: &str) -> Option<f64> {
        self.stats.get(name).map(Stat::value)
    }

    /// Write a stat's current slot (clamped)
    pub fn set_stat(&mut self, name: &str, value: f64) -> Result<&mut Self, AddonError> {
        self.write_stat(name, value, Slot::Current)
    }

    /// Write a stat slot (clamped)
    pub fn write_stat(
        &mut self,
        name: &str,
        value: f64,
        slot: Slot,
    ) -> Result<&mut Self, AddonError> {
        self.stats
            .get_mut(name)
            .ok_or_else(|| AddonError::MissingAddon(name.to_string()))?
            .write(value, slot);
        Ok(self)
    }

    /// Copy a stat's temp slot into its current slot
    pub fn reset_stat(&mut self, name: &str) -> Result<&mut Self, AddonError> {
        self.stats
            .get_mut(name)
            .ok_or_else(|| AddonError::MissingAddon(name.to_string()))?
            .reset();
        Ok(self)
    }

    pub(crate) fn attach_stat(&mut self, name: &str, stat: Stat) {
        self.stats.insert(name.to_string(), stat);
    }

    pub(crate) fn attach_helper(&mut self, name: &str, helper: StatHelper) {
        self.helpers.insert(name.to_string(), helper);
    }

    /// Run a helper predicate attached by a stat addon
    pub fn check(&self, helper: &str) -> Option<bool> {
        self.helpers.get(helper).map(|predicate| predicate(self))
    }

    /// Whether health is at its minimum (false without the health addon)
    pub fn is_dead(&self) -> bool {
        self.check("is_dead").unwrap_or(false)
    }

    // ========================================================================
    // Addon state
    // ========================================================================

    pub fn abilities(&self) -> Option<&AbilityBook> {
        self.abilities.as_ref()
    }

    pub fn inventory(&self) -> Option<&Inventory> {
        self.inventory.as_ref()
    }

    pub fn inventory_mut(&mut self) -> Option<&mut Inventory> {
        self.inventory.as_mut()
    }

    /// Replace the inventory; only entities with the inventory addon have one
    pub fn set_inventory(&mut self, inventory: Inventory) -> Result<&mut Self, AddonError> {
        let slot = self
            .inventory
            .as_mut()
            .ok_or_else(|| AddonError::MissingAddon("inventory".to_string()))?;
        *slot = inventory;
        Ok(self)
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("fields", self.fields.values())
            .field("installed", &self.installed)
            .field("stats", &self.stats)
            .field("helpers", &self.helpers.keys().collect::<Vec<_>>())
            .field("abilities", &self.abilities)
            .field("inventory", &self.inventory)
            .field("movement", &self.movement)
            .finish()
    }
}
