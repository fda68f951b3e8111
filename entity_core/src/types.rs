//! Core types shared by the addons

use crate::addon::inventory::{Item, ItemEffect};
use crate::entity::Entity;
use crate::utils;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::rc::Rc;

// ============================================================================
// Addon options
// ============================================================================

/// Options handed to an addon installer
///
/// Plain data lives in a JSON map; callables and starting items ride alongside
/// since they cannot be expressed as JSON.
#[derive(Clone, Default)]
pub struct Options {
    values: Map<String, Value>,
    effect: Option<ItemEffect>,
    starting: Option<Vec<Item>>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from a JSON object; anything else yields empty options
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(values) => Options {
                values,
                ..Default::default()
            },
            _ => Self::default(),
        }
    }

    /// Set a plain option
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Attach an item use effect
    pub fn with_effect<F>(mut self, effect: F) -> Self
    where
        F: Fn(&mut Entity, Option<&mut Entity>) -> bool + 'static,
    {
        self.effect = Some(Rc::new(effect));
        self
    }

    /// Seed an inventory with items
    pub fn with_starting(mut self, items: Vec<Item>) -> Self {
        self.starting = Some(items);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(Value::as_f64)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn effect(&self) -> Option<&ItemEffect> {
        self.effect.as_ref()
    }

    pub fn starting(&self) -> Option<&[Item]> {
        self.starting.as_deref()
    }

    /// Copy of these options with every string value lowercased
    pub fn lowercased(&self) -> Self {
        let mut copy = self.clone();
        utils::lowercase_map(&mut copy.values);
        copy
    }

    /// JSON view used for error references
    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("values", &self.values)
            .field("effect", &self.effect.is_some())
            .field("starting", &self.starting.as_ref().map(Vec::len))
            .finish()
    }
}

impl From<Value> for Options {
    fn from(value: Value) -> Self {
        Options::from_value(value)
    }
}

// ============================================================================
// Stat slots
// ============================================================================

/// Which of a stat's two value slots to read or write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// The effective value, spent by abilities
    #[default]
    Current,
    /// The working value, copied into `current` on reset
    Temp,
}

// ============================================================================
// Ability use
// ============================================================================

/// Options for [`Entity::use_ability`]
#[derive(Default)]
pub struct UseOptions<'a> {
    /// Variant tier to use instead of the base ability
    pub tier: Option<String>,
    /// Intended target, passed to the ability callback
    pub target: Option<&'a mut Entity>,
}

impl<'a> UseOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = Some(tier.into());
        self
    }

    pub fn target(mut self, target: &'a mut Entity) -> Self {
        self.target = Some(target);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_options_from_value() {
        let options = Options::from_value(json!({ "name": "Fireball", "tier": 2 }));
        assert_eq!(options.get_str("name"), Some("Fireball"));
        assert_eq!(options.get_f64("tier"), Some(2.0));

        let options = Options::from_value(json!("not an object"));
        assert!(options.values().is_empty());
    }

    #[test]
    fn test_options_lowercased() {
        let options = Options::new().with("name", "FireBall").with("cost", 3);
        let lowered = options.lowercased();
        assert_eq!(lowered.get_str("name"), Some("fireball"));
        assert_eq!(lowered.get_f64("cost"), Some(3.0));
        assert_eq!(options.get_str("name"), Some("FireBall"));
    }

    #[test]
    fn test_default_slot_is_current() {
        assert_eq!(Slot::default(), Slot::Current);
    }
}
