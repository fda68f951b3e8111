//! Ability registry - shared ability definitions with tiered variants
//!
//! Every ability has one immutable `base` tier, created with the ability, and
//! any number of named variant tiers. Names are stored lowercase.

use crate::entity::Entity;
use crate::AbilityError;
use serde_json::Value;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Effect run when an ability is used: `(caster, target) -> result`
pub type AbilityCallback = Rc<dyn Fn(&mut Entity, Option<&mut Entity>) -> Option<Value>>;

/// Compatibility check run when an ability is installed on an entity
pub type Conditions = Rc<dyn Fn(&Entity) -> bool>;

/// Name reserved for the immutable tier
pub const BASE_TIER: &str = "base";

/// One variant of an ability
#[derive(Clone)]
pub struct AbilityTier {
    pub name: String,
    /// Amount drawn from `stat` per use
    pub cost: f64,
    /// Free-form category, e.g. "spell"
    pub kind: String,
    /// Stat the cost is drawn from
    pub stat: String,
    callback: AbilityCallback,
    conditions: Conditions,
}

impl AbilityTier {
    /// Whether the entity may learn this tier
    pub fn conditions_met(&self, entity: &Entity) -> bool {
        (self.conditions)(entity)
    }

    /// Run the effect
    pub fn invoke(&self, caster: &mut Entity, target: Option<&mut Entity>) -> Option<Value> {
        (self.callback)(caster, target)
    }
}

impl fmt::Debug for AbilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbilityTier")
            .field("name", &self.name)
            .field("cost", &self.cost)
            .field("kind", &self.kind)
            .field("stat", &self.stat)
            .finish_non_exhaustive()
    }
}

/// Builder for an ability or tier definition
#[derive(Clone, Default)]
pub struct AbilityOptions {
    callback: Option<AbilityCallback>,
    kind: Option<String>,
    uses: Option<String>,
    cost: Option<f64>,
    conditions: Option<Conditions>,
    tiers: Vec<(String, AbilityOptions)>,
}

impl AbilityOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Entity, Option<&mut Entity>) -> Option<Value> + 'static,
    {
        self.callback = Some(Rc::new(callback));
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Stat to draw the cost from
    pub fn uses(mut self, stat: impl Into<String>) -> Self {
        self.uses = Some(stat.into());
        self
    }

    pub fn cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn conditions<F>(mut self, conditions: F) -> Self
    where
        F: Fn(&Entity) -> bool + 'static,
    {
        self.conditions = Some(Rc::new(conditions));
        self
    }

    /// Variant tier created along with the ability
    pub fn tier(mut self, name: impl Into<String>, options: AbilityOptions) -> Self {
        self.tiers.push((name.into(), options));
        self
    }

    /// Validate and build a tier; required fields are checked in a fixed order
    fn build(&self, name: &str) -> Result<AbilityTier, AbilityError> {
        let callback = self
            .callback
            .clone()
            .ok_or_else(|| AbilityError::InvalidOptions(name.to_string()))?;
        let kind = non_empty(&self.kind).ok_or_else(|| AbilityError::InvalidType(name.to_string()))?;
        let stat =
            non_empty(&self.uses).ok_or_else(|| AbilityError::MissingUseType(name.to_string()))?;

        Ok(AbilityTier {
            name: name.to_string(),
            cost: self.cost.unwrap_or(0.0),
            kind,
            stat,
            callback,
            conditions: self.conditions.clone().unwrap_or_else(always_compatible),
        })
    }
}

fn always_compatible() -> Conditions {
    Rc::new(|_: &Entity| true)
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

/// Normalize a tier name, rejecting the private base tier
fn tier_key(name: &str) -> Result<String, AbilityError> {
    let key = name.to_lowercase();
    if key == BASE_TIER {
        return Err(AbilityError::PrivateTier);
    }
    if key.is_empty() {
        return Err(AbilityError::InvalidAbilityTierName(name.to_string()));
    }
    Ok(key)
}

/// A registered ability
#[derive(Debug, Clone)]
pub struct Ability {
    name: String,
    base: AbilityTier,
    tiers: BTreeMap<String, AbilityTier>,
}

impl Ability {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The immutable tier created with the ability
    pub fn base(&self) -> &AbilityTier {
        &self.base
    }

    /// Fetch a variant tier
    pub fn tier(&self, name: &str) -> Result<Option<&AbilityTier>, AbilityError> {
        let key = tier_key(name)?;
        Ok(self.tiers.get(&key))
    }

    /// Create or overwrite a variant tier
    pub fn set_tier(
        &mut self,
        name: &str,
        options: AbilityOptions,
    ) -> Result<&mut Self, AbilityError> {
        let key = tier_key(name)?;
        let tier = options.build(&key)?;
        self.tiers.insert(key, tier);
        Ok(self)
    }

    /// Names of the variant tiers
    pub fn tier_names(&self) -> impl Iterator<Item = &str> {
        self.tiers.keys().map(|s| s.as_str())
    }
}

/// Registry of abilities shared by every entity resolved against it
#[derive(Default)]
pub struct AbilityRegistry {
    abilities: HashMap<String, Ability>,
}

impl AbilityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an ability, replacing any previous one with the same name
    pub fn define(
        &mut self,
        name: &str,
        options: AbilityOptions,
    ) -> Result<&mut Ability, AbilityError> {
        let key = name.to_lowercase();
        let mut ability = Ability {
            name: key.clone(),
            base: options.build(&key)?,
            tiers: BTreeMap::new(),
        };

        for (tier_name, tier_options) in &options.tiers {
            if tier_name.eq_ignore_ascii_case(BASE_TIER) {
                continue;
            }
            ability.set_tier(tier_name, tier_options.clone())?;
        }

        debug!(
            "Defined ability '{}' (cost {} {}, {} tiers)",
            key,
            ability.base.cost,
            ability.base.stat,
            ability.tiers.len()
        );

        match self.abilities.entry(key) {
            Entry::Occupied(mut slot) => {
                debug!("Replacing ability '{}'", slot.key());
                slot.insert(ability);
                Ok(slot.into_mut())
            }
            Entry::Vacant(slot) => Ok(slot.insert(ability)),
        }
    }

    /// Get an ability by name
    pub fn get(&self, name: &str) -> Option<&Ability> {
        self.abilities.get(&name.to_lowercase())
    }

    /// Get an ability for tier edits
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Ability> {
        self.abilities.get_mut(&name.to_lowercase())
    }

    /// Check if an ability exists
    pub fn contains(&self, name: &str) -> bool {
        self.abilities.contains_key(&name.to_lowercase())
    }

    /// List all ability names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.abilities.keys().map(|s| s.as_str())
    }
}

impl fmt::Debug for AbilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbilityRegistry")
            .field("abilities", &self.abilities.keys().collect::<Vec<_>>())
            .finish()
    }
}
