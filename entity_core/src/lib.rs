//! entity_core - Runtime composition layer for game entities
//!
//! This library provides:
//! - Entity: a record of named fields that addons extend at runtime
//! - AddonRegistry: named installers (stats, abilities, inventory, movement)
//! - AbilityRegistry: shared ability definitions with tiered variants
//! - EventBus: deferred publish/subscribe used by the movement addon
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use entity_core::prelude::*;
//!
//! let mut registry = Registry::new();
//! registry.abilities.define(
//!     "fireball",
//!     AbilityOptions::new()
//!         .callback(|_caster, _target| None)
//!         .kind("spell")
//!         .uses("mana")
//!         .cost(20.0),
//! )?;
//!
//! let mut hero = Entity::new("hero");
//! hero.implement(&registry, "health", Options::new())?
//!     .implement(&registry, "mana", Options::new())?
//!     .implement(&registry, "ability", Options::new().with("name", "fireball"))?;
//!
//! match hero.use_ability("fireball", UseOptions::default()) {
//!     Ok(_) => println!("mana left: {}", hero.stat("mana").unwrap().value()),
//!     Err(failure) => println!("{}", failure.code()),
//! }
//! ```

pub mod ability;
pub mod accessor;
pub mod addon;
pub mod config;
pub mod entity;
pub mod events;
pub mod prelude;
pub mod types;
pub mod utils;

// Core API - what most users need
pub use ability::{Ability, AbilityOptions, AbilityRegistry, AbilityTier};
pub use addon::{AddonRegistry, Guard, InstallContext, Registry};
pub use entity::Entity;
pub use types::{Options, Slot, UseOptions};

// Addon state
pub use addon::inventory::{Inventory, Item};
pub use addon::stat::{Stat, StatDefaults};

// Events
pub use events::{EventBus, Publisher};

// Configuration
pub use config::{load_stat_definitions, parse_stat_definitions, ConfigError};

use serde_json::Value;
use thiserror::Error;

/// Caller contract violation while composing an entity
///
/// These are never recovered internally; they propagate to the caller as-is.
#[derive(Debug, Error)]
pub enum AddonError {
    #[error("Invalid object, not of entity type")]
    InvalidEntity { reference: Value },
    #[error("Addon you are trying to implement does not exist: '{0}'")]
    InvalidAddon(String),
    #[error("Missing addon options: {reference}")]
    InvalidOptions { reference: Value },
    #[error("Missing ability: '{0}'")]
    MissingAbility(String),
    #[error("Missing addon: '{0}'")]
    MissingAddon(String),
    #[error("Entity '{entity}' and ability '{ability}' are incompatible")]
    IncompatibleAbility { ability: String, entity: String },
    #[error("Ability '{ability}' has no tier '{tier}'")]
    MissingTier { ability: String, tier: String },
    #[error("No accessor defined for field '{0}'")]
    UnknownField(String),
    #[error("Field '{0}' is read-only")]
    ReadOnlyField(String),
    #[error(transparent)]
    Ability(#[from] AbilityError),
}

impl AddonError {
    /// Tag identifying the kind of misuse
    pub fn name(&self) -> &'static str {
        match self {
            AddonError::InvalidEntity { .. } => "InvalidEntity",
            AddonError::InvalidAddon(_) => "InvalidAddon",
            AddonError::InvalidOptions { .. } => "InvalidOptions",
            AddonError::MissingAbility(_) => "MissingAbility",
            AddonError::MissingAddon(_) => "MissingAddon",
            AddonError::IncompatibleAbility { .. } => "IncompatibleAbility",
            AddonError::MissingTier { .. } => "MissingTier",
            AddonError::UnknownField(_) => "UnknownField",
            AddonError::ReadOnlyField(_) => "ReadOnlyField",
            AddonError::Ability(e) => e.name(),
        }
    }

    /// The offending value
    pub fn reference(&self) -> Value {
        match self {
            AddonError::InvalidEntity { reference } | AddonError::InvalidOptions { reference } => {
                reference.clone()
            }
            AddonError::InvalidAddon(name)
            | AddonError::MissingAbility(name)
            | AddonError::MissingAddon(name)
            | AddonError::UnknownField(name)
            | AddonError::ReadOnlyField(name) => Value::from(name.as_str()),
            AddonError::IncompatibleAbility { ability, entity } => {
                Value::from(vec![ability.as_str(), entity.as_str()])
            }
            AddonError::MissingTier { ability, tier } => {
                Value::from(vec![ability.as_str(), tier.as_str()])
            }
            AddonError::Ability(e) => e.reference(),
        }
    }
}

/// Invalid ability or tier definition
#[derive(Debug, Error)]
pub enum AbilityError {
    #[error("Missing options / callback for '{0}'")]
    InvalidOptions(String),
    #[error("Missing type reference for '{0}'")]
    InvalidType(String),
    #[error("Missing use option for '{0}', need stat to draw from")]
    MissingUseType(String),
    #[error("Private tier cannot be fetched or overridden")]
    PrivateTier,
    #[error("Invalid tier name given: '{0}'")]
    InvalidAbilityTierName(String),
}

impl AbilityError {
    /// Tag identifying the kind of misuse
    pub fn name(&self) -> &'static str {
        match self {
            AbilityError::InvalidOptions(_) => "InvalidOptions",
            AbilityError::InvalidType(_) => "InvalidType",
            AbilityError::MissingUseType(_) => "MissingUseType",
            AbilityError::PrivateTier => "PrivateTier",
            AbilityError::InvalidAbilityTierName(_) => "InvalidAbilityTierName",
        }
    }

    /// The offending value
    pub fn reference(&self) -> Value {
        match self {
            AbilityError::InvalidOptions(name)
            | AbilityError::InvalidType(name)
            | AbilityError::MissingUseType(name)
            | AbilityError::InvalidAbilityTierName(name) => Value::from(name.as_str()),
            AbilityError::PrivateTier => Value::from("base"),
        }
    }
}

/// Expected outcome of a failed ability use
///
/// Ordinary gameplay results the caller branches on, not misuse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UseFailure {
    NoAbilities,
    MissingAbility,
    MissingTier,
    /// Not enough of the named stat to pay the cost
    Insufficient(String),
}

impl UseFailure {
    /// Result code, e.g. `INSUFFICIENT_MANA`
    pub fn code(&self) -> String {
        match self {
            UseFailure::NoAbilities => "NO_ABILITIES".to_string(),
            UseFailure::MissingAbility => "MISSING_ABILITY".to_string(),
            UseFailure::MissingTier => "MISSING_TIER".to_string(),
            UseFailure::Insufficient(stat) => format!("INSUFFICIENT_{}", stat.to_uppercase()),
        }
    }
}

impl std::fmt::Display for UseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
