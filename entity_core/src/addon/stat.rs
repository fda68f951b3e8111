//! Stat addons - clamped resources with `current` and `temp` slots

use super::{AddonRegistry, Guard, Install, InstallContext};
use crate::entity::Entity;
use crate::types::{Options, Slot};
use crate::AddonError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::rc::Rc;

/// Predicate attached to an entity alongside a stat, e.g. `is_dead`
pub type StatHelper = Rc<dyn Fn(&Entity) -> bool>;

/// Option keys that configure the stat itself rather than landing in `extra`
const RESERVED_KEYS: [&str; 4] = ["base", "min", "max", "acronym"];

/// Fallback values used when install options leave a bound unset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatDefaults {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub base: Option<f64>,
    #[serde(default)]
    pub acronym: Option<String>,
}

impl StatDefaults {
    pub fn new(min: f64, max: f64, acronym: &str) -> Self {
        StatDefaults {
            min: Some(min),
            max: Some(max),
            base: None,
            acronym: Some(acronym.to_string()),
        }
    }
}

/// A named stat definition, as loaded from config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatDefinition {
    pub name: String,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub base: Option<f64>,
    #[serde(default)]
    pub acronym: Option<String>,
}

impl StatDefinition {
    pub fn defaults(&self) -> StatDefaults {
        StatDefaults {
            min: self.min,
            max: self.max,
            base: self.base,
            acronym: self.acronym.clone(),
        }
    }
}

/// A clamped numeric resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub base: f64,
    pub min: f64,
    pub max: f64,
    pub acronym: String,
    current: f64,
    temp: f64,
    /// Caller-supplied install options that are not bounds
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl Stat {
    /// Resolve a stat from install options, falling back to the defaults
    pub fn new(name: &str, options: &Options, defaults: &StatDefaults) -> Self {
        let base = options
            .get_f64("base")
            .or_else(|| options.get_f64("max"))
            .or(defaults.base)
            .or(defaults.max)
            .unwrap_or(100.0);
        let min = options.get_f64("min").or(defaults.min).unwrap_or(0.0);
        let max = options.get_f64("max").or(defaults.max).unwrap_or(base);
        let acronym = options
            .get_str("acronym")
            .map(str::to_string)
            .or_else(|| defaults.acronym.clone())
            .unwrap_or_else(|| name.to_string());

        let extra = options
            .values()
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Stat {
            base,
            min,
            max,
            acronym,
            current: base,
            temp: base,
            extra,
        }
    }

    /// The current value
    pub fn value(&self) -> f64 {
        self.current
    }

    pub fn read(&self, slot: Slot) -> f64 {
        match slot {
            Slot::Current => self.current,
            Slot::Temp => self.temp,
        }
    }

    /// Clamp to `[min, max]`
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    /// Write a slot, returning the stored (clamped) value
    pub fn write(&mut self, value: f64, slot: Slot) -> f64 {
        let value = self.clamp(value);
        match slot {
            Slot::Current => self.current = value,
            Slot::Temp => self.temp = value,
        }
        value
    }

    /// Write the current slot
    pub fn set(&mut self, value: f64) -> f64 {
        self.write(value, Slot::Current)
    }

    /// Copy the temp slot into the current slot
    pub fn reset(&mut self) {
        self.current = self.temp;
    }
}

/// Built-in stats with their bounds
pub fn default_stat_definitions() -> Vec<StatDefinition> {
    [
        ("health", 100.0, "hp"),
        ("mana", 100.0, "mp"),
        ("defense", 255.0, "def"),
        ("attack", 255.0, "atk"),
        ("speed", 255.0, "spd"),
    ]
    .into_iter()
    .map(|(name, max, acronym)| StatDefinition {
        name: name.to_string(),
        min: Some(0.0),
        max: Some(max),
        base: None,
        acronym: Some(acronym.to_string()),
    })
    .collect()
}

/// `is_dead` helper bound to the health stat
pub fn is_dead_helper() -> StatHelper {
    Rc::new(|entity: &Entity| {
        entity
            .stat("health")
            .is_some_and(|health| health.value() <= health.min)
    })
}

/// Installer attaching a stat and its helpers
fn stat_install(name: &str, defaults: StatDefaults, helpers: Vec<(String, StatHelper)>) -> Install {
    let stat_name = name.to_string();
    Rc::new(
        move |entity: &mut Entity,
              options: &Options,
              _ctx: &InstallContext<'_>|
              -> Result<(), AddonError> {
            entity.attach_stat(&stat_name, Stat::new(&stat_name, options, &defaults));
            for (helper, predicate) in &helpers {
                entity.attach_helper(helper, predicate.clone());
            }
            Ok(())
        },
    )
}

impl AddonRegistry {
    /// Register a stat addon guarded by the stat's own name
    pub fn define_stat(
        &mut self,
        name: &str,
        defaults: StatDefaults,
        helpers: Vec<(String, StatHelper)>,
    ) -> Result<(), AddonError> {
        if name.is_empty() {
            return Err(AddonError::InvalidAddon(name.to_string()));
        }
        self.insert(name, Guard::unless(name), stat_install(name, defaults, helpers));
        Ok(())
    }

    /// Register stat addons from config definitions
    pub fn define_stats(&mut self, definitions: &[StatDefinition]) -> Result<(), AddonError> {
        for definition in definitions {
            self.define_stat(&definition.name, definition.defaults(), Vec::new())?;
        }
        Ok(())
    }

    /// Register the built-in stats (health with `is_dead`, mana, defense, attack, speed)
    pub(crate) fn define_default_stats(&mut self) {
        for definition in default_stat_definitions() {
            let helpers = if definition.name == "health" {
                vec![("is_dead".to_string(), is_dead_helper())]
            } else {
                Vec::new()
            };
            let install = stat_install(&definition.name, definition.defaults(), helpers);
            self.insert(&definition.name, Guard::unless(definition.name.as_str()), install);
        }
    }
}
