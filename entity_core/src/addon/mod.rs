//! Addon registry - named installers applied onto entities
//!
//! An addon is `{ guard, install }`. The guard decides whether the install
//! runs; the install mutates the entity in place. Installs can only be run by
//! the registry: they receive an [`InstallContext`] that nothing else can build.

pub mod ability;
pub mod inventory;
pub mod movement;
pub mod stat;

use crate::ability::AbilityRegistry;
use crate::entity::Entity;
use crate::types::Options;
use crate::AddonError;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Installer run when an addon is applied
pub type Install = Rc<dyn Fn(&mut Entity, &Options, &InstallContext<'_>) -> Result<(), AddonError>>;

/// Custom guard; returning `true` skips the install
pub type GuardPredicate = Rc<dyn Fn(&Entity, &Options) -> bool>;

/// Decides whether an addon install runs
#[derive(Clone)]
pub enum Guard {
    /// Always install
    None,
    /// Skip when the entity already has this field or capability
    Unless(String),
    /// Fail with `MissingAddon` when the entity lacks this field or capability
    Requires(String),
    /// Skip when the predicate returns `true`
    Custom(GuardPredicate),
}

impl Guard {
    pub fn unless(field: impl Into<String>) -> Self {
        Guard::Unless(field.into())
    }

    pub fn requires(field: impl Into<String>) -> Self {
        Guard::Requires(field.into())
    }

    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&Entity, &Options) -> bool + 'static,
    {
        Guard::Custom(Rc::new(predicate))
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::None => write!(f, "None"),
            Guard::Unless(field) => write!(f, "Unless({:?})", field),
            Guard::Requires(field) => write!(f, "Requires({:?})", field),
            Guard::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// Handed to installers by the registry
///
/// Has no public constructor, so an install can only run through
/// [`AddonRegistry::apply`].
pub struct InstallContext<'a> {
    addon: &'a str,
    abilities: &'a AbilityRegistry,
}

impl<'a> InstallContext<'a> {
    /// Name of the addon being installed
    pub fn addon(&self) -> &str {
        self.addon
    }

    /// Ability definitions to resolve against
    pub fn abilities(&self) -> &AbilityRegistry {
        self.abilities
    }
}

#[derive(Clone)]
struct AddonDefinition {
    guard: Guard,
    install: Install,
}

/// Registry of addons, resolved by name
#[derive(Default)]
pub struct AddonRegistry {
    addons: HashMap<String, AddonDefinition>,
}

impl AddonRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in addons
    ///
    /// Stats (health, mana, defense, attack, speed), movement, ability,
    /// inventory and item.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtins();
        registry
    }

    fn register_builtins(&mut self) {
        self.define_default_stats();
        self.insert("movement", Guard::unless("position"), Rc::new(movement::install));
        self.insert("ability", Guard::None, Rc::new(ability::install));
        self.insert("inventory", Guard::unless("inventory"), Rc::new(inventory::install));
        self.insert("item", Guard::requires("inventory"), Rc::new(inventory::install_item));
    }

    /// Register an addon, replacing any previous one with the same name
    pub fn register<F>(&mut self, name: &str, guard: Guard, install: F) -> Result<(), AddonError>
    where
        F: Fn(&mut Entity, &Options, &InstallContext<'_>) -> Result<(), AddonError> + 'static,
    {
        if name.is_empty() {
            return Err(AddonError::InvalidAddon(name.to_string()));
        }

        self.insert(name, guard, Rc::new(install));
        Ok(())
    }

    /// Store a definition under a name already known to be valid
    pub(crate) fn insert(&mut self, name: &str, guard: Guard, install: Install) {
        let definition = AddonDefinition { guard, install };
        if self.addons.insert(name.to_string(), definition).is_some() {
            debug!("Replaced addon '{}'", name);
        }
    }

    /// Apply an addon onto an entity
    pub fn apply<'e>(
        &self,
        name: &str,
        options: &Options,
        entity: &'e mut Entity,
        abilities: &AbilityRegistry,
    ) -> Result<&'e mut Entity, AddonError> {
        let addon = self
            .addons
            .get(name)
            .ok_or_else(|| AddonError::InvalidAddon(name.to_string()))?;

        match &addon.guard {
            Guard::Unless(field) if entity.has(field) => {
                debug!("Addon '{}' already on '{}', skipping", name, entity.name());
                return Ok(entity);
            }
            Guard::Requires(field) if !entity.has(field) => {
                return Err(AddonError::MissingAddon(field.clone()));
            }
            Guard::Custom(predicate) if predicate(&*entity, options) => {
                debug!("Addon '{}' guard declined for '{}'", name, entity.name());
                return Ok(entity);
            }
            _ => {}
        }

        let context = InstallContext {
            addon: name,
            abilities,
        };
        (addon.install)(&mut *entity, options, &context)?;
        entity.mark_installed(name);

        debug!("Applied addon '{}' to '{}'", name, entity.name());
        Ok(entity)
    }

    /// Check if an addon exists
    pub fn contains(&self, name: &str) -> bool {
        self.addons.contains_key(name)
    }

    /// List all addon names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.addons.keys().map(|s| s.as_str())
    }
}

impl fmt::Debug for AddonRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guards: HashMap<&str, &Guard> = self
            .addons
            .iter()
            .map(|(name, addon)| (name.as_str(), &addon.guard))
            .collect();
        f.debug_struct("AddonRegistry").field("addons", &guards).finish()
    }
}

/// Addon and ability registries that entities are composed against
///
/// Built once at startup and passed by reference to [`Entity::implement`].
#[derive(Debug)]
pub struct Registry {
    pub addons: AddonRegistry,
    pub abilities: AbilityRegistry,
}

impl Registry {
    /// Built-in addons and no abilities
    pub fn new() -> Self {
        Registry {
            addons: AddonRegistry::with_builtins(),
            abilities: AbilityRegistry::new(),
        }
    }

    /// No addons and no abilities
    pub fn empty() -> Self {
        Registry {
            addons: AddonRegistry::new(),
            abilities: AbilityRegistry::new(),
        }
    }

    /// Apply an addon onto an entity
    pub fn apply<'e>(
        &self,
        name: &str,
        options: &Options,
        entity: &'e mut Entity,
    ) -> Result<&'e mut Entity, AddonError> {
        self.addons.apply(name, options, entity, &self.abilities)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn test_unknown_addon() {
        let registry = Registry::empty();
        let mut entity = Entity::new("hero");
        let err = entity
            .implement(&registry, "flight", Options::new())
            .unwrap_err();
        assert_eq!(err.name(), "InvalidAddon");
        assert_eq!(err.reference(), json!("flight"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut registry = AddonRegistry::new();
        let result = registry.register("", Guard::None, |_, _, _| Ok(()));
        assert!(matches!(result, Err(AddonError::InvalidAddon(_))));
    }

    #[test]
    fn test_builtins_registered() {
        let registry = AddonRegistry::with_builtins();
        for name in [
            "health", "mana", "defense", "attack", "speed", "movement", "ability", "inventory",
            "item",
        ] {
            assert!(registry.contains(name), "missing builtin {}", name);
        }
    }

    #[test]
    fn test_unless_guard_is_idempotent() {
        let mut registry = Registry::empty();
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        registry
            .addons
            .register("title", Guard::unless("title"), move |entity, options, _| {
                counter.set(counter.get() + 1);
                let title = options.get_str("title").unwrap_or("nobody");
                entity.fields_mut().insert("title", json!(title));
                Ok(())
            })
            .unwrap();

        let mut entity = Entity::new("hero");
        entity
            .implement(&registry, "title", Options::new().with("title", "Sir"))
            .unwrap()
            .implement(&registry, "title", Options::new().with("title", "Lord"))
            .unwrap();

        assert_eq!(runs.get(), 1);
        assert_eq!(entity.get("title"), Some(json!("Sir")));
        assert!(entity.has_addon("title"));
    }

    #[test]
    fn test_requires_guard() {
        let registry = Registry::new();
        let mut entity = Entity::new("hero");
        let err = entity
            .implement(&registry, "item", Options::new().with("name", "potion"))
            .unwrap_err();
        assert!(matches!(err, AddonError::MissingAddon(ref f) if f == "inventory"));
    }

    #[test]
    fn test_custom_guard_replaces_default_check() {
        let mut registry = Registry::empty();
        registry
            .addons
            .register(
                "banner",
                Guard::custom(|_, options| options.get("skip").is_some()),
                |entity, _, context| {
                    entity.fields_mut().insert(context.addon(), json!(true));
                    Ok(())
                },
            )
            .unwrap();

        let mut skipped = Entity::new("a");
        skipped
            .implement(&registry, "banner", Options::new().with("skip", true))
            .unwrap();
        assert!(skipped.get("banner").is_none());

        let mut applied = Entity::new("b");
        applied.implement(&registry, "banner", Options::new()).unwrap();
        applied.implement(&registry, "banner", Options::new()).unwrap();
        assert_eq!(applied.get("banner"), Some(json!(true)));
    }

    #[test]
    fn test_reregistration_overwrites() {
        let mut registry = Registry::empty();
        registry
            .addons
            .register("mark", Guard::None, |entity, _, _| {
                entity.fields_mut().insert("mark", json!(1));
                Ok(())
            })
            .unwrap();
        registry
            .addons
            .register("mark", Guard::None, |entity, _, _| {
                entity.fields_mut().insert("mark", json!(2));
                Ok(())
            })
            .unwrap();

        let mut entity = Entity::new("hero");
        entity.implement(&registry, "mark", Options::new()).unwrap();
        assert_eq!(entity.get("mark"), Some(json!(2)));
    }

    #[test]
    fn test_guarded_reapply_keeps_stat() {
        let registry = Registry::new();
        let mut entity = Entity::new("hero");
        entity
            .implement(&registry, "health", Options::new().with("base", 40))
            .unwrap();
        let before = entity.stat("health").unwrap().clone();

        entity
            .implement(&registry, "health", Options::new().with("base", 90))
            .unwrap();
        assert_eq!(entity.stat("health").unwrap(), &before);
    }
}
