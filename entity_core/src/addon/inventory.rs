//! Inventory and item addons - stackable items matched by lowercase name

use super::InstallContext;
use crate::entity::Entity;
use crate::types::Options;
use crate::AddonError;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Effect run when an item is used: `(holder, target) -> consumed`
///
/// Returning exactly `true` consumes one from the stack.
pub type ItemEffect = Rc<dyn Fn(&mut Entity, Option<&mut Entity>) -> bool>;

fn no_effect() -> ItemEffect {
    Rc::new(|_: &mut Entity, _: Option<&mut Entity>| false)
}

/// A stack of items
#[derive(Clone)]
pub struct Item {
    /// Lowercase key
    pub name: String,
    /// Name as given
    pub real_name: String,
    pub cost: f64,
    /// Always at least 1
    pub count: u32,
    effect: ItemEffect,
}

impl Item {
    /// A single item with no cost and no effect
    pub fn new(name: &str) -> Self {
        Item {
            name: name.to_lowercase(),
            real_name: name.to_string(),
            cost: 0.0,
            count: 1,
            effect: no_effect(),
        }
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count.max(1);
        self
    }

    pub fn with_effect<F>(mut self, effect: F) -> Self
    where
        F: Fn(&mut Entity, Option<&mut Entity>) -> bool + 'static,
    {
        self.effect = Rc::new(effect);
        self
    }

    /// Build an item from item addon options
    fn from_options(name: &str, options: &Options) -> Self {
        Item {
            name: name.to_lowercase(),
            real_name: name.to_string(),
            cost: options.get_f64("cost").unwrap_or(0.0),
            count: amount(options),
            effect: options.effect().cloned().unwrap_or_else(no_effect),
        }
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("name", &self.name)
            .field("real_name", &self.real_name)
            .field("cost", &self.cost)
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}

/// `amount` option, at least 1
fn amount(options: &Options) -> u32 {
    options
        .get_f64("amount")
        .filter(|amount| *amount >= 1.0)
        .map(|amount| amount as u32)
        .unwrap_or(1)
}

/// An entity's items, at most one stack per lowercase name
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    items: Vec<Item>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list, merging stacks that share a name
    pub fn from_items(items: Vec<Item>) -> Self {
        let mut inventory = Self::new();
        for item in items {
            inventory.push(item);
        }
        inventory
    }

    /// Index of the stack named `name`
    pub fn has(&self, name: &str) -> Option<usize> {
        let key = name.to_lowercase();
        self.items.iter().position(|item| item.name == key)
    }

    pub fn get(&self, name: &str) -> Option<&Item> {
        self.has(name).map(|index| &self.items[index])
    }

    /// Stack size for `name`
    pub fn count(&self, name: &str) -> Option<u32> {
        self.get(name).map(|item| item.count)
    }

    /// Number of stacks
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Grow an existing stack, saturating at `u32::MAX`; unknown names are ignored
    pub fn add(&mut self, name: &str, amount: u32) -> &mut Self {
        if let Some(index) = self.has(name) {
            let stack = &mut self.items[index];
            stack.count = stack.count.saturating_add(amount.max(1));
        }
        self
    }

    /// Shrink a stack, dropping it once `amount` covers the whole count
    ///
    /// `None` (or zero) drops the stack outright.
    pub fn remove(&mut self, name: &str, amount: Option<u32>) -> &mut Self {
        if let Some(index) = self.has(name) {
            match amount.filter(|amount| *amount > 0) {
                Some(amount) if self.items[index].count > amount => {
                    self.items[index].count -= amount;
                }
                _ => {
                    self.items.remove(index);
                }
            }
        }
        self
    }

    /// Add an item, stacking onto an existing entry with the same name
    pub fn push(&mut self, item: Item) -> &mut Self {
        match self.has(&item.name) {
            Some(index) => {
                let stack = &mut self.items[index];
                stack.count = stack.count.saturating_add(item.count);
            }
            None => self.items.push(item),
        }
        self
    }
}

impl Entity {
    /// Use an item from the inventory on an optional target
    ///
    /// Returns `true` when the item's effect reported success, in which case
    /// one is consumed from the stack.
    pub fn use_item(&mut self, name: &str, target: Option<&mut Entity>) -> bool {
        let Some(effect) = self
            .inventory
            .as_ref()
            .and_then(|inventory| inventory.get(name))
            .map(|item| item.effect.clone())
        else {
            return false;
        };

        if !effect(&mut *self, target) {
            return false;
        }

        if let Some(inventory) = self.inventory.as_mut() {
            inventory.remove(name, Some(1));
        }
        debug!("'{}' used item '{}'", self.name(), name);
        true
    }
}

/// Install an inventory, seeded from `starting` items
pub(crate) fn install(
    entity: &mut Entity,
    options: &Options,
    _context: &InstallContext<'_>,
) -> Result<(), AddonError> {
    let starting = options.starting().map(<[Item]>::to_vec).unwrap_or_default();
    entity.inventory = Some(Inventory::from_items(starting));
    Ok(())
}

/// Add an item to an existing inventory
pub(crate) fn install_item(
    entity: &mut Entity,
    options: &Options,
    _context: &InstallContext<'_>,
) -> Result<(), AddonError> {
    let name = options
        .get_str("name")
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AddonError::InvalidOptions {
            reference: options.to_value(),
        })?;
    let inventory = entity
        .inventory
        .as_mut()
        .ok_or_else(|| AddonError::MissingAddon("inventory".to_string()))?;

    if inventory.has(name).is_some() {
        inventory.add(name, amount(options));
    } else {
        inventory.push(Item::from_options(name, options));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addon::Registry;

    fn holder(registry: &Registry) -> Entity {
        let mut entity = Entity::new("hero");
        entity
            .implement(registry, "health", Options::new().with("base", 50))
            .unwrap()
            .implement(registry, "inventory", Options::new())
            .unwrap();
        entity
    }

    #[test]
    fn test_repeated_item_stacks() {
        let registry = Registry::new();
        let mut entity = holder(&registry);
        let potion = Options::new().with("name", "Potion").with("amount", 1);

        entity
            .implement(&registry, "item", potion.clone())
            .unwrap()
            .implement(&registry, "item", potion)
            .unwrap();

        let inventory = entity.inventory().unwrap();
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory.count("potion"), Some(2));
        assert_eq!(inventory.get("POTION").unwrap().real_name, "Potion");
    }

    #[test]
    fn test_item_defaults() {
        let registry = Registry::new();
        let mut entity = holder(&registry);
        entity
            .implement(&registry, "item", Options::new().with("name", "Rope"))
            .unwrap();

        let rope = entity.inventory().unwrap().get("rope").unwrap();
        assert_eq!(rope.count, 1);
        assert_eq!(rope.cost, 0.0);
        assert!(!entity.use_item("rope", None));
        assert_eq!(entity.inventory().unwrap().count("rope"), Some(1));
    }

    #[test]
    fn test_item_requires_name() {
        let registry = Registry::new();
        let mut entity = holder(&registry);
        let err = entity
            .implement(&registry, "item", Options::new().with("amount", 2))
            .unwrap_err();
        assert_eq!(err.name(), "InvalidOptions");
    }

    #[test]
    fn test_remove() {
        let mut inventory = Inventory::from_items(vec![
            Item::new("potion"),
            Item::new("arrow").with_count(3),
        ]);

        inventory.remove("Potion", Some(1));
        assert!(inventory.has("potion").is_none());

        inventory.remove("arrow", Some(1));
        assert_eq!(inventory.count("arrow"), Some(2));

        inventory.remove("arrow", Some(5));
        assert!(inventory.is_empty());
    }

    #[test]
    fn test_remove_without_amount_drops_stack() {
        let mut inventory = Inventory::from_items(vec![Item::new("arrow").with_count(20)]);
        inventory.remove("arrow", None);
        assert!(inventory.is_empty());
    }

    #[test]
    fn test_add_ignores_unknown() {
        let mut inventory = Inventory::from_items(vec![Item::new("arrow")]);
        inventory.add("arrow", 4).add("bolt", 4);
        assert_eq!(inventory.count("arrow"), Some(5));
        assert_eq!(inventory.count("bolt"), None);
        assert_eq!(inventory.len(), 1);
    }

    #[test]
    fn test_starting_items_merge() {
        let registry = Registry::new();
        let mut entity = Entity::new("merchant");
        entity
            .implement(
                &registry,
                "inventory",
                Options::new().with_starting(vec![
                    Item::new("Gem"),
                    Item::new("gem").with_count(2),
                    Item::new("lamp").with_cost(12.0),
                ]),
            )
            .unwrap();

        let inventory = entity.inventory().unwrap();
        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory.count("gem"), Some(3));
        assert_eq!(inventory.get("lamp").unwrap().cost, 12.0);
    }

    #[test]
    fn test_inventory_install_is_guarded() {
        let registry = Registry::new();
        let mut entity = holder(&registry);
        entity
            .implement(&registry, "item", Options::new().with("name", "coin"))
            .unwrap()
            .implement(&registry, "inventory", Options::new())
            .unwrap();
        assert_eq!(entity.inventory().unwrap().count("coin"), Some(1));
    }

    #[test]
    fn test_use_consumes_on_success() {
        let registry = Registry::new();
        let mut entity = holder(&registry);
        let potion = Options::new()
            .with("name", "potion")
            .with("amount", 2)
            .with_effect(|holder, _| {
                let health = holder.stat_value("health").unwrap_or(0.0);
                holder.set_stat("health", health + 25.0).is_ok()
            });
        entity.implement(&registry, "item", potion).unwrap();

        assert!(entity.use_item("Potion", None));
        assert_eq!(entity.stat_value("health"), Some(75.0));
        assert_eq!(entity.inventory().unwrap().count("potion"), Some(1));

        assert!(entity.use_item("potion", None));
        assert_eq!(entity.stat_value("health"), Some(100.0));
        assert!(entity.inventory().unwrap().has("potion").is_none());

        assert!(!entity.use_item("potion", None));
    }

    #[test]
    fn test_huge_stacks_saturate() {
        let registry = Registry::new();
        let mut entity = holder(&registry);
        let coins = Options::new().with("name", "coin").with("amount", 3_000_000_000u64);

        entity
            .implement(&registry, "item", coins.clone())
            .unwrap()
            .implement(&registry, "item", coins)
            .unwrap();
        assert_eq!(entity.inventory().unwrap().count("coin"), Some(u32::MAX));

        let inventory = entity.inventory_mut().unwrap();
        inventory.push(Item::new("coin").with_count(u32::MAX));
        assert_eq!(inventory.count("coin"), Some(u32::MAX));
        assert_eq!(inventory.len(), 1);
    }

    #[test]
    fn test_use_without_inventory() {
        let registry = Registry::new();
        let mut entity = Entity::new("beggar");
        entity
            .implement(&registry, "health", Options::new())
            .unwrap();
        assert!(entity.inventory().is_none());
        assert!(!entity.use_item("potion", None));
    }

    #[test]
    fn test_use_on_target() {
        let registry = Registry::new();
        let mut entity = holder(&registry);
        let mut ally = Entity::new("ally");
        ally.implement(&registry, "health", Options::new().with("base", 10))
            .unwrap();

        entity
            .implement(
                &registry,
                "item",
                Options::new()
                    .with("name", "bandage")
                    .with_effect(|_, target| match target {
                        Some(target) => target.set_stat("health", 60.0).is_ok(),
                        None => false,
                    }),
            )
            .unwrap();

        assert!(!entity.use_item("bandage", None));
        assert_eq!(entity.inventory().unwrap().count("bandage"), Some(1));

        assert!(entity.use_item("bandage", Some(&mut ally)));
        assert_eq!(ally.stat_value("health"), Some(60.0));
        assert!(entity.inventory().unwrap().is_empty());
    }
}
