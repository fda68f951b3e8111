//! Ability addon - binds registry abilities to an entity and resolves their use

use super::InstallContext;
use crate::ability::{Ability, AbilityTier};
use crate::entity::Entity;
use crate::types::{Options, Slot, UseOptions};
use crate::{AddonError, UseFailure};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// An ability learned by one entity
#[derive(Debug, Clone)]
pub struct LearnedAbility {
    pub base: AbilityTier,
    /// Variant tiers attached after the base was learned
    pub tiers: BTreeMap<String, AbilityTier>,
}

/// The abilities an entity has learned, by lowercase name
#[derive(Debug, Clone, Default)]
pub struct AbilityBook {
    entries: BTreeMap<String, LearnedAbility>,
}

impl AbilityBook {
    pub fn get(&self, name: &str) -> Option<&LearnedAbility> {
        self.entries.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }
}

/// Install (or extend with a tier) an ability on an entity
pub(crate) fn install(
    entity: &mut Entity,
    options: &Options,
    context: &InstallContext<'_>,
) -> Result<(), AddonError> {
    let options = options.lowercased();
    let name = options
        .get_str("name")
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AddonError::InvalidOptions {
            reference: options.to_value(),
        })?
        .to_string();
    let tier = options
        .get_str("tier")
        .filter(|tier| !tier.is_empty())
        .map(str::to_string);

    let known = entity
        .abilities
        .as_ref()
        .is_some_and(|book| book.contains(&name));
    if known && tier.is_none() {
        return Ok(());
    }

    let ability = context
        .abilities()
        .get(&name)
        .ok_or_else(|| AddonError::MissingAbility(name.clone()))?;
    let variant = match &tier {
        Some(tier) => Some(resolve_tier(ability, tier)?),
        None => None,
    };

    if !known {
        let base = ability.base();
        if !entity.has_stat(&base.stat) {
            return Err(AddonError::MissingAddon(base.stat.clone()));
        }
        if !base.conditions_met(entity) {
            return Err(AddonError::IncompatibleAbility {
                ability: name,
                entity: entity.name().to_string(),
            });
        }

        entity.abilities.get_or_insert_with(AbilityBook::default).entries.insert(
            name.clone(),
            LearnedAbility {
                base: base.clone(),
                tiers: BTreeMap::new(),
            },
        );
        debug!("'{}' learned ability '{}'", entity.name(), name);
    }

    if let (Some(tier), Some(variant)) = (tier, variant) {
        if let Some(learned) = entity
            .abilities
            .as_mut()
            .and_then(|book| book.entries.get_mut(&name))
        {
            learned.tiers.insert(tier.clone(), variant);
        }
        debug!("'{}' learned tier '{}' of '{}'", entity.name(), tier, name);
    }

    Ok(())
}

fn resolve_tier(ability: &Ability, tier: &str) -> Result<AbilityTier, AddonError> {
    ability
        .tier(tier)?
        .cloned()
        .ok_or_else(|| AddonError::MissingTier {
            ability: ability.name().to_string(),
            tier: tier.to_string(),
        })
}

impl Entity {
    /// Use a learned ability
    ///
    /// Pays the cost from the ability's stat, then runs its callback with this
    /// entity as caster. `Ok(None)` means the callback returned nothing.
    pub fn use_ability(
        &mut self,
        name: &str,
        options: UseOptions<'_>,
    ) -> Result<Option<Value>, UseFailure> {
        let book = match &self.abilities {
            Some(book) if !book.is_empty() => book,
            _ => return Err(UseFailure::NoAbilities),
        };
        let learned = book.get(name).ok_or(UseFailure::MissingAbility)?;
        let tier = match options.tier.as_deref().filter(|tier| !tier.is_empty()) {
            Some(tier) => learned
                .tiers
                .get(&tier.to_lowercase())
                .ok_or(UseFailure::MissingTier)?,
            None => &learned.base,
        }
        .clone();

        let available = self.stat_value(&tier.stat).unwrap_or(0.0);
        if tier.cost > available {
            return Err(UseFailure::Insufficient(tier.stat.clone()));
        }
        if let Some(stat) = self.stat_mut(&tier.stat) {
            stat.write(available - tier.cost, Slot::Current);
        }

        debug!(
            "'{}' used '{}' for {} {}",
            self.name(),
            tier.name,
            tier.cost,
            tier.stat
        );
        Ok(tier.invoke(self, options.target))
    }
}
