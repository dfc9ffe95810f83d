//! The fixed creature catalog
//!
//! Loaded once from TOML (the built-in file ships inside the binary) and
//! never mutated afterwards.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use super::Creature;
use crate::core::error::{CharmError, Result};
use crate::core::types::CreatureId;

const BUILTIN_CATALOG: &str = include_str!("../../data/creatures.toml");

/// Ordered, id-indexed list of creatures
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    creatures: Vec<Creature>,
}

/// TOML representation of a catalog file
#[derive(Debug, Deserialize)]
struct TomlCatalog {
    creatures: Vec<Creature>,
}

impl Catalog {
    /// The catalog shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::parse_toml(BUILTIN_CATALOG)
    }

    /// Load a catalog from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
            .map_err(|e| CharmError::Catalog(format!("{}: {}", path.display(), e)))
    }

    /// Parse a catalog from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let data: TomlCatalog =
            toml::from_str(content).map_err(|e| CharmError::Catalog(e.to_string()))?;
        Self::from_creatures(data.creatures)
    }

    /// Build a catalog, rejecting duplicate ids and out-of-range probabilities
    pub fn from_creatures(creatures: Vec<Creature>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut errors = Vec::new();

        for creature in &creatures {
            if !seen.insert(creature.id) {
                errors.push(format!("duplicate id {}", creature.id));
            }
            if !(0.0..=1.0).contains(&creature.probability) {
                errors.push(format!(
                    "{} ({}) has probability {} outside [0, 1]",
                    creature.name, creature.id, creature.probability
                ));
            }
        }

        if !errors.is_empty() {
            return Err(CharmError::Catalog(errors.join(", ")));
        }

        Ok(Self { creatures })
    }

    pub fn get(&self, id: CreatureId) -> Option<&Creature> {
        self.creatures.iter().find(|c| c.id == id)
    }

    pub fn all(&self) -> &[Creature] {
        &self.creatures
    }

    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    /// Creatures whose id is in `caught`, in catalog order
    pub fn caught<'a, 'b>(
        &'a self,
        caught: &'b [CreatureId],
    ) -> impl Iterator<Item = &'a Creature> + 'b
    where
        'a: 'b,
    {
        self.creatures.iter().filter(move |c| caught.contains(&c.id))
    }

    /// Creatures whose id is not in `caught`, in catalog order
    ///
    /// The yielded references borrow only the catalog, so they outlive the
    /// borrow of `caught`.
    pub fn uncaught<'a, 'b>(
        &'a self,
        caught: &'b [CreatureId],
    ) -> impl Iterator<Item = &'a Creature> + 'b
    where
        'a: 'b,
    {
        self.creatures.iter().filter(move |c| !caught.contains(&c.id))
    }
}
