//! Read-only catalog of interviewer characters and professions.
//!
//! The catalog is loaded once and passed by reference to whatever needs it.
//! A bundled default ships with the crate; deployments can point
//! `[catalog] path` at their own JSON file with the same shape.

use crate::error::{Error, Result};
use crate::types::Difficulty;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const BUNDLED_CATALOG: &str = include_str!("../data/catalog.json");

/// Shortest search query accepted by [`Catalog::search`].
pub const MIN_SEARCH_LEN: usize = 2;

/// An interviewer persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub difficulty: Difficulty,
    /// Display badge, e.g. "MOST POPULAR"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    /// Default recommendation when nothing better fits
    #[serde(default)]
    pub popular: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profession {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Profession {
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self
                .keywords
                .iter()
                .any(|k| k.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub professions: Vec<Profession>,
}

/// Category header without its professions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub id: String,
    pub name: String,
    pub icon: String,
}

impl From<&Category> for CategoryRef {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.clone(),
            name: category.name.clone(),
            icon: category.icon.clone(),
        }
    }
}

/// Category listing entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub order: u32,
    pub professions_count: usize,
}

/// A profession together with the category it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionMatch {
    pub profession: Profession,
    pub category: CategoryRef,
}

/// Immutable character and profession lookup tables.
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    characters: Vec<Character>,
    #[serde(default)]
    categories: Vec<Category>,
}

impl Catalog {
    /// The catalog shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_CATALOG)
    }

    /// Load from a JSON file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read catalog file {:?}: {}", path, e))
        })?;
        let catalog = Self::from_json(&content)?;
        tracing::info!(
            path = %path.display(),
            characters = catalog.characters.len(),
            categories = catalog.categories.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// Load the configured catalog file, falling back to the bundled one.
    pub fn load(config: &crate::config::CatalogConfig) -> Result<Self> {
        match &config.path {
            Some(path) => Self::load_from(path),
            None => Self::bundled(),
        }
    }

    /// Parse and validate catalog JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Build a catalog from in-memory parts.
    pub fn new(characters: Vec<Character>, categories: Vec<Category>) -> Result<Self> {
        let catalog = Self {
            characters,
            categories,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        if self.characters.is_empty() {
            return Err(Error::Config(
                "catalog must contain at least one character".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for character in &self.characters {
            if !seen.insert(character.id.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate character id in catalog: {}",
                    character.id
                )));
            }
        }

        let mut seen = HashSet::new();
        for profession in self.categories.iter().flat_map(|c| &c.professions) {
            if !seen.insert(profession.id.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate profession id in catalog: {}",
                    profession.id
                )));
            }
        }

        Ok(())
    }

    // ============================================
    // Characters
    // ============================================

    /// All characters in canonical (file) order.
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Characters at the given tier, in catalog order.
    pub fn by_difficulty(&self, tier: Difficulty) -> impl Iterator<Item = &Character> + '_ {
        self.characters.iter().filter(move |c| c.difficulty == tier)
    }

    /// The popular character, or the first entry when none is flagged.
    ///
    /// `None` only for an empty catalog, which validation already rules out
    /// for loaded catalogs.
    pub fn popular(&self) -> Option<&Character> {
        self.characters
            .iter()
            .find(|c| c.popular)
            .or_else(|| self.characters.first())
    }

    // ============================================
    // Professions
    // ============================================

    /// Category headers sorted by display order.
    pub fn categories(&self) -> Vec<CategorySummary> {
        let mut summaries: Vec<CategorySummary> = self
            .categories
            .iter()
            .map(|c| CategorySummary {
                id: c.id.clone(),
                name: c.name.clone(),
                icon: c.icon.clone(),
                order: c.order,
                professions_count: c.professions.len(),
            })
            .collect();
        summaries.sort_by_key(|s| s.order);
        summaries
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Professions of one category.
    pub fn professions_in(&self, category_id: &str) -> Result<&[Profession]> {
        self.category(category_id)
            .map(|c| c.professions.as_slice())
            .ok_or_else(|| Error::NotFound {
                entity: "category",
                id: category_id.to_string(),
            })
    }

    /// Look up a profession and its owning category.
    pub fn profession(&self, id: &str) -> Option<ProfessionMatch> {
        self.categories.iter().find_map(|category| {
            category
                .professions
                .iter()
                .find(|p| p.id == id)
                .map(|p| ProfessionMatch {
                    profession: p.clone(),
                    category: CategoryRef::from(category),
                })
        })
    }

    /// Case-insensitive search over profession names, descriptions and keywords.
    pub fn search(&self, query: &str) -> Result<Vec<ProfessionMatch>> {
        let needle = query.trim().to_lowercase();
        if needle.chars().count() < MIN_SEARCH_LEN {
            return Err(Error::validation(
                "query",
                format!("search needs at least {} characters", MIN_SEARCH_LEN),
            ));
        }

        let needle = needle.as_str();
        let results = self
            .categories
            .iter()
            .flat_map(|category| {
                category
                    .professions
                    .iter()
                    .filter(move |p| p.matches(needle))
                    .map(move |p| ProfessionMatch {
                        profession: p.clone(),
                        category: CategoryRef::from(category),
                    })
            })
            .collect();

        Ok(results)
    }
}
