//! Character selection for a recommended tier.

use super::UsageMap;
use crate::catalog::{Catalog, Character};
use crate::types::Difficulty;

/// Why a character was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionReason {
    /// Not seen in the recent window
    Unused,
    /// Every tier character was seen; this one the fewest times
    LeastUsed { count: usize },
    /// The tier has no characters; popular default used instead
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection<'a> {
    pub character: &'a Character,
    pub reason: SelectionReason,
}

/// Pick the least-exposed character at `tier`.
///
/// Order of preference:
/// 1. first character at the tier (catalog order) with no recent usage
/// 2. the character with the strictly lowest usage, earliest on ties
/// 3. when the tier is empty, the catalog's popular character
///
/// Returns `None` only for an empty catalog.
pub fn select_character<'a>(
    catalog: &'a Catalog,
    tier: Difficulty,
    usage: &UsageMap,
) -> Option<Selection<'a>> {
    let mut least_used: Option<(&Character, usize)> = None;

    for character in catalog.by_difficulty(tier) {
        let count = usage.get(&character.id).copied().unwrap_or(0);
        if count == 0 {
            return Some(Selection {
                character,
                reason: SelectionReason::Unused,
            });
        }
        if least_used.map_or(true, |(_, best)| count < best) {
            least_used = Some((character, count));
        }
    }

    if let Some((character, count)) = least_used {
        return Some(Selection {
            character,
            reason: SelectionReason::LeastUsed { count },
        });
    }

    catalog.popular().map(|character| Selection {
        character,
        reason: SelectionReason::Fallback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn character(id: &str, difficulty: Difficulty, popular: bool) -> Character {
        Character {
            id: id.to_string(),
            name: id.to_string(),
            title: String::new(),
            description: String::new(),
            difficulty,
            badge: None,
            popular,
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(
            vec![
                character("joe", Difficulty::Easy, true),
                character("emma", Difficulty::Easy, false),
                character("mike", Difficulty::Medium, false),
                character("sarah", Difficulty::Medium, false),
                character("tom", Difficulty::Medium, false),
                character("david", Difficulty::Hard, false),
            ],
            vec![],
        )
        .unwrap()
    }

    fn usage(entries: &[(&str, usize)]) -> UsageMap {
        entries
            .iter()
            .map(|(id, count)| (id.to_string(), *count))
            .collect()
    }

    #[test]
    fn test_empty_usage_picks_first_at_tier() {
        let catalog = catalog();
        let selection = select_character(&catalog, Difficulty::Medium, &UsageMap::new()).unwrap();
        assert_eq!(selection.character.id, "mike");
        assert_eq!(selection.reason, SelectionReason::Unused);
    }

    #[test]
    fn test_prefers_unused_character() {
        let catalog = catalog();
        let selection = select_character(
            &catalog,
            Difficulty::Medium,
            &usage(&[("mike", 3), ("sarah", 1)]),
        )
        .unwrap();
        assert_eq!(selection.character.id, "tom");
        assert_eq!(selection.reason, SelectionReason::Unused);
    }

    #[test]
    fn test_least_used_when_all_seen() {
        let catalog = catalog();
        let selection = select_character(
            &catalog,
            Difficulty::Medium,
            &usage(&[("mike", 3), ("sarah", 1), ("tom", 2)]),
        )
        .unwrap();
        assert_eq!(selection.character.id, "sarah");
        assert_eq!(selection.reason, SelectionReason::LeastUsed { count: 1 });
    }

    #[test]
    fn test_least_used_ties_keep_catalog_order() {
        let catalog = catalog();
        let selection = select_character(
            &catalog,
            Difficulty::Medium,
            &usage(&[("mike", 4), ("sarah", 2), ("tom", 2)]),
        )
        .unwrap();
        assert_eq!(selection.character.id, "sarah");
    }

    #[test]
    fn test_empty_tier_falls_back_to_popular() {
        let catalog = catalog();
        let selection =
            select_character(&catalog, Difficulty::Extreme, &usage(&[("joe", 5)])).unwrap();
        assert_eq!(selection.character.id, "joe");
        assert_eq!(selection.reason, SelectionReason::Fallback);
    }

    #[test]
    fn test_fallback_without_popular_flag_uses_first_entry() {
        let catalog = Catalog::new(
            vec![
                character("mike", Difficulty::Medium, false),
                character("joe", Difficulty::Easy, false),
            ],
            vec![],
        )
        .unwrap();
        let selection = select_character(&catalog, Difficulty::Hard, &UsageMap::new()).unwrap();
        assert_eq!(selection.character.id, "mike");
    }

    #[test]
    fn test_result_always_from_catalog() {
        let catalog = catalog();
        let usage = usage(&[("joe", 1), ("emma", 1), ("mike", 2), ("david", 9)]);
        for tier in Difficulty::ALL {
            let selection = select_character(&catalog, tier, &usage).unwrap();
            assert!(catalog
                .characters()
                .iter()
                .any(|c| c == selection.character));
        }
    }
}
