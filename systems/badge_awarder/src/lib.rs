#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system resolving the badge earned for a completed pattern.

use dark_spiral_catalog::{Catalog, DEFAULT_BADGE};
use dark_spiral_core::{choose, Badge, PatternId, RandomSource};

/// Awards the badge mapped to `pattern`, or a random catalog badge otherwise.
///
/// A mapping that names a badge missing from the catalog resolves to
/// [`DEFAULT_BADGE`]. Returns `None` only when the catalog holds no badges
/// and the pattern has no mapping. The random draw is taken only for
/// unmapped patterns.
pub fn award_for_completion<'a, R>(
    pattern: PatternId,
    catalog: &'a Catalog,
    rng: &mut R,
) -> Option<&'a Badge>
where
    R: RandomSource + ?Sized,
{
    if let Some(badge_id) = catalog.completion_badge(pattern) {
        return match catalog.badge(badge_id) {
            Some(badge) => Some(badge),
            None => {
                log::warn!("badge `{badge_id}` mapped to `{pattern}` is missing; using default");
                Some(&DEFAULT_BADGE)
            }
        };
    }

    choose(rng, catalog.badges())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dark_spiral_catalog::CatalogParts;
    use dark_spiral_core::{BadgeId, ScriptedRandom};

    fn catalog_without_badges() -> Catalog {
        let standard = Catalog::standard();
        Catalog::new(CatalogParts {
            patterns: standard.patterns().to_vec(),
            badges: Vec::new(),
            hidden_scenes: standard.hidden_scenes().to_vec(),
            ux_laws: standard.ux_laws().to_vec(),
            error_overrides: standard.error_overrides().to_vec(),
            completion_badges: Vec::new(),
            narration: *standard.narration(),
        })
        .expect("valid catalog")
    }

    #[test]
    fn mapped_patterns_receive_their_badge_without_drawing() {
        let catalog = Catalog::standard();
        let mut rng = ScriptedRandom::constant(0.5);

        let badge = award_for_completion(PatternId::new("glitched_inputs"), &catalog, &mut rng);

        assert_eq!(badge.map(|badge| badge.id), Some(BadgeId::new("keyboard_whisperer")));
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn unmapped_patterns_draw_from_full_catalog() {
        let catalog = Catalog::standard();
        let last = catalog.badges().len() - 1;
        let mut rng = ScriptedRandom::new(vec![0.0, 0.999]);

        let first = award_for_completion(PatternId::new("nagging_modal"), &catalog, &mut rng);
        let second = award_for_completion(PatternId::new("nagging_modal"), &catalog, &mut rng);

        assert_eq!(first, catalog.badges().first());
        assert_eq!(second, catalog.badges().get(last));
    }

    #[test]
    fn unknown_patterns_still_earn_a_badge() {
        let catalog = Catalog::standard();
        let mut rng = ScriptedRandom::constant(0.3);
        assert!(award_for_completion(PatternId::new("not_in_catalog"), &catalog, &mut rng).is_some());
    }

    #[test]
    fn empty_badge_catalog_awards_nothing() {
        let catalog = catalog_without_badges();
        let mut rng = ScriptedRandom::constant(0.3);
        assert!(award_for_completion(PatternId::new("nagging_modal"), &catalog, &mut rng).is_none());
    }
}
