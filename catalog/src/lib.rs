#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Immutable content catalog for the Dark Spiral engine.
//!
//! The catalog bundles every pattern, badge, hidden scene, usability law,
//! fake error page, and narration script the engine draws from. It never
//! changes once constructed; systems borrow it on every invocation.

use std::collections::HashSet;

use dark_spiral_core::{
    Alignment, Badge, BadgeId, ErrorOverride, HiddenScene, Pattern, PatternId, SceneId, UxLaw,
};
use thiserror::Error;

mod standard;

/// Challenge presented when no catalog pattern can be resolved.
pub const PLACEHOLDER_PATTERN: Pattern = Pattern {
    id: PatternId::new("placeholder"),
    title: "Please Wait",
    description: "Something is loading. It has always been loading.",
    triggers: &["any interaction"],
    effects: &["nothing happens, slowly"],
    narrator_reaction: "Even the void has a loading state.",
    difficulty: 1,
    frustration_factor: 1,
    frustration_increment: None,
};

/// Badge awarded when a mapped badge cannot be resolved.
pub const DEFAULT_BADGE: Badge = Badge {
    id: BadgeId::new("participation_trophy"),
    name: "Participation Trophy",
    condition: "Finish something the interface did not expect you to finish.",
    microcopy: "You did a thing.",
    lesson: "Completion is its own dark pattern.",
};

/// Depth below which the shallow depth script applies.
const MIDDLE_DEPTH: u32 = 5;
/// Depth at and beyond which the deep depth script applies.
const DEEP_DEPTH: u32 = 10;

/// Narration scripts keyed by situation.
#[derive(Clone, Copy, Debug)]
pub struct Narration {
    /// Ambient lines always eligible.
    pub base: &'static [&'static str],
    /// Ambient lines added while suspicion is high.
    pub suspicion: &'static [&'static str],
    /// Ambient lines added while chaos is high.
    pub chaos: &'static [&'static str],
    /// Ambient lines added once patterns start repeating.
    pub loops: &'static [&'static str],
    /// Lines spoken when the player goes idle.
    pub idle: &'static [&'static str],
    /// Lines spoken when every pattern has been learned.
    pub exhausted: &'static [&'static str],
    /// Takeover lines used once the spiral runs deep.
    pub invasive: &'static [&'static str],
    /// Takeover lines used when failures pile up.
    pub overrides: &'static [&'static str],
    /// Loading lines for depths below five.
    pub depth_shallow: &'static [&'static str],
    /// Loading lines for depths five through nine.
    pub depth_middle: &'static [&'static str],
    /// Loading lines for depths of ten and beyond.
    pub depth_deep: &'static [&'static str],
    /// Failure lines for compliant players.
    pub failure_compliant: &'static [&'static str],
    /// Failure lines for rebellious players.
    pub failure_rebellious: &'static [&'static str],
    /// Failure lines for chaotic players.
    pub failure_chaotic: &'static [&'static str],
    /// Failure lines for suspicious players.
    pub failure_suspicious: &'static [&'static str],
}

impl Narration {
    /// Loading lines appropriate for the provided depth.
    #[must_use]
    pub fn depth_lines(&self, depth: u32) -> &'static [&'static str] {
        if depth >= DEEP_DEPTH {
            self.depth_deep
        } else if depth >= MIDDLE_DEPTH {
            self.depth_middle
        } else {
            self.depth_shallow
        }
    }

    /// Failure lines tailored to the provided alignment.
    #[must_use]
    pub fn failure_lines(&self, alignment: Alignment) -> &'static [&'static str] {
        match alignment {
            Alignment::Compliant => self.failure_compliant,
            Alignment::Rebellious => self.failure_rebellious,
            Alignment::Chaotic => self.failure_chaotic,
            Alignment::Suspicious => self.failure_suspicious,
        }
    }
}

/// Raw catalog content prior to validation.
#[derive(Clone, Debug)]
pub struct CatalogParts {
    /// Patterns in presentation order.
    pub patterns: Vec<Pattern>,
    /// Badges available for award.
    pub badges: Vec<Badge>,
    /// Hidden scenes in any order.
    pub hidden_scenes: Vec<HiddenScene>,
    /// Usability laws for the overlay layer.
    pub ux_laws: Vec<UxLaw>,
    /// Fake error pages for takeovers.
    pub error_overrides: Vec<ErrorOverride>,
    /// Fixed badge awarded for completing specific patterns.
    pub completion_badges: Vec<(PatternId, BadgeId)>,
    /// Narration scripts.
    pub narration: Narration,
}

/// Reasons catalog content may be rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CatalogError {
    /// Two patterns share an identifier.
    #[error("pattern `{0}` is declared more than once")]
    DuplicatePattern(PatternId),
    /// A pattern rating lies outside `1..=5`.
    #[error("pattern `{pattern}` has {field} {value}; expected 1..=5")]
    RatingOutOfRange {
        /// Offending pattern.
        pattern: PatternId,
        /// Name of the rating field.
        field: &'static str,
        /// Value supplied.
        value: u8,
    },
    /// A pattern declares a negative or non-finite failure increment.
    #[error("pattern `{0}` has an invalid frustration increment")]
    InvalidIncrement(PatternId),
    /// Two badges share an identifier.
    #[error("badge `{0}` is declared more than once")]
    DuplicateBadge(BadgeId),
    /// A completion mapping names a pattern missing from the catalog.
    #[error("completion badge mapping names unknown pattern `{0}`")]
    UnknownMappedPattern(PatternId),
    /// A completion mapping names a badge missing from the catalog.
    #[error("completion badge mapping for `{pattern}` names unknown badge `{badge}`")]
    UnknownMappedBadge {
        /// Pattern whose mapping is broken.
        pattern: PatternId,
        /// Badge that could not be found.
        badge: BadgeId,
    },
    /// A hidden scene threshold is negative or non-finite.
    #[error("hidden scene `{0}` has an invalid frustration threshold")]
    InvalidSceneThreshold(SceneId),
}

/// Validated, immutable catalog.
#[derive(Clone, Debug)]
pub struct Catalog {
    patterns: Vec<Pattern>,
    badges: Vec<Badge>,
    hidden_scenes: Vec<HiddenScene>,
    ux_laws: Vec<UxLaw>,
    error_overrides: Vec<ErrorOverride>,
    completion_badges: Vec<(PatternId, BadgeId)>,
    narration: Narration,
}

impl Catalog {
    /// Validates the provided parts and orders hidden scenes by threshold.
    pub fn new(parts: CatalogParts) -> Result<Self, CatalogError> {
        validate(&parts)?;
        Ok(Self::from_parts(parts))
    }

    /// Catalog shipped with the engine.
    #[must_use]
    pub fn standard() -> Self {
        Self::from_parts(standard::parts())
    }

    fn from_parts(parts: CatalogParts) -> Self {
        let mut hidden_scenes = parts.hidden_scenes;
        hidden_scenes.sort_by(|left, right| {
            left.frustration_threshold
                .total_cmp(&right.frustration_threshold)
        });
        Self {
            patterns: parts.patterns,
            badges: parts.badges,
            hidden_scenes,
            ux_laws: parts.ux_laws,
            error_overrides: parts.error_overrides,
            completion_badges: parts.completion_badges,
            narration: parts.narration,
        }
    }

    /// Patterns in presentation order.
    #[must_use]
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Looks up a pattern by identifier.
    #[must_use]
    pub fn pattern(&self, id: PatternId) -> Option<&Pattern> {
        self.patterns.iter().find(|pattern| pattern.id == id)
    }

    /// Looks up a pattern, falling back to [`PLACEHOLDER_PATTERN`].
    #[must_use]
    pub fn pattern_or_placeholder(&self, id: PatternId) -> &Pattern {
        self.pattern(id).unwrap_or(&PLACEHOLDER_PATTERN)
    }

    /// Badges available for award.
    #[must_use]
    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    /// Looks up a badge by identifier.
    #[must_use]
    pub fn badge(&self, id: BadgeId) -> Option<&Badge> {
        self.badges.iter().find(|badge| badge.id == id)
    }

    /// Fixed badge mapped to the provided pattern, if any.
    #[must_use]
    pub fn completion_badge(&self, pattern: PatternId) -> Option<BadgeId> {
        self.completion_badges
            .iter()
            .find(|(mapped, _)| *mapped == pattern)
            .map(|(_, badge)| *badge)
    }

    /// Hidden scenes ordered by ascending threshold.
    #[must_use]
    pub fn hidden_scenes(&self) -> &[HiddenScene] {
        &self.hidden_scenes
    }

    /// Scene with the highest threshold not exceeding `frustration`.
    #[must_use]
    pub fn highest_scene_at(&self, frustration: f32) -> Option<&HiddenScene> {
        self.hidden_scenes
            .iter()
            .rev()
            .find(|scene| scene.frustration_threshold <= frustration)
    }

    /// Usability laws for the overlay layer.
    #[must_use]
    pub fn ux_laws(&self) -> &[UxLaw] {
        &self.ux_laws
    }

    /// Fake error pages for takeovers.
    #[must_use]
    pub fn error_overrides(&self) -> &[ErrorOverride] {
        &self.error_overrides
    }

    /// Narration scripts.
    #[must_use]
    pub fn narration(&self) -> &Narration {
        &self.narration
    }
}

fn validate(parts: &CatalogParts) -> Result<(), CatalogError> {
    let mut pattern_ids = HashSet::new();
    for pattern in &parts.patterns {
        if !pattern_ids.insert(pattern.id) {
            return Err(CatalogError::DuplicatePattern(pattern.id));
        }
        check_rating(pattern.id, "difficulty", pattern.difficulty)?;
        check_rating(pattern.id, "frustration factor", pattern.frustration_factor)?;
        if let Some(increment) = pattern.frustration_increment {
            if !increment.is_finite() || increment < 0.0 {
                return Err(CatalogError::InvalidIncrement(pattern.id));
            }
        }
    }

    let mut badge_ids = HashSet::new();
    for badge in &parts.badges {
        if !badge_ids.insert(badge.id) {
            return Err(CatalogError::DuplicateBadge(badge.id));
        }
    }

    for (pattern, badge) in &parts.completion_badges {
        if !pattern_ids.contains(pattern) {
            return Err(CatalogError::UnknownMappedPattern(*pattern));
        }
        if !badge_ids.contains(badge) {
            return Err(CatalogError::UnknownMappedBadge {
                pattern: *pattern,
                badge: *badge,
            });
        }
    }

    for scene in &parts.hidden_scenes {
        if !scene.frustration_threshold.is_finite() || scene.frustration_threshold < 0.0 {
            return Err(CatalogError::InvalidSceneThreshold(scene.id));
        }
    }

    Ok(())
}

fn check_rating(pattern: PatternId, field: &'static str, value: u8) -> Result<(), CatalogError> {
    if (1..=5).contains(&value) {
        Ok(())
    } else {
        Err(CatalogError::RatingOutOfRange {
            pattern,
            field,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(id: &'static str, difficulty: u8) -> Pattern {
        Pattern {
            id: PatternId::new(id),
            difficulty,
            ..PLACEHOLDER_PATTERN
        }
    }

    fn minimal_parts() -> CatalogParts {
        let mut parts = standard::parts();
        parts.patterns = vec![pattern("alpha", 2), pattern("beta", 4)];
        parts.completion_badges = Vec::new();
        parts
    }

    #[test]
    fn standard_catalog_passes_validation() {
        let catalog = Catalog::new(standard::parts()).expect("standard catalog is valid");
        assert!(catalog.patterns().len() >= 10);
        assert!(!catalog.badges().is_empty());
        assert_eq!(catalog.hidden_scenes().len(), 4);
    }

    #[test]
    fn glitched_inputs_ratings_match_design() {
        let catalog = Catalog::standard();
        let glitched = catalog
            .pattern(PatternId::new("glitched_inputs"))
            .expect("glitched_inputs present");
        assert_eq!(glitched.frustration_factor, 4);
        assert_eq!(glitched.difficulty, 3);
    }

    #[test]
    fn duplicate_patterns_are_rejected() {
        let mut parts = minimal_parts();
        parts.patterns.push(pattern("alpha", 3));
        assert_eq!(
            Catalog::new(parts).unwrap_err(),
            CatalogError::DuplicatePattern(PatternId::new("alpha"))
        );
    }

    #[test]
    fn ratings_outside_range_are_rejected() {
        let mut parts = minimal_parts();
        parts.patterns.push(pattern("gamma", 6));
        assert!(matches!(
            Catalog::new(parts),
            Err(CatalogError::RatingOutOfRange { value: 6, .. })
        ));
    }

    #[test]
    fn broken_badge_mappings_are_rejected() {
        let mut parts = minimal_parts();
        parts
            .completion_badges
            .push((PatternId::new("alpha"), BadgeId::new("missing")));
        assert!(matches!(
            Catalog::new(parts),
            Err(CatalogError::UnknownMappedBadge { .. })
        ));
    }

    #[test]
    fn hidden_scenes_are_sorted_by_threshold() {
        let mut parts = minimal_parts();
        parts.hidden_scenes.reverse();
        let catalog = Catalog::new(parts).expect("valid");
        let thresholds: Vec<f32> = catalog
            .hidden_scenes()
            .iter()
            .map(|scene| scene.frustration_threshold)
            .collect();
        let mut sorted = thresholds.clone();
        sorted.sort_by(f32::total_cmp);
        assert_eq!(thresholds, sorted);
    }

    #[test]
    fn highest_scene_lookup_respects_thresholds() {
        let catalog = Catalog::standard();
        assert!(catalog.highest_scene_at(4.9).is_none());
        assert_eq!(
            catalog.highest_scene_at(8.0).map(|scene| scene.id.get()),
            Some("interface_rebellion")
        );
        assert_eq!(
            catalog.highest_scene_at(15.0).map(|scene| scene.id.get()),
            Some("narrator_override")
        );
    }

    #[test]
    fn depth_lines_follow_depth_bands() {
        let narration = *Catalog::standard().narration();
        assert_eq!(narration.depth_lines(0), narration.depth_shallow);
        assert_eq!(narration.depth_lines(7), narration.depth_middle);
        assert_eq!(narration.depth_lines(12), narration.depth_deep);
    }

    #[test]
    fn unknown_patterns_resolve_to_placeholder() {
        let catalog = Catalog::standard();
        let resolved = catalog.pattern_or_placeholder(PatternId::new("nope"));
        assert_eq!(resolved.id, PLACEHOLDER_PATTERN.id);
    }
}
