//! Child stat derivation and effect application.

use crate::game::types::{ActionEffect, CharacterAttributes, ChildStats, StatScale};

fn offset(value: i32) -> i32 {
    value.saturating_sub(CharacterAttributes::BASE)
}

/// Derive the starting child stats from the parent's attributes.
///
/// Each stat is driven by two attributes; tiger discipline pulls mood down.
/// Results are held to [`StatScale::INITIAL`]. Only called when a game is created.
pub fn derive_child_stats(attrs: &CharacterAttributes) -> ChildStats {
    let scale = StatScale::INITIAL;
    let mood = offset(attrs.emotional_tactics)
        .saturating_mul(2)
        .saturating_sub(offset(attrs.tiger_discipline));
    let academic_performance = offset(attrs.academic_pressure)
        .saturating_mul(3)
        .saturating_add(offset(attrs.resource_management));
    let social_life = offset(attrs.social_engineering)
        .saturating_mul(2)
        .saturating_add(offset(attrs.emotional_tactics));
    let cultural_connection = offset(attrs.family_honor)
        .saturating_mul(2)
        .saturating_add(offset(attrs.social_engineering));

    ChildStats {
        mood: scale.clamp(mood),
        academic_performance: scale.clamp(academic_performance),
        social_life: scale.clamp(social_life),
        cultural_connection: scale.clamp(cultural_connection),
    }
}

/// Add `effect` to `stats`, holding every field within `scale`.
pub fn apply_effect(stats: &ChildStats, effect: &ActionEffect, scale: StatScale) -> ChildStats {
    ChildStats {
        mood: scale.clamp(stats.mood.saturating_add(effect.mood)),
        academic_performance: scale
            .clamp(stats.academic_performance.saturating_add(effect.academic_performance)),
        social_life: scale.clamp(stats.social_life.saturating_add(effect.social_life)),
        cultural_connection: scale
            .clamp(stats.cultural_connection.saturating_add(effect.cultural_connection)),
    }
}
