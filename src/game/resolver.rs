//! Action resolution.
//!
//! Two policies are supported and chosen when the resolver is built:
//!
//! - [`ResolutionPolicy::Threshold`]: a natural 11-20 succeeds, 1-10 fails,
//!   attributes play no part in the roll.
//! - [`ResolutionPolicy::Additive`]: the roll is added to the action's
//!   required attribute and a [`ScoringHook`] decides the outcome and how far
//!   the proposed deltas are shifted.
//!
//! Either way the content generator proposes the raw deltas; the resolver
//! validates their shape, bounds each one to ±10 and hands back a
//! [`Resolution`] without touching any game state.

use log::debug;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::game::attributes::find_skill;
use crate::game::errors::GameError;
use crate::game::stats::apply_effect;
use crate::game::types::{
    Action, ActionEffect, CharacterAttributes, ChildStat, ChildStats, Outcome, Roll, StatScale,
};

/// Lowest natural roll that succeeds under the threshold policy.
pub const SUCCESS_THRESHOLD: u8 = 11;

/// Attribute score an action's required attribute must reach before it can be attempted.
pub const DEFAULT_REQUIREMENT_THRESHOLD: i32 = 10;

/// Largest magnitude accepted from a generator before the effect is considered malformed.
pub const PROPOSAL_SANITY_LIMIT: f64 = 100.0;

/// Maps an additive total to an outcome and a signed shift applied to every proposed delta.
pub trait ScoringHook: fmt::Debug + Send + Sync {
    fn outcome(&self, total: i32) -> Outcome;
    fn bias(&self, total: i32) -> i32;
}

/// Linear scoring around a pivot total.
///
/// `total >= pivot` succeeds; each `step` points above or below the pivot
/// shifts every delta by one, capped at ±10. The default pivot of 21 makes an
/// average attribute (10) succeed on the same natural rolls as the threshold policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearScoring {
    pub pivot: i32,
    pub step: i32,
}

impl Default for LinearScoring {
    fn default() -> Self {
        Self { pivot: 21, step: 3 }
    }
}

impl ScoringHook for LinearScoring {
    fn outcome(&self, total: i32) -> Outcome {
        if total >= self.pivot {
            Outcome::Success
        } else {
            Outcome::Failure
        }
    }

    fn bias(&self, total: i32) -> i32 {
        let step = self.step.max(1);
        (total.saturating_sub(self.pivot) / step)
            .clamp(-ActionEffect::DELTA_LIMIT, ActionEffect::DELTA_LIMIT)
    }
}

#[derive(Debug, Clone)]
pub enum ResolutionPolicy {
    Threshold,
    Additive(Arc<dyn ScoringHook>),
}

impl ResolutionPolicy {
    pub fn additive_linear(scoring: LinearScoring) -> Self {
        ResolutionPolicy::Additive(Arc::new(scoring))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResolutionPolicy::Threshold => "threshold",
            ResolutionPolicy::Additive(_) => "additive",
        }
    }
}

/// Result of resolving one action attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: Outcome,
    pub roll: Roll,
    /// Roll plus the required attribute (base 10 when none is named) under the
    /// additive policy; the bare roll otherwise.
    pub total: i32,
    pub effect: ActionEffect,
}

#[derive(Debug, Clone)]
pub struct ActionResolver {
    policy: ResolutionPolicy,
    requirement_threshold: i32,
}

impl ActionResolver {
    pub fn new(policy: ResolutionPolicy) -> Self {
        Self {
            policy,
            requirement_threshold: DEFAULT_REQUIREMENT_THRESHOLD,
        }
    }

    pub fn threshold() -> Self {
        Self::new(ResolutionPolicy::Threshold)
    }

    pub fn additive(scoring: impl ScoringHook + 'static) -> Self {
        Self::new(ResolutionPolicy::Additive(Arc::new(scoring)))
    }

    pub fn with_requirement_threshold(mut self, threshold: i32) -> Self {
        self.requirement_threshold = threshold;
        self
    }

    pub fn policy(&self) -> &ResolutionPolicy {
        &self.policy
    }

    pub fn requirement_threshold(&self) -> i32 {
        self.requirement_threshold
    }

    /// Gate run before any roll is drawn. A failed gate consumes nothing.
    pub fn check_requirements(
        &self,
        action: &Action,
        attributes: &CharacterAttributes,
        skills: &[String],
    ) -> Result<(), GameError> {
        if let Some(attribute) = action.required_attribute {
            let value = attributes.get(attribute);
            if value < self.requirement_threshold {
                return Err(GameError::PreconditionNotMet(format!(
                    "{} requires {} >= {} (have {})",
                    action.id, attribute, self.requirement_threshold, value
                )));
            }
        }
        if let Some(skill) = action.required_skill.as_deref() {
            let canonical = find_skill(skill).map(|s| s.name).unwrap_or(skill);
            if !skills.iter().any(|s| s.eq_ignore_ascii_case(canonical)) {
                return Err(GameError::PreconditionNotMet(format!(
                    "{} requires skill '{}'",
                    action.id, skill
                )));
            }
        }
        Ok(())
    }

    /// Outcome and total for a roll, without any effect.
    pub fn outcome(&self, action: &Action, roll: Roll, attributes: &CharacterAttributes) -> (Outcome, i32) {
        match &self.policy {
            ResolutionPolicy::Threshold => {
                let outcome = if roll.value() >= SUCCESS_THRESHOLD {
                    Outcome::Success
                } else {
                    Outcome::Failure
                };
                (outcome, i32::from(roll.value()))
            }
            ResolutionPolicy::Additive(scoring) => {
                let total = additive_total(action, roll, attributes);
                (scoring.outcome(total), total)
            }
        }
    }

    /// Resolve an attempt against the generator's proposed deltas.
    ///
    /// Rejects with [`GameError::MalformedEffect`] unless `proposal` is an
    /// object carrying all four stats as integral numbers.
    pub fn resolve(
        &self,
        action: &Action,
        roll: Roll,
        attributes: &CharacterAttributes,
        proposal: &Value,
    ) -> Result<Resolution, GameError> {
        let proposed = validate_effect(proposal)?;
        let (outcome, total) = self.outcome(action, roll, attributes);
        let effect = match &self.policy {
            ResolutionPolicy::Threshold => proposed.clamped(),
            ResolutionPolicy::Additive(scoring) => proposed.shifted(scoring.bias(total)),
        };
        debug!(
            "resolved {} [{}]: roll={} total={} outcome={} effect={:?}",
            action.id,
            self.policy.name(),
            roll,
            total,
            outcome,
            effect
        );
        Ok(Resolution {
            outcome,
            roll,
            total,
            effect,
        })
    }

    /// Apply a resolved effect to the child's stats on the session scale.
    pub fn apply(&self, stats: &ChildStats, effect: &ActionEffect) -> ChildStats {
        apply_effect(stats, effect, StatScale::SESSION)
    }
}

/// Actions without a required attribute score as if it were at the base value.
fn additive_total(action: &Action, roll: Roll, attributes: &CharacterAttributes) -> i32 {
    let bonus = action
        .required_attribute
        .map(|attribute| attributes.get(attribute))
        .unwrap_or(CharacterAttributes::BASE);
    i32::from(roll.value()).saturating_add(bonus)
}

/// Check a generator proposal has the effect shape and convert it.
pub fn validate_effect(proposal: &Value) -> Result<ActionEffect, GameError> {
    let object = proposal
        .as_object()
        .ok_or_else(|| GameError::MalformedEffect(format!("expected an object, got {}", proposal)))?;

    let field = |stat: ChildStat| -> Result<i32, GameError> {
        let raw = object
            .get(stat.key())
            .ok_or_else(|| GameError::MalformedEffect(format!("missing '{}'", stat.key())))?;
        let number = raw
            .as_f64()
            .ok_or_else(|| GameError::MalformedEffect(format!("'{}' is not a number: {}", stat.key(), raw)))?;
        if !number.is_finite() || number.fract() != 0.0 {
            return Err(GameError::MalformedEffect(format!(
                "'{}' is not a whole number: {}",
                stat.key(),
                raw
            )));
        }
        if number.abs() > PROPOSAL_SANITY_LIMIT {
            return Err(GameError::MalformedEffect(format!(
                "'{}' out of range: {}",
                stat.key(),
                raw
            )));
        }
        Ok(number as i32)
    };

    Ok(ActionEffect {
        mood: field(ChildStat::Mood)?,
        academic_performance: field(ChildStat::AcademicPerformance)?,
        social_life: field(ChildStat::SocialLife)?,
        cultural_connection: field(ChildStat::CulturalConnection)?,
    })
}
