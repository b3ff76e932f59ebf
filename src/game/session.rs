//! Turn orchestration.
//!
//! A [`GameSession`] owns one [`GameState`] and the scene currently on offer.
//! Collaborators (resolver, dice, generator, achievement book) live in a
//! [`GameContext`] passed into every operation. A turn either commits fully
//! or leaves the state exactly as it was.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::game::achievement::{AchievementBook, AchievementId};
use crate::game::attributes::{available_skills, AttributeAllocation};
use crate::game::content::{validate_scene, Attempt, ContentGenerator};
use crate::game::dice::DiceRoller;
use crate::game::errors::GameError;
use crate::game::resolver::ActionResolver;
use crate::game::stats::derive_child_stats;
use crate::game::types::{
    Action, ActionEffect, Attribute, Character, Child, ChildStats, FamilyBackground, GameState, Outcome,
    ParentingStyle, Roll, Scene, STARTING_CHILD_AGE,
};
use crate::logutil::escape_log;

/// Whether character attributes may change after creation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AttributeMode {
    #[default]
    Fixed,
    Mutable,
}

impl fmt::Display for AttributeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeMode::Fixed => f.write_str("fixed"),
            AttributeMode::Mutable => f.write_str("mutable"),
        }
    }
}

impl FromStr for AttributeMode {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(AttributeMode::Fixed),
            "mutable" => Ok(AttributeMode::Mutable),
            other => Err(GameError::Validation(format!("unknown attribute mode '{}'", other))),
        }
    }
}

/// Collaborators shared by every session in a process.
pub struct GameContext {
    pub resolver: ActionResolver,
    pub roller: Box<dyn DiceRoller>,
    pub generator: Box<dyn ContentGenerator>,
    pub achievements: AchievementBook,
}

impl GameContext {
    pub fn new(
        resolver: ActionResolver,
        roller: Box<dyn DiceRoller>,
        generator: Box<dyn ContentGenerator>,
        achievements: AchievementBook,
    ) -> Self {
        Self {
            resolver,
            roller,
            generator,
            achievements,
        }
    }
}

/// Everything that happened during one resolved action.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    pub action_id: String,
    pub roll: Roll,
    pub total: i32,
    pub outcome: Outcome,
    pub effect: ActionEffect,
    pub narrative: String,
    pub stats_before: ChildStats,
    pub stats_after: ChildStats,
    pub unlocked: BTreeSet<AchievementId>,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    state: GameState,
    mode: AttributeMode,
    scene: Option<Scene>,
}

impl GameSession {
    /// Create a fresh game: attributes from style and background, derived
    /// child stats, unlocked skills, turn zero.
    pub fn new_game(
        name: &str,
        style: ParentingStyle,
        background: FamilyBackground,
        child_name: &str,
        mode: AttributeMode,
    ) -> Self {
        Self::from_allocation(
            name,
            &AttributeAllocation::new(style, background),
            child_name,
            mode,
        )
    }

    /// Create a fresh game from a finished point-buy. Unspent points are dropped.
    pub fn from_allocation(
        name: &str,
        allocation: &AttributeAllocation,
        child_name: &str,
        mode: AttributeMode,
    ) -> Self {
        let (style, background) = (allocation.style(), allocation.background());
        let attributes = *allocation.attributes();
        let stats = derive_child_stats(&attributes);
        let state = GameState {
            character: Character {
                name: name.to_string(),
                parenting_style: style,
                family_background: background,
                attributes,
                skills: available_skills(&attributes),
            },
            child: Child {
                name: child_name.to_string(),
                age: STARTING_CHILD_AGE,
                stats,
            },
            turn: 0,
        };
        info!(
            "new game for {} ({}, {}): child {} starts at {:?}",
            escape_log(name),
            style,
            background,
            escape_log(child_name),
            stats
        );
        Self {
            state,
            mode,
            scene: None,
        }
    }

    /// Resume from a saved state. No scene is active until [`next_scene`](Self::next_scene).
    pub fn from_state(state: GameState, mode: AttributeMode) -> Self {
        Self {
            state,
            mode,
            scene: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn mode(&self) -> AttributeMode {
        self.mode
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// Ask the generator for a scene and make it the active one.
    pub fn next_scene(&mut self, ctx: &mut GameContext) -> Result<&Scene, GameError> {
        let scene = ctx.generator.generate_scene(&self.state)?;
        validate_scene(&scene)?;
        debug!(
            "turn {} scene: {} ({} actions)",
            self.state.turn,
            escape_log(&scene.description),
            scene.actions.len()
        );
        Ok(self.scene.insert(scene))
    }

    /// Attempt an action from the active scene with a roll from the context's dice.
    pub fn take_action(
        &mut self,
        ctx: &mut GameContext,
        action_id: &str,
    ) -> Result<TurnReport, GameError> {
        self.attempt(ctx, action_id, None)
    }

    /// Attempt an action with a caller-supplied roll instead of the dice.
    pub fn take_action_with_roll(
        &mut self,
        ctx: &mut GameContext,
        action_id: &str,
        roll: Roll,
    ) -> Result<TurnReport, GameError> {
        self.attempt(ctx, action_id, Some(roll))
    }

    /// Gate and roll an action from the active scene without asking for or
    /// applying any effect. The state is left untouched.
    pub fn roll_attempt(
        &self,
        ctx: &mut GameContext,
        action_id: &str,
        forced_roll: Option<Roll>,
    ) -> Result<(Action, Attempt), GameError> {
        let scene = self
            .scene
            .as_ref()
            .ok_or_else(|| GameError::NotFound("no active scene".into()))?;
        let action = scene
            .action(action_id)
            .cloned()
            .ok_or_else(|| GameError::NotFound(format!("action '{}'", action_id)))?;

        let character = &self.state.character;
        ctx.resolver
            .check_requirements(&action, &character.attributes, &character.skills)?;

        let roll = forced_roll.unwrap_or_else(|| ctx.roller.roll());
        let (outcome, total) = ctx.resolver.outcome(&action, roll, &character.attributes);
        Ok((
            action,
            Attempt {
                roll,
                total,
                outcome,
            },
        ))
    }

    fn attempt(
        &mut self,
        ctx: &mut GameContext,
        action_id: &str,
        forced_roll: Option<Roll>,
    ) -> Result<TurnReport, GameError> {
        let (action, attempt) = self.roll_attempt(ctx, action_id, forced_roll)?;
        let roll = attempt.roll;
        let character = &self.state.character;
        let proposal = ctx
            .generator
            .propose_effect(&action, &self.state, &attempt)?;
        let resolution =
            ctx.resolver
                .resolve(&action, roll, &character.attributes, &proposal.effects)?;

        let stats_before = self.state.child.stats;
        let stats_after = ctx.resolver.apply(&stats_before, &resolution.effect);
        let unlocked = ctx
            .achievements
            .record_transition(&stats_before, &stats_after)?;

        let narrative = proposal.narrative.unwrap_or_else(|| match resolution.outcome {
            Outcome::Success => action.success_text.clone(),
            Outcome::Failure => action.failure_text.clone(),
        });

        self.state.child.stats = stats_after;
        self.state.turn = self.state.turn.saturating_add(1);
        self.scene = None;

        info!(
            "turn {}: {} rolled {} ({}) -> {}",
            self.state.turn,
            action.id,
            roll,
            resolution.outcome,
            escape_log(&narrative)
        );

        Ok(TurnReport {
            action_id: action.id,
            roll,
            total: resolution.total,
            outcome: resolution.outcome,
            effect: resolution.effect,
            narrative,
            stats_before,
            stats_after,
            unlocked,
        })
    }

    /// Grow or shrink an attribute. Only allowed in [`AttributeMode::Mutable`];
    /// values never drop below 1 and unlocked skills are recomputed.
    pub fn adjust_attribute(&mut self, attribute: Attribute, delta: i32) -> Result<i32, GameError> {
        if self.mode == AttributeMode::Fixed {
            return Err(GameError::AttributesLocked);
        }
        let character = &mut self.state.character;
        let slot = character.attributes.get_mut(attribute);
        *slot = slot.saturating_add(delta).max(1);
        let value = *slot;
        character.skills = available_skills(&character.attributes);
        debug!("{} adjusted by {} to {}", attribute, delta, value);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::content::{EffectProposal, ScriptedGenerator};
    use crate::game::dice::FixedRoller;
    use crate::game::resolver::LinearScoring;
    use std::sync::{Arc, Mutex};

    /// Scripted content that remembers every attempt it was asked about.
    struct RecordingGenerator {
        inner: ScriptedGenerator,
        seen: Arc<Mutex<Vec<Attempt>>>,
    }

    impl ContentGenerator for RecordingGenerator {
        fn generate_scene(&mut self, state: &GameState) -> Result<Scene, GameError> {
            self.inner.generate_scene(state)
        }

        fn propose_effect(
            &mut self,
            action: &Action,
            state: &GameState,
            attempt: &Attempt,
        ) -> Result<EffectProposal, GameError> {
            self.seen.lock().unwrap().push(*attempt);
            self.inner.propose_effect(action, state, attempt)
        }
    }

    fn roll(v: u8) -> Roll {
        Roll::new(v).unwrap()
    }

    fn context(generator: ScriptedGenerator, rolls: &[u8]) -> GameContext {
        GameContext::new(
            ActionResolver::threshold(),
            Box::new(FixedRoller::sequence(rolls.iter().map(|v| roll(*v)))),
            Box::new(generator),
            AchievementBook::in_memory().unwrap(),
        )
    }

    fn session() -> GameSession {
        GameSession::new_game(
            "Mei",
            ParentingStyle::Authoritarian,
            FamilyBackground::MiddleClass,
            "Leo",
            AttributeMode::Fixed,
        )
    }

    #[test]
    fn new_game_derives_state() {
        let game = session();
        let state = game.state();
        assert_eq!(state.child.age, STARTING_CHILD_AGE);
        assert_eq!(state.turn, 0);
        assert_eq!(state.character.attributes.academic_pressure, 14);
        assert_eq!(state.child.stats.academic_performance, 13);
        assert!(state.character.skills.contains(&"Test Prep Drilling".to_string()));
        assert!(game.scene().is_none());
    }

    #[test]
    fn turn_applies_effect_and_advances() {
        let mut ctx = context(ScriptedGenerator::new(), &[15]);
        let mut game = session();
        game.next_scene(&mut ctx).unwrap();
        let report = game.take_action(&mut ctx, "extra-worksheets").unwrap();
        assert_eq!(report.outcome, Outcome::Success);
        assert_eq!(report.effect, ActionEffect::new(1, 4, 0, 0));
        assert_eq!(report.stats_after.academic_performance, 17);
        assert!(report.unlocked.contains(&AchievementId::HardWorker));
        assert_eq!(game.state().turn, 1);
        assert_eq!(game.state().child.stats, report.stats_after);
        assert!(game.scene().is_none());
    }

    #[test]
    fn malformed_effect_leaves_state_untouched() {
        let generator = ScriptedGenerator::new()
            .with_effect_responses([r#"{"description": "??", "effects": {"mood": "lots"}}"#]);
        let mut ctx = context(generator, &[18]);
        let mut game = session();
        game.next_scene(&mut ctx).unwrap();
        let before = game.state().clone();
        let err = game.take_action(&mut ctx, "extra-worksheets").unwrap_err();
        assert!(matches!(err, GameError::MalformedEffect(_)));
        assert_eq!(game.state(), &before);
        assert!(game.scene().is_some());
        assert!(!ctx.achievements.has(AchievementId::HardWorker));
    }

    #[test]
    fn gate_failure_consumes_no_roll() {
        let mut ctx = context(ScriptedGenerator::new(), &[20, 2]);
        let mut game = GameSession::new_game(
            "Sam",
            ParentingStyle::Permissive,
            FamilyBackground::UpperClass,
            "Ada",
            AttributeMode::Mutable,
        );
        game.adjust_attribute(Attribute::AcademicPressure, -5).unwrap();
        game.next_scene(&mut ctx).unwrap();
        let err = game.take_action(&mut ctx, "extra-worksheets").unwrap_err();
        assert!(matches!(err, GameError::PreconditionNotMet(_)));
        // the 20 is still first in line
        let report = game.take_action(&mut ctx, "ice-cream").unwrap();
        assert_eq!(report.roll, roll(20));
    }

    #[test]
    fn unknown_action_or_missing_scene() {
        let mut ctx = context(ScriptedGenerator::new(), &[12]);
        let mut game = session();
        assert!(matches!(
            game.take_action(&mut ctx, "extra-worksheets"),
            Err(GameError::NotFound(_))
        ));
        game.next_scene(&mut ctx).unwrap();
        assert!(matches!(game.take_action(&mut ctx, "nap"), Err(GameError::NotFound(_))));
    }

    #[test]
    fn forced_roll_overrides_dice() {
        let mut ctx = context(ScriptedGenerator::new(), &[20]);
        let mut game = session();
        game.next_scene(&mut ctx).unwrap();
        let report = game
            .take_action_with_roll(&mut ctx, "ice-cream", roll(7))
            .unwrap();
        assert_eq!(report.outcome, Outcome::Failure);
        assert_eq!(report.effect.mood, -2);
    }

    #[test]
    fn generator_sees_additive_total() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let generator = RecordingGenerator {
            inner: ScriptedGenerator::new(),
            seen: seen.clone(),
        };
        let mut ctx = GameContext::new(
            ActionResolver::additive(LinearScoring::default()),
            Box::new(FixedRoller::always(roll(6))),
            Box::new(generator),
            AchievementBook::in_memory().unwrap(),
        );
        let mut game = session();
        game.next_scene(&mut ctx).unwrap();
        // academicPressure 14 + 6
        let report = game.take_action(&mut ctx, "extra-worksheets").unwrap();
        let attempts = seen.lock().unwrap().clone();
        assert_eq!(
            attempts,
            vec![Attempt {
                roll: roll(6),
                total: 20,
                outcome: Outcome::Failure,
            }]
        );
        assert_eq!(report.total, 20);
    }

    #[test]
    fn allocated_attributes_drive_the_new_game() {
        let mut allocation =
            AttributeAllocation::new(ParentingStyle::Permissive, FamilyBackground::MiddleClass);
        allocation.allocate(Attribute::AcademicPressure, 20).unwrap();
        allocation.allocate(Attribute::EmotionalTactics, 4).unwrap();
        let game = GameSession::from_allocation("Mei", &allocation, "Leo", AttributeMode::Fixed);
        let state = game.state();
        assert_eq!(state.character.attributes, *allocation.attributes());
        assert_eq!(state.character.attributes.academic_pressure, 20);
        assert_eq!(state.child.stats, derive_child_stats(allocation.attributes()));
        assert!(state.character.skills.contains(&"Grade Negotiation".to_string()));
        assert!(!state.character.skills.contains(&"Guilt Induction".to_string()));
        assert_eq!(state.character.parenting_style, ParentingStyle::Permissive);
        assert_eq!(state.turn, 0);
    }

    #[test]
    fn rolled_attempt_leaves_state_alone() {
        let mut ctx = GameContext::new(
            ActionResolver::additive(LinearScoring::default()),
            Box::new(FixedRoller::always(roll(9))),
            Box::new(ScriptedGenerator::new()),
            AchievementBook::in_memory().unwrap(),
        );
        let mut game = session();
        game.next_scene(&mut ctx).unwrap();
        let before = game.state().clone();
        let (action, attempt) = game.roll_attempt(&mut ctx, "extra-worksheets", None).unwrap();
        assert_eq!(action.id, "extra-worksheets");
        assert_eq!(attempt.total, 23);
        assert_eq!(attempt.outcome, Outcome::Success);
        assert_eq!(game.state(), &before);
        assert!(game.scene().is_some());

        let (_, forced) = game
            .roll_attempt(&mut ctx, "ice-cream", Some(roll(3)))
            .unwrap();
        assert_eq!(forced.total, 13);
        assert_eq!(forced.outcome, Outcome::Failure);
    }

    #[test]
    fn fixed_mode_locks_attributes() {
        let mut game = session();
        assert!(matches!(
            game.adjust_attribute(Attribute::FamilyHonor, 1),
            Err(GameError::AttributesLocked)
        ));

        let mut mutable = GameSession::from_state(game.into_state(), AttributeMode::Mutable);
        let value = mutable.adjust_attribute(Attribute::FamilyHonor, 2).unwrap();
        assert_eq!(value, 14);
        assert!(mutable
            .state()
            .character
            .skills
            .contains(&"Relative Comparison".to_string()));
    }

    #[test]
    fn attribute_mode_parses() {
        assert_eq!("Mutable".parse::<AttributeMode>().unwrap(), AttributeMode::Mutable);
        assert!("frozen".parse::<AttributeMode>().is_err());
    }
}
