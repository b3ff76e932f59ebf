//! # parentsim - game-state progression for a narrative parenting simulation
//!
//! The player picks a parenting style and a family background, which fix six
//! character attributes. The child's four stats are derived from those
//! attributes once, then every turn an action from a generated scene is
//! resolved with a d20 roll and nudges the stats within fixed bounds.
//! Crossing stat thresholds unlocks achievements, which never lock again.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parentsim::game::{
//!     AchievementBook, ActionResolver, AttributeMode, FamilyBackground, GameContext,
//!     GameSession, ParentingStyle, ScriptedGenerator, ThreadRoller,
//! };
//!
//! fn main() -> Result<(), parentsim::game::GameError> {
//!     let mut ctx = GameContext::new(
//!         ActionResolver::threshold(),
//!         Box::new(ThreadRoller),
//!         Box::new(ScriptedGenerator::new()),
//!         AchievementBook::in_memory()?,
//!     );
//!     let mut session = GameSession::new_game(
//!         "Mei",
//!         ParentingStyle::Authoritarian,
//!         FamilyBackground::Immigrant,
//!         "Leo",
//!         AttributeMode::Fixed,
//!     );
//!     let action_id = session.next_scene(&mut ctx)?.actions[0].id.clone();
//!     let report = session.take_action(&mut ctx, &action_id)?;
//!     println!("{} -> {:?}", report.outcome, report.stats_after);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`game`] - attributes, derived stats, action resolution, achievements, sessions, storage
//! - [`config`] - TOML configuration
//! - [`logutil`] - single-line log escaping

pub mod config;
pub mod game;
pub mod logutil;
