//! Game-state progression core.
//!
//! Character creation fixes six attributes from a parenting style and a
//! family background; the child's four stats are derived from them once.
//! Each turn resolves one action from a generated scene with a d20, applies a
//! bounded effect to the child's stats and checks achievement thresholds.

pub mod achievement;
pub mod attributes;
pub mod content;
pub mod dice;
pub mod errors;
pub mod prompt;
pub mod resolver;
pub mod session;
pub mod stats;
pub mod storage;
pub mod types;

pub use achievement::{
    evaluate, Achievement, AchievementBook, AchievementId, AchievementStore,
    MemoryAchievementStore, ACHIEVEMENT_NAMESPACE, DEFAULT_UNLOCKED,
};
pub use attributes::{
    available_skills, family_background_or_default, find_skill, initialize_attributes,
    parenting_style_or_default, AttributeAllocation, BaseSkill, ALLOCATION_MAX, ALLOCATION_MIN,
    ALLOCATION_POINTS, BASE_SKILLS, SKILL_UNLOCK_THRESHOLD,
};
pub use content::{
    parse_effect_response, parse_scene_response, validate_scene, Attempt, ContentGenerator,
    EffectProposal, ScriptedGenerator,
};
pub use dice::{DiceRoller, FixedRoller, SeededRoller, ThreadRoller};
pub use errors::GameError;
pub use resolver::{
    validate_effect, ActionResolver, LinearScoring, Resolution, ResolutionPolicy, ScoringHook,
};
pub use session::{AttributeMode, GameContext, GameSession, TurnReport};
pub use stats::{apply_effect, derive_child_stats};
pub use storage::{GameStore, GameStoreBuilder};
pub use types::*;
