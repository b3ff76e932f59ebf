use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::game::errors::GameError;

pub const SAVE_SCHEMA_VERSION: u8 = 1;

/// Age of the child when a new game starts.
pub const STARTING_CHILD_AGE: u8 = 8;

/// The six character attributes a parent brings to the game.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    AcademicPressure,
    TigerDiscipline,
    SocialEngineering,
    FamilyHonor,
    ResourceManagement,
    EmotionalTactics,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Attribute::AcademicPressure,
        Attribute::TigerDiscipline,
        Attribute::SocialEngineering,
        Attribute::FamilyHonor,
        Attribute::ResourceManagement,
        Attribute::EmotionalTactics,
    ];

    /// Position in bonus vectors and other per-attribute tables.
    pub fn index(self) -> usize {
        match self {
            Attribute::AcademicPressure => 0,
            Attribute::TigerDiscipline => 1,
            Attribute::SocialEngineering => 2,
            Attribute::FamilyHonor => 3,
            Attribute::ResourceManagement => 4,
            Attribute::EmotionalTactics => 5,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Attribute::AcademicPressure => "academicPressure",
            Attribute::TigerDiscipline => "tigerDiscipline",
            Attribute::SocialEngineering => "socialEngineering",
            Attribute::FamilyHonor => "familyHonor",
            Attribute::ResourceManagement => "resourceManagement",
            Attribute::EmotionalTactics => "emotionalTactics",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Attribute::AcademicPressure => "Academic Pressure",
            Attribute::TigerDiscipline => "Tiger Discipline",
            Attribute::SocialEngineering => "Social Engineering",
            Attribute::FamilyHonor => "Family Honor",
            Attribute::ResourceManagement => "Resource Management",
            Attribute::EmotionalTactics => "Emotional Tactics",
        }
    }

    /// Child stat this attribute pushes hardest on.
    pub fn primary_stat(self) -> ChildStat {
        match self {
            Attribute::AcademicPressure | Attribute::ResourceManagement => {
                ChildStat::AcademicPerformance
            }
            Attribute::TigerDiscipline | Attribute::EmotionalTactics => ChildStat::Mood,
            Attribute::SocialEngineering => ChildStat::SocialLife,
            Attribute::FamilyHonor => ChildStat::CulturalConnection,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

fn normalize_key(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl FromStr for Attribute {
    type Err = GameError;

    /// Accepts the camelCase key, snake_case, or the display label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_key(s);
        Attribute::ALL
            .into_iter()
            .find(|attr| normalize_key(attr.key()) == wanted)
            .ok_or_else(|| GameError::Validation(format!("unknown attribute '{}'", s)))
    }
}

/// Six named attribute scores, nominally 1..=20 but not clamped upward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CharacterAttributes {
    pub academic_pressure: i32,
    pub tiger_discipline: i32,
    pub social_engineering: i32,
    pub family_honor: i32,
    pub resource_management: i32,
    pub emotional_tactics: i32,
}

impl CharacterAttributes {
    pub const BASE: i32 = 10;

    pub fn uniform(value: i32) -> Self {
        Self {
            academic_pressure: value,
            tiger_discipline: value,
            social_engineering: value,
            family_honor: value,
            resource_management: value,
            emotional_tactics: value,
        }
    }

    pub fn get(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::AcademicPressure => self.academic_pressure,
            Attribute::TigerDiscipline => self.tiger_discipline,
            Attribute::SocialEngineering => self.social_engineering,
            Attribute::FamilyHonor => self.family_honor,
            Attribute::ResourceManagement => self.resource_management,
            Attribute::EmotionalTactics => self.emotional_tactics,
        }
    }

    pub fn get_mut(&mut self, attribute: Attribute) -> &mut i32 {
        match attribute {
            Attribute::AcademicPressure => &mut self.academic_pressure,
            Attribute::TigerDiscipline => &mut self.tiger_discipline,
            Attribute::SocialEngineering => &mut self.social_engineering,
            Attribute::FamilyHonor => &mut self.family_honor,
            Attribute::ResourceManagement => &mut self.resource_management,
            Attribute::EmotionalTactics => &mut self.emotional_tactics,
        }
    }

    pub fn with(mut self, attribute: Attribute, value: i32) -> Self {
        *self.get_mut(attribute) = value;
        self
    }
}

impl Default for CharacterAttributes {
    fn default() -> Self {
        Self::uniform(Self::BASE)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ParentingStyle {
    #[default]
    Authoritative,
    Authoritarian,
    Permissive,
    Uninvolved,
}

impl ParentingStyle {
    pub const ALL: [ParentingStyle; 4] = [
        ParentingStyle::Authoritative,
        ParentingStyle::Authoritarian,
        ParentingStyle::Permissive,
        ParentingStyle::Uninvolved,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ParentingStyle::Authoritative => "authoritative",
            ParentingStyle::Authoritarian => "authoritarian",
            ParentingStyle::Permissive => "permissive",
            ParentingStyle::Uninvolved => "uninvolved",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ParentingStyle::Authoritative => {
                "High responsiveness, high demands. Clear rules set with warmth and support."
            }
            ParentingStyle::Authoritarian => {
                "High demands, low responsiveness. Strict rules with little room for negotiation."
            }
            ParentingStyle::Permissive => "High responsiveness, low demands. Few rules and high warmth.",
            ParentingStyle::Uninvolved => "Low responsiveness, low demands. Minimal interaction and few rules.",
        }
    }
}

impl fmt::Display for ParentingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ParentingStyle {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_key(s);
        ParentingStyle::ALL
            .into_iter()
            .find(|style| normalize_key(style.key()) == wanted)
            .ok_or_else(|| GameError::Validation(format!("unknown parenting style '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FamilyBackground {
    #[default]
    MiddleClass,
    WorkingClass,
    UpperClass,
    Immigrant,
}

impl FamilyBackground {
    pub const ALL: [FamilyBackground; 4] = [
        FamilyBackground::MiddleClass,
        FamilyBackground::WorkingClass,
        FamilyBackground::UpperClass,
        FamilyBackground::Immigrant,
    ];

    pub fn key(self) -> &'static str {
        match self {
            FamilyBackground::MiddleClass => "middle-class",
            FamilyBackground::WorkingClass => "working-class",
            FamilyBackground::UpperClass => "upper-class",
            FamilyBackground::Immigrant => "immigrant",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            FamilyBackground::MiddleClass => {
                "Stable income, comfortable lifestyle, emphasis on education and personal development."
            }
            FamilyBackground::WorkingClass => {
                "Modest income, practical values, emphasis on hard work and responsibility."
            }
            FamilyBackground::UpperClass => {
                "Wealthy background, access to resources, emphasis on achievement and status."
            }
            FamilyBackground::Immigrant => {
                "Cultural diversity, strong family ties, emphasis on tradition and adaptation."
            }
        }
    }
}

impl fmt::Display for FamilyBackground {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FamilyBackground {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_key(s);
        FamilyBackground::ALL
            .into_iter()
            .find(|bg| normalize_key(bg.key()) == wanted)
            .ok_or_else(|| GameError::Validation(format!("unknown family background '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ChildStat {
    Mood,
    AcademicPerformance,
    SocialLife,
    CulturalConnection,
}

impl ChildStat {
    pub const ALL: [ChildStat; 4] = [
        ChildStat::Mood,
        ChildStat::AcademicPerformance,
        ChildStat::SocialLife,
        ChildStat::CulturalConnection,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ChildStat::Mood => "mood",
            ChildStat::AcademicPerformance => "academicPerformance",
            ChildStat::SocialLife => "socialLife",
            ChildStat::CulturalConnection => "culturalConnection",
        }
    }
}

/// Closed range a child stat is held within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatScale {
    pub min: i32,
    pub max: i32,
}

impl StatScale {
    /// Range used when stats are first derived from attributes.
    pub const INITIAL: StatScale = StatScale { min: 0, max: 100 };
    /// Range used once actions start moving stats around.
    pub const SESSION: StatScale = StatScale { min: -100, max: 100 };

    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChildStats {
    pub mood: i32,
    pub academic_performance: i32,
    pub social_life: i32,
    pub cultural_connection: i32,
}

impl ChildStats {
    pub fn new(mood: i32, academic_performance: i32, social_life: i32, cultural_connection: i32) -> Self {
        Self {
            mood,
            academic_performance,
            social_life,
            cultural_connection,
        }
    }

    pub fn get(&self, stat: ChildStat) -> i32 {
        match stat {
            ChildStat::Mood => self.mood,
            ChildStat::AcademicPerformance => self.academic_performance,
            ChildStat::SocialLife => self.social_life,
            ChildStat::CulturalConnection => self.cultural_connection,
        }
    }

    pub fn within(&self, scale: StatScale) -> bool {
        ChildStat::ALL.into_iter().all(|stat| scale.contains(self.get(stat)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub name: String,
    pub age: u8,
    pub stats: ChildStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub name: String,
    pub parenting_style: ParentingStyle,
    pub family_background: FamilyBackground,
    pub attributes: CharacterAttributes,
    /// Names of base skills unlocked by the current attributes.
    pub skills: Vec<String>,
}

/// Everything a save needs to resume play.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub character: Character,
    pub child: Child,
    /// Number of resolved actions so far.
    pub turn: u32,
}

impl GameState {
    pub fn to_json(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, GameError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// A choice offered to the player inside a scene.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub required_attribute: Option<Attribute>,
    #[serde(default)]
    pub required_skill: Option<String>,
    pub success_text: String,
    pub failure_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Scene {
    pub description: String,
    pub actions: Vec<Action>,
}

impl Scene {
    pub fn action(&self, id: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.id == id)
    }
}

/// Signed per-stat deltas produced by resolving an action.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ActionEffect {
    pub mood: i32,
    pub academic_performance: i32,
    pub social_life: i32,
    pub cultural_connection: i32,
}

impl ActionEffect {
    /// Largest magnitude a single delta may carry once resolved.
    pub const DELTA_LIMIT: i32 = 10;

    pub fn new(mood: i32, academic_performance: i32, social_life: i32, cultural_connection: i32) -> Self {
        Self {
            mood,
            academic_performance,
            social_life,
            cultural_connection,
        }
    }

    pub fn get(&self, stat: ChildStat) -> i32 {
        match stat {
            ChildStat::Mood => self.mood,
            ChildStat::AcademicPerformance => self.academic_performance,
            ChildStat::SocialLife => self.social_life,
            ChildStat::CulturalConnection => self.cultural_connection,
        }
    }

    /// Shift every delta by `bias`, then hold each within `±DELTA_LIMIT`.
    pub fn shifted(&self, bias: i32) -> Self {
        let bound = |v: i32| {
            v.saturating_add(bias)
                .clamp(-Self::DELTA_LIMIT, Self::DELTA_LIMIT)
        };
        Self {
            mood: bound(self.mood),
            academic_performance: bound(self.academic_performance),
            social_life: bound(self.social_life),
            cultural_connection: bound(self.cultural_connection),
        }
    }

    pub fn clamped(&self) -> Self {
        self.shifted(0)
    }
}

/// A single d20 result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub struct Roll(u8);

impl Roll {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 20;
    pub const NATURAL_ONE: Roll = Roll(1);

    pub fn new(value: u8) -> Result<Self, GameError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(GameError::Validation(format!(
                "roll {} outside {}..={}",
                value,
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Roll {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Roll::new(value)
    }
}

impl From<Roll> for u8 {
    fn from(roll: Roll) -> Self {
        roll.0
    }
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Success)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => f.write_str("success"),
            Outcome::Failure => f.write_str("failure"),
        }
    }
}

/// A persisted game, keyed by user and save id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaveRecord {
    pub id: String,
    pub user_id: String,
    pub game_state: GameState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl SaveRecord {
    pub fn new(user_id: &str, game_state: GameState) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            game_state,
            created_at: now,
            updated_at: now,
            schema_version: SAVE_SCHEMA_VERSION,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
