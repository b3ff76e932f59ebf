//! Character creation: attribute bonuses from parenting style and family
//! background, and the base skills those attributes unlock.

use log::{debug, warn};

use crate::game::errors::GameError;
use crate::game::types::{Attribute, CharacterAttributes, FamilyBackground, ParentingStyle};

/// Attribute score at which a base skill becomes available.
pub const SKILL_UNLOCK_THRESHOLD: i32 = 12;

/// Points a new character may spend on top of the style and background bonuses.
pub const ALLOCATION_POINTS: i32 = 20;

/// Bounds for an attribute set during character creation.
pub const ALLOCATION_MIN: i32 = 1;
pub const ALLOCATION_MAX: i32 = 20;

/// Fixed bonus vector indexed by [`Attribute::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeBonus(pub [i32; 6]);

impl AttributeBonus {
    pub fn get(&self, attribute: Attribute) -> i32 {
        self.0[attribute.index()]
    }
}

// academicPressure, tigerDiscipline, socialEngineering, familyHonor, resourceManagement, emotionalTactics
const AUTHORITATIVE: AttributeBonus = AttributeBonus([1, 1, 1, 0, 1, 2]);
const AUTHORITARIAN: AttributeBonus = AttributeBonus([2, 3, 0, 2, 0, 0]);
const PERMISSIVE: AttributeBonus = AttributeBonus([0, 0, 2, 0, 1, 3]);
const UNINVOLVED: AttributeBonus = AttributeBonus([0, 0, 1, 0, 2, 0]);

const MIDDLE_CLASS: AttributeBonus = AttributeBonus([2, 0, 1, 0, 1, 0]);
const WORKING_CLASS: AttributeBonus = AttributeBonus([0, 2, 0, 1, 2, 0]);
const UPPER_CLASS: AttributeBonus = AttributeBonus([1, 0, 3, 0, 3, 0]);
const IMMIGRANT: AttributeBonus = AttributeBonus([2, 1, 0, 3, 0, 1]);

pub fn style_bonus(style: ParentingStyle) -> &'static AttributeBonus {
    match style {
        ParentingStyle::Authoritative => &AUTHORITATIVE,
        ParentingStyle::Authoritarian => &AUTHORITARIAN,
        ParentingStyle::Permissive => &PERMISSIVE,
        ParentingStyle::Uninvolved => &UNINVOLVED,
    }
}

pub fn background_bonus(background: FamilyBackground) -> &'static AttributeBonus {
    match background {
        FamilyBackground::MiddleClass => &MIDDLE_CLASS,
        FamilyBackground::WorkingClass => &WORKING_CLASS,
        FamilyBackground::UpperClass => &UPPER_CLASS,
        FamilyBackground::Immigrant => &IMMIGRANT,
    }
}

/// Build a character's attributes: base 10 plus both bonus vectors.
pub fn initialize_attributes(
    style: ParentingStyle,
    background: FamilyBackground,
) -> CharacterAttributes {
    let style_bonus = style_bonus(style);
    let background_bonus = background_bonus(background);
    let mut attributes = CharacterAttributes::default();
    for attribute in Attribute::ALL {
        *attributes.get_mut(attribute) =
            CharacterAttributes::BASE + style_bonus.get(attribute) + background_bonus.get(attribute);
    }
    attributes
}

/// Parse a parenting style, substituting the default when missing or unknown.
pub fn parenting_style_or_default(raw: Option<&str>) -> ParentingStyle {
    match raw.map(str::parse::<ParentingStyle>) {
        Some(Ok(style)) => style,
        Some(Err(e)) => {
            warn!("{}; defaulting to {}", e, ParentingStyle::default());
            ParentingStyle::default()
        }
        None => ParentingStyle::default(),
    }
}

/// Parse a family background, substituting the default when missing or unknown.
pub fn family_background_or_default(raw: Option<&str>) -> FamilyBackground {
    match raw.map(str::parse::<FamilyBackground>) {
        Some(Ok(background)) => background,
        Some(Err(e)) => {
            warn!("{}; defaulting to {}", e, FamilyBackground::default());
            FamilyBackground::default()
        }
        None => FamilyBackground::default(),
    }
}

/// Point-buy state for a character under creation.
///
/// Starts from [`initialize_attributes`] with [`ALLOCATION_POINTS`] to spend.
/// Raising an attribute costs the difference, lowering it refunds the
/// difference, and every target is clamped to
/// [`ALLOCATION_MIN`]..=[`ALLOCATION_MAX`] first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeAllocation {
    style: ParentingStyle,
    background: FamilyBackground,
    attributes: CharacterAttributes,
    remaining: i32,
}

impl AttributeAllocation {
    pub fn new(style: ParentingStyle, background: FamilyBackground) -> Self {
        Self {
            style,
            background,
            attributes: initialize_attributes(style, background),
            remaining: ALLOCATION_POINTS,
        }
    }

    /// Set `attribute` to `target` (clamped) and return the value it ended at.
    /// A raise that costs more than the remaining points is rejected and
    /// nothing changes.
    pub fn allocate(&mut self, attribute: Attribute, target: i32) -> Result<i32, GameError> {
        let value = target.clamp(ALLOCATION_MIN, ALLOCATION_MAX);
        let current = self.attributes.get(attribute);
        let cost = value - current;
        if cost > self.remaining {
            return Err(GameError::Validation(format!(
                "raising {} to {} costs {} points, {} left",
                attribute, value, cost, self.remaining
            )));
        }
        *self.attributes.get_mut(attribute) = value;
        self.remaining -= cost;
        debug!("{} set to {} ({} points left)", attribute, value, self.remaining);
        Ok(value)
    }

    /// Apply an `attribute=value` assignment such as `familyHonor=15`.
    pub fn allocate_str(&mut self, raw: &str) -> Result<i32, GameError> {
        let (name, value) = raw
            .split_once('=')
            .ok_or_else(|| GameError::Validation(format!("expected attribute=value, got '{}'", raw)))?;
        let attribute: Attribute = name.parse()?;
        let target: i32 = value
            .trim()
            .parse()
            .map_err(|_| GameError::Validation(format!("'{}' is not a whole number", value.trim())))?;
        self.allocate(attribute, target)
    }

    pub fn style(&self) -> ParentingStyle {
        self.style
    }

    pub fn background(&self) -> FamilyBackground {
        self.background
    }

    pub fn attributes(&self) -> &CharacterAttributes {
        &self.attributes
    }

    pub fn remaining(&self) -> i32 {
        self.remaining
    }

    /// Skills the current allocation would unlock.
    pub fn skills(&self) -> Vec<String> {
        available_skills(&self.attributes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseSkill {
    pub name: &'static str,
    pub attribute: Attribute,
    pub description: &'static str,
}

pub const BASE_SKILLS: &[BaseSkill] = &[
    BaseSkill {
        name: "Test Prep Drilling",
        attribute: Attribute::AcademicPressure,
        description: "Intensive study sessions and practice tests before every examination.",
    },
    BaseSkill {
        name: "Grade Negotiation",
        attribute: Attribute::AcademicPressure,
        description: "Confronting teachers about marks until every possible point is awarded.",
    },
    BaseSkill {
        name: "Strict Scheduling",
        attribute: Attribute::TigerDiscipline,
        description: "A regimented timetable with minimal free time.",
    },
    BaseSkill {
        name: "Punishment System",
        attribute: Attribute::TigerDiscipline,
        description: "Consequences for any result below expectations.",
    },
    BaseSkill {
        name: "Playdate Vetting",
        attribute: Attribute::SocialEngineering,
        description: "Choosing friends by their grades and their parents' occupations.",
    },
    BaseSkill {
        name: "Activity Monitoring",
        attribute: Attribute::SocialEngineering,
        description: "Watching every social interaction and stepping in quickly.",
    },
    BaseSkill {
        name: "Relative Comparison",
        attribute: Attribute::FamilyHonor,
        description: "Holding up cousins' achievements as the standard to beat.",
    },
    BaseSkill {
        name: "Cultural Tradition Enforcement",
        attribute: Attribute::FamilyHonor,
        description: "Mandatory language lessons, cultural practice and family obligations.",
    },
    BaseSkill {
        name: "Educational Investment",
        attribute: Attribute::ResourceManagement,
        description: "Spending on the best mix of schools, programs and materials.",
    },
    BaseSkill {
        name: "Schedule Optimization",
        attribute: Attribute::ResourceManagement,
        description: "Squeezing the most productive hours out of every day.",
    },
    BaseSkill {
        name: "Guilt Induction",
        attribute: Attribute::EmotionalTactics,
        description: "Reminding the child of every sacrifice made on their behalf.",
    },
    BaseSkill {
        name: "Conditional Approval",
        attribute: Attribute::EmotionalTactics,
        description: "Praise handed out only when expectations are met.",
    },
];

pub fn find_skill(name: &str) -> Option<&'static BaseSkill> {
    let wanted = name.trim();
    BASE_SKILLS
        .iter()
        .find(|skill| skill.name.eq_ignore_ascii_case(wanted))
}

/// Names of the base skills whose attribute reaches [`SKILL_UNLOCK_THRESHOLD`].
pub fn available_skills(attributes: &CharacterAttributes) -> Vec<String> {
    BASE_SKILLS
        .iter()
        .filter(|skill| attributes.get(skill.attribute) >= SKILL_UNLOCK_THRESHOLD)
        .map(|skill| skill.name.to_string())
        .collect()
}
