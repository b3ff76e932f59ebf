//! Prompt text for an external scene/effect generator.

use std::fmt::Write;

use crate::game::content::{MAX_SCENE_ACTIONS, MIN_SCENE_ACTIONS};
use crate::game::content::Attempt;
use crate::game::types::{Action, ChildStats, GameState, Roll};

pub const SCENE_SYSTEM_PROMPT: &str = r#"You are a game master for a parenting simulation game.
Create engaging scenes that reflect the player's parenting style and family background.
Each scene must have 3-5 possible actions that the player can take.
The actions should be meaningful, diverse and have different potential outcomes.

Respond with a single JSON object:
{
  "description": "A detailed description of the scene",
  "actions": [
    {
      "id": "action1",
      "description": "Description of the action",
      "requiredAttribute": "optional",
      "requiredSkill": "optional",
      "successText": "What happens on success",
      "failureText": "What happens on failure"
    }
  ]
}"#;

pub const ACTION_SYSTEM_PROMPT: &str = r#"You are a game master for a parenting simulation game.
Describe the outcome of the player's action based on their roll and the current game state.
The roll is out of 20, where higher is better.
Consider the player's parenting style and family background.

Respond with a single JSON object:
{
  "description": "A detailed description of what happens",
  "effects": {
    "mood": number between -10 and 10,
    "academicPerformance": number between -10 and 10,
    "socialLife": number between -10 and 10,
    "culturalConnection": number between -10 and 10
  }
}"#;

fn write_stats(out: &mut String, stats: &ChildStats) {
    let _ = writeln!(out, "- Current Stats:");
    let _ = writeln!(out, "  * Mood: {}", stats.mood);
    let _ = writeln!(out, "  * Academic Performance: {}", stats.academic_performance);
    let _ = writeln!(out, "  * Social Life: {}", stats.social_life);
    let _ = writeln!(out, "  * Cultural Connection: {}", stats.cultural_connection);
}

/// User message asking for the next scene.
pub fn scene_prompt(state: &GameState) -> String {
    let character = &state.character;
    let mut out = String::new();
    let _ = writeln!(out, "Generate a scene for a parent with:");
    let _ = writeln!(out, "- Parenting Style: {}", character.parenting_style);
    let _ = writeln!(out, "- Family Background: {}", character.family_background);
    let _ = writeln!(out, "- Child's Age: {}", state.child.age);
    if !character.skills.is_empty() {
        let _ = writeln!(out, "- Skills: {}", character.skills.join(", "));
    }
    write_stats(&mut out, &state.child.stats);
    let _ = write!(
        out,
        "Offer between {} and {} actions.",
        MIN_SCENE_ACTIONS, MAX_SCENE_ACTIONS
    );
    out
}

/// User message asking for the consequences of an attempted action.
/// The attribute-adjusted total is listed only when it differs from the roll.
pub fn action_prompt(action: &Action, state: &GameState, attempt: &Attempt) -> String {
    let character = &state.character;
    let mut out = String::new();
    let _ = writeln!(out, "Action: {}", action.description);
    let _ = writeln!(out, "Roll: {}/{}", attempt.roll, Roll::MAX);
    if attempt.total != i32::from(attempt.roll.value()) {
        let _ = writeln!(out, "Total with attribute: {}", attempt.total);
    }
    let _ = writeln!(out, "Outcome: {}", attempt.outcome);
    let _ = writeln!(out, "- Parenting Style: {}", character.parenting_style);
    let _ = writeln!(out, "- Family Background: {}", character.family_background);
    write_stats(&mut out, &state.child.stats);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::{
        Character, CharacterAttributes, Child, FamilyBackground, Outcome, ParentingStyle,
    };

    fn state() -> GameState {
        GameState {
            character: Character {
                name: "Mei".into(),
                parenting_style: ParentingStyle::Authoritarian,
                family_background: FamilyBackground::Immigrant,
                attributes: CharacterAttributes::default(),
                skills: vec!["Test Prep Drilling".into()],
            },
            child: Child {
                name: "Leo".into(),
                age: 8,
                stats: ChildStats::new(3, 19, 0, 6),
            },
            turn: 2,
        }
    }

    #[test]
    fn scene_prompt_lists_context() {
        let prompt = scene_prompt(&state());
        assert!(prompt.contains("Parenting Style: authoritarian"));
        assert!(prompt.contains("Family Background: immigrant"));
        assert!(prompt.contains("Child's Age: 8"));
        assert!(prompt.contains("Academic Performance: 19"));
        assert!(prompt.contains("Test Prep Drilling"));
    }

    fn olympiad() -> Action {
        Action {
            id: "a1".into(),
            description: "Sign up for the olympiad".into(),
            required_attribute: None,
            required_skill: None,
            success_text: String::new(),
            failure_text: String::new(),
        }
    }

    #[test]
    fn action_prompt_includes_roll() {
        let attempt = Attempt::natural(Roll::new(14).unwrap(), Outcome::Success);
        let prompt = action_prompt(&olympiad(), &state(), &attempt);
        assert!(prompt.starts_with("Action: Sign up for the olympiad"));
        assert!(prompt.contains("Roll: 14/20"));
        assert!(prompt.contains("Outcome: success"));
        assert!(!prompt.contains("Total with attribute"));
        assert!(prompt.contains("Cultural Connection: 6"));
    }

    #[test]
    fn action_prompt_shows_additive_total() {
        let attempt = Attempt {
            roll: Roll::new(9).unwrap(),
            total: 23,
            outcome: Outcome::Success,
        };
        let prompt = action_prompt(&olympiad(), &state(), &attempt);
        assert!(prompt.contains("Roll: 9/20"));
        assert!(prompt.contains("Total with attribute: 23"));
    }
}
