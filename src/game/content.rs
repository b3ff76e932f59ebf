//! Content generator boundary.
//!
//! Scenes and effect proposals come from an external collaborator (an LLM in
//! the hosted game). Raw responses are parsed exactly once, here, into the
//! crate's single [`Scene`]/[`Action`] schema; nothing downstream sees the
//! generator's wire shape.

use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{HashSet, VecDeque};

use crate::game::errors::GameError;
use crate::game::types::{Action, Attribute, ChildStat, GameState, Outcome, Roll, Scene};

pub const MIN_SCENE_ACTIONS: usize = 3;
pub const MAX_SCENE_ACTIONS: usize = 5;

/// Raw effect proposal plus whatever narration came with it.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectProposal {
    pub narrative: Option<String>,
    /// Unvalidated deltas; the resolver checks their shape.
    pub effects: Value,
}

/// The dice side of an action attempt, as handed to the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    pub roll: Roll,
    /// What the outcome was scored on: the bare roll under the threshold
    /// policy, roll plus attribute under the additive one.
    pub total: i32,
    pub outcome: Outcome,
}

impl Attempt {
    /// An attempt scored on the bare roll.
    pub fn natural(roll: Roll, outcome: Outcome) -> Self {
        Self {
            roll,
            total: i32::from(roll.value()),
            outcome,
        }
    }
}

pub trait ContentGenerator {
    fn generate_scene(&mut self, state: &GameState) -> Result<Scene, GameError>;

    fn propose_effect(
        &mut self,
        action: &Action,
        state: &GameState,
        attempt: &Attempt,
    ) -> Result<EffectProposal, GameError>;
}

/// Check the scene contract: a description, 3..=5 actions, unique non-empty ids.
pub fn validate_scene(scene: &Scene) -> Result<(), GameError> {
    if scene.description.trim().is_empty() {
        return Err(GameError::MalformedScene("scene has no description".into()));
    }
    let count = scene.actions.len();
    if !(MIN_SCENE_ACTIONS..=MAX_SCENE_ACTIONS).contains(&count) {
        return Err(GameError::MalformedScene(format!(
            "expected {}..={} actions, got {}",
            MIN_SCENE_ACTIONS, MAX_SCENE_ACTIONS, count
        )));
    }
    let mut seen = HashSet::new();
    for action in &scene.actions {
        if action.id.trim().is_empty() {
            return Err(GameError::MalformedScene("action with empty id".into()));
        }
        if !seen.insert(action.id.as_str()) {
            return Err(GameError::MalformedScene(format!(
                "duplicate action id '{}'",
                action.id
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct RawScene {
    description: String,
    actions: Vec<RawAction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAction {
    id: String,
    description: String,
    #[serde(default)]
    required_attribute: Option<String>,
    #[serde(default)]
    required_skill: Option<String>,
    #[serde(default)]
    success_text: String,
    #[serde(default)]
    failure_text: String,
}

/// Generators echo the template placeholder for absent requirements.
fn optional_field(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("optional") && !s.eq_ignore_ascii_case("none"))
}

impl TryFrom<RawAction> for Action {
    type Error = GameError;

    fn try_from(raw: RawAction) -> Result<Self, Self::Error> {
        let required_attribute = match optional_field(raw.required_attribute) {
            Some(name) => Some(name.parse::<Attribute>().map_err(|_| {
                GameError::MalformedScene(format!(
                    "action '{}' requires unknown attribute '{}'",
                    raw.id, name
                ))
            })?),
            None => None,
        };
        Ok(Action {
            id: raw.id,
            description: raw.description,
            required_attribute,
            required_skill: optional_field(raw.required_skill),
            success_text: raw.success_text,
            failure_text: raw.failure_text,
        })
    }
}

/// Parse a generator's scene response into a validated [`Scene`].
pub fn parse_scene_response(raw: &str) -> Result<Scene, GameError> {
    let parsed: RawScene = serde_json::from_str(raw.trim())
        .map_err(|e| GameError::MalformedScene(format!("unparseable scene: {}", e)))?;
    let actions = parsed
        .actions
        .into_iter()
        .map(Action::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let scene = Scene {
        description: parsed.description,
        actions,
    };
    validate_scene(&scene)?;
    Ok(scene)
}

/// Parse a generator's action-result response. The `effects` member is
/// required but left unvalidated for the resolver.
pub fn parse_effect_response(raw: &str) -> Result<EffectProposal, GameError> {
    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| GameError::MalformedEffect(format!("unparseable effect: {}", e)))?;
    let object = value
        .as_object()
        .ok_or_else(|| GameError::MalformedEffect("effect response is not an object".into()))?;
    let effects = object
        .get("effects")
        .cloned()
        .ok_or_else(|| GameError::MalformedEffect("effect response has no 'effects'".into()))?;
    let narrative = object
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|s| !s.trim().is_empty());
    Ok(EffectProposal { narrative, effects })
}

fn scripted_action(
    id: &str,
    description: &str,
    attribute: Option<Attribute>,
    success: &str,
    failure: &str,
) -> Action {
    Action {
        id: id.to_string(),
        description: description.to_string(),
        required_attribute: attribute,
        required_skill: None,
        success_text: success.to_string(),
        failure_text: failure.to_string(),
    }
}

fn default_deck() -> Vec<Scene> {
    vec![
        Scene {
            description: "Report cards came home today. A B+ in maths sits in the middle of the page.".into(),
            actions: vec![
                scripted_action(
                    "extra-worksheets",
                    "Assign two extra worksheets every evening",
                    Some(Attribute::AcademicPressure),
                    "The next quiz comes back with full marks.",
                    "The worksheets end up crumpled behind the sofa.",
                ),
                scripted_action(
                    "call-teacher",
                    "Call the teacher to ask where the missing points went",
                    Some(Attribute::SocialEngineering),
                    "The teacher agrees to a retest.",
                    "The teacher now greets you with visible caution.",
                ),
                scripted_action(
                    "ice-cream",
                    "Take everyone out for ice cream anyway",
                    None,
                    "Your child talks about school for a whole hour.",
                    "Nobody mentions the report card, which is its own message.",
                ),
            ],
        },
        Scene {
            description: "A classmate's birthday party clashes with Saturday piano practice.".into(),
            actions: vec![
                scripted_action(
                    "practice-first",
                    "Insist on practice before any party",
                    Some(Attribute::TigerDiscipline),
                    "Scales first, cake later, and both go well.",
                    "Practice happens in silence and the party is missed.",
                ),
                scripted_action(
                    "vet-guests",
                    "Find out who else is going before deciding",
                    Some(Attribute::SocialEngineering),
                    "The guest list includes the principal's daughter. Perfect.",
                    "Your questions get back to the other parents.",
                ),
                scripted_action(
                    "grandma-story",
                    "Remind them how grandma practised on a cardboard keyboard",
                    Some(Attribute::FamilyHonor),
                    "They practise with new seriousness.",
                    "The story earns an eye roll.",
                ),
                scripted_action(
                    "let-go",
                    "Let them go to the party",
                    Some(Attribute::EmotionalTactics),
                    "They come home happy and practise on their own.",
                    "They come home late and sugar-crashed.",
                ),
            ],
        },
        Scene {
            description: "The family budget has room for exactly one enrichment activity this term.".into(),
            actions: vec![
                scripted_action(
                    "coding-camp",
                    "Enrol them in the competitive coding camp",
                    Some(Attribute::ResourceManagement),
                    "A scholarship covers half of next term.",
                    "The camp is mostly snacks and a broken projector.",
                ),
                scripted_action(
                    "language-school",
                    "Choose weekend heritage language school",
                    Some(Attribute::FamilyHonor),
                    "They surprise the relatives on the next video call.",
                    "They learn mostly how to sleep sitting up.",
                ),
                scripted_action(
                    "guilt-trip",
                    "Explain at length what you gave up so they could have this choice",
                    Some(Attribute::EmotionalTactics),
                    "They pick the option you wanted, enthusiastically.",
                    "They pick nothing and close their door.",
                ),
            ],
        },
    ]
}

/// Deterministic offline generator.
///
/// Queued raw responses are served first, through the same parsers an
/// external generator would use. Once the queues are empty, scenes come from
/// a built-in deck (indexed by turn) and effects are derived from the outcome.
#[derive(Debug, Clone)]
pub struct ScriptedGenerator {
    deck: Vec<Scene>,
    scene_responses: VecDeque<String>,
    effect_responses: VecDeque<String>,
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self {
            deck: default_deck(),
            scene_responses: VecDeque::new(),
            effect_responses: VecDeque::new(),
        }
    }

    /// Replace the built-in deck. Every scene must satisfy the scene contract.
    pub fn with_deck(deck: Vec<Scene>) -> Result<Self, GameError> {
        if deck.is_empty() {
            return Err(GameError::MalformedScene("empty scene deck".into()));
        }
        for scene in &deck {
            validate_scene(scene)?;
        }
        Ok(Self {
            deck,
            ..Self::new()
        })
    }

    pub fn with_scene_responses<I, S>(mut self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scene_responses.extend(responses.into_iter().map(Into::into));
        self
    }

    pub fn with_effect_responses<I, S>(mut self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.effect_responses.extend(responses.into_iter().map(Into::into));
        self
    }

    pub fn deck(&self) -> &[Scene] {
        &self.deck
    }

    fn derived_effects(action: &Action, outcome: Outcome) -> Value {
        let mut deltas = [0i32; 4];
        let slot = |stat: ChildStat| ChildStat::ALL.iter().position(|s| *s == stat).unwrap_or(0);
        match (action.required_attribute, outcome) {
            (Some(attribute), Outcome::Success) => {
                deltas[slot(attribute.primary_stat())] += 4;
                deltas[slot(ChildStat::Mood)] += 1;
            }
            (Some(attribute), Outcome::Failure) => {
                deltas[slot(attribute.primary_stat())] -= 3;
                deltas[slot(ChildStat::Mood)] -= 2;
            }
            (None, Outcome::Success) => deltas[slot(ChildStat::Mood)] += 2,
            (None, Outcome::Failure) => deltas[slot(ChildStat::Mood)] -= 2,
        }
        let mut effects = serde_json::Map::new();
        for (stat, delta) in ChildStat::ALL.into_iter().zip(deltas) {
            effects.insert(stat.key().to_string(), json!(delta));
        }
        Value::Object(effects)
    }
}

impl ContentGenerator for ScriptedGenerator {
    fn generate_scene(&mut self, state: &GameState) -> Result<Scene, GameError> {
        if let Some(raw) = self.scene_responses.pop_front() {
            return parse_scene_response(&raw);
        }
        let index = state.turn as usize % self.deck.len().max(1);
        self.deck
            .get(index)
            .cloned()
            .ok_or_else(|| GameError::MalformedScene("empty scene deck".into()))
    }

    fn propose_effect(
        &mut self,
        action: &Action,
        _state: &GameState,
        attempt: &Attempt,
    ) -> Result<EffectProposal, GameError> {
        if let Some(raw) = self.effect_responses.pop_front() {
            return parse_effect_response(&raw);
        }
        let outcome = attempt.outcome;
        let narrative = match outcome {
            Outcome::Success => action.success_text.clone(),
            Outcome::Failure => action.failure_text.clone(),
        };
        Ok(EffectProposal {
            narrative: Some(narrative).filter(|s| !s.is_empty()),
            effects: Self::derived_effects(action, outcome),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::resolver::validate_effect;
    use crate::game::types::{ActionEffect, ChildStats, Child, Character, CharacterAttributes};

    fn state(turn: u32) -> GameState {
        GameState {
            character: Character {
                name: "Mei".into(),
                parenting_style: Default::default(),
                family_background: Default::default(),
                attributes: CharacterAttributes::default(),
                skills: Vec::new(),
            },
            child: Child {
                name: "Leo".into(),
                age: 8,
                stats: ChildStats::default(),
            },
            turn,
        }
    }

    const SCENE: &str = r#"{
        "description": "Dinner with the relatives",
        "actions": [
            {"id": "a1", "description": "Mention the spelling bee", "requiredAttribute": "familyHonor",
             "requiredSkill": "optional", "successText": "Applause", "failureText": "Silence"},
            {"id": "a2", "description": "Change the subject", "requiredAttribute": "optional",
             "successText": "Relief", "failureText": "Awkward"},
            {"id": "a3", "description": "Bring out the certificates", "requiredAttribute": "",
             "requiredSkill": "Relative Comparison", "successText": "Envy", "failureText": "Eye rolls"}
        ]
    }"#;

    #[test]
    fn scene_response_parses_placeholders_as_absent() {
        let scene = parse_scene_response(SCENE).unwrap();
        assert_eq!(scene.actions.len(), 3);
        assert_eq!(scene.actions[0].required_attribute, Some(Attribute::FamilyHonor));
        assert_eq!(scene.actions[0].required_skill, None);
        assert_eq!(scene.actions[1].required_attribute, None);
        assert_eq!(scene.actions[2].required_attribute, None);
        assert_eq!(scene.actions[2].required_skill.as_deref(), Some("Relative Comparison"));
    }

    #[test]
    fn scene_response_rejects_bad_shapes() {
        let two = r#"{"description": "x", "actions": [
            {"id": "a", "description": "a"}, {"id": "b", "description": "b"}]}"#;
        assert!(matches!(parse_scene_response(two), Err(GameError::MalformedScene(_))));

        let dup = r#"{"description": "x", "actions": [
            {"id": "a", "description": "a"}, {"id": "a", "description": "b"}, {"id": "c", "description": "c"}]}"#;
        assert!(matches!(parse_scene_response(dup), Err(GameError::MalformedScene(_))));

        let unknown = SCENE.replace("familyHonor", "charisma");
        assert!(matches!(parse_scene_response(&unknown), Err(GameError::MalformedScene(_))));

        assert!(matches!(parse_scene_response("not json"), Err(GameError::MalformedScene(_))));
    }

    #[test]
    fn effect_response_requires_effects() {
        let ok = parse_effect_response(
            r#"{"description": "They ace it", "effects": {"mood": 2, "academicPerformance": 5, "socialLife": 0, "culturalConnection": -1}}"#,
        )
        .unwrap();
        assert_eq!(ok.narrative.as_deref(), Some("They ace it"));
        assert_eq!(validate_effect(&ok.effects).unwrap(), ActionEffect::new(2, 5, 0, -1));

        assert!(matches!(
            parse_effect_response(r#"{"description": "no effects"}"#),
            Err(GameError::MalformedEffect(_))
        ));
        assert!(matches!(parse_effect_response("[1,2]"), Err(GameError::MalformedEffect(_))));
    }

    #[test]
    fn deck_cycles_by_turn() {
        let mut generator = ScriptedGenerator::new();
        let len = generator.deck().len() as u32;
        let first = generator.generate_scene(&state(0)).unwrap();
        let again = generator.generate_scene(&state(len)).unwrap();
        assert_eq!(first, again);
        for scene in generator.deck() {
            validate_scene(scene).unwrap();
        }
    }

    #[test]
    fn queued_responses_come_first() {
        let mut generator = ScriptedGenerator::new()
            .with_scene_responses([SCENE])
            .with_effect_responses([r#"{"effects": {"mood": 9}}"#]);
        let scene = generator.generate_scene(&state(0)).unwrap();
        assert_eq!(scene.description, "Dinner with the relatives");
        let proposal = generator
            .propose_effect(
                &scene.actions[0],
                &state(0),
                &Attempt::natural(Roll::new(12).unwrap(), Outcome::Success),
            )
            .unwrap();
        assert!(validate_effect(&proposal.effects).is_err());
        assert_ne!(generator.generate_scene(&state(0)).unwrap(), scene);
    }

    #[test]
    fn derived_effects_follow_primary_stat() {
        let mut generator = ScriptedGenerator::new();
        let scene = generator.generate_scene(&state(0)).unwrap();
        let worksheets = &scene.actions[0];
        let roll = Roll::new(15).unwrap();
        let win = generator
            .propose_effect(worksheets, &state(0), &Attempt::natural(roll, Outcome::Success))
            .unwrap();
        assert_eq!(validate_effect(&win.effects).unwrap(), ActionEffect::new(1, 4, 0, 0));
        assert_eq!(win.narrative.as_deref(), Some(worksheets.success_text.as_str()));

        let loss = generator
            .propose_effect(worksheets, &state(0), &Attempt::natural(roll, Outcome::Failure))
            .unwrap();
        assert_eq!(validate_effect(&loss.effects).unwrap(), ActionEffect::new(-2, -3, 0, 0));
    }

    #[test]
    fn custom_deck_must_be_valid() {
        assert!(ScriptedGenerator::with_deck(Vec::new()).is_err());
        let short = Scene {
            description: "short".into(),
            actions: vec![scripted_action("a", "a", None, "", "")],
        };
        assert!(ScriptedGenerator::with_deck(vec![short]).is_err());
    }
}
