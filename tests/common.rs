//! Shared fixtures for integration tests.

use parentsim::game::{
    AchievementBook, ActionResolver, AttributeMode, FamilyBackground, FixedRoller, GameContext,
    GameSession, GameStore, GameStoreBuilder, ParentingStyle, Roll, ScriptedGenerator,
};
use tempfile::TempDir;

/// A fresh sled store in a temp dir. Keep the `TempDir` alive for the test.
#[allow(dead_code)]
pub fn temp_store() -> (TempDir, GameStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = GameStoreBuilder::new(dir.path().join("parentsim")).open().unwrap();
    (dir, store)
}

/// Threshold resolver, scripted content and fixed dice over an in-memory achievement book.
#[allow(dead_code)]
pub fn scripted_context(generator: ScriptedGenerator, rolls: &[u8]) -> GameContext {
    GameContext::new(
        ActionResolver::threshold(),
        Box::new(FixedRoller::sequence(
            rolls.iter().map(|v| Roll::new(*v).unwrap()),
        )),
        Box::new(generator),
        AchievementBook::in_memory().unwrap(),
    )
}

#[allow(dead_code)]
pub fn new_session() -> GameSession {
    GameSession::new_game(
        "Mei",
        ParentingStyle::Authoritarian,
        FamilyBackground::Immigrant,
        "Leo",
        AttributeMode::Fixed,
    )
}

/// Effect response in the generator's wire format.
#[allow(dead_code)]
pub fn effect_response(mood: i32, academic: i32, social: i32, cultural: i32) -> String {
    serde_json::json!({
        "description": "Something happens.",
        "effects": {
            "mood": mood,
            "academicPerformance": academic,
            "socialLife": social,
            "culturalConnection": cultural,
        }
    })
    .to_string()
}
