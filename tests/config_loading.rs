/// Config file loading and the collaborators built from it.
use parentsim::config::{Config, ResolutionKind};
use parentsim::game::{AttributeMode, DiceRoller};

#[tokio::test]
async fn loads_custom_game_section() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parentsim.toml");
    tokio::fs::write(
        &path,
        r#"
[game]
resolution = "additive"
pivot = 18
step = 2
requirement_threshold = 12
attribute_mode = "mutable"
default_child_name = "Ada"
seed = 5

[storage]
data_dir = "/tmp/parentsim-data"

[logging]
level = "debug"
"#,
    )
    .await
    .unwrap();

    let config = Config::load(path.to_str().unwrap()).await.unwrap();
    assert_eq!(config.game.resolution, ResolutionKind::Additive);
    assert_eq!(config.game.attribute_mode, AttributeMode::Mutable);
    assert_eq!(config.game.default_child_name, "Ada");
    assert_eq!(config.logging.file, None);

    let resolver = config.game.build_resolver();
    assert_eq!(resolver.policy().name(), "additive");
    assert_eq!(resolver.requirement_threshold(), 12);

    let mut a = config.game.build_roller();
    let mut b = config.game.build_roller();
    assert_eq!(a.roll(), b.roll());
}

#[tokio::test]
async fn rejects_unknown_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    tokio::fs::write(&path, "[game]\nresolution = \"vibes\"\n")
        .await
        .unwrap();
    assert!(Config::load(path.to_str().unwrap()).await.is_err());
}

#[tokio::test]
async fn default_file_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parentsim.toml");
    let path = path.to_str().unwrap();
    Config::create_default(path).await.unwrap();
    let text = tokio::fs::read_to_string(path).await.unwrap();
    assert!(text.contains("[game]"));
    let config = Config::load(path).await.unwrap();
    assert_eq!(config.game.resolution, ResolutionKind::Threshold);
    assert_eq!(config.game.seed, None);
}
