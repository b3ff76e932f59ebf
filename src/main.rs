//! Binary entrypoint for the parentsim CLI.
//!
//! Commands:
//! - `init` - write a starter `parentsim.toml`
//! - `new <user> <name> [--style] [--background] [--child] [--allocate attr=n]...` - create a game and save it
//! - `play <user> <save> [action] [--roll <n>]` - show the current scene, or take one action
//! - `saves <user>` - list a user's saves
//! - `achievements` - show unlocked and locked achievements
//! - `prompt <user> <save> [--action <id>] [--roll <n>]` - print the scene or action prompt an
//!   external generator would receive
//!
//! See the library crate docs for module-level details: `parentsim::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::info;

use parentsim::config::Config;
use parentsim::game::prompt::{
    action_prompt, scene_prompt, ACTION_SYSTEM_PROMPT, SCENE_SYSTEM_PROMPT,
};
use parentsim::game::{
    family_background_or_default, parenting_style_or_default, AchievementBook,
    AttributeAllocation, GameContext, GameSession, GameStore, Roll, ScriptedGenerator, TurnReport,
};
use parentsim::logutil::escape_log;

#[derive(Parser)]
#[command(name = "parentsim")]
#[command(about = "A narrative parenting simulation driven by d20 rolls")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "parentsim.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Create a new game and store it as a save
    New {
        user: String,
        /// Parent character name
        name: String,
        /// authoritative, authoritarian, permissive or uninvolved
        #[arg(short, long)]
        style: Option<String>,
        /// middle-class, working-class, upper-class or immigrant
        #[arg(short, long)]
        background: Option<String>,
        /// Child name (defaults to game.default_child_name)
        #[arg(long)]
        child: Option<String>,
        /// Spend creation points, e.g. `--allocate familyHonor=15` (repeatable)
        #[arg(short, long = "allocate", value_name = "ATTR=VALUE")]
        allocate: Vec<String>,
    },
    /// Show the current scene, or resolve one action from it
    Play {
        user: String,
        save: String,
        /// Action id from the current scene
        action: Option<String>,
        /// Use this d20 result instead of rolling
        #[arg(short, long)]
        roll: Option<u8>,
    },
    /// List saves for a user
    Saves { user: String },
    /// Show achievements
    Achievements,
    /// Print the scene-generation prompt for a save, or the outcome prompt for one action
    Prompt {
        user: String,
        save: String,
        /// Action id from the current scene
        #[arg(long)]
        action: Option<String>,
        /// Use this d20 result instead of rolling
        #[arg(short, long)]
        roll: Option<u8>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init = cli.command {
        init_logging(&None, cli.verbose);
        Config::create_default(&cli.config).await?;
        info!("Configuration file created at {}", cli.config);
        return Ok(());
    }

    let config = match Config::load(&cli.config).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} (using defaults; run `parentsim init` to create one)", e);
            Config::default()
        }
    };
    init_logging(&Some(config.clone()), cli.verbose);

    let store = GameStore::open(config.storage.sled_path())?;

    match cli.command {
        Commands::Init => {}
        Commands::New {
            user,
            name,
            style,
            background,
            child,
            allocate,
        } => {
            let style = parenting_style_or_default(style.as_deref());
            let background = family_background_or_default(background.as_deref());
            let child = child.unwrap_or_else(|| config.game.default_child_name.clone());
            let mut allocation = AttributeAllocation::new(style, background);
            for assignment in &allocate {
                allocation.allocate_str(assignment)?;
            }
            // seeds the default unlocks on first run
            AchievementBook::open(Box::new(store.clone()))?;
            let session = GameSession::from_allocation(
                &name,
                &allocation,
                &child,
                config.game.attribute_mode,
            );
            let record = store.create_save(&user, session.into_state())?;
            let state = &record.game_state;
            println!("save {}", record.id);
            println!(
                "{} ({}, {}) raising {} age {}",
                state.character.name,
                state.character.parenting_style,
                state.character.family_background,
                state.child.name,
                state.child.age
            );
            println!(
                "attributes: {:?} ({} points unspent)",
                state.character.attributes,
                allocation.remaining()
            );
            println!("child: {:?}", state.child.stats);
            if !state.character.skills.is_empty() {
                println!("skills: {}", state.character.skills.join(", "));
            }
        }
        Commands::Play {
            user,
            save,
            action,
            roll,
        } => {
            let mut record = store.get_save(&user, &save)?;
            let mut ctx = GameContext::new(
                config.game.build_resolver(),
                config.game.build_roller(),
                Box::new(ScriptedGenerator::new()),
                AchievementBook::open(Box::new(store.clone()))?,
            );
            let mut session =
                GameSession::from_state(record.game_state.clone(), config.game.attribute_mode);
            let scene = session.next_scene(&mut ctx)?;

            let Some(action_id) = action else {
                println!("{}", scene.description);
                for action in &scene.actions {
                    let requirement = action
                        .required_attribute
                        .map(|a| format!(" [{}]", a.label()))
                        .unwrap_or_default();
                    println!("  {}: {}{}", action.id, action.description, requirement);
                }
                return Ok(());
            };

            let report = match roll {
                Some(value) => {
                    let forced = Roll::new(value).map_err(|e| anyhow!("{}", e))?;
                    session.take_action_with_roll(&mut ctx, &action_id, forced)?
                }
                None => session.take_action(&mut ctx, &action_id)?,
            };
            record.game_state = session.into_state();
            store.put_save(record)?;
            print_report(&report);
        }
        Commands::Saves { user } => {
            let saves = store.list_saves(&user)?;
            if saves.is_empty() {
                println!("no saves for {}", user);
            }
            for record in saves {
                println!(
                    "{}  {}  turn {}  updated {}",
                    record.id,
                    escape_log(&record.game_state.character.name),
                    record.game_state.turn,
                    record.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Commands::Achievements => {
            let book = AchievementBook::open(Box::new(store.clone()))?;
            for achievement in book.unlocked_achievements() {
                println!("[x] {} {} - {}", achievement.icon, achievement.title, achievement.description);
            }
            for achievement in book.locked_achievements() {
                println!("[ ] {} {} - {}", achievement.icon, achievement.title, achievement.description);
            }
        }
        Commands::Prompt {
            user,
            save,
            action,
            roll,
        } => {
            let record = store.get_save(&user, &save)?;
            let Some(action_id) = action else {
                println!("{}\n", SCENE_SYSTEM_PROMPT);
                println!("{}", scene_prompt(&record.game_state));
                return Ok(());
            };
            let mut ctx = GameContext::new(
                config.game.build_resolver(),
                config.game.build_roller(),
                Box::new(ScriptedGenerator::new()),
                AchievementBook::open(Box::new(store.clone()))?,
            );
            let mut session =
                GameSession::from_state(record.game_state, config.game.attribute_mode);
            session.next_scene(&mut ctx)?;
            let forced = roll
                .map(|value| Roll::new(value).map_err(|e| anyhow!("{}", e)))
                .transpose()?;
            let (action, attempt) = session.roll_attempt(&mut ctx, &action_id, forced)?;
            println!("{}\n", ACTION_SYSTEM_PROMPT);
            println!("{}", action_prompt(&action, session.state(), &attempt));
        }
    }

    Ok(())
}

fn print_report(report: &TurnReport) {
    println!(
        "{}: rolled {} (total {}) -> {}",
        report.action_id, report.roll, report.total, report.outcome
    );
    println!("{}", report.narrative);
    println!("effect: {:?}", report.effect);
    println!("child: {:?}", report.stats_after);
    for id in &report.unlocked {
        let achievement = id.definition();
        println!("achievement unlocked: {} {}", achievement.icon, achievement.title);
    }
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let configured = config
        .as_ref()
        .and_then(|cfg| cfg.logging.level.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    let base_level = match verbosity {
        0 => configured,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });

    if let Some(file) = log_file {
        let file = std::sync::Mutex::new(file);
        // Console output only when attached to a terminal
        let is_tty = atty::is(atty::Stream::Stderr);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = file.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
