//! Achievement registry, threshold evaluation and the persistent unlock book.
//!
//! Unlocks are one-way: once an id is in the book it is never removed, and
//! reloading always unions the stored list with the default unlocks.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use crate::game::errors::GameError;
use crate::game::types::ChildStats;

/// Namespace key the unlock list is stored under.
pub const ACHIEVEMENT_NAMESPACE: &str = "game_achievements";

/// Academic performance needed for HARD_WORKER.
pub const HARD_WORKER_THRESHOLD: i32 = 15;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AchievementId {
    HardWorker,
    RatRacerKing,
    OfferClaimer,
    MentorMaster,
    WorkLifeHero,
}

/// Unlocked on first initialization without any gameplay.
pub const DEFAULT_UNLOCKED: &[AchievementId] = &[AchievementId::OfferClaimer];

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

const HARD_WORKER: Achievement = Achievement {
    id: "hard_worker",
    title: "Hard Worker",
    description: "Reached academic performance of 15",
    icon: "📚",
    color: "#BB86FC",
};

const RAT_RACER_KING: Achievement = Achievement {
    id: "rat_racer_king",
    title: "Rat Racer King",
    description: "Master of the corporate ladder",
    icon: "👑",
    color: "#BB86FC",
};

const OFFER_CLAIMER: Achievement = Achievement {
    id: "offer_claimer",
    title: "Offer Claimer",
    description: "Successfully turned your skills into a dream offer",
    icon: "📝",
    color: "#03DAC6",
};

const MENTOR_MASTER: Achievement = Achievement {
    id: "mentor_master",
    title: "Mentor Master",
    description: "Guided others to success",
    icon: "🎓",
    color: "#FFD54F",
};

const WORK_LIFE_HERO: Achievement = Achievement {
    id: "work_life_hero",
    title: "Work-Life Hero",
    description: "Achieved perfect balance in career and life",
    icon: "⚖️",
    color: "#CF6679",
};

/// Stats before and after a single mutation.
#[derive(Debug, Clone, Copy)]
pub struct StatTransition<'a> {
    pub previous: &'a ChildStats,
    pub current: &'a ChildStats,
}

type UnlockRule = fn(&StatTransition<'_>) -> bool;

fn hard_worker_rule(t: &StatTransition<'_>) -> bool {
    t.current.academic_performance >= HARD_WORKER_THRESHOLD
}

impl AchievementId {
    pub const ALL: [AchievementId; 5] = [
        AchievementId::HardWorker,
        AchievementId::RatRacerKing,
        AchievementId::OfferClaimer,
        AchievementId::MentorMaster,
        AchievementId::WorkLifeHero,
    ];

    pub fn key(self) -> &'static str {
        match self {
            AchievementId::HardWorker => "HARD_WORKER",
            AchievementId::RatRacerKing => "RAT_RACER_KING",
            AchievementId::OfferClaimer => "OFFER_CLAIMER",
            AchievementId::MentorMaster => "MENTOR_MASTER",
            AchievementId::WorkLifeHero => "WORK_LIFE_HERO",
        }
    }

    pub fn definition(self) -> &'static Achievement {
        match self {
            AchievementId::HardWorker => &HARD_WORKER,
            AchievementId::RatRacerKing => &RAT_RACER_KING,
            AchievementId::OfferClaimer => &OFFER_CLAIMER,
            AchievementId::MentorMaster => &MENTOR_MASTER,
            AchievementId::WorkLifeHero => &WORK_LIFE_HERO,
        }
    }

    /// Gameplay predicate, if this achievement can be earned through stat changes.
    fn rule(self) -> Option<UnlockRule> {
        match self {
            AchievementId::HardWorker => Some(hard_worker_rule),
            _ => None,
        }
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for AchievementId {
    type Err = GameError;

    /// Accepts either the registry key (`HARD_WORKER`) or the record id (`hard_worker`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        AchievementId::ALL
            .into_iter()
            .find(|id| id.key().eq_ignore_ascii_case(trimmed) || id.definition().id == trimmed)
            .ok_or_else(|| GameError::Validation(format!("unknown achievement '{}'", s)))
    }
}

/// Achievements newly unlocked by moving from `previous` to `current`.
///
/// Pure: ids already in `already_unlocked` are never returned, so repeated
/// calls with the same inputs give the same answer.
pub fn evaluate(
    previous: &ChildStats,
    current: &ChildStats,
    already_unlocked: &BTreeSet<AchievementId>,
) -> BTreeSet<AchievementId> {
    let transition = StatTransition { previous, current };
    AchievementId::ALL
        .into_iter()
        .filter(|id| !already_unlocked.contains(id))
        .filter(|id| id.rule().is_some_and(|rule| rule(&transition)))
        .collect()
}

/// Client-local storage for the unlock list.
pub trait AchievementStore {
    fn load_unlocked(&self) -> Result<Vec<String>, GameError>;
    fn save_unlocked(&self, ids: &[String]) -> Result<(), GameError>;
}

/// Shared in-memory store; clones see the same list.
#[derive(Debug, Clone, Default)]
pub struct MemoryAchievementStore {
    ids: Arc<Mutex<Vec<String>>>,
}

impl MemoryAchievementStore {
    pub fn with_ids(ids: &[&str]) -> Self {
        Self {
            ids: Arc::new(Mutex::new(ids.iter().map(|s| s.to_string()).collect())),
        }
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.ids.lock().map(|ids| ids.clone()).unwrap_or_default()
    }
}

impl AchievementStore for MemoryAchievementStore {
    fn load_unlocked(&self) -> Result<Vec<String>, GameError> {
        Ok(self.snapshot())
    }

    fn save_unlocked(&self, ids: &[String]) -> Result<(), GameError> {
        match self.ids.lock() {
            Ok(mut guard) => {
                *guard = ids.to_vec();
                Ok(())
            }
            Err(poisoned) => {
                *poisoned.into_inner() = ids.to_vec();
                Ok(())
            }
        }
    }
}

/// The process-wide unlock set, backed by an [`AchievementStore`].
pub struct AchievementBook {
    unlocked: BTreeSet<AchievementId>,
    /// Stored ids this build does not know; written back untouched.
    foreign: BTreeSet<String>,
    store: Box<dyn AchievementStore>,
}

impl fmt::Debug for AchievementBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AchievementBook")
            .field("unlocked", &self.unlocked)
            .field("foreign", &self.foreign)
            .finish()
    }
}

impl AchievementBook {
    /// Load the stored list, union it with [`DEFAULT_UNLOCKED`] and persist the result.
    pub fn open(store: Box<dyn AchievementStore>) -> Result<Self, GameError> {
        let stored = store.load_unlocked()?;
        let mut unlocked = BTreeSet::new();
        let mut foreign = BTreeSet::new();
        for raw in stored {
            match raw.parse::<AchievementId>() {
                Ok(id) => {
                    unlocked.insert(id);
                }
                Err(_) => {
                    warn!("keeping unrecognised achievement id '{}'", raw);
                    foreign.insert(raw);
                }
            }
        }
        unlocked.extend(DEFAULT_UNLOCKED.iter().copied());
        let book = Self {
            unlocked,
            foreign,
            store,
        };
        book.persist()?;
        Ok(book)
    }

    pub fn in_memory() -> Result<Self, GameError> {
        Self::open(Box::new(MemoryAchievementStore::default()))
    }

    fn persist(&self) -> Result<(), GameError> {
        let ids: Vec<String> = self
            .unlocked
            .iter()
            .map(|id| id.key().to_string())
            .chain(self.foreign.iter().cloned())
            .collect();
        self.store.save_unlocked(&ids)
    }

    /// Unlock `id`; returns false if it was already unlocked.
    pub fn unlock(&mut self, id: AchievementId) -> Result<bool, GameError> {
        if !self.unlocked.insert(id) {
            return Ok(false);
        }
        if let Err(e) = self.persist() {
            self.unlocked.remove(&id);
            return Err(e);
        }
        info!("achievement unlocked: {} ({})", id, id.definition().title);
        Ok(true)
    }

    /// Evaluate a stat transition and record whatever it unlocks.
    pub fn record_transition(
        &mut self,
        previous: &ChildStats,
        current: &ChildStats,
    ) -> Result<BTreeSet<AchievementId>, GameError> {
        let newly = evaluate(previous, current, &self.unlocked);
        if newly.is_empty() {
            return Ok(newly);
        }
        self.unlocked.extend(newly.iter().copied());
        if let Err(e) = self.persist() {
            for id in &newly {
                self.unlocked.remove(id);
            }
            return Err(e);
        }
        for id in &newly {
            info!("achievement unlocked: {} ({})", id, id.definition().title);
        }
        Ok(newly)
    }

    pub fn has(&self, id: AchievementId) -> bool {
        self.unlocked.contains(&id)
    }

    pub fn unlocked_ids(&self) -> &BTreeSet<AchievementId> {
        &self.unlocked
    }

    pub fn unlocked_achievements(&self) -> Vec<&'static Achievement> {
        self.unlocked.iter().map(|id| id.definition()).collect()
    }

    pub fn locked_achievements(&self) -> Vec<&'static Achievement> {
        AchievementId::ALL
            .into_iter()
            .filter(|id| !self.unlocked.contains(id))
            .map(|id| id.definition())
            .collect()
    }
}
