//! d20 sources. Production play draws a fresh roll per attempt; tests and
//! replays inject fixed or seeded sequences through the same trait.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

use crate::game::types::Roll;

pub trait DiceRoller {
    fn roll(&mut self) -> Roll;
}

/// Draw a uniform d20 from any rng.
pub fn roll_d20<R: Rng + ?Sized>(rng: &mut R) -> Roll {
    let value: u8 = rng.gen_range(Roll::MIN..=Roll::MAX);
    // gen_range stays within MIN..=MAX
    Roll::new(value).unwrap_or(Roll::NATURAL_ONE)
}

/// Fresh thread-local randomness for every roll.
#[derive(Debug, Default)]
pub struct ThreadRoller;

impl DiceRoller for ThreadRoller {
    fn roll(&mut self) -> Roll {
        roll_d20(&mut rand::thread_rng())
    }
}

/// Reproducible rolls from a fixed seed.
#[derive(Debug)]
pub struct SeededRoller {
    rng: StdRng,
}

impl SeededRoller {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DiceRoller for SeededRoller {
    fn roll(&mut self) -> Roll {
        roll_d20(&mut self.rng)
    }
}

/// Replays a scripted sequence, repeating the last roll once exhausted.
#[derive(Debug)]
pub struct FixedRoller {
    queue: VecDeque<Roll>,
    last: Roll,
}

impl FixedRoller {
    pub fn always(roll: Roll) -> Self {
        Self {
            queue: VecDeque::new(),
            last: roll,
        }
    }

    pub fn sequence(rolls: impl IntoIterator<Item = Roll>) -> Self {
        let queue: VecDeque<Roll> = rolls.into_iter().collect();
        let last = queue.back().copied().unwrap_or(Roll::NATURAL_ONE);
        Self { queue, last }
    }
}

impl DiceRoller for FixedRoller {
    fn roll(&mut self) -> Roll {
        if let Some(next) = self.queue.pop_front() {
            self.last = next;
        }
        self.last
    }
}
