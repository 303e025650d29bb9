//! Motivational messages shown after each phase change.

use rand::prelude::*;
use rand_pcg::Pcg64;

pub const DEFAULT_QUOTES: &[&str] = &[
    "Stay focused, stay present.",
    "Small steps every day.",
    "Deep work, big results.",
    "Breaks fuel your brain.",
    "Consistency beats intensity.",
    "You're building a habit!",
    "One Pomodoro at a time.",
];

/// Uniform, independent picks over a fixed pool.
#[derive(Debug, Clone)]
pub struct QuotePicker {
    quotes: &'static [&'static str],
    rng: Pcg64,
}

impl QuotePicker {
    /// `None` seeds from OS entropy. An empty pool falls back to the defaults.
    pub fn new(quotes: &'static [&'static str], seed: Option<u64>) -> Self {
        let quotes = if quotes.is_empty() {
            DEFAULT_QUOTES
        } else {
            quotes
        };
        let rng = match seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_entropy(),
        };
        Self { quotes, rng }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(DEFAULT_QUOTES, Some(seed))
    }

    /// Quote shown before the first transition.
    pub fn first(&self) -> &'static str {
        self.quotes[0]
    }

    pub fn pick(&mut self) -> &'static str {
        self.quotes
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(DEFAULT_QUOTES[0])
    }

    pub fn pool(&self) -> &'static [&'static str] {
        self.quotes
    }
}

impl Default for QuotePicker {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTES, None)
    }
}
