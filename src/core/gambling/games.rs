// Gambling games. Pure outcome logic; the caller validates the stake and
// applies the profit through the economy service.

use rand::Rng;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinSide {
    Heads,
    Tails,
}

impl CoinSide {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "heads" | "head" | "h" => Some(CoinSide::Heads),
            "tails" | "tail" | "t" => Some(CoinSide::Tails),
            _ => None,
        }
    }
}

impl fmt::Display for CoinSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CoinSide::Heads => "heads",
            CoinSide::Tails => "tails",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hand {
    Rock,
    Paper,
    Scissors,
}

impl Hand {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "rock" | "rocks" | "r" => Some(Hand::Rock),
            "paper" | "papers" | "p" => Some(Hand::Paper),
            "scissors" | "scissor" | "s" => Some(Hand::Scissors),
            _ => None,
        }
    }

    pub fn beats(&self, other: Hand) -> bool {
        matches!(
            (self, other),
            (Hand::Rock, Hand::Scissors) | (Hand::Paper, Hand::Rock) | (Hand::Scissors, Hand::Paper)
        )
    }

    fn random(rng: &mut impl Rng) -> Self {
        match rng.gen_range(0..3) {
            0 => Hand::Rock,
            1 => Hand::Paper,
            _ => Hand::Scissors,
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Hand::Rock => "rock",
            Hand::Paper => "paper",
            Hand::Scissors => "scissors",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
    Tied,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Won => "won",
            Outcome::Lost => "lost",
            Outcome::Tied => "tied",
        })
    }
}

/// One settled game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round<T> {
    pub rolled: T,
    pub outcome: Outcome,
    /// Signed balance change: `+stake`, `-stake` or 0.
    pub profit: i64,
}

impl<T> Round<T> {
    fn settle(rolled: T, outcome: Outcome, stake: i64) -> Self {
        let profit = match outcome {
            Outcome::Won => stake,
            Outcome::Lost => -stake,
            Outcome::Tied => 0,
        };
        Self {
            rolled,
            outcome,
            profit,
        }
    }

    /// Balance after applying this round to `balance`.
    pub fn balance_after(&self, balance: i64) -> i64 {
        balance + self.profit
    }
}

pub fn flip_coin(bet: CoinSide, stake: i64, rng: &mut impl Rng) -> Round<CoinSide> {
    let rolled = if rng.gen_bool(0.5) {
        CoinSide::Heads
    } else {
        CoinSide::Tails
    };
    let outcome = if rolled == bet {
        Outcome::Won
    } else {
        Outcome::Lost
    };
    Round::settle(rolled, outcome, stake)
}

pub fn play_rps(bet: Hand, stake: i64, rng: &mut impl Rng) -> Round<Hand> {
    let rolled = Hand::random(rng);
    let outcome = if bet == rolled {
        Outcome::Tied
    } else if bet.beats(rolled) {
        Outcome::Won
    } else {
        Outcome::Lost
    };
    Round::settle(rolled, outcome, stake)
}
