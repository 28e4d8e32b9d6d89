use std::collections::HashMap;

use rand::seq::SliceRandom;

/// Where a player sits in the conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    AwaitingCommand,
    AwaitingGuess,
}

/// What the remaining order produced when asked for a subject.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextSubject {
    Subject(usize),
    Exhausted,
}

/// Per-user game progress. Lives for the process lifetime; ending a game
/// resets the counters but keeps the entry and its remaining-order progress.
#[derive(Clone, Debug)]
pub struct Player {
    round: u32,
    correct: u32,
    incorrect: u32,
    right_answer: Option<usize>,
    state: PlayerState,
    remaining: Vec<usize>,
}

impl Player {
    pub fn new(pool_size: usize) -> Self {
        Self {
            round: 0,
            correct: 0,
            incorrect: 0,
            right_answer: None,
            state: PlayerState::Idle,
            remaining: shuffled_indices(pool_size),
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn set_state(&mut self, state: PlayerState) {
        self.state = state;
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn correct(&self) -> u32 {
        self.correct
    }

    pub fn incorrect(&self) -> u32 {
        self.incorrect
    }

    pub fn right_answer(&self) -> Option<usize> {
        self.right_answer
    }

    pub fn remaining(&self) -> &[usize] {
        &self.remaining
    }

    pub fn record_correct(&mut self) {
        self.correct += 1;
    }

    pub fn record_incorrect(&mut self) {
        self.incorrect += 1;
    }

    pub fn bump_round(&mut self) {
        self.round += 1;
    }

    /// Ending a game zeroes the scores and drops back to the initial state.
    /// The remaining order is untouched so a returning player picks up the
    /// cycle where they left it.
    pub fn reset_game(&mut self) {
        self.round = 0;
        self.correct = 0;
        self.incorrect = 0;
        self.state = PlayerState::Idle;
    }

    /// Surfaces the front of the remaining order as the live subject. When
    /// the order was already consumed, a fresh full permutation is generated
    /// instead and the caller is told the cycle is exhausted; no subject is
    /// surfaced in that case.
    pub fn begin_round(&mut self, pool_size: usize) -> NextSubject {
        if self.remaining.is_empty() {
            self.remaining = shuffled_indices(pool_size);
            return NextSubject::Exhausted;
        }
        let subject = self.remaining[0];
        self.right_answer = Some(subject);
        NextSubject::Subject(subject)
    }

    /// Retires the current subject. While more than one entry remains the
    /// next one becomes live; otherwise the cycle is spent and a fresh
    /// permutation is generated for the next game.
    pub fn advance(&mut self, pool_size: usize) -> NextSubject {
        if self.remaining.len() > 1 {
            self.remaining.remove(0);
            let subject = self.remaining[0];
            self.right_answer = Some(subject);
            NextSubject::Subject(subject)
        } else {
            self.remaining = shuffled_indices(pool_size);
            NextSubject::Exhausted
        }
    }
}

/// Session storage keyed by user id. Owned by the engine; entries are
/// created lazily on first contact and never evicted.
#[derive(Debug, Default)]
pub struct SessionStore {
    players: HashMap<String, Player>,
}

impl SessionStore {
    pub fn player_mut(&mut self, user_id: &str, pool_size: usize) -> &mut Player {
        self.players.entry(user_id.to_owned()).or_insert_with(|| Player::new(pool_size))
    }

    pub fn get(&self, user_id: &str) -> Option<&Player> {
        self.players.get(user_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

fn shuffled_indices(pool_size: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..pool_size).collect();
    order.shuffle(&mut rand::thread_rng());
    order
}
