use crate::side::CoinSide;
use rand::{
    Rng,
    rngs::ThreadRng,
};

/// Source of flip outcomes. Implementations must not look at the player's
/// choice.
pub trait OutcomeSource {
    fn draw(&mut self) -> CoinSide;
}

/// Uniform draw over {heads, tails} backed by any `rand` generator.
#[derive(Clone, Debug)]
pub struct RandomOutcome<R = ThreadRng> {
    rng: R,
}

impl RandomOutcome<ThreadRng> {
    pub fn thread_local() -> Self {
        Self { rng: rand::rng() }
    }
}

impl<R: Rng> RandomOutcome<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> OutcomeSource for RandomOutcome<R> {
    fn draw(&mut self) -> CoinSide {
        CoinSide::from_bool(self.rng.random_bool(0.5))
    }
}

impl<T: OutcomeSource + ?Sized> OutcomeSource for &mut T {
    fn draw(&mut self) -> CoinSide {
        (**self).draw()
    }
}

impl<T: OutcomeSource + ?Sized> OutcomeSource for Box<T> {
    fn draw(&mut self) -> CoinSide {
        (**self).draw()
    }
}

/// Replays a fixed script of outcomes, cycling when exhausted.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Clone, Debug)]
pub struct ScriptedOutcomes {
    script: Vec<CoinSide>,
    cursor: usize,
}

#[cfg(any(test, feature = "test-helpers"))]
impl ScriptedOutcomes {
    pub fn new(script: impl Into<Vec<CoinSide>>) -> Self {
        Self {
            script: script.into(),
            cursor: 0,
        }
    }

    pub fn always(side: CoinSide) -> Self {
        Self::new(vec![side])
    }

    pub fn drawn(&self) -> usize {
        self.cursor
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl OutcomeSource for ScriptedOutcomes {
    fn draw(&mut self) -> CoinSide {
        let side = self
            .script
            .get(self.cursor % self.script.len().max(1))
            .copied()
            .unwrap_or(CoinSide::Heads);
        self.cursor += 1;
        side
    }
}
