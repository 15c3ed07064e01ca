pub mod agent;
pub mod editor;
pub mod fingerprint;
pub mod history;
pub mod ticker;

pub use history::History;
pub use ticker::IntervalTicker;

/// A deterministic, command-driven game.
///
/// `step` mutates the state in place and reports whatever the command emitted.
/// Commands are applied one at a time; nothing inside a step is interleaved
/// with another step.
pub trait GameLogic {
    type State;
    type Input;
    type Event;

    fn initial_state(&self) -> Self::State;
    fn step(&self, state: &mut Self::State, input: Self::Input) -> Vec<Self::Event>;
}

#[derive(Debug)]
pub struct HeadlessRunner<G: GameLogic> {
    game: G,
    state: G::State,
    steps: usize,
    events: Vec<G::Event>,
}

impl<G: GameLogic> HeadlessRunner<G> {
    pub fn new(game: G) -> Self {
        let state = game.initial_state();
        Self::from_state(game, state)
    }

    pub fn from_state(game: G, state: G::State) -> Self {
        Self {
            game,
            state,
            steps: 0,
            events: Vec::new(),
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn state(&self) -> &G::State {
        &self.state
    }

    /// Pending events, oldest first.
    pub fn events(&self) -> &[G::Event] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<G::Event> {
        std::mem::take(&mut self.events)
    }

    pub fn step(&mut self, input: G::Input) -> usize {
        let emitted = self.game.step(&mut self.state, input);
        self.events.extend(emitted);
        self.steps += 1;
        self.steps
    }

    pub fn run<I>(&mut self, inputs: I) -> usize
    where
        I: IntoIterator<Item = G::Input>,
    {
        for input in inputs {
            self.step(input);
        }
        self.steps
    }

    pub fn reset(&mut self) {
        self.state = self.game.initial_state();
        self.steps = 0;
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Additive;

    impl GameLogic for Additive {
        type State = i32;
        type Input = i32;
        type Event = i32;

        fn initial_state(&self) -> Self::State {
            0
        }

        fn step(&self, state: &mut Self::State, input: Self::Input) -> Vec<Self::Event> {
            *state += input;
            if input == 0 { Vec::new() } else { vec![*state] }
        }
    }

    #[test]
    fn runner_steps_and_collects_events() {
        let mut runner = HeadlessRunner::new(Additive);
        runner.run([1, 0, 2, 3]);
        assert_eq!(runner.steps(), 4);
        assert_eq!(runner.state(), &6);
        assert_eq!(runner.events(), &[1, 3, 6]);

        assert_eq!(runner.drain_events(), vec![1, 3, 6]);
        assert!(runner.events().is_empty());
    }

    #[test]
    fn reset_restores_initial_state_and_drops_events() {
        let mut runner = HeadlessRunner::new(Additive);
        runner.step(5);
        runner.reset();
        assert_eq!(runner.state(), &0);
        assert_eq!(runner.steps(), 0);
        assert!(runner.events().is_empty());
    }

    #[test]
    fn from_state_starts_at_given_state() {
        let mut runner = HeadlessRunner::from_state(Additive, 10);
        runner.step(1);
        assert_eq!(runner.state(), &11);
    }
}
