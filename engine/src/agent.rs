use crate::{GameLogic, HeadlessRunner};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentCommand<I> {
    Step(I),
    Reset,
    GetState,
    DrainEvents,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentResponse<S, E> {
    State { step: usize, state: S },
    Events { step: usize, events: Vec<E> },
}

pub struct AgentHost<G>
where
    G: GameLogic + Clone,
{
    game: G,
    runner: HeadlessRunner<G>,
}

impl<G> AgentHost<G>
where
    G: GameLogic + Clone,
    G::State: Clone,
{
    pub fn new(game: G) -> Self {
        let runner = HeadlessRunner::new(game.clone());
        Self { game, runner }
    }

    pub fn handle(&mut self, command: AgentCommand<G::Input>) -> AgentResponse<G::State, G::Event> {
        match command {
            AgentCommand::Step(input) => {
                let step = self.runner.step(input);
                AgentResponse::State {
                    step,
                    state: self.runner.state().clone(),
                }
            }
            AgentCommand::Reset => {
                self.runner = HeadlessRunner::new(self.game.clone());
                AgentResponse::State {
                    step: self.runner.steps(),
                    state: self.runner.state().clone(),
                }
            }
            AgentCommand::GetState => AgentResponse::State {
                step: self.runner.steps(),
                state: self.runner.state().clone(),
            },
            AgentCommand::DrainEvents => AgentResponse::Events {
                step: self.runner.steps(),
                events: self.runner.drain_events(),
            },
        }
    }

    pub fn runner(&self) -> &HeadlessRunner<G> {
        &self.runner
    }
}
