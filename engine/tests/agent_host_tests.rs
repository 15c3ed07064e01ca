use engine::GameLogic;
use engine::agent::{AgentCommand, AgentHost, AgentResponse};

#[derive(Clone)]
struct Additive;

impl GameLogic for Additive {
    type State = i32;
    type Input = i32;
    type Event = String;

    fn initial_state(&self) -> Self::State {
        0
    }

    fn step(&self, state: &mut Self::State, input: Self::Input) -> Vec<Self::Event> {
        *state += input;
        vec![format!("added {input}")]
    }
}

#[test]
fn agent_host_steps_and_reports_state() {
    let mut host = AgentHost::new(Additive);

    let response = host.handle(AgentCommand::Step(5));
    match response {
        AgentResponse::State { step, state } => {
            assert_eq!(step, 1);
            assert_eq!(state, 5);
        }
        _ => panic!("expected state response"),
    }
}

#[test]
fn agent_host_reset_restores_initial_state() {
    let mut host = AgentHost::new(Additive);
    host.handle(AgentCommand::Step(3));

    let response = host.handle(AgentCommand::Reset);
    match response {
        AgentResponse::State { step, state } => {
            assert_eq!(step, 0);
            assert_eq!(state, 0);
        }
        _ => panic!("expected state response"),
    }
}

#[test]
fn agent_host_drains_events_once() {
    let mut host = AgentHost::new(Additive);
    host.handle(AgentCommand::Step(1));
    host.handle(AgentCommand::Step(2));

    match host.handle(AgentCommand::DrainEvents) {
        AgentResponse::Events { step, events } => {
            assert_eq!(step, 2);
            assert_eq!(events, vec!["added 1".to_string(), "added 2".to_string()]);
        }
        _ => panic!("expected events response"),
    }

    match host.handle(AgentCommand::DrainEvents) {
        AgentResponse::Events { events, .. } => assert!(events.is_empty()),
        _ => panic!("expected events response"),
    }
}
