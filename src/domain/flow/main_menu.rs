/// Store main menu flow
///
/// Two-turn conversation: greet the caller and gather one digit, then
/// answer the selected menu option and hang up.
use super::{CallFlow, CallRequest, FlowTurn};
use crate::domain::shared::{FlowError, Result};
use crate::domain::twiml::{Gather, Say, TwimlResponse};
use tracing::warn;

const WELCOME: &str = "Welcome to TPS.";
const MENU_STORE_HOURS: &str = "For store hours, press 1.";
const MENU_AGENT: &str = "To speak to an agent, press 2.";
const MENU_PACKAGE_STATUS: &str = "To check your package status, press 3.";
const NO_INPUT: &str = "Sorry, I didn't get your response.";
const STORE_HOURS: &str = "Our store hours are 8 AM to 8 PM everyday.";
const CONNECT_AGENT: &str = "Let me connect you to an agent.";

/// Menu flow state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    /// Initial state, greeting not yet played
    Greeting,
    /// Greeting played, waiting for the caller's digit
    AwaitingDigit,
    /// Conversation over
    Done,
}

/// Advance the menu by one turn
///
/// Pure transition: the current state and the caller's request map to
/// the next state and the response for this turn.
pub fn transition(state: MenuState, request: &CallRequest) -> Result<(MenuState, FlowTurn)> {
    match state {
        MenuState::Greeting => Ok((MenuState::AwaitingDigit, greeting_turn())),
        MenuState::AwaitingDigit => {
            let turn = menu_selection_turn(request)?;
            Ok((MenuState::Done, turn))
        }
        MenuState::Done => Err(FlowError::Completed),
    }
}

/// Build the opening gather: welcome line, three menu options, and a
/// fallback line in case no digit arrives.
fn greeting_turn() -> FlowTurn {
    let gather = Gather::new()
        .num_digits(1)
        .say(Say::new(WELCOME))
        .say(Say::new(MENU_STORE_HOURS))
        .say(Say::new(MENU_AGENT))
        .say(Say::new(MENU_PACKAGE_STATUS));

    let mut response = TwimlResponse::new();
    response.gather(gather);
    response.say(Say::new(NO_INPUT));

    FlowTurn::continue_with(response)
}

fn menu_selection_turn(request: &CallRequest) -> Result<FlowTurn> {
    let digits = request.digits().unwrap_or("");
    let digit: i32 = digits
        .parse()
        .map_err(|_| FlowError::InvalidDigits(digits.to_string()))?;

    let mut response = TwimlResponse::new();
    match digit {
        1 => {
            response.say(Say::new(STORE_HOURS));
        }
        2 => {
            response.say(Say::new(CONNECT_AGENT));
        }
        other => {
            // Unmatched digits end the call without a caller-facing
            // prompt; the diagnostic goes to the operator log only.
            warn!("Unmatched menu digit {}, ending call silently", other);
        }
    }

    Ok(FlowTurn::complete_with(response))
}

/// The store main menu as a resumable flow instance
pub struct MainMenuFlow {
    state: MenuState,
}

impl MainMenuFlow {
    pub fn new() -> Self {
        Self {
            state: MenuState::Greeting,
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }
}

impl Default for MainMenuFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CallFlow for MainMenuFlow {
    fn advance(&mut self, request: &CallRequest) -> Result<FlowTurn> {
        let (next, turn) = transition(self.state, request)?;
        self.state = next;
        Ok(turn)
    }
}
