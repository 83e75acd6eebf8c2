/// Call flow contract
///
/// A call flow is a resumable conversation with one caller: the
/// platform delivers one request per turn, the flow answers with a
/// TwiML response and either suspends for more input or completes.
use crate::domain::shared::{FlowError, Result};
use crate::domain::twiml::TwimlResponse;
use std::collections::HashMap;

pub mod main_menu;

pub use main_menu::MainMenuFlow;

/// Caller input for one turn of a flow
///
/// Carries the DTMF digits collected since the last response plus the
/// platform metadata the carrier posts with every webhook request.
#[derive(Debug, Clone, Default)]
pub struct CallRequest {
    pub call_sid: Option<String>,
    pub account_sid: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub digits: Option<String>,
    params: HashMap<String, String>,
}

impl CallRequest {
    /// Build a request from the carrier's posted parameter map
    pub fn from_params(params: HashMap<String, String>) -> Self {
        Self {
            call_sid: params.get("CallSid").cloned(),
            account_sid: params.get("AccountSid").cloned(),
            from: params.get("From").cloned(),
            to: params.get("To").cloned(),
            digits: params.get("Digits").cloned(),
            params,
        }
    }

    /// Request with digits only, as delivered when resuming a gather
    pub fn with_digits(digits: impl Into<String>) -> Self {
        let mut params = HashMap::new();
        params.insert("Digits".to_string(), digits.into());
        Self::from_params(params)
    }

    pub fn digits(&self) -> Option<&str> {
        self.digits.as_deref()
    }

    /// Raw parameter lookup for fields without a dedicated accessor
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// What the flow expects to happen after a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Suspend and wait for the caller's next input
    Continue,
    /// Final response, the conversation is over
    Complete,
}

/// The outcome of advancing a flow by one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowTurn {
    pub response: TwimlResponse,
    pub disposition: Disposition,
}

impl FlowTurn {
    pub fn continue_with(response: TwimlResponse) -> Self {
        Self {
            response,
            disposition: Disposition::Continue,
        }
    }

    pub fn complete_with(response: TwimlResponse) -> Self {
        Self {
            response,
            disposition: Disposition::Complete,
        }
    }

    pub fn is_final(&self) -> bool {
        self.disposition == Disposition::Complete
    }
}

/// A resumable call flow, advanced one turn at a time
///
/// The first call produces the opening response; later calls resume
/// with the caller's input. Advancing a completed flow is an error.
pub trait CallFlow: Send {
    fn advance(&mut self, request: &CallRequest) -> Result<FlowTurn>;
}

type FlowFactory = Box<dyn Fn() -> Box<dyn CallFlow> + Send + Sync>;

/// Registry of named call flows
///
/// Maps the flow name taken from the webhook URL to a constructor for
/// a fresh flow instance.
pub struct FlowRegistry {
    factories: HashMap<String, FlowFactory>,
}

impl FlowRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the built-in flows registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("mainmenu", || Box::new(MainMenuFlow::new()));
        registry
    }

    /// Register a flow constructor under a name
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn CallFlow> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    /// Create a fresh instance of the named flow
    pub fn create(&self, name: &str) -> Result<Box<dyn CallFlow>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| FlowError::UnknownFlow(name.to_string()))?;
        Ok(factory())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// List registered flow names
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }
}

impl Default for FlowRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
