//! Chat session state for one user talking to one selected agent.
//!
//! A session owns its transcript. Each submission appends exactly one user
//! message and, once the backend answers or fails, exactly one agent
//! message. Backend failures never reach the caller; they become
//! [`FALLBACK_REPLY`] in the transcript.

use tracing::{debug, info, warn};

use crate::client::{QueryBackend, QueryRequest};
use crate::config::ModuleMapping;
use crate::error::{CimrError, CimrResult};
use crate::images::extract_image_filenames;
use crate::models::{AgentRef, Message};
use crate::registry::Registry;

/// Agent text recorded when a query cannot be answered.
pub const FALLBACK_REPLY: &str =
    "Sorry, I'm having trouble connecting to the server right now. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingResponse,
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    registry: Registry,
    modules: ModuleMapping,
    selected: AgentRef,
    messages: Vec<Message>,
    state: SessionState,
    input: String,
}

impl ChatSession {
    /// Opens a session on the first agent of the registry.
    pub fn new(registry: Registry, modules: ModuleMapping) -> CimrResult<Self> {
        let first = registry.first_agent().ok_or(CimrError::EmptyRegistry)?;
        Ok(Self::with_agent(registry, modules, first))
    }

    /// Opens a session on a specific agent.
    pub fn with_agent(registry: Registry, modules: ModuleMapping, agent: AgentRef) -> Self {
        info!("Opening chat with {}", agent.id());
        Self {
            registry,
            modules,
            selected: agent,
            messages: vec![Message::agent(agent.name(), agent.agent.greeting())],
            state: SessionState::Idle,
            input: String::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn selected(&self) -> AgentRef {
        self.selected
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.state == SessionState::AwaitingResponse
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// "Thinking..." placeholder while a response is outstanding.
    pub fn pending_indicator(&self) -> Option<Message> {
        self.is_awaiting_response()
            .then(|| Message::loading(self.selected.name()))
    }

    /// Switches to another agent and restarts the transcript with its
    /// welcome message.
    pub fn select_agent(&mut self, agent: AgentRef) {
        info!("Switching agent {} -> {}", self.selected.id(), agent.id());
        self.selected = agent;
        self.messages = vec![Message::agent(agent.name(), agent.agent.welcome_message())];
        self.state = SessionState::Idle;
    }

    pub fn select_agent_by_id(&mut self, agent_id: &str) -> CimrResult<()> {
        let agent = self.registry.find_agent(agent_id)?;
        self.select_agent(agent);
        Ok(())
    }

    /// Records a user submission and marks the session as waiting.
    ///
    /// Returns the text to send. Blank input and a second submission while
    /// one is outstanding are rejected without touching the transcript.
    pub fn begin(&mut self, text: &str) -> CimrResult<String> {
        if self.is_awaiting_response() {
            warn!("Submission ignored, still waiting on {}", self.selected.id());
            return Err(CimrError::RequestInFlight(self.selected.id().to_string()));
        }
        if text.trim().is_empty() {
            return Err(CimrError::EmptyMessage);
        }

        self.messages.push(Message::user(text));
        self.input.clear();
        self.state = SessionState::AwaitingResponse;
        Ok(text.to_string())
    }

    /// Backend request for `query` addressed to the selected agent.
    pub fn build_request(&self, query: &str) -> CimrResult<QueryRequest> {
        let module = self
            .modules
            .module_for(self.selected.team_id)
            .ok_or_else(|| CimrError::UnknownModule(self.selected.team_id.to_string()))?;
        Ok(QueryRequest::new(query, module, self.selected.id()))
    }

    /// Records the outcome of the outstanding request and returns the agent
    /// message it produced.
    pub fn complete(&mut self, outcome: CimrResult<String>) -> &Message {
        let name = self.selected.name();
        let message = match outcome {
            Ok(text) => {
                let images = extract_image_filenames(&text);
                debug!("Response from {} with {} image(s)", self.selected.id(), images.len());
                Message::agent(name, text).with_images(images)
            }
            Err(e) => {
                warn!("[{}] Query to {} failed: {}", e.error_code(), self.selected.id(), e);
                Message::agent(name, FALLBACK_REPLY)
            }
        };

        self.state = SessionState::Idle;
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Sends `text` to the selected agent and records the reply.
    ///
    /// Only rejections from [`ChatSession::begin`] are returned as errors.
    pub async fn submit<B>(&mut self, backend: &B, text: &str) -> CimrResult<&Message>
    where
        B: QueryBackend + ?Sized,
    {
        let query = self.begin(text)?;
        let outcome = match self.build_request(&query) {
            Ok(request) => backend.query(&request).await,
            Err(e) => Err(e),
        };
        Ok(self.complete(outcome))
    }

    /// Submits whatever is in the input buffer.
    pub async fn submit_input<B>(&mut self, backend: &B) -> CimrResult<&Message>
    where
        B: QueryBackend + ?Sized,
    {
        let text = self.input.clone();
        self.submit(backend, &text).await
    }
}
