//! Navigation paths: `/`, `/team/:teamId` and
//! `/team/:teamId/subteam/:subteamId/chat`.

use std::fmt;

use crate::error::{CimrError, CimrResult};
use crate::models::AgentRef;
use crate::registry::Registry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    Team { team_id: String },
    Chat { team_id: String, sub_team_id: String },
    NotFound(String),
}

impl Route {
    /// Parses a path. Query strings, fragments and trailing slashes are
    /// ignored; anything unrecognised is [`Route::NotFound`].
    pub fn parse(path: &str) -> Self {
        let clean = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let segments: Vec<&str> = clean.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Landing,
            ["team", team_id] => Route::Team {
                team_id: team_id.to_string(),
            },
            ["team", team_id, "subteam", sub_team_id, "chat"] => Route::Chat {
                team_id: team_id.to_string(),
                sub_team_id: sub_team_id.to_string(),
            },
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn team(team_id: impl Into<String>) -> Self {
        Route::Team {
            team_id: team_id.into(),
        }
    }

    pub fn chat(team_id: impl Into<String>, sub_team_id: impl Into<String>) -> Self {
        Route::Chat {
            team_id: team_id.into(),
            sub_team_id: sub_team_id.into(),
        }
    }

    /// The agent a chat route opens on.
    ///
    /// A team route resolves to the team's first agent; landing and unknown
    /// routes resolve to the registry's first agent.
    pub fn initial_agent(&self, registry: &Registry) -> CimrResult<AgentRef> {
        match self {
            Route::Chat {
                team_id,
                sub_team_id,
            } => registry.first_agent_in(team_id, Some(sub_team_id)),
            Route::Team { team_id } => registry.first_agent_in(team_id, None),
            _ => registry.first_agent().ok_or(CimrError::EmptyRegistry),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Landing => write!(f, "/"),
            Route::Team { team_id } => write!(f, "/team/{}", team_id),
            Route::Chat {
                team_id,
                sub_team_id,
            } => write!(f, "/team/{}/subteam/{}/chat", team_id, sub_team_id),
            Route::NotFound(path) => write!(f, "{}", path),
        }
    }
}
