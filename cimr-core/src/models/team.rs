use serde::Serialize;

/// How the agents of a sub-team work together on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinationMode {
    Coordinate,
    Route,
    Collaborate,
}

impl std::fmt::Display for CoordinationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinationMode::Coordinate => write!(f, "Coordinate"),
            CoordinationMode::Route => write!(f, "Route"),
            CoordinationMode::Collaborate => write!(f, "Collaborate"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Agent {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub outputs: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubTeam {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mode: CoordinationMode,
    pub agents: &'static [Agent],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Team {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub sub_teams: &'static [SubTeam],
}

impl Agent {
    /// Greeting shown when a chat view first opens on this agent.
    pub fn greeting(&self) -> String {
        format!("Hello! I'm {}. How can I help you today?", self.name)
    }

    /// Greeting shown after the user switches to this agent.
    pub fn welcome_message(&self) -> String {
        let description = self.description.trim().trim_end_matches('.');
        if description.is_empty() {
            return format!("Hello! I'm {}. I'm now ready to assist you.", self.name);
        }

        let specialties: Vec<&str> = self.outputs.iter().take(3).copied().collect();
        format!(
            "Hello! I'm {}. {}. I specialize in: {}. How can I help you today?",
            self.name,
            description,
            specialties.join(", ")
        )
    }
}

impl SubTeam {
    pub fn agent(&self, agent_id: &str) -> Option<&'static Agent> {
        self.agents.iter().find(|a| a.id == agent_id)
    }
}

impl Team {
    pub fn sub_team(&self, sub_team_id: &str) -> Option<&'static SubTeam> {
        self.sub_teams.iter().find(|s| s.id == sub_team_id)
    }

    pub fn agent_count(&self) -> usize {
        self.sub_teams.iter().map(|s| s.agents.len()).sum()
    }
}

/// Points at one registry agent together with the team and sub-team that
/// contain it. Never owns registry data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgentRef {
    pub agent: &'static Agent,
    pub team_id: &'static str,
    pub sub_team_id: &'static str,
}

impl AgentRef {
    pub fn id(&self) -> &'static str {
        self.agent.id
    }

    pub fn name(&self) -> &'static str {
        self.agent.name
    }
}
