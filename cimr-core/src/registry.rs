//! Static description of the consulting teams and their agents.
//!
//! The registry is fixed at compile time; everything hands out `'static`
//! references into it.

use crate::error::{CimrError, CimrResult};
use crate::models::{Agent, AgentRef, CoordinationMode, SubTeam, Team};

const FINANCIAL_DATA_AGENT: Agent = Agent {
    id: "financial_data_agent",
    name: "Financial Data Agent",
    description: "Expert AI financial analyst specializing in corporate and M&A valuations. \
                  Performs Asset-Based, Market-Based, and Earning-Based valuations using \
                  advanced financial tools and generates comprehensive valuation reports.",
    outputs: &[
        "Asset-Based Valuations (Book Value, Liquidation Value)",
        "Market-Based Valuations (Market Cap, Comparable Multiples)",
        "Earning-Based Valuations (DCF, Earnings Multiples)",
        "Triangulated Valuation Reports",
        "Peer Discovery and Analysis",
        "Financial Statement Analysis",
        "Valuation Confidence Scores",
        "Scenario Analysis and Sensitivity Testing",
    ],
};

const INCOME_STATEMENT_ANALYST: Agent = Agent {
    id: "income_statement_analyst",
    name: "Income Statement Analyst",
    description: "Financial analyst specializing in income statement analysis: revenue growth, \
                  margins, EBITDA and the quality of earnings.",
    outputs: &[
        "Revenue Growth Rates",
        "Gross, Operating and Net Margins",
        "EBITDA Analysis",
        "Profitability Trends",
        "Cost Structure Insights",
    ],
};

const BALANCE_SHEET_ANALYST: Agent = Agent {
    id: "balance_sheet_analyst",
    name: "Balance Sheet Analyst",
    description: "Financial analyst specializing in balance sheet analysis: capital structure, \
                  liquidity and solvency.",
    outputs: &[
        "Debt-to-Equity and Debt-to-Assets Ratios",
        "Current and Quick Ratios",
        "Book Value per Share",
        "Working Capital Analysis",
        "Solvency Assessment",
    ],
};

const VALUATION_ANALYST: Agent = Agent {
    id: "valuation_analyst",
    name: "Valuation Analyst",
    description: "Valuation expert specializing in multiples analysis and comparable company \
                  valuation.",
    outputs: &[
        "Enterprise Value Calculations",
        "EV/Revenue and EV/EBITDA Multiples",
        "P/E and P/B Comparisons",
        "Peer Group Analysis",
        "Valuation Ranges and Sensitivity",
    ],
};

const CHIEF_FINANCIAL_ANALYST: Agent = Agent {
    id: "chief_financial_analyst",
    name: "Chief Financial Analyst",
    description: "Coordinates the income statement, balance sheet and valuation specialists \
                  into one integrated company assessment.",
    outputs: &[
        "Financial Health Score",
        "Investment Recommendation",
        "Fair Value Estimate",
        "Key Risks and Opportunities",
    ],
};

static COMPANY_VALUATION_SUB_TEAMS: [SubTeam; 1] = [SubTeam {
    id: "valuation-analysis",
    name: "Valuation Analysis",
    description: "Comprehensive company valuation using multiple approaches and tools",
    mode: CoordinationMode::Coordinate,
    agents: &[FINANCIAL_DATA_AGENT],
}];

static ADVANCED_VALUATION_SUB_TEAMS: [SubTeam; 2] = [
    SubTeam {
        id: "financial-analysis",
        name: "Financial Analysis",
        description: "Specialist analysts for statements and market multiples",
        mode: CoordinationMode::Coordinate,
        agents: &[
            INCOME_STATEMENT_ANALYST,
            BALANCE_SHEET_ANALYST,
            VALUATION_ANALYST,
        ],
    },
    SubTeam {
        id: "chief-analyst",
        name: "Chief Analyst",
        description: "Delegates to the specialists and synthesizes their findings",
        mode: CoordinationMode::Route,
        agents: &[CHIEF_FINANCIAL_ANALYST],
    },
];

static BUILTIN_TEAMS: [Team; 2] = [
    Team {
        id: "company_valuation",
        name: "Company Valuation",
        description: "AI-powered corporate valuation using Asset-Based, Market-Based, and \
                      Earning-Based approaches",
        sub_teams: &COMPANY_VALUATION_SUB_TEAMS,
    },
    Team {
        id: "company_valuation_v2",
        name: "Advanced Company Valuation",
        description: "Multi-agent financial analysis system with specialized analysts for \
                      comprehensive company evaluation",
        sub_teams: &ADVANCED_VALUATION_SUB_TEAMS,
    },
];

/// Read-only view over a set of teams.
#[derive(Debug, Clone, Copy)]
pub struct Registry {
    teams: &'static [Team],
}

impl Registry {
    pub fn new(teams: &'static [Team]) -> Self {
        Self { teams }
    }

    /// The teams shipped with the client.
    pub fn builtin() -> Self {
        Self::new(&BUILTIN_TEAMS)
    }

    pub fn teams(&self) -> &'static [Team] {
        self.teams
    }

    pub fn is_empty(&self) -> bool {
        self.agents().next().is_none()
    }

    pub fn team(&self, team_id: &str) -> CimrResult<&'static Team> {
        self.teams
            .iter()
            .find(|t| t.id == team_id)
            .ok_or_else(|| CimrError::TeamNotFound(team_id.to_string()))
    }

    pub fn sub_team(&self, team_id: &str, sub_team_id: &str) -> CimrResult<&'static SubTeam> {
        let team = self.team(team_id)?;
        team.sub_team(sub_team_id)
            .ok_or_else(|| CimrError::SubTeamNotFound {
                team: team_id.to_string(),
                sub_team: sub_team_id.to_string(),
            })
    }

    /// Every agent in registry order: team, then sub-team, then agent.
    pub fn agents(&self) -> impl Iterator<Item = AgentRef> + 'static {
        self.teams.iter().flat_map(|team| {
            team.sub_teams.iter().flat_map(move |sub_team| {
                sub_team.agents.iter().map(move |agent| AgentRef {
                    agent,
                    team_id: team.id,
                    sub_team_id: sub_team.id,
                })
            })
        })
    }

    pub fn first_agent(&self) -> Option<AgentRef> {
        self.agents().next()
    }

    pub fn find_agent(&self, agent_id: &str) -> CimrResult<AgentRef> {
        self.agents()
            .find(|r| r.agent.id == agent_id)
            .ok_or_else(|| CimrError::AgentNotFound(agent_id.to_string()))
    }

    /// First agent of a team, optionally restricted to one of its sub-teams.
    pub fn first_agent_in(&self, team_id: &str, sub_team_id: Option<&str>) -> CimrResult<AgentRef> {
        let team = self.team(team_id)?;
        if let Some(sub_team_id) = sub_team_id {
            self.sub_team(team_id, sub_team_id)?;
        }

        self.agents()
            .filter(|r| r.team_id == team.id)
            .find(|r| sub_team_id.map_or(true, |s| r.sub_team_id == s))
            .ok_or(CimrError::EmptyRegistry)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}
