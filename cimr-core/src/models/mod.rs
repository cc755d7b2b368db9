mod message;
mod team;

pub use message::{Message, Sender};
pub use team::{Agent, AgentRef, CoordinationMode, SubTeam, Team};
