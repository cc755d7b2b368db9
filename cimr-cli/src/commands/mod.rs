pub mod backend;
pub mod chat;
pub mod render;
pub mod teams;

pub use backend::cmd_check;
pub use chat::{cmd_ask, cmd_chat, cmd_open, AskFormat, ChatTarget};
pub use render::{cmd_images, cmd_render, RenderOutput};
pub use teams::{cmd_agents, cmd_team, cmd_teams};
