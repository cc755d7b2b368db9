pub mod client;
pub mod config;
pub mod error;
pub mod images;
pub mod markdown;
pub mod models;
pub mod registry;
pub mod routes;
pub mod session;
pub mod transcript;

pub use client::{HealthStatus, HttpBackend, ModulesResponse, QueryBackend, QueryRequest};
pub use config::{CimrConfig, ModuleMapping};
pub use error::{CimrError, CimrResult};
pub use images::{extract_image_filenames, fallback_image_filename, image_url};
pub use markdown::{format_agent_output, markdown_to_html};
pub use models::*;
pub use registry::Registry;
pub use routes::Route;
pub use session::{ChatSession, SessionState, FALLBACK_REPLY};
pub use transcript::render_transcript_html;
