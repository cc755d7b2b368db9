use serde_json::{json, Value};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CIMR_BIN: &str = env!("CARGO_BIN_EXE_cimr");
const FALLBACK: &str =
    "Sorry, I'm having trouble connecting to the server right now. Please try again later.";

fn cimr_command(workdir: &Path) -> Command {
    let mut cmd = Command::new(CIMR_BIN);
    cmd.current_dir(workdir)
        .env_remove("CIMR_BACKEND_URL")
        .env_remove("BACKEND_URL")
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

fn run_cimr(args: &[&str]) -> Output {
    let dir = TempDir::new().unwrap();
    cimr_command(dir.path())
        .args(args)
        .output()
        .expect("Failed to execute cimr command")
}

fn output_to_string(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr_to_string(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

mod version_command_tests {
    use super::*;

    #[test]
    fn test_version_command_basic() {
        let output = run_cimr(&["version"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "version command should succeed");
        assert!(stdout.starts_with("cimr "));
        assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_version_command_detailed() {
        let output = run_cimr(&["version", "--detailed"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success());
        assert!(stdout.contains("Version"));
        assert!(stdout.contains("Company Valuation"));
        assert!(stdout.contains("Advanced Company Valuation"));
    }
}

mod help_tests {
    use super::*;

    #[test]
    fn test_help_lists_commands() {
        let output = run_cimr(&["--help"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success());
        for command in ["teams", "team", "chat", "ask", "open", "render", "check"] {
            assert!(stdout.contains(command), "help should mention '{}'", command);
        }
    }

    #[test]
    fn test_invalid_command() {
        let output = run_cimr(&["nonexistent-command"]);
        assert!(!output.status.success());
    }

    #[test]
    fn test_subteam_requires_team() {
        let output = run_cimr(&["chat", "--subteam", "financial-analysis"]);
        assert!(!output.status.success());
    }
}

mod registry_command_tests {
    use super::*;

    #[test]
    fn test_teams_table() {
        let output = run_cimr(&["teams"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success());
        assert!(stdout.contains("company_valuation"));
        assert!(stdout.contains("company_valuation_v2"));
        assert!(stdout.contains("Total: 2 teams"));
    }

    #[test]
    fn test_teams_json() {
        let output = run_cimr(&["teams", "--format", "json"]);
        assert!(output.status.success());

        let teams: Value = serde_json::from_str(&output_to_string(&output)).unwrap();
        let teams = teams.as_array().unwrap();
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0]["id"], "company_valuation");
    }

    #[test]
    fn test_team_json_lists_sub_teams() {
        let output = run_cimr(&["team", "company_valuation_v2", "--format", "json"]);
        assert!(output.status.success());

        let team: Value = serde_json::from_str(&output_to_string(&output)).unwrap();
        let sub_teams: Vec<&str> = team["sub_teams"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|s| s["id"].as_str())
            .collect();
        assert_eq!(sub_teams, vec!["financial-analysis", "chief-analyst"]);
    }

    #[test]
    fn test_team_shows_chat_path() {
        let output = run_cimr(&["team", "company_valuation"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success());
        assert!(stdout.contains("cimr open /team/company_valuation/subteam/valuation-analysis/chat"));
    }

    #[test]
    fn test_unknown_team_fails() {
        let output = run_cimr(&["team", "no_such_team"]);
        assert!(!output.status.success());
        assert!(stderr_to_string(&output).contains("Error"));
    }

    #[test]
    fn test_agents_filtered_by_team() {
        let output = run_cimr(&["agents", "--team", "company_valuation_v2", "--format", "json"]);
        assert!(output.status.success());

        let agents: Value = serde_json::from_str(&output_to_string(&output)).unwrap();
        let agents = agents.as_array().unwrap();
        assert_eq!(agents.len(), 4);
        assert!(agents.iter().all(|a| a["team"] == "company_valuation_v2"));
    }
}

mod open_command_tests {
    use super::*;

    #[test]
    fn test_open_landing_lists_teams() {
        let output = run_cimr(&["open", "/"]);
        assert!(output.status.success());
        assert!(output_to_string(&output).contains("Consulting Teams"));
    }

    #[test]
    fn test_open_team_page() {
        let output = run_cimr(&["open", "/team/company_valuation_v2"]);
        assert!(output.status.success());
        assert!(output_to_string(&output).contains("Income Statement Analyst"));
    }

    #[test]
    fn test_open_unknown_path_fails() {
        let output = run_cimr(&["open", "/settings"]);
        assert!(!output.status.success());
        assert!(stderr_to_string(&output).contains("/settings"));
    }
}

mod render_command_tests {
    use super::*;

    #[test]
    fn test_render_file_to_html() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("reply.md");
        std::fs::write(
            &file,
            "# Report\n**Fair value**: 42\n```json\n{\"pe_ratio\": 14.5}\n```",
        )
        .unwrap();

        let output = cimr_command(dir.path())
            .args(["render", file.to_str().unwrap()])
            .output()
            .unwrap();
        let stdout = output_to_string(&output);

        assert!(output.status.success());
        assert!(stdout.contains("<h1>Report</h1>"));
        assert!(stdout.contains("<strong>Fair value</strong>"));
        assert!(stdout.contains("Data Details"));
        assert!(stdout.contains("pe ratio"));
    }

    #[test]
    fn test_render_toc() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("reply.md");
        std::fs::write(&file, "# Summary\ntext\n## Peer Multiples\nmore").unwrap();

        let output = cimr_command(dir.path())
            .args(["render", file.to_str().unwrap(), "--output", "toc"])
            .output()
            .unwrap();
        let stdout = output_to_string(&output);

        assert!(output.status.success());
        assert!(stdout.contains("- Summary #summary"));
        assert!(stdout.contains("  - Peer Multiples #peer-multiples"));
    }

    #[test]
    fn test_render_missing_file_fails() {
        let output = run_cimr(&["render", "/definitely/not/here.md"]);
        assert!(!output.status.success());
        assert!(stderr_to_string(&output).contains("Failed to read"));
    }

    #[test]
    fn test_images_listing() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("reply.md");
        std::fs::write(&file, "Saved:\nplot_IFRS Capital (central)_20240101_120000.png").unwrap();

        let output = cimr_command(dir.path())
            .args(["--backend", "http://charts.example:9000"])
            .args(["images", file.to_str().unwrap()])
            .output()
            .unwrap();
        let stdout = output_to_string(&output);

        assert!(output.status.success());
        assert!(stdout.contains("20240101_120000.png"));
        assert!(stdout.contains("http://charts.example:9000/images/"));
    }
}

mod ask_command_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_ask_prints_backend_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(body_partial_json(json!({
                "query": "What is Acme worth?",
                "module": "company_valuation_v2",
                "agent": "valuation_analyst"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "response": "## Valuation\nAcme is worth **42**."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let mut cmd = tokio::process::Command::from(cimr_command(dir.path()));
        let output = cmd
            .args(["--backend", &server.uri()])
            .args(["ask", "What is Acme worth?", "--agent", "valuation_analyst"])
            .output()
            .await
            .unwrap();
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "{}", stderr_to_string(&output));
        assert!(stdout.contains("## Valuation"));
        assert!(stdout.contains("Acme is worth **42**."));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_ask_json_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "response": "Chart:\nplot_IFRS Capital (central)_20240101_120000.png"
            })))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let mut cmd = tokio::process::Command::from(cimr_command(dir.path()));
        let output = cmd
            .args(["--backend", &server.uri()])
            .args(["ask", "Chart please", "--format", "json"])
            .output()
            .await
            .unwrap();
        assert!(output.status.success(), "{}", stderr_to_string(&output));

        let message: Value = serde_json::from_str(&output_to_string(&output)).unwrap();
        assert_eq!(message["sender"], "agent");
        assert_eq!(message["agent_name"], "Financial Data Agent");
        assert_eq!(
            message["images"][0],
            "plot_IFRS Capital (central)_20240101_120000.png"
        );
    }

    #[test]
    fn test_ask_unreachable_backend_prints_fallback() {
        let output = run_cimr(&["--backend", "http://127.0.0.1:1", "ask", "Hello"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success());
        assert!(stdout.contains(FALLBACK));
    }

    #[test]
    fn test_ask_unknown_agent_fails() {
        let output = run_cimr(&["ask", "Hello", "--agent", "nobody"]);
        assert!(!output.status.success());
        assert!(stderr_to_string(&output).contains("nobody"));
    }

    #[test]
    fn test_invalid_backend_url_fails() {
        let output = run_cimr(&["--backend", "not a url", "teams"]);
        assert!(!output.status.success());
        assert!(stderr_to_string(&output).contains("Invalid --backend value"));
    }
}

mod check_command_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_check_reports_health_modules_and_sample_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "healthy",
                "message": "CIMR-OS Backend is running"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/modules"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "modules": {"company_valuation": ["financial_data_agent"]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(body_partial_json(json!({"query": "Hello, can you help me?"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "response": "Of course."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let mut cmd = tokio::process::Command::from(cimr_command(dir.path()));
        let output = cmd
            .args(["--backend", &server.uri(), "check"])
            .output()
            .await
            .unwrap();
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "{}", stderr_to_string(&output));
        assert!(stdout.contains("healthy"));
        assert!(stdout.contains("company_valuation (financial_data_agent)"));
        assert!(stdout.contains("(not served by backend)"));
        assert!(stdout.contains("Of course."));
    }

    #[test]
    fn test_check_unreachable_backend_fails() {
        let output = run_cimr(&["--backend", "http://127.0.0.1:1", "check"]);
        assert!(!output.status.success());
        assert!(stderr_to_string(&output).contains("Error"));
    }
}
