//! Integration tests for the planboard CLI
//!
//! These run the real binary against a temporary home directory and, where
//! a backend is needed, an in-process axum server.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use predicates::prelude::*;
use serde_json::{Value, json};
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Helper to create a planboard Command isolated from the user's environment
fn planboard(home: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("planboard");
    cmd.current_dir(home.path())
        .arg("--home")
        .arg(home.path())
        .env_remove("PLANBOARD_TOKEN")
        .env_remove("PLANBOARD_HOME")
        .env_remove("PLANBOARD_API_BASE_URL")
        .env_remove("NEXT_PUBLIC_API_BASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn create_home() -> TempDir {
    TempDir::new().unwrap()
}

/// Start a backend on a background thread and return its base URL.
fn spawn_backend(router: Router) -> String {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, router).await.unwrap();
        });
    });
    let addr = rx.recv().unwrap();
    format!("http://{}/api", addr)
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_planboard_help() {
        let home = create_home();
        planboard(&home)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("tenant"));
    }

    #[test]
    fn test_planboard_version() {
        let home = create_home();
        planboard(&home).arg("--version").assert().success();
    }

    #[test]
    fn test_unknown_command_fails() {
        let home = create_home();
        planboard(&home).arg("frobnicate").assert().failure();
    }
}

// =============================================================================
// Configuration
// =============================================================================

mod config {
    use super::*;

    #[test]
    fn test_config_show_without_file_uses_defaults() {
        let home = create_home();
        planboard(&home)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No planboard.toml found"))
            .stdout(predicate::str::contains("http://localhost:8000/api"));
    }

    #[test]
    fn test_config_init_creates_file_once() {
        let home = create_home();
        planboard(&home)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created planboard.toml"));
        assert!(home.path().join("planboard.toml").exists());

        planboard(&home)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
    }

    #[test]
    fn test_config_validate_reports_warnings() {
        let home = create_home();
        fs::write(
            home.path().join("planboard.toml"),
            "[api]\nbase_url = \"localhost:8000\"\n",
        )
        .unwrap();

        planboard(&home)
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Invalid api.base_url"));
    }

    #[test]
    fn test_env_base_url_overrides_file() {
        let home = create_home();
        fs::write(
            home.path().join("planboard.toml"),
            "[api]\nbase_url = \"https://file.example/api\"\n",
        )
        .unwrap();

        planboard(&home)
            .env("NEXT_PUBLIC_API_BASE_URL", "https://env.example/api")
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("base_url = \"https://env.example/api\""));
    }
}

// =============================================================================
// Credentials and tenant selection
// =============================================================================

mod session_state {
    use super::*;

    #[test]
    fn test_login_stores_credentials() {
        let home = create_home();
        planboard(&home)
            .args(["login", "--token", "abc123", "--subject", "ada@example.com"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Stored credentials"));

        let stored = fs::read_to_string(home.path().join("credentials.json")).unwrap();
        assert!(stored.contains("abc123"));
        assert!(stored.contains("ada@example.com"));
    }

    #[test]
    fn test_login_rejects_empty_token() {
        let home = create_home();
        planboard(&home)
            .args(["login", "--token", "  "])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Token must not be empty"));
    }

    #[test]
    fn test_logout_removes_credentials() {
        let home = create_home();
        planboard(&home)
            .args(["login", "--token", "abc123"])
            .assert()
            .success();

        planboard(&home)
            .arg("logout")
            .assert()
            .success()
            .stderr(predicate::str::contains("Log in again at"));
        assert!(!home.path().join("credentials.json").exists());
    }

    #[test]
    fn test_tenant_use_show_clear() {
        let home = create_home();
        planboard(&home)
            .args(["tenant", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No tenant selected"));

        planboard(&home)
            .args(["tenant", "use", "acme"])
            .assert()
            .success();

        planboard(&home)
            .args(["tenant", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("acme"));

        planboard(&home)
            .args(["tenant", "clear"])
            .assert()
            .success();

        planboard(&home)
            .args(["tenant", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No tenant selected"));
    }
}

// =============================================================================
// Against a backend
// =============================================================================

mod backend {
    use super::*;

    #[test]
    fn test_whoami_prints_user() {
        let url = spawn_backend(Router::new().route(
            "/api/users/me",
            get(|| async {
                axum::Json(serde_json::json!({
                    "id": "5a4b3c2d-1e0f-4a9b-8c7d-6e5f4a3b2c1d",
                    "email": "ada@example.com",
                    "display_name": "Ada"
                }))
            }),
        ));
        let home = create_home();

        planboard(&home)
            .args(["--base-url", url.as_str(), "whoami"])
            .env("PLANBOARD_TOKEN", "tok")
            .assert()
            .success()
            .stdout(predicate::str::contains("ada@example.com"));
    }

    #[test]
    fn test_unauthorized_signs_out() {
        let url = spawn_backend(
            Router::new().route("/api/users/me", get(|| async { StatusCode::UNAUTHORIZED })),
        );
        let home = create_home();
        planboard(&home)
            .args(["login", "--token", "stale"])
            .assert()
            .success();

        planboard(&home)
            .args(["--base-url", url.as_str(), "whoami"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Log in again at"))
            .stderr(predicate::str::contains("401"));
        assert!(!home.path().join("credentials.json").exists());
    }

    #[test]
    fn test_forbidden_keeps_credentials() {
        let url = spawn_backend(Router::new().route(
            "/api/issues",
            get(|| async { (StatusCode::FORBIDDEN, "viewer role") }),
        ));
        let home = create_home();
        planboard(&home)
            .args(["login", "--token", "tok"])
            .assert()
            .success();

        planboard(&home)
            .args(["--base-url", url.as_str(), "issues", "list"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("viewer role"));
        assert!(home.path().join("credentials.json").exists());
    }
}

// =============================================================================
// Board transition editing
// =============================================================================

mod board_rules {
    use super::*;

    const BOARD: &str = "6f1e2d3c-4b5a-4968-8776-a5b4c3d2e1f0";

    type Saved = Arc<Mutex<Vec<Value>>>;

    /// Backend whose board payload leaves out `transitions`; the rules are
    /// only available from the dedicated endpoint.
    fn rules_backend() -> (String, Saved) {
        let saved = Saved::default();
        let router = Router::new()
            .route(
                "/api/boards/{id}",
                get(|| async {
                    Json(json!({
                        "id": BOARD,
                        "name": "Platform",
                        "statuses": ["todo", "in_progress", "review", "done"]
                    }))
                }),
            )
            .route(
                "/api/boards/{id}/transitions",
                get(|| async {
                    Json(json!([
                        {"from": "todo", "to": "in_progress"},
                        {"from": "in_progress", "to": "review"}
                    ]))
                })
                .put(|State(saved): State<Saved>, Json(body): Json<Value>| async move {
                    saved.lock().unwrap().push(body.clone());
                    Json(body)
                }),
            )
            .with_state(saved.clone());
        (spawn_backend(router), saved)
    }

    fn pairs(body: &Value) -> Vec<(String, String)> {
        let mut pairs: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|t| {
                (
                    t["from"].as_str().unwrap().to_string(),
                    t["to"].as_str().unwrap().to_string(),
                )
            })
            .collect();
        pairs.sort();
        pairs
    }

    fn pair(from: &str, to: &str) -> (String, String) {
        (from.to_string(), to.to_string())
    }

    #[test]
    fn test_allow_keeps_existing_rules() {
        let (url, saved) = rules_backend();
        let home = create_home();

        planboard(&home)
            .args(["--base-url", url.as_str(), "board", "allow", BOARD, "review", "done"])
            .env("PLANBOARD_TOKEN", "tok")
            .assert()
            .success()
            .stdout(predicate::str::contains("todo -> in_progress"))
            .stdout(predicate::str::contains("review -> done"));

        let saved = saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(
            pairs(&saved[0]),
            vec![
                pair("in_progress", "review"),
                pair("review", "done"),
                pair("todo", "in_progress"),
            ]
        );
    }

    #[test]
    fn test_disallow_removes_only_the_named_rule() {
        let (url, saved) = rules_backend();
        let home = create_home();

        planboard(&home)
            .args(["--base-url", url.as_str(), "board", "disallow", BOARD, "todo", "in_progress"])
            .env("PLANBOARD_TOKEN", "tok")
            .assert()
            .success();

        let saved = saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(pairs(&saved[0]), vec![pair("in_progress", "review")]);
    }

    #[test]
    fn test_disallow_unknown_rule_saves_nothing() {
        let (url, saved) = rules_backend();
        let home = create_home();

        planboard(&home)
            .args(["--base-url", url.as_str(), "board", "disallow", BOARD, "review", "todo"])
            .env("PLANBOARD_TOKEN", "tok")
            .assert()
            .success()
            .stdout(predicate::str::contains("review -> todo was not allowed"));

        assert!(saved.lock().unwrap().is_empty());
    }
}
