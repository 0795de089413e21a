//! HTTP surface mirroring `original_source/server.py`'s `POST /api/run`:
//! accept a program plus stdin, run it off the async executor with a 5
//! second budget, and report `stdout` tagged with what went wrong, if
//! anything, instead of the actual program output.

use std::time::Duration;

use axum::extract::Json;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use brewin::{BrewinError, CollectedIo, run_source};
use serde::{Deserialize, Serialize};

const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct RunRequest {
    program: String,
    stdin: String,
    version: u32,
}

#[derive(Debug, Serialize)]
struct RunResponse {
    stdout: String,
}

#[tokio::main]
async fn main() {
    let app = Router::new().route("/api/run", post(run_handler));
    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind HTTP listener");
    axum::serve(listener, app).await.expect("server exited unexpectedly");
}

async fn run_handler(Json(request): Json<RunRequest>) -> (StatusCode, Json<RunResponse>) {
    if !(1..=4).contains(&request.version) {
        return (
            StatusCode::BAD_REQUEST,
            Json(RunResponse {
                stdout: format!("unknown version {}", request.version),
            }),
        );
    }

    let program = request.program;
    let input_lines: Vec<String> = request.stdin.split('\n').map(str::to_owned).collect();

    let run = tokio::task::spawn_blocking(move || run_captured(&program, input_lines));

    let stdout = match tokio::time::timeout(TIMEOUT, run).await {
        Ok(Ok(stdout)) => stdout,
        Ok(Err(_)) => "RuntimeError".to_owned(),
        Err(_) => "Timeout".to_owned(),
    };

    (StatusCode::OK, Json(RunResponse { stdout }))
}

/// Runs `program` to completion and renders the outcome the way the HTTP
/// client expects: captured output on success, `SyntaxError` on a parse
/// failure, the error's kind tag (`NameError: ...`) on a tagged runtime
/// error, else a generic `RuntimeError`.
fn run_captured(program: &str, input_lines: Vec<String>) -> String {
    let mut host = CollectedIo::new(input_lines);
    match run_source(program, &mut host) {
        Ok(_) => host.into_output().join("\n"),
        Err(BrewinError::Syntax(_)) => "SyntaxError".to_owned(),
        Err(BrewinError::Runtime(eval_error)) => format!("{}: {eval_error}", eval_error.kind_tag()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_run_joins_output_lines() {
        let stdout = run_captured(r#"func main() { print("a"); print("b"); }"#, vec![]);
        assert_eq!(stdout, "a\nb");
    }

    #[test]
    fn parse_failure_reports_syntax_error() {
        let stdout = run_captured("func main( {", vec![]);
        assert_eq!(stdout, "SyntaxError");
    }

    #[test]
    fn runtime_failure_reports_tagged_error() {
        let stdout = run_captured("func main() { print(x); }", vec![]);
        assert!(stdout.starts_with("NameError"));
    }
}
