use std::path::Path;
use std::process::Output;

use tokio::process::Command;

/// Run the CLI binary with an isolated HOME so the session file lands in a
/// temporary directory.
pub async fn run_cli(args: &[&str], home: &Path, api_url: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_checkin"))
        .args(args)
        .env("HOME", home)
        .env("XDG_DATA_HOME", home.join("data"))
        .env("CHECKIN_API_URL", api_url)
        .env_remove("RUST_LOG")
        .env_remove("CHECKIN_TIMEOUT_SECS")
        .env("NO_COLOR", "1")
        .output()
        .await
        .expect("Failed to execute CLI")
}

/// Run the CLI and expect success, returning stdout.
pub async fn run_cli_success(args: &[&str], home: &Path, api_url: &str) -> String {
    let output = run_cli(args, home, api_url).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure, returning stderr.
pub async fn run_cli_failure(args: &[&str], home: &Path, api_url: &str) -> String {
    let output = run_cli(args, home, api_url).await;
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Find the session file the CLI wrote under `home`.
pub fn session_file(home: &Path) -> Option<std::path::PathBuf> {
    fn walk(dir: &Path) -> Option<std::path::PathBuf> {
        for entry in std::fs::read_dir(dir).ok()? {
            let path = entry.ok()?.path();
            if path.is_dir() {
                if let Some(found) = walk(&path) {
                    return Some(found);
                }
            } else if path.file_name().is_some_and(|n| n == "session.json") {
                return Some(path);
            }
        }
        None
    }
    walk(home)
}
