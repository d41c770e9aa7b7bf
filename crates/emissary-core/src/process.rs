use std::path::Path;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

// ─── ProcessOutput ────────────────────────────────────────────────────────

/// Raw result of one module invocation: full stdout/stderr and the exit
/// code (`None` when the process was killed by a signal).
#[derive(Debug)]
pub(crate) struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub code: Option<i32>,
}

/// Invoke a module executable once.
///
/// `selector` is passed as the single argument — an action name, or the
/// reserved `metadata` selector. When `input` is given it is serialized to
/// the child's stdin, which is then closed so single-shot modules see EOF.
/// Blocks the calling task until the process exits; stdout and stderr are
/// captured in full. This is the only place in the core that spawns a
/// process; the loader and both execution modes all go through it.
pub(crate) async fn run_module(
    path: &Path,
    selector: &str,
    input: Option<&serde_json::Value>,
) -> std::io::Result<ProcessOutput> {
    let mut cmd = Command::new(path);
    cmd.arg(selector)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn()?;

    if let Some(doc) = input {
        if let Some(mut stdin) = child.stdin.take() {
            let buf = serde_json::to_vec(doc)?;
            // A module may exit before consuming its input; that surfaces
            // through the exit status below, not as a write failure here.
            match stdin.write_all(&buf).await {
                Ok(()) => {
                    let _ = stdin.shutdown().await;
                }
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Err(e) => return Err(e),
            }
        }
    }

    let output = child.wait_with_output().await?;

    Ok(ProcessOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        code: output.status.code(),
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn script(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("mod");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, r#"printf '{"ok":true}'"#);
        let out = run_module(&path, "noop", None).await.unwrap();
        assert_eq!(out.code, Some(0));
        assert_eq!(out.stdout, r#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn selector_is_the_single_argument() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, r#"printf '%s' "$1""#);
        let out = run_module(&path, "metadata", None).await.unwrap();
        assert_eq!(out.stdout, "metadata");
    }

    #[tokio::test]
    async fn input_document_reaches_the_child_stdin() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, "cat");
        let doc = serde_json::json!({"module": "m", "action": "a", "params": {}});
        let out = run_module(&path, "a", Some(&doc)).await.unwrap();
        assert_eq!(out.stdout, doc.to_string());
    }

    #[tokio::test]
    async fn nonzero_exit_with_stderr() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, "echo boom >&2; exit 3");
        let out = run_module(&path, "a", None).await.unwrap();
        assert_eq!(out.code, Some(3));
        assert!(out.stderr.contains("boom"));
    }

    #[tokio::test]
    async fn signal_death_has_no_exit_code() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, "kill -KILL $$");
        let out = run_module(&path, "a", None).await.unwrap();
        assert_eq!(out.code, None);
    }

    #[tokio::test]
    async fn child_may_exit_without_reading_stdin() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, "exit 7");
        let doc = serde_json::json!({"params": {}});
        let out = run_module(&path, "a", Some(&doc)).await.unwrap();
        assert_eq!(out.code, Some(7));
    }

    #[tokio::test]
    async fn missing_executable_is_a_spawn_error() {
        let err = run_module(Path::new("/nonexistent/module"), "a", None).await;
        assert!(err.is_err());
    }
}
