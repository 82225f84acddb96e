//! Shared subprocess plumbing for VCS backends and command formatters.
//!
//! Every external program runs with an explicit working directory, piped
//! stdout/stderr, and a captured exit status. Callers decide what a
//! non-zero exit means; this module only reports faithfully.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

/// Captured result of one subprocess run.
#[derive(Debug)]
pub struct CmdOutput {
    /// Exit code when the process terminated normally.
    pub code: Option<i32>,
    /// True when the exit status was zero.
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    /// Stdout split line-by-line, without separators. A trailing newline
    /// does not produce a phantom empty last line.
    pub fn stdout_lines(&self) -> Vec<String> {
        let trimmed = self.stdout.strip_suffix('\n').unwrap_or(&self.stdout);
        if trimmed.is_empty() {
            return Vec::new();
        }
        trimmed
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect()
    }

    /// First line of stderr, for compact error messages.
    pub fn stderr_brief(&self) -> &str {
        self.stderr.lines().next().unwrap_or("").trim_end()
    }
}

/// Run `program args...` with the working directory pinned to `cwd`.
pub fn run(program: &str, args: &[&str], cwd: &Path) -> Result<CmdOutput> {
    run_inner(program, args, cwd, None)
}

/// Like [`run`], additionally writing `input` to the child's stdin.
pub fn run_with_stdin(program: &str, args: &[&str], cwd: &Path, input: &str) -> Result<CmdOutput> {
    run_inner(program, args, cwd, Some(input))
}

fn run_inner(program: &str, args: &[&str], cwd: &Path, input: Option<&str>) -> Result<CmdOutput> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() });

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawn `{program}` (is it installed and on PATH?)"))?;

    // Write stdin from a separate thread: the child may fill its stdout
    // pipe while still reading stdin, and a single-threaded write-then-wait
    // deadlocks once the input outgrows the pipe buffer. Write errors are
    // ignored; a child that closes stdin early (EPIPE) still reports its
    // real outcome through the exit status.
    let writer = match (input, child.stdin.take()) {
        (Some(text), Some(mut stdin)) => {
            let text = text.to_string();
            Some(std::thread::spawn(move || {
                let _ = stdin.write_all(text.as_bytes());
            }))
        }
        _ => None,
    };

    let output = child
        .wait_with_output()
        .with_context(|| format!("wait for `{program}`"))?;
    if let Some(writer) = writer {
        let _ = writer.join();
    }

    Ok(CmdOutput {
        code: output.status.code(),
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdout_lines_drops_trailing_newline_only() {
        let out = CmdOutput {
            code: Some(0),
            success: true,
            stdout: "a\nb\n".into(),
            stderr: String::new(),
        };
        assert_eq!(out.stdout_lines(), vec!["a", "b"]);
    }

    #[test]
    fn stdout_lines_handles_crlf_and_empty() {
        let out = CmdOutput {
            code: Some(0),
            success: true,
            stdout: "a\r\nb\r\n".into(),
            stderr: String::new(),
        };
        assert_eq!(out.stdout_lines(), vec!["a", "b"]);

        let empty = CmdOutput {
            code: Some(0),
            success: true,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(empty.stdout_lines().is_empty());
    }
}
