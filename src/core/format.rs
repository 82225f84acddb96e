//! Formatting dispatch: the capability the reformat loop drives.
//!
//! The loop never edits the document itself; it hands a range (or the
//! whole document) to a `RangeFormatter` and observes the result. The
//! formatter may change buffer length freely — the loop's re-diff handles
//! that. `CommandFormatter` is the CLI's implementation: an external
//! command fed the range text on stdin whose stdout replaces the range.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow, bail};

use crate::core::document::DocumentBuffer;
use crate::core::hunk::FormatRange;
use crate::infra::process;

/// An opaque formatting capability.
///
/// `format` with `None` means whole-document. Edits happen synchronously
/// before the call returns; errors propagate to the invoker untouched.
pub trait RangeFormatter {
    /// Whether the backend can format a sub-range at all. Checked before
    /// any work begins; a range-incapable backend aborts the invocation.
    fn supports_range(&self) -> bool {
        true
    }

    fn format(&mut self, doc: &mut dyn DocumentBuffer, range: Option<FormatRange>) -> Result<()>;
}

/// External-command formatter.
///
/// The configured argv may carry `{file}`, `{start}`, and `{end}`
/// placeholders. The selected lines are piped to stdin; stdout is spliced
/// back over the same line range. A non-zero exit aborts the dispatch
/// without touching the document.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
    file: PathBuf,
    workdir: PathBuf,
}

impl CommandFormatter {
    /// Build from a whitespace-split command line, expanding `~` and env
    /// vars in the program path.
    pub fn from_command_line(command: &str, file: &Path) -> Result<Self> {
        let mut words = command.split_whitespace().map(str::to_string);
        let program = words
            .next()
            .ok_or_else(|| anyhow!("formatter command is empty"))?;
        let program = shellexpand::full(&program)
            .map_err(|e| anyhow!("expand formatter program `{program}`: {e}"))?
            .into_owned();
        let workdir = file
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Ok(Self { program, args: words.collect(), file: file.to_path_buf(), workdir })
    }

    fn expanded_args(&self, start: u32, end: u32) -> Vec<String> {
        self.args
            .iter()
            .map(|a| {
                a.replace("{file}", &self.file.to_string_lossy())
                    .replace("{start}", &start.to_string())
                    .replace("{end}", &end.to_string())
            })
            .collect()
    }
}

impl RangeFormatter for CommandFormatter {
    fn format(&mut self, doc: &mut dyn DocumentBuffer, range: Option<FormatRange>) -> Result<()> {
        let line_count = doc.line_count();
        if line_count == 0 {
            return Ok(());
        }
        let (start, end) = match range {
            Some(r) => (r.start_line, r.end_line.min(line_count)),
            None => (1, line_count),
        };

        let lines = doc.lines();
        let sep = doc.line_separator().to_string();
        let selected = &lines[start as usize - 1..end as usize];
        // Pipe with a trailing separator so line-oriented formatters see a
        // complete final line.
        let input = format!("{}{}", selected.join(&sep), sep);

        let args = self.expanded_args(start, end);
        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        let out = process::run_with_stdin(&self.program, &argv, &self.workdir, &input)?;
        if !out.success {
            bail!(
                "formatter `{}` exited with {:?}: {}",
                self.program,
                out.code,
                out.stderr_brief()
            );
        }

        let formatted = split_formatted(&out.stdout, &sep);
        if formatted.as_slice() != selected {
            doc.splice(start, end, formatted);
        }
        Ok(())
    }
}

/// Split formatter stdout into lines, dropping the single trailing
/// separator the input convention added.
fn split_formatted(stdout: &str, sep: &str) -> Vec<String> {
    let body = stdout.strip_suffix(sep).unwrap_or(stdout);
    // CRLF documents may get LF output from the formatter; tolerate both.
    let body = if sep == "\r\n" { body.strip_suffix('\n').unwrap_or(body) } else { body };
    body.split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_expand() {
        let f = CommandFormatter::from_command_line(
            "indent --file {file} --lines {start}:{end}",
            Path::new("/tmp/x.c"),
        )
        .unwrap();
        let args = f.expanded_args(3, 7);
        assert_eq!(args, vec!["--file", "/tmp/x.c", "--lines", "3:7"]);
    }

    #[test]
    fn empty_command_is_rejected() {
        assert!(CommandFormatter::from_command_line("   ", Path::new("x")).is_err());
    }

    #[test]
    fn split_formatted_drops_one_trailing_separator() {
        assert_eq!(split_formatted("a\nb\n", "\n"), vec!["a", "b"]);
        assert_eq!(split_formatted("a\nb", "\n"), vec!["a", "b"]);
        assert_eq!(split_formatted("a\r\nb\r\n", "\r\n"), vec!["a", "b"]);
    }
}
