use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

const PATH_PLACEHOLDER: &str = "{path}";

/// An external program invocation such as `arecord ... {path}`.
///
/// The template is split on whitespace; every `{path}` occurrence in an
/// argument is replaced by the audio file path. No shell is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    program: String,
    args: Vec<String>,
}

impl CommandTemplate {
    pub fn parse(template: &str) -> Result<Self, String> {
        let mut parts = template.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| "command template is empty".to_string())?;
        let args: Vec<String> = parts.collect();

        if program.contains(PATH_PLACEHOLDER) {
            return Err(format!(
                "command template '{}' must name a program before {{path}}",
                template
            ));
        }
        if !args.iter().any(|a| a.contains(PATH_PLACEHOLDER)) {
            return Err(format!("command template '{}' has no {{path}} placeholder", template));
        }

        Ok(Self { program, args })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn render_args(&self, path: &Path) -> Vec<String> {
        let path = path.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace(PATH_PLACEHOLDER, &path))
            .collect()
    }

    /// Runs the command to completion; a non-zero exit is an error carrying stderr.
    pub async fn run(&self, path: &Path) -> Result<(), String> {
        let args = self.render_args(path);
        log::debug!("Running {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| format!("failed to start '{}': {}", self.program, e))?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(format!(
            "'{}' exited with {}: {}",
            self.program,
            output.status,
            stderr.trim()
        ))
    }
}
