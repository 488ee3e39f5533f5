use super::{EdgeOperation, ProcessError};
use crate::config::ServiceConfig;
use crate::models::Thresholds;
use crate::services::cleaner::{FileCleaner, ScratchDir, TempFiles};
use crate::utils::temp_path::unique_temp_path;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Runs an external program as the edge detector.
///
/// Invocation: `<program> <args...> <input> [--lower <v>] [--upper <v>]`.
/// The program writes a new image and prints its path; the last non-empty
/// line of stdout is taken as that path.
///
/// Each call gets a scratch directory under `work_dir`, exported as
/// [`OUTPUT_DIR_ENV`]. Output written there is moved next to the other
/// request files; whatever else is left in it, including partial output of a
/// killed run, is removed when the call ends.
pub struct CommandEdgeOperation {
    program: String,
    args: Vec<String>,
    work_dir: PathBuf,
}

pub const OUTPUT_DIR_ENV: &str = "EDGE_OUTPUT_DIR";

impl CommandEdgeOperation {
    pub fn new(program: impl Into<String>, args: Vec<String>, work_dir: PathBuf) -> Self {
        Self {
            program: program.into(),
            args,
            work_dir,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, ProcessError> {
        let program = config
            .edge_command
            .clone()
            .ok_or_else(|| ProcessError::NotConfigured("EDGE_COMMAND is not set".to_string()))?;
        Ok(Self::new(
            program,
            config.edge_command_args.clone(),
            config.temp_dir.clone(),
        ))
    }

    fn build_command(&self, input: &Path, thresholds: Thresholds, output_dir: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(input)
            .env(OUTPUT_DIR_ENV, output_dir);

        if let Some(lower) = thresholds.lower {
            command.arg("--lower").arg(lower.to_string());
        }
        if let Some(upper) = thresholds.upper {
            command.arg("--upper").arg(upper.to_string());
        }

        // Abandoned calls (timeouts) must not leave the child running
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

fn parse_output_path(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(PathBuf::from)
}

#[async_trait::async_trait]
impl EdgeOperation for CommandEdgeOperation {
    fn name(&self) -> &'static str {
        "command"
    }

    async fn find_edges(
        &self,
        input: &Path,
        thresholds: Thresholds,
    ) -> Result<PathBuf, ProcessError> {
        tracing::debug!(
            "Running {} on {} (lower={:?}, upper={:?})",
            self.program,
            input.display(),
            thresholds.lower,
            thresholds.upper
        );

        let scratch =
            ScratchDir::create(unique_temp_path(&self.work_dir, "edges", ""), FileCleaner).await?;

        let output = self
            .build_command(input, thresholds, scratch.path())
            .output()
            .await
            .map_err(ProcessError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::error!("{} failed ({}): {}", self.program, output.status, stderr);
            return Err(ProcessError::Failed {
                status: output.status.to_string(),
                stderr,
            });
        }

        let reported = parse_output_path(&String::from_utf8_lossy(&output.stdout))
            .ok_or(ProcessError::NoOutput)?;
        if !reported.starts_with(scratch.path()) {
            return Ok(reported);
        }

        if !tokio::fs::try_exists(&reported).await.unwrap_or(false) {
            return Err(ProcessError::MissingOutput(reported));
        }

        // Move it out before the scratch dir goes away
        let extension = reported.extension().and_then(|e| e.to_str()).unwrap_or("png");
        let target = unique_temp_path(&self.work_dir, "edges", extension);
        let mut pending = TempFiles::new(FileCleaner);
        pending.track(&target);
        tokio::fs::rename(&reported, &target).await?;
        pending.disarm();

        Ok(target)
    }

    async fn health_check(&self) -> bool {
        let program = Path::new(&self.program);
        if program.components().count() > 1 {
            return program.is_file();
        }

        std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
            .unwrap_or(false)
    }
}
