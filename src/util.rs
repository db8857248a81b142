use glob::{GlobError, PatternError, glob};
use std::process::{Output, Stdio};
use std::{
    collections::HashSet,
    io::{Error as IoError, ErrorKind},
    path::{Component, Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command as TokioCommand;
use tokio::task::JoinHandle;

use crate::destination::to_forward_slashes;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("Invalid glob pattern: {0}")]
    GlobPattern(#[from] PatternError),
    #[error("Failed to expand glob: {0}")]
    GlobExpansion(#[from] GlobError),
    #[error("IO error: {0}")]
    Io(#[from] IoError),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Command execution error: {0}")]
    Io(#[from] IoError),
    #[error("Command timed out")]
    Timeout,
}

pub fn parse_timeout(timeout_str: Option<&str>, default_timeout: Option<&str>) -> Option<Duration> {
    let timeout_to_parse = timeout_str.or(default_timeout)?;

    if timeout_to_parse == "0" || timeout_to_parse.is_empty() {
        return None;
    }

    match timeout_to_parse.parse::<humantime::Duration>() {
        Ok(duration) => Some(duration.into()),
        Err(e) => {
            tracing::warn!(
                timeout = %timeout_to_parse,
                "Invalid timeout format ({}), use a duration like '5m', '30s', '1h30m'",
                e
            );
            None
        }
    }
}

/// Forward-slash form of a group's `cwd` without `.` components, so `./lib/`,
/// `lib/` and `lib` all become `lib` and `.` becomes the empty string. Glob
/// matches never carry a leading `./`, so the prefix must go before it is
/// stripped from them.
pub fn normalize_cwd(cwd: Option<&str>) -> String {
    let cwd = to_forward_slashes(cwd.unwrap_or(""));
    let cleaned: PathBuf = Path::new(&cwd)
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect();
    to_forward_slashes(&cleaned.to_string_lossy())
}

/// Expands `patterns` inside `cwd` and returns the matching files relative to
/// `cwd`, in pattern order and without duplicates.
pub fn expand_sources(patterns: &[String], cwd: Option<&str>) -> Result<Vec<String>, FileError> {
    let base_dir = normalize_cwd(cwd);
    let base = Path::new(&base_dir);
    let mut result = Vec::new();
    let mut seen = HashSet::new();

    for pattern in patterns {
        let full_pattern = base.join(pattern);
        let full_pattern = full_pattern.to_string_lossy();

        if is_glob_pattern(pattern) {
            for expanded_path in expand_single_glob(&full_pattern)? {
                if !expanded_path.is_file() {
                    continue;
                }
                let relative = expanded_path
                    .strip_prefix(base)
                    .unwrap_or(&expanded_path)
                    .to_string_lossy()
                    .to_string();
                let relative = to_forward_slashes(&relative);
                if seen.insert(relative.clone()) {
                    result.push(relative);
                }
            }
        } else if Path::new(full_pattern.as_ref()).is_file() {
            let relative = to_forward_slashes(pattern);
            if seen.insert(relative.clone()) {
                result.push(relative);
            }
        } else {
            tracing::warn!(path = %full_pattern, "Source file does not exist");
        }
    }

    Ok(result)
}

fn is_glob_pattern(path: &str) -> bool {
    path.contains('*') || path.contains('?') || path.contains('[')
}

fn expand_single_glob(pattern: &str) -> Result<Vec<std::path::PathBuf>, FileError> {
    let glob_paths = glob(pattern)?;
    glob_paths
        .collect::<Result<Vec<_>, _>>()
        .map_err(FileError::from)
}

/// Runs `command` through the platform shell, feeding `input` to its stdin.
pub async fn run_command_with_timeout(
    command: &str,
    input: &[u8],
    envs: &[(&str, &str)],
    timeout: Option<Duration>,
    stream_output: bool,
) -> Result<Output, CommandError> {
    let mut cmd = if cfg!(target_os = "windows") {
        let mut c = TokioCommand::new("cmd");
        c.args(["/C", command]);
        c
    } else {
        let mut c = TokioCommand::new("sh");
        c.args(["-c", command]);
        c
    };

    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(Stdio::piped())
        .envs(envs.iter().copied());

    let mut child = cmd.spawn()?;

    let stdin_handle = child.stdin.take().map(|mut stdin| {
        let input = input.to_vec();
        tokio::spawn(async move {
            match stdin.write_all(&input).await {
                // The engine may exit without reading its stdin.
                Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
                other => other,
            }
        })
    });

    let stdout_handle = collect_pipe(child.stdout.take(), tokio::io::stdout(), stream_output);
    let stderr_handle = collect_pipe(child.stderr.take(), tokio::io::stderr(), stream_output);

    let status = match timeout {
        Some(duration) => {
            tokio::select! {
                result = child.wait() => result?,
                _ = tokio::time::sleep(duration) => {
                    if let Err(kill_err) = child.kill().await {
                        tracing::warn!("Failed to kill timed-out process: {}", kill_err);
                    }
                    let _ = child.wait().await;
                    return Err(CommandError::Timeout);
                }
            }
        }
        None => child.wait().await?,
    };

    if let Some(handle) = stdin_handle {
        handle.await.map_err(IoError::other)??;
    }

    let stdout = join_pipe(stdout_handle).await?;
    let stderr = join_pipe(stderr_handle).await?;

    Ok(Output {
        status,
        stdout,
        stderr,
    })
}

fn collect_pipe<R, W>(
    pipe: Option<R>,
    mut sink: W,
    stream_output: bool,
) -> JoinHandle<Result<Vec<u8>, CommandError>>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut collected: Vec<u8> = Vec::new();
        if let Some(mut pipe) = pipe {
            let mut buf = [0u8; 8192];
            loop {
                let n = pipe.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                collected.extend_from_slice(&buf[..n]);
                if stream_output {
                    sink.write_all(&buf[..n]).await?;
                }
            }
            if stream_output {
                sink.flush().await?;
            }
        }
        Ok::<Vec<u8>, CommandError>(collected)
    })
}

async fn join_pipe(
    handle: JoinHandle<Result<Vec<u8>, CommandError>>,
) -> Result<Vec<u8>, CommandError> {
    match handle.await {
        Ok(result) => result,
        Err(e) => Err(CommandError::Io(IoError::other(e))),
    }
}
