use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("malformed version '{0}', expected MAJOR.MINOR.PATCH or a -SNAPSHOT")]
    MalformedVersion(String),
    #[error("{subject} is required to have version {minimum} or higher, while you use {current}")]
    VersionTooOld {
        subject: String,
        minimum: String,
        current: String,
    },
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("unknown platform '{0}', expected Java or JavaScript")]
    UnknownPlatform(String),
    #[error("the command \"{command}\" exited with #{code} code")]
    ProcessFailed { command: String, code: i32 },
    #[error("the command \"{command}\" did not finish in {seconds}s")]
    Timeout { command: String, seconds: u64 },
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("another external invocation is already being tracked in this process")]
    ProgressBusy,
    #[error("required artifact {0} is absent, build it first")]
    MissingArtifact(PathBuf),
    #[error("failed to read manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("network error: {0}")]
    Network(String),
    #[error("{0}")]
    Failed(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Exit code the whole process should terminate with.
    pub fn exit_code(&self) -> i32 {
        match self {
            CoreError::ProcessFailed { code, .. } if *code != 0 => *code,
            _ => 1,
        }
    }
}
