use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Command {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("Unable to parse module records: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PartitionError {
    #[error("Module graph has no main module")]
    NoMain,

    #[error("Module graph has {count} main modules: {paths:?}")]
    MultipleMain { count: usize, paths: Vec<String> },
}
