use crate::process::Pid;

#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    #[error("unknown process {0}")]
    UnknownProcess(Pid),
    #[error("cannot access processes: {0}")]
    CannotAccessProcesses(#[source] procfs::ProcError),
    #[error("failed to read process {pid}: {source}")]
    Read {
        pid: Pid,
        #[source]
        source: procfs::ProcError,
    },
    #[error("cannot read system memory information: {0}")]
    MemoryInfo(#[source] procfs::ProcError),
}

pub type ProcessResult<T> = Result<T, ProcessError>;
