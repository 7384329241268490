use std::io;
use std::path::PathBuf;

use tabula_store::StoreError;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no table selected")]
    NoTableSelected,
    #[error("no column selected")]
    NoColumnSelected,
    #[error("nothing loaded: read a column before `{op}`")]
    NothingLoaded { op: &'static str },
    #[error("stale ordering: {ordering} sorted positions over {loaded} loaded values")]
    StaleOrdering { ordering: usize, loaded: usize },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to write payload artifact {path}: {source}")]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
