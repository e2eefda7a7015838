#[cfg(feature = "io")]
use crate::graph_loader::source::csv_loader::CsvErr;
use std::error::Error;

/// Error raised by user supplied code: vertex programs, combiners and loaders.
///
/// The engine stamps these with the superstep and vertex they happened at
/// before they reach the caller as a [`BspError`].
#[derive(thiserror::Error, Debug)]
pub enum ProgramError {
    #[error("No vertex with id {target}")]
    UnknownVertex { target: String },

    #[error("Failed to combine messages for vertex {target}: {source}")]
    Combine {
        target: String,
        source: Box<ProgramError>,
    },

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Failed(Box<dyn Error + Send + Sync>),
}

impl ProgramError {
    pub fn msg<S: Into<String>>(msg: S) -> Self {
        Self::Message(msg.into())
    }

    pub fn failed<E: Error + Send + Sync + 'static>(err: E) -> Self {
        Self::Failed(Box::new(err))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("Vertex {0} was added more than once")]
    DuplicateVertex(String),

    #[error("Edge {src} -> {dst} starts at a vertex that was never added")]
    MissingSource { src: String, dst: String },

    #[error("Record is missing field {0}")]
    MissingField(&'static str),

    #[error("Could not parse {field} from {value:?}")]
    Parse { field: &'static str, value: String },

    #[error("Loader failed: {0}")]
    Program(#[from] ProgramError),

    #[cfg(feature = "io")]
    #[error("CSV loader failed: {0}")]
    Csv(#[from] CsvErr),
}

/// Job level failure. Anything that stops a job ends up here.
#[derive(thiserror::Error, Debug)]
pub enum BspError {
    #[error("Failed to load graph{}: {source}", .record.map(|r| format!(" at record {r}")).unwrap_or_default())]
    Load {
        record: Option<u64>,
        source: LoadError,
    },

    #[error("Vertex program failed at superstep {superstep} on vertex {vertex}: {source}")]
    Compute {
        superstep: usize,
        vertex: String,
        source: ProgramError,
    },

    #[error("Vertex {sender} sent a message to unknown vertex {target} at superstep {superstep}")]
    Routing {
        superstep: usize,
        sender: String,
        target: String,
    },

    #[error("Combiner failed at superstep {superstep} for vertex {target}: {source}")]
    Combiner {
        superstep: usize,
        target: String,
        source: Box<ProgramError>,
    },

    #[error("Cleanup failed after superstep {superstep} on vertex {vertex}: {source}")]
    Cleanup {
        superstep: usize,
        vertex: String,
        source: ProgramError,
    },

    #[error("Job was cancelled before superstep {superstep}")]
    Cancelled { superstep: usize },

    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl From<LoadError> for BspError {
    fn from(source: LoadError) -> Self {
        BspError::Load {
            record: None,
            source,
        }
    }
}

impl BspError {
    /// Superstep the failure is attributed to, if any.
    pub fn superstep(&self) -> Option<usize> {
        match self {
            BspError::Compute { superstep, .. }
            | BspError::Routing { superstep, .. }
            | BspError::Combiner { superstep, .. }
            | BspError::Cleanup { superstep, .. }
            | BspError::Cancelled { superstep } => Some(*superstep),
            BspError::Load { .. } | BspError::ThreadPool(_) => None,
        }
    }

    /// Turns an error raised by `compute` on `vertex` into a job failure.
    ///
    /// Routing and combining failures keep their own variants so the caller
    /// can tell a bad graph from a bad program.
    pub(crate) fn from_compute(superstep: usize, vertex: String, err: ProgramError) -> Self {
        match err {
            ProgramError::UnknownVertex { target } => BspError::Routing {
                superstep,
                sender: vertex,
                target,
            },
            ProgramError::Combine { target, source } => BspError::Combiner {
                superstep,
                target,
                source,
            },
            source => BspError::Compute {
                superstep,
                vertex,
                source,
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unknown_vertex_is_a_routing_error() {
        let err = BspError::from_compute(
            3,
            "7".to_string(),
            ProgramError::UnknownVertex {
                target: "42".to_string(),
            },
        );
        assert!(matches!(
            err,
            BspError::Routing { superstep: 3, ref sender, ref target } if sender == "7" && target == "42"
        ));
        assert_eq!(err.superstep(), Some(3));
    }

    #[test]
    fn combine_failure_is_a_combiner_error() {
        let err = BspError::from_compute(
            1,
            "7".to_string(),
            ProgramError::Combine {
                target: "8".to_string(),
                source: Box::new(ProgramError::msg("overflow")),
            },
        );
        assert!(matches!(err, BspError::Combiner { superstep: 1, ref target, .. } if target == "8"));
    }

    #[test]
    fn wrapped_program_errors_keep_their_message() {
        let parse_err = "x".parse::<u64>().unwrap_err();
        let err = BspError::from_compute(2, "5".to_string(), ProgramError::failed(parse_err));
        assert!(matches!(
            err,
            BspError::Compute { superstep: 2, ref vertex, source: ProgramError::Failed(_) } if vertex == "5"
        ));
        assert_eq!(
            err.to_string(),
            "Vertex program failed at superstep 2 on vertex 5: invalid digit found in string"
        );
    }

    #[test]
    fn load_error_display_mentions_record() {
        let err = BspError::Load {
            record: Some(12),
            source: LoadError::MissingField("es"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to load graph at record 12: Record is missing field es"
        );
    }
}
