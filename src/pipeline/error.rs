pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug)]
pub enum PipelineError {
    InvalidBudget {
        budget: usize,
    },
    SummarizationFailed {
        level: usize,
        chunk_index: usize,
        source: BoxError,
    },
    NoProgress {
        level: usize,
        input_chars: usize,
        output_chars: usize,
    },
    Cancelled {
        level: usize,
    },
}

impl PipelineError {
    /// Position of the failing chunk, when the failure came from the summarizer.
    pub fn chunk_index(&self) -> Option<usize> {
        match self {
            PipelineError::SummarizationFailed { chunk_index, .. } => Some(*chunk_index),
            _ => None,
        }
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::InvalidBudget { budget } => {
                write!(f, "invalid budget {budget}: must be at least 1 character")
            }
            PipelineError::SummarizationFailed { level, chunk_index, source } => {
                write!(f, "summarization failed at level {level}, chunk {chunk_index}: {source}")
            }
            PipelineError::NoProgress { level, input_chars, output_chars } => write!(
                f,
                "no progress at level {level}: {input_chars} chars in, {output_chars} chars out"
            ),
            PipelineError::Cancelled { level } => write!(f, "reduction cancelled at level {level}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::SummarizationFailed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_level_and_chunk() {
        let err = PipelineError::SummarizationFailed {
            level: 0,
            chunk_index: 1,
            source: "upstream 502".into(),
        };
        assert_eq!(
            format!("{err}"),
            "summarization failed at level 0, chunk 1: upstream 502"
        );
        assert_eq!(err.chunk_index(), Some(1));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn no_progress_has_no_chunk_index() {
        let err = PipelineError::NoProgress { level: 2, input_chars: 40, output_chars: 44 };
        assert_eq!(err.chunk_index(), None);
        assert!(format!("{err}").contains("40 chars in, 44 chars out"));
    }
}
