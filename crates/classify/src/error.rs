use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("invalid bot matcher pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
