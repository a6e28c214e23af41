//! Error types for the prediction request path

use thiserror::Error;

/// Failure to turn form fields into a feature vector
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("missing form field '{0}'")]
    MissingField(&'static str),

    #[error("invalid {expected} for field '{field}': {value:?}")]
    InvalidValue {
        field: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("account length {0} gives a zero call-ratio denominator")]
    ZeroAccountAge(i64),
}

/// Failure while querying the classifier
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("{model} model session lock poisoned")]
    LockPoisoned { model: String },

    #[error("{model} model inference failed: {source}")]
    Runtime {
        model: String,
        #[source]
        source: ort::Error,
    },

    #[error("{model} model produced no usable {output} output")]
    MissingOutput { model: String, output: &'static str },

    #[error("unexpected class label {0}")]
    UnexpectedLabel(i64),
}

/// Coarse error classification used for status codes and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Input,
    Inference,
    Render,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Input => "input",
            ErrorKind::Inference => "inference",
            ErrorKind::Render => "render",
        }
    }
}

/// Any failure of a prediction request
#[derive(Debug, Error)]
pub enum ChurnError {
    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("failed to render page: {0}")]
    Render(#[from] std::fmt::Error),
}

impl ChurnError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChurnError::Feature(_) => ErrorKind::Input,
            ChurnError::Inference(_) => ErrorKind::Inference,
            ChurnError::Render(_) => ErrorKind::Render,
        }
    }
}
