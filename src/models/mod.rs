//! ML model inference components

pub mod classifier;
pub mod inference;
pub mod loader;
pub mod onnx;

pub use classifier::{ClassProbabilities, Classifier};
pub use inference::{InferenceEngine, ModelOutcome};
pub use loader::ModelLoader;
pub use onnx::OnnxEnsemble;
