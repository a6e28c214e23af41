//! ONNX model loader

use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::info;

/// Loaded ONNX model with metadata
pub struct LoadedModel {
    /// Model name
    pub name: String,
    /// ONNX Runtime session
    pub session: Session,
    /// Input name for the model
    pub input_name: String,
    /// Output carrying the predicted class, if the graph has one
    pub label_output: Option<String>,
    /// Output carrying class probabilities, if the graph has one
    pub probability_output: Option<String>,
}

/// Loader for ONNX models
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        ort::init().commit()?;
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load a single ONNX model from file
    pub fn load_model<P: AsRef<Path>>(&self, path: P, name: &str) -> Result<LoadedModel> {
        let path = path.as_ref();

        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_names: Vec<&str> = session.outputs.iter().map(|o| o.name.as_str()).collect();
        let label_output = find_label_output(&output_names).map(str::to_string);
        let probability_output = find_probability_output(&output_names).map(str::to_string);

        info!(
            model = %name,
            input = %input_name,
            label = ?label_output,
            probabilities = ?probability_output,
            "Model loaded successfully"
        );

        Ok(LoadedModel {
            name: name.to_string(),
            session,
            input_name,
            label_output,
            probability_output,
        })
    }
}

/// scikit-learn exports name it "label" or "output_label"
fn find_label_output<'a>(names: &[&'a str]) -> Option<&'a str> {
    names.iter().copied().find(|n| n.contains("label"))
}

/// "probabilities", "output_probability" or a bare trailing output
fn find_probability_output<'a>(names: &[&'a str]) -> Option<&'a str> {
    names
        .iter()
        .copied()
        .find(|n| n.contains("prob"))
        .or_else(|| names.iter().copied().rev().find(|n| !n.contains("label")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_discovery_sklearn_names() {
        let names = ["label", "probabilities"];
        assert_eq!(find_label_output(&names), Some("label"));
        assert_eq!(find_probability_output(&names), Some("probabilities"));
    }

    #[test]
    fn test_output_discovery_zipmap_names() {
        let names = ["output_label", "output_probability"];
        assert_eq!(find_label_output(&names), Some("output_label"));
        assert_eq!(find_probability_output(&names), Some("output_probability"));
    }

    #[test]
    fn test_output_discovery_without_label() {
        let names = ["variable"];
        assert_eq!(find_label_output(&names), None);
        assert_eq!(find_probability_output(&names), Some("variable"));
    }
}
