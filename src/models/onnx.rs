//! ONNX Runtime implementation of the churn classifier

use crate::config::ModelsConfig;
use crate::error::InferenceError;
use crate::feature_extractor::FeatureVector;
use crate::models::classifier::{ClassProbabilities, Classifier};
use crate::models::loader::{LoadedModel, ModelLoader};
use crate::types::prediction::ChurnLabel;
use anyhow::Result;
use ort::memory::Allocator;
use ort::session::SessionOutputs;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Ensemble classifier exported as two graphs: the full ensemble for the
/// label and its first constituent estimator for the probability.
pub struct OnnxEnsemble {
    ensemble: Mutex<LoadedModel>,
    member: Mutex<LoadedModel>,
}

impl OnnxEnsemble {
    /// Load both graphs from the configured paths
    pub fn new(config: &ModelsConfig) -> Result<Self> {
        let loader = ModelLoader::with_threads(config.onnx_threads)?;
        let ensemble = loader.load_model(&config.ensemble_path, "ensemble")?;
        let member = loader.load_model(&config.member_path, "estimator_0")?;

        info!(
            ensemble = %config.ensemble_path,
            member = %config.member_path,
            "Churn classifier initialized"
        );

        Ok(Self::from_models(ensemble, member))
    }

    pub fn from_models(ensemble: LoadedModel, member: LoadedModel) -> Self {
        Self {
            ensemble: Mutex::new(ensemble),
            member: Mutex::new(member),
        }
    }

    /// Get loaded model names
    pub fn model_names(&self) -> Vec<String> {
        [&self.ensemble, &self.member]
            .iter()
            .filter_map(|m| m.lock().ok().map(|m| m.name.clone()))
            .collect()
    }
}

impl Classifier for OnnxEnsemble {
    fn predict(&self, features: &FeatureVector) -> Result<ChurnLabel, InferenceError> {
        let mut guard = lock(&self.ensemble)?;
        let LoadedModel {
            name,
            session,
            input_name,
            label_output,
            probability_output,
        } = &mut *guard;
        let name = name.as_str();

        let input = input_tensor(features, name)?;
        let outputs = session
            .run(ort::inputs![input_name.as_str() => input])
            .map_err(|source| runtime(name, source))?;

        if let Some(class) = label_output
            .as_deref()
            .and_then(|label| outputs.get(label))
            .and_then(|output| output.try_extract_tensor::<i64>().ok())
            .and_then(|(_, data)| data.first().copied())
        {
            debug!(model = %name, class = class, "Extracted label");
            return ChurnLabel::from_class(class);
        }

        // Graphs exported without a label output: take the likelier class
        let probs = extract_probabilities(&outputs, probability_output.as_deref(), name)?;
        Ok(probs.most_likely())
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<ClassProbabilities, InferenceError> {
        let mut guard = lock(&self.member)?;
        let LoadedModel {
            name,
            session,
            input_name,
            probability_output,
            ..
        } = &mut *guard;
        let name = name.as_str();

        let input = input_tensor(features, name)?;
        let outputs = session
            .run(ort::inputs![input_name.as_str() => input])
            .map_err(|source| runtime(name, source))?;

        extract_probabilities(&outputs, probability_output.as_deref(), name)
    }
}

fn lock(model: &Mutex<LoadedModel>) -> Result<MutexGuard<'_, LoadedModel>, InferenceError> {
    model.lock().map_err(|poisoned| InferenceError::LockPoisoned {
        model: poisoned.get_ref().name.clone(),
    })
}

fn runtime(model: &str, source: ort::Error) -> InferenceError {
    InferenceError::Runtime {
        model: model.to_string(),
        source,
    }
}

/// Shape [1, num_features]
fn input_tensor(features: &FeatureVector, model: &str) -> Result<Tensor<f32>, InferenceError> {
    let row = features.to_model_row();
    let shape = vec![1_i64, row.len() as i64];
    Tensor::from_array((shape, row)).map_err(|source| runtime(model, source))
}

/// Read class probabilities from either a dense tensor (RandomForest,
/// GradientBoosting) or a seq(map) ZipMap output.
fn extract_probabilities(
    outputs: &SessionOutputs,
    output_name: Option<&str>,
    model_name: &str,
) -> Result<ClassProbabilities, InferenceError> {
    if let Some(output) = output_name.and_then(|name| outputs.get(name)) {
        if let Some(probs) = probabilities_from_value(output, model_name) {
            return Ok(probs);
        }
    }

    // Fallback: iterate all outputs and try extraction
    for (name, output) in outputs.iter() {
        if name.contains("label") {
            continue;
        }
        if let Some(probs) = probabilities_from_value(&output, model_name) {
            debug!(model = %model_name, output = %name, "Extracted probabilities (fallback)");
            return Ok(probs);
        }
    }

    Err(InferenceError::MissingOutput {
        model: model_name.to_string(),
        output: "probability",
    })
}

fn probabilities_from_value(output: &DynValue, model_name: &str) -> Option<ClassProbabilities> {
    if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
        let dims: Vec<i64> = shape.iter().copied().collect();
        let probs = probabilities_from_tensor(&dims, data)?;
        debug!(model = %model_name, churn = probs.churn, "Extracted from tensor");
        return Some(probs);
    }

    let dtype = output.dtype();
    if DynSequenceValueType::can_downcast(&dtype) {
        return probabilities_from_sequence_map(output, model_name);
    }

    None
}

/// [batch, classes] or [classes]; a single column is the churn probability
fn probabilities_from_tensor(dims: &[i64], data: &[f32]) -> Option<ClassProbabilities> {
    let num_classes = *dims.last()? as usize;
    match num_classes {
        0 => None,
        1 => data.first().map(|&p| ClassProbabilities::from_churn(p as f64)),
        _ if data.len() >= 2 => Some(ClassProbabilities {
            no_churn: data[0] as f64,
            churn: data[1] as f64,
        }),
        _ => None,
    }
}

/// seq(map(int64, float)) as produced by ZipMap
fn probabilities_from_sequence_map(
    output: &DynValue,
    model_name: &str,
) -> Option<ClassProbabilities> {
    let allocator = Allocator::default();

    let sequence = output.downcast_ref::<DynSequenceValueType>().ok()?;
    let maps = sequence
        .try_extract_sequence::<DynMapValueType>(&allocator)
        .ok()?;

    // batch size is always 1
    let kv_pairs = maps.first()?.try_extract_key_values::<i64, f32>().ok()?;
    let probs = probabilities_from_pairs(&kv_pairs)?;

    debug!(model = %model_name, churn = probs.churn, "Extracted from seq(map)");
    Some(probs)
}

fn probabilities_from_pairs(pairs: &[(i64, f32)]) -> Option<ClassProbabilities> {
    let lookup = |class: i64| {
        pairs
            .iter()
            .find(|(id, _)| *id == class)
            .map(|(_, p)| *p as f64)
    };

    match (lookup(0), lookup(1)) {
        (Some(no_churn), Some(churn)) => Some(ClassProbabilities { no_churn, churn }),
        (None, Some(churn)) => Some(ClassProbabilities::from_churn(churn)),
        (Some(no_churn), None) => Some(ClassProbabilities::from_churn(1.0 - no_churn)),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor_two_classes() {
        let probs = probabilities_from_tensor(&[1, 2], &[0.3, 0.7]).unwrap();
        assert!((probs.no_churn - 0.3).abs() < 1e-6);
        assert!((probs.churn - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_tensor_single_column() {
        let probs = probabilities_from_tensor(&[1, 1], &[0.25]).unwrap();
        assert!((probs.churn - 0.25).abs() < 1e-6);
        assert!((probs.no_churn - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_tensor_flat_vector() {
        let probs = probabilities_from_tensor(&[2], &[0.9, 0.1]).unwrap();
        assert_eq!(probs.most_likely(), ChurnLabel::NoChurn);
    }

    #[test]
    fn test_tensor_empty() {
        assert!(probabilities_from_tensor(&[1, 0], &[]).is_none());
        assert!(probabilities_from_tensor(&[], &[]).is_none());
    }

    #[test]
    fn test_zipmap_pairs() {
        let probs = probabilities_from_pairs(&[(0, 0.4), (1, 0.6)]).unwrap();
        assert!((probs.churn - 0.6).abs() < 1e-6);

        let only_negative = probabilities_from_pairs(&[(0, 0.8)]).unwrap();
        assert!((only_negative.churn - 0.2).abs() < 1e-6);

        assert!(probabilities_from_pairs(&[(5, 1.0)]).is_none());
    }
}
