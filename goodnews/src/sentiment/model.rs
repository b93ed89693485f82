use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{Embedding, Linear, Module, VarBuilder};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use super::SentimentScorer;

/// Embedding row reserved for out-of-vocabulary tokens.
const UNK_ID: u32 = 0;

#[derive(Debug, Deserialize)]
struct ClassifierConfig {
    vocab_size: usize,
    embedding_dim: usize,
}

/// Binary sentiment classifier over news titles, loaded from a serialized
/// artifact directory:
///
/// - `config.json`        head dimensions (`vocab_size`, `embedding_dim`)
/// - `vocab.json`         token -> embedding row index (0 = unknown)
/// - `model.safetensors`  `embedding.weight`, `classifier.weight`,
///   `classifier.bias`
///
/// Score = sigmoid(linear(mean of token embeddings)), CPU only.
pub struct TitleClassifier {
    vocab: HashMap<String, u32>,
    embedding: Embedding,
    classifier: Linear,
    device: Device,
}

impl TitleClassifier {
    /// Load the artifact. Any missing or unreadable piece is an error;
    /// callers treat that as fatal at startup.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let device = Device::Cpu;

        let config_path = dir.join("config.json");
        let config_raw = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read model config: {}", config_path.display()))?;
        let config: ClassifierConfig =
            serde_json::from_str(&config_raw).context("failed to parse model config.json")?;

        let vocab_path = dir.join("vocab.json");
        let vocab_raw = std::fs::read_to_string(&vocab_path)
            .with_context(|| format!("failed to read model vocab: {}", vocab_path.display()))?;
        let vocab: HashMap<String, u32> =
            serde_json::from_str(&vocab_raw).context("failed to parse model vocab.json")?;

        let weights_path = dir.join("model.safetensors");
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[&weights_path], DType::F32, &device) }
            .with_context(|| format!("failed to load model weights: {}", weights_path.display()))?;
        let embedding =
            candle_nn::embedding(config.vocab_size, config.embedding_dim, vb.pp("embedding"))
                .context("model artifact is missing embedding weights")?;
        let classifier = candle_nn::linear(config.embedding_dim, 1, vb.pp("classifier"))
            .context("model artifact is missing classifier weights")?;

        Ok(Self {
            vocab,
            embedding,
            classifier,
            device,
        })
    }

    fn token_ids(&self, text: &str) -> Vec<u32> {
        let ids: Vec<u32> = text
            .split_whitespace()
            .map(|token| self.vocab.get(token).copied().unwrap_or(UNK_ID))
            .collect();
        if ids.is_empty() {
            // A fully stripped title still gets a defined score.
            vec![UNK_ID]
        } else {
            ids
        }
    }
}

impl SentimentScorer for TitleClassifier {
    fn score(&self, text: &str) -> Result<f32> {
        let ids = self.token_ids(text);
        let input = Tensor::new(ids.as_slice(), &self.device)?;
        let pooled = self.embedding.forward(&input)?.mean(0)?;
        let logit = self.classifier.forward(&pooled.unsqueeze(0)?)?;
        let score = candle_nn::ops::sigmoid(&logit)?
            .squeeze(0)?
            .squeeze(0)?
            .to_scalar::<f32>()?;
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 4-token vocabulary, 2-dim embeddings; weights chosen so "great"
    // pushes the score up and "terrible" pushes it down.
    fn write_artifact(dir: &Path) {
        std::fs::write(
            dir.join("config.json"),
            r#"{"vocab_size": 4, "embedding_dim": 2}"#,
        )
        .expect("write config.json");
        std::fs::write(
            dir.join("vocab.json"),
            r#"{"<unk>": 0, "great": 1, "news": 2, "terrible": 3}"#,
        )
        .expect("write vocab.json");

        let device = Device::Cpu;
        let embedding = Tensor::new(
            &[[0.0f32, 0.0], [4.0, 0.0], [0.0, 0.0], [-4.0, 0.0]],
            &device,
        )
        .expect("embedding tensor");
        let weight = Tensor::new(&[[1.0f32, 0.0]], &device).expect("classifier weight");
        let bias = Tensor::new(&[0.0f32], &device).expect("classifier bias");

        let tensors = HashMap::from([
            ("embedding.weight".to_string(), embedding),
            ("classifier.weight".to_string(), weight),
            ("classifier.bias".to_string(), bias),
        ]);
        candle_core::safetensors::save(&tensors, dir.join("model.safetensors"))
            .expect("write safetensors");
    }

    #[test]
    fn scores_follow_learned_weights() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_artifact(dir.path());
        let model = TitleClassifier::load(dir.path()).expect("load artifact");

        let positive = model.score("great news").expect("score positive");
        let negative = model.score("terrible news").expect("score negative");
        assert!(positive > 0.5, "positive title scored {}", positive);
        assert!(negative < 0.5, "negative title scored {}", negative);

        // Unknown tokens fall back to the reserved row and stay neutral
        let neutral = model.score("zzz qqq").expect("score unknown");
        assert!((neutral - 0.5).abs() < 1e-6);
    }

    #[test]
    fn empty_input_gets_a_defined_score() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_artifact(dir.path());
        let model = TitleClassifier::load(dir.path()).expect("load artifact");

        let score = model.score("").expect("score empty");
        assert!((score - 0.5).abs() < 1e-6);
    }

    #[test]
    fn batch_scoring_matches_single_scoring() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_artifact(dir.path());
        let model = TitleClassifier::load(dir.path()).expect("load artifact");

        let batch = model
            .score_batch(&["great news", "terrible news"])
            .expect("score batch");
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], model.score("great news").expect("score"));
        assert_eq!(batch[1], model.score("terrible news").expect("score"));
    }

    #[test]
    fn missing_artifact_fails_to_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(TitleClassifier::load(dir.path().join("absent")).is_err());
    }

    #[test]
    fn corrupt_config_fails_to_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_artifact(dir.path());
        std::fs::write(dir.path().join("config.json"), "not json").expect("clobber config");
        assert!(TitleClassifier::load(dir.path()).is_err());
    }
}
