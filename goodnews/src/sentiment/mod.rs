use anyhow::Result;

pub mod model;

pub use model::TitleClassifier;

/// Scalar positivity scoring over normalized title text.
///
/// The concrete implementation loads a serialized artifact from disk
/// ([`TitleClassifier`]); tests substitute fixed scorers through this seam.
pub trait SentimentScorer: Send + Sync {
    /// Score one text; output lands in [0, 1].
    fn score(&self, text: &str) -> Result<f32>;

    /// Score a batch of inputs, one result per item.
    fn score_batch(&self, texts: &[&str]) -> Result<Vec<f32>> {
        texts.iter().map(|text| self.score(text)).collect()
    }
}
