/// A labeled confidence score out of the dialect classifier.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Prediction {
    pub label: String,
    pub score: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Raw classifier output before boundary normalization.
///
/// A single clip yields one score set; batched inference yields several.
/// Both shapes collapse into one canonical ordered sequence immediately
/// after the inference call, so the rest of the pipeline only ever sees
/// `Vec<Prediction>`.
#[derive(Clone, Debug)]
pub enum RawPredictions {
    Single(Prediction),
    Batch(Vec<Prediction>),
}

impl RawPredictions {
    /// Normalize into an ordered sequence, dropping entries whose score is
    /// not a finite number instead of failing.
    pub fn into_ordered(self) -> Vec<Prediction> {
        let mut predictions = match self {
            RawPredictions::Single(prediction) => vec![prediction],
            RawPredictions::Batch(predictions) => predictions,
        };
        predictions.retain(|p| p.score.is_finite());
        predictions.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        predictions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_becomes_one_element_sequence() {
        let raw = RawPredictions::Single(Prediction::new("LEV", 0.8));
        let predictions = raw.into_ordered();
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].label, "LEV");
        assert_relative_eq!(predictions[0].score, 0.8);
    }

    #[test]
    fn test_batch_passes_through() {
        let raw = RawPredictions::Batch(vec![Prediction::new("EGY", 0.9)]);
        let predictions = raw.into_ordered();
        assert_eq!(predictions, vec![Prediction::new("EGY", 0.9)]);
    }

    #[test]
    fn test_batch_sorted_descending_by_score() {
        let raw = RawPredictions::Batch(vec![
            Prediction::new("GLF", 0.1),
            Prediction::new("EGY", 0.7),
            Prediction::new("LEV", 0.2),
        ]);
        let predictions = raw.into_ordered();
        let labels: Vec<&str> = predictions.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["EGY", "LEV", "GLF"]);
    }

    #[test]
    fn test_non_finite_scores_dropped_silently() {
        let raw = RawPredictions::Batch(vec![
            Prediction::new("EGY", f32::NAN),
            Prediction::new("LEV", 0.5),
            Prediction::new("GLF", f32::INFINITY),
        ]);
        let predictions = raw.into_ordered();
        assert_eq!(predictions, vec![Prediction::new("LEV", 0.5)]);
    }

    #[test]
    fn test_empty_batch_stays_empty() {
        assert!(RawPredictions::Batch(Vec::new()).into_ordered().is_empty());
    }
}
