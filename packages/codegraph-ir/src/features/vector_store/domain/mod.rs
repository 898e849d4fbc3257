//! Vector Store domain logic: cosine similarity and metadata filters
//! (spec §4.6).

use serde::{Deserialize, Serialize};

/// Cosine similarity with a zero-norm fallback to `0.0` (spec §4.6:
/// "when either norm is zero, similarity is defined as 0").
pub fn cosine(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a <= f64::EPSILON || norm_b <= f64::EPSILON {
        return 0.0;
    }
    let sim = dot / (norm_a.sqrt() * norm_b.sqrt());
    sim.clamp(-1.0, 1.0)
}

/// A conjunction of equality predicates over stored metadata (spec
/// §4.6 "Filter"). The store must apply this during the kNN search,
/// not as a post-filter, so results below `k` aren't silently dropped
/// by filtering after the fact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataFilter {
    pub file_path_eq: Option<String>,
    pub file_path_ne: Option<String>,
    pub language_eq: Option<String>,
}

impl MetadataFilter {
    pub fn exclude_file(file_path: impl Into<String>) -> Self {
        Self {
            file_path_ne: Some(file_path.into()),
            ..Default::default()
        }
    }

    pub fn matches(&self, file_path: &str, language: Option<&str>) -> bool {
        if let Some(expected) = &self.file_path_eq {
            if expected != file_path {
                return false;
            }
        }
        if let Some(excluded) = &self.file_path_ne {
            if excluded == file_path {
                return false;
            }
        }
        if let Some(expected) = &self.language_eq {
            if language != Some(expected.as_str()) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = vec![1.0f32, 2.0, 3.0];
        assert!((cosine(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        let zero = vec![0.0f32, 0.0, 0.0];
        let other = vec![1.0f32, 2.0, 3.0];
        assert_eq!(cosine(&zero, &other), 0.0);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        let a = vec![1.0f32, 0.0];
        let b = vec![0.0f32, 1.0];
        assert!(cosine(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn filter_excludes_self_file() {
        let filter = MetadataFilter::exclude_file("a.py");
        assert!(!filter.matches("a.py", None));
        assert!(filter.matches("b.py", None));
    }
}
