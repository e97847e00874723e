//! Face-match decision consumed by the check-in flow.
//!
//! Descriptors are produced by the client-side biometric library; this module
//! only compares a live descriptor with the stored embedding.

use serde::Serialize;

pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.6;

/// Descriptor length produced by the kiosk's biometric library.
pub const DEFAULT_EMBEDDING_DIM: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FaceMatch {
    pub is_match: bool,
    pub distance: f32,
}

pub trait FaceMatcher: Send + Sync {
    fn match_face(&self, live: &[f32], stored: &[f32]) -> FaceMatch;
}

/// Euclidean distance between descriptors; a match when strictly below the threshold.
#[derive(Debug, Clone, Copy)]
pub struct EuclideanFaceMatcher {
    threshold: f32,
}

impl EuclideanFaceMatcher {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Default for EuclideanFaceMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_THRESHOLD)
    }
}

impl FaceMatcher for EuclideanFaceMatcher {
    fn match_face(&self, live: &[f32], stored: &[f32]) -> FaceMatch {
        if live.is_empty() || live.len() != stored.len() {
            return FaceMatch {
                is_match: false,
                distance: f32::INFINITY,
            };
        }

        let distance = live
            .iter()
            .zip(stored)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f32>()
            .sqrt();

        FaceMatch {
            is_match: distance < self.threshold,
            distance,
        }
    }
}
