//! Candidate translations and their scored results.

use serde::{Deserialize, Serialize};

/// A candidate translation `(x, y, z)` with an integration volume.
///
/// The volume is the size of the search cell this candidate represents
/// (`xy_step² × z_step`). It is carried for downstream consumers that
/// integrate the scored distribution; the scorer itself never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XyzTransform {
    /// X offset in meters.
    pub x: f64,
    /// Y offset in meters.
    pub y: f64,
    /// Z offset in meters.
    pub z: f64,
    /// Integration volume in cubic meters.
    pub volume: f64,
}

impl XyzTransform {
    /// Create a new candidate translation.
    #[inline]
    pub fn new(x: f64, y: f64, z: f64, volume: f64) -> Self {
        Self { x, y, z, volume }
    }
}

/// A candidate translation together with its log-probability score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredTransform {
    /// The scored candidate.
    pub transform: XyzTransform,
    /// Unnormalized log probability of this alignment.
    pub log_prob: f64,
}

impl ScoredTransform {
    /// Create a scored transform.
    #[inline]
    pub fn new(transform: XyzTransform, log_prob: f64) -> Self {
        Self { transform, log_prob }
    }
}

/// An ordered collection of scored transforms.
///
/// Insertion order is the enumeration order of the candidates and is
/// preserved; the collection is never sorted by score. Downstream selection
/// or fusion decides what to do with the distribution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoredTransforms {
    transforms: Vec<ScoredTransform>,
}

impl ScoredTransforms {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection with reserved capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            transforms: Vec::with_capacity(capacity),
        }
    }

    /// Append a scored transform.
    #[inline]
    pub fn push(&mut self, scored: ScoredTransform) {
        self.transforms.push(scored);
    }

    /// Number of scored transforms.
    #[inline]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Check if the collection is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Iterate in enumeration order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, ScoredTransform> {
        self.transforms.iter()
    }

    /// The scored transforms as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[ScoredTransform] {
        &self.transforms
    }

    /// The highest-scoring transform, or `None` if empty. Ties keep the
    /// earliest candidate in enumeration order.
    pub fn best(&self) -> Option<&ScoredTransform> {
        let mut best: Option<&ScoredTransform> = None;
        for scored in &self.transforms {
            match best {
                Some(b) if scored.log_prob <= b.log_prob => {}
                _ => best = Some(scored),
            }
        }
        best
    }
}

impl From<Vec<ScoredTransform>> for ScoredTransforms {
    fn from(transforms: Vec<ScoredTransform>) -> Self {
        Self { transforms }
    }
}

impl<'a> IntoIterator for &'a ScoredTransforms {
    type Item = &'a ScoredTransform;
    type IntoIter = std::slice::Iter<'a, ScoredTransform>;

    fn into_iter(self) -> Self::IntoIter {
        self.transforms.iter()
    }
}
