//! Motion model collaborator seam.

/// Prior probability of a candidate translation, supplied by the caller.
///
/// Typical implementations put a Gaussian around the velocity predicted from
/// the track history; the alignment core only requires that the returned
/// probability is strictly positive (its log is taken) and at most 1.
///
/// `Sync` is required because candidate scoring may fan out across worker
/// threads, each holding a shared reference to the model.
pub trait MotionModel: Sync {
    /// Prior probability in `(0, 1]` for the translation `(dx, dy, dz)`.
    fn compute_score(&self, dx: f64, dy: f64, dz: f64) -> f64;
}

/// Uniform prior: every candidate gets the same probability.
///
/// Useful when no track history exists yet, and as a stand-in for tests,
/// where it makes the final scores depend on the measurement term alone.
#[derive(Debug, Clone, Copy)]
pub struct ConstantMotionModel {
    prob: f64,
}

impl ConstantMotionModel {
    /// Create a uniform prior with the given probability.
    pub fn new(prob: f64) -> Self {
        Self { prob }
    }
}

impl MotionModel for ConstantMotionModel {
    fn compute_score(&self, _dx: f64, _dy: f64, _dz: f64) -> f64 {
        self.prob
    }
}

impl<M: MotionModel + ?Sized> MotionModel for &M {
    fn compute_score(&self, dx: f64, dy: f64, dz: f64) -> f64 {
        (**self).compute_score(dx, dy, dz)
    }
}
