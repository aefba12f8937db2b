//! Core value types: points, clouds, transforms, and the motion-model seam.

pub mod motion;
pub mod point_cloud;
pub mod transforms;

pub use motion::{ConstantMotionModel, MotionModel};
pub use point_cloud::{Point3, PointCloud3};
pub use transforms::{ScoredTransform, ScoredTransforms, XyzTransform};
