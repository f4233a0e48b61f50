pub mod angle;
pub mod classifier;
pub mod detector;
pub mod landmark;
pub mod preprocess;

pub use angle::joint_angle;
pub use classifier::{
    classify, classify_angles, IncompleteSkeleton, JointAngles, Verdict, DEFAULT_LABEL,
    REQUIRED_LANDMARKS,
};
pub use detector::{BlazeDetector, LandmarkDetector};
pub use landmark::{Landmark, LandmarkIndex, LandmarkSet};
pub use preprocess::preprocess_for_landmarks;
