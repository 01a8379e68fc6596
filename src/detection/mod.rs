pub mod brute_force;
pub mod classifier;

pub use brute_force::{BruteForceDetector, WindowStatus};
pub use classifier::EventClassifier;
