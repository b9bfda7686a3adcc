//! Binary scoring of anomaly predictions against ground truth.
//!
//! Pure math library with zero I/O. Reconciles ragged truth/prediction
//! lengths, coerces labels to 0/1, and derives confusion counts,
//! precision, recall, F1, and accuracy. Also turns continuous detector
//! scores into labels with a quantile threshold.

mod align;
mod binary;
mod confusion;
mod error;
mod metrics;
mod segments;
mod threshold;

pub use align::{align_lengths, align_pair};
pub use binary::to_binary;
pub use confusion::{confusion_counts, ConfusionCounts};
pub use error::EvalError;
pub use metrics::{compute_binary_metrics, BinaryMetrics};
pub use segments::anomaly_segments;
pub use threshold::QuantileThreshold;
