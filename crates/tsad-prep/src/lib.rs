//! Signal sanitation, train-only scaling, and sliding-window features.
//!
//! Pure math library with zero I/O. Repairs non-finite samples, fits
//! standard or robust scalers on a training segment, and turns a series
//! plus point labels into fixed-length windows with one label per window.

mod error;
mod sanitize;
mod scaler;
mod series;
pub mod stats;
mod window;

pub use error::{ConfigError, DataQualityError, ScalerError};
pub use sanitize::{clean, CleanReport};
pub use scaler::{Scaler, ScalerKind, ScalerState};
pub use series::Series;
pub use window::{
    create_window_labels, create_windows, subsample_indices, LabelMode, WindowConfig, Windows,
};
