//! File I/O, dataset layout, and method-ready export for the tsad pipeline.

mod domain;
mod error;
mod layout;
mod pipeline;
mod reader;
mod writer;

pub use domain::{DatasetName, UcrMetadata, Variant};
pub use error::IoError;
pub use layout::DataLayout;
pub use pipeline::{
    prepare_method_ready, ExportConfig, MethodReady, MethodReadySummary, VariantSplit,
    VariantSummary,
};
pub use reader::{CleanedDataset, CleanedReader, ColumnReader, RawSeriesReader};
pub use writer::{write_json, DatasetWriter, MetricsLog, MetricsRow};
