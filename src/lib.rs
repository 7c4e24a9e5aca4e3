//! maldetect - byte-level malware classification core.
//!
//! The pipeline: raw file bytes → fixed-layout feature vector → one of a
//! family of trainable classifiers → calibrated malicious probability plus
//! provenance describing where the answering model came from.
//!
//! The crate deliberately stops at that boundary. Upload handling, scan
//! history and dashboards are collaborators that call [`features::extract`]
//! and [`model::predict`] and interpret the result.

pub mod constants;
pub mod dataset;
pub mod error;
pub mod features;
pub mod model;

pub use error::{CoreError, CoreResult};
pub use features::{extract, FeatureVector, FEATURE_COUNT};
pub use model::{
    predict, train, Algorithm, ArtifactSource, Classifier, ClassifierModel, DatasetSource,
    InferenceResult, ModelProvenance, Registry, RegistryConfig, TrainingReport, Verdict,
};
