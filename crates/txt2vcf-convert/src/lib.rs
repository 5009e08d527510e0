pub mod batch;
pub mod error;
pub mod gate;
pub mod policy;
pub mod vcf;

pub use batch::{BatchConfig, BatchSummary, ConvertedFile, Converter};
pub use error::{ConvertError, Result};
pub use gate::{AllOf, AlwaysAllow, MarkerFileGate, RunGate};
pub use policy::RemotePolicyGate;
