//! Matrix and LU settings.
//!
//! ```toml
//! rgrowth_threshold = 1e-10
//! singularity_tolerance = 1e-14
//! kernel = "faer"
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{MatrixError, MatrixResult};
use crate::kernel::{FaerKernel, SparseLuKernel};

/// Default reciprocal pivot growth threshold for sparse factorizations.
pub const DEFAULT_RGROWTH_THRESHOLD: f64 = 1e-10;

/// Default relative pivot tolerance for dense factorizations.
pub const DEFAULT_SINGULARITY_TOLERANCE: f64 = 1e-14;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    /// Reciprocal pivot growth below which a sparse factorization fails.
    pub rgrowth_threshold: f64,

    /// Dense pivots below this fraction of the largest entry count as zero.
    pub singularity_tolerance: f64,

    /// Sparse kernel name (see [`KernelKind::available`]).
    pub kernel: String,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            rgrowth_threshold: DEFAULT_RGROWTH_THRESHOLD,
            singularity_tolerance: DEFAULT_SINGULARITY_TOLERANCE,
            kernel: KernelKind::default().as_str().to_string(),
        }
    }
}

impl MatrixConfig {
    pub fn from_toml_str(contents: &str) -> MatrixResult<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: impl AsRef<Path>) -> MatrixResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> MatrixResult<()> {
        if !(self.rgrowth_threshold.is_finite() && self.rgrowth_threshold >= 0.0) {
            return Err(MatrixError::Config(format!(
                "rgrowth_threshold must be a non-negative number, got {}",
                self.rgrowth_threshold
            )));
        }
        if !(self.singularity_tolerance.is_finite() && self.singularity_tolerance >= 0.0) {
            return Err(MatrixError::Config(format!(
                "singularity_tolerance must be a non-negative number, got {}",
                self.singularity_tolerance
            )));
        }
        KernelKind::from_str(&self.kernel)?;
        Ok(())
    }

    pub fn kernel_kind(&self) -> MatrixResult<KernelKind> {
        KernelKind::from_str(&self.kernel)
    }
}

/// Registry of available sparse kernels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KernelKind {
    #[default]
    Faer,
}

impl KernelKind {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &str) -> MatrixResult<Self> {
        match input.to_ascii_lowercase().as_str() {
            "faer" | "default" => Ok(KernelKind::Faer),
            other => Err(MatrixError::Config(format!(
                "unknown sparse kernel '{}'; supported values: {}",
                other,
                Self::available().join(", ")
            ))),
        }
    }

    pub fn build_kernel(self) -> Arc<dyn SparseLuKernel> {
        match self {
            KernelKind::Faer => Arc::new(FaerKernel::default()),
        }
    }

    pub fn available() -> &'static [&'static str] {
        &["faer"]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KernelKind::Faer => "faer",
        }
    }
}
