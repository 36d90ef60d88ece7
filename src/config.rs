//! Extraction options shared by the time series extractors.

/// Maximum number of files opened jointly before switching to per-file reads.
///
/// Fixed at 100 rather than probed from `ulimit -n`: joining many more files
/// at once is much slower than reading them one at a time.
pub const DEFAULT_FILE_BUDGET: usize = 100;

/// Default smoothing window (monthly output, one year).
pub const DEFAULT_WINDOW_SIZE: usize = 12;

/// Reference salinity used to derive freshwater from salt, in g/kg.
pub const REFERENCE_SALINITY: f64 = 34.8;

/// How the files of one extraction are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStrategy {
    /// All files opened together and sliced once
    Joint,
    /// Files opened and closed one after the other
    PerFile,
}

impl ReadStrategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Joint => "joint",
            Self::PerFile => "per-file",
        }
    }
}

/// Options controlling how an extraction reads its inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOptions {
    pub file_budget: usize,
}

impl ExtractionOptions {
    /// Options with an explicit file budget
    #[must_use]
    pub fn with_file_budget(file_budget: usize) -> Self {
        Self { file_budget }
    }

    /// Joint reads while the file count fits the budget, per-file reads otherwise.
    #[must_use]
    pub fn strategy_for(&self, nfiles: usize) -> ReadStrategy {
        if nfiles <= self.file_budget {
            ReadStrategy::Joint
        } else {
            ReadStrategy::PerFile
        }
    }
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            file_budget: DEFAULT_FILE_BUDGET,
        }
    }
}
