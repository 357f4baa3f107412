use snafu::Snafu;

/// Boxed error type returned by external collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Input rejected before any computation happens.
///
/// Nothing in the engine clamps or zeroes invalid input; the only tolerated adjustment is the
/// ledger clamping a block window that reaches below block 0.
#[derive(Debug, Snafu, PartialEq)]
#[snafu(visibility(pub))]
pub enum ValidationError {
    /// A scoring weight was zero, negative, NaN or infinite.
    #[snafu(display("weight '{field}' must be a positive finite number, got {value}"))]
    InvalidWeight {
        /// Which weight.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The impact multiplier was zero, negative, NaN or infinite.
    #[snafu(display("impact multiplier must be a positive finite number, got {value}"))]
    InvalidImpactMultiplier {
        /// The rejected value.
        value: f64,
    },

    /// A contribution record covered an empty window.
    #[snafu(display("contribution window for '{identifier}' must be at least one day"))]
    ZeroWindow {
        /// The contributor whose record was rejected.
        identifier: String,
    },

    /// More merged pull requests than pull requests.
    #[snafu(display("merged pull requests ({merged}) exceed total pull requests ({total})"))]
    MergedExceedsTotal {
        /// Merged count.
        merged: u64,
        /// Total count.
        total: u64,
    },

    /// Merge rate outside `[0, 1]` or not a number.
    #[snafu(display("merge rate must lie in [0, 1], got {value}"))]
    MergeRateOutOfRange {
        /// The rejected value.
        value: f64,
    },

    /// Negative or non-finite review average.
    #[snafu(display("average review comments must be a non-negative finite number, got {value}"))]
    InvalidReviewAverage {
        /// The rejected value.
        value: f64,
    },

    /// A recipient address failed to parse.
    #[snafu(display("malformed address '{address}': {reason}"))]
    MalformedAddress {
        /// The rejected input.
        address: String,
        /// Parser message.
        reason: String,
    },
}

/// A call across the external boundary failed.
///
/// The originating cause is kept as the error source; the engine never retries.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// Fetching off-chain contribution data failed.
    #[snafu(display("failed to fetch off-chain {what} for '{identifier}': {source}"))]
    OffChain {
        /// `contribution record` or `quality metrics`.
        what: &'static str,
        /// Contributor identifier.
        identifier: String,
        /// Underlying provider error.
        source: BoxError,
    },

    /// Reading the current chain height failed.
    #[snafu(display("failed to fetch the current block number: {source}"))]
    ChainHead {
        /// Underlying provider error.
        source: BoxError,
    },

    /// Fetching review counts for a pull request failed.
    #[snafu(display("failed to fetch reviews for pull request #{number}: {source}"))]
    Reviews {
        /// Pull request number.
        number: u64,
        /// Underlying provider error.
        source: BoxError,
    },
}

/// Errors returned by [`crate::coordinator::RewardCoordinator`] operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CoordinatorError {
    /// Input failed validation.
    #[snafu(display("invalid input: {source}"))]
    Validation {
        /// What was wrong.
        source: ValidationError,
    },

    /// An external collaborator failed.
    #[snafu(display("{source}"))]
    Provider {
        /// The provider failure.
        source: ProviderError,
    },
}

impl From<ValidationError> for CoordinatorError {
    fn from(source: ValidationError) -> Self {
        CoordinatorError::Validation { source }
    }
}

impl From<ProviderError> for CoordinatorError {
    fn from(source: ProviderError) -> Self {
        CoordinatorError::Provider { source }
    }
}

/// Type alias for coordinator results.
pub type Result<T, E = CoordinatorError> = std::result::Result<T, E>;
