use snafu::Snafu;

/// Errors raised while talking to GitHub, the RPC node or the token contract.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum NodeError {
    /// Building the HTTP client failed.
    #[snafu(display("Failed to build the GitHub client: {source}"))]
    HttpClient {
        /// The underlying reqwest error.
        source: reqwest::Error,
    },

    /// An invalid GitHub token or header value.
    #[snafu(display("Invalid GitHub request header: {source}"))]
    InvalidHeader {
        /// The rejected header value.
        source: reqwest::header::InvalidHeaderValue,
    },

    /// Joining an endpoint path onto the GitHub base URL failed.
    #[snafu(display("Invalid GitHub endpoint '{path}': {source}"))]
    Endpoint {
        /// The path that could not be joined.
        path: String,
        /// The underlying URL error.
        source: url::ParseError,
    },

    /// A GitHub request failed, returned an error status or an unexpected body.
    #[snafu(display("GitHub request to '{path}' failed: {source}"))]
    GitHubRequest {
        /// Endpoint path.
        path: String,
        /// The underlying reqwest error.
        source: reqwest::Error,
    },

    /// GitHub is still computing repository statistics.
    #[snafu(display("GitHub is still computing contributor statistics for {owner}/{repo}, retry later"))]
    StatsPending {
        /// Repository owner.
        owner: String,
        /// Repository name.
        repo: String,
    },

    /// An RPC call failed.
    #[snafu(display("RPC request failed: {source}"))]
    Rpc {
        /// The underlying transport error.
        source: alloy::transports::TransportError,
    },

    /// A contract call or transaction submission failed.
    #[snafu(display("Contract call failed: {source}"))]
    Contract {
        /// The underlying contract error.
        source: alloy::contract::Error,
    },

    /// Waiting for a transaction receipt failed.
    #[snafu(display("Failed to confirm transaction: {source}"))]
    PendingTransaction {
        /// The underlying error.
        source: alloy::providers::PendingTransactionError,
    },

    /// The transaction was mined but reverted.
    #[snafu(display("Transaction {transaction_id} reverted"))]
    Reverted {
        /// Hash of the reverted transaction.
        transaction_id: String,
    },

    /// A log did not decode as any token event.
    #[snafu(display("Failed to decode token event log: {source}"))]
    DecodeLog {
        /// The underlying ABI error.
        source: alloy::sol_types::Error,
    },

    /// A log was missing data only mined logs carry.
    #[snafu(display("Token event log is missing its {field}"))]
    IncompleteLog {
        /// The missing field.
        field: &'static str,
    },

    /// A token amount could not be converted to or from wei.
    #[snafu(display("Invalid token amount '{amount}': {source}"))]
    TokenUnits {
        /// The offending amount.
        amount: String,
        /// The underlying conversion error.
        source: alloy::primitives::utils::UnitsError,
    },

    /// Token amounts sent on chain must not be negative.
    #[snafu(display("Cannot transfer a negative token amount '{amount}'"))]
    NegativeAmount {
        /// The offending amount.
        amount: String,
    },

    /// A formatted wei amount did not parse as a decimal.
    #[snafu(display("Invalid decimal amount '{amount}': {source}"))]
    Decimal {
        /// The offending amount.
        amount: String,
        /// The underlying parse error.
        source: bigdecimal::ParseBigDecimalError,
    },

    /// An address is not a 20-byte hex string.
    #[snafu(display("Invalid Ethereum address '{address}': {source}"))]
    EthAddress {
        /// The rejected address.
        address: String,
        /// The underlying hex error.
        source: alloy::hex::FromHexError,
    },
}

/// Type alias for results returned by this crate.
pub type Result<T, E = NodeError> = std::result::Result<T, E>;
