//! Client-level error types shared across the dispatcher, token cache, and endpoints.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The access token could not be obtained.
	#[error(transparent)]
	Credential(#[from] CredentialError),
	/// Platform answered with a body the client could not interpret.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// Platform rejected the call with a non-zero `errcode`.
	#[error("Platform rejected the call: {0}.")]
	Upstream(ApiError),
	/// Platform kept rejecting the access token after a forced refresh.
	#[error("Platform rejected a freshly issued access token: {0}.")]
	TokenExpired(ApiError),
}
impl Error {
	/// Returns `true` when retrying the whole call later may succeed.
	pub fn is_transient(&self) -> bool {
		match self {
			Self::Transport(_) => true,
			Self::Credential(err) => err.is_transient(),
			Self::Upstream(err) => err.code == ApiError::SYSTEM_BUSY,
			_ => false,
		}
	}
}

/// Error envelope returned by the platform (`errcode` + `errmsg`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
	/// Non-zero platform error code.
	pub code: i64,
	/// Platform-supplied message; empty when `errmsg` was absent.
	pub message: String,
}
impl ApiError {
	/// Code the platform uses for "system busy, retry later".
	pub const SYSTEM_BUSY: i64 = -1;

	/// Creates a new error envelope.
	pub fn new(code: i64, message: impl Into<String>) -> Self {
		Self { code, message: message.into() }
	}
}
impl Display for ApiError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		if self.message.is_empty() {
			write!(f, "errcode {}", self.code)
		} else {
			write!(f, "errcode {} ({})", self.code, self.message)
		}
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A configured API prefix cannot be parsed.
	#[error("API prefix `{prefix}` is not a valid URL.")]
	InvalidPrefix {
		/// Prefix label (`sns`, `wxa`, or `cgi`).
		prefix: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A configured API prefix uses a scheme other than HTTP(S).
	#[error("API prefix `{prefix}` must use http or https, got `{scheme}`.")]
	UnsupportedScheme {
		/// Prefix label (`sns`, `wxa`, or `cgi`).
		prefix: &'static str,
		/// Rejected scheme.
		scheme: String,
	},
	/// A required credential field is empty.
	#[error("Credential field `{field}` must not be empty.")]
	MissingCredential {
		/// Credential field name.
		field: &'static str,
	},
	/// The credential retry budget must allow at least one attempt.
	#[error("Credential attempts must be at least 1.")]
	ZeroCredentialAttempts,
	/// The safety margin must not be negative.
	#[error("Token safety margin must not be negative.")]
	NegativeSafetyMargin,
	/// An endpoint path could not be joined onto its prefix.
	#[error("Endpoint path `{path}` cannot be joined onto the API prefix.")]
	InvalidEndpoint {
		/// Offending relative path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be encoded as JSON.
	#[error("Request body could not be encoded as JSON.")]
	EncodeBody(#[source] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Transport-level failures (network, timeout, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the platform.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The call did not complete within the configured timeout.
	#[error("Request timed out while calling the platform.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the platform.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}

/// Failures raised while obtaining an access token.
///
/// Every waiter of a shared refresh receives the same value, hence `Clone`.
#[derive(Clone, Debug, ThisError)]
pub enum CredentialError {
	/// Platform refused to issue a token (bad app id/secret, IP not whitelisted, ...).
	#[error("Platform refused to issue an access token: {0}.")]
	Rejected(ApiError),
	/// Token endpoint answered with an unusable grant.
	#[error("Token endpoint returned an unusable grant: {reason}.")]
	InvalidGrant {
		/// Broker-supplied reason string.
		reason: String,
	},
	/// The token request itself failed (transport or decoding).
	#[error("Access token request failed.")]
	Request {
		/// Failure raised by the dispatcher.
		#[source]
		source: Arc<Error>,
	},
}
impl CredentialError {
	/// Returns `true` when the failure came from the transport and may clear up on retry.
	///
	/// Platform refusals, busy answers included, are never transient here; the refresh loop
	/// retries only what this reports.
	pub fn is_transient(&self) -> bool {
		match self {
			Self::Request { source } => matches!(source.as_ref(), Error::Transport(_)),
			Self::Rejected(_) | Self::InvalidGrant { .. } => false,
		}
	}
}
impl From<Error> for CredentialError {
	fn from(e: Error) -> Self {
		match e {
			Error::Credential(inner) => inner,
			Error::Upstream(api) | Error::TokenExpired(api) => Self::Rejected(api),
			other => Self::Request { source: Arc::new(other) },
		}
	}
}

/// Response bodies that do not follow the platform's envelope or payload shape.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Body is not valid JSON.
	#[error("Platform returned malformed JSON.")]
	Json {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code.
		status: u16,
	},
	/// Body is JSON but not an object.
	#[error("Platform returned a JSON {found} where an object was expected.")]
	NotAnObject {
		/// JSON type that was found instead.
		found: &'static str,
		/// HTTP status code.
		status: u16,
	},
	/// The `errcode` field is present but not an integer.
	#[error("Platform returned a non-integer errcode.")]
	InvalidErrcode {
		/// HTTP status code.
		status: u16,
	},
	/// Non-success HTTP status without an error envelope.
	#[error("Platform returned HTTP {status} without an error envelope.")]
	UnexpectedStatus {
		/// HTTP status code.
		status: u16,
	},
	/// Successful payload does not match the expected endpoint shape.
	#[error("Platform payload does not match the expected shape.")]
	Payload(#[source] serde_path_to_error::Error<serde_json::Error>),
}
