//! Mini program client composing the dispatcher, token cache, and configuration.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	cache::TokenCache,
	config::{ApiPrefix, ClientConfig},
	dispatch::{ApiResponse, Dispatcher, Payload},
	error::{ApiError, ConfigError},
	http::ApiHttpClient,
	obs::{self, CallKind},
	store::TokenStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Client specialized for the crate's default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestMiniProgramClient = MiniProgramClient<ReqwestHttpClient>;

/// Coordinates platform calls for a single app id.
///
/// The client owns the transport, the immutable configuration, and the [`TokenCache`], so
/// endpoint helpers only marshal parameters. Token-authorized calls go through
/// [`MiniProgramClient::call_authorized`], which retries exactly once with a fresh token when
/// the platform reports an invalid or expired access token.
pub struct MiniProgramClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	config: Arc<ClientConfig>,
	dispatcher: Dispatcher<C>,
	tokens: TokenCache<C>,
}
impl<C> MiniProgramClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(config: ClientConfig, http_client: impl Into<Arc<C>>) -> Result<Self> {
		let dispatcher = Dispatcher::new(http_client);
		let tokens = TokenCache::new(&config, dispatcher.clone(), None)?;

		Ok(Self { config: Arc::new(config), dispatcher, tokens })
	}

	/// Shares access tokens through `store`, replacing the cache (and any token it held).
	pub fn with_token_store(mut self, store: Arc<dyn TokenStore>) -> Result<Self> {
		self.tokens = TokenCache::new(&self.config, self.dispatcher.clone(), Some(store))?;

		Ok(self)
	}

	/// Returns the client configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Returns the dispatcher, for calls that need no credentials.
	pub fn dispatcher(&self) -> &Dispatcher<C> {
		&self.dispatcher
	}

	/// Returns the access token cache.
	pub fn token_cache(&self) -> &TokenCache<C> {
		&self.tokens
	}

	/// Posts `body` to a token-authorized endpoint under the `wxa` prefix.
	pub async fn call_authorized<B>(&self, path: &str, body: &B) -> Result<Payload>
	where
		B: ?Sized + Serialize,
	{
		let call = self.post_authorized(ApiPrefix::Wxa, path, body);

		obs::observe(CallKind::Authorized, "call_authorized", call).await
	}

	/// Posts `body` to `path` under `prefix` with an `access_token` query parameter.
	///
	/// When the platform answers with a code from
	/// [`ClientConfig::token_error_codes`], the token that was used is invalidated and the call
	/// is retried once with a fresh token. A second token error surfaces as
	/// [`Error::TokenExpired`]; any other platform failure as [`Error::Upstream`].
	pub async fn post_authorized<B>(
		&self,
		prefix: ApiPrefix,
		path: &str,
		body: &B,
	) -> Result<Payload>
	where
		B: ?Sized + Serialize,
	{
		let endpoint = self.config.endpoint(prefix, path)?;
		let body = serde_json::to_value(body).map_err(ConfigError::EncodeBody)?;
		let mut retried = false;

		loop {
			let token = self.tokens.access_token().await?;
			let mut url = endpoint.clone();

			url.query_pairs_mut().append_pair("access_token", token.value.expose());

			let err = match self.dispatcher.request(url, Some(body.clone())).await? {
				ApiResponse::Success(payload) => return Ok(payload),
				ApiResponse::Failure(err) => err,
			};

			if !self.config.is_token_error(err.code) {
				return Err(Error::Upstream(err));
			}
			if retried {
				return Err(Error::TokenExpired(err));
			}

			self.reject_token(&token, &err).await;

			retried = true;
		}
	}

	async fn reject_token(&self, token: &AccessToken, err: &ApiError) {
		let dropped = self.tokens.invalidate(token).await;

		if dropped {
			obs::log_token_invalidated(self.tokens.app_id(), Some(err.code));
		}
	}
}
#[cfg(feature = "reqwest")]
impl MiniProgramClient<ReqwestHttpClient> {
	/// Creates a client backed by a default reqwest transport with a bounded per-call timeout.
	pub fn new(config: ClientConfig) -> Result<Self> {
		Self::with_http_client(config, ReqwestHttpClient::default())
	}
}
impl<C> Clone for MiniProgramClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			config: Arc::clone(&self.config),
			dispatcher: self.dispatcher.clone(),
			tokens: self.tokens.clone(),
		}
	}
}
impl<C> Debug for MiniProgramClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MiniProgramClient")
			.field("app_id", &self.config.credentials.app_id)
			.field("wxa_prefix", &self.config.wxa_prefix.as_str())
			.field("tokens", &self.tokens)
			.finish()
	}
}
