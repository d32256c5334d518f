//! Access token cache with single-flight refresh.
//!
//! [`TokenCache::access_token`] hands out the cached token while
//! `now < expires_at - safety_margin` without touching the network. Otherwise it joins the
//! refresh already in flight or starts one. The in-flight refresh is a shared future owned by
//! the cache rather than by the caller that started it: callers that give up waiting leave it
//! running for everyone else, and concurrent callers always observe exactly one token-issuing
//! request per refresh cycle.
//!
//! A refresh first consults the optional [`TokenStore`] (another instance may already have
//! published a fresh token), then calls the token endpoint, retrying transport failures up to
//! the configured attempt budget.

mod metrics;

pub use metrics::CacheMetrics;

// crates.io
use futures::future::{BoxFuture, FutureExt, Shared};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Credentials, Secret},
	config::{ApiPrefix, ClientConfig},
	dispatch::Dispatcher,
	error::CredentialError,
	http::ApiHttpClient,
	obs::{self, CallKind, CallOutcome, CallSpan},
	store::TokenStore,
};

type RefreshFuture = Shared<BoxFuture<'static, Result<AccessToken, CredentialError>>>;

/// Caches the platform access token and refreshes it on demand.
pub struct TokenCache<C>
where
	C: ?Sized + ApiHttpClient,
{
	inner: Arc<CacheInner<C>>,
}
impl<C> TokenCache<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a cache that issues tokens through `dispatcher` and optionally shares them via
	/// `store`.
	pub fn new(
		config: &ClientConfig,
		dispatcher: Dispatcher<C>,
		store: Option<Arc<dyn TokenStore>>,
	) -> Result<Self> {
		let token_url = token_url(config)?;

		Ok(Self {
			inner: Arc::new(CacheInner {
				dispatcher,
				credentials: config.credentials.clone(),
				token_url,
				safety_margin: config.safety_margin,
				attempts: config.credential_attempts,
				store,
				metrics: CacheMetrics::default(),
				state: Mutex::new(CacheState::default()),
			}),
		})
	}

	/// Returns a token that is fresh now, refreshing when absent or inside the safety margin.
	///
	/// A refresh only advances while some caller awaits it. When every waiter gave up and the
	/// next caller resumes it much later, the resumed token may already be past its expiry; in
	/// that case one new refresh is started and its result returned.
	pub async fn access_token(&self) -> Result<AccessToken> {
		let token = match self.lookup() {
			Lookup::Hit(token) => return Ok(token),
			Lookup::Refresh(refresh) => refresh.await?,
		};

		if !token.is_expired_at(OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		match self.lookup() {
			Lookup::Hit(token) => Ok(token),
			Lookup::Refresh(refresh) => Ok(refresh.await?),
		}
	}

	/// Drops the cached token if it is still `stale`, so the next call refreshes.
	///
	/// Tokens that were already replaced are left alone, which keeps a burst of rejections for
	/// the same token down to one refresh. The in-memory token is dropped before the store is
	/// told, so a cancelled caller never leaves the rejected token cached. Returns `true` when
	/// the cached token was dropped.
	pub async fn invalidate(&self, stale: &AccessToken) -> bool {
		let dropped = {
			let mut state = self.inner.state.lock();

			state.rejected = Some(stale.value.clone());

			if state.current.as_ref().is_some_and(|current| current.value == stale.value) {
				state.current = None;
				self.inner.metrics.record_invalidation();

				true
			} else {
				false
			}
		};

		if let Some(store) = &self.inner.store {
			let app_id = self.inner.credentials.app_id.as_str();

			if let Err(err) = store.invalidate(app_id, &stale.value).await {
				obs::log_store_failure("invalidate", &err);
			}
		}

		dropped
	}

	/// Forgets the cached token unconditionally.
	pub fn clear(&self) {
		self.inner.state.lock().current = None;
	}

	/// Returns the cached token, fresh or not, without refreshing.
	pub fn peek(&self) -> Option<AccessToken> {
		self.inner.state.lock().current.clone()
	}

	/// Returns `true` while a refresh is in flight.
	pub fn is_refreshing(&self) -> bool {
		self.inner.state.lock().inflight.is_some()
	}

	/// Returns the cache counters.
	pub fn metrics(&self) -> &CacheMetrics {
		&self.inner.metrics
	}

	/// Returns the app id whose tokens this cache manages.
	pub fn app_id(&self) -> &str {
		&self.inner.credentials.app_id
	}
}
impl<C> TokenCache<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn lookup(&self) -> Lookup {
		let mut state = self.inner.state.lock();
		let now = OffsetDateTime::now_utc();

		if let Some(token) =
			state.current.as_ref().filter(|token| token.is_fresh_at(now, self.inner.safety_margin))
		{
			self.inner.metrics.record_hit();

			return Lookup::Hit(token.clone());
		}

		match state.inflight.as_ref().map(|inflight| inflight.future.clone()) {
			Some(joined) => {
				self.inner.metrics.record_join();

				Lookup::Refresh(joined)
			},
			None => Lookup::Refresh(start_refresh(&self.inner, &mut state)),
		}
	}
}
impl<C> Clone for TokenCache<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		Self { inner: Arc::clone(&self.inner) }
	}
}
impl<C> Debug for TokenCache<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.inner.state.lock();

		f.debug_struct("TokenCache")
			.field("app_id", &self.inner.credentials.app_id)
			.field("cached", &state.current.is_some())
			.field("refreshing", &state.inflight.is_some())
			.field("store_set", &self.inner.store.is_some())
			.finish()
	}
}

struct CacheInner<C>
where
	C: ?Sized + ApiHttpClient,
{
	dispatcher: Dispatcher<C>,
	credentials: Credentials,
	token_url: Url,
	safety_margin: Duration,
	attempts: u32,
	store: Option<Arc<dyn TokenStore>>,
	metrics: CacheMetrics,
	state: Mutex<CacheState>,
}
impl<C> CacheInner<C>
where
	C: ?Sized + ApiHttpClient,
{
	async fn refresh(&self) -> Result<AccessToken, CredentialError> {
		if let Some(token) = self.load_shared().await {
			return Ok(token);
		}

		let mut attempt = 0;

		loop {
			attempt += 1;

			match self.issue().await {
				Ok(token) => {
					obs::log_token_issued(&self.credentials.app_id, token.expires_at, attempt);
					self.publish(&token).await;

					return Ok(token);
				},
				Err(err) if err.is_transient() && attempt < self.attempts => {
					obs::log_refresh_retry(&self.credentials.app_id, attempt, &err);
				},
				Err(err) => {
					self.metrics.record_failure();

					return Err(err);
				},
			}
		}
	}

	async fn issue(&self) -> Result<AccessToken, CredentialError> {
		self.metrics.record_issuance();

		let issued_at = OffsetDateTime::now_utc();
		let grant: TokenGrant =
			self.dispatcher.get(self.token_url.clone()).await?.into_result()?.decode()?;

		if grant.access_token.is_empty() {
			return Err(CredentialError::InvalidGrant {
				reason: "access_token is missing or empty".into(),
			});
		}

		let expires_in = grant.expires_in.ok_or_else(|| CredentialError::InvalidGrant {
			reason: "expires_in is missing".into(),
		})?;

		if expires_in <= 0 {
			return Err(CredentialError::InvalidGrant {
				reason: format!("expires_in must be positive, got {expires_in}"),
			});
		}

		let lifetime = Duration::seconds(expires_in);

		AccessToken::checked_new(grant.access_token, issued_at, lifetime).ok_or_else(|| {
			CredentialError::InvalidGrant {
				reason: format!("expires_in is out of range, got {expires_in}"),
			}
		})
	}

	async fn load_shared(&self) -> Option<AccessToken> {
		let store = self.store.as_ref()?;
		let app_id = self.credentials.app_id.as_str();
		let token = match store.load(app_id).await {
			Ok(token) => token?,
			Err(err) => {
				obs::log_store_failure("load", &err);

				return None;
			},
		};
		let rejected = self.state.lock().rejected.as_ref().is_some_and(|value| *value == token.value);

		if rejected || !token.is_fresh_at(OffsetDateTime::now_utc(), self.safety_margin) {
			return None;
		}

		obs::log_token_adopted(app_id, token.expires_at);

		Some(token)
	}

	async fn publish(&self, token: &AccessToken) {
		let Some(store) = &self.store else {
			return;
		};

		if let Err(err) = store.save(&self.credentials.app_id, token.clone()).await {
			obs::log_store_failure("save", &err);
		}
	}
}

#[derive(Default)]
struct CacheState {
	current: Option<AccessToken>,
	inflight: Option<InflightRefresh>,
	rejected: Option<Secret>,
	next_refresh_id: u64,
}

enum Lookup {
	Hit(AccessToken),
	Refresh(RefreshFuture),
}

struct InflightRefresh {
	id: u64,
	future: RefreshFuture,
}

#[derive(Deserialize)]
struct TokenGrant {
	#[serde(default)]
	access_token: String,
	#[serde(default)]
	expires_in: Option<i64>,
}

fn start_refresh<C>(inner: &Arc<CacheInner<C>>, state: &mut CacheState) -> RefreshFuture
where
	C: ?Sized + ApiHttpClient,
{
	state.next_refresh_id += 1;

	let id = state.next_refresh_id;
	let owner = Arc::clone(inner);
	let future = async move {
		let span = CallSpan::new(CallKind::TokenRefresh, "access_token");

		obs::record_call_outcome(CallKind::TokenRefresh, CallOutcome::Attempt);

		let result = span.instrument(owner.refresh()).await;

		{
			let mut state = owner.state.lock();

			if state.inflight.as_ref().is_some_and(|inflight| inflight.id == id) {
				state.inflight = None;
			}
			if let Ok(token) = &result {
				state.current = Some(token.clone());
			}
		}

		match &result {
			Ok(_) => obs::record_call_outcome(CallKind::TokenRefresh, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(CallKind::TokenRefresh, CallOutcome::Failure),
		}

		result
	}
	.boxed()
	.shared();

	state.inflight = Some(InflightRefresh { id, future: future.clone() });

	future
}

fn token_url(config: &ClientConfig) -> Result<Url> {
	let mut url = config.endpoint(ApiPrefix::Cgi, "token")?;

	url.query_pairs_mut()
		.append_pair("grant_type", "client_credential")
		.append_pair("appid", &config.credentials.app_id)
		.append_pair("secret", config.credentials.app_secret.expose());

	Ok(url)
}
