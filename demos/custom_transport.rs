//! Demonstrates plugging a custom transport and a shared token store into the client.
//!
//! The transport answers from memory, so the demo runs without network access.

// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use color_eyre::Result;
// self
use wxa_broker::{
	ClientConfig, MiniProgramClient,
	http::{ApiHttpClient, HttpFuture, HttpRequest, HttpResponse},
	store::{MemoryStore, TokenStore},
};

#[derive(Default)]
struct CannedTransport {
	token_requests: AtomicUsize,
}
impl ApiHttpClient for CannedTransport {
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_> {
		let body = if request.url.path().ends_with("/cgi-bin/token") {
			let n = self.token_requests.fetch_add(1, Ordering::SeqCst) + 1;

			format!(r#"{{"access_token":"canned-{n}","expires_in":7200}}"#)
		} else {
			r#"{"errcode":0,"errmsg":"ok","openlink":"weixin://dl/business/?t=canned"}"#.to_owned()
		};

		Box::pin(async move { Ok(HttpResponse::new(200, body)) })
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let transport = Arc::new(CannedTransport::default());
	let store: Arc<dyn TokenStore> = Arc::new(MemoryStore::default());
	let config = ClientConfig::builder("wx-canned", "canned-secret").build()?;
	let primary =
		<MiniProgramClient<CannedTransport>>::with_http_client(config.clone(), transport.clone())?
			.with_token_store(store.clone())?;
	let replica = <MiniProgramClient<CannedTransport>>::with_http_client(config, transport.clone())?
		.with_token_store(store)?;
	let payload = primary.call_authorized("generatescheme", &serde_json::json!({})).await?;
	let adopted = replica.token_cache().access_token().await?;

	println!("Primary payload: {:?}.", payload.get("openlink"));
	println!("Replica adopted the shared token: {adopted:?}.");
	println!("Token endpoint hits: {}.", transport.token_requests.load(Ordering::SeqCst));

	Ok(())
}
