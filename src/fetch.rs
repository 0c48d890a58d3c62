use std::time::Duration;

use actix_web::http::header;
use awc::Client;

use crate::config::Config;
use crate::error::FetchError;
use crate::message::MessageCollection;

/// Issues the single `GET` of a page load.
///
/// Holds an `awc::Client`, which is not `Send`; build one per worker.
pub struct Fetcher {
    client: Client,
    endpoint: String,
    body_limit: usize,
}

impl Fetcher {
    pub fn new(endpoint: &str, timeout: Duration, body_limit: usize) -> Fetcher {
        Fetcher {
            client: Client::builder().timeout(timeout).finish(),
            endpoint: endpoint.to_string(),
            body_limit,
        }
    }

    pub fn from_config(config: &Config) -> Fetcher {
        Fetcher::new(
            &config.endpoint,
            config.fetch_timeout(),
            config.body_limit_bytes,
        )
    }

    pub async fn fetch(&self) -> Result<MessageCollection, FetchError> {
        let url = || self.endpoint.clone();

        let mut response = self
            .client
            .get(self.endpoint.as_str())
            .insert_header((header::ACCEPT, "application/json"))
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url(),
                status: status.as_u16(),
            });
        }

        let body = response
            .body()
            .limit(self.body_limit)
            .await
            .map_err(|e| FetchError::Body {
                url: url(),
                reason: e.to_string(),
            })?;

        let collection = MessageCollection::from_slice(&body)
            .map_err(|source| FetchError::Malformed { url: url(), source })?;

        tracing::debug!(
            url = %self.endpoint,
            messages = collection.len(),
            skipped = collection.skipped.len(),
            "fetched messages"
        );
        Ok(collection)
    }
}

#[cfg(test)]
pub(crate) mod stub {
    use std::time::Duration;

    use actix_web::dev::ServerHandle;
    use actix_web::http::StatusCode;
    use actix_web::{web, App, HttpResponse, HttpServer};

    /// A throwaway `/api` endpoint on an ephemeral port.
    pub struct StubApi {
        pub url: String,
        handle: ServerHandle,
    }

    impl StubApi {
        pub fn start(status: StatusCode, body: &'static str) -> StubApi {
            StubApi::start_with_delay(status, body, Duration::ZERO)
        }

        pub fn start_with_delay(
            status: StatusCode,
            body: &'static str,
            delay: Duration,
        ) -> StubApi {
            let server = HttpServer::new(move || {
                App::new().route(
                    "/api",
                    web::get().to(move || async move {
                        if !delay.is_zero() {
                            actix_web::rt::time::sleep(delay).await;
                        }
                        HttpResponse::build(status)
                            .content_type("application/json")
                            .body(body)
                    }),
                )
            })
            .workers(1)
            .bind(("127.0.0.1", 0))
            .unwrap();
            let addr = server.addrs()[0];
            let server = server.run();
            let handle = server.handle();
            actix_web::rt::spawn(server);
            StubApi {
                url: format!("http://{}/api", addr),
                handle,
            }
        }

        pub async fn stop(self) {
            self.handle.stop(false).await;
        }
    }
}
