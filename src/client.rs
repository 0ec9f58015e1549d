use crate::config::CollectorConfig;
use crate::error::{CollectorError, FetchError};
use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;

/// Plain GET of a URL's body.
///
/// A non-success status is reported as [`FetchError::Status`] so callers can
/// decide per call site whether it is fatal (page fetches) or recoverable
/// (image fetches).
pub trait Transport {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, FetchError>>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, FetchError>> {
        (**self).get(url)
    }
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &CollectorConfig) -> Result<Self, CollectorError> {
        let mut client_builder = Client::builder().timeout(config.timeout);

        if let Some(proxy_url) = &config.proxy {
            client_builder = client_builder.proxy(reqwest::Proxy::http(proxy_url)?);
        }

        let client = client_builder.build()?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, FetchError>> {
        async move {
            let network = |source: reqwest::Error| FetchError::Network {
                url: url.to_string(),
                source: Box::new(source.without_url()),
            };

            let response = self.client.get(url).send().await.map_err(network)?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            let body = response.bytes().await.map_err(network)?;
            Ok(body.to_vec())
        }
        .boxed()
    }
}
