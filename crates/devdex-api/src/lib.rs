// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use devdex_app::{Catalog, CatalogError, Device, DeviceId};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::ACCEPT;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use url::Url;

pub const CATALOG_PATH: &str = "/fingerprint/ui/public.json";
pub const DEFAULT_BASE_URL: &str = "https://static.ui.com";

/// Anything that can produce a full catalog snapshot.
pub trait CatalogSource {
    fn fetch(&self) -> Result<Catalog, CatalogError>;

    /// Human-readable origin for logs and status lines.
    fn describe(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("source.base_url must not be empty");
        }
        Url::parse(&base_url).with_context(|| format!("source.base_url {base_url:?} is not a URL"))?;

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn endpoint(&self) -> String {
        format!("{}{CATALOG_PATH}", self.base_url)
    }
}

impl CatalogSource for Client {
    fn fetch(&self) -> Result<Catalog, CatalogError> {
        let endpoint = self.endpoint();
        debug!(%endpoint, "requesting catalog");

        let response = self
            .http
            .get(&endpoint)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|error| transport_error(&endpoint, &error))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%endpoint, status = status.as_u16(), "catalog request rejected");
            return Err(CatalogError::Response {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .map_err(|error| transport_error(&endpoint, &error))?;
        let catalog: Catalog = serde_json::from_str(&body).map_err(|error| {
            warn!(%endpoint, %error, "catalog body did not decode");
            CatalogError::Decode(error.to_string())
        })?;

        info!(
            %endpoint,
            devices = catalog.len(),
            version = %catalog.version,
            "catalog loaded"
        );
        Ok(catalog)
    }

    fn describe(&self) -> String {
        self.endpoint()
    }
}

fn transport_error(endpoint: &str, error: &reqwest::Error) -> CatalogError {
    warn!(%endpoint, %error, "catalog request failed");
    let reason = if error.is_timeout() {
        format!("request to {endpoint} timed out")
    } else if error.is_connect() {
        format!("cannot reach {endpoint}")
    } else {
        format!("request to {endpoint} failed ({error})")
    };
    CatalogError::Transport(reason)
}

#[derive(Debug, Clone)]
struct Snapshot {
    catalog: Arc<Catalog>,
    fetched_at: OffsetDateTime,
}

/// Session cache in front of a [`CatalogSource`]. One fetch per cache
/// lifetime; failures are not cached so a later `load` can retry.
#[derive(Debug)]
pub struct CatalogFetcher<S> {
    source: S,
    snapshot: Option<Snapshot>,
}

impl<S: CatalogSource> CatalogFetcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            snapshot: None,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn load(&mut self) -> Result<Arc<Catalog>, CatalogError> {
        if let Some(snapshot) = &self.snapshot {
            return Ok(Arc::clone(&snapshot.catalog));
        }
        let catalog = Arc::new(self.source.fetch()?);
        self.snapshot = Some(Snapshot {
            catalog: Arc::clone(&catalog),
            fetched_at: OffsetDateTime::now_utc(),
        });
        Ok(catalog)
    }

    pub fn cached(&self) -> Option<Arc<Catalog>> {
        self.snapshot
            .as_ref()
            .map(|snapshot| Arc::clone(&snapshot.catalog))
    }

    pub fn fetched_at(&self) -> Option<OffsetDateTime> {
        self.snapshot.as_ref().map(|snapshot| snapshot.fetched_at)
    }

    pub fn invalidate(&mut self) {
        if self.snapshot.take().is_some() {
            debug!(source = %self.source.describe(), "catalog cache invalidated");
        }
    }

    pub fn device(&mut self, id: &DeviceId) -> Result<Device, CatalogError> {
        let catalog = self.load()?;
        catalog.find(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogFetcher, CatalogSource, Client};
    use devdex_app::{Catalog, CatalogError, DeviceId};
    use std::cell::Cell;
    use std::time::Duration;

    struct CountingSource {
        calls: Cell<usize>,
        fail_first: bool,
    }

    impl CatalogSource for CountingSource {
        fn fetch(&self) -> Result<Catalog, CatalogError> {
            let call = self.calls.get() + 1;
            self.calls.set(call);
            if self.fail_first && call == 1 {
                return Err(CatalogError::Response { status: 503 });
            }
            Ok(Catalog {
                devices: Vec::new(),
                version: format!("v{call}"),
            })
        }

        fn describe(&self) -> String {
            "counting".to_owned()
        }
    }

    fn counting(fail_first: bool) -> CatalogFetcher<CountingSource> {
        CatalogFetcher::new(CountingSource {
            calls: Cell::new(0),
            fail_first,
        })
    }

    #[test]
    fn load_is_cached_until_invalidated() {
        let mut fetcher = counting(false);
        assert!(fetcher.cached().is_none());
        let first = fetcher.load().expect("load");
        let second = fetcher.load().expect("load again");
        assert_eq!(first.version, "v1");
        assert_eq!(second.version, "v1");
        assert_eq!(fetcher.source().calls.get(), 1);
        assert!(fetcher.fetched_at().is_some());

        fetcher.invalidate();
        assert!(fetcher.cached().is_none());
        assert_eq!(fetcher.load().expect("reload").version, "v2");
    }

    #[test]
    fn failures_are_not_cached() {
        let mut fetcher = counting(true);
        let error = fetcher.load().expect_err("first load fails");
        assert_eq!(error.status(), Some(503));
        assert!(fetcher.cached().is_none());
        assert_eq!(fetcher.load().expect("retry").version, "v2");
    }

    #[test]
    fn unknown_device_is_not_found() {
        let mut fetcher = counting(false);
        let error = fetcher
            .device(&DeviceId::from("missing"))
            .expect_err("no devices");
        assert!(error.is_not_found());
    }

    #[test]
    fn client_rejects_bad_base_urls() {
        assert!(Client::new("", Duration::from_secs(1)).is_err());
        assert!(Client::new("not a url", Duration::from_secs(1)).is_err());
        let client = Client::new("https://static.ui.com/", Duration::from_secs(1)).expect("client");
        assert_eq!(
            client.endpoint(),
            "https://static.ui.com/fingerprint/ui/public.json"
        );
    }
}
