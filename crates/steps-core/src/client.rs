//! Access to Twilio Studio flows, engagements and steps.
//!
//! [`StudioApi`] is the seam the report is written against; [`StudioClient`]
//! implements it over the v1 REST API with a blocking `reqwest` client.
//! Listings are paged lazily: the next page is requested only once the
//! caller has consumed the current one.

use crate::credentials::Credentials;
use crate::error::{Result, StepsError};
use crate::records::{Engagement, Flow, PageMeta, Step};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://studio.twilio.com";
const PAGE_SIZE: u32 = 50;

/// A finite, single-pass sequence of records in server order.
pub type Records<'a, T> = Box<dyn Iterator<Item = Result<T>> + 'a>;

pub trait StudioApi {
    fn fetch_flow(&self, flow_sid: &str) -> Result<Flow>;

    fn engagements<'a>(&'a self, flow_sid: &str) -> Records<'a, Engagement>;

    fn steps<'a>(&'a self, flow_sid: &str, engagement_sid: &str) -> Records<'a, Step>;
}

pub struct StudioClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
    account_sid: String,
}

impl StudioClient {
    pub fn new(credentials: Credentials, subaccount: Option<&str>) -> Result<Self> {
        Self::with_base_url(credentials, subaccount, DEFAULT_BASE_URL)
    }

    /// Like [`StudioClient::new`] but against another origin (a proxy or a test server).
    pub fn with_base_url(
        credentials: Credentials,
        subaccount: Option<&str>,
        base_url: &str,
    ) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("studio-steps/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let account_sid = subaccount
            .filter(|s| !s.is_empty())
            .unwrap_or(credentials.account_sid.as_str())
            .to_string();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            account_sid,
        })
    }

    /// The account whose resources this client acts on: the subaccount when
    /// one was given, otherwise the authenticating account.
    pub fn account_sid(&self) -> &str {
        &self.account_sid
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.base_url, url.trim_start_matches('/'))
        }
    }

    fn get(&self, url: &str) -> Result<Response> {
        tracing::debug!(url, account = %self.account_sid, "GET");
        let resp = self
            .http
            .get(url)
            .basic_auth(&self.credentials.account_sid, Some(&self.credentials.auth_token))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()?;
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(api_error(resp))
        }
    }

    fn fetch_page<T: DeserializeOwned>(&self, url: &str, key: &str) -> Result<(Vec<T>, PageMeta)> {
        let mut body: serde_json::Value = self.get(url)?.json()?;
        let items = body
            .get_mut(key)
            .map(serde_json::Value::take)
            .ok_or_else(|| StepsError::UnexpectedResponse(format!("page has no '{key}' list")))?;
        let items: Vec<T> = serde_json::from_value(items)?;
        let meta = match body.get_mut("meta") {
            Some(meta) => serde_json::from_value(meta.take())?,
            None => PageMeta::default(),
        };
        tracing::debug!(key, count = items.len(), more = meta.next_page_url.is_some(), "page");
        Ok((items, meta))
    }

    fn list<'a, T: DeserializeOwned + 'a>(
        &'a self,
        path: String,
        key: &'static str,
    ) -> Records<'a, T> {
        let first = format!("{}/{}?PageSize={}", self.base_url, path, PAGE_SIZE);
        Box::new(Pages {
            client: self,
            key,
            next_url: Some(first),
            buffered: Vec::new().into_iter(),
        })
    }
}

impl StudioApi for StudioClient {
    fn fetch_flow(&self, flow_sid: &str) -> Result<Flow> {
        let url = format!("{}/v1/Flows/{}", self.base_url, flow_sid);
        let fetched = self.get(&url).and_then(|resp| Ok(resp.json::<Flow>()?));
        fetched.map_err(|e| StepsError::RemoteFetchFailure {
            flow: flow_sid.to_string(),
            reason: e.to_string(),
        })
    }

    fn engagements<'a>(&'a self, flow_sid: &str) -> Records<'a, Engagement> {
        self.list(format!("v1/Flows/{flow_sid}/Engagements"), "engagements")
    }

    fn steps<'a>(&'a self, flow_sid: &str, engagement_sid: &str) -> Records<'a, Step> {
        self.list(
            format!("v1/Flows/{flow_sid}/Engagements/{engagement_sid}/Steps"),
            "steps",
        )
    }
}

/// Follows `meta.next_page_url` one page at a time.
struct Pages<'a, T> {
    client: &'a StudioClient,
    key: &'static str,
    next_url: Option<String>,
    buffered: std::vec::IntoIter<T>,
}

impl<T: DeserializeOwned> Iterator for Pages<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffered.next() {
                return Some(Ok(item));
            }
            let url = self.next_url.take()?;
            match self.client.fetch_page::<T>(&url, self.key) {
                Ok((items, meta)) => {
                    self.next_url = meta
                        .next_page_url
                        .filter(|u| !u.is_empty())
                        .map(|u| self.client.resolve_url(&u));
                    self.buffered = items.into_iter();
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

fn api_error(resp: Response) -> StepsError {
    let status = resp.status();
    let message = resp
        .text()
        .ok()
        .and_then(|body| serde_json::from_str::<ApiErrorBody>(&body).ok())
        .map(|b| b.message)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_default();
    StepsError::Api {
        status: status.as_u16(),
        message,
    }
}
