//! Records returned by the Studio v1 API. Unknown fields are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flow {
    pub sid: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// One execution of a flow, started when a contact enters it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Engagement {
    pub sid: String,
    #[serde(default)]
    pub contact_channel_address: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub date_created: DateTime<Utc>,
}

/// A transition between two widgets within an engagement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Step {
    pub sid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub transitioned_from: Option<String>,
    #[serde(default)]
    pub transitioned_to: Option<String>,
    pub date_created: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PageMeta {
    #[serde(default)]
    pub next_page_url: Option<String>,
}
