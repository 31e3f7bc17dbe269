use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::literal::{ProjectType, SearchIndex, SideSupport};
use crate::wire::{Wire, WireError};

/// A single hit of the search endpoint.
///
/// This is a flattened projection of a project: `license` is the bare license
/// id and `gallery` only lists image URLs.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[must_use]
pub struct SearchResultModel {
    pub project_id: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub project_type: ProjectType,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub display_categories: Vec<String>,
    pub client_side: SideSupport,
    pub server_side: SideSupport,
    pub downloads: u64,
    pub follows: u64,
    pub author: String,
    #[serde(default)]
    pub versions: Vec<String>,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    pub license: String,
    #[serde(
        default,
        deserialize_with = "crate::wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub icon_url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default)]
    pub gallery: Vec<Url>,
    #[serde(
        default,
        deserialize_with = "crate::wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub featured_gallery: Option<Url>,
}

impl Wire for SearchResultModel {
    const ENTITY: &'static str = "search result";
}

/// One page of search results.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[must_use]
pub struct SearchResults {
    pub hits: Vec<SearchResultModel>,
    pub offset: u64,
    pub limit: u64,
    pub total_hits: u64,
}

impl Wire for SearchResults {
    const ENTITY: &'static str = "search results";
}

/// Parameters of `/search`.
///
/// Parameters left at the server's defaults are not sent.
#[derive(Clone, PartialEq, Eq, Debug, Builder)]
#[must_use]
pub struct SearchQuery {
    #[builder(into)]
    pub query: Option<String>,
    /// Facets are ANDed lists of ORed filters, like
    /// `[["categories:forge"], ["versions:1.20.1", "versions:1.20.4"]]`.
    #[builder(default)]
    pub facets: Vec<Vec<String>>,
    #[builder(default)]
    pub index: SearchIndex,
    #[builder(default)]
    pub offset: u64,
    #[builder(default = SearchQuery::DEFAULT_LIMIT)]
    pub limit: u64,
    #[builder(default)]
    pub filters: Vec<String>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SearchQuery {
    pub const DEFAULT_LIMIT: u64 = 10;

    /// Query parameters of the search endpoint.
    ///
    /// # Errors
    ///
    /// Fails if the facets or filters cannot be JSON encoded.
    pub fn query(&self) -> Result<Vec<(String, String)>, WireError> {
        let mut query = vec![];
        if let Some(text) = self.query.as_deref().filter(|text| !text.is_empty()) {
            query.push(("query".to_owned(), text.to_owned()));
        }
        if !self.facets.is_empty() {
            query.push(("facets".to_owned(), encode(&self.facets)?));
        }
        if self.index != SearchIndex::default() {
            query.push(("index".to_owned(), self.index.to_string()));
        }
        if self.offset != 0 {
            query.push(("offset".to_owned(), self.offset.to_string()));
        }
        if self.limit != Self::DEFAULT_LIMIT {
            query.push(("limit".to_owned(), self.limit.to_string()));
        }
        if !self.filters.is_empty() {
            query.push(("filters".to_owned(), encode(&self.filters)?));
        }
        Ok(query)
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String, WireError> {
    serde_json::to_string(value).map_err(|source| WireError::Encode {
        entity: "search query",
        source,
    })
}
