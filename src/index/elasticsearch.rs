//! Elasticsearch index backend
//!
//! Talks to the Elasticsearch REST API directly with reqwest:
//! - `HEAD /{index}` / `PUT /{index}` for schema bootstrap
//! - `PUT /{index}/_doc/{id}` for upserts
//! - `POST /{index}/_search` and `GET /{index}/_doc/{id}` for reads

use crate::config::IndexConfig;
use crate::index::{CrawlDocument, Indexer, PageSummary, SearchQuery};
use crate::{IndexError, IndexResult};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

/// Name of the custom analyzer applied to `content`
const HTML_ANALYZER: &str = "html_stripper";

/// Elasticsearch index backend
pub struct ElasticsearchIndexer {
    client: Client,
    base_url: String,
    index: String,
    credentials: Option<(String, String)>,
}

/// Stored `_source` of a page document
#[derive(Debug, Serialize)]
struct PageSource<'a> {
    title: &'a str,
    url: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct SummarySource {
    #[serde(default)]
    title: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct DocumentSource {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct Hit<T> {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source")]
    source: T,
}

#[derive(Debug, Deserialize)]
struct Hits<T> {
    hits: Vec<Hit<T>>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits<SummarySource>,
}

impl ElasticsearchIndexer {
    /// Creates a backend for `index` on the cluster at `base_url`
    ///
    /// # Arguments
    ///
    /// * `base_url` - Cluster address, e.g. `http://localhost:9200/`
    /// * `index` - Destination index name
    /// * `credentials` - Optional basic-auth username and password
    /// * `timeout` - Bound on each request, connect included
    pub fn new(
        base_url: &str,
        index: &str,
        credentials: Option<(String, String)>,
        timeout: Duration,
    ) -> IndexResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            index: index.to_string(),
            credentials,
        })
    }

    /// Creates a backend from the `[index]` configuration section
    pub fn from_config(config: &IndexConfig) -> IndexResult<Self> {
        let es = &config.elasticsearch;
        let credentials = if es.username.is_empty() {
            None
        } else {
            Some((es.username.clone(), es.password.clone()))
        };
        Self::new(
            &es.url(),
            &config.name,
            credentials,
            Duration::from_secs(es.request_timeout_secs),
        )
    }

    /// The index settings and mapping installed by `ensure_index`
    pub fn index_definition() -> Value {
        json!({
            "settings": {
                "analysis": {
                    "analyzer": {
                        HTML_ANALYZER: {
                            "tokenizer": "standard",
                            "char_filter": ["html_strip"]
                        }
                    }
                }
            },
            "mappings": {
                "properties": {
                    "content": { "type": "text", "analyzer": HTML_ANALYZER }
                }
            }
        })
    }

    /// The search body for a query: `match_all`, or one `match` per field
    pub fn search_body(query: &SearchQuery) -> Value {
        let matches = query.matches();
        let es_query = if matches.is_empty() {
            json!({ "match_all": {} })
        } else {
            let must: Vec<Value> = matches
                .into_iter()
                .map(|(field, value)| json!({ "match": { field: value } }))
                .collect();
            json!({ "bool": { "must": must } })
        };

        json!({
            "query": es_query,
            "from": query.offset(),
            "size": query.size,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match &self.credentials {
            Some((username, password)) => builder.basic_auth(username, Some(password)),
            None => builder,
        }
    }

    async fn index_exists(&self) -> IndexResult<bool> {
        let response = self.request(Method::HEAD, &self.index).send().await?;
        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(IndexError::Response(format!(
                "index exists check for {} returned HTTP {}",
                self.index,
                status.as_u16()
            ))),
        }
    }
}

/// Pulls `error.type` out of an Elasticsearch error body
fn error_type(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("type")?
        .as_str()
        .map(str::to_string)
}

#[async_trait]
impl Indexer for ElasticsearchIndexer {
    fn index_name(&self) -> &str {
        &self.index
    }

    async fn ensure_index(&self) -> IndexResult<()> {
        if self.index_exists().await? {
            tracing::debug!("Index {} already exists", self.index);
            return Ok(());
        }

        tracing::debug!("Index {} does not exist, creating", self.index);
        let response = self
            .request(Method::PUT, &self.index)
            .json(&Self::index_definition())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        // Another process created it between the check and the create
        if error_type(&body).as_deref() == Some("resource_already_exists_exception") {
            return Ok(());
        }

        Err(IndexError::Response(format!(
            "creating index {} returned HTTP {}: {}",
            self.index,
            status.as_u16(),
            body
        )))
    }

    async fn put_document(&self, doc: &CrawlDocument) -> IndexResult<()> {
        let source = PageSource {
            title: &doc.title,
            url: &doc.url,
            content: &doc.content,
        };

        let response = self
            .request(Method::PUT, &format!("{}/_doc/{}", self.index, doc.id))
            .json(&source)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::BAD_REQUEST {
            Err(IndexError::Schema(body))
        } else {
            Err(IndexError::Transient(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )))
        }
    }

    async fn search(&self, query: &SearchQuery) -> IndexResult<Vec<PageSummary>> {
        let response = self
            .request(Method::POST, &format!("{}/_search", self.index))
            .json(&Self::search_body(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndexError::Response(format!(
                "search returned HTTP {}",
                status.as_u16()
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| IndexError::Response(e.to_string()))?;

        Ok(parsed
            .hits
            .hits
            .into_iter()
            .map(|hit| PageSummary {
                id: hit.id,
                title: hit.source.title,
                url: hit.source.url,
            })
            .collect())
    }

    async fn get_document(&self, id: &str) -> IndexResult<Option<CrawlDocument>> {
        let response = self
            .request(Method::GET, &format!("{}/_doc/{}", self.index, id))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let hit: Hit<DocumentSource> = response
                    .json()
                    .await
                    .map_err(|e| IndexError::Response(e.to_string()))?;
                Ok(Some(CrawlDocument {
                    id: hit.id,
                    title: hit.source.title,
                    url: hit.source.url,
                    content: hit.source.content,
                }))
            }
            status => Err(IndexError::Response(format!(
                "get document returned HTTP {}",
                status.as_u16()
            ))),
        }
    }
}
