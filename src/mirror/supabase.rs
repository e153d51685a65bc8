//! Supabase backend: PostgREST for rows, Storage API for objects.
//!
//! Every request carries the anon key as both `apikey` and bearer token. No
//! retries are attempted; transport defaults govern timeouts.

use async_trait::async_trait;
use reqwest::{header, RequestBuilder, Response, Url};
use serde::Deserialize;

use super::types::{BrainUpsert, CloudBrainRecord, StorageEntry};
use super::{CloudBackend, MirrorError, LIST_LIMIT};
use crate::config::BackendConfig;

pub struct SupabaseBackend {
    http: reqwest::Client,
    base: Url,
    anon_key: String,
    bucket: String,
    brains_table: String,
    credentials_table: String,
}

#[derive(Debug, Deserialize)]
struct StorageObject {
    name: String,
    id: Option<String>,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

impl From<StorageObject> for StorageEntry {
    fn from(obj: StorageObject) -> Self {
        match obj.id {
            None => StorageEntry::Folder { name: obj.name },
            Some(_) => {
                let size = obj
                    .metadata
                    .as_ref()
                    .and_then(|m| m.get("size"))
                    .and_then(|s| s.as_u64())
                    .unwrap_or(0);
                StorageEntry::File {
                    name: obj.name,
                    size,
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct CredentialRow {
    password_hash: Option<String>,
}

impl SupabaseBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, MirrorError> {
        let base = Url::parse(config.url.trim())
            .map_err(|e| MirrorError::InvalidUrl(format!("{}: {e}", config.url)))?;
        if base.cannot_be_a_base() {
            return Err(MirrorError::InvalidUrl(config.url.clone()));
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("memoria/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base,
            anon_key: config.anon_key.trim().to_string(),
            bucket: config.bucket.clone(),
            brains_table: config.brains_table.clone(),
            credentials_table: config.credentials_table.clone(),
        })
    }

    /// `base` with `segments` appended, each percent-encoded.
    fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, MirrorError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| MirrorError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn rest_url(&self, table: &str) -> Result<Url, MirrorError> {
        self.url(["rest", "v1", table])
    }

    fn object_url(&self, key: &str) -> Result<Url, MirrorError> {
        let mut segments = vec!["storage", "v1", "object", self.bucket.as_str()];
        segments.extend(key.split('/'));
        self.url(segments)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    /// Turn non-2xx responses into [`MirrorError::Backend`] with the service's message.
    async fn check(resp: Response) -> Result<Response, MirrorError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                ["message", "error", "msg"]
                    .iter()
                    .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
            })
            .unwrap_or(body);
        Err(MirrorError::Backend {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl CloudBackend for SupabaseBackend {
    async fn upsert_brain(&self, row: &BrainUpsert) -> Result<CloudBrainRecord, MirrorError> {
        let mut url = self.rest_url(&self.brains_table)?;
        url.query_pairs_mut().append_pair("on_conflict", "sync_code,name");

        let resp = self
            .authed(self.http.post(url))
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&[row])
            .send()
            .await?;
        let rows: Vec<CloudBrainRecord> = Self::check(resp).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| MirrorError::Decode("upsert returned no rows".into()))
    }

    async fn select_brains(&self, sync_code: &str) -> Result<Vec<CloudBrainRecord>, MirrorError> {
        let mut url = self.rest_url(&self.brains_table)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("sync_code", &format!("eq.{sync_code}"))
            .append_pair("order", "created_at.desc");

        let resp = self.authed(self.http.get(url)).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn any_brain(&self, sync_code: &str) -> Result<bool, MirrorError> {
        let mut url = self.rest_url(&self.brains_table)?;
        url.query_pairs_mut()
            .append_pair("select", "id")
            .append_pair("sync_code", &format!("eq.{sync_code}"))
            .append_pair("limit", "1");

        let resp = self.authed(self.http.get(url)).send().await?;
        let rows: Vec<serde_json::Value> = Self::check(resp).await?.json().await?;
        Ok(!rows.is_empty())
    }

    async fn delete_brain(&self, sync_code: &str, name: &str) -> Result<(), MirrorError> {
        let mut url = self.rest_url(&self.brains_table)?;
        url.query_pairs_mut()
            .append_pair("sync_code", &format!("eq.{sync_code}"))
            .append_pair("name", &format!("eq.{name}"));

        let resp = self.authed(self.http.delete(url)).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn insert_credential(&self, sync_code: &str, password_hash: &str) -> Result<(), MirrorError> {
        let url = self.rest_url(&self.credentials_table)?;
        let body = serde_json::json!({
            "sync_code": sync_code,
            "password_hash": password_hash,
        });

        let resp = self
            .authed(self.http.post(url))
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn select_credential(&self, sync_code: &str) -> Result<Option<String>, MirrorError> {
        let mut url = self.rest_url(&self.credentials_table)?;
        url.query_pairs_mut()
            .append_pair("select", "password_hash")
            .append_pair("sync_code", &format!("eq.{sync_code}"))
            .append_pair("limit", "1");

        let resp = self.authed(self.http.get(url)).send().await?;
        let rows: Vec<CredentialRow> = Self::check(resp).await?.json().await?;
        Ok(rows.into_iter().next().and_then(|r| r.password_hash))
    }

    async fn put_object(&self, key: &str, bytes: Vec<u8>) -> Result<(), MirrorError> {
        let url = self.object_url(key)?;
        let resp = self
            .authed(self.http.post(url))
            .header("x-upsert", "true")
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, MirrorError> {
        let url = self.object_url(key)?;
        let resp = self.authed(self.http.get(url)).send().await?;
        let bytes = Self::check(resp).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<StorageEntry>, MirrorError> {
        let url = self.url(["storage", "v1", "object", "list", self.bucket.as_str()])?;
        let body = serde_json::json!({
            "prefix": prefix,
            "limit": LIST_LIMIT,
            "offset": 0,
            "sortBy": { "column": "name", "order": "asc" },
        });

        let resp = self.authed(self.http.post(url)).json(&body).send().await?;
        let objects: Vec<StorageObject> = Self::check(resp).await?.json().await?;
        Ok(objects.into_iter().map(StorageEntry::from).collect())
    }

    async fn remove_objects(&self, keys: &[String]) -> Result<(), MirrorError> {
        let url = self.url(["storage", "v1", "object", self.bucket.as_str()])?;
        let body = serde_json::json!({ "prefixes": keys });

        let resp = self.authed(self.http.delete(url)).json(&body).send().await?;
        Self::check(resp).await?;
        Ok(())
    }
}
