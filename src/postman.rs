//! Postman Collection v2.1 import and export.
//!
//! Decoding is tolerant: missing or `null` fields fall back to empty values
//! and only a payload that is not JSON at all (or has the wrong JSON types)
//! is rejected.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::POSTMAN_SCHEMA_V21;
use crate::error::Result;
use crate::models::{Collection, HttpMethod, Request};

fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Root structure for Postman Collection v2.1
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostmanCollection {
    #[serde(deserialize_with = "nullable")]
    pub info: PostmanInfo,
    #[serde(deserialize_with = "nullable")]
    pub item: Vec<PostmanItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostmanInfo {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

/// A request item, or a folder when `item` is present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostmanItem {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub request: PostmanRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Vec<PostmanItem>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostmanRequest {
    #[serde(deserialize_with = "nullable")]
    pub method: String,
    #[serde(deserialize_with = "nullable")]
    pub header: Vec<PostmanHeader>,
    #[serde(deserialize_with = "nullable")]
    pub url: PostmanUrl,
    #[serde(deserialize_with = "nullable")]
    pub body: PostmanBody,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostmanHeader {
    #[serde(deserialize_with = "nullable")]
    pub key: String,
    #[serde(deserialize_with = "nullable")]
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostmanBody {
    #[serde(deserialize_with = "nullable")]
    pub mode: String,
    #[serde(deserialize_with = "nullable")]
    pub raw: String,
}

/// Postman writes the URL either as a plain string or as an object carrying
/// a `raw` string. Anything else is kept only so decoding does not fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostmanUrl {
    Raw(String),
    Structured(serde_json::Map<String, serde_json::Value>),
    Other(serde_json::Value),
}

impl Default for PostmanUrl {
    fn default() -> Self {
        PostmanUrl::Raw(String::new())
    }
}

impl PostmanUrl {
    /// The URL as a single string; unknown shapes give an empty string.
    pub fn raw(&self) -> String {
        match self {
            PostmanUrl::Raw(s) => s.clone(),
            PostmanUrl::Structured(map) => map
                .get("raw")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string(),
            PostmanUrl::Other(_) => String::new(),
        }
    }
}

impl PostmanItem {
    fn to_request(&self) -> Request {
        let mut headers = BTreeMap::new();
        for h in &self.request.header {
            headers.insert(h.key.clone(), h.value.clone());
        }
        Request {
            name: self.name.clone(),
            method: HttpMethod::parse(&self.request.method).unwrap_or_default(),
            url: self.request.url.raw(),
            headers,
            body: self.request.body.raw.clone(),
        }
    }

    /// Requests in this item, descending into folders depth-first.
    fn collect_requests(&self, out: &mut Vec<Request>) {
        match &self.item {
            Some(children) => children.iter().for_each(|c| c.collect_requests(out)),
            None => out.push(self.to_request()),
        }
    }
}

/// Parses raw bytes into the Postman document model.
pub fn parse_collection(data: &[u8]) -> Result<PostmanCollection> {
    let doc: Option<PostmanCollection> = serde_json::from_slice(data)?;
    Ok(doc.unwrap_or_default())
}

/// Decodes a Postman v2.1 collection into a [`Collection`].
///
/// Duplicate header keys collapse to the last value.
pub fn import_collection(data: &[u8]) -> Result<Collection> {
    let doc = parse_collection(data)?;
    let mut requests = Vec::new();
    for item in &doc.item {
        item.collect_requests(&mut requests);
    }
    Ok(Collection {
        name: doc.info.name,
        requests,
    })
}

/// Builds the Postman v2.1 document for a collection.
pub fn export_collection(collection: &Collection) -> PostmanCollection {
    let item = collection
        .requests
        .iter()
        .map(|r| PostmanItem {
            name: r.name.clone(),
            request: PostmanRequest {
                method: r.method.as_str().to_string(),
                header: r
                    .headers
                    .iter()
                    .map(|(key, value)| PostmanHeader {
                        key: key.clone(),
                        value: value.clone(),
                    })
                    .collect(),
                url: PostmanUrl::Raw(r.url.clone()),
                body: PostmanBody {
                    mode: "raw".to_string(),
                    raw: r.body.clone(),
                },
            },
            item: None,
        })
        .collect();

    PostmanCollection {
        info: PostmanInfo {
            name: collection.name.clone(),
            schema: Some(POSTMAN_SCHEMA_V21.to_string()),
        },
        item,
    }
}

/// Export rendered as pretty JSON bytes, ready for a file.
pub fn export_collection_json(collection: &Collection) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(&export_collection(collection))?)
}
