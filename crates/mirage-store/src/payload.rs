// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Captured request/response pairs and their record key.

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Header name -> values.
///
/// Ordered so that two equal header sets always encode to the same bytes.
pub type Headers = BTreeMap<String, Vec<String>>;

/// Request side of a captured interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestDetails {
    #[serde(alias = "Path")]
    pub path: String,

    #[serde(alias = "Method")]
    pub method: String,

    /// Target host the request was sent to.
    #[serde(alias = "Destination")]
    pub destination: String,

    #[serde(alias = "Scheme")]
    pub scheme: String,

    /// Raw query string, without the leading `?`.
    #[serde(alias = "Query")]
    pub query: String,

    #[serde(alias = "Body")]
    pub body: String,

    #[serde(rename = "remoteAddr", alias = "RemoteAddr")]
    pub remote_addr: String,

    #[serde(alias = "Headers")]
    pub headers: Headers,
}

impl RequestDetails {
    /// Canonical key of this request in the record store.
    ///
    /// Lowercase hex MD5 over destination, path, method, query and body,
    /// concatenated in that order. Headers, scheme and remote address are
    /// not part of the key. The capture path and the import pipeline must
    /// both go through this function.
    pub fn record_key(&self) -> String {
        let mut hasher = Md5::new();
        hasher.update(self.destination.as_bytes());
        hasher.update(self.path.as_bytes());
        hasher.update(self.method.as_bytes());
        hasher.update(self.query.as_bytes());
        hasher.update(self.body.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Response side of a captured interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseDetails {
    #[serde(alias = "Status")]
    pub status: u16,

    #[serde(alias = "Body")]
    pub body: String,

    #[serde(alias = "Headers")]
    pub headers: Headers,
}

/// One captured interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Payload {
    #[serde(alias = "Request")]
    pub request: RequestDetails,

    #[serde(alias = "Response")]
    pub response: ResponseDetails,

    #[serde(alias = "ID", alias = "Id")]
    pub id: String,
}

impl Payload {
    /// Record key of the request side.
    pub fn record_key(&self) -> String {
        self.request.record_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_request(path: &str) -> RequestDetails {
        RequestDetails {
            path: path.to_string(),
            method: "GET".to_string(),
            destination: "example.com".to_string(),
            scheme: "http".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_record_key_is_md5_of_defining_fields() {
        let request = RequestDetails {
            destination: "example.com".to_string(),
            path: "/a".to_string(),
            method: "GET".to_string(),
            query: "q=1".to_string(),
            body: "hello".to_string(),
            ..Default::default()
        };

        let mut hasher = Md5::new();
        hasher.update(b"example.com/aGETq=1hello");
        let expected = format!("{:x}", hasher.finalize());

        assert_eq!(request.record_key(), expected);
        assert_eq!(request.record_key().len(), 32);
    }

    #[test]
    fn test_record_key_ignores_headers_and_scheme() {
        let plain = get_request("/a");

        let mut decorated = plain.clone();
        decorated.scheme = "https".to_string();
        decorated.remote_addr = "10.0.0.1:4242".to_string();
        decorated
            .headers
            .insert("Accept".to_string(), vec!["*/*".to_string()]);

        assert_eq!(plain.record_key(), decorated.record_key());
    }

    #[test]
    fn test_record_key_differs_by_path() {
        assert_ne!(get_request("/a").record_key(), get_request("/b").record_key());
    }

    #[test]
    fn test_payload_accepts_capitalized_fields() {
        let json = r#"{"Request":{"Method":"GET","Path":"/a"},"Response":{"Status":200}}"#;
        let payload: Payload = serde_json::from_str(json).unwrap();

        assert_eq!(payload.request.method, "GET");
        assert_eq!(payload.request.path, "/a");
        assert_eq!(payload.response.status, 200);
        assert!(payload.request.headers.is_empty());
    }

    #[test]
    fn test_payload_serializes_lowercase_fields() {
        let payload = Payload {
            request: get_request("/a"),
            response: ResponseDetails {
                status: 201,
                ..Default::default()
            },
            id: String::new(),
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["request"]["path"], "/a");
        assert_eq!(value["request"]["remoteAddr"], "");
        assert_eq!(value["response"]["status"], 201);
    }
}
