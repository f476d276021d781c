use reqwest::{Method, RequestBuilder, StatusCode};
use std::collections::BTreeMap;
use std::time::Duration;

use catalog_core::config::ElasticSettings;
use catalog_core::mapping::IndexMapping;
use catalog_core::traits::SearchIndex;
use catalog_core::types::{BulkResponse, Document, SettingsPatch};
use catalog_core::{Error, Result};

use crate::bulk::{bulk_body, error_reason, parse_bulk_response};

pub struct ElasticSearch {
    base_url: String,
    client: reqwest::Client,
    username: Option<String>,
    password: Option<String>,
    runtime: tokio::runtime::Runtime,
}

impl ElasticSearch {
    pub fn new(base_url: &str, settings: &ElasticSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("http client: {}", e)))?;
        let runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            username: settings.username.clone(),
            password: settings.password.clone(),
            runtime,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}/{}", self.base_url, path));
        match &self.username {
            Some(user) => builder.basic_auth(user, self.password.as_deref()),
            None => builder,
        }
    }

    /// Send and read the whole body. Only transport failures are errors here;
    /// status handling is left to the caller.
    fn send(&self, builder: RequestBuilder) -> std::result::Result<(StatusCode, String), reqwest::Error> {
        self.runtime.block_on(async {
            let response = builder.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        })
    }

    fn admin(&self, name: &str, method: Method, path: &str, body: Option<&serde_json::Value>) -> Result<(StatusCode, String)> {
        let mut builder = self.request(method.clone(), path);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let (status, text) = self.send(builder).map_err(|e| Error::Index(format!("{} {}: {}", method, name, e)))?;
        Ok((status, text))
    }
}

fn reason_from_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").map(error_reason))
        .unwrap_or_else(|| body.to_string())
}

impl SearchIndex for ElasticSearch {
    fn delete_index(&self, name: &str) -> Result<()> {
        let (status, body) = self.admin(name, Method::DELETE, name, None)?;
        if status.is_success() || status == StatusCode::NOT_FOUND {
            tracing::info!(index = name, %status, "deleted index");
            return Ok(());
        }
        Err(Error::Index(format!("delete '{}' returned {}: {}", name, status, reason_from_body(&body))))
    }

    fn create_index(&self, name: &str, mapping: &IndexMapping) -> Result<()> {
        let (status, body) = self.admin(name, Method::PUT, name, Some(mapping.body()))?;
        if !status.is_success() {
            return Err(Error::Index(format!("create '{}' returned {}: {}", name, status, reason_from_body(&body))));
        }
        tracing::info!(index = name, "created index");
        Ok(())
    }

    fn put_settings(&self, name: &str, patch: &SettingsPatch) -> Result<()> {
        let path = format!("{}/_settings", name);
        let (status, body) = self.admin(name, Method::PUT, &path, Some(&patch.to_json()))?;
        match status {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(Error::NotFound(format!("index '{}'", name))),
            s => Err(Error::Index(format!("settings '{}' returned {}: {}", name, s, reason_from_body(&body)))),
        }
    }

    fn bulk_index(&self, name: &str, doc_type: &str, docs: &BTreeMap<u64, Document>) -> Result<BulkResponse> {
        let body = bulk_body(name, doc_type, docs)?;
        let builder = self
            .request(Method::POST, &format!("{}/_bulk", name))
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(body);
        let (status, text) = self.send(builder).map_err(|e| Error::submission(name, e))?;
        if !status.is_success() {
            return Err(Error::submission(name, format!("bulk returned {}: {}", status, reason_from_body(&text))));
        }
        parse_bulk_response(name, &text).map_err(|e| Error::submission(name, e))
    }

    fn add_document(&self, name: &str, doc_type: &str, id: u64, doc: &Document) -> Result<()> {
        let doc_type = if doc_type.is_empty() { "_doc" } else { doc_type };
        let builder = self.request(Method::PUT, &format!("{}/{}/{}", name, doc_type, id)).json(doc);
        let (status, text) = self.send(builder).map_err(|e| Error::submission(name, e))?;
        match status {
            s if s.is_success() => Ok(()),
            StatusCode::BAD_REQUEST => Err(Error::rejected(name, id, reason_from_body(&text))),
            s => Err(Error::submission(name, format!("document {} returned {}: {}", id, s, reason_from_body(&text)))),
        }
    }
}
