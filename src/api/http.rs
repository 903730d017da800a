use super::{BOOKMARKS_PATH, Backend, TAGS_PATH, bookmark_path, tag_path};
use crate::config::Config;
use crate::error::{ClientError, Operation};
use crate::model::{
    Bookmark, BookmarkId, BookmarkPatch, BookmarkQuery, NewBookmark, NewTag,
    Tag, TagId,
};
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Blocking HTTP implementation of [`Backend`]. Requests run one at a time
/// on the calling thread.
pub struct HttpBackend {
    client: Client,
    base: String,
}

impl HttpBackend {
    pub fn new(base: &str, timeout: Duration) -> Result<Self, ClientError> {
        let mut builder = Client::builder().timeout(timeout);
        // A system proxy cannot reach a server on this machine.
        if is_loopback(base) {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("http client: {e}")))?;
        Ok(Self { client, base: base.trim_end_matches('/').to_string() })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(&config.api_base, config.timeout())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Send the request and return the body text of a 2xx answer. Any other
    /// status becomes [`ClientError::Http`] carrying the body verbatim.
    fn send(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> Result<String, ClientError> {
        let response = request
            .send()
            .map_err(|source| ClientError::Transport { operation, source })?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|source| ClientError::Transport { operation, source })?;
        debug!(%operation, status = status.as_u16(), bytes = body.len(), "response");
        if !status.is_success() {
            warn!(%operation, status = status.as_u16(), "request failed");
            return Err(ClientError::Http {
                operation,
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    fn decode<T: DeserializeOwned>(
        operation: Operation,
        body: &str,
    ) -> Result<T, ClientError> {
        serde_json::from_str(body)
            .map_err(|source| ClientError::Decode { operation, source })
    }
}

fn is_loopback(base: &str) -> bool {
    let Ok(url) = Url::parse(base) else { return false };
    let Some(host) = url.host_str() else { return false };
    let host = host.trim_start_matches('[').trim_end_matches(']');
    host.eq_ignore_ascii_case("localhost")
        || host.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback())
}

impl Backend for HttpBackend {
    fn list_tags(&mut self) -> Result<Vec<Tag>, ClientError> {
        let op = Operation::LoadTags;
        let body = self.send(op, self.client.get(self.url(TAGS_PATH)))?;
        Self::decode(op, &body)
    }

    fn create_tag(&mut self, tag: &NewTag) -> Result<Tag, ClientError> {
        let op = Operation::CreateTag;
        let request = self.client.post(self.url(TAGS_PATH)).json(tag);
        let created: Tag = Self::decode(op, &self.send(op, request)?)?;
        info!(tag_id = created.id, name = %created.name, "tag created");
        Ok(created)
    }

    fn delete_tag(&mut self, id: TagId) -> Result<(), ClientError> {
        let request = self.client.delete(self.url(&tag_path(id)));
        self.send(Operation::DeleteTag, request)?;
        info!(tag_id = id, "tag deleted");
        Ok(())
    }

    fn list_bookmarks(
        &mut self,
        query: &BookmarkQuery,
    ) -> Result<Vec<Bookmark>, ClientError> {
        let op = Operation::LoadBookmarks;
        let url = format!("{}{}", self.url(BOOKMARKS_PATH), query.query_string());
        debug!(%url, "fetching bookmarks");
        let body = self.send(op, self.client.get(url))?;
        Self::decode(op, &body)
    }

    fn create_bookmark(
        &mut self,
        bookmark: &NewBookmark,
    ) -> Result<(), ClientError> {
        let request = self.client.post(self.url(BOOKMARKS_PATH)).json(bookmark);
        self.send(Operation::CreateBookmark, request)?;
        info!(url = %bookmark.url, tags = bookmark.tag_ids.len(), "bookmark created");
        Ok(())
    }

    fn update_bookmark(
        &mut self,
        id: BookmarkId,
        patch: &BookmarkPatch,
    ) -> Result<(), ClientError> {
        let request = self.client.patch(self.url(&bookmark_path(id))).json(patch);
        self.send(Operation::UpdateBookmark, request)?;
        info!(bookmark_id = id, "bookmark updated");
        Ok(())
    }

    fn delete_bookmark(&mut self, id: BookmarkId) -> Result<(), ClientError> {
        let request = self.client.delete(self.url(&bookmark_path(id)));
        self.send(Operation::DeleteBookmark, request)?;
        info!(bookmark_id = id, "bookmark deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_loopback() {
        assert!(is_loopback("http://127.0.0.1:8000"));
        assert!(is_loopback("http://localhost/api"));
        assert!(is_loopback("http://[::1]:8000"));
        assert!(!is_loopback("https://links.example.com"));
        assert!(!is_loopback("http://10.0.0.1:8000"));
        assert!(!is_loopback("http://127.example.com:8000"));
        assert!(!is_loopback("not a url"));
        assert!(is_loopback("http://127.0.0.2"));
    }

    #[test]
    fn test_base_drops_trailing_slash() {
        let backend =
            HttpBackend::new("http://127.0.0.1:8000/", Duration::from_secs(1))
                .unwrap();
        assert_eq!(backend.url(TAGS_PATH), "http://127.0.0.1:8000/api/tags/");
    }
}
