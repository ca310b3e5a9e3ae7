//! Purpose: Provide an HTTP client for the stocklet v0 protocol.
//! Exports: `RemoteCatalog`.
//! Role: Client mirror of local catalog operations against a running server.
//! Invariants: Request/response bodies align with `api::message` wire types.
//! Invariants: Error bodies are a flat {"error": string}; the HTTP status carries the kind.
#![allow(clippy::result_large_err)]

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::message::{CreateProductRequest, ErrorBody, ProductBody};
use crate::core::error::{Error, ErrorKind};

type ApiResult<T> = Result<T, Error>;

#[derive(Clone)]
pub struct RemoteCatalog {
    inner: Arc<RemoteCatalogInner>,
}

struct RemoteCatalogInner {
    base_url: Url,
    agent: ureq::Agent,
}

impl RemoteCatalog {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .build();
        Ok(Self {
            inner: Arc::new(RemoteCatalogInner { base_url, agent }),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Creates a product on the remote catalog and returns the wire body.
    pub fn create_product(&self, name: &str) -> ApiResult<ProductBody> {
        let url = build_url(&self.inner.base_url, &["v0", "products"])?;
        let payload = CreateProductRequest { name };
        self.post_json(&url, &payload)
    }

    fn post_json<T, R>(&self, url: &Url, body: &T) -> ApiResult<R>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let encoded = serde_json::to_string(body).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to encode request json")
                .with_source(err)
        })?;
        let outcome = self
            .inner
            .agent
            .request("POST", url.as_str())
            .set("Accept", "application/json")
            .set("Content-Type", "application/json")
            .send_string(&encoded);

        match outcome {
            Ok(response) => read_json_response(response),
            Err(ureq::Error::Status(status, response)) => {
                Err(parse_error_response(status, response))
            }
            Err(ureq::Error::Transport(err)) => Err(Error::new(ErrorKind::Io)
                .with_message("could not reach remote catalog")
                .with_source(err)),
        }
    }
}

fn normalize_base_url(input: String) -> ApiResult<Url> {
    let mut url = Url::parse(&input).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("could not parse remote catalog url")
            .with_source(err)
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(
            Error::new(ErrorKind::Usage).with_message("remote catalog url must be http or https")
        );
    }
    if !matches!(url.path(), "" | "/") {
        return Err(
            Error::new(ErrorKind::Usage).with_message("remote catalog url must not carry a path")
        );
    }
    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn build_url(base_url: &Url, segments: &[&str]) -> ApiResult<Url> {
    let mut url = base_url.clone();
    {
        let mut parts = url.path_segments_mut().map_err(|_| {
            Error::new(ErrorKind::Usage).with_message("remote catalog url cannot hold segments")
        })?;
        parts.clear();
        for segment in segments {
            parts.push(segment);
        }
    }
    Ok(url)
}

fn read_json_response<R>(response: ureq::Response) -> ApiResult<R>
where
    R: DeserializeOwned,
{
    let text = response.into_string().map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read response from server")
            .with_source(err)
    })?;
    serde_json::from_str(&text).map_err(|err| {
        Error::new(ErrorKind::Corrupt)
            .with_message("server returned unparseable json")
            .with_source(err)
    })
}

fn parse_error_response(status: u16, response: ureq::Response) -> Error {
    let kind = error_kind_from_status(status);
    let text = response.into_string().unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(decoded) => Error::new(kind).with_message(decoded.error),
        Err(_) => Error::new(kind).with_message(format!("remote returned status {status}")),
    }
}

fn error_kind_from_status(status: u16) -> ErrorKind {
    match status {
        400 | 413 => ErrorKind::Usage,
        401 | 403 => ErrorKind::Permission,
        404 => ErrorKind::NotFound,
        423 => ErrorKind::Busy,
        500..=599 => ErrorKind::Internal,
        _ => ErrorKind::Io,
    }
}

#[cfg(test)]
mod tests {
    use super::{RemoteCatalog, build_url, error_kind_from_status, normalize_base_url};
    use crate::core::error::ErrorKind;

    #[test]
    fn normalize_base_url_appends_root_path() {
        let url = normalize_base_url("http://localhost:9900".to_string()).expect("url");
        assert_eq!(url.as_str(), "http://localhost:9900/");
    }

    #[test]
    fn normalize_base_url_clears_query_and_fragment() {
        let url = normalize_base_url("http://localhost:9900/?x=1#frag".to_string()).expect("url");
        assert_eq!(url.as_str(), "http://localhost:9900/");
    }

    #[test]
    fn normalize_base_url_rejects_paths_and_schemes() {
        assert!(normalize_base_url("http://localhost:9900/api".to_string()).is_err());
        assert!(normalize_base_url("ftp://localhost:9900".to_string()).is_err());
        assert!(normalize_base_url("not a url".to_string()).is_err());
    }

    #[test]
    fn build_url_appends_segments() {
        let base = normalize_base_url("http://127.0.0.1:9900".to_string()).expect("url");
        let url = build_url(&base, &["v0", "products"]).expect("url");
        assert_eq!(url.as_str(), "http://127.0.0.1:9900/v0/products");
    }

    #[test]
    fn status_mapping_matches_server_contract() {
        let cases = [
            (400, ErrorKind::Usage),
            (413, ErrorKind::Usage),
            (403, ErrorKind::Permission),
            (404, ErrorKind::NotFound),
            (423, ErrorKind::Busy),
            (500, ErrorKind::Internal),
            (302, ErrorKind::Io),
        ];
        for (status, kind) in cases {
            assert_eq!(error_kind_from_status(status), kind);
        }
    }

    #[test]
    fn base_url_reflects_normalized_input() {
        let client = RemoteCatalog::new("http://localhost:9900").expect("client");
        assert_eq!(client.base_url().as_str(), "http://localhost:9900/");
    }

    #[test]
    fn unparseable_success_body_maps_to_corrupt() {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let reply_thread = std::thread::spawn(move || {
            let (mut socket, _) = listener.accept().expect("accept");
            // Read the whole request before replying; the body ends the JSON object.
            let mut request = Vec::new();
            let mut chunk = [0u8; 512];
            loop {
                let read = socket.read(&mut chunk).expect("read request");
                request.extend_from_slice(&chunk[..read]);
                if read == 0 || request.ends_with(b"}") {
                    break;
                }
            }
            let reply = "HTTP/1.1 200 OK\r\n\
                         content-type: application/json\r\n\
                         content-length: 8\r\n\
                         connection: close\r\n\r\n\
                         not json";
            socket.write_all(reply.as_bytes()).expect("write reply");
        });

        let client = RemoteCatalog::new(format!("http://{addr}")).expect("client");
        let err = client.create_product("widget").expect_err("undecodable body");
        assert_eq!(err.kind(), ErrorKind::Corrupt);
        reply_thread.join().expect("reply thread");
    }
}
