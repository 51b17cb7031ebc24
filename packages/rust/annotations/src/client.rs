//! HTTP client for the text-annotation endpoints.

use std::time::Duration;

use reqwest::header::COOKIE;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};
use url::Url;

use lasfera_shared::{Result, SferaError};

use crate::model::{AnnotationDetail, AnnotationId, CreateResponse, NewAnnotation, StoredAnnotation};

const USER_AGENT: &str = concat!("LaSfera/", env!("CARGO_PKG_VERSION"));

/// Client for `/text-annotations/`.
///
/// Cookies set by the server are kept for the client's lifetime. A session
/// cookie obtained elsewhere can be attached with
/// [`AnnotationClient::with_session_cookie`].
#[derive(Debug, Clone)]
pub struct AnnotationClient {
    client: Client,
    base_url: Url,
    session_cookie: Option<String>,
}

impl AnnotationClient {
    pub fn new(base_url: Url, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .cookie_store(true)
            .build()
            .map_err(|e| SferaError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            session_cookie: None,
        })
    }

    /// Send `cookie` (a `Cookie` header value) with every request.
    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        let cookie = cookie.into();
        self.session_cookie = (!cookie.trim().is_empty()).then_some(cookie);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `base_url` extended with `segments` and a trailing slash. Segments are
    /// percent-encoded, so ids cannot escape their path position.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                SferaError::config(format!("API base URL cannot take a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    fn with_headers(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header("X-Requested-With", "XMLHttpRequest");
        match &self.session_cookie {
            Some(cookie) => builder.header(COOKIE, cookie.as_str()),
            None => builder,
        }
    }

    /// Create an annotation and return its server id.
    #[instrument(skip_all, fields(stanza = %request.stanza_id, kind = %request.annotation_type))]
    pub async fn create(&self, request: &NewAnnotation, csrf_token: &str) -> Result<AnnotationId> {
        let url = self.endpoint(&["text-annotations", "create"])?;
        let from_pos = request.from_pos.to_string();
        let to_pos = request.to_pos.to_string();
        let form = [
            ("stanza_id", request.stanza_id.as_str()),
            ("selected_text", request.selected_text.as_str()),
            ("annotation", request.annotation.as_str()),
            ("annotation_type", request.annotation_type.as_str()),
            ("from_pos", from_pos.as_str()),
            ("to_pos", to_pos.as_str()),
            ("csrfmiddlewaretoken", csrf_token),
        ];

        let response = self
            .with_headers(self.client.post(url.as_str()))
            .header("X-CSRFToken", csrf_token)
            .form(&form)
            .send()
            .await
            .map_err(|e| SferaError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SferaError::Network(format!("{url}: failed to read body: {e}")))?;

        // The server reports failures in the body, with or without a 200.
        let parsed: Option<CreateResponse> = serde_json::from_str(&body).ok();
        match parsed {
            Some(CreateResponse {
                success: true,
                annotation_id: Some(id),
                ..
            }) if status.is_success() => {
                info!(id = %id, "annotation saved");
                Ok(id)
            }
            Some(CreateResponse { error: Some(error), .. }) => {
                warn!(%status, %error, "annotation rejected");
                Err(SferaError::Network(error))
            }
            _ => {
                warn!(%status, url = %url, "annotation save failed");
                Err(SferaError::Network("Failed to save annotation".into()))
            }
        }
    }

    /// Every annotation stored for a stanza.
    #[instrument(skip(self))]
    pub async fn list(&self, stanza_id: &str) -> Result<Vec<StoredAnnotation>> {
        let url = self.endpoint(&["text-annotations", "get", stanza_id])?;
        let annotations: Vec<StoredAnnotation> = self.get_json(&url).await?;
        debug!(count = annotations.len(), "annotations listed");
        Ok(annotations)
    }

    /// Type and content of one annotation.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: &AnnotationId) -> Result<AnnotationDetail> {
        let url = self.endpoint(&["text-annotations", "annotation", id.as_str()])?;
        self.get_json(&url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let response = self
            .with_headers(self.client.get(url.as_str()))
            .send()
            .await
            .map_err(|e| SferaError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SferaError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SferaError::Network(format!("{url}: failed to read body: {e}")))?;

        serde_json::from_str(&body)
            .map_err(|e| SferaError::parse(url.as_str(), format!("unexpected response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnnotationType;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> NewAnnotation {
        NewAnnotation {
            stanza_id: "42".into(),
            selected_text: "la sfera".into(),
            annotation: "the sphere".into(),
            annotation_type: AnnotationType::Variant,
            from_pos: 0,
            to_pos: 8,
        }
    }

    async fn client(server: &MockServer) -> AnnotationClient {
        AnnotationClient::new(Url::parse(&server.uri()).unwrap(), 5).unwrap()
    }

    #[tokio::test]
    async fn create_posts_form_and_returns_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/text-annotations/create/"))
            .and(header("X-Requested-With", "XMLHttpRequest"))
            .and(body_string_contains("stanza_id=42"))
            .and(body_string_contains("annotation_type=variant"))
            .and(body_string_contains("csrfmiddlewaretoken=tok"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"success": true, "annotation_id": 9}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let id = client(&server).await.create(&request(), "tok").await.expect("create");
        assert_eq!(id, AnnotationId::new("9"));
    }

    #[tokio::test]
    async fn create_surfaces_server_error_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"success": false, "error": "Stanza not found"}"#),
            )
            .mount(&server)
            .await;

        let err = client(&server).await.create(&request(), "tok").await.unwrap_err();
        assert_eq!(err.to_string(), "network error: Stanza not found");
    }

    #[tokio::test]
    async fn create_without_success_flag_fails() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let err = client(&server).await.create(&request(), "tok").await.unwrap_err();
        assert!(matches!(err, SferaError::Network(_)));
    }

    #[tokio::test]
    async fn create_failure_without_message_uses_generic_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"success": false}"#))
            .mount(&server)
            .await;

        let err = client(&server).await.create(&request(), "tok").await.unwrap_err();
        assert_eq!(err.to_string(), "network error: Failed to save annotation");
    }

    #[tokio::test]
    async fn session_cookie_is_sent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/text-annotations/create/"))
            .and(header("Cookie", "sessionid=abc"))
            .and(header("X-CSRFToken", "tok"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"success": true, "annotation_id": 12}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let id = client(&server)
            .await
            .with_session_cookie("sessionid=abc")
            .create(&request(), "tok")
            .await
            .expect("create");
        assert_eq!(id, AnnotationId::new("12"));
    }

    #[tokio::test]
    async fn server_cookies_are_kept_between_requests() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/text-annotations/get/1/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Set-Cookie", "csrftoken=xyz; Path=/")
                    .set_body_string("[]"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/text-annotations/get/2/"))
            .and(header("Cookie", "csrftoken=xyz"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server).await;
        client.list("1").await.expect("first list");
        client.list("2").await.expect("second list carries cookie");
    }

    #[tokio::test]
    async fn base_url_path_prefix_is_kept() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/sfera/text-annotations/get/42/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&server)
            .await;

        let base = Url::parse(&format!("{}/sfera/", server.uri())).unwrap();
        let client = AnnotationClient::new(base, 5).unwrap();
        assert!(client.list("42").await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn ids_are_escaped_in_the_path() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/text-annotations/annotation/5%2F..%2Fadmin/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"annotation_type": "note", "annotation": "x"}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .await
            .get(&AnnotationId::new("5/../admin"))
            .await
            .expect("get");
    }

    #[tokio::test]
    async fn list_returns_stored_annotations() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/text-annotations/get/42/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"id": 1, "selected_text": "sfera", "annotation": "x", "annotation_type": "note"}]"#,
            ))
            .mount(&server)
            .await;

        let list = client(&server).await.list("42").await.expect("list");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].selected_text, "sfera");
    }

    #[tokio::test]
    async fn get_returns_detail() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/text-annotations/annotation/5/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"annotation_type": "reference", "annotation": "See canto II"}"#,
            ))
            .mount(&server)
            .await;

        let detail = client(&server)
            .await
            .get(&AnnotationId::new("5"))
            .await
            .expect("get");
        assert_eq!(detail.annotation_type, AnnotationType::Reference);
        assert_eq!(detail.annotation.as_deref(), Some("See canto II"));
    }

    #[tokio::test]
    async fn get_missing_is_network_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .get(&AnnotationId::new("5"))
            .await
            .unwrap_err();
        assert!(matches!(err, SferaError::Network(_)));
    }
}
