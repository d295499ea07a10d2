//! REST-backed `VirtualPersonRepository`.
//!
//! Talks to a Feathers-style data-access service:
//!
//! | operation | request                                                      |
//! |-----------|--------------------------------------------------------------|
//! | find      | `GET {base}/{service}?projectId=..&nameEncoded[$in][]=..`    |
//! | create    | `POST {base}/{service}`                                      |
//! | patch     | `PATCH {base}/{service}/{id}`                                |
//!
//! Find results may come back as a bare array or as a page (`{ "data": [..] }`);
//! pagination is disabled with `$paginate=false`.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use vpersona_core::error::{Result, VpError};
use vpersona_core::person::{VirtualPerson, VirtualPersonRepository};

/// Fields requested by `find`; the service always adds its id field.
const FIND_SELECT: [&str; 2] = ["name", "nameEncoded"];

/// Repository implementation over HTTP.
#[derive(Clone)]
pub struct RestPersonRepository {
    client: Client,
    base_url: String,
    service: String,
    token: Option<String>,
}

impl RestPersonRepository {
    pub fn new(base_url: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service: service.into().trim_matches('/').to_string(),
            token: None,
        }
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn service_url(&self) -> String {
        format!("{}/{}", self.base_url, self.service)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, id: Option<&str>) -> Result<Response> {
        let response = self.authorize(builder).send().await.map_err(|err| {
            VpError::data_access(format!("Person service request failed: {err}"))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(VpError::not_found("virtual_person", id));
            }
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read person service error body".to_string());
        Err(map_http_error(status, body))
    }
}

#[async_trait::async_trait]
impl VirtualPersonRepository for RestPersonRepository {
    async fn find_by_encoded_names(
        &self,
        project_id: &str,
        encoded_names: &[String],
    ) -> Result<Vec<VirtualPerson>> {
        if encoded_names.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: Vec<(&str, &str)> = vec![("projectId", project_id), ("$paginate", "false")];
        query.extend(encoded_names.iter().map(|n| ("nameEncoded[$in][]", n.as_str())));
        query.extend(FIND_SELECT.iter().map(|field| ("$select[]", *field)));

        let builder = self.client.get(self.service_url()).query(&query);
        let response = self.send(builder, None).await?;

        let parsed: FindResponse = response
            .json()
            .await
            .map_err(|err| VpError::data_access(format!("Invalid find response: {err}")))?;
        Ok(parsed.into_records())
    }

    async fn create(&self, person: &VirtualPerson) -> Result<VirtualPerson> {
        let builder = self.client.post(self.service_url()).json(person);
        let response = self.send(builder, None).await?;

        let stored: VirtualPerson = response
            .json()
            .await
            .map_err(|err| VpError::data_access(format!("Invalid create response: {err}")))?;

        if !stored.is_persisted() {
            return Err(VpError::data_access(format!(
                "Person service created '{}' without an id",
                stored.name
            )));
        }
        Ok(stored)
    }

    async fn patch(&self, id: &str, person: &VirtualPerson) -> Result<VirtualPerson> {
        let url = format!("{}/{}", self.service_url(), id);
        // The id travels in the path only
        let body = VirtualPerson {
            id: None,
            ..person.clone()
        };
        let builder = self.client.patch(url).json(&body);
        let response = self.send(builder, Some(id)).await?;

        response
            .json()
            .await
            .map_err(|err| VpError::data_access(format!("Invalid patch response: {err}")))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FindResponse {
    List(Vec<VirtualPerson>),
    Page { data: Vec<VirtualPerson> },
}

impl FindResponse {
    fn into_records(self) -> Vec<VirtualPerson> {
        match self {
            FindResponse::List(records) | FindResponse::Page { data: records } => records,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn map_http_error(status: StatusCode, body: String) -> VpError {
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|wrapper| wrapper.message)
        .unwrap_or(body);

    let retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    VpError::Http {
        status: Some(status.as_u16()),
        message,
        retryable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vpersona_core::naming::encode_name;
    use vpersona_core::project::Project;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn jane() -> VirtualPerson {
        VirtualPerson::candidate("Jane Doe", &Project::new("p1", "https://acme.io", "u1"))
            .with_profile("Bio", "CTO")
    }

    #[tokio::test]
    async fn test_find_sends_in_query_and_reads_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/virtual-persons"))
            .and(query_param("projectId", "p1"))
            .and(query_param("nameEncoded[$in][]", encode_name("Jane Doe").as_str()))
            .and(query_param("$paginate", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 1,
                "data": [{ "_id": "a1", "name": "Jane Doe", "nameEncoded": encode_name("Jane Doe") }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let repo = RestPersonRepository::new(server.uri(), "virtual-persons");
        let found = repo
            .find_by_encoded_names("p1", &[encode_name("Jane Doe"), encode_name("John Roe")])
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id.as_deref(), Some("a1"));
        assert_eq!(found[0].name, "Jane Doe");
    }

    #[tokio::test]
    async fn test_find_reads_bare_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/virtual-persons"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let repo = RestPersonRepository::new(format!("{}/", server.uri()), "virtual-persons");
        let found = repo
            .find_by_encoded_names("p1", &[encode_name("Jane Doe")])
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_create_posts_record_with_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/virtual-persons"))
            .and(header("authorization", "Bearer secret"))
            .and(body_partial_json(json!({
                "name": "Jane Doe",
                "nameEncoded": encode_name("Jane Doe"),
                "link": "jane-doe",
                "projectId": "p1",
                "ownerId": "u1"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "_id": "new-1",
                "name": "Jane Doe",
                "nameEncoded": encode_name("Jane Doe"),
                "biography": "Bio",
                "status": "CTO",
                "link": "jane-doe",
                "projectId": "p1",
                "ownerId": "u1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let repo = RestPersonRepository::new(server.uri(), "virtual-persons").with_token("secret");
        let stored = repo.create(&jane()).await.unwrap();
        assert_eq!(stored, jane().with_id("new-1"));
    }

    #[tokio::test]
    async fn test_patch_unknown_id_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/virtual-persons/zz"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "name": "NotFound", "message": "No record found for id 'zz'", "code": 404
            })))
            .mount(&server)
            .await;

        let repo = RestPersonRepository::new(server.uri(), "virtual-persons");
        let err = repo.patch("zz", &jane()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_server_error_carries_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({
                "message": "database unavailable"
            })))
            .mount(&server)
            .await;

        let repo = RestPersonRepository::new(server.uri(), "virtual-persons");
        let err = repo.create(&jane()).await.unwrap_err();
        match err {
            VpError::Http {
                status,
                message,
                retryable,
            } => {
                assert_eq!(status, Some(503));
                assert_eq!(message, "database unavailable");
                assert!(retryable);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
