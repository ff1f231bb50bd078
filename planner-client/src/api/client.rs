use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::{
    api::dto::{
        AuthResponse, ErrorBody, LoginRequest, NewProject, NewSchedule, Project, ProjectPatch,
        RegisterRequest, Schedule, SchedulePatch, ScheduleQuery, ScheduleStatus, StatusRequest,
        User,
    },
    error::ClientError,
    store::PlannerBackend,
};

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        // A trailing slash keeps any path prefix (e.g. `/api`) when joining.
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .map_err(|_| ClientError::InvalidUrl(base_url.to_string()))?;
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let path = path.trim_start_matches('/');
        self.base_url
            .join(path)
            .map_err(|_| ClientError::InvalidUrl(format!("{}{}", self.base_url, path)))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        Ok(self.client.request(method, self.endpoint(path)?))
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::NotAuthenticated)?;
        Ok(self.request(method, path)?.bearer_auth(token))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(error) => (error.code, error.error),
            Err(_) => (
                None,
                status.canonical_reason().unwrap_or_default().to_string(),
            ),
        };

        Err(ClientError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_without_body(&self, request: RequestBuilder) -> Result<(), ClientError> {
        let response = self.send(request).await?;
        let _ = response.bytes().await;
        Ok(())
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ClientError> {
        self.get_json(
            self.request(Method::POST, "/auth/login")?
                .json(&LoginRequest { username, password }),
        )
        .await
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<AuthResponse, ClientError> {
        self.get_json(
            self.request(Method::POST, "/auth/register")?
                .json(&RegisterRequest {
                    username,
                    password,
                    display_name,
                }),
        )
        .await
    }

    pub async fn profile(&self) -> Result<User, ClientError> {
        self.get_json(self.authed(Method::GET, "/auth/profile")?).await
    }

    pub async fn get_project(&self, id: i32) -> Result<Project, ClientError> {
        self.get_json(self.authed(Method::GET, &format!("/projects/{id}"))?)
            .await
    }

    pub async fn get_schedule(&self, id: i32) -> Result<Schedule, ClientError> {
        self.get_json(self.authed(Method::GET, &format!("/schedules/{id}"))?)
            .await
    }
}

#[async_trait]
impl PlannerBackend for ApiClient {
    async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
        self.get_json(self.authed(Method::GET, "/projects")?).await
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project, ClientError> {
        self.get_json(self.authed(Method::POST, "/projects")?.json(project))
            .await
    }

    async fn update_project(
        &self,
        id: i32,
        patch: &ProjectPatch,
    ) -> Result<Project, ClientError> {
        self.get_json(
            self.authed(Method::PUT, &format!("/projects/{id}"))?
                .json(patch),
        )
        .await
    }

    async fn delete_project(&self, id: i32) -> Result<(), ClientError> {
        self.send_without_body(self.authed(Method::DELETE, &format!("/projects/{id}"))?)
            .await
    }

    async fn list_schedules(&self, query: &ScheduleQuery) -> Result<Vec<Schedule>, ClientError> {
        self.get_json(
            self.authed(Method::GET, "/schedules")?
                .query(&query.to_pairs()),
        )
        .await
    }

    async fn create_schedule(&self, schedule: &NewSchedule) -> Result<Schedule, ClientError> {
        self.get_json(self.authed(Method::POST, "/schedules")?.json(schedule))
            .await
    }

    async fn update_schedule(
        &self,
        id: i32,
        patch: &SchedulePatch,
    ) -> Result<Schedule, ClientError> {
        self.get_json(
            self.authed(Method::PUT, &format!("/schedules/{id}"))?
                .json(patch),
        )
        .await
    }

    async fn set_schedule_status(
        &self,
        id: i32,
        status: ScheduleStatus,
    ) -> Result<Schedule, ClientError> {
        self.get_json(
            self.authed(Method::PATCH, &format!("/schedules/{id}/status"))?
                .json(&StatusRequest { status }),
        )
        .await
    }

    async fn delete_schedule(&self, id: i32) -> Result<(), ClientError> {
        self.send_without_body(self.authed(Method::DELETE, &format!("/schedules/{id}"))?)
            .await
    }
}
