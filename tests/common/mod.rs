#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::Value;

use itsm_api::auth::{Claims, JwtKeys};
use itsm_api::config::AppConfig;
use itsm_api::routes::app;
use itsm_api::security::Permission;
use itsm_api::services::{
    CreateFilialeRequest, CreateServiceRequestTypeRequest, Filiale, FilialeService, MemoryBackend,
    ServiceRequestType, ServiceRequestTypeService, ServiceResult, Services, UpdateFilialeRequest,
    UpdateServiceRequestTypeRequest,
};
use itsm_api::state::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Router served in-process on a free port, backed by a fresh in-memory store
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    /// Calls that reached the filiale service
    pub filiale_calls: Arc<AtomicUsize>,
    /// Calls that reached the service-request type service
    pub type_calls: Arc<AtomicUsize>,
    keys: JwtKeys,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let backend = Arc::new(MemoryBackend::new());
        let filiale_calls = Arc::new(AtomicUsize::new(0));
        let type_calls = Arc::new(AtomicUsize::new(0));

        let mut services = Services::from_backend(backend.clone());
        services.filiales = Arc::new(CountingFiliales {
            inner: backend.clone(),
            calls: filiale_calls.clone(),
        });
        services.service_request_types = Arc::new(CountingTypes {
            inner: backend,
            calls: type_calls.clone(),
        });

        let keys = JwtKeys::new(TEST_SECRET);
        let state = AppState::new(services, keys.clone());
        let router = app(state, &AppConfig::development());

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            filiale_calls,
            type_calls,
            keys,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Signed bearer token for user `user` scoped to `filiale`
    pub fn token(&self, user: u64, filiale: Option<u64>, permissions: &[Permission]) -> String {
        let codes = permissions.iter().map(|p| p.code().to_string()).collect();
        let claims = Claims::new(Some(user), filiale, codes, 1);
        self.keys.generate(&claims).expect("failed to sign test token")
    }

    /// Token holding every permission, for seeding
    pub fn admin_token(&self) -> String {
        self.token(1, None, Permission::ALL)
    }

    pub fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str, body: &Value) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token).json(body)
    }

    pub fn put(&self, path: &str, token: &str, body: &Value) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token).json(body)
    }

    pub fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }

    pub fn filiale_calls(&self) -> usize {
        self.filiale_calls.load(Ordering::SeqCst)
    }

    pub fn type_calls(&self) -> usize {
        self.type_calls.load(Ordering::SeqCst)
    }

    /// POST with the admin token and return the created record's `data`
    pub async fn seed(&self, path: &str, body: Value) -> Result<Value> {
        let (status, json) = send(self.post(path, &self.admin_token(), &body)).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "seeding {} failed: {} {}", path, status, json);
        Ok(json["data"].clone())
    }
}

/// Send a request and decode the envelope
pub async fn send(request: RequestBuilder) -> Result<(StatusCode, Value)> {
    let res: Response = request.send().await?;
    let status = res.status();
    let body = res.json::<Value>().await?;
    Ok((status, body))
}

struct CountingFiliales {
    inner: Arc<MemoryBackend>,
    calls: Arc<AtomicUsize>,
}

impl CountingFiliales {
    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl FilialeService for CountingFiliales {
    async fn create(&self, req: CreateFilialeRequest, actor: u64) -> ServiceResult<Filiale> {
        self.hit();
        FilialeService::create(self.inner.as_ref(), req, actor).await
    }

    async fn get_all(&self) -> ServiceResult<Vec<Filiale>> {
        self.hit();
        FilialeService::get_all(self.inner.as_ref()).await
    }

    async fn get_active(&self) -> ServiceResult<Vec<Filiale>> {
        self.hit();
        self.inner.get_active().await
    }

    async fn get_by_id(&self, id: u64) -> ServiceResult<Filiale> {
        self.hit();
        FilialeService::get_by_id(self.inner.as_ref(), id).await
    }

    async fn get_by_code(&self, code: &str) -> ServiceResult<Filiale> {
        self.hit();
        FilialeService::get_by_code(self.inner.as_ref(), code).await
    }

    async fn get_software_provider(&self) -> ServiceResult<Filiale> {
        self.hit();
        self.inner.get_software_provider().await
    }

    async fn update(&self, id: u64, req: UpdateFilialeRequest, actor: u64) -> ServiceResult<Filiale> {
        self.hit();
        FilialeService::update(self.inner.as_ref(), id, req, actor).await
    }

    async fn delete(&self, id: u64, actor: u64) -> ServiceResult<()> {
        self.hit();
        FilialeService::delete(self.inner.as_ref(), id, actor).await
    }
}

struct CountingTypes {
    inner: Arc<MemoryBackend>,
    calls: Arc<AtomicUsize>,
}

impl CountingTypes {
    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ServiceRequestTypeService for CountingTypes {
    async fn create(&self, req: CreateServiceRequestTypeRequest, actor: u64) -> ServiceResult<ServiceRequestType> {
        self.hit();
        ServiceRequestTypeService::create(self.inner.as_ref(), req, actor).await
    }

    async fn get_all(&self) -> ServiceResult<Vec<ServiceRequestType>> {
        self.hit();
        ServiceRequestTypeService::get_all(self.inner.as_ref()).await
    }

    async fn get_by_id(&self, id: u64) -> ServiceResult<ServiceRequestType> {
        self.hit();
        ServiceRequestTypeService::get_by_id(self.inner.as_ref(), id).await
    }

    async fn update(
        &self,
        id: u64,
        req: UpdateServiceRequestTypeRequest,
        actor: u64,
    ) -> ServiceResult<ServiceRequestType> {
        self.hit();
        ServiceRequestTypeService::update(self.inner.as_ref(), id, req, actor).await
    }

    async fn delete(&self, id: u64, actor: u64) -> ServiceResult<()> {
        self.hit();
        ServiceRequestTypeService::delete(self.inner.as_ref(), id, actor).await
    }
}
