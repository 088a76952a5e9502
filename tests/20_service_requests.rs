mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{send, TestServer};
use itsm_api::security::Permission;

/// One filiale, one type and one source; returns their ids
async fn seed_references(server: &TestServer) -> Result<(u64, u64, u64)> {
    let filiale = server.seed("/filiales", json!({"code": "ABJ", "name": "Abidjan"})).await?;
    let request_type = server
        .seed(
            "/service-requests/types",
            json!({"code": "INC", "name": "Incident", "default_priority": "high"}),
        )
        .await?;
    let source = server.seed("/request-sources", json!({"code": "MAIL", "name": "E-mail"})).await?;

    Ok((
        filiale["id"].as_u64().unwrap(),
        request_type["id"].as_u64().unwrap(),
        source["id"].as_u64().unwrap(),
    ))
}

async fn seed_request(server: &TestServer, filiale_id: u64, type_id: u64) -> Result<Value> {
    server
        .seed(
            "/service-requests",
            json!({"title": "Imprimante en panne", "type_id": type_id, "filiale_id": filiale_id}),
        )
        .await
}

#[tokio::test]
async fn create_assigns_code_and_type_priority() -> Result<()> {
    let server = TestServer::start().await?;
    let (filiale_id, type_id, source_id) = seed_references(&server).await?;
    let token = server.token(4, Some(filiale_id), &[Permission::ServiceRequestsCreate]);

    let (status, body) = send(server.post(
        "/service-requests",
        &token,
        &json!({
            "title": "Accès VPN",
            "type_id": type_id,
            "source_id": source_id,
            "filiale_id": filiale_id,
        }),
    ))
    .await?;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["code"], "SR-000001");
    assert_eq!(body["data"]["priority"], "high");
    assert_eq!(body["data"]["status"], "open");
    assert_eq!(body["data"]["created_by"], 4);
    Ok(())
}

#[tokio::test]
async fn unknown_type_is_a_domain_error() -> Result<()> {
    let server = TestServer::start().await?;
    let (filiale_id, _, _) = seed_references(&server).await?;

    let (status, body) = send(server.post(
        "/service-requests",
        &server.admin_token(),
        &json!({"title": "Test", "type_id": 99, "filiale_id": filiale_id}),
    ))
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Type de demande invalide");
    Ok(())
}

#[tokio::test]
async fn validation_requires_resolution_and_happens_once() -> Result<()> {
    let server = TestServer::start().await?;
    let (filiale_id, type_id, _) = seed_references(&server).await?;
    let request = seed_request(&server, filiale_id, type_id).await?;
    let path = format!("/service-requests/{}", request["id"]);
    let token = server.token(
        2,
        None,
        &[Permission::ServiceRequestsUpdate, Permission::ServiceRequestsValidate],
    );

    let (status, body) = send(server.post(&format!("{}/validate", path), &token, &json!({}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Seule une demande résolue peut être validée");

    let (status, body) = send(server.put(&path, &token, &json!({"status": "resolved"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["resolved_at"].is_string());

    let (status, body) = send(server.post(&format!("{}/validate", path), &token, &json!({}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["validated_by"], 2);

    let (status, body) = send(server.post(&format!("{}/validate", path), &token, &json!({}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Demande déjà validée");
    Ok(())
}

#[tokio::test]
async fn filiale_filter_needs_its_own_permission() -> Result<()> {
    let server = TestServer::start().await?;
    let (filiale_id, type_id, _) = seed_references(&server).await?;
    seed_request(&server, filiale_id, type_id).await?;
    let path = format!("/service-requests?filiale_id={}", filiale_id);

    let viewer = server.token(5, None, &[Permission::ServiceRequestsView]);
    let (status, _) = send(server.get(&path, &viewer)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(server.get("/service-requests", &viewer)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let filterer = server.token(
        5,
        None,
        &[Permission::ServiceRequestsView, Permission::ServiceRequestsFilterByFiliale],
    );
    let (status, body) = send(server.get(&path, &filterer)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(server.get("/service-requests?filiale_id=999", &filterer)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn status_filter_is_parsed() -> Result<()> {
    let server = TestServer::start().await?;
    let (filiale_id, type_id, _) = seed_references(&server).await?;
    seed_request(&server, filiale_id, type_id).await?;
    let token = server.token(5, None, &[Permission::ServiceRequestsViewAll]);

    let (status, body) = send(server.get("/service-requests?status=open", &token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(server.get("/service-requests?status=closed", &token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (status, body) = send(server.get("/service-requests?status=sleeping", &token)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Statut invalide");
    Ok(())
}

#[tokio::test]
async fn lookup_by_code() -> Result<()> {
    let server = TestServer::start().await?;
    let (filiale_id, type_id, _) = seed_references(&server).await?;
    seed_request(&server, filiale_id, type_id).await?;
    let token = server.token(5, None, &[Permission::ServiceRequestsView]);

    let (status, body) = send(server.get("/service-requests/code/SR-000001", &token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Imprimante en panne");

    let (status, body) = send(server.get("/service-requests/code/SR-999999", &token)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Demande introuvable");
    Ok(())
}

#[tokio::test]
async fn deleting_missing_type_is_not_found() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.token(1, None, &[Permission::ServiceRequestTypesDelete]);

    let (status, body) = send(server.delete("/service-requests/type/999", &token)).await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Type introuvable");
    Ok(())
}

#[tokio::test]
async fn type_in_use_cannot_be_deleted() -> Result<()> {
    let server = TestServer::start().await?;
    let (filiale_id, type_id, _) = seed_references(&server).await?;
    seed_request(&server, filiale_id, type_id).await?;

    let (status, body) = send(server.delete(&format!("/service-requests/type/{}", type_id), &server.admin_token())).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Type utilisé par des demandes existantes");
    Ok(())
}

#[tokio::test]
async fn request_creators_can_list_types_and_sources() -> Result<()> {
    let server = TestServer::start().await?;
    seed_references(&server).await?;
    let token = server.token(6, None, &[Permission::ServiceRequestsCreate]);

    let (status, body) = send(server.get("/service-requests/types", &token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(server.get("/request-sources", &token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Single-record lookups still need the view permission
    let (status, _) = send(server.get("/request-sources/1", &token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn forbidden_type_update_never_reaches_service() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.token(6, None, &[Permission::ServiceRequestTypesView]);
    let before = server.type_calls();

    let (status, _) = send(server.put("/service-requests/type/1", &token, &json!({"name": "X"}))).await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(server.type_calls(), before);
    Ok(())
}

#[tokio::test]
async fn source_in_use_cannot_be_deleted() -> Result<()> {
    let server = TestServer::start().await?;
    let (filiale_id, type_id, source_id) = seed_references(&server).await?;
    server
        .seed(
            "/service-requests",
            json!({"title": "Badge perdu", "type_id": type_id, "source_id": source_id, "filiale_id": filiale_id}),
        )
        .await?;
    let path = format!("/request-sources/{}", source_id);

    let (status, body) = send(server.delete(&path, &server.admin_token())).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Source utilisée par des demandes existantes");

    let (status, body) = send(server.get(&path, &server.admin_token())).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["code"], "MAIL");
    Ok(())
}
