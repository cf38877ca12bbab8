mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use casedesk::routes::build_router;
use common::{bearer_request, json_request, read_json, Fixture, PASSWORD};
use tower::ServiceExt;

#[tokio::test]
async fn health_is_public() {
    let fx = Fixture::new().await;
    let app = build_router(fx.state.clone());

    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_returns_token_and_user() {
    let fx = Fixture::new().await;
    let app = build_router(fx.state.clone());

    let request = Request::post("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({ "email": fx.manager.email, "password": PASSWORD }).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["user"]["role"], "manager");
    assert_eq!(body["user"]["franchiseId"], fx.f1.to_string());
    let token = body["token"].as_str().unwrap().to_string();

    let response = app
        .oneshot(bearer_request("GET", "/api/auth/validate", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["user"]["id"], fx.manager.id.to_string());
}

#[tokio::test]
async fn bad_credentials_are_401_and_localized() {
    let fx = Fixture::new().await;
    let app = build_router(fx.state.clone());

    let request = Request::post("/api/auth/login")
        .header("content-type", "application/json")
        .header("accept-language", "pt-BR,pt;q=0.9")
        .body(Body::from(
            serde_json::json!({ "email": fx.manager.email, "password": "errada" }).to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["code"], "invalid_credentials");
    assert_ne!(
        body["error"],
        casedesk::common::messages::lookup("en", "invalid_credentials")
    );
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let fx = Fixture::new().await;
    let app = build_router(fx.state.clone());

    let response = app
        .clone()
        .oneshot(Request::get("/api/cases").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(bearer_request("GET", "/api/auth/me", "nao-e-um-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["code"], "invalid_or_expired_token");
}

#[tokio::test]
async fn me_reports_flags_and_view_mode() {
    let fx = Fixture::new().await;
    let app = build_router(fx.state.clone());
    let token = fx.token_for(&fx.admin).await;

    let response = app
        .clone()
        .oneshot(bearer_request("GET", "/api/auth/me", &token))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["isAuthenticated"], true);
    assert_eq!(body["isAdmin"], true);
    assert_eq!(body["isSuperAdmin"], false);
    assert_eq!(body["viewMode"], "admin");

    let request = Request::get("/api/auth/me")
        .header("authorization", format!("Bearer {token}"))
        .header("x-view-mode", "staff")
        .body(Body::empty())
        .unwrap();
    let body = read_json(app.clone().oneshot(request).await.unwrap()).await;
    assert_eq!(body["viewMode"], "staff");
    assert_eq!(body["isAdmin"], true);

    let request = Request::get("/api/auth/me")
        .header("authorization", format!("Bearer {token}"))
        .header("x-view-mode", "superadmin")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn manager_scenario_over_http() {
    let fx = Fixture::new().await;
    let app = build_router(fx.state.clone());
    let own = fx.open_case(&fx.manager, fx.f1).await;
    let other = fx.open_case(&fx.manager_f2, fx.f2).await;
    let token = fx.token_for(&fx.manager).await;

    let response = app
        .clone()
        .oneshot(bearer_request("GET", &format!("/api/cases/{}", other.id), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(read_json(response).await["code"], "permission_denied");

    let response = app
        .clone()
        .oneshot(bearer_request("GET", &format!("/api/cases/{}", own.id), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["id"], own.id.to_string());

    let response = app
        .oneshot(bearer_request("GET", "/api/cases", &token))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn case_lifecycle_over_http() {
    let fx = Fixture::new().await;
    let app = build_router(fx.state.clone());
    let token = fx.token_for(&fx.staff).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/cases",
            &token,
            serde_json::json!({
                "title": "Luz queimada",
                "description": "Corredor dos fundos",
                "franchiseId": fx.f1,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let case = read_json(response).await;
    assert_eq!(case["status"], "open");
    let id = case["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/cases/{id}/updates"),
            &token,
            serde_json::json!({ "content": "Lâmpada comprada" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let update = read_json(response).await;
    assert_eq!(update["userId"], fx.staff.id.to_string());

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/cases/{id}/files"),
            &token,
            serde_json::json!({ "name": "nota-fiscal.pdf", "type": "application/pdf" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/cases/{id}/status"),
            &token,
            serde_json::json!({ "status": "closed" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/cases/{id}/status"),
            &token,
            serde_json::json!({ "status": "open" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert_eq!(body["code"], "invalid_transition");
    assert_eq!(body["details"]["from"], "closed");
    assert_eq!(body["details"]["to"], "open");

    let response = app
        .oneshot(bearer_request("GET", &format!("/api/cases/{id}"), &token))
        .await
        .unwrap();
    let case = read_json(response).await;
    assert_eq!(case["status"], "closed");
    assert_eq!(case["updates"].as_array().unwrap().len(), 1);
    assert_eq!(case["files"][0]["type"], "application/pdf");
}

#[tokio::test]
async fn incident_location_over_http() {
    let fx = Fixture::new().await;
    let app = build_router(fx.state.clone());
    let case = fx.open_case(&fx.manager, fx.f1).await;
    let token = fx.token_for(&fx.manager).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/floor-plans",
            &token,
            serde_json::json!({
                "name": "Térreo",
                "imageUrl": "https://cdn.exemplo.com/terreo.png",
                "franchiseId": fx.f1,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let plan_id = read_json(response).await["id"].as_str().unwrap().to_string();

    let uri = format!("/api/cases/{}/incident-location", case.id);
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &uri,
            &token,
            serde_json::json!({ "floorPlanId": plan_id, "x": 1.5, "y": 0.5 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(read_json(response).await["code"], "out_of_bounds");

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &uri,
            &token,
            serde_json::json!({ "floorPlanId": plan_id, "x": 0.3, "y": 0.6 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["floorPlanId"], plan_id);
    assert_eq!(body["incidentLocation"]["x"], 0.3);

    let response = app
        .clone()
        .oneshot(bearer_request("DELETE", &uri, &token))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert!(body["incidentLocation"].is_null());
    assert_eq!(body["floorPlanId"], plan_id);

    let response = app
        .oneshot(bearer_request(
            "DELETE",
            &format!("/api/cases/{}/floor-plan", case.id),
            &token,
        ))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert!(body["floorPlanId"].is_null());
}
