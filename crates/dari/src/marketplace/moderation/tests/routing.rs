use super::common::*;
use axum::http::{header, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::marketplace::accounts::TrustLevel;
use crate::marketplace::listings::PropertyStatus;

#[tokio::test]
async fn report_route_creates_report() {
    let harness = harness();
    let scene = scene(&harness, PropertyStatus::Active);

    let response = router(&harness)
        .oneshot(json_request(
            "POST",
            "/api/v1/reports",
            Some(scene.reporter.0.as_str()),
            Some(json!({
                "property_id": scene.property.0,
                "reason": "SCAM_FRAUD",
                "comments": "asks for advance payment"
            })),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], "new");
    assert_eq!(payload["reason"], "SCAM_FRAUD");
}

#[tokio::test]
async fn admin_routes_reject_regular_users() {
    let harness = harness();
    let scene = scene(&harness, PropertyStatus::Active);

    let response = router(&harness)
        .oneshot(json_request(
            "GET",
            "/api/v1/admin/reports",
            Some(scene.reporter.0.as_str()),
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = router(&harness)
        .oneshot(json_request("GET", "/api/v1/admin/stats", None, None))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn resolve_route_applies_whole_decision() {
    let harness = harness();
    let scene = scene(&harness, PropertyStatus::Active);
    let report = service(&harness)
        .submit_report(
            &scene.reporter,
            crate::marketplace::moderation::ReportSubmission {
                property_id: scene.property.clone(),
                reason: crate::marketplace::moderation::ReportReason::ScamFraud,
                comments: String::new(),
            },
        )
        .expect("report filed");

    let response = router(&harness)
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/admin/reports/{}/resolve", report.id),
            Some(scene.admin.0.as_str()),
            Some(json!({ "decision": "delete", "notes": "fraudulent listing" })),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["report"]["status"], "resolved");
    assert_eq!(payload["property"]["status"], "deleted");
    assert_eq!(payload["property"]["deletion_reason"], "fraudulent listing");
    assert_eq!(payload["owner_trust"], "untrusted");
    assert_eq!(harness.trust_of(&scene.owner), TrustLevel::Untrusted);
}

#[tokio::test]
async fn appeal_cooldown_maps_to_too_many_requests() {
    let harness = harness();
    let scene = scene(&harness, PropertyStatus::Archived);
    let body = json!({
        "property_id": scene.property.0,
        "message": "Please take another look"
    });

    let response = router(&harness)
        .oneshot(json_request(
            "POST",
            "/api/v1/appeals",
            Some(scene.owner.0.as_str()),
            Some(body.clone()),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let appeal = read_json_body(response).await;

    let response = router(&harness)
        .oneshot(json_request(
            "POST",
            &format!(
                "/api/v1/admin/appeals/{}/resolve",
                appeal["id"].as_str().expect("appeal id")
            ),
            Some(scene.admin.0.as_str()),
            Some(json!({ "decision": "archive" })),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router(&harness)
        .oneshot(json_request(
            "POST",
            "/api/v1/appeals",
            Some(scene.owner.0.as_str()),
            Some(body),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn trust_route_sets_level() {
    let harness = harness();
    let scene = scene(&harness, PropertyStatus::Active);

    let response = router(&harness)
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/admin/users/{}/trust", scene.owner),
            Some(scene.admin.0.as_str()),
            Some(json!({ "trust_level": "blacklisted" })),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(harness.trust_of(&scene.owner), TrustLevel::Blacklisted);
}

#[tokio::test]
async fn admin_listing_route_requires_reason() {
    let harness = harness();
    let scene = scene(&harness, PropertyStatus::Active);

    let response = router(&harness)
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/admin/listings/{}/status", scene.property),
            Some(scene.admin.0.as_str()),
            Some(json!({ "action": "delete", "reason": "" })),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn export_route_serves_csv() {
    let harness = harness();
    let scene = scene(&harness, PropertyStatus::Active);

    let response = router(&harness)
        .oneshot(json_request(
            "GET",
            "/api/v1/admin/exports/reports?status=new",
            Some(scene.admin.0.as_str()),
            None,
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("text/csv; charset=utf-8")
    );
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    assert!(body.starts_with(b"Report,Listing,Reporter"));
}

#[tokio::test]
async fn queue_routes_filter_by_status() {
    let harness = harness();
    let scene = scene(&harness, PropertyStatus::Active);
    let moderation = service(&harness);
    let open = moderation
        .submit_report(
            &scene.reporter,
            crate::marketplace::moderation::ReportSubmission {
                property_id: scene.property.clone(),
                reason: crate::marketplace::moderation::ReportReason::WrongInformation,
                comments: "price is per month, not total".to_string(),
            },
        )
        .expect("report filed");
    moderation
        .start_report_review(&scene.admin, &open.id)
        .expect("under review");

    let admin = Some(scene.admin.0.as_str());
    let response = router(&harness)
        .oneshot(json_request("GET", "/api/v1/admin/reports?status=new", admin, None))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json_body(response).await, json!([]));

    let response = router(&harness)
        .oneshot(json_request(
            "GET",
            "/api/v1/admin/reports?status=under_review",
            admin,
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(1));
    assert_eq!(payload[0]["id"], open.id.0.as_str());

    for uri in [
        "/api/v1/admin/reports",
        "/api/v1/admin/appeals?status=new",
        "/api/v1/admin/issues?status=in_progress",
    ] {
        let response = router(&harness)
            .oneshot(json_request("GET", uri, admin, None))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }

    let response = router(&harness)
        .oneshot(json_request(
            "GET",
            "/api/v1/admin/reports?status=bogus",
            admin,
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
