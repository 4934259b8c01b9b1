//! End-to-end tests of the settings router over in-memory stores.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use settings_admin::{app, AppState, ElementKind, StaticElementResolver, StaticPermissions};
use std::sync::Arc;
use tower::ServiceExt;

const LIMIT: usize = 1024 * 1024;

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn memory_app() -> Router {
    app(AppState::in_memory(), LIMIT)
}

#[tokio::test]
async fn static_route_round_trip() {
    let app = memory_app();

    let (status, created) = send(
        &app,
        post_json(
            "/settings/staticroutes",
            json!({"xaction": "create", "data": r#"{"name":" news ","pattern":"/^\\/news$/","siteId":"1,2"}"#}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["success"], json!(true));
    assert_eq!(created["data"]["name"], json!("news"));
    assert_eq!(created["data"]["siteId"], json!("1,2"));
    let id = created["data"]["id"].clone();

    let (_, updated) = send(
        &app,
        post_json(
            "/settings/staticroutes",
            json!({"xaction": "update", "data": {"id": id, "controller": "News"}}),
        ),
    )
    .await;
    assert_eq!(updated["data"]["id"], id);
    assert_eq!(updated["data"]["controller"], json!("News"));
    assert_eq!(updated["data"]["name"], json!("news"));

    let (_, listed) = send(&app, get("/settings/staticroutes")).await;
    assert_eq!(listed["total"], json!(1));
    assert_eq!(listed["data"][0]["controller"], json!("News"));

    let (_, destroyed) = send(
        &app,
        post_json("/settings/staticroutes", json!({"xaction": "destroy", "data": {"id": id}})),
    )
    .await;
    assert_eq!(destroyed, json!({"success": true, "data": []}));

    let (_, listed) = send(&app, get("/settings/staticroutes")).await;
    assert_eq!(listed["total"], json!(0));
}

#[tokio::test]
async fn form_encoded_create_is_accepted() {
    let app = memory_app();
    let request = Request::builder()
        .method("POST")
        .uri("/settings/tags?xaction=create")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("data=%7B%22name%22%3A%22ga%22%7D"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], json!("ga"));

    let (_, tree) = send(&app, get("/settings/tags/tree")).await;
    assert_eq!(tree, json!([{"id": "ga", "text": "ga"}]));
}

#[tokio::test]
async fn duplicate_key_answers_rule_violation() {
    let app = memory_app();
    let setting = json!({"xaction": "create", "data": {"name": "title", "language": "en", "type": "text", "data": "Hi"}});
    let (_, first) = send(&app, post_json("/settings/website-settings", setting.clone())).await;
    assert_eq!(first["success"], json!(true));

    let (status, second) = send(&app, post_json("/settings/website-settings", setting)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second, json!({"success": false, "message": "rule_violation"}));

    let other_language = json!({"xaction": "create", "data": {"name": "title", "language": "de"}});
    let (_, third) = send(&app, post_json("/settings/website-settings", other_language)).await;
    assert_eq!(third["success"], json!(true));
}

#[tokio::test]
async fn renaming_onto_an_existing_name_is_refused() {
    let app = memory_app();
    let mut ids = Vec::new();
    for name in ["a", "b"] {
        let (_, created) = send(
            &app,
            post_json("/settings/staticroutes", json!({"xaction": "create", "data": {"name": name}})),
        )
        .await;
        ids.push(created["data"]["id"].clone());
    }

    let (status, clash) = send(
        &app,
        post_json("/settings/staticroutes", json!({"xaction": "update", "data": {"id": ids[1], "name": "a"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(clash, json!({"success": false, "message": "rule_violation"}));

    let (_, listed) = send(&app, get("/settings/staticroutes?sort=name")).await;
    let names: Vec<&str> = listed["data"].as_array().unwrap().iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(listed["data"][1]["id"], ids[1]);
}

#[tokio::test]
async fn glossary_links_are_stored_as_document_ids() {
    let elements = StaticElementResolver::new().with(ElementKind::Document, 42, "/about");
    let state = AppState::in_memory().with_elements(Arc::new(elements));
    let app = app(state.clone(), LIMIT);

    let (_, created) = send(
        &app,
        post_json("/settings/glossary", json!({"xaction": "create", "data": {"text": "About", "link": "/about"}})),
    )
    .await;
    assert_eq!(created["data"]["link"], json!("/about"));

    let stored = state.store::<settings_admin::entities::Glossary>().load_all().await.unwrap();
    assert_eq!(stored[0].link, "42");
}

#[tokio::test]
async fn list_filters_sorts_and_pages() {
    let app = memory_app();
    for name in ["alpha", "beta", "gamma", "delta", "alphabet"] {
        send(
            &app,
            post_json("/settings/thumbnails", json!({"xaction": "create", "data": {"name": name}})),
        )
        .await;
    }

    // sort=[{"property":"name","direction":"DESC"}]
    let uri = "/settings/thumbnails?start=1&limit=2&sort=%5B%7B%22property%22%3A%22name%22%2C%22direction%22%3A%22DESC%22%7D%5D";
    let (_, page) = send(&app, get(uri)).await;
    assert_eq!(page["total"], json!(5));
    let names: Vec<&str> = page["data"].as_array().unwrap().iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["delta", "beta"]);

    let (_, filtered) = send(&app, get("/settings/thumbnails?filter=alpha")).await;
    assert_eq!(filtered["total"], json!(2));
}

#[tokio::test]
async fn logical_failures_keep_http_ok() {
    let app = memory_app();

    let (status, missing) = send(
        &app,
        post_json("/settings/glossary", json!({"xaction": "update", "data": {"id": 404, "text": "x"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(missing["success"], json!(false));

    let (status, malformed) = send(
        &app,
        post_json("/settings/glossary", json!({"xaction": "create", "data": "{not json"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(malformed["success"], json!(false));

    let (_, bad_pattern) = send(
        &app,
        post_json("/settings/staticroutes", json!({"xaction": "create", "data": {"name": "x", "pattern": "/(/"}})),
    )
    .await;
    assert_eq!(bad_pattern["success"], json!(false));
}

#[tokio::test]
async fn missing_permission_is_forbidden() {
    let permissions = StaticPermissions::new().grant("editor", "glossary");
    let app = app(AppState::in_memory().with_permissions(Arc::new(permissions)), LIMIT);

    let mut request = post_json("/settings/staticroutes", json!({"xaction": "create", "data": {"name": "x"}}));
    request.headers_mut().insert("x-admin-user", "editor".parse().unwrap());
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], json!(false));

    let mut allowed = post_json("/settings/glossary", json!({"xaction": "create", "data": {"text": "x"}}));
    allowed.headers_mut().insert("x-admin-user", "editor".parse().unwrap());
    let (status, _) = send(&app, allowed).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn listing_is_open_but_writing_needs_the_grant() {
    let permissions = StaticPermissions::new().grant("editor", "glossary");
    let app = app(AppState::in_memory().with_permissions(Arc::new(permissions)), LIMIT);

    let mut list = get("/settings/staticroutes");
    list.headers_mut().insert("x-admin-user", "viewer".parse().unwrap());
    let (status, listed) = send(&app, list).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["success"], json!(true));
    assert_eq!(listed["total"], json!(0));

    let mut create = post_json("/settings/staticroutes", json!({"xaction": "create", "data": {"name": "x"}}));
    create.headers_mut().insert("x-admin-user", "viewer".parse().unwrap());
    let (status, _) = send(&app, create).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn thumbnail_views() {
    let app = memory_app();
    for data in [
        json!({"name": "plain", "downloadable": true}),
        json!({"name": "teaser", "group": "web"}),
    ] {
        send(&app, post_json("/settings/thumbnails", json!({"xaction": "create", "data": data}))).await;
    }

    let (_, tree) = send(&app, get("/settings/thumbnails/tree")).await;
    assert_eq!(tree[0]["id"], json!("plain"));
    assert_eq!(tree[1]["id"], json!("group_teaser"));
    assert_eq!(tree[1]["children"][0]["text"], json!("teaser"));

    let (_, downloadable) = send(&app, get("/settings/thumbnails/downloadable")).await;
    assert_eq!(downloadable, json!([{"id": "plain", "text": "plain"}]));
}

#[tokio::test]
async fn video_thumbnails_have_their_own_list_and_tree() {
    let app = memory_app();
    for data in [
        json!({"name": "preview", "group": "web", "videoBitrate": "600"}),
        json!({"name": "master"}),
    ] {
        let (_, created) = send(
            &app,
            post_json("/settings/video-thumbnails", json!({"xaction": "create", "data": data})),
        )
        .await;
        assert_eq!(created["success"], json!(true));
    }

    let (_, listed) = send(&app, get("/settings/video-thumbnails?filter=preview")).await;
    assert_eq!(listed["total"], json!(1));
    assert_eq!(listed["data"][0]["videoBitrate"], json!(600));

    let (_, duplicate) = send(
        &app,
        post_json("/settings/video-thumbnails", json!({"xaction": "create", "data": {"name": "master"}})),
    )
    .await;
    assert_eq!(duplicate["message"], json!("rule_violation"));

    let (_, tree) = send(&app, get("/settings/video-thumbnails/tree")).await;
    assert_eq!(tree[0]["id"], json!("master"));
    assert_eq!(tree[1]["id"], json!("group_preview"));

    let (_, images) = send(&app, get("/settings/thumbnails")).await;
    assert_eq!(images["total"], json!(0));
}

#[tokio::test]
async fn video_thumbnail_tree_needs_the_thumbnails_grant() {
    let permissions = StaticPermissions::new().grant("editor", "glossary");
    let app = app(AppState::in_memory().with_permissions(Arc::new(permissions)), LIMIT);
    let mut request = get("/settings/video-thumbnails/tree");
    request.headers_mut().insert("x-admin-user", "editor".parse().unwrap());
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn predefined_metadata_by_type() {
    let app = memory_app();
    for data in [
        json!({"name": "alt", "type": "input", "targetSubtype": "image"}),
        json!({"name": "copyright", "type": "input"}),
        json!({"name": "author", "type": "textarea"}),
    ] {
        send(&app, post_json("/settings/metadata", json!({"xaction": "create", "data": data}))).await;
    }

    let (_, body) = send(&app, get("/settings/predefined-metadata?type=input&subType=video")).await;
    assert_eq!(body["success"], json!(true));
    let names: Vec<&str> = body["data"].as_array().unwrap().iter().map(|m| m["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["copyright"]);
}

#[tokio::test]
async fn drafts_save_load_discard() {
    let app = memory_app();

    send(
        &app,
        post_json("/drafts/thumbnail/7", json!({"data": {"name": "hero", "quality": 80}})),
    )
    .await;
    let (_, merged) = send(
        &app,
        post_json("/drafts/thumbnail/7", json!({"data": "{\"quality\":90}", "useForSave": true})),
    )
    .await;
    assert_eq!(merged["data"], json!({"name": "hero", "quality": 90}));

    let (_, loaded) = send(&app, get("/drafts/thumbnail/7")).await;
    assert_eq!(loaded["data"]["quality"], json!(90));

    let delete = Request::builder()
        .method("DELETE")
        .uri("/drafts/thumbnail/7")
        .body(Body::empty())
        .unwrap();
    let (_, discarded) = send(&app, delete).await;
    assert_eq!(discarded["success"], json!(true));

    let (status, gone) = send(&app, get("/drafts/thumbnail/7")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(gone["success"], json!(false));

    let (_, unknown) = send(&app, get("/drafts/nope/1")).await;
    assert_eq!(unknown["success"], json!(false));
}

#[tokio::test]
async fn element_editors_keep_drafts_too() {
    let app = memory_app();
    let (status, saved) = send(&app, post_json("/drafts/document/5", json!({"data": {"title": "x"}}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["success"], json!(true));
    assert_eq!(saved["data"], json!({"title": "x"}));

    let (_, loaded) = send(&app, get("/drafts/document/5")).await;
    assert_eq!(loaded["data"]["title"], json!("x"));

    for kind in ["asset", "object"] {
        let (_, body) = send(&app, post_json(&format!("/drafts/{}/1", kind), json!({"data": {"key": kind}}))).await;
        assert_eq!(body["success"], json!(true));
    }

    let (_, folder) = send(&app, post_json("/drafts/folder/5", json!({"data": {"title": "x"}}))).await;
    assert_eq!(folder["success"], json!(false));
}

#[tokio::test]
async fn document_drafts_need_the_documents_grant() {
    let permissions = StaticPermissions::new().grant("editor", "documents");
    let app = app(AppState::in_memory().with_permissions(Arc::new(permissions)), LIMIT);

    let mut allowed = post_json("/drafts/document/5", json!({"data": {"title": "x"}}));
    allowed.headers_mut().insert("x-admin-user", "editor".parse().unwrap());
    let (status, _) = send(&app, allowed).await;
    assert_eq!(status, StatusCode::OK);

    let mut denied = post_json("/drafts/asset/5", json!({"data": {"title": "x"}}));
    denied.headers_mut().insert("x-admin-user", "editor".parse().unwrap());
    let (status, _) = send(&app, denied).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn service_endpoints() {
    let app = memory_app();
    let (status, health) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], json!("ok"));

    let (status, ready) = send(&app, get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ready["store"], json!("ok"));

    assert!(ready.get("failing").is_none());

    let (_, version) = send(&app, get("/version")).await;
    assert_eq!(version["name"], json!("settings-admin"));
    assert!(version["kinds"].as_array().unwrap().contains(&json!("videothumbnail")));
}
