use std::io::Write;

use axum::body::Body;
use axum::http::Request;
use frag_blob::StoreConfig;
use frag_server::{build, ServerConfig};
use http_body_util::BodyExt;
use tower::ServiceExt;

fn config(htpasswd_file: std::path::PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        api_url: None,
        htpasswd_file,
        store: StoreConfig::Memory,
        max_body_bytes: 1024,
    }
}

#[tokio::test]
async fn builds_a_serving_app_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".htpasswd");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "user1@email.com:{}", bcrypt::hash("password1", 4).unwrap()).unwrap();

    let ax = build(&config(path)).await.unwrap();
    let res = ax
        .router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    let body = res.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_htpasswd_file_fails_startup() {
    let dir = tempfile::tempdir().unwrap();
    assert!(build(&config(dir.path().join("absent"))).await.is_err());
}
