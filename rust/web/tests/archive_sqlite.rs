/// Finished hands written to a SQLite file survive a restart of the service.
use holdem_web::config::AppConfig;
use holdem_web::server::{AppContext, WebServer};
use serde_json::{json, Value};
use std::path::Path;
use warp::http::StatusCode;

fn context_for(path: &Path) -> AppContext {
    let mut config = AppConfig::default();
    config.server.port = 0;
    config.table.seed = Some(7);
    config.archive.database = Some(path.to_path_buf());
    AppContext::new(config).expect("open sqlite archive")
}

async fn play_fold(context: &AppContext) -> String {
    let routes = WebServer::routes(context);
    let created = warp::test::request()
        .method("POST")
        .path("/api/hands/create")
        .json(&json!({ "stack_size": 800, "player_count": 3 }))
        .reply(&routes)
        .await;
    assert_eq!(created.status(), StatusCode::OK);
    let state: Value = serde_json::from_slice(created.body()).unwrap();
    let id = state["hand_id"].as_str().unwrap().to_string();

    let mut actor = state["active_player_id"].as_str().map(str::to_string);
    while let Some(player) = actor {
        let response = warp::test::request()
            .method("POST")
            .path("/api/hands/action")
            .json(&json!({ "hand_id": id, "player_id": player, "action_type": "fold" }))
            .reply(&routes)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let next: Value = serde_json::from_slice(response.body()).unwrap();
        actor = next["active_player_id"].as_str().map(str::to_string);
    }
    id
}

#[tokio::test]
async fn archived_hands_are_read_back_after_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archive").join("hands.sqlite");

    let first = context_for(&path);
    let ids = vec![play_fold(&first).await, play_fold(&first).await];
    assert_eq!(first.archiver().pending_count(), 0);
    let original = first.service().archived_hand(&ids[0]).unwrap();
    drop(first);

    let reopened = context_for(&path);
    let routes = WebServer::routes(&reopened);

    let response = warp::test::request()
        .method("GET")
        .path("/api/hands")
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let listed: Value = serde_json::from_slice(response.body()).unwrap();
    let listed_ids: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|h| h["id"].as_str())
        .collect();
    assert_eq!(listed_ids, vec![ids[1].as_str(), ids[0].as_str()]);

    let response = warp::test::request()
        .method("GET")
        .path(&format!("/api/hands/{}", ids[0]))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(fetched, serde_json::to_value(&original).unwrap());
    assert_eq!(fetched["game_state"]["hand_id"], ids[0].as_str());

    // Live hands do not outlive the process; only the archive does.
    let response = warp::test::request()
        .method("GET")
        .path(&format!("/api/hands/{}/state", ids[0]))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
