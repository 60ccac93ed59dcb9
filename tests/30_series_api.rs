mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn series_writes_require_token() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };

    let res = reqwest::Client::new()
        .post(format!("{}/api/series", server.base_url))
        .json(&json!({ "name": "Temp", "min_value": -10, "max_value": 50 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = reqwest::Client::new()
        .post(format!("{}/api/series", server.base_url))
        .bearer_auth("garbage")
        .json(&json!({ "name": "Temp", "min_value": -10, "max_value": 50 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn series_crud_and_cascade() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let token = common::login_new_user(server).await?;
    let client = reqwest::Client::new();
    let id = common::create_series(server, &token, 0.0, 100.0).await?;

    let listed: Value = client
        .get(format!("{}/api/series", server.base_url))
        .send()
        .await?
        .json()
        .await?;
    let ours = listed
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["id"] == id)
        .cloned()
        .expect("created series is listed");
    assert_eq!(ours["color"], "#000000");

    let res = client
        .put(format!("{}/api/series/{}", server.base_url, id))
        .bearer_auth(&token)
        .json(&json!({ "name": common::unique("renamed"), "min_value": 0, "max_value": 10, "color": "#00ff00" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["color"], "#00ff00");

    let res = client
        .post(format!("{}/api/measurements", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "value": 5, "series_id": id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .delete(format!("{}/api/series/{}", server.base_url, id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["deleted"]["id"], id);

    let rows: Value = client
        .get(format!("{}/api/measurements?series_id={}", server.base_url, id))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(rows, json!([]));

    let res = client
        .delete(format!("{}/api/series/{}", server.base_url, id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
