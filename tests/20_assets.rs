mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn asset_crud_round_trip() -> Result<()> {
    if !common::database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let tag = common::unique();

    let department = common::create_department(&server.base_url, &format!("Dept {}", tag)).await?;
    let category = common::create_category(&server.base_url, &format!("Cat {}", tag)).await?;
    let holder =
        common::create_employee(&server.base_url, &format!("holder{}", tag), department).await?;

    let asset = common::create_asset(
        &server.base_url,
        &json!({
            "name": format!("MacBook {}", tag),
            "serial_number": format!("SN-{}", tag),
            "category": category,
            "assigned_to": holder,
            "purchase_date": "2024-03-01",
            "status": "IN_USE",
            "description": "Dev laptop",
            "notes": "Initial allocation"
        }),
    )
    .await?;

    let id = asset.get("id").and_then(Value::as_i64).unwrap();
    assert_eq!(asset["category"]["name"], format!("Cat {}", tag));
    assert_eq!(asset["assigned_to"]["name"], "Test Holder");
    assert_eq!(asset["status"], "IN_USE");

    // Read it back
    let res = client
        .get(format!("{}/api/assets/{}", server.base_url, id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["serial_number"], format!("SN-{}", tag));

    // Patch a plain field
    let res = client
        .patch(format!("{}/api/assets/{}", server.base_url, id))
        .json(&json!({ "description": "Returned for repair", "status": "REPAIR" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["description"], "Returned for repair");
    assert_eq!(body["data"]["status"], "REPAIR");
    // Holder untouched by a field-only patch
    assert_eq!(body["data"]["assigned_to"]["id"], json!(holder));

    // Delete, then it is gone
    let res = client
        .delete(format!("{}/api/assets/{}", server.base_url, id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(format!("{}/api/assets/{}", server.base_url, id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn holder_change_appends_history_and_plain_updates_do_not() -> Result<()> {
    if !common::database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let tag = common::unique();

    let department = common::create_department(&server.base_url, &format!("Dept {}", tag)).await?;
    let holder =
        common::create_employee(&server.base_url, &format!("holder{}", tag), department).await?;

    // Registered unassigned: no history yet
    let asset = common::create_asset(
        &server.base_url,
        &json!({
            "name": format!("Monitor {}", tag),
            "serial_number": format!("SN-{}", tag),
            "purchase_date": "2024-01-15"
        }),
    )
    .await?;
    let id = asset.get("id").and_then(Value::as_i64).unwrap();

    let history_url = format!("{}/api/assets/{}/history", server.base_url, id);
    let body = client.get(&history_url).send().await?.json::<Value>().await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));

    // Assigning appends exactly one entry
    let res = client
        .patch(format!("{}/api/assets/{}", server.base_url, id))
        .json(&json!({ "assigned_to": holder }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = client.get(&history_url).send().await?.json::<Value>().await?;
    let entries = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(entries.len(), 1, "expected one history entry: {}", body);
    assert_eq!(entries[0]["previous_user"], "Unassigned");
    assert_eq!(entries[0]["new_user"], "Test Holder");

    // A status-only patch leaves the ledger alone
    let res = client
        .patch(format!("{}/api/assets/{}", server.base_url, id))
        .json(&json!({ "status": "REPAIR" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = client.get(&history_url).send().await?.json::<Value>().await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    // Re-sending the same holder is a no-op as well
    let res = client
        .patch(format!("{}/api/assets/{}", server.base_url, id))
        .json(&json!({ "assigned_to": holder }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = client.get(&history_url).send().await?.json::<Value>().await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    // Explicit unassignment appends with the holder side empty
    let res = client
        .patch(format!("{}/api/assets/{}", server.base_url, id))
        .json(&json!({ "assigned_to": null }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = client.get(&history_url).send().await?.json::<Value>().await?;
    let entries = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(entries.len(), 2);
    let newest = entries
        .iter()
        .max_by_key(|e| e["id"].as_i64().unwrap_or(0))
        .cloned()
        .unwrap();
    assert_eq!(newest["previous_user"], "Test Holder");
    assert_eq!(newest["new_user"], "Unassigned");

    Ok(())
}

#[tokio::test]
async fn duplicate_serial_is_a_conflict() -> Result<()> {
    if !common::database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let tag = common::unique();
    let serial = format!("SN-{}", tag);

    common::create_asset(
        &server.base_url,
        &json!({
            "name": "First",
            "serial_number": serial,
            "purchase_date": "2024-01-01"
        }),
    )
    .await?;

    let res = client
        .post(format!("{}/api/assets", server.base_url))
        .json(&json!({
            "name": "Second",
            "serial_number": serial,
            "purchase_date": "2024-01-02"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(body["error"], json!(true));

    Ok(())
}

#[tokio::test]
async fn serial_number_is_immutable() -> Result<()> {
    if !common::database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let tag = common::unique();

    let asset = common::create_asset(
        &server.base_url,
        &json!({
            "name": "Locked",
            "serial_number": format!("SN-{}", tag),
            "purchase_date": "2024-01-01"
        }),
    )
    .await?;
    let id = asset.get("id").and_then(Value::as_i64).unwrap();

    let res = client
        .patch(format!("{}/api/assets/{}", server.base_url, id))
        .json(&json!({ "serial_number": "SN-REWRITTEN" }))
        .send()
        .await?;
    assert!(
        res.status().is_client_error(),
        "expected 4xx for a serial_number patch, got {}",
        res.status()
    );

    // Serial unchanged
    let body = client
        .get(format!("{}/api/assets/{}", server.base_url, id))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(body["data"]["serial_number"], format!("SN-{}", tag));

    Ok(())
}

#[tokio::test]
async fn list_filters_by_status_and_search() -> Result<()> {
    if !common::database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let tag = common::unique();

    common::create_asset(
        &server.base_url,
        &json!({
            "name": format!("Stored item {}", tag),
            "serial_number": format!("SN-A{}", tag),
            "purchase_date": "2024-02-01",
            "status": "IN_STORAGE"
        }),
    )
    .await?;
    common::create_asset(
        &server.base_url,
        &json!({
            "name": format!("Retired item {}", tag),
            "serial_number": format!("SN-B{}", tag),
            "purchase_date": "2024-02-02",
            "status": "RETIRED"
        }),
    )
    .await?;

    let res = client
        .get(format!(
            "{}/api/assets?status=IN_STORAGE&search={}",
            server.base_url, tag
        ))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    let rows = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(rows.len(), 1, "expected one filtered row: {}", body);
    assert_eq!(rows[0]["status"], "IN_STORAGE");

    // Unknown status values are rejected, not ignored
    let res = client
        .get(format!("{}/api/assets?status=BROKEN", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn cached_list_reflects_writes() -> Result<()> {
    if !common::database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let tag = common::unique();
    let url = format!("{}/api/assets?search={}", server.base_url, tag);

    // Prime the cache with an empty result for this query
    let body = client.get(&url).send().await?.json::<Value>().await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));

    common::create_asset(
        &server.base_url,
        &json!({
            "name": format!("Fresh {}", tag),
            "serial_number": format!("SN-{}", tag),
            "purchase_date": "2024-06-01"
        }),
    )
    .await?;

    // The write must have purged the cached empty list
    let body = client.get(&url).send().await?.json::<Value>().await?;
    let rows = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(rows.len(), 1, "stale cached list served: {}", body);
    assert_eq!(rows[0]["name"], format!("Fresh {}", tag));

    Ok(())
}

#[tokio::test]
async fn deleting_an_asset_removes_its_ledger_entries() -> Result<()> {
    if !common::database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let tag = common::unique();

    let department = common::create_department(&server.base_url, &format!("Dept {}", tag)).await?;
    let first =
        common::create_employee(&server.base_url, &format!("first{}", tag), department).await?;
    let second =
        common::create_employee(&server.base_url, &format!("second{}", tag), department).await?;

    // Two reassignments leave two ledger entries behind
    let name = format!("CascadeRig{}", tag);
    let asset = common::create_asset(
        &server.base_url,
        &json!({
            "name": name,
            "serial_number": format!("SN-{}", tag),
            "purchase_date": "2024-04-01",
            "assigned_to": first
        }),
    )
    .await?;
    let id = asset.get("id").and_then(Value::as_i64).unwrap();

    let res = client
        .patch(format!("{}/api/assets/{}", server.base_url, id))
        .json(&json!({ "assigned_to": second }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let feed_url = format!("{}/api/assets-history?search={}", server.base_url, name);
    let body = client.get(&feed_url).send().await?.json::<Value>().await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2), "{}", body);

    let res = client
        .delete(format!("{}/api/assets/{}", server.base_url, id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    // The cascade removed the ledger entries, so the re-read feed is empty.
    let body = client.get(&feed_url).send().await?.json::<Value>().await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0), "{}", body);

    let res = client
        .get(format!("{}/api/assets/{}/history", server.base_url, id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn missing_references_are_404s() -> Result<()> {
    if !common::database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let tag = common::unique();

    // Unknown asset id
    let res = client
        .get(format!("{}/api/assets/999999999", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Unknown category on registration
    let res = client
        .post(format!("{}/api/assets", server.base_url))
        .json(&json!({
            "name": "Ghost",
            "serial_number": format!("SN-{}", tag),
            "purchase_date": "2024-01-01",
            "category": 999999999
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Category does not exist");

    // Unknown holder on registration
    let res = client
        .post(format!("{}/api/assets", server.base_url))
        .json(&json!({
            "name": "Ghost",
            "serial_number": format!("SN-{}", tag),
            "purchase_date": "2024-01-01",
            "assigned_to": 999999999
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Assigned user does not exist");

    Ok(())
}
