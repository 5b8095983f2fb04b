use anyhow::Result;
use colored::*;
use reqwest::StatusCode;
use serde_json::json;
use std::time::{Duration, Instant};

use crate::api_client::ApiClient;
use crate::guest_client::Connection;
use crate::output::{print_notification, TestResult};

const WAIT: Duration = Duration::from_secs(5);

/// Connects a guest and checks that the server reports it as connected.
pub async fn test_connection(
    base_url: &str,
    guest_id: &str,
    api_client: &ApiClient,
) -> Result<TestResult> {
    let start = Instant::now();

    println!("\n{}", "=== TEST: Connection ===".bright_cyan().bold());

    println!("{} Connecting guest {}...", "→".blue(), guest_id);
    let _connection = Connection::establish(base_url, guest_id, "Guest".to_string()).await?;
    println!("{} WebSocket established", "✓".green());

    match api_client.wait_until_connected(guest_id, WAIT).await {
        Ok(()) => {
            println!("{} Server reports guest connected", "✓".green());
            Ok(TestResult::pass("connection", start.elapsed()))
        }
        Err(e) => {
            println!("{} {}", "✗".red(), e);
            Ok(TestResult::fail("connection", e.to_string(), start.elapsed()))
        }
    }
}

/// Sends a message over HTTP and waits for it on the guest's socket.
pub async fn test_message_round_trip(
    base_url: &str,
    guest_id: &str,
    api_client: &ApiClient,
) -> Result<TestResult> {
    let start = Instant::now();

    println!("\n{}", "=== TEST: Message Round Trip ===".bright_cyan().bold());

    let mut connection = Connection::establish(base_url, guest_id, "Guest".to_string()).await?;
    api_client.wait_until_connected(guest_id, WAIT).await?;
    println!("{} WebSocket established", "✓".green());

    let content = json!({"nric": "1234", "name": "Jim Bob"});
    println!("{} Sending message to guest...", "→".blue());
    let status = api_client
        .send_message(guest_id, "Round trip", content.clone())
        .await?;
    if !status.is_success() {
        println!("{} Delivery failed: {}", "✗".red(), status);
        return Ok(TestResult::fail(
            "message_round_trip",
            format!("Delivery returned {}", status),
            start.elapsed(),
        ));
    }
    println!("{} Server confirmed delivery", "✓".green());

    match connection.wait_for_notification("Round trip", WAIT).await {
        Ok(notification) if notification.content == content => {
            print_notification(&connection.guest_label, &notification);
            println!("{} Notification content verified", "✓".green());
            Ok(TestResult::pass("message_round_trip", start.elapsed()))
        }
        Ok(notification) => {
            println!("{} Notification content mismatch!", "✗".red());
            Ok(TestResult::fail(
                "message_round_trip",
                format!("Expected {}, got {}", content, notification.content),
                start.elapsed(),
            ))
        }
        Err(e) => {
            println!("{} {}", "✗".red(), e);
            Ok(TestResult::fail(
                "message_round_trip",
                e.to_string(),
                start.elapsed(),
            ))
        }
    }
}

/// Checks a guest in and waits for the resulting notification.
pub async fn test_check_in(
    base_url: &str,
    guest_id: &str,
    api_client: &ApiClient,
) -> Result<TestResult> {
    let start = Instant::now();

    println!("\n{}", "=== TEST: Check In ===".bright_cyan().bold());

    let mut connection = Connection::establish(base_url, guest_id, "Guest".to_string()).await?;
    api_client.wait_until_connected(guest_id, WAIT).await?;
    println!("{} WebSocket established", "✓".green());

    println!("{} Checking guest in...", "→".blue());
    api_client
        .check_in(guest_id, json!({"name": "Jim Bob", "room": "101"}))
        .await?;
    println!("{} Check in accepted", "✓".green());

    match connection.wait_for_notification("Check in", WAIT).await {
        Ok(notification) => {
            print_notification(&connection.guest_label, &notification);
            if notification.content["name"] == "Jim Bob" {
                println!("{} Notification content verified", "✓".green());
                Ok(TestResult::pass("check_in", start.elapsed()))
            } else {
                println!("{} Notification content mismatch!", "✗".red());
                Ok(TestResult::fail(
                    "check_in",
                    format!("Unexpected content {}", notification.content),
                    start.elapsed(),
                ))
            }
        }
        Err(e) => {
            println!("{} {}", "✗".red(), e);
            Ok(TestResult::fail("check_in", e.to_string(), start.elapsed()))
        }
    }
}

/// Reconnects a guest and checks that only the newest socket receives.
pub async fn test_reconnect(
    base_url: &str,
    guest_id: &str,
    api_client: &ApiClient,
) -> Result<TestResult> {
    let start = Instant::now();

    println!("\n{}", "=== TEST: Reconnect ===".bright_cyan().bold());

    let mut old = Connection::establish(base_url, guest_id, "Old socket".to_string()).await?;
    println!("{} First WebSocket established", "✓".green());
    api_client.wait_until_connected(guest_id, WAIT).await?;
    let mut new = Connection::establish(base_url, guest_id, "New socket".to_string()).await?;
    println!("{} Second WebSocket established", "✓".green());

    println!("{} Waiting for the old socket to be closed...", "→".blue());
    if let Err(e) = old.wait_for_close(WAIT).await {
        println!("{} {}", "✗".red(), e);
        return Ok(TestResult::fail("reconnect", e.to_string(), start.elapsed()));
    }
    println!("{} Old socket closed by server", "✓".green());

    api_client
        .send_message(guest_id, "After reconnect", json!("newest"))
        .await?;

    match new.wait_for_notification("After reconnect", WAIT).await {
        Ok(notification) => {
            print_notification(&new.guest_label, &notification);
            Ok(TestResult::pass("reconnect", start.elapsed()))
        }
        Err(e) => {
            println!("{} {}", "✗".red(), e);
            Ok(TestResult::fail("reconnect", e.to_string(), start.elapsed()))
        }
    }
}

/// Closes a guest's connection over HTTP and checks that later sends fail.
pub async fn test_close(
    base_url: &str,
    guest_id: &str,
    api_client: &ApiClient,
) -> Result<TestResult> {
    let start = Instant::now();

    println!("\n{}", "=== TEST: Close ===".bright_cyan().bold());

    let mut connection = Connection::establish(base_url, guest_id, "Guest".to_string()).await?;
    api_client.wait_until_connected(guest_id, WAIT).await?;
    println!("{} WebSocket established", "✓".green());

    println!("{} Closing connection from the server...", "→".blue());
    let status = api_client.close_connection(guest_id).await?;
    if status != StatusCode::NO_CONTENT {
        println!("{} Close returned {}", "✗".red(), status);
        return Ok(TestResult::fail(
            "close",
            format!("Expected 204, got {}", status),
            start.elapsed(),
        ));
    }

    if let Err(e) = connection.wait_for_close(WAIT).await {
        println!("{} {}", "✗".red(), e);
        return Ok(TestResult::fail("close", e.to_string(), start.elapsed()));
    }
    println!("{} Guest received close frame", "✓".green());

    let status = api_client
        .send_message(guest_id, "Too late", json!(null))
        .await?;
    if status == StatusCode::NOT_FOUND {
        println!("{} Send after close rejected", "✓".green());
        Ok(TestResult::pass("close", start.elapsed()))
    } else {
        println!("{} Send after close returned {}", "✗".red(), status);
        Ok(TestResult::fail(
            "close",
            format!("Expected 404, got {}", status),
            start.elapsed(),
        ))
    }
}
