//! API integration tests
//!
//! These expect a running server started with a bootstrap staff account:
//! `LIBRARY__AUTH__BOOTSTRAP_ADMIN_USERNAME=admin` and
//! `LIBRARY__AUTH__BOOTSTRAP_ADMIN_PASSWORD=change-me-now`.

use chrono::{Duration, Local};
use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an authenticated client
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "change-me-now"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Create a book and return its id
async fn create_book(client: &Client, token: &str, title: &str) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "title": title,
            "summary": "Created by the integration tests",
            "isbn": "9780000000001"
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), StatusCode::CREATED);
    let book: Value = response.json().await.expect("Failed to parse book");

    book["id"].as_i64().expect("No book id")
}

/// Add a copy to a book and return the created copy
async fn add_copy(client: &Client, token: &str, book_id: i64, copy: Value) -> Value {
    let response = client
        .post(format!("{}/books/{}/copies", BASE_URL, book_id))
        .bearer_auth(token)
        .json(&copy)
        .send()
        .await
        .expect("Failed to create copy");
    assert_eq!(response.status(), StatusCode::CREATED);

    response.json().await.expect("Failed to parse copy")
}

/// Create a book with one copy and return the copy id
async fn create_copy(client: &Client, token: &str) -> String {
    let book_id = create_book(client, token, "Integration Test Book").await;
    let copy = add_copy(
        client,
        token,
        book_id,
        json!({
            "imprint": "Test Press, 2024",
            "status": "on_loan",
            "due_back": Local::now().date_naive().to_string()
        }),
    )
    .await;

    copy["id"].as_str().expect("No copy id").to_string()
}

/// Create a reader without permissions, returning their id and token
async fn create_reader(client: &Client, token: &str) -> (i64, String) {
    let username = format!("reader{}", Local::now().timestamp_nanos_opt().unwrap_or_default());

    let response = client
        .post(format!("{}/users", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "username": username,
            "password": "reader-password",
            "first_name": "Test",
            "last_name": "Reader"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let user: Value = response.json().await.expect("Failed to parse user");

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "reader-password"
        }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");

    (
        user["id"].as_i64().expect("No user id"),
        body["token"].as_str().expect("No token in response").to_string(),
    )
}

/// Walk every page of a paginated list
async fn fetch_all_pages(client: &Client, token: &str, path: &str) -> Vec<Value> {
    let mut items = Vec::new();
    let mut page = 1;
    loop {
        let response = client
            .get(format!("{}{}?page={}", BASE_URL, path, page))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());
        let body: Value = response.json().await.expect("Failed to parse response");

        let entries = body["items"].as_array().expect("No items");
        assert!(entries.len() <= 10);
        items.extend(entries.iter().cloned());

        if page >= body["num_pages"].as_i64().expect("No num_pages") {
            return items;
        }
        page += 1;
    }
}

/// Due dates must never go backwards; undated copies come last
fn assert_soonest_due_first(items: &[Value]) {
    let dates: Vec<Option<&str>> = items.iter().map(|item| item["due_back"].as_str()).collect();
    for pair in dates.windows(2) {
        match (pair[0], pair[1]) {
            (Some(earlier), Some(later)) => assert!(earlier <= later, "{} after {}", earlier, later),
            (None, Some(later)) => panic!("undated copy listed before {}", later),
            _ => {}
        }
    }
}

async fn delete_copy(client: &Client, token: &str, copy_id: &str) {
    let response = client
        .delete(format!("{}/copies/{}", BASE_URL, copy_id))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "change-me-now"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["is_staff"], true);
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_mybooks_redirects_to_login() {
    let client = Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client");

    let response = client
        .get(format!("{}/mybooks", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::FOUND);
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("No location header");
    assert_eq!(location, "/api/v1/auth/login?next=%2Fapi%2Fv1%2Fmybooks");
}

#[tokio::test]
#[ignore]
async fn test_catalog_counts() {
    let client = Client::new();

    let response = client
        .get(format!("{}/catalog", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["num_books"].is_i64());
    assert!(body["num_visits"].as_i64().unwrap_or(0) >= 1);
}

#[tokio::test]
#[ignore]
async fn test_books_page_out_of_range() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books?page=0", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_renew_copy() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let copy_id = create_copy(&client, &token).await;
    let today = Local::now().date_naive();

    // The form proposes three weeks out
    let response = client
        .get(format!("{}/copies/{}/renew", BASE_URL, copy_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let form: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        form["form"]["initial_renewal_date"],
        (today + Duration::days(21)).to_string()
    );

    // Too far ahead is rejected
    let too_far = (today + Duration::days(29)).to_string();
    let response = client
        .post(format!("{}/copies/{}/renew", BASE_URL, copy_id))
        .bearer_auth(&token)
        .form(&[("renewal_date", too_far.as_str())])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["field"], "renewal_date");
    assert_eq!(body["message"], "Invalid date - renewal more than 4 weeks ahead");

    // The rejected date left the loan untouched
    let response = client
        .get(format!("{}/copies/{}", BASE_URL, copy_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let copy: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(copy["due_back"], today.to_string());

    // Four weeks is accepted
    let limit = (today + Duration::days(28)).to_string();
    let response = client
        .post(format!("{}/copies/{}/renew", BASE_URL, copy_id))
        .bearer_auth(&token)
        .form(&[("renewal_date", limit.as_str())])
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let copy: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(copy["due_back"], limit);
    assert_eq!(copy["is_overdue"], false);

    delete_copy(&client, &token, &copy_id).await;
}

#[tokio::test]
#[ignore]
async fn test_create_user_and_forbidden_borrowed_list() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let (_, reader_token) = create_reader(&client, &token).await;
    let reader_token = reader_token.as_str();

    let response = client
        .get(format!("{}/borrowed", BASE_URL))
        .bearer_auth(reader_token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .get(format!("{}/mybooks", BASE_URL))
        .bearer_auth(reader_token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["page"], 1);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
#[ignore]
async fn test_borrowed_lists_filter_and_order() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let (reader_id, reader_token) = create_reader(&client, &token).await;
    let book_id = create_book(&client, &token, "Borrowed List Book").await;
    let today = Local::now().date_naive();

    // Twelve loans, created latest-due first; every other one to the reader
    let mut on_loan = Vec::new();
    let mut readers_loans = Vec::new();
    for i in 0..12 {
        let borrower = if i % 2 == 0 { Some(reader_id) } else { None };
        let copy = add_copy(
            &client,
            &token,
            book_id,
            json!({
                "imprint": format!("Loan Press, printing {}", i),
                "status": "on_loan",
                "due_back": (today + Duration::days(11 - i)).to_string(),
                "borrower_id": borrower
            }),
        )
        .await;
        let id = copy["id"].as_str().expect("No copy id").to_string();
        if borrower.is_some() {
            readers_loans.push(id.clone());
        }
        on_loan.push(id);
    }

    // Held by the reader and due earliest, but not on loan
    let mut not_on_loan = Vec::new();
    for (status, days) in [("available", 5), ("maintenance", 10), ("reserved", 15)] {
        let copy = add_copy(
            &client,
            &token,
            book_id,
            json!({
                "imprint": format!("Shelf Press, {}", status),
                "status": status,
                "due_back": (today - Duration::days(days)).to_string(),
                "borrower_id": reader_id
            }),
        )
        .await;
        not_on_loan.push(copy["id"].as_str().expect("No copy id").to_string());
    }

    let borrowed = fetch_all_pages(&client, &token, "/borrowed").await;
    assert!(borrowed.len() >= 12);
    assert!(borrowed.iter().all(|copy| copy["status"] == "on_loan"));
    let borrowed_ids: Vec<&str> = borrowed.iter().filter_map(|copy| copy["id"].as_str()).collect();
    for id in &on_loan {
        assert!(borrowed_ids.contains(&id.as_str()));
    }
    for id in &not_on_loan {
        assert!(!borrowed_ids.contains(&id.as_str()));
    }
    assert_soonest_due_first(&borrowed);

    let mine = fetch_all_pages(&client, &reader_token, "/mybooks").await;
    assert_eq!(mine.len(), readers_loans.len());
    assert!(mine.iter().all(|copy| copy["status"] == "on_loan"));
    assert!(mine.iter().all(|copy| copy["borrower_id"] == reader_id));
    for id in &readers_loans {
        assert!(mine.iter().any(|copy| copy["id"] == id.as_str()));
    }
    assert_soonest_due_first(&mine);
    assert_eq!(
        mine.first().and_then(|copy| copy["due_back"].as_str()),
        Some((today + Duration::days(1)).to_string().as_str())
    );

    for id in on_loan.iter().chain(&not_on_loan) {
        delete_copy(&client, &token, id).await;
    }
}
