//! API integration tests
//!
//! These run against a server started with the development configuration and
//! the seeded directory users. Tokens are minted locally, standing in for
//! the identity provider.

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

use biblos_server::models::user::UserClaims;

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| "change-this-secret-in-production".to_string())
}

fn token_for(user_id: i32, sub: &str, first_name: &str, last_name: &str, groups: &[&str]) -> String {
    let now = Utc::now().timestamp();
    let claims = UserClaims {
        sub: sub.to_string(),
        user_id,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        groups: groups.iter().map(|g| g.to_string()).collect(),
        exp: now + 3600,
        iat: now,
    };
    claims.create_token(&jwt_secret()).expect("Failed to sign token")
}

fn admin_token() -> String {
    token_for(1, "alice", "Alice", "Martin", &["Administrator"])
}

fn editor_token() -> String {
    token_for(2, "edouard", "Edouard", "Blanc", &["Editor"])
}

fn general1_token() -> String {
    token_for(3, "gabrielle", "Gabrielle", "Dupont", &["General"])
}

fn general2_token() -> String {
    token_for(4, "georges", "Georges", "Moreau", &["General"])
}

/// Create a book through the API and return its id
async fn create_test_book(client: &Client, title: &str) -> i64 {
    let title = format!("{} {}", title, Utc::now().timestamp_micros());
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", editor_token()))
        .json(&json!({
            "title": title,
            "publish_year": 2021,
            "author_ids": []
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No book ID")
}

async fn checkout(client: &Client, book_id: i64, token: &str) -> reqwest::Response {
    client
        .post(format!("{}/books/{}/checkout", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request")
}

async fn return_book(client: &Client, book_id: i64, token: &str) -> reqwest::Response {
    client
        .delete(format!("{}/book-checkouts/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request")
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
async fn test_unauthenticated_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_checkout_and_list_mine() {
    let client = Client::new();
    let book_id = create_test_book(&client, "Checkout Flow").await;

    let response = checkout(&client, book_id, &general1_token()).await;
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/book-checkouts", BASE_URL))
        .header("Authorization", format!("Bearer {}", general1_token()))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    let entries = body.as_array().expect("Expected an array");

    let entry = entries
        .iter()
        .find(|e| e["book_id"].as_i64() == Some(book_id))
        .expect("Checked out book missing from own list");

    // Default loan period is two weeks from the checkout instant
    let expected_due = (Utc::now() + Duration::days(14)).date_naive().to_string();
    assert_eq!(entry["due_date"].as_str(), Some(expected_due.as_str()));
    assert_eq!(entry["user"]["id"].as_i64(), Some(3));
    assert_eq!(entry["user"]["first_name"], "Gabrielle");

    // Cleanup
    let response = return_book(&client, book_id, &general1_token()).await;
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_list_mine_follows_checkout_order() {
    let client = Client::new();
    // Create in one order, check out in the other
    let first_created = create_test_book(&client, "Ordering A").await;
    let second_created = create_test_book(&client, "Ordering B").await;

    let response = checkout(&client, second_created, &general2_token()).await;
    assert_eq!(response.status(), 204);
    let response = checkout(&client, first_created, &general2_token()).await;
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/book-checkouts", BASE_URL))
        .header("Authorization", format!("Bearer {}", general2_token()))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    let positions: Vec<usize> = [second_created, first_created]
        .iter()
        .map(|id| {
            body.as_array()
                .unwrap()
                .iter()
                .position(|e| e["book_id"].as_i64() == Some(*id))
                .expect("Entry missing from list")
        })
        .collect();

    // Checkout order, not book id order
    assert!(positions[0] < positions[1]);

    return_book(&client, first_created, &general2_token()).await;
    return_book(&client, second_created, &general2_token()).await;
}

#[tokio::test]
#[ignore]
async fn test_checkout_conflict_and_recovery() {
    let client = Client::new();
    let book_id = create_test_book(&client, "Conflict").await;

    // First borrower wins
    let response = checkout(&client, book_id, &general1_token()).await;
    assert_eq!(response.status(), 204);

    // Second borrower is refused while the entry is outstanding
    let response = checkout(&client, book_id, &general2_token()).await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "AlreadyCheckedOut");

    // After the return the second borrower succeeds
    let response = return_book(&client, book_id, &general1_token()).await;
    assert_eq!(response.status(), 204);

    let response = checkout(&client, book_id, &general2_token()).await;
    assert_eq!(response.status(), 204);

    return_book(&client, book_id, &general2_token()).await;
}

#[tokio::test]
#[ignore]
async fn test_concurrent_checkout_single_winner() {
    let client = Client::new();
    let book_id = create_test_book(&client, "Race").await;

    let t1 = general1_token();
    let t2 = general2_token();
    let (r1, r2) = tokio::join!(
        checkout(&client, book_id, &t1),
        checkout(&client, book_id, &t2)
    );

    let statuses = [r1.status().as_u16(), r2.status().as_u16()];
    assert!(
        statuses.contains(&204) && statuses.contains(&400),
        "expected exactly one winner, got {:?}",
        statuses
    );

    // Whoever won can return; an admin return covers both cases
    let response = return_book(&client, book_id, &admin_token()).await;
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_return_permissions() {
    let client = Client::new();
    let book_id = create_test_book(&client, "Return Rights").await;

    let response = checkout(&client, book_id, &general1_token()).await;
    assert_eq!(response.status(), 204);

    // Another user cannot return it
    let response = return_book(&client, book_id, &general2_token()).await;
    assert_eq!(response.status(), 403);

    // An administrator can
    let response = return_book(&client, book_id, &admin_token()).await;
    assert_eq!(response.status(), 204);

    // A second return is an error, not a no-op
    let response = return_book(&client, book_id, &admin_token()).await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "NotCheckedOut");
}

#[tokio::test]
#[ignore]
async fn test_due_date_override_is_admin_only() {
    let client = Client::new();
    let book_id = create_test_book(&client, "Due Date").await;

    let response = checkout(&client, book_id, &general1_token()).await;
    assert_eq!(response.status(), 204);

    // The borrower cannot change their own due date
    let response = client
        .patch(format!("{}/book-checkouts/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", general1_token()))
        .json(&json!({"due_date": "2021-04-12"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    // An administrator can, even to a date in the past
    let response = client
        .patch(format!("{}/book-checkouts/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", admin_token()))
        .json(&json!({"due_date": "2021-04-12"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["due_date"], "2021-04-12");

    return_book(&client, book_id, &admin_token()).await;
}

#[tokio::test]
#[ignore]
async fn test_overdue_listing() {
    let client = Client::new();
    // Ids are allocated in creation order, so first < second
    let first = create_test_book(&client, "Overdue A").await;
    let second = create_test_book(&client, "Overdue B").await;
    let current = create_test_book(&client, "Not Overdue").await;

    for (book_id, token) in [
        (second, general1_token()),
        (first, general2_token()),
        (current, general1_token()),
    ] {
        let response = checkout(&client, book_id, &token).await;
        assert_eq!(response.status(), 204);
    }

    // Push two of the due dates into the past
    let past = (Utc::now() - Duration::days(2)).date_naive().to_string();
    for book_id in [first, second] {
        let response = client
            .patch(format!("{}/book-checkouts/{}", BASE_URL, book_id))
            .header("Authorization", format!("Bearer {}", admin_token()))
            .json(&json!({"due_date": past}))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 200);
    }

    // Not visible to a general user
    let response = client
        .get(format!("{}/book-checkouts/overdue", BASE_URL))
        .header("Authorization", format!("Bearer {}", general1_token()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    // Admin sees both, ordered by book id
    let response = client
        .get(format!("{}/book-checkouts/overdue", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    let overdue_ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["book_id"].as_i64())
        .filter(|id| [first, second, current].contains(id))
        .collect();
    assert_eq!(overdue_ids, vec![first, second]);

    for book_id in [first, second, current] {
        return_book(&client, book_id, &admin_token()).await;
    }
}

#[tokio::test]
#[ignore]
async fn test_checkout_entry_visibility() {
    let client = Client::new();
    let book_id = create_test_book(&client, "Visibility").await;

    let response = checkout(&client, book_id, &general1_token()).await;
    assert_eq!(response.status(), 204);

    // Another user gets 403, the borrower and an admin get the entry
    let cases = [
        (general2_token(), 403),
        (general1_token(), 200),
        (admin_token(), 200),
    ];
    for (token, expected) in cases {
        let response = client
            .get(format!("{}/book-checkouts/{}", BASE_URL, book_id))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status().as_u16(), expected);
    }

    let response = return_book(&client, book_id, &general1_token()).await;
    assert_eq!(response.status(), 204);

    // Once returned the entry is gone from the active view
    let response = client
        .get(format!("{}/book-checkouts/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", admin_token()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_catalog_write_permissions() {
    let client = Client::new();

    // A general user may not create books
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", general1_token()))
        .json(&json!({"title": "Denied", "publish_year": 2020, "author_ids": []}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    // An editor may create but not delete
    let book_id = create_test_book(&client, "Editor Created").await;

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", editor_token()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    // An administrator may delete
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", admin_token()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_users_directory_is_admin_only() {
    let client = Client::new();

    let response = client
        .get(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", general1_token()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .get(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
    let admin = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["id"].as_i64() == Some(1))
        .expect("Seeded administrator missing from directory");
    assert_eq!(admin["role"], "Administrator");
    assert!(admin["books"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_genre_surface() {
    let client = Client::new();
    let name = format!("Genre {}", Utc::now().timestamp_micros());

    // Editors can create genres
    let response = client
        .post(format!("{}/genres", BASE_URL))
        .header("Authorization", format!("Bearer {}", editor_token()))
        .json(&json!({"name": name}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let genre_id = body["id"].as_i64().expect("No genre ID");

    // Everyone with view_genre can list
    let response = client
        .get(format!("{}/genres", BASE_URL))
        .header("Authorization", format!("Bearer {}", general1_token()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    // Only administrators can delete
    let response = client
        .delete(format!("{}/genres/{}", BASE_URL, genre_id))
        .header("Authorization", format!("Bearer {}", editor_token()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .delete(format!("{}/genres/{}", BASE_URL, genre_id))
        .header("Authorization", format!("Bearer {}", admin_token()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);
}
