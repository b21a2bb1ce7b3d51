use std::{sync::Arc, time::Duration};

use serde_json::{json, Value};
use sqlx::SqlitePool;
use yatube::db_helpers::create_group_in_db;
use yatube::page_cache::PageCache;
use yatube::{get_random_free_port, init_db, make_router, serve};

struct TestApp {
    address: String,
    pool: SqlitePool,
    cache: Arc<PageCache>,
    client: reqwest::Client,
}

async fn spawn_app() -> TestApp {
    spawn_app_with_cache_ttl(Duration::from_secs(60)).await
}

async fn spawn_app_with_cache_ttl(ttl: Duration) -> TestApp {
    std::env::set_var("JWT_SECRET", "integration-test-secret");
    let db_path = std::env::temp_dir().join(format!("yatube-test-{}.sqlite", rand::random::<u64>()));
    let db_url = format!("sqlite://{}", db_path.display());
    let pool = init_db(&db_url).await.expect("Failed to set up the test database");

    let cache = Arc::new(PageCache::new(ttl));
    let (port, addr) = get_random_free_port();
    tokio::spawn(serve(
        make_router(),
        pool.clone(),
        Arc::clone(&cache),
        addr,
    ));

    let client = reqwest::Client::new();
    let address = format!("http://127.0.0.1:{}", port);
    for _ in 0..50 {
        if client
            .get(format!("{}/check_health", address))
            .send()
            .await
            .is_ok()
        {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    TestApp {
        address,
        pool,
        cache,
        client,
    }
}

impl TestApp {
    async fn register(&self, username: &str) -> String {
        let response = self
            .client
            .post(format!("{}/users", self.address))
            .json(&json!({
                "user": {
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "s3cr3tpass",
                }
            }))
            .send()
            .await
            .expect("Failed to send register request");
        assert!(response.status().is_success());
        let body: Value = response.json().await.unwrap();
        body["user"]["token"].as_str().unwrap().to_string()
    }

    async fn create_post(&self, token: &str, text: &str, group: Option<&str>) -> Value {
        let response = self
            .client
            .post(format!("{}/posts", self.address))
            .header("Authorization", format!("Token {}", token))
            .json(&json!({ "post": { "text": text, "group": group } }))
            .send()
            .await
            .expect("Failed to send create post request");
        assert!(response.status().is_success());
        response.json().await.unwrap()
    }

    async fn get_json(&self, path: &str) -> Value {
        let response = self
            .client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success(), "GET {} failed", path);
        response.json().await.unwrap()
    }

    async fn get_json_authed(&self, path: &str, token: &str) -> Value {
        let response = self
            .client
            .get(format!("{}{}", self.address, path))
            .header("Authorization", format!("Token {}", token))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success(), "GET {} failed", path);
        response.json().await.unwrap()
    }
}

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app().await;
    let response = app
        .client
        .get(format!("{}/check_health", app.address))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "alive");
}

#[tokio::test]
async fn about_pages_are_served() {
    let app = spawn_app().await;
    let author = app.get_json("/about/author").await;
    assert!(author["title"].is_string());
    let tech = app.get_json("/about/tech").await;
    assert!(tech["body"].as_str().unwrap().contains("axum"));
}

#[tokio::test]
async fn register_login_and_current_user() {
    let app = spawn_app().await;
    app.register("leo").await;

    let response = app
        .client
        .post(format!("{}/users/login", app.address))
        .json(&json!({ "user": { "email": "leo@example.com", "password": "s3cr3tpass" } }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    let token = body["user"]["token"].as_str().unwrap();

    let current = app.get_json_authed("/user", token).await;
    assert_eq!(current["user"]["username"], "leo");
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() {
    let app = spawn_app().await;
    app.register("misha").await;
    let response = app
        .client
        .post(format!("{}/users/login", app.address))
        .json(&json!({ "user": { "email": "misha@example.com", "password": "wrong" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 422);
}

#[tokio::test]
async fn anonymous_access_to_protected_routes_is_unauthorized() {
    let app = spawn_app().await;

    let create = app
        .client
        .post(format!("{}/posts", app.address))
        .json(&json!({ "post": { "text": "no auth" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(create.status().as_u16(), 401);

    let feed = app
        .client
        .get(format!("{}/feed", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(feed.status().as_u16(), 401);

    let follow = app
        .client
        .post(format!("{}/profiles/anyone/follow", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(follow.status().as_u16(), 401);
}

#[tokio::test]
async fn creating_a_post_increases_the_author_post_count() {
    let app = spawn_app().await;
    let token = app.register("anna").await;

    let before = app.get_json("/profiles/anna").await;
    assert_eq!(before["profile"]["postCount"], 0);

    let created = app.create_post(&token, "first post", None).await;
    assert_eq!(created["post"]["author"], "anna");
    assert_eq!(created["post"]["text"], "first post");

    let after = app.get_json("/profiles/anna").await;
    assert_eq!(after["profile"]["postCount"], 1);
}

#[tokio::test]
async fn post_with_empty_text_is_rejected() {
    let app = spawn_app().await;
    let token = app.register("empty-text").await;
    let response = app
        .client
        .post(format!("{}/posts", app.address))
        .header("Authorization", format!("Token {}", token))
        .json(&json!({ "post": { "text": "   " } }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 422);
}

#[tokio::test]
async fn group_listing_contains_only_posts_of_that_group() {
    let app = spawn_app().await;
    let token = app.register("grouper").await;
    create_group_in_db(&app.pool, "Cats", "cats", "About cats")
        .await
        .unwrap();

    app.create_post(&token, "a cat post", Some("cats")).await;
    app.create_post(&token, "an ungrouped post", None).await;

    let listing = app.get_json("/groups/cats/posts").await;
    assert_eq!(listing["group"]["slug"], "cats");
    let posts = listing["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["text"], "a cat post");
    assert_eq!(posts[0]["group"]["title"], "Cats");
}

#[tokio::test]
async fn unknown_group_is_not_found() {
    let app = spawn_app().await;
    let response = app
        .client
        .get(format!("{}/groups/missing/posts", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn posting_to_an_unknown_group_is_rejected() {
    let app = spawn_app().await;
    let token = app.register("lost").await;
    let response = app
        .client
        .post(format!("{}/posts", app.address))
        .header("Authorization", format!("Token {}", token))
        .json(&json!({ "post": { "text": "hello", "group": "nope" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 422);
}

#[tokio::test]
async fn pagination_slices_listings_into_fixed_pages() {
    let app = spawn_app().await;
    let token = app.register("prolific").await;
    for i in 0..13 {
        app.create_post(&token, &format!("post number {}", i), None)
            .await;
    }

    let first = app.get_json("/profiles/prolific/posts?page=1").await;
    assert_eq!(first["posts"].as_array().unwrap().len(), 10);
    assert_eq!(first["count"], 13);
    assert_eq!(first["numPages"], 2);
    assert_eq!(first["page"], 1);

    let last = app.get_json("/profiles/prolific/posts?page=2").await;
    assert_eq!(last["posts"].as_array().unwrap().len(), 3);

    // Out-of-range pages clamp to the last page instead of erroring.
    let clamped = app.get_json("/profiles/prolific/posts?page=99").await;
    assert_eq!(clamped["page"], 2);
    assert_eq!(clamped["posts"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn junk_page_parameters_fall_back_to_the_first_page() {
    let app = spawn_app().await;
    let token = app.register("lenient").await;
    for i in 0..13 {
        app.create_post(&token, &format!("post number {}", i), None)
            .await;
    }

    for query in ["abc", "-1", "0", "1.5", ""] {
        let listing = app
            .get_json(&format!("/profiles/lenient/posts?page={}", query))
            .await;
        assert_eq!(listing["page"], 1, "?page={} should land on page 1", query);
        assert_eq!(listing["posts"].as_array().unwrap().len(), 10);
    }
}

#[tokio::test]
async fn index_page_is_cached_until_cleared() {
    let app = spawn_app().await;
    let token = app.register("cacher").await;
    app.create_post(&token, "visible before caching", None).await;

    let first_body = app
        .client
        .get(format!("{}/posts", app.address))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    app.create_post(&token, "written after the cache warmed", None)
        .await;

    let second_body = app
        .client
        .get(format!("{}/posts", app.address))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(first_body, second_body);

    app.cache.clear().await;

    let third_body = app
        .client
        .get(format!("{}/posts", app.address))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_ne!(first_body, third_body);
    assert!(third_body.contains("written after the cache warmed"));
}

#[tokio::test]
async fn cached_index_expires_after_the_ttl() {
    let app = spawn_app_with_cache_ttl(Duration::from_millis(50)).await;
    let token = app.register("expiry").await;

    let stale = app.get_json("/posts").await;
    assert_eq!(stale["count"], 0);

    app.create_post(&token, "fresh after expiry", None).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    let fresh = app.get_json("/posts").await;
    assert_eq!(fresh["count"], 1);
}

#[tokio::test]
async fn post_detail_shows_comments_and_a_preview() {
    let app = spawn_app().await;
    let token = app.register("novelist").await;
    let long_text = "a very long text that definitely exceeds thirty characters";
    let created = app.create_post(&token, long_text, None).await;
    let post_id = created["post"]["id"].as_i64().unwrap();

    let response = app
        .client
        .post(format!("{}/posts/{}/comments", app.address, post_id))
        .header("Authorization", format!("Token {}", token))
        .json(&json!({ "comment": { "text": "well said" } }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let detail = app.get_json(&format!("/posts/{}", post_id)).await;
    assert_eq!(detail["post"]["text"], long_text);
    assert_eq!(detail["preview"].as_str().unwrap().chars().count(), 30);
    assert_eq!(detail["authorPostCount"], 1);
    let comments = detail["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["text"], "well said");
    assert_eq!(comments[0]["author"], "novelist");
}

#[tokio::test]
async fn commenting_on_a_missing_post_is_not_found() {
    let app = spawn_app().await;
    let token = app.register("ghost").await;
    let response = app
        .client
        .post(format!("{}/posts/9999/comments", app.address))
        .header("Authorization", format!("Token {}", token))
        .json(&json!({ "comment": { "text": "hello?" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn missing_post_detail_is_not_found() {
    let app = spawn_app().await;
    let response = app
        .client
        .get(format!("{}/posts/424242", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn only_the_author_can_edit_a_post() {
    let app = spawn_app().await;
    let author_token = app.register("author").await;
    let other_token = app.register("bystander").await;
    let created = app.create_post(&author_token, "original text", None).await;
    let post_id = created["post"]["id"].as_i64().unwrap();

    let forbidden = app
        .client
        .put(format!("{}/posts/{}", app.address, post_id))
        .header("Authorization", format!("Token {}", other_token))
        .json(&json!({ "post": { "text": "hijacked" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status().as_u16(), 403);

    let detail = app.get_json(&format!("/posts/{}", post_id)).await;
    assert_eq!(detail["post"]["text"], "original text");

    let allowed = app
        .client
        .put(format!("{}/posts/{}", app.address, post_id))
        .header("Authorization", format!("Token {}", author_token))
        .json(&json!({ "post": { "text": "edited text" } }))
        .send()
        .await
        .unwrap();
    assert!(allowed.status().is_success());

    let detail = app.get_json(&format!("/posts/{}", post_id)).await;
    assert_eq!(detail["post"]["text"], "edited text");
}

#[tokio::test]
async fn editing_can_move_a_post_between_groups() {
    let app = spawn_app().await;
    let token = app.register("mover").await;
    create_group_in_db(&app.pool, "Cats", "cats", "About cats")
        .await
        .unwrap();
    create_group_in_db(&app.pool, "Dogs", "dogs", "About dogs")
        .await
        .unwrap();

    let created = app.create_post(&token, "crossover content", Some("cats")).await;
    let post_id = created["post"]["id"].as_i64().unwrap();

    let response = app
        .client
        .put(format!("{}/posts/{}", app.address, post_id))
        .header("Authorization", format!("Token {}", token))
        .json(&json!({ "post": { "group": "dogs" } }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let detail = app.get_json(&format!("/posts/{}", post_id)).await;
    assert_eq!(detail["post"]["group"]["slug"], "dogs");
    assert_eq!(detail["post"]["text"], "crossover content");

    let dogs = app.get_json("/groups/dogs/posts").await;
    assert_eq!(dogs["posts"].as_array().unwrap().len(), 1);
    let cats = app.get_json("/groups/cats/posts").await;
    assert_eq!(cats["posts"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn follow_and_unfollow_toggle_the_following_flag() {
    let app = spawn_app().await;
    let follower_token = app.register("follower").await;
    app.register("celebrity").await;

    let before = app
        .get_json_authed("/profiles/celebrity", &follower_token)
        .await;
    assert_eq!(before["profile"]["following"], false);

    let follow = app
        .client
        .post(format!("{}/profiles/celebrity/follow", app.address))
        .header("Authorization", format!("Token {}", follower_token))
        .send()
        .await
        .unwrap();
    assert!(follow.status().is_success());

    let during = app
        .get_json_authed("/profiles/celebrity", &follower_token)
        .await;
    assert_eq!(during["profile"]["following"], true);

    // A second follow is a no-op thanks to the unique pair constraint.
    let again = app
        .client
        .post(format!("{}/profiles/celebrity/follow", app.address))
        .header("Authorization", format!("Token {}", follower_token))
        .send()
        .await
        .unwrap();
    assert!(again.status().is_success());

    let unfollow = app
        .client
        .delete(format!("{}/profiles/celebrity/follow", app.address))
        .header("Authorization", format!("Token {}", follower_token))
        .send()
        .await
        .unwrap();
    assert!(unfollow.status().is_success());

    let after = app
        .get_json_authed("/profiles/celebrity", &follower_token)
        .await;
    assert_eq!(after["profile"]["following"], false);

    let missing = app
        .client
        .delete(format!("{}/profiles/celebrity/follow", app.address))
        .header("Authorization", format!("Token {}", follower_token))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn following_yourself_is_rejected() {
    let app = spawn_app().await;
    let token = app.register("narcissus").await;
    let response = app
        .client
        .post(format!("{}/profiles/narcissus/follow", app.address))
        .header("Authorization", format!("Token {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 422);

    let unfollow = app
        .client
        .delete(format!("{}/profiles/narcissus/follow", app.address))
        .header("Authorization", format!("Token {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(unfollow.status().as_u16(), 422);
}

#[tokio::test]
async fn comment_with_empty_text_is_rejected() {
    let app = spawn_app().await;
    let token = app.register("quiet").await;
    let created = app.create_post(&token, "say something", None).await;
    let post_id = created["post"]["id"].as_i64().unwrap();

    let response = app
        .client
        .post(format!("{}/posts/{}/comments", app.address, post_id))
        .header("Authorization", format!("Token {}", token))
        .json(&json!({ "comment": { "text": "   " } }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 422);

    let detail = app.get_json(&format!("/posts/{}", post_id)).await;
    assert_eq!(detail["comments"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn feed_contains_only_posts_from_followed_authors() {
    let app = spawn_app().await;
    let reader_token = app.register("reader").await;
    let followed_token = app.register("followed").await;
    let stranger_token = app.register("stranger").await;

    app.create_post(&followed_token, "from the followed author", None)
        .await;
    app.create_post(&stranger_token, "from a stranger", None)
        .await;

    let follow = app
        .client
        .post(format!("{}/profiles/followed/follow", app.address))
        .header("Authorization", format!("Token {}", reader_token))
        .send()
        .await
        .unwrap();
    assert!(follow.status().is_success());

    let feed = app.get_json_authed("/feed", &reader_token).await;
    let posts = feed["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["author"], "followed");

    // The stranger's own feed is empty; they follow nobody.
    let empty = app.get_json_authed("/feed", &stranger_token).await;
    assert_eq!(empty["posts"].as_array().unwrap().len(), 0);
}
