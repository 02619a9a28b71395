//! End-to-end flows through the full router with an in-memory session store,
//! a temporary SQLite file and a temporary static root.

use std::path::PathBuf;

use api::AppState;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use store::AppConfig;
use tempfile::TempDir;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, SessionManagerLayer};

const BOUNDARY: &str = "----jotter-test-boundary";

struct TestApp {
    router: Router,
    static_root: PathBuf,
    _dir: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.storage.static_root = dir.path().join("static");
        config.database.url = format!("sqlite://{}", dir.path().join("jotter.db").display());

        let pool = api::db::connect(&config.database.url).await.unwrap();
        api::db::migrate(&pool).await.unwrap();

        let static_root = config.storage.static_root.clone();
        let session_layer = SessionManagerLayer::new(MemoryStore::default()).with_secure(false);
        let router = api::router(AppState::new(pool, config)).layer(session_layer);

        Self {
            router,
            static_root,
            _dir: dir,
        }
    }

    /// A browser with its own cookie jar.
    fn client(&self) -> Client {
        Client {
            router: self.router.clone(),
            cookie: None,
            last_set_cookie: None,
        }
    }
}

struct Client {
    router: Router,
    cookie: Option<String>,
    last_set_cookie: Option<String>,
}

impl Client {
    async fn send(&mut self, mut request: Request<Body>) -> Response {
        if let Some(cookie) = &self.cookie {
            request.headers_mut().insert(COOKIE, cookie.parse().unwrap());
        }
        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set) = response.headers().get(SET_COOKIE) {
            let value = set.to_str().unwrap().to_string();
            let pair = value.split(';').next().unwrap().trim().to_string();
            let removed = value.contains("Max-Age=0") || pair.ends_with('=');
            self.cookie = (!removed).then_some(pair);
            self.last_set_cookie = Some(value);
        }
        response
    }

    async fn get(&mut self, uri: &str) -> Response {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_form(&mut self, uri: &str, body: &str) -> Response {
        let request = Request::post(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn post_note(&mut self, uri: &str, fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Response {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                    .as_bytes(),
            );
        }
        if let Some((filename, data)) = image {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::post(uri)
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn json(&mut self, uri: &str) -> Value {
        let response = self.get(uri).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        body_json(response).await
    }

    async fn register(&mut self, username: &str, email: &str, password: &str) -> Response {
        self.post_form(
            "/register",
            &format!("username={username}&email={email}&password={password}&password2={password}"),
        )
        .await
    }

    async fn login(&mut self, username: &str, password: &str) -> Response {
        self.post_form("/login", &format!("username={username}&password={password}"))
            .await
    }

    async fn sign_up(&mut self, username: &str, email: &str) {
        assert_redirect(&self.register(username, email, "pw").await, "/login");
        self.flashes("/login").await;
        assert_redirect(&self.login(username, "pw").await, "/index");
    }

    async fn create_category(&mut self, name: &str) -> i64 {
        let response = self.post_form("/create_category", &format!("name={name}")).await;
        assert_redirect(&response, "/index");
        let index = self.json("/index").await;
        index["categories"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["name"] == name)
            .and_then(|c| c["id"].as_i64())
            .unwrap()
    }

    async fn flashes(&mut self, uri: &str) -> Vec<String> {
        let page = self.json(uri).await;
        page["flashes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f.as_str().unwrap().to_string())
            .collect()
    }
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn location(response: &Response) -> &str {
    response.headers()[LOCATION].to_str().unwrap()
}

fn assert_redirect(response: &Response, to: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(response), to);
}

fn titles(page: &Value) -> Vec<String> {
    page["notes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn register_login_categorize_search() {
    let app = TestApp::new().await;
    let mut alice = app.client();

    assert_redirect(&alice.register("alice", "a@x.com", "pw").await, "/login");
    assert_eq!(
        alice.flashes("/login").await,
        ["Congratulations, you are now a registered user!"]
    );
    assert_redirect(&alice.login("alice", "pw").await, "/index");

    let work = alice.create_category("Work").await;

    let response = alice
        .post_note(
            "/create_edit_note",
            &[("title", "T"), ("content", "C"), ("category", work.to_string().as_str())],
            None,
        )
        .await;
    assert_redirect(&response, "/index");

    let index = alice.json("/index").await;
    assert_eq!(index["user"]["username"], "alice");
    assert_eq!(titles(&index), ["T"]);
    assert_eq!(index["notes"][0]["category"], "Work");
    assert_eq!(index["flashes"][0], "Note created.");

    let filtered = alice.json(&format!("/filter_notes_by_category/{work}")).await;
    assert_eq!(titles(&filtered), ["T"]);
    assert_eq!(filtered["category"]["name"], "Work");

    let found = body_json(alice.post_form("/search", "search=T").await).await;
    assert_eq!(titles(&found), ["T"]);
    let found = body_json(alice.post_form("/search", "search=t").await).await;
    assert_eq!(titles(&found), ["T"]);
    let missing = body_json(alice.post_form("/search", "search=zzz").await).await;
    assert!(titles(&missing).is_empty());

    assert_redirect(&alice.post_form("/search", "search=").await, "/index");
}

#[tokio::test]
async fn duplicate_username_or_email_is_rejected() {
    let app = TestApp::new().await;
    let mut client = app.client();

    assert_redirect(&client.register("alice", "a@x.com", "pw").await, "/login");
    client.flashes("/login").await;

    assert_redirect(&client.register("alice", "other@x.com", "pw").await, "/register");
    assert_eq!(client.flashes("/register").await, ["Please use a different username."]);

    assert_redirect(&client.register("bob", "A@X.com", "pw").await, "/register");
    assert_eq!(client.flashes("/register").await, ["Please use a different email address."]);

    assert_redirect(&client.login("bob", "pw").await, "/login?next=/index");
    assert_eq!(client.flashes("/login").await, ["Invalid username or password"]);
}

#[tokio::test]
async fn registration_requires_matching_passwords() {
    let app = TestApp::new().await;
    let mut client = app.client();

    let response = client
        .post_form("/register", "username=alice&email=a@x.com&password=pw&password2=px")
        .await;
    assert_redirect(&response, "/register");
    assert_eq!(client.flashes("/register").await, ["Field must be equal to password."]);
}

#[tokio::test]
async fn protected_routes_require_login() {
    let app = TestApp::new().await;
    let mut client = app.client();

    assert_redirect(&client.get("/index").await, "/login?next=/index");
    assert_redirect(&client.get("/").await, "/login?next=/");
    assert_redirect(
        &client.post_form("/create_category", "name=Work").await,
        "/login?next=/create_category",
    );

    client.register("alice", "a@x.com", "pw").await;
    let response = client
        .post_form("/login?next=/create_category", "username=alice&password=pw")
        .await;
    assert_redirect(&response, "/create_category");

    // Already signed in.
    assert_redirect(&client.get("/login").await, "/index");
    assert_redirect(&client.get("/register").await, "/index");

    assert_redirect(&client.get("/logout").await, "/index");
    assert_redirect(&client.get("/index").await, "/login?next=/index");
}

#[tokio::test]
async fn external_next_is_ignored() {
    let app = TestApp::new().await;
    let mut client = app.client();
    client.register("alice", "a@x.com", "pw").await;

    let response = client
        .post_form("/login?next=https://evil.example/", "username=alice&password=pw")
        .await;
    assert_redirect(&response, "/index");
}

#[tokio::test]
async fn next_with_control_characters_is_ignored() {
    let app = TestApp::new().await;
    let mut client = app.client();
    client.register("alice", "a@x.com", "pw").await;

    let response = client
        .post_form("/login?next=/index%0Ax", "username=alice&password=pw")
        .await;
    assert_redirect(&response, "/index");
    assert_eq!(client.json("/index").await["user"]["username"], "alice");
}

#[tokio::test]
async fn remember_me_extends_session_cookie() {
    let app = TestApp::new().await;

    let mut short = app.client();
    short.register("alice", "a@x.com", "pw").await;
    short.login("alice", "pw").await;
    assert!(!short.last_set_cookie.as_deref().unwrap().contains("Max-Age"));

    let mut long = app.client();
    let response = long
        .post_form("/login", "username=alice&password=pw&remember_me=y")
        .await;
    assert_redirect(&response, "/index");
    assert!(long.last_set_cookie.as_deref().unwrap().contains("Max-Age="));
}

#[tokio::test]
async fn users_cannot_touch_each_others_records() {
    let app = TestApp::new().await;

    let mut alice = app.client();
    alice.sign_up("alice", "a@x.com").await;
    let work = alice.create_category("Work").await;
    alice
        .post_note(
            "/create_edit_note",
            &[("title", "Secret"), ("content", "C"), ("category", work.to_string().as_str())],
            None,
        )
        .await;
    let note = alice.json("/index").await["notes"][0]["id"].as_i64().unwrap();

    let mut bob = app.client();
    bob.sign_up("bob", "b@x.com").await;

    let index = bob.json("/index").await;
    assert!(titles(&index).is_empty());
    assert!(index["categories"].as_array().unwrap().is_empty());

    assert_redirect(&bob.get(&format!("/edit_category/{work}")).await, "/index");
    assert_eq!(bob.flashes("/index").await, ["Category not found."]);

    assert_redirect(
        &bob.post_form(&format!("/edit_category/{work}"), "name=Mine").await,
        "/index",
    );
    assert_eq!(bob.flashes("/index").await, ["Category not found."]);

    assert_redirect(&bob.post_form(&format!("/delete_category/{work}"), "").await, "/index");
    assert_eq!(bob.flashes("/index").await, ["Category not found."]);

    let filtered = bob.json(&format!("/filter_notes_by_category/{work}")).await;
    assert!(titles(&filtered).is_empty());
    assert_eq!(filtered["flashes"][0], "Category not found.");

    assert_redirect(&bob.get(&format!("/create_edit_note/{note}")).await, "/index");
    assert_eq!(bob.flashes("/index").await, ["Note not found."]);

    let response = bob
        .post_note(
            &format!("/create_edit_note/{note}"),
            &[("title", "Hijacked"), ("content", "C")],
            None,
        )
        .await;
    assert_redirect(&response, "/index");
    assert_eq!(bob.flashes("/index").await, ["Note not found."]);

    assert_redirect(&bob.post_form(&format!("/delete_note/{note}"), "").await, "/index");
    assert_eq!(bob.flashes("/index").await, ["Note not found."]);

    // Bob can't file his own note under Alice's category either.
    let response = bob
        .post_note(
            "/create_edit_note",
            &[("title", "Mine"), ("content", "C"), ("category", work.to_string().as_str())],
            None,
        )
        .await;
    assert_redirect(&response, "/create_edit_note");
    assert_eq!(bob.flashes("/create_edit_note").await, ["Not a valid choice."]);

    let index = alice.json("/index").await;
    assert_eq!(titles(&index), ["Secret"]);
    assert_eq!(index["categories"][0]["name"], "Work");
}

#[tokio::test]
async fn category_edit_and_delete_keep_notes() {
    let app = TestApp::new().await;
    let mut alice = app.client();
    alice.sign_up("alice", "a@x.com").await;

    let work = alice.create_category("Work").await;
    alice
        .post_note(
            "/create_edit_note",
            &[("title", "T"), ("content", "C"), ("category", work.to_string().as_str())],
            None,
        )
        .await;

    let page = alice.json(&format!("/edit_category/{work}")).await;
    assert_eq!(page["category"]["name"], "Work");

    assert_redirect(
        &alice.post_form(&format!("/edit_category/{work}"), "name=").await,
        &format!("/edit_category/{work}"),
    );
    assert_eq!(
        alice.flashes(&format!("/edit_category/{work}")).await,
        ["This field is required."]
    );

    assert_redirect(
        &alice.post_form(&format!("/edit_category/{work}"), "name=Office").await,
        "/index",
    );
    let index = alice.json("/index").await;
    assert_eq!(index["notes"][0]["category"], "Office");
    assert_eq!(index["flashes"][0], "Category updated successfully.");

    assert_redirect(&alice.post_form(&format!("/delete_category/{work}"), "").await, "/index");
    let index = alice.json("/index").await;
    assert_eq!(titles(&index), ["T"]);
    assert!(index["notes"][0]["category_id"].is_null());
    assert!(index["categories"].as_array().unwrap().is_empty());
    assert_eq!(index["flashes"][0], "Category deleted.");
}

#[tokio::test]
async fn note_content_length_is_bounded() {
    let app = TestApp::new().await;
    let mut alice = app.client();
    alice.sign_up("alice", "a@x.com").await;

    let too_long = "x".repeat(1001);
    let response = alice
        .post_note("/create_edit_note", &[("title", "T"), ("content", too_long.as_str())], None)
        .await;
    assert_redirect(&response, "/create_edit_note");
    assert_eq!(
        alice.flashes("/create_edit_note").await,
        ["Field must be between 1 and 1000 characters long."]
    );

    let response = alice
        .post_note("/create_edit_note", &[("title", "T"), ("content", "")], None)
        .await;
    assert_redirect(&response, "/create_edit_note");

    let max = "x".repeat(1000);
    let response = alice
        .post_note("/create_edit_note", &[("title", "Max"), ("content", max.as_str())], None)
        .await;
    assert_redirect(&response, "/index");
    let response = alice
        .post_note("/create_edit_note", &[("title", "Min"), ("content", "x")], None)
        .await;
    assert_redirect(&response, "/index");

    assert_eq!(titles(&alice.json("/index").await), ["Max", "Min"]);
}

#[tokio::test]
async fn image_uploads() {
    let app = TestApp::new().await;
    let mut alice = app.client();
    alice.sign_up("alice", "a@x.com").await;

    let response = alice
        .post_note(
            "/create_edit_note",
            &[("title", "T"), ("content", "C")],
            Some(("a.exe", b"MZ".as_slice())),
        )
        .await;
    assert_redirect(&response, "/create_edit_note");
    assert_eq!(
        alice.flashes("/create_edit_note").await,
        ["File type not allowed. Allowed types: png, jpg, jpeg, gif."]
    );
    assert!(titles(&alice.json("/index").await).is_empty());
    assert!(!app.static_root.join("uploads").exists());

    let response = alice
        .post_note(
            "/create_edit_note",
            &[("title", "T"), ("content", "C")],
            Some(("a.png", b"first image".as_slice())),
        )
        .await;
    assert_redirect(&response, "/index");

    let index = alice.json("/index").await;
    let note = index["notes"][0]["id"].as_i64().unwrap();
    let first_url = index["notes"][0]["image_url"].as_str().unwrap().to_string();
    assert!(first_url.starts_with("/static/uploads/"));
    assert!(first_url.ends_with("_a.png"));

    let response = alice.get(&first_url).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"first image");

    // Editing without a file keeps the image.
    alice
        .post_note(
            &format!("/create_edit_note/{note}"),
            &[("title", "T2"), ("content", "C")],
            None,
        )
        .await;
    let index = alice.json("/index").await;
    assert_eq!(index["notes"][0]["image_url"], first_url.as_str());
    assert_eq!(index["flashes"][0], "Note updated.");

    // Replacing the image removes the old file.
    alice
        .post_note(
            &format!("/create_edit_note/{note}"),
            &[("title", "T2"), ("content", "C")],
            Some(("b.gif", b"second image".as_slice())),
        )
        .await;
    let index = alice.json("/index").await;
    let second_url = index["notes"][0]["image_url"].as_str().unwrap().to_string();
    assert!(second_url.ends_with("_b.gif"));
    assert_eq!(alice.get(&first_url).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(alice.get(&second_url).await.status(), StatusCode::OK);

    // Deleting the note removes its image.
    let stored = app
        .static_root
        .join(index["notes"][0]["image_path"].as_str().unwrap());
    assert!(stored.exists());
    assert_redirect(&alice.post_form(&format!("/delete_note/{note}"), "").await, "/index");
    assert_eq!(alice.flashes("/index").await, ["Note has been deleted."]);
    assert!(!stored.exists());
}

#[tokio::test]
async fn note_form_lists_own_categories() {
    let app = TestApp::new().await;
    let mut alice = app.client();
    alice.sign_up("alice", "a@x.com").await;
    alice.create_category("Work").await;
    alice.create_category("Home").await;

    let page = alice.json("/create_edit_note").await;
    assert_eq!(page["mode"], "Create");
    assert!(page["note"].is_null());
    let names: Vec<&str> = page["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Work", "Home"]);

    alice
        .post_note("/create_edit_note", &[("title", "T"), ("content", "C")], None)
        .await;
    let note = alice.json("/index").await["notes"][0]["id"].as_i64().unwrap();
    let page = alice.json(&format!("/create_edit_note/{note}")).await;
    assert_eq!(page["mode"], "Edit");
    assert_eq!(page["note"]["title"], "T");
}
