use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use bookshelf_app::books::{models::Book, store::BookStore};
use bookshelf_db::Database;
use bookshelf_kernel::settings::Settings;
use tempfile::TempDir;
use tower::ServiceExt;

const FORM: &str = "application/x-www-form-urlencoded";
const SCENARIO: &str =
    "btitle=A&bauthor=B&bperson=C&bpub_date=2024-01-01&bread=unread&bcomment=note";
const FIELDS: [(&str, &str); 6] = [
    ("btitle", "A"),
    ("bauthor", "B"),
    ("bperson", "C"),
    ("bpub_date", "2024-01-01"),
    ("bread", "unread"),
    ("bcomment", "note"),
];

struct Harness {
    _dir: TempDir,
    app: Router,
    db: Database,
    store: BookStore,
}

impl Harness {
    async fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let mut settings = Settings::default();
        settings.database.url = format!("sqlite://{}", dir.path().join("books.db").display());
        settings.server.template_dir = dir.path().join("templates");
        settings.server.static_dir = dir.path().join("static");

        let (db, registry) = bookshelf_app::bootstrap(&settings)
            .await
            .expect("bootstrap failed");
        let app = bookshelf_http::build_router(&registry, &settings);

        Self {
            _dir: dir,
            app,
            store: BookStore::new(db.clone()),
            db,
        }
    }

    async fn send(
        &self,
        method: Method,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, String) {
        let mut builder = Request::builder().method(method).uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        let response = self
            .app
            .clone()
            .oneshot(
                builder
                    .body(Body::from(body.to_owned()))
                    .expect("failed to build request"),
            )
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        (status, String::from_utf8(bytes.to_vec()).expect("body is not utf-8"))
    }

    async fn books(&self) -> Vec<Book> {
        self.store.list().await.expect("list failed")
    }
}

fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).expect("body is not json")
}

/// Form and JSON encodings of `fields` minus the one named `skip`.
fn bodies_without(fields: &[(&str, &str)], skip: &str) -> (String, String) {
    let kept: Vec<_> = fields.iter().filter(|(name, _)| *name != skip).collect();
    let form = kept
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    let object: serde_json::Map<_, _> = kept
        .iter()
        .map(|(name, value)| (name.to_string(), serde_json::Value::from(*value)))
        .collect();
    (form, serde_json::Value::Object(object).to_string())
}

#[tokio::test]
async fn create_adds_one_row_with_submitted_values() {
    let harness = Harness::new().await;

    let (status, body) = harness.send(Method::POST, Some(FORM), SCENARIO).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), serde_json::json!({"data": "added successfully"}));

    let books = harness.books().await;
    assert_eq!(books.len(), 1);
    let book = &books[0];
    assert!(book.id > 0);
    assert_eq!(
        (
            book.title.as_str(),
            book.author.as_str(),
            book.person.as_str(),
            book.pub_date.as_str(),
            book.read_status.as_str(),
            book.comment.as_str()
        ),
        ("A", "B", "C", "2024-01-01", "unread", "note")
    );
}

#[tokio::test]
async fn create_accepts_json_and_assigns_unique_ids() {
    let harness = Harness::new().await;
    let body = r#"{"btitle":"A","bauthor":"B","bperson":"C","bpub_date":"2024-01-01","bread":"unread","bcomment":"note"}"#;

    harness
        .send(Method::POST, Some("application/json"), body)
        .await;
    harness.send(Method::POST, Some(FORM), SCENARIO).await;

    let books = harness.books().await;
    assert_eq!(books.len(), 2);
    assert_ne!(books[0].id, books[1].id);
}

#[tokio::test]
async fn create_with_any_missing_field_is_rejected_and_adds_nothing() {
    let harness = Harness::new().await;

    for (missing, _) in FIELDS {
        let (form, body) = bodies_without(&FIELDS, missing);
        for (content_type, payload) in [(FORM, form), ("application/json", body)] {
            let (status, response) = harness
                .send(Method::POST, Some(content_type), &payload)
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{content_type} without {missing}");
            assert_eq!(json(&response)["error"]["code"], "missing_argument");
        }
    }

    assert!(harness.books().await.is_empty());
}

#[tokio::test]
async fn create_with_undecodable_escape_is_rejected() {
    let harness = Harness::new().await;

    let body = "btitle=%FF&bauthor=B&bperson=C&bpub_date=2024-01-01&bread=unread&bcomment=note";
    let (status, response) = harness.send(Method::POST, Some(FORM), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&response)["error"]["code"], "missing_argument");
    assert!(harness.books().await.is_empty());
}

#[tokio::test]
async fn list_renders_every_row() {
    let harness = Harness::new().await;
    harness.send(Method::POST, Some(FORM), SCENARIO).await;
    harness
        .send(
            Method::POST,
            Some(FORM),
            "btitle=Dune&bauthor=Herbert&bperson=&bpub_date=1965&bread=read&bcomment=x",
        )
        .await;

    let (status, page) = harness.send(Method::GET, None, "").await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("<td>Dune</td>"));
    assert!(page.contains("<td>note</td>"));
    assert_eq!(page.matches("<tr data-id=").count(), 2);
}

#[tokio::test]
async fn update_replaces_only_the_keyed_row() {
    let harness = Harness::new().await;
    harness.send(Method::POST, Some(FORM), SCENARIO).await;
    harness.send(Method::POST, Some(FORM), SCENARIO).await;
    let before = harness.books().await;
    let (target, other) = (&before[0], &before[1]);

    let body = format!(
        "btitle=A2&bauthor=B2&bperson=C2&bpub_date=2025-02-02&bread=read&bcomment=done&bid={}",
        target.id
    );
    let (status, response) = harness.send(Method::PUT, Some(FORM), &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&response)["data"], "updated successfully");

    let after = harness.books().await;
    let updated = after.iter().find(|book| book.id == target.id).unwrap();
    assert_eq!(updated.title, "A2");
    assert_eq!(updated.read_status, "read");
    assert_eq!(updated.comment, "done");
    assert_eq!(after.iter().find(|book| book.id == other.id), Some(other));
}

#[tokio::test]
async fn update_of_unknown_id_succeeds_without_changes() {
    let harness = Harness::new().await;
    harness.send(Method::POST, Some(FORM), SCENARIO).await;
    let before = harness.books().await;

    let body = "btitle=X&bauthor=X&bperson=X&bpub_date=X&bread=X&bcomment=X&bid=9999";
    let (status, _) = harness.send(Method::PUT, Some(FORM), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(harness.books().await, before);
}

#[tokio::test]
async fn update_with_any_missing_field_is_rejected_and_changes_nothing() {
    let harness = Harness::new().await;
    harness.send(Method::POST, Some(FORM), SCENARIO).await;
    let before = harness.books().await;

    let id = before[0].id.to_string();
    let mut fields = vec![("bid", id.as_str())];
    fields.extend([
        ("btitle", "X"),
        ("bauthor", "X"),
        ("bperson", "X"),
        ("bpub_date", "X"),
        ("bread", "X"),
        ("bcomment", "X"),
    ]);

    for (missing, _) in fields.clone() {
        let (form, body) = bodies_without(&fields, missing);
        for (content_type, payload) in [(FORM, form), ("application/json", body)] {
            let (status, response) = harness
                .send(Method::PUT, Some(content_type), &payload)
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{content_type} without {missing}");
            assert_eq!(json(&response)["error"]["code"], "missing_argument");
        }
    }

    assert_eq!(harness.books().await, before);
}

#[tokio::test]
async fn delete_removes_exactly_the_matching_row() {
    let harness = Harness::new().await;
    harness.send(Method::POST, Some(FORM), SCENARIO).await;
    harness.send(Method::POST, Some(FORM), SCENARIO).await;
    let before = harness.books().await;
    let gone = before[0].id;

    let (status, body) = harness
        .send(Method::DELETE, None, &format!(r#"{{"id": {gone}}}"#))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["data"], "deleted successfully");

    let after = harness.books().await;
    assert_eq!(after.len(), 1);
    assert_eq!(after[0], before[1]);
}

#[tokio::test]
async fn delete_of_unknown_id_succeeds_without_changes() {
    let harness = Harness::new().await;
    harness.send(Method::POST, Some(FORM), SCENARIO).await;
    let before = harness.books().await;

    let (status, body) = harness
        .send(Method::DELETE, Some("application/json"), r#"{"id": 7777}"#)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["data"], "deleted successfully");
    assert_eq!(harness.books().await, before);
}

#[tokio::test]
async fn delete_with_bad_body_is_rejected_and_changes_nothing() {
    let harness = Harness::new().await;
    harness.send(Method::POST, Some(FORM), SCENARIO).await;
    let before = harness.books().await;

    let (status, body) = harness.send(Method::DELETE, None, "not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["error"]["code"], "malformed_body");

    let (status, body) = harness.send(Method::DELETE, None, r#"{"bid": 1}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["error"]["code"], "missing_argument");

    assert_eq!(harness.books().await, before);
}

#[tokio::test]
async fn list_with_store_down_returns_error_envelope() {
    let harness = Harness::new().await;
    harness.send(Method::POST, Some(FORM), SCENARIO).await;
    harness.db.close().await;

    let (status, body) = harness.send(Method::GET, None, "").await;

    assert!(status.is_server_error());
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json(&body)["error"]["code"], "store_unavailable");
    assert!(!body.contains("<tr"));
}

#[tokio::test]
async fn unsupported_verb_is_not_allowed() {
    let harness = Harness::new().await;
    let (status, _) = harness.send(Method::PATCH, None, "").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn health_and_openapi_are_served() {
    let harness = Harness::new().await;

    let response = harness
        .app
        .clone()
        .oneshot(Request::builder().uri("/docs/openapi.json").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let document: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(document["paths"]["/"]["delete"].is_object());
    assert!(document["components"]["schemas"]["Ack"].is_object());

    let response = harness
        .app
        .clone()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
