//! End-to-end tests of the workbench against a stub backend.

mod common;

use std::path::Path;

use common::RecordingGrid;
use common::Reply;
use common::StubServer;
use common::scratch_dir;
use dummydata_lib::CellEdit;
use dummydata_lib::NoticeLevel;
use dummydata_lib::Phase;
use dummydata_lib::PreviewClient;
use dummydata_lib::Row;
use dummydata_lib::Workbench;
use dummydata_lib::api::ExportKind;
use dummydata_lib::api::GenerateRequest;
use dummydata_lib::api::GenerationResult;
use dummydata_lib::workbench::GENERATE_SERVER_ERROR;
use dummydata_lib::workbench::NO_COLUMNS;
use dummydata_lib::workbench::UPLOAD_FAILED;
use serde_json::json;

const USERS_DDL: &str = "CREATE TABLE users (id INT, name VARCHAR(50));";

fn workbench() -> Workbench<RecordingGrid> {
    let mut bench = Workbench::new(RecordingGrid::default());
    bench.set_ddl(USERS_DDL);
    bench.set_row_count("1");
    bench
}

fn alice_reply() -> Reply {
    Reply::json(
        200,
        json!({"success": true, "columns": ["id", "name"], "data": [{"id": "1", "name": "Alice"}]}),
    )
}

// =============================================================================
// Generation
// =============================================================================

#[tokio::test]
async fn test_generate_render_edit_round_trip() {
    let server = StubServer::start(vec![("/generate", alice_reply())]).await;
    let client = server.client();
    let mut bench = workbench();

    let notice = bench.generate(&client).await.unwrap();
    assert_eq!(notice.level, NoticeLevel::Info);
    assert_eq!(bench.phase(), Phase::Populated);

    let request = server.last_request();
    assert_eq!(request.path, "/generate");
    assert_eq!(request.json(), json!({"ddl": USERS_DDL, "rows": "1"}));

    let frame = bench.view().frame.clone().unwrap();
    assert_eq!(frame.headers(), ["id", "name"]);
    assert_eq!(frame.cell(0, 1), Some("Alice"));

    bench.on_cell_edited(CellEdit::new(0, "name", "Bob"));

    let expected: Row = [("id", "1"), ("name", "Bob")].into_iter().collect();
    assert_eq!(bench.table().rows(), [expected]);
}

#[tokio::test]
async fn test_generate_failure_shows_server_message() {
    let server = StubServer::start(vec![
        ("/generate", Reply::json(400, json!({"success": false, "message": "bad ddl"}))),
    ])
    .await;
    let client = server.client();
    let mut bench = workbench();

    let notice = bench.generate(&client).await.unwrap();

    assert_eq!(notice.message, "bad ddl");
    assert!(notice.is_error());
    assert_eq!(bench.phase(), Phase::Empty);
    assert_eq!(bench.view().renders, 0);
}

#[tokio::test]
async fn test_generate_failure_keeps_previous_table() {
    let server = StubServer::start(vec![("/generate", alice_reply())]).await;
    let client = server.client();
    let mut bench = workbench();
    bench.generate(&client).await;
    let before = bench.table().snapshot().clone();

    let failing = StubServer::start(vec![(
        "/generate",
        Reply::json(500, json!({"success": false, "message": "bad ddl"})),
    )])
    .await;
    let notice = bench.generate(&failing.client()).await.unwrap();

    assert_eq!(notice.message, "bad ddl");
    assert_eq!(bench.table().snapshot(), &before);
}

#[tokio::test]
async fn test_generate_non_json_is_server_error() {
    let server = StubServer::start(vec![(
        "/generate",
        Reply::raw(500, "text/html", "<h1>Internal Server Error</h1>"),
    )])
    .await;
    let mut bench = workbench();

    let notice = bench.generate(&server.client()).await.unwrap();

    assert_eq!(notice.message, GENERATE_SERVER_ERROR);
    assert!(bench.table().is_empty());
}

#[tokio::test]
async fn test_generate_no_columns() {
    let server = StubServer::start(vec![(
        "/generate",
        Reply::json(200, json!({"success": true, "columns": [], "data": []})),
    )])
    .await;
    let mut bench = workbench();

    let notice = bench.generate(&server.client()).await.unwrap();

    assert_eq!(notice.message, NO_COLUMNS);
    assert!(bench.view().frame.is_none());
    assert!(!bench.view().visible);
}

#[tokio::test]
async fn test_generate_unreachable_backend() {
    // Bind then drop to get a port nothing listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = PreviewClient::builder()
        .url(format!("http://127.0.0.1:{}", port))
        .build()
        .unwrap();

    let result = client.generate(&GenerateRequest::new(USERS_DDL, "5")).await;
    assert!(matches!(result, GenerationResult::TransportError(_)));
}

#[tokio::test]
async fn test_row_count_is_sent_verbatim() {
    let server = StubServer::start(vec![("/generate", alice_reply())]).await;
    let mut bench = workbench();
    bench.set_row_count("ten");

    bench.generate(&server.client()).await;

    assert_eq!(server.last_request().json()["rows"], "ten");
}

// =============================================================================
// Export
// =============================================================================

#[tokio::test]
async fn test_csv_export_saves_artifact() {
    let csv = "\u{feff}\"a\"\r\n\"x\"\r\n\"y\"\r\n";
    let server = StubServer::start(vec![
        (
            "/generate",
            Reply::json(
                200,
                json!({"success": true, "columns": ["a"], "data": [{"a": "x"}, {"a": "y"}]}),
            ),
        ),
        ("/csv", Reply::raw(200, "text/csv", csv)),
    ])
    .await;
    let client = server.client();
    let mut bench = workbench();
    bench.generate(&client).await;
    let dir = scratch_dir("csv-export");

    let notice = bench.export(&client, ExportKind::Csv, &dir).await;

    assert!(!notice.is_error(), "{}", notice);
    let request = server.last_request();
    assert_eq!(request.path, "/csv");
    assert_eq!(request.json(), json!({"columns": ["a"], "data": [{"a": "x"}, {"a": "y"}]}));

    let saved = std::fs::read_to_string(dir.join("dummy_data.csv")).unwrap();
    assert_eq!(saved, csv);
}

#[tokio::test]
async fn test_insert_export_echoes_untouched_numbers() {
    let sql = "INSERT INTO users (id, name) VALUES (1, 'Bob');";
    let server = StubServer::start(vec![
        (
            "/generate",
            Reply::json(
                200,
                json!({"success": true, "columns": ["id", "name"], "data": [{"id": 1, "name": "Alice"}]}),
            ),
        ),
        (
            "/insert-sql",
            Reply::raw(200, "text/sql", sql)
                .header("content-disposition", "attachment; filename=users_insert.sql"),
        ),
    ])
    .await;
    let client = server.client();
    let mut bench = workbench();
    bench.generate(&client).await;
    bench.on_cell_edited(CellEdit::new(0, "name", "Bob"));

    let request = bench.export_request(ExportKind::InsertSql);
    let artifact = client.export(&request).await.unwrap();

    assert_eq!(
        server.last_request().json(),
        json!({"ddl": USERS_DDL, "columns": ["id", "name"], "data": [{"id": 1, "name": "Bob"}]})
    );
    assert_eq!(artifact.file_name(), "insert_statements.sql");
    assert_eq!(artifact.server_file_name(), Some("users_insert.sql"));
    assert_eq!(artifact.bytes(), sql.as_bytes());
}

#[tokio::test]
async fn test_export_failure_writes_nothing() {
    let server = StubServer::start(vec![(
        "/insert-sql",
        Reply::json(400, json!({"success": false, "message": "Missing DDL, columns, or data"})),
    )])
    .await;
    let bench = workbench();
    let dir = scratch_dir("failed-export");

    let notice = bench.export(&server.client(), ExportKind::InsertSql, &dir).await;

    assert_eq!(notice.message, "Failed to generate INSERT SQL");
    assert!(!dir.join("insert_statements.sql").exists());
}

// =============================================================================
// Upload
// =============================================================================

#[tokio::test]
async fn test_upload_populates_ddl() {
    let ddl = "CREATE TABLE orders (id INT, total DECIMAL(10,2));";
    let server = StubServer::start(vec![(
        "/upload-sql",
        Reply::json(200, json!({"success": true, "ddl": ddl})),
    )])
    .await;
    let dir = scratch_dir("upload");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("orders.sql");
    std::fs::write(&path, ddl).unwrap();
    let mut bench = workbench();

    let notice = bench.upload(&server.client(), &path).await.unwrap();

    assert!(!notice.is_error());
    assert_eq!(bench.ddl(), ddl);
    assert!(bench.table().is_empty());

    let request = server.last_request();
    assert!(
        request
            .content_type
            .as_deref()
            .unwrap_or_default()
            .starts_with("multipart/form-data")
    );
    let body = request.text();
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"orders.sql\""));
    assert!(body.contains(ddl));
}

#[tokio::test]
async fn test_upload_missing_file_and_empty_path() {
    let server = StubServer::start(Vec::new()).await;
    let mut bench = workbench();

    assert!(bench.upload(&server.client(), Path::new("")).await.is_none());

    let missing = scratch_dir("missing-upload").join("nope.sql");
    let notice = bench.upload(&server.client(), &missing).await.unwrap();
    assert_eq!(notice.message, UPLOAD_FAILED);
    assert_eq!(bench.ddl(), USERS_DDL);
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_upload_server_message() {
    let server = StubServer::start(vec![(
        "/upload-sql",
        Reply::json(400, json!({"success": false, "message": "No file uploaded"})),
    )])
    .await;
    let mut bench = workbench();

    let notice = bench
        .apply_upload(server.client().upload_sql("a.sql", b"x".to_vec()).await);

    assert_eq!(notice.message, "No file uploaded");
    assert_eq!(bench.ddl(), USERS_DDL);
}
