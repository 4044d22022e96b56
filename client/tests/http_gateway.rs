//! Reqwest adapter tests against an in-process actix-web fake of the backend.

use std::sync::{Arc, Mutex};

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use household_client::domain::ports::{AuthGateway, AuthGatewayError, HouseGateway, LedgerGateway};
use household_client::domain::{
    AuthToken, LoginCredentials, ResourceId, RoomDraft, Transaction, TransactionDate,
};
use household_client::outbound::http::ApiClient;
use serde_json::{Value, json};
use url::Url;

const TOKEN: &str = "tok-1";

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    authorization: Option<String>,
    body: Value,
}

type Log = Mutex<Vec<Recorded>>;

struct FakeBackend {
    client: ApiClient,
    log: Arc<Log>,
    handle: ServerHandle,
}

impl FakeBackend {
    async fn start() -> Self {
        let log: Arc<Log> = Arc::new(Mutex::new(Vec::new()));
        let data = web::Data::from(Arc::clone(&log));
        let bound = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .default_service(web::to(respond))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind fake backend");
        let addr = bound
            .addrs()
            .first()
            .copied()
            .expect("bound address");
        let server = bound.run();
        let handle = server.handle();
        actix_rt::spawn(server);

        let base = Url::parse(&format!("http://{addr}/api")).expect("base url");
        Self {
            client: ApiClient::new(base, None).expect("client builds"),
            log,
            handle,
        }
    }

    fn recorded(&self) -> Vec<Recorded> {
        self.log.lock().expect("log lock").clone()
    }

    fn last(&self) -> Recorded {
        self.recorded().last().cloned().expect("a recorded request")
    }

    async fn stop(self) {
        self.handle.stop(true).await;
    }
}

async fn respond(req: HttpRequest, body: web::Bytes, log: web::Data<Log>) -> HttpResponse {
    let authorization = req
        .headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let parsed: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    log.lock().expect("log lock").push(Recorded {
        method: req.method().to_string(),
        path: req.path().to_owned(),
        authorization: authorization.clone(),
        body: parsed.clone(),
    });

    match (req.method().as_str(), req.path()) {
        ("POST", "/api/auth/login") => {
            if parsed["password"] == "secret" {
                HttpResponse::Ok().json(json!({ "token": TOKEN, "username": "Ada" }))
            } else {
                HttpResponse::Unauthorized().body("  Invalid username or password \n")
            }
        }
        ("POST", "/api/auth/register") => {
            if parsed["username"] == "taken" {
                HttpResponse::BadRequest().body("Username already exists")
            } else {
                HttpResponse::Ok().finish()
            }
        }
        _ if authorization.as_deref() != Some("Bearer tok-1") => {
            HttpResponse::Unauthorized().finish()
        }
        ("GET", "/api/RoomManager") => HttpResponse::Ok()
            .content_type("application/json")
            .body(
                r#"[
                    {"id": 1, "name": "Kitchen", "function": "Kitchen", "floor": 1, "area": "12,5"},
                    {"id": "b2", "name": "Hall", "floor": null}
                ]"#,
            ),
        ("POST", "/api/RoomManager") => HttpResponse::Ok().json(json!({
            "id": 3,
            "name": parsed["name"],
            "function": parsed["function"],
            "floor": parsed["floor"],
            "area": parsed["area"],
        })),
        ("GET", "/api/ColorTracker") => HttpResponse::Ok()
            .content_type("application/json")
            .body("<html>maintenance</html>"),
        ("GET", "/api/Dashboard/stats") => HttpResponse::Ok().json(json!({ "totalColors": 3 })),
        ("GET", "/api/BankImport") => {
            HttpResponse::InternalServerError().body("  database\n   down  ")
        }
        ("DELETE", path) if path.starts_with("/api/ColorTracker/") => {
            HttpResponse::NoContent().finish()
        }
        ("PUT", "/api/BankImport/7") | ("POST", "/api/BankImport/import") => {
            HttpResponse::Ok().finish()
        }
        _ => HttpResponse::NotFound().finish(),
    }
}

fn credentials(username: &str, password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts(username, password).expect("credentials")
}

fn token() -> AuthToken {
    AuthToken::new(TOKEN)
}

fn transaction(id: i64, category: &str) -> Transaction {
    Transaction {
        id: ResourceId::Number(id),
        date: TransactionDate::new("2023-10-20T00:00:00"),
        description: "ICA NARA".to_owned(),
        category: category.to_owned(),
        amount: -212.0,
    }
}

#[actix_rt::test]
async fn login_posts_credentials_without_bearer() {
    let backend = FakeBackend::start().await;

    let identity = backend
        .client
        .login(&credentials("ada", "secret"))
        .await
        .expect("login succeeds");

    assert_eq!(identity.username(), "Ada");
    assert_eq!(identity.token().expose(), TOKEN);
    let request = backend.last();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/api/auth/login");
    assert_eq!(request.authorization, None);
    assert_eq!(request.body, json!({ "username": "ada", "password": "secret" }));
    backend.stop().await;
}

#[actix_rt::test]
async fn login_rejection_carries_trimmed_backend_text() {
    let backend = FakeBackend::start().await;

    let error = backend
        .client
        .login(&credentials("ada", "wrong"))
        .await
        .expect_err("login rejected");

    assert_eq!(
        error,
        AuthGatewayError::rejected("Invalid username or password")
    );
    backend.stop().await;
}

#[actix_rt::test]
async fn register_conflict_is_rejected_with_message() {
    let backend = FakeBackend::start().await;

    let error = backend
        .client
        .register(&credentials("taken", "secret"))
        .await
        .expect_err("username taken");
    backend
        .client
        .register(&credentials("fresh", "secret"))
        .await
        .expect("registration succeeds");

    assert_eq!(error, AuthGatewayError::rejected("Username already exists"));
    assert_eq!(backend.last().path, "/api/auth/register");
    backend.stop().await;
}

#[actix_rt::test]
async fn room_listing_sends_bearer_and_tolerates_loose_fields() {
    let backend = FakeBackend::start().await;

    let rooms = backend
        .client
        .list_rooms(&token())
        .await
        .expect("rooms decode");

    assert_eq!(rooms.len(), 2);
    let kitchen = rooms.first().expect("kitchen");
    assert_eq!(kitchen.id, ResourceId::Number(1));
    assert_eq!(kitchen.floor, "1");
    assert_eq!(
        kitchen.area.map(|area| area.to_string()).as_deref(),
        Some("12.5")
    );
    let hall = rooms.get(1).expect("hall");
    assert_eq!(hall.id, ResourceId::parse("b2"));
    assert_eq!(hall.floor, "");
    assert_eq!(
        backend.last().authorization.as_deref(),
        Some("Bearer tok-1")
    );
    backend.stop().await;
}

#[actix_rt::test]
async fn room_creation_posts_the_draft() {
    let backend = FakeBackend::start().await;
    let draft = RoomDraft::try_new("Study")
        .expect("draft")
        .with_floor("2")
        .with_function("Office");

    let room = backend
        .client
        .create_room(&token(), &draft)
        .await
        .expect("room created");

    assert_eq!(room.id, ResourceId::Number(3));
    assert_eq!(room.name, "Study");
    let request = backend.last();
    assert_eq!(request.path, "/api/RoomManager");
    assert_eq!(request.body["floor"], "2");
    assert_eq!(request.body["function"], "Office");
    backend.stop().await;
}

#[actix_rt::test]
async fn rejected_token_is_reported_as_unauthorized() {
    let backend = FakeBackend::start().await;

    let error = backend
        .client
        .list_rooms(&AuthToken::new("expired"))
        .await
        .expect_err("token rejected");

    assert!(error.is_unauthorized());
    assert!(error.to_string().contains("Unauthorized"));
    backend.stop().await;
}

#[actix_rt::test]
async fn server_errors_carry_a_compacted_body_preview() {
    let backend = FakeBackend::start().await;

    let error = backend
        .client
        .list_transactions(&token())
        .await
        .expect_err("server error");

    assert_eq!(error.http_status(), Some(500));
    assert!(error.to_string().contains("database down"));
    backend.stop().await;
}

#[actix_rt::test]
async fn malformed_bodies_are_decode_errors() {
    let backend = FakeBackend::start().await;

    let error = backend
        .client
        .list_colors(&token())
        .await
        .expect_err("html is not a color list");

    assert_eq!(error.http_status(), None);
    assert!(error.to_string().contains("color list"));
    backend.stop().await;
}

#[actix_rt::test]
async fn deletes_address_the_canonical_id() {
    let backend = FakeBackend::start().await;

    backend
        .client
        .delete_color(&token(), &ResourceId::parse("c-42"))
        .await
        .expect("color deleted");

    let request = backend.last();
    assert_eq!(request.method, "DELETE");
    assert_eq!(request.path, "/api/ColorTracker/c-42");
    backend.stop().await;
}

#[actix_rt::test]
async fn transaction_update_sends_the_full_entity() {
    let backend = FakeBackend::start().await;

    backend
        .client
        .update_transaction(&token(), &transaction(7, "Entertainment"))
        .await
        .expect("update accepted");

    let request = backend.last();
    assert_eq!(request.method, "PUT");
    assert_eq!(request.path, "/api/BankImport/7");
    assert_eq!(
        request.body,
        json!({
            "id": 7,
            "date": "2023-10-20T00:00:00",
            "description": "ICA NARA",
            "category": "Entertainment",
            "amount": -212.0,
        })
    );
    backend.stop().await;
}

#[actix_rt::test]
async fn import_posts_the_batch_as_an_array() {
    let backend = FakeBackend::start().await;
    let batch = vec![transaction(7, "Groceries"), transaction(8, "Transport")];

    backend
        .client
        .import_transactions(&token(), &batch)
        .await
        .expect("import accepted");

    let request = backend.last();
    assert_eq!(request.path, "/api/BankImport/import");
    assert_eq!(request.body.as_array().map(Vec::len), Some(2));
    backend.stop().await;
}

#[actix_rt::test]
async fn dashboard_stats_decode() {
    let backend = FakeBackend::start().await;

    let stats = backend
        .client
        .dashboard_stats(&token())
        .await
        .expect("stats decode");

    assert_eq!(stats.total_colors, 3);
    assert_eq!(backend.recorded().len(), 1);
    backend.stop().await;
}
