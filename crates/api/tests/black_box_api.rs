use chrono::{Duration as ChronoDuration, Utc};
use gameshop_auth::{JwtClaims, PrincipalId, Role};
use gameshop_infra::Stores;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod over fresh in-memory stores, on an ephemeral port.
        let app = gameshop_api::app::build_app(JWT_SECRET.to_string(), Stores::in_memory());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(secret: &str, roles: Vec<Role>) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: PrincipalId::new(),
        roles,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

struct Client {
    http: reqwest::Client,
    token: String,
}

impl Client {
    fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            token: mint_jwt(JWT_SECRET, vec![Role::new("clerk")]),
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> (StatusCode, Value) {
        let res = req.bearer_auth(&self.token).send().await.unwrap();
        let status = res.status();
        let text = res.text().await.unwrap();
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap()
        };
        (status, body)
    }

    async fn create(&self, srv: &TestServer, kind: &str, body: Value) -> i64 {
        let (status, created) = self
            .send(self.http.post(srv.url(&format!("/catalog/{kind}"))).json(&body))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{created}");
        created["id"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn health_is_public_and_everything_else_needs_a_token() {
    let srv = TestServer::spawn().await;
    let http = reqwest::Client::new();

    let res = http.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = http.get(srv.url("/whoami")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = http
        .post(srv.url("/sales"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let forged = mint_jwt("other-secret", vec![Role::new("clerk")]);
    let res = http
        .get(srv.url("/whoami"))
        .bearer_auth(forged)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn whoami_reflects_token_claims() {
    let srv = TestServer::spawn().await;
    let client = Client::new();

    let (status, body) = client.send(client.http.get(srv.url("/whoami"))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["roles"].as_array().unwrap().iter().any(|r| r == "clerk"));
    assert!(body["principal_id"].as_str().is_some());
}

#[tokio::test]
async fn product_platform_links_are_idempotent_and_duplicate_safe() {
    let srv = TestServer::spawn().await;
    let client = Client::new();

    let zelda = client
        .create(&srv, "products", json!({"name": "Zelda", "price": 12990}))
        .await;
    let metroid = client
        .create(&srv, "products", json!({"name": "Metroid", "price": 9990}))
        .await;
    let switch = client.create(&srv, "platforms", json!({"name": "Switch"})).await;

    let (status, _) = client
        .send(client.http.get(srv.url(&format!("/products/{zelda}/platforms"))))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let link_url = srv.url(&format!("/products/{zelda}/platforms/{switch}"));
    let (status, record) = client.send(client.http.post(&link_url)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["product_id"], zelda);
    assert_eq!(record["platform_id"], switch);

    let (status, again) = client.send(client.http.post(&link_url)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(again["id"], record["id"]);

    let (status, _) = client
        .send(
            client
                .http
                .post(srv.url(&format!("/products/{metroid}/platforms/{switch}"))),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Re-pointing onto an existing pair is refused and changes nothing.
    let patch_url = srv.url(&format!(
        "/products/{zelda}/platforms/relations/{}",
        record["id"]
    ));
    let (status, body) = client
        .send(client.http.patch(&patch_url).json(&json!({"new_left_id": metroid})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, listed) = client
        .send(client.http.get(srv.url(&format!("/products/{zelda}/platforms"))))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["items"].as_array().unwrap().len(), 1);

    for _ in 0..2 {
        let (status, _) = client.send(client.http.delete(&link_url)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
    let (status, _) = client
        .send(client.http.get(srv.url(&format!("/products/{zelda}/platforms"))))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn association_routes_report_missing_entities_and_unknown_relations() {
    let srv = TestServer::spawn().await;
    let client = Client::new();

    let zelda = client
        .create(&srv, "products", json!({"name": "Zelda", "price": 12990}))
        .await;

    let (status, body) = client
        .send(client.http.post(srv.url(&format!("/products/{zelda}/genres/42"))))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = client
        .send(client.http.delete(srv.url(&format!("/products/{zelda}/genres/42"))))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = client
        .send(client.http.post(srv.url(&format!("/products/{zelda}/types/1"))))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = client
        .send(client.http.post(srv.url("/products/abc/genres/1")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_id");

    let (status, _) = client
        .send(
            client
                .http
                .patch(srv.url(&format!("/products/{zelda}/genres/relations/99")))
                .json(&json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn developer_types_partial_patch_keeps_other_side() {
    let srv = TestServer::spawn().await;
    let client = Client::new();

    let dev = client.create(&srv, "developers", json!({"name": "Retro"})).await;
    let first = client
        .create(&srv, "developer-types", json!({"name": "First party"}))
        .await;
    let second = client
        .create(&srv, "developer-types", json!({"name": "Second party"}))
        .await;

    let (status, record) = client
        .send(client.http.post(srv.url(&format!("/developers/{dev}/types/{first}"))))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, patched) = client
        .send(
            client
                .http
                .patch(srv.url(&format!("/developers/{dev}/types/relations/{}", record["id"])))
                .json(&json!({"new_right_id": second})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["id"], record["id"]);
    assert_eq!(patched["developer_id"], dev);
    assert_eq!(patched["developer_type_id"], second);
}

struct SaleFixture {
    buyer: i64,
    payment: i64,
    shipping: i64,
    status: i64,
    shipped: i64,
    zelda: i64,
    mario: i64,
}

async fn sale_fixture(srv: &TestServer, client: &Client) -> SaleFixture {
    SaleFixture {
        buyer: client.create(srv, "users", json!({"name": "ana"})).await,
        payment: client
            .create(srv, "payment-methods", json!({"name": "Debit"}))
            .await,
        shipping: client
            .create(srv, "shipping-methods", json!({"name": "Courier"}))
            .await,
        status: client
            .create(srv, "sale-statuses", json!({"name": "Pending"}))
            .await,
        shipped: client
            .create(srv, "sale-statuses", json!({"name": "Shipped"}))
            .await,
        zelda: client
            .create(srv, "products", json!({"name": "Zelda", "price": 12990}))
            .await,
        mario: client
            .create(srv, "products", json!({"name": "Mario", "price": 5000}))
            .await,
    }
}

fn sale_body(f: &SaleFixture, lines: Value) -> Value {
    json!({
        "buyer_id": f.buyer,
        "payment_method_id": f.payment,
        "shipping_method_id": f.shipping,
        "status_id": f.status,
        "date": "2024-05-01",
        "time": "14:30:00",
        "lines": lines,
    })
}

#[tokio::test]
async fn sale_lifecycle_with_frozen_prices() {
    let srv = TestServer::spawn().await;
    let client = Client::new();
    let f = sale_fixture(&srv, &client).await;

    let lines = json!([
        {"product_id": f.zelda, "quantity": 2, "unit_price": 12990},
        {"product_id": f.mario, "quantity": 1, "unit_price": 5000},
    ]);
    let (status, sale) = client
        .send(client.http.post(srv.url("/sales")).json(&sale_body(&f, lines)))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{sale}");
    assert_eq!(sale["total"], 30980);
    assert_eq!(sale["lines"][0]["subtotal"], 25980);
    let id = sale["id"].as_i64().unwrap();
    assert_eq!(sale["lines"][1]["sale_id"], id);

    // Catalog price change does not reach the recorded sale.
    let (status, _) = client
        .send(
            client
                .http
                .patch(srv.url(&format!("/catalog/products/{}", f.zelda)))
                .json(&json!({"price": 19990})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, loaded) = client
        .send(client.http.get(srv.url(&format!("/sales/{id}"))))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loaded["lines"][0]["unit_price_at_sale"], 12990);
    assert_eq!(loaded["total"], 30980);

    let (status, patched) = client
        .send(
            client
                .http
                .patch(srv.url(&format!("/sales/{id}")))
                .json(&json!({"status_id": f.shipped})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["status_id"], f.shipped);
    assert_eq!(patched["buyer_id"], f.buyer);
    assert_eq!(patched["lines"].as_array().unwrap().len(), 2);

    let (status, listed) = client.send(client.http.get(srv.url("/sales"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["items"].as_array().unwrap().len(), 1);

    let (status, _) = client
        .send(client.http.delete(srv.url(&format!("/sales/{id}"))))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = client
        .send(client.http.get(srv.url(&format!("/sales/{id}"))))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = client
        .send(client.http.delete(srv.url(&format!("/sales/{id}"))))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sale_create_rejects_bad_input_without_persisting() {
    let srv = TestServer::spawn().await;
    let client = Client::new();
    let f = sale_fixture(&srv, &client).await;

    let zero_qty = sale_body(
        &f,
        json!([{"product_id": f.zelda, "quantity": 0, "unit_price": 12990}]),
    );
    let (status, body) = client
        .send(client.http.post(srv.url("/sales")).json(&zero_qty))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let mut missing_status = sale_body(&f, json!([]));
    missing_status["status_id"] = json!(999);
    let (status, _) = client
        .send(client.http.post(srv.url("/sales")).json(&missing_status))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut bad_date = sale_body(&f, json!([]));
    bad_date["date"] = json!("01/05/2024");
    let (status, body) = client
        .send(client.http.post(srv.url("/sales")).json(&bad_date))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, listed) = client.send(client.http.get(srv.url("/sales"))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn catalog_deletes_blocked_by_sales() {
    let srv = TestServer::spawn().await;
    let client = Client::new();
    let f = sale_fixture(&srv, &client).await;

    let (status, _) = client
        .send(client.http.post(srv.url("/sales")).json(&sale_body(&f, json!([]))))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = client
        .send(
            client
                .http
                .delete(srv.url(&format!("/catalog/payment-methods/{}", f.payment))),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, body) = client
        .send(client.http.delete(srv.url(&format!("/catalog/users/{}", f.buyer))))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "state_error");

    let (status, _) = client
        .send(client.http.delete(srv.url(&format!("/catalog/products/{}", f.mario))))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = client
        .send(client.http.get(srv.url("/catalog/widgets")))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
