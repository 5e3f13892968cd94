#![allow(dead_code)]

use product_service::{config::Config, connect, serve};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tokio::net::TcpListener;

pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub db: DatabaseConnection,
}

/// Starts the service on an ephemeral port over a fresh in-memory SQLite database.
pub async fn spawn_app() -> TestApp {
    let config = Config {
        database_url: "sqlite::memory:".to_owned(),
        pool_size: 1,
        setup_schema: true,
        port: 0,
    };

    let db = connect(&config).await.expect("Failed to connect to test database");
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");

    tokio::spawn(serve(listener, db.clone(), std::future::pending()));

    TestApp {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
        db,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn create_product(&self, payload: Value) -> i64 {
        let response = self
            .client
            .post(self.url("/products"))
            .json(&payload)
            .send()
            .await
            .expect("Failed to send create product request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body = response
            .json::<Value>()
            .await
            .expect("Failed to parse create product response JSON");

        body["id"].as_i64().expect("Id not found in create response")
    }

    pub async fn get_json(&self, path: &str) -> (reqwest::StatusCode, Value) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send get request");

        let status = response.status();
        let body = response
            .json::<Value>()
            .await
            .expect("Failed to parse response JSON");

        (status, body)
    }

    pub async fn product_ids(&self, path: &str) -> Vec<i64> {
        let (status, body) = self.get_json(path).await;
        assert_eq!(status, reqwest::StatusCode::OK);

        body.as_array()
            .expect("Expected a JSON array")
            .iter()
            .map(|product| product["id"].as_i64().expect("Product without id"))
            .collect()
    }
}
