use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use crate::config::Config;
use crate::db::DbPool;
use crate::handlers::{dashboard, documents};
use crate::storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub storage: Storage,
}

pub fn create_router(db: DbPool, config: Config) -> Router {
    let upload_dir = config.upload_dir.clone();
    let storage = Storage::new(&upload_dir);
    let state = AppState { db, storage };

    // No authentication on any route. The original deployment declared an
    // auth group with an empty handler, so nothing was ever enforced; that
    // stays an explicit, documented choice here.
    let document_routes = Router::new()
        .route(
            "/documents",
            get(documents::list_documents).post(documents::create_document),
        )
        .route(
            "/documents/:id",
            get(documents::show_document)
                .put(documents::update_document)
                .patch(documents::update_document)
                // POST kept for form clients that cannot PUT multipart
                .post(documents::update_document)
                .delete(documents::destroy_document),
        );

    Router::new()
        .route("/health", get(health_check))
        .route("/dashboard", get(dashboard::metrics))
        .merge(document_routes)
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;

    fn router_with(pool: DbPool) -> Router {
        let config = Config {
            database_url: String::new(),
            port: 0,
            upload_dir: "storage/uploads".to_string(),
        };
        create_router(pool, config)
    }

    // A lazy pool never connects, which is enough for the routes that do
    // not touch the database.
    fn test_router() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://postgres@localhost/lingodocs_test")
            .expect("lazy pool");
        router_with(pool)
    }

    #[tokio::test]
    async fn health_answers_ok() {
        let response = test_router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn dashboard_serves_static_metrics_envelope() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/dashboard")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["status"], true);
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["message"], "Details get successfully");
        assert_eq!(json["data"]["users"], 4200);
        assert_eq!(json["data"]["current_users"], 100);
        assert_eq!(json["data"]["active_users"], 685);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn extreme_page_values_reach_the_database_intact() {
        // page * per_page would overflow u32 here; the handler has to get
        // as far as the (unreachable) database instead of panicking first.
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/documents?page=4294967295&per_page=10")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    async fn seed_document(pool: &DbPool) -> i64 {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO documents (name, document, current_language, process_language) \
             VALUES ('Contract', 'uploads/contract.pdf', 'English', 'Spanish') RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();
        id
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn destroyed_document_leaves_listing_and_show(pool: DbPool) {
        let id = seed_document(&pool).await;
        let router = router_with(pool.clone());

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/documents/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // The row survives with deleted_at set; nothing is erased.
        let (deleted_at,): (Option<chrono::DateTime<chrono::Utc>>,) =
            sqlx::query_as("SELECT deleted_at FROM documents WHERE id = $1")
                .bind(id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(deleted_at.is_some());

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/documents/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/documents")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["data"]["total"], 0);
        assert_eq!(json["data"]["data"].as_array().unwrap().len(), 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn destroying_a_missing_document_is_not_found(pool: DbPool) {
        let response = router_with(pool)
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/documents/999999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], false);
        assert_eq!(json["message"], "Document not found");
    }
}
