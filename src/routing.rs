//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, employee_guard, employee_guard_hx, get_log_in_page,
        get_log_out, owner_guard, owner_guard_hx, post_log_in, post_log_in_api,
    },
    csv_import::{get_import_page, import_transactions},
    dashboard::{
        get_dashboard_redirect, get_employee_dashboard_page, get_owner_dashboard_page,
        get_owner_transactions,
    },
    employee::{create_employee_endpoint, get_create_employee_page},
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    transaction::{create_transaction_endpoint, get_create_transaction_page},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::AUTH_LOG_IN_API, post(post_log_in_api))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_redirect))
        .route(
            endpoints::EMPLOYEE_DASHBOARD_VIEW,
            get(get_employee_dashboard_page).layer(middleware::from_fn(employee_guard)),
        )
        .route(
            endpoints::NEW_TRANSACTION_VIEW,
            get(get_create_transaction_page).layer(middleware::from_fn(employee_guard)),
        )
        .route(
            endpoints::IMPORT_VIEW,
            get(get_import_page).layer(middleware::from_fn(employee_guard)),
        )
        .route(
            endpoints::OWNER_DASHBOARD_VIEW,
            get(get_owner_dashboard_page).layer(middleware::from_fn(owner_guard)),
        )
        .route(
            endpoints::NEW_EMPLOYEE_VIEW,
            get(get_create_employee_page).layer(middleware::from_fn(owner_guard)),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These routes are called by HTMX and need the HX-REDIRECT header for auth redirects to work.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(
                endpoints::TRANSACTIONS_API,
                post(create_transaction_endpoint).layer(middleware::from_fn(employee_guard_hx)),
            )
            .route(
                endpoints::IMPORT,
                post(import_transactions).layer(middleware::from_fn(employee_guard_hx)),
            )
            .route(
                endpoints::EMPLOYEES_API,
                post(create_employee_endpoint).layer(middleware::from_fn(owner_guard_hx)),
            )
            .route(
                endpoints::OWNER_TRANSACTIONS_API,
                get(get_owner_transactions).layer(middleware::from_fn(owner_guard_hx)),
            )
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}


#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_extra::extract::cookie::Cookie;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{AppState, DashboardConfig, InMemoryUserStore, endpoints, seed_mock_data};

    use super::build_router;

    const SESSION_COOKIE: &str = "session";

    fn get_test_server() -> TestServer {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let state = AppState::new(connection, "foobar", "Asia/Manila", DashboardConfig::default())
            .expect("Could not create app state")
            .with_user_store(Arc::new(InMemoryUserStore::new()))
            .with_password_hash_cost(4);

        {
            let connection = state.db_connection.lock().unwrap();
            seed_mock_data(&connection).expect("Could not seed mock data");
        }

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    async fn log_in(server: &TestServer, email: &str, role: &str) -> Cookie<'static> {
        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&[("email", email), ("password", "hunter2"), ("role", role)])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        response.cookie(SESSION_COOKIE)
    }

    #[tokio::test]
    async fn pages_redirect_to_log_in_without_session() {
        let server = get_test_server();

        for route in [
            endpoints::ROOT,
            endpoints::DASHBOARD_VIEW,
            endpoints::EMPLOYEE_DASHBOARD_VIEW,
            endpoints::OWNER_DASHBOARD_VIEW,
            endpoints::NEW_TRANSACTION_VIEW,
            endpoints::IMPORT_VIEW,
            endpoints::NEW_EMPLOYEE_VIEW,
        ] {
            let response = server.get(route).await;

            response.assert_status(StatusCode::SEE_OTHER);
            let location = response.header("location");
            assert!(
                location.to_str().unwrap().starts_with(endpoints::LOG_IN_VIEW),
                "want redirect to log in for {route}, got {location:?}"
            );
        }
    }

    #[tokio::test]
    async fn api_routes_hx_redirect_without_session() {
        let server = get_test_server();

        let response = server.get(endpoints::OWNER_TRANSACTIONS_API).await;

        response.assert_status_ok();
        let location = response.header("hx-redirect");
        assert!(location.to_str().unwrap().starts_with(endpoints::LOG_IN_VIEW));
    }

    #[tokio::test]
    async fn log_in_page_is_public() {
        let server = get_test_server();

        server.get(endpoints::LOG_IN_VIEW).await.assert_status_ok();
    }

    #[tokio::test]
    async fn dashboard_redirects_by_role() {
        let server = get_test_server();
        let employee_cookie = log_in(&server, "john@example.com", "employee").await;
        let owner_cookie = log_in(&server, "boss@example.com", "owner").await;

        let response = server
            .get(endpoints::DASHBOARD_VIEW)
            .add_cookie(employee_cookie)
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(
            response.header("location"),
            endpoints::EMPLOYEE_DASHBOARD_VIEW
        );

        let response = server
            .get(endpoints::DASHBOARD_VIEW)
            .add_cookie(owner_cookie)
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), endpoints::OWNER_DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn employees_cannot_open_owner_pages() {
        let server = get_test_server();
        let cookie = log_in(&server, "john@example.com", "employee").await;

        server
            .get(endpoints::EMPLOYEE_DASHBOARD_VIEW)
            .add_cookie(cookie.clone())
            .await
            .assert_status_ok();
        server
            .get(endpoints::IMPORT_VIEW)
            .add_cookie(cookie.clone())
            .await
            .assert_status_ok();
        server
            .get(endpoints::OWNER_DASHBOARD_VIEW)
            .add_cookie(cookie.clone())
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .post(endpoints::EMPLOYEES_API)
            .add_cookie(cookie)
            .form(&[("name", "Eve"), ("email", "eve@example.com")])
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn owners_cannot_open_employee_pages() {
        let server = get_test_server();
        let cookie = log_in(&server, "boss@example.com", "owner").await;

        server
            .get(endpoints::OWNER_DASHBOARD_VIEW)
            .add_cookie(cookie.clone())
            .await
            .assert_status_ok();
        server
            .get(endpoints::OWNER_TRANSACTIONS_API)
            .add_query_params([("type", "inbound")])
            .add_cookie(cookie.clone())
            .await
            .assert_status_ok();
        server
            .get(endpoints::NEW_TRANSACTION_VIEW)
            .add_cookie(cookie)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn owner_transactions_accept_empty_filters() {
        let server = get_test_server();
        let cookie = log_in(&server, "boss@example.com", "owner").await;

        server
            .get(endpoints::OWNER_TRANSACTIONS_API)
            .add_query_params([("employee", ""), ("type", ""), ("search", "")])
            .add_cookie(cookie)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn json_log_in_is_public() {
        let server = get_test_server();

        let response = server
            .post(endpoints::AUTH_LOG_IN_API)
            .json(&json!({"email": "api@example.com", "password": "hunter2"}))
            .await;

        response.assert_status_ok();
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        server
            .get("/does/not/exist")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
