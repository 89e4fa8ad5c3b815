//! Amadeus passthrough routes
//!
//! Routes are matched by path substring, so the service works behind a
//! prefixing proxy (`/api/amadeus/token`, `/dev/amadeus/token`, ...). Every
//! response is a JSON envelope with a `success` flag.

use std::collections::HashMap;
use std::convert::Infallible;

use http_body_util::Full;
use hyper::Method;
use hyper::Request;
use hyper::Response;
use hyper::StatusCode;
use hyper::Uri;
use hyper::body::Bytes;
use hyper::body::Incoming;
use log::debug;
use log::error;
use serde_json::Value;
use serde_json::json;
use skyfare_lib::AmadeusClient;
use skyfare_lib::api::FlightInspirationQuery;
use skyfare_lib::api::LocationQuery;
use skyfare_lib::api::LocationSubType;
use skyfare_lib::error::ApiError;
use skyfare_lib::error::Error;

/// Shared state of the request handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: AmadeusClient,
    pub frontend_url: String,
}

/// Serves one request.
pub async fn handle(req: Request<Incoming>, state: AppState) -> Result<Response<Full<Bytes>>, Infallible> {
    Ok(route(&state, req.method(), req.uri()).await)
}

/// Dispatches a request by method and URI.
pub async fn route(state: &AppState, method: &Method, uri: &Uri) -> Response<Full<Bytes>> {
    debug!("{} {}", method, uri);

    if method == Method::OPTIONS {
        return respond(state, StatusCode::NO_CONTENT, None);
    }

    let path = uri.path();
    let params = query_params(uri);

    if path.contains("/amadeus/token") {
        token(state).await
    } else if path.contains("/amadeus/flight-inspiration") {
        flight_inspiration(state, &params).await
    } else if path.contains("/amadeus/search-locations") {
        search_locations(state, &params).await
    } else {
        failure(state, StatusCode::NOT_FOUND, "Endpoint not found", None)
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn token(state: &AppState) -> Response<Full<Bytes>> {
    match state.client.token_provider().get_token().await {
        Ok(token) => success(
            state,
            json!({
                "success": true,
                "message": "Token obtained successfully",
                "token": token.preview(),
            }),
        ),
        Err(e) => {
            error!("Failed to obtain Amadeus token: {}", e);
            failure(
                state,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to obtain token",
                Some(error_text(&Error::Auth(e))),
            )
        }
    }
}

async fn flight_inspiration(state: &AppState, params: &HashMap<String, String>) -> Response<Full<Bytes>> {
    let (Some(origin), Some(departure_date)) = (params.get("origin"), params.get("departureDate")) else {
        return failure(
            state,
            StatusCode::BAD_REQUEST,
            "Origin and departureDate are required",
            None,
        );
    };

    let query = FlightInspirationQuery::new(origin, departure_date.clone());
    match state.client.flight_inspiration_json(&query).await {
        Ok(data) => success(state, json!({ "success": true, "data": data })),
        Err(e) => {
            error!("Flight inspiration for {} failed: {}", origin, e);
            failure(
                state,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch flight inspiration",
                Some(error_text(&e)),
            )
        }
    }
}

async fn search_locations(state: &AppState, params: &HashMap<String, String>) -> Response<Full<Bytes>> {
    let Some(keyword) = params.get("keyword") else {
        return failure(state, StatusCode::BAD_REQUEST, "Keyword is required", None);
    };

    let mut query = LocationQuery::new(keyword.clone());
    if let Some(sub_type) = params.get("subType") {
        match sub_type.parse::<LocationSubType>() {
            Ok(sub_type) => query = query.sub_type(sub_type),
            Err(e) => debug!("Ignoring subType: {}", e),
        }
    }
    if let Some(code) = params.get("countryCode") {
        query = query.country_code(code.clone());
    }
    if let Some(page) = params.get("page") {
        match page.parse::<u32>() {
            Ok(page) => query = query.page(page),
            Err(_) => debug!("Ignoring unparsable page {:?}", page),
        }
    }

    match state.client.search_locations_json(&query).await {
        Ok(data) => success(state, json!({ "success": true, "data": data })),
        Err(e) => {
            error!("Location search for {:?} failed: {}", keyword, e);
            failure(
                state,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to search locations",
                Some(error_text(&e)),
            )
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Non-empty query parameters.
fn query_params(uri: &Uri) -> HashMap<String, String> {
    url::form_urlencoded::parse(uri.query().unwrap_or("").as_bytes())
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Text of the `error` field for a failed upstream call.
fn error_text(e: &Error) -> String {
    match e {
        Error::Auth(_) => "Failed to authenticate with Amadeus API".to_string(),
        Error::Api(ApiError::Http { message, .. }) => {
            format!("Amadeus API request failed: {}", message)
        }
        other => format!("Amadeus API request failed: {}", other),
    }
}

fn success(state: &AppState, body: Value) -> Response<Full<Bytes>> {
    respond(state, StatusCode::OK, Some(body))
}

fn failure(
    state: &AppState,
    status: StatusCode,
    message: &str,
    error: Option<String>,
) -> Response<Full<Bytes>> {
    let mut body = json!({ "success": false, "message": message });
    if let Some(error) = error {
        body["error"] = Value::String(error);
    }
    respond(state, status, Some(body))
}

fn respond(state: &AppState, status: StatusCode, body: Option<Value>) -> Response<Full<Bytes>> {
    let body = body.map(|b| b.to_string()).unwrap_or_default();
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("application/json"),
    );
    headers.insert(
        hyper::header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        hyper::header::HeaderValue::from_static("true"),
    );
    match hyper::header::HeaderValue::from_str(&state.frontend_url) {
        Ok(origin) => {
            headers.insert(hyper::header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        }
        Err(_) => {
            headers.insert(
                hyper::header::ACCESS_CONTROL_ALLOW_ORIGIN,
                hyper::header::HeaderValue::from_static("*"),
            );
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use skyfare_lib::auth::StaticTokenProvider;
    use skyfare_lib::rate_limit::RetryConfig;

    use super::*;

    const TOKEN: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

    fn state() -> AppState {
        // Nothing listens on the discard port, so upstream calls fail fast.
        let client = AmadeusClient::builder()
            .base_url("http://127.0.0.1:9")
            .token_provider(StaticTokenProvider::new(TOKEN))
            .retry_config(RetryConfig::no_retry())
            .build()
            .unwrap();
        AppState {
            client,
            frontend_url: "http://localhost:5173".to_string(),
        }
    }

    async fn get(uri: &str) -> (StatusCode, Value, Response<Full<Bytes>>) {
        let response = route(&state(), &Method::GET, &uri.parse().unwrap()).await;
        let status = response.status();
        let (parts, body) = response.into_parts();
        let bytes = body.collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json, Response::from_parts(parts, Full::new(bytes)))
    }

    #[tokio::test]
    async fn test_token_preview() {
        let (status, body, _) = get("/api/amadeus/token").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Token obtained successfully");
        assert_eq!(body["token"], "abcdefghijklmnopqrst...");
    }

    #[tokio::test]
    async fn test_flight_inspiration_requires_params() {
        for uri in [
            "/amadeus/flight-inspiration",
            "/amadeus/flight-inspiration?origin=PAR",
            "/amadeus/flight-inspiration?origin=&departureDate=2026-11-01",
        ] {
            let (status, body, _) = get(uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["success"], false);
            assert_eq!(body["message"], "Origin and departureDate are required");
            assert!(body.get("error").is_none());
        }
    }

    #[tokio::test]
    async fn test_search_locations_requires_keyword() {
        let (status, body, _) = get("/amadeus/search-locations?subType=CITY").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Keyword is required");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_500() {
        let (status, body, _) =
            get("/amadeus/flight-inspiration?origin=PAR&departureDate=2026-11-01").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Failed to fetch flight inspiration");
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .starts_with("Amadeus API request failed")
        );

        let (status, body, _) = get("/amadeus/search-locations?keyword=par&page=abc").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Failed to search locations");
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let (status, body, _) = get("/amadeus/hotels").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "success": false, "message": "Endpoint not found" }));
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let (_, _, response) = get("/nothing").await;
        let headers = response.headers();
        assert_eq!(headers["Content-Type"], "application/json");
        assert_eq!(headers["Access-Control-Allow-Origin"], "http://localhost:5173");
        assert_eq!(headers["Access-Control-Allow-Credentials"], "true");
    }

    #[tokio::test]
    async fn test_preflight() {
        let response = route(&state(), &Method::OPTIONS, &"/amadeus/token".parse().unwrap()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()["Access-Control-Allow-Credentials"], "true");
    }

    #[test]
    fn test_error_text() {
        let api = Error::Api(ApiError::http(400, "No airport found for XXX"));
        assert_eq!(error_text(&api), "Amadeus API request failed: No airport found for XXX");

        let auth = Error::Auth(skyfare_lib::error::AuthError::InvalidCredentials);
        assert_eq!(error_text(&auth), "Failed to authenticate with Amadeus API");
    }
}
