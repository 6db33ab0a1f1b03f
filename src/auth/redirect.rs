//! Where to send a user after they log in.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

/// Only local paths are followed, and never back to the log-in or log-out routes.
fn is_safe_redirect_url(redirect_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    let path = redirect_url
        .split_once('?')
        .map_or(redirect_url, |(path, _)| path);

    ![endpoints::LOG_IN_VIEW, endpoints::LOG_IN_API, endpoints::LOG_OUT].contains(&path)
}

/// Reduce `raw_url` to a local path and query, or `None` if it should not be followed.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    let path_and_query = uri.path_and_query()?.as_str();
    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

/// The log-in page URL that returns the user to where `request` was headed.
///
/// HTMX requests to `/api` routes return to the page that made them, which
/// HTMX sends in the `HX-Current-URL` header.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let redirect_target = if request.uri().path().starts_with("/api") {
        redirect_target_from_hx_request(request)?
    } else {
        normalize_redirect_url(request.uri().path_and_query()?.as_str())?
    };

    build_log_in_redirect_url_from_target(&redirect_target)
}

/// The log-in page URL with `redirect_target` in the `redirect_url` query parameter.
pub fn build_log_in_redirect_url_from_target(redirect_target: &str) -> Option<String> {
    serde_urlencoded::to_string([("redirect_url", redirect_target)])
        .inspect_err(|error| {
            tracing::error!("Could not encode redirect URL {redirect_target}: {error}")
        })
        .ok()
        .map(|query| format!("{}?{}", endpoints::LOG_IN_VIEW, query))
}

fn redirect_target_from_hx_request(request: &Request) -> Option<String> {
    let headers = request.headers();
    let is_hx_request = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"));

    if !is_hx_request {
        tracing::warn!("Missing HX-Request header for /api request.");
        return None;
    }

    let Some(current_url) = headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())
    else {
        tracing::warn!("Missing HX-Current-URL header for /api request.");
        return None;
    };

    // HTMX sends the full URL, so only the path and query are kept.
    let redirect_url = current_url
        .parse::<Uri>()
        .ok()
        .and_then(|uri| uri.path_and_query().map(|pq| pq.as_str().to_owned()))
        .filter(|path_and_query| is_safe_redirect_url(path_and_query));

    if redirect_url.is_none() {
        tracing::warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    redirect_url
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, extract::Request};

    use crate::endpoints;

    use super::{build_log_in_redirect_url, normalize_redirect_url};

    #[test]
    fn keeps_local_paths() {
        assert_eq!(
            normalize_redirect_url("/dashboard/owner?type=inbound"),
            Some("/dashboard/owner?type=inbound".to_owned())
        );
    }

    #[test]
    fn rejects_external_and_auth_urls() {
        for url in [
            "https://evil.example.com/",
            "//evil.example.com",
            "dashboard",
            endpoints::LOG_IN_VIEW,
            endpoints::LOG_OUT,
        ] {
            assert_eq!(normalize_redirect_url(url), None, "{url} should be rejected");
        }
    }

    #[test]
    fn page_request_returns_to_page() {
        let request = Request::builder()
            .uri("/transactions/new")
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            Some(format!(
                "{}?redirect_url=%2Ftransactions%2Fnew",
                endpoints::LOG_IN_VIEW
            ))
        );
    }

    #[test]
    fn api_request_returns_to_current_page() {
        let request = Request::builder()
            .uri(endpoints::OWNER_TRANSACTIONS_API)
            .header("HX-Request", "true")
            .header(
                "HX-Current-URL",
                "http://localhost:3000/dashboard/owner?type=outbound",
            )
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            Some(format!(
                "{}?redirect_url=%2Fdashboard%2Fowner%3Ftype%3Doutbound",
                endpoints::LOG_IN_VIEW
            ))
        );
    }

    #[test]
    fn api_request_without_htmx_headers() {
        let request = Request::builder()
            .uri(endpoints::TRANSACTIONS_API)
            .body(Body::empty())
            .unwrap();

        assert_eq!(build_log_in_redirect_url(&request), None);
    }
}
