//! Serving documents over HTTP.
//!
//! These helpers are independent of any particular web framework; they work
//! on the [`http`] crate's request and response types.

use http::{
    header::{self, InvalidHeaderValue},
    HeaderMap, HeaderValue, Response, StatusCode,
};

use crate::{project::NotFoundOrForbidden, RenderError};

pub const JSON_LD_MEDIA_TYPE: &str = "application/ld+json";

/// JSON is always UTF-8, but saying so explicitly avoids guesswork by clients.
pub const JSON_LD_CONTENT_TYPE: &str = "application/ld+json; charset=utf-8";

/// Whether the request asks for JSON-LD explicitly.
///
/// Wildcards such as `*/*` do not count, and neither does a range
/// that has been given a quality of zero.
pub fn wants_json_ld(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(accepts_json_ld)
}

fn accepts_json_ld(range: &str) -> bool {
    let mut parts = range.split(';').map(str::trim);
    let Some(media_type) = parts.next() else {
        return false;
    };

    if !media_type.eq_ignore_ascii_case(JSON_LD_MEDIA_TYPE) {
        return false;
    }

    // q=0 means "not acceptable"
    !parts.any(|param| {
        param
            .split_once('=')
            .filter(|(name, _)| name.trim().eq_ignore_ascii_case("q"))
            .and_then(|(_, q)| q.trim().parse::<f32>().ok())
            .is_some_and(|q| q <= 0.0)
    })
}

pub fn json_ld_response(body: String) -> Response<String> {
    let mut response = Response::new(body);
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(JSON_LD_CONTENT_TYPE),
    );
    response
}

/// Maps a render failure to a plain-text response.
pub fn error_response(error: &RenderError) -> Response<String> {
    let status = match error {
        RenderError::NotFoundOrForbidden(NotFoundOrForbidden::NotFound { .. }) => {
            StatusCode::NOT_FOUND
        }
        RenderError::NotFoundOrForbidden(NotFoundOrForbidden::Forbidden { .. }) => {
            StatusCode::FORBIDDEN
        }
        RenderError::UnsupportedValueKind(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let mut response = Response::new(error.to_string());
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

/// Advertises the JSON-LD representation of the resource at `uri`,
/// so that clients which did not ask for it can find it.
pub fn with_alternate_link<B>(
    mut response: Response<B>,
    uri: &str,
) -> Result<Response<B>, InvalidHeaderValue> {
    let link = HeaderValue::from_str(&format!(
        r#"<{uri}>; rel="alternate"; type="{JSON_LD_MEDIA_TYPE}""#
    ))?;
    response.headers_mut().append(header::LINK, link);
    Ok(response)
}
