//! Thin layer over `gloo_net` shared by every feature that talks to the
//! server. Interpretation of what came back is kept free of browser types.

use gloo_net::http::{Request, RequestBuilder};
use serde::de::DeserializeOwned;
use web_sys::RequestCredentials;

use crate::error::RequestError;

pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";
pub const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

/// What the server sent back, before any interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub ok: bool,
    pub body: String,
}

/// JSON answers carrying a `success` flag and an optional explanation.
pub trait Acknowledgement {
    fn success(&self) -> bool;
    fn message(&self) -> Option<String>;
}

/// A same-origin POST marked as a programmatic request, so the server
/// answers with JSON instead of a redirect.
pub fn ajax_post(url: &str) -> RequestBuilder {
    Request::post(url)
        .header(REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE)
        .credentials(RequestCredentials::SameOrigin)
}

pub fn ajax_get(url: &str) -> RequestBuilder {
    Request::get(url)
        .header(REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE)
        .credentials(RequestCredentials::SameOrigin)
}

pub async fn send(request: Request) -> Result<RawResponse, RequestError> {
    let response = request.send().await?;
    read(response).await
}

pub async fn send_builder(builder: RequestBuilder) -> Result<RawResponse, RequestError> {
    let response = builder.send().await?;
    read(response).await
}

async fn read(response: gloo_net::http::Response) -> Result<RawResponse, RequestError> {
    let status = response.status();
    let ok = response.ok();
    let body = response.text().await?;
    Ok(RawResponse { status, ok, body })
}

/// Decodes a plain JSON payload; any non-success status is an error.
pub fn decode<T: DeserializeOwned>(raw: &RawResponse) -> Result<T, RequestError> {
    if !raw.ok {
        return Err(RequestError::Status(raw.status));
    }
    serde_json::from_str(&raw.body).map_err(|err| RequestError::Decode(err.to_string()))
}

/// Decodes a `{"success": ...}` payload.
///
/// A readable body with `success: false` is a rejection whatever the
/// status; an unreadable body on an error status is reported by status.
pub fn decode_acknowledged<T>(raw: &RawResponse) -> Result<T, RequestError>
where
    T: DeserializeOwned + Acknowledgement,
{
    match serde_json::from_str::<T>(&raw.body) {
        Ok(payload) if !payload.success() => Err(RequestError::Rejected {
            message: payload.message(),
        }),
        Ok(_) if !raw.ok => Err(RequestError::Status(raw.status)),
        Ok(payload) => Ok(payload),
        Err(_) if !raw.ok => Err(RequestError::Status(raw.status)),
        Err(err) => Err(RequestError::Decode(err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Ack {
        #[serde(default)]
        success: bool,
        #[serde(default)]
        error: Option<String>,
    }

    impl Acknowledgement for Ack {
        fn success(&self) -> bool {
            self.success
        }

        fn message(&self) -> Option<String> {
            self.error.clone()
        }
    }

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status,
            ok: (200..300).contains(&status),
            body: body.to_string(),
        }
    }

    #[test]
    fn acknowledged_success_passes_through() {
        let ack: Ack = decode_acknowledged(&raw(200, r#"{"success": true}"#)).unwrap();
        assert!(ack.success);
    }

    #[test]
    fn success_false_is_a_rejection_even_on_error_status() {
        let err = decode_acknowledged::<Ack>(&raw(400, r#"{"success": false}"#)).unwrap_err();
        assert_eq!(err, RequestError::Rejected { message: None });

        let err = decode_acknowledged::<Ack>(&raw(
            200,
            r#"{"success": false, "error": "Not authorized"}"#,
        ))
        .unwrap_err();
        assert_eq!(
            err,
            RequestError::Rejected {
                message: Some("Not authorized".to_string())
            }
        );
    }

    #[test]
    fn missing_success_flag_counts_as_rejection() {
        let err = decode_acknowledged::<Ack>(&raw(200, "{}")).unwrap_err();
        assert_eq!(err, RequestError::Rejected { message: None });
    }

    #[test]
    fn html_error_page_is_reported_by_status() {
        let err = decode_acknowledged::<Ack>(&raw(404, "<html>Not Found</html>")).unwrap_err();
        assert_eq!(err, RequestError::Status(404));
    }

    #[test]
    fn html_on_success_status_is_a_decode_error() {
        let err = decode_acknowledged::<Ack>(&raw(200, "<!doctype html>")).unwrap_err();
        assert!(matches!(err, RequestError::Decode(_)));
    }

    #[test]
    fn plain_decode_rejects_error_statuses() {
        let err = decode::<Vec<u32>>(&raw(500, "[1, 2]")).unwrap_err();
        assert_eq!(err, RequestError::Status(500));
        assert_eq!(decode::<Vec<u32>>(&raw(200, "[1, 2]")).unwrap(), vec![1, 2]);
    }
}
