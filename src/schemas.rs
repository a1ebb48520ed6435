use crate::errors::GenericError;
use actix_web::{FromRequest, HttpRequest};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct GenericResponse<D> {
    pub status: bool,
    pub customer_message: String,
    pub code: String,
    pub data: Option<D>,
}

impl<D: Serialize> GenericResponse<D> {
    pub fn success(message: &str, data: Option<D>) -> Self {
        Self {
            status: true,
            customer_message: String::from(message),
            code: String::from("200"),
            data,
        }
    }

    pub fn error(message: &str, code: &str, data: Option<D>) -> Self {
        Self {
            status: false,
            customer_message: String::from(message),
            code: String::from(code),
            data,
        }
    }
}

/// Per-request metadata sent by the dashboard client. The device id ties an
/// HTTP request to the caller's realtime channel session.
#[derive(Debug)]
pub struct RequestMetaData {
    pub device_id: String,
}

impl FromRequest for RequestMetaData {
    type Error = GenericError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_http::Payload) -> Self::Future {
        let device_id = req
            .headers()
            .get("x-device-id")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        ready(match device_id {
            Some(device_id) if !device_id.is_empty() => Ok(RequestMetaData { device_id }),
            _ => Err(GenericError::ValidationError(
                "x-device-id header is missing".to_string(),
            )),
        })
    }
}
