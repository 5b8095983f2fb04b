use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::*;

use messenger::{Error as MessengerError, ErrorKind as MessengerErrorKind};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(MessengerError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{}", self.0)
    }
}

impl Error {
    fn status(&self) -> (StatusCode, &'static str) {
        match self.0.error_kind {
            MessengerErrorKind::Upgrade => (StatusCode::BAD_REQUEST, "BAD REQUEST"),
            MessengerErrorKind::NoSuchConnection => (StatusCode::NOT_FOUND, "NO SUCH CONNECTION"),
            MessengerErrorKind::ConnectionClosed => (StatusCode::GONE, "CONNECTION CLOSED"),
            MessengerErrorKind::WriteTimeout => (StatusCode::GATEWAY_TIMEOUT, "GATEWAY TIMEOUT"),
            MessengerErrorKind::Transport => (StatusCode::BAD_GATEWAY, "BAD GATEWAY"),
            MessengerErrorKind::Serialization => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE ENTITY")
            }
            MessengerErrorKind::ShutDown => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE UNAVAILABLE")
            }
            MessengerErrorKind::Config => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR")
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = self.status();
        if status.is_server_error() {
            warn!("Request failed: {self}");
        } else {
            debug!("Request rejected: {self}");
        }
        (status, body).into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<MessengerError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
