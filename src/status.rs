//! HTTP status codes as a typed enum.
//!
//! Only the codes this service actually answers with. Use [`Status`] anywhere
//! a status code is accepted: `Response::status()`,
//! `Response::builder().status()`, or as a bare handler return value.
//!
//! ```rust
//! use contact_relay::{Response, Status};
//!
//! Response::status(Status::NoContent);
//!
//! Response::builder()
//!     .status(Status::BadRequest)
//!     .json(br#"{"success":false}"#.to_vec());
//! ```

use http::StatusCode;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                  // 200
    NoContent,           // 204

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,          // 400
    Forbidden,           // 403
    NotFound,            // 404
    MethodNotAllowed,    // 405
    ContentTooLarge,     // 413
    TooManyRequests,     // 429

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError, // 500
}

impl From<Status> for StatusCode {
    fn from(s: Status) -> StatusCode {
        match s {
            Status::Ok                  => StatusCode::OK,
            Status::NoContent           => StatusCode::NO_CONTENT,
            Status::BadRequest          => StatusCode::BAD_REQUEST,
            Status::Forbidden           => StatusCode::FORBIDDEN,
            Status::NotFound            => StatusCode::NOT_FOUND,
            Status::MethodNotAllowed    => StatusCode::METHOD_NOT_ALLOWED,
            Status::ContentTooLarge     => StatusCode::PAYLOAD_TOO_LARGE,
            Status::TooManyRequests     => StatusCode::TOO_MANY_REQUESTS,
            Status::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
