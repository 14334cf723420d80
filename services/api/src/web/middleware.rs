//! services/api/src/web/middleware.rs
//!
//! Identity middleware for protecting routes.
//!
//! Authentication itself is an upstream concern: the gateway in front of
//! this service verifies the session and forwards the caller's identity in
//! the `x-student-id` / `x-reviewer-id` headers. The middleware here only
//! requires the right header for the route's role and makes the identity
//! available to handlers through request extensions.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// The authenticated student on student-facing routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudentId(pub Uuid);

/// The authenticated department-head reviewer on review routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewerId(pub Uuid);

fn header_uuid(req: &Request, name: &str) -> Result<Uuid, StatusCode> {
    let value = req
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;
    Uuid::parse_str(value).map_err(|_| StatusCode::UNAUTHORIZED)
}

/// Requires a student identity and inserts it into request extensions.
pub async fn require_student(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let student_id = header_uuid(&req, "x-student-id")?;
    req.extensions_mut().insert(StudentId(student_id));
    Ok(next.run(req).await)
}

/// Requires a reviewer identity and inserts it into request extensions.
pub async fn require_reviewer(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let reviewer_id = header_uuid(&req, "x-reviewer-id")?;
    req.extensions_mut().insert(ReviewerId(reviewer_id));
    Ok(next.run(req).await)
}
