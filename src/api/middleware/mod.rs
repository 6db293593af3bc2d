pub mod auth;
pub mod request_id;

pub use auth::{AdminCaller, AdminGuard, Caller, Capability, MaybeCaller, authorize};
pub use request_id::{RequestId, RequestIdMiddleware};
