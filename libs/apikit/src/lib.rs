//! HTTP plumbing shared by the server's modules.
//!
//! Every endpoint answers with the same envelopes:
//! - success: `{ "message"?: string, "data": <payload> }`
//! - failure: `{ "message": string, "error_code"?: string, "data"?: any }`
//!
//! Modules describe their failures once in a static catalog of [`ErrDef`]s and
//! turn them into [`ApiError`] responses in a single mapping function.

pub mod catalog;
pub mod envelope;
pub mod extract;
pub mod page;
pub mod request_id;
pub mod response;

pub use catalog::ErrDef;
pub use envelope::{ApiError, Envelope, ErrorEnvelope};
pub use extract::{ApiJson, ApiPath};
pub use page::Page;
pub use response::{created, ok, ok_with_message, ApiResult};
