//! API key authentication
//!
//! A single shared secret guards `tools/call` and the REST tool routes.
//! Credentials arrive in an `X-API-Key` header, an `Authorization: Bearer`
//! header, or an `apiKey` field in the request body.

mod gate;

pub use gate::{body_credential, header_credential, ApiKeyGate, API_KEY_FIELD, API_KEY_HEADER};
