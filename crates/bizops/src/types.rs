//! Biz-Ops API wire types

use serde::{Deserialize, Serialize};

/// GraphQL request body
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
}

/// Error envelope returned by the API gateway in front of Biz-Ops
///
/// Any JSON object counts; a missing `error` leaves the message empty.
#[derive(Debug, Deserialize)]
pub struct GatewayErrorEnvelope {
    #[serde(default)]
    pub error: String,
}
