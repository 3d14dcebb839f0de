//! Biz-Ops → Prometheus file_sd 转换
//!
//! One call to [`BizOpsDiscovery::write`] is one cycle: query Biz-Ops, group
//! and validate the health checks, serialize, and replace the document on disk.

pub mod error;
pub mod model;
pub mod writer;

use bizops::GraphQlClient;
use tracing::{debug, error, info, warn};

pub use error::DiscoveryError;
pub use sd_common::config::DISCOVERY_FILENAME;
pub use model::{
    DiscoveryDocument, GraphQlResponse, HEALTHCHECKS_QUERY, Healthcheck, LabelKey, Observe,
    System, TargetGroup,
};
pub use writer::{DocumentWriter, FileWriter, WriteError};

/// Fetch-transform-write pipeline over a registry client and a document writer
#[derive(Debug)]
pub struct BizOpsDiscovery<C, W> {
    client: C,
    writer: W,
}

impl<C, W> BizOpsDiscovery<C, W>
where
    C: GraphQlClient,
    W: DocumentWriter,
{
    pub fn new(client: C, writer: W) -> Self {
        Self { client, writer }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Query every health check from Biz-Ops
    pub async fn fetch(&self) -> Result<Vec<Healthcheck>, DiscoveryError> {
        let response: GraphQlResponse = self.client.query(HEALTHCHECKS_QUERY).await?;

        for graphql_error in &response.errors {
            warn!(
                event = "GRAPHQL_ERROR",
                message = %graphql_error.message,
                "Biz-Ops reported a GraphQL error."
            );
        }

        Ok(response.data.healthchecks)
    }

    /// Run one full cycle
    pub async fn write(&self) -> Result<(), DiscoveryError> {
        let healthchecks = self.fetch().await?;

        if healthchecks.is_empty() {
            let err = DiscoveryError::EmptyUpstreamResult;
            error!(event = "CONFIGURATION_EMPTY_HEALTHCHECKS", err = %err, "{err}");
            return Err(err);
        }

        let document = DiscoveryDocument::from_healthchecks(&healthchecks);

        if document.has_no_targets() {
            let err = DiscoveryError::EmptyValidatedResult;
            error!(
                event = "CONFIGURATION_EMPTY_PARSED_HEALTHCHECKS",
                err = %err,
                healthchecks = healthchecks.len(),
                "{err}"
            );
            return Err(err);
        }

        let payload = document.to_json()?;
        debug!(
            groups = document.len(),
            bytes = payload.len(),
            "Serialized discovery document"
        );

        match self.writer.write(&payload).await {
            Err(e) => {
                error!(
                    event = "CONFIGURATION_UPDATE_FAILED",
                    err = %e,
                    "Health check targets failed to update."
                );
                Err(e.into())
            }
            Ok(0) => {
                let err = DiscoveryError::EmptyWriteResult;
                error!(
                    event = "CONFIGURATION_UPDATE_EMPTY",
                    err = %err,
                    "Health check targets update wrote 0 bytes."
                );
                Err(err)
            }
            Ok(_) => {
                info!(
                    event = "CONFIGURATION_UPDATED",
                    target_count = healthchecks.len(),
                    "Health check targets have been updated."
                );
                Ok(())
            }
        }
    }
}
