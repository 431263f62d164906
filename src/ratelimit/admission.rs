//! Admission check seam for the request pipeline.

use async_trait::async_trait;

use super::decision::Verdict;
use crate::error::Result;

/// The admission stage an upstream request pipeline composes in front of its
/// handlers.
///
/// The upstream layer supplies the client identity (its trust-boundary
/// decision) and the resource scope, and translates the verdict into
/// transport semantics: admitted proceeds, rejected becomes a
/// rate-limit-exceeded response with `Retry-After` set from the verdict.
#[async_trait]
pub trait AdmissionControl: Send + Sync {
    /// Record the attempt for (client, scope) and decide whether it proceeds.
    async fn check_and_record(
        &self,
        client_identity: &str,
        resource_scope: &str,
    ) -> Result<Verdict>;
}
