//! Deadline-bounded collaborator calls.

use crate::gateway::{
    domain::{BackendOperation, Deadline},
    ports::{BackendCallError, BackendResult},
};
use std::future::Future;

/// Awaits a collaborator call, abandoning it once `deadline` passes.
///
/// Expiry is reported as [`BackendCallError::DeadlineExceeded`], separate from
/// failures the collaborator itself returned.
pub(crate) async fn bounded<T>(
    deadline: Deadline,
    operation: BackendOperation,
    call: impl Future<Output = BackendResult<T>>,
) -> Result<T, BackendCallError> {
    Ok(deadline.race(operation, call).await??)
}
