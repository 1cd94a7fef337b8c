//! Optimistic-concurrency replace loop.
//!
//! Each attempt reads the item, runs the update function on it and writes
//! the result back pinned to the etag that read returned. A `412` on that
//! write means another writer got in between; while budget remains the stale
//! copy is dropped and the attempt starts over from a fresh read. Nothing
//! else is retried.

use super::plain::classified;
use crate::cancellation::CancellationSignal;
use crate::config::RetryConfig;
use crate::error::{OpsError, OpsResult};
use crate::operations::ConcurrentReplaceOperation;
use crate::results::{ConcurrentReplaceResult, OperationResponse};
use crate::store::{Item, ItemRequestOptions, ItemStore, status};
use log::{debug, info, warn};

pub(crate) async fn replace_concurrently<S, T, E>(
    store: &S,
    operation: ConcurrentReplaceOperation<T, E>,
    retry: &RetryConfig,
    cancel: &CancellationSignal,
) -> OpsResult<OperationResponse<ConcurrentReplaceResult<T, E>>>
where
    S: ItemStore + ?Sized,
    T: Item,
    E: Send + 'static,
{
    retry.validate()?;

    let ConcurrentReplaceOperation {
        id,
        partition_key,
        request_options,
        update,
    } = operation;
    let update = update.ok_or_else(|| OpsError::missing_update_function(&id))?;
    let partition_key = partition_key.as_ref();

    let mut remaining = retry.max_retry_count;
    let mut attempts = 0;
    let mut request_charge = 0.0;

    loop {
        attempts += 1;
        debug!(
            "Concurrent replace of '{}': attempt {} of {}",
            id, attempts, retry.max_retry_count
        );

        let read = match store.read_item::<T>(&id, partition_key, cancel).await {
            Ok(read) => read,
            Err(error) => {
                request_charge += error.request_charge();
                return classified(error, ConcurrentReplaceResult::classify).map(|response| {
                    OperationResponse {
                        request_charge,
                        attempts,
                        ..response
                    }
                });
            }
        };
        request_charge += read.request_charge;

        let current = read
            .resource
            .ok_or_else(|| OpsError::incomplete_response(&id, "item"))?;
        let read_etag = read
            .etag
            .filter(|etag| !etag.is_empty())
            .ok_or_else(|| OpsError::incomplete_response(&id, "etag"))?;

        let updated = match update(current, cancel.clone()).await {
            Ok(updated) => updated,
            Err(rejection) => {
                debug!("Update function rejected item '{}'; nothing written", id);
                return Ok(OperationResponse {
                    status_code: read.status_code,
                    request_charge,
                    etag: Some(read_etag),
                    activity_id: read.activity_id,
                    attempts,
                    result: ConcurrentReplaceResult::CustomError(rejection),
                });
            }
        };

        // The etag just read always wins over one supplied in the options
        let options = ItemRequestOptions {
            if_match_etag: Some(read_etag),
            ..request_options.clone()
        };

        match store
            .replace_item(&updated, &id, partition_key, &options, cancel)
            .await
        {
            Ok(written) => {
                request_charge += written.request_charge;
                info!(
                    "Replaced item '{}' after {} attempt(s) (charge {})",
                    id, attempts, request_charge
                );
                return Ok(OperationResponse {
                    status_code: written.status_code,
                    request_charge,
                    etag: written.etag,
                    activity_id: written.activity_id,
                    attempts,
                    result: ConcurrentReplaceResult::Success(
                        written.resource.unwrap_or(updated),
                    ),
                });
            }
            Err(error)
                if error.status() == Some(status::PRECONDITION_FAILED) && remaining > 1 =>
            {
                request_charge += error.request_charge();
                remaining -= 1;
                warn!(
                    "Item '{}' was modified concurrently; retrying ({} attempt(s) left)",
                    id, remaining
                );
            }
            Err(error) => {
                request_charge += error.request_charge();
                if error.status() == Some(status::PRECONDITION_FAILED) {
                    warn!(
                        "Giving up on item '{}' after {} conflicting attempt(s)",
                        id, attempts
                    );
                }
                return classified(error, ConcurrentReplaceResult::classify).map(|response| {
                    OperationResponse {
                        request_charge,
                        attempts,
                        ..response
                    }
                });
            }
        }
    }
}
