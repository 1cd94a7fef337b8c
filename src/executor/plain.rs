//! Single-shot create, replace and overwrite.

use crate::cancellation::CancellationSignal;
use crate::error::{OpsError, OpsResult};
use crate::operations::{CreateOperation, ReplaceOperation};
use crate::results::{CreateResult, OperationResponse, ReplaceResult};
use crate::store::{Item, ItemResponse, ItemStore, StoreError};
use log::{debug, info, warn};

/// Wrap a successful store response. Without returned content the item as
/// submitted stands in for the stored one.
pub(crate) fn success<T, R>(
    response: ItemResponse<T>,
    submitted: T,
    wrap: impl FnOnce(T) -> R,
) -> OperationResponse<R> {
    OperationResponse {
        status_code: response.status_code,
        request_charge: response.request_charge,
        etag: response.etag,
        activity_id: response.activity_id,
        attempts: 1,
        result: wrap(response.resource.unwrap_or(submitted)),
    }
}

/// Classify a store failure, or give it back as an unrecovered error.
pub(crate) fn classified<R>(
    error: StoreError,
    classify: impl FnOnce(StoreError) -> Result<R, StoreError>,
) -> OpsResult<OperationResponse<R>> {
    let envelope = OperationResponse::from_failure(&error, ());
    match classify(error) {
        Ok(result) => Ok(envelope.map_result(|_| result)),
        Err(unclassified) => {
            warn!("Unclassified store failure: {}", unclassified);
            Err(OpsError::Store(unclassified))
        }
    }
}

pub(crate) async fn create<S, T>(
    store: &S,
    operation: CreateOperation<T>,
    cancel: &CancellationSignal,
) -> OpsResult<OperationResponse<CreateResult<T>>>
where
    S: ItemStore + ?Sized,
    T: Item,
{
    let CreateOperation {
        item,
        partition_key,
        request_options,
    } = operation;

    debug!("Creating item (partition key: {:?})", partition_key);

    match store
        .create_item(&item, partition_key.as_ref(), &request_options, cancel)
        .await
    {
        Ok(response) => {
            info!(
                "Created item (status {}, charge {})",
                response.status_code, response.request_charge
            );
            Ok(success(response, item, CreateResult::Success))
        }
        Err(error) => classified(error, CreateResult::classify),
    }
}

pub(crate) async fn replace<S, T>(
    store: &S,
    operation: ReplaceOperation<T>,
    cancel: &CancellationSignal,
) -> OpsResult<OperationResponse<ReplaceResult<T>>>
where
    S: ItemStore + ?Sized,
    T: Item,
{
    if operation.if_match_etag().is_none() {
        return Err(OpsError::missing_if_match(operation.id));
    }

    write(store, operation, cancel).await
}

pub(crate) async fn overwrite<S, T>(
    store: &S,
    operation: ReplaceOperation<T>,
    cancel: &CancellationSignal,
) -> OpsResult<OperationResponse<ReplaceResult<T>>>
where
    S: ItemStore + ?Sized,
    T: Item,
{
    write(store, operation, cancel).await
}

async fn write<S, T>(
    store: &S,
    operation: ReplaceOperation<T>,
    cancel: &CancellationSignal,
) -> OpsResult<OperationResponse<ReplaceResult<T>>>
where
    S: ItemStore + ?Sized,
    T: Item,
{
    // A blank tag is no precondition at all
    let if_match = operation.if_match_etag().cloned();
    let ReplaceOperation {
        item,
        id,
        partition_key,
        mut request_options,
    } = operation;
    request_options.if_match_etag = if_match;

    debug!(
        "Replacing item '{}' (if-match: {:?})",
        id, request_options.if_match_etag
    );

    match store
        .replace_item(&item, &id, partition_key.as_ref(), &request_options, cancel)
        .await
    {
        Ok(response) => {
            info!(
                "Replaced item '{}' (status {}, charge {})",
                id, response.status_code, response.request_charge
            );
            Ok(success(response, item, ReplaceResult::Success))
        }
        Err(error) => classified(error, ReplaceResult::classify),
    }
}
