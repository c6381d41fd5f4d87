//! Running a service call inside one store transaction.

use tracing::warn;

use super::Error;
use super::ports::{Transaction, TransactionMode, UnitOfWork};

/// Open a transaction for one service call.
pub(crate) async fn open(
    store: &dyn UnitOfWork,
    mode: TransactionMode,
) -> Result<Box<dyn Transaction>, Error> {
    Ok(store.begin(mode).await?)
}

/// Commit after success, roll back after failure.
///
/// A failed rollback is logged and the original error returned.
pub(crate) async fn finish<T>(
    tx: Box<dyn Transaction>,
    outcome: Result<T, Error>,
) -> Result<T, Error> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(error) => {
            if let Err(rollback) = tx.rollback().await {
                warn!(error = %rollback, "rollback failed");
            }
            Err(error)
        }
    }
}
