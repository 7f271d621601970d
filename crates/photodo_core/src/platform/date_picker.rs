//! Date selection surface provided by the host.

use async_trait::async_trait;
use chrono::NaiveDate;

/// Host date picker.
///
/// Resolves to `None` when the surface is dismissed without confirming
/// (e.g. an outside tap on Android); callers keep their current date then.
#[async_trait(?Send)]
pub trait DatePicker {
    async fn pick(&self, initial: NaiveDate) -> Option<NaiveDate>;
}
