use async_trait::async_trait;

use crate::error::WidgetError;
use crate::options::WidgetOptions;

pub type ReadyCallback = Box<dyn FnOnce()>;

/// The embeddable chat widget, as seen by the lifecycle controller.
///
/// Implementations live on the UI thread, so nothing here needs to be `Send`.
#[async_trait(?Send)]
pub trait ChatWidget {
    /// Resolves once the widget's definition has been registered.
    async fn await_definition(&self) -> Result<(), WidgetError>;

    /// Hand the secret provider and presentation options to the widget.
    ///
    /// Each call starts a fresh initialization, so the same instance can be
    /// configured again on a later mount.
    fn configure(&self, options: WidgetOptions) -> Result<(), WidgetError>;

    /// Register `callback` to run once when the next initialization started by
    /// [`configure`](Self::configure) finishes. A later registration replaces
    /// an earlier one that has not fired yet.
    fn on_ready(&self, callback: ReadyCallback);
}
