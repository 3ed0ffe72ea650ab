#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use async_trait::async_trait;
use chat_mount::{ChatWidget, MountError, MountSurface, ReadyCallback, WidgetError, WidgetOptions};

#[derive(Default)]
pub struct RecordingSurface {
    pub panel_visible: Cell<bool>,
    pub status_visible: Cell<bool>,
    pub status_text: RefCell<String>,
    pub attached: Cell<u32>,
}

impl MountSurface for RecordingSurface {
    fn show_panel(&self) {
        self.panel_visible.set(true);
    }
    fn hide_panel(&self) {
        self.panel_visible.set(false);
    }
    fn show_status(&self) {
        self.status_visible.set(true);
    }
    fn hide_status(&self) {
        self.status_visible.set(false);
    }
    fn set_status_text(&self, text: &str) {
        *self.status_text.borrow_mut() = text.to_string();
    }
    fn attach_widget(&self) {
        self.attached.set(self.attached.get() + 1);
    }
}

#[derive(Default)]
pub struct RecordingWidget {
    pub configured: RefCell<Vec<WidgetOptions>>,
    ready: RefCell<Option<ReadyCallback>>,
}

impl RecordingWidget {
    pub fn fire_ready(&self) {
        if let Some(callback) = self.ready.borrow_mut().take() {
            callback();
        }
    }

    /// Ask the most recently configured options for a secret, the way the widget does.
    pub async fn request_secret(&self) -> Option<Result<String, MountError>> {
        let options = self.configured.borrow().last().cloned()?;
        Some(options.api.get_client_secret().await)
    }
}

#[async_trait(?Send)]
impl ChatWidget for RecordingWidget {
    async fn await_definition(&self) -> Result<(), WidgetError> {
        Ok(())
    }

    fn configure(&self, options: WidgetOptions) -> Result<(), WidgetError> {
        self.configured.borrow_mut().push(options);
        Ok(())
    }

    fn on_ready(&self, callback: ReadyCallback) {
        *self.ready.borrow_mut() = Some(callback);
    }
}
