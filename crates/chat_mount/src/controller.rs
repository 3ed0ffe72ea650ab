//! Supervises one widget mount: status indicator, secret fetch, handoff.
//!
//! Everything runs on the single UI thread, so shared state is held in
//! `Rc`/`RefCell`/`Cell`. At most one mount attempt is in flight at a time.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use async_trait::async_trait;
use log::{debug, error, info};

use crate::error::MountError;
use crate::machine::{ConnectionStatus, MountEvent, StateMachine};
use crate::options::{ApiOptions, ClientSecretProvider, Presentation, WidgetOptions};
use crate::secret_client::SecretSource;
use crate::surface::{unavailable_text, MountSurface, CONNECTING_TEXT};
use crate::widget::ChatWidget;

/// What happened to a [`LifecycleController::request_mount`] call that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    /// The widget received its secret and was attached; `Ready` follows on its signal.
    HandedOff,
    /// Another attempt is still running; this call did nothing.
    AlreadyInFlight,
    /// The status was not `Idle`; close the panel first.
    NotIdle(ConnectionStatus),
}

struct Inner {
    widget: Rc<dyn ChatWidget>,
    secrets: Rc<dyn SecretSource>,
    surface: Rc<dyn MountSurface>,
    presentation: Presentation,
    machine: RefCell<StateMachine>,
    in_flight: Cell<bool>,
}

/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct LifecycleController {
    inner: Rc<Inner>,
}

/// Single-slot lock for the mount attempt, released on every exit path.
struct MountGuard<'a> {
    slot: &'a Cell<bool>,
}

impl<'a> MountGuard<'a> {
    fn acquire(slot: &'a Cell<bool>) -> Option<Self> {
        if slot.replace(true) {
            None
        } else {
            Some(Self { slot })
        }
    }
}

impl Drop for MountGuard<'_> {
    fn drop(&mut self) {
        self.slot.set(false);
    }
}

/// Hands out the secret fetched during the mount once, then fetches a fresh
/// one through the controller's [`SecretSource`] on every later call.
struct RefreshingSecret {
    prefetched: RefCell<Option<String>>,
    owner: Weak<Inner>,
}

#[async_trait(?Send)]
impl ClientSecretProvider for RefreshingSecret {
    async fn get_client_secret(&self) -> Result<String, MountError> {
        let prefetched = self.prefetched.borrow_mut().take();
        if let Some(secret) = prefetched {
            return Ok(secret);
        }

        let inner = self
            .owner
            .upgrade()
            .ok_or_else(MountError::service_unavailable)?;
        debug!("[CK] refreshing client_secret");
        match inner.secrets.fetch_client_secret().await {
            Ok(secret) => {
                inner.mark_refreshed();
                Ok(secret)
            }
            Err(err) => {
                error!(
                    "[CK] client_secret refresh failed: {} (code: {})",
                    err,
                    err.diagnostic_code().unwrap_or("-")
                );
                inner.mark_refresh_failed(&err);
                Err(err)
            }
        }
    }
}

impl LifecycleController {
    pub fn new(
        widget: Rc<dyn ChatWidget>,
        secrets: Rc<dyn SecretSource>,
        surface: Rc<dyn MountSurface>,
    ) -> Self {
        Self::with_presentation(widget, secrets, surface, Presentation::default())
    }

    pub fn with_presentation(
        widget: Rc<dyn ChatWidget>,
        secrets: Rc<dyn SecretSource>,
        surface: Rc<dyn MountSurface>,
        presentation: Presentation,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                widget,
                secrets,
                surface,
                presentation,
                machine: RefCell::new(StateMachine::new()),
                in_flight: Cell::new(false),
            }),
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.inner.machine.borrow().state()
    }

    pub fn is_mount_in_flight(&self) -> bool {
        self.inner.in_flight.get()
    }

    /// Start a mount from `Idle`.
    ///
    /// Resolves once the widget has its secret (or the attempt failed); the
    /// transition to `Ready` happens later, on the widget's ready signal.
    pub async fn request_mount(&self) -> Result<MountOutcome, MountError> {
        let Some(_guard) = MountGuard::acquire(&self.inner.in_flight) else {
            debug!("Mount already in flight; ignoring request");
            return Ok(MountOutcome::AlreadyInFlight);
        };

        let started = self
            .inner
            .machine
            .borrow_mut()
            .handle_event(MountEvent::MountRequested);
        if let Err(e) = started {
            debug!("Mount request ignored: {}", e);
            return Ok(MountOutcome::NotIdle(self.status()));
        }

        let surface = &self.inner.surface;
        surface.show_panel();
        surface.set_status_text(CONNECTING_TEXT);
        surface.show_status();

        match self.hand_off().await {
            Ok(()) => Ok(MountOutcome::HandedOff),
            Err(err) => {
                error!(
                    "[CK] mount error: {} (code: {})",
                    err,
                    err.diagnostic_code().unwrap_or("-")
                );
                self.inner.mark_unavailable(&err);
                Err(err)
            }
        }
    }

    async fn hand_off(&self) -> Result<(), MountError> {
        let inner = &self.inner;
        inner.widget.await_definition().await?;

        let secret = inner.secrets.fetch_client_secret().await?;
        let api = ApiOptions::new(Rc::new(RefreshingSecret {
            prefetched: RefCell::new(Some(secret)),
            owner: Rc::downgrade(inner),
        }));
        let options = WidgetOptions::new(api, inner.presentation.clone());

        let weak: Weak<Inner> = Rc::downgrade(inner);
        inner.widget.on_ready(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.mark_ready();
            }
        }));

        inner.widget.configure(options)?;
        inner.surface.attach_widget();
        Ok(())
    }

    /// Hide the panel and status indicator and go back to `Idle`.
    ///
    /// An in-flight mount keeps running; its late signals are ignored.
    pub fn close(&self) {
        let surface = &self.inner.surface;
        surface.hide_panel();
        surface.hide_status();
        surface.set_status_text(CONNECTING_TEXT);

        let transition = self
            .inner
            .machine
            .borrow_mut()
            .handle_event(MountEvent::Closed);
        if let Ok(transition) = transition {
            debug!("Chat closed ({:?} -> {:?})", transition.from, transition.to);
        }
    }
}

impl Inner {
    fn mark_ready(&self) {
        let transition = self.machine.borrow_mut().handle_event(MountEvent::WidgetReady);
        match transition {
            Ok(_) => {
                self.surface.hide_status();
                info!("[CK] widget ready");
            }
            Err(e) => debug!("Ignoring widget ready signal: {}", e),
        }
    }

    fn mark_unavailable(&self, err: &MountError) {
        let transition = self.machine.borrow_mut().handle_event(MountEvent::MountFailed);
        match transition {
            Ok(_) => {
                self.surface.set_status_text(&unavailable_text(err.note()));
                self.surface.show_status();
            }
            Err(e) => debug!("Mount failure after close left status untouched: {}", e),
        }
    }

    fn mark_refreshed(&self) {
        if self.machine.borrow().state() == ConnectionStatus::Ready {
            self.surface.hide_status();
        }
    }

    /// Ready has no failure transition, so a refresh failure there only
    /// changes the indicator.
    fn mark_refresh_failed(&self, err: &MountError) {
        if self.machine.borrow().state() == ConnectionStatus::Ready {
            self.surface.set_status_text(&unavailable_text(err.note()));
            self.surface.show_status();
        } else {
            self.mark_unavailable(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WidgetError;
    use crate::surface::UNAVAILABLE_TEXT;
    use crate::widget::ReadyCallback;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct FakeSurface {
        panel_visible: Cell<bool>,
        status_visible: Cell<bool>,
        status_text: RefCell<String>,
        attached: Cell<u32>,
    }

    impl MountSurface for FakeSurface {
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
    struct FakeWidget {
        definition_missing: bool,
        configured: RefCell<Vec<WidgetOptions>>,
        ready: RefCell<Option<ReadyCallback>>,
    }

    impl FakeWidget {
        fn fire_ready(&self) {
            if let Some(callback) = self.ready.borrow_mut().take() {
                callback();
            }
        }
    }

    #[async_trait(?Send)]
    impl ChatWidget for FakeWidget {
        async fn await_definition(&self) -> Result<(), WidgetError> {
            if self.definition_missing {
                Err(WidgetError::Definition("not registered".into()))
            } else {
                Ok(())
            }
        }

        fn configure(&self, options: WidgetOptions) -> Result<(), WidgetError> {
            self.configured.borrow_mut().push(options);
            Ok(())
        }

        fn on_ready(&self, callback: ReadyCallback) {
            *self.ready.borrow_mut() = Some(callback);
        }
    }

    struct FakeSecrets {
        result: RefCell<Vec<Result<String, MountError>>>,
        gate: Option<Rc<Notify>>,
        calls: Cell<u32>,
    }

    impl FakeSecrets {
        fn returning(results: Vec<Result<String, MountError>>) -> Self {
            Self {
                result: RefCell::new(results),
                gate: None,
                calls: Cell::new(0),
            }
        }
    }

    #[async_trait(?Send)]
    impl SecretSource for FakeSecrets {
        async fn fetch_client_secret(&self) -> Result<String, MountError> {
            self.calls.set(self.calls.get() + 1);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.result
                .borrow_mut()
                .pop()
                .unwrap_or_else(|| Err(MountError::service_unavailable()))
        }
    }

    async fn secret_from(widget: &FakeWidget, index: usize) -> Result<String, MountError> {
        let options = widget.configured.borrow()[index].clone();
        options.api.get_client_secret().await
    }

    struct Harness {
        controller: LifecycleController,
        widget: Rc<FakeWidget>,
        secrets: Rc<FakeSecrets>,
        surface: Rc<FakeSurface>,
    }

    fn harness(widget: FakeWidget, secrets: FakeSecrets) -> Harness {
        let widget = Rc::new(widget);
        let secrets = Rc::new(secrets);
        let surface = Rc::new(FakeSurface::default());
        let controller = LifecycleController::new(widget.clone(), secrets.clone(), surface.clone());
        Harness {
            controller,
            widget,
            secrets,
            surface,
        }
    }

    #[tokio::test]
    async fn successful_mount_waits_for_ready_signal() {
        let h = harness(
            FakeWidget::default(),
            FakeSecrets::returning(vec![Ok("sk_abc".into())]),
        );

        let outcome = h.controller.request_mount().await.unwrap();
        assert_eq!(outcome, MountOutcome::HandedOff);
        assert_eq!(h.controller.status(), ConnectionStatus::Connecting);
        assert!(h.surface.status_visible.get());
        assert_eq!(*h.surface.status_text.borrow(), CONNECTING_TEXT);
        assert!(h.surface.panel_visible.get());
        assert_eq!(h.surface.attached.get(), 1);
        assert_eq!(secret_from(&h.widget, 0).await.unwrap(), "sk_abc");
        assert_eq!(h.secrets.calls.get(), 1);
        assert!(!h.controller.is_mount_in_flight());

        h.widget.fire_ready();
        assert_eq!(h.controller.status(), ConnectionStatus::Ready);
        assert!(!h.surface.status_visible.get());
    }

    #[tokio::test]
    async fn secret_failure_never_configures_or_attaches() {
        let h = harness(
            FakeWidget::default(),
            FakeSecrets::returning(vec![Err(MountError::ServiceUnavailable {
                code: Some("quota_exceeded".into()),
            })]),
        );

        let err = h.controller.request_mount().await.unwrap_err();
        assert!(matches!(err, MountError::ServiceUnavailable { .. }));
        assert_eq!(h.controller.status(), ConnectionStatus::Unavailable);
        assert!(h.widget.configured.borrow().is_empty());
        assert_eq!(h.surface.attached.get(), 0);
        assert!(h.surface.status_visible.get());
        assert_eq!(*h.surface.status_text.borrow(), UNAVAILABLE_TEXT);
        assert!(!h.surface.status_text.borrow().contains("quota"));
        assert!(!h.controller.is_mount_in_flight());
    }

    #[tokio::test]
    async fn missing_widget_definition_skips_secret_fetch() {
        let h = harness(
            FakeWidget {
                definition_missing: true,
                ..Default::default()
            },
            FakeSecrets::returning(vec![Ok("sk_abc".into())]),
        );

        let err = h.controller.request_mount().await.unwrap_err();
        assert!(matches!(err, MountError::Widget(_)));
        assert_eq!(h.secrets.calls.get(), 0);
        assert_eq!(h.surface.attached.get(), 0);
        assert_eq!(
            *h.surface.status_text.borrow(),
            unavailable_text(Some("widget unavailable"))
        );
    }

    #[tokio::test]
    async fn concurrent_request_is_suppressed() {
        let gate = Rc::new(Notify::new());
        let h = harness(
            FakeWidget::default(),
            FakeSecrets {
                gate: Some(gate.clone()),
                ..FakeSecrets::returning(vec![Ok("sk_abc".into())])
            },
        );

        let first = h.controller.request_mount();
        let second = async {
            let outcome = h.controller.request_mount().await;
            gate.notify_one();
            outcome
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first.unwrap(), MountOutcome::HandedOff);
        assert_eq!(second.unwrap(), MountOutcome::AlreadyInFlight);
        assert_eq!(h.secrets.calls.get(), 1);
        assert_eq!(h.widget.configured.borrow().len(), 1);
    }

    #[tokio::test]
    async fn failed_attempt_releases_guard() {
        let h = harness(
            FakeWidget::default(),
            // popped from the back: first call fails, second succeeds
            FakeSecrets::returning(vec![
                Ok("sk_second".into()),
                Err(MountError::service_unavailable()),
            ]),
        );

        assert!(h.controller.request_mount().await.is_err());
        assert!(!h.controller.is_mount_in_flight());

        // Unavailable must be closed before a new attempt.
        assert_eq!(
            h.controller.request_mount().await.unwrap(),
            MountOutcome::NotIdle(ConnectionStatus::Unavailable)
        );

        h.controller.close();
        assert_eq!(h.controller.request_mount().await.unwrap(), MountOutcome::HandedOff);
        assert_eq!(secret_from(&h.widget, 0).await.unwrap(), "sk_second");
    }

    #[tokio::test]
    async fn close_resets_surface_from_any_state() {
        let h = harness(
            FakeWidget::default(),
            FakeSecrets::returning(vec![Err(MountError::service_unavailable())]),
        );

        h.controller.close();
        assert_eq!(h.controller.status(), ConnectionStatus::Idle);

        let _ = h.controller.request_mount().await;
        assert_eq!(h.controller.status(), ConnectionStatus::Unavailable);

        h.controller.close();
        assert_eq!(h.controller.status(), ConnectionStatus::Idle);
        assert!(!h.surface.panel_visible.get());
        assert!(!h.surface.status_visible.get());
        assert_eq!(*h.surface.status_text.borrow(), CONNECTING_TEXT);
    }

    #[tokio::test]
    async fn ready_after_close_keeps_idle() {
        let h = harness(
            FakeWidget::default(),
            FakeSecrets::returning(vec![Ok("sk_abc".into())]),
        );

        h.controller.request_mount().await.unwrap();
        h.controller.close();
        h.widget.fire_ready();

        assert_eq!(h.controller.status(), ConnectionStatus::Idle);
        assert!(!h.surface.status_visible.get());
        assert!(!h.surface.panel_visible.get());
    }

    #[tokio::test]
    async fn failure_after_close_does_not_show_status() {
        let gate = Rc::new(Notify::new());
        let h = harness(
            FakeWidget::default(),
            FakeSecrets {
                gate: Some(gate.clone()),
                ..FakeSecrets::returning(vec![Err(MountError::service_unavailable())])
            },
        );

        let mount = h.controller.request_mount();
        let close_then_release = async {
            h.controller.close();
            gate.notify_one();
        };
        let (result, ()) = tokio::join!(mount, close_then_release);

        assert!(result.is_err());
        assert_eq!(h.controller.status(), ConnectionStatus::Idle);
        assert!(!h.surface.status_visible.get());
        assert!(!h.controller.is_mount_in_flight());
    }

    #[tokio::test]
    async fn custom_presentation_reaches_widget() {
        let widget = Rc::new(FakeWidget::default());
        let mut presentation = Presentation::default();
        presentation.locale = "fr-FR".to_string();

        let controller = LifecycleController::with_presentation(
            widget.clone(),
            Rc::new(FakeSecrets::returning(vec![Ok("sk_abc".into())])),
            Rc::new(FakeSurface::default()),
            presentation,
        );

        controller.request_mount().await.unwrap();
        assert_eq!(widget.configured.borrow()[0].presentation.locale, "fr-FR");
    }

    #[tokio::test]
    async fn close_from_ready_resets_surface() {
        let h = harness(
            FakeWidget::default(),
            FakeSecrets::returning(vec![Ok("sk_abc".into())]),
        );

        h.controller.request_mount().await.unwrap();
        h.widget.fire_ready();
        assert_eq!(h.controller.status(), ConnectionStatus::Ready);
        assert!(h.surface.panel_visible.get());

        h.surface.set_status_text("stale");
        h.controller.close();

        assert_eq!(h.controller.status(), ConnectionStatus::Idle);
        assert!(!h.surface.panel_visible.get());
        assert!(!h.surface.status_visible.get());
        assert_eq!(*h.surface.status_text.borrow(), CONNECTING_TEXT);
    }

    #[tokio::test]
    async fn remount_after_ready_rearms_ready_signal() {
        let h = harness(
            FakeWidget::default(),
            FakeSecrets::returning(vec![Ok("sk_second".into()), Ok("sk_first".into())]),
        );

        h.controller.request_mount().await.unwrap();
        h.widget.fire_ready();
        h.controller.close();

        assert_eq!(h.controller.request_mount().await.unwrap(), MountOutcome::HandedOff);
        assert_eq!(h.controller.status(), ConnectionStatus::Connecting);
        assert!(h.surface.status_visible.get());
        assert_eq!(h.widget.configured.borrow().len(), 2);
        assert_eq!(h.surface.attached.get(), 2);
        assert_eq!(secret_from(&h.widget, 1).await.unwrap(), "sk_second");

        h.widget.fire_ready();
        assert_eq!(h.controller.status(), ConnectionStatus::Ready);
        assert!(!h.surface.status_visible.get());
    }

    #[tokio::test]
    async fn widget_refresh_fetches_a_new_secret() {
        let h = harness(
            FakeWidget::default(),
            FakeSecrets::returning(vec![Ok("sk_renewed".into()), Ok("sk_initial".into())]),
        );

        h.controller.request_mount().await.unwrap();
        h.widget.fire_ready();

        assert_eq!(secret_from(&h.widget, 0).await.unwrap(), "sk_initial");
        assert_eq!(h.secrets.calls.get(), 1);

        assert_eq!(secret_from(&h.widget, 0).await.unwrap(), "sk_renewed");
        assert_eq!(h.secrets.calls.get(), 2);
        assert_eq!(h.controller.status(), ConnectionStatus::Ready);
        assert!(!h.surface.status_visible.get());
    }

    #[tokio::test]
    async fn failed_refresh_shows_unavailable_text() {
        let h = harness(
            FakeWidget::default(),
            FakeSecrets::returning(vec![
                Ok("sk_recovered".into()),
                Err(MountError::ServiceUnavailable {
                    code: Some("rate_limited".into()),
                }),
                Ok("sk_initial".into()),
            ]),
        );

        h.controller.request_mount().await.unwrap();
        h.widget.fire_ready();
        secret_from(&h.widget, 0).await.unwrap();

        let err = secret_from(&h.widget, 0).await.unwrap_err();
        assert_eq!(err.diagnostic_code(), Some("rate_limited"));
        assert!(h.surface.status_visible.get());
        assert_eq!(*h.surface.status_text.borrow(), UNAVAILABLE_TEXT);
        assert_eq!(h.controller.status(), ConnectionStatus::Ready);

        assert_eq!(secret_from(&h.widget, 0).await.unwrap(), "sk_recovered");
        assert!(!h.surface.status_visible.get());
    }

    #[tokio::test]
    async fn failed_refresh_before_ready_marks_unavailable() {
        let h = harness(
            FakeWidget::default(),
            FakeSecrets::returning(vec![
                Err(MountError::service_unavailable()),
                Ok("sk_initial".into()),
            ]),
        );

        h.controller.request_mount().await.unwrap();
        secret_from(&h.widget, 0).await.unwrap();
        assert!(secret_from(&h.widget, 0).await.is_err());

        assert_eq!(h.controller.status(), ConnectionStatus::Unavailable);
        assert_eq!(*h.surface.status_text.borrow(), UNAVAILABLE_TEXT);

        // A late ready signal no longer counts.
        h.widget.fire_ready();
        assert_eq!(h.controller.status(), ConnectionStatus::Unavailable);
    }

    #[tokio::test]
    async fn refresh_after_controller_dropped_fails() {
        let h = harness(
            FakeWidget::default(),
            FakeSecrets::returning(vec![Ok("sk_initial".into())]),
        );

        h.controller.request_mount().await.unwrap();
        let options = h.widget.configured.borrow()[0].clone();
        secret_from(&h.widget, 0).await.unwrap();
        drop(h);

        assert!(options.api.get_client_secret().await.is_err());
    }
}
