use tokio::sync::mpsc;

/// Terminal events a script element can fire. The timer is armed by the
/// loader, not the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptEvent {
    Load,
    Error,
}

/// The execution environment's script boundary: inject a script tag for a
/// URL and hand back its lifecycle handle.
pub trait ScriptHost: Send + Sync {
    fn inject(&self, url: &str) -> InjectedScript;
}

/// Handle to one injected script element. Only the first event is honored;
/// late duplicates go nowhere once the handle is detached.
pub struct InjectedScript {
    events: mpsc::UnboundedReceiver<ScriptEvent>,
    on_detach: Option<Box<dyn FnOnce() + Send>>,
}

impl InjectedScript {
    pub fn new(
        events: mpsc::UnboundedReceiver<ScriptEvent>,
        on_detach: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            events,
            on_detach: Some(Box::new(on_detach)),
        }
    }

    /// Waits for the first terminal event. `None` means the host dropped the
    /// script without firing anything.
    pub async fn completion(&mut self) -> Option<ScriptEvent> {
        self.events.recv().await
    }

    /// Removes the element and unregisters its handlers. Idempotent, and must
    /// run on every terminal path, including timeout.
    pub fn detach(&mut self) {
        if let Some(hook) = self.on_detach.take() {
            hook();
        }
        self.events.close();
    }
}

impl Drop for InjectedScript {
    fn drop(&mut self) {
        self.detach();
    }
}
