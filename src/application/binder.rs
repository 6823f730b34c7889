use crate::domain::{BindError, SubscriptionId};
use crate::host::HostWindow;

struct Binding {
    window: Box<dyn HostWindow>,
    subscription: SubscriptionId,
}

/// Attaches the orchestrator to at most one host window at a time.
#[derive(Default)]
pub(crate) struct SessionBinder {
    binding: Option<Binding>,
}

impl SessionBinder {
    pub fn bind(&mut self, mut window: Box<dyn HostWindow>) -> Result<(), BindError> {
        if self.binding.is_some() {
            return Err(BindError::AlreadyBound);
        }
        let subscription = window.subscribe();
        self.binding = Some(Binding {
            window,
            subscription,
        });
        Ok(())
    }

    /// Detaches the session subscription and hands the window back.
    pub fn unbind(&mut self) -> Option<Box<dyn HostWindow>> {
        let mut binding = self.binding.take()?;
        binding.window.unsubscribe(binding.subscription);
        Some(binding.window)
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn window_mut(&mut self) -> Option<&mut (dyn HostWindow + 'static)> {
        self.binding.as_mut().map(|binding| binding.window.as_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::{FakeWindow, HostCall, HostLog};

    #[test]
    fn test_second_bind_is_rejected() {
        let log = HostLog::default();
        let mut binder = SessionBinder::default();

        assert_eq!(binder.bind(Box::new(FakeWindow::new(&log))), Ok(()));
        assert_eq!(
            binder.bind(Box::new(FakeWindow::new(&log))),
            Err(BindError::AlreadyBound)
        );
        assert_eq!(log.calls(), vec![HostCall::Subscribe(SubscriptionId(1))]);
    }

    #[test]
    fn test_unbind_unsubscribes_once() {
        let log = HostLog::default();
        let mut binder = SessionBinder::default();
        binder.bind(Box::new(FakeWindow::new(&log))).unwrap();

        assert!(binder.unbind().is_some());
        assert!(binder.unbind().is_none());
        assert!(!binder.is_bound());
        assert_eq!(
            log.calls(),
            vec![
                HostCall::Subscribe(SubscriptionId(1)),
                HostCall::Unsubscribe(SubscriptionId(1)),
            ]
        );
    }
}
