//! Application lifetime holds
//!
//! Every async span that must keep the process alive takes a guard; the
//! matching release happens when the guard is dropped, on every exit path.

use gtk4::gio;
use gtk4::gio::prelude::*;
use gtk4::glib;
use libadwaita as adw;

pub trait Lifecycle {
    type Guard;

    #[must_use]
    fn hold(&self) -> Self::Guard;
}

impl Lifecycle for adw::Application {
    type Guard = gio::ApplicationHoldGuard;

    fn hold(&self) -> Self::Guard {
        ApplicationExtManual::hold(self)
    }
}

/// Exit status decided by the run, reported by `main` after the loop ends.
#[derive(Clone, Default)]
pub struct ExitStatus(std::rc::Rc<std::cell::Cell<bool>>);

impl ExitStatus {
    pub fn fail(&self) {
        self.0.set(true);
    }

    pub fn failed(&self) -> bool {
        self.0.get()
    }

    pub fn code(&self) -> glib::ExitCode {
        if self.failed() {
            glib::ExitCode::FAILURE
        } else {
            glib::ExitCode::SUCCESS
        }
    }
}

#[cfg(test)]
pub mod testing {
    use super::Lifecycle;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Counts holds and releases.
    #[derive(Clone, Default)]
    pub struct CountingLifecycle {
        holds: Rc<Cell<usize>>,
        releases: Rc<Cell<usize>>,
    }

    impl CountingLifecycle {
        pub fn holds(&self) -> usize {
            self.holds.get()
        }

        pub fn releases(&self) -> usize {
            self.releases.get()
        }

        pub fn outstanding(&self) -> usize {
            self.holds() - self.releases()
        }
    }

    pub struct CountingGuard(Rc<Cell<usize>>);

    impl Drop for CountingGuard {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    impl Lifecycle for CountingLifecycle {
        type Guard = CountingGuard;

        fn hold(&self) -> CountingGuard {
            self.holds.set(self.holds.get() + 1);
            CountingGuard(self.releases.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::CountingLifecycle;
    use super::*;

    #[test]
    fn test_guard_releases_on_drop() {
        let lifecycle = CountingLifecycle::default();
        {
            let _first = lifecycle.hold();
            let _second = lifecycle.hold();
            assert_eq!(lifecycle.outstanding(), 2);
        }
        assert_eq!(lifecycle.holds(), 2);
        assert_eq!(lifecycle.releases(), 2);
    }

    #[test]
    fn test_guard_releases_on_early_return() {
        fn work(lifecycle: &CountingLifecycle, fail: bool) -> Result<(), ()> {
            let _hold = lifecycle.hold();
            if fail {
                return Err(());
            }
            Ok(())
        }

        let lifecycle = CountingLifecycle::default();
        assert!(work(&lifecycle, true).is_err());
        assert!(work(&lifecycle, false).is_ok());
        assert_eq!(lifecycle.outstanding(), 0);
    }

    #[test]
    fn test_exit_status() {
        let status = ExitStatus::default();
        assert!(!status.failed());
        status.clone().fail();
        assert!(status.failed());
    }
}
