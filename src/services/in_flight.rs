use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// "Operation in progress" flag for one pipeline stage. Acquiring hands out
/// a guard; the flag clears when the guard drops, whichever way the
/// operation ended.
#[derive(Clone, Default, Debug)]
pub struct InFlight {
    flag: Arc<AtomicBool>,
}

#[derive(Debug)]
pub struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// `None` while another operation holds the flag.
    pub fn try_acquire(&self) -> Option<InFlightGuard> {
        self.flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard {
                flag: self.flag.clone(),
            })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
