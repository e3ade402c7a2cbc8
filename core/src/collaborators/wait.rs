use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum WaitError {
    #[error("timeout value is negative: {0} ms")]
    NegativeTimeout(i64),
    #[error("wait interrupted after being asked to pause {0} ms")]
    Interrupted(i64),
}

#[derive(Debug)]
pub struct Waiter {
    signal: Receiver<()>,
}

#[derive(Debug, Clone)]
pub struct Interrupter {
    signal: Sender<()>,
}

impl Interrupter {
    /// Interrupts the current or next wait. Interrupts raised before that wait
    /// collapse into one. Returns false once the waiter is gone.
    pub fn interrupt(&self) -> bool {
        self.signal.send(()).is_ok()
    }
}

impl Waiter {
    pub fn pair() -> (Self, Interrupter) {
        let (tx, rx) = mpsc::channel();
        (Self { signal: rx }, Interrupter { signal: tx })
    }

    pub fn uninterruptible() -> Self {
        let (waiter, _) = Self::pair();
        waiter
    }

    pub fn wait(&self, millis: i64) -> Result<(), WaitError> {
        let millis_u64 = u64::try_from(millis).map_err(|_| WaitError::NegativeTimeout(millis))?;
        let timeout = Duration::from_millis(millis_u64);

        match self.signal.recv_timeout(timeout) {
            Ok(()) => {
                // Interrupts behave as a single pending flag.
                self.signal.try_iter().count();
                Err(WaitError::Interrupted(millis))
            }
            Err(RecvTimeoutError::Timeout) => Ok(()),
            Err(RecvTimeoutError::Disconnected) => {
                thread::sleep(timeout);
                Ok(())
            }
        }
    }
}
