use crate::{Dialer, Result};
use portable_atomic::{AtomicUsize, Ordering};

/// Lends backend connections by dialing on demand.
///
/// This is a *sharded* pool: every acquired connection belongs to its
/// borrower for the borrower's whole lifetime. There is no check-in, so two
/// borrowers never contend for the same session.
#[derive(Debug)]
pub struct ConnectionPool<D> {
    dialer: D,
    dialed: AtomicUsize,
}

impl<D: Dialer> ConnectionPool<D> {
    pub const fn new(dialer: D) -> Self {
        Self {
            dialer,
            dialed: AtomicUsize::new(0),
        }
    }

    /// Dials a fresh connection.
    ///
    /// # Errors
    ///
    /// Propagates the dialer's [`Error::Dial`](crate::Error::Dial). The caller
    /// decides whether that aborts startup.
    pub async fn acquire(&self) -> Result<D::Conn> {
        let conn = self.dialer.dial().await?;
        self.dialed.fetch_add(1, Ordering::Relaxed);
        Ok(conn)
    }

    /// Number of connections successfully handed out so far.
    pub fn dialed(&self) -> usize {
        self.dialed.load(Ordering::Relaxed)
    }
}
