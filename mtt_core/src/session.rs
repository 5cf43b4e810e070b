//! Scoped ownership of an open link.

use std::ops::{Deref, DerefMut};

use mtt_traits::ActuatorLink;

use crate::error::Result;

/// Owns the link for the lifetime of one invocation and closes it on every
/// exit path. Close failures on drop are logged, not raised.
#[derive(Debug)]
pub struct LinkGuard<L: ActuatorLink> {
    link: L,
    closed: bool,
}

impl<L: ActuatorLink> LinkGuard<L> {
    pub fn new(link: L) -> Self {
        Self {
            link,
            closed: false,
        }
    }

    /// Close now and report the result. Later drops are no-ops.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.link
            .close()
            .map_err(|e| eyre::eyre!("closing link: {e}"))
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<L: ActuatorLink> Deref for LinkGuard<L> {
    type Target = L;

    fn deref(&self) -> &L {
        &self.link
    }
}

impl<L: ActuatorLink> DerefMut for LinkGuard<L> {
    fn deref_mut(&mut self) -> &mut L {
        &mut self.link
    }
}

impl<L: ActuatorLink> Drop for LinkGuard<L> {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            if let Err(e) = self.link.close() {
                tracing::warn!(error = %e, "link close failed");
            }
        }
    }
}
