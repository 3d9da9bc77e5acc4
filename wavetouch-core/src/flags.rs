//! edge-event rendezvous between the touch scan task and its consumer

use core::future::poll_fn;
use core::sync::atomic::{AtomicU16, Ordering};
use core::task::Poll;

use embassy_sync::waitqueue::AtomicWaker;

/// One-bit-per-channel event flag group.
///
/// The scan task only sets bits (on released->touched edges); the
/// consumer only clears them, atomically, through [`consume`] or a
/// completed [`wait`]. A press is therefore reported exactly once no
/// matter how the two tasks interleave.
///
/// [`consume`]: EventFlags::consume
/// [`wait`]: EventFlags::wait
pub struct EventFlags {
    bits: AtomicU16,
    waker: AtomicWaker,
}

impl EventFlags {
    pub const fn new() -> Self {
        Self {
            bits: AtomicU16::new(0),
            waker: AtomicWaker::new(),
        }
    }

    /// Set the given bits and wake a pending waiter.
    pub fn post(&self, mask: u16) {
        self.bits.fetch_or(mask, Ordering::SeqCst);
        self.waker.wake();
    }

    /// Take all currently set bits, clearing the group. Zero means no
    /// event, never an error.
    pub fn consume(&self) -> u16 {
        self.bits.swap(0, Ordering::SeqCst)
    }

    /// Block until any bit is set, then consume and return the mask.
    ///
    /// Timeout-bounded pends are layered on top by the caller
    /// (`embassy_time::with_timeout`), keeping this primitive free of
    /// any clock dependency.
    pub async fn wait(&self) -> u16 {
        poll_fn(|cx| {
            let bits = self.consume();
            if bits != 0 {
                return Poll::Ready(bits);
            }
            self.waker.register(cx.waker());
            // recheck for a post that raced the registration
            let bits = self.consume();
            if bits != 0 {
                Poll::Ready(bits)
            } else {
                Poll::Pending
            }
        })
        .await
    }
}

impl Default for EventFlags {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use core::future::Future;
    use core::pin::pin;
    use core::task::{Context, Poll, Waker};

    #[test]
    fn consume_clears() {
        let flags = EventFlags::new();
        flags.post(1 << 3);
        flags.post(1 << 5);
        assert_eq!(flags.consume(), (1 << 3) | (1 << 5));
        assert_eq!(flags.consume(), 0);
    }

    #[test]
    fn wait_returns_pending_mask_immediately() {
        let flags = EventFlags::new();
        flags.post(1 << 2);

        let mut cx = Context::from_waker(Waker::noop());
        let mut fut = pin!(flags.wait());
        assert_eq!(fut.as_mut().poll(&mut cx), Poll::Ready(1 << 2));

        // no new touch: a second pend finds nothing
        let mut fut = pin!(flags.wait());
        assert_eq!(fut.as_mut().poll(&mut cx), Poll::Pending);
    }

    #[test]
    fn post_after_registration_completes_wait() {
        let flags = EventFlags::new();
        let mut cx = Context::from_waker(Waker::noop());
        let mut fut = pin!(flags.wait());
        assert_eq!(fut.as_mut().poll(&mut cx), Poll::Pending);

        flags.post(1);
        assert_eq!(fut.as_mut().poll(&mut cx), Poll::Ready(1));
    }
}
