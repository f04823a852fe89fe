//! Wall clock for the browser.

use navsync::Clock;

/// Epoch milliseconds from `Date.now()`; falls back to the system clock off
/// the browser so SSR and host tests still get real time.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    #[allow(clippy::cast_possible_truncation)]
    fn now_ms(&self) -> i64 {
        #[cfg(feature = "hydrate")]
        {
            js_sys::Date::now() as i64
        }
        #[cfg(not(feature = "hydrate"))]
        {
            navsync::SystemClock.now_ms()
        }
    }
}
