/*!
 * Token bucket pacing for image provider calls.
 *
 * The bucket starts full with `burst` tokens and refills continuously at
 * `per_minute / 60` tokens per second. Time comes from `tokio::time`, so tests
 * can run with a paused clock.
 */

use log::debug;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    /// None when pacing is disabled
    bucket: Option<Mutex<Bucket>>,
    /// Maximum stored tokens
    capacity: f64,
    /// Tokens added per second
    refill_per_sec: f64,
}

impl RateLimiter {
    /// Allow `per_minute` calls per minute with bursts of `burst`
    ///
    /// `per_minute == 0` disables pacing.
    pub fn new(per_minute: u32, burst: u32) -> Self {
        if per_minute == 0 {
            return Self::unlimited();
        }

        let capacity = f64::from(burst.max(1));
        Self {
            bucket: Some(Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            })),
            capacity,
            refill_per_sec: f64::from(per_minute) / 60.0,
        }
    }

    /// A limiter that never waits
    pub fn unlimited() -> Self {
        Self {
            bucket: None,
            capacity: 0.0,
            refill_per_sec: 0.0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.bucket.is_some()
    }

    /// Take one token, waiting for the refill if the bucket is empty
    pub async fn acquire(&self) {
        let Some(bucket) = &self.bucket else {
            return;
        };

        // Holding the lock while sleeping keeps waiters in FIFO order
        let mut bucket = bucket.lock().await;
        self.refill(&mut bucket);

        if bucket.tokens < 1.0 {
            let wait = Duration::from_secs_f64((1.0 - bucket.tokens) / self.refill_per_sec);
            debug!("Rate limiter: waiting {:?}", wait);
            tokio::time::sleep(wait).await;
            self.refill(&mut bucket);
        }

        bucket.tokens = (bucket.tokens - 1.0).max(0.0);
    }

    fn refill(&self, bucket: &mut Bucket) {
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        bucket.last_refill = now;
    }
}
