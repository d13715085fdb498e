/*!
 * Image acquisition and cache validation.
 *
 * - `validator`: decide whether a cached image is usable, deleting it if not
 * - `pipeline`: per-item CheckCache -> Fetch -> Commit state machine
 * - `rate_limit`: token bucket pacing for image provider calls
 */

pub use self::pipeline::{AcquisitionOutcome, ImageAcquisition, destination_path};
pub use self::rate_limit::RateLimiter;
pub use self::validator::is_valid;

pub mod pipeline;
pub mod rate_limit;
pub mod validator;
