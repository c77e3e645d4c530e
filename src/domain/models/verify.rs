//! Verification capability shared by supervisions and activity records.

use chrono::{DateTime, Utc};

/// Entities carrying a `verified` flag plus the timestamp of its last
/// transition. Verifying twice re-stamps the timestamp; clearing also
/// stamps it, so `verification_date` always reflects the latest change.
pub trait Verifiable {
    fn apply_verification(&mut self, verified: bool, at: DateTime<Utc>);

    fn verify(&mut self, at: DateTime<Utc>) {
        self.apply_verification(true, at);
    }

    fn clear_verification(&mut self, at: DateTime<Utc>) {
        self.apply_verification(false, at);
    }
}
