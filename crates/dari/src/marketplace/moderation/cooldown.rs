use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_APPEAL_COOLDOWN_HOURS: i64 = 24;
/// Ten years; longer windows are configuration mistakes.
pub const MAX_APPEAL_COOLDOWN_HOURS: i64 = 24 * 366 * 10;

/// Minimum spacing between two appeals by the same owner on the same listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppealCooldown {
    window: Duration,
}

impl Default for AppealCooldown {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_APPEAL_COOLDOWN_HOURS))
    }
}

impl AppealCooldown {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Window of `hours`, or `None` when negative or above
    /// [`MAX_APPEAL_COOLDOWN_HOURS`].
    pub fn from_hours(hours: i64) -> Option<Self> {
        if !(0..=MAX_APPEAL_COOLDOWN_HOURS).contains(&hours) {
            return None;
        }
        Duration::try_hours(hours).map(Self::new)
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// `Err(retry_at)` while the previous appeal is younger than the window.
    /// An appeal exactly one window old is accepted.
    pub fn check(
        &self,
        last_appeal: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<(), DateTime<Utc>> {
        match last_appeal {
            Some(last) if now - last < self.window => Err(last
                .checked_add_signed(self.window)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)),
            _ => Ok(()),
        }
    }
}
