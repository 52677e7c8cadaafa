// Social features: reputation, profile colours and matchmaking.

use crate::core::profiles::{Counter, ProfileUpdate, StoreError, UserRecord, UserStore};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SocialError {
    #[error("You have already done that today")]
    AlreadyRepped,

    #[error("You cannot {0} yourself")]
    SelfTarget(&'static str),

    #[error("`{0}` is not a hex colour")]
    InvalidColor(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// MATCHMAKING
// ============================================================================

/// 32-bit rolling string hash (`h = h * 31 + unit`) over UTF-16 code units.
pub fn name_hash(value: &str) -> i32 {
    value
        .encode_utf16()
        .fold(0i32, |hash, unit| {
            hash.wrapping_shl(5)
                .wrapping_sub(hash)
                .wrapping_add(i32::from(unit))
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compatibility {
    /// 0..=100
    pub score: u8,
    pub verdict: &'static str,
}

/// Deterministic compatibility between two names. Matching yourself is
/// always a perfect score.
pub fn compatibility(first: &str, second: &str, same_user: bool) -> Compatibility {
    if same_user {
        return Compatibility {
            score: 100,
            verdict: "💕 Love yourself",
        };
    }

    let sum = i64::from(name_hash(first)) + i64::from(name_hash(second));
    let score = (sum % 101).unsigned_abs() as u8;
    let verdict = match score {
        90..=u8::MAX => "💖 Matchmade in heaven",
        80..=89 => "❤️ The perfect couple",
        70..=79 => "🧡 Love doves",
        60..=69 => "💛 Cute together",
        50..=59 => "💜 Your average couple",
        40..=49 => "🤍 Will it work?",
        30..=39 => "💙 Questionable",
        20..=29 => "💚 A waste of time",
        10..=19 => "🤎 Bad investment",
        _ => "🖤 Natural disaster",
    };
    Compatibility { score, verdict }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// `#rrggbb`, case-insensitive.
pub fn is_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Same calendar day in UTC.
pub fn is_same_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}

// ============================================================================
// CORE SERVICE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepChange {
    Give,
    Take,
}

impl RepChange {
    pub fn delta(&self) -> i64 {
        match self {
            RepChange::Give => 1,
            RepChange::Take => -1,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            RepChange::Give => "rep",
            RepChange::Take => "unrep",
        }
    }
}

pub struct SocialService {
    store: Arc<dyn UserStore>,
    /// Not limited to one rep per day.
    exempt_user: Option<u64>,
}

impl SocialService {
    pub fn new(store: Arc<dyn UserStore>, exempt_user: Option<u64>) -> Self {
        Self { store, exempt_user }
    }

    /// Change `target`'s reputation on behalf of `giver`.
    ///
    /// Each giver gets one change per UTC day. Both writes are issued together;
    /// the first failure is returned.
    pub async fn change_rep(
        &self,
        giver: &UserRecord,
        target: u64,
        change: RepChange,
        now: DateTime<Utc>,
    ) -> Result<(), SocialError> {
        let exempt = self.exempt_user == Some(giver.id);
        if !exempt && giver.last_rep_at().is_some_and(|last| is_same_day(last, now)) {
            return Err(SocialError::AlreadyRepped);
        }
        if giver.id == target {
            return Err(SocialError::SelfTarget(change.verb()));
        }

        let (rep, last_rep) = tokio::join!(
            self.store.increment(target, Counter::Rep, change.delta()),
            self.store.overwrite(giver.id, ProfileUpdate::LastRep(now)),
        );
        rep?;
        last_rep?;

        tracing::info!(giver = giver.id, target, delta = change.delta(), "Updated reputation");
        Ok(())
    }

    pub async fn set_color(&self, user_id: u64, color: &str) -> Result<(), SocialError> {
        if !is_color(color) {
            return Err(SocialError::InvalidColor(color.to_string()));
        }
        self.store
            .overwrite(user_id, ProfileUpdate::Color(color.to_string()))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{RecordingStore, StoreOp};
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn name_hash_matches_known_values() {
        assert_eq!(name_hash(""), 0);
        assert_eq!(name_hash("a"), 97);
        assert_eq!(name_hash("hello"), 99_162_322);
        // Overflows wrap instead of panicking.
        assert_eq!(name_hash("polygenelubricants"), i32::MIN);
    }

    #[test]
    fn compatibility_is_symmetric_and_bounded() {
        let ab = compatibility("alice", "bob", false);
        let ba = compatibility("bob", "alice", false);
        assert_eq!(ab, ba);
        assert!(ab.score <= 100);
    }

    #[test]
    fn self_match_is_perfect() {
        let result = compatibility("alice", "alice", true);
        assert_eq!(result.score, 100);
        assert_eq!(result.verdict, "💕 Love yourself");
    }

    #[test]
    fn verdict_follows_score_tiers() {
        // "a" + "a" = 194, 194 % 101 = 93
        assert_eq!(compatibility("a", "a", false).score, 93);
        assert_eq!(compatibility("a", "a", false).verdict, "💖 Matchmade in heaven");
        // "" + "" = 0
        assert_eq!(compatibility("", "", false).verdict, "🖤 Natural disaster");
    }

    #[test]
    fn colors_must_be_six_hex_digits() {
        assert!(is_color("#0099ff"));
        assert!(is_color("#ABCDEF"));
        assert!(!is_color("0099ff"));
        assert!(!is_color("#09f"));
        assert!(!is_color("#0099fg"));
    }

    #[test]
    fn same_day_compares_dates_not_weekdays() {
        assert!(is_same_day(at(4, 1), at(4, 23)));
        assert!(!is_same_day(at(4, 23), at(5, 1)));
        // A week apart is the same weekday but a different day.
        assert!(!is_same_day(at(4, 12), at(11, 12)));
    }

    #[tokio::test]
    async fn rep_updates_target_and_giver() {
        let store = Arc::new(RecordingStore::default());
        let social = SocialService::new(store.clone(), None);

        social
            .change_rep(&UserRecord::new(1), 2, RepChange::Give, at(4, 12))
            .await
            .unwrap();

        let mutations = store.mutations();
        assert_eq!(mutations.len(), 2);
        assert!(mutations.contains(&StoreOp::Increment(2, Counter::Rep, 1)));
        assert!(mutations.contains(&StoreOp::Overwrite(1, ProfileUpdate::LastRep(at(4, 12)))));
    }

    #[tokio::test]
    async fn one_rep_per_day_unless_exempt() {
        let store = Arc::new(RecordingStore::default());
        let social = SocialService::new(store.clone(), Some(9));
        let mut giver = UserRecord::new(1);
        giver.last_rep = at(4, 8).timestamp_millis();

        let err = social
            .change_rep(&giver, 2, RepChange::Take, at(4, 20))
            .await
            .unwrap_err();
        assert!(matches!(err, SocialError::AlreadyRepped));
        assert!(store.mutations().is_empty());

        social
            .change_rep(&giver, 2, RepChange::Take, at(5, 0))
            .await
            .unwrap();

        let mut exempt = UserRecord::new(9);
        exempt.last_rep = at(5, 0).timestamp_millis();
        social
            .change_rep(&exempt, 2, RepChange::Give, at(5, 1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cannot_rep_yourself() {
        let store = Arc::new(RecordingStore::default());
        let social = SocialService::new(store.clone(), None);

        let err = social
            .change_rep(&UserRecord::new(1), 1, RepChange::Take, at(4, 12))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "You cannot unrep yourself");
        assert!(store.mutations().is_empty());
    }

    #[tokio::test]
    async fn colors_are_validated_before_writing() {
        let store = Arc::new(RecordingStore::default());
        let social = SocialService::new(store.clone(), None);

        assert!(social.set_color(1, "blue").await.is_err());
        social.set_color(1, "#112233").await.unwrap();

        assert_eq!(
            store.mutations(),
            [StoreOp::Overwrite(1, ProfileUpdate::Color("#112233".into()))]
        );
    }
}
