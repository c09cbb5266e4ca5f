use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use thiserror::Error;

use crate::auth::Caller;

#[derive(Debug, Error)]
#[error("conversion limit reached for today")]
pub struct LimitExceeded;

/// Pre-condition gate: a rejected check means parsing never starts.
pub trait UsageGate: Send + Sync {
    fn check_and_count(&self, caller: &Caller) -> Result<(), LimitExceeded>;
}

/// Per-token daily counter. Counts reset when the UTC date rolls over.
pub struct DailyQuota {
    quota: u32,
    counts: Mutex<HashMap<String, (NaiveDate, u32)>>,
}

impl DailyQuota {
    pub fn new(quota: u32) -> Self {
        Self { quota, counts: Mutex::new(HashMap::new()) }
    }

    fn check_on(&self, caller: &Caller, today: NaiveDate) -> Result<(), LimitExceeded> {
        let mut counts = self.counts.lock().expect("usage counter poisoned");
        let entry = counts.entry(caller.token.clone()).or_insert((today, 0));
        if entry.0 != today {
            *entry = (today, 0);
        }
        if entry.1 >= self.quota {
            return Err(LimitExceeded);
        }
        entry.1 += 1;
        Ok(())
    }
}

impl UsageGate for DailyQuota {
    fn check_and_count(&self, caller: &Caller) -> Result<(), LimitExceeded> {
        self.check_on(caller, Utc::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(token: &str) -> Caller {
        Caller { token: token.to_string() }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn quota_enforced_per_token() {
        let gate = DailyQuota::new(2);
        let a = caller("a");
        assert!(gate.check_on(&a, day(1)).is_ok());
        assert!(gate.check_on(&a, day(1)).is_ok());
        assert!(gate.check_on(&a, day(1)).is_err());
        // Another token is unaffected.
        assert!(gate.check_on(&caller("b"), day(1)).is_ok());
    }

    #[test]
    fn quota_resets_on_date_change() {
        let gate = DailyQuota::new(1);
        let a = caller("a");
        assert!(gate.check_on(&a, day(1)).is_ok());
        assert!(gate.check_on(&a, day(1)).is_err());
        assert!(gate.check_on(&a, day(2)).is_ok());
    }
}
