use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Issues human-readable ticket ids of the form `TKT-<unix millis>`.
///
/// Ids are strictly increasing within a process even when several tickets are
/// opened in the same millisecond.
#[derive(Debug, Default)]
pub struct TicketIdGenerator {
    last: AtomicI64,
}

impl TicketIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A generator that never reissues any of `existing`, even if the clock
    /// is behind the newest of them
    pub fn seeded_from<'a>(existing: impl IntoIterator<Item = &'a str>) -> Self {
        let last = existing
            .into_iter()
            .filter_map(|id| id.strip_prefix("TKT-")?.parse::<i64>().ok())
            .max()
            .unwrap_or(0);

        Self {
            last: AtomicI64::new(last),
        }
    }

    pub fn next_id(&self) -> String {
        let now = Utc::now().timestamp_millis();
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(current + 1);
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return format!("TKT-{}", candidate),
                Err(actual) => current = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique_and_prefixed() {
        let ids = TicketIdGenerator::new();
        let issued: Vec<String> = (0..500).map(|_| ids.next_id()).collect();
        let unique: HashSet<&String> = issued.iter().collect();
        assert_eq!(unique.len(), issued.len());
        assert!(issued.iter().all(|id| id.starts_with("TKT-")));
    }

    #[test]
    fn test_seeded_generator_skips_past_loaded_ids() {
        // Far ahead of the clock, as after the clock steps back
        let ids = TicketIdGenerator::seeded_from(["TKT-1", "TKT-99999999999999", "legacy-7"]);
        assert_eq!(ids.next_id(), "TKT-100000000000000");
        assert_eq!(ids.next_id(), "TKT-100000000000001");
    }

    #[test]
    fn test_seeding_from_nothing_uses_the_clock() {
        let ids = TicketIdGenerator::seeded_from(std::iter::empty::<&str>());
        let issued: i64 = ids.next_id()["TKT-".len()..].parse().unwrap();
        assert!(issued >= Utc::now().timestamp_millis() - 1000);
    }

    #[test]
    fn test_ids_increase() {
        let ids = TicketIdGenerator::new();
        let a: i64 = ids.next_id()["TKT-".len()..].parse().unwrap();
        let b: i64 = ids.next_id()["TKT-".len()..].parse().unwrap();
        assert!(b > a);
    }
}
