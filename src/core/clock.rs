use crate::domain::model::Day;
use crate::utils::error::{LibraryError, Result};

pub const FIRST_DAY: Day = 1;

/// 模擬的系統日期，只會因明確的 advance 而前進
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    day: Day,
}

impl Clock {
    pub fn new() -> Self {
        Self { day: FIRST_DAY }
    }

    /// 從存檔還原；小於第一天的值視為損毀
    pub(crate) fn starting_at(day: Day) -> Result<Self> {
        if day < FIRST_DAY {
            return Err(LibraryError::Corrupt {
                message: format!("currentDay must be at least {}, found {}", FIRST_DAY, day),
            });
        }
        Ok(Self { day })
    }

    pub fn current_day(&self) -> Day {
        self.day
    }

    pub fn advance(&mut self, by_days: i64) -> Result<Day> {
        if by_days <= 0 {
            return Err(LibraryError::InvalidDuration { days: by_days });
        }
        self.day = self
            .day
            .checked_add(by_days)
            .ok_or(LibraryError::InvalidDuration { days: by_days })?;
        tracing::debug!(by_days, day = self.day, "Clock advanced");
        Ok(self.day)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_day_one() {
        assert_eq!(Clock::new().current_day(), 1);
    }

    #[test]
    fn test_advance_accumulates() {
        let mut clock = Clock::new();
        assert_eq!(clock.advance(1).unwrap(), 2);
        assert_eq!(clock.advance(7).unwrap(), 9);
        assert_eq!(clock.current_day(), 9);
    }

    #[test]
    fn test_advance_rejects_non_positive() {
        let mut clock = Clock::new();
        assert!(matches!(
            clock.advance(0),
            Err(LibraryError::InvalidDuration { days: 0 })
        ));
        assert!(matches!(
            clock.advance(-3),
            Err(LibraryError::InvalidDuration { days: -3 })
        ));
        assert_eq!(clock.current_day(), 1);
    }

    #[test]
    fn test_advance_rejects_overflow() {
        let mut clock = Clock::starting_at(i64::MAX - 1).unwrap();
        assert!(clock.advance(5).is_err());
        assert_eq!(clock.current_day(), i64::MAX - 1);
    }

    #[test]
    fn test_restore_rejects_day_before_start() {
        assert!(Clock::starting_at(0).is_err());
        assert_eq!(Clock::starting_at(42).unwrap().current_day(), 42);
    }
}
