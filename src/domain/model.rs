use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// 系統模擬時間的日數
pub type Day = i64;

/// 每逾期一天的罰金（以分計，0.50）
pub const FINE_PER_DAY: Money = Money::from_cents(50);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub isbn: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl Book {
    pub fn new(title: impl Into<String>, author: impl Into<String>, isbn: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            available: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub name: String,
    pub member_id: String,
}

impl Member {
    pub fn new(name: impl Into<String>, member_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            member_id: member_id.into(),
        }
    }
}

/// 指向 Catalog 內書籍的位置索引；書籍永不刪除，所以索引穩定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BookRef(pub(crate) usize);

/// 指向 Catalog 內會員的位置索引
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberRef(pub(crate) usize);

impl BookRef {
    pub fn index(self) -> usize {
        self.0
    }
}

impl MemberRef {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanStatus {
    Open,
    Closed,
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanStatus::Open => write!(f, "open"),
            LoanStatus::Closed => write!(f, "closed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    pub book: BookRef,
    pub member: MemberRef,
    pub loan_day: Day,
    pub due_day: Day,
    pub return_day: Option<Day>,
    pub fine: Money,
}

impl Loan {
    pub fn status(&self) -> LoanStatus {
        match self.return_day {
            None => LoanStatus::Open,
            Some(_) => LoanStatus::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        self.return_day.is_none()
    }

    /// 歸還日超過到期日的天數；尚未歸還或準時歸還時為 0
    pub fn overdue_days(&self) -> i64 {
        match self.return_day {
            Some(returned) => returned.saturating_sub(self.due_day).max(0),
            None => 0,
        }
    }
}

/// 以最小貨幣單位（分）儲存的金額，避免浮點誤差
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn times(self, factor: i64) -> Money {
        Money(self.0.saturating_mul(factor))
    }

    /// 檔案中以十進位金額（如 1.5）表示
    pub fn as_major_units(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn from_major_units(amount: f64) -> Money {
        Money((amount * 100.0).round() as i64)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_major_units())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        if !amount.is_finite() {
            return Err(serde::de::Error::custom("fine must be a finite number"));
        }
        Ok(Money::from_major_units(amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_loan(due_day: Day, return_day: Day) -> Loan {
        Loan {
            book: BookRef(0),
            member: MemberRef(0),
            loan_day: 1,
            due_day,
            return_day: Some(return_day),
            fine: Money::ZERO,
        }
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(150).to_string(), "1.50");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-250).to_string(), "-2.50");
        assert_eq!(Money::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_money_serializes_as_decimal_units() {
        let json = serde_json::to_string(&Money::from_cents(150)).unwrap();
        assert_eq!(json, "1.5");

        let parsed: Money = serde_json::from_str("0.5").unwrap();
        assert_eq!(parsed, Money::from_cents(50));

        let parsed: Money = serde_json::from_str("0").unwrap();
        assert!(parsed.is_zero());
    }

    #[test]
    fn test_overdue_days() {
        assert_eq!(closed_loan(10, 10).overdue_days(), 0);
        assert_eq!(closed_loan(10, 11).overdue_days(), 1);
        assert_eq!(closed_loan(10, 7).overdue_days(), 0);

        let mut open = closed_loan(10, 20);
        open.return_day = None;
        assert_eq!(open.overdue_days(), 0);
        assert_eq!(open.status(), LoanStatus::Open);
    }

    #[test]
    fn test_member_uses_camel_case_keys() {
        let member = Member::new("Ana", "M1");
        let value = serde_json::to_value(&member).unwrap();
        assert_eq!(value["memberId"], "M1");
        assert_eq!(value["name"], "Ana");
    }
}
