pub mod catalog;
pub mod clock;
pub mod ledger;
pub mod library;
pub mod persistence;

pub use crate::domain::model::{Book, BookRef, Day, Loan, LoanStatus, Member, MemberRef, Money};
pub use crate::domain::ports::{ConfigProvider, Storage};
pub use crate::utils::error::Result;
