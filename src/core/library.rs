use crate::core::catalog::CatalogStore;
use crate::core::clock::Clock;
use crate::core::ledger::{LoanEntry, LoanLedger};
use crate::domain::model::{Book, Day, Loan, Member};
use crate::utils::error::Result;

/// 整個系統的狀態：目錄、借閱帳本與時鐘。
///
/// 呈現層只透過這個結構操作核心；借出與歸還一律使用時鐘的目前日期。
#[derive(Debug, Default, Clone)]
pub struct Library {
    catalog: CatalogStore,
    ledger: LoanLedger,
    clock: Clock,
}

impl Library {
    /// 全新的狀態：第 1 天，沒有任何資料
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(catalog: CatalogStore, ledger: LoanLedger, clock: Clock) -> Self {
        Self {
            catalog,
            ledger,
            clock,
        }
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn current_day(&self) -> Day {
        self.clock.current_day()
    }

    pub fn advance(&mut self, by_days: i64) -> Result<Day> {
        self.clock.advance(by_days)
    }

    pub fn add_book(
        &mut self,
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
    ) -> &Book {
        self.catalog.add_book(title, author, isbn)
    }

    pub fn add_member(&mut self, name: impl Into<String>, member_id: impl Into<String>) -> &Member {
        self.catalog.add_member(name, member_id)
    }

    pub fn find_book_by_isbn(&self, isbn: &str) -> Option<&Book> {
        self.catalog.find_book_by_isbn(isbn)
    }

    pub fn find_available_book_by_isbn(&self, isbn: &str) -> Option<&Book> {
        self.catalog.find_available_book_by_isbn(isbn)
    }

    pub fn find_member_by_id(&self, member_id: &str) -> Option<&Member> {
        self.catalog.find_member_by_id(member_id)
    }

    pub fn list_books(&self) -> &[Book] {
        self.catalog.list_books()
    }

    pub fn list_members(&self) -> &[Member] {
        self.catalog.list_members()
    }

    pub fn borrow(&mut self, isbn: &str, member_id: &str, term_days: i64) -> Result<LoanEntry<'_>> {
        let today = self.clock.current_day();
        let loan = self
            .ledger
            .borrow(&mut self.catalog, isbn, member_id, term_days, today)?;
        Ok(entry_for(&self.catalog, loan))
    }

    pub fn return_book(&mut self, isbn: &str, member_id: &str) -> Result<LoanEntry<'_>> {
        let today = self.clock.current_day();
        let loan = self
            .ledger
            .return_book(&mut self.catalog, isbn, member_id, today)?;
        Ok(entry_for(&self.catalog, loan))
    }

    pub fn list_loans(&self) -> &[Loan] {
        self.ledger.list_loans()
    }

    pub fn loan_entries(&self) -> impl Iterator<Item = LoanEntry<'_>> {
        self.ledger.entries(&self.catalog)
    }

    pub fn open_loan_entries(&self) -> impl Iterator<Item = LoanEntry<'_>> {
        self.ledger.open_entries(&self.catalog)
    }
}

fn entry_for<'a>(catalog: &'a CatalogStore, loan: &'a Loan) -> LoanEntry<'a> {
    LoanEntry {
        loan,
        book: catalog.book(loan.book),
        member: catalog.member(loan.member),
    }
}
