use crate::core::catalog::CatalogStore;
use crate::domain::model::{Book, Day, Loan, LoanStatus, Member, Money, FINE_PER_DAY};
use crate::utils::error::{LibraryError, Result};

/// 借閱帳本：擁有所有借閱紀錄，負責借出、歸還與罰金計算
#[derive(Debug, Default, Clone)]
pub struct LoanLedger {
    loans: Vec<Loan>,
}

/// 借閱紀錄連同它指向的書籍與會員，供呈現層使用
#[derive(Debug, Clone, Copy)]
pub struct LoanEntry<'a> {
    pub loan: &'a Loan,
    pub book: &'a Book,
    pub member: &'a Member,
}

impl LoanEntry<'_> {
    pub fn status(&self) -> LoanStatus {
        self.loan.status()
    }
}

impl LoanLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 借出一本書。
    ///
    /// `term_days` 不做檢查：非正數也接受，到期日可能不晚於借出日。
    pub fn borrow(
        &mut self,
        catalog: &mut CatalogStore,
        isbn: &str,
        member_id: &str,
        term_days: i64,
        current_day: Day,
    ) -> Result<&Loan> {
        let book = catalog
            .available_book_ref(isbn)
            .ok_or_else(|| LibraryError::BookNotAvailable {
                isbn: isbn.to_string(),
            })?;
        let member = catalog
            .member_ref_by_id(member_id)
            .ok_or_else(|| LibraryError::MemberNotFound {
                member_id: member_id.to_string(),
            })?;

        catalog.set_available(book, false);
        let loan = Loan {
            book,
            member,
            loan_day: current_day,
            due_day: current_day.saturating_add(term_days),
            return_day: None,
            fine: Money::ZERO,
        };
        tracing::info!(
            isbn,
            member_id,
            loan_day = loan.loan_day,
            due_day = loan.due_day,
            "Loan opened"
        );
        self.loans.push(loan);
        Ok(&self.loans[self.loans.len() - 1])
    }

    pub fn return_book(
        &mut self,
        catalog: &mut CatalogStore,
        isbn: &str,
        member_id: &str,
        current_day: Day,
    ) -> Result<&Loan> {
        let position = self
            .loans
            .iter()
            .position(|loan| {
                loan.is_open()
                    && catalog.book(loan.book).isbn == isbn
                    && catalog.member(loan.member).member_id == member_id
            })
            .ok_or_else(|| LibraryError::LoanNotFound {
                isbn: isbn.to_string(),
                member_id: member_id.to_string(),
            })?;

        let loan = &mut self.loans[position];
        catalog.set_available(loan.book, true);
        loan.return_day = Some(current_day);
        loan.fine = compute_fine(loan.due_day, current_day);

        if loan.fine.is_zero() {
            tracing::info!(isbn, member_id, return_day = current_day, "Loan closed");
        } else {
            tracing::info!(
                isbn,
                member_id,
                return_day = current_day,
                overdue_days = loan.overdue_days(),
                fine = %loan.fine,
                "Loan closed late"
            );
        }
        Ok(&self.loans[position])
    }

    pub fn list_loans(&self) -> &[Loan] {
        &self.loans
    }

    pub fn open_loans(&self) -> impl Iterator<Item = &Loan> {
        self.loans.iter().filter(|loan| loan.is_open())
    }

    pub fn entries<'a>(&'a self, catalog: &'a CatalogStore) -> impl Iterator<Item = LoanEntry<'a>> {
        self.loans.iter().map(move |loan| LoanEntry {
            loan,
            book: catalog.book(loan.book),
            member: catalog.member(loan.member),
        })
    }

    pub fn open_entries<'a>(
        &'a self,
        catalog: &'a CatalogStore,
    ) -> impl Iterator<Item = LoanEntry<'a>> {
        self.open_loans().map(move |loan| LoanEntry {
            loan,
            book: catalog.book(loan.book),
            member: catalog.member(loan.member),
        })
    }

    /// 載入時直接放入已經重新連結好的借閱紀錄
    pub(crate) fn restore(&mut self, loan: Loan) {
        self.loans.push(loan);
    }
}

/// 到期日當天歸還不算逾期，之後每天 FINE_PER_DAY
pub fn compute_fine(due_day: Day, return_day: Day) -> Money {
    let overdue_days = return_day.saturating_sub(due_day).max(0);
    FINE_PER_DAY.times(overdue_days)
}
