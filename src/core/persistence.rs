use crate::core::catalog::CatalogStore;
use crate::core::clock::{Clock, FIRST_DAY};
use crate::core::ledger::LoanLedger;
use crate::core::library::Library;
use crate::domain::model::{Book, BookRef, Day, Loan, Member, MemberRef, Money};
use crate::domain::ports::Storage;
use crate::utils::error::{LibraryError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 存檔的結構。借閱只記錄 ISBN、會員 ID 與副本序號，載入時再重新連結。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub books: Vec<Book>,
    pub members: Vec<Member>,
    pub loans: Vec<LoanRecord>,
    #[serde(default = "first_day")]
    pub current_day: Day,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRecord {
    pub book_isbn: String,
    /// 同一 ISBN 有多本副本時，借閱所屬副本的序號
    #[serde(default)]
    pub copy_index: Option<usize>,
    pub member_id: String,
    #[serde(default)]
    pub member_index: Option<usize>,
    pub loan_day: Day,
    pub due_day: Day,
    pub return_day: Option<Day>,
    #[serde(default)]
    pub fine: Money,
}

fn first_day() -> Day {
    FIRST_DAY
}

/// 載入過程中修正的項目
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// 找不到書或會員而捨棄的借閱
    pub dropped_loans: usize,
    /// available 與未歸還借閱不一致而修正的書籍
    pub repaired_books: usize,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        self.dropped_loans == 0 && self.repaired_books == 0
    }
}

#[derive(Debug)]
pub enum LoadOutcome {
    /// 沒有存檔，從第 1 天開始
    Fresh(Library),
    Restored { library: Library, report: RestoreReport },
    /// 存檔損毀，原始內容已備份，狀態完全重置
    Reset {
        library: Library,
        reason: String,
        backup_path: String,
    },
}

impl LoadOutcome {
    pub fn library(&self) -> &Library {
        match self {
            LoadOutcome::Fresh(library)
            | LoadOutcome::Restored { library, .. }
            | LoadOutcome::Reset { library, .. } => library,
        }
    }

    pub fn into_library(self) -> Library {
        match self {
            LoadOutcome::Fresh(library)
            | LoadOutcome::Restored { library, .. }
            | LoadOutcome::Reset { library, .. } => library,
        }
    }
}

impl Snapshot {
    pub fn capture(library: &Library, saved_at: Option<DateTime<Utc>>) -> Self {
        let catalog = library.catalog();
        let loans = library
            .list_loans()
            .iter()
            .map(|loan| LoanRecord {
                book_isbn: catalog.book(loan.book).isbn.clone(),
                copy_index: Some(catalog.copy_index(loan.book)),
                member_id: catalog.member(loan.member).member_id.clone(),
                member_index: Some(catalog.member_index(loan.member)),
                loan_day: loan.loan_day,
                due_day: loan.due_day,
                return_day: loan.return_day,
                fine: loan.fine,
            })
            .collect();

        Self {
            books: catalog.list_books().to_vec(),
            members: catalog.list_members().to_vec(),
            loans,
            current_day: library.current_day(),
            saved_at,
        }
    }

    /// 先重建書籍與會員，再依 ISBN／會員 ID（與副本序號）重新連結每筆借閱，
    /// 最後依未歸還借閱校正每本書的 available。
    pub fn restore(self) -> Result<(Library, RestoreReport)> {
        let clock = Clock::starting_at(self.current_day)?;
        let mut report = RestoreReport::default();

        let mut catalog = CatalogStore::new();
        for book in self.books {
            catalog.insert_book(book);
        }
        for member in self.members {
            catalog.insert_member(member);
        }

        let mut ledger = LoanLedger::new();
        let mut on_loan: HashSet<BookRef> = HashSet::new();
        for record in self.loans {
            let Some(member) = resolve_member(&catalog, &record) else {
                tracing::warn!(
                    member_id = %record.member_id,
                    isbn = %record.book_isbn,
                    "Dropping loan: member not found"
                );
                report.dropped_loans += 1;
                continue;
            };

            let book = resolve_book(&catalog, &record, &on_loan);
            let Some(book) = book else {
                tracing::warn!(
                    member_id = %record.member_id,
                    isbn = %record.book_isbn,
                    "Dropping loan: no matching book copy"
                );
                report.dropped_loans += 1;
                continue;
            };

            if record.return_day.is_none() {
                on_loan.insert(book);
            }
            ledger.restore(Loan {
                book,
                member,
                loan_day: record.loan_day,
                due_day: record.due_day,
                return_day: record.return_day,
                fine: record.fine,
            });
        }

        for index in 0..catalog.list_books().len() {
            let book = BookRef(index);
            let expected = !on_loan.contains(&book);
            if catalog.book(book).available != expected {
                tracing::warn!(
                    isbn = %catalog.book(book).isbn,
                    available = expected,
                    "Repairing book availability"
                );
                catalog.set_available(book, expected);
                report.repaired_books += 1;
            }
        }

        Ok((Library::from_parts(catalog, ledger, clock), report))
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;
        Ok(buffer)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| LibraryError::Corrupt {
            message: e.to_string(),
        })
    }
}

fn resolve_member(catalog: &CatalogStore, record: &LoanRecord) -> Option<MemberRef> {
    record
        .member_index
        .and_then(|i| catalog.member_refs_by_id(&record.member_id).nth(i))
        .or_else(|| catalog.member_ref_by_id(&record.member_id))
}

/// 優先使用存檔的副本序號；沒有序號（或該副本已被佔用）時，
/// 未歸還的借閱改連到尚未被佔用、且存檔中標記為已借出的副本
fn resolve_book(
    catalog: &CatalogStore,
    record: &LoanRecord,
    on_loan: &HashSet<BookRef>,
) -> Option<BookRef> {
    let open = record.return_day.is_none();
    let stored = record
        .copy_index
        .and_then(|i| catalog.book_refs_by_isbn(&record.book_isbn).nth(i))
        .filter(|r| !open || !on_loan.contains(r));
    if stored.is_some() {
        return stored;
    }

    if !open {
        return catalog.book_ref_by_isbn(&record.book_isbn);
    }
    let unclaimed: Vec<BookRef> = catalog
        .book_refs_by_isbn(&record.book_isbn)
        .filter(|r| !on_loan.contains(r))
        .collect();
    unclaimed
        .iter()
        .find(|r| !catalog.book(**r).available)
        .or_else(|| unclaimed.first())
        .copied()
}

/// 將 Library 存入／讀出單一資料檔
pub struct Persistence<S: Storage> {
    storage: S,
    path: String,
}

impl<S: Storage> Persistence<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub async fn save(&self, library: &Library) -> Result<()> {
        let snapshot = Snapshot::capture(library, Some(Utc::now()));
        let data = snapshot.to_json()?;
        self.storage.write_file(&self.path, &data).await?;
        tracing::info!(
            path = %self.path,
            books = snapshot.books.len(),
            members = snapshot.members.len(),
            loans = snapshot.loans.len(),
            "Library data saved"
        );
        Ok(())
    }

    /// 檔案不存在時回傳全新狀態；其他解析失敗回傳 Corrupt
    pub async fn load(&self) -> Result<LoadOutcome> {
        let Some(bytes) = self.read_raw().await? else {
            return Ok(LoadOutcome::Fresh(Library::new()));
        };
        let (library, report) = Snapshot::from_json(&bytes)?.restore()?;
        self.log_restored(&library, &report);
        Ok(LoadOutcome::Restored { library, report })
    }

    /// 與 `load` 相同，但存檔損毀時備份原始內容到 `<path>.corrupt`，並回到全新狀態
    pub async fn load_or_reset(&self) -> Result<LoadOutcome> {
        let Some(bytes) = self.read_raw().await? else {
            return Ok(LoadOutcome::Fresh(Library::new()));
        };

        match Snapshot::from_json(&bytes).and_then(Snapshot::restore) {
            Ok((library, report)) => {
                self.log_restored(&library, &report);
                Ok(LoadOutcome::Restored { library, report })
            }
            Err(LibraryError::Corrupt { message }) => {
                let backup_path = format!("{}.corrupt", self.path);
                self.storage.write_file(&backup_path, &bytes).await?;
                tracing::error!(
                    path = %self.path,
                    backup = %backup_path,
                    reason = %message,
                    "Library data is corrupt; starting from an empty state"
                );
                Ok(LoadOutcome::Reset {
                    library: Library::new(),
                    reason: message,
                    backup_path,
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn read_raw(&self) -> Result<Option<Vec<u8>>> {
        match self.storage.read_file(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(LibraryError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path, "No previous data found; starting fresh");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn log_restored(&self, library: &Library, report: &RestoreReport) {
        tracing::info!(
            path = %self.path,
            books = library.list_books().len(),
            members = library.list_members().len(),
            loans = library.list_loans().len(),
            current_day = library.current_day(),
            "Library data loaded"
        );
        if !report.is_clean() {
            tracing::warn!(
                dropped_loans = report.dropped_loans,
                repaired_books = report.repaired_books,
                "Library data needed repairs while loading"
            );
        }
    }
}
