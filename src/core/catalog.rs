use crate::domain::model::{Book, BookRef, Member, MemberRef};
use std::collections::HashMap;

/// 書籍與會員的擁有者。
///
/// ISBN 與會員 ID 允許重複：資料以插入順序存放，另外維護一份非唯一索引，
/// 查詢時回傳插入順序中的第一筆符合者。
#[derive(Debug, Default, Clone)]
pub struct CatalogStore {
    books: Vec<Book>,
    members: Vec<Member>,
    books_by_isbn: HashMap<String, Vec<usize>>,
    members_by_id: HashMap<String, Vec<usize>>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_book(
        &mut self,
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
    ) -> &Book {
        let book_ref = self.insert_book(Book::new(title, author, isbn));
        tracing::debug!(isbn = %self.books[book_ref.0].isbn, "Book added to catalog");
        &self.books[book_ref.0]
    }

    pub fn add_member(&mut self, name: impl Into<String>, member_id: impl Into<String>) -> &Member {
        let member_ref = self.insert_member(Member::new(name, member_id));
        tracing::debug!(member_id = %self.members[member_ref.0].member_id, "Member added to catalog");
        &self.members[member_ref.0]
    }

    /// 原樣放入一本書（保留 available 狀態），供載入時重建使用
    pub(crate) fn insert_book(&mut self, book: Book) -> BookRef {
        let index = self.books.len();
        self.books_by_isbn
            .entry(book.isbn.clone())
            .or_default()
            .push(index);
        self.books.push(book);
        BookRef(index)
    }

    pub(crate) fn insert_member(&mut self, member: Member) -> MemberRef {
        let index = self.members.len();
        self.members_by_id
            .entry(member.member_id.clone())
            .or_default()
            .push(index);
        self.members.push(member);
        MemberRef(index)
    }

    pub fn find_book_by_isbn(&self, isbn: &str) -> Option<&Book> {
        self.book_ref_by_isbn(isbn).map(|r| &self.books[r.0])
    }

    pub fn find_available_book_by_isbn(&self, isbn: &str) -> Option<&Book> {
        self.available_book_ref(isbn).map(|r| &self.books[r.0])
    }

    pub fn find_member_by_id(&self, member_id: &str) -> Option<&Member> {
        self.member_ref_by_id(member_id).map(|r| &self.members[r.0])
    }

    pub fn list_books(&self) -> &[Book] {
        &self.books
    }

    pub fn list_members(&self) -> &[Member] {
        &self.members
    }

    pub(crate) fn book_ref_by_isbn(&self, isbn: &str) -> Option<BookRef> {
        self.books_by_isbn
            .get(isbn)
            .and_then(|indices| indices.first())
            .map(|&i| BookRef(i))
    }

    pub(crate) fn available_book_ref(&self, isbn: &str) -> Option<BookRef> {
        self.book_refs_by_isbn(isbn)
            .find(|r| self.books[r.0].available)
    }

    /// 同一 ISBN 的所有副本，依插入順序
    pub(crate) fn book_refs_by_isbn<'a>(&'a self, isbn: &str) -> impl Iterator<Item = BookRef> + 'a {
        self.books_by_isbn
            .get(isbn)
            .into_iter()
            .flatten()
            .map(|&i| BookRef(i))
    }

    /// 同一會員 ID 的所有紀錄，依插入順序
    pub(crate) fn member_refs_by_id<'a>(
        &'a self,
        member_id: &str,
    ) -> impl Iterator<Item = MemberRef> + 'a {
        self.members_by_id
            .get(member_id)
            .into_iter()
            .flatten()
            .map(|&i| MemberRef(i))
    }

    /// 這本書在同一 ISBN 副本中的序號（從 0 開始）
    pub(crate) fn copy_index(&self, book_ref: BookRef) -> usize {
        self.book_refs_by_isbn(&self.books[book_ref.0].isbn)
            .position(|r| r == book_ref)
            .unwrap_or(0)
    }

    pub(crate) fn member_index(&self, member_ref: MemberRef) -> usize {
        self.member_refs_by_id(&self.members[member_ref.0].member_id)
            .position(|r| r == member_ref)
            .unwrap_or(0)
    }

    pub(crate) fn member_ref_by_id(&self, member_id: &str) -> Option<MemberRef> {
        self.members_by_id
            .get(member_id)
            .and_then(|indices| indices.first())
            .map(|&i| MemberRef(i))
    }

    pub fn book(&self, book_ref: BookRef) -> &Book {
        &self.books[book_ref.0]
    }

    pub fn member(&self, member_ref: MemberRef) -> &Member {
        &self.members[member_ref.0]
    }

    /// 只有借閱帳本會改動書籍的 available
    pub(crate) fn set_available(&mut self, book_ref: BookRef, available: bool) {
        self.books[book_ref.0].available = available;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_find_book() {
        let mut catalog = CatalogStore::new();
        let book = catalog.add_book("Dom Casmurro", "Machado de Assis", "A1");
        assert!(book.available);

        let found = catalog.find_book_by_isbn("A1").unwrap();
        assert_eq!(found.title, "Dom Casmurro");
        assert!(catalog.find_book_by_isbn("missing").is_none());
    }

    #[test]
    fn test_empty_catalog_lists_nothing() {
        let catalog = CatalogStore::new();
        assert!(catalog.list_books().is_empty());
        assert!(catalog.list_members().is_empty());
        assert!(catalog.find_member_by_id("M1").is_none());
    }

    #[test]
    fn test_duplicate_isbn_returns_first_match() {
        let mut catalog = CatalogStore::new();
        catalog.add_book("First", "Author", "DUP");
        catalog.add_book("Second", "Author", "DUP");

        assert_eq!(catalog.find_book_by_isbn("DUP").unwrap().title, "First");
        assert_eq!(catalog.list_books().len(), 2);
    }

    #[test]
    fn test_available_lookup_skips_copies_on_loan() {
        let mut catalog = CatalogStore::new();
        catalog.add_book("First", "Author", "DUP");
        catalog.add_book("Second", "Author", "DUP");

        let first = catalog.book_ref_by_isbn("DUP").unwrap();
        catalog.set_available(first, false);

        assert_eq!(catalog.find_available_book_by_isbn("DUP").unwrap().title, "Second");
        assert_eq!(catalog.find_book_by_isbn("DUP").unwrap().title, "First");

        let second = catalog.available_book_ref("DUP").unwrap();
        catalog.set_available(second, false);
        assert!(catalog.find_available_book_by_isbn("DUP").is_none());
    }

    #[test]
    fn test_copy_index_counts_within_isbn() {
        let mut catalog = CatalogStore::new();
        catalog.add_book("First", "Author", "DUP");
        catalog.add_book("Other", "Author", "X");
        catalog.add_book("Second", "Author", "DUP");
        catalog.add_member("Ana", "M1");
        catalog.add_member("Ana Clone", "M1");

        let copies: Vec<usize> = catalog
            .book_refs_by_isbn("DUP")
            .map(|r| catalog.copy_index(r))
            .collect();
        assert_eq!(copies, vec![0, 1]);
        assert_eq!(catalog.copy_index(catalog.book_ref_by_isbn("X").unwrap()), 0);

        let clone = catalog.member_refs_by_id("M1").nth(1).unwrap();
        assert_eq!(catalog.member_index(clone), 1);
    }

    #[test]
    fn test_empty_strings_are_accepted() {
        let mut catalog = CatalogStore::new();
        catalog.add_book("", "", "");
        catalog.add_member("", "");

        assert!(catalog.find_book_by_isbn("").is_some());
        assert!(catalog.find_member_by_id("").is_some());
    }

    #[test]
    fn test_members_keep_insertion_order() {
        let mut catalog = CatalogStore::new();
        catalog.add_member("Ana", "M1");
        catalog.add_member("Bruno", "M2");
        catalog.add_member("Ana Clone", "M1");

        let names: Vec<&str> = catalog.list_members().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Bruno", "Ana Clone"]);
        assert_eq!(catalog.find_member_by_id("M1").unwrap().name, "Ana");
    }
}
