use anyhow::Result;
use small_library::core::Money;
use small_library::{Library, LoadOutcome, LocalStorage, Persistence};
use tempfile::TempDir;

fn persistence_in(temp_dir: &TempDir) -> Persistence<LocalStorage> {
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    Persistence::new(storage, "library_data.json")
}

#[tokio::test]
async fn test_load_without_file_starts_fresh() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let persistence = persistence_in(&temp_dir);

    let outcome = persistence.load().await?;
    assert!(matches!(outcome, LoadOutcome::Fresh(_)));

    let library = outcome.into_library();
    assert_eq!(library.current_day(), 1);
    assert!(library.list_books().is_empty());
    assert!(library.list_members().is_empty());
    assert!(library.list_loans().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_round_trip_through_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let persistence = persistence_in(&temp_dir);

    let mut library = Library::new();
    library.add_book("Vidas Secas", "Graciliano Ramos", "A1");
    library.add_book("O Cortiço", "Aluísio Azevedo", "B2");
    library.add_member("Ana", "M1");
    library.add_member("Bruno", "M2");
    library.borrow("A1", "M1", 7)?;
    library.borrow("B2", "M2", 2)?;
    library.advance(4)?;
    library.return_book("B2", "M2")?;

    persistence.save(&library).await?;
    assert!(temp_dir.path().join("library_data.json").exists());

    let mut restored = persistence.load().await?.into_library();
    assert_eq!(restored.current_day(), 5);
    assert_eq!(restored.list_books(), library.list_books());
    assert_eq!(restored.list_members(), library.list_members());
    assert_eq!(restored.list_loans(), library.list_loans());
    assert_eq!(restored.list_loans()[1].fine, Money::from_cents(100));

    // 重新連結後的借閱仍可歸還
    restored.advance(10)?;
    let entry = restored.return_book("A1", "M1")?;
    assert_eq!(entry.book.title, "Vidas Secas");
    assert_eq!(entry.loan.fine, Money::from_cents(350));
    Ok(())
}

#[tokio::test]
async fn test_saved_file_layout() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let persistence = persistence_in(&temp_dir);

    let mut library = Library::new();
    library.add_book("Title", "Author", "A1");
    library.add_member("Ana", "M1");
    library.borrow("A1", "M1", 7)?;
    persistence.save(&library).await?;

    let content = std::fs::read_to_string(temp_dir.path().join("library_data.json"))?;
    let value: serde_json::Value = serde_json::from_str(&content)?;

    assert_eq!(value["currentDay"], 1);
    assert_eq!(value["books"][0]["isbn"], "A1");
    assert_eq!(value["books"][0]["available"], false);
    assert_eq!(value["members"][0]["memberId"], "M1");
    assert_eq!(value["loans"][0]["bookIsbn"], "A1");
    assert_eq!(value["loans"][0]["memberId"], "M1");
    assert_eq!(value["loans"][0]["copyIndex"], 0);
    assert_eq!(value["loans"][0]["dueDay"], 8);
    assert!(value["loans"][0]["returnDay"].is_null());
    assert!(value["loans"][0].get("book").is_none());
    assert!(value["savedAt"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_corrupt_file_is_reset_and_backed_up() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(temp_dir.path().join("library_data.json"), "{\"books\": [")?;
    let persistence = persistence_in(&temp_dir);

    assert!(persistence.load().await.is_err());

    let outcome = persistence.load_or_reset().await?;
    assert!(matches!(outcome, LoadOutcome::Reset { .. }));
    assert_eq!(outcome.library().current_day(), 1);
    assert_eq!(
        std::fs::read_to_string(temp_dir.path().join("library_data.json.corrupt"))?,
        "{\"books\": ["
    );
    Ok(())
}
