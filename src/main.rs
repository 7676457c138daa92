use clap::Parser;
use small_library::config::cli::Command;
use small_library::core::{ConfigProvider, Storage};
use small_library::utils::error::ErrorSeverity;
use small_library::utils::logger;
use small_library::{CliConfig, Library, LibraryError, LoadOutcome, LocalStorage, Persistence, Settings};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let settings = match Settings::resolve(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_cli_logger(settings.verbose, settings.log_format);
    tracing::debug!("Resolved settings: {:?}", settings);

    let storage = LocalStorage::new(String::new());
    let persistence = Persistence::new(storage, settings.data_file());

    if let Err(e) = run(&cli.command, &settings, &persistence).await {
        tracing::error!(
            "Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run<S: Storage>(
    command: &Command,
    settings: &Settings,
    persistence: &Persistence<S>,
) -> Result<(), LibraryError> {
    let outcome = persistence.load_or_reset().await?;
    match &outcome {
        LoadOutcome::Fresh(_) => {
            println!("🔄 No previous records found; starting with empty data.");
        }
        LoadOutcome::Reset {
            reason,
            backup_path,
            ..
        } => {
            eprintln!("⚠️  Data file could not be read ({}).", reason);
            eprintln!("⚠️  A copy was kept at {}; starting with empty data.", backup_path);
        }
        LoadOutcome::Restored { report, .. } if !report.is_clean() => {
            eprintln!(
                "⚠️  Loaded with repairs: {} loan(s) dropped, {} book(s) corrected.",
                report.dropped_loans, report.repaired_books
            );
        }
        LoadOutcome::Restored { .. } => {}
    }

    let mut library = outcome.into_library();
    execute(command, &mut library, settings)?;

    if command.mutates() {
        persistence.save(&library).await?;
        tracing::info!("📁 Data saved to {}", persistence.path());
    }
    Ok(())
}

fn execute(command: &Command, library: &mut Library, settings: &Settings) -> Result<(), LibraryError> {
    match command {
        Command::AddBook {
            title,
            author,
            isbn,
        } => {
            let book = library.add_book(title.as_str(), author.as_str(), isbn.as_str());
            println!("✅ Book '{}' added.", book.title);
        }
        Command::AddMember { name, member_id } => {
            let member = library.add_member(name.as_str(), member_id.as_str());
            println!("✅ Member '{}' added.", member.name);
        }
        Command::Books => {
            let books = library.list_books();
            if books.is_empty() {
                println!("No books registered.");
            } else {
                println!("=== Books ===");
                for book in books {
                    let status = if book.available { "Available" } else { "On loan" };
                    println!(
                        "Title: {}, Author: {}, ISBN: {}, Status: {}",
                        book.title, book.author, book.isbn, status
                    );
                }
            }
        }
        Command::Members => {
            let members = library.list_members();
            if members.is_empty() {
                println!("No members registered.");
            } else {
                println!("=== Members ===");
                for member in members {
                    println!("Name: {}, ID: {}", member.name, member.member_id);
                }
            }
        }
        Command::Borrow {
            isbn,
            member_id,
            days,
        } => {
            let term = days.unwrap_or_else(|| settings.default_term_days());
            let entry = library.borrow(isbn, member_id, term)?;
            println!(
                "✅ '{}' lent to '{}'.",
                entry.book.title, entry.member.name
            );
            println!(
                "Loan day: {}, due day: {}",
                entry.loan.loan_day, entry.loan.due_day
            );
        }
        Command::Return { isbn, member_id } => {
            let entry = library.return_book(isbn, member_id)?;
            if entry.loan.fine.is_zero() {
                println!("✅ '{}' returned.", entry.book.title);
            } else {
                println!(
                    "✅ '{}' returned {} day(s) late. Fine: {}",
                    entry.book.title,
                    entry.loan.overdue_days(),
                    entry.loan.fine
                );
            }
            if let Some(day) = entry.loan.return_day {
                println!("Return day: {}", day);
            }
        }
        Command::Loans { open } => {
            let entries: Vec<_> = if *open {
                library.open_loan_entries().collect()
            } else {
                library.loan_entries().collect()
            };
            if entries.is_empty() {
                println!("No loans recorded.");
            } else {
                println!("=== Loans ===");
                for entry in entries {
                    let fine = if entry.loan.fine.is_zero() {
                        String::new()
                    } else {
                        format!(", Fine: {}", entry.loan.fine)
                    };
                    println!(
                        "Book: {}, Member: {}, Loan day: {}, Due day: {}, Status: {}{}",
                        entry.book.title,
                        entry.member.name,
                        entry.loan.loan_day,
                        entry.loan.due_day,
                        entry.status(),
                        fine
                    );
                }
            }
        }
        Command::Advance { days } => {
            let today = library.advance(*days)?;
            println!("System advanced {} day(s). Current day: {}", days, today);
        }
        Command::Today => {
            println!("Current day: {}", library.current_day());
        }
    }
    Ok(())
}
