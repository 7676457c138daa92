use clap::Subcommand;

/// 每次執行一個指令：載入資料、執行、有變動時存檔
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Register a new book
    AddBook {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        isbn: String,
    },

    /// Register a new member
    AddMember {
        #[arg(long)]
        name: String,
        #[arg(long = "id")]
        member_id: String,
    },

    /// List all books with their status
    Books,

    /// List all members
    Members,

    /// Lend a book to a member
    Borrow {
        #[arg(long)]
        isbn: String,
        #[arg(long = "member")]
        member_id: String,
        /// Loan term in days (defaults to the configured term)
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
        days: Option<i64>,
    },

    /// Return a borrowed book
    Return {
        #[arg(long)]
        isbn: String,
        #[arg(long = "member")]
        member_id: String,
    },

    /// List loans
    Loans {
        /// Only show loans that are still open
        #[arg(long)]
        open: bool,
    },

    /// Advance the system day
    Advance {
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(i64).range(1..))]
        days: i64,
    },

    /// Show the current system day
    Today,
}

impl Command {
    /// 會改變狀態、需要存檔的指令
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Command::AddBook { .. }
                | Command::AddMember { .. }
                | Command::Borrow { .. }
                | Command::Return { .. }
                | Command::Advance { .. }
        )
    }
}
