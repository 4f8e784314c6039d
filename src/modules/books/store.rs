use bookshelf_db::{Database, Outcome, Statement, StoreError};
use bookshelf_kernel::Migration;

use super::models::{Book, BookFields};

const SELECT_ALL: &str =
    "SELECT id, btitle, bauthor, bperson, bpub_date, bread, bcomment FROM books";
const INSERT: &str = "INSERT INTO books (btitle, bauthor, bperson, bpub_date, bread, bcomment) \
                      VALUES (?, ?, ?, ?, ?, ?)";
const UPDATE: &str = "UPDATE books SET btitle = ?, bauthor = ?, bperson = ?, bpub_date = ?, \
                      bread = ?, bcomment = ? WHERE id = ?";
const DELETE: &str = "DELETE FROM books WHERE id = ?";

pub(crate) const CREATE_TABLE: Migration = Migration {
    id: "001_books",
    up: r#"
        CREATE TABLE IF NOT EXISTS books (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            btitle    TEXT NOT NULL,
            bauthor   TEXT NOT NULL,
            bperson   TEXT NOT NULL,
            bpub_date TEXT NOT NULL,
            bread     TEXT NOT NULL,
            bcomment  TEXT NOT NULL
        );
        "#,
};

/// The four statements behind the book resource.
#[derive(Clone, Debug)]
pub struct BookStore {
    db: Database,
}

impl BookStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Every row, in whatever order the store returns them.
    pub async fn list(&self) -> Result<Vec<Book>, StoreError> {
        self.db.fetch_all(Statement::new(SELECT_ALL)).await
    }

    pub async fn insert(&self, fields: BookFields) -> Result<Outcome, StoreError> {
        self.db.execute(bind_fields(Statement::new(INSERT), fields)).await
    }

    /// Replace every non-key column of `id`. Zero rows affected is not an error.
    pub async fn update(&self, id: i64, fields: BookFields) -> Result<Outcome, StoreError> {
        let statement = bind_fields(Statement::new(UPDATE), fields).bind(id);
        self.db.execute(statement).await
    }

    /// Zero rows affected is not an error.
    pub async fn delete(&self, id: i64) -> Result<Outcome, StoreError> {
        self.db.execute(Statement::new(DELETE).bind(id)).await
    }
}

fn bind_fields(statement: Statement, fields: BookFields) -> Statement {
    statement
        .bind(fields.title)
        .bind(fields.author)
        .bind(fields.person)
        .bind(fields.pub_date)
        .bind(fields.read_status)
        .bind(fields.comment)
}
