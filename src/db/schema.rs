use rusqlite::{Connection, Result};

/// Stored in `PRAGMA user_version`; bump when the table layout changes
pub const SCHEMA_VERSION: i64 = 1;

pub fn schema_version(conn: &Connection) -> Result<i64> {
  conn.query_row("PRAGMA user_version", [], |row| row.get(0))
}

pub fn run_migrations(conn: &Connection) -> Result<()> {
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS flashcards (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      user_id INTEGER NOT NULL,
      document_id INTEGER NOT NULL,
      question TEXT NOT NULL,
      answer TEXT NOT NULL,
      difficulty TEXT NOT NULL DEFAULT 'medium',
      category TEXT NOT NULL DEFAULT 'General',
      is_favorite INTEGER NOT NULL DEFAULT 0,
      tags TEXT NOT NULL DEFAULT '[]',
      review_count INTEGER NOT NULL DEFAULT 0,
      correct_count INTEGER NOT NULL DEFAULT 0,
      last_reviewed TEXT,
      next_review TEXT NOT NULL,
      created_at TEXT NOT NULL,
      updated_at TEXT NOT NULL,
      CHECK (correct_count <= review_count)
    );

    CREATE TABLE IF NOT EXISTS review_logs (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      flashcard_id INTEGER NOT NULL,
      user_id INTEGER NOT NULL,
      is_correct INTEGER NOT NULL,
      reviewed_at TEXT NOT NULL,
      FOREIGN KEY (flashcard_id) REFERENCES flashcards(id)
    );

    CREATE TABLE IF NOT EXISTS quizzes (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      user_id INTEGER NOT NULL,
      document_id INTEGER NOT NULL,
      title TEXT NOT NULL,
      difficulty TEXT NOT NULL DEFAULT 'medium',
      time_limit INTEGER NOT NULL DEFAULT 30,
      category TEXT NOT NULL DEFAULT 'General',
      created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS quiz_questions (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      quiz_id INTEGER NOT NULL,
      position INTEGER NOT NULL,
      question TEXT NOT NULL,
      -- JSON array of exactly four strings
      options TEXT NOT NULL,
      correct_answer INTEGER NOT NULL CHECK (correct_answer BETWEEN 0 AND 3),
      explanation TEXT NOT NULL DEFAULT '',
      difficulty TEXT NOT NULL DEFAULT 'medium',
      UNIQUE (quiz_id, position),
      FOREIGN KEY (quiz_id) REFERENCES quizzes(id)
    );

    CREATE TABLE IF NOT EXISTS quiz_attempts (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      quiz_id INTEGER NOT NULL,
      user_id INTEGER NOT NULL,
      -- JSON array of {questionIndex, selectedAnswer, isCorrect}
      answers TEXT NOT NULL,
      score INTEGER NOT NULL,
      total_questions INTEGER NOT NULL,
      correct_answers INTEGER NOT NULL,
      time_spent INTEGER NOT NULL,
      completed_at TEXT NOT NULL,
      FOREIGN KEY (quiz_id) REFERENCES quizzes(id)
    );

    -- Indexes
    CREATE INDEX IF NOT EXISTS idx_flashcards_user ON flashcards(user_id, created_at);
    CREATE INDEX IF NOT EXISTS idx_flashcards_next_review ON flashcards(user_id, next_review);
    CREATE INDEX IF NOT EXISTS idx_flashcards_document ON flashcards(document_id);
    CREATE INDEX IF NOT EXISTS idx_review_logs_user ON review_logs(user_id, reviewed_at);
    CREATE INDEX IF NOT EXISTS idx_review_logs_flashcard ON review_logs(flashcard_id);
    CREATE INDEX IF NOT EXISTS idx_quizzes_user ON quizzes(user_id, created_at);
    CREATE INDEX IF NOT EXISTS idx_attempts_quiz ON quiz_attempts(quiz_id);
    CREATE INDEX IF NOT EXISTS idx_attempts_user ON quiz_attempts(user_id, completed_at);
    "#,
  )?;

  conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
  Ok(())
}
