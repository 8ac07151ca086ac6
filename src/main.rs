use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studydeck::content::{CannedResponse, SourceDocument};
use studydeck::db::{self, FlashcardFilter};
use studydeck::domain::{selection, Difficulty};
use studydeck::services::StudyService;
use studydeck::{config, Result, StudyError};

#[derive(Parser)]
#[command(name = "studydeck")]
#[command(about = "Spaced-repetition flashcards and graded quizzes")]
#[command(version)]
struct Cli {
  /// Database file (overrides config.toml)
  #[arg(long, global = true, env = "DATABASE_PATH")]
  db: Option<PathBuf>,

  /// Acting user id
  #[arg(short, long, global = true, default_value = "1")]
  user: i64,

  #[command(subcommand)]
  command: Commands,
}

/// Document the generated content belongs to
#[derive(clap::Args)]
struct DocumentArgs {
  /// Document id
  #[arg(long)]
  document_id: i64,
  /// Document title, used for the category and quiz title
  #[arg(long)]
  title: String,
  /// Text file with the document content
  #[arg(long)]
  content: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
  /// Store flashcards from a saved generator reply
  ImportFlashcards {
    #[command(flatten)]
    document: DocumentArgs,
    /// File containing the generator reply (JSON array of question/answer pairs)
    reply: PathBuf,
    #[arg(long, default_value_t = config::DEFAULT_FLASHCARD_COUNT)]
    count: u32,
    #[arg(long, default_value = "medium", value_parser = parse_difficulty)]
    difficulty: Difficulty,
  },

  /// Store a quiz from a saved generator reply
  ImportQuiz {
    #[command(flatten)]
    document: DocumentArgs,
    /// File containing the generator reply (JSON array of questions)
    reply: PathBuf,
    #[arg(long, default_value_t = config::DEFAULT_QUESTION_COUNT)]
    questions: u32,
    #[arg(long, default_value = "medium", value_parser = parse_difficulty)]
    difficulty: Difficulty,
    /// Time limit in minutes
    #[arg(long, default_value_t = config::DEFAULT_TIME_LIMIT_MINUTES)]
    time_limit: u32,
  },

  /// List flashcards
  Flashcards {
    #[arg(long)]
    document_id: Option<i64>,
    #[arg(long)]
    favorites: bool,
    #[arg(long, value_parser = parse_difficulty)]
    difficulty: Option<Difficulty>,
  },

  /// List flashcards due for review
  Due {
    #[arg(short, long, default_value_t = config::DEFAULT_DUE_LIMIT)]
    limit: usize,
  },

  /// Record a review of a flashcard
  #[command(group(clap::ArgGroup::new("outcome").required(true).args(["correct", "missed"])))]
  Review {
    id: i64,
    #[arg(long)]
    correct: bool,
    #[arg(long)]
    missed: bool,
  },

  /// Toggle a flashcard's favorite flag
  Favorite { id: i64 },

  /// Delete a flashcard
  DeleteFlashcard { id: i64 },

  /// List quizzes
  Quizzes {
    #[arg(long)]
    document_id: Option<i64>,
  },

  /// Show a quiz with its questions
  Quiz { id: i64 },

  /// Submit answers for a quiz and show the graded results
  Take {
    id: i64,
    /// Comma-separated option indexes, negative for unanswered (e.g. "0,2,-1")
    #[arg(long, allow_hyphen_values = true)]
    answers: String,
    /// Seconds spent on the quiz
    #[arg(long, default_value = "0")]
    time: i64,
  },

  /// List attempts, for one quiz or the most recent overall
  Attempts {
    #[arg(long)]
    quiz: Option<i64>,
  },

  /// Delete a quiz and its attempts
  DeleteQuiz { id: i64 },

  /// Totals and recent activity
  Dashboard,

  /// Quiz scores per day and flashcard success by difficulty
  Analytics {
    #[arg(long, default_value_t = config::DEFAULT_ANALYTICS_PERIOD_DAYS)]
    period: i64,
  },

  /// Progress toward this week's goals
  Goals,
}

fn parse_difficulty(s: &str) -> std::result::Result<Difficulty, String> {
  Difficulty::from_str(&s.to_lowercase())
    .ok_or_else(|| format!("unknown difficulty '{}' (expected easy, medium or hard)", s))
}

fn parse_answers(s: &str) -> Result<Vec<Option<i32>>> {
  s.split(',')
    .map(|part| {
      part
        .trim()
        .parse::<i32>()
        .map(selection)
        .map_err(|_| StudyError::invalid(format!("answer '{}' is not a number", part.trim())))
    })
    .collect()
}

fn read_file(path: &Path) -> Result<String> {
  std::fs::read_to_string(path)
    .map_err(|e| StudyError::invalid(format!("cannot read {}: {}", path.display(), e)))
}

fn load_document(args: &DocumentArgs) -> Result<SourceDocument> {
  let content = match &args.content {
    Some(path) => read_file(path)?,
    None => String::new(),
  };
  Ok(SourceDocument {
    id: args.document_id,
    title: args.title.clone(),
    content,
  })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

fn run(cli: Cli) -> Result<()> {
  let db_path = cli.db.unwrap_or_else(config::load_database_path);
  let pool = db::init_db(&db_path)?;
  let service = StudyService::new(pool);
  let user = cli.user;

  match cli.command {
    Commands::ImportFlashcards {
      document,
      reply,
      count,
      difficulty,
    } => {
      let doc = load_document(&document)?;
      let generator = CannedResponse(read_file(&reply)?);
      print_json(&service.generate_flashcards(user, &doc, &generator, count, difficulty)?)
    }
    Commands::ImportQuiz {
      document,
      reply,
      questions,
      difficulty,
      time_limit,
    } => {
      let doc = load_document(&document)?;
      let generator = CannedResponse(read_file(&reply)?);
      print_json(&service.generate_quiz(user, &doc, &generator, questions, difficulty, time_limit)?)
    }
    Commands::Flashcards {
      document_id,
      favorites,
      difficulty,
    } => {
      let filter = FlashcardFilter {
        document_id,
        favorites_only: favorites,
        difficulty,
      };
      print_json(&service.list_flashcards(user, &filter)?)
    }
    Commands::Due { limit } => print_json(&service.due_flashcards(user, limit)?),
    Commands::Review { id, correct, .. } => print_json(&service.review_flashcard(user, id, correct)?),
    Commands::Favorite { id } => print_json(&service.toggle_favorite(user, id)?),
    Commands::DeleteFlashcard { id } => service.delete_flashcard(user, id),
    Commands::Quizzes { document_id } => print_json(&service.list_quizzes(user, document_id)?),
    Commands::Quiz { id } => print_json(&service.get_quiz(user, id)?),
    Commands::Take { id, answers, time } => {
      let answers = parse_answers(&answers)?;
      print_json(&service.submit_attempt(user, id, &answers, time)?.results)
    }
    Commands::Attempts { quiz: Some(quiz_id) } => print_json(&service.quiz_attempts(user, quiz_id)?),
    Commands::Attempts { quiz: None } => print_json(&service.recent_attempts(user)?),
    Commands::DeleteQuiz { id } => service.delete_quiz(user, id),
    Commands::Dashboard => print_json(&service.dashboard(user)?),
    Commands::Analytics { period } => print_json(&service.analytics(user, period)?),
    Commands::Goals => print_json(&service.weekly_goals(user)?),
  }
}

fn main() -> ExitCode {
  let _ = dotenvy::dotenv();

  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "studydeck=info".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  match run(Cli::parse()) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("error: {}", e);
      ExitCode::FAILURE
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_answers_sentinel() {
    assert_eq!(parse_answers("0,2,-1").unwrap(), vec![Some(0), Some(2), None]);
    assert_eq!(parse_answers("-1").unwrap(), vec![None]);
  }

  #[test]
  fn test_parse_answers_trims_whitespace() {
    assert_eq!(parse_answers(" 3 , 1,  -5 ").unwrap(), vec![Some(3), Some(1), None]);
  }

  #[test]
  fn test_parse_answers_keeps_out_of_range_index() {
    // Graded as wrong, not rejected here
    assert_eq!(parse_answers("9").unwrap(), vec![Some(9)]);
  }

  #[test]
  fn test_parse_answers_rejects_non_numbers() {
    assert!(matches!(parse_answers("0,b,2"), Err(StudyError::InvalidInput(_))));
    assert!(matches!(parse_answers("0,,2"), Err(StudyError::InvalidInput(_))));
    assert!(matches!(parse_answers(""), Err(StudyError::InvalidInput(_))));
  }

  #[test]
  fn test_parse_difficulty_case_insensitive() {
    assert_eq!(parse_difficulty("Hard").unwrap(), Difficulty::Hard);
    assert!(parse_difficulty("extreme").is_err());
  }
}
