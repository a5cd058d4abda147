use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use tokio::io::BufReader;

use crate::application::EnrollmentService;
use crate::domain::{Catalog, DuplicateCoursePolicy};

mod session;

pub use session::{EndOfInput, Session};

/// Tuition - Student Enrollment Tracker
#[derive(Parser, Debug)]
#[command(name = "tuition")]
#[command(about = "Track students, their course enrollments and tuition payments")]
#[command(version)]
pub struct Cli {
    /// Enable verbose (debug) logging on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// How "View Students" renders the roster
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Seed for the student ID generator (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Refuse to add a course a student is already enrolled in
    #[arg(long)]
    pub reject_duplicate_courses: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl Cli {
    /// Log level implied by the flags; `RUST_LOG` may still override it.
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        }
    }

    pub fn duplicate_policy(&self) -> DuplicateCoursePolicy {
        if self.reject_duplicate_courses {
            DuplicateCoursePolicy::Reject
        } else {
            DuplicateCoursePolicy::Allow
        }
    }

    pub fn build_service(&self) -> EnrollmentService {
        let catalog = Catalog::standard().clone();
        let service = match self.seed {
            Some(seed) => EnrollmentService::seeded(catalog, seed),
            None => EnrollmentService::new(catalog),
        };
        service.with_duplicate_policy(self.duplicate_policy())
    }

    /// Run the interactive session on stdin/stdout until Exit or end of input.
    pub async fn run(self) -> Result<()> {
        let service = self.build_service();
        let input = BufReader::new(tokio::io::stdin());
        let output = tokio::io::stdout();

        Session::new(service, input, output, self.format).run().await
    }
}
