use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

use crate::domain::{Student, format_amount};
use crate::storage::Roster;

/// Roster snapshot for JSON output
#[derive(Debug, Serialize)]
pub struct RosterSnapshot<'a> {
    pub exported_at: DateTime<Utc>,
    pub student_count: usize,
    pub students: Vec<&'a Student>,
}

/// Renders the roster in the supported listing formats
pub struct Exporter<'a> {
    roster: &'a Roster,
}

impl<'a> Exporter<'a> {
    pub fn new(roster: &'a Roster) -> Self {
        Self { roster }
    }

    /// Human-readable listing, one block per student
    pub fn export_table<W: Write>(&self, mut writer: W) -> Result<usize> {
        writeln!(writer, "\n******** Student List ********\n")?;

        let mut count = 0;
        for student in self.roster {
            writeln!(writer, "Student Name: {}", student.name)?;
            writeln!(writer, "Student ID: {}", student.id)?;
            writeln!(writer, "Courses: {}", student.courses.join(", "))?;
            writeln!(
                writer,
                "Tuition Fee Paid: {}",
                format_amount(student.tuition_fee_paid)
            )?;
            writeln!(writer, "Balance: {}", format_amount(student.balance))?;
            writeln!(writer, "{}", "-".repeat(30))?;
            count += 1;
        }

        if count == 0 {
            writeln!(writer, "No students enrolled.")?;
        }
        Ok(count)
    }

    /// Pretty-printed JSON snapshot
    pub fn export_json<W: Write>(&self, mut writer: W) -> Result<usize> {
        let snapshot = RosterSnapshot {
            exported_at: Utc::now(),
            student_count: self.roster.len(),
            students: self.roster.list().collect(),
        };
        serde_json::to_writer_pretty(&mut writer, &snapshot)?;
        writeln!(writer)?;
        Ok(snapshot.student_count)
    }

    /// CSV with one row per student; courses are `;`-separated
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "name",
            "courses",
            "tuition_fee_paid",
            "balance",
            "payments",
            "enrolled_at",
        ])?;

        let mut count = 0;
        for student in self.roster {
            csv_writer.write_record(&[
                student.id.to_string(),
                student.name.clone(),
                student.courses.join(";"),
                format_amount(student.tuition_fee_paid),
                format_amount(student.balance),
                student.payments.len().to_string(),
                student.enrolled_at.to_rfc3339(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }
}
