use anyhow::Result;
use rand::Rng;
use rand::rngs::StdRng;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::application::{AppError, EnrollmentService};
use crate::domain::{
    Amount, CourseName, Payment, PaymentMethod, Student, StudentId, format_amount, parse_amount,
};
use crate::io::Exporter;

use super::OutputFormat;

/// Raised when the input stream closes; the session ends as if Exit was chosen.
#[derive(Debug, Error)]
#[error("end of input")]
pub struct EndOfInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    AddStudent,
    UpdateStudent,
    DeleteStudent,
    ViewStudents,
    Exit,
}

impl Action {
    const ALL: [Action; 5] = [
        Action::AddStudent,
        Action::UpdateStudent,
        Action::DeleteStudent,
        Action::ViewStudents,
        Action::Exit,
    ];

    fn label(&self) -> &'static str {
        match self {
            Action::AddStudent => "Add Student",
            Action::UpdateStudent => "Update Student",
            Action::DeleteStudent => "Delete Student",
            Action::ViewStudents => "View Students",
            Action::Exit => "Exit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateChoice {
    AddCourses,
    ReplaceCourse,
}

/// Interactive menu loop over any line-based input and output.
pub struct Session<I, O, G = StdRng> {
    service: EnrollmentService<G>,
    input: I,
    output: O,
    format: OutputFormat,
}

impl<I, O, G> Session<I, O, G>
where
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
    G: Rng,
{
    pub fn new(service: EnrollmentService<G>, input: I, output: O, format: OutputFormat) -> Self {
        Self {
            service,
            input,
            output,
            format,
        }
    }

    pub fn into_parts(self) -> (EnrollmentService<G>, O) {
        (self.service, self.output)
    }

    /// Show the menu until Exit is chosen or the input runs out.
    /// Operation failures are reported once and the menu comes back.
    pub async fn run(&mut self) -> Result<()> {
        self.say("Welcome to Student Management System.\n").await?;

        loop {
            match self.step().await {
                Ok(Action::Exit) => {
                    self.say("Exiting student management system.").await?;
                    break;
                }
                Ok(_) => {}
                Err(err) if err.is::<EndOfInput>() => break,
                Err(err) => match err.downcast_ref::<AppError>() {
                    Some(app_err) => {
                        let message = app_err.to_string();
                        self.say(&message).await?;
                    }
                    None => return Err(err),
                },
            }
        }

        self.output.flush().await?;
        Ok(())
    }

    async fn step(&mut self) -> Result<Action> {
        let options: Vec<(String, Action)> = Action::ALL
            .iter()
            .map(|action| (action.label().to_string(), *action))
            .collect();
        let action = self.select("Choose an action:", &options).await?;

        match action {
            Action::AddStudent => self.add_student().await?,
            Action::UpdateStudent => self.update_student().await?,
            Action::DeleteStudent => self.delete_student().await?,
            Action::ViewStudents => self.view_students().await?,
            Action::Exit => {}
        }
        Ok(action)
    }

    // ========================
    // Flows
    // ========================

    async fn add_student(&mut self) -> Result<()> {
        let name = self
            .prompt_required("Enter the student name: ", "Please enter the student name")
            .await?;
        let courses = self.select_courses().await?;
        let required = self.service.quote_enrollment(&courses)?;
        let payment = self.prompt_payment(&name, &courses, required).await?;

        match self.service.enroll_student(&name, courses, payment) {
            Ok(student) => {
                if !student.courses.is_empty() {
                    self.say(&format!(
                        "Congratulations, {} has enrolled in {}.",
                        student.name,
                        student.courses.join(", ")
                    ))
                    .await?;
                }
                self.say(&format!(
                    "Student added successfully. The ID is {}.",
                    student.id
                ))
                .await?;
            }
            Err(AppError::InsufficientPayment { required, .. }) => {
                self.say(&format!(
                    "Insufficient payment. Required amount: {}",
                    format_amount(required)
                ))
                .await?;
                self.say("Student could not be added due to incorrect payment amount.")
                    .await?;
            }
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }

    async fn update_student(&mut self) -> Result<()> {
        let id = self
            .prompt_id("Enter the ID of the student you want to update: ")
            .await?;
        let student = self.service.get_student(id)?.clone();

        self.say(&format!("Current details for {}:", student.name))
            .await?;
        self.describe(&student).await?;

        let options = [
            ("Add new courses".to_string(), UpdateChoice::AddCourses),
            (
                "Replace an existing course".to_string(),
                UpdateChoice::ReplaceCourse,
            ),
        ];
        match self.select("Choose an option:", &options).await? {
            UpdateChoice::AddCourses => self.add_courses(&student).await,
            UpdateChoice::ReplaceCourse => self.replace_course(&student).await,
        }
    }

    async fn add_courses(&mut self, student: &Student) -> Result<()> {
        let courses = self.select_courses().await?;
        if courses.is_empty() {
            self.say("No courses selected.").await?;
            return Ok(());
        }

        let decision = self.service.quote_add_courses(student.id, &courses)?;
        let payment = if decision.needs_payment {
            self.say(&format!(
                "Additional fee needed: {}",
                format_amount(decision.shortfall)
            ))
            .await?;
            Some(
                self.prompt_payment(&student.name, &courses, decision.shortfall)
                    .await?,
            )
        } else {
            None
        };

        match self.service.add_courses(student.id, courses, payment) {
            Ok(updated) => {
                self.say(&format!(
                    "Courses added successfully. Remaining balance: {}",
                    format_amount(updated.balance)
                ))
                .await?;
            }
            Err(AppError::InsufficientPayment { .. }) => {
                self.say("Insufficient payment. Course update failed.")
                    .await?;
            }
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }

    async fn replace_course(&mut self, student: &Student) -> Result<()> {
        if student.courses.is_empty() {
            self.say(&format!("{} has no courses to replace.", student.name))
                .await?;
            return Ok(());
        }

        let enrolled: Vec<(String, CourseName)> = student
            .courses
            .iter()
            .map(|c| (c.clone(), c.clone()))
            .collect();
        let old = self
            .select("Which course do you want to replace?", &enrolled)
            .await?;

        let catalog: Vec<(String, CourseName)> = self
            .service
            .catalog()
            .courses()
            .map(|c| {
                (
                    format!("{} - Rs {}", c.name, format_amount(c.price)),
                    c.name.clone(),
                )
            })
            .collect();
        let new = self.select("Select the new course:", &catalog).await?;

        let decision = self.service.quote_replace_course(student.id, &old, &new)?;
        self.say(&format!(
            "The difference in tuition fees is: {}",
            format_amount(decision.difference)
        ))
        .await?;

        let payment = if decision.needs_payment {
            self.say(&format!(
                "Additional fee needed: {}",
                format_amount(decision.shortfall)
            ))
            .await?;
            Some(
                self.prompt_payment(&student.name, &[new.clone()], decision.shortfall)
                    .await?,
            )
        } else {
            None
        };

        match self.service.replace_course(student.id, &old, &new, payment) {
            Ok(updated) => {
                self.say(&format!(
                    "Course replaced successfully. Remaining balance: {}",
                    format_amount(updated.balance)
                ))
                .await?;
            }
            Err(AppError::InsufficientPayment { .. }) => {
                self.say("Insufficient payment. Course update failed.")
                    .await?;
            }
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }

    async fn delete_student(&mut self) -> Result<()> {
        let id = self
            .prompt_id("Enter the ID of the student you want to delete: ")
            .await?;
        let student = self.service.delete_student(id)?;
        self.say(&format!(
            "Student {} with ID {} deleted successfully.",
            student.name, student.id
        ))
        .await
    }

    async fn view_students(&mut self) -> Result<()> {
        let mut buffer = Vec::new();
        let exporter = Exporter::new(self.service.roster());
        match self.format {
            OutputFormat::Table => exporter.export_table(&mut buffer)?,
            OutputFormat::Json => exporter.export_json(&mut buffer)?,
            OutputFormat::Csv => exporter.export_csv(&mut buffer)?,
        };
        self.output.write_all(&buffer).await?;
        Ok(())
    }

    async fn describe(&mut self, student: &Student) -> Result<()> {
        self.say(&format!("  ID:               {}", student.id)).await?;
        self.say(&format!("  Courses:          {}", student.courses.join(", ")))
            .await?;
        self.say(&format!(
            "  Tuition Fee Paid: {}",
            format_amount(student.tuition_fee_paid)
        ))
        .await?;
        self.say(&format!(
            "  Balance:          {}",
            format_amount(student.balance)
        ))
        .await?;
        self.say(&format!("  Payments:         {}", student.payments.len()))
            .await
    }

    // ========================
    // Prompts
    // ========================

    async fn prompt_payment(
        &mut self,
        name: &str,
        courses: &[CourseName],
        required: Amount,
    ) -> Result<Payment> {
        self.say(&format!("Amount due: {}", format_amount(required)))
            .await?;

        let methods: Vec<(String, PaymentMethod)> = PaymentMethod::ALL
            .iter()
            .map(|m| (m.as_str().to_string(), *m))
            .collect();
        let method = self.select("Select the payment method:", &methods).await?;

        let message = format!(
            "Enter the amount for {}'s courses ({}): ",
            name,
            courses.join(", ")
        );
        loop {
            let answer = self
                .prompt_required(&message, "Please enter the amount")
                .await?;
            match parse_amount(&answer) {
                Ok(amount) if amount >= 0 => return Ok(Payment::new(method, amount)),
                Ok(_) => self.say("Amount must not be negative").await?,
                Err(err) => self.say(&format!("Please enter a valid amount ({})", err)).await?,
            }
        }
    }

    async fn prompt_id(&mut self, message: &str) -> Result<StudentId> {
        loop {
            let answer = self
                .prompt_required(message, "Please enter the student ID")
                .await?;
            match answer.parse::<StudentId>() {
                Ok(id) => return Ok(id),
                Err(_) => self.say("Please enter a valid student ID").await?,
            }
        }
    }

    /// Pick one option by number or by label.
    async fn select<T: Clone>(&mut self, message: &str, options: &[(String, T)]) -> Result<T> {
        loop {
            self.say(message).await?;
            for (i, (label, _)) in options.iter().enumerate() {
                self.say(&format!("  {}) {}", i + 1, label)).await?;
            }
            let answer = self.prompt("> ").await?;
            if let Some(value) = pick(&answer, options) {
                return Ok(value);
            }
            self.say(&format!("Invalid choice: {}", answer.trim()))
                .await?;
        }
    }

    /// Pick any number of catalog courses; a blank answer selects none.
    async fn select_courses(&mut self) -> Result<Vec<CourseName>> {
        let courses: Vec<(CourseName, Amount)> = self
            .service
            .catalog()
            .courses()
            .map(|c| (c.name.clone(), c.price))
            .collect();

        loop {
            self.say("Select courses:").await?;
            for (i, (name, price)) in courses.iter().enumerate() {
                self.say(&format!("  {}) {} - Rs {}", i + 1, name, format_amount(*price)))
                    .await?;
            }
            let answer = self
                .prompt("Enter numbers or names separated by commas (blank for none): ")
                .await?;
            match parse_course_selection(&answer, &courses) {
                Ok(selected) => return Ok(selected),
                Err(token) => self.say(&format!("Unknown course: {}", token)).await?,
            }
        }
    }

    async fn prompt_required(&mut self, message: &str, complaint: &str) -> Result<String> {
        loop {
            let answer = self.prompt(message).await?;
            let answer = answer.trim();
            if !answer.is_empty() {
                return Ok(answer.to_string());
            }
            self.say(complaint).await?;
        }
    }

    async fn prompt(&mut self, message: &str) -> Result<String> {
        self.output.write_all(message.as_bytes()).await?;
        self.output.flush().await?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Err(EndOfInput.into());
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    async fn say(&mut self, line: &str) -> Result<()> {
        self.output.write_all(line.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        Ok(())
    }
}

fn pick<T: Clone>(answer: &str, options: &[(String, T)]) -> Option<T> {
    let answer = answer.trim();
    if let Ok(n) = answer.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| options.get(i))
            .map(|(_, value)| value.clone());
    }
    options
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(answer))
        .map(|(_, value)| value.clone())
}

/// Resolve a comma-separated selection of numbers or course names.
/// Returns the first token that matches nothing.
fn parse_course_selection(
    answer: &str,
    courses: &[(CourseName, Amount)],
) -> Result<Vec<CourseName>, String> {
    answer
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            let by_number = token
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| courses.get(i));
            by_number
                .or_else(|| {
                    courses
                        .iter()
                        .find(|(name, _)| name.eq_ignore_ascii_case(token))
                })
                .map(|(name, _)| name.clone())
                .ok_or_else(|| token.to_string())
        })
        .collect()
}
