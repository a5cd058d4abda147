use thiserror::Error;

use crate::domain::{Student, StudentId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("Student with ID {0} not found")]
    NotFound(StudentId),

    #[error("Student ID {0} is already taken")]
    DuplicateId(StudentId),
}

/// In-memory storage for student records, kept in insertion order.
///
/// The roster only stores; course and balance edits are made by the
/// caller through [`Roster::find_by_id_mut`].
#[derive(Debug, Default, Clone)]
pub struct Roster {
    students: Vec<Student>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Mutations
    // ========================

    /// Append a student. Fails if the id is already present.
    pub fn add(&mut self, student: Student) -> Result<(), RosterError> {
        if self.contains(student.id) {
            return Err(RosterError::DuplicateId(student.id));
        }
        self.students.push(student);
        Ok(())
    }

    /// Remove a student, keeping the order of the others.
    pub fn remove(&mut self, id: StudentId) -> Result<Student, RosterError> {
        let index = self.position(id).ok_or(RosterError::NotFound(id))?;
        Ok(self.students.remove(index))
    }

    // ========================
    // Queries
    // ========================

    pub fn find_by_id(&self, id: StudentId) -> Result<&Student, RosterError> {
        self.students
            .iter()
            .find(|s| s.id == id)
            .ok_or(RosterError::NotFound(id))
    }

    pub fn find_by_id_mut(&mut self, id: StudentId) -> Result<&mut Student, RosterError> {
        self.students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(RosterError::NotFound(id))
    }

    pub fn contains(&self, id: StudentId) -> bool {
        self.position(id).is_some()
    }

    /// A fresh read-only view over all students in insertion order.
    pub fn list(&self) -> std::slice::Iter<'_, Student> {
        self.students.iter()
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    fn position(&self, id: StudentId) -> Option<usize> {
        self.students.iter().position(|s| s.id == id)
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Student;
    type IntoIter = std::slice::Iter<'a, Student>;

    fn into_iter(self) -> Self::IntoIter {
        self.list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Payment, PaymentMethod};

    fn make_student(id: StudentId, name: &str) -> Student {
        Student::new(
            id,
            name,
            vec!["Python".into()],
            Payment::new(PaymentMethod::BankTransfer, 600_000),
            0,
        )
    }

    #[test]
    fn test_add_and_find() {
        let mut roster = Roster::new();
        let student = make_student(10001, "Ali");
        roster.add(student.clone()).unwrap();

        assert_eq!(roster.find_by_id(10001), Ok(&student));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut roster = Roster::new();
        roster.add(make_student(10001, "Ali")).unwrap();

        let result = roster.add(make_student(10001, "Sara"));
        assert_eq!(result, Err(RosterError::DuplicateId(10001)));
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.find_by_id(10001).unwrap().name, "Ali");
    }

    #[test]
    fn test_find_missing() {
        let roster = Roster::new();
        assert_eq!(roster.find_by_id(42), Err(RosterError::NotFound(42)));
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut roster = Roster::new();
        roster.add(make_student(10001, "Ali")).unwrap();
        roster.add(make_student(10002, "Sara")).unwrap();
        roster.add(make_student(10003, "Bilal")).unwrap();

        let removed = roster.remove(10002).unwrap();
        assert_eq!(removed.name, "Sara");

        let ids: Vec<StudentId> = roster.list().map(|s| s.id).collect();
        assert_eq!(ids, vec![10001, 10003]);
        assert_eq!(roster.remove(10002), Err(RosterError::NotFound(10002)));
    }

    #[test]
    fn test_find_by_id_mut_edits_in_place() {
        let mut roster = Roster::new();
        roster.add(make_student(10001, "Ali")).unwrap();

        roster.find_by_id_mut(10001).unwrap().balance = 500;
        assert_eq!(roster.find_by_id(10001).unwrap().balance, 500);
    }
}
