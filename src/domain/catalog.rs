use std::sync::OnceLock;

use thiserror::Error;

use super::{Amount, rupees};

/// Course name as it appears in the catalog and on a student's record.
pub type CourseName = String;

/// Price list shipped with the tool, in declaration order.
const STANDARD_COURSES: [(&str, Amount); 6] = [
    ("MS.Office", rupees(1000)),
    ("HTML & CSS", rupees(2000)),
    ("Javascript", rupees(3000)),
    ("Typescript", rupees(4000)),
    ("NextJs", rupees(5000)),
    ("Python", rupees(6000)),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Unknown course: {0}")]
    UnknownCourse(String),

    #[error("Course name must not be empty")]
    EmptyName,

    #[error("Course {name} must have a positive price, got {price}")]
    NonPositivePrice { name: String, price: Amount },

    #[error("Course listed twice: {0}")]
    DuplicateCourse(String),
}

/// A single catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub name: CourseName,
    pub price: Amount,
}

/// Immutable mapping from course name to tuition price.
///
/// Lookups are linear: catalogs are a handful of entries and declaration
/// order has to be kept for selection prompts anyway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    courses: Vec<Course>,
}

impl Catalog {
    /// Build a catalog from `(name, price)` pairs, keeping their order.
    pub fn new<I, S>(entries: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (S, Amount)>,
        S: Into<String>,
    {
        let mut courses: Vec<Course> = Vec::new();
        for (name, price) in entries {
            let name = name.into();
            if name.trim().is_empty() {
                return Err(CatalogError::EmptyName);
            }
            if price <= 0 {
                return Err(CatalogError::NonPositivePrice { name, price });
            }
            if courses.iter().any(|c| c.name == name) {
                return Err(CatalogError::DuplicateCourse(name));
            }
            courses.push(Course { name, price });
        }
        Ok(Self { courses })
    }

    /// The process-wide standard price list.
    pub fn standard() -> &'static Catalog {
        static STANDARD: OnceLock<Catalog> = OnceLock::new();
        STANDARD.get_or_init(|| Catalog {
            courses: STANDARD_COURSES
                .iter()
                .map(|(name, price)| Course {
                    name: (*name).to_string(),
                    price: *price,
                })
                .collect(),
        })
    }

    pub fn price_of(&self, course: &str) -> Result<Amount, CatalogError> {
        self.courses
            .iter()
            .find(|c| c.name == course)
            .map(|c| c.price)
            .ok_or_else(|| CatalogError::UnknownCourse(course.to_string()))
    }

    /// Courses in declaration order.
    pub fn courses(&self) -> impl Iterator<Item = &Course> + '_ {
        self.courses.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_order() {
        let names: Vec<&str> = Catalog::standard()
            .courses()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "MS.Office",
                "HTML & CSS",
                "Javascript",
                "Typescript",
                "NextJs",
                "Python"
            ]
        );
    }

    #[test]
    fn test_price_of() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.price_of("Python"), Ok(rupees(6000)));
        assert_eq!(catalog.price_of("HTML & CSS"), Ok(rupees(2000)));
    }

    #[test]
    fn test_price_of_unknown_course() {
        let catalog = Catalog::standard();
        assert_eq!(
            catalog.price_of("Cobol"),
            Err(CatalogError::UnknownCourse("Cobol".into()))
        );
        // Lookups are exact
        assert!(catalog.price_of("python").is_err());
    }

    #[test]
    fn test_custom_catalog_validation() {
        assert!(Catalog::new([("A", 10), ("B", 20)]).is_ok());
        assert_eq!(
            Catalog::new([("", 10)]),
            Err(CatalogError::EmptyName)
        );
        assert!(matches!(
            Catalog::new([("A", 0)]),
            Err(CatalogError::NonPositivePrice { .. })
        ));
        assert_eq!(
            Catalog::new([("A", 10), ("A", 20)]),
            Err(CatalogError::DuplicateCourse("A".into()))
        );
    }
}
