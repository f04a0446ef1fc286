//! Validated catalog query parameters

use serde::{Deserialize, Serialize};

/// Validation failure for user-supplied query arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Department code is empty
    EmptyDepartment,
    /// Course number is not numeric
    CourseNumberNotNumeric(String),
    /// CRN is not numeric
    CrnNotNumeric(String),
    /// A CRN was given without a course number
    CrnWithoutCourseNumber,
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::EmptyDepartment => write!(f, "Department code is empty."),
            QueryError::CourseNumberNotNumeric(value) => {
                write!(f, "Course number '{}' is not a number.", value)
            }
            QueryError::CrnNotNumeric(value) => write!(f, "CRN '{}' is not a number.", value),
            QueryError::CrnWithoutCourseNumber => {
                write!(f, "A CRN requires a course number.")
            }
        }
    }
}

impl std::error::Error for QueryError {}

/// Fetch parameters for one catalog resource.
///
/// Department alone addresses a department listing, department + course number
/// a course, and all three a single section. Numeric fields are validated and
/// canonicalized at construction; the query is immutable afterwards and is
/// persisted inside watch entries so the poller can re-fetch later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseQuery {
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crn: Option<String>,
}

impl CourseQuery {
    /// Build a validated query. The department code is upper-cased; course
    /// number and CRN must parse as integers.
    pub fn new(
        department: &str,
        course_number: Option<&str>,
        crn: Option<&str>,
    ) -> Result<Self, QueryError> {
        let department = department.trim().to_uppercase();
        if department.is_empty() {
            return Err(QueryError::EmptyDepartment);
        }
        if crn.is_some() && course_number.is_none() {
            return Err(QueryError::CrnWithoutCourseNumber);
        }

        let course_number = course_number
            .map(|raw| {
                raw.trim()
                    .parse::<u32>()
                    .map(|n| n.to_string())
                    .map_err(|_| QueryError::CourseNumberNotNumeric(raw.to_string()))
            })
            .transpose()?;
        let crn = crn
            .map(|raw| {
                raw.trim()
                    .parse::<u32>()
                    .map(|n| n.to_string())
                    .map_err(|_| QueryError::CrnNotNumeric(raw.to_string()))
            })
            .transpose()?;

        Ok(Self {
            department,
            course_number,
            crn,
        })
    }

    /// Query for a single section (all three components required)
    pub fn section(department: &str, course_number: &str, crn: &str) -> Result<Self, QueryError> {
        Self::new(department, Some(course_number), Some(crn))
    }

    /// True when the query addresses a single section
    pub fn is_section(&self) -> bool {
        self.course_number.is_some() && self.crn.is_some()
    }

    /// URL path relative to the resolved schedule base, including the detail
    /// query string used for course and section lookups.
    pub fn url_path(&self) -> String {
        match (&self.course_number, &self.crn) {
            (Some(number), Some(crn)) => {
                format!("/{}/{}/{}.xml?mode=detail", self.department, number, crn)
            }
            (Some(number), None) => format!("/{}/{}.xml?mode=detail", self.department, number),
            _ => format!("/{}.xml", self.department),
        }
    }
}

impl std::fmt::Display for CourseQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.department)?;
        if let Some(number) = &self.course_number {
            write!(f, " {}", number)?;
        }
        if let Some(crn) = &self.crn {
            write!(f, " ({})", crn)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_department_is_uppercased() {
        let query = CourseQuery::new("math", None, None).unwrap();
        assert_eq!(query.department, "MATH");
        assert_eq!(query.url_path(), "/MATH.xml");
    }

    #[test]
    fn test_numeric_fields_are_canonicalized() {
        let query = CourseQuery::section("cs", "0225", "012345").unwrap();
        assert_eq!(query.course_number.as_deref(), Some("225"));
        assert_eq!(query.crn.as_deref(), Some("12345"));
        assert_eq!(query.url_path(), "/CS/225/12345.xml?mode=detail");
    }

    #[test]
    fn test_non_numeric_course_number_is_rejected() {
        let err = CourseQuery::new("CS", Some("two25"), None).unwrap_err();
        assert_eq!(err, QueryError::CourseNumberNotNumeric("two25".to_string()));
    }

    #[test]
    fn test_non_numeric_crn_is_rejected() {
        let err = CourseQuery::section("CS", "225", "abc").unwrap_err();
        assert_eq!(err, QueryError::CrnNotNumeric("abc".to_string()));
    }

    #[test]
    fn test_crn_requires_course_number() {
        let err = CourseQuery::new("CS", None, Some("12345")).unwrap_err();
        assert_eq!(err, QueryError::CrnWithoutCourseNumber);
    }

    #[test]
    fn test_course_url_has_detail_mode() {
        let query = CourseQuery::new("ECE", Some("391"), None).unwrap();
        assert_eq!(query.url_path(), "/ECE/391.xml?mode=detail");
    }

    #[test]
    fn test_serde_round_trip() {
        let query = CourseQuery::section("MATH", "221", "54321").unwrap();
        let json = serde_json::to_string(&query).unwrap();
        let parsed: CourseQuery = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, query);
    }
}
