//! Plain-text rendering of direct catalog lookups

use super::snapshot::{CourseDetail, DepartmentListing, SectionDetails};

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("n/a")
}

/// Course description block: description, degree attributes, restrictions, notes
pub fn format_course_description(course: &CourseDetail) -> String {
    format!(
        "{}\nDescription: {}\nType: {}\nRestrictions: {}\nNotes: {}",
        course.title(),
        or_na(&course.description),
        or_na(&course.degree_attributes),
        or_na(&course.section_info),
        or_na(&course.schedule_info),
    )
}

/// Section list for a course: one line per CRN with meeting summary
pub fn format_section_list(course: &CourseDetail) -> String {
    if course.sections.is_empty() {
        return format!("{}\nCourse has no sections.", course.title());
    }

    let mut lines = vec![course.title()];
    for section in &course.sections {
        lines.push(format!(
            "  {}: {} ({}), {}-{} {}",
            section.crn.as_deref().unwrap_or("n/a"),
            or_na(&section.section_number),
            or_na(&section.kind),
            or_na(&section.start),
            or_na(&section.end),
            or_na(&section.days),
        ));
    }
    lines.join("\n")
}

/// Course listing for a department
pub fn format_department(listing: &DepartmentListing) -> String {
    if listing.courses.is_empty() {
        return format!(
            "{}: {}\nDepartment has no courses.",
            listing.id, listing.label
        );
    }

    let mut lines = vec![format!("{}: {}", listing.id, listing.label)];
    for course in &listing.courses {
        lines.push(format!("  {}: {}", course.id, course.title));
    }
    lines.join("\n")
}

/// Full details for a single section lookup
pub fn format_section_info(title: &str, details: &SectionDetails) -> String {
    let instructors = if details.instructors.is_empty() {
        "n/a".to_string()
    } else {
        details
            .instructors
            .iter()
            .map(|name| format!("\"{}\"", name))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "{}\nSection: {}\nType: {}\nMeets: {} {} to {} in {} {}\nInstructors: {}\nStatus: {}\nNotes: {}",
        title,
        or_na(&details.section_number),
        or_na(&details.kind),
        or_na(&details.days),
        or_na(&details.start),
        or_na(&details.end),
        or_na(&details.building),
        or_na(&details.room),
        instructors,
        or_na(&details.status),
        details.notes.as_deref().unwrap_or("None provided."),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::snapshot::CourseRef;

    #[test]
    fn test_format_course_description_fills_na() {
        let course = CourseDetail {
            id: "225".to_string(),
            label: "Data Structures".to_string(),
            description: Some("Data abstractions.".to_string()),
            degree_attributes: None,
            section_info: None,
            schedule_info: None,
            sections: Vec::new(),
        };
        let text = format_course_description(&course);
        assert!(text.starts_with("225: Data Structures"));
        assert!(text.contains("Description: Data abstractions."));
        assert!(text.contains("Type: n/a"));
    }

    #[test]
    fn test_format_section_list_empty() {
        let course = CourseDetail {
            id: "225".to_string(),
            label: "Data Structures".to_string(),
            description: None,
            degree_attributes: None,
            section_info: None,
            schedule_info: None,
            sections: Vec::new(),
        };
        assert!(format_section_list(&course).ends_with("Course has no sections."));
    }

    #[test]
    fn test_format_department() {
        let listing = DepartmentListing {
            id: "CS".to_string(),
            label: "Computer Science".to_string(),
            courses: vec![CourseRef {
                id: "225".to_string(),
                title: "Data Structures".to_string(),
            }],
        };
        let text = format_department(&listing);
        assert!(text.contains("CS: Computer Science"));
        assert!(text.contains("  225: Data Structures"));
    }

    #[test]
    fn test_format_section_info_notes_placeholder() {
        let details = SectionDetails {
            section_number: Some("AL1".to_string()),
            ..SectionDetails::default()
        };
        let text = format_section_info("CS 225: Data Structures", &details);
        assert!(text.contains("Section: AL1"));
        assert!(text.contains("Notes: None provided."));
        assert!(text.contains("Instructors: n/a"));
    }
}
