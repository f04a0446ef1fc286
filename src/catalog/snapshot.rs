//! Decoding of catalog XML payloads into snapshot and detail shapes

use roxmltree::{Document, Node};

/// The catalog body could not be decoded into the expected shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(pub String);

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParseError {}

/// Seat availability reported by the catalog.
///
/// Derived from the `enrollmentStatus` text: "Open" counts as open, and
/// "Open (Restricted)" additionally carries restriction text. A missing
/// status element maps to `Unknown`, which the poller treats like a
/// transient failure rather than a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatStatus {
    Open,
    Restricted,
    Closed,
    Unknown,
}

impl SeatStatus {
    pub fn from_text(text: Option<&str>) -> Self {
        match text {
            Some(text) if text.contains("Open") => {
                if text.contains("Restricted") {
                    SeatStatus::Restricted
                } else {
                    SeatStatus::Open
                }
            }
            Some(_) => SeatStatus::Closed,
            None => SeatStatus::Unknown,
        }
    }

    /// True when seats are available, restricted or not
    pub fn is_open(&self) -> bool {
        matches!(self, SeatStatus::Open | SeatStatus::Restricted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeatStatus::Open => "Open",
            SeatStatus::Restricted => "Open (Restricted)",
            SeatStatus::Closed => "Closed",
            SeatStatus::Unknown => "Unknown",
        }
    }
}

/// Result of one section fetch, consumed by the registry and the poller.
/// Produced fresh on every fetch and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSnapshot {
    /// CRN from the section element id
    pub crn: String,
    /// "SUBJ NUM: Course Title", captured for display
    pub title: String,
    pub status: SeatStatus,
    /// Restriction text: `sectionNotes`, else `sectionText`, else absent
    pub restriction: Option<String>,
}

/// Meeting and staffing details for one section, used by direct lookups only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionDetails {
    pub crn: Option<String>,
    pub section_number: Option<String>,
    pub kind: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub days: Option<String>,
    pub room: Option<String>,
    pub building: Option<String>,
    pub instructors: Vec<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Course-level description fields plus the detailed section list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDetail {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub degree_attributes: Option<String>,
    pub section_info: Option<String>,
    pub schedule_info: Option<String>,
    pub sections: Vec<SectionDetails>,
}

impl CourseDetail {
    pub fn title(&self) -> String {
        format!("{}: {}", self.id, self.label)
    }
}

/// One course reference inside a department listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRef {
    pub id: String,
    pub title: String,
}

/// Department listing: the courses offered under one subject code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentListing {
    pub id: String,
    pub label: String,
    pub courses: Vec<CourseRef>,
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    child(node, name)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn required_attr(node: Node<'_, '_>, name: &str) -> Result<String, ParseError> {
    node.attribute(name)
        .map(str::to_string)
        .ok_or_else(|| ParseError(format!("missing '{}' attribute on <{}>", name, node.tag_name().name())))
}

/// "SUBJ NUM: Course Title" from a section's `parents` element
fn section_title(root: Node<'_, '_>) -> Result<String, ParseError> {
    let parents =
        child(root, "parents").ok_or_else(|| ParseError("missing <parents> element".into()))?;
    let subject =
        child(parents, "subject").ok_or_else(|| ParseError("missing <subject> parent".into()))?;
    let course =
        child(parents, "course").ok_or_else(|| ParseError("missing <course> parent".into()))?;
    Ok(format!(
        "{} {}: {}",
        required_attr(subject, "id")?,
        required_attr(course, "id")?,
        course.text().map(str::trim).unwrap_or_default()
    ))
}

/// Restriction text preference: `sectionNotes`, else `sectionText`, else absent
fn restriction_text(section: Node<'_, '_>) -> Option<String> {
    child_text(section, "sectionNotes").or_else(|| child_text(section, "sectionText"))
}

/// Decode a single-section payload into the watch-facing snapshot
pub fn parse_section_snapshot(body: &str) -> Result<SectionSnapshot, ParseError> {
    let doc = Document::parse(body).map_err(|e| ParseError(e.to_string()))?;
    let root = doc.root_element();

    let crn = required_attr(root, "id")?;
    let title = section_title(root)?;
    let status = SeatStatus::from_text(child_text(root, "enrollmentStatus").as_deref());
    let restriction = restriction_text(root);

    Ok(SectionSnapshot {
        crn,
        title,
        status,
        restriction,
    })
}

fn parse_section_details(section: Node<'_, '_>) -> SectionDetails {
    let mut details = SectionDetails {
        crn: section.attribute("id").map(str::to_string),
        section_number: child_text(section, "sectionNumber"),
        status: child_text(section, "enrollmentStatus"),
        notes: restriction_text(section),
        ..SectionDetails::default()
    };

    if let Some(meeting) = child(section, "meetings").and_then(|m| child(m, "meeting")) {
        details.kind = child_text(meeting, "type");
        details.start = child_text(meeting, "start");
        details.end = child_text(meeting, "end");
        details.days = child_text(meeting, "daysOfTheWeek");
        details.room = child_text(meeting, "roomNumber");
        details.building = child_text(meeting, "buildingName");
        if let Some(instructors) = child(meeting, "instructors") {
            details.instructors = instructors
                .children()
                .filter(|n| n.is_element() && n.tag_name().name() == "instructor")
                .filter_map(|n| n.text())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
    }

    details
}

/// Decode a single-section payload into its full meeting details
pub fn parse_section_detail(body: &str) -> Result<(String, SectionDetails), ParseError> {
    let doc = Document::parse(body).map_err(|e| ParseError(e.to_string()))?;
    let root = doc.root_element();
    let title = section_title(root)?;
    Ok((title, parse_section_details(root)))
}

/// Decode a course payload (description fields + detailed section list)
pub fn parse_course_detail(body: &str) -> Result<CourseDetail, ParseError> {
    let doc = Document::parse(body).map_err(|e| ParseError(e.to_string()))?;
    let root = doc.root_element();

    let sections = child(root, "detailedSections")
        .map(|container| {
            container
                .children()
                .filter(|n| n.is_element() && n.tag_name().name() == "detailedSection")
                .map(parse_section_details)
                .collect()
        })
        .unwrap_or_default();

    Ok(CourseDetail {
        id: required_attr(root, "id")?,
        label: child_text(root, "label")
            .ok_or_else(|| ParseError("missing <label> element".into()))?,
        description: child_text(root, "description"),
        degree_attributes: child_text(root, "sectionDegreeAttributes"),
        section_info: child_text(root, "courseSectionInformation"),
        schedule_info: child_text(root, "classScheduleInformation"),
        sections,
    })
}

/// Decode a department payload into its course listing
pub fn parse_department_listing(body: &str) -> Result<DepartmentListing, ParseError> {
    let doc = Document::parse(body).map_err(|e| ParseError(e.to_string()))?;
    let root = doc.root_element();

    let courses = child(root, "courses")
        .map(|container| {
            container
                .children()
                .filter(|n| n.is_element() && n.tag_name().name() == "course")
                .filter_map(|n| {
                    Some(CourseRef {
                        id: n.attribute("id")?.to_string(),
                        title: n.text().map(str::trim).unwrap_or_default().to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(DepartmentListing {
        id: required_attr(root, "id")?,
        label: child_text(root, "label")
            .ok_or_else(|| ParseError("missing <label> element".into()))?,
        courses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTION_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ns2:section xmlns:ns2="http://rest.cis.illinois.edu" id="31187">
  <parents>
    <subject id="CS">Computer Science</subject>
    <course id="225">Data Structures</course>
  </parents>
  <sectionNumber>AL1</sectionNumber>
  <enrollmentStatus>Open (Restricted)</enrollmentStatus>
  <sectionNotes>Restricted to CS majors.</sectionNotes>
  <meetings>
    <meeting id="0">
      <type code="LEC">Lecture</type>
      <start>09:00 AM</start>
      <end>09:50 AM</end>
      <daysOfTheWeek>MWF</daysOfTheWeek>
      <roomNumber>1404</roomNumber>
      <buildingName>Siebel Center</buildingName>
      <instructors>
        <instructor firstName="G" lastName="Evans">Evans, G</instructor>
      </instructors>
    </meeting>
  </meetings>
</ns2:section>"#;

    #[test]
    fn test_parse_section_snapshot() {
        let snapshot = parse_section_snapshot(SECTION_XML).unwrap();
        assert_eq!(snapshot.crn, "31187");
        assert_eq!(snapshot.title, "CS 225: Data Structures");
        assert_eq!(snapshot.status, SeatStatus::Restricted);
        assert!(snapshot.status.is_open());
        assert_eq!(
            snapshot.restriction.as_deref(),
            Some("Restricted to CS majors.")
        );
    }

    #[test]
    fn test_missing_enrollment_status_is_unknown() {
        let xml = r#"<section id="1">
            <parents><subject id="CS">CS</subject><course id="225">DS</course></parents>
        </section>"#;
        let snapshot = parse_section_snapshot(xml).unwrap();
        assert_eq!(snapshot.status, SeatStatus::Unknown);
        assert!(!snapshot.status.is_open());
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(SeatStatus::from_text(Some("Open")), SeatStatus::Open);
        assert_eq!(
            SeatStatus::from_text(Some("Open (Restricted)")),
            SeatStatus::Restricted
        );
        assert_eq!(SeatStatus::from_text(Some("Closed")), SeatStatus::Closed);
        assert_eq!(
            SeatStatus::from_text(Some("CrossListOpen")),
            SeatStatus::Open
        );
        assert_eq!(SeatStatus::from_text(None), SeatStatus::Unknown);
    }

    #[test]
    fn test_restriction_falls_back_to_section_text() {
        let xml = r#"<section id="1">
            <parents><subject id="CS">CS</subject><course id="225">DS</course></parents>
            <enrollmentStatus>Closed</enrollmentStatus>
            <sectionText>See department.</sectionText>
        </section>"#;
        let snapshot = parse_section_snapshot(xml).unwrap();
        assert_eq!(snapshot.restriction.as_deref(), Some("See department."));
    }

    #[test]
    fn test_section_notes_preferred_over_section_text() {
        let xml = r#"<section id="1">
            <parents><subject id="CS">CS</subject><course id="225">DS</course></parents>
            <enrollmentStatus>Closed</enrollmentStatus>
            <sectionNotes>Primary note.</sectionNotes>
            <sectionText>Fallback note.</sectionText>
        </section>"#;
        let snapshot = parse_section_snapshot(xml).unwrap();
        assert_eq!(snapshot.restriction.as_deref(), Some("Primary note."));
    }

    #[test]
    fn test_parse_section_detail_meetings() {
        let (title, details) = parse_section_detail(SECTION_XML).unwrap();
        assert_eq!(title, "CS 225: Data Structures");
        assert_eq!(details.crn.as_deref(), Some("31187"));
        assert_eq!(details.section_number.as_deref(), Some("AL1"));
        assert_eq!(details.kind.as_deref(), Some("Lecture"));
        assert_eq!(details.days.as_deref(), Some("MWF"));
        assert_eq!(details.building.as_deref(), Some("Siebel Center"));
        assert_eq!(details.instructors, vec!["Evans, G".to_string()]);
        assert_eq!(details.status.as_deref(), Some("Open (Restricted)"));
    }

    #[test]
    fn test_parse_course_detail() {
        let xml = r#"<course id="225">
            <label>Data Structures</label>
            <description>Data abstractions and structures.</description>
            <classScheduleInformation>Register early.</classScheduleInformation>
            <detailedSections>
                <detailedSection id="31187">
                    <sectionNumber>AL1</sectionNumber>
                    <enrollmentStatus>Open</enrollmentStatus>
                </detailedSection>
                <detailedSection id="31188">
                    <sectionNumber>AL2</sectionNumber>
                    <enrollmentStatus>Closed</enrollmentStatus>
                </detailedSection>
            </detailedSections>
        </course>"#;
        let course = parse_course_detail(xml).unwrap();
        assert_eq!(course.title(), "225: Data Structures");
        assert_eq!(
            course.description.as_deref(),
            Some("Data abstractions and structures.")
        );
        assert!(course.degree_attributes.is_none());
        assert_eq!(course.sections.len(), 2);
        assert_eq!(course.sections[1].crn.as_deref(), Some("31188"));
    }

    #[test]
    fn test_parse_department_listing() {
        let xml = r#"<subject id="CS">
            <label>Computer Science</label>
            <courses>
                <course id="100">Freshman Orientation</course>
                <course id="225">Data Structures</course>
            </courses>
        </subject>"#;
        let listing = parse_department_listing(xml).unwrap();
        assert_eq!(listing.id, "CS");
        assert_eq!(listing.courses.len(), 2);
        assert_eq!(listing.courses[0].id, "100");
        assert_eq!(listing.courses[1].title, "Data Structures");
    }

    #[test]
    fn test_garbage_body_is_a_parse_error() {
        assert!(parse_section_snapshot("not xml at all").is_err());
    }
}
