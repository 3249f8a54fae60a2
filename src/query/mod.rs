//! Read-side queries over a loaded store
//!
//! [`Snapshot::load`] reads the collections the reports need into memory;
//! every query is a plain filter or join over those rows. Nothing here
//! writes to the store.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::Serialize;

use crate::store::{Store, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MajorRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentRow {
    pub id: i64,
    pub name: String,
    pub grad_year: Option<i32>,
    pub major_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseRow {
    pub id: i64,
    pub section: String,
    pub title: String,
    pub instructor: String,
    pub credits: String,
    pub days: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionRow {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub student_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrollmentRow {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamRow {
    pub id: i64,
    pub external_id: String,
    pub abbr: String,
    pub name: String,
    pub conference: String,
    pub division: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressRow {
    pub id: i64,
    pub team_id: i64,
    pub site: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerRow {
    pub id: i64,
    pub external_id: String,
    pub name: String,
    pub team_id: i64,
    pub position: String,
}

/// A conference and division pair
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Division {
    pub conference: String,
    pub division: String,
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.conference, self.division)
    }
}

/// A team with its roster and home address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamInfo<'a> {
    pub team: &'a TeamRow,
    /// Players in id order
    pub roster: Vec<&'a PlayerRow>,
    pub address: Option<&'a AddressRow>,
}

/// In-memory copy of the report tables, each in id order
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub majors: Vec<MajorRow>,
    pub students: Vec<StudentRow>,
    pub courses: Vec<CourseRow>,
    pub sections: Vec<SectionRow>,
    pub enrollments: Vec<EnrollmentRow>,
    pub teams: Vec<TeamRow>,
    pub addresses: Vec<AddressRow>,
    pub players: Vec<PlayerRow>,
}

impl Snapshot {
    /// Read every report table from the store
    pub fn load(store: &Store) -> Result<Self, StoreError> {
        let conn = store.connection();

        let mut stmt = conn.prepare("SELECT id, name FROM major ORDER BY id")?;
        let majors = stmt
            .query_map([], |row| {
                Ok(MajorRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt =
            conn.prepare("SELECT id, name, grad_year, major_id FROM student ORDER BY id")?;
        let students = stmt
            .query_map([], |row| {
                Ok(StudentRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    grad_year: row.get(2)?,
                    major_id: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT id, section, title, instructor, credits, days, start_time, end_time, location
             FROM course ORDER BY id",
        )?;
        let courses = stmt
            .query_map([], |row| {
                Ok(CourseRow {
                    id: row.get(0)?,
                    section: row.get(1)?,
                    title: row.get(2)?,
                    instructor: row.get(3)?,
                    credits: row.get(4)?,
                    days: row.get(5)?,
                    start_time: row.get(6)?,
                    end_time: row.get(7)?,
                    location: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt =
            conn.prepare("SELECT id, course_id, title, student_id FROM section ORDER BY id")?;
        let sections = stmt
            .query_map([], |row| {
                Ok(SectionRow {
                    id: row.get(0)?,
                    course_id: row.get(1)?,
                    title: row.get(2)?,
                    student_id: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt =
            conn.prepare("SELECT id, student_id, course_id, grade FROM enrollment ORDER BY id")?;
        let enrollments = stmt
            .query_map([], |row| {
                Ok(EnrollmentRow {
                    id: row.get(0)?,
                    student_id: row.get(1)?,
                    course_id: row.get(2)?,
                    grade: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT id, external_id, abbr, name, conference, division FROM team ORDER BY id",
        )?;
        let teams = stmt
            .query_map([], |row| {
                Ok(TeamRow {
                    id: row.get(0)?,
                    external_id: row.get(1)?,
                    abbr: row.get(2)?,
                    name: row.get(3)?,
                    conference: row.get(4)?,
                    division: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT id, team_id, site, street, city, state, zip, phone, url
             FROM address ORDER BY id",
        )?;
        let addresses = stmt
            .query_map([], |row| {
                Ok(AddressRow {
                    id: row.get(0)?,
                    team_id: row.get(1)?,
                    site: row.get(2)?,
                    street: row.get(3)?,
                    city: row.get(4)?,
                    state: row.get(5)?,
                    zip: row.get(6)?,
                    phone: row.get(7)?,
                    url: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn
            .prepare("SELECT id, external_id, name, team_id, position FROM player ORDER BY id")?;
        let players = stmt
            .query_map([], |row| {
                Ok(PlayerRow {
                    id: row.get(0)?,
                    external_id: row.get(1)?,
                    name: row.get(2)?,
                    team_id: row.get(3)?,
                    position: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "Snapshot: {} majors, {} students, {} courses, {} section entries, {} enrollments, {} teams, {} players",
            majors.len(),
            students.len(),
            courses.len(),
            sections.len(),
            enrollments.len(),
            teams.len(),
            players.len()
        );

        Ok(Self {
            majors,
            students,
            courses,
            sections,
            enrollments,
            teams,
            addresses,
            players,
        })
    }

    pub fn all_majors(&self) -> &[MajorRow] {
        &self.majors
    }

    pub fn students_graduating_in(&self, year: i32) -> Vec<&StudentRow> {
        self.students
            .iter()
            .filter(|s| s.grad_year == Some(year))
            .collect()
    }

    /// Students with a graduation year earlier than `year`
    pub fn students_graduating_before(&self, year: i32) -> Vec<&StudentRow> {
        self.students
            .iter()
            .filter(|s| s.grad_year.is_some_and(|y| y < year))
            .collect()
    }

    pub fn students_by_major(&self, major: &str) -> Vec<&StudentRow> {
        let ids: BTreeSet<i64> = self
            .majors
            .iter()
            .filter(|m| m.name == major)
            .map(|m| m.id)
            .collect();
        self.students
            .iter()
            .filter(|s| s.major_id.is_some_and(|id| ids.contains(&id)))
            .collect()
    }

    /// Courses whose title matches, ignoring case
    pub fn courses_by_title(&self, title: &str) -> Vec<&CourseRow> {
        self.courses
            .iter()
            .filter(|c| c.title.eq_ignore_ascii_case(title))
            .collect()
    }

    pub fn enrollments_by_grade(&self, grade: &str) -> Vec<&EnrollmentRow> {
        self.enrollments
            .iter()
            .filter(|e| e.grade.as_deref() == Some(grade))
            .collect()
    }

    /// Students holding `grade` in at least one enrollment, in id order
    pub fn students_with_grade(&self, grade: &str) -> Vec<&StudentRow> {
        let ids: BTreeSet<i64> = self
            .enrollments_by_grade(grade)
            .into_iter()
            .map(|e| e.student_id)
            .collect();
        self.students_with_ids(&ids)
    }

    /// Students placed in the offering `section` through enrollments or
    /// class-list entries, in id order
    pub fn students_in_offering(&self, section: &str) -> Vec<&StudentRow> {
        let courses: BTreeSet<i64> = self
            .courses
            .iter()
            .filter(|c| c.section == section)
            .map(|c| c.id)
            .collect();
        let ids: BTreeSet<i64> = self
            .enrollments
            .iter()
            .filter(|e| courses.contains(&e.course_id))
            .map(|e| e.student_id)
            .chain(
                self.sections
                    .iter()
                    .filter(|s| courses.contains(&s.course_id))
                    .map(|s| s.student_id),
            )
            .collect();
        self.students_with_ids(&ids)
    }

    /// Offerings whose instructor label mentions `instructor`, ignoring case
    ///
    /// The label is free text and may list several people.
    pub fn offerings_taught_by(&self, instructor: &str) -> Vec<&CourseRow> {
        let needle = instructor.to_lowercase();
        self.courses
            .iter()
            .filter(|c| c.instructor.to_lowercase().contains(&needle))
            .collect()
    }

    /// Students enrolled in any offering taught by `instructor`, in id order
    pub fn students_taught_by(&self, instructor: &str) -> Vec<&StudentRow> {
        let courses: BTreeSet<i64> = self
            .offerings_taught_by(instructor)
            .into_iter()
            .map(|c| c.id)
            .collect();
        let ids: BTreeSet<i64> = self
            .enrollments
            .iter()
            .filter(|e| courses.contains(&e.course_id))
            .map(|e| e.student_id)
            .collect();
        self.students_with_ids(&ids)
    }

    /// Offerings with at least one class-list entry
    pub fn courses_with_sections(&self) -> Vec<&CourseRow> {
        let ids: BTreeSet<i64> = self.sections.iter().map(|s| s.course_id).collect();
        self.courses.iter().filter(|c| ids.contains(&c.id)).collect()
    }

    /// Distinct instructor labels for offerings whose section code starts with
    /// the department prefix (`CS` for `CS-150-A`), ignoring case
    pub fn instructors_by_department(&self, department: &str) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.courses
            .iter()
            .filter(|c| {
                c.section
                    .split('-')
                    .next()
                    .is_some_and(|prefix| prefix.eq_ignore_ascii_case(department))
            })
            .map(|c| c.instructor.as_str())
            .filter(|instructor| seen.insert(*instructor))
            .collect()
    }

    /// Distinct conference and division pairs, sorted
    pub fn divisions(&self) -> Vec<Division> {
        let divisions: BTreeSet<Division> = self
            .teams
            .iter()
            .map(|t| Division {
                conference: t.conference.clone(),
                division: t.division.clone(),
            })
            .collect();
        divisions.into_iter().collect()
    }

    pub fn teams_in_division(&self, conference: &str, division: &str) -> Vec<&TeamRow> {
        self.teams
            .iter()
            .filter(|t| t.conference == conference && t.division == division)
            .collect()
    }

    /// Team by name with its roster and address; `None` for an unknown team
    pub fn team_info(&self, name: &str) -> Option<TeamInfo<'_>> {
        let team = self.teams.iter().find(|t| t.name == name)?;
        Some(TeamInfo {
            team,
            roster: self
                .players
                .iter()
                .filter(|p| p.team_id == team.id)
                .collect(),
            address: self.addresses.iter().find(|a| a.team_id == team.id),
        })
    }

    /// Student count per graduation year; students without a year count under `None`
    pub fn count_by_grad_year(&self) -> BTreeMap<Option<i32>, usize> {
        let mut counts = BTreeMap::new();
        for student in &self.students {
            *counts.entry(student.grad_year).or_insert(0) += 1;
        }
        counts
    }

    /// Major name for a student, if any
    pub fn major_of(&self, student: &StudentRow) -> Option<&str> {
        let majors: HashMap<i64, &str> =
            self.majors.iter().map(|m| (m.id, m.name.as_str())).collect();
        student.major_id.and_then(|id| majors.get(&id).copied())
    }

    fn students_with_ids(&self, ids: &BTreeSet<i64>) -> Vec<&StudentRow> {
        self.students
            .iter()
            .filter(|s| ids.contains(&s.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: i64, name: &str, grad_year: Option<i32>, major_id: Option<i64>) -> StudentRow {
        StudentRow {
            id,
            name: name.to_string(),
            grad_year,
            major_id,
        }
    }

    fn course(id: i64, section: &str, title: &str, instructor: &str) -> CourseRow {
        CourseRow {
            id,
            section: section.to_string(),
            title: title.to_string(),
            instructor: instructor.to_string(),
            credits: "4".to_string(),
            days: None,
            start_time: None,
            end_time: None,
            location: "OLIN 102".to_string(),
        }
    }

    fn enrollment(id: i64, student_id: i64, course_id: i64, grade: Option<&str>) -> EnrollmentRow {
        EnrollmentRow {
            id,
            student_id,
            course_id,
            grade: grade.map(str::to_string),
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            majors: vec![
                MajorRow {
                    id: 1,
                    name: "Biology".to_string(),
                },
                MajorRow {
                    id: 2,
                    name: "Computer Science".to_string(),
                },
            ],
            students: vec![
                student(1, "Ada Lovelace", Some(2024), Some(2)),
                student(2, "Alan Turing", Some(2025), Some(2)),
                student(3, "Rosalind Franklin", Some(2023), Some(1)),
                student(4, "Grace Hopper", None, None),
            ],
            courses: vec![
                course(1, "CS-150-A", "Intro to CS", "Doe"),
                course(2, "BIO-151-A", "Principles of Biology", "Roe, Doe"),
                course(3, "MUS-101-A", "Music Theory", "Poe"),
            ],
            sections: vec![SectionRow {
                id: 1,
                course_id: 1,
                title: "Intro to CS".to_string(),
                student_id: 4,
            }],
            enrollments: vec![
                enrollment(1, 1, 1, Some("A")),
                enrollment(2, 2, 1, Some("B")),
                enrollment(3, 3, 2, Some("A")),
                enrollment(4, 2, 3, None),
            ],
            teams: vec![
                team(1, "Minnesota Twins", "AL", "Central"),
                team(2, "Chicago Cubs", "NL", "Central"),
                team(3, "Detroit Tigers", "AL", "Central"),
                team(4, "Seattle Mariners", "AL", "West"),
            ],
            addresses: vec![AddressRow {
                id: 1,
                team_id: 1,
                site: "Target Field".to_string(),
                street: "1 Twins Way".to_string(),
                city: "Minneapolis".to_string(),
                state: "MN".to_string(),
                zip: "55403".to_string(),
                phone: "(612) 659-3400".to_string(),
                url: "twins.com".to_string(),
            }],
            players: vec![
                player(1, "Byron Buxton", 1, "CF"),
                player(2, "Dansby Swanson", 2, "SS"),
                player(3, "Carlos Correa", 1, "SS"),
            ],
        }
    }

    fn team(id: i64, name: &str, conference: &str, division: &str) -> TeamRow {
        TeamRow {
            id,
            external_id: format!("{}", 100 + id),
            abbr: name[..3].to_uppercase(),
            name: name.to_string(),
            conference: conference.to_string(),
            division: division.to_string(),
        }
    }

    fn player(id: i64, name: &str, team_id: i64, position: &str) -> PlayerRow {
        PlayerRow {
            id,
            external_id: format!("p{}", id),
            name: name.to_string(),
            team_id,
            position: position.to_string(),
        }
    }

    fn names(rows: Vec<&StudentRow>) -> Vec<&str> {
        rows.into_iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_graduation_filters() {
        let snap = snapshot();
        assert_eq!(names(snap.students_graduating_in(2024)), vec!["Ada Lovelace"]);
        assert_eq!(
            names(snap.students_graduating_before(2025)),
            vec!["Ada Lovelace", "Rosalind Franklin"]
        );
    }

    #[test]
    fn test_students_by_major() {
        let snap = snapshot();
        assert_eq!(
            names(snap.students_by_major("Computer Science")),
            vec!["Ada Lovelace", "Alan Turing"]
        );
        assert!(snap.students_by_major("Music").is_empty());
        assert_eq!(snap.major_of(&snap.students[2]), Some("Biology"));
        assert_eq!(snap.major_of(&snap.students[3]), None);
    }

    #[test]
    fn test_grade_queries() {
        let snap = snapshot();
        assert_eq!(snap.enrollments_by_grade("A").len(), 2);
        assert_eq!(
            names(snap.students_with_grade("A")),
            vec!["Ada Lovelace", "Rosalind Franklin"]
        );
        assert!(snap.students_with_grade("F").is_empty());
    }

    #[test]
    fn test_students_in_offering_joins_both_associations() {
        let snap = snapshot();
        assert_eq!(
            names(snap.students_in_offering("CS-150-A")),
            vec!["Ada Lovelace", "Alan Turing", "Grace Hopper"]
        );
        assert!(snap.students_in_offering("CS150").is_empty());
    }

    #[test]
    fn test_instructor_queries() {
        let snap = snapshot();
        let sections: Vec<&str> = snap
            .offerings_taught_by("doe")
            .into_iter()
            .map(|c| c.section.as_str())
            .collect();
        assert_eq!(sections, vec!["CS-150-A", "BIO-151-A"]);
        assert_eq!(
            names(snap.students_taught_by("Doe")),
            vec!["Ada Lovelace", "Alan Turing", "Rosalind Franklin"]
        );
    }

    #[test]
    fn test_courses_by_title() {
        let snap = snapshot();
        assert_eq!(snap.courses_by_title("intro to cs").len(), 1);
        assert!(snap.courses_by_title("Intro").is_empty());
    }

    #[test]
    fn test_count_by_grad_year() {
        let counts = snapshot().count_by_grad_year();
        assert_eq!(counts.get(&Some(2024)), Some(&1));
        assert_eq!(counts.get(&Some(2025)), Some(&1));
        assert_eq!(counts.get(&None), Some(&1));
        assert_eq!(counts.values().sum::<usize>(), 4);
    }

    #[test]
    fn test_all_majors() {
        assert_eq!(snapshot().all_majors().len(), 2);
    }

    #[test]
    fn test_courses_with_sections() {
        let snap = snapshot();
        let sections: Vec<&str> = snap
            .courses_with_sections()
            .into_iter()
            .map(|c| c.section.as_str())
            .collect();
        assert_eq!(sections, vec!["CS-150-A"]);
    }

    #[test]
    fn test_instructors_by_department() {
        let mut snap = snapshot();
        snap.courses.push(course(4, "CS-260-A", "Data Structures", "Doe"));
        snap.courses.push(course(5, "CS-330-A", "Algorithms", "Hopper"));

        assert_eq!(snap.instructors_by_department("cs"), vec!["Doe", "Hopper"]);
        assert_eq!(snap.instructors_by_department("BIO"), vec!["Roe, Doe"]);
        assert!(snap.instructors_by_department("ART").is_empty());
    }

    #[test]
    fn test_divisions_and_teams() {
        let snap = snapshot();
        let divisions: Vec<String> = snap.divisions().iter().map(ToString::to_string).collect();
        assert_eq!(divisions, vec!["AL | Central", "AL | West", "NL | Central"]);

        let central: Vec<&str> = snap
            .teams_in_division("AL", "Central")
            .into_iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(central, vec!["Minnesota Twins", "Detroit Tigers"]);
        assert!(snap.teams_in_division("NL", "West").is_empty());
    }

    #[test]
    fn test_team_info() {
        let snap = snapshot();
        let info = snap.team_info("Minnesota Twins").unwrap();

        let roster: Vec<&str> = info.roster.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(roster, vec!["Byron Buxton", "Carlos Correa"]);
        assert_eq!(info.address.map(|a| a.site.as_str()), Some("Target Field"));

        let cubs = snap.team_info("Chicago Cubs").unwrap();
        assert_eq!(cubs.roster.len(), 1);
        assert!(cubs.address.is_none());
        assert!(snap.team_info("Montreal Expos").is_none());
    }
}
