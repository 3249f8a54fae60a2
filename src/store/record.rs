//! Binding record types to table rows

use duckdb::types::Value;

use super::error::ResolveError;
use super::resolver::ResolveReference;
use super::schema::TableName;
use crate::models::{
    Address, Course, Department, Enrollment, Faculty, Location, Major, PersonRef, Player,
    SectionEntry, Semester, Student, Team,
};

/// A record that loads into one table
pub trait TableRecord {
    /// Target table
    const TABLE: TableName;

    /// Short label for log lines
    fn label(&self) -> String;

    /// Column values in the table's insert order, with references resolved
    fn bind(&self, resolver: &dyn ResolveReference) -> Result<Vec<Value>, ResolveError>;
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn optional_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, text)
}

fn resolve_student(
    resolver: &dyn ResolveReference,
    student: &PersonRef,
) -> Result<Value, ResolveError> {
    let id = match student {
        PersonRef::Name(name) => resolver.resolve(TableName::Student, "name", name)?,
        PersonRef::Position(position) => {
            resolver.resolve_position(TableName::Student, *position)?
        }
    };
    Ok(Value::BigInt(id))
}

fn resolve_course(resolver: &dyn ResolveReference, section: &str) -> Result<Value, ResolveError> {
    Ok(Value::BigInt(resolver.resolve(
        TableName::Course,
        "section",
        section,
    )?))
}

fn resolve_team(resolver: &dyn ResolveReference, team: &str) -> Result<Value, ResolveError> {
    Ok(Value::BigInt(resolver.resolve(TableName::Team, "name", team)?))
}

impl TableRecord for Major {
    const TABLE: TableName = TableName::Major;

    fn label(&self) -> String {
        self.name.clone()
    }

    fn bind(&self, _resolver: &dyn ResolveReference) -> Result<Vec<Value>, ResolveError> {
        Ok(vec![text(&self.name)])
    }
}

impl TableRecord for Department {
    const TABLE: TableName = TableName::Department;

    fn label(&self) -> String {
        self.name.clone()
    }

    fn bind(&self, _resolver: &dyn ResolveReference) -> Result<Vec<Value>, ResolveError> {
        Ok(vec![
            text(&self.name),
            optional_text(self.head.as_deref()),
            optional_text(self.head_email.as_deref()),
            optional_text(self.head_office.as_deref()),
            optional_text(self.head_phone.as_deref()),
        ])
    }
}

impl TableRecord for Location {
    const TABLE: TableName = TableName::Location;

    fn label(&self) -> String {
        format!("{} {}", self.name, self.room_number)
    }

    fn bind(&self, _resolver: &dyn ResolveReference) -> Result<Vec<Value>, ResolveError> {
        Ok(vec![text(&self.name), Value::Int(self.room_number)])
    }
}

impl TableRecord for Semester {
    const TABLE: TableName = TableName::Semester;

    fn label(&self) -> String {
        self.name.clone()
    }

    fn bind(&self, _resolver: &dyn ResolveReference) -> Result<Vec<Value>, ResolveError> {
        Ok(vec![
            text(&self.name),
            text(&self.start_date),
            text(&self.end_date),
        ])
    }
}

impl TableRecord for Student {
    const TABLE: TableName = TableName::Student;

    fn label(&self) -> String {
        self.name.clone()
    }

    /// An empty or absent major stores NULL; a named major must resolve
    fn bind(&self, resolver: &dyn ResolveReference) -> Result<Vec<Value>, ResolveError> {
        let major = match self.major.as_deref().map(str::trim) {
            Some(major) if !major.is_empty() => {
                Value::BigInt(resolver.resolve(TableName::Major, "name", major)?)
            }
            _ => Value::Null,
        };
        Ok(vec![
            text(&self.name),
            self.grad_year.map_or(Value::Null, Value::Int),
            major,
        ])
    }
}

impl TableRecord for Faculty {
    const TABLE: TableName = TableName::Faculty;

    fn label(&self) -> String {
        self.username.clone()
    }

    fn bind(&self, _resolver: &dyn ResolveReference) -> Result<Vec<Value>, ResolveError> {
        Ok(vec![
            text(&self.name),
            text(&self.office),
            text(&self.extension),
            text(&self.username),
        ])
    }
}

impl TableRecord for Course {
    const TABLE: TableName = TableName::Course;

    fn label(&self) -> String {
        self.section.clone()
    }

    fn bind(&self, _resolver: &dyn ResolveReference) -> Result<Vec<Value>, ResolveError> {
        Ok(vec![
            text(&self.section),
            text(&self.title),
            text(&self.instructor),
            text(&self.credits),
            optional_text(self.days.as_deref()),
            optional_text(self.start_time.as_deref()),
            optional_text(self.end_time.as_deref()),
            text(&self.location),
        ])
    }
}

impl TableRecord for SectionEntry {
    const TABLE: TableName = TableName::Section;

    fn label(&self) -> String {
        format!("{} / {}", self.course_section, self.student)
    }

    fn bind(&self, resolver: &dyn ResolveReference) -> Result<Vec<Value>, ResolveError> {
        Ok(vec![
            resolve_course(resolver, &self.course_section)?,
            text(&self.title),
            resolve_student(resolver, &self.student)?,
        ])
    }
}

impl TableRecord for Enrollment {
    const TABLE: TableName = TableName::Enrollment;

    fn label(&self) -> String {
        format!("{} / {}", self.student, self.course_section)
    }

    fn bind(&self, resolver: &dyn ResolveReference) -> Result<Vec<Value>, ResolveError> {
        Ok(vec![
            resolve_student(resolver, &self.student)?,
            resolve_course(resolver, &self.course_section)?,
            optional_text(self.grade.as_deref()),
        ])
    }
}

impl TableRecord for Team {
    const TABLE: TableName = TableName::Team;

    fn label(&self) -> String {
        self.name.clone()
    }

    fn bind(&self, _resolver: &dyn ResolveReference) -> Result<Vec<Value>, ResolveError> {
        Ok(vec![
            text(&self.id),
            text(&self.abbreviation),
            text(&self.name),
            text(&self.conference),
            text(&self.division),
        ])
    }
}

impl TableRecord for Address {
    const TABLE: TableName = TableName::Address;

    fn label(&self) -> String {
        format!("{} / {}", self.team, self.site)
    }

    fn bind(&self, resolver: &dyn ResolveReference) -> Result<Vec<Value>, ResolveError> {
        Ok(vec![
            resolve_team(resolver, &self.team)?,
            text(&self.site),
            text(&self.street),
            text(&self.city),
            text(&self.state),
            text(&self.zip),
            text(&self.phone),
            text(&self.url),
        ])
    }
}

impl TableRecord for Player {
    const TABLE: TableName = TableName::Player;

    fn label(&self) -> String {
        format!("{} ({})", self.name, self.team)
    }

    fn bind(&self, resolver: &dyn ResolveReference) -> Result<Vec<Value>, ResolveError> {
        Ok(vec![
            text(&self.id),
            text(&self.name),
            resolve_team(resolver, &self.team)?,
            text(&self.position),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Resolver over fixed maps
    struct FixedResolver {
        keys: HashMap<(TableName, String), i64>,
        rows: usize,
    }

    impl ResolveReference for FixedResolver {
        fn resolve(&self, table: TableName, column: &str, value: &str) -> Result<i64, ResolveError> {
            self.keys
                .get(&(table, value.to_string()))
                .copied()
                .ok_or(ResolveError::NotFound {
                    table,
                    column: column.to_string(),
                    value: value.to_string(),
                })
        }

        fn resolve_position(&self, table: TableName, position: i64) -> Result<i64, ResolveError> {
            if position >= 1 && position as usize <= self.rows {
                Ok(position * 10)
            } else {
                Err(ResolveError::PositionOutOfRange {
                    table,
                    position,
                    rows: self.rows,
                })
            }
        }
    }

    fn resolver() -> FixedResolver {
        let mut keys = HashMap::new();
        keys.insert((TableName::Major, "Biology".to_string()), 1);
        keys.insert((TableName::Course, "CS-150-A".to_string()), 7);
        keys.insert((TableName::Student, "Ada Lovelace".to_string()), 3);
        keys.insert((TableName::Team, "Minnesota Twins".to_string()), 4);
        FixedResolver { keys, rows: 5 }
    }

    #[test]
    fn test_student_major_binding() {
        let resolver = resolver();

        let with_major = Student::new("Ada Lovelace", Some(2024), Some("Biology".to_string()));
        assert_eq!(
            with_major.bind(&resolver).unwrap(),
            vec![text("Ada Lovelace"), Value::Int(2024), Value::BigInt(1)]
        );

        let empty_major = Student::new("Alan Turing", None, Some(String::new()));
        assert_eq!(
            empty_major.bind(&resolver).unwrap(),
            vec![text("Alan Turing"), Value::Null, Value::Null]
        );

        let unknown_major = Student::new("Grace Hopper", None, Some("Music".to_string()));
        assert!(matches!(
            unknown_major.bind(&resolver),
            Err(ResolveError::NotFound { .. })
        ));
    }

    #[test]
    fn test_enrollment_binding() {
        let resolver = resolver();

        let by_position = Enrollment::new(PersonRef::Position(2), "CS-150-A", None);
        assert_eq!(
            by_position.bind(&resolver).unwrap(),
            vec![Value::BigInt(20), Value::BigInt(7), Value::Null]
        );

        let by_name = Enrollment::new(
            PersonRef::Name("Ada Lovelace".to_string()),
            "CS-150-A",
            Some("A".to_string()),
        );
        assert_eq!(by_name.bind(&resolver).unwrap()[0], Value::BigInt(3));

        let unknown_course = Enrollment::new(PersonRef::Position(1), "CS150", None);
        assert!(unknown_course.bind(&resolver).is_err());
    }

    #[test]
    fn test_section_entry_binding() {
        let entry = SectionEntry::new("CS-150-A", "Intro", PersonRef::Position(9));
        assert!(matches!(
            entry.bind(&resolver()),
            Err(ResolveError::PositionOutOfRange { position: 9, .. })
        ));
    }

    #[test]
    fn test_player_team_binding() {
        let resolver = resolver();

        let player = Player::new("545361", "Byron Buxton", "Minnesota Twins", "CF");
        assert_eq!(
            player.bind(&resolver).unwrap(),
            vec![
                text("545361"),
                text("Byron Buxton"),
                Value::BigInt(4),
                text("CF")
            ]
        );

        let traded = Player::new("1", "Someone", "Montreal Expos", "P");
        assert!(matches!(
            traded.bind(&resolver),
            Err(ResolveError::NotFound {
                table: TableName::Team,
                ..
            })
        ));
    }
}
