//! Table definitions for the campus store
//!
//! Every table has a sequence-backed surrogate `id`, optional foreign keys to
//! other tables' ids, and a UNIQUE natural key. DDL is generated from the
//! static definitions below; creation order comes from a topological sort of
//! the foreign keys.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use petgraph::algo::toposort;
use petgraph::{Directed, Graph};
use serde::{Deserialize, Serialize};

use super::error::StoreError;

/// Every table the store knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableName {
    Major,
    Department,
    Location,
    Semester,
    Student,
    Faculty,
    Course,
    Section,
    Enrollment,
    Team,
    Address,
    Player,
}

impl TableName {
    pub const ALL: [TableName; 12] = [
        TableName::Major,
        TableName::Department,
        TableName::Location,
        TableName::Semester,
        TableName::Student,
        TableName::Faculty,
        TableName::Course,
        TableName::Section,
        TableName::Enrollment,
        TableName::Team,
        TableName::Address,
        TableName::Player,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Major => "major",
            TableName::Department => "department",
            TableName::Location => "location",
            TableName::Semester => "semester",
            TableName::Student => "student",
            TableName::Faculty => "faculty",
            TableName::Course => "course",
            TableName::Section => "section",
            TableName::Enrollment => "enrollment",
            TableName::Team => "team",
            TableName::Address => "address",
            TableName::Player => "player",
        }
    }

    /// Name of the id sequence backing this table
    pub fn sequence(&self) -> String {
        format!("{}_id_seq", self.as_str())
    }

    pub fn definition(&self) -> &'static TableDef {
        match self {
            TableName::Major => &MAJOR,
            TableName::Department => &DEPARTMENT,
            TableName::Location => &LOCATION,
            TableName::Semester => &SEMESTER,
            TableName::Student => &STUDENT,
            TableName::Faculty => &FACULTY,
            TableName::Course => &COURSE,
            TableName::Section => &SECTION,
            TableName::Enrollment => &ENROLLMENT,
            TableName::Team => &TEAM,
            TableName::Address => &ADDRESS,
            TableName::Player => &PLAYER,
        }
    }

    /// Tables this table holds foreign keys to
    pub fn dependencies(&self) -> Vec<TableName> {
        let mut deps: Vec<TableName> = self
            .definition()
            .columns
            .iter()
            .filter_map(|c| c.references)
            .collect();
        deps.dedup();
        deps
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TableName::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown table: {}", s))
    }
}

/// Column storage type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    /// Foreign key to another table's `id`
    Id,
}

impl ColumnType {
    fn sql(&self) -> &'static str {
        match self {
            ColumnType::Text => "VARCHAR",
            ColumnType::Integer => "INTEGER",
            ColumnType::Id => "BIGINT",
        }
    }
}

/// A column other than the surrogate `id`
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub references: Option<TableName>,
}

const fn text(name: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        column_type: ColumnType::Text,
        nullable: false,
        references: None,
    }
}

const fn optional_text(name: &'static str) -> ColumnDef {
    ColumnDef {
        nullable: true,
        ..text(name)
    }
}

const fn integer(name: &'static str, nullable: bool) -> ColumnDef {
    ColumnDef {
        name,
        column_type: ColumnType::Integer,
        nullable,
        references: None,
    }
}

const fn foreign(name: &'static str, table: TableName, nullable: bool) -> ColumnDef {
    ColumnDef {
        name,
        column_type: ColumnType::Id,
        nullable,
        references: Some(table),
    }
}

/// Static description of one table
#[derive(Debug)]
pub struct TableDef {
    pub name: TableName,
    /// Insert columns, in insert order
    pub columns: &'static [ColumnDef],
    /// Natural-key columns, UNIQUE together; empty when rows have no natural key
    pub natural_key: &'static [&'static str],
}

impl TableDef {
    /// Whether `column` can be used for a point lookup
    pub fn is_lookup_column(&self, column: &str) -> bool {
        self.natural_key.contains(&column)
    }

    /// `CREATE SEQUENCE` and `CREATE TABLE` statements
    pub fn create_sql(&self) -> String {
        let table = self.name.as_str();
        let mut lines = vec![format!(
            "    id BIGINT PRIMARY KEY DEFAULT nextval('{}')",
            self.name.sequence()
        )];

        for column in self.columns {
            let null = if column.nullable { "" } else { " NOT NULL" };
            lines.push(format!(
                "    {} {}{}",
                column.name,
                column.column_type.sql(),
                null
            ));
        }
        for column in self.columns {
            if let Some(target) = column.references {
                lines.push(format!(
                    "    FOREIGN KEY ({}) REFERENCES {} (id)",
                    column.name, target
                ));
            }
        }
        if !self.natural_key.is_empty() {
            lines.push(format!("    UNIQUE ({})", self.natural_key.join(", ")));
        }

        format!(
            "CREATE SEQUENCE {} START 1;\nCREATE TABLE {} (\n{}\n);\n",
            self.name.sequence(),
            table,
            lines.join(",\n")
        )
    }

    /// `DROP TABLE` and `DROP SEQUENCE` statements
    pub fn drop_sql(&self) -> String {
        format!(
            "DROP TABLE IF EXISTS {};\nDROP SEQUENCE IF EXISTS {};\n",
            self.name,
            self.name.sequence()
        )
    }

    /// Parameterized insert over every non-id column
    pub fn insert_sql(&self) -> String {
        let names: Vec<&str> = self.columns.iter().map(|c| c.name).collect();
        let params: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name,
            names.join(", "),
            params.join(", ")
        )
    }
}

pub static MAJOR: TableDef = TableDef {
    name: TableName::Major,
    columns: &[text("name")],
    natural_key: &["name"],
};

pub static DEPARTMENT: TableDef = TableDef {
    name: TableName::Department,
    columns: &[
        text("name"),
        optional_text("head"),
        optional_text("head_email"),
        optional_text("head_office"),
        optional_text("head_phone"),
    ],
    natural_key: &["name"],
};

pub static LOCATION: TableDef = TableDef {
    name: TableName::Location,
    columns: &[text("name"), integer("room_number", false)],
    natural_key: &["name", "room_number"],
};

pub static SEMESTER: TableDef = TableDef {
    name: TableName::Semester,
    columns: &[text("name"), text("start_date"), text("end_date")],
    natural_key: &["name"],
};

pub static STUDENT: TableDef = TableDef {
    name: TableName::Student,
    columns: &[
        text("name"),
        integer("grad_year", true),
        foreign("major_id", TableName::Major, true),
    ],
    natural_key: &["name"],
};

pub static FACULTY: TableDef = TableDef {
    name: TableName::Faculty,
    columns: &[
        text("name"),
        text("office"),
        text("extension"),
        text("username"),
    ],
    natural_key: &["username"],
};

pub static COURSE: TableDef = TableDef {
    name: TableName::Course,
    columns: &[
        text("section"),
        text("title"),
        text("instructor"),
        text("credits"),
        optional_text("days"),
        optional_text("start_time"),
        optional_text("end_time"),
        text("location"),
    ],
    natural_key: &["section"],
};

pub static SECTION: TableDef = TableDef {
    name: TableName::Section,
    columns: &[
        foreign("course_id", TableName::Course, false),
        text("title"),
        foreign("student_id", TableName::Student, false),
    ],
    natural_key: &[],
};

pub static ENROLLMENT: TableDef = TableDef {
    name: TableName::Enrollment,
    columns: &[
        foreign("student_id", TableName::Student, false),
        foreign("course_id", TableName::Course, false),
        optional_text("grade"),
    ],
    natural_key: &[],
};

pub static TEAM: TableDef = TableDef {
    name: TableName::Team,
    columns: &[
        text("external_id"),
        text("abbr"),
        text("name"),
        text("conference"),
        text("division"),
    ],
    natural_key: &["name"],
};

pub static ADDRESS: TableDef = TableDef {
    name: TableName::Address,
    columns: &[
        foreign("team_id", TableName::Team, false),
        text("site"),
        text("street"),
        text("city"),
        text("state"),
        text("zip"),
        text("phone"),
        text("url"),
    ],
    natural_key: &[],
};

pub static PLAYER: TableDef = TableDef {
    name: TableName::Player,
    columns: &[
        text("external_id"),
        text("name"),
        foreign("team_id", TableName::Team, false),
        text("position"),
    ],
    natural_key: &[],
};

/// Tables ordered so every table follows the tables it references
pub fn create_order() -> Result<Vec<TableName>, StoreError> {
    let mut graph = Graph::<TableName, (), Directed>::new();
    let nodes: HashMap<TableName, _> = TableName::ALL
        .iter()
        .map(|&t| (t, graph.add_node(t)))
        .collect();

    for table in TableName::ALL {
        for dependency in table.dependencies() {
            graph.add_edge(nodes[&dependency], nodes[&table], ());
        }
    }

    toposort(&graph, None)
        .map(|order| order.into_iter().map(|idx| graph[idx]).collect())
        .map_err(|cycle| StoreError::SchemaCycle(graph[cycle.node_id()]))
}

/// Tables ordered so every table precedes the tables it references
pub fn drop_order() -> Result<Vec<TableName>, StoreError> {
    let mut order = create_order()?;
    order.reverse();
    Ok(order)
}

/// Full rebuild script: drop everything, then create in dependency order
pub fn rebuild_sql() -> Result<String, StoreError> {
    let mut sql = String::new();
    for table in drop_order()? {
        sql.push_str(&table.definition().drop_sql());
    }
    for table in create_order()? {
        sql.push_str(&table.definition().create_sql());
    }
    Ok(sql)
}
