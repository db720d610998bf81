//! Relational schema for the staffing database.
//!
//! - `department`, `employee`, `project` and `dependent` are maintained by
//!   processes outside hourbook; hourbook only reads them
//! - `works_on` holds one accumulated hours total per (employee, project)
//!   pair and is written only through [`crate::db::assign`]

/// Schema DDL. Every statement is `IF NOT EXISTS`, so applying it to an
/// existing database is a no-op.
pub const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS department (
    dnumber INTEGER PRIMARY KEY,
    dname TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS employee (
    ssn TEXT PRIMARY KEY CHECK (length(trim(ssn)) > 0),
    fname TEXT NOT NULL,
    lname TEXT NOT NULL,
    dno INTEGER NOT NULL REFERENCES department(dnumber)
);

CREATE TABLE IF NOT EXISTS dependent (
    essn TEXT NOT NULL REFERENCES employee(ssn) ON DELETE CASCADE,
    dependent_name TEXT NOT NULL,
    relationship TEXT,
    PRIMARY KEY (essn, dependent_name)
);

CREATE TABLE IF NOT EXISTS project (
    pnumber INTEGER PRIMARY KEY,
    pname TEXT NOT NULL,
    dnum INTEGER NOT NULL REFERENCES department(dnumber)
);

CREATE TABLE IF NOT EXISTS works_on (
    essn TEXT NOT NULL REFERENCES employee(ssn),
    pno INTEGER NOT NULL REFERENCES project(pnumber),
    hours REAL NOT NULL DEFAULT 0 CHECK (hours >= 0),
    PRIMARY KEY (essn, pno)
);

CREATE INDEX IF NOT EXISTS idx_employee_dno ON employee(dno);
CREATE INDEX IF NOT EXISTS idx_project_dnum ON project(dnum);
CREATE INDEX IF NOT EXISTS idx_works_on_pno ON works_on(pno);
";

/// Tables every hourbook database must contain.
pub const REQUIRED_TABLES: &[&str] = &["department", "employee", "dependent", "project", "works_on"];

/// Secondary indexes created by [`SCHEMA_SQL`].
pub const REQUIRED_INDEXES: &[&str] = &["idx_employee_dno", "idx_project_dnum", "idx_works_on_pno"];
