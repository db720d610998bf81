//! Report queries over the staffing database.
//!
//! Provides typed request/row structs and the query functions behind the
//! employee roster, the project roster, project detail and the department
//! list.
//!
//! Filter values are always bound parameters. ORDER BY fragments are fixed
//! strings selected by matching on the closed sort enums below; no caller
//! text ever reaches the SQL.
//!
//! Sort keys, sort directions and the department filter are fail-open:
//! anything unrecognized maps to the view default instead of an error.

use rusqlite::{Connection, params, params_from_iter};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::access::AccessContext;
use crate::db::FOLD_FUNCTION;
use crate::error::HourbookError;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One employee roster row with derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeReportRow {
    pub first_name: String,
    pub last_name: String,
    pub department_name: String,
    pub dependent_count: usize,
    pub project_count: usize,
    pub total_hours: f64,
}

/// One project roster row with derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectReportRow {
    pub project_id: i64,
    pub project_name: String,
    pub department_name: String,
    pub headcount: usize,
    pub total_hours: f64,
}

/// A department, for filter dropdowns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Department {
    pub dnumber: i64,
    pub dname: String,
}

/// Project header for the detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub pnumber: i64,
    pub pname: String,
    pub dname: String,
}

/// An employee assigned to a project, with accumulated hours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub ssn: String,
    pub fname: String,
    pub lname: String,
    pub hours: f64,
}

/// An employee selectable in the assignment form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeOption {
    pub ssn: String,
    pub fname: String,
    pub lname: String,
}

/// Everything the project detail page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectDetail {
    pub project: ProjectSummary,
    pub assignments: Vec<Assignment>,
    pub employees: Vec<EmployeeOption>,
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Error returned by the strict sort parsers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortValue {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownSortValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownSortValue {}

/// Sort direction shared by both views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Parse a raw direction, falling back to ascending.
    #[must_use]
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        lenient(raw, "sort direction")
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => f.write_str("asc"),
            Self::Descending => f.write_str("desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = UnknownSortValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(UnknownSortValue {
                kind: "sort direction",
                value: other.to_string(),
            }),
        }
    }
}

/// Sort keys for the employee roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeSort {
    /// Last name, then first name, both in the requested direction.
    #[default]
    Name,
    /// Derived total hours across all projects.
    TotalHours,
}

impl EmployeeSort {
    /// Parse a raw sort key, falling back to [`EmployeeSort::Name`].
    #[must_use]
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        lenient(raw, "employee sort key")
    }

    const fn sql_clause(self, direction: SortDirection) -> &'static str {
        match (self, direction) {
            (Self::Name, SortDirection::Ascending) => "ORDER BY e.lname ASC, e.fname ASC",
            (Self::Name, SortDirection::Descending) => "ORDER BY e.lname DESC, e.fname DESC",
            (Self::TotalHours, SortDirection::Ascending) => {
                "ORDER BY COALESCE(w.total_hours, 0.0) ASC"
            }
            (Self::TotalHours, SortDirection::Descending) => {
                "ORDER BY COALESCE(w.total_hours, 0.0) DESC"
            }
        }
    }
}

impl fmt::Display for EmployeeSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => f.write_str("name"),
            Self::TotalHours => f.write_str("total_hours"),
        }
    }
}

impl FromStr for EmployeeSort {
    type Err = UnknownSortValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" | "by_name" | "byname" => Ok(Self::Name),
            "hours" | "total_hours" | "by_total_hours" | "bytotalhours" => Ok(Self::TotalHours),
            other => Err(UnknownSortValue {
                kind: "employee sort key",
                value: other.to_string(),
            }),
        }
    }
}

/// Sort keys for the project roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectSort {
    /// Project name.
    #[default]
    Name,
    /// Number of employees with hours on the project.
    Headcount,
    /// Derived total hours on the project.
    TotalHours,
}

impl ProjectSort {
    /// Parse a raw sort key, falling back to [`ProjectSort::Name`].
    #[must_use]
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        lenient(raw, "project sort key")
    }

    const fn sql_clause(self, direction: SortDirection) -> &'static str {
        match (self, direction) {
            (Self::Name, SortDirection::Ascending) => "ORDER BY p.pname ASC",
            (Self::Name, SortDirection::Descending) => "ORDER BY p.pname DESC",
            (Self::Headcount, SortDirection::Ascending) => "ORDER BY COALESCE(w.headcount, 0) ASC",
            (Self::Headcount, SortDirection::Descending) => {
                "ORDER BY COALESCE(w.headcount, 0) DESC"
            }
            (Self::TotalHours, SortDirection::Ascending) => {
                "ORDER BY COALESCE(w.total_hours, 0.0) ASC"
            }
            (Self::TotalHours, SortDirection::Descending) => {
                "ORDER BY COALESCE(w.total_hours, 0.0) DESC"
            }
        }
    }
}

impl fmt::Display for ProjectSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => f.write_str("name"),
            Self::Headcount => f.write_str("headcount"),
            Self::TotalHours => f.write_str("total_hours"),
        }
    }
}

impl FromStr for ProjectSort {
    type Err = UnknownSortValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" | "by_name" | "byname" => Ok(Self::Name),
            "headcount" | "by_headcount" | "byheadcount" => Ok(Self::Headcount),
            "hours" | "total_hours" | "by_total_hours" | "bytotalhours" => Ok(Self::TotalHours),
            other => Err(UnknownSortValue {
                kind: "project sort key",
                value: other.to_string(),
            }),
        }
    }
}

fn lenient<T>(raw: Option<&str>, kind: &'static str) -> T
where
    T: FromStr<Err = UnknownSortValue> + Default,
{
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return T::default();
    };
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(kind, value = raw, "unrecognized value, using default");
        T::default()
    })
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Filter and sort criteria for the employee roster.
///
/// When both filters are set they combine with AND semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeReportRequest {
    /// Case-insensitive substring matched against first OR last name.
    pub search: Option<String>,
    /// Restrict to one department number.
    pub department_id: Option<i64>,
    pub sort: EmployeeSort,
    pub direction: SortDirection,
}

impl EmployeeReportRequest {
    /// Build a request from raw caller text, applying the fail-open rules:
    /// blank search means no search, a department that is not a
    /// non-negative integer means no department filter, and unknown sort
    /// values mean the default ordering.
    #[must_use]
    pub fn from_raw(
        search: Option<&str>,
        department: Option<&str>,
        sort: Option<&str>,
        direction: Option<&str>,
    ) -> Self {
        Self {
            search: search
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            department_id: parse_department_filter(department),
            sort: EmployeeSort::parse_lenient(sort),
            direction: SortDirection::parse_lenient(direction),
        }
    }
}

/// Sort criteria for the project roster. The project view has no filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectReportRequest {
    pub sort: ProjectSort,
    pub direction: SortDirection,
}

impl ProjectReportRequest {
    /// Build a request from raw caller text; unknown values fall back to
    /// name ascending.
    #[must_use]
    pub fn from_raw(sort: Option<&str>, direction: Option<&str>) -> Self {
        Self {
            sort: ProjectSort::parse_lenient(sort),
            direction: SortDirection::parse_lenient(direction),
        }
    }
}

/// Parse a raw department filter. Anything other than a non-negative
/// integer means "no filter".
#[must_use]
pub fn parse_department_filter(raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<i64>() {
        Ok(id) if id >= 0 => Some(id),
        _ => {
            tracing::warn!(value = raw, "ignoring malformed department filter");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Report queries
// ---------------------------------------------------------------------------

const EMPLOYEE_REPORT_SQL: &str = "SELECT e.fname, e.lname, d.dname, \
     COALESCE(dep.num_dependents, 0), \
     COALESCE(w.num_projects, 0), \
     COALESCE(w.total_hours, 0.0) \
     FROM employee e \
     INNER JOIN department d ON d.dnumber = e.dno \
     LEFT JOIN (SELECT essn, COUNT(*) AS num_dependents \
                FROM dependent GROUP BY essn) dep ON dep.essn = e.ssn \
     LEFT JOIN (SELECT essn, COUNT(*) AS num_projects, SUM(hours) AS total_hours \
                FROM works_on GROUP BY essn) w ON w.essn = e.ssn";

const PROJECT_REPORT_SQL: &str = "SELECT p.pnumber, p.pname, d.dname, \
     COALESCE(w.headcount, 0), \
     COALESCE(w.total_hours, 0.0) \
     FROM project p \
     INNER JOIN department d ON d.dnumber = p.dnum \
     LEFT JOIN (SELECT pno, COUNT(*) AS headcount, SUM(hours) AS total_hours \
                FROM works_on GROUP BY pno) w ON w.pno = p.pnumber";

/// List employees with dependent count, project count and total hours.
///
/// Employees without dependents or assignments appear with zero metrics.
///
/// # Errors
///
/// Returns [`HourbookError::Store`] if the query fails.
pub fn list_employees(
    conn: &Connection,
    access: &AccessContext,
    request: &EmployeeReportRequest,
) -> Result<Vec<EmployeeReportRow>, HourbookError> {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(ref search) = request.search {
        // instr() on folded text: literal substring, no wildcard characters.
        param_values.push(Box::new(search.to_lowercase()));
        let n = param_values.len();
        conditions.push(format!(
            "(instr({FOLD_FUNCTION}(e.fname), ?{n}) > 0 OR instr({FOLD_FUNCTION}(e.lname), ?{n}) > 0)"
        ));
    }

    if let Some(department_id) = request.department_id {
        param_values.push(Box::new(department_id));
        conditions.push(format!("e.dno = ?{}", param_values.len()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let sort_clause = request.sort.sql_clause(request.direction);
    let sql = format!("{EMPLOYEE_REPORT_SQL}{where_clause} {sort_clause}");

    let mut stmt = conn.prepare(&sql)?;

    let params_ref: Vec<&dyn rusqlite::types::ToSql> =
        param_values.iter().map(AsRef::as_ref).collect();

    let rows = stmt.query_map(params_from_iter(params_ref), |row| {
        Ok(EmployeeReportRow {
            first_name: row.get(0)?,
            last_name: row.get(1)?,
            department_name: row.get(2)?,
            dependent_count: count_from_sql(row.get(3)?),
            project_count: count_from_sql(row.get(4)?),
            total_hours: row.get(5)?,
        })
    })?;

    let mut employees = Vec::new();
    for row in rows {
        employees.push(row?);
    }

    tracing::debug!(
        user = %access,
        search = request.search.as_deref(),
        department_id = request.department_id,
        sort = %request.sort,
        direction = %request.direction,
        rows = employees.len(),
        "employee report"
    );
    Ok(employees)
}

/// List projects with headcount and total hours.
///
/// Projects without assignments appear with zero metrics.
///
/// # Errors
///
/// Returns [`HourbookError::Store`] if the query fails.
pub fn list_projects(
    conn: &Connection,
    access: &AccessContext,
    request: &ProjectReportRequest,
) -> Result<Vec<ProjectReportRow>, HourbookError> {
    let sort_clause = request.sort.sql_clause(request.direction);
    let sql = format!("{PROJECT_REPORT_SQL} {sort_clause}");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok(ProjectReportRow {
            project_id: row.get(0)?,
            project_name: row.get(1)?,
            department_name: row.get(2)?,
            headcount: count_from_sql(row.get(3)?),
            total_hours: row.get(4)?,
        })
    })?;

    let mut projects = Vec::new();
    for row in rows {
        projects.push(row?);
    }

    tracing::debug!(
        user = %access,
        sort = %request.sort,
        direction = %request.direction,
        rows = projects.len(),
        "project report"
    );
    Ok(projects)
}

/// List all departments ordered by name.
///
/// # Errors
///
/// Returns [`HourbookError::Store`] if the query fails.
pub fn list_departments(
    conn: &Connection,
    access: &AccessContext,
) -> Result<Vec<Department>, HourbookError> {
    let mut stmt = conn.prepare("SELECT dnumber, dname FROM department ORDER BY dname ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok(Department {
            dnumber: row.get(0)?,
            dname: row.get(1)?,
        })
    })?;

    let mut departments = Vec::new();
    for row in rows {
        departments.push(row?);
    }

    tracing::debug!(user = %access, rows = departments.len(), "department list");
    Ok(departments)
}

/// Fetch a project with its assigned employees and the full employee list.
///
/// # Errors
///
/// Returns [`HourbookError::NotFound`] if no project has this number, or
/// [`HourbookError::Store`] if a query fails.
pub fn get_project_detail(
    conn: &Connection,
    access: &AccessContext,
    project_id: i64,
) -> Result<ProjectDetail, HourbookError> {
    let project = match conn.query_row(
        "SELECT p.pnumber, p.pname, d.dname \
         FROM project p \
         INNER JOIN department d ON d.dnumber = p.dnum \
         WHERE p.pnumber = ?1",
        params![project_id],
        |row| {
            Ok(ProjectSummary {
                pnumber: row.get(0)?,
                pname: row.get(1)?,
                dname: row.get(2)?,
            })
        },
    ) {
        Ok(project) => project,
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            return Err(HourbookError::NotFound {
                entity: "project",
                id: project_id.to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let assignments = get_assignments(conn, project_id)?;
    let employees = list_employee_options(conn)?;

    tracing::debug!(
        user = %access,
        project_id,
        assignments = assignments.len(),
        "project detail"
    );
    Ok(ProjectDetail {
        project,
        assignments,
        employees,
    })
}

fn get_assignments(conn: &Connection, project_id: i64) -> rusqlite::Result<Vec<Assignment>> {
    let mut stmt = conn.prepare(
        "SELECT e.ssn, e.fname, e.lname, w.hours \
         FROM works_on w \
         INNER JOIN employee e ON e.ssn = w.essn \
         WHERE w.pno = ?1 \
         ORDER BY e.lname ASC, e.fname ASC",
    )?;
    let rows = stmt.query_map(params![project_id], |row| {
        Ok(Assignment {
            ssn: row.get(0)?,
            fname: row.get(1)?,
            lname: row.get(2)?,
            hours: row.get(3)?,
        })
    })?;

    let mut assignments = Vec::new();
    for row in rows {
        assignments.push(row?);
    }
    Ok(assignments)
}

fn list_employee_options(conn: &Connection) -> rusqlite::Result<Vec<EmployeeOption>> {
    let mut stmt =
        conn.prepare("SELECT ssn, fname, lname FROM employee ORDER BY lname ASC, fname ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok(EmployeeOption {
            ssn: row.get(0)?,
            fname: row.get(1)?,
            lname: row.get(2)?,
        })
    })?;

    let mut employees = Vec::new();
    for row in rows {
        employees.push(row?);
    }
    Ok(employees)
}

fn count_from_sql(count: i64) -> usize {
    usize::try_from(count).unwrap_or(usize::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{company_db, empty_db, tester};

    fn last_names(rows: &[EmployeeReportRow]) -> Vec<&str> {
        rows.iter().map(|r| r.last_name.as_str()).collect()
    }

    fn project_names(rows: &[ProjectReportRow]) -> Vec<&str> {
        rows.iter().map(|r| r.project_name.as_str()).collect()
    }

    fn employees(conn: &Connection, request: &EmployeeReportRequest) -> Vec<EmployeeReportRow> {
        list_employees(conn, &tester(), request).expect("list employees")
    }

    fn projects(conn: &Connection, request: &ProjectReportRequest) -> Vec<ProjectReportRow> {
        list_projects(conn, &tester(), request).expect("list projects")
    }

    // ── sort parsing ────────────────────────────────────────────────────────

    #[test]
    fn employee_sort_accepts_known_spellings() {
        assert_eq!("name".parse::<EmployeeSort>(), Ok(EmployeeSort::Name));
        assert_eq!(" ByName ".parse::<EmployeeSort>(), Ok(EmployeeSort::Name));
        assert_eq!("hours".parse::<EmployeeSort>(), Ok(EmployeeSort::TotalHours));
        assert_eq!("TOTAL_HOURS".parse::<EmployeeSort>(), Ok(EmployeeSort::TotalHours));
        assert!("headcount".parse::<EmployeeSort>().is_err());
    }

    #[test]
    fn project_sort_accepts_known_spellings() {
        assert_eq!("name".parse::<ProjectSort>(), Ok(ProjectSort::Name));
        assert_eq!("headcount".parse::<ProjectSort>(), Ok(ProjectSort::Headcount));
        assert_eq!("by_total_hours".parse::<ProjectSort>(), Ok(ProjectSort::TotalHours));
    }

    #[test]
    fn lenient_parsers_fall_back_to_defaults() {
        assert_eq!(EmployeeSort::parse_lenient(Some("banana")), EmployeeSort::Name);
        assert_eq!(EmployeeSort::parse_lenient(None), EmployeeSort::Name);
        assert_eq!(ProjectSort::parse_lenient(Some("")), ProjectSort::Name);
        assert_eq!(
            SortDirection::parse_lenient(Some("sideways")),
            SortDirection::Ascending
        );
        assert_eq!(
            SortDirection::parse_lenient(Some("DESC")),
            SortDirection::Descending
        );
    }

    #[test]
    fn sort_clauses_never_contain_placeholders() {
        for sort in [EmployeeSort::Name, EmployeeSort::TotalHours] {
            for dir in [SortDirection::Ascending, SortDirection::Descending] {
                let clause = sort.sql_clause(dir);
                assert!(clause.starts_with("ORDER BY "));
                assert!(!clause.contains('?'));
            }
        }
        for sort in [ProjectSort::Name, ProjectSort::Headcount, ProjectSort::TotalHours] {
            for dir in [SortDirection::Ascending, SortDirection::Descending] {
                assert!(sort.sql_clause(dir).starts_with("ORDER BY "));
            }
        }
    }

    // ── request construction ────────────────────────────────────────────────

    #[test]
    fn department_filter_is_fail_open() {
        assert_eq!(parse_department_filter(Some("5")), Some(5));
        assert_eq!(parse_department_filter(Some(" 4 ")), Some(4));
        assert_eq!(parse_department_filter(Some("0")), Some(0));
        assert_eq!(parse_department_filter(Some("abc")), None);
        assert_eq!(parse_department_filter(Some("-1")), None);
        assert_eq!(parse_department_filter(Some("")), None);
        assert_eq!(parse_department_filter(Some("5.5")), None);
        assert_eq!(parse_department_filter(None), None);
    }

    #[test]
    fn from_raw_drops_blank_search() {
        let request = EmployeeReportRequest::from_raw(Some("   "), None, None, None);
        assert!(request.search.is_none());

        let request = EmployeeReportRequest::from_raw(Some(" an "), Some("x"), Some("hours"), Some("desc"));
        assert_eq!(request.search.as_deref(), Some("an"));
        assert_eq!(request.department_id, None);
        assert_eq!(request.sort, EmployeeSort::TotalHours);
        assert_eq!(request.direction, SortDirection::Descending);
    }

    // ── employee report ─────────────────────────────────────────────────────

    #[test]
    fn employee_report_default_is_name_ascending() {
        let conn = company_db();
        let rows = employees(&conn, &EmployeeReportRequest::default());
        assert_eq!(
            last_names(&rows),
            vec!["Borg", "English", "Jabbar", "Narayan", "Smith", "Wallace", "Wong", "Zelaya"]
        );
    }

    #[test]
    fn employee_report_name_descending_reverses_composite_key() {
        let conn = company_db();
        conn.execute(
            "INSERT INTO employee (ssn, fname, lname, dno) VALUES ('111111111', 'Anna', 'Wong', 5)",
            [],
        )
        .expect("insert second Wong");

        let request = EmployeeReportRequest {
            direction: SortDirection::Descending,
            ..Default::default()
        };
        let rows = employees(&conn, &request);
        let names: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.last_name.as_str(), r.first_name.as_str()))
            .collect();
        assert_eq!(names[0], ("Zelaya", "Alicia"));
        assert_eq!(names[1], ("Wong", "Franklin"));
        assert_eq!(names[2], ("Wong", "Anna"));
    }

    #[test]
    fn employee_report_computes_metrics() {
        let conn = company_db();
        let rows = employees(&conn, &EmployeeReportRequest::default());

        let wong = rows.iter().find(|r| r.last_name == "Wong").expect("Wong row");
        assert_eq!(wong.first_name, "Franklin");
        assert_eq!(wong.department_name, "Research");
        assert_eq!(wong.dependent_count, 3);
        assert_eq!(wong.project_count, 4);
        assert!((wong.total_hours - 40.0).abs() < f64::EPSILON);

        let wallace = rows.iter().find(|r| r.last_name == "Wallace").expect("Wallace row");
        assert_eq!(wallace.dependent_count, 1);
        assert_eq!(wallace.project_count, 2);
        assert!((wallace.total_hours - 35.0).abs() < f64::EPSILON);
    }

    #[test]
    fn employee_without_assignments_reports_zero() {
        let conn = company_db();
        let rows = employees(&conn, &EmployeeReportRequest::default());

        let borg = rows.iter().find(|r| r.last_name == "Borg").expect("Borg must not be dropped");
        assert_eq!(borg.project_count, 0);
        assert_eq!(borg.dependent_count, 0);
        assert!(borg.total_hours.abs() < f64::EPSILON);
    }

    #[test]
    fn employee_report_sorts_by_total_hours() {
        let conn = company_db();
        let request = EmployeeReportRequest {
            sort: EmployeeSort::TotalHours,
            ..Default::default()
        };
        let rows = employees(&conn, &request);
        assert_eq!(rows[0].last_name, "Borg");
        assert_eq!(rows[1].last_name, "Wallace");
        assert!(rows.windows(2).all(|w| w[0].total_hours <= w[1].total_hours));

        let request = EmployeeReportRequest {
            sort: EmployeeSort::TotalHours,
            direction: SortDirection::Descending,
            ..Default::default()
        };
        let rows = employees(&conn, &request);
        assert_eq!(rows.last().map(|r| r.last_name.as_str()), Some("Borg"));
        assert!(rows.windows(2).all(|w| w[0].total_hours >= w[1].total_hours));
    }

    #[test]
    fn search_matches_first_or_last_name_case_insensitively() {
        let conn = company_db();
        let request = EmployeeReportRequest::from_raw(Some("an"), None, None, None);
        let rows = employees(&conn, &request);
        assert_eq!(last_names(&rows), vec!["Narayan", "Wong"]);

        let request = EmployeeReportRequest::from_raw(Some("JOY"), None, None, None);
        let rows = employees(&conn, &request);
        assert_eq!(last_names(&rows), vec!["English"]);

        let request = EmployeeReportRequest::from_raw(Some("mit"), None, None, None);
        let rows = employees(&conn, &request);
        assert_eq!(last_names(&rows), vec!["Smith"]);
    }

    #[test]
    fn search_folds_non_ascii_letters() {
        let conn = company_db();
        conn.execute_batch(
            "INSERT INTO employee (ssn, fname, lname, dno) VALUES ('100000001', 'Élodie', 'Öztürk', 5);
             INSERT INTO employee (ssn, fname, lname, dno) VALUES ('100000002', 'Ángel', 'Muñoz', 4);",
        )
        .expect("insert accented employees");

        for needle in ["élodie", "ÉLODIE", "ÖZTÜRK", "öztürk"] {
            let request = EmployeeReportRequest::from_raw(Some(needle), None, None, None);
            assert_eq!(last_names(&employees(&conn, &request)), vec!["Öztürk"], "needle {needle}");
        }

        let request = EmployeeReportRequest::from_raw(Some("MUÑOZ"), None, None, None);
        assert_eq!(last_names(&employees(&conn, &request)), vec!["Muñoz"]);

        let request = EmployeeReportRequest::from_raw(Some("áng"), Some("4"), None, None);
        assert_eq!(last_names(&employees(&conn, &request)), vec!["Muñoz"]);
    }

    #[test]
    fn search_treats_wildcards_literally() {
        let conn = company_db();
        let request = EmployeeReportRequest::from_raw(Some("%"), None, None, None);
        assert!(employees(&conn, &request).is_empty());

        let request = EmployeeReportRequest::from_raw(Some("_"), None, None, None);
        assert!(employees(&conn, &request).is_empty());
    }

    #[test]
    fn search_text_is_never_interpreted_as_sql() {
        let conn = company_db();
        let request =
            EmployeeReportRequest::from_raw(Some("' OR 1=1; DROP TABLE employee; --"), None, None, None);
        assert!(employees(&conn, &request).is_empty());

        let all = employees(&conn, &EmployeeReportRequest::default());
        assert_eq!(all.len(), 8);
    }

    #[test]
    fn department_filter_restricts_rows() {
        let conn = company_db();
        let request = EmployeeReportRequest::from_raw(None, Some("4"), None, None);
        let rows = employees(&conn, &request);
        assert_eq!(last_names(&rows), vec!["Jabbar", "Wallace", "Zelaya"]);
        assert!(rows.iter().all(|r| r.department_name == "Administration"));
    }

    #[test]
    fn search_and_department_combine_with_and() {
        let conn = company_db();
        let request = EmployeeReportRequest::from_raw(Some("an"), Some("4"), None, None);
        assert!(employees(&conn, &request).is_empty());

        let request = EmployeeReportRequest::from_raw(Some("an"), Some("5"), None, None);
        assert_eq!(last_names(&employees(&conn, &request)), vec!["Narayan", "Wong"]);
    }

    #[test]
    fn malformed_department_matches_unfiltered_report() {
        let conn = company_db();
        let unfiltered = employees(&conn, &EmployeeReportRequest::default());
        let malformed = employees(
            &conn,
            &EmployeeReportRequest::from_raw(None, Some("research"), None, None),
        );
        assert_eq!(unfiltered, malformed);
    }

    #[test]
    fn unknown_sort_key_matches_default() {
        let conn = company_db();
        let default = employees(&conn, &EmployeeReportRequest::default());
        let banana = employees(
            &conn,
            &EmployeeReportRequest::from_raw(None, None, Some("banana"), Some("upward")),
        );
        assert_eq!(default, banana);
    }

    #[test]
    fn employee_report_on_empty_db_is_empty() {
        let conn = empty_db();
        assert!(employees(&conn, &EmployeeReportRequest::default()).is_empty());
    }

    // ── project report ──────────────────────────────────────────────────────

    #[test]
    fn project_report_default_is_name_ascending() {
        let conn = company_db();
        let rows = projects(&conn, &ProjectReportRequest::default());
        assert_eq!(
            project_names(&rows),
            vec![
                "Computerization",
                "Newbenefits",
                "Outreach",
                "ProductX",
                "ProductY",
                "ProductZ",
                "Reorganization"
            ]
        );
    }

    #[test]
    fn project_report_computes_metrics() {
        let conn = company_db();
        let rows = projects(&conn, &ProjectReportRequest::default());

        let product_y = rows.iter().find(|r| r.project_id == 2).expect("ProductY");
        assert_eq!(product_y.department_name, "Research");
        assert_eq!(product_y.headcount, 3);
        assert!((product_y.total_hours - 37.5).abs() < f64::EPSILON);
    }

    #[test]
    fn project_without_assignments_reports_zero() {
        let conn = company_db();
        let rows = projects(&conn, &ProjectReportRequest::default());

        let outreach = rows.iter().find(|r| r.project_id == 40).expect("Outreach must not be dropped");
        assert_eq!(outreach.headcount, 0);
        assert!(outreach.total_hours.abs() < f64::EPSILON);
    }

    #[test]
    fn project_report_sorts_by_headcount_and_hours() {
        let conn = company_db();
        let rows = projects(
            &conn,
            &ProjectReportRequest::from_raw(Some("headcount"), Some("desc")),
        );
        assert!(rows.windows(2).all(|w| w[0].headcount >= w[1].headcount));
        assert_eq!(rows.last().map(|r| r.project_id), Some(40));

        let rows = projects(&conn, &ProjectReportRequest::from_raw(Some("hours"), None));
        assert!(rows.windows(2).all(|w| w[0].total_hours <= w[1].total_hours));
        assert_eq!(rows[0].project_id, 40);
        assert_eq!(rows[1].project_name, "Reorganization");
    }

    #[test]
    fn project_unknown_sort_matches_default() {
        let conn = company_db();
        let default = projects(&conn, &ProjectReportRequest::default());
        let banana = projects(&conn, &ProjectReportRequest::from_raw(Some("banana"), Some("?")));
        assert_eq!(default, banana);
    }

    // ── detail and departments ──────────────────────────────────────────────

    #[test]
    fn project_detail_lists_assignments_and_all_employees() {
        let conn = company_db();
        let detail = get_project_detail(&conn, &tester(), 10).expect("detail");

        assert_eq!(detail.project.pname, "Computerization");
        assert_eq!(detail.project.dname, "Administration");

        let assigned: Vec<(&str, f64)> = detail
            .assignments
            .iter()
            .map(|a| (a.lname.as_str(), a.hours))
            .collect();
        assert_eq!(assigned, vec![("Jabbar", 35.0), ("Wong", 10.0), ("Zelaya", 10.0)]);

        assert_eq!(detail.employees.len(), 8);
        assert_eq!(detail.employees[0].lname, "Borg");
    }

    #[test]
    fn project_detail_without_staff_has_no_assignments() {
        let conn = company_db();
        let detail = get_project_detail(&conn, &tester(), 40).expect("detail");
        assert!(detail.assignments.is_empty());
        assert_eq!(detail.employees.len(), 8);
    }

    #[test]
    fn project_detail_missing_is_not_found() {
        let conn = company_db();
        let err = get_project_detail(&conn, &tester(), 999).expect_err("missing project");
        assert!(
            matches!(err, HourbookError::NotFound { entity: "project", ref id } if id == "999"),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn departments_are_ordered_by_name() {
        let conn = company_db();
        let departments = list_departments(&conn, &tester()).expect("departments");
        let names: Vec<&str> = departments.iter().map(|d| d.dname.as_str()).collect();
        assert_eq!(names, vec!["Administration", "Headquarters", "Research"]);
        assert_eq!(departments[0].dnumber, 4);
    }

    #[test]
    fn report_rows_serialize_with_stable_field_names() {
        let conn = company_db();
        let request = EmployeeReportRequest::from_raw(Some("borg"), None, None, None);
        let rows = list_employees(&conn, &tester(), &request).expect("report");

        let json = serde_json::to_value(&rows).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!([{
                "first_name": "James",
                "last_name": "Borg",
                "department_name": "Headquarters",
                "dependent_count": 0,
                "project_count": 0,
                "total_hours": 0.0
            }])
        );
    }
}
