use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModuleError {
    #[error("unknown module: {0}")]
    NotFound(String),

    #[error("module {0} is closed")]
    Closed(String),
}

/// Whether a module's material can be opened this term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleStatus {
    Open,
    Closed,
}

impl ModuleStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ModuleStatus::Open => "Open",
            ModuleStatus::Closed => "Closed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub id: String,
    pub code: String,
    pub name: String,
    pub term: String,
    pub instructors: Vec<String>,
    pub status: ModuleStatus,
}

impl Module {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == ModuleStatus::Open
    }

    /// Case-insensitive substring match on name, code or any instructor.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.code.to_lowercase().contains(&needle)
            || self
                .instructors
                .iter()
                .any(|i| i.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentStatus {
    Pending,
    Submitted,
    Graded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub id: String,
    pub module_id: String,
    pub title: String,
    pub due_date: NaiveDate,
    pub grade: Option<String>,
    pub status: AssignmentStatus,
}

/// Every module on the student's record plus their coursework.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleCatalog {
    modules: Vec<Module>,
    assignments: Vec<Assignment>,
}

impl ModuleCatalog {
    #[must_use]
    pub fn new(modules: Vec<Module>, assignments: Vec<Assignment>) -> Self {
        Self {
            modules,
            assignments,
        }
    }

    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    #[must_use]
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == id)
    }

    /// Modules list filter. A blank query keeps everything.
    pub fn search<'a>(&'a self, query: &'a str) -> impl Iterator<Item = &'a Module> {
        let query = query.trim();
        self.modules.iter().filter(move |m| m.matches(query))
    }

    pub fn open_modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter().filter(|m| m.is_open())
    }

    /// Open a module's detail page.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::NotFound` for unknown ids and `ModuleError::Closed`
    /// for modules that are not running this term.
    pub fn open(&self, id: &str) -> Result<&Module, ModuleError> {
        let module = self
            .get(id)
            .ok_or_else(|| ModuleError::NotFound(id.to_string()))?;
        if !module.is_open() {
            return Err(ModuleError::Closed(module.code.clone()));
        }
        Ok(module)
    }

    pub fn assignments_for<'a>(&'a self, module_id: &'a str) -> impl Iterator<Item = &'a Assignment> {
        self.assignments
            .iter()
            .filter(move |a| a.module_id == module_id)
    }

    /// Twelve modules over three terms; only the first term is open.
    #[must_use]
    pub fn seeded() -> Self {
        const Y1S1: &str = "Year 1 - Semester 1";
        const Y1S2: &str = "Year 1 - Semester 2";
        const Y2S1: &str = "Year 2 - Semester 1";
        use ModuleStatus::{Closed, Open};

        let modules = vec![
            module("m1", "CS101", "Intro to Computer Science", Y1S1, &["Dr. Alan Turing"], Open),
            module("m2", "MATH101", "Calculus I", Y1S1, &["Dr. Ada Lovelace", "Prof. Newton"], Open),
            module("m3", "PHYS101", "Mechanics", Y1S1, &["Dr. Richard Feynman"], Open),
            module("m4", "CS102", "Discrete Mathematics", Y1S1, &["Prof. George Boole"], Open),
            module("m5", "CS103", "Data Structures", Y1S2, &["Dr. Grace Hopper"], Closed),
            module("m6", "MATH102", "Linear Algebra", Y1S2, &["Prof. Gauss", "Dr. Noether"], Closed),
            module("m7", "CS104", "Web Development", Y1S2, &["Tim Berners-Lee"], Closed),
            module("m8", "ETHICS101", "Ethics in Computing", Y1S2, &["Prof. Socrates"], Closed),
            module("m9", "CS201", "Algorithms", Y2S1, &["Dr. Dijkstra"], Closed),
            module("m10", "CS202", "Operating Systems", Y2S1, &["Ken Thompson", "Dennis Ritchie"], Closed),
            module("m11", "CS203", "Databases", Y2S1, &["Dr. Codd"], Closed),
            module("m12", "AI201", "Intro to AI", Y2S1, &["John McCarthy", "Marvin Minsky"], Closed),
        ];

        let assignments = [
            ("a1", "m1", "Algorithm Analysis Essay", (2023, 11, 15), None, AssignmentStatus::Pending),
            ("a2", "m1", "Python Basics Lab", (2023, 10, 20), Some("92%"), AssignmentStatus::Graded),
            ("a3", "m2", "Differential Equations Set", (2023, 11, 18), None, AssignmentStatus::Pending),
            ("a4", "m3", "Wave Function Report", (2023, 11, 1), None, AssignmentStatus::Submitted),
            ("a5", "m4", "Logic Gates Project", (2023, 12, 1), None, AssignmentStatus::Pending),
        ]
        .into_iter()
        .filter_map(|(id, module_id, title, (y, m, d), grade, status)| {
            Some(Assignment {
                id: id.into(),
                module_id: module_id.into(),
                title: title.into(),
                due_date: NaiveDate::from_ymd_opt(y, m, d)?,
                grade: grade.map(Into::into),
                status,
            })
        })
        .collect();

        Self::new(modules, assignments)
    }
}

fn module(
    id: &str,
    code: &str,
    name: &str,
    term: &str,
    instructors: &[&str],
    status: ModuleStatus,
) -> Module {
    Module {
        id: id.into(),
        code: code.into(),
        name: name.into(),
        term: term.into(),
        instructors: instructors.iter().map(|&i| i.to_string()).collect(),
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_matches_name_code_and_instructor() {
        let catalog = ModuleCatalog::seeded();
        let ids = |q: &str| catalog.search(q).map(|m| m.id.clone()).collect::<Vec<_>>();

        assert_eq!(ids("calculus"), ["m2"]);
        assert_eq!(ids("cs20"), ["m9", "m10", "m11"]);
        assert_eq!(ids("NEWTON"), ["m2"]);
        assert_eq!(ids("  ").len(), 12);
        assert!(ids("quantum").is_empty());
    }

    #[test]
    fn closed_modules_refuse_to_open() {
        let catalog = ModuleCatalog::seeded();
        assert_eq!(catalog.open("m1").unwrap().code, "CS101");
        assert_eq!(
            catalog.open("m9"),
            Err(ModuleError::Closed("CS201".into()))
        );
        assert_eq!(
            catalog.open("m99"),
            Err(ModuleError::NotFound("m99".into()))
        );
    }

    #[test]
    fn seeded_catalog_shape() {
        let catalog = ModuleCatalog::seeded();
        assert_eq!(catalog.modules().len(), 12);
        assert_eq!(catalog.open_modules().count(), 4);
        assert_eq!(catalog.assignments().len(), 5);
        assert_eq!(catalog.assignments_for("m1").count(), 2);
        assert!(
            catalog
                .assignments()
                .iter()
                .all(|a| catalog.get(&a.module_id).is_some())
        );
    }
}
