//! Reporting graph.
//!
//! Employees live in an arena indexed by roster position. Each employee has
//! at most one manager edge, resolved from the free-text boss reference, and
//! the reverse adjacency lists give direct reports. Reporting data is
//! self-reported, so references may be missing, ambiguous or cyclic.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::models::{Diagnostic, DiagnosticCode, EmployeeRecord, PositionCategory, Severity};

/// Case- and whitespace-insensitive form of a person's name.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Arena of employees with manager and direct-report edges.
#[derive(Debug, Clone, Default)]
pub struct ReportingGraph {
    ids: Vec<String>,
    categories: Vec<PositionCategory>,
    by_id: HashMap<String, usize>,
    manager: Vec<Option<usize>>,
    reports: Vec<Vec<usize>>,
}

/// The graph plus the problems found while resolving boss references.
#[derive(Debug, Clone)]
pub struct ReportingGraphResult {
    /// The resolved graph.
    pub graph: ReportingGraph,
    /// Unresolved, ambiguous and self references.
    pub diagnostics: Vec<Diagnostic>,
}

impl ReportingGraph {
    /// Builds the graph from assembled employee records.
    ///
    /// A boss reference resolves first as an employee number, then as a
    /// normalised name. References that match nobody, match several people
    /// or point back at the employee create no edge.
    pub fn build(employees: &[EmployeeRecord]) -> ReportingGraphResult {
        let mut graph = ReportingGraph {
            ids: employees.iter().map(|e| e.id.clone()).collect(),
            categories: employees.iter().map(|e| e.category).collect(),
            by_id: HashMap::with_capacity(employees.len()),
            manager: vec![None; employees.len()],
            reports: vec![Vec::new(); employees.len()],
        };
        for (index, employee) in employees.iter().enumerate() {
            graph.by_id.insert(employee.id.clone(), index);
        }

        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, employee) in employees.iter().enumerate() {
            by_name
                .entry(normalize_name(&employee.name))
                .or_default()
                .push(index);
        }

        let mut diagnostics = Vec::new();

        for (index, employee) in employees.iter().enumerate() {
            let Some(reference) = employee
                .boss_reference
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
            else {
                continue;
            };

            let resolved = match graph.by_id.get(reference) {
                Some(manager) => Ok(*manager),
                None => match by_name.get(&normalize_name(reference)).map(Vec::as_slice) {
                    Some([manager]) => Ok(*manager),
                    Some(several) if several.len() > 1 => Err(Diagnostic::for_employee(
                        DiagnosticCode::AmbiguousManager,
                        &employee.id,
                        Severity::Medium,
                        format!(
                            "Boss reference '{}' matches {} employees",
                            reference,
                            several.len()
                        ),
                    )),
                    _ => Err(Diagnostic::for_employee(
                        DiagnosticCode::UnresolvedManager,
                        &employee.id,
                        Severity::Medium,
                        format!("Boss reference '{}' matches no employee", reference),
                    )),
                },
            };

            match resolved {
                Ok(manager) if manager == index => {
                    diagnostics.push(Diagnostic::for_employee(
                        DiagnosticCode::SelfReportingManager,
                        &employee.id,
                        Severity::Low,
                        "Boss reference points at the employee",
                    ));
                }
                Ok(manager) => {
                    graph.manager[index] = Some(manager);
                    graph.reports[manager].push(index);
                }
                Err(diagnostic) => diagnostics.push(diagnostic),
            }
        }

        ReportingGraphResult { graph, diagnostics }
    }

    /// Number of employees in the arena.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Arena index of an employee number.
    pub fn index_of(&self, employee_id: &str) -> Option<usize> {
        self.by_id.get(employee_id).copied()
    }

    /// Employee number at an arena index.
    pub fn id(&self, index: usize) -> &str {
        &self.ids[index]
    }

    /// Category at an arena index.
    pub fn category(&self, index: usize) -> PositionCategory {
        self.categories[index]
    }

    /// Direct manager, if resolved.
    pub fn manager_of(&self, index: usize) -> Option<usize> {
        self.manager[index]
    }

    /// Direct reports, in roster order.
    pub fn direct_reports(&self, index: usize) -> &[usize] {
        &self.reports[index]
    }

    /// Up to `depth` managers above an employee, nearest first. Stops early on
    /// a cycle.
    pub fn boss_chain(&self, index: usize, depth: usize) -> Vec<usize> {
        let mut chain = Vec::with_capacity(depth);
        let mut visited = HashSet::from([index]);
        let mut current = index;

        while chain.len() < depth {
            match self.manager[current] {
                Some(manager) if visited.insert(manager) => {
                    chain.push(manager);
                    current = manager;
                }
                _ => break,
            }
        }

        chain
    }

    /// Line leaders reachable below `root`.
    ///
    /// Walks breadth-first through upper-management employees only. Line
    /// leaders are collected and not expanded; any other category stops the
    /// walk. The root is never part of the result and each employee appears
    /// at most once, even when the reporting data contains cycles.
    pub fn reachable_line_leads(&self, root: usize) -> Vec<usize> {
        let mut visited = HashSet::from([root]);
        let mut queue: VecDeque<usize> = self.reports[root].iter().copied().collect();
        let mut found = Vec::new();

        while let Some(index) = queue.pop_front() {
            if !visited.insert(index) {
                continue;
            }

            let category = self.categories[index];
            if category == PositionCategory::LineLeader {
                found.push(index);
            } else if category.is_upper_management() {
                queue.extend(self.reports[index].iter().copied());
            }
        }

        found
    }
}
