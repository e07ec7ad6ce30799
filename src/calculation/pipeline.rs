//! Period pipeline.
//!
//! Runs every stage for one period in order. Each stage reads the outputs
//! of the stages before it and produces its own; nothing is written back
//! into earlier results. The per-employee pieces are merged into
//! [`EmployeeOutcome`]s at the end.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::{IncentiveConfig, PeriodPolicy};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AreaConflict, AuditAggregate, CategoryKind, ConditionId, Diagnostic, DiagnosticCode,
    EmployeeOutcome, EmployeeRecord, FailureAlert, InspectionAggregate, ManagerRef, PeriodInputs,
    PeriodOutcome, PositionCategory, RoleTier, Severity,
};

use super::{
    AmountSchedule, AuditHistory, ConditionEvaluation, ContinuousMonthsResult, IncentiveResult,
    ReportingGraph, calculate_individual_incentive, calculate_line_leader_incentive,
    calculate_upper_management_incentive, detect_consecutive_failures, evaluate_conditions,
    pooled_line_lead_average, reconcile_work_area, reconstruct_continuous_months,
    summarize_period,
};

/// Managers named in a failure alert: the direct boss and the boss's boss.
const ALERT_CHAIN_DEPTH: usize = 2;

/// Calculates every employee's incentive for one period.
///
/// # Errors
///
/// - `PolicyNotFound` when no policy is effective for the period
/// - `InvalidInput` when the roster repeats an employee number
/// - `SnapshotMismatch` when the previous snapshot is not for the preceding period
///
/// Everything else is reported as a [`Diagnostic`] on the outcome.
///
/// # Example
///
/// ```no_run
/// use incentive_engine::calculation::run_period;
/// use incentive_engine::config::ConfigLoader;
/// use incentive_engine::models::PeriodInputs;
///
/// let loader = ConfigLoader::load("./config/qip").unwrap();
/// let inputs: PeriodInputs = serde_json::from_str(r#"{"period": "2025-10", "roster": []}"#).unwrap();
/// let outcome = incentive_engine::calculation::run_period(loader.config(), &inputs).unwrap();
/// assert!(outcome.employees.is_empty());
/// ```
pub fn run_period(config: &IncentiveConfig, inputs: &PeriodInputs) -> EngineResult<PeriodOutcome> {
    let period = inputs.period;
    let policy = config.policy_for(period)?;
    validate_inputs(inputs)?;

    info!(
        period = %period,
        policy_effective_date = %policy.effective_date,
        roster = inputs.roster.len(),
        "Starting period calculation"
    );

    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    // Stage 1: consecutive failures from audit history
    let history = detect_consecutive_failures(period, &inputs.audits);
    diagnostics.extend(history.diagnostics.iter().cloned());
    debug!(
        period = %period,
        tagged_employees = history.roster.employees.len(),
        tagged_areas = history.roster.areas.len(),
        excluded_records = history.roster.excluded_records,
        "Audit history processed"
    );

    // Stage 2: assemble employee records (includes location reconciliation)
    let (records, location_discrepancies) =
        assemble_records(inputs, &history, policy, &mut diagnostics);

    // Stage 3: reporting graph
    let graph_result = ReportingGraph::build(&records);
    diagnostics.extend(graph_result.diagnostics);
    let graph = graph_result.graph;

    // Stage 4: conditions
    let evaluations: Vec<ConditionEvaluation> = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let disqualified_reports = graph
                .direct_reports(index)
                .iter()
                .filter(|report| policy.disqualifies(&records[**report].audit.consecutive))
                .count() as u32;
            evaluate_conditions(record, disqualified_reports, policy, 1)
        })
        .collect();

    // Stage 5: continuous months
    let counters_trusted = inputs.previous.counters_trusted();
    let months: Vec<ContinuousMonthsResult> = records
        .iter()
        .zip(&evaluations)
        .map(|(record, evaluation)| {
            let schedule = AmountSchedule::for_category(
                record.category,
                config.progression(),
                record.certified,
            );
            reconstruct_continuous_months(
                &record.id,
                evaluation.eligible,
                record.previous.as_ref(),
                counters_trusted,
                &schedule,
                2,
            )
        })
        .collect();
    diagnostics.extend(months.iter().filter_map(|m| m.diagnostic.clone()));

    // Stage 6: individual-contributor amounts
    let mut amounts: Vec<Option<IncentiveResult>> = records
        .iter()
        .zip(&evaluations)
        .zip(&months)
        .map(|((record, evaluation), months)| {
            let schedule = AmountSchedule::for_category(
                record.category,
                config.progression(),
                record.certified,
            );
            calculate_individual_incentive(
                record.category,
                evaluation.eligible,
                months.months,
                &schedule,
                3,
            )
        })
        .collect();

    // Stage 7: line leaders, from final individual amounts
    let individual_amounts = settled_amounts(&amounts);
    let share = config.rollup().line_leader.share;
    for (index, record) in records.iter().enumerate() {
        if amounts[index].is_none() && record.category.kind() == CategoryKind::LineLead {
            amounts[index] = Some(calculate_line_leader_incentive(
                index,
                &graph,
                &records,
                &individual_amounts,
                share,
                period,
                3,
            ));
        }
    }

    // Stage 8: upper management, from final line-leader amounts
    let line_lead_amounts = settled_amounts(&amounts);
    let pooled = pooled_line_lead_average(&graph, &records, &line_lead_amounts, period);
    for (index, record) in records.iter().enumerate() {
        if amounts[index].is_none() && record.category.is_upper_management() {
            let multiplier = config.rollup().multiplier(record.category).ok_or_else(|| {
                EngineError::CalculationError {
                    message: format!("No multiplier configured for '{}'", record.category.as_str()),
                }
            })?;
            amounts[index] = Some(calculate_upper_management_incentive(
                index,
                &graph,
                &records,
                &line_lead_amounts,
                multiplier,
                pooled,
                period,
                3,
            ));
        }
    }

    // Stage 9: merge
    let mut employees = Vec::with_capacity(records.len());
    for (((record, evaluation), months), amount) in records
        .iter()
        .zip(evaluations)
        .zip(months)
        .zip(amounts)
    {
        let amount = amount.ok_or_else(|| EngineError::CalculationError {
            message: format!("No amount calculated for employee '{}'", record.id),
        })?;
        if let Some(diagnostic) = &amount.diagnostic {
            diagnostics.push(diagnostic.clone());
        }
        employees.push(merge_outcome(record, evaluation, months, amount));
    }

    let failure_alerts = failure_alerts(&records, &graph);
    let summary = summarize_period(&employees, &records, period);

    info!(
        period = %period,
        employees = employees.len(),
        eligible = summary.eligible_employees,
        total_amount = %summary.total_amount,
        diagnostics = diagnostics.len(),
        "Period calculation completed"
    );

    Ok(PeriodOutcome {
        period,
        policy_effective_date: policy.effective_date,
        employees,
        location_discrepancies,
        consecutive_failures: history.roster,
        failure_alerts,
        summary,
        diagnostics,
    })
}

fn validate_inputs(inputs: &PeriodInputs) -> EngineResult<()> {
    let mut seen = HashSet::with_capacity(inputs.roster.len());
    if let Some(duplicate) = inputs
        .roster
        .iter()
        .find(|entry| !seen.insert(entry.employee_id.as_str()))
    {
        return Err(EngineError::InvalidInput {
            field: "roster".to_string(),
            message: format!("employee '{}' appears more than once", duplicate.employee_id),
        });
    }

    let expected = inputs.period.previous();
    match inputs.previous.period {
        Some(found) if found != expected => Err(EngineError::SnapshotMismatch { expected, found }),
        _ => Ok(()),
    }
}

fn assemble_records(
    inputs: &PeriodInputs,
    history: &AuditHistory,
    policy: &PeriodPolicy,
    diagnostics: &mut Vec<Diagnostic>,
) -> (Vec<EmployeeRecord>, Vec<AreaConflict>) {
    let mut attendance = HashMap::new();
    for record in &inputs.attendance {
        attendance
            .entry(record.employee_id.as_str())
            .or_insert(record);
    }

    let mut inspections: HashMap<&str, InspectionAggregate> = HashMap::new();
    for row in &inputs.inspections {
        let aggregate = inspections.entry(row.inspector_id.as_str()).or_default();
        aggregate.inspected_qty += row.inspected_qty;
        aggregate.pass_qty += row.pass_qty;
    }

    let mut previous = HashMap::new();
    for payout in &inputs.previous.payouts {
        let id = payout.employee_id.as_str();
        if previous.contains_key(id) {
            diagnostics.push(Diagnostic::for_employee(
                DiagnosticCode::DuplicatePayout,
                id,
                Severity::Medium,
                "Previous snapshot lists the employee more than once; first row used",
            ));
        } else {
            previous.insert(id, payout);
        }
    }

    let mut discrepancies = Vec::new();
    let mut records = Vec::with_capacity(inputs.roster.len());

    for entry in &inputs.roster {
        let id = entry.employee_id.as_str();
        let role_tier = RoleTier::parse(&entry.role_tier);
        let category = PositionCategory::classify(role_tier, &entry.position);

        if category == PositionCategory::Unclassified {
            diagnostics.push(Diagnostic::for_employee(
                DiagnosticCode::UnclassifiedPosition,
                id,
                Severity::Medium,
                format!(
                    "Could not classify tier '{}' with position '{}'",
                    entry.role_tier, entry.position
                ),
            ));
        }

        let work_area = reconcile_work_area(
            id,
            entry.work_area.as_deref(),
            &entry.position,
            history.latest_record_with_area(id),
        );
        if let Some(conflict) = work_area.as_ref().and_then(|area| area.conflict.clone()) {
            diagnostics.push(Diagnostic::for_employee(
                DiagnosticCode::WorkAreaConflict,
                id,
                Severity::Low,
                format!(
                    "Roster area '{}' differs from audit area '{}'",
                    conflict.roster_area, conflict.audit_area
                ),
            ));
            discrepancies.push(conflict);
        }
        if work_area.is_none() && policy.is_applicable(category, ConditionId::AreaRejectRate) {
            diagnostics.push(Diagnostic::for_employee(
                DiagnosticCode::MissingWorkArea,
                id,
                Severity::Medium,
                "No work area in roster or audit history",
            ));
        }

        let attendance_record = attendance.get(id).map(|record| (*record).clone());
        let entitled = category.kind() != CategoryKind::NotEntitled;
        match &attendance_record {
            None if entitled => diagnostics.push(Diagnostic::for_employee(
                DiagnosticCode::MissingAttendance,
                id,
                Severity::Medium,
                "No attendance record for rostered employee",
            )),
            Some(record) => {
                if let Some(working_days) = inputs.working_days {
                    if record.total_days != working_days {
                        diagnostics.push(Diagnostic::for_employee(
                            DiagnosticCode::WorkingDaysMismatch,
                            id,
                            Severity::Low,
                            format!(
                                "Attendance total {} differs from configured working days {}",
                                record.total_days, working_days
                            ),
                        ));
                    }
                }
            }
            None => {}
        }

        let counts = history.employee_counts(id);
        let audit = AuditAggregate {
            failures: counts.failures,
            audits: counts.audits,
            consecutive: history.employee_tag(id),
            area_reject_rate: work_area
                .as_ref()
                .and_then(|area| history.area_reject_rate(&area.value)),
        };

        records.push(EmployeeRecord {
            id: entry.employee_id.clone(),
            name: entry.name.clone(),
            role_tier,
            position: entry.position.clone(),
            category,
            boss_reference: entry.boss.clone(),
            work_area,
            hire_date: entry.hire_date,
            termination_date: entry.termination_date,
            protected_leave: entry.protected_leave,
            certified: entry.certified,
            attendance: attendance_record,
            audit,
            inspection: inspections.get(id).copied(),
            previous: previous.get(id).map(|payout| (*payout).clone()),
        });
    }

    (records, discrepancies)
}

/// Amounts already settled, with zero for employees still pending.
fn settled_amounts(amounts: &[Option<IncentiveResult>]) -> Vec<Decimal> {
    amounts
        .iter()
        .map(|result| result.as_ref().map_or(Decimal::ZERO, |r| r.amount))
        .collect()
}

fn merge_outcome(
    record: &EmployeeRecord,
    evaluation: ConditionEvaluation,
    months: ContinuousMonthsResult,
    amount: IncentiveResult,
) -> EmployeeOutcome {
    EmployeeOutcome {
        employee_id: record.id.clone(),
        name: record.name.clone(),
        role_tier: record.role_tier,
        position: record.position.clone(),
        category: record.category,
        work_area: record.area().map(str::to_string),
        conditions: evaluation.results,
        condition_summary: evaluation.summary,
        eligible: evaluation.eligible,
        consecutive_failure: record.audit.consecutive,
        previous_amount: record
            .previous
            .as_ref()
            .map_or(Decimal::ZERO, |payout| payout.amount),
        previous_continuous_months: months.previous_months,
        continuous_months: months.months,
        month_source: months.source,
        next_month_expected: months.next_month_expected,
        amount: amount.amount,
        breakdown: amount.breakdown,
        trace: vec![evaluation.audit_step, months.audit_step, amount.audit_step],
    }
}

fn failure_alerts(records: &[EmployeeRecord], graph: &ReportingGraph) -> Vec<FailureAlert> {
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.audit.consecutive.is_tagged())
        .map(|(index, record)| FailureAlert {
            employee_id: record.id.clone(),
            name: record.name.clone(),
            work_area: record.area().map(str::to_string),
            failure: record.audit.consecutive,
            boss_chain: graph
                .boss_chain(index, ALERT_CHAIN_DEPTH)
                .into_iter()
                .map(|manager| ManagerRef {
                    employee_id: records[manager].id.clone(),
                    name: records[manager].name.clone(),
                })
                .collect(),
        })
        .collect()
}
