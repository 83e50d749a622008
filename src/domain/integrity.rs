//! Read-only audit of a raffle's stored results.
//!
//! [`audit`] is a pure function over rows loaded by the persistence layer.
//! Findings are returned as data; nothing here repairs or rejects state.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use utoipa::ToSchema;

use super::{DrawEvent, DrawEventId, ParticipantId, Raffle, RaffleId};

/// How serious a finding is. Only errors make a report invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Structural invariant broken.
    Error,
    /// Unusual but possibly legitimate.
    Warning,
}

/// Named category of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A participant holds more than one result row in the raffle.
    DuplicateWinner,
    /// An event uses the same position twice.
    DuplicatePosition,
    /// An event's positions are not the dense sequence `1..k'`.
    PositionGap,
    /// An event's stored winner count differs from its result rows.
    WinnerCountMismatch,
    /// An event has no result rows.
    EmptyDrawEvent,
    /// Result rows reference an event that does not exist.
    MissingDrawEvent,
    /// A result row references a participant that no longer exists.
    MissingParticipant,
    /// A result row references a participant of another raffle.
    ForeignParticipant,
    /// The raffle holds more result rows than its configured winner count.
    WinnerCountExceeded,
    /// The audited event does not exist in this raffle.
    UnknownDrawEvent,
}

/// One audit finding.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IntegrityIssue {
    /// Finding category.
    pub kind: IssueKind,
    /// Severity.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// Draw event involved, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draw_event_id: Option<DrawEventId>,
    /// Participant involved, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<ParticipantId>,
}

/// Result of auditing a raffle (or one of its draw events).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IntegrityReport {
    /// Audited raffle.
    pub raffle_id: RaffleId,
    /// Audited event, when the audit was scoped to one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draw_event_id: Option<DrawEventId>,
    /// `false` iff at least one issue has [`Severity::Error`].
    pub valid: bool,
    /// All findings, errors first.
    pub issues: Vec<IntegrityIssue>,
}

/// A stored result row joined with its participant's owning raffle.
#[derive(Debug, Clone)]
pub struct AuditRow {
    /// Result row primary key.
    pub result_id: i64,
    /// Participant referenced by the row.
    pub participant_id: ParticipantId,
    /// Stored position.
    pub position: i64,
    /// Event the row belongs to.
    pub draw_event_id: DrawEventId,
    /// Raffle owning the participant; `None` if the participant is gone.
    pub participant_raffle_id: Option<RaffleId>,
}

/// Audits stored results against the structural invariants.
///
/// With `scope` set, event-level checks only look at that event and
/// duplicate-winner checks only at participants appearing in it; the
/// raffle-wide winner count check always runs.
#[must_use]
pub fn audit(
    raffle: &Raffle,
    events: &[DrawEvent],
    rows: &[AuditRow],
    scope: Option<DrawEventId>,
) -> IntegrityReport {
    let mut issues = Vec::new();
    let in_scope = |event_id: DrawEventId| scope.is_none_or(|s| s == event_id);

    if let Some(event_id) = scope
        && !events.iter().any(|e| e.id == event_id)
        && !rows.iter().any(|r| r.draw_event_id == event_id)
    {
        issues.push(IntegrityIssue {
            kind: IssueKind::UnknownDrawEvent,
            severity: Severity::Error,
            message: format!("draw event {event_id} does not exist in this raffle"),
            draw_event_id: Some(event_id),
            participant_id: None,
        });
    }

    // (a) a participant wins at most once per raffle
    let mut by_participant: BTreeMap<ParticipantId, Vec<&AuditRow>> = BTreeMap::new();
    for row in rows {
        by_participant.entry(row.participant_id).or_default().push(row);
    }
    for (participant_id, held) in &by_participant {
        if held.len() > 1 && held.iter().any(|r| in_scope(r.draw_event_id)) {
            let events: BTreeSet<String> =
                held.iter().map(|r| r.draw_event_id.to_string()).collect();
            issues.push(IntegrityIssue {
                kind: IssueKind::DuplicateWinner,
                severity: Severity::Error,
                message: format!(
                    "participant {participant_id} holds {} result rows (events: {})",
                    held.len(),
                    events.into_iter().collect::<Vec<_>>().join(", ")
                ),
                draw_event_id: None,
                participant_id: Some(*participant_id),
            });
        }
    }

    // (b) dense positions per event
    let mut by_event: BTreeMap<DrawEventId, Vec<&AuditRow>> = BTreeMap::new();
    for row in rows {
        by_event.entry(row.draw_event_id).or_default().push(row);
    }
    for event in events.iter().filter(|e| in_scope(e.id)) {
        let held = by_event.get(&event.id).map_or(0, Vec::len);
        if held == 0 {
            issues.push(IntegrityIssue {
                kind: IssueKind::EmptyDrawEvent,
                severity: Severity::Error,
                message: format!("draw event {} has no result rows", event.id),
                draw_event_id: Some(event.id),
                participant_id: None,
            });
        } else if usize::try_from(event.winner_count).ok() != Some(held) {
            issues.push(IntegrityIssue {
                kind: IssueKind::WinnerCountMismatch,
                severity: Severity::Error,
                message: format!(
                    "draw event {} records {} winners but has {held} result rows",
                    event.id, event.winner_count
                ),
                draw_event_id: Some(event.id),
                participant_id: None,
            });
        }
    }
    for (event_id, held) in by_event.iter().filter(|(id, _)| in_scope(**id)) {
        if !events.iter().any(|e| e.id == *event_id) {
            issues.push(IntegrityIssue {
                kind: IssueKind::MissingDrawEvent,
                severity: Severity::Error,
                message: format!(
                    "{} result rows reference missing draw event {event_id}",
                    held.len()
                ),
                draw_event_id: Some(*event_id),
                participant_id: None,
            });
        }
        issues.extend(position_issues(*event_id, held));
    }

    // (c) winners still exist and belong to this raffle
    for row in rows.iter().filter(|r| in_scope(r.draw_event_id)) {
        match row.participant_raffle_id {
            None => issues.push(IntegrityIssue {
                kind: IssueKind::MissingParticipant,
                severity: Severity::Error,
                message: format!(
                    "result row {} references missing participant {}",
                    row.result_id, row.participant_id
                ),
                draw_event_id: Some(row.draw_event_id),
                participant_id: Some(row.participant_id),
            }),
            Some(owner) if owner != raffle.id => issues.push(IntegrityIssue {
                kind: IssueKind::ForeignParticipant,
                severity: Severity::Error,
                message: format!(
                    "result row {} references participant {} of raffle {owner}",
                    row.result_id, row.participant_id
                ),
                draw_event_id: Some(row.draw_event_id),
                participant_id: Some(row.participant_id),
            }),
            Some(_) => {}
        }
    }

    // (d) total winners against the configured count
    let total = rows.len();
    if usize::try_from(raffle.winner_count).is_ok_and(|k| total > k) {
        let first_draw = events.iter().map(|e| e.drawn_at).min();
        let reconfigured = first_draw.is_some_and(|at| raffle.config_updated_at > at);
        let message = if reconfigured {
            format!(
                "{total} result rows exceed the configured winner count of {}; \
                 the winner count was changed after the first draw",
                raffle.winner_count
            )
        } else {
            format!(
                "{total} result rows exceed the configured winner count of {}",
                raffle.winner_count
            )
        };
        issues.push(IntegrityIssue {
            kind: IssueKind::WinnerCountExceeded,
            severity: Severity::Warning,
            message,
            draw_event_id: None,
            participant_id: None,
        });
    }

    issues.sort_by_key(|i| i.severity == Severity::Warning);
    let valid = issues.iter().all(|i| i.severity != Severity::Error);
    IntegrityReport {
        raffle_id: raffle.id,
        draw_event_id: scope,
        valid,
        issues,
    }
}

fn position_issues(event_id: DrawEventId, rows: &[&AuditRow]) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();
    let mut seen = BTreeSet::new();
    for row in rows {
        if !seen.insert(row.position) {
            issues.push(IntegrityIssue {
                kind: IssueKind::DuplicatePosition,
                severity: Severity::Error,
                message: format!("draw event {event_id} repeats position {}", row.position),
                draw_event_id: Some(event_id),
                participant_id: Some(row.participant_id),
            });
        }
    }
    let expected: BTreeSet<i64> = (1..=i64::try_from(seen.len()).unwrap_or(i64::MAX)).collect();
    if seen != expected {
        let missing: Vec<String> = expected.difference(&seen).map(ToString::to_string).collect();
        issues.push(IntegrityIssue {
            kind: IssueKind::PositionGap,
            severity: Severity::Error,
            message: format!(
                "draw event {event_id} positions are not 1..{}; missing {}",
                seen.len(),
                missing.join(", ")
            ),
            draw_event_id: Some(event_id),
            participant_id: None,
        });
    }
    issues
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::domain::{FieldConfig, RaffleStatus};

    fn raffle(winner_count: u32) -> Raffle {
        let now = Utc::now() - Duration::hours(1);
        Raffle {
            id: RaffleId::new(),
            name: "Giveaway".to_string(),
            description: None,
            winner_count,
            fields: FieldConfig::default(),
            status: RaffleStatus::Active,
            created_by: "admin".to_string(),
            created_at: now,
            updated_at: now,
            config_updated_at: now,
        }
    }

    fn event(raffle: &Raffle, winner_count: u32) -> DrawEvent {
        DrawEvent {
            id: DrawEventId::new(),
            raffle_id: raffle.id,
            requested_count: winner_count,
            winner_count,
            notes: None,
            drawn_by: "admin".to_string(),
            drawn_at: Utc::now(),
        }
    }

    fn row(raffle: &Raffle, event: &DrawEvent, position: i64) -> AuditRow {
        AuditRow {
            result_id: position,
            participant_id: ParticipantId::new(),
            position,
            draw_event_id: event.id,
            participant_raffle_id: Some(raffle.id),
        }
    }

    fn kinds(report: &IntegrityReport) -> Vec<IssueKind> {
        report.issues.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn clean_raffle_is_valid() {
        let r = raffle(2);
        let e = event(&r, 2);
        let rows = vec![row(&r, &e, 1), row(&r, &e, 2)];
        let report = audit(&r, &[e], &rows, None);
        assert!(report.valid);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn detects_duplicate_winner_across_events() {
        let r = raffle(5);
        let first = event(&r, 1);
        let second = event(&r, 1);
        let a = row(&r, &first, 1);
        let mut again = row(&r, &second, 1);
        again.participant_id = a.participant_id;
        let report = audit(&r, &[first, second], &[a, again], None);
        assert!(!report.valid);
        assert_eq!(kinds(&report), vec![IssueKind::DuplicateWinner]);
    }

    #[test]
    fn detects_gaps_and_repeated_positions() {
        let r = raffle(5);
        let gap = event(&r, 2);
        let repeat = event(&r, 2);
        let rows = vec![
            row(&r, &gap, 1),
            row(&r, &gap, 3),
            row(&r, &repeat, 1),
            row(&r, &repeat, 1),
        ];
        let report = audit(&r, &[gap.clone(), repeat.clone()], &rows, None);
        let found = kinds(&report);
        assert!(!report.valid);
        assert!(found.contains(&IssueKind::PositionGap));
        assert!(found.contains(&IssueKind::DuplicatePosition));
        assert!(
            report
                .issues
                .iter()
                .any(|i| i.kind == IssueKind::PositionGap && i.draw_event_id == Some(gap.id))
        );
    }

    #[test]
    fn detects_missing_and_foreign_participants() {
        let r = raffle(5);
        let e = event(&r, 2);
        let mut missing = row(&r, &e, 1);
        missing.participant_raffle_id = None;
        let mut foreign = row(&r, &e, 2);
        foreign.participant_raffle_id = Some(RaffleId::new());
        let report = audit(&r, &[e], &[missing, foreign], None);
        let found = kinds(&report);
        assert!(found.contains(&IssueKind::MissingParticipant));
        assert!(found.contains(&IssueKind::ForeignParticipant));
    }

    #[test]
    fn exceeding_winner_count_is_a_warning() {
        let r = raffle(1);
        let e = event(&r, 2);
        let rows = vec![row(&r, &e, 1), row(&r, &e, 2)];
        let report = audit(&r, &[e], &rows, None);
        assert!(report.valid);
        assert_eq!(kinds(&report), vec![IssueKind::WinnerCountExceeded]);
        assert!(report.issues.iter().all(|i| i.severity == Severity::Warning));
        assert!(!report.issues.iter().any(|i| i.message.contains("changed")));
    }

    #[test]
    fn warning_mentions_reconfiguration_after_first_draw() {
        let mut r = raffle(1);
        let e = event(&r, 2);
        r.config_updated_at = e.drawn_at + Duration::minutes(5);
        let rows = vec![row(&r, &e, 1), row(&r, &e, 2)];
        let report = audit(&r, &[e], &rows, None);
        assert!(report.issues.iter().any(|i| i.message.contains("changed after the first draw")));
    }

    #[test]
    fn empty_and_orphaned_events_are_errors() {
        let r = raffle(5);
        let empty = event(&r, 1);
        let orphan = event(&r, 1);
        let rows = vec![row(&r, &orphan, 1)];
        let report = audit(&r, &[empty], &rows, None);
        let found = kinds(&report);
        assert!(found.contains(&IssueKind::EmptyDrawEvent));
        assert!(found.contains(&IssueKind::MissingDrawEvent));
    }

    #[test]
    fn scoped_audit_ignores_other_events() {
        let r = raffle(5);
        let good = event(&r, 1);
        let bad = event(&r, 2);
        let rows = vec![row(&r, &good, 1), row(&r, &bad, 2)];
        let report = audit(&r, &[good.clone(), bad], &rows, Some(good.id));
        assert!(report.valid);
        assert_eq!(report.draw_event_id, Some(good.id));
    }

    #[test]
    fn scoped_audit_reports_unknown_event() {
        let r = raffle(5);
        let report = audit(&r, &[], &[], Some(DrawEventId::new()));
        assert!(!report.valid);
        assert_eq!(kinds(&report), vec![IssueKind::UnknownDrawEvent]);
    }
}
