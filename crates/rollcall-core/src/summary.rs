//! Read models computed from the ledger on demand and never stored.
//!
//! A student can have several rows on one day (repeat check-ins, or a
//! synthetic absence followed by a late check-in). Summaries therefore
//! resolve exactly one status per student per day before counting:
//!
//! 1. the earliest `PRESENT`/`LATE` check-in decides, else
//! 2. `HOLIDAY` if a holiday row exists, else
//! 3. `ABSENT`, whether or not an absence row was written.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
  attendance::{AttendanceRecord, AttendanceStatus},
  identity::{Identity, IdentityId},
};

/// Headcount for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
  pub date:            NaiveDate,
  pub total_students:  usize,
  pub present:         usize,
  pub late:            usize,
  pub absent:          usize,
  pub holiday:         usize,
  /// `(present + late) / total_students`, as a percentage rounded to two
  /// decimals. Zero when there are no students.
  pub attendance_rate: f64,
}

/// Lifetime counters for one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentStats {
  pub total_records:   usize,
  pub present:         usize,
  pub late:            usize,
  pub absent:          usize,
  /// Whole percentage of records that are `PRESENT` or `LATE`.
  pub attendance_rate: u32,
}

/// Resolve each student's status on `date` and count.
pub fn summarize_day(
  students: &[Identity],
  records: &[AttendanceRecord],
  date: NaiveDate,
) -> DaySummary {
  // (earliest attended check-in, saw a holiday row)
  let mut seen: HashMap<&IdentityId, (Option<&AttendanceRecord>, bool)> = students
    .iter()
    .filter(|s| s.is_student())
    .map(|s| (&s.id, (None, false)))
    .collect();

  for record in records.iter().filter(|r| r.date == date) {
    let Some((earliest, holiday)) = seen.get_mut(&record.user_id) else {
      continue;
    };
    match record.status {
      AttendanceStatus::Present | AttendanceStatus::Late => {
        let earlier = match earliest {
          Some(current) => record.check_in_time.instant() < current.check_in_time.instant(),
          None => true,
        };
        if earlier {
          *earliest = Some(record);
        }
      }
      AttendanceStatus::Holiday => *holiday = true,
      AttendanceStatus::Absent => {}
    }
  }

  let total_students = seen.len();
  let (mut present, mut late, mut holiday) = (0, 0, 0);
  for (earliest, on_holiday) in seen.values() {
    match earliest.map(|r| r.status) {
      Some(AttendanceStatus::Present) => present += 1,
      Some(AttendanceStatus::Late) => late += 1,
      _ if *on_holiday => holiday += 1,
      _ => {}
    }
  }

  DaySummary {
    date,
    total_students,
    present,
    late,
    absent: total_students - present - late - holiday,
    holiday,
    attendance_rate: percentage(present + late, total_students),
  }
}

/// Counters over every record belonging to one student.
pub fn student_stats<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> StudentStats {
  let (mut total, mut present, mut late, mut absent) = (0, 0, 0, 0);
  for record in records {
    total += 1;
    match record.status {
      AttendanceStatus::Present => present += 1,
      AttendanceStatus::Late => late += 1,
      AttendanceStatus::Absent => absent += 1,
      AttendanceStatus::Holiday => {}
    }
  }

  let rate = ((present + late) as f64 / total.max(1) as f64 * 100.0).round() as u32;
  StudentStats {
    total_records: total,
    present,
    late,
    absent,
    attendance_rate: rate,
  }
}

fn percentage(part: usize, whole: usize) -> f64 {
  if whole == 0 {
    return 0.0;
  }
  (part as f64 / whole as f64 * 10_000.0).round() / 100.0
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};

  use super::*;
  use crate::{
    attendance::{CheckIn, RecordId},
    identity::Role,
  };

  fn person(id: &str, role: Role) -> Identity {
    Identity {
      id: IdentityId::new(id),
      name: id.to_uppercase(),
      email: format!("{id}@x.com"),
      role,
      avatar_url: None,
      department: None,
      student_id: None,
    }
  }

  fn day() -> NaiveDate { NaiveDate::from_ymd_opt(2026, 10, 19).unwrap() }

  fn row(user: &str, hour: u32, status: AttendanceStatus) -> AttendanceRecord {
    let at = Utc.with_ymd_and_hms(2026, 10, 19, hour, 0, 0).unwrap();
    AttendanceRecord {
      id: RecordId::for_check_in(at),
      user_id: IdentityId::new(user),
      user_name: user.to_uppercase(),
      date: day(),
      check_in_time: CheckIn::At(at),
      status,
      confidence_score: 0.9,
    }
  }

  #[test]
  fn repeat_check_ins_count_once() {
    let students = vec![person("a", Role::Student), person("b", Role::Student)];
    let records = vec![
      row("a", 11, AttendanceStatus::Late),
      row("a", 8, AttendanceStatus::Present),
      row("a", 12, AttendanceStatus::Late),
    ];
    let s = summarize_day(&students, &records, day());
    assert_eq!(s.total_students, 2);
    assert_eq!(s.present, 1, "earliest check-in decides");
    assert_eq!(s.late, 0);
    assert_eq!(s.absent, 1);
    assert_eq!(s.attendance_rate, 50.0);
  }

  #[test]
  fn absence_row_then_check_in_counts_as_attended() {
    let students = vec![person("a", Role::Student)];
    let records = vec![
      row("a", 10, AttendanceStatus::Late),
      AttendanceRecord::absence(&students[0], day()),
    ];
    let s = summarize_day(&students, &records, day());
    assert_eq!((s.late, s.absent), (1, 0));
  }

  #[test]
  fn admins_unknown_users_and_other_days_are_ignored() {
    let students = vec![person("admin", Role::Admin), person("a", Role::Student)];
    let mut other_day = row("a", 8, AttendanceStatus::Present);
    other_day.date = day().pred_opt().unwrap();
    let records = vec![
      row("admin", 8, AttendanceStatus::Present),
      row("ghost", 8, AttendanceStatus::Present),
      other_day,
    ];
    let s = summarize_day(&students, &records, day());
    assert_eq!(s.total_students, 1);
    assert_eq!((s.present, s.absent), (0, 1));
  }

  #[test]
  fn holidays_are_not_absences() {
    let students = vec![person("a", Role::Student), person("b", Role::Student)];
    let records = vec![row("a", 0, AttendanceStatus::Holiday)];
    let s = summarize_day(&students, &records, day());
    assert_eq!((s.holiday, s.absent), (1, 1));
  }

  #[test]
  fn empty_roster_has_zero_rate() {
    let s = summarize_day(&[], &[], day());
    assert_eq!(s.total_students, 0);
    assert_eq!(s.attendance_rate, 0.0);
  }

  #[test]
  fn rate_rounds_to_two_decimals() {
    let students: Vec<_> = ["a", "b", "c"].iter().map(|id| person(id, Role::Student)).collect();
    let records = vec![row("a", 8, AttendanceStatus::Present)];
    let s = summarize_day(&students, &records, day());
    assert_eq!(s.attendance_rate, 33.33);
  }

  #[test]
  fn stats_count_every_record() {
    let records = vec![
      row("a", 8, AttendanceStatus::Present),
      row("a", 10, AttendanceStatus::Late),
      row("a", 8, AttendanceStatus::Absent),
    ];
    let stats = student_stats(&records);
    assert_eq!(stats.total_records, 3);
    assert_eq!((stats.present, stats.late, stats.absent), (1, 1, 1));
    assert_eq!(stats.attendance_rate, 67);

    assert_eq!(student_stats(std::iter::empty::<&AttendanceRecord>()).attendance_rate, 0);
  }
}
