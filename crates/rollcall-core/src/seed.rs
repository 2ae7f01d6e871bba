//! Initial contents for an empty directory: three fixed identities and a few
//! days of randomly generated attendance history.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};
use rand::Rng;

use crate::{
  attendance::{AttendanceRecord, AttendanceStatus, CheckIn, RecordId},
  identity::{Identity, IdentityId, Role},
};

/// Confidence recorded on seeded check-ins.
const SEED_CONFIDENCE: f64 = 0.98;

/// The fixed admin and two students every fresh directory starts with.
pub fn initial_identities() -> Vec<Identity> {
  vec![
    Identity {
      id:         IdentityId::new("u1"),
      name:       "Admin User".into(),
      email:      "admin@faceauth.com".into(),
      role:       Role::Admin,
      avatar_url: Some("https://picsum.photos/id/1/200/200".into()),
      department: None,
      student_id: None,
    },
    Identity {
      id:         IdentityId::new("u2"),
      name:       "John Doe".into(),
      email:      "john@student.com".into(),
      role:       Role::Student,
      avatar_url: Some("https://picsum.photos/id/1005/200/200".into()),
      department: Some("Computer Science".into()),
      student_id: Some("ST-2024-001".into()),
    },
    Identity {
      id:         IdentityId::new("u3"),
      name:       "Jane Smith".into(),
      email:      "jane@student.com".into(),
      role:       Role::Student,
      avatar_url: Some("https://picsum.photos/id/1011/200/200".into()),
      department: Some("Engineering".into()),
      student_id: Some("ST-2024-002".into()),
    },
  ]
}

/// Draw a seeded status: roughly 80% present, 10% late, 10% absent.
fn seeded_status(rng: &mut impl Rng) -> AttendanceStatus {
  let roll: f64 = rng.r#gen();
  if roll > 0.9 {
    AttendanceStatus::Absent
  } else if roll > 0.8 {
    AttendanceStatus::Late
  } else {
    AttendanceStatus::Present
  }
}

/// Generate `days` days of history, ending today, for every student in
/// `identities`. Newest day first.
///
/// Check-ins fall between 09:00 and 09:29 local time. Each row's `date` is
/// the UTC date of that check-in, so `date` always agrees with
/// `checkInTime`.
pub fn synthetic_attendance(
  identities: &[Identity],
  now: DateTime<FixedOffset>,
  days: u32,
  rng: &mut impl Rng,
) -> Vec<AttendanceRecord> {
  let offset = *now.offset();
  let today = now.date_naive();
  let mut records = Vec::new();

  for back in 0..i64::from(days) {
    let local_day = today - Duration::days(back);

    for student in identities.iter().filter(|i| i.is_student()) {
      let status = seeded_status(rng);
      let minute = if status == AttendanceStatus::Absent { 0 } else { rng.gen_range(0..30) };
      let local = local_day.and_time(NaiveTime::MIN) + Duration::minutes(9 * 60 + minute);
      let Some(at) = offset.from_local_datetime(&local).single() else {
        continue;
      };
      let at = at.with_timezone(&Utc);
      let date = at.date_naive();

      records.push(match status {
        AttendanceStatus::Absent => AttendanceRecord::absence(student, date),
        _ => AttendanceRecord {
          id: RecordId::synthetic(date, &student.id),
          user_id: student.id.clone(),
          user_name: student.name.clone(),
          date,
          check_in_time: CheckIn::At(at),
          status,
          confidence_score: SEED_CONFIDENCE,
        },
      });
    }
  }

  records
}

#[cfg(test)]
mod tests {
  use rand::{SeedableRng, rngs::StdRng};

  use super::*;

  fn now() -> DateTime<FixedOffset> {
    FixedOffset::west_opt(5 * 3600)
      .unwrap()
      .with_ymd_and_hms(2026, 10, 19, 8, 0, 0)
      .unwrap()
  }

  #[test]
  fn seeds_one_admin_and_two_students() {
    let ids = initial_identities();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids.iter().filter(|i| i.is_student()).count(), 2);
    assert_eq!(ids[0].role, Role::Admin);
  }

  #[test]
  fn one_row_per_student_per_day() {
    let mut rng = StdRng::seed_from_u64(42);
    let records = synthetic_attendance(&initial_identities(), now(), 5, &mut rng);
    assert_eq!(records.len(), 10);
    assert!(records.iter().all(|r| r.user_id.as_str() != "u1"));

    let mut dates: Vec<_> = records.iter().map(|r| r.date).collect();
    dates.dedup();
    assert_eq!(dates.len(), 5);
    assert!(dates.windows(2).all(|w| w[0] > w[1]), "newest day first");
  }

  #[test]
  fn dates_agree_with_check_in_times() {
    let mut rng = StdRng::seed_from_u64(9);
    for r in synthetic_attendance(&initial_identities(), now(), 30, &mut rng) {
      match r.check_in_time {
        CheckIn::At(at) => {
          assert_eq!(r.date, at.date_naive());
          assert_eq!(r.confidence_score, SEED_CONFIDENCE);
          assert!(r.status.is_attended());
        }
        CheckIn::Missed => {
          assert_eq!(r.status, AttendanceStatus::Absent);
          assert_eq!(r.confidence_score, 0.0);
        }
      }
    }
  }

  #[test]
  fn status_mix_is_mostly_present() {
    let mut rng = StdRng::seed_from_u64(1234);
    let records = synthetic_attendance(&initial_identities(), now(), 366, &mut rng);
    let present = records
      .iter()
      .filter(|r| r.status == AttendanceStatus::Present)
      .count();
    let share = present as f64 / records.len() as f64;
    assert!((0.7..0.9).contains(&share), "present share {share}");
  }
}
