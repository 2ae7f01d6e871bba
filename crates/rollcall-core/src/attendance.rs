//! Attendance records: one check-in (or absence) event each.
//!
//! Records are immutable once created and are never deleted. The ledger keeps
//! them newest first.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::identity::{Identity, IdentityId};

/// Sentinel written in place of a timestamp when nobody checked in.
pub const NO_CHECK_IN: &str = "-";

// ─── Identifiers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
  /// Identifier for a live check-in, derived from its creation time.
  pub fn for_check_in(at: DateTime<Utc>) -> Self {
    let suffix = Uuid::new_v4().simple().to_string();
    Self(format!("att-{}-{}", at.timestamp_millis(), &suffix[..8]))
  }

  /// Identifier for a synthetic row: one per user per day.
  pub fn synthetic(date: NaiveDate, user: &IdentityId) -> Self {
    Self(format!("att-{date}-{user}"))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for RecordId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
  Present,
  Late,
  Absent,
  Holiday,
}

impl AttendanceStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Present => "PRESENT",
      Self::Late => "LATE",
      Self::Absent => "ABSENT",
      Self::Holiday => "HOLIDAY",
    }
  }

  /// Status for a check-in at local time `at`.
  pub fn for_check_in(at: DateTime<FixedOffset>, late_after_hour: u32) -> Self {
    if at.hour() > late_after_hour { Self::Late } else { Self::Present }
  }

  /// `true` for statuses that mean the person actually showed up.
  pub fn is_attended(self) -> bool { matches!(self, Self::Present | Self::Late) }
}

// ─── Check-in time ───────────────────────────────────────────────────────────

/// When the person checked in, or [`CheckIn::Missed`] for absence rows.
///
/// Serialised as an RFC 3339 UTC string with millisecond precision, or as the
/// [`NO_CHECK_IN`] sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckIn {
  At(DateTime<Utc>),
  Missed,
}

impl CheckIn {
  pub fn instant(&self) -> Option<DateTime<Utc>> {
    match self {
      Self::At(at) => Some(*at),
      Self::Missed => None,
    }
  }
}

impl fmt::Display for CheckIn {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::At(at) => f.write_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true)),
      Self::Missed => f.write_str(NO_CHECK_IN),
    }
  }
}

impl Serialize for CheckIn {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for CheckIn {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    if raw == NO_CHECK_IN {
      return Ok(Self::Missed);
    }
    DateTime::parse_from_rfc3339(&raw)
      .map(|dt| Self::At(dt.with_timezone(&Utc)))
      .map_err(serde::de::Error::custom)
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
  pub id:               RecordId,
  pub user_id:          IdentityId,
  pub user_name:        String,
  /// Calendar day the event is attributed to.
  pub date:             NaiveDate,
  pub check_in_time:    CheckIn,
  pub status:           AttendanceStatus,
  pub confidence_score: f64,
}

impl AttendanceRecord {
  /// A live check-in for `who` at local time `now`.
  ///
  /// The record's `date` is the UTC calendar date of the check-in; lateness is
  /// judged on the local hour.
  pub fn check_in(
    who: &Identity,
    now: DateTime<FixedOffset>,
    confidence: f64,
    late_after_hour: u32,
  ) -> Self {
    let at = now.with_timezone(&Utc);
    Self {
      id:               RecordId::for_check_in(at),
      user_id:          who.id.clone(),
      user_name:        who.name.clone(),
      date:             at.date_naive(),
      check_in_time:    CheckIn::At(at),
      status:           AttendanceStatus::for_check_in(now, late_after_hour),
      confidence_score: confidence.clamp(0.0, 1.0),
    }
  }

  /// A synthetic "did not check in" row.
  pub fn absence(who: &Identity, date: NaiveDate) -> Self {
    Self {
      id:               RecordId::synthetic(date, &who.id),
      user_id:          who.id.clone(),
      user_name:        who.name.clone(),
      date,
      check_in_time:    CheckIn::Missed,
      status:           AttendanceStatus::Absent,
      confidence_score: 0.0,
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::identity::Role;

  fn jane() -> Identity {
    Identity {
      id:         IdentityId::new("u3"),
      name:       "Jane Smith".into(),
      email:      "jane@student.com".into(),
      role:       Role::Student,
      avatar_url: None,
      department: Some("Engineering".into()),
      student_id: Some("ST-2024-002".into()),
    }
  }

  #[test]
  fn check_in_time_serialises_like_an_iso_timestamp() {
    let at = Utc.with_ymd_and_hms(2026, 3, 2, 8, 15, 0).unwrap();
    let json = serde_json::to_string(&CheckIn::At(at)).unwrap();
    assert_eq!(json, "\"2026-03-02T08:15:00.000Z\"");
    assert_eq!(serde_json::to_string(&CheckIn::Missed).unwrap(), "\"-\"");
  }

  #[test]
  fn check_in_time_parses_sentinel_and_offsets() {
    let missed: CheckIn = serde_json::from_str("\"-\"").unwrap();
    assert_eq!(missed, CheckIn::Missed);

    let at: CheckIn = serde_json::from_str("\"2026-03-02T10:15:00+02:00\"").unwrap();
    assert_eq!(
      at.instant(),
      Some(Utc.with_ymd_and_hms(2026, 3, 2, 8, 15, 0).unwrap())
    );

    assert!(serde_json::from_str::<CheckIn>("\"yesterday\"").is_err());
  }

  #[test]
  fn lateness_uses_local_hour_and_date_uses_utc() {
    // 00:30 local at UTC+2 is still the previous day in UTC.
    let offset = FixedOffset::east_opt(2 * 3600).unwrap();
    let now = offset.with_ymd_and_hms(2026, 3, 2, 0, 30, 0).unwrap();
    let rec = AttendanceRecord::check_in(&jane(), now, 0.9, 9);
    assert_eq!(rec.status, AttendanceStatus::Present);
    assert_eq!(rec.date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());

    let ten = offset.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
    let rec = AttendanceRecord::check_in(&jane(), ten, 0.9, 9);
    assert_eq!(rec.status, AttendanceStatus::Late);

    let nine_fifty = offset.with_ymd_and_hms(2026, 3, 2, 9, 59, 0).unwrap();
    let rec = AttendanceRecord::check_in(&jane(), nine_fifty, 0.9, 9);
    assert_eq!(rec.status, AttendanceStatus::Present);
  }

  #[test]
  fn absence_rows_use_the_sentinel() {
    let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let rec = AttendanceRecord::absence(&jane(), date);
    assert_eq!(rec.id.as_str(), "att-2026-03-02-u3");
    assert_eq!(rec.check_in_time, CheckIn::Missed);
    assert_eq!(rec.confidence_score, 0.0);

    let json = serde_json::to_value(&rec).unwrap();
    assert_eq!(json["checkInTime"], "-");
    assert_eq!(json["status"], "ABSENT");
    assert_eq!(json["userName"], "Jane Smith");
  }
}
