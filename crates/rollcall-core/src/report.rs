//! CSV export of attendance rows, in the column layout of the admin reports
//! page.

use crate::{Error, Result, attendance::AttendanceRecord};

pub const CSV_HEADER: [&str; 7] = [
  "Record ID",
  "Student ID",
  "Name",
  "Date",
  "Check In Time",
  "Status",
  "Confidence",
];

/// Render `records` as CSV text, header first, in the given order.
pub fn to_csv<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> Result<String> {
  let mut writer = csv::Writer::from_writer(Vec::new());
  writer.write_record(CSV_HEADER)?;
  for r in records {
    let date = r.date.to_string();
    let check_in = r.check_in_time.to_string();
    let confidence = r.confidence_score.to_string();
    writer.write_record([
      r.id.as_str(),
      r.user_id.as_str(),
      r.user_name.as_str(),
      date.as_str(),
      check_in.as_str(),
      r.status.as_str(),
      confidence.as_str(),
    ])?;
  }
  let bytes = writer
    .into_inner()
    .map_err(|e| Error::Export(e.to_string()))?;
  String::from_utf8(bytes).map_err(|e| Error::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::identity::{Identity, IdentityId, Role};

  #[test]
  fn header_then_one_line_per_record() {
    let who = Identity {
      id:         IdentityId::new("u9"),
      name:       "Smith, Jane".into(),
      email:      "jane@x.com".into(),
      role:       Role::Student,
      avatar_url: None,
      department: None,
      student_id: None,
    };
    let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let csv = to_csv(&[AttendanceRecord::absence(&who, date)]).unwrap();

    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines[0], "Record ID,Student ID,Name,Date,Check In Time,Status,Confidence");
    assert_eq!(lines[1], "att-2026-10-19-u9,u9,\"Smith, Jane\",2026-10-19,-,ABSENT,0");
    assert_eq!(lines.len(), 2);
  }

  #[test]
  fn empty_export_is_just_the_header() {
    let csv = to_csv(std::iter::empty::<&AttendanceRecord>()).unwrap();
    assert_eq!(csv.lines().count(), 1);
  }
}
