//! [`AttendanceDirectory`]: the identity registry and attendance ledger.
//!
//! The directory owns both collections and writes each one back as a whole
//! snapshot after every mutation. Mutations work on a copy and only replace
//! the in-memory state once the snapshot write succeeded, so a failed write
//! leaves memory and storage in agreement.

use std::sync::{Arc, Mutex as SyncMutex, PoisonError};

use chrono::{Datelike, Duration, NaiveDate, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;

use crate::{
  Error, Result,
  attendance::AttendanceRecord,
  clock::{Clock, SystemClock},
  config::DirectoryConfig,
  face::{FaceImage, FaceMatcher, SimulatedMatcher, Verification},
  identity::{Enrollment, Identity, IdentityId, Registration, Role, placeholder_avatar},
  report, seed,
  store::{ATTENDANCE_KEY, IDENTITIES_KEY, SnapshotStore},
  summary::{self, DaySummary, StudentStats},
};

/// Longest span [`AttendanceDirectory::summary_range`] will compute.
pub const MAX_RANGE_DAYS: i64 = 366;

/// Result of a kiosk scan: who was recognised and the row written for them.
#[derive(Debug, Clone, Serialize)]
pub struct Identification {
  pub record: AttendanceRecord,
  pub user:   Identity,
}

struct State {
  /// Registration order.
  identities:    Vec<Identity>,
  /// Newest first.
  attendance:    Vec<AttendanceRecord>,
  /// Most recently registered or enrolled identity; biases kiosk matching.
  last_enrolled: Option<IdentityId>,
}

pub struct AttendanceDirectory<S, M = SimulatedMatcher> {
  store:   S,
  matcher: M,
  clock:   Arc<dyn Clock>,
  config:  DirectoryConfig,
  state:   Mutex<State>,
  rng:     SyncMutex<StdRng>,
}

impl<S: SnapshotStore> AttendanceDirectory<S> {
  /// Open a directory with the simulated matcher and the system clock.
  pub async fn open(store: S, config: DirectoryConfig) -> Result<Self> {
    let matcher = match config.rng_seed {
      Some(seed) => SimulatedMatcher::seeded(seed.wrapping_add(1)),
      None => SimulatedMatcher::new(),
    };
    Self::open_with(store, matcher, Arc::new(SystemClock), config).await
  }
}

impl<S: SnapshotStore, M: FaceMatcher> AttendanceDirectory<S, M> {
  /// Load both snapshots from `store`, seeding whichever is missing or
  /// unreadable, and persist the seed immediately.
  pub async fn open_with(
    store: S,
    matcher: M,
    clock: Arc<dyn Clock>,
    config: DirectoryConfig,
  ) -> Result<Self> {
    config.validate()?;
    let mut rng = match config.rng_seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_entropy(),
    };

    let identities = match load_snapshot::<_, Vec<Identity>>(&store, IDENTITIES_KEY).await? {
      Some(identities) => identities,
      None => {
        let identities = seed::initial_identities();
        save_snapshot(&store, IDENTITIES_KEY, &identities).await?;
        tracing::info!(count = identities.len(), "seeded identity registry");
        identities
      }
    };

    let attendance = match load_snapshot::<_, Vec<AttendanceRecord>>(&store, ATTENDANCE_KEY).await? {
      Some(attendance) => attendance,
      None => {
        let attendance =
          seed::synthetic_attendance(&identities, clock.now(), config.seed_days, &mut rng);
        save_snapshot(&store, ATTENDANCE_KEY, &attendance).await?;
        tracing::info!(count = attendance.len(), "generated attendance history");
        attendance
      }
    };

    tracing::debug!(
      identities = identities.len(),
      records = attendance.len(),
      "directory opened"
    );

    Ok(Self {
      store,
      matcher,
      clock,
      config,
      state: Mutex::new(State { identities, attendance, last_enrolled: None }),
      rng: SyncMutex::new(rng),
    })
  }

  pub fn config(&self) -> &DirectoryConfig { &self.config }

  /// Today's date as records are dated: the UTC calendar date.
  pub fn today(&self) -> NaiveDate { self.clock.now().with_timezone(&Utc).date_naive() }

  // ─── Identities ───────────────────────────────────────────────────────────

  /// Look up the identity registered under `email` (exact match).
  ///
  /// Passwords are not checked anywhere; knowing the email is enough.
  pub async fn login(&self, email: &str) -> Result<Identity> {
    self.pause().await;
    let state = self.state.lock().await;
    state
      .identities
      .iter()
      .find(|i| i.email == email)
      .cloned()
      .ok_or_else(|| Error::NotFound("invalid credentials".into()))
  }

  /// Self-registration. Admins must present the configured secret code.
  pub async fn register(&self, input: Registration) -> Result<Identity> {
    self.pause().await;
    require_filled("name", &input.name)?;
    require_filled("email", &input.email)?;

    let mut state = self.state.lock().await;
    if state.identities.iter().any(|i| i.email == input.email) {
      return Err(Error::Conflict("email already exists".into()));
    }
    if input.role == Role::Admin
      && input.secret_code.as_deref() != Some(self.config.admin_secret.as_str())
    {
      return Err(Error::Unauthorized("invalid admin secret code".into()));
    }

    let (student_id, department) = match input.role {
      Role::Student => (
        Some(self.generate_student_id(&state.identities)?),
        Some("General".to_owned()),
      ),
      Role::Admin => (None, None),
    };
    let identity = Identity {
      id: IdentityId::generate(),
      avatar_url: Some(placeholder_avatar(&input.name)),
      name: input.name,
      email: input.email,
      role: input.role,
      department,
      student_id,
    };

    self.commit_identity(&mut state, identity.clone()).await?;
    tracing::info!(id = %identity.id, role = ?identity.role, "identity registered");
    Ok(identity)
  }

  /// Admin enrollment of a student, with the capture as their avatar.
  pub async fn add_student(&self, input: Enrollment) -> Result<Identity> {
    self.pause().await;
    require_filled("name", &input.name)?;
    require_filled("email", &input.email)?;
    require_filled("student ID", &input.student_id)?;

    let mut state = self.state.lock().await;
    if state.identities.iter().any(|i| i.email == input.email) {
      return Err(Error::Conflict("email already exists".into()));
    }
    if state
      .identities
      .iter()
      .any(|i| i.student_id.as_deref() == Some(input.student_id.as_str()))
    {
      return Err(Error::Conflict("student ID already exists".into()));
    }

    let identity = Identity {
      id:         IdentityId::generate(),
      name:       input.name,
      email:      input.email,
      role:       Role::Student,
      avatar_url: Some(input.face_image.data_url().to_owned()),
      department: Some(input.department),
      student_id: Some(input.student_id),
    };

    self.commit_identity(&mut state, identity.clone()).await?;
    tracing::info!(id = %identity.id, "student enrolled");
    Ok(identity)
  }

  pub async fn get_identity(&self, id: &IdentityId) -> Result<Identity> {
    self.pause().await;
    let state = self.state.lock().await;
    find_identity(&state.identities, id).cloned()
  }

  /// Students in registration order.
  pub async fn get_all_students(&self) -> Vec<Identity> {
    self.pause().await;
    let state = self.state.lock().await;
    state.identities.iter().filter(|i| i.is_student()).cloned().collect()
  }

  // ─── Faces and check-ins ──────────────────────────────────────────────────

  pub async fn verify_face(&self, image: &FaceImage) -> Verification {
    self.pause().await;
    self.matcher.verify(image).await
  }

  /// Self-service check-in for a known user.
  pub async fn mark_attendance(
    &self,
    user_id: &IdentityId,
    image: &FaceImage,
  ) -> Result<AttendanceRecord> {
    let verification = self.verify_face(image).await;
    if !verification.matched {
      return Err(Error::Unauthenticated("face not recognized".into()));
    }

    let mut state = self.state.lock().await;
    let user = find_identity(&state.identities, user_id)?.clone();
    let record = self.check_in(&state, &user, verification.score)?;

    self.commit_records(&mut state, vec![record.clone()]).await?;
    tracing::info!(user = %user.id, status = ?record.status, "attendance marked");
    Ok(record)
  }

  /// Kiosk flow: nobody is claimed up front; the matcher decides who it is.
  pub async fn identify_and_mark_attendance(&self, image: &FaceImage) -> Result<Identification> {
    self.pause().await;
    let mut state = self.state.lock().await;

    let students: Vec<Identity> =
      state.identities.iter().filter(|i| i.is_student()).cloned().collect();
    if students.is_empty() {
      return Err(Error::NotFound("no registered students found".into()));
    }

    let recognition = self
      .matcher
      .identify(image, &students, state.last_enrolled.as_ref())
      .await
      .ok_or_else(|| Error::Unauthenticated("face not recognized".into()))?;
    let user = students
      .into_iter()
      .find(|s| s.id == recognition.identity_id)
      .ok_or_else(|| Error::Unauthenticated("face not recognized".into()))?;
    let record = self.check_in(&state, &user, recognition.score)?;

    self.commit_records(&mut state, vec![record.clone()]).await?;
    tracing::info!(
      user = %user.id,
      score = recognition.score,
      status = ?record.status,
      "kiosk attendance marked"
    );
    Ok(Identification { record, user })
  }

  /// Write an `ABSENT` row for every student with no row at all on `date`.
  /// Returns the rows written; nothing is persisted if there are none.
  pub async fn record_absences(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>> {
    self.pause().await;
    let mut state = self.state.lock().await;

    let absences: Vec<AttendanceRecord> = state
      .identities
      .iter()
      .filter(|i| i.is_student())
      .filter(|s| !state.attendance.iter().any(|r| r.date == date && r.user_id == s.id))
      .map(|s| AttendanceRecord::absence(s, date))
      .collect();
    if absences.is_empty() {
      return Ok(absences);
    }

    self.commit_records(&mut state, absences.clone()).await?;
    tracing::info!(%date, count = absences.len(), "absences recorded");
    Ok(absences)
  }

  // ─── Queries ──────────────────────────────────────────────────────────────

  /// Rows for one user, newest first.
  pub async fn get_student_attendance(&self, user_id: &IdentityId) -> Vec<AttendanceRecord> {
    self.pause().await;
    let state = self.state.lock().await;
    state.attendance.iter().filter(|r| &r.user_id == user_id).cloned().collect()
  }

  /// The whole ledger, newest first.
  pub async fn get_all_attendance(&self) -> Vec<AttendanceRecord> {
    self.pause().await;
    self.state.lock().await.attendance.clone()
  }

  /// Rows attributed to `date`, newest first.
  pub async fn get_attendance_on(&self, date: NaiveDate) -> Vec<AttendanceRecord> {
    self.pause().await;
    let state = self.state.lock().await;
    state.attendance.iter().filter(|r| r.date == date).cloned().collect()
  }

  pub async fn daily_summary(&self, date: NaiveDate) -> DaySummary {
    self.pause().await;
    let state = self.state.lock().await;
    summary::summarize_day(&state.identities, &state.attendance, date)
  }

  /// One summary per day from `from` to `to`, both inclusive.
  pub async fn summary_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DaySummary>> {
    if from > to {
      return Err(Error::InvalidInput(format!("range start {from} is after its end {to}")));
    }
    let span = (to - from).num_days() + 1;
    if span > MAX_RANGE_DAYS {
      return Err(Error::InvalidInput(format!(
        "range covers {span} days; at most {MAX_RANGE_DAYS} are allowed"
      )));
    }

    self.pause().await;
    let state = self.state.lock().await;
    Ok(
      (0..span)
        .map(|offset| {
          summary::summarize_day(&state.identities, &state.attendance, from + Duration::days(offset))
        })
        .collect(),
    )
  }

  pub async fn student_stats(&self, user_id: &IdentityId) -> Result<StudentStats> {
    self.pause().await;
    let state = self.state.lock().await;
    find_identity(&state.identities, user_id)?;
    Ok(summary::student_stats(
      state.attendance.iter().filter(|r| &r.user_id == user_id),
    ))
  }

  /// CSV of the whole ledger, or of one day when `date` is given.
  pub async fn export_csv(&self, date: Option<NaiveDate>) -> Result<String> {
    self.pause().await;
    let state = self.state.lock().await;
    report::to_csv(
      state
        .attendance
        .iter()
        .filter(|r| date.is_none_or(|d| r.date == d)),
    )
  }

  // ─── Internals ────────────────────────────────────────────────────────────

  fn draw<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
    let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut *rng)
  }

  /// Sleep for the configured artificial latency, if any.
  async fn pause(&self) {
    let Some(latency) = self.config.simulated_latency else {
      return;
    };
    let (lo, hi) = latency.bounds();
    let delay = self.draw(|rng| rng.gen_range(lo..=hi));
    tokio::time::sleep(delay).await;
  }

  /// `ST-<year>-<0..=999>`, redrawn until unused.
  fn generate_student_id(&self, identities: &[Identity]) -> Result<String> {
    let year = self.clock.now().year();
    for _ in 0..1_000 {
      let candidate = format!("ST-{year}-{}", self.draw(|rng| rng.gen_range(0..1_000)));
      if !identities
        .iter()
        .any(|i| i.student_id.as_deref() == Some(candidate.as_str()))
      {
        return Ok(candidate);
      }
    }
    Err(Error::Conflict(format!("no free student IDs left for {year}")))
  }

  /// Build a check-in for `user` at the current time, honouring the
  /// repeat-check-in policy.
  fn check_in(&self, state: &State, user: &Identity, score: f64) -> Result<AttendanceRecord> {
    let record =
      AttendanceRecord::check_in(user, self.clock.now(), score, self.config.late_after_hour);

    if !self.config.allow_repeat_check_ins
      && state
        .attendance
        .iter()
        .any(|r| r.user_id == user.id && r.date == record.date && r.status.is_attended())
    {
      return Err(Error::Conflict(format!(
        "{} has already checked in on {}",
        user.name, record.date
      )));
    }
    Ok(record)
  }

  async fn commit_identity(&self, state: &mut State, identity: Identity) -> Result<()> {
    let mut next = state.identities.clone();
    let id = identity.id.clone();
    next.push(identity);
    save_snapshot(&self.store, IDENTITIES_KEY, &next).await?;
    state.identities = next;
    state.last_enrolled = Some(id);
    Ok(())
  }

  /// Prepend `records` (already newest first) to the ledger.
  async fn commit_records(&self, state: &mut State, records: Vec<AttendanceRecord>) -> Result<()> {
    let mut next = records;
    next.extend(state.attendance.iter().cloned());
    save_snapshot(&self.store, ATTENDANCE_KEY, &next).await?;
    state.attendance = next;
    Ok(())
  }
}

fn find_identity<'a>(identities: &'a [Identity], id: &IdentityId) -> Result<&'a Identity> {
  identities
    .iter()
    .find(|i| &i.id == id)
    .ok_or_else(|| Error::NotFound(format!("user {id} not found")))
}

fn require_filled(field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::InvalidInput(format!("{field} must not be empty")));
  }
  Ok(())
}

/// Load and parse the snapshot under `key`. Missing and unparsable documents
/// both come back as `None`, so the caller reseeds.
async fn load_snapshot<S, T>(store: &S, key: &str) -> Result<Option<T>>
where
  S: SnapshotStore,
  T: DeserializeOwned,
{
  let Some(document) = store.load(key).await.map_err(Error::storage)? else {
    tracing::debug!(key, "no snapshot stored");
    return Ok(None);
  };
  match serde_json::from_str(&document) {
    Ok(value) => Ok(Some(value)),
    Err(e) => {
      tracing::warn!(key, error = %e, "snapshot unreadable; regenerating");
      Ok(None)
    }
  }
}

async fn save_snapshot<S, T>(store: &S, key: &str, value: &T) -> Result<()>
where
  S: SnapshotStore,
  T: Serialize + ?Sized,
{
  let document = serde_json::to_string(value)?;
  store.save(key, document).await.map_err(Error::storage)
}
