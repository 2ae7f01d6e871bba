//! Face images and the matcher seam.
//!
//! [`FaceMatcher`] is where a real embedding comparison would plug in. The
//! only implementation here, [`SimulatedMatcher`], reports random scores and
//! picks kiosk candidates by chance, biased toward a hint.

use std::{
  future::Future,
  sync::{Mutex, PoisonError},
};

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  identity::{Identity, IdentityId},
};

// ─── Image ───────────────────────────────────────────────────────────────────

/// A captured face, as delivered by a webcam widget or upload:
/// `data:image/<type>;base64,<payload>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceImage {
  data_url:   String,
  media_type: String,
  bytes:      Vec<u8>,
}

impl FaceImage {
  /// Parse and validate an `image/*` data URL.
  pub fn from_data_url(data_url: impl Into<String>) -> Result<Self> {
    let data_url = data_url.into();
    let rest = data_url
      .strip_prefix("data:")
      .ok_or_else(|| Error::InvalidInput("please upload an image file".into()))?;
    let (header, payload) = rest
      .split_once(',')
      .ok_or_else(|| Error::InvalidInput("malformed data URL".into()))?;
    let media_type = header
      .strip_suffix(";base64")
      .ok_or_else(|| Error::InvalidInput("image data must be base64-encoded".into()))?;
    if !media_type.starts_with("image/") {
      return Err(Error::InvalidInput(format!(
        "please upload an image file, got {media_type:?}"
      )));
    }
    let bytes = B64
      .decode(payload.trim())
      .map_err(|e| Error::InvalidInput(format!("could not decode image: {e}")))?;
    if bytes.is_empty() {
      return Err(Error::InvalidInput("could not decode image: empty payload".into()));
    }

    Ok(Self { media_type: media_type.to_owned(), bytes, data_url })
  }

  /// Build from raw bytes, e.g. a multipart upload or a test fixture.
  pub fn from_bytes(media_type: &str, bytes: Vec<u8>) -> Result<Self> {
    Self::from_data_url(format!("data:{media_type};base64,{}", B64.encode(&bytes)))
  }

  /// The original data URL, usable directly as an `<img src>`.
  pub fn data_url(&self) -> &str { &self.data_url }

  pub fn media_type(&self) -> &str { &self.media_type }

  pub fn bytes(&self) -> &[u8] { &self.bytes }
}

// ─── Match results ───────────────────────────────────────────────────────────

/// Outcome of checking a face against the claimed identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verification {
  pub matched: bool,
  /// Match quality in `[0, 1]`.
  pub score:   f64,
}

/// The identity a kiosk scan was attributed to.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
  pub identity_id: IdentityId,
  pub score:       f64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Biometric matching backend.
pub trait FaceMatcher: Send + Sync {
  /// Decide whether `image` shows a live, matching face.
  fn verify<'a>(
    &'a self,
    image: &'a FaceImage,
  ) -> impl Future<Output = Verification> + Send + 'a;

  /// Pick which of `candidates` appears in `image`, if any.
  ///
  /// `hint` names the identity most likely to be in front of the camera (the
  /// most recently enrolled one); matchers are free to ignore it.
  fn identify<'a>(
    &'a self,
    image: &'a FaceImage,
    candidates: &'a [Identity],
    hint: Option<&'a IdentityId>,
  ) -> impl Future<Output = Option<Recognition>> + Send + 'a;
}

// ─── Simulation ──────────────────────────────────────────────────────────────

/// Stand-in matcher for demos: every face matches.
///
/// - `verify` scores uniformly in `[0.85, 0.99]`.
/// - `identify` honours the hint 70% of the time when it names a candidate and
///   otherwise picks a candidate uniformly, scoring in `[0.88, 0.98]`.
#[derive(Debug)]
pub struct SimulatedMatcher {
  rng:                Mutex<StdRng>,
  wander_probability: f64,
}

impl SimulatedMatcher {
  pub const VERIFY_SCORES: (f64, f64) = (0.85, 0.99);
  pub const IDENTIFY_SCORES: (f64, f64) = (0.88, 0.98);

  pub fn new() -> Self { Self::with_rng(StdRng::from_entropy()) }

  /// A matcher whose choices are reproducible.
  pub fn seeded(seed: u64) -> Self { Self::with_rng(StdRng::seed_from_u64(seed)) }

  fn with_rng(rng: StdRng) -> Self {
    Self { rng: Mutex::new(rng), wander_probability: 0.3 }
  }

  /// Probability of ignoring the hint during identification. Clamped to
  /// `[0, 1]`.
  pub fn with_wander_probability(mut self, p: f64) -> Self {
    self.wander_probability = p.clamp(0.0, 1.0);
    self
  }

  fn draw<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
    let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut *rng)
  }
}

impl Default for SimulatedMatcher {
  fn default() -> Self { Self::new() }
}

impl FaceMatcher for SimulatedMatcher {
  async fn verify(&self, _image: &FaceImage) -> Verification {
    let (lo, hi) = Self::VERIFY_SCORES;
    Verification { matched: true, score: self.draw(|rng| rng.gen_range(lo..=hi)) }
  }

  async fn identify(
    &self,
    _image: &FaceImage,
    candidates: &[Identity],
    hint: Option<&IdentityId>,
  ) -> Option<Recognition> {
    let (lo, hi) = Self::IDENTIFY_SCORES;
    self.draw(|rng| {
      let wander = rng.gen_bool(self.wander_probability);
      let hinted = hint
        .filter(|_| !wander)
        .and_then(|id| candidates.iter().find(|c| &c.id == id));
      let chosen = match hinted {
        Some(c) => c,
        None => candidates.choose(&mut *rng)?,
      };
      Some(Recognition {
        identity_id: chosen.id.clone(),
        score:       rng.gen_range(lo..=hi),
      })
    })
  }
}
