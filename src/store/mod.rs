//! Record store: directory-per-ad persistence with an atomic dedup gate
//!
//! Every harvested ad becomes one directory under the output root, named
//! from its price, sanitized title, and id. The exclusive creation of that
//! directory is the claim: if it already exists the ad was harvested by an
//! earlier run (or is being harvested by another worker right now) and the
//! whole enrichment pipeline is skipped.
//!
//! Record contents are staged in a sibling `.tmp` directory and promoted
//! only once everything has been written. A failed materialization removes
//! both the staging directory and the claimed directory, so the ad stays
//! retryable on a later run instead of being blocked forever by a partial
//! record.

use crate::model::{CandidateAd, EnrichedAd};
use crate::{HarvestError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Maximum length of the sanitized title in a directory name
const MAX_TITLE_LEN: usize = 100;

/// Structured dump file inside each record directory
const RECORD_FILE: &str = "inserat.json";

/// Optional flat-text digest file for forward-ready export
const FORWARD_FILE: &str = "fwimport.txt";

/// Maps ads to on-disk record directories under a fixed root
pub struct RecordStore {
    root: PathBuf,
    forward_ready: bool,
}

/// A successfully claimed record directory with its staging area
///
/// Dropping a claim without calling [`Claim::commit`] leaves the claimed
/// directory in place; callers that abort must call [`Claim::abandon`] to
/// make the ad retryable.
pub struct Claim {
    final_dir: PathBuf,
    staging_dir: PathBuf,
}

impl RecordStore {
    /// Opens (and creates if needed) a store rooted at the given path
    pub fn new(root: impl Into<PathBuf>, forward_ready: bool) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| HarvestError::Store {
            path: root.display().to_string(),
            source: e,
        })?;

        Ok(Self {
            root,
            forward_ready,
        })
    }

    /// Computes the record directory name for an ad
    pub fn dir_name(price: u32, title: &str, id: &str) -> String {
        format!("[{}€] {} {}", price, sanitize_title(title), id)
    }

    /// The full path an ad's record directory would occupy
    pub fn record_path(&self, price: u32, title: &str, id: &str) -> PathBuf {
        self.root.join(Self::dir_name(price, title, id))
    }

    /// Whether a candidate's record directory already exists
    ///
    /// Checked before any detail or image fetch so an already-harvested ad
    /// costs zero network calls.
    pub fn is_claimed(&self, candidate: &CandidateAd) -> bool {
        self.record_path(candidate.price, &candidate.title, &candidate.id)
            .exists()
    }

    /// Attempts to claim an ad's record directory
    ///
    /// Exclusive directory creation is the single atomicity point: when
    /// two workers race on the same ad, exactly one sees `Some`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Claim))` - Directory created; caller materializes the record
    /// * `Ok(None)` - Directory already exists, ad is already harvested
    /// * `Err(HarvestError)` - Creation failed for another reason
    pub fn try_claim(&self, ad: &EnrichedAd) -> Result<Option<Claim>> {
        let final_dir = self.record_path(ad.price, &ad.title, &ad.id);

        match fs::create_dir(&final_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(None),
            Err(e) => {
                return Err(HarvestError::Store {
                    path: final_dir.display().to_string(),
                    source: e,
                })
            }
        }

        let staging_dir = staging_path(&final_dir);
        if let Err(e) = fs::create_dir_all(&staging_dir) {
            // Release the claim so the ad is not blocked by a directory
            // we cannot stage anything for
            let _ = fs::remove_dir_all(&final_dir);
            return Err(HarvestError::Store {
                path: staging_dir.display().to_string(),
                source: e,
            });
        }

        Ok(Some(Claim {
            final_dir,
            staging_dir,
        }))
    }

    /// Whether forward-ready digest files should be written
    pub fn forward_ready(&self) -> bool {
        self.forward_ready
    }
}

impl Claim {
    /// Writes the structured dump (and optional digest) into staging
    ///
    /// The JSON dump keeps struct-field order and escapes everything
    /// outside ASCII.
    pub fn write_record(&self, ad: &EnrichedAd, forward_ready: bool) -> Result<()> {
        let json = serde_json::to_string_pretty(ad)?;
        fs::write(self.staging_dir.join(RECORD_FILE), escape_non_ascii(&json))?;

        if forward_ready {
            let date = chrono::Local::now().format("%d.%m.%Y");
            let digest = format!(
                "{}\n{}\n{}\n{}\n{}",
                ad.listing_link, date, ad.title, ad.price, ad.description
            );
            fs::write(self.staging_dir.join(FORWARD_FILE), digest)?;
        }

        Ok(())
    }

    /// Writes one sanitized image into staging, index-suffixed
    pub fn write_image(&self, index: usize, bytes: &[u8]) -> Result<()> {
        fs::write(self.staging_dir.join(format!("pic{}.jpg", index)), bytes)?;
        Ok(())
    }

    /// Promotes the staged contents into the claimed directory
    ///
    /// The staging directory is renamed over the still-empty claimed
    /// directory in a single step, so the path never stops existing and
    /// no concurrent run can re-claim the ad mid-promotion.
    pub fn commit(self) -> Result<()> {
        fs::rename(&self.staging_dir, &self.final_dir).map_err(|e| HarvestError::Store {
            path: self.final_dir.display().to_string(),
            source: e,
        })?;
        Ok(())
    }

    /// Releases the claim after a failed materialization
    ///
    /// Removes both the staging directory and the claimed directory so a
    /// later run can retry the ad.
    pub fn abandon(self) {
        if let Err(e) = fs::remove_dir_all(&self.staging_dir) {
            tracing::warn!(
                "Failed to remove staging dir {}: {}",
                self.staging_dir.display(),
                e
            );
        }
        if let Err(e) = fs::remove_dir_all(&self.final_dir) {
            tracing::warn!(
                "Failed to release claim {}: {}",
                self.final_dir.display(),
                e
            );
        }
    }

    /// Path of the claimed record directory
    pub fn path(&self) -> &Path {
        &self.final_dir
    }
}

/// Staging directory path for a record directory
fn staging_path(final_dir: &Path) -> PathBuf {
    let mut name = final_dir.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    final_dir.with_file_name(name)
}

/// Makes a listing title safe for use in a directory name
///
/// Path separators become `|` and the result is capped at
/// [`MAX_TITLE_LEN`] characters.
fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if c == '/' || c == '\\' { '|' } else { c })
        .take(MAX_TITLE_LEN)
        .collect()
}

/// Escapes all non-ASCII characters in a JSON document as `\uXXXX`
///
/// Applied to serialized output, where non-ASCII can only occur inside
/// string literals.
fn escape_non_ascii(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut buf = [0u16; 2];
            for unit in c.encode_utf16(&mut buf) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}
