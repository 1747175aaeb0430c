//! Image enumeration, random selection, and confinement validation.
//!
//! This is the core of shufflepic. Everything HTTP-shaped lives in
//! [`crate::server`]; this module is synchronous, filesystem-only, and safe
//! to call concurrently from any number of requests.
//!
//! ## Operations
//!
//! - [`enumerate_images`] — recursive walk of the image root, filtered by the
//!   extension allow-list. Recomputed fresh on every call; there is no cached
//!   candidate set, so adding or removing files takes effect immediately.
//! - [`pick_random`] — uniform selection from a candidate set.
//! - [`resolve_safe`] — turns an untrusted, caller-supplied filename into a
//!   path guaranteed to lie within the root, or fails.
//!
//! [`ImageResolver`] bundles the canonical root and a shared RNG behind the
//! two entry points the HTTP layer uses.
//!
//! ## Confinement
//!
//! `resolve_safe` layers three checks:
//!
//! 1. The raw string must not contain `..` or any path separator. Names
//!    failing this never touch the filesystem.
//! 2. The name is reduced to its final path component before joining, so a
//!    directory component can never be honored.
//! 3. The joined path is canonicalized (resolving symlinks and any remaining
//!    dot components) and must still be a descendant of the canonical root.
//!
//! The canonicalization step is what makes the guarantee hold even for a
//! symlink inside the root that points outside it.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ResolveError {
    /// The directory walk could not start or aborted mid-walk.
    #[error("could not enumerate images: {0}")]
    Enumeration(#[from] std::io::Error),
    /// Enumeration succeeded but produced zero candidates.
    #[error("no images found under the image root")]
    NoImagesFound,
    /// Caller-supplied filename failed traversal/confinement validation.
    #[error("invalid image filename")]
    InvalidFilename,
    /// A confined filename does not correspond to an existing regular file.
    #[error("image not found")]
    NotFound,
}

/// Extensions served by the resolver, matched case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];

/// Recursively collect every regular file under `root` whose extension is in
/// the allow-list.
///
/// Order is filesystem-dependent and not guaranteed. An empty result is not
/// an error; a walk that cannot start (missing root, permission failure) or
/// aborts mid-walk is.
pub fn enumerate_images(root: &Path) -> Result<Vec<PathBuf>, ResolveError> {
    let mut candidates = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| ResolveError::Enumeration(e.into()))?;
        if entry.file_type().is_file() && is_image(entry.path()) {
            candidates.push(entry.into_path());
        }
    }
    Ok(candidates)
}

/// Select one candidate with uniform probability.
///
/// Statistical uniformity over repeated calls is the only guarantee — the
/// RNG is not cryptographic and does not need to be.
pub fn pick_random(candidates: &[PathBuf], rng: &mut impl Rng) -> Result<PathBuf, ResolveError> {
    candidates
        .choose(rng)
        .cloned()
        .ok_or(ResolveError::NoImagesFound)
}

/// Resolve an untrusted filename to a path confined within `root`.
///
/// Returns `InvalidFilename` for anything containing `..` or a path
/// separator (checked before any filesystem access), `NotFound` for a
/// well-formed name with no matching regular file, and `InvalidFilename`
/// again if canonicalization lands outside the root (symlink escape).
pub fn resolve_safe(root: &Path, user_filename: &str) -> Result<PathBuf, ResolveError> {
    if user_filename.contains("..")
        || user_filename.contains('/')
        || user_filename.contains('\\')
    {
        return Err(ResolveError::InvalidFilename);
    }

    // Basename reduction: a directory component is discarded, not honored.
    let basename = Path::new(user_filename)
        .file_name()
        .ok_or(ResolveError::InvalidFilename)?;

    let root = root.canonicalize().map_err(ResolveError::Enumeration)?;

    // Canonicalize-then-prefix-check. Canonicalization fails for a missing
    // file, which is the existence check; for a file that exists through a
    // symlink it yields the real location, which the prefix check confines.
    let candidate = root
        .join(basename)
        .canonicalize()
        .map_err(|_| ResolveError::NotFound)?;

    if !candidate.starts_with(&root) {
        return Err(ResolveError::InvalidFilename);
    }
    if !candidate.is_file() {
        return Err(ResolveError::NotFound);
    }

    Ok(candidate)
}

fn is_image(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

/// Root directory plus a shared random source — the resolver the HTTP layer
/// holds for the lifetime of the process.
///
/// The root is canonicalized once at construction and immutable afterwards.
/// The RNG is time-seeded at startup and shared across concurrent requests
/// behind a mutex; the critical section is a single `choose` call.
pub struct ImageResolver {
    root: PathBuf,
    rng: Mutex<SmallRng>,
}

impl ImageResolver {
    /// Build a resolver over `root`, seeding the RNG from the clock.
    ///
    /// Fails with `Enumeration` if `root` does not exist or cannot be
    /// canonicalized.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, ResolveError> {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::with_seed(root, seed)
    }

    /// Build a resolver with a fixed RNG seed. Selection order becomes
    /// deterministic, which tests rely on.
    pub fn with_seed(root: impl AsRef<Path>, seed: u64) -> Result<Self, ResolveError> {
        let root = root
            .as_ref()
            .canonicalize()
            .map_err(ResolveError::Enumeration)?;
        Ok(Self {
            root,
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        })
    }

    /// The canonical image root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the root and return one image chosen uniformly at random.
    ///
    /// The walk is restarted on every call, so the candidate set always
    /// reflects the live filesystem.
    pub fn pick_random_image(&self) -> Result<PathBuf, ResolveError> {
        let candidates = enumerate_images(&self.root)?;
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        pick_random(&candidates, &mut *rng)
    }

    /// Validate a caller-supplied filename and resolve it within the root.
    pub fn resolve_requested_image(&self, filename: &str) -> Result<PathBuf, ResolveError> {
        resolve_safe(&self.root, filename)
    }
}
