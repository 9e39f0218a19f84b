//! Process-wide writer locks, one per backing file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

static LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

/// Get the writer locks for `paths`, sorted by normalised path with
/// duplicates removed.
///
/// Paths are normalised through their canonical parent directory so that
/// `./tasks.csv` and an absolute path to the same file share one lock.
/// Always take the returned locks in order (see [`hold`]).
pub fn locks_for(paths: &[&Path]) -> Vec<Arc<Mutex<()>>> {
    let mut keys: Vec<PathBuf> = paths.iter().map(|p| normalize(p)).collect();
    keys.sort();
    keys.dedup();

    let registry = LOCKS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut locks = registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    keys.into_iter()
        .map(|key| locks.entry(key).or_default().clone())
        .collect()
}

/// Lock every mutex in `locks`, in order. A poisoned lock is still taken.
pub fn hold(locks: &[Arc<Mutex<()>>]) -> Vec<MutexGuard<'_, ()>> {
    locks
        .iter()
        .map(|lock| lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
        .collect()
}

fn normalize(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (parent.canonicalize(), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}
