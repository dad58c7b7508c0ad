//! Répertoire temporaire et changement de répertoire courant, libérés à la sortie du scope
//!
//! Ordre d'imbrication: `WorkdirLock`, puis `TempDirGuard`, puis
//! `WorkdirGuard`. Le répertoire courant est ainsi restauré avant la
//! suppression du dossier temporaire, et le verrou libéré en dernier.
//!
//! Un arrêt externe du process (signal) saute les `Drop`: le répertoire
//! temporaire reste alors sur le disque.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Préfixe des répertoires temporaires
pub const TEMP_PREFIX: &str = "osm-extract";

/// Le répertoire courant est global au process
static WORKDIR_LOCK: Mutex<()> = Mutex::new(());

/// Répertoire temporaire supprimé (best-effort) au drop
#[derive(Debug)]
pub struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    /// Crée `<base>/osm-extract<uuid>`
    pub fn create(base: &Path) -> Result<Self> {
        let path = base.join(format!("{}{}", TEMP_PREFIX, uuid::Uuid::new_v4().simple()));

        fs::create_dir(&path)
            .context(format!("Failed to create temporary directory in {}", base.display()))?;

        debug!(path = %path.display(), "Temporary directory created");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        // Ne jamais masquer l'erreur principale: on journalise seulement
        match fs::remove_dir_all(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Temporary directory removed"),
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove temporary directory"
            ),
        }
    }
}

/// Verrou exclusif sur le répertoire courant du process.
///
/// À prendre avant de lire le répertoire courant et à garder jusqu'à sa
/// restauration: un second verrou dans le même process attend la libération
/// du premier (et bloque indéfiniment s'il est pris sur le même thread).
#[derive(Debug)]
pub struct WorkdirLock {
    _guard: MutexGuard<'static, ()>,
}

impl WorkdirLock {
    pub fn acquire() -> Self {
        Self {
            _guard: WORKDIR_LOCK.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    pub fn current_dir(&self) -> Result<PathBuf> {
        env::current_dir().context("Failed to read the current directory")
    }

    /// Entre dans `dir`; le répertoire précédent est restauré au drop du guard
    pub fn enter(&self, dir: &Path) -> Result<WorkdirGuard<'_>> {
        let previous = self.current_dir()?;
        env::set_current_dir(dir)
            .context(format!("Failed to change directory to {}", dir.display()))?;

        debug!(from = %previous.display(), to = %dir.display(), "Working directory changed");
        Ok(WorkdirGuard {
            previous,
            _lock: self,
        })
    }
}

/// Répertoire courant changé, restauré au drop
#[derive(Debug)]
pub struct WorkdirGuard<'a> {
    previous: PathBuf,
    _lock: &'a WorkdirLock,
}

impl WorkdirGuard<'_> {
    /// Répertoire courant avant `enter`
    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for WorkdirGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.previous) {
            warn!(
                path = %self.previous.display(),
                error = %e,
                "Failed to restore working directory"
            );
        }
    }
}
