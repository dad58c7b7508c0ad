//! Exécution des outils externes (osmium, osm2ogr_with_tags)

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::process::{Command, ExitStatus};

use thiserror::Error;
use tracing::info;

/// Échec d'un outil externe
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Programme introuvable ou non exécutable
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Code de sortie non nul
    #[error("{program} failed with {status}")]
    Failed { program: String, status: ExitStatus },
}

/// Ligne de commande d'un outil externe
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCommand {
    program: OsString,
    args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Arguments en UTF-8 (lossy), pratique pour les logs et les tests
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Lance la commande et attend sa fin; un code non nul est une erreur
    pub fn run(&self) -> Result<(), ProcessError> {
        let program = self.program.to_string_lossy().into_owned();
        info!(command = %self, "Running");

        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .map_err(|source| ProcessError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(ProcessError::Failed { program, status });
        }
        Ok(())
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}
