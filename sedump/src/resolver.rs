//! Archive resolution: identifier matching and interactive disambiguation.
//!
//! The resolver queries the catalog for entries whose name contains the
//! user-supplied identifier as a case-insensitive substring:
//!
//! - exactly one match resolves immediately, pick flag or not;
//! - zero matches fail with [`ResolveError::NoMatch`];
//! - multiple matches fail with [`ResolveError::Ambiguous`] unless picking
//!   is enabled, in which case the user chooses from the candidate list.

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::catalog::{CatalogClient, CatalogEntry, CatalogError};

/// Errors that can occur during archive resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No catalog entry matched the identifier.
    #[error("no archive matching \"{0}\" was found")]
    NoMatch(String),

    /// Multiple entries matched and picking was not enabled.
    #[error(
        "\"{identifier}\" matches {} archives ({}); re-run with --pick to choose one",
        candidates.len(),
        candidates.join(", ")
    )]
    Ambiguous {
        identifier: String,
        /// Matching entry names, in catalog order.
        candidates: Vec<String>,
    },

    /// Picking was requested but no interactive surface is available.
    #[error("interactive selection is not available in this environment")]
    PickUnavailable,

    /// Resolution was cancelled before an entry was chosen.
    #[error("resolution was cancelled")]
    Cancelled,

    /// The catalog query itself failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Errors from the interactive selection surface.
#[derive(Debug, Error)]
pub enum PickError {
    /// The environment has no interactive terminal.
    #[error("interactive selection is not available in this environment")]
    Unavailable,

    /// The prompt itself failed.
    #[error("selection prompt failed: {0}")]
    Prompt(String),
}

/// Trait for single-choice selection from an ordered candidate list.
///
/// This abstraction keeps the resolver free of terminal concerns; the CLI
/// provides a dialoguer-backed implementation, tests provide scripted ones.
pub trait ArchivePicker: Send + Sync {
    /// Present `candidates` for single selection.
    ///
    /// Returns the chosen index, or `None` if the user dismissed the prompt.
    fn pick(&self, prompt: &str, candidates: &[String]) -> Result<Option<usize>, PickError>;
}

/// Resolves an archive identifier to a catalog entry.
pub struct ArchiveResolver<C, P> {
    catalog: C,
    picker: P,
}

impl<C: CatalogClient, P: ArchivePicker> ArchiveResolver<C, P> {
    /// Create a resolver over the given catalog and picker.
    pub fn new(catalog: C, picker: P) -> Self {
        Self { catalog, picker }
    }

    /// Resolve `identifier` to a single catalog entry.
    ///
    /// With `allow_pick` set, an ambiguous identifier leads to an
    /// interactive selection instead of failing.
    pub async fn resolve(
        &self,
        identifier: &str,
        allow_pick: bool,
        token: &CancellationToken,
    ) -> Result<CatalogEntry, ResolveError> {
        if token.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }

        let entries = tokio::select! {
            _ = token.cancelled() => return Err(ResolveError::Cancelled),
            entries = self.catalog.entries() => entries?,
        };

        let needle = identifier.to_lowercase();
        let mut matches: Vec<CatalogEntry> = entries
            .into_iter()
            .filter(|e| e.name.to_lowercase().contains(&needle))
            .collect();

        debug!(identifier, matches = matches.len(), "matched catalog entries");

        match matches.len() {
            0 => Err(ResolveError::NoMatch(identifier.to_string())),
            1 => Ok(matches.remove(0)),
            _ if !allow_pick => Err(ResolveError::Ambiguous {
                identifier: identifier.to_string(),
                candidates: matches.into_iter().map(|e| e.name).collect(),
            }),
            _ => {
                let names: Vec<String> = matches.iter().map(|e| e.name.clone()).collect();
                let choice = self
                    .picker
                    .pick("Which archive would you like to download?", &names)
                    .map_err(|e| match e {
                        PickError::Unavailable => ResolveError::PickUnavailable,
                        PickError::Prompt(_) => ResolveError::Cancelled,
                    })?;

                match choice {
                    Some(index) if index < matches.len() => Ok(matches.remove(index)),
                    _ => Err(ResolveError::Cancelled),
                }
            }
        }
    }
}
