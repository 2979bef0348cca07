//! Where a finished document ends up: scored by the analysis service, or
//! saved to disk when scoring is unavailable.

use std::path::PathBuf;

use async_trait::async_trait;
use pinocchio_core::{
    AnalysisCache, AnalysisRequest, AnalysisResult, ContentDocument, PinocchioError,
    ScoringClient,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Presented {
    Analysis { result: AnalysisResult },
    Saved { path: PathBuf },
}

/// The presenter could not be reached at all; another one may stand in.
#[derive(Debug, Clone, Error)]
#[error("{presenter} unavailable: {reason}")]
pub struct Unavailable {
    pub presenter: &'static str,
    pub reason: String,
}

impl Unavailable {
    pub fn new(presenter: &'static str, reason: impl ToString) -> Self {
        Self {
            presenter,
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum PresentError {
    #[error(transparent)]
    Unavailable(#[from] Unavailable),

    /// Reached, but refused or answered with something unusable. Never
    /// retried elsewhere.
    #[error("{presenter} failed: {reason}")]
    Failed {
        presenter: &'static str,
        reason: String,
    },
}

impl PresentError {
    pub fn failed(presenter: &'static str, reason: impl ToString) -> Self {
        PresentError::Failed {
            presenter,
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
pub trait Presenter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn present(&self, document: &ContentDocument) -> Result<Presented, PresentError>;
}

/// Scores the document and caches the result under its cache key.
pub struct AnalysisPresenter {
    client: ScoringClient,
    cache: AnalysisCache,
}

impl AnalysisPresenter {
    pub fn new(client: ScoringClient, cache: AnalysisCache) -> Self {
        Self { client, cache }
    }
}

#[async_trait]
impl Presenter for AnalysisPresenter {
    fn name(&self) -> &'static str {
        "analysis"
    }

    async fn present(&self, document: &ContentDocument) -> Result<Presented, PresentError> {
        let result = match self.client.analyze(&AnalysisRequest::for_content(document)).await {
            Ok(result) => result,
            // transport and status failures only
            Err(err @ (PinocchioError::Api(_) | PinocchioError::ApiStatus { .. })) => {
                return Err(Unavailable::new(self.name(), err).into());
            }
            Err(err) => return Err(PresentError::failed(self.name(), err)),
        };

        let key = document.cache_key();
        if let Err(err) = self.cache.store(&key, &result).await {
            tracing::warn!(title = %document.title, %err, "could not cache analysis");
        }

        Ok(Presented::Analysis { result })
    }
}

/// Writes the formatted document next to the cached analyses.
pub struct SaveDocumentPresenter {
    cache: AnalysisCache,
}

impl SaveDocumentPresenter {
    pub fn new(cache: AnalysisCache) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl Presenter for SaveDocumentPresenter {
    fn name(&self) -> &'static str {
        "save-document"
    }

    async fn present(&self, document: &ContentDocument) -> Result<Presented, PresentError> {
        let path = self
            .cache
            .save_document(&document.cache_key(), &document.text)
            .await
            .map_err(|e| Unavailable::new(self.name(), e))?;

        Ok(Presented::Saved { path })
    }
}

/// Tries `primary`, then `fallback` once if the primary is unavailable.
/// Any other primary failure is returned as is.
pub struct FallbackPresenter {
    primary: Box<dyn Presenter>,
    fallback: Box<dyn Presenter>,
}

impl FallbackPresenter {
    pub fn new(primary: impl Presenter + 'static, fallback: impl Presenter + 'static) -> Self {
        Self {
            primary: Box::new(primary),
            fallback: Box::new(fallback),
        }
    }
}

#[async_trait]
impl Presenter for FallbackPresenter {
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    async fn present(&self, document: &ContentDocument) -> Result<Presented, PresentError> {
        let primary_err = match self.primary.present(document).await {
            Ok(presented) => return Ok(presented),
            Err(PresentError::Unavailable(err)) => err,
            Err(err) => return Err(err),
        };

        tracing::warn!(
            error = %primary_err,
            fallback = self.fallback.name(),
            "presenter unavailable, falling back"
        );

        self.fallback.present(document).await.map_err(|err| {
            PresentError::from(Unavailable::new(
                self.name(),
                format!("{}; {err}", primary_err.reason),
            ))
        })
    }
}
