//! textscore-server/src/context.rs
//!
//! Everything the HTTP server needs, built once at startup.

use std::sync::Arc;

use tracing::{info, warn};

use textscore_ai::{InferenceService, StubScorer};
use textscore_common::traits::{TextAnalysisRepo, TextScorer};
use textscore_core::db::wait_for_db;
use textscore_core::http::AppState;
use textscore_core::repositories::PostgresTextAnalysisRepository;
use textscore_core::services::AnalysisService;
use textscore_core::{Database, Error};

use crate::Args;

pub struct ServerContext {
    pub db: Database,
    pub state: AppState,
}

impl ServerContext {
    /// Waits for Postgres, applies migrations unless told not to, then loads both classifiers.
    pub async fn new(args: &Args, migrate: bool) -> Result<Self, Error> {
        // 1) Connect to DB
        let config = args.db_config();
        info!("Waiting for Postgres at {}", config.describe());
        wait_for_db(&config, args.wait_interval(), None).await?;
        let db = Database::new(&config).await?;
        if migrate {
            db.migrate().await?;
        } else {
            warn!("Skipping migrations; requests fail if the text_analyses table is missing.");
        }

        // 2) Models
        let scorer = load_scorer(args).await?;

        // 3) Services
        let repo: Arc<dyn TextAnalysisRepo> =
            Arc::new(PostgresTextAnalysisRepository::new(db.pool().clone()));
        let analysis_service = Arc::new(AnalysisService::new(scorer, repo));

        Ok(Self {
            db,
            state: AppState::new(analysis_service),
        })
    }
}

async fn load_scorer(args: &Args) -> Result<Arc<dyn TextScorer>, Error> {
    if args.stub_models {
        warn!("--stub-models set; scores come from a heuristic, not the classifiers.");
        return Ok(Arc::new(StubScorer::new()));
    }

    let (toxicity, gibberish) = args.model_specs();
    info!("Loading models '{}' and '{}'", toxicity.model_id, gibberish.model_id);
    let service = tokio::task::spawn_blocking(move || InferenceService::load(&toxicity, &gibberish))
        .await??;
    info!("Models loaded.");
    Ok(Arc::new(service))
}
