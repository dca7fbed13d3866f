//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over repository and runner-factory traits, but AppState
//! pins them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use agenthub_core::agent::executor::AgentExecutor;
use agenthub_core::service::agent::AgentService;
use agenthub_core::service::assist::AssistService;
use agenthub_core::service::library::LibraryService;
use agenthub_infra::config::{data_dir, load_global_config};
use agenthub_infra::llm::LlmRunnerFactory;
use agenthub_infra::sqlite::agent::SqliteAgentRepository;
use agenthub_infra::sqlite::pool::{DatabasePool, default_database_url};
use agenthub_infra::sqlite::prompt::SqlitePromptRepository;
use agenthub_infra::sqlite::run::SqliteAgentRunRepository;
use agenthub_infra::sqlite::tool::SqliteToolRepository;
use agenthub_types::config::GlobalConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteAgentService = AgentService<
    SqliteAgentRepository,
    SqlitePromptRepository,
    SqliteToolRepository,
    SqliteAgentRunRepository,
    LlmRunnerFactory,
>;

pub type ConcreteLibraryService = LibraryService<SqlitePromptRepository, SqliteToolRepository>;

pub type ConcreteAssistService = AssistService<SqliteToolRepository, LlmRunnerFactory>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub agent_service: Arc<ConcreteAgentService>,
    pub library_service: Arc<ConcreteLibraryService>,
    pub assist_service: Arc<ConcreteAssistService>,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
    /// Cancelled on server shutdown; in-flight executions observe it.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Initialize the application state: connect to DB, load config, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let db_pool = DatabasePool::new(&default_database_url()).await?;
        let config = load_global_config(&data_dir).await;
        let factory = LlmRunnerFactory::from_config(&config);

        Ok(Self::from_parts(db_pool, config, factory, data_dir))
    }

    /// Wire services over an open pool and a provider factory.
    pub fn from_parts(
        db_pool: DatabasePool,
        config: GlobalConfig,
        factory: LlmRunnerFactory,
        data_dir: PathBuf,
    ) -> Self {
        let executor = Arc::new(AgentExecutor::new(factory, &config));

        let agent_service = AgentService::new(
            SqliteAgentRepository::new(db_pool.clone()),
            SqlitePromptRepository::new(db_pool.clone()),
            SqliteToolRepository::new(db_pool.clone()),
            SqliteAgentRunRepository::new(db_pool.clone()),
            executor.clone(),
        );
        let library_service = LibraryService::new(
            SqlitePromptRepository::new(db_pool.clone()),
            SqliteToolRepository::new(db_pool.clone()),
        );
        let assist_service = AssistService::new(SqliteToolRepository::new(db_pool), executor);

        Self {
            agent_service: Arc::new(agent_service),
            library_service: Arc::new(library_service),
            assist_service: Arc::new(assist_service),
            config: Arc::new(config),
            data_dir,
            shutdown: CancellationToken::new(),
        }
    }
}
