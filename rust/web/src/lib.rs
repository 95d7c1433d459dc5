//! HTTP service that runs Texas Hold'em hands.
//!
//! Clients create a hand, submit actions for the seat whose turn it is and
//! read back JSON snapshots. Each action is checked before it reaches the
//! rules engine; finished hands are archived for later lookup.

pub mod action;
pub mod archiver;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod errors;
pub mod handlers;
pub mod history;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod narrative;
pub mod projector;
pub mod registry;
pub mod server;
pub mod service;
pub mod sqlite_store;
pub mod street;

pub use action::PlayerAction;
pub use archiver::{Archiver, RetryPolicy};
pub use config::{AppConfig, ConfigError};
pub use engine::{EngineFactory, HandEngine, StandardEngineFactory};
pub use errors::{ErrorResponse, ErrorSeverity, HandError, IntoErrorResponse};
pub use history::{ArchiveError, HandArchive, MemoryArchive};
pub use ids::{HandId, SeatIndex};
pub use logging::{init_logging, init_test_logging, LogEntry, LogFormat, TestLogSubscriber};
pub use middleware::{log_response, with_request_logging};
pub use models::{CompletedHand, GameState, Player, PlayerStatus};
pub use registry::{HandStore, TableRules};
pub use server::{AppContext, ServerError, ServerHandle, WebServer};
pub use service::HandService;
pub use sqlite_store::SqliteArchive;
