//! # Pipeline Domain
//!
//! The pipeline domain represents the core business logic and rules of the
//! data-movement orchestrator. It implements Domain-Driven Design (DDD)
//! patterns and is completely independent of external concerns like
//! databases, network clients, or the presentation layer.
//!
//! ## Module Structure
//!
//! - [`entities`] — [`entities::PipelineRecord`], the one entity in this
//!   domain, and its constituent value types
//! - [`value_objects`] — identity, window, and duration-parsing value objects
//! - [`services`] — external-collaborator contracts and the window
//!   calculation algorithm
//! - [`repositories`] — the durable record store's contract
//! - [`error`] — the domain error hierarchy
//!
//! ## Domain-Driven Design Concepts
//!
//! ### Entities
//! Entities are objects that have a distinct identity that runs through time
//! and different representations. They can change state while maintaining
//! their identity.
//!
//! **Examples in this domain:**
//! - [`entities::PipelineRecord`]: the per-window processing record, tracked
//!   by `pipeline_id` across its whole phase lifecycle
//!
//! ### Value Objects
//! Value objects are immutable objects that represent concepts without
//! identity. They are defined by their attributes, and two value objects with
//! the same attributes are considered equal.
//!
//! **Examples in this domain:**
//! - [`value_objects::PipelineId`]: type-safe, deterministically-derived
//!   pipeline identifier
//! - [`value_objects::PipelineIdentity`] / [`value_objects::EndpointIdentity`]:
//!   the source/stage/target identity triple a pipeline is defined over
//! - [`value_objects::Window`]: a `[start, end)` processing window
//!
//! ### Domain Services
//! Domain services contain business logic that doesn't naturally fit within
//! an entity or value object. They are stateless and operate on domain
//! objects.
//!
//! **Examples in this domain:**
//! - [`services::compute_window`]: derives the next processing window
//! - [`services::SourceAdapter`], [`services::StageAdapter`],
//!   [`services::TargetAdapter`]: count queries against external systems
//! - [`services::SourceToStageTransfer`], [`services::StageToTargetTransfer`]:
//!   the data-movement operations
//!
//! ### Repositories
//! Repositories provide an abstraction over data persistence, allowing the
//! domain to work with [`entities::PipelineRecord`]s without knowing about
//! storage details.
//!
//! **Examples in this domain:**
//! - [`repositories::PipelineRecordRepository`]: the compare-and-set record
//!   store contract
//!
//! ## Business Rules and Invariants
//!
//! - A pipeline's `pipeline_id` is deterministic: the same identity, target
//!   day, and window always derive the same id, making re-runs idempotent.
//! - A pipeline can be locked by at most one `dag_run_id` at a time; the lock
//!   is acquired and released only through compare-and-set transitions.
//! - Phases execute in a strict order (source→stage, stage→target, audit);
//!   a phase cannot begin until its predecessor has completed.
//!
//! ## Error Handling
//!
//! The domain uses [`error::PipelineError`], a `thiserror`-derived enum that
//! categorizes failures (transient/adapter, store, validation, conflict) so
//! callers can decide what is retryable without string-matching messages.

pub mod entities;
pub mod error;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use entities::{AuditResult, Phase, PhaseBlock, PhaseStatus, PipelineRecord, RecordMetadata};
pub use error::PipelineError;
pub use repositories::PipelineRecordRepository;
pub use services::{Clock, SourceAdapter, SourceToStageTransfer, StageAdapter, StageToTargetTransfer, TargetAdapter};
pub use value_objects::{parse_duration, EndpointIdentity, PipelineId, PipelineIdentity, Window};
