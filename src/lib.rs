//! # danci-recall - Bayesian recall model for spaced repetition
//!
//! Models how likely a learner is to recall a fact after an arbitrary elapsed
//! time, as a Beta distribution over recall probability evaluated at a
//! reference interval, and updates that belief after each quiz.
//!
//! ## Modules
//!
//! - [`special`] - log-domain Gamma/Beta functions and signed log-sum-exp
//! - [`golden`] - golden-section minimizer
//! - [`predict`] - expected recall at an elapsed time
//! - [`update`] - Bayesian posterior after a quiz, with rebalancing
//! - [`percentile`] - elapsed time until recall decays to a percentile
//! - [`sanitize`] - argument checks
//! - [`types`] - the [`Model`] value, options and constants
//!
//! ## Example
//!
//! ```rust
//! use danci_recall::{Model, PredictOptions};
//!
//! let prior = Model::with_time(24.0)?;
//! let recall = prior.predict_recall(12.0, &PredictOptions::exact())?;
//! assert!(recall > 0.5);
//!
//! let posterior = prior.update_recall(1, 1, 30.0)?;
//! assert!(posterior.halflife()? > prior.halflife()?);
//! # Ok::<(), danci_recall::RecallError>(())
//! ```
//!
//! All operations are pure functions over immutable values and may be called
//! from any number of threads.

#![deny(clippy::all)]

pub mod error;
pub mod golden;
pub mod percentile;
pub mod predict;
pub mod sanitize;
pub mod special;
pub mod types;
pub mod update;

pub use error::{InstabilityKind, RecallError, RecallResult, UpdateDiagnostics};
pub use golden::{GoldenSectionMinimizer, MinimizeResult};
pub use percentile::{halflife, model_to_percentile_decay};
pub use predict::{predict_recall, predict_recall_batch};
pub use types::{BatchPredictInput, BatchUpdateItem, Model, PercentileOptions, PredictOptions};
pub use update::{rescale_halflife, update_recall, update_recall_batch};
