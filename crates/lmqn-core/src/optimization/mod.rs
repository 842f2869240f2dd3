//! Line searches, stopping rules and run results.

pub mod line_search;
pub mod more_thuente;
pub mod nonmonotone;
pub mod optimizer;

pub use line_search::{AcceptedStep, ArmijoBacktracking, LineSearch, LineSearchResult, MoreThuente};
pub use more_thuente::{MoreThuenteParams, SearchStatus};
pub use nonmonotone::NonmonotoneWindow;
pub use optimizer::{
    AcceptanceMode, ConvergenceChecker, IterationCounters, OptimizationResult, Optimizer,
    StoppingCriterion, TerminationReason,
};
