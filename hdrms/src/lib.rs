// hdrms library
// Interactive regret-minimizing selection over high-dimensional datasets:
// dimension narrowing, binary splitting and final selection under a question budget.

pub mod budget;
pub mod config;
pub mod dimensions;
pub mod elicitor;
pub mod error;
pub mod narrowing;
pub mod orchestrator;
pub mod respondent;
pub mod session;
pub mod splitting;
pub mod subset;
pub mod trace;

pub use budget::{BudgetContext, BudgetExhausted, BudgetLimits, FinalConsumption, Meter, QuestionPhase};
pub use config::{
    ConfigError, CoveringMode, DominanceMode, ElicitationConfig, ElicitorConfig, NarrowingConfig,
    PruningMode, SelectionMode, SplittingConfig, StopCondition, SubsetConfig,
};
pub use dimensions::DimensionSet;
pub use elicitor::{InteractiveResult, UtilityElicitor};
pub use error::{ElicitError, ElicitResult, InvariantViolation};
pub use narrowing::{DimensionNarrower, NarrowingOutcome};
pub use orchestrator::{Elicitation, ElicitationOutcome, FinalSelection, PhaseTimings};
pub use respondent::{GroupAnswer, Respondent, SimulatedUser, UtilityVector};
pub use session::Session;
pub use splitting::{GeneralizedBinarySplitter, SplittingOutcome};
pub use subset::{SubsetConstructor, SubsetOutcome};
pub use trace::{ElicitationTrace, Phase, TraceEvent};
