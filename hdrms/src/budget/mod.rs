//! Question budget enforcement
//!
//! Every question put to the user is reserved against the budget before it
//! is asked, so a run never asks more questions than it was given. Budget
//! exhaustion hands control to the non-interactive fallback, never a silent
//! extra question.
//!
//! # Architecture
//!
//! ```text
//!   narrowing ──try_ask──┐
//!   splitting ──try_ask──┼──▶ BudgetContext ──▶ events (allocation, question,
//! elicitation ──try_ask──┘     limits + per-phase    warning at 50/80%, refusal)
//!             ──try_round─▶    consumption
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use hdrms::budget::{BudgetContext, BudgetLimits, QuestionPhase};
//!
//! let mut budget = BudgetContext::new(BudgetLimits::questions(20));
//!
//! // Before each question
//! if budget.try_ask(QuestionPhase::Splitting).is_err() {
//!     // hand off to the fallback
//! }
//! ```

mod context;
mod events;
mod types;

pub use context::BudgetContext;
pub use events::{BudgetEvent, FinalConsumption, QuestionPhase};
pub use types::{
    BudgetCheckResult, BudgetConsumed, BudgetExhausted, BudgetLimits, BudgetRemaining, Meter,
};
