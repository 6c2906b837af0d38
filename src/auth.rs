//! Session/auth manager
//!
//! Login is an explicit state machine: [`AuthState`] is either
//! unauthenticated or holds an [`AuthToken`], and [`login::advance`] maps
//! each step's HTTP outcome to the next step, a token, or a failure.

pub mod login;
pub mod token;

pub use login::{LoginEndpoints, LoginStep, StepOutcome, advance, build_request, run_login};
pub use token::{AuthState, AuthToken};
