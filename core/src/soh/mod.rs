pub mod membership;
pub mod sugeno;

pub use membership::MembershipFn;
pub use sugeno::{Rule, SohCategory, SohEstimate, SugenoSystem};
