// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "profiles/mod.rs"]
pub mod profiles;

#[path = "lifestyle/mod.rs"]
pub mod lifestyle;
