//! MySQL implementations of the persistence interfaces

mod token_ledger_impl;
mod user_repository_impl;

pub use token_ledger_impl::MySqlTokenLedger;
pub use user_repository_impl::MySqlUserRepository;
