// Job listings: CRUD over the `jobs` table, scoped to the signed-in user.

pub mod actions;
pub mod handlers;
pub mod memory;
pub mod store;
