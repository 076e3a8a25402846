/// Database access layer
///
/// Repositories are capability interfaces injected into the service layer,
/// with Postgres implementations here. Soft-deleted rows are excluded by an
/// explicit `deleted_at IS NULL` predicate in every read query.
pub mod posts;
pub mod users;

pub use posts::{PgPostRepository, PostRepository};
pub use users::{PgUserRepository, UserRepository};
