pub mod directory;
pub mod error;
pub mod supabase;

pub use directory::{Directory, DirectorySeed, InMemoryDirectory, SupabaseDirectory};
pub use error::DatabaseError;
pub use supabase::SupabaseClient;
