//! Directory resolution and user registration services.

mod directory;
mod registry;

pub use directory::{DirectoryError, DirectoryResolver, Lookup};
pub use registry::{CreateUserRequest, UserRegistryError, UserRegistryService};
