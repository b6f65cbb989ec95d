//! Identity-provider collaborator: the interface the gateway needs, plus an in-memory
//! implementation for demos and tests.

mod errors;
mod memory;
mod traits;
mod types;

pub use errors::IdentityError;
pub use memory::{MemoryIdentityClient, SentResetEmail};
pub use traits::{Application, IdentityClient};
pub use types::{
    Account, AccountStatus, NewAccount, PasswordGrantRequest, ProviderAccountResult,
    ProviderCredential, SessionGrant, TokenHandle,
};
