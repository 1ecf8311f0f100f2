pub mod extract;
pub mod password;
pub mod token;

pub use extract::{AuthUser, MaybeAuthUser};
pub use token::TokenService;
