//! Claims policy: role normalization for issued tokens and authority
//! extraction for upstream tokens

mod policy;
mod upstream;


pub use policy::ClaimsPolicy;
pub use upstream::{UpstreamPrincipal, SCOPE_PREFIX};
