//! Proof of AWS identity for Vault's `aws` auth method (IAM flavour).

mod credentials;
mod proof;
pub mod signer;

pub use credentials::{
    ASSUME_ROLE_SESSION_NAME, CloudCredentials, CredentialResolver, CredentialSource,
    SdkCredentialResolver, resolve_credentials,
};
pub use proof::{CloudAuthContext, IamLoginProof, build_proof};
pub use signer::{SignedRequestParts, sign_get_caller_identity};
