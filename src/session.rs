use validator::Validate;

use crate::{
    auth::{AuthUser, TokenSigner},
    error::{AppError, AppResult},
    models::{LoginRequest, NewUser, Role, SignUpRequest},
    password,
    repository::RepositoryState,
};

const INVALID_CREDENTIALS: &str = "Invalid email address or password.";

/// SessionIssuer
///
/// Turns credentials into bearer tokens and bearer tokens back into identities.
#[derive(Clone)]
pub struct SessionIssuer {
    repo: RepositoryState,
    signer: TokenSigner,
}

impl SessionIssuer {
    pub fn new(repo: RepositoryState, signer: TokenSigner) -> Self {
        Self { repo, signer }
    }

    /// sign_up
    ///
    /// Registers a new account with the default `user` role and returns its token.
    /// A taken email is reported as Conflict by the credential store.
    pub async fn sign_up(&self, mut req: SignUpRequest) -> AppResult<String> {
        // Validate the values that will be stored, so a whitespace-only name is rejected.
        req.name = req.name.trim().to_string();
        req.email = normalize_email(&req.email);
        req.validate()?;

        let password_hash = password::hash_password(&req.password)?;
        let user = self
            .repo
            .create_user(NewUser {
                email: req.email,
                name: req.name,
                password_hash,
                role: Role::User,
            })
            .await?;

        tracing::info!(user_id = %user.id, "user signed up");
        self.signer.issue(user.id)
    }

    /// login
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, req: LoginRequest) -> AppResult<String> {
        req.validate()?;

        let credentials = self
            .repo
            .find_credentials_by_email(&normalize_email(&req.email))
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !password::verify_password(&req.password, &credentials.password_hash)? {
            tracing::info!(user_id = %credentials.user.id, "login rejected");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        self.signer.issue(credentials.user.id)
    }

    /// verify
    ///
    /// Resolves a token to the current identity. The role is read from the store,
    /// so a user deleted after the token was issued is rejected.
    pub async fn verify(&self, token: &str) -> AppResult<AuthUser> {
        let claims = self.signer.decode(token)?;

        let user = self.repo.get_user(claims.sub).await?.ok_or_else(|| {
            AppError::Unauthorized("Please login first to access this resource.".to_string())
        })?;

        Ok(AuthUser {
            id: user.id,
            role: user.role,
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
