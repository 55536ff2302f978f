//! Registration and login.

use crate::error::{Result, ServiceError};
use crate::views::UserView;
use catalogue::{ModelError, PasswordHasher, Repository, User};
use tracing::{debug, info};

/// Register a new user, storing only the hash of `password`.
pub fn add_user(
    repo: &mut dyn Repository,
    hasher: &dyn PasswordHasher,
    username: &str,
    password: &str,
) -> Result<()> {
    if repo.get_user(username).is_some() {
        return Err(ServiceError::NameNotUnique(username.to_string()));
    }
    if password.is_empty() {
        return Err(ModelError::EmptyPassword.into());
    }

    let user = User::new(username, &hasher.hash(password)?)?;
    info!("Registered user '{}'", user.username());
    repo.add_user(user)?;
    Ok(())
}

pub fn get_user(repo: &dyn Repository, username: &str) -> Result<UserView> {
    repo.get_user(username)
        .map(UserView::from)
        .ok_or_else(|| ServiceError::UnknownUser(username.to_string()))
}

/// Succeeds only if the user exists and `password` matches the stored hash.
pub fn authenticate_user(
    repo: &dyn Repository,
    hasher: &dyn PasswordHasher,
    username: &str,
    password: &str,
) -> Result<()> {
    let authenticated = repo
        .get_user(username)
        .is_some_and(|user| hasher.verify(password, user.password()));
    if !authenticated {
        debug!("Failed login for '{}'", username);
        return Err(ServiceError::Authentication);
    }
    Ok(())
}
