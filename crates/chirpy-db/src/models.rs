use chirpy_auth::RefreshToken;

/// Full replacement of a user's mutable fields.
///
/// The password is plaintext and is hashed by the store. `session: None`
/// leaves the user logged out.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub email: String,
    pub password: String,
    pub session: Option<RefreshToken>,
}
