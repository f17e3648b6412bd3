use serde::Deserialize;

/// Body of `POST /login`. `user` is an email or a username.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub user: String,
    pub password: String,
}

impl LoginRequest {
    /// Identifier normalized the same way signup stores it.
    pub fn login(&self) -> String {
        self.user.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_is_trimmed_and_lowercased() {
        let req = LoginRequest {
            user: "  Ada@Example.com ".into(),
            password: "x".into(),
        };
        assert_eq!(req.login(), "ada@example.com");
    }
}
