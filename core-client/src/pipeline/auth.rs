use bridge_traits::error::Result;
use bridge_traits::http::{HttpRequest, HttpResponse};

use super::Next;

/// Sets `Authorization: Bearer <token>` on every outbound request.
///
/// Control characters are stripped from the token so a malformed credential
/// still yields a valid header; the server then answers 401.
#[derive(Clone)]
pub struct AuthStage {
    authorization: String,
}

impl AuthStage {
    pub fn new(token: &str) -> Self {
        let token: String = token.chars().filter(|c| !c.is_control()).collect();
        Self {
            authorization: format!("Bearer {}", token.trim()),
        }
    }

    pub async fn handle(&self, request: HttpRequest, next: Next<'_>) -> Result<HttpResponse> {
        next.run(request.header("Authorization", self.authorization.as_str()))
            .await
    }
}

impl std::fmt::Debug for AuthStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStage").finish_non_exhaustive()
    }
}
