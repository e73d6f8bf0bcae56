use std::fmt;

/// Identity of the CRM user on whose behalf an action runs.
///
/// Built once per request from the client context header and never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub access_token: String,
    pub api_version: String,
    pub request_id: String,
    pub namespace: String,
    pub org_id: String,
    pub org_domain_url: String,
    pub user_id: String,
    pub username: String,
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("access_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("request_id", &self.request_id)
            .field("namespace", &self.namespace)
            .field("org_id", &self.org_id)
            .field("org_domain_url", &self.org_domain_url)
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .finish()
    }
}
