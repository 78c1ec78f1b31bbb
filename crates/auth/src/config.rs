use trafficeye_core::error::CoreError;

/// Identity service configuration loaded from environment variables.
///
/// | Env Var                   | Default                         |
/// |---------------------------|---------------------------------|
/// | `SUPABASE_URL`            | required                        |
/// | `SUPABASE_ANON_KEY`       | required                        |
/// | `SUPABASE_RESET_REDIRECT` | `trafficeye://reset-password`   |
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    pub reset_redirect_to: String,
}

pub const DEFAULT_RESET_REDIRECT: &str = "trafficeye://reset-password";

impl SupabaseConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        let url = required("SUPABASE_URL")?.trim_end_matches('/').to_string();
        let anon_key = required("SUPABASE_ANON_KEY")?;
        let reset_redirect_to = std::env::var("SUPABASE_RESET_REDIRECT")
            .unwrap_or_else(|_| DEFAULT_RESET_REDIRECT.into());

        Ok(Self {
            url,
            anon_key,
            reset_redirect_to,
        })
    }
}

fn required(name: &str) -> Result<String, CoreError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| CoreError::Validation(format!("{name} must be set")))
}
