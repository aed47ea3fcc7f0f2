/// Builds links into the web UI.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    ui_base_url: String,
}

impl LinkBuilder {
    pub fn new(ui_base_url: impl Into<String>) -> Self {
        let base: String = ui_base_url.into();
        Self {
            ui_base_url: base.trim_end_matches('/').to_string(),
        }
    }

    /// `{base}/verify?otp=..&accountId=..&email=..`, used to activate a tenant
    /// user from their inbox.
    pub fn verification_link(&self, otp: &str, tenant_id: i64, email: &str) -> String {
        self.custom_link("/verify", otp, tenant_id, email)
    }

    pub fn custom_link(&self, path: &str, otp: &str, tenant_id: i64, email: &str) -> String {
        format!(
            "{}/{}?otp={}&accountId={}&email={}",
            self.ui_base_url,
            path.trim_start_matches('/'),
            urlencoding::encode(otp),
            tenant_id,
            urlencoding::encode(email),
        )
    }
}
