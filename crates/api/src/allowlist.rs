//! Paths served without authentication.
//!
//! Patterns are matched segment by segment: `*` matches exactly one segment,
//! `**` matches whatever remains (including nothing).

/// Public endpoints of the service.
pub const PUBLIC_PATHS: &[&str] = &[
    "/api/v1/auth/login",
    "/api/v1/auth/root-login",
    "/api/v1/accounts/create",
    "/api/v1/otp/**",
    "/api/v1/accounts/*/users/set-password",
    "/api/v1/accounts/*/users/forgot-password",
    "/health",
];

#[derive(Debug, Clone)]
pub struct AllowList {
    patterns: Vec<Vec<String>>,
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new(PUBLIC_PATHS.iter().copied())
    }
}

impl AllowList {
    pub fn new<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| segments(p).map(str::to_string).collect())
                .collect(),
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        let path: Vec<&str> = segments(path).collect();
        self.patterns.iter().any(|pattern| matches(pattern, &path))
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn matches(pattern: &[String], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((head, _)) if head == "**" => true,
        Some((head, rest)) => match path.split_first() {
            Some((segment, path_rest)) if head == "*" || head == segment => {
                matches(rest, path_rest)
            }
            _ => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_paths() {
        let allow = AllowList::default();
        assert!(allow.is_public("/api/v1/auth/login"));
        assert!(allow.is_public("/api/v1/auth/login/"));
        assert!(allow.is_public("/health"));
        assert!(!allow.is_public("/api/v1/auth/whoami"));
        assert!(!allow.is_public("/api/v1/auth/login/extra"));
    }

    #[test]
    fn single_segment_wildcard() {
        let allow = AllowList::default();
        assert!(allow.is_public("/api/v1/accounts/42/users/set-password"));
        assert!(!allow.is_public("/api/v1/accounts/42/7/users/set-password"));
        assert!(!allow.is_public("/api/v1/accounts/42/authorities"));
    }

    #[test]
    fn trailing_double_wildcard() {
        let allow = AllowList::default();
        assert!(allow.is_public("/api/v1/otp/validate"));
        assert!(allow.is_public("/api/v1/otp/resend/now"));
        assert!(allow.is_public("/api/v1/otp"));
        assert!(!allow.is_public("/api/v1/otpx/validate"));
    }

    #[test]
    fn custom_patterns() {
        let allow = AllowList::new(["/public/**", "/a/*/b"]);
        assert!(allow.is_public("/public"));
        assert!(allow.is_public("/a/x/b"));
        assert!(!allow.is_public("/a/b"));
    }
}
