//! Origin allow-list for WebSocket upgrades.

/// Which browser origins may open a socket.
///
/// An empty list allows every origin, including requests without an
/// `Origin` header. A non-empty list requires an exact, case-insensitive
/// match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginPolicy {
    allowed: Vec<String>,
}

impl OriginPolicy {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = origins
            .into_iter()
            .map(|o| o.as_ref().trim().to_ascii_lowercase())
            .filter(|o| !o.is_empty())
            .collect();
        Self { allowed }
    }

    /// Policy that admits any origin.
    pub fn allow_any() -> Self {
        Self::default()
    }

    /// Parse a comma-separated list such as `https://a.example, https://b.example`.
    pub fn from_csv(csv: &str) -> Self {
        Self::new(csv.split(','))
    }

    pub fn allows_any(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Returns true if a request carrying this `Origin` header may upgrade.
    pub fn allows(&self, origin: Option<&str>) -> bool {
        if self.allowed.is_empty() {
            return true;
        }

        match origin {
            Some(origin) => {
                let origin = origin.trim();
                self.allowed.iter().any(|a| a.eq_ignore_ascii_case(origin))
            }
            None => false,
        }
    }
}
