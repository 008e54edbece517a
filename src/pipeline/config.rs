pub const DEFAULT_BUDGET: usize = 15_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReduceConfig {
    /// Max characters a text may have before it is chunked and reduced again.
    pub budget: usize,
}

impl Default for ReduceConfig {
    fn default() -> Self {
        Self { budget: DEFAULT_BUDGET }
    }
}

impl ReduceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(parsed) = get("RECAP_BUDGET").and_then(|v| v.trim().parse::<usize>().ok()) {
            cfg.budget = parsed;
        }
        cfg
    }

    /// CLI flags win over the environment.
    pub fn with_budget(mut self, budget: Option<usize>) -> Self {
        if let Some(b) = budget {
            self.budget = b;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_then_flag_precedence() {
        let cfg = ReduceConfig::from_lookup(|_| None);
        assert_eq!(cfg.budget, DEFAULT_BUDGET);

        let cfg = ReduceConfig::from_lookup(|k| (k == "RECAP_BUDGET").then(|| " 4000 ".to_string()));
        assert_eq!(cfg.budget, 4000);
        assert_eq!(cfg.with_budget(Some(800)).budget, 800);

        let cfg = ReduceConfig::from_lookup(|_| Some("lots".to_string()));
        assert_eq!(cfg.with_budget(None).budget, DEFAULT_BUDGET);
    }
}
