use serde::{Deserialize, Serialize};

/// Queue priority. Three queues, strict ordering: `High > Default > Low`
/// (SPEC_FULL.md §4.3). A worker pool drains `High` to empty before looking
/// at `Default`, and `Default` to empty before looking at `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JobPriority {
    Low = 1,
    Default = 2,
    High = 3,
}

// Correct FIFO ordering: jobs.sort_by_key(|r| (Reverse(r.message.priority), r.created_at))
// This ensures:
// - Higher priority jobs first: High > Default > Low
// - Within same priority: older jobs first (created_at ascending)

impl Default for JobPriority {
    fn default() -> Self {
        Self::Default
    }
}

impl JobPriority {
    /// All priority levels, low to high.
    pub fn all() -> &'static [JobPriority] {
        &[Self::Low, Self::Default, Self::High]
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Low),
            2 => Some(Self::Default),
            3 => Some(Self::High),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Default => "default",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for JobPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for JobPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "default" => Ok(Self::Default),
            "high" => Ok(Self::High),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_high_default_low() {
        let mut levels = vec![JobPriority::Low, JobPriority::High, JobPriority::Default];
        levels.sort();
        assert_eq!(levels, vec![JobPriority::Low, JobPriority::Default, JobPriority::High]);
    }

    #[test]
    fn round_trips_through_str() {
        for p in JobPriority::all() {
            assert_eq!(p.name().parse::<JobPriority>().unwrap(), *p);
        }
    }
}
