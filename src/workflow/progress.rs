use serde::{Deserialize, Serialize};

/// Progress indicator value: blank between requests, a percentage during one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Progress {
    #[default]
    Blank,
    Percent(u8),
}

impl Progress {
    pub fn percent(value: u8) -> Self {
        Progress::Percent(value.min(100))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Progress::Blank)
    }
}

/// Fixed progress checkpoints; coarse policy values, not measured throughput
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Milestones {
    /// Set before the upload is sent
    pub submitted: u8,
    /// Set once response headers report success
    pub headers: u8,
    /// Set once the result is confirmed
    pub complete: u8,
}

impl Default for Milestones {
    fn default() -> Self {
        Self {
            submitted: 20,
            headers: 60,
            complete: 100,
        }
    }
}

impl Milestones {
    pub fn is_valid(&self) -> bool {
        self.submitted < self.headers && self.headers < self.complete && self.complete <= 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_is_clamped() {
        assert_eq!(Progress::percent(140), Progress::Percent(100));
        assert_eq!(Progress::percent(0), Progress::Percent(0));
        assert!(Progress::Blank.is_blank());
    }

    #[test]
    fn test_milestone_ordering() {
        assert!(Milestones::default().is_valid());
        let flat = Milestones {
            submitted: 50,
            headers: 50,
            complete: 100,
        };
        assert!(!flat.is_valid());
        let overflow = Milestones {
            submitted: 20,
            headers: 60,
            complete: 120,
        };
        assert!(!overflow.is_valid());
    }
}
