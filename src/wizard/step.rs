use crate::router::Location;
use std::fmt;

pub const WIZARD_BASE_PATH: &str = "/change-password";

/// Query parameter naming the flow that holds the captured values.
pub const FLOW_QUERY_KEY: &str = "flow";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    OldPassword = 1,
    NewPassword = 2,
    Confirm = 3,
}

impl Step {
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::OldPassword),
            2 => Some(Self::NewPassword),
            3 => Some(Self::Confirm),
            _ => None,
        }
    }

    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::OldPassword => None,
            Self::NewPassword => Some(Self::OldPassword),
            Self::Confirm => Some(Self::NewPassword),
        }
    }

    #[must_use]
    pub fn path(self) -> String {
        format!("{WIZARD_BASE_PATH}/step{}", self.number())
    }

    /// Step addressed by a route path such as `/change-password/step2`.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        path.trim_end_matches('/')
            .strip_prefix(WIZARD_BASE_PATH)?
            .strip_prefix("/step")?
            .parse::<u8>()
            .ok()
            .and_then(Self::from_number)
    }

    #[must_use]
    pub fn location(self) -> Location {
        Location::new(self.path())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::OldPassword => "old password",
            Self::NewPassword => "new password",
            Self::Confirm => "confirm",
        };
        write!(f, "step {} ({label})", self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_round_trip() {
        for step in [Step::OldPassword, Step::NewPassword, Step::Confirm] {
            assert_eq!(Step::from_path(&step.path()), Some(step));
        }
        assert_eq!(Step::Confirm.path(), "/change-password/step3");
        assert_eq!(Step::from_path("/change-password/step2/"), Some(Step::NewPassword));
    }

    #[test]
    fn unknown_paths_are_rejected() {
        assert_eq!(Step::from_path("/change-password"), None);
        assert_eq!(Step::from_path("/change-password/step4"), None);
        assert_eq!(Step::from_path("/change-password/stepx"), None);
        assert_eq!(Step::from_path("/login"), None);
    }

    #[test]
    fn previous_walks_back_to_first() {
        assert_eq!(Step::Confirm.previous(), Some(Step::NewPassword));
        assert_eq!(Step::NewPassword.previous(), Some(Step::OldPassword));
        assert_eq!(Step::OldPassword.previous(), None);
    }
}
