use serde::{Deserialize, Serialize};

/// Position of a customer in the sales funnel.
///
/// `new` is the only initial state. `rejected` and `closed` are terminal:
/// once reached, no further transition is offered or accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    New,
    Contacted,
    Rejected,
    Closed,
}

impl CustomerStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CustomerStatus::Rejected | CustomerStatus::Closed)
    }

    /// Legal transitions: new -> contacted | rejected | closed,
    /// contacted -> rejected | closed. Nothing leaves a terminal state,
    /// nothing re-enters `new`.
    pub fn can_transition_to(&self, next: CustomerStatus) -> bool {
        match self {
            CustomerStatus::New => next != CustomerStatus::New,
            CustomerStatus::Contacted => {
                matches!(next, CustomerStatus::Rejected | CustomerStatus::Closed)
            }
            CustomerStatus::Rejected | CustomerStatus::Closed => false,
        }
    }

    /// Only a `closed` transition carries a product and amount
    pub fn requires_closing_details(&self) -> bool {
        matches!(self, CustomerStatus::Closed)
    }
}

impl std::fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CustomerStatus::New => "new",
            CustomerStatus::Contacted => "contacted",
            CustomerStatus::Rejected => "rejected",
            CustomerStatus::Closed => "closed",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for CustomerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "new" => Ok(CustomerStatus::New),
            "contacted" => Ok(CustomerStatus::Contacted),
            "rejected" => Ok(CustomerStatus::Rejected),
            "closed" => Ok(CustomerStatus::Closed),
            other => Err(format!("unknown customer status '{}'", other)),
        }
    }
}

/// The two dashboard listing tabs. Pipeline holds prospects awaiting or
/// having failed first contact; kelolaan holds actively managed accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Pipeline,
    Kelolaan,
}

impl Tab {
    pub fn statuses(&self) -> &'static [CustomerStatus] {
        match self {
            Tab::Pipeline => &[CustomerStatus::New, CustomerStatus::Rejected],
            Tab::Kelolaan => &[CustomerStatus::Contacted, CustomerStatus::Closed],
        }
    }

    pub fn contains(&self, status: CustomerStatus) -> bool {
        self.statuses().contains(&status)
    }

    pub fn of(status: CustomerStatus) -> Tab {
        match status {
            CustomerStatus::New | CustomerStatus::Rejected => Tab::Pipeline,
            CustomerStatus::Contacted | CustomerStatus::Closed => Tab::Kelolaan,
        }
    }
}

impl std::str::FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pipeline" => Ok(Tab::Pipeline),
            "kelolaan" => Ok(Tab::Kelolaan),
            other => Err(format!("unknown tab '{}'", other)),
        }
    }
}
