//! Caller identity and role-gated entry points
use crate::error::OrderError;

/// Closed set of roles the upstream auth middleware can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub enum Role {
    #[n(0)]
    Admin,
    #[n(1)]
    Manager,
    #[n(2)]
    StoreKeeper,
    #[n(3)]
    SalesRepresentative,
}

/// An authenticated caller as handed over by the auth layer.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: String, // bech32 encoded uuid7
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: String, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Only sales representatives open orders.
    pub fn may_create_orders(&self) -> Result<(), OrderError> {
        match self.role {
            Role::SalesRepresentative => Ok(()),
            role => Err(OrderError::Forbidden {
                role,
                action: "create orders",
            }),
        }
    }

    /// Only store keepers settle the approval step.
    pub fn may_settle_orders(&self) -> Result<(), OrderError> {
        match self.role {
            Role::StoreKeeper => Ok(()),
            role => Err(OrderError::Forbidden {
                role,
                action: "approve or reject orders",
            }),
        }
    }

    /// Listing is open to every authenticated role, but representatives
    /// only see their own orders.
    pub fn sees_all_orders(&self) -> bool {
        !matches!(self.role, Role::SalesRepresentative)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::StoreKeeper => "STORE_KEEPER",
            Role::SalesRepresentative => "SALES_REPRESENTATIVE",
        };
        f.write_str(name)
    }
}
