//! Domain models for Ecart

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full CRUD over users, centres, responsables and budgets
    Admin,
    /// Logs and edits their own expenses, reads everything
    #[default]
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Assistant => "assistant",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "assistant" => Ok(Self::Assistant),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// A manager responsible for one or more centres
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Responsable {
    pub id: i64,
    /// Last name
    pub nom: String,
    /// First name
    pub prenom: String,
}

impl Responsable {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.prenom, self.nom)
    }
}

/// Input for creating or updating a responsable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewResponsable {
    pub nom: String,
    pub prenom: String,
}

impl NewResponsable {
    pub fn validate(&self) -> Result<()> {
        if self.nom.trim().is_empty() || self.prenom.trim().is_empty() {
            return Err(Error::InvalidData("Missing 'nom' or 'prenom'".to_string()));
        }
        Ok(())
    }
}

/// A cost centre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Centre {
    pub id: i64,
    pub name: String,
    /// Owning responsable; None once the responsable has been removed
    pub responsable_id: Option<i64>,
}

/// Input for creating or updating a centre
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCentre {
    pub name: String,
    pub responsable_id: i64,
}

impl NewCentre {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidData(
                "Missing 'nom' or 'responsable'".to_string(),
            ));
        }
        Ok(())
    }
}

/// A quarterly budget for one centre
///
/// Several budgets may exist for the same (centre, quarter, year); each is
/// reported on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub centre_id: i64,
    /// Calendar quarter, 1-4
    pub quarter: u32,
    pub year: i32,
    pub amount: f64,
}

/// Input for creating or updating a budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBudget {
    pub centre_id: i64,
    pub quarter: u32,
    pub year: i32,
    pub amount: f64,
}

impl NewBudget {
    pub fn validate(&self) -> Result<()> {
        if !(1..=4).contains(&self.quarter) {
            return Err(Error::InvalidData(format!(
                "Quarter must be between 1 and 4, got {}",
                self.quarter
            )));
        }
        if !self.amount.is_finite() {
            return Err(Error::InvalidData("Budget amount must be finite".to_string()));
        }
        Ok(())
    }
}

/// A logged expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    pub description: String,
    pub centre_id: i64,
    /// Username of the author
    pub created_by: String,
}

/// Input for creating or updating an expense (the author comes from the caller)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub amount: f64,
    pub description: String,
    pub centre_id: i64,
}

impl NewExpense {
    /// Amount must be finite and non-zero, description non-empty
    pub fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() || self.amount == 0.0 {
            return Err(Error::InvalidData("Missing required fields".to_string()));
        }
        if !self.amount.is_finite() {
            return Err(Error::InvalidData("Expense amount must be finite".to_string()));
        }
        Ok(())
    }
}

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: String,
    pub username: String,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub details: Option<String>,
}
