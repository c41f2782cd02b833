use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{Admin, TallyRow};
use crate::entities::voters;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminDto {
    pub id: i32,
    pub username: String,
    pub role: String,
    pub is_bootstrap: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Admin> for AdminDto {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
            role: admin.role.as_str().to_string(),
            is_bootstrap: admin.is_bootstrap,
            is_active: admin.is_active,
            created_at: admin.created_at,
        }
    }
}

/// Voter row without the password hash or throttle counters.
#[derive(Debug, Serialize)]
pub struct VoterDto {
    pub id: i32,
    pub full_name: String,
    pub age: i32,
    pub sex: String,
    pub region: String,
    pub zone: String,
    pub woreda: String,
    pub kebele: String,
    pub fin: String,
    pub phone: Option<String>,
    pub has_changed_password: bool,
    pub created_at: DateTime<Utc>,
}

impl From<voters::Model> for VoterDto {
    fn from(voter: voters::Model) -> Self {
        Self {
            id: voter.id,
            full_name: voter.full_name,
            age: voter.age,
            sex: voter.sex,
            region: voter.region,
            zone: voter.zone,
            woreda: voter.woreda,
            kebele: voter.kebele,
            fin: voter.fin,
            phone: voter.phone,
            has_changed_password: voter.has_changed_password,
            created_at: voter.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResultsDto {
    pub total_votes: u64,
    pub registered_voters: u64,
    pub active_parties: u64,
    pub election_start_date: Option<DateTime<Utc>>,
    pub election_end_date: Option<DateTime<Utc>>,
    pub tally: Vec<TallyRow>,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub database_ok: bool,
    pub registered_voters: u64,
    pub active_parties: u64,
    pub total_votes: u64,
}
