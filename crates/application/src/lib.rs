//! Application services and ports.

#![forbid(unsafe_code)]

mod team_access_ports;
mod team_access_service;

pub use team_access_ports::{
    AccessGrantRepository, CreateTeamInput, TeamRepository, UserRepository,
};
pub use team_access_service::TeamAccessService;
