//! Regras de negócio sobre os repositórios de `common-db`

pub mod billing;
pub mod booking;
pub mod stats;
