//! Verificações de capacidade
//!
//! Toda operação que altera dados passa por aqui; a proteção de navegação em
//! [`crate::gate`] é apenas conveniência para o front-end.

use thiserror::Error;
use uuid::Uuid;

use common_db::models::Role;

use crate::token::Claims;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct AccessDenied(pub String);

/// Conta autenticada que executa a operação
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub account_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            account_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), AccessDenied> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AccessDenied(
                "Operação restrita a administradores".to_string(),
            ))
        }
    }

    /// Permite o dono do registro ou um administrador
    pub fn ensure_owner_or_admin(&self, owner_id: Uuid) -> Result<(), AccessDenied> {
        if self.is_admin() || self.account_id == owner_id {
            Ok(())
        } else {
            Err(AccessDenied(
                "Sem permissão para acessar registros de outro paciente".to_string(),
            ))
        }
    }

    /// Resolve o paciente ao qual uma consulta se restringe.
    ///
    /// Administradores veem o que pedirem (ou tudo, com `None`); pacientes
    /// ficam sempre restritos a si mesmos.
    pub fn scope_patient(&self, requested: Option<Uuid>) -> Result<Option<Uuid>, AccessDenied> {
        if self.is_admin() {
            return Ok(requested);
        }
        match requested {
            Some(id) if id != self.account_id => Err(AccessDenied(
                "Sem permissão para acessar registros de outro paciente".to_string(),
            )),
            _ => Ok(Some(self.account_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal {
            account_id: Uuid::new_v4(),
            email: "x@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn test_admin_capabilities() {
        let admin = principal(Role::Admin);
        let other = Uuid::new_v4();
        assert!(admin.require_admin().is_ok());
        assert!(admin.ensure_owner_or_admin(other).is_ok());
        assert_eq!(admin.scope_patient(None), Ok(None));
        assert_eq!(admin.scope_patient(Some(other)), Ok(Some(other)));
    }

    #[test]
    fn test_patient_is_scoped_to_self() {
        let patient = principal(Role::Patient);
        let other = Uuid::new_v4();
        assert!(patient.require_admin().is_err());
        assert!(patient.ensure_owner_or_admin(patient.account_id).is_ok());
        assert!(patient.ensure_owner_or_admin(other).is_err());
        assert_eq!(patient.scope_patient(None), Ok(Some(patient.account_id)));
        assert!(patient.scope_patient(Some(other)).is_err());
    }
}
