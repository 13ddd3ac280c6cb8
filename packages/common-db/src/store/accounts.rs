//! Contas de acesso

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::{Account, PatientOverview, Role};

/// Dados para criação de uma conta
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Normaliza o email da mesma forma em cadastro e login
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn insert(pool: &SqlitePool, new: NewAccount) -> DbResult<Account> {
    let account = Account {
        id: Uuid::new_v4(),
        email: normalize_email(&new.email),
        password_hash: new.password_hash,
        first_name: new.first_name.trim().to_string(),
        last_name: new.last_name.trim().to_string(),
        role: new.role,
        created_at: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO accounts (id, email, password_hash, first_name, last_name, role, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(account.id)
    .bind(&account.email)
    .bind(&account.password_hash)
    .bind(&account.first_name)
    .bind(&account.last_name)
    .bind(account.role.as_str())
    .bind(account.created_at)
    .execute(pool)
    .await?;

    Ok(account)
}

pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> DbResult<Option<Account>> {
    let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(account)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> DbResult<Option<Account>> {
    let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = ?")
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;
    Ok(account)
}

pub async fn count_by_role(pool: &SqlitePool, role: Role) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE role = ?")
        .bind(role.as_str())
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Pacientes com número de consultas e data da última consulta
pub async fn list_patients(pool: &SqlitePool) -> DbResult<Vec<PatientOverview>> {
    let patients = sqlx::query_as::<_, PatientOverview>(
        "SELECT acc.*, COUNT(a.id) AS appointment_count, MAX(a.date) AS last_visit
         FROM accounts acc
         LEFT JOIN appointments a ON a.patient_id = acc.id
         WHERE acc.role = 'patient'
         GROUP BY acc.id
         ORDER BY acc.created_at DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(patients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::testing::memory_pool;

    fn patient(email: &str) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            first_name: "Maria".to_string(),
            last_name: "Silva".to_string(),
            role: Role::Patient,
        }
    }

    #[tokio::test]
    async fn test_email_is_normalized_and_unique() -> anyhow::Result<()> {
        let pool = memory_pool().await?;

        let account = insert(&pool, patient("  Maria@Example.COM ")).await?;
        assert_eq!(account.email, "maria@example.com");

        let found = find_by_email(&pool, "MARIA@example.com").await?;
        assert_eq!(found.map(|a| a.id), Some(account.id));

        let duplicate = insert(&pool, patient("maria@example.com")).await;
        assert!(matches!(duplicate, Err(DbError::ConstraintViolation(_))));

        assert_eq!(count_by_role(&pool, Role::Patient).await?, 1);
        assert_eq!(count_by_role(&pool, Role::Admin).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_patients_without_appointments() -> anyhow::Result<()> {
        let pool = memory_pool().await?;
        insert(&pool, patient("a@example.com")).await?;

        let patients = list_patients(&pool).await?;
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].appointment_count, 0);
        assert!(patients[0].last_visit.is_none());
        Ok(())
    }
}
