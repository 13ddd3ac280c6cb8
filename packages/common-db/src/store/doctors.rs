//! Diretório de médicos

use chrono::Utc;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::{Doctor, Page, PageRequest, Pagination, DEFAULT_SLOTS};

/// Dados para cadastro de um médico
#[derive(Debug, Clone, Default)]
pub struct NewDoctor {
    pub name: String,
    pub specialty: String,
    pub experience: i64,
    pub rating: f64,
    pub location: String,
    pub consultation_fee: f64,
    pub availability: String,
    pub available_slots: Vec<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub education: Option<String>,
    pub about: Option<String>,
    pub reviews: i64,
    pub is_active: bool,
}

/// Alteração parcial de um médico; campos `None` permanecem inalterados
#[derive(Debug, Clone, Default)]
pub struct DoctorPatch {
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub experience: Option<i64>,
    pub rating: Option<f64>,
    pub location: Option<String>,
    pub consultation_fee: Option<f64>,
    pub availability: Option<String>,
    pub available_slots: Option<Vec<String>>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub education: Option<String>,
    pub about: Option<String>,
    pub reviews: Option<i64>,
    pub is_active: Option<bool>,
}

impl DoctorPatch {
    fn apply(self, doctor: &mut Doctor) {
        if let Some(v) = self.name {
            doctor.name = v;
        }
        if let Some(v) = self.specialty {
            doctor.specialty = v;
        }
        if let Some(v) = self.experience {
            doctor.experience = v;
        }
        if let Some(v) = self.rating {
            doctor.rating = v;
        }
        if let Some(v) = self.location {
            doctor.location = v;
        }
        if let Some(v) = self.consultation_fee {
            doctor.consultation_fee = v;
        }
        if let Some(v) = self.availability {
            doctor.availability = v;
        }
        if let Some(v) = self.available_slots {
            doctor.available_slots = v;
        }
        if let Some(v) = self.email {
            doctor.email = Some(v);
        }
        if let Some(v) = self.phone {
            doctor.phone = Some(v);
        }
        if let Some(v) = self.education {
            doctor.education = Some(v);
        }
        if let Some(v) = self.about {
            doctor.about = Some(v);
        }
        if let Some(v) = self.reviews {
            doctor.reviews = v;
        }
        if let Some(v) = self.is_active {
            doctor.is_active = v;
        }
    }
}

/// Filtros da listagem de médicos
#[derive(Debug, Clone, Default)]
pub struct DoctorFilter {
    /// Busca parcial, sem diferenciar maiúsculas
    pub specialty: Option<String>,
    pub location: Option<String>,
    pub include_inactive: bool,
}

pub async fn insert(pool: &SqlitePool, new: NewDoctor) -> DbResult<Doctor> {
    let now = Utc::now();
    let available_slots = if new.available_slots.is_empty() {
        DEFAULT_SLOTS.iter().map(|s| s.to_string()).collect()
    } else {
        new.available_slots
    };

    let doctor = Doctor {
        id: Uuid::new_v4(),
        name: new.name,
        specialty: new.specialty,
        experience: new.experience,
        rating: new.rating,
        location: new.location,
        consultation_fee: new.consultation_fee,
        availability: new.availability,
        available_slots,
        email: new.email.map(|e| e.trim().to_lowercase()),
        phone: new.phone,
        education: new.education,
        about: new.about,
        reviews: new.reviews,
        is_active: new.is_active,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO doctors (id, name, specialty, experience, rating, location, consultation_fee,
            availability, available_slots, email, phone, education, about, reviews, is_active,
            created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(doctor.id)
    .bind(&doctor.name)
    .bind(&doctor.specialty)
    .bind(doctor.experience)
    .bind(doctor.rating)
    .bind(&doctor.location)
    .bind(doctor.consultation_fee)
    .bind(&doctor.availability)
    .bind(Json(&doctor.available_slots))
    .bind(&doctor.email)
    .bind(&doctor.phone)
    .bind(&doctor.education)
    .bind(&doctor.about)
    .bind(doctor.reviews)
    .bind(doctor.is_active)
    .bind(doctor.created_at)
    .bind(doctor.updated_at)
    .execute(pool)
    .await?;

    Ok(doctor)
}

pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> DbResult<Option<Doctor>> {
    let doctor = sqlx::query_as::<_, Doctor>("SELECT * FROM doctors WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(doctor)
}

/// Padrão `LIKE` de substring, com os curingas do usuário escapados
fn contains_pattern(input: &str) -> String {
    let mut pattern = String::with_capacity(input.len() + 2);
    pattern.push('%');
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &DoctorFilter) {
    qb.push(" WHERE 1 = 1");
    if !filter.include_inactive {
        qb.push(" AND is_active = 1");
    }
    if let Some(specialty) = &filter.specialty {
        qb.push(" AND specialty LIKE ")
            .push_bind(contains_pattern(specialty))
            .push(" ESCAPE '\\'");
    }
    if let Some(location) = &filter.location {
        qb.push(" AND location LIKE ")
            .push_bind(contains_pattern(location))
            .push(" ESCAPE '\\'");
    }
}

/// Lista médicos ordenados por avaliação e cadastro mais recente
pub async fn list(pool: &SqlitePool, filter: &DoctorFilter, page: PageRequest) -> DbResult<Page<Doctor>> {
    let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM doctors");
    push_filters(&mut count_query, filter);
    let (total,): (i64,) = count_query.build_query_as::<(i64,)>().fetch_one(pool).await?;

    let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM doctors");
    push_filters(&mut query, filter);
    query
        .push(" ORDER BY rating DESC, created_at DESC LIMIT ")
        .push_bind(i64::from(page.limit))
        .push(" OFFSET ")
        .push_bind(page.offset());

    let items = query.build_query_as::<Doctor>().fetch_all(pool).await?;

    Ok(Page {
        items,
        pagination: Pagination::new(page, total),
    })
}

/// Aplica a alteração e devolve o médico atualizado (`None` se não existe)
pub async fn update(pool: &SqlitePool, id: Uuid, patch: DoctorPatch) -> DbResult<Option<Doctor>> {
    let Some(mut doctor) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    patch.apply(&mut doctor);
    doctor.email = doctor.email.map(|e| e.trim().to_lowercase());
    doctor.updated_at = Utc::now();

    sqlx::query(
        "UPDATE doctors SET name = ?, specialty = ?, experience = ?, rating = ?, location = ?,
            consultation_fee = ?, availability = ?, available_slots = ?, email = ?, phone = ?,
            education = ?, about = ?, reviews = ?, is_active = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&doctor.name)
    .bind(&doctor.specialty)
    .bind(doctor.experience)
    .bind(doctor.rating)
    .bind(&doctor.location)
    .bind(doctor.consultation_fee)
    .bind(&doctor.availability)
    .bind(Json(&doctor.available_slots))
    .bind(&doctor.email)
    .bind(&doctor.phone)
    .bind(&doctor.education)
    .bind(&doctor.about)
    .bind(doctor.reviews)
    .bind(doctor.is_active)
    .bind(doctor.updated_at)
    .bind(doctor.id)
    .execute(pool)
    .await?;

    Ok(Some(doctor))
}

/// Remove o médico. Falha com violação de chave estrangeira se houver
/// agendamentos apontando para ele.
/// Remove o médico. Falha com `ForeignKeyViolation` se houver consultas dele.
pub async fn delete(pool: &SqlitePool, id: Uuid) -> DbResult<bool> {
    let mut tx = pool.begin().await?;

    let (referencing,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM appointments WHERE doctor_id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
    if referencing > 0 {
        return Err(DbError::ForeignKeyViolation(format!(
            "médico {} possui {} consulta(s)",
            id, referencing
        )));
    }

    let result = sqlx::query("DELETE FROM doctors WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_active(pool: &SqlitePool) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM doctors WHERE is_active = 1")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::appointments;
    use crate::testing::{memory_pool, sample_appointment, sample_doctor, seed_patient_and_doctor};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_listing_filters_and_hides_inactive() -> anyhow::Result<()> {
        let pool = memory_pool().await?;
        insert(&pool, sample_doctor("Dr. Ana", "Cardiology", 4.9)).await?;
        insert(&pool, sample_doctor("Dr. Bruno", "Neurology", 4.5)).await?;
        let retired = insert(&pool, sample_doctor("Dr. Carla", "Cardiology", 5.0)).await?;
        update(
            &pool,
            retired.id,
            DoctorPatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await?;

        let filter = DoctorFilter {
            specialty: Some("cardio".into()),
            ..Default::default()
        };
        let page = list(&pool, &filter, PageRequest::default()).await?;
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.items[0].name, "Dr. Ana");

        let all = DoctorFilter {
            include_inactive: true,
            ..Default::default()
        };
        let page = list(&pool, &all, PageRequest::default()).await?;
        assert_eq!(page.pagination.total, 3);
        // Maior avaliação primeiro
        assert_eq!(page.items[0].name, "Dr. Carla");

        assert_eq!(count_active(&pool).await?, 2);
        Ok(())
    }

    #[test]
    fn test_like_wildcards_are_escaped() {
        assert_eq!(contains_pattern("cardio"), "%cardio%");
        assert_eq!(contains_pattern("100%_a\\b"), "%100\\%\\_a\\\\b%");
    }

    #[tokio::test]
    async fn test_wildcard_filter_matches_literally() -> anyhow::Result<()> {
        let pool = memory_pool().await?;
        insert(&pool, sample_doctor("Dr. Ana", "Cardiology", 4.9)).await?;
        insert(&pool, sample_doctor("Dr. Bruno", "Neurology", 4.5)).await?;

        for wildcard in ["%", "_"] {
            let filter = DoctorFilter {
                specialty: Some(wildcard.into()),
                ..Default::default()
            };
            let page = list(&pool, &filter, PageRequest::default()).await?;
            assert_eq!(page.pagination.total, 0, "filtro {wildcard}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_default_slots_and_partial_update() -> anyhow::Result<()> {
        let pool = memory_pool().await?;
        let mut new = sample_doctor("Dr. Davi", "Pediatrics", 4.0);
        new.available_slots.clear();
        let doctor = insert(&pool, new).await?;
        assert_eq!(doctor.available_slots.len(), DEFAULT_SLOTS.len());

        let updated = update(
            &pool,
            doctor.id,
            DoctorPatch {
                consultation_fee: Some(320.0),
                ..Default::default()
            },
        )
        .await?
        .expect("médico existe");
        assert_eq!(updated.consultation_fee, 320.0);
        assert_eq!(updated.name, "Dr. Davi");

        assert!(update(&pool, Uuid::new_v4(), DoctorPatch::default()).await?.is_none());
        assert!(delete(&pool, doctor.id).await?);
        assert!(find_by_id(&pool, doctor.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_refuses_doctor_with_appointments() -> anyhow::Result<()> {
        let pool = memory_pool().await?;
        let (patient, doctor) = seed_patient_and_doctor(&pool).await?;
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).expect("data válida");
        appointments::insert(&pool, &sample_appointment(patient.id, &doctor, date, "10:00 AM")).await?;

        let result = delete(&pool, doctor.id).await;
        assert!(matches!(result, Err(DbError::ForeignKeyViolation(_))));
        assert!(find_by_id(&pool, doctor.id).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_restrict_constraint_maps_to_foreign_key_violation() -> anyhow::Result<()> {
        let pool = memory_pool().await?;
        let (patient, doctor) = seed_patient_and_doctor(&pool).await?;
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).expect("data válida");
        appointments::insert(&pool, &sample_appointment(patient.id, &doctor, date, "10:00 AM")).await?;

        // Sem a verificação prévia, o próprio SQLite recusa a exclusão
        let raw = sqlx::query("DELETE FROM doctors WHERE id = ?")
            .bind(doctor.id)
            .execute(&pool)
            .await
            .map_err(DbError::from);
        assert!(matches!(raw, Err(DbError::ForeignKeyViolation(_))));
        Ok(())
    }
}
