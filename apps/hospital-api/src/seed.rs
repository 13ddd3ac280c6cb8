//! Dados de exemplo e criação do administrador inicial

use anyhow::{anyhow, Context, Result};
use chrono::{Days, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use common_auth::password::hash_password;
use common_db::models::{Account, Appointment, AppointmentStatus, Doctor, Role, SlotTime};
use common_db::store::accounts::{self, NewAccount};
use common_db::store::doctors::{self, NewDoctor};
use common_db::store::appointments;

use crate::config::AdminBootstrap;

const SAMPLE_PASSWORD: &str = "password";

struct SampleDoctor {
    name: &'static str,
    specialty: &'static str,
    experience: i64,
    rating: f64,
    location: &'static str,
    availability: &'static str,
    slots: [&'static str; 4],
    email: &'static str,
    phone: &'static str,
    education: &'static str,
    about: &'static str,
    fee: f64,
    reviews: i64,
}

const SAMPLE_DOCTORS: [SampleDoctor; 6] = [
    SampleDoctor {
        name: "Dr. Sarah Johnson",
        specialty: "Cardiology",
        experience: 12,
        rating: 4.9,
        location: "New York, NY",
        availability: "Tomorrow, 2:00 PM",
        slots: ["10:00 AM", "11:00 AM", "2:00 PM", "3:00 PM"],
        email: "sarah.johnson@medicare.com",
        phone: "+1 (555) 123-4567",
        education: "MD from Harvard Medical School",
        about: "Board-certified cardiologist with over 12 years treating heart conditions.",
        fee: 250.0,
        reviews: 128,
    },
    SampleDoctor {
        name: "Dr. Michael Chen",
        specialty: "Orthopedics",
        experience: 10,
        rating: 4.8,
        location: "Boston, MA",
        availability: "Today, 4:30 PM",
        slots: ["9:00 AM", "10:30 AM", "1:00 PM", "4:00 PM"],
        email: "michael.chen@medicare.com",
        phone: "+1 (555) 234-5678",
        education: "MD from Johns Hopkins University",
        about: "Sports medicine and joint replacement surgery.",
        fee: 200.0,
        reviews: 95,
    },
    SampleDoctor {
        name: "Dr. Emily Wilson",
        specialty: "Neurology",
        experience: 8,
        rating: 4.7,
        location: "Los Angeles, CA",
        availability: "Friday, 10:00 AM",
        slots: ["10:00 AM", "11:30 AM", "2:30 PM", "3:30 PM"],
        email: "emily.wilson@medicare.com",
        phone: "+1 (555) 345-6789",
        education: "MD from Stanford University",
        about: "Neurological disorders and brain injuries.",
        fee: 300.0,
        reviews: 76,
    },
    SampleDoctor {
        name: "Dr. James Brown",
        specialty: "Pediatrics",
        experience: 15,
        rating: 5.0,
        location: "Chicago, IL",
        availability: "Monday, 9:00 AM",
        slots: ["9:30 AM", "11:00 AM", "1:30 PM", "3:30 PM"],
        email: "james.brown@medicare.com",
        phone: "+1 (555) 456-7890",
        education: "MD from Yale Medical School",
        about: "Pediatric care for over 15 years.",
        fee: 150.0,
        reviews: 203,
    },
    SampleDoctor {
        name: "Dr. Lisa Martinez",
        specialty: "Dermatology",
        experience: 7,
        rating: 4.6,
        location: "Miami, FL",
        availability: "Wednesday, 3:00 PM",
        slots: ["8:00 AM", "10:00 AM", "2:00 PM", "4:00 PM"],
        email: "lisa.martinez@medicare.com",
        phone: "+1 (555) 567-8901",
        education: "MD from UCLA Medical School",
        about: "Skin conditions and cosmetic dermatology.",
        fee: 180.0,
        reviews: 62,
    },
    SampleDoctor {
        name: "Dr. Robert Taylor",
        specialty: "General Practice",
        experience: 20,
        rating: 4.8,
        location: "Seattle, WA",
        availability: "Tomorrow, 11:00 AM",
        slots: ["8:30 AM", "11:00 AM", "2:30 PM", "4:30 PM"],
        email: "robert.taylor@medicare.com",
        phone: "+1 (555) 678-9012",
        education: "MD from University of Washington",
        about: "Primary care for patients of all ages.",
        fee: 120.0,
        reviews: 184,
    },
];

const SAMPLE_PATIENTS: [(&str, &str, &str); 3] = [
    ("John", "Smith", "patient@example.com"),
    ("Jane", "Doe", "jane.doe@example.com"),
    ("Robert", "Wilson", "robert.wilson@example.com"),
];

/// Cria o administrador configurado se o email ainda não estiver em uso
pub async fn ensure_admin(pool: &SqlitePool, admin: &AdminBootstrap) -> Result<()> {
    if let Some(existing) = accounts::find_by_email(pool, &admin.email).await? {
        if existing.role != Role::Admin {
            warn!(email = %existing.email, "ADMIN_EMAIL pertence a uma conta de paciente; ignorando");
        }
        return Ok(());
    }

    let password = admin.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("Falha ao aguardar hash da senha")??;

    let account = accounts::insert(
        pool,
        NewAccount {
            email: admin.email.clone(),
            password_hash,
            first_name: "System".to_string(),
            last_name: "Admin".to_string(),
            role: Role::Admin,
        },
    )
    .await
    .context("Falha ao criar administrador inicial")?;

    info!(email = %account.email, "Administrador inicial criado");
    Ok(())
}

/// Insere os dados de exemplo. Não faz nada se já houver contas ou médicos.
pub async fn seed_sample_data(pool: &SqlitePool, today: NaiveDate) -> Result<bool> {
    let existing_accounts = accounts::count_by_role(pool, Role::Patient).await?
        + accounts::count_by_role(pool, Role::Admin).await?;
    let existing_doctors = doctors::list(
        pool,
        &doctors::DoctorFilter {
            include_inactive: true,
            ..Default::default()
        },
        Default::default(),
    )
    .await?
    .pagination
    .total;

    if existing_accounts > 0 || existing_doctors > 0 {
        warn!(
            accounts = existing_accounts,
            doctors = existing_doctors,
            "Banco já possui dados; carga de exemplo ignorada"
        );
        return Ok(false);
    }

    let password_hash = tokio::task::spawn_blocking(|| hash_password(SAMPLE_PASSWORD))
        .await
        .context("Falha ao aguardar hash da senha")??;

    let new_account = |first: &str, last: &str, email: &str, role: Role| NewAccount {
        email: email.to_string(),
        password_hash: password_hash.clone(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        role,
    };

    accounts::insert(pool, new_account("System", "Admin", "admin@example.com", Role::Admin)).await?;
    let mut patients: Vec<Account> = Vec::with_capacity(SAMPLE_PATIENTS.len());
    for (first, last, email) in SAMPLE_PATIENTS {
        patients.push(accounts::insert(pool, new_account(first, last, email, Role::Patient)).await?);
    }
    info!("Contas de exemplo criadas (1 administrador, {} pacientes)", patients.len());

    let mut inserted: Vec<Doctor> = Vec::with_capacity(SAMPLE_DOCTORS.len());
    for sample in &SAMPLE_DOCTORS {
        let doctor = doctors::insert(
            pool,
            NewDoctor {
                name: sample.name.to_string(),
                specialty: sample.specialty.to_string(),
                experience: sample.experience,
                rating: sample.rating,
                location: sample.location.to_string(),
                consultation_fee: sample.fee,
                availability: sample.availability.to_string(),
                available_slots: sample.slots.iter().map(|s| s.to_string()).collect(),
                email: Some(sample.email.to_string()),
                phone: Some(sample.phone.to_string()),
                education: Some(sample.education.to_string()),
                about: Some(sample.about.to_string()),
                reviews: sample.reviews,
                is_active: true,
            },
        )
        .await?;
        inserted.push(doctor);
    }
    info!("{} médicos de exemplo criados", inserted.len());

    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
    let yesterday = today.checked_sub_days(Days::new(1)).unwrap_or(today);
    let plan = [
        (0, 0, tomorrow, "10:00 AM", AppointmentStatus::Scheduled, "General checkup", "Please arrive 15 minutes early"),
        (1, 1, yesterday, "1:00 PM", AppointmentStatus::Completed, "Orthopedic consultation", "Orthopedic consultation successful"),
        (2, 2, yesterday, "11:30 AM", AppointmentStatus::Completed, "Neurology checkup", "Neurology checkup done"),
        (0, 3, today, "3:30 PM", AppointmentStatus::Scheduled, "Pediatric visit", "Regular checkup"),
    ];

    let now = Utc::now();
    for (patient_idx, doctor_idx, date, time, status, reason, notes) in plan {
        let doctor = &inserted[doctor_idx];
        let slot = SlotTime::parse(time).ok_or_else(|| anyhow!("Horário inválido na carga: {}", time))?;
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: patients[patient_idx].id,
            doctor_id: doctor.id,
            date,
            time: slot.label,
            slot_minutes: slot.minutes,
            consultation_fee: doctor.consultation_fee,
            reason: reason.to_string(),
            notes: Some(notes.to_string()),
            status,
            created_at: now,
            updated_at: now,
        };
        appointments::insert(pool, &appointment).await?;
    }
    info!("{} agendamentos de exemplo criados", plan.len());

    Ok(true)
}
