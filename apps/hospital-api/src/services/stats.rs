//! Painel administrativo: contagens, totais financeiros e tendência semanal
//!
//! Toda cifra financeira sai do livro de pagamentos. O valor da consulta
//! gravado no agendamento é só a cotação do momento da reserva.

use chrono::{Days, NaiveDate};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use uuid::Uuid;

use common_db::models::{AppointmentStatus, PageRequest, Role};
use common_db::store::appointments::{self, AppointmentFilter};
use common_db::store::{accounts, doctors, payments};

use crate::error::ApiResult;

const TREND_DAYS: u64 = 7;
const RECENT_LIMIT: u32 = 10;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTotals {
    pub total_patients: i64,
    pub total_appointments: i64,
    /// Somente médicos ativos
    pub total_doctors: i64,
    pub revenue: f64,
    pub pending_amount: f64,
    pub paid_count: i64,
    pub payment_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentAppointment {
    pub id: Uuid,
    pub patient_name: String,
    pub doctor_name: String,
    pub date: NaiveDate,
    pub time: String,
    pub status: AppointmentStatus,
}

/// Um dia da tendência
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// Dia da semana abreviado ("Mon", "Tue", ...)
    pub name: String,
    pub date: NaiveDate,
    pub appointments: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: DashboardTotals,
    pub recent_appointments: Vec<RecentAppointment>,
    pub trend_data: Vec<TrendPoint>,
}

/// Monta o painel para os 7 dias UTC que terminam em `today`
pub async fn dashboard(pool: &SqlitePool, today: NaiveDate) -> ApiResult<Dashboard> {
    let total_patients = accounts::count_by_role(pool, Role::Patient).await?;
    let total_appointments = appointments::count(pool).await?;
    let total_doctors = doctors::count_active(pool).await?;
    let ledger = payments::totals(pool).await?;

    let recent = appointments::list(
        pool,
        &AppointmentFilter::default(),
        PageRequest {
            page: 1,
            limit: RECENT_LIMIT,
        },
    )
    .await?;
    let recent_appointments = recent
        .items
        .into_iter()
        .map(|view| RecentAppointment {
            id: view.appointment.id,
            patient_name: format!("{} {}", view.patient.first_name, view.patient.last_name),
            doctor_name: view.doctor.name,
            date: view.appointment.date,
            time: view.appointment.time,
            status: view.appointment.status,
        })
        .collect();

    let trend_data = trend(pool, today).await?;

    Ok(Dashboard {
        stats: DashboardTotals {
            total_patients,
            total_appointments,
            total_doctors,
            revenue: ledger.revenue,
            pending_amount: ledger.pending_amount,
            paid_count: ledger.paid_count,
            payment_count: ledger.payment_count,
        },
        recent_appointments,
        trend_data,
    })
}

async fn trend(pool: &SqlitePool, today: NaiveDate) -> ApiResult<Vec<TrendPoint>> {
    let first = today
        .checked_sub_days(Days::new(TREND_DAYS - 1))
        .unwrap_or(NaiveDate::MIN);
    let until = today.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX);

    let counts: HashMap<NaiveDate, i64> = appointments::count_by_day(pool, first, until)
        .await?
        .into_iter()
        .collect();
    let revenue: HashMap<NaiveDate, f64> = payments::revenue_by_day(pool, first, until)
        .await?
        .into_iter()
        .collect();

    Ok(first
        .iter_days()
        .take_while(|day| *day <= today)
        .map(|day| TrendPoint {
            name: day.format("%a").to_string(),
            date: day,
            appointments: counts.get(&day).copied().unwrap_or(0),
            revenue: revenue.get(&day).copied().unwrap_or(0.0),
        })
        .collect())
}
