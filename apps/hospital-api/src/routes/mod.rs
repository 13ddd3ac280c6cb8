//! Rotas HTTP montadas sob `/api`

pub mod admin;
pub mod appointments;
pub mod auth;
pub mod doctors;
pub mod health;
pub mod payments;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/doctors", get(doctors::list).post(doctors::create))
        .route(
            "/doctors/:id",
            get(doctors::get).put(doctors::update).delete(doctors::delete),
        )
        .route(
            "/appointments",
            get(appointments::list).post(appointments::create),
        )
        .route(
            "/appointments/:id",
            get(appointments::get)
                .put(appointments::update)
                .delete(appointments::cancel),
        )
        .route("/payments", get(payments::list).post(payments::create))
        .route("/payments/:id", get(payments::get).post(payments::pay))
        .route("/payments/:id/pay", post(payments::pay))
        .route("/payments/:id/refund", post(payments::refund))
        .route("/payments/:id/fail", post(payments::fail))
        .route("/patients", get(admin::patients))
        .route("/admin/stats", get(admin::stats))
        .route("/admin/appointments/:id", delete(admin::purge_appointment))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, LOCATION};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use common_auth::TokenIssuer;
    use common_db::models::{Account, Doctor, Role};
    use common_db::store::doctors;
    use common_db::testing::{insert_account, memory_pool, sample_doctor};

    use crate::build_router;
    use crate::config::AppConfig;
    use crate::state::AppState;

    struct TestApp {
        router: Router,
        state: AppState,
        admin: String,
        patient: Account,
        patient_token: String,
        doctor: Doctor,
    }

    impl TestApp {
        async fn new() -> anyhow::Result<Self> {
            let pool = memory_pool().await?;
            let config = AppConfig::default();
            let state = AppState::new(pool, &config);
            let router = build_router(state.clone(), &config);

            let admin = insert_account(&state.pool, "admin@hospital.local", Role::Admin).await?;
            let patient = insert_account(&state.pool, "paciente@hospital.local", Role::Patient).await?;
            let doctor = doctors::insert(
                &state.pool,
                sample_doctor("Dr. Sarah Johnson", "Cardiology", 4.9),
            )
            .await?;

            Ok(Self {
                admin: state.tokens.issue(&admin)?,
                patient_token: state.tokens.issue(&patient)?,
                router,
                state,
                patient,
                doctor,
            })
        }

        async fn token_for(&self, email: &str, role: Role) -> anyhow::Result<(Account, String)> {
            let account = insert_account(&self.state.pool, email, role).await?;
            let token = self.state.tokens.issue(&account)?;
            Ok((account, token))
        }

        async fn send(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
            }
            let request = match body {
                Some(json) => builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(json.to_string())),
                None => builder.body(Body::empty()),
            }
            .unwrap();

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, value)
        }

        async fn book(&self, token: &str, date: &str, time: &str) -> (StatusCode, Value) {
            let body = json!({
                "doctorId": self.doctor.id,
                "date": date,
                "time": time,
                "reason": "Check-up anual",
            });
            self.send(Method::POST, "/api/appointments", Some(token), Some(body))
                .await
        }

        async fn navigate(&self, path: &str, cookie: Option<&str>) -> (StatusCode, Option<String>) {
            let mut builder = Request::builder().uri(path);
            if let Some(token) = cookie {
                builder = builder.header(COOKIE, format!("theme=light; token={}", token));
            }
            let request = builder.body(Body::empty()).unwrap();
            let response = self.router.clone().oneshot(request).await.unwrap();
            let location = response
                .headers()
                .get(LOCATION)
                .map(|v| v.to_str().unwrap().to_string());
            (response.status(), location)
        }
    }

    fn is_transaction_id(value: &str) -> bool {
        let mut parts = value.splitn(3, '_');
        parts.next() == Some("txn")
            && parts
                .next()
                .is_some_and(|ms| !ms.is_empty() && ms.chars().all(|c| c.is_ascii_digit()))
            && parts.next().is_some_and(|suffix| {
                !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_alphanumeric())
            })
    }

    #[tokio::test]
    async fn test_health_reports_version() -> anyhow::Result<()> {
        let app = TestApp::new().await?;
        let (status, body) = app.send(Method::GET, "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        Ok(())
    }

    #[tokio::test]
    async fn test_double_booking_conflicts_and_status_filters() -> anyhow::Result<()> {
        let app = TestApp::new().await?;

        let (status, first) = app.book(&app.patient_token, "2024-06-01", "10:00 AM").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first["data"]["status"], "scheduled");
        assert_eq!(first["data"]["consultationFee"], 250.0);
        assert_eq!(first["data"]["doctor"]["name"], "Dr. Sarah Johnson");
        let id = first["data"]["id"].as_str().unwrap().to_string();

        let (status, second) = app.book(&app.patient_token, "2024-06-01", "10:00 AM").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(second["success"], false);

        let (_, current) = app
            .send(Method::GET, &format!("/api/appointments/{}", id), Some(&app.patient_token), None)
            .await;
        assert_eq!(current["data"]["status"], "scheduled");

        let (status, _) = app
            .send(
                Method::PUT,
                &format!("/api/appointments/{}", id),
                Some(&app.admin),
                Some(json!({ "status": "completed", "notes": "Sem alterações" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (_, scheduled) = app
            .send(Method::GET, "/api/appointments?status=scheduled", Some(&app.admin), None)
            .await;
        assert_eq!(scheduled["pagination"]["total"], 0);

        let (_, completed) = app
            .send(Method::GET, "/api/appointments?status=completed", Some(&app.admin), None)
            .await;
        assert_eq!(completed["pagination"]["total"], 1);
        assert_eq!(completed["data"][0]["notes"], "Sem alterações");
        Ok(())
    }

    #[tokio::test]
    async fn test_booking_validation() -> anyhow::Result<()> {
        let app = TestApp::new().await?;

        let (status, _) = app.book(&app.patient_token, "2024-06-01", "03:00 PM").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app.book(&app.patient_token, "01/06/2024", "10:00 AM").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Administrador precisa indicar o paciente
        let (status, _) = app.book(&app.admin, "2024-06-01", "10:00 AM").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let body = json!({
            "patientId": app.patient.id,
            "doctorId": app.doctor.id,
            "date": "2024-06-01",
            "time": "14:00",
            "reason": "Retorno",
        });
        let (status, created) = app
            .send(Method::POST, "/api/appointments", Some(&app.admin), Some(body))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["data"]["time"], "02:00 PM");
        assert_eq!(created["data"]["patientId"], json!(app.patient.id));
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_changes_only_status() -> anyhow::Result<()> {
        let app = TestApp::new().await?;
        let (_, booked) = app.book(&app.patient_token, "2024-06-01", "11:00 AM").await;
        let id = booked["data"]["id"].as_str().unwrap().to_string();
        let uri = format!("/api/appointments/{}", id);

        let (status, cancelled) = app.send(Method::DELETE, &uri, Some(&app.patient_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cancelled["data"]["status"], "cancelled");

        let mut before = booked["data"].clone();
        let mut after = cancelled["data"].clone();
        for record in [&mut before, &mut after] {
            let fields = record.as_object_mut().unwrap();
            fields.remove("status");
            fields.remove("updatedAt");
        }
        assert_eq!(before, after);

        let (status, _) = app.send(Method::DELETE, &uri, Some(&app.patient_token), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        // O horário liberado pode ser reservado de novo
        let (status, _) = app.book(&app.patient_token, "2024-06-01", "11:00 AM").await;
        assert_eq!(status, StatusCode::CREATED);
        Ok(())
    }

    #[tokio::test]
    async fn test_purge_removes_appointment() -> anyhow::Result<()> {
        let app = TestApp::new().await?;
        let (_, booked) = app.book(&app.patient_token, "2024-06-01", "10:00 AM").await;
        let id = booked["data"]["id"].as_str().unwrap().to_string();
        let purge_uri = format!("/api/admin/appointments/{}", id);

        let (status, _) = app
            .send(Method::DELETE, &purge_uri, Some(&app.patient_token), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app.send(Method::DELETE, &purge_uri, Some(&app.admin), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app
            .send(Method::GET, &format!("/api/appointments/{}", id), Some(&app.admin), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, listed) = app.send(Method::GET, "/api/appointments", Some(&app.admin), None).await;
        assert_eq!(listed["pagination"]["total"], 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_date_filter_matches_one_day() -> anyhow::Result<()> {
        let app = TestApp::new().await?;
        for date in ["2024-05-31", "2024-06-01", "2024-06-02"] {
            let (status, _) = app.book(&app.patient_token, date, "10:00 AM").await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, listed) = app
            .send(Method::GET, "/api/appointments?date=2024-06-01", Some(&app.patient_token), None)
            .await;
        assert_eq!(listed["pagination"]["total"], 1);
        assert_eq!(listed["data"][0]["date"], "2024-06-01");

        let (status, _) = app
            .send(Method::GET, "/api/appointments?date=ontem", Some(&app.patient_token), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_payment_lifecycle() -> anyhow::Result<()> {
        let app = TestApp::new().await?;
        let (_, booked) = app.book(&app.patient_token, "2024-06-01", "10:00 AM").await;
        let appointment_id = booked["data"]["id"].clone();

        let pay_with = |method: &str, amount: f64| {
            json!({ "appointmentId": appointment_id, "amount": amount, "paymentMethod": method })
        };

        let (status, cash) = app
            .send(Method::POST, "/api/payments", Some(&app.patient_token), Some(pay_with("cash", 250.0)))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(cash["data"]["status"], "paid");
        assert!(is_transaction_id(cash["data"]["transactionId"].as_str().unwrap()));

        let (_, transfer) = app
            .send(Method::POST, "/api/payments", Some(&app.patient_token), Some(pay_with("bank_transfer", 100.0)))
            .await;
        assert_eq!(transfer["data"]["status"], "paid");
        assert!(transfer["data"]["paidAt"].is_null());

        let (_, card) = app
            .send(Method::POST, "/api/payments", Some(&app.patient_token), Some(pay_with("credit_card", 250.0)))
            .await;
        assert_eq!(card["data"]["status"], "pending");
        assert_eq!(card["data"]["appointment"]["doctorName"], "Dr. Sarah Johnson");
        let card_id = card["data"]["id"].as_str().unwrap().to_string();

        let (status, _) = app
            .send(Method::POST, "/api/payments", Some(&app.patient_token), Some(pay_with("pix", 10.0)))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, paid) = app
            .send(Method::POST, &format!("/api/payments/{}", card_id), Some(&app.patient_token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(paid["data"]["status"], "paid");
        let paid_at = paid["data"]["paidAt"].clone();
        assert!(paid_at.is_string());

        let (status, again) = app
            .send(Method::POST, &format!("/api/payments/{}/pay", card_id), Some(&app.patient_token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(again["data"]["paidAt"], paid_at);

        let refund_uri = format!("/api/payments/{}/refund", card_id);
        let (status, _) = app.send(Method::POST, &refund_uri, Some(&app.patient_token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, refunded) = app.send(Method::POST, &refund_uri, Some(&app.admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(refunded["data"]["status"], "refunded");

        let (status, _) = app
            .send(Method::POST, &format!("/api/payments/{}", card_id), Some(&app.admin), None)
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = app
            .send(Method::POST, &format!("/api/payments/{}/fail", card_id), Some(&app.admin), None)
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        Ok(())
    }

    #[tokio::test]
    async fn test_payment_requires_existing_appointment() -> anyhow::Result<()> {
        let app = TestApp::new().await?;
        let body = json!({
            "appointmentId": uuid::Uuid::new_v4(),
            "amount": 50.0,
            "paymentMethod": "cash",
        });
        let (status, _) = app
            .send(Method::POST, "/api/payments", Some(&app.admin), Some(body))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_patients_are_isolated() -> anyhow::Result<()> {
        let app = TestApp::new().await?;
        let (other, other_token) = app.token_for("outra@hospital.local", Role::Patient).await?;
        let (_, booked) = app.book(&app.patient_token, "2024-06-01", "10:00 AM").await;
        let id = booked["data"]["id"].as_str().unwrap().to_string();

        let (status, _) = app.send(Method::GET, "/api/appointments", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = app
            .send(Method::GET, "/api/appointments", Some("nao.e.um.jwt"), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app
            .send(Method::GET, &format!("/api/appointments/{}", id), Some(&other_token), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = app
            .send(Method::DELETE, &format!("/api/appointments/{}", id), Some(&other_token), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let uri = format!("/api/appointments?patientId={}", app.patient.id);
        let (status, _) = app.send(Method::GET, &uri, Some(&other_token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, own) = app.send(Method::GET, "/api/appointments", Some(&other_token), None).await;
        assert_eq!(own["pagination"]["total"], 0);

        let pay = json!({ "appointmentId": id, "amount": 10.0, "paymentMethod": "cash" });
        let (status, _) = app
            .send(Method::POST, "/api/payments", Some(&other_token), Some(pay))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, payments) = app
            .send(Method::GET, &format!("/api/payments?patientId={}", other.id), Some(&other_token), None)
            .await;
        assert_eq!(payments["data"], json!([]));

        for (method, uri) in [
            (Method::GET, "/api/admin/stats"),
            (Method::GET, "/api/patients"),
            (Method::POST, "/api/doctors"),
        ] {
            let body = (method == Method::POST).then(|| {
                json!({ "name": "Dr. X", "specialty": "Y", "location": "Z", "consultationFee": 1.0 })
            });
            let (status, _) = app.send(method, uri, Some(&app.patient_token), body).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_register_login_and_me() -> anyhow::Result<()> {
        let app = TestApp::new().await?;
        let registration = json!({
            "email": "Maria@Example.com",
            "password": "segredo123",
            "firstName": "Maria",
            "lastName": "Silva",
        });

        let (status, created) = app
            .send(Method::POST, "/api/auth/register", None, Some(registration.clone()))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["user"]["role"], "patient");
        assert_eq!(created["user"]["email"], "maria@example.com");
        assert!(created["user"].get("passwordHash").is_none());

        let (status, _) = app
            .send(Method::POST, "/api/auth/register", None, Some(registration))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let wants_admin = json!({
            "email": "intruso@example.com",
            "password": "segredo123",
            "firstName": "I",
            "lastName": "N",
            "role": "admin",
        });
        let (status, _) = app
            .send(Method::POST, "/api/auth/register", Some(&app.patient_token), Some(wants_admin))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let blank_name = json!({
            "email": "sem.nome@example.com",
            "password": "segredo123",
            "firstName": "   ",
            "lastName": "Silva",
        });
        let (status, body) = app
            .send(Method::POST, "/api/auth/register", None, Some(blank_name))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = app
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": "maria@example.com", "password": "errada" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, logged) = app
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": "maria@example.com", "password": "segredo123" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let token = logged["token"].as_str().unwrap().to_string();

        let (status, me) = app.send(Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["data"]["firstName"], "Maria");
        Ok(())
    }

    #[tokio::test]
    async fn test_doctor_directory() -> anyhow::Result<()> {
        let app = TestApp::new().await?;
        let doctor_uri = format!("/api/doctors/{}", app.doctor.id);

        let (status, _) = app
            .send(Method::PUT, &doctor_uri, Some(&app.admin), Some(json!({ "isActive": false })))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (_, public) = app.send(Method::GET, "/api/doctors", None, None).await;
        assert_eq!(public["pagination"]["total"], 0);

        let (_, hidden) = app
            .send(Method::GET, "/api/doctors?includeInactive=true", Some(&app.patient_token), None)
            .await;
        assert_eq!(hidden["pagination"]["total"], 0);

        let (_, all) = app
            .send(Method::GET, "/api/doctors?includeInactive=true", Some(&app.admin), None)
            .await;
        assert_eq!(all["pagination"]["total"], 1);

        let (status, inactive) = app.send(Method::GET, &doctor_uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(inactive["data"]["isActive"], false);

        let (status, _) = app.book(&app.patient_token, "2024-06-01", "10:00 AM").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let new_doctor = json!({
            "name": "Dr. Michael Chen",
            "specialty": "Orthopedics",
            "location": "Boston, MA",
            "consultationFee": 200.0,
            "email": "michael.chen@medicare.com",
        });
        let (status, created) = app
            .send(Method::POST, "/api/doctors", Some(&app.admin), Some(new_doctor.clone()))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["data"]["availableSlots"].as_array().unwrap().len(), 4);
        let (status, _) = app
            .send(Method::POST, "/api/doctors", Some(&app.admin), Some(new_doctor))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let bad_slots = json!({ "availableSlots": ["meio-dia"] });
        let (status, _) = app
            .send(Method::PUT, &doctor_uri, Some(&app.admin), Some(bad_slots))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app.send(Method::GET, "/api/doctors/abc", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_doctor_with_history_cannot_be_deleted() -> anyhow::Result<()> {
        let app = TestApp::new().await?;
        app.book(&app.patient_token, "2024-06-01", "10:00 AM").await;
        let uri = format!("/api/doctors/{}", app.doctor.id);

        let (status, _) = app.send(Method::DELETE, &uri, Some(&app.admin), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = app.send(Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_dashboard() -> anyhow::Result<()> {
        let app = TestApp::new().await?;
        let today = chrono::Utc::now().date_naive().to_string();
        let (_, booked) = app.book(&app.patient_token, &today, "10:00 AM").await;
        let pay = json!({ "appointmentId": booked["data"]["id"], "amount": 250.0, "paymentMethod": "cash" });
        app.send(Method::POST, "/api/payments", Some(&app.admin), Some(pay)).await;

        let (status, board) = app.send(Method::GET, "/api/admin/stats", Some(&app.admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(board["success"], true);
        assert_eq!(board["stats"]["totalPatients"], 1);
        assert_eq!(board["stats"]["totalDoctors"], 1);
        assert_eq!(board["stats"]["revenue"], 250.0);
        assert_eq!(board["recentAppointments"].as_array().unwrap().len(), 1);
        let trend = board["trendData"].as_array().unwrap();
        assert_eq!(trend.len(), 7);
        assert_eq!(trend[6]["date"], today);
        assert_eq!(trend[6]["appointments"], 1);
        assert_eq!(trend[6]["revenue"], 250.0);

        let (_, patients) = app.send(Method::GET, "/api/patients", Some(&app.admin), None).await;
        assert_eq!(patients["data"][0]["appointmentCount"], 1);
        assert_eq!(patients["data"][0]["lastVisit"], today);
        Ok(())
    }

    #[tokio::test]
    async fn test_navigation_gate() -> anyhow::Result<()> {
        let app = TestApp::new().await?;

        let (status, location) = app.navigate("/admin/doctors", None).await;
        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location.as_deref(), Some("/login?callbackUrl=%2Fadmin%2Fdoctors"));

        let (status, location) = app.navigate("/admin", Some(&app.patient_token)).await;
        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location.as_deref(), Some("/login?callbackUrl=%2Fadmin"));

        let (status, _) = app.navigate("/patient/appointments", Some("forjado")).await;
        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);

        // Passa pelo portão; sem front-end configurado a página não existe
        let (status, _) = app.navigate("/admin/doctors", Some(&app.admin)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app.navigate("/patient/appointments", Some(&app.patient_token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app.navigate("/administrative", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // A API responde com 401, nunca com redirecionamento
        let (status, location) = app.navigate("/api/admin/stats", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(location.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_stale_token_browses_public_directory_anonymously() -> anyhow::Result<()> {
        let app = TestApp::new().await?;

        let (status, body) = app
            .send(Method::GET, "/api/doctors", Some("expired.or.garbage"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let expired_issuer = TokenIssuer::new(
            AppConfig::default().jwt_secret.as_bytes(),
            chrono::Duration::seconds(-60),
        );
        let expired = expired_issuer.issue(&app.patient)?;
        let (status, _) = app.send(Method::GET, "/api/doctors", Some(&expired), None).await;
        assert_eq!(status, StatusCode::OK);

        // Rotas que exigem sessão continuam recusando o token vencido
        let (status, _) = app.send(Method::GET, "/api/auth/me", Some(&expired), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn test_session_cookie_does_not_authorize_api_calls() -> anyhow::Result<()> {
        let app = TestApp::new().await?;
        let (_, booked) = app.book(&app.patient_token, "2024-06-01", "10:00 AM").await;
        let pay = json!({ "appointmentId": booked["data"]["id"], "amount": 250.0, "paymentMethod": "credit_card" });
        let (_, card) = app
            .send(Method::POST, "/api/payments", Some(&app.patient_token), Some(pay))
            .await;
        let pay_uri = format!("/api/payments/{}/pay", card["data"]["id"].as_str().unwrap());

        let request = Request::builder()
            .method(Method::POST)
            .uri(&pay_uri)
            .header(COOKIE, format!("token={}", app.patient_token))
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let payment_uri = format!("/api/payments/{}", card["data"]["id"].as_str().unwrap());
        let (_, current) = app
            .send(Method::GET, &payment_uri, Some(&app.patient_token), None)
            .await;
        assert_eq!(current["data"]["status"], "pending");
        Ok(())
    }
}
