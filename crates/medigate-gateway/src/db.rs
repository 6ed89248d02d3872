//! Patient SQLite database.
//!
//! Stores patient records and the per-patient analysis history. List
//! columns (symptoms, history, tests, precautions) are JSON-encoded text.
//! The systolic blood pressure is parsed once at insert and stored as an
//! integer so the "critical" filter is a plain comparison instead of a
//! regex over the raw "120/80" string.

use chrono::{DateTime, Utc};
use medigate_core::types::{NewPatient, Patient};
use medigate_engine::Recommendation;
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::Mutex;

/// Patient database — persistent storage behind the gateway.
pub struct PatientDb {
    conn: Mutex<Connection>,
}

/// A stored recommendation row from patient_history.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub patient_id: String,
    pub patient_name: String,
    pub possible_condition: String,
    pub suggested_tests: Vec<String>,
    pub dosage_recommendation: String,
    pub precautionary_measures: Vec<String>,
    pub ai_analysis_summary: String,
    pub timestamp: DateTime<Utc>,
}

/// Filters for the patient listing endpoint.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub search: String,
    pub gender: String,
    pub critical: bool,
}

/// Aggregate counts for the stats endpoint.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PatientStats {
    pub total: u64,
    pub male: u64,
    pub female: u64,
    pub critical: u64,
}

/// Systolic threshold above which a patient counts as critical.
const CRITICAL_SYSTOLIC: u32 = 140;

impl PatientDb {
    /// Open or create the patient database.
    pub fn open(path: &Path) -> Result<Self, String> {
        let conn = Connection::open(path).map_err(|e| format!("Patient DB open error: {e}"))?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL;").ok();

        let db = Self { conn: Mutex::new(conn) };
        db.migrate()?;
        Ok(db)
    }

    /// Run schema migrations.
    fn migrate(&self) -> Result<(), String> {
        let conn = self.conn.lock().map_err(|e| format!("Lock: {e}"))?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS patients (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                age INTEGER NOT NULL,
                gender TEXT NOT NULL,
                symptoms_json TEXT NOT NULL DEFAULT '[]',
                history_json TEXT NOT NULL DEFAULT '[]',
                bp TEXT NOT NULL DEFAULT '',
                systolic INTEGER,
                temperature TEXT NOT NULL DEFAULT '',
                heart_rate TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS patient_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_id TEXT NOT NULL,
                patient_name TEXT NOT NULL,
                possible_condition TEXT NOT NULL,
                suggested_tests_json TEXT NOT NULL DEFAULT '[]',
                dosage_recommendation TEXT NOT NULL DEFAULT '',
                precautions_json TEXT NOT NULL DEFAULT '[]',
                ai_analysis_summary TEXT NOT NULL DEFAULT '',
                timestamp TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_patients_created ON patients(created_at);
            CREATE INDEX IF NOT EXISTS idx_history_patient ON patient_history(patient_id);
        ",
        )
        .map_err(|e| format!("Migration error: {e}"))?;
        Ok(())
    }

    // ─── Patients ──────────────────────────────────────

    /// Insert a new patient and return the stored record.
    pub fn insert_patient(&self, new: &NewPatient) -> Result<Patient, String> {
        let patient = Patient {
            id: uuid::Uuid::new_v4().to_string(),
            name: new.name.clone(),
            age: new.age,
            gender: new.gender.clone(),
            symptoms: new.symptoms.clone(),
            history: new.history.clone(),
            bp: new.bp.clone(),
            temperature: new.temperature.clone(),
            heart_rate: new.heart_rate.clone(),
            created_at: Utc::now(),
        };
        let conn = self.conn.lock().map_err(|e| format!("Lock: {e}"))?;
        conn.execute(
            "INSERT INTO patients
             (id, name, age, gender, symptoms_json, history_json, bp, systolic,
              temperature, heart_rate, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                patient.id,
                patient.name,
                patient.age,
                patient.gender,
                serde_json::to_string(&patient.symptoms).unwrap_or_else(|_| "[]".into()),
                serde_json::to_string(&patient.history).unwrap_or_else(|_| "[]".into()),
                patient.bp,
                new.systolic(),
                patient.temperature,
                patient.heart_rate,
                patient.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| format!("Insert patient: {e}"))?;
        Ok(patient)
    }

    /// Fetch one patient by id.
    pub fn get_patient(&self, id: &str) -> Result<Option<Patient>, String> {
        let conn = self.conn.lock().map_err(|e| format!("Lock: {e}"))?;
        let mut stmt = conn
            .prepare(
                "SELECT id, name, age, gender, symptoms_json, history_json, bp,
                        temperature, heart_rate, created_at
                 FROM patients WHERE id = ?1",
            )
            .map_err(|e| format!("Prepare: {e}"))?;
        let mut rows = stmt
            .query_map([id], row_to_patient)
            .map_err(|e| format!("Query: {e}"))?;
        match rows.next() {
            Some(Ok(p)) => Ok(Some(p)),
            Some(Err(e)) => Err(format!("Row: {e}")),
            None => Ok(None),
        }
    }

    /// List patients with pagination and filters, newest first.
    /// Returns (patients, total matching the filters).
    pub fn list_patients(&self, q: &ListQuery) -> Result<(Vec<Patient>, u64), String> {
        let page = q.page.max(1);
        let limit = q.limit.clamp(1, 100);
        let offset = (u64::from(page) - 1) * u64::from(limit);

        let mut where_clauses: Vec<&str> = Vec::new();
        let mut args: Vec<rusqlite::types::Value> = Vec::new();
        if !q.search.is_empty() {
            where_clauses.push("name LIKE ?");
            args.push(rusqlite::types::Value::Text(format!("%{}%", q.search)));
        }
        if !q.gender.is_empty() {
            where_clauses.push("gender = ?");
            args.push(rusqlite::types::Value::Text(q.gender.clone()));
        }
        if q.critical {
            where_clauses.push("systolic > ?");
            args.push(rusqlite::types::Value::Integer(CRITICAL_SYSTOLIC as i64));
        }
        let where_sql = if where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_clauses.join(" AND "))
        };

        let conn = self.conn.lock().map_err(|e| format!("Lock: {e}"))?;

        let total: u64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM patients{where_sql}"),
                rusqlite::params_from_iter(args.iter()),
                |r| r.get::<_, i64>(0),
            )
            .map(|n| n as u64)
            .map_err(|e| format!("Count: {e}"))?;

        let sql = format!(
            "SELECT id, name, age, gender, symptoms_json, history_json, bp,
                    temperature, heart_rate, created_at
             FROM patients{where_sql} ORDER BY created_at DESC LIMIT {limit} OFFSET {offset}"
        );
        let mut stmt = conn.prepare(&sql).map_err(|e| format!("Prepare: {e}"))?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(args.iter()), row_to_patient)
            .map_err(|e| format!("Query: {e}"))?;
        let patients = rows.filter_map(|r| r.ok()).collect();
        Ok((patients, total))
    }

    /// Aggregate counts for the dashboard.
    pub fn stats(&self) -> Result<PatientStats, String> {
        let conn = self.conn.lock().map_err(|e| format!("Lock: {e}"))?;
        let count = |sql: &str| -> Result<u64, String> {
            conn.query_row(sql, [], |r| r.get::<_, i64>(0))
                .map(|n| n as u64)
                .map_err(|e| format!("Stats: {e}"))
        };
        Ok(PatientStats {
            total: count("SELECT COUNT(*) FROM patients")?,
            male: count("SELECT COUNT(*) FROM patients WHERE gender = 'Male'")?,
            female: count("SELECT COUNT(*) FROM patients WHERE gender = 'Female'")?,
            critical: count(&format!(
                "SELECT COUNT(*) FROM patients WHERE systolic > {CRITICAL_SYSTOLIC}"
            ))?,
        })
    }

    // ─── Analysis history ──────────────────────────────────────

    /// Persist a recommendation for a patient.
    pub fn insert_history(
        &self,
        patient_id: &str,
        patient_name: &str,
        rec: &Recommendation,
    ) -> Result<i64, String> {
        let conn = self.conn.lock().map_err(|e| format!("Lock: {e}"))?;
        conn.execute(
            "INSERT INTO patient_history
             (patient_id, patient_name, possible_condition, suggested_tests_json,
              dosage_recommendation, precautions_json, ai_analysis_summary, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                patient_id,
                patient_name,
                rec.possible_condition,
                serde_json::to_string(&rec.suggested_tests).unwrap_or_else(|_| "[]".into()),
                rec.dosage_recommendation,
                serde_json::to_string(&rec.precautionary_measures)
                    .unwrap_or_else(|_| "[]".into()),
                rec.ai_analysis_summary,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| format!("Insert history: {e}"))?;
        Ok(conn.last_insert_rowid())
    }

    /// Latest stored recommendation for a patient, if any.
    pub fn history_for(&self, patient_id: &str) -> Result<Option<HistoryRecord>, String> {
        let conn = self.conn.lock().map_err(|e| format!("Lock: {e}"))?;
        let mut stmt = conn
            .prepare(
                "SELECT id, patient_id, patient_name, possible_condition,
                        suggested_tests_json, dosage_recommendation, precautions_json,
                        ai_analysis_summary, timestamp
                 FROM patient_history WHERE patient_id = ?1
                 ORDER BY id DESC LIMIT 1",
            )
            .map_err(|e| format!("Prepare: {e}"))?;
        let mut rows = stmt
            .query_map([patient_id], row_to_history)
            .map_err(|e| format!("Query: {e}"))?;
        match rows.next() {
            Some(Ok(h)) => Ok(Some(h)),
            Some(Err(e)) => Err(format!("Row: {e}")),
            None => Ok(None),
        }
    }
}

fn row_to_patient(row: &rusqlite::Row<'_>) -> rusqlite::Result<Patient> {
    let symptoms_json: String = row.get(4)?;
    let history_json: String = row.get(5)?;
    let created_at_str: String = row.get(9)?;
    Ok(Patient {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        gender: row.get(3)?,
        symptoms: serde_json::from_str(&symptoms_json).unwrap_or_default(),
        history: serde_json::from_str(&history_json).unwrap_or_default(),
        bp: row.get(6)?,
        temperature: row.get(7)?,
        heart_rate: row.get(8)?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

fn row_to_history(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistoryRecord> {
    let tests_json: String = row.get(4)?;
    let precautions_json: String = row.get(6)?;
    let ts_str: String = row.get(8)?;
    Ok(HistoryRecord {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        patient_name: row.get(2)?,
        possible_condition: row.get(3)?,
        suggested_tests: serde_json::from_str(&tests_json).unwrap_or_default(),
        dosage_recommendation: row.get(5)?,
        precautionary_measures: serde_json::from_str(&precautions_json).unwrap_or_default(),
        ai_analysis_summary: row.get(7)?,
        timestamp: DateTime::parse_from_rfc3339(&ts_str)
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}
