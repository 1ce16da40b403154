use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_record(
    conn: &Connection,
    record: &NewMedicalRecord,
) -> Result<MedicalRecord, DatabaseError> {
    let record_date = now_timestamp();
    conn.execute(
        "INSERT INTO medical_records (patient_id, symptom, diagnosis, treatment_plan, record_date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            record.patient_id,
            record.symptom,
            record.diagnosis,
            record.treatment_plan,
            format_timestamp(&record_date),
        ],
    )?;
    Ok(MedicalRecord {
        id: conn.last_insert_rowid(),
        patient_id: record.patient_id,
        symptom: record.symptom.clone(),
        diagnosis: record.diagnosis.clone(),
        treatment_plan: record.treatment_plan.clone(),
        record_date,
    })
}

/// A patient's records, newest first.
pub fn get_records_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<MedicalRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, symptom, diagnosis, treatment_plan, record_date
         FROM medical_records WHERE patient_id = ?1
         ORDER BY record_date DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![patient_id], |row| {
        Ok(MedicalRecord {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            symptom: row.get(2)?,
            diagnosis: row.get(3)?,
            treatment_plan: row.get(4)?,
            record_date: parse_timestamp(&row.get::<_, String>(5)?).unwrap_or_default(),
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Fetch a record only if it belongs to `patient_id`.
pub fn get_patient_record(
    conn: &Connection,
    patient_id: i64,
    record_id: i64,
) -> Result<MedicalRecord, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, patient_id, symptom, diagnosis, treatment_plan, record_date
         FROM medical_records WHERE id = ?1 AND patient_id = ?2",
        params![record_id, patient_id],
        |row| {
            Ok(MedicalRecord {
                id: row.get(0)?,
                patient_id: row.get(1)?,
                symptom: row.get(2)?,
                diagnosis: row.get(3)?,
                treatment_plan: row.get(4)?,
                record_date: parse_timestamp(&row.get::<_, String>(5)?).unwrap_or_default(),
            })
        },
    );

    match result {
        Ok(record) => Ok(record),
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            Err(DatabaseError::not_found("MedicalRecord", record_id))
        }
        Err(e) => Err(e.into()),
    }
}
