use std::collections::HashMap;
use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::enums::Department;
use crate::models::*;

const PATIENT_COLUMNS: &str =
    "id, name, id_card, age, gender, phone_number, department, created_at";

/// Raw row; the department is validated after the statement completes.
struct PatientRow {
    id: i64,
    name: String,
    id_card: String,
    age: Option<i64>,
    gender: Option<String>,
    phone_number: Option<String>,
    department: String,
    created_at: String,
}

impl PatientRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            id_card: row.get(2)?,
            age: row.get(3)?,
            gender: row.get(4)?,
            phone_number: row.get(5)?,
            department: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    fn into_patient(self) -> Result<Patient, DatabaseError> {
        Ok(Patient {
            id: self.id,
            name: self.name,
            id_card: self.id_card,
            age: self.age,
            gender: self.gender,
            phone_number: self.phone_number,
            department: Department::from_str(&self.department)?,
            created_at: parse_timestamp(&self.created_at).unwrap_or_default(),
        })
    }
}

pub fn insert_patient(conn: &Connection, patient: &NewPatient) -> Result<Patient, DatabaseError> {
    let created_at = now_timestamp();
    conn.execute(
        "INSERT INTO patients (name, id_card, age, gender, phone_number, department, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            patient.name,
            patient.id_card,
            patient.age,
            patient.gender,
            patient.phone_number,
            patient.department.as_str(),
            format_timestamp(&created_at),
        ],
    )?;
    Ok(Patient {
        id: conn.last_insert_rowid(),
        name: patient.name.clone(),
        id_card: patient.id_card.clone(),
        age: patient.age,
        gender: patient.gender.clone(),
        phone_number: patient.phone_number.clone(),
        department: patient.department,
        created_at,
    })
}

pub fn get_patient(conn: &Connection, id: i64) -> Result<Option<Patient>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1"),
            params![id],
            PatientRow::read,
        )
        .optional()?;
    row.map(PatientRow::into_patient).transpose()
}

/// Paginated list, newest first. `search` matches name, ID card or phone.
pub fn list_patients(conn: &Connection, query: &PatientQuery) -> Result<PatientPage, DatabaseError> {
    let per_page = query.per_page.max(1);
    let page = query.page.max(1);
    let pattern = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{s}%"));
    let department = query.department.map(|d| d.as_str());

    let filter = "WHERE (?1 IS NULL OR name LIKE ?1 OR id_card LIKE ?1 OR phone_number LIKE ?1)
                    AND (?2 IS NULL OR department = ?2)";

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM patients {filter}"),
        params![pattern, department],
        |row| row.get(0),
    )?;

    let offset = i64::from(page - 1) * i64::from(per_page);
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients {filter}
         ORDER BY created_at DESC, id DESC LIMIT ?3 OFFSET ?4"
    ))?;
    let rows = stmt
        .query_map(
            params![pattern, department, i64::from(per_page), offset],
            PatientRow::read,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    let items = rows
        .into_iter()
        .map(PatientRow::into_patient)
        .collect::<Result<Vec<_>, _>>()?;

    let total = total.max(0) as u64;
    Ok(PatientPage {
        items,
        total,
        page,
        pages: total.div_ceil(u64::from(per_page)) as u32,
        per_page,
    })
}

pub fn update_patient(
    conn: &Connection,
    id: i64,
    changes: &PatientChanges,
) -> Result<Patient, DatabaseError> {
    let mut patient = get_patient(conn, id)?.ok_or_else(|| DatabaseError::not_found("Patient", id))?;

    if let Some(name) = &changes.name {
        patient.name = name.clone();
    }
    if let Some(id_card) = &changes.id_card {
        patient.id_card = id_card.clone();
    }
    if let Some(age) = changes.age {
        patient.age = Some(age);
    }
    if let Some(gender) = &changes.gender {
        patient.gender = Some(gender.clone());
    }
    if let Some(phone) = &changes.phone_number {
        patient.phone_number = Some(phone.clone());
    }
    if let Some(department) = changes.department {
        patient.department = department;
    }

    conn.execute(
        "UPDATE patients SET name = ?1, id_card = ?2, age = ?3, gender = ?4,
         phone_number = ?5, department = ?6 WHERE id = ?7",
        params![
            patient.name,
            patient.id_card,
            patient.age,
            patient.gender,
            patient.phone_number,
            patient.department.as_str(),
            id,
        ],
    )?;
    Ok(patient)
}

/// Deletes the patient and, through the foreign key, their records.
pub fn delete_patient(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let removed = conn.execute("DELETE FROM patients WHERE id = ?1", params![id])?;
    if removed == 0 {
        return Err(DatabaseError::not_found("Patient", id));
    }
    Ok(())
}

/// Patient count per department. Every department is listed, empty ones with 0.
pub fn department_stats(conn: &Connection) -> Result<Vec<(Department, u64)>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT department, COUNT(*) FROM patients GROUP BY department")?;
    let counts: HashMap<String, i64> = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<Result<_, _>>()?;

    Ok(Department::ALL
        .iter()
        .map(|d| (*d, counts.get(d.as_str()).copied().unwrap_or(0).max(0) as u64))
        .collect())
}
