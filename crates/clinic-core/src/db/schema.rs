//! SQLite schema definition.

/// Complete database schema for the clinic.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Specialties and Doctors
-- ============================================================================

CREATE TABLE IF NOT EXISTS specialties (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE CHECK (length(trim(name)) > 0),
    description TEXT
);

CREATE TABLE IF NOT EXISTS doctors (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    surname TEXT NOT NULL,
    national_id TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    phone TEXT,
    active INTEGER NOT NULL DEFAULT 1,
    specialty_id INTEGER NOT NULL REFERENCES specialties(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_doctors_specialty ON doctors(specialty_id);
CREATE INDEX IF NOT EXISTS idx_doctors_surname ON doctors(surname, name);

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id INTEGER PRIMARY KEY,
    national_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    surname TEXT NOT NULL,
    birth_date TEXT NOT NULL,
    blood_type TEXT NOT NULL
        CHECK (blood_type IN ('A+', 'A-', 'B+', 'B-', 'AB+', 'AB-', 'O+', 'O-')),
    email TEXT,
    phone TEXT,
    address TEXT,
    active INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS idx_patients_surname ON patients(surname, name);

-- ============================================================================
-- Medications
-- ============================================================================

CREATE TABLE IF NOT EXISTS medications (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    manufacturer TEXT NOT NULL,
    stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
    unit_price REAL NOT NULL CHECK (unit_price >= 0)
);

-- ============================================================================
-- Visits
-- ============================================================================

CREATE TABLE IF NOT EXISTS visits (
    id INTEGER PRIMARY KEY,
    patient_id INTEGER NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
    doctor_id INTEGER NOT NULL REFERENCES doctors(id) ON DELETE CASCADE,
    visit_datetime TEXT NOT NULL,
    reason TEXT NOT NULL,
    diagnosis TEXT,
    status TEXT NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'completed', 'cancelled')),
    -- Diagnosis only on completed visits
    CHECK (diagnosis IS NULL OR status = 'completed')
);

CREATE INDEX IF NOT EXISTS idx_visits_patient ON visits(patient_id);
CREATE INDEX IF NOT EXISTS idx_visits_doctor ON visits(doctor_id);
CREATE INDEX IF NOT EXISTS idx_visits_datetime ON visits(visit_datetime);

-- ============================================================================
-- Treatments and Prescriptions
-- ============================================================================

CREATE TABLE IF NOT EXISTS treatments (
    id INTEGER PRIMARY KEY,
    visit_id INTEGER NOT NULL REFERENCES visits(id) ON DELETE CASCADE,
    description TEXT NOT NULL,
    duration_days INTEGER NOT NULL CHECK (duration_days > 0),
    notes TEXT
);

CREATE INDEX IF NOT EXISTS idx_treatments_visit ON treatments(visit_id);

-- Treatments only attach to completed visits with a diagnosis
CREATE TRIGGER IF NOT EXISTS treatments_check_visit BEFORE INSERT ON treatments
BEGIN
    SELECT CASE
        WHEN NOT EXISTS (
            SELECT 1 FROM visits
            WHERE id = new.visit_id AND status = 'completed' AND diagnosis IS NOT NULL
        ) THEN
            RAISE(ABORT, 'Treatment requires a completed visit with a diagnosis')
    END;
END;

CREATE TRIGGER IF NOT EXISTS treatments_check_visit_update BEFORE UPDATE OF visit_id ON treatments
BEGIN
    SELECT CASE
        WHEN NOT EXISTS (
            SELECT 1 FROM visits
            WHERE id = new.visit_id AND status = 'completed' AND diagnosis IS NOT NULL
        ) THEN
            RAISE(ABORT, 'Treatment requires a completed visit with a diagnosis')
    END;
END;

CREATE TRIGGER IF NOT EXISTS visits_keep_treatable BEFORE UPDATE OF status, diagnosis ON visits
WHEN EXISTS (SELECT 1 FROM treatments WHERE visit_id = new.id)
BEGIN
    SELECT CASE
        WHEN new.status != 'completed' OR new.diagnosis IS NULL THEN
            RAISE(ABORT, 'Visit with treatments must stay completed with a diagnosis')
    END;
END;

CREATE TABLE IF NOT EXISTS prescriptions (
    id INTEGER PRIMARY KEY,
    treatment_id INTEGER NOT NULL REFERENCES treatments(id) ON DELETE CASCADE,
    medication_id INTEGER NOT NULL REFERENCES medications(id) ON DELETE CASCADE,
    dosage TEXT NOT NULL,
    frequency TEXT NOT NULL,
    duration TEXT NOT NULL,
    UNIQUE (treatment_id, medication_id)
);

CREATE INDEX IF NOT EXISTS idx_prescriptions_medication ON prescriptions(medication_id);

-- ============================================================================
-- Lab Reports
-- ============================================================================

CREATE TABLE IF NOT EXISTS lab_reports (
    id INTEGER PRIMARY KEY,
    patient_id INTEGER NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
    visit_id INTEGER REFERENCES visits(id) ON DELETE SET NULL,
    exam_type TEXT NOT NULL,
    requested_on TEXT NOT NULL,
    result_on TEXT,
    results TEXT NOT NULL DEFAULT '',
    analysed_by TEXT,
    CHECK (result_on IS NULL OR result_on >= requested_on)
);

CREATE INDEX IF NOT EXISTS idx_lab_reports_patient ON lab_reports(patient_id);
CREATE INDEX IF NOT EXISTS idx_lab_reports_visit ON lab_reports(visit_id);
"#;
