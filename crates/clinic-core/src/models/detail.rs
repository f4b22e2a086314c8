//! Read models with related records embedded, as served to API clients.

use serde::{Deserialize, Serialize};

use super::{Doctor, LabReport, Medication, Patient, Prescription, Treatment, Visit};

/// Doctor with the name of its specialty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorDetail {
    #[serde(flatten)]
    pub doctor: Doctor,
    pub full_name: String,
    pub specialty_name: String,
}

/// Patient with the blood type label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientDetail {
    #[serde(flatten)]
    pub patient: Patient,
    pub full_name: String,
    pub blood_type_display: String,
}

impl From<Patient> for PatientDetail {
    fn from(patient: Patient) -> Self {
        Self {
            full_name: patient.full_name(),
            blood_type_display: patient.blood_type.display_name().to_string(),
            patient,
        }
    }
}

/// Prescription with the prescribed medication embedded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrescriptionDetail {
    #[serde(flatten)]
    pub prescription: Prescription,
    pub medication: Medication,
}

/// Treatment with its prescriptions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreatmentDetail {
    #[serde(flatten)]
    pub treatment: Treatment,
    pub prescriptions: Vec<PrescriptionDetail>,
}

/// Visit with participant names and the full treatment tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisitDetail {
    #[serde(flatten)]
    pub visit: Visit,
    pub patient_full_name: String,
    pub doctor_full_name: String,
    pub doctor_specialty: String,
    pub status_display: String,
    pub treatments: Vec<TreatmentDetail>,
}

impl VisitDetail {
    /// Total prescriptions across all treatments.
    pub fn prescription_count(&self) -> usize {
        self.treatments.iter().map(|t| t.prescriptions.len()).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabReportDetail {
    #[serde(flatten)]
    pub report: LabReport,
    pub patient_full_name: String,
}
