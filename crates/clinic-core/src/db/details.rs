//! Detail views: records with their related records embedded.

use rusqlite::OptionalExtension;

use super::doctors::{doctor_from_row, DOCTOR_QUERY};
use super::{Database, DbError, DbResult};
use crate::models::{
    DoctorDetail, LabReportDetail, PatientDetail, Prescription, PrescriptionDetail, Treatment,
    TreatmentDetail, VisitDetail,
};

impl Database {
    /// Doctor with the name of its specialty.
    pub fn doctor_detail(&self, id: i64) -> DbResult<Option<DoctorDetail>> {
        let sql = format!(
            "SELECT {}, s.name FROM {} WHERE d.id = ?",
            DOCTOR_QUERY.columns, DOCTOR_QUERY.from
        );
        self.conn
            .query_row(&sql, [id], |row| {
                let doctor = doctor_from_row(row)?;
                Ok(DoctorDetail {
                    full_name: doctor.full_name(),
                    specialty_name: row.get(8)?,
                    doctor,
                })
            })
            .optional()
            .map_err(Into::into)
    }

    pub fn patient_detail(&self, id: i64) -> DbResult<Option<PatientDetail>> {
        Ok(self.get_patient(id)?.map(PatientDetail::from))
    }

    /// Prescription with its medication.
    pub fn prescription_detail(&self, id: i64) -> DbResult<Option<PrescriptionDetail>> {
        match self.get_prescription(id)? {
            Some(prescription) => self.expand_prescription(prescription).map(Some),
            None => Ok(None),
        }
    }

    /// Treatment with every prescription and its medication.
    pub fn treatment_detail(&self, id: i64) -> DbResult<Option<TreatmentDetail>> {
        match self.get_treatment(id)? {
            Some(treatment) => self.expand_treatment(treatment).map(Some),
            None => Ok(None),
        }
    }

    /// Visit with patient and doctor names and the full treatment tree.
    pub fn visit_detail(&self, id: i64) -> DbResult<Option<VisitDetail>> {
        let Some(visit) = self.get_visit(id)? else {
            return Ok(None);
        };

        let patient = self
            .get_patient(visit.patient_id)?
            .ok_or_else(|| DbError::NotFound(format!("patient {}", visit.patient_id)))?;
        let doctor = self
            .doctor_detail(visit.doctor_id)?
            .ok_or_else(|| DbError::NotFound(format!("doctor {}", visit.doctor_id)))?;

        let treatments = self
            .list_treatments_for_visit(visit.id)?
            .into_iter()
            .map(|treatment| self.expand_treatment(treatment))
            .collect::<DbResult<Vec<_>>>()?;

        Ok(Some(VisitDetail {
            patient_full_name: patient.full_name(),
            doctor_full_name: doctor.full_name,
            doctor_specialty: doctor.specialty_name,
            status_display: visit.status.display_name().to_string(),
            treatments,
            visit,
        }))
    }

    pub fn lab_report_detail(&self, id: i64) -> DbResult<Option<LabReportDetail>> {
        let Some(report) = self.get_lab_report(id)? else {
            return Ok(None);
        };
        let patient = self
            .get_patient(report.patient_id)?
            .ok_or_else(|| DbError::NotFound(format!("patient {}", report.patient_id)))?;

        Ok(Some(LabReportDetail {
            patient_full_name: patient.full_name(),
            report,
        }))
    }

    fn expand_treatment(&self, treatment: Treatment) -> DbResult<TreatmentDetail> {
        let prescriptions = self
            .list_prescriptions_for_treatment(treatment.id)?
            .into_iter()
            .map(|prescription| self.expand_prescription(prescription))
            .collect::<DbResult<Vec<_>>>()?;
        Ok(TreatmentDetail {
            treatment,
            prescriptions,
        })
    }

    fn expand_prescription(&self, prescription: Prescription) -> DbResult<PrescriptionDetail> {
        let medication = self
            .get_medication(prescription.medication_id)?
            .ok_or_else(|| DbError::NotFound(format!("medication {}", prescription.medication_id)))?;
        Ok(PrescriptionDetail {
            prescription,
            medication,
        })
    }
}
