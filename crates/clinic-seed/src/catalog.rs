//! Fixed fixture data: specialty names, the medication catalog and the
//! vocabularies prescriptions are drawn from.

/// Specialties created by every run.
pub const SPECIALTY_NAMES: [&str; 12] = [
    "Cardiology",
    "Dermatology",
    "Pediatrics",
    "General Medicine",
    "Gynecology",
    "Ophthalmology",
    "Neurology",
    "Traumatology",
    "Endocrinology",
    "Urology",
    "Psychology",
    "Nutrition",
];

/// One row of the medication catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogMedication {
    pub name: &'static str,
    pub manufacturer: &'static str,
    pub stock: u32,
    pub unit_price: f64,
}

const fn med(
    name: &'static str,
    manufacturer: &'static str,
    stock: u32,
    unit_price: f64,
) -> CatalogMedication {
    CatalogMedication {
        name,
        manufacturer,
        stock,
        unit_price,
    }
}

pub const MEDICATIONS: [CatalogMedication; 10] = [
    med("Paracetamol", "Laboratorio Chile", 100, 3500.00),
    med("Ibuprofen", "Recalcine", 75, 5200.50),
    med("Amoxicillin", "Savai", 50, 8900.00),
    med("Losartan", "Andrómaco", 60, 12500.75),
    med("Omeprazole", "Farpasa", 90, 7100.00),
    med("Atorvastatin", "Pfizer", 40, 15000.00),
    med("Metformin", "Novartis", 80, 9800.00),
    med("Salbutamol", "GSK", 30, 6000.00),
    med("Dexamethasone", "Merck", 25, 4500.00),
    med("Clonazepam", "Sanofi", 120, 11000.00),
];

/// Medications dispensed as inhalers.
pub const INHALERS: [&str; 1] = ["Salbutamol"];

pub const DOSAGE_UNITS: [&str; 3] = ["tablets", "drops", "ml"];
pub const INHALER_UNIT: &str = "puffs";

pub const FREQUENCY_HOURS: [u32; 4] = [6, 8, 12, 24];

/// Whether `medication` is dosed in puffs.
pub fn is_inhaler(medication: &str) -> bool {
    INHALERS.iter().any(|name| name.eq_ignore_ascii_case(medication))
}
