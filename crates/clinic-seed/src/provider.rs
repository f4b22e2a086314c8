//! Random text and value generation.
//!
//! The seeder never calls a faker directly; it asks a [`TextProvider`], so
//! tests can swap in a deterministic or adversarial source.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Months, NaiveDate, SubsecRound, Utc};
use fake::faker::address::en::{BuildingNumber, CityName, StreetName};
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::{Paragraph, Sentence};
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of realistic random values for fixtures.
pub trait TextProvider {
    /// A sentence of exactly `word_count` words.
    fn random_sentence(&mut self, word_count: usize) -> String;

    /// A paragraph of exactly `sentence_count` sentences.
    fn random_paragraph(&mut self, sentence_count: usize) -> String;

    /// An email address not returned before by this provider.
    fn random_email(&mut self) -> String;

    fn random_phone(&mut self) -> String;

    fn random_address(&mut self) -> String;

    fn random_first_name(&mut self) -> String;

    fn random_last_name(&mut self) -> String;

    /// A birth date giving an age on `today` within `[min_age, max_age]`.
    fn random_date_of_birth(&mut self, today: NaiveDate, min_age: u32, max_age: u32) -> NaiveDate;

    /// A whole-second instant in `[start, end]`.
    fn random_datetime_between(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DateTime<Utc>;

    /// `true` with the given probability.
    fn random_boolean(&mut self, probability: f64) -> bool;
}

/// Redraws before an email is made unique with a numeric suffix.
const EMAIL_REDRAWS: usize = 8;

/// [`TextProvider`] backed by the `fake` crate's English locale.
pub struct FakeProvider {
    rng: StdRng,
    issued_emails: HashSet<String>,
}

impl FakeProvider {
    pub fn new(rng: StdRng) -> Self {
        Self {
            rng,
            issued_emails: HashSet::new(),
        }
    }

    /// Provider whose output is fully determined by `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    fn disambiguate(&self, email: &str) -> String {
        let (local, domain) = email.split_once('@').unwrap_or((email, "example.com"));
        let mut n = self.issued_emails.len();
        loop {
            let candidate = format!("{}.{}@{}", local, n, domain);
            if !self.issued_emails.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

impl TextProvider for FakeProvider {
    fn random_sentence(&mut self, word_count: usize) -> String {
        Sentence(word_count..word_count + 1).fake_with_rng(&mut self.rng)
    }

    fn random_paragraph(&mut self, sentence_count: usize) -> String {
        Paragraph(sentence_count..sentence_count + 1).fake_with_rng(&mut self.rng)
    }

    fn random_email(&mut self) -> String {
        let mut email: String = SafeEmail().fake_with_rng(&mut self.rng);
        for _ in 0..EMAIL_REDRAWS {
            if !self.issued_emails.contains(&email) {
                break;
            }
            email = SafeEmail().fake_with_rng(&mut self.rng);
        }
        if self.issued_emails.contains(&email) {
            email = self.disambiguate(&email);
        }
        self.issued_emails.insert(email.clone());
        email
    }

    fn random_phone(&mut self) -> String {
        PhoneNumber().fake_with_rng(&mut self.rng)
    }

    fn random_address(&mut self) -> String {
        let number: String = BuildingNumber().fake_with_rng(&mut self.rng);
        let street: String = StreetName().fake_with_rng(&mut self.rng);
        let city: String = CityName().fake_with_rng(&mut self.rng);
        format!("{} {}, {}", number, street, city)
    }

    fn random_first_name(&mut self) -> String {
        FirstName().fake_with_rng(&mut self.rng)
    }

    fn random_last_name(&mut self) -> String {
        LastName().fake_with_rng(&mut self.rng)
    }

    fn random_date_of_birth(&mut self, today: NaiveDate, min_age: u32, max_age: u32) -> NaiveDate {
        let latest = years_before(today, min_age);
        // Day after the (max_age + 1)th birthday window closes
        let earliest = years_before(today, max_age.saturating_add(1)).and_then(|d| d.succ_opt());

        match (earliest, latest) {
            (Some(earliest), Some(latest)) if earliest <= latest => {
                let span = (latest - earliest).num_days();
                earliest + Duration::days(self.rng.gen_range(0..=span))
            }
            (_, Some(latest)) => latest,
            _ => today,
        }
    }

    fn random_datetime_between(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DateTime<Utc> {
        let start = start.trunc_subsecs(0);
        let span = (end - start).num_seconds();
        if span <= 0 {
            return start;
        }
        start + Duration::seconds(self.rng.gen_range(0..=span))
    }

    fn random_boolean(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }
}

fn years_before(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    date.checked_sub_months(Months::new(years.checked_mul(12)?))
}
