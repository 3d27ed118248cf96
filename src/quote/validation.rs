//! Input validation for quote requests.
//!
//! Every field is checked and all failures are reported together, so a
//! caller can fix its payload in one round trip.

use std::fmt;

use super::models::{Client, DevisRequest, Entreprise, Prestation, RemiseType};

const MAX_TVA_TAUX: f64 = 100.0;
const MAX_VALIDITE_JOURS: u32 = 3650;

/// Validation error with a user-facing message.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Path of the offending field, e.g. `prestations[2].quantite`
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} ne peut pas être vide", label))
            .with_suggestion(format!("Renseignez {}", label.to_lowercase()))
    }

    pub fn not_finite(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} doit être un nombre fini", label))
    }

    pub fn out_of_range(field: &str, label: &str, range: &str) -> Self {
        Self::new(field, format!("{} doit être {}", label, range))
    }

    pub fn invalid_color(field: &str, value: &str) -> Self {
        Self::new(field, format!("Couleur '{}' invalide", value))
            .with_suggestion("Utilisez le format hexadécimal #RRGGBB, par exemple #2F665B")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Default, Clone)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation échouée : {} erreur(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "; {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Trait for validating request objects.
pub trait Validator {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

impl Validator for DevisRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        validate_entreprise(&self.entreprise, &mut errors);
        validate_client(&self.client, &mut errors);

        for (index, prestation) in self.prestations.iter().enumerate() {
            validate_prestation(prestation, index, &mut errors);
        }

        if !self.tva_taux.is_finite() {
            errors.add(ValidationError::not_finite("tva_taux", "Le taux de TVA"));
        } else if self.tva_taux.abs() > MAX_TVA_TAUX {
            errors.add(ValidationError::out_of_range(
                "tva_taux",
                "Le taux de TVA",
                "compris entre -100 et 100",
            ));
        }

        if self.validite_jours > MAX_VALIDITE_JOURS {
            errors.add(ValidationError::out_of_range(
                "validite_jours",
                "La durée de validité",
                "inférieure ou égale à 3650 jours",
            ));
        }

        validate_remise(self.remise_type, self.remise_valeur, &mut errors);

        errors.into_result()
    }
}

pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field, label));
    }
}

/// `#RRGGBB` or `RRGGBB`.
pub fn is_hex_color(value: &str) -> bool {
    let hex = value.trim().trim_start_matches('#');
    hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

fn validate_entreprise(entreprise: &Entreprise, errors: &mut ValidationErrors) {
    validate_required(&entreprise.nom, "entreprise.nom", "Le nom de l'entreprise", errors);
    validate_required(&entreprise.siret, "entreprise.siret", "Le SIRET", errors);

    if let Some(ref couleur) = entreprise.couleur_pdf {
        if !couleur.trim().is_empty() && !is_hex_color(couleur) {
            errors.add(ValidationError::invalid_color("entreprise.couleur_pdf", couleur));
        }
    }
}

fn validate_client(client: &Client, errors: &mut ValidationErrors) {
    validate_required(&client.nom, "client.nom", "Le nom du client", errors);
}

fn validate_prestation(prestation: &Prestation, index: usize, errors: &mut ValidationErrors) {
    let field = |name: &str| format!("prestations[{}].{}", index, name);

    validate_required(
        &prestation.description,
        &field("description"),
        "La description",
        errors,
    );

    if !prestation.quantite.is_finite() {
        errors.add(ValidationError::not_finite(&field("quantite"), "La quantité"));
    } else if prestation.quantite <= 0.0 {
        errors.add(ValidationError::out_of_range(
            &field("quantite"),
            "La quantité",
            "strictement positive",
        ));
    }

    if !prestation.prix_unitaire.is_finite() {
        errors.add(ValidationError::not_finite(&field("prix_unitaire"), "Le prix unitaire"));
    } else if prestation.prix_unitaire < 0.0 {
        errors.add(ValidationError::out_of_range(
            &field("prix_unitaire"),
            "Le prix unitaire",
            "positif ou nul",
        ));
    }
}

fn validate_remise(remise_type: Option<RemiseType>, valeur: f64, errors: &mut ValidationErrors) {
    if !valeur.is_finite() {
        errors.add(ValidationError::not_finite("remise_valeur", "La remise"));
        return;
    }
    if valeur < 0.0 {
        errors.add(ValidationError::out_of_range("remise_valeur", "La remise", "positive ou nulle"));
        return;
    }
    if remise_type == Some(RemiseType::Pourcentage) && valeur > 100.0 {
        errors.add(ValidationError::out_of_range(
            "remise_valeur",
            "Une remise en pourcentage",
            "inférieure ou égale à 100",
        ));
    }
}
