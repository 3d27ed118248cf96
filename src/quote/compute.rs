//! Computation stage: turns a validated request into a priced quote.
//!
//! Amounts are decimal and rounded half-up to cents at every line total and
//! every aggregate. The resulting [`ComputedQuote`] is the only source of the
//! figures shown in the PDF and returned in the JSON response.

use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};
use chrono::{Days, NaiveDate, Utc};

use super::models::{Client, DevisRequest, Entreprise, Prestation, RemiseType};
use super::numbering::generate_quote_number_for;
use super::validation::{ValidationError, ValidationErrors};
use super::QuoteError;

const CENTS_SCALE: i64 = 2;

#[derive(Debug, Clone)]
pub struct ComputedLine {
    pub prestation: Prestation,
    pub prix_unitaire: BigDecimal,
    pub total_ht: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuoteTotals {
    /// Sum of the line totals, before discount.
    pub sous_total_ht: BigDecimal,
    pub remise: BigDecimal,
    /// Taxable base, after discount.
    pub total_ht: BigDecimal,
    pub montant_tva: BigDecimal,
    pub total_ttc: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct ComputedQuote {
    pub numero_devis: String,
    pub date_emission: NaiveDate,
    pub date_validite: NaiveDate,
    pub entreprise: Entreprise,
    pub client: Client,
    pub lignes: Vec<ComputedLine>,
    pub tva_taux: f64,
    pub remise_type: Option<RemiseType>,
    pub remise_valeur: f64,
    pub totals: QuoteTotals,
    pub conditions_paiement: String,
    pub delai_realisation: String,
}

impl ComputedQuote {
    pub fn has_remise(&self) -> bool {
        self.totals.remise > BigDecimal::from(0)
    }
}

/// Round to cents, half away from zero.
pub fn round_cents(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(CENTS_SCALE, RoundingMode::HalfUp)
}

/// Amount as printed in the document, e.g. `2700.00 €`. Always two
/// decimals, zero included.
pub fn format_amount(value: &BigDecimal) -> String {
    let rounded = round_cents(value);
    match (&rounded * BigDecimal::from(100)).to_i128() {
        Some(cents) => {
            let sign = if cents < 0 { "-" } else { "" };
            let cents = cents.unsigned_abs();
            format!("{}{}.{:02} €", sign, cents / 100, cents % 100)
        }
        None => format!("{:.2} €", rounded),
    }
}

pub fn to_json_number(value: &BigDecimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Converts through the shortest decimal representation of the float, so
/// `0.1` becomes exactly `0.1` rather than its binary expansion.
fn to_decimal(value: f64, field: &str) -> Result<BigDecimal, QuoteError> {
    if !value.is_finite() {
        return Err(single_error(ValidationError::not_finite(field, "Le montant")));
    }
    BigDecimal::from_str(&value.to_string()).map_err(|_| {
        single_error(ValidationError::new(field, format!("Montant '{}' invalide", value)))
    })
}

fn single_error(error: ValidationError) -> QuoteError {
    let mut errors = ValidationErrors::new();
    errors.add(error);
    QuoteError::Validation(errors)
}

/// Price a request, allocating a fresh identifier dated today (UTC).
pub fn compute_quote(request: &DevisRequest) -> Result<ComputedQuote, QuoteError> {
    let today = Utc::now().date_naive();
    compute_quote_with(request, generate_quote_number_for(today), today)
}

pub fn compute_quote_with(
    request: &DevisRequest,
    numero_devis: String,
    date_emission: NaiveDate,
) -> Result<ComputedQuote, QuoteError> {
    let lignes = request
        .prestations
        .iter()
        .enumerate()
        .map(|(index, prestation)| compute_line(prestation, index))
        .collect::<Result<Vec<_>, _>>()?;

    let taux = to_decimal(request.tva_taux, "tva_taux")?;
    let remise_valeur = to_decimal(request.remise_valeur, "remise_valeur")?;
    let totals = compute_totals(&lignes, &taux, request.remise_type, &remise_valeur);

    let date_validite = date_emission
        .checked_add_days(Days::new(u64::from(request.validite_jours)))
        .ok_or_else(|| {
            single_error(ValidationError::out_of_range(
                "validite_jours",
                "La durée de validité",
                "raisonnable",
            ))
        })?;

    Ok(ComputedQuote {
        numero_devis,
        date_emission,
        date_validite,
        entreprise: request.entreprise.clone(),
        client: request.client.clone(),
        lignes,
        tva_taux: request.tva_taux,
        remise_type: request.remise_type,
        remise_valeur: request.remise_valeur,
        totals,
        conditions_paiement: request.resolved_conditions_paiement(),
        delai_realisation: request.delai_realisation.clone(),
    })
}

fn compute_line(prestation: &Prestation, index: usize) -> Result<ComputedLine, QuoteError> {
    let quantite = to_decimal(prestation.quantite, &format!("prestations[{}].quantite", index))?;
    let prix = to_decimal(
        prestation.prix_unitaire,
        &format!("prestations[{}].prix_unitaire", index),
    )?;

    Ok(ComputedLine {
        prestation: prestation.clone(),
        total_ht: round_cents(&(quantite * &prix)),
        prix_unitaire: prix,
    })
}

pub fn compute_totals(
    lignes: &[ComputedLine],
    taux: &BigDecimal,
    remise_type: Option<RemiseType>,
    remise_valeur: &BigDecimal,
) -> QuoteTotals {
    let zero = BigDecimal::from(0);
    let hundred = BigDecimal::from(100);

    let sous_total_ht = round_cents(
        &lignes
            .iter()
            .fold(zero.clone(), |acc, ligne| acc + &ligne.total_ht),
    );

    let remise_brute = match remise_type {
        Some(RemiseType::Pourcentage) => &sous_total_ht * remise_valeur / &hundred,
        Some(RemiseType::Montant) | Some(RemiseType::Fixe) => remise_valeur.clone(),
        None => zero.clone(),
    };
    let remise = if remise_brute <= zero {
        round_cents(&zero)
    } else if remise_brute > sous_total_ht {
        sous_total_ht.clone()
    } else {
        round_cents(&remise_brute)
    };

    let total_ht = round_cents(&(&sous_total_ht - &remise));
    let montant_tva = round_cents(&(&total_ht * taux / &hundred));
    let total_ttc = round_cents(&(&total_ht + &montant_tva));

    QuoteTotals {
        sous_total_ht,
        remise,
        total_ht,
        montant_tva,
        total_ttc,
    }
}
