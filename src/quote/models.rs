use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_TVA_TAUX: f64 = 20.0;
pub const DEFAULT_CONDITIONS_PAIEMENT: &str = "30% à la commande, solde à réception";
pub const DEFAULT_DELAI_REALISATION: &str = "À définir";
pub const DEFAULT_VALIDITE_JOURS: u32 = 30;
pub const DEFAULT_FORME_JURIDIQUE: &str = "auto-entrepreneur";

fn default_tva_taux() -> f64 {
    DEFAULT_TVA_TAUX
}

fn default_delai_realisation() -> String {
    DEFAULT_DELAI_REALISATION.to_string()
}

fn default_validite_jours() -> u32 {
    DEFAULT_VALIDITE_JOURS
}

/// Issuer of the quote.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct Entreprise {
    pub nom: String,
    /// Manager name, printed under the company name when present.
    #[serde(default)]
    pub gerant: String,
    pub siret: String,
    pub adresse: String,
    pub cp_ville: String,
    pub tel: String,
    #[serde(default)]
    pub email: String,
    /// Default rate used by the simplified endpoint.
    #[serde(default)]
    pub tva_taux: Option<f64>,
    #[serde(default)]
    pub conditions_paiement: Option<String>,
    #[serde(default)]
    pub delai_validite: Option<u32>,
    #[serde(default)]
    pub forme_juridique: Option<String>,
    #[serde(default)]
    pub capital_social: Option<String>,
    #[serde(default)]
    pub rcs: Option<String>,
    #[serde(default)]
    pub tva_intracommunautaire: Option<String>,
    /// Accent colour of the document, `#RRGGBB`.
    #[serde(default)]
    pub couleur_pdf: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct Client {
    pub nom: String,
    #[serde(default)]
    pub adresse: String,
    #[serde(default)]
    pub cp_ville: String,
    #[serde(default)]
    pub tel: String,
    #[serde(default)]
    pub email: String,
}

/// One billable row of the quote.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct Prestation {
    pub description: String,
    pub quantite: f64,
    pub unite: String,
    pub prix_unitaire: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RemiseType {
    Pourcentage,
    Montant,
    Fixe,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct DevisRequest {
    pub entreprise: Entreprise,
    pub client: Client,
    pub prestations: Vec<Prestation>,
    #[serde(default = "default_tva_taux")]
    pub tva_taux: f64,
    /// Falls back to the issuer's terms, then to the house default.
    #[serde(default)]
    pub conditions_paiement: Option<String>,
    #[serde(default = "default_delai_realisation")]
    pub delai_realisation: String,
    #[serde(default = "default_validite_jours")]
    pub validite_jours: u32,
    #[serde(default)]
    pub remise_type: Option<RemiseType>,
    #[serde(default)]
    pub remise_valeur: f64,
}

impl DevisRequest {
    pub fn resolved_conditions_paiement(&self) -> String {
        self.conditions_paiement
            .as_deref()
            .or(self.entreprise.conditions_paiement.as_deref())
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CONDITIONS_PAIEMENT)
            .to_string()
    }
}

/// Quote content as produced by an assistant: only the client name is known.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct DevisData {
    pub client_nom: String,
    pub prestations: Vec<Prestation>,
    #[serde(default = "default_delai_realisation")]
    pub delai: String,
    #[serde(default)]
    pub remise_type: Option<RemiseType>,
    #[serde(default)]
    pub remise_valeur: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct DevisRequestSimple {
    pub entreprise: Entreprise,
    pub devis_data: DevisData,
    #[serde(default)]
    pub validite_jours: Option<u32>,
}

impl From<DevisRequestSimple> for DevisRequest {
    fn from(simple: DevisRequestSimple) -> Self {
        let tva_taux = simple.entreprise.tva_taux.unwrap_or(DEFAULT_TVA_TAUX);
        let validite_jours = simple
            .validite_jours
            .or(simple.entreprise.delai_validite)
            .unwrap_or(DEFAULT_VALIDITE_JOURS);
        let data = simple.devis_data;

        DevisRequest {
            client: Client {
                nom: data.client_nom,
                adresse: String::new(),
                cp_ville: String::new(),
                tel: String::new(),
                email: String::new(),
            },
            entreprise: simple.entreprise,
            prestations: data.prestations,
            tva_taux,
            conditions_paiement: None,
            delai_realisation: data.delai,
            validite_jours,
            remise_type: data.remise_type,
            remise_valeur: data.remise_valeur,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct DevisResponse {
    pub success: bool,
    pub numero_devis: String,
    pub total_ht: f64,
    pub total_ttc: f64,
    pub pdf_filename: String,
    pub pdf_url: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct StatusResponse {
    pub message: String,
    pub version: String,
    pub status: String,
}
