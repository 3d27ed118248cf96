//! Quote (devis) template.
//!
//! Every page carries the coloured header band and the legal footer. The
//! first page adds the issuer and client blocks; the table of prestations
//! flows over as many pages as needed, followed by the totals with the
//! signature box and finally the conditions box.

use std::ops::Range;

use super::common::{format_date, format_rate, join_address, truncate, wrap_two_lines};
use super::engine::{Align, FontStyle, PdfCanvas, RgbColor};
use super::layout::{
    plan_pages, row_bottom, PageLayout, SectionHeights, HEADER_BAND_HEIGHT, MARGIN, PAGE_HEIGHT,
    PAGE_WIDTH, PARTIES_BOX_HEIGHT, PARTIES_TOP, ROW_HEIGHT, TABLE_HEADER_HEIGHT,
};
use super::{GeneratedDocument, Generator, RenderError};
use crate::quote::compute::{format_amount, ComputedQuote};
use crate::quote::models::{Client, Entreprise, RemiseType, DEFAULT_FORME_JURIDIQUE};
use crate::quote::numbering::pdf_filename;

const DEFAULT_ACCENT: RgbColor = RgbColor::new(0x2f, 0x66, 0x5b);
const DARK: RgbColor = RgbColor::new(0x2c, 0x3e, 0x50);
const LIGHT: RgbColor = RgbColor::new(0xec, 0xf0, 0xf1);
const MUTED: RgbColor = RgbColor::new(0x55, 0x55, 0x55);
const ROW_SHADE: RgbColor = RgbColor::new(0xf8, 0xf9, 0xfa);
const DEDUCTION: RgbColor = RgbColor::new(0xe7, 0x4c, 0x3c);

pub const TVA_EXEMPTION_NOTICE: &str =
    "TVA non applicable, article 293 B du Code général des impôts";

const TOTALS_LINE_HEIGHT: f32 = 6.0;
const TTC_BOX_HEIGHT: f32 = 10.0;
const SIGNATURE_HEIGHT: f32 = 40.0;
const CONDITIONS_HEIGHT: f32 = 35.0;

const COL_DESCRIPTION: f32 = 18.0;
const COL_QUANTITE: f32 = 105.0;
const COL_UNITE: f32 = 120.0;
const COL_PRIX_RIGHT: f32 = 165.0;
const COL_TOTAL_RIGHT: f32 = PAGE_WIDTH - 18.0;
const TOTALS_LABEL_X: f32 = 125.0;

const DESCRIPTION_MAX_CHARS: usize = 46;
const ADDRESS_WRAP: usize = 35;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalsLineKind {
    Amount,
    Deduction,
    Note,
    Grand,
}

/// One row of the totals block, exactly as printed.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalsLine {
    pub label: String,
    pub value: String,
    pub kind: TotalsLineKind,
}

impl TotalsLine {
    fn new(label: impl Into<String>, value: impl Into<String>, kind: TotalsLineKind) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            kind,
        }
    }
}

pub fn totals_lines(quote: &ComputedQuote) -> Vec<TotalsLine> {
    let totals = &quote.totals;
    let mut lines = Vec::new();

    if quote.has_remise() {
        lines.push(TotalsLine::new(
            "Total HT avant remise",
            format_amount(&totals.sous_total_ht),
            TotalsLineKind::Amount,
        ));
        let label = match quote.remise_type {
            Some(RemiseType::Pourcentage) => format!("Remise ({})", format_rate(quote.remise_valeur)),
            _ => "Remise".to_string(),
        };
        lines.push(TotalsLine::new(
            label,
            format!("-{}", format_amount(&totals.remise)),
            TotalsLineKind::Deduction,
        ));
        lines.push(TotalsLine::new(
            "Total HT après remise",
            format_amount(&totals.total_ht),
            TotalsLineKind::Amount,
        ));
    } else {
        lines.push(TotalsLine::new(
            "Total HT",
            format_amount(&totals.total_ht),
            TotalsLineKind::Amount,
        ));
    }

    if quote.tva_taux == 0.0 {
        lines.push(TotalsLine::new("TVA non applicable", "", TotalsLineKind::Note));
    } else {
        lines.push(TotalsLine::new(
            format!("TVA ({})", format_rate(quote.tva_taux)),
            format_amount(&totals.montant_tva),
            TotalsLineKind::Amount,
        ));
    }

    lines.push(TotalsLine::new(
        "TOTAL TTC",
        format_amount(&totals.total_ttc),
        TotalsLineKind::Grand,
    ));
    lines
}

fn summary_height(lines: &[TotalsLine]) -> f32 {
    let regular = lines.iter().filter(|l| l.kind != TotalsLineKind::Grand).count();
    let totals = 5.0 + regular as f32 * TOTALS_LINE_HEIGHT + TTC_BOX_HEIGHT + 2.0;
    totals.max(SIGNATURE_HEIGHT + 2.0)
}

pub fn issuer_lines(entreprise: &Entreprise) -> Vec<String> {
    let mut lines = vec![truncate(&entreprise.nom, 40)];
    lines.extend(wrap_two_lines(&entreprise.adresse, ADDRESS_WRAP));
    if !entreprise.cp_ville.trim().is_empty() {
        lines.push(entreprise.cp_ville.trim().to_string());
    }
    lines.push(format!("Tél : {}", entreprise.tel.trim()));
    if !entreprise.email.trim().is_empty() {
        lines.push(format!("Email : {}", truncate(&entreprise.email, 35)));
    }
    lines.push(format!("SIRET : {}", entreprise.siret.trim()));
    lines
}

pub fn client_lines(client: &Client) -> Vec<String> {
    let mut lines = vec![truncate(&client.nom, 40)];
    lines.extend(wrap_two_lines(&client.adresse, ADDRESS_WRAP));
    if !client.cp_ville.trim().is_empty() {
        lines.push(client.cp_ville.trim().to_string());
    }
    if !client.tel.trim().is_empty() {
        lines.push(format!("Tél : {}", client.tel.trim()));
    }
    if !client.email.trim().is_empty() {
        lines.push(format!("Email : {}", truncate(&client.email, 35)));
    }
    lines
}

pub fn conditions_lines(quote: &ComputedQuote) -> Vec<String> {
    vec![
        format!("- Délai de réalisation : {}", quote.delai_realisation.trim()),
        format!("- Conditions de paiement : {}", quote.conditions_paiement),
        format!(
            "- Devis valable jusqu'au : {}",
            format_date(quote.date_validite)
        ),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LegalForm {
    Societe,
    EntrepriseIndividuelle,
    MicroEntreprise,
    Autre,
}

impl LegalForm {
    fn parse(forme: &str) -> Self {
        match forme.trim().to_lowercase().as_str() {
            "sarl" | "eurl" | "sas" | "sasu" => Self::Societe,
            "ei" => Self::EntrepriseIndividuelle,
            "auto-entrepreneur" | "micro-entreprise" => Self::MicroEntreprise,
            _ => Self::Autre,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Legal mentions printed at the bottom of every page.
pub fn footer_lines(quote: &ComputedQuote) -> Vec<String> {
    let entreprise = &quote.entreprise;
    let nom = entreprise.nom.trim();
    let forme = non_empty(&entreprise.forme_juridique).unwrap_or(DEFAULT_FORME_JURIDIQUE);
    let legal_form = LegalForm::parse(forme);

    let identity = match legal_form {
        LegalForm::Societe => match non_empty(&entreprise.capital_social) {
            Some(capital) => format!("{} - {} au capital de {} €", nom, forme.to_uppercase(), capital),
            None => format!("{} - {}", nom, forme.to_uppercase()),
        },
        LegalForm::EntrepriseIndividuelle => format!("{} - Entreprise Individuelle", nom),
        LegalForm::MicroEntreprise => format!("{} - Auto-entrepreneur", nom),
        LegalForm::Autre => nom.to_string(),
    };

    let mut registration = format!("SIRET : {}", entreprise.siret.trim());
    match (legal_form, non_empty(&entreprise.rcs)) {
        (LegalForm::Societe, Some(rcs)) => registration.push_str(&format!(" - {}", rcs)),
        (LegalForm::MicroEntreprise, _) => {
            registration.push_str(" - Dispensé d'immatriculation au RCS")
        }
        _ => {}
    }

    let address = join_address(&entreprise.adresse, &entreprise.cp_ville);
    let contact = if address.is_empty() {
        format!("Tél : {}", entreprise.tel.trim())
    } else {
        format!("{} - Tél : {}", address, entreprise.tel.trim())
    };

    let tva = if quote.tva_taux == 0.0 {
        TVA_EXEMPTION_NOTICE.to_string()
    } else if let Some(numero) = non_empty(&entreprise.tva_intracommunautaire) {
        format!("N° TVA intracommunautaire : {}", numero)
    } else {
        let siren: String = entreprise
            .siret
            .chars()
            .filter(|c| c.is_ascii_digit())
            .take(9)
            .collect();
        format!("TVA intracommunautaire : FR{}", siren)
    };

    vec![identity, registration, contact, tva]
}

fn accent_color(entreprise: &Entreprise) -> RgbColor {
    entreprise
        .couleur_pdf
        .as_deref()
        .and_then(RgbColor::from_hex)
        .unwrap_or(DEFAULT_ACCENT)
}

/// Page plan for a quote: which rows and blocks land on which page.
pub fn plan_for(quote: &ComputedQuote) -> Vec<PageLayout> {
    let heights = SectionHeights {
        summary: summary_height(&totals_lines(quote)),
        conditions: CONDITIONS_HEIGHT,
    };
    plan_pages(quote.lignes.len(), heights)
}

/// Generator for quote PDFs. Stateless; one instance can serve every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct DevisPdfGenerator;

impl DevisPdfGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, quote: &ComputedQuote) -> Result<GeneratedDocument, RenderError> {
        Generator::generate(self, quote)
    }
}

impl<'a> Generator<&'a ComputedQuote> for DevisPdfGenerator {
    fn generate(&self, quote: &'a ComputedQuote) -> Result<GeneratedDocument, RenderError> {
        let accent = accent_color(&quote.entreprise);
        let totals = totals_lines(quote);
        let pages = plan_for(quote);
        log::debug!(
            "Rendering quote {} with {} rows over {} page(s)",
            quote.numero_devis,
            quote.lignes.len(),
            pages.len()
        );

        let mut canvas = PdfCanvas::new(&format!("Devis {}", quote.numero_devis))?;
        for page in &pages {
            if !page.is_first() {
                canvas.add_page();
            }
            let page_view = PageView {
                canvas: &canvas,
                quote,
                accent,
            };
            page_view.draw(page, pages.len(), &totals);
        }

        let page_count = canvas.page_count();
        let pdf = canvas.finish()?;

        Ok(GeneratedDocument {
            filename: pdf_filename(&quote.numero_devis),
            pdf,
            page_count,
        })
    }
}

struct PageView<'a> {
    canvas: &'a PdfCanvas,
    quote: &'a ComputedQuote,
    accent: RgbColor,
}

impl PageView<'_> {
    fn draw(&self, page: &PageLayout, page_total: usize, totals: &[TotalsLine]) {
        self.header();
        if page.is_first() {
            self.parties();
        }
        if let Some(top) = page.table_top {
            self.table(top, page.rows.clone());
        }
        if let Some(top) = page.summary_top {
            self.totals(top, totals);
            self.signature(top);
        }
        if let Some(top) = page.conditions_top {
            self.conditions(top);
        }
        self.footer(page.index + 1, page_total);
    }

    fn header(&self) {
        let c = self.canvas;
        let entreprise = &self.quote.entreprise;
        let right = PAGE_WIDTH - 20.0;

        c.fill_rect(
            0.0,
            PAGE_HEIGHT - HEADER_BAND_HEIGHT,
            PAGE_WIDTH,
            HEADER_BAND_HEIGHT,
            self.accent,
        );
        c.text(
            &truncate(&entreprise.nom.to_uppercase(), 30),
            MARGIN,
            PAGE_HEIGHT - 18.0,
            18.0,
            FontStyle::Bold,
            RgbColor::WHITE,
            Align::Left,
        );
        if !entreprise.gerant.trim().is_empty() {
            c.text(
                &format!("Gérant : {}", entreprise.gerant.trim()),
                MARGIN,
                PAGE_HEIGHT - 26.0,
                9.0,
                FontStyle::Regular,
                RgbColor::WHITE,
                Align::Left,
            );
        }

        c.text("DEVIS", right, PAGE_HEIGHT - 18.0, 28.0, FontStyle::Bold, RgbColor::WHITE, Align::Right);
        c.text(
            &format!("N° {}", self.quote.numero_devis),
            right,
            PAGE_HEIGHT - 28.0,
            11.0,
            FontStyle::Regular,
            RgbColor::WHITE,
            Align::Right,
        );
        c.text(
            &format!("Date : {}", format_date(self.quote.date_emission)),
            right,
            PAGE_HEIGHT - 36.0,
            9.0,
            FontStyle::Regular,
            RgbColor::WHITE,
            Align::Right,
        );
    }

    fn parties(&self) {
        let c = self.canvas;
        let box_bottom = PARTIES_TOP + 6.0 - PARTIES_BOX_HEIGHT;

        c.fill_rect(MARGIN, box_bottom, 85.0, PARTIES_BOX_HEIGHT, LIGHT);
        c.fill_rect(110.0, box_bottom, 85.0, PARTIES_BOX_HEIGHT, LIGHT);
        self.party_block("ÉMETTEUR", &issuer_lines(&self.quote.entreprise), 20.0);
        self.party_block("DESTINATAIRE", &client_lines(&self.quote.client), 115.0);

        c.text(
            &format!("Validité : {}", format_date(self.quote.date_validite)),
            PAGE_WIDTH - 20.0,
            box_bottom - 5.0,
            9.0,
            FontStyle::Regular,
            MUTED,
            Align::Right,
        );
    }

    fn party_block(&self, title: &str, lines: &[String], x: f32) {
        let c = self.canvas;
        c.text(title, x, PARTIES_TOP, 10.0, FontStyle::Bold, self.accent, Align::Left);

        let mut y = PARTIES_TOP - 5.0;
        for line in lines {
            c.text(line, x, y, 9.0, FontStyle::Regular, DARK, Align::Left);
            y -= 5.0;
        }
    }

    fn table(&self, table_top: f32, rows: Range<usize>) {
        let c = self.canvas;
        let width = PAGE_WIDTH - 2.0 * MARGIN;
        let header_y = table_top - 6.5;

        c.fill_rect(MARGIN, table_top - TABLE_HEADER_HEIGHT, width, TABLE_HEADER_HEIGHT, self.accent);
        let heading = |text: &str, x: f32, align: Align| {
            c.text(text, x, header_y, 9.0, FontStyle::Bold, RgbColor::WHITE, align);
        };
        heading("Description", COL_DESCRIPTION, Align::Left);
        heading("Qté", COL_QUANTITE, Align::Left);
        heading("Unité", COL_UNITE, Align::Left);
        heading("P.U. HT", COL_PRIX_RIGHT, Align::Right);
        heading("Total HT", COL_TOTAL_RIGHT, Align::Right);

        let row_count = rows.len();
        for (position, index) in rows.enumerate() {
            let ligne = &self.quote.lignes[index];
            let bottom = row_bottom(table_top, position);
            if index % 2 == 0 {
                c.fill_rect(MARGIN, bottom, width, ROW_HEIGHT, ROW_SHADE);
            }

            let y = bottom + 2.8;
            let cell = |text: &str, x: f32, align: Align| {
                c.text(text, x, y, 9.0, FontStyle::Regular, DARK, align);
            };
            cell(
                &truncate(&ligne.prestation.description, DESCRIPTION_MAX_CHARS),
                COL_DESCRIPTION,
                Align::Left,
            );
            cell(&ligne.prestation.quantite.to_string(), COL_QUANTITE, Align::Left);
            cell(&truncate(&ligne.prestation.unite, 10), COL_UNITE, Align::Left);
            cell(&format_amount(&ligne.prix_unitaire), COL_PRIX_RIGHT, Align::Right);
            cell(&format_amount(&ligne.total_ht), COL_TOTAL_RIGHT, Align::Right);
        }

        let end = table_top - TABLE_HEADER_HEIGHT - row_count as f32 * ROW_HEIGHT;
        c.rule(MARGIN, PAGE_WIDTH - MARGIN, end - 1.5, 0.35, LIGHT);
    }

    fn totals(&self, top: f32, lines: &[TotalsLine]) {
        let c = self.canvas;
        let mut y = top - 5.0;

        for line in lines {
            match line.kind {
                TotalsLineKind::Amount => {
                    c.text(&line.label, TOTALS_LABEL_X, y, 10.0, FontStyle::Regular, DARK, Align::Left);
                    c.text(&line.value, COL_TOTAL_RIGHT, y, 10.0, FontStyle::Regular, DARK, Align::Right);
                    y -= TOTALS_LINE_HEIGHT;
                }
                TotalsLineKind::Deduction => {
                    c.text(&line.label, TOTALS_LABEL_X, y, 10.0, FontStyle::Regular, DARK, Align::Left);
                    c.text(&line.value, COL_TOTAL_RIGHT, y, 10.0, FontStyle::Regular, DEDUCTION, Align::Right);
                    y -= TOTALS_LINE_HEIGHT;
                }
                TotalsLineKind::Note => {
                    c.text(&line.label, TOTALS_LABEL_X, y, 8.0, FontStyle::Oblique, DARK, Align::Left);
                    y -= TOTALS_LINE_HEIGHT;
                }
                TotalsLineKind::Grand => {
                    c.fill_rect(TOTALS_LABEL_X - 5.0, y - 6.0, 75.0, TTC_BOX_HEIGHT, self.accent);
                    c.text(&line.label, TOTALS_LABEL_X, y - 2.5, 11.0, FontStyle::Bold, RgbColor::WHITE, Align::Left);
                    c.text(&line.value, COL_TOTAL_RIGHT, y - 2.5, 11.0, FontStyle::Bold, RgbColor::WHITE, Align::Right);
                    y -= TTC_BOX_HEIGHT;
                }
            }
        }
    }

    fn signature(&self, top: f32) {
        let c = self.canvas;
        c.fill_rect(MARGIN, top - SIGNATURE_HEIGHT, 80.0, SIGNATURE_HEIGHT, LIGHT);
        c.text("Bon pour accord", 20.0, top - 6.0, 9.0, FontStyle::Bold, MUTED, Align::Left);
        c.text("Date :", 20.0, top - 15.0, 8.0, FontStyle::Regular, MUTED, Align::Left);
        c.text("Signature :", 20.0, top - 25.0, 8.0, FontStyle::Regular, MUTED, Align::Left);
        c.text(
            "(Précédée de \"Bon pour accord\")",
            20.0,
            top - 36.0,
            7.0,
            FontStyle::Oblique,
            MUTED,
            Align::Left,
        );
    }

    fn conditions(&self, top: f32) {
        let c = self.canvas;
        c.fill_rect(MARGIN, top - CONDITIONS_HEIGHT, PAGE_WIDTH - 2.0 * MARGIN, CONDITIONS_HEIGHT, LIGHT);
        c.text("CONDITIONS", 20.0, top - 7.0, 10.0, FontStyle::Bold, self.accent, Align::Left);

        let mut y = top - 16.0;
        for line in conditions_lines(self.quote) {
            c.text(&truncate(&line, 95), 20.0, y, 9.0, FontStyle::Regular, DARK, Align::Left);
            y -= 7.0;
        }
    }

    fn footer(&self, page_number: usize, page_total: usize) {
        let c = self.canvas;
        c.rule(MARGIN, PAGE_WIDTH - MARGIN, 35.0, 0.7, self.accent);

        let mut y = 28.0;
        for line in footer_lines(self.quote) {
            let style = if line == TVA_EXEMPTION_NOTICE {
                FontStyle::Oblique
            } else {
                FontStyle::Regular
            };
            c.text(&line, PAGE_WIDTH / 2.0, y, 7.0, style, MUTED, Align::Center);
            y -= 5.0;
        }

        c.text(
            &format!("Page {} / {}", page_number, page_total),
            PAGE_WIDTH - MARGIN,
            8.0,
            6.0,
            FontStyle::Oblique,
            self.accent,
            Align::Right,
        );
    }
}
