// ============================================================================
// IMPORT DU CLASSEUR VMS_GESTION.xlsx
// ============================================================================
//
// Feuilles lues (la ligne 1 est l'en-tête):
//   - COMPTES  : code | nom | type (client par défaut) | solde initial
//   - JOURNAL  : date | code compte | reception/livraison | (libre) | quantité | prix unitaire
//   - CHARGES  : date | code compte | description | montant
//
// Une feuille absente produit un avertissement, une ligne invalide une erreur
// dans le rapport ; les lignes valides sont écrites dans UNE transaction.
// Les comptes sont mis à jour par code_compte s'ils existent déjà.
//
// ============================================================================

use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::*;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Cursor;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::accounts::{self, TypeCompte};
use crate::models::charges;
use crate::models::operations::{self, TypeOperation};
use crate::services::operation_service;
use crate::utils::format::parse_excel_date;

const ACCOUNT_SHEETS: [&str; 3] = ["COMPTES", "Comptes", "ACCOUNTS"];
const JOURNAL_SHEETS: [&str; 3] = ["JOURNAL", "Journal", "OPERATIONS"];
const CHARGE_SHEETS: [&str; 2] = ["CHARGES", "Charges"];
const DEFAULT_CHARGE_DESCRIPTION: &str = "Charge importée";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Success,
    Partial,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportSummary {
    pub accounts_imported: usize,
    pub accounts_updated: usize,
    pub accounts_errors: usize,
    pub operations_imported: usize,
    pub operations_errors: usize,
    pub charges_imported: usize,
    pub charges_errors: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub timestamp: NaiveDateTime,
    pub file: String,
    pub status: ImportStatus,
    pub summary: ImportSummary,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ImportReport {
    fn new(file: String) -> Self {
        Self {
            timestamp: Utc::now().naive_utc(),
            file,
            status: ImportStatus::Success,
            summary: ImportSummary::default(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Rien d'écrit et des erreurs => error ; des erreurs => partial
    fn finish(mut self) -> Self {
        let s = &self.summary;
        let written = s.accounts_imported + s.accounts_updated + s.operations_imported + s.charges_imported;
        self.status = match (self.errors.is_empty(), written) {
            (true, _) => ImportStatus::Success,
            (false, 0) => ImportStatus::Error,
            (false, _) => ImportStatus::Partial,
        };
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportedAccount {
    pub code_compte: String,
    pub nom_compte: String,
    pub type_compte: TypeCompte,
    pub solde_initial: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportedOperation {
    pub date_operation: NaiveDate,
    pub code_compte: String,
    pub type_operation: TypeOperation,
    pub quantite: i32,
    pub prix_unitaire: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportedCharge {
    pub date_charge: NaiveDate,
    pub code_compte: String,
    pub description: String,
    pub montant: Decimal,
}

/// Lignes valides d'une feuille, avec leur numéro (1 = en-tête)
type Rows<T> = Vec<(usize, T)>;

// ============================================================================
// Lecture des cellules
// ============================================================================

fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(s)) | Some(Data::DateTimeIso(s)) => s.trim().to_string(),
        // codes comptes saisis comme nombres : 411001.0 -> "411001"
        Some(Data::Float(f)) if f.fract() == 0.0 => format!("{}", *f as i64),
        Some(other) => other.to_string().trim().to_string(),
    }
}

/// Cellule vide => None ; accepte "1 250,50" comme 1250.50
fn cell_decimal(cell: Option<&Data>) -> Result<Option<Decimal>, String> {
    match cell {
        None | Some(Data::Empty) => Ok(None),
        Some(Data::Int(i)) => Ok(Some(Decimal::from(*i))),
        Some(Data::Float(f)) => Decimal::from_f64_retain(*f)
            .map(|d| Some(d.round_dp(2)))
            .ok_or_else(|| format!("nombre invalide : {}", f)),
        Some(cell) => {
            let raw: String = cell_text(Some(cell))
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| if c == ',' { '.' } else { c })
                .collect();
            if raw.is_empty() {
                return Ok(None);
            }
            Decimal::from_str(&raw)
                .map(Some)
                .map_err(|_| format!("nombre invalide : {}", raw))
        }
    }
}

/// Date série Excel, ISO (AAAA-MM-JJ[Thh:mm:ss]) ou JJ/MM/AAAA
fn cell_date(cell: Option<&Data>) -> Result<NaiveDate, String> {
    let parsed = match cell {
        Some(Data::DateTime(dt)) => parse_excel_date(dt.as_f64()),
        Some(Data::Float(f)) => parse_excel_date(*f),
        Some(Data::Int(i)) => parse_excel_date(*i as f64),
        other => {
            let raw = cell_text(other);
            let day = raw.get(..10).unwrap_or(&raw);
            NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .or_else(|_| NaiveDate::parse_from_str(&raw, "%d/%m/%Y"))
                .ok()
        }
    };
    parsed.ok_or_else(|| format!("date invalide : {}", cell_text(cell)))
}

fn required_text(row: &[Data], col: usize, label: &str) -> Result<String, String> {
    let value = cell_text(row.get(col));
    if value.is_empty() {
        return Err(format!("{} vide", label));
    }
    Ok(value)
}

// ============================================================================
// Lignes -> modèles
// ============================================================================

pub fn parse_account_row(row: &[Data]) -> Result<ImportedAccount, String> {
    let code_compte = required_text(row, 0, "code compte")?;
    let nom_compte = required_text(row, 1, "nom compte")?;

    let raw_type = cell_text(row.get(2)).to_lowercase();
    let type_compte = match raw_type.as_str() {
        "" | "client" => TypeCompte::Client,
        "fournisseur" => TypeCompte::Fournisseur,
        "interne" => TypeCompte::Interne,
        other => {
            return Err(format!(
                "type_compte invalide : {} (client, fournisseur ou interne)",
                other
            ))
        }
    };

    let solde_initial = cell_decimal(row.get(3))
        .map_err(|e| format!("solde_initial {}", e))?
        .unwrap_or(Decimal::ZERO);

    Ok(ImportedAccount { code_compte, nom_compte, type_compte, solde_initial })
}

pub fn parse_operation_row(row: &[Data]) -> Result<ImportedOperation, String> {
    let date_operation = cell_date(row.get(0))?;
    let code_compte = required_text(row, 1, "code compte")?;

    let type_operation = match cell_text(row.get(2)).to_lowercase().as_str() {
        "reception" | "réception" => TypeOperation::Reception,
        "livraison" => TypeOperation::Livraison,
        other => return Err(format!("type d'opération invalide : {}", other)),
    };

    // colonne 4 (désignation) ignorée
    let quantite = cell_decimal(row.get(4))
        .map_err(|e| format!("quantite {}", e))?
        .unwrap_or(Decimal::ZERO);
    let quantite = match quantite.to_i32() {
        Some(q) if q > 0 && Decimal::from(q) == quantite => q,
        _ => return Err(format!("quantite invalide : {}", quantite)),
    };

    let prix_unitaire = cell_decimal(row.get(5))
        .map_err(|e| format!("prix_unitaire {}", e))?
        .unwrap_or(Decimal::ZERO);
    if prix_unitaire < Decimal::ZERO {
        return Err(format!("prix_unitaire invalide : {}", prix_unitaire));
    }

    Ok(ImportedOperation { date_operation, code_compte, type_operation, quantite, prix_unitaire })
}

pub fn parse_charge_row(row: &[Data]) -> Result<ImportedCharge, String> {
    let date_charge = cell_date(row.get(0))?;
    let code_compte = required_text(row, 1, "code compte")?;

    let description = cell_text(row.get(2));
    let description = if description.is_empty() {
        DEFAULT_CHARGE_DESCRIPTION.to_string()
    } else {
        description
    };

    let montant = cell_decimal(row.get(3))
        .map_err(|e| format!("montant {}", e))?
        .unwrap_or(Decimal::ZERO);
    if montant <= Decimal::ZERO {
        return Err(format!("montant invalide : {}", montant));
    }

    Ok(ImportedCharge { date_charge, code_compte, description, montant })
}

/// Parcourt une feuille (en-tête et lignes vides ignorés) ; renvoie les lignes
/// valides et les erreurs "<feuille> - Ligne N : ..."
pub fn parse_rows<T>(
    range: &Range<Data>,
    sheet: &str,
    parse: impl Fn(&[Data]) -> Result<T, String>,
) -> (Rows<T>, Vec<String>) {
    let mut rows = Vec::new();
    let mut errors = Vec::new();
    let first_row = range.start().map_or(0, |(row, _)| row as usize);

    for (index, row) in range.rows().enumerate().skip(1) {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        let line = first_row + index + 1;
        match parse(row) {
            Ok(value) => rows.push((line, value)),
            Err(e) => errors.push(format!("{} - Ligne {} : {}", sheet, line, e)),
        }
    }

    (rows, errors)
}

pub fn find_sheet(names: &[String], candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .find_map(|candidate| names.iter().find(|name| name.trim() == *candidate))
        .cloned()
}

/// Contenu valide du classeur + rapport partiel (erreurs de lignes, feuilles manquantes)
#[derive(Debug)]
pub struct ParsedWorkbook {
    pub accounts: Rows<ImportedAccount>,
    pub operations: Rows<ImportedOperation>,
    pub charges: Rows<ImportedCharge>,
    pub report: ImportReport,
}

fn read_sheet<T>(
    workbook: &mut Xlsx<Cursor<Vec<u8>>>,
    candidates: &[&str],
    sheet: &str,
    report: &mut ImportReport,
    parse: impl Fn(&[Data]) -> Result<T, String>,
) -> (Rows<T>, usize) {
    let Some(name) = find_sheet(&workbook.sheet_names(), candidates) else {
        report.warnings.push(format!("Feuille {} absente : import ignoré", sheet));
        return (Vec::new(), 0);
    };

    match workbook.worksheet_range(&name) {
        Ok(range) => {
            let (rows, errors) = parse_rows(&range, sheet, parse);
            let count = errors.len();
            report.errors.extend(errors);
            (rows, count)
        }
        Err(e) => {
            report.errors.push(format!("{} - feuille illisible : {}", sheet, e));
            (Vec::new(), 0)
        }
    }
}

pub fn parse_workbook(bytes: Vec<u8>, file: String) -> AppResult<ParsedWorkbook> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| AppError::validation(format!("Classeur Excel illisible : {}", e)))?;

    let mut report = ImportReport::new(file);

    let (accounts, errors) = read_sheet(&mut workbook, &ACCOUNT_SHEETS, "COMPTES", &mut report, parse_account_row);
    report.summary.accounts_errors = errors;
    let (operations, errors) = read_sheet(&mut workbook, &JOURNAL_SHEETS, "JOURNAL", &mut report, parse_operation_row);
    report.summary.operations_errors = errors;
    let (charges, errors) = read_sheet(&mut workbook, &CHARGE_SHEETS, "CHARGES", &mut report, parse_charge_row);
    report.summary.charges_errors = errors;

    Ok(ParsedWorkbook { accounts, operations, charges, report })
}

// ============================================================================
// Écriture en base
// ============================================================================

fn new_operation(op: &ImportedOperation, account_id: Uuid) -> operations::ActiveModel {
    operations::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(Utc::now().naive_utc()),
        date_operation: Set(op.date_operation),
        type_operation: Set(op.type_operation),
        account_id: Set(account_id),
        montant: Set(operation_service::montant(op.quantite, op.prix_unitaire)),
        quantite: Set(op.quantite),
        marque: Set(None),
        modele: Set(None),
        numero_chassis: Set(None),
        prix_achat: Set(None),
        prix_vente: Set(None),
        prix_unitaire: Set(Some(op.prix_unitaire)),
        commission: Set(None),
    }
}

fn new_charge(charge: &ImportedCharge, account_id: Uuid) -> charges::ActiveModel {
    let now = Utc::now().naive_utc();
    charges::ActiveModel {
        id: Set(Uuid::new_v4()),
        account_id: Set(account_id),
        date_charge: Set(charge.date_charge),
        description: Set(charge.description.clone()),
        montant: Set(charge.montant.abs()),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

pub struct ImportService;

impl ImportService {
    pub async fn import_workbook(db: &DatabaseConnection, bytes: Vec<u8>, file: String) -> AppResult<ImportReport> {
        let ParsedWorkbook { accounts, operations, charges, mut report } = parse_workbook(bytes, file)?;

        let txn = db.begin().await?;

        let mut codes: HashMap<String, Uuid> = accounts::Entity::find()
            .all(&txn)
            .await?
            .into_iter()
            .map(|a| (a.code_compte, a.id))
            .collect();

        let now = Utc::now().naive_utc();
        for (_, account) in &accounts {
            match codes.get(&account.code_compte) {
                Some(id) => {
                    accounts::ActiveModel {
                        id: Unchanged(*id),
                        nom_compte: Set(account.nom_compte.clone()),
                        type_compte: Set(account.type_compte),
                        solde_initial: Set(account.solde_initial),
                        actif: Set(true),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .update(&txn)
                    .await?;
                    report.summary.accounts_updated += 1;
                }
                None => {
                    let id = Uuid::new_v4();
                    accounts::ActiveModel {
                        id: Set(id),
                        code_compte: Set(account.code_compte.clone()),
                        nom_compte: Set(account.nom_compte.clone()),
                        type_compte: Set(account.type_compte),
                        solde_initial: Set(account.solde_initial),
                        actif: Set(true),
                        address: Set(None),
                        n_carte_identite: Set(None),
                        nif: Set(None),
                        nis: Set(None),
                        rc: Set(None),
                        ai: Set(None),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(&txn)
                    .await?;
                    codes.insert(account.code_compte.clone(), id);
                    report.summary.accounts_imported += 1;
                }
            }
        }

        for (line, op) in &operations {
            match codes.get(&op.code_compte) {
                Some(account_id) => {
                    new_operation(op, *account_id).insert(&txn).await?;
                    report.summary.operations_imported += 1;
                }
                None => {
                    report.errors.push(unknown_account("JOURNAL", *line, &op.code_compte));
                    report.summary.operations_errors += 1;
                }
            }
        }

        for (line, charge) in &charges {
            match codes.get(&charge.code_compte) {
                Some(account_id) => {
                    new_charge(charge, *account_id).insert(&txn).await?;
                    report.summary.charges_imported += 1;
                }
                None => {
                    report.errors.push(unknown_account("CHARGES", *line, &charge.code_compte));
                    report.summary.charges_errors += 1;
                }
            }
        }

        txn.commit().await?;

        let report = report.finish();
        tracing::info!(
            file = %report.file,
            status = ?report.status,
            accounts = report.summary.accounts_imported + report.summary.accounts_updated,
            operations = report.summary.operations_imported,
            charges = report.summary.charges_imported,
            errors = report.errors.len(),
            "workbook imported"
        );
        Ok(report)
    }
}

fn unknown_account(sheet: &str, line: usize, code: &str) -> String {
    format!("{} - Ligne {} : compte introuvable pour le code {}", sheet, line, code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    #[test]
    fn test_parse_account_row() {
        let row = vec![Data::Float(411001.0), text(" Garage Atlas "), text("Fournisseur"), Data::Float(-1500.5)];
        let account = parse_account_row(&row).unwrap();

        assert_eq!(account.code_compte, "411001");
        assert_eq!(account.nom_compte, "Garage Atlas");
        assert_eq!(account.type_compte, TypeCompte::Fournisseur);
        assert_eq!(account.solde_initial, Decimal::new(-150050, 2));

        // type et solde absents : client, 0
        let account = parse_account_row(&[text("C01"), text("Client A")]).unwrap();
        assert_eq!(account.type_compte, TypeCompte::Client);
        assert_eq!(account.solde_initial, Decimal::ZERO);
    }

    #[test]
    fn test_parse_account_row_errors() {
        assert!(parse_account_row(&[Data::Empty, text("Nom")]).unwrap_err().contains("code compte"));
        assert!(parse_account_row(&[text("C01"), Data::Empty]).unwrap_err().contains("nom compte"));
        assert!(parse_account_row(&[text("C01"), text("Nom"), text("banque")])
            .unwrap_err()
            .contains("type_compte invalide"));
        assert!(parse_account_row(&[text("C01"), text("Nom"), text("client"), text("abc")]).is_err());
    }

    #[test]
    fn test_parse_operation_row() {
        let row = vec![
            Data::Float(45658.0),
            text("F01"),
            text("Reception"),
            text("Hyundai Tucson"),
            Data::Int(2),
            text("3 250 000,00"),
        ];
        let op = parse_operation_row(&row).unwrap();

        assert_eq!(op.date_operation, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(op.type_operation, TypeOperation::Reception);
        assert_eq!(op.quantite, 2);
        assert_eq!(op.prix_unitaire, Decimal::from(3_250_000));
        assert_eq!(operation_service::montant(op.quantite, op.prix_unitaire), Decimal::from(6_500_000));

        let row = vec![text("15/03/2025"), text("C01"), text("livraison"), Data::Empty, Data::Float(1.0)];
        let op = parse_operation_row(&row).unwrap();
        assert_eq!(op.date_operation, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
        assert_eq!(op.type_operation, TypeOperation::Livraison);
        assert_eq!(op.prix_unitaire, Decimal::ZERO);
    }

    #[test]
    fn test_parse_operation_row_errors() {
        let base = |date: Data, kind: &str, qte: Data, prix: Data| {
            vec![date, text("F01"), text(kind), Data::Empty, qte, prix]
        };

        let err = parse_operation_row(&base(text("hier"), "reception", Data::Int(1), Data::Int(10))).unwrap_err();
        assert!(err.contains("date invalide"));
        let err = parse_operation_row(&base(text("2025-01-01"), "vente", Data::Int(1), Data::Int(10))).unwrap_err();
        assert!(err.contains("type d'opération invalide"));
        let err = parse_operation_row(&base(text("2025-01-01"), "reception", Data::Int(0), Data::Int(10))).unwrap_err();
        assert!(err.contains("quantite invalide"));
        let err = parse_operation_row(&base(text("2025-01-01"), "reception", Data::Float(1.5), Data::Int(10))).unwrap_err();
        assert!(err.contains("quantite invalide"));
        let err = parse_operation_row(&base(text("2025-01-01"), "reception", Data::Int(1), Data::Int(-5))).unwrap_err();
        assert!(err.contains("prix_unitaire invalide"));
    }

    #[test]
    fn test_parse_charge_row() {
        let charge = parse_charge_row(&[text("2025-02-10T00:00:00"), text("I01"), Data::Empty, Data::Int(12000)]).unwrap();

        assert_eq!(charge.date_charge, NaiveDate::from_ymd_opt(2025, 2, 10).unwrap());
        assert_eq!(charge.description, DEFAULT_CHARGE_DESCRIPTION);
        assert_eq!(charge.montant, Decimal::from(12000));

        assert!(parse_charge_row(&[text("2025-02-10"), text("I01"), text("Loyer"), Data::Int(0)])
            .unwrap_err()
            .contains("montant invalide"));
    }

    #[test]
    fn test_parse_rows_skips_header_and_blank_lines() {
        let mut range: Range<Data> = Range::new((0, 0), (4, 3));
        range.set_value((0, 0), text("code"));
        range.set_value((0, 1), text("nom"));
        range.set_value((1, 0), text("C01"));
        range.set_value((1, 1), text("Client A"));
        // ligne 3 vide
        range.set_value((3, 0), text("C02"));
        range.set_value((4, 0), text("C03"));
        range.set_value((4, 1), text("Client C"));

        let (rows, errors) = parse_rows(&range, "COMPTES", parse_account_row);

        assert_eq!(rows.iter().map(|(line, _)| *line).collect::<Vec<_>>(), vec![2, 5]);
        assert_eq!(errors, vec!["COMPTES - Ligne 4 : nom compte vide".to_string()]);
    }

    #[test]
    fn test_find_sheet() {
        let names = vec!["Journal".to_string(), "COMPTES".to_string()];

        assert_eq!(find_sheet(&names, &ACCOUNT_SHEETS), Some("COMPTES".to_string()));
        assert_eq!(find_sheet(&names, &JOURNAL_SHEETS), Some("Journal".to_string()));
        assert_eq!(find_sheet(&names, &CHARGE_SHEETS), None);
    }

    #[test]
    fn test_report_status() {
        let report = ImportReport::new("a.xlsx".to_string()).finish();
        assert_eq!(report.status, ImportStatus::Success);

        let mut report = ImportReport::new("a.xlsx".to_string());
        report.errors.push("COMPTES - Ligne 2 : nom compte vide".to_string());
        assert_eq!(report.clone().finish().status, ImportStatus::Error);

        report.summary.charges_imported = 1;
        assert_eq!(report.finish().status, ImportStatus::Partial);
    }

    #[test]
    fn test_unreadable_workbook_is_rejected() {
        let result = parse_workbook(b"pas un classeur".to_vec(), "x.xlsx".to_string());
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
