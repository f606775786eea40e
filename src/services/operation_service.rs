use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::*;
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::accounts::{self, TypeCompte};
use crate::models::dto::{LivraisonRequest, ReceptionRequest, ReceptionUpdateRequest};
use crate::models::operations::{self, TypeOperation};
use crate::services::stock;

pub struct OperationService;

/// montant = quantite * prix_unitaire
pub fn montant(quantite: i32, prix_unitaire: Decimal) -> Decimal {
    Decimal::from(quantite) * prix_unitaire
}

/// Vérifie les châssis d'une nouvelle réception :
/// non vides, uniques dans le lot, et jamais réceptionnés auparavant
pub fn validate_new_vins(vins: &[String], existing: &[operations::Model]) -> AppResult<Vec<String>> {
    let mut seen = HashSet::new();
    let mut cleaned = Vec::with_capacity(vins.len());

    for (index, raw) in vins.iter().enumerate() {
        let vin = raw.trim();
        if vin.is_empty() {
            return Err(AppError::validation(format!(
                "Le numéro de châssis n°{} est vide",
                index + 1
            )));
        }
        if !seen.insert(vin.to_string()) {
            return Err(AppError::validation(format!("Numéro de châssis en double : {}", vin)));
        }
        if stock::is_received(existing, vin, None) {
            return Err(already_received(vin));
        }
        cleaned.push(vin.to_string());
    }

    Ok(cleaned)
}

fn already_received(vin: &str) -> AppError {
    AppError::conflict(format!("Le véhicule {} a déjà été réceptionné", vin))
}

/// Une réception dont le véhicule a été livré est figée (ni suppression, ni changement de châssis)
pub fn reception_locked(reception: &operations::Model, all: &[operations::Model]) -> bool {
    reception
        .chassis()
        .is_some_and(|vin| stock::sold_vins(all).contains(vin))
}

/// Changement de châssis d'une réception existante
pub fn validate_vin_change(current: &operations::Model, new_vin: &str, all: &[operations::Model]) -> AppResult<()> {
    if new_vin.is_empty() {
        return Err(AppError::validation("Le numéro de châssis est obligatoire"));
    }
    if current.chassis() == Some(new_vin) {
        return Ok(());
    }
    if reception_locked(current, all) {
        return Err(AppError::conflict(
            "Ce véhicule a déjà été livré : son numéro de châssis ne peut plus être modifié",
        ));
    }
    if stock::is_received(all, new_vin, Some(current.id)) {
        return Err(already_received(new_vin));
    }
    Ok(())
}

/// Véhicule vendable : en stock, ou déjà celui de la livraison modifiée
pub fn livraison_vehicle_allowed(
    current: Option<&operations::Model>,
    reception: &operations::Model,
    all: &[operations::Model],
) -> bool {
    let same_vehicle = current.is_some_and(|c| reception.chassis().is_some() && reception.chassis() == c.chassis());
    same_vehicle || stock::available_stock(all).iter().any(|r| r.id == reception.id)
}

/// 0 < prix total, 0 <= commission <= prix total
pub fn validate_reception_prices(prix_total_achat: Decimal, commission: Decimal) -> AppResult<()> {
    ensure_positive(prix_total_achat, "Le prix d'achat")?;
    if commission < Decimal::ZERO || commission > prix_total_achat {
        return Err(AppError::validation("La commission doit être comprise entre 0 et le prix d'achat"));
    }
    Ok(())
}

/// Prix d'une livraison : ceux saisis, sinon ceux de la réception
pub fn livraison_prices(
    reception: &operations::Model,
    request: &LivraisonRequest,
) -> (Decimal, Option<Decimal>, Option<Decimal>) {
    let prix_unitaire = request.prix_unitaire.unwrap_or(reception.montant);
    let prix_achat = request.prix_achat.or(reception.prix_achat);
    let commission = request.commission.or(reception.commission);
    (prix_unitaire, prix_achat, commission)
}

fn ensure_positive(amount: Decimal, label: &str) -> AppResult<()> {
    if amount <= Decimal::ZERO {
        return Err(AppError::validation(format!("{} doit être supérieur à 0", label)));
    }
    Ok(())
}

impl OperationService {
    pub async fn list(db: &DatabaseConnection, kind: TypeOperation) -> Result<Vec<operations::Model>, DbErr> {
        operations::Entity::find()
            .filter(operations::Column::TypeOperation.eq(kind))
            .order_by_desc(operations::Column::DateOperation)
            .order_by_desc(operations::Column::CreatedAt)
            .all(db)
            .await
    }

    pub async fn all(db: &DatabaseConnection) -> Result<Vec<operations::Model>, DbErr> {
        operations::Entity::find()
            .order_by_desc(operations::Column::DateOperation)
            .all(db)
            .await
    }

    /// Crée une réception par numéro de châssis, dans une seule transaction
    pub async fn create_receptions(
        db: &DatabaseConnection,
        request: ReceptionRequest,
    ) -> AppResult<Vec<operations::Model>> {
        validate_reception_prices(request.prix_total_achat, request.commission)?;
        Self::require_account(db, request.account_id, Some(TypeCompte::Fournisseur)).await?;

        let existing = Self::all(db).await?;
        let vins = validate_new_vins(&request.vins, &existing)?;
        let prix_base = stock::base_price(request.prix_total_achat, request.commission);
        let now = Utc::now().naive_utc();

        let txn = db.begin().await?;
        let mut created = Vec::with_capacity(vins.len());

        for vin in vins {
            let reception = operations::ActiveModel {
                id: Set(Uuid::new_v4()),
                created_at: Set(now),
                date_operation: Set(request.date_operation),
                type_operation: Set(TypeOperation::Reception),
                account_id: Set(request.account_id),
                montant: Set(montant(1, request.prix_total_achat)),
                quantite: Set(1),
                marque: Set(Some(request.marque.trim().to_string())),
                modele: Set(Some(request.modele.trim().to_string())),
                numero_chassis: Set(Some(vin)),
                prix_achat: Set(Some(prix_base)),
                prix_vente: Set(None),
                prix_unitaire: Set(Some(request.prix_total_achat)),
                commission: Set(Some(request.commission)),
            };
            created.push(reception.insert(&txn).await?);
        }

        txn.commit().await?;
        tracing::info!(count = created.len(), account_id = %request.account_id, "receptions created");
        Ok(created)
    }

    pub async fn update_reception(
        db: &DatabaseConnection,
        id: Uuid,
        request: ReceptionUpdateRequest,
    ) -> AppResult<operations::Model> {
        validate_reception_prices(request.prix_total_achat, request.commission)?;
        let current = Self::find_typed(db, id, TypeOperation::Reception).await?;
        Self::require_account(db, request.account_id, Some(TypeCompte::Fournisseur)).await?;

        let new_vin = request.numero_chassis.trim().to_string();
        let all = Self::all(db).await?;
        validate_vin_change(&current, &new_vin, &all)?;

        let mut active: operations::ActiveModel = current.into();
        active.account_id = Set(request.account_id);
        active.date_operation = Set(request.date_operation);
        active.marque = Set(Some(request.marque.trim().to_string()));
        active.modele = Set(Some(request.modele.trim().to_string()));
        active.numero_chassis = Set(Some(new_vin));
        active.prix_unitaire = Set(Some(request.prix_total_achat));
        active.prix_achat = Set(Some(stock::base_price(request.prix_total_achat, request.commission)));
        active.commission = Set(Some(request.commission));
        active.quantite = Set(1);
        active.montant = Set(montant(1, request.prix_total_achat));

        Ok(active.update(db).await?)
    }

    /// Vente d'un véhicule du stock
    pub async fn create_livraison(db: &DatabaseConnection, request: LivraisonRequest) -> AppResult<operations::Model> {
        let (account_id, date_operation) = Self::require_client_and_date(&request)?;
        Self::require_account(db, account_id, None).await?;

        let reception = Self::find_typed(db, request.reception_id, TypeOperation::Reception).await?;
        let all = Self::all(db).await?;
        if !livraison_vehicle_allowed(None, &reception, &all) {
            return Err(AppError::conflict("Ce véhicule n'est plus disponible en stock"));
        }

        let (prix_unitaire, prix_achat, commission) = livraison_prices(&reception, &request);
        ensure_positive(prix_unitaire, "Le prix de vente")?;

        let livraison = operations::ActiveModel {
            id: Set(Uuid::new_v4()),
            created_at: Set(Utc::now().naive_utc()),
            date_operation: Set(date_operation),
            type_operation: Set(TypeOperation::Livraison),
            account_id: Set(account_id),
            montant: Set(montant(1, prix_unitaire)),
            quantite: Set(1),
            marque: Set(reception.marque.clone()),
            modele: Set(reception.modele.clone()),
            numero_chassis: Set(reception.chassis().map(str::to_string)),
            prix_achat: Set(prix_achat),
            prix_vente: Set(Some(prix_unitaire)),
            prix_unitaire: Set(Some(prix_unitaire)),
            commission: Set(commission),
        };

        let created = livraison.insert(db).await?;
        tracing::info!(livraison_id = %created.id, vin = ?created.numero_chassis, "livraison created");
        Ok(created)
    }

    /// Le véhicule peut rester celui déjà vendu par cette livraison
    pub async fn update_livraison(
        db: &DatabaseConnection,
        id: Uuid,
        request: LivraisonRequest,
    ) -> AppResult<operations::Model> {
        let (account_id, date_operation) = Self::require_client_and_date(&request)?;
        let current = Self::find_typed(db, id, TypeOperation::Livraison).await?;
        Self::require_account(db, account_id, None).await?;

        let reception = Self::find_typed(db, request.reception_id, TypeOperation::Reception).await?;
        let all = Self::all(db).await?;
        if !livraison_vehicle_allowed(Some(&current), &reception, &all) {
            return Err(AppError::conflict("Ce véhicule n'est plus disponible en stock"));
        }

        let (prix_unitaire, prix_achat, commission) = livraison_prices(&reception, &request);
        ensure_positive(prix_unitaire, "Le prix de vente")?;

        let mut active: operations::ActiveModel = current.into();
        active.account_id = Set(account_id);
        active.date_operation = Set(date_operation);
        active.marque = Set(reception.marque.clone());
        active.modele = Set(reception.modele.clone());
        active.numero_chassis = Set(reception.chassis().map(str::to_string));
        active.prix_unitaire = Set(Some(prix_unitaire));
        active.prix_vente = Set(Some(prix_unitaire));
        active.prix_achat = Set(prix_achat);
        active.commission = Set(commission);
        active.quantite = Set(1);
        active.montant = Set(montant(1, prix_unitaire));

        Ok(active.update(db).await?)
    }

    /// Une réception déjà livrée ne peut pas être supprimée (la vente deviendrait orpheline)
    pub async fn delete_operation(db: &DatabaseConnection, id: Uuid, kind: TypeOperation) -> AppResult<()> {
        let current = Self::find_typed(db, id, kind).await?;

        if kind == TypeOperation::Reception && reception_locked(&current, &Self::all(db).await?) {
            return Err(AppError::conflict(
                "Impossible de supprimer cette réception : le véhicule a déjà été livré",
            ));
        }

        operations::Entity::delete_by_id(current.id)
            .exec(db)
            .await
            .map_err(|e| AppError::referenced(e, "Impossible de supprimer cette opération : des paiements y sont rattachés"))?;

        tracing::info!(operation_id = %id, kind = ?kind, "operation deleted");
        Ok(())
    }

    fn require_client_and_date(request: &LivraisonRequest) -> AppResult<(Uuid, chrono::NaiveDate)> {
        let account_id = request
            .account_id
            .ok_or_else(|| AppError::validation("Veuillez sélectionner un client."))?;
        let date = request
            .date_operation
            .ok_or_else(|| AppError::validation("Veuillez sélectionner une date."))?;
        Ok((account_id, date))
    }

    async fn find_typed(db: &DatabaseConnection, id: Uuid, kind: TypeOperation) -> AppResult<operations::Model> {
        let label = match kind {
            TypeOperation::Reception => "Réception introuvable",
            TypeOperation::Livraison => "Livraison introuvable",
        };

        operations::Entity::find_by_id(id)
            .one(db)
            .await?
            .filter(|op| op.type_operation == kind)
            .ok_or_else(|| AppError::not_found(label))
    }

    async fn require_account(
        db: &DatabaseConnection,
        account_id: Uuid,
        expected: Option<TypeCompte>,
    ) -> AppResult<accounts::Model> {
        let account = accounts::Entity::find_by_id(account_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Compte introuvable"))?;

        if !account.actif {
            return Err(AppError::validation("Ce compte est désactivé"));
        }
        if let Some(expected) = expected {
            if account.type_compte != expected {
                return Err(AppError::validation("Les réceptions doivent être rattachées à un compte fournisseur"));
            }
        }
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::stock::tests::operation;

    #[test]
    fn test_montant() {
        assert_eq!(montant(3, Decimal::new(150_050, 2)), Decimal::new(450_150, 2));
    }

    #[test]
    fn test_validate_new_vins() {
        let existing = vec![
            operation(TypeOperation::Reception, Some("IN-STOCK"), 100),
            operation(TypeOperation::Reception, Some("SOLD"), 100),
            operation(TypeOperation::Livraison, Some("SOLD"), 100),
        ];

        let ok = validate_new_vins(&[" NEW1 ".to_string(), "NEW2".to_string()], &existing).unwrap();
        assert_eq!(ok, vec!["NEW1".to_string(), "NEW2".to_string()]);

        // un châssis déjà vendu ne peut pas être réceptionné une seconde fois
        let err = validate_new_vins(&["SOLD".to_string()], &existing).unwrap_err();
        assert_eq!(err.to_string(), "Le véhicule SOLD a déjà été réceptionné");

        assert!(matches!(
            validate_new_vins(&["IN-STOCK".to_string()], &existing),
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            validate_new_vins(&["A".to_string(), "A ".to_string()], &existing),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_new_vins(&["".to_string()], &existing),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_re_received_vin_would_never_reach_stock() {
        let mut existing = vec![
            operation(TypeOperation::Reception, Some("VF1SOLD"), 100),
            operation(TypeOperation::Livraison, Some("VF1SOLD"), 100),
        ];
        assert!(validate_new_vins(&["VF1SOLD".to_string()], &existing).is_err());

        // même en forçant l'écriture, le véhicule serait invisible dans le stock
        existing.push(operation(TypeOperation::Reception, Some("VF1SOLD"), 100));
        assert!(stock::available_stock(&existing).is_empty());
    }

    #[test]
    fn test_reception_locked_once_delivered() {
        let sold = operation(TypeOperation::Reception, Some("VF1SOLD"), 100);
        let free = operation(TypeOperation::Reception, Some("VF1FREE"), 100);
        let no_vin = operation(TypeOperation::Reception, None, 100);
        let all = vec![
            sold.clone(),
            free.clone(),
            no_vin.clone(),
            operation(TypeOperation::Livraison, Some("VF1SOLD"), 150),
        ];

        assert!(reception_locked(&sold, &all));
        assert!(!reception_locked(&free, &all));
        assert!(!reception_locked(&no_vin, &all));
    }

    #[test]
    fn test_validate_vin_change() {
        let sold = operation(TypeOperation::Reception, Some("VF1SOLD"), 100);
        let free = operation(TypeOperation::Reception, Some("VF1FREE"), 100);
        let all = vec![
            sold.clone(),
            free.clone(),
            operation(TypeOperation::Livraison, Some("VF1SOLD"), 150),
        ];

        // même châssis : toujours permis, même livré
        assert!(validate_vin_change(&sold, "VF1SOLD", &all).is_ok());
        assert!(validate_vin_change(&free, "VF1NEW", &all).is_ok());

        let err = validate_vin_change(&sold, "VF1NEW", &all).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(err.to_string().contains("déjà été livré"));

        // renommer vers un châssis déjà réceptionné (vendu ou non)
        let err = validate_vin_change(&free, "VF1SOLD", &all).unwrap_err();
        assert_eq!(err.to_string(), "Le véhicule VF1SOLD a déjà été réceptionné");

        assert!(matches!(validate_vin_change(&free, "", &all), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_livraison_vehicle_allowed() {
        let in_stock = operation(TypeOperation::Reception, Some("VF1FREE"), 100);
        let sold_reception = operation(TypeOperation::Reception, Some("VF1SOLD"), 100);
        let sale = operation(TypeOperation::Livraison, Some("VF1SOLD"), 150);
        let other_sale = operation(TypeOperation::Livraison, Some("VF1OTHER"), 150);
        let all = vec![in_stock.clone(), sold_reception.clone(), sale.clone(), other_sale.clone()];

        assert!(livraison_vehicle_allowed(None, &in_stock, &all));
        assert!(!livraison_vehicle_allowed(None, &sold_reception, &all));

        // la livraison modifiée peut garder le véhicule qu'elle a déjà vendu
        assert!(livraison_vehicle_allowed(Some(&sale), &sold_reception, &all));
        // mais pas prendre celui vendu par une autre livraison
        assert!(!livraison_vehicle_allowed(Some(&other_sale), &sold_reception, &all));
        assert!(livraison_vehicle_allowed(Some(&other_sale), &in_stock, &all));
    }

    #[test]
    fn test_validate_reception_prices() {
        assert!(validate_reception_prices(Decimal::from(1_000), Decimal::from(100)).is_ok());
        assert!(validate_reception_prices(Decimal::from(1_000), Decimal::ZERO).is_ok());
        assert!(validate_reception_prices(Decimal::from(1_000), Decimal::from(1_000)).is_ok());
        assert!(validate_reception_prices(Decimal::from(1_000), Decimal::from(-1)).is_err());
        assert!(validate_reception_prices(Decimal::from(1_000), Decimal::from(1_001)).is_err());
        assert!(validate_reception_prices(Decimal::ZERO, Decimal::ZERO).is_err());
    }

    #[test]
    fn test_livraison_prices_default_to_reception() {
        let mut reception = operation(TypeOperation::Reception, Some("VIN1"), 2_500_000);
        reception.prix_achat = Some(Decimal::from(2_400_000));
        reception.commission = Some(Decimal::from(100_000));

        let request = LivraisonRequest {
            account_id: None,
            date_operation: None,
            reception_id: reception.id,
            prix_unitaire: None,
            prix_achat: None,
            commission: None,
        };
        let (prix, achat, commission) = livraison_prices(&reception, &request);
        assert_eq!(prix, Decimal::from(2_500_000));
        assert_eq!(achat, Some(Decimal::from(2_400_000)));
        assert_eq!(commission, Some(Decimal::from(100_000)));

        let request = LivraisonRequest { prix_unitaire: Some(Decimal::from(2_600_000)), commission: None, ..request };
        assert_eq!(livraison_prices(&reception, &request).0, Decimal::from(2_600_000));
    }

    #[test]
    fn test_livraison_requires_client_and_date() {
        let request = LivraisonRequest {
            account_id: None,
            date_operation: None,
            reception_id: Uuid::new_v4(),
            prix_unitaire: None,
            prix_achat: None,
            commission: None,
        };
        let err = OperationService::require_client_and_date(&request).unwrap_err();
        assert_eq!(err.to_string(), "Veuillez sélectionner un client.");

        let request = LivraisonRequest { account_id: Some(Uuid::new_v4()), ..request };
        let err = OperationService::require_client_and_date(&request).unwrap_err();
        assert_eq!(err.to_string(), "Veuillez sélectionner une date.");
    }
}
