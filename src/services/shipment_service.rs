// src/services/shipment_service.rs

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{ListQuery, Paginated},
        response::{Filters, ListPage, Listed},
    },
    db::{InventoryRepository, ShipmentRepository},
    middleware::{
        context::RequestContext,
        rbac::{Ability, Model},
    },
    models::{
        inventory::StockTransfer,
        shipment::{
            AddShipmentVariantPayload, CreateShipmentPayload, Shipment, ShipmentDetails, ShipmentDraft,
            ShipmentSummary, UpdateShipmentPayload,
        },
    },
};

#[derive(Clone)]
pub struct ShipmentService {
    shipment_repo: ShipmentRepository,
    inventory_repo: InventoryRepository,
    pool: PgPool,
}

impl ShipmentService {
    pub fn new(shipment_repo: ShipmentRepository, inventory_repo: InventoryRepository, pool: PgPool) -> Self {
        Self {
            shipment_repo,
            inventory_repo,
            pool,
        }
    }

    pub async fn list(
        &self,
        ctx: &RequestContext,
        query: &ListQuery,
    ) -> Result<ListPage<ShipmentSummary>, AppError> {
        ctx.authorize(Ability::ViewAny, Model::Shipment)?;
        let closet_id = ctx.closet_id()?;

        let page = query.page_request();
        let pattern = query.search_pattern();

        let rows = self
            .shipment_repo
            .list_in_closet(closet_id, pattern.as_deref(), page)
            .await?;
        let total = self.shipment_repo.count_in_closet(closet_id, pattern.as_deref()).await?;

        let row_can = ctx.can_map(Model::Shipment, &[Ability::Delete]);
        Ok(ListPage {
            items: Paginated::new(rows, page, total).map(|item| Listed {
                item,
                can: row_can.clone(),
            }),
            filters: Filters { search: query.search.clone() },
            can: ctx.can_map(Model::Shipment, &[Ability::Create, Ability::DeleteAny]),
        })
    }

    /// A remessa nasce no closet ativo, com o usuário como fornecedor.
    pub async fn store(&self, ctx: &RequestContext, payload: CreateShipmentPayload) -> Result<Shipment, AppError> {
        ctx.authorize(Ability::Create, Model::Shipment)?;
        let draft = ShipmentDraft::new(ctx, payload)?;

        let shipment = self.shipment_repo.create(&self.pool, &draft).await?;

        tracing::info!(shipment_id = %shipment.id, closet_id = %shipment.closet_id, "Remessa criada");
        Ok(shipment)
    }

    pub async fn details(&self, ctx: &RequestContext, id: Uuid) -> Result<ShipmentDetails, AppError> {
        ctx.authorize(Ability::View, Model::Shipment)?;
        let closet_id = ctx.closet_id()?;

        let shipment = self
            .shipment_repo
            .find_in_closet(id, closet_id)
            .await?
            .ok_or(AppError::NotFound("shipment"))?;
        let lines = self.shipment_repo.variant_lines(shipment.id).await?;

        Ok(ShipmentDetails {
            shipment,
            shipment_variants: lines,
        })
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        payload: UpdateShipmentPayload,
    ) -> Result<Shipment, AppError> {
        ctx.authorize(Ability::Update, Model::Shipment)?;
        let closet_id = ctx.closet_id()?;

        self.shipment_repo
            .update(
                &self.pool,
                id,
                closet_id,
                payload.reference.as_deref().map(str::trim),
                payload.notes.as_deref(),
            )
            .await?
            .ok_or(AppError::NotFound("shipment"))
    }

    /// Exclusão lógica. As reservas da remessa continuam como estão.
    pub async fn destroy(&self, ctx: &RequestContext, id: Uuid) -> Result<String, AppError> {
        ctx.authorize(Ability::Delete, Model::Shipment)?;
        let closet_id = ctx.closet_id()?;

        let reference = self
            .shipment_repo
            .soft_delete(&self.pool, id, closet_id)
            .await?
            .ok_or(AppError::NotFound("shipment"))?;

        tracing::info!(shipment_id = %id, user_id = %ctx.user.id, "Remessa excluída");
        Ok(reference)
    }

    /// Vincula a variante à remessa. Só um vínculo NOVO reserva estoque;
    /// repetir a chamada não duplica nem reserva de novo.
    /// Retorna `true` se o vínculo foi criado agora.
    pub async fn add_variant(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        payload: AddShipmentVariantPayload,
    ) -> Result<bool, AppError> {
        ctx.authorize(Ability::Update, Model::Shipment)?;

        let mut tx = self.pool.begin().await?;

        let shipment = self
            .shipment_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("shipment"))?;

        if !self.shipment_repo.variant_exists(&mut *tx, payload.variant_id).await? {
            return Err(AppError::NotFound("variant"));
        }

        let attached = self
            .shipment_repo
            .attach_variant(&mut *tx, shipment.id, payload.variant_id, payload.quantity)
            .await?;

        if attached {
            self.transfer(
                &mut tx,
                &shipment,
                payload.variant_id,
                StockTransfer::Reserve(payload.quantity),
            )
            .await?;
        }

        tx.commit().await?;
        Ok(attached)
    }

    /// Desvincula a variante e devolve a reserva ao estoque.
    /// Retorna a quantidade devolvida (0 se a variante não estava na remessa).
    pub async fn remove_variant(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        variant_id: Uuid,
    ) -> Result<i32, AppError> {
        ctx.authorize(Ability::Update, Model::Shipment)?;

        let mut tx = self.pool.begin().await?;

        let shipment = self
            .shipment_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("shipment"))?;

        let Some(quantity) = self
            .shipment_repo
            .detach_variant(&mut *tx, shipment.id, variant_id)
            .await?
        else {
            // Nada a desfazer; o drop da transação faz o rollback
            return Ok(0);
        };

        self.transfer(&mut tx, &shipment, variant_id, StockTransfer::Release(quantity))
            .await?;

        tx.commit().await?;
        Ok(quantity)
    }

    /// Move o saldo entre os baldes com a linha de inventário travada e registra o movimento.
    async fn transfer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        shipment: &Shipment,
        variant_id: Uuid,
        transfer: StockTransfer,
    ) -> Result<(), AppError> {
        let inventory = self
            .inventory_repo
            .find_for_update(&mut **tx, variant_id, shipment.closet_id)
            .await?
            .ok_or(AppError::NotFound("inventory"))?;

        let (in_stock, in_reserve) = transfer.apply(inventory.in_stock, inventory.in_reserve)?;

        let inventory = self
            .inventory_repo
            .set_levels(&mut **tx, inventory.id, in_stock, in_reserve)
            .await?;
        self.inventory_repo
            .record_stock_move(&mut **tx, &inventory, shipment.id, transfer)
            .await?;

        tracing::info!(
            shipment_id = %shipment.id,
            variant_id = %variant_id,
            kind = ?transfer.kind(),
            quantity = transfer.quantity(),
            in_stock,
            in_reserve,
            "Estoque ajustado"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    use crate::middleware::rbac::Permissions;
    use crate::models::auth::User;

    fn service() -> ShipmentService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        ShipmentService::new(
            ShipmentRepository::new(pool.clone()),
            InventoryRepository::new(pool.clone()),
            pool,
        )
    }

    fn ctx(slugs: &[&str]) -> RequestContext {
        let now = chrono::Utc::now();
        RequestContext {
            user: User {
                id: Uuid::new_v4(),
                name: "Ana".into(),
                email: "ana@example.com".into(),
                company_id: None,
                agency_id: None,
                created_at: now,
                updated_at: now,
            },
            closet: None,
            permissions: Permissions::new(slugs.iter().map(|s| s.to_string())),
        }
    }

    #[tokio::test]
    async fn adding_a_variant_requires_update() {
        let payload = AddShipmentVariantPayload {
            variant_id: Uuid::new_v4(),
            quantity: 2,
        };
        let result = service()
            .add_variant(&ctx(&["shipment:view"]), Uuid::new_v4(), payload)
            .await;

        assert!(matches!(
            result,
            Err(AppError::Forbidden { ability: Ability::Update, model: Model::Shipment })
        ));
    }

    #[tokio::test]
    async fn removing_a_variant_requires_update() {
        let result = service()
            .remove_variant(&ctx(&[]), Uuid::new_v4(), Uuid::new_v4())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn details_are_scoped_to_the_active_closet() {
        let result = service().details(&ctx(&["shipment:view"]), Uuid::new_v4()).await;

        assert!(matches!(result, Err(AppError::NoActiveCloset)));
    }

    #[tokio::test]
    async fn store_without_an_active_closet_fails() {
        let payload = CreateShipmentPayload {
            reference: "REM-1".into(),
            notes: None,
        };
        let result = service().store(&ctx(&["shipment:create"]), payload).await;

        assert!(matches!(result, Err(AppError::NoActiveCloset)));
    }
}
