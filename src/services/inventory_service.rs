// src/services/inventory_service.rs

use crate::{
    common::{
        error::AppError,
        pagination::{PageRequest, Paginated},
    },
    db::InventoryRepository,
    middleware::{
        context::RequestContext,
        rbac::{Ability, Model},
    },
    models::inventory::StockMove,
};

#[derive(Clone)]
pub struct InventoryService {
    inventory_repo: InventoryRepository,
}

impl InventoryService {
    pub fn new(inventory_repo: InventoryRepository) -> Self {
        Self { inventory_repo }
    }

    /// Histórico de reservas/devoluções do closet ativo.
    pub async fn stock_moves(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> Result<Paginated<StockMove>, AppError> {
        // Os movimentos nascem das remessas, então a leitura segue a permissão delas
        ctx.authorize(Ability::ViewAny, Model::Shipment)?;
        let closet_id = ctx.closet_id()?;

        let moves = self.inventory_repo.list_stock_moves(closet_id, page).await?;
        let total = self.inventory_repo.count_stock_moves(closet_id).await?;

        Ok(Paginated::new(moves, page, total))
    }
}
