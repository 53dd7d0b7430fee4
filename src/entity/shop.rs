use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entity::item::ItemKind;
use crate::geometry::Vector2;
use crate::ids::ShopId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShopListing {
    pub price: i64,
    pub quantity: u32,
    pub pack_size: u32,
}

/// One per chunk, immutable position, independently-rolled stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shop {
    pub id: ShopId,
    pub position: Vector2,
    pub name: String,
    pub inventory: HashMap<ItemKind, ShopListing>,
}
