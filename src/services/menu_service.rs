use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use uuid::Uuid;

use crate::{
    dto::menu::{CategoryList, ExtraList, MenuItemList, MenuStats, PriceRange},
    entity::{
        categories::{Column as CatCol, Entity as Categories, Model as CategoryModel},
        extras::{Column as ExtraCol, Entity as Extras, Model as ExtraModel},
        menu_items::{Column as ItemCol, Entity as MenuItems, Model as MenuItemModel},
    },
    error::{AppError, AppResult},
    models::{Category, Extra, MenuItem},
    response::{ApiResponse, Meta},
    routes::params::MenuQuery,
    state::AppState,
};

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items: Vec<Category> = Categories::find()
        .filter(CatCol::IsActive.eq(true))
        .order_by_asc(CatCol::SortOrder)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Categories", CategoryList { items }, Some(meta)))
}

pub async fn list_menu_items(
    state: &AppState,
    query: MenuQuery,
) -> AppResult<ApiResponse<MenuItemList>> {
    let mut condition =
        Condition::all().add(ItemCol::IsAvailable.eq(query.is_available.unwrap_or(true)));

    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col((MenuItems, ItemCol::Name)).ilike(pattern.clone()))
                .add(Expr::col((MenuItems, ItemCol::Description)).ilike(pattern)),
        );
    }

    if let Some(slug) = query.category.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(CatCol::Slug.eq(slug.clone()));
    }

    if let Some(is_fasting) = query.is_fasting {
        condition = condition.add(ItemCol::IsFasting.eq(is_fasting));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(ItemCol::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(ItemCol::Price.lte(max_price));
    }

    let items: Vec<MenuItem> = MenuItems::find()
        .find_also_related(Categories)
        .filter(condition)
        .order_by_asc(ItemCol::SortOrder)
        .order_by_asc(ItemCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(item, category)| menu_item_from_entity(item, category))
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Menu items", MenuItemList { items }, Some(meta)))
}

pub async fn get_menu_item(state: &AppState, id: Uuid) -> AppResult<ApiResponse<MenuItem>> {
    let result = MenuItems::find_by_id(id)
        .find_also_related(Categories)
        .one(&state.orm)
        .await?;
    let (item, category) = match result {
        Some(found) => found,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success(
        "Menu item",
        menu_item_from_entity(item, category),
        None,
    ))
}

pub async fn list_extras(state: &AppState) -> AppResult<ApiResponse<ExtraList>> {
    let items: Vec<Extra> = Extras::find()
        .filter(ExtraCol::IsActive.eq(true))
        .order_by_asc(ExtraCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(extra_from_entity)
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Extras", ExtraList { items }, Some(meta)))
}

pub async fn menu_stats(state: &AppState) -> AppResult<ApiResponse<MenuStats>> {
    let rows: Vec<(Decimal, bool)> = MenuItems::find()
        .select_only()
        .column(ItemCol::Price)
        .column(ItemCol::IsFasting)
        .filter(ItemCol::IsAvailable.eq(true))
        .into_tuple()
        .all(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Menu stats",
        stats_from_rows(&rows),
        Some(Meta::empty()),
    ))
}

/// Count, price range and fasting count over `(price, is_fasting)` rows. An
/// empty menu reports a `0..1000` range so price filters still have bounds.
pub fn stats_from_rows(rows: &[(Decimal, bool)]) -> MenuStats {
    let prices = rows.iter().map(|(price, _)| *price);
    let price_range = match (prices.clone().min(), prices.max()) {
        (Some(min), Some(max)) => PriceRange { min, max },
        _ => PriceRange {
            min: Decimal::ZERO,
            max: Decimal::from(1000),
        },
    };
    MenuStats {
        total_items: rows.len() as i64,
        price_range,
        fasting_items_count: rows.iter().filter(|(_, fasting)| *fasting).count() as i64,
    }
}

/// Menu item that can be put in a cart right now.
pub(crate) async fn find_orderable_item<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> AppResult<MenuItem> {
    let found = MenuItems::find_by_id(id)
        .find_also_related(Categories)
        .one(conn)
        .await?;
    match found {
        Some((item, category)) if item.is_available => Ok(menu_item_from_entity(item, category)),
        Some(_) => Err(AppError::BadRequest(format!("menu item {id} is not available"))),
        None => Err(AppError::BadRequest("menu item not found".to_string())),
    }
}

/// Active extras for `ids`, in the order requested.
pub(crate) async fn find_active_extras<C: ConnectionTrait>(
    conn: &C,
    ids: &[Uuid],
) -> AppResult<Vec<Extra>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let found = Extras::find()
        .filter(ExtraCol::Id.is_in(ids.iter().copied()))
        .filter(ExtraCol::IsActive.eq(true))
        .all(conn)
        .await?;

    ids.iter()
        .map(|id| {
            found
                .iter()
                .find(|extra| extra.id == *id)
                .cloned()
                .map(extra_from_entity)
                .ok_or_else(|| AppError::BadRequest(format!("extra {id} is not available")))
        })
        .collect()
}

pub(crate) fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
        slug: model.slug,
        description: model.description,
        image_url: model.image_url,
        sort_order: model.sort_order,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub(crate) fn menu_item_from_entity(
    model: MenuItemModel,
    category: Option<CategoryModel>,
) -> MenuItem {
    MenuItem {
        id: model.id,
        category_id: model.category_id,
        name: model.name,
        description: model.description,
        price: model.price,
        image_url: model.image_url,
        is_available: model.is_available,
        is_fasting: model.is_fasting,
        sort_order: model.sort_order,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
        category: category.map(category_from_entity),
    }
}

pub(crate) fn extra_from_entity(model: ExtraModel) -> Extra {
    Extra {
        id: model.id,
        name: model.name,
        price: model.price,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_over_available_items() {
        let rows = [
            (Decimal::new(12000, 2), true),
            (Decimal::new(35000, 2), false),
            (Decimal::new(8550, 2), true),
        ];
        let stats = stats_from_rows(&rows);

        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.fasting_items_count, 2);
        assert_eq!(stats.price_range.min, Decimal::new(8550, 2));
        assert_eq!(stats.price_range.max, Decimal::new(35000, 2));
    }

    #[test]
    fn stats_for_empty_menu() {
        let stats = stats_from_rows(&[]);

        assert_eq!(stats.total_items, 0);
        assert_eq!(stats.fasting_items_count, 0);
        assert_eq!(stats.price_range.min, Decimal::ZERO);
        assert_eq!(stats.price_range.max, Decimal::from(1000));
    }
}
