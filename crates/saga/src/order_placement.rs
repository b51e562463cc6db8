//! Order placement saga constants.

/// The saga type identifier for order placement.
pub const SAGA_TYPE: &str = "OrderPlacement";

/// Step name: collect the user's checked cart items.
pub const STEP_COLLECT_CART: &str = "collect_cart";

/// Step name: resolve catalog data and price the items.
pub const STEP_PRICE_ITEMS: &str = "price_items";

/// Step name: reserve stock for every line.
pub const STEP_RESERVE_STOCK: &str = "reserve_stock";

/// Step name: persist the order header and lines.
pub const STEP_PERSIST_ORDER: &str = "persist_order";

/// Step name: delete the checked cart rows.
pub const STEP_CLEAR_CART: &str = "clear_cart";
